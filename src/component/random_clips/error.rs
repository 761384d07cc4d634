use crate::tools::ProcessError;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClipError {
    /// 輸入根目錄不存在或無法讀取
    #[error("無法掃描輸入資料夾 {}: {reason}", path.display())]
    Discovery { path: PathBuf, reason: String },

    /// 工作資料夾或舊輸出檔無法重設
    #[error("無法重設 {}: {source}", path.display())]
    WorkDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("探測失敗 {}: {reason}", path.display())]
    Probe { path: PathBuf, reason: ProbeFailure },

    #[error("轉檔失敗 {}: {reason}", path.display())]
    Transcode {
        path: PathBuf,
        reason: TranscodeFailure,
    },

    /// 清單是唯一的成功紀錄，寫不進去就不能繼續
    #[error("無法寫入片段清單 {}: {source}", path.display())]
    Manifest {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("合併失敗: {reason}")]
    Concat { reason: ConcatFailure },

    #[error("收到中斷信號，已停止處理")]
    Interrupted,
}

#[derive(Debug, Error)]
pub enum ProbeFailure {
    #[error("duration not found")]
    DurationNotFound,
    #[error(transparent)]
    Process(#[from] ProcessError),
}

#[derive(Debug, Error)]
pub enum TranscodeFailure {
    #[error("ffmpeg 結束碼 {code:?}: {stderr}")]
    ExitStatus { code: Option<i32>, stderr: String },
    #[error("輸出檔案未建立: {}", .0.display())]
    MissingOutput(PathBuf),
    #[error(transparent)]
    Process(#[from] ProcessError),
}

#[derive(Debug, Error)]
pub enum ConcatFailure {
    #[error("片段清單不存在: {}", .0.display())]
    MissingManifest(PathBuf),
    #[error("片段清單沒有任何片段")]
    EmptyManifest,
    #[error("無法讀取片段清單: {0}")]
    Read(#[source] io::Error),
    #[error("ffmpeg 結束碼 {code:?}: {stderr}")]
    ExitStatus { code: Option<i32>, stderr: String },
    #[error("輸出檔案未建立: {}", .0.display())]
    MissingOutput(PathBuf),
    #[error(transparent)]
    Process(#[from] ProcessError),
}
