use super::ffmpeg_command::{FfmpegCommand, TranscodeJob};
use crate::config::Config;
use crate::tools::{
    ProcessError, ProcessOutput, RunOptions, VideoDimensions, dimension_probe_args,
    parse_dimensions, run_command,
};
use anyhow::{Context, Result, bail};
use std::path::Path;
use std::process::Command;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::time::Duration;

/// 外部轉檔引擎的能力介面
///
/// `Err` 只代表程序沒有正常跑完（無法啟動、逾時、被中斷）；
/// 非零結束碼放在 `ProcessOutput::success`，由呼叫端判斷。
pub trait MediaEngine: Send + Sync {
    /// 探測輸入檔，回傳含 stderr 診斷文字的結果
    fn probe(&self, source: &Path) -> Result<ProcessOutput, ProcessError>;

    /// 擷取並重新編碼一個片段
    fn transcode(&self, job: &TranscodeJob) -> Result<ProcessOutput, ProcessError>;

    /// 依清單以 stream copy 合併
    fn concat(&self, manifest: &Path, destination: &Path) -> Result<ProcessOutput, ProcessError>;

    /// 查詢第一條視訊串流尺寸，只有啟用 4:3 裁切時才會呼叫
    fn probe_dimensions(&self, source: &Path) -> Result<VideoDimensions> {
        bail!("此引擎不支援尺寸探測: {}", source.display())
    }
}

/// 呼叫系統 ffmpeg / ffprobe 的實作
pub struct FfmpegEngine {
    ffmpeg_path: String,
    ffprobe_path: String,
    run_options: RunOptions,
}

impl FfmpegEngine {
    #[must_use]
    pub fn new(ffmpeg_path: &str, ffprobe_path: &str, run_options: RunOptions) -> Self {
        Self {
            ffmpeg_path: ffmpeg_path.to_string(),
            ffprobe_path: ffprobe_path.to_string(),
            run_options,
        }
    }

    #[must_use]
    pub fn from_config(config: &Config, shutdown_signal: Arc<AtomicBool>) -> Self {
        let run_options = RunOptions {
            timeout: config.timeout(),
            spawn_retries: config.settings.spawn_retries,
            retry_backoff: Duration::from_millis(config.settings.retry_backoff_ms),
            shutdown_signal,
        };
        Self::new(
            &config.settings.ffmpeg_path,
            &config.settings.ffprobe_path,
            run_options,
        )
    }

    fn run_ffmpeg(&self, command: &FfmpegCommand<'_>) -> Result<ProcessOutput, ProcessError> {
        run_command(|| command.build_command(&self.ffmpeg_path), &self.run_options)
    }
}

impl MediaEngine for FfmpegEngine {
    fn probe(&self, source: &Path) -> Result<ProcessOutput, ProcessError> {
        self.run_ffmpeg(&FfmpegCommand::Probe { source })
    }

    fn transcode(&self, job: &TranscodeJob) -> Result<ProcessOutput, ProcessError> {
        self.run_ffmpeg(&FfmpegCommand::Transcode(job))
    }

    fn concat(&self, manifest: &Path, destination: &Path) -> Result<ProcessOutput, ProcessError> {
        self.run_ffmpeg(&FfmpegCommand::Concat {
            manifest,
            destination,
        })
    }

    fn probe_dimensions(&self, source: &Path) -> Result<VideoDimensions> {
        let output = run_command(
            || {
                let mut cmd = Command::new(&self.ffprobe_path);
                cmd.args(dimension_probe_args()).arg(source);
                cmd
            },
            &self.run_options,
        )
        .with_context(|| format!("無法執行 ffprobe: {}", source.display()))?;

        if !output.success {
            bail!("ffprobe 執行失敗: {}", output.stderr_tail(3));
        }

        parse_dimensions(&output.stdout)
    }
}
