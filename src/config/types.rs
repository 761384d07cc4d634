use super::file_type::{DEFAULT_VIDEO_EXTENSIONS, FileTypeTable};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// 設定檔名稱（位於工作根目錄）
pub const SETTINGS_FILE_NAME: &str = "settings.json";

/// 片段清單檔名（位於工作資料夾內）
pub const MANIFEST_FILE_NAME: &str = "concat.txt";

/// 使用者設定，所有欄位皆可省略
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClipSettings {
    /// 輸入影片根目錄（相對於工作根目錄）
    pub input_dir: PathBuf,
    /// 片段輸出資料夾，每次執行都會重建
    pub work_dir: PathBuf,
    /// 最終合併輸出檔
    pub output_file: PathBuf,
    pub ffmpeg_path: String,
    pub ffprobe_path: String,
    pub video_extensions: Vec<String>,
    /// 同時轉檔數量，1 表示依序處理
    pub workers: usize,
    /// 單次 ffmpeg 執行的逾時秒數
    pub timeout_seconds: Option<u64>,
    /// 程序無法啟動時的重試次數
    pub spawn_retries: u32,
    pub retry_backoff_ms: u64,
    /// 比 4:3 寬的來源先裁切成 4:3 再縮放
    pub crop_to_four_thirds: bool,
}

impl Default for ClipSettings {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("input"),
            work_dir: PathBuf::from("random_clips_output"),
            output_file: PathBuf::from("output.mp4"),
            ffmpeg_path: "ffmpeg".to_string(),
            ffprobe_path: "ffprobe".to_string(),
            video_extensions: DEFAULT_VIDEO_EXTENSIONS
                .iter()
                .map(|ext| (*ext).to_string())
                .collect(),
            workers: 1,
            timeout_seconds: None,
            spawn_retries: 2,
            retry_backoff_ms: 500,
            crop_to_four_thirds: false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    /// 工作根目錄，所有相對路徑以此為基準
    pub root: PathBuf,
    pub file_type_table: FileTypeTable,
    pub settings: ClipSettings,
}

impl Config {
    /// 以預設值建立設定，不讀取設定檔
    #[must_use]
    pub fn with_defaults(root: &Path) -> Self {
        Self::from_settings(root, ClipSettings::default())
    }

    #[must_use]
    pub fn from_settings(root: &Path, settings: ClipSettings) -> Self {
        Self {
            root: root.to_path_buf(),
            file_type_table: FileTypeTable::new(&settings.video_extensions),
            settings,
        }
    }

    #[must_use]
    pub fn input_dir(&self) -> PathBuf {
        self.root.join(&self.settings.input_dir)
    }

    #[must_use]
    pub fn work_dir(&self) -> PathBuf {
        self.root.join(&self.settings.work_dir)
    }

    #[must_use]
    pub fn manifest_path(&self) -> PathBuf {
        self.work_dir().join(MANIFEST_FILE_NAME)
    }

    #[must_use]
    pub fn output_path(&self) -> PathBuf {
        self.root.join(&self.settings.output_file)
    }

    #[must_use]
    pub fn timeout(&self) -> Option<Duration> {
        self.settings
            .timeout_seconds
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
    }

    #[must_use]
    pub fn workers(&self) -> usize {
        self.settings.workers.max(1)
    }
}
