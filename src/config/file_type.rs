use std::collections::HashSet;
use std::path::Path;

/// 可接受的影片副檔名
pub const DEFAULT_VIDEO_EXTENSIONS: [&str; 2] = [".mkv", ".mp4"];

/// 影片副檔名對照表（不分大小寫）
#[derive(Debug, Clone)]
pub struct FileTypeTable {
    video_extensions: HashSet<String>,
}

impl FileTypeTable {
    /// 副檔名可寫成 `.mkv` 或 `mkv`
    #[must_use]
    pub fn new<I, S>(extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let video_extensions = extensions
            .into_iter()
            .map(|ext| ext.as_ref().trim_start_matches('.').to_lowercase())
            .filter(|ext| !ext.is_empty())
            .collect();
        Self { video_extensions }
    }

    #[must_use]
    pub fn is_video_file(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| self.video_extensions.contains(&ext.to_lowercase()))
    }
}

impl Default for FileTypeTable {
    fn default() -> Self {
        Self::new(DEFAULT_VIDEO_EXTENSIONS)
    }
}
