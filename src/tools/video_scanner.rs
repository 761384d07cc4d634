use crate::config::FileTypeTable;
use anyhow::{Context, Result};
use log::warn;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// 遞迴掃描影片檔案
///
/// 依檔名排序走訪，讓同一個亂數種子在不同檔案系統上得到相同的洗牌結果。
/// 根目錄本身無法讀取時回傳錯誤，子目錄的錯誤只記錄後略過。
pub fn scan_video_files(directory: &Path, file_type_table: &FileTypeTable) -> Result<Vec<PathBuf>> {
    fs::read_dir(directory)
        .with_context(|| format!("無法讀取資料夾: {}", directory.display()))?;

    let mut video_files = Vec::new();
    for entry in WalkDir::new(directory)
        .follow_links(false)
        .sort_by_file_name()
    {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) if e.depth() == 0 => {
                return Err(e)
                    .with_context(|| format!("無法讀取資料夾: {}", directory.display()));
            }
            Err(e) => {
                warn!("略過無法讀取的項目: {e}");
                continue;
            }
        };

        if entry.file_type().is_file() && file_type_table.is_video_file(entry.path()) {
            video_files.push(entry.into_path());
        }
    }

    Ok(video_files)
}
