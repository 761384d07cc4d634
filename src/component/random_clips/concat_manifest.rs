//! concat demuxer 清單
//!
//! 每成功一個片段就追加一行 `file <N>.mp4` 並寫入磁碟，
//! 中途失敗時清單仍反映已成功的片段。

use super::batch_summary::SourceOutcome;
use super::clip_transcoder::ProducedClip;
use std::collections::BTreeMap;
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

pub struct ConcatManifest {
    path: PathBuf,
    file: File,
}

impl ConcatManifest {
    /// 建立空清單，覆蓋既有內容
    pub fn create(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(path)?;
        Ok(Self {
            path: path.to_path_buf(),
            file,
        })
    }

    /// 追加一個片段並同步到磁碟
    pub fn append(&mut self, clip: &ProducedClip) -> io::Result<()> {
        writeln!(self.file, "{}", format_entry(&clip.file_name()))?;
        self.file.flush()?;
        self.file.sync_data()
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[must_use]
pub fn format_entry(file_name: &str) -> String {
    format!("file {file_name}")
}

/// 從磁碟讀回清單中的檔名
pub fn read_entries(path: &Path) -> io::Result<Vec<String>> {
    let content = std::fs::read_to_string(path)?;
    Ok(content
        .lines()
        .filter_map(|line| line.trim().strip_prefix("file "))
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
        .collect())
}

/// 依順序釋放處理結果
///
/// 平行轉檔時完成順序不固定，清單必須維持洗牌順序：
/// 結果先暫存，等前面的順序都到齊才一併釋放。
#[derive(Debug, Default)]
pub struct OutcomeSequencer {
    next_index: usize,
    pending: BTreeMap<usize, SourceOutcome>,
}

impl OutcomeSequencer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// 收下一個結果，回傳目前可依序處理的結果
    pub fn accept(&mut self, outcome: SourceOutcome) -> Vec<SourceOutcome> {
        self.pending.insert(outcome.sequence_index(), outcome);

        let mut ready = Vec::new();
        while let Some(outcome) = self.pending.remove(&self.next_index) {
            ready.push(outcome);
            self.next_index += 1;
        }
        ready
    }

    /// 剩下的結果依順序取出（不保證連續）
    pub fn drain_remaining(&mut self) -> Vec<SourceOutcome> {
        std::mem::take(&mut self.pending).into_values().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::random_clips::batch_summary::SkippedSource;
    use std::fs;
    use tempfile::TempDir;

    fn produced(index: usize) -> SourceOutcome {
        SourceOutcome::Produced(ProducedClip {
            sequence_index: index,
            file_path: PathBuf::from(format!("/w/{index}.mp4")),
        })
    }

    fn skipped(index: usize) -> SourceOutcome {
        SourceOutcome::Skipped(SkippedSource {
            sequence_index: index,
            source: PathBuf::from("/in/short.mp4"),
            duration: 100.0,
        })
    }

    fn indices(outcomes: &[SourceOutcome]) -> Vec<usize> {
        outcomes.iter().map(SourceOutcome::sequence_index).collect()
    }

    #[test]
    fn test_append_writes_through_to_disk() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("concat.txt");
        let mut manifest = ConcatManifest::create(&path).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "");

        manifest
            .append(&ProducedClip {
                sequence_index: 3,
                file_path: temp_dir.path().join("3.mp4"),
            })
            .unwrap();
        // 不需關閉檔案即可從磁碟讀到
        assert_eq!(fs::read_to_string(&path).unwrap(), "file 3.mp4\n");

        manifest
            .append(&ProducedClip {
                sequence_index: 0,
                file_path: temp_dir.path().join("0.mp4"),
            })
            .unwrap();
        assert_eq!(read_entries(&path).unwrap(), vec!["3.mp4", "0.mp4"]);
    }

    #[test]
    fn test_create_truncates_previous_manifest() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("concat.txt");
        fs::write(&path, "file 9.mp4\n").unwrap();

        let manifest = ConcatManifest::create(&path).unwrap();
        assert_eq!(manifest.path(), path);
        assert!(read_entries(&path).unwrap().is_empty());
    }

    #[test]
    fn test_read_entries_ignores_noise() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("concat.txt");
        fs::write(&path, "# comment\nfile 1.mp4\n\nfile \nfile 2.mp4\n").unwrap();
        assert_eq!(read_entries(&path).unwrap(), vec!["1.mp4", "2.mp4"]);
    }

    #[test]
    fn test_sequencer_releases_in_order() {
        let mut sequencer = OutcomeSequencer::new();

        assert!(sequencer.accept(produced(2)).is_empty());
        assert!(sequencer.accept(skipped(1)).is_empty());

        let ready = sequencer.accept(produced(0));
        assert_eq!(indices(&ready), vec![0, 1, 2]);
        assert!(sequencer.drain_remaining().is_empty());

        assert_eq!(indices(&sequencer.accept(produced(3))), vec![3]);
    }

    #[test]
    fn test_sequencer_reverse_arrival() {
        let mut sequencer = OutcomeSequencer::new();
        let mut released = Vec::new();
        for index in (0..6).rev() {
            released.extend(sequencer.accept(produced(index)));
        }
        assert_eq!(indices(&released), vec![0, 1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_drain_remaining_returns_gapped_outcomes_in_order() {
        let mut sequencer = OutcomeSequencer::new();
        sequencer.accept(produced(4));
        sequencer.accept(produced(2));
        let remaining = sequencer.drain_remaining();
        assert_eq!(indices(&remaining), vec![2, 4]);
        assert!(sequencer.drain_remaining().is_empty());
    }
}
