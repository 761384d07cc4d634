use super::clip_transcoder::ProducedClip;
use super::error::ClipError;
use std::path::PathBuf;

/// 長度不足而略過的來源
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedSource {
    pub sequence_index: usize,
    pub source: PathBuf,
    pub duration: f64,
}

#[derive(Debug)]
pub struct FailedSource {
    pub sequence_index: usize,
    pub source: PathBuf,
    pub error: ClipError,
}

/// 單一來源的處理結果
#[derive(Debug)]
pub enum SourceOutcome {
    Produced(ProducedClip),
    Skipped(SkippedSource),
    Failed(FailedSource),
}

impl SourceOutcome {
    #[must_use]
    pub fn sequence_index(&self) -> usize {
        match self {
            Self::Produced(clip) => clip.sequence_index,
            Self::Skipped(skipped) => skipped.sequence_index,
            Self::Failed(failed) => failed.sequence_index,
        }
    }
}

/// 批次處理摘要，順序與清單相同
#[derive(Debug, Default)]
pub struct BatchSummary {
    pub succeeded: Vec<ProducedClip>,
    pub skipped: Vec<SkippedSource>,
    pub failed: Vec<FailedSource>,
}

impl BatchSummary {
    pub fn record(&mut self, outcome: SourceOutcome) {
        match outcome {
            SourceOutcome::Produced(clip) => self.succeeded.push(clip),
            SourceOutcome::Skipped(skipped) => self.skipped.push(skipped),
            SourceOutcome::Failed(failed) => self.failed.push(failed),
        }
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.succeeded.len() + self.skipped.len() + self.failed.len()
    }
}
