//! 隨機片段合輯元件
//!
//! 從輸入資料夾隨機挑選影片，每部擷取一段固定長度的片段並統一編碼，
//! 最後依洗牌順序合併成單一輸出檔。

mod batch_summary;
mod clip_sampler;
mod clip_transcoder;
mod concat_manifest;
mod concatenator;
mod error;
mod ffmpeg_command;
mod main;
mod media_engine;
mod media_prober;

pub use batch_summary::{BatchSummary, FailedSource, SkippedSource, SourceOutcome};
pub use clip_sampler::{
    CLIP_LENGTH, ClipPlan, INTRO_GUARD, MIN_ELIGIBLE_DURATION, OUTRO_GUARD, SampleDecision,
    is_eligible, plan_clip,
};
pub use clip_transcoder::{ProducedClip, clip_file_name, transcode_clip};
pub use concat_manifest::{ConcatManifest, OutcomeSequencer, read_entries};
pub use concatenator::concatenate;
pub use error::{ClipError, ConcatFailure, ProbeFailure, TranscodeFailure};
pub use ffmpeg_command::{FfmpegCommand, TranscodeJob, video_filter};
pub use main::{RandomClips, RunReport};
pub use media_engine::{FfmpegEngine, MediaEngine};
pub use media_prober::{parse_duration, probe_duration};
