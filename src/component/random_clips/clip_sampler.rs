//! 隨機片段取樣
//!
//! 片段不碰開頭 60 秒（片頭），起點最晚在 `floor(長度) - 360` 秒，
//! 因此短於 420 秒的影片一律略過。

use log::debug;
use rand::Rng;
use std::path::{Path, PathBuf};

/// 可取樣的最短影片長度（秒）
pub const MIN_ELIGIBLE_DURATION: u64 = 420;
/// 片頭保留（秒）
pub const INTRO_GUARD: u64 = 60;
/// 片尾保留（秒），包含片段本身的長度
pub const OUTRO_GUARD: u64 = 360;
/// 片段長度（秒）
pub const CLIP_LENGTH: u64 = 180;

/// 單一來源的取樣計畫
#[derive(Debug, Clone, PartialEq)]
pub struct ClipPlan {
    pub source: PathBuf,
    pub start_offset_seconds: f64,
    pub clip_duration_seconds: f64,
    /// 洗牌後的處理順序，也是輸出檔名
    pub sequence_index: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SampleDecision {
    Plan(ClipPlan),
    /// 影片太短（或長度無效），不是錯誤
    Skip { duration: f64 },
}

#[must_use]
pub fn is_eligible(duration: f64) -> bool {
    duration.is_finite() && duration >= MIN_ELIGIBLE_DURATION as f64
}

/// 決定是否取樣，並在 `[INTRO_GUARD, floor(duration) - OUTRO_GUARD]` 中均勻挑選整數起點
pub fn plan_clip<R>(source: &Path, duration: f64, sequence_index: usize, rng: &mut R) -> SampleDecision
where
    R: Rng + ?Sized,
{
    if !is_eligible(duration) {
        return SampleDecision::Skip { duration };
    }

    // is_eligible 保證 floor(duration) >= 420，區間非空
    let latest_start = duration.floor() as u64 - OUTRO_GUARD;
    let start = rng.gen_range(INTRO_GUARD..=latest_start);

    debug!(
        "取樣 [{sequence_index}] {}: 長度 {duration:.2}s，起點 {start}s（範圍 {INTRO_GUARD}..={latest_start}）",
        source.display()
    );

    SampleDecision::Plan(ClipPlan {
        source: source.to_path_buf(),
        start_offset_seconds: start as f64,
        clip_duration_seconds: CLIP_LENGTH as f64,
        sequence_index,
    })
}
