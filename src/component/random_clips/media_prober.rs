use super::error::{ClipError, ProbeFailure};
use super::media_engine::MediaEngine;
use anyhow::Result;
use log::debug;
use regex::Regex;
use std::path::Path;

/// 探測影片總長度（秒）
///
/// ffmpeg 只給輸入檔時會以非零結束碼離開，所以不看結束碼，只看 stderr 有沒有 Duration。
pub fn probe_duration(engine: &dyn MediaEngine, source: &Path) -> Result<f64, ClipError> {
    let output = engine.probe(source).map_err(|e| ClipError::Probe {
        path: source.to_path_buf(),
        reason: ProbeFailure::Process(e),
    })?;

    let duration = parse_duration(&output.stderr)
        .ok()
        .flatten()
        .ok_or_else(|| ClipError::Probe {
            path: source.to_path_buf(),
            reason: ProbeFailure::DurationNotFound,
        })?;

    debug!("影片長度 {duration:.2}s: {}", source.display());
    Ok(duration)
}

/// 從 ffmpeg 診斷輸出擷取 `Duration: HH:MM:SS.ff`
///
/// 保留小數秒，`Duration: N/A` 視為找不到
pub fn parse_duration(output: &str) -> Result<Option<f64>> {
    let duration_regex = Regex::new(r"Duration:\s*(\d+):(\d{2}):(\d{2}(?:\.\d+)?)")?;

    let Some(caps) = duration_regex.captures(output) else {
        return Ok(None);
    };

    let hours: f64 = caps[1].parse()?;
    let minutes: f64 = caps[2].parse()?;
    let seconds: f64 = caps[3].parse()?;

    Ok(Some(hours * 3600.0 + minutes * 60.0 + seconds))
}
