use anyhow::{Context, Result};
use serde::Deserialize;

/// 第一條視訊串流的尺寸
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VideoDimensions {
    pub width: u32,
    pub height: u32,
}

impl VideoDimensions {
    /// 比 4:3 寬（例如 16:9）
    #[must_use]
    pub fn is_wider_than_four_thirds(&self) -> bool {
        // 整數比較，避免 640x480 之類的邊界被浮點誤差誤判
        u64::from(self.width) * 3 > u64::from(self.height) * 4
    }
}

#[derive(Deserialize)]
struct FfprobeOutput {
    streams: Option<Vec<StreamInfo>>,
}

#[derive(Deserialize)]
struct StreamInfo {
    width: Option<u32>,
    height: Option<u32>,
}

/// ffprobe 查詢第一條視訊串流尺寸的參數（JSON 輸出）
#[must_use]
pub fn dimension_probe_args() -> [&'static str; 8] {
    [
        "-v",
        "error",
        "-select_streams",
        "v:0",
        "-show_entries",
        "stream=width,height",
        "-of",
        "json",
    ]
}

/// 解析 `ffprobe -show_entries stream=width,height -of json` 的輸出
pub fn parse_dimensions(json: &str) -> Result<VideoDimensions> {
    let probe: FfprobeOutput = serde_json::from_str(json).context("無法解析 ffprobe 輸出")?;

    let stream = probe
        .streams
        .as_ref()
        .and_then(|streams| streams.first())
        .ok_or_else(|| anyhow::anyhow!("找不到視訊串流"))?;

    let width = stream
        .width
        .ok_or_else(|| anyhow::anyhow!("無法取得影片寬度"))?;
    let height = stream
        .height
        .ok_or_else(|| anyhow::anyhow!("無法取得影片高度"))?;

    Ok(VideoDimensions { width, height })
}
