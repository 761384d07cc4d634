use super::clip_sampler::ClipPlan;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Command;

/// 固定輸出規格：所有片段參數一致，最後才能用 stream copy 合併
pub const VIDEO_CODEC: &str = "libx265";
pub const TARGET_SCALE: &str = "640:480";
pub const PIXEL_FORMAT: &str = "yuv420p";
pub const FRAME_RATE: &str = "24";
pub const AUDIO_CODEC: &str = "aac";
pub const AUDIO_BITRATE: &str = "192k";
pub const AUDIO_SAMPLE_RATE: &str = "48000";
pub const AUDIO_CHANNELS: &str = "2";
pub const CLIP_EXTENSION: &str = "mp4";

/// 反交錯後縮放；裁切時先把比 4:3 寬的畫面切成 4:3
#[must_use]
pub fn video_filter(crop_to_four_thirds: bool) -> String {
    if crop_to_four_thirds {
        format!("yadif,crop=floor(ih/3)*4:ih,scale={TARGET_SCALE}")
    } else {
        format!("yadif,scale={TARGET_SCALE}")
    }
}

/// 單一片段的轉檔工作
#[derive(Debug, Clone, PartialEq)]
pub struct TranscodeJob {
    pub source: PathBuf,
    pub start_offset_seconds: f64,
    pub clip_duration_seconds: f64,
    pub video_filter: String,
    pub destination: PathBuf,
}

impl TranscodeJob {
    #[must_use]
    pub fn new(plan: &ClipPlan, video_filter: String, destination: PathBuf) -> Self {
        Self {
            source: plan.source.clone(),
            start_offset_seconds: plan.start_offset_seconds,
            clip_duration_seconds: plan.clip_duration_seconds,
            video_filter,
            destination,
        }
    }
}

/// 三種 ffmpeg 呼叫形式
#[derive(Debug)]
pub enum FfmpegCommand<'a> {
    /// 只給輸入檔，從 stderr 讀取 Duration
    Probe { source: &'a Path },
    Transcode(&'a TranscodeJob),
    /// concat demuxer + stream copy
    Concat {
        manifest: &'a Path,
        destination: &'a Path,
    },
}

impl FfmpegCommand<'_> {
    #[must_use]
    pub fn args(&self) -> Vec<OsString> {
        let mut args: Vec<OsString> = ["-hide_banner", "-nostdin"]
            .iter()
            .map(OsString::from)
            .collect();

        match self {
            Self::Probe { source } => {
                args.push("-i".into());
                args.push(source.as_os_str().to_owned());
            }
            Self::Transcode(job) => {
                args.extend(
                    ["-loglevel", "error", "-y", "-fflags", "+genpts", "-i"]
                        .iter()
                        .map(OsString::from),
                );
                args.push(job.source.as_os_str().to_owned());
                args.extend(
                    [
                        "-ss".to_string(),
                        job.start_offset_seconds.to_string(),
                        "-t".to_string(),
                        job.clip_duration_seconds.to_string(),
                        "-c:v".to_string(),
                        VIDEO_CODEC.to_string(),
                        "-filter:v".to_string(),
                        job.video_filter.clone(),
                        "-pix_fmt".to_string(),
                        PIXEL_FORMAT.to_string(),
                        "-r".to_string(),
                        FRAME_RATE.to_string(),
                        "-fps_mode".to_string(),
                        "cfr".to_string(),
                        "-c:a".to_string(),
                        AUDIO_CODEC.to_string(),
                        "-b:a".to_string(),
                        AUDIO_BITRATE.to_string(),
                        "-ar".to_string(),
                        AUDIO_SAMPLE_RATE.to_string(),
                        "-ac".to_string(),
                        AUDIO_CHANNELS.to_string(),
                    ]
                    .into_iter()
                    .map(OsString::from),
                );
                args.push(job.destination.as_os_str().to_owned());
            }
            Self::Concat {
                manifest,
                destination,
            } => {
                args.extend(
                    ["-loglevel", "error", "-y", "-f", "concat", "-safe", "0", "-i"]
                        .iter()
                        .map(OsString::from),
                );
                args.push(manifest.as_os_str().to_owned());
                args.extend(["-c", "copy"].iter().map(OsString::from));
                args.push(destination.as_os_str().to_owned());
            }
        }

        args
    }

    #[must_use]
    pub fn build_command(&self, program: &str) -> Command {
        let mut cmd = Command::new(program);
        cmd.args(self.args());
        cmd
    }
}
