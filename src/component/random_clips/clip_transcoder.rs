use super::clip_sampler::ClipPlan;
use super::error::{ClipError, TranscodeFailure};
use super::ffmpeg_command::{CLIP_EXTENSION, TranscodeJob};
use super::media_engine::MediaEngine;
use crate::tools::remove_file_if_exists;
use log::{info, warn};
use std::path::{Path, PathBuf};

/// 成功產生的片段檔
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProducedClip {
    pub sequence_index: usize,
    pub file_path: PathBuf,
}

impl ProducedClip {
    /// 清單中使用的檔名（相對於清單所在資料夾）
    #[must_use]
    pub fn file_name(&self) -> String {
        self.file_path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| clip_file_name(self.sequence_index))
    }
}

/// 片段檔名只由順序決定，例如 `7.mp4`
#[must_use]
pub fn clip_file_name(sequence_index: usize) -> String {
    format!("{sequence_index}.{CLIP_EXTENSION}")
}

/// 擷取並重新編碼一個片段到工作資料夾
///
/// 失敗時刪除不完整的輸出檔
pub fn transcode_clip(
    engine: &dyn MediaEngine,
    plan: &ClipPlan,
    work_dir: &Path,
    video_filter: String,
) -> Result<ProducedClip, ClipError> {
    let destination = work_dir.join(clip_file_name(plan.sequence_index));
    let job = TranscodeJob::new(plan, video_filter, destination.clone());

    info!(
        "轉檔 [{}]: {} 自 {}s 起 {}s -> {}",
        plan.sequence_index,
        plan.source.display(),
        plan.start_offset_seconds,
        plan.clip_duration_seconds,
        destination.display()
    );

    let failure = match engine.transcode(&job) {
        Ok(output) if output.success && destination.exists() => {
            return Ok(ProducedClip {
                sequence_index: plan.sequence_index,
                file_path: destination,
            });
        }
        Ok(output) if output.success => TranscodeFailure::MissingOutput(destination.clone()),
        Ok(output) => TranscodeFailure::ExitStatus {
            code: output.exit_code,
            stderr: output.stderr_tail(5),
        },
        Err(e) => TranscodeFailure::Process(e),
    };

    discard_partial_output(&destination);

    Err(ClipError::Transcode {
        path: plan.source.clone(),
        reason: failure,
    })
}

fn discard_partial_output(destination: &Path) {
    match remove_file_if_exists(destination) {
        Ok(true) => info!("已刪除失敗的輸出檔案: {}", destination.display()),
        Ok(false) => {}
        Err(e) => warn!("無法刪除失敗的輸出檔案 {}: {e}", destination.display()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::random_clips::ffmpeg_command::video_filter;
    use crate::tools::{ProcessError, ProcessOutput};
    use std::fs;
    use std::sync::Mutex;
    use tempfile::TempDir;

    /// 依設定回傳結果，並記錄收到的工作
    struct ScriptedEngine {
        success: bool,
        write_output: bool,
        jobs: Mutex<Vec<TranscodeJob>>,
    }

    impl ScriptedEngine {
        fn new(success: bool, write_output: bool) -> Self {
            Self {
                success,
                write_output,
                jobs: Mutex::new(Vec::new()),
            }
        }
    }

    impl MediaEngine for ScriptedEngine {
        fn probe(&self, _source: &Path) -> Result<ProcessOutput, ProcessError> {
            unreachable!()
        }

        fn transcode(&self, job: &TranscodeJob) -> Result<ProcessOutput, ProcessError> {
            self.jobs.lock().unwrap().push(job.clone());
            if self.write_output {
                fs::write(&job.destination, "partial").unwrap();
            }
            Ok(ProcessOutput {
                success: self.success,
                exit_code: Some(if self.success { 0 } else { 1 }),
                stderr: "Error while decoding stream #0:0\nConversion failed!".to_string(),
                ..ProcessOutput::default()
            })
        }

        fn concat(&self, _manifest: &Path, _destination: &Path) -> Result<ProcessOutput, ProcessError> {
            unreachable!()
        }
    }

    fn sample_plan() -> ClipPlan {
        ClipPlan {
            source: PathBuf::from("/input/show.mkv"),
            start_offset_seconds: 90.0,
            clip_duration_seconds: 180.0,
            sequence_index: 5,
        }
    }

    #[test]
    fn test_clip_file_name() {
        assert_eq!(clip_file_name(0), "0.mp4");
        assert_eq!(clip_file_name(12), "12.mp4");
    }

    #[test]
    fn test_transcode_success() {
        let temp_dir = TempDir::new().unwrap();
        let engine = ScriptedEngine::new(true, true);

        let clip = transcode_clip(&engine, &sample_plan(), temp_dir.path(), video_filter(false))
            .unwrap();

        assert_eq!(clip.sequence_index, 5);
        assert_eq!(clip.file_path, temp_dir.path().join("5.mp4"));
        assert_eq!(clip.file_name(), "5.mp4");

        let jobs = engine.jobs.lock().unwrap();
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].source, PathBuf::from("/input/show.mkv"));
        assert!((jobs[0].start_offset_seconds - 90.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_transcode_failure_removes_partial_output() {
        let temp_dir = TempDir::new().unwrap();
        let engine = ScriptedEngine::new(false, true);

        let err = transcode_clip(&engine, &sample_plan(), temp_dir.path(), video_filter(false))
            .unwrap_err();

        match err {
            ClipError::Transcode {
                path,
                reason: TranscodeFailure::ExitStatus { code, stderr },
            } => {
                assert_eq!(path, PathBuf::from("/input/show.mkv"));
                assert_eq!(code, Some(1));
                assert!(stderr.contains("Conversion failed!"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(!temp_dir.path().join("5.mp4").exists());
    }

    #[test]
    fn test_success_without_output_file_is_failure() {
        let temp_dir = TempDir::new().unwrap();
        let engine = ScriptedEngine::new(true, false);

        let err = transcode_clip(&engine, &sample_plan(), temp_dir.path(), video_filter(false))
            .unwrap_err();

        assert!(matches!(
            err,
            ClipError::Transcode {
                reason: TranscodeFailure::MissingOutput(_),
                ..
            }
        ));
    }
}
