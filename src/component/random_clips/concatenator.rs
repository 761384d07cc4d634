use super::concat_manifest::read_entries;
use super::error::{ClipError, ConcatFailure};
use super::media_engine::MediaEngine;
use log::info;
use std::path::Path;

/// 依清單以 stream copy 合併成最終輸出
///
/// 清單不存在或是空的就不呼叫 ffmpeg
pub fn concatenate(
    engine: &dyn MediaEngine,
    manifest_path: &Path,
    output_path: &Path,
) -> Result<(), ClipError> {
    let fail = |reason| ClipError::Concat { reason };

    if !manifest_path.is_file() {
        return Err(fail(ConcatFailure::MissingManifest(
            manifest_path.to_path_buf(),
        )));
    }

    let entries = read_entries(manifest_path).map_err(|e| fail(ConcatFailure::Read(e)))?;
    if entries.is_empty() {
        return Err(fail(ConcatFailure::EmptyManifest));
    }

    info!(
        "合併 {} 個片段 -> {}",
        entries.len(),
        output_path.display()
    );

    let output = engine
        .concat(manifest_path, output_path)
        .map_err(|e| fail(ConcatFailure::Process(e)))?;

    if !output.success {
        return Err(fail(ConcatFailure::ExitStatus {
            code: output.exit_code,
            stderr: output.stderr_tail(5),
        }));
    }

    if !output_path.exists() {
        return Err(fail(ConcatFailure::MissingOutput(output_path.to_path_buf())));
    }

    info!("合併完成: {}", output_path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::random_clips::ffmpeg_command::TranscodeJob;
    use crate::tools::{ProcessError, ProcessOutput};
    use std::fs;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::TempDir;

    struct ConcatOnlyEngine {
        success: bool,
        calls: AtomicUsize,
    }

    impl ConcatOnlyEngine {
        fn new(success: bool) -> Self {
            Self {
                success,
                calls: AtomicUsize::new(0),
            }
        }
    }

    impl MediaEngine for ConcatOnlyEngine {
        fn probe(&self, _source: &Path) -> Result<ProcessOutput, ProcessError> {
            unreachable!()
        }

        fn transcode(&self, _job: &TranscodeJob) -> Result<ProcessOutput, ProcessError> {
            unreachable!()
        }

        fn concat(&self, _manifest: &Path, destination: &Path) -> Result<ProcessOutput, ProcessError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.success {
                fs::write(destination, "merged").unwrap();
            }
            Ok(ProcessOutput {
                success: self.success,
                exit_code: Some(if self.success { 0 } else { 1 }),
                stderr: "concat.txt: Invalid data found when processing input".to_string(),
                ..ProcessOutput::default()
            })
        }
    }

    #[test]
    fn test_missing_manifest() {
        let temp_dir = TempDir::new().unwrap();
        let engine = ConcatOnlyEngine::new(true);
        let err = concatenate(
            &engine,
            &temp_dir.path().join("concat.txt"),
            &temp_dir.path().join("output.mp4"),
        )
        .unwrap_err();

        assert!(matches!(
            err,
            ClipError::Concat {
                reason: ConcatFailure::MissingManifest(_)
            }
        ));
        assert_eq!(engine.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_empty_manifest_does_not_invoke_engine() {
        let temp_dir = TempDir::new().unwrap();
        let manifest = temp_dir.path().join("concat.txt");
        fs::write(&manifest, "").unwrap();
        let engine = ConcatOnlyEngine::new(true);

        let err = concatenate(&engine, &manifest, &temp_dir.path().join("output.mp4")).unwrap_err();

        assert!(matches!(
            err,
            ClipError::Concat {
                reason: ConcatFailure::EmptyManifest
            }
        ));
        assert_eq!(engine.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_engine_failure_is_concat_error() {
        let temp_dir = TempDir::new().unwrap();
        let manifest = temp_dir.path().join("concat.txt");
        fs::write(&manifest, "file 0.mp4\n").unwrap();
        let engine = ConcatOnlyEngine::new(false);

        let err = concatenate(&engine, &manifest, &temp_dir.path().join("output.mp4")).unwrap_err();

        match err {
            ClipError::Concat {
                reason: ConcatFailure::ExitStatus { code, stderr },
            } => {
                assert_eq!(code, Some(1));
                assert!(stderr.contains("Invalid data"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_successful_concat() {
        let temp_dir = TempDir::new().unwrap();
        let manifest = temp_dir.path().join("concat.txt");
        let output = temp_dir.path().join("output.mp4");
        fs::write(&manifest, "file 0.mp4\nfile 1.mp4\n").unwrap();
        let engine = ConcatOnlyEngine::new(true);

        concatenate(&engine, &manifest, &output).unwrap();

        assert!(output.exists());
        assert_eq!(engine.calls.load(Ordering::SeqCst), 1);
    }
}
