use super::batch_summary::{BatchSummary, FailedSource, SkippedSource, SourceOutcome};
use super::clip_sampler::{SampleDecision, plan_clip};
use super::clip_transcoder::transcode_clip;
use super::concat_manifest::{ConcatManifest, OutcomeSequencer};
use super::concatenator::concatenate;
use super::error::ClipError;
use super::ffmpeg_command::video_filter;
use super::media_engine::MediaEngine;
use super::media_prober::probe_duration;
use crate::config::Config;
use crate::tools::{
    remove_file_if_exists, reset_directory, scan_video_files, validate_directory_exists,
};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rayon::ThreadPoolBuilder;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;

/// 一次執行的結果
#[derive(Debug)]
pub struct RunReport {
    pub summary: BatchSummary,
    pub output_path: PathBuf,
    pub manifest_path: PathBuf,
}

/// 洗牌後的一個待處理來源
#[derive(Debug, Clone)]
struct SourceJob {
    sequence_index: usize,
    source: PathBuf,
    seed: u64,
}

pub struct RandomClips {
    config: Config,
    engine: Arc<dyn MediaEngine>,
    shutdown_signal: Arc<AtomicBool>,
    console_output: bool,
}

impl RandomClips {
    pub fn new(
        config: Config,
        engine: Arc<dyn MediaEngine>,
        shutdown_signal: Arc<AtomicBool>,
    ) -> Self {
        Self {
            config,
            engine,
            shutdown_signal,
            console_output: true,
        }
    }

    /// 關閉進度條與終端摘要，只留日誌
    #[must_use]
    pub fn quiet(mut self) -> Self {
        self.console_output = false;
        self
    }

    /// 執行整個流程：重設工作資料夾、探索、洗牌、逐一擷取、合併
    pub fn run<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<RunReport, ClipError> {
        if self.console_output {
            println!("{}", style("=== 隨機片段合輯 ===").cyan().bold());
        }

        let work_dir = self.config.work_dir();
        let manifest_path = self.config.manifest_path();
        let output_path = self.config.output_path();

        self.prepare_workspace(&work_dir, &output_path)?;

        let mut sources = self.discover()?;
        sources.shuffle(rng);

        // 每個來源各自的種子先從同一個亂數源取出，平行與否結果都相同
        let jobs: Vec<SourceJob> = sources
            .into_iter()
            .enumerate()
            .map(|(sequence_index, source)| SourceJob {
                sequence_index,
                source,
                seed: rng.next_u64(),
            })
            .collect();

        for job in &jobs {
            debug!("順序 {}: {}", job.sequence_index, job.source.display());
        }
        info!("已洗牌 {} 個來源", jobs.len());

        let mut manifest = ConcatManifest::create(&manifest_path).map_err(|source| {
            ClipError::Manifest {
                path: manifest_path.clone(),
                source,
            }
        })?;

        let summary = self.process_sources(&jobs, &mut manifest)?;
        self.print_summary(&summary);

        if self.shutdown_signal.load(Ordering::SeqCst) {
            warn!("收到中斷信號，略過合併");
            return Err(ClipError::Interrupted);
        }

        concatenate(self.engine.as_ref(), manifest.path(), &output_path)?;

        if self.console_output {
            println!(
                "{}",
                style(format!("輸出完成: {}", output_path.display())).green()
            );
        }

        Ok(RunReport {
            summary,
            output_path,
            manifest_path,
        })
    }

    /// 清空工作資料夾並刪除上一次的輸出檔
    fn prepare_workspace(&self, work_dir: &Path, output_path: &Path) -> Result<(), ClipError> {
        reset_directory(work_dir).map_err(|source| ClipError::WorkDir {
            path: work_dir.to_path_buf(),
            source,
        })?;

        if remove_file_if_exists(output_path).map_err(|source| ClipError::WorkDir {
            path: output_path.to_path_buf(),
            source,
        })? {
            info!("已刪除舊的輸出檔案: {}", output_path.display());
        }

        Ok(())
    }

    fn discover(&self) -> Result<Vec<PathBuf>, ClipError> {
        let input_dir = self.config.input_dir();
        let discovery_error = |e: anyhow::Error| ClipError::Discovery {
            path: input_dir.clone(),
            reason: format!("{e:#}"),
        };

        validate_directory_exists(&input_dir).map_err(discovery_error)?;

        if self.console_output {
            println!("{}", style("掃描影片檔案中...").dim());
        }
        let sources = scan_video_files(&input_dir, &self.config.file_type_table)
            .map_err(discovery_error)?;

        info!("找到 {} 個影片檔案: {}", sources.len(), input_dir.display());
        Ok(sources)
    }

    fn process_sources(
        &self,
        jobs: &[SourceJob],
        manifest: &mut ConcatManifest,
    ) -> Result<BatchSummary, ClipError> {
        let progress_bar = self.create_progress_bar(jobs.len());
        let mut summary = BatchSummary::default();

        let workers = self.config.workers().min(jobs.len().max(1));
        let result = if workers > 1 {
            self.process_parallel(jobs, workers, manifest, &mut summary, &progress_bar)
        } else {
            self.process_sequential(jobs, manifest, &mut summary, &progress_bar)
        };

        if self.shutdown_signal.load(Ordering::SeqCst) {
            progress_bar.abandon_with_message("操作已中斷");
        } else {
            progress_bar.finish_with_message("處理完成");
        }

        result.map(|()| summary)
    }

    fn process_sequential(
        &self,
        jobs: &[SourceJob],
        manifest: &mut ConcatManifest,
        summary: &mut BatchSummary,
        progress_bar: &ProgressBar,
    ) -> Result<(), ClipError> {
        for job in jobs {
            let Some(outcome) = self.process_source(job) else {
                break;
            };
            self.handle_outcome(outcome, manifest, summary, progress_bar)?;
        }
        Ok(())
    }

    /// 平行轉檔，結果經由 channel 回到目前執行緒，再依順序寫入清單
    fn process_parallel(
        &self,
        jobs: &[SourceJob],
        workers: usize,
        manifest: &mut ConcatManifest,
        summary: &mut BatchSummary,
        progress_bar: &ProgressBar,
    ) -> Result<(), ClipError> {
        let pool = match ThreadPoolBuilder::new().num_threads(workers).build() {
            Ok(pool) => pool,
            Err(e) => {
                warn!("無法建立執行緒池，改為依序處理: {e}");
                return self.process_sequential(jobs, manifest, summary, progress_bar);
            }
        };

        info!("以 {workers} 個執行緒平行轉檔");

        let abort = AtomicBool::new(false);
        let (tx, rx) = mpsc::channel::<SourceOutcome>();

        pool.in_place_scope(|scope| {
            for job in jobs {
                let tx = tx.clone();
                let abort = &abort;
                scope.spawn(move |_| {
                    if abort.load(Ordering::SeqCst) {
                        return;
                    }
                    if let Some(outcome) = self.process_source(job) {
                        let _ = tx.send(outcome);
                    }
                });
            }
            drop(tx);

            let mut sequencer = OutcomeSequencer::new();
            for outcome in rx {
                for ready in sequencer.accept(outcome) {
                    if let Err(e) = self.handle_outcome(ready, manifest, summary, progress_bar) {
                        abort.store(true, Ordering::SeqCst);
                        return Err(e);
                    }
                }
            }

            // 中斷時可能有來源沒有結果，其餘結果仍依順序寫入
            for ready in sequencer.drain_remaining() {
                self.handle_outcome(ready, manifest, summary, progress_bar)?;
            }
            Ok(())
        })
    }

    /// 處理單一來源，收到中斷信號時回傳 `None`
    fn process_source(&self, job: &SourceJob) -> Option<SourceOutcome> {
        if self.shutdown_signal.load(Ordering::SeqCst) {
            return None;
        }

        let source = job.source.as_path();
        let failed = |error: ClipError| {
            SourceOutcome::Failed(FailedSource {
                sequence_index: job.sequence_index,
                source: job.source.clone(),
                error,
            })
        };

        let duration = match probe_duration(self.engine.as_ref(), source) {
            Ok(duration) => duration,
            Err(e) => return Some(failed(e)),
        };

        let mut rng = StdRng::seed_from_u64(job.seed);
        let plan = match plan_clip(source, duration, job.sequence_index, &mut rng) {
            SampleDecision::Plan(plan) => plan,
            SampleDecision::Skip { duration } => {
                return Some(SourceOutcome::Skipped(SkippedSource {
                    sequence_index: job.sequence_index,
                    source: job.source.clone(),
                    duration,
                }));
            }
        };

        let filter = video_filter(self.should_crop(source));
        let work_dir = self.config.work_dir();

        Some(
            match transcode_clip(self.engine.as_ref(), &plan, &work_dir, filter) {
                Ok(clip) => SourceOutcome::Produced(clip),
                Err(e) => failed(e),
            },
        )
    }

    /// 啟用 4:3 裁切時，只有比 4:3 寬的來源才裁切
    fn should_crop(&self, source: &Path) -> bool {
        if !self.config.settings.crop_to_four_thirds {
            return false;
        }

        match self.engine.probe_dimensions(source) {
            Ok(dimensions) => dimensions.is_wider_than_four_thirds(),
            Err(e) => {
                warn!("無法取得影片尺寸，不裁切 {}: {e:#}", source.display());
                false
            }
        }
    }

    fn handle_outcome(
        &self,
        outcome: SourceOutcome,
        manifest: &mut ConcatManifest,
        summary: &mut BatchSummary,
        progress_bar: &ProgressBar,
    ) -> Result<(), ClipError> {
        match &outcome {
            SourceOutcome::Produced(clip) => {
                manifest
                    .append(clip)
                    .map_err(|source| ClipError::Manifest {
                        path: manifest.path().to_path_buf(),
                        source,
                    })?;
                info!("片段完成 [{}]: {}", clip.sequence_index, clip.file_name());
            }
            SourceOutcome::Skipped(skipped) => {
                info!(
                    "略過過短的影片 ({:.0}s): {}",
                    skipped.duration,
                    skipped.source.display()
                );
            }
            SourceOutcome::Failed(failed) => {
                warn!("{}", failed.error);
            }
        }

        summary.record(outcome);
        progress_bar.inc(1);
        Ok(())
    }

    fn create_progress_bar(&self, len: usize) -> ProgressBar {
        if !self.console_output {
            return ProgressBar::hidden();
        }

        let progress_bar = ProgressBar::new(len as u64);
        progress_bar.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}")
                .expect("Invalid progress bar template")
                .progress_chars("#>-"),
        );
        progress_bar.set_message("擷取片段中...");
        progress_bar
    }

    fn print_summary(&self, summary: &BatchSummary) {
        let succeeded = summary.succeeded.len();
        let skipped = summary.skipped.len();
        let failed = summary.failed.len();

        info!("片段處理完成 - 成功: {succeeded}, 略過: {skipped}, 失敗: {failed}");

        if !self.console_output {
            return;
        }

        println!();
        println!("{}", style("=== 片段處理摘要 ===").cyan().bold());
        println!("  總計: {} 個檔案", summary.total());
        println!("  成功: {} 個", style(succeeded).green());
        if skipped > 0 {
            println!("  略過: {} 個（長度不足）", style(skipped).yellow());
        }
        if failed > 0 {
            println!("  失敗: {} 個", style(failed).red());
            for entry in &summary.failed {
                println!("    {}", style(entry.source.display()).dim());
            }
        }
    }
}
