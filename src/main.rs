use anyhow::{Context, Result};
use log::info;
use rand::SeedableRng;
use rand::rngs::StdRng;
use random_clips::component::RandomClips;
use random_clips::component::random_clips::FfmpegEngine;
use random_clips::config::Config;
use random_clips::init;
use random_clips::signal::setup_shutdown_signal;
use std::env;
use std::sync::Arc;

fn main() -> Result<()> {
    init::init();
    let shutdown_signal = setup_shutdown_signal()?;

    let root = env::current_dir().context("無法取得目前工作目錄")?;
    let config = Config::load(&root)?;

    let engine = Arc::new(FfmpegEngine::from_config(
        &config,
        Arc::clone(&shutdown_signal),
    ));
    let random_clips = RandomClips::new(config, engine, shutdown_signal);

    let mut rng = StdRng::from_entropy();
    match random_clips.run(&mut rng) {
        Ok(report) => {
            info!(
                "完成，共 {} 個片段: {}",
                report.summary.succeeded.len(),
                report.output_path.display()
            );
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}
