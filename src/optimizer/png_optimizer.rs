//! # PNG Compression Driver
//!
//! Walks the root, runs every PNG through [`ImageProcessor::compress_png`]
//! one at a time and prints the per-file report and the run summary.

use crate::{
    config::CompressConfig,
    file_manager::{FileManager, ScanOptions},
    image_processor::{CompressOutcome, ImageProcessor},
    optimizer::StopSignal,
    progress::{report, ProgressManager, RunStats},
};
use anyhow::Result;
use tracing::{debug, info};

/// Batch driver of the `compress-png` tool
pub struct PngOptimizer {
    config: CompressConfig,
    processor: ImageProcessor,
}

impl PngOptimizer {
    pub fn new(config: CompressConfig) -> Self {
        let processor = ImageProcessor::new(config.pngquant.clone());
        Self { config, processor }
    }

    /// Compress every PNG under the configured root.
    ///
    /// Fails only when the root is not a directory; per-file problems are
    /// reported and counted.
    pub async fn run(&self, stop: &mut StopSignal) -> Result<RunStats> {
        let root = FileManager::resolve_root(&self.config.root)?;

        println!("Scanning directory: {}", root.display());
        println!("pngquant available: {}", report::yes_no(self.processor.has_pngquant()));
        println!("{}", report::rule(report::COMPRESS_RULE_WIDTH));

        let files = FileManager::find_files(&root, &ScanOptions::png_assets());
        if files.is_empty() {
            println!("No PNG files found in project.");
            return Ok(RunStats::default());
        }

        println!("Found {} PNG files", files.len());
        println!("{}", report::rule(report::COMPRESS_RULE_WIDTH));

        let mut stats = RunStats::new(files.len());
        let progress = ProgressManager::new(files.len() as u64);

        for file in &files {
            if stop.should_stop() {
                progress.println(report::interrupted());
                break;
            }

            progress.set_message(&file.display().to_string());
            let outcome = self.processor.compress_png(file).await;

            let line = match &outcome {
                CompressOutcome::Improved {
                    original_size,
                    final_size,
                    method,
                } => report::compressed(file, *original_size, *final_size, method),
                CompressOutcome::NoImprovement { .. } => report::no_improvement(file),
                CompressOutcome::Failed { error } => report::compress_failed(file, error),
            };
            progress.println(&line);

            stats.record(outcome.bytes_saved() as i64);
            progress.advance();
        }

        progress.finish();
        debug!("Compression run finished: {:?}", stats);

        println!("{}", report::rule(report::COMPRESS_RULE_WIDTH));
        println!("{}", stats.compress_summary());
        info!(
            "Compressed {}/{} PNG files, saved {}",
            stats.processed,
            stats.found,
            FileManager::format_signed_size(stats.bytes_saved)
        );

        Ok(stats)
    }
}
