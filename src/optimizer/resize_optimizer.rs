//! # Resize Driver
//!
//! Scans for the selected formats, drops files that are already small,
//! then either lists the projected result (dry run) or resizes each file in
//! place through [`ImageResizer`].

use crate::{
    config::{ExtensionSet, ResizeConfig},
    file_manager::{FileManager, ScanOptions},
    optimizer::StopSignal,
    progress::{report, ProgressManager, RunStats},
    resize::{is_below_minimum, ImageResizer, ResizeOutcome},
};
use anyhow::Result;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Batch driver of the `resize-images` tool
pub struct ResizeOptimizer {
    config: ResizeConfig,
    resizer: ImageResizer,
}

impl ResizeOptimizer {
    pub fn new(config: ResizeConfig) -> Self {
        let resizer = ImageResizer::new(&config);
        Self { config, resizer }
    }

    /// Resize (or list, in dry-run mode) every selected image under the root.
    ///
    /// Fails on invalid parameters or a missing root, before any file is read.
    pub async fn run(&self, stop: &mut StopSignal) -> Result<RunStats> {
        self.config.validate()?;
        let root = FileManager::resolve_root(&self.config.root)?;

        self.print_header(&root);
        if self.config.formats.is_empty() {
            warn!(
                "None of the requested formats is supported (supported: {})",
                ExtensionSet::resize_supported()
            );
        }

        let files = FileManager::find_files(&root, &ScanOptions::image_assets(self.config.formats.clone()));
        if files.is_empty() {
            println!("No supported image files found in project.");
            return Ok(RunStats::default());
        }

        let candidates = self.prefilter(files, stop).await;
        if stop.should_stop() {
            println!("{}", report::interrupted());
            return Ok(RunStats::new(candidates.len()));
        }
        if candidates.is_empty() {
            println!("No files meet the size criteria.");
            return Ok(RunStats::default());
        }

        println!("Found {} files to process", candidates.len());
        println!("{}", report::rule(report::RESIZE_RULE_WIDTH));

        if self.config.dry_run {
            if !self.list_plans(&candidates, stop).await {
                println!("{}", report::interrupted());
            }
            return Ok(RunStats::new(candidates.len()));
        }

        let mut stats = RunStats::new(candidates.len());
        let progress = ProgressManager::new(candidates.len() as u64);

        for file in &candidates {
            if stop.should_stop() {
                progress.println(report::interrupted());
                break;
            }

            progress.set_message(&file.display().to_string());
            let outcome = self.resizer.resize_file(file).await;

            let line = match &outcome {
                ResizeOutcome::Resized {
                    original_dims,
                    new_dims,
                    original_size,
                    new_size,
                    backup,
                } => report::resized(
                    file,
                    *original_dims,
                    *new_dims,
                    *original_size,
                    *new_size,
                    backup.as_deref(),
                ),
                ResizeOutcome::Failed { error } => report::resize_failed(file, error),
            };
            progress.println(&line);

            stats.record(outcome.bytes_saved());
            progress.advance();
        }

        progress.finish();
        debug!("Resize run finished: {:?}", stats);

        println!("{}", report::rule(report::RESIZE_RULE_WIDTH));
        println!("{}", stats.resize_summary(self.config.scale_factor));
        info!(
            "Resized {}/{} images, saved {}",
            stats.processed,
            stats.found,
            FileManager::format_signed_size(stats.bytes_saved)
        );

        Ok(stats)
    }

    fn print_header(&self, root: &Path) {
        println!("Scanning directory: {}", root.display());
        println!(
            "Scale factor: {}x ({:.1}x smaller)",
            self.config.scale_factor,
            self.config.reduction_factor()
        );
        println!("Formats: {}", self.config.formats);
        println!("JPEG quality: {}", self.config.jpeg_quality);
        println!("Minimum size: {}px", self.config.min_dimension);
        println!("Keep backups: {}", report::yes_no(self.config.keep_backups));
        if self.config.dry_run {
            println!("DRY RUN - no files will be modified");
        }
        println!("{}", report::rule(report::RESIZE_RULE_WIDTH));
    }

    /// Header-only probe; small and unreadable files drop out untouched.
    /// Stops early on a stop request.
    async fn prefilter(&self, files: Vec<PathBuf>, stop: &mut StopSignal) -> Vec<PathBuf> {
        let mut candidates = Vec::with_capacity(files.len());

        for file in files {
            if stop.should_stop() {
                break;
            }
            match ImageResizer::probe_dimensions(&file).await {
                Ok(dims) if is_below_minimum(dims, self.config.min_dimension) => {
                    println!("{}", report::too_small(&file, dims));
                }
                Ok(_) => candidates.push(file),
                Err(e) => println!("{}", report::unreadable(&file, &e.to_string())),
            }
        }

        candidates
    }

    /// False when a stop request cut the listing short
    async fn list_plans(&self, candidates: &[PathBuf], stop: &mut StopSignal) -> bool {
        for file in candidates {
            if stop.should_stop() {
                return false;
            }
            match self.resizer.plan(file).await {
                Ok(plan) => println!(
                    "{}",
                    report::dry_run(file, plan.original_dims, plan.target_dims, plan.size)
                ),
                Err(e) => println!("{}", report::dry_run_failed(file, &e.to_string())),
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backup::{with_suffix, BACKUP_SUFFIX};
    use crate::test_support::{noise_rgba, write_png};
    use image::DynamicImage;
    use std::fs;
    use tempfile::TempDir;

    fn config(root: &Path) -> ResizeConfig {
        ResizeConfig {
            root: root.to_path_buf(),
            ..Default::default()
        }
    }

    fn noise_png(path: &Path, width: u32, height: u32) {
        write_png(path, &DynamicImage::ImageRgba8(noise_rgba(width, height)));
    }

    #[tokio::test]
    async fn test_invalid_scale_fails_before_scanning() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("a.png");
        noise_png(&path, 120, 120);
        let before = fs::read(&path).unwrap();

        let mut config = config(temp_dir.path());
        config.scale_factor = -1.0;
        let result = ResizeOptimizer::new(config).run(&mut StopSignal::new()).await;

        assert!(result.is_err());
        assert_eq!(fs::read(&path).unwrap(), before);
    }

    #[tokio::test]
    async fn test_dry_run_never_modifies_files() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("background.png");
        noise_png(&path, 300, 210);
        let before = fs::read(&path).unwrap();

        let mut config = config(temp_dir.path());
        config.dry_run = true;
        let stats = ResizeOptimizer::new(config).run(&mut StopSignal::new()).await.unwrap();

        assert_eq!(stats.found, 1);
        assert_eq!(stats.processed, 0);
        assert_eq!(fs::read(&path).unwrap(), before);
        assert!(!with_suffix(&path, BACKUP_SUFFIX).exists());
    }

    #[tokio::test]
    async fn test_small_and_unreadable_files_are_skipped_uncounted() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        let small = root.join("icon.png");
        noise_png(&small, 64, 32);
        let broken = root.join("broken.png");
        fs::write(&broken, b"garbage").unwrap();
        let large = root.join("sheet.png");
        noise_png(&large, 150, 40);

        let small_before = fs::read(&small).unwrap();
        let stats = ResizeOptimizer::new(config(root)).run(&mut StopSignal::new()).await.unwrap();

        assert_eq!(stats.found, 1);
        assert_eq!(stats.processed, 1);
        assert_eq!(fs::read(&small).unwrap(), small_before);
        assert_eq!(fs::read(&broken).unwrap(), b"garbage");
        let resized = image::open(&large).unwrap();
        assert_eq!((resized.width(), resized.height()), (50, 13));
    }

    #[tokio::test]
    async fn test_formats_and_excluded_dirs_limit_the_scan() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        fs::create_dir_all(root.join(".git")).unwrap();
        let tracked = root.join("hero.png");
        noise_png(&tracked, 200, 200);
        let ignored = root.join(".git/hero.png");
        noise_png(&ignored, 200, 200);
        let gif = root.join("anim.gif");
        fs::write(&gif, b"GIF89a").unwrap();
        let ignored_before = fs::read(&ignored).unwrap();
        let gif_before = fs::read(&gif).unwrap();

        let mut config = config(root);
        config.formats = ExtensionSet::resize_supported().intersect(["png"]);
        let stats = ResizeOptimizer::new(config).run(&mut StopSignal::new()).await.unwrap();

        assert_eq!(stats.processed, 1);
        assert_eq!(image::open(&tracked).unwrap().width(), 66);
        assert_eq!(fs::read(&ignored).unwrap(), ignored_before);
        assert_eq!(fs::read(&gif).unwrap(), gif_before);
    }

    #[tokio::test]
    async fn test_stop_requested_leaves_candidates_untouched() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("bg.png");
        noise_png(&path, 200, 200);
        let before = fs::read(&path).unwrap();

        let mut stop = StopSignal::new();
        stop.sender().send(()).unwrap();
        let stats = ResizeOptimizer::new(config(temp_dir.path())).run(&mut stop).await.unwrap();

        // the size pre-filter already honours the stop, so nothing is selected
        assert_eq!(stats, RunStats::default());
        assert_eq!(fs::read(&path).unwrap(), before);
    }

    #[tokio::test]
    async fn test_prefilter_and_dry_run_listing_stop_early() {
        let temp_dir = TempDir::new().unwrap();
        let files: Vec<PathBuf> = ["a.png", "b.png"]
            .iter()
            .map(|name| {
                let path = temp_dir.path().join(name);
                noise_png(&path, 150, 150);
                path
            })
            .collect();
        let optimizer = ResizeOptimizer::new(config(temp_dir.path()));

        let mut running = StopSignal::new();
        assert_eq!(optimizer.prefilter(files.clone(), &mut running).await, files);
        assert!(optimizer.list_plans(&files, &mut running).await);

        let mut stopped = StopSignal::new();
        stopped.sender().send(()).unwrap();
        assert!(optimizer.prefilter(files.clone(), &mut stopped).await.is_empty());
        assert!(!optimizer.list_plans(&files, &mut stopped).await);
    }

    #[tokio::test]
    async fn test_unsupported_formats_select_nothing() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("bg.png");
        noise_png(&path, 200, 200);
        let before = fs::read(&path).unwrap();

        let mut config = config(temp_dir.path());
        config.formats = ExtensionSet::resize_supported().intersect(["psd"]);
        assert!(config.formats.is_empty());
        let stats = ResizeOptimizer::new(config).run(&mut StopSignal::new()).await.unwrap();

        assert_eq!(stats, RunStats::default());
        assert_eq!(fs::read(&path).unwrap(), before);
    }
}
