//! # Progress Tracking and Reporting Module
//!
//! Run-level accumulator, report line formatting and the `indicatif` bar
//! the report lines are printed through.
//!
//! ## Components:
//! - `ProgressManager`: batch progress bar; every report line goes through
//!   [`ProgressManager::println`] so it never interleaves with the bar
//! - `RunStats`: candidates found, files processed, bytes saved
//! - `report`: one formatter per kind of report line
//!
//! ## Visual feedback:
//! ```text
//! ✓ assets/ui/button.png
//!   12.4 KB → 9.1 KB (-26.6%) [pngquant]
//! ⠋ [00:00:03] [=========>------------------------------] 12/48 assets/ui/icon.png
//! ```

use crate::file_manager::FileManager;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Manages the batch progress bar
#[derive(Clone)]
pub struct ProgressManager {
    bar: ProgressBar,
}

impl ProgressManager {
    /// Progress bar over `total_files` files, drawn on stderr when it is a terminal
    pub fn new(total_files: u64) -> Self {
        let bar = ProgressBar::new(total_files);

        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=>-");
        bar.set_style(style);
        bar.enable_steady_tick(Duration::from_millis(100));

        Self { bar }
    }

    /// Never draws; report lines are still printed
    pub fn hidden() -> Self {
        Self {
            bar: ProgressBar::hidden(),
        }
    }

    /// Show which file is being worked on
    pub fn set_message(&self, message: &str) {
        self.bar.set_message(message.to_string());
    }

    /// One file done
    pub fn advance(&self) {
        self.bar.inc(1);
    }

    /// Print a report line to stdout without tearing the bar
    pub fn println(&self, line: &str) {
        self.bar.suspend(|| println!("{}", line));
    }

    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

/// Statistics accumulated over one batch
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunStats {
    /// Candidates selected for processing
    pub found: usize,
    /// Files attempted, failures included
    pub processed: usize,
    /// Net bytes saved (negative if resizing grew the files)
    pub bytes_saved: i64,
}

impl RunStats {
    pub fn new(found: usize) -> Self {
        Self {
            found,
            ..Default::default()
        }
    }

    pub fn record(&mut self, bytes_saved: i64) {
        self.processed += 1;
        self.bytes_saved += bytes_saved;
    }

    /// Integer average per processed file, when anything was saved
    pub fn average_saved(&self) -> Option<u64> {
        if self.bytes_saved > 0 && self.processed > 0 {
            Some(self.bytes_saved as u64 / self.processed as u64)
        } else {
            None
        }
    }

    /// Fractional average per processed file, when anything was saved
    pub fn average_saved_f64(&self) -> Option<f64> {
        if self.bytes_saved > 0 && self.processed > 0 {
            Some(self.bytes_saved as f64 / self.processed as f64)
        } else {
            None
        }
    }

    /// Closing block of the compression tool
    pub fn compress_summary(&self) -> String {
        let mut lines = self.common_summary();
        if let Some(average) = self.average_saved() {
            lines.push(format!(
                "Average compression: {} per file",
                FileManager::format_size(average)
            ));
        }
        lines.join("\n")
    }

    /// Closing block of the resize tool
    pub fn resize_summary(&self, scale_factor: f64) -> String {
        let mut lines = self.common_summary();
        if let Some(average) = self.average_saved_f64() {
            lines.push(format!(
                "Average savings: {} per file",
                FileManager::format_size_f64(average)
            ));

            if scale_factor <= 0.5 {
                lines.push(String::new());
                lines.push("🎮 Runtime impact:".to_string());
                lines.push("   • Faster texture loading".to_string());
                lines.push("   • Lower VRAM usage".to_string());
                lines.push("   • Better performance on low-end hardware".to_string());
            }
        }
        lines.join("\n")
    }

    fn common_summary(&self) -> Vec<String> {
        vec![
            format!("Processed: {}/{} files", self.processed, self.found),
            format!(
                "Total savings: {}",
                FileManager::format_signed_size(self.bytes_saved)
            ),
        ]
    }
}

/// Report line formatters
pub mod report {
    use crate::file_manager::FileManager;
    use std::path::Path;

    pub const COMPRESS_RULE_WIDTH: usize = 60;
    pub const RESIZE_RULE_WIDTH: usize = 70;

    pub fn rule(width: usize) -> String {
        "-".repeat(width)
    }

    pub fn yes_no(flag: bool) -> &'static str {
        if flag {
            "Yes"
        } else {
            "No"
        }
    }

    pub fn interrupted() -> &'static str {
        "\nInterrupted by user."
    }

    pub fn compressed(path: &Path, original_size: u64, final_size: u64, method: &str) -> String {
        format!(
            "✓ {}\n  {} → {} (-{:.1}%) [{}]",
            path.display(),
            FileManager::format_size(original_size),
            FileManager::format_size(final_size),
            FileManager::calculate_reduction(original_size, final_size),
            method
        )
    }

    pub fn no_improvement(path: &Path) -> String {
        format!("- {} (no improvement)", path.display())
    }

    pub fn compress_failed(path: &Path, error: &str) -> String {
        format!("✗ Error compressing {}: {}", path.display(), error)
    }

    pub fn resized(
        path: &Path,
        (original_width, original_height): (u32, u32),
        (new_width, new_height): (u32, u32),
        original_size: u64,
        new_size: u64,
        backup: Option<&Path>,
    ) -> String {
        // signed change, so a file that grew reads +x.x%
        let change = -FileManager::calculate_reduction(original_size, new_size);
        let mut text = format!(
            "✓ {}\n  Dimensions: {}x{} → {}x{}\n  Size: {} → {} ({:+.1}%)",
            path.display(),
            original_width,
            original_height,
            new_width,
            new_height,
            FileManager::format_size(original_size),
            FileManager::format_size(new_size),
            change
        );
        if let Some(backup) = backup {
            text.push_str(&format!("\n  Backup: {}", backup.display()));
        }
        text
    }

    pub fn resize_failed(path: &Path, error: &str) -> String {
        format!("✗ Error processing {}: {}", path.display(), error)
    }

    pub fn too_small(path: &Path, (width, height): (u32, u32)) -> String {
        format!("⏭ Skipped {} (too small: {}x{})", path.display(), width, height)
    }

    pub fn unreadable(path: &Path, error: &str) -> String {
        format!("⚠ Cannot read {}: {}", path.display(), error)
    }

    pub fn dry_run(path: &Path, (width, height): (u32, u32), (new_width, new_height): (u32, u32), size: u64) -> String {
        format!(
            "🔍 {}\n   {}x{} → {}x{} ({})",
            path.display(),
            width,
            height,
            new_width,
            new_height,
            FileManager::format_size(size)
        )
    }

    pub fn dry_run_failed(path: &Path, error: &str) -> String {
        format!("⚠ {}: {}", path.display(), error)
    }
}
