//! # File Management Module
//!
//! Discovery of candidate assets and small size helpers shared by both tools.
//!
//! ## Responsibilities:
//! - Recursive walk of a root directory with `walkdir`
//! - Pruning of well-known non-asset directories (VCS, dependencies, caches, editors)
//! - Case-insensitive extension filtering through an [`ExtensionSet`]
//! - Human readable sizes (`B`, `KB`, `MB`, 1024-based, one decimal)
//!
//! ## Example:
//! ```rust,no_run
//! use asset_optimizer::file_manager::{FileManager, ScanOptions};
//!
//! let files = FileManager::find_files("assets".as_ref(), &ScanOptions::png_assets());
//! println!("{} PNG files", files.len());
//! ```

use crate::config::ExtensionSet;
use crate::error::OptimizeError;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::{DirEntry, WalkDir};

/// Directories never descended into by the PNG compressor (hidden ones are skipped too)
pub const PNG_EXCLUDED_DIRS: &[&str] = &["node_modules", "venv", "__pycache__"];

/// Directories never descended into by the resizer
pub const RESIZE_EXCLUDED_DIRS: &[&str] =
    &[".git", "node_modules", "venv", "__pycache__", ".vscode", ".idea"];

/// What to look for and where not to look
#[derive(Debug, Clone)]
pub struct ScanOptions {
    pub extensions: ExtensionSet,
    pub excluded_dirs: &'static [&'static str],
    /// Skip every directory whose name starts with `.`
    pub skip_hidden_dirs: bool,
}

impl ScanOptions {
    /// PNG files, skipping hidden and dependency directories
    pub fn png_assets() -> Self {
        Self {
            extensions: ExtensionSet::png_only(),
            excluded_dirs: PNG_EXCLUDED_DIRS,
            skip_hidden_dirs: true,
        }
    }

    /// Any of `extensions`, skipping VCS, dependency and editor directories
    pub fn image_assets(extensions: ExtensionSet) -> Self {
        Self {
            extensions,
            excluded_dirs: RESIZE_EXCLUDED_DIRS,
            skip_hidden_dirs: false,
        }
    }

    fn is_excluded_dir(&self, entry: &DirEntry) -> bool {
        // The root is always walked, even when called as "." or ".assets"
        if entry.depth() == 0 || !entry.file_type().is_dir() {
            return false;
        }

        let name = entry.file_name().to_string_lossy();
        (self.skip_hidden_dirs && name.starts_with('.'))
            || self.excluded_dirs.iter().any(|excluded| *excluded == name)
    }
}

/// Manages file discovery and size bookkeeping
pub struct FileManager;

impl FileManager {
    /// Absolute form of `root`, or `MissingDirectory` when it is not a directory
    pub fn resolve_root(root: &Path) -> Result<PathBuf, OptimizeError> {
        if !root.is_dir() {
            return Err(OptimizeError::MissingDirectory(root.to_path_buf()));
        }
        Ok(root.canonicalize()?)
    }

    /// Find every file under `root` matching the scan options.
    ///
    /// Entries are visited in file-name order so repeated runs see the same
    /// sequence. Unreadable entries are logged and skipped.
    pub fn find_files(root: &Path, options: &ScanOptions) -> Vec<PathBuf> {
        let mut files = Vec::new();

        let walker = WalkDir::new(root)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| !options.is_excluded_dir(entry));

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    debug!("Skipping unreadable entry: {}", e);
                    continue;
                }
            };

            // path().is_file() follows symlinks, so linked files are listed too
            if entry.path().is_file() && options.extensions.matches(entry.path()) {
                files.push(entry.into_path());
            }
        }

        files
    }

    /// Size of a file in bytes
    pub async fn file_size(path: &Path) -> std::io::Result<u64> {
        Ok(tokio::fs::metadata(path).await?.len())
    }

    /// Human readable size: bytes below 1 KB, otherwise KB/MB with one decimal
    pub fn format_size(size: u64) -> String {
        Self::format_size_f64(size as f64)
    }

    /// Same thresholds as [`FileManager::format_size`], for averages
    pub fn format_size_f64(size: f64) -> String {
        const KB: f64 = 1024.0;
        const MB: f64 = 1024.0 * 1024.0;

        if size < KB {
            if size.fract() == 0.0 {
                format!("{} B", size as u64)
            } else {
                format!("{:.1} B", size)
            }
        } else if size < MB {
            format!("{:.1} KB", size / KB)
        } else {
            format!("{:.1} MB", size / MB)
        }
    }

    /// Signed variant for savings that can be negative (a resize that grew the file)
    pub fn format_signed_size(size: i64) -> String {
        if size < 0 {
            format!("-{}", Self::format_size(size.unsigned_abs()))
        } else {
            Self::format_size(size as u64)
        }
    }

    /// Calculate percentage reduction (negative when the file grew)
    pub fn calculate_reduction(original_size: u64, new_size: u64) -> f64 {
        if original_size == 0 {
            0.0
        } else {
            ((original_size as f64 - new_size as f64) / original_size as f64) * 100.0
        }
    }
}
