//! # Configuration Management Module
//!
//! Holds the immutable run configuration of both tools. Each binary parses
//! its arguments once, builds one of these structs, validates it and passes
//! it by reference to the batch driver. Nothing here is mutated afterwards.
//!
//! ## Parameters (resize tool):
//! - `scale_factor`: resampling factor (> 0, default: 1/3)
//! - `jpeg_quality`: JPEG quality (1-100, default: 95)
//! - `min_dimension`: files with both sides below this are skipped (default: 100)
//! - `keep_backups`: leave `<file>.backup` next to each resized file
//! - `dry_run`: only list what would change
//! - `formats`: extension allow-list, intersected with the supported set
//!
//! ## Example:
//! ```rust
//! use asset_optimizer::config::{ExtensionSet, ResizeConfig};
//!
//! let config = ResizeConfig {
//!     scale_factor: 0.5,
//!     formats: ExtensionSet::resize_supported().intersect(["png", "jpg"]),
//!     ..Default::default()
//! };
//! config.validate().unwrap();
//! ```

use crate::error::OptimizeError;
use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};

/// Every extension the resize tool knows how to decode and re-encode.
pub const RESIZE_SUPPORTED_EXTENSIONS: &[&str] =
    &["png", "jpg", "jpeg", "bmp", "tiff", "tif", "webp", "gif"];

/// Extensions selected by default when `--formats` is not given.
pub const RESIZE_DEFAULT_FORMATS: &[&str] = &["png", "jpg", "jpeg", "bmp", "tiff", "webp"];

/// Immutable, lowercase extension allow-list (stored without the leading dot).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtensionSet {
    extensions: BTreeSet<String>,
}

impl ExtensionSet {
    pub fn new<I, S>(extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            extensions: extensions
                .into_iter()
                .map(|ext| normalize_extension(ext.as_ref()))
                .filter(|ext| !ext.is_empty())
                .collect(),
        }
    }

    /// PNG only, used by the compression tool
    pub fn png_only() -> Self {
        Self::new(["png"])
    }

    /// Full set of formats the resize tool can process
    pub fn resize_supported() -> Self {
        Self::new(RESIZE_SUPPORTED_EXTENSIONS)
    }

    /// Keep only the extensions that also appear in `requested`.
    pub fn intersect<I, S>(&self, requested: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let requested = Self::new(requested);
        Self {
            extensions: self
                .extensions
                .intersection(&requested.extensions)
                .cloned()
                .collect(),
        }
    }

    pub fn contains(&self, extension: &str) -> bool {
        self.extensions.contains(&normalize_extension(extension))
    }

    /// Case-insensitive match on the path's extension
    pub fn matches(&self, path: &Path) -> bool {
        path.extension()
            .map(|ext| self.contains(&ext.to_string_lossy()))
            .unwrap_or(false)
    }

    /// True when no extension is selected, e.g. `--formats` named only unsupported ones
    pub fn is_empty(&self) -> bool {
        self.extensions.is_empty()
    }
}

impl fmt::Display for ExtensionSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let dotted: Vec<String> = self.extensions.iter().map(|ext| format!(".{}", ext)).collect();
        write!(f, "{}", dotted.join(", "))
    }
}

fn normalize_extension(extension: &str) -> String {
    extension.trim().trim_start_matches('.').to_lowercase()
}

/// Configuration for the lossless PNG compression tool
#[derive(Debug, Clone)]
pub struct CompressConfig {
    /// Root directory to scan
    pub root: PathBuf,
    /// Resolved `pngquant` executable (None disables that strategy)
    pub pngquant: Option<PathBuf>,
}

impl Default for CompressConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            pngquant: None,
        }
    }
}

/// Configuration for the downscaling tool
#[derive(Debug, Clone)]
pub struct ResizeConfig {
    /// Root directory to scan
    pub root: PathBuf,
    /// Resampling factor applied to both axes
    pub scale_factor: f64,
    /// JPEG quality (1-100)
    pub jpeg_quality: u8,
    /// Skip files whose width and height are both below this (px)
    pub min_dimension: u32,
    /// Leave `<file>.backup` in place after a successful resize
    pub keep_backups: bool,
    /// List projected changes without writing anything
    pub dry_run: bool,
    /// Extensions to scan for
    pub formats: ExtensionSet,
}

impl Default for ResizeConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            scale_factor: 1.0 / 3.0,
            jpeg_quality: 95,
            min_dimension: 100,
            keep_backups: false,
            dry_run: false,
            formats: ExtensionSet::resize_supported().intersect(RESIZE_DEFAULT_FORMATS),
        }
    }
}

impl ResizeConfig {
    /// Validate configuration parameters
    pub fn validate(&self) -> Result<(), OptimizeError> {
        if !self.scale_factor.is_finite() || self.scale_factor <= 0.0 {
            return Err(OptimizeError::Validation(format!(
                "scale factor must be a positive number, got {}",
                self.scale_factor
            )));
        }

        if self.jpeg_quality == 0 || self.jpeg_quality > 100 {
            return Err(OptimizeError::Validation(format!(
                "JPEG quality must be between 1 and 100, got {}",
                self.jpeg_quality
            )));
        }

        Ok(())
    }

    /// How many times smaller each axis gets, for the run header
    pub fn reduction_factor(&self) -> f64 {
        1.0 / self.scale_factor
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resize_config_default() {
        let config = ResizeConfig::default();
        assert!((config.scale_factor - 1.0 / 3.0).abs() < f64::EPSILON);
        assert_eq!(config.jpeg_quality, 95);
        assert_eq!(config.min_dimension, 100);
        assert!(!config.keep_backups);
        assert!(!config.dry_run);
        assert!(config.formats.contains("jpeg"));
        // tif and gif are supported but not selected by default
        assert!(!config.formats.contains("tif"));
        assert!(!config.formats.contains("gif"));
    }

    #[test]
    fn test_resize_config_validation() {
        let mut config = ResizeConfig::default();
        assert!(config.validate().is_ok());

        config.scale_factor = 0.0;
        assert!(config.validate().is_err());

        config.scale_factor = f64::NAN;
        assert!(config.validate().is_err());

        config.scale_factor = 2.0;
        config.jpeg_quality = 0;
        assert!(config.validate().is_err());

        config.jpeg_quality = 101;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_extension_set_intersection_ignores_unknown() {
        let set = ExtensionSet::resize_supported().intersect(["PNG", ".jpg", "psd"]);
        assert_eq!(set, ExtensionSet::new(["png", "jpg"]));
        assert!(set.contains("png"));
        assert!(set.contains("JPG"));
        assert!(!set.contains("psd"));
    }

    #[test]
    fn test_extension_set_unsupported_only_is_empty() {
        assert!(ExtensionSet::resize_supported().intersect(["psd", "xcf"]).is_empty());
        assert!(!ExtensionSet::png_only().is_empty());
    }

    #[test]
    fn test_extension_set_matches_path_case_insensitive() {
        let set = ExtensionSet::png_only();
        assert!(set.matches(Path::new("assets/Logo.PNG")));
        assert!(!set.matches(Path::new("assets/logo.png.backup")));
        assert!(!set.matches(Path::new("assets/README")));
    }

    #[test]
    fn test_extension_set_display_is_sorted() {
        let set = ExtensionSet::new(["webp", "png", "bmp"]);
        assert_eq!(set.to_string(), ".bmp, .png, .webp");
    }
}
