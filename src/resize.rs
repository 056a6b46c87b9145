//! # Image Resize Module
//!
//! In-place downscaling of image assets with the `image` crate.
//!
//! ## Pipeline per file
//! 1. back up to `<file>.backup`
//! 2. decode the backup, compute `max(8, floor(side * scale))` for each side
//! 3. resample: Lanczos3 when shrinking, Catmull-Rom (bicubic) otherwise
//! 4. re-encode by extension into `<file>.temp`
//!    - JPEG: configured quality, alpha flattened to RGB
//!    - PNG: best lossless compression, native color type (alpha kept)
//!    - BMP / TIFF / WebP / GIF: library defaults
//! 5. copy the temp over the original; keep or delete the backup
//!
//! Any failure restores the original and reports zero savings.

use crate::backup::BackupGuard;
use crate::config::ResizeConfig;
use crate::error::OptimizeError;
use crate::file_manager::FileManager;
use crate::image_processor::{decode_image, encode_png_best};
use anyhow::Result;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{ColorType, DynamicImage, ImageFormat, ImageOutputFormat};
use std::io::Cursor;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Smallest side a resized image may have
pub const MIN_OUTPUT_DIMENSION: u32 = 8;

/// `(max(8, floor(width * scale)), max(8, floor(height * scale)))`
pub fn target_dimensions(width: u32, height: u32, scale_factor: f64) -> (u32, u32) {
    let scale_side = |side: u32| {
        let scaled = (f64::from(side) * scale_factor).floor();
        // `as` saturates for values beyond u32
        (scaled as u32).max(MIN_OUTPUT_DIMENSION)
    };
    (scale_side(width), scale_side(height))
}

/// Lanczos3 for downsampling, Catmull-Rom for upsampling
pub fn filter_for_scale(scale_factor: f64) -> FilterType {
    if scale_factor < 1.0 {
        FilterType::Lanczos3
    } else {
        FilterType::CatmullRom
    }
}

/// True when both sides are strictly below `min_dimension`
pub fn is_below_minimum((width, height): (u32, u32), min_dimension: u32) -> bool {
    width < min_dimension && height < min_dimension
}

/// How the resized raster is written back, chosen from the file extension
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OutputEncoding {
    Jpeg { quality: u8 },
    Png,
    Other(ImageFormat),
}

impl OutputEncoding {
    pub fn for_path(path: &Path, jpeg_quality: u8) -> Result<Self, OptimizeError> {
        let extension = path
            .extension()
            .map(|ext| ext.to_string_lossy().to_lowercase())
            .unwrap_or_default();

        match extension.as_str() {
            "jpg" | "jpeg" => Ok(OutputEncoding::Jpeg {
                quality: jpeg_quality,
            }),
            "png" => Ok(OutputEncoding::Png),
            other => ImageFormat::from_extension(other)
                .map(OutputEncoding::Other)
                .ok_or_else(|| OptimizeError::UnsupportedFormat(path.display().to_string())),
        }
    }

    pub fn encode(&self, img: &DynamicImage) -> Result<Vec<u8>, OptimizeError> {
        match *self {
            OutputEncoding::Jpeg { quality } => {
                let rgb = img.to_rgb8();
                let mut buffer = Vec::new();
                JpegEncoder::new_with_quality(&mut buffer, quality).encode(
                    rgb.as_raw(),
                    rgb.width(),
                    rgb.height(),
                    ColorType::Rgb8,
                )?;
                Ok(buffer)
            }
            OutputEncoding::Png => encode_png_best(img),
            OutputEncoding::Other(format) => {
                let mut cursor = Cursor::new(Vec::new());
                img.write_to(&mut cursor, ImageOutputFormat::from(format))?;
                Ok(cursor.into_inner())
            }
        }
    }
}

/// Dry-run projection for one file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResizePlan {
    pub original_dims: (u32, u32),
    pub target_dims: (u32, u32),
    pub size: u64,
}

/// Result of resizing one file
#[derive(Debug, Clone, PartialEq)]
pub enum ResizeOutcome {
    Resized {
        original_dims: (u32, u32),
        new_dims: (u32, u32),
        original_size: u64,
        new_size: u64,
        /// Present when backups are kept
        backup: Option<PathBuf>,
    },
    Failed {
        error: String,
    },
}

impl ResizeOutcome {
    /// Negative when the re-encoded file grew
    pub fn bytes_saved(&self) -> i64 {
        match self {
            ResizeOutcome::Resized {
                original_size,
                new_size,
                ..
            } => *original_size as i64 - *new_size as i64,
            ResizeOutcome::Failed { .. } => 0,
        }
    }
}

/// Resamples files in place
pub struct ImageResizer {
    scale_factor: f64,
    jpeg_quality: u8,
    keep_backups: bool,
}

impl ImageResizer {
    pub fn new(config: &ResizeConfig) -> Self {
        Self {
            scale_factor: config.scale_factor,
            jpeg_quality: config.jpeg_quality,
            keep_backups: config.keep_backups,
        }
    }

    /// Header-only dimension probe
    pub async fn probe_dimensions(path: &Path) -> Result<(u32, u32), OptimizeError> {
        let path = path.to_path_buf();
        tokio::task::spawn_blocking(move || crate::image_processor::probe_dimensions(&path)).await?
    }

    /// What a real run would do to `path`, without touching it
    pub async fn plan(&self, path: &Path) -> Result<ResizePlan, OptimizeError> {
        let original_dims = Self::probe_dimensions(path).await?;
        let size = FileManager::file_size(path).await?;
        Ok(ResizePlan {
            original_dims,
            target_dims: target_dimensions(original_dims.0, original_dims.1, self.scale_factor),
            size,
        })
    }

    /// Resize one file in place
    pub async fn resize_file(&self, path: &Path) -> ResizeOutcome {
        match self.try_resize_file(path).await {
            Ok(outcome) => outcome,
            Err(e) => {
                debug!("Resizing {} failed: {:#}", path.display(), e);
                ResizeOutcome::Failed {
                    error: format!("{:#}", e),
                }
            }
        }
    }

    async fn try_resize_file(&self, path: &Path) -> Result<ResizeOutcome> {
        let original_size = FileManager::file_size(path)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to read size of {}: {}", path.display(), e))?;

        let guard = BackupGuard::create(path)
            .map_err(|e| anyhow::anyhow!("Failed to back up {}: {}", path.display(), e))?;

        let encoding = OutputEncoding::for_path(path, self.jpeg_quality)?;
        let input = guard.backup_path().to_path_buf();
        let output = guard.temp_path().to_path_buf();
        let scale_factor = self.scale_factor;

        let (original_dims, new_dims) =
            tokio::task::spawn_blocking(move || -> Result<_, OptimizeError> {
                let img = decode_image(&input)?;
                let original_dims = (img.width(), img.height());
                let new_dims = target_dimensions(original_dims.0, original_dims.1, scale_factor);

                let resized = img.resize_exact(new_dims.0, new_dims.1, filter_for_scale(scale_factor));
                std::fs::write(&output, encoding.encode(&resized)?)?;

                Ok((original_dims, new_dims))
            })
            .await??;

        guard.promote_temp()?;
        let new_size = FileManager::file_size(path).await?;

        let backup = if self.keep_backups {
            Some(guard.keep_backup())
        } else {
            guard.commit();
            None
        };

        Ok(ResizeOutcome::Resized {
            original_dims,
            new_dims,
            original_size,
            new_size,
            backup,
        })
    }
}
