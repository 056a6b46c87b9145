//! # Image Processing Module
//!
//! Lossless PNG compression by best-of-N selection.
//!
//! ## Strategies (evaluated in this order)
//!
//! | Strategy   | Input         | How                                             |
//! |------------|---------------|-------------------------------------------------|
//! | `image`    | backup copy   | decode + re-encode, `CompressionType::Best`, adaptive filters |
//! | `pngquant` | backup copy   | `pngquant --quality=85-100 --force --output <temp> <backup>` |
//!
//! `pngquant` only takes part when the executable was found at startup.
//! Both strategies read the untouched backup, so they are independent of
//! each other. Each one writes `<file>.temp`; the output is promoted over the
//! real file only when it is strictly smaller than the best result so far.
//!
//! ## Outcome
//! - final size < original: backup deleted, bytes saved reported with the
//!   name of the winning strategy
//! - otherwise: original restored from the backup, "no improvement"
//! - IO failure anywhere: original restored, error reported, 0 saved
//!
//! A strategy that fails (undecodable input, non-zero exit, missing binary)
//! simply does not win; it never aborts the file.

use crate::backup::BackupGuard;
use crate::error::OptimizeError;
use crate::file_manager::FileManager;
use anyhow::Result;
use image::codecs::png::{CompressionType, FilterType as PngFilterType, PngEncoder};
use image::io::Reader as ImageReader;
use image::{DynamicImage, ImageEncoder};
use std::borrow::Cow;
use std::path::{Path, PathBuf};
use tokio::process::Command;
use tracing::{debug, warn};

/// Quality range handed to pngquant; below 85 it gives up instead of degrading
pub const PNGQUANT_QUALITY: &str = "--quality=85-100";

/// One independent compression attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Strategy {
    /// In-process re-encode with the `image` crate
    Library,
    /// External `pngquant` executable
    Pngquant(PathBuf),
}

impl Strategy {
    pub fn name(&self) -> &'static str {
        match self {
            Strategy::Library => "image",
            Strategy::Pngquant(_) => "pngquant",
        }
    }
}

/// Running best (size, method) pair; only a strictly smaller size wins
#[derive(Debug, Clone)]
pub struct BestCandidate {
    size: u64,
    method: Option<&'static str>,
}

impl BestCandidate {
    pub fn new(original_size: u64) -> Self {
        Self {
            size: original_size,
            method: None,
        }
    }

    /// Returns true when `size` beats the current best and was recorded
    pub fn offer(&mut self, size: u64, method: &'static str) -> bool {
        if size < self.size {
            self.size = size;
            self.method = Some(method);
            true
        } else {
            false
        }
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn method(&self) -> Option<&'static str> {
        self.method
    }
}

/// Result of compressing one PNG
#[derive(Debug, Clone, PartialEq)]
pub enum CompressOutcome {
    Improved {
        original_size: u64,
        final_size: u64,
        method: &'static str,
    },
    NoImprovement {
        original_size: u64,
    },
    Failed {
        error: String,
    },
}

impl CompressOutcome {
    pub fn bytes_saved(&self) -> u64 {
        match self {
            CompressOutcome::Improved {
                original_size,
                final_size,
                ..
            } => original_size - final_size,
            _ => 0,
        }
    }
}

/// Runs the ordered compression strategies against PNG files
pub struct ImageProcessor {
    strategies: Vec<Strategy>,
}

impl ImageProcessor {
    /// Library re-encode always, pngquant when a path was resolved
    pub fn new(pngquant: Option<PathBuf>) -> Self {
        let mut strategies = vec![Strategy::Library];
        if let Some(path) = pngquant {
            strategies.push(Strategy::Pngquant(path));
        }
        Self { strategies }
    }

    pub fn strategies(&self) -> &[Strategy] {
        &self.strategies
    }

    pub fn has_pngquant(&self) -> bool {
        self.strategies
            .iter()
            .any(|strategy| matches!(strategy, Strategy::Pngquant(_)))
    }

    /// Compress one PNG in place. Never leaves `.backup`/`.temp` behind.
    pub async fn compress_png(&self, path: &Path) -> CompressOutcome {
        match self.try_compress_png(path).await {
            Ok(outcome) => outcome,
            Err(e) => {
                debug!("Compression of {} failed: {:#}", path.display(), e);
                CompressOutcome::Failed {
                    error: format!("{:#}", e),
                }
            }
        }
    }

    async fn try_compress_png(&self, path: &Path) -> Result<CompressOutcome> {
        let original_size = FileManager::file_size(path)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to read size of {}: {}", path.display(), e))?;

        let guard = BackupGuard::create(path)
            .map_err(|e| anyhow::anyhow!("Failed to back up {}: {}", path.display(), e))?;

        let mut best = BestCandidate::new(original_size);

        for strategy in &self.strategies {
            if !self.run_strategy(strategy, &guard).await {
                continue;
            }

            let size = FileManager::file_size(guard.temp_path()).await?;
            debug!(
                "{}: {} produced {} bytes (best so far {})",
                path.display(),
                strategy.name(),
                size,
                best.size()
            );

            if best.offer(size, strategy.name()) {
                guard.promote_temp()?;
            }
        }

        let final_size = FileManager::file_size(path).await?;

        match best.method() {
            Some(method) if final_size < original_size => {
                guard.commit();
                Ok(CompressOutcome::Improved {
                    original_size,
                    final_size,
                    method,
                })
            }
            _ => {
                guard.rollback()?;
                Ok(CompressOutcome::NoImprovement { original_size })
            }
        }
    }

    /// Write the strategy's output to the guard's temp path; false if it failed
    async fn run_strategy(&self, strategy: &Strategy, guard: &BackupGuard) -> bool {
        let input = guard.backup_path();
        let output = guard.temp_path();

        match strategy {
            Strategy::Library => match Self::reencode_png(input, output).await {
                Ok(()) => true,
                Err(e) => {
                    warn!("Re-encoding {} failed: {}", guard.original().display(), e);
                    false
                }
            },
            Strategy::Pngquant(tool) => Self::run_pngquant(tool, input, output).await,
        }
    }

    /// Decode `input` and write it back as a maximally compressed PNG
    async fn reencode_png(input: &Path, output: &Path) -> Result<(), OptimizeError> {
        let input = input.to_path_buf();
        let output = output.to_path_buf();

        tokio::task::spawn_blocking(move || -> Result<(), OptimizeError> {
            let img = decode_image(&input)?;
            let bytes = encode_png_best(&img)?;
            std::fs::write(&output, bytes)?;
            Ok(())
        })
        .await?
    }

    async fn run_pngquant(tool: &Path, input: &Path, output: &Path) -> bool {
        let result = Command::new(tool)
            .arg(PNGQUANT_QUALITY)
            .arg("--force")
            .arg("--output")
            .arg(output)
            .arg(input)
            .output()
            .await;

        match result {
            Ok(out) if out.status.success() => true,
            Ok(out) => {
                debug!(
                    "pngquant exited with {} for {}: {}",
                    out.status,
                    input.display(),
                    String::from_utf8_lossy(&out.stderr).trim()
                );
                false
            }
            Err(e) => {
                debug!("Failed to launch {}: {}", tool.display(), e);
                false
            }
        }
    }
}

/// Decode a file, sniffing the format from its content.
///
/// Backups end in `.backup`, so the extension cannot be trusted.
pub fn decode_image(path: &Path) -> Result<DynamicImage, OptimizeError> {
    Ok(ImageReader::open(path)?.with_guessed_format()?.decode()?)
}

/// Read only the header to get `(width, height)`
pub fn probe_dimensions(path: &Path) -> Result<(u32, u32), OptimizeError> {
    Ok(ImageReader::open(path)?.with_guessed_format()?.into_dimensions()?)
}

/// Encode as PNG with the strongest lossless settings.
///
/// The native color type is kept, so alpha survives. Palette images arrive
/// here already expanded by the decoder: RGB without a transparency chunk,
/// RGBA with one.
pub fn encode_png_best(img: &DynamicImage) -> Result<Vec<u8>, OptimizeError> {
    let img = png_compatible(img);
    let mut buffer = Vec::new();

    PngEncoder::new_with_quality(&mut buffer, CompressionType::Best, PngFilterType::Adaptive)
        .write_image(img.as_bytes(), img.width(), img.height(), img.color())?;

    Ok(buffer)
}

/// PNG has no float samples; narrow them to 16 bits
fn png_compatible(img: &DynamicImage) -> Cow<'_, DynamicImage> {
    match img {
        DynamicImage::ImageRgb32F(_) => Cow::Owned(DynamicImage::ImageRgb16(img.to_rgb16())),
        DynamicImage::ImageRgba32F(_) => Cow::Owned(DynamicImage::ImageRgba16(img.to_rgba16())),
        _ => Cow::Borrowed(img),
    }
}
