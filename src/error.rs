//! # Error Types Module
//!
//! Typed errors for the library layer. Orchestration code wraps these in
//! `anyhow::Error` with per-file context before they reach the report.
//!
//! ## Categories:
//! - `Io`: filesystem failures (copy, rename, metadata)
//! - `Image`: decode/encode failures from the `image` crate
//! - `MissingDirectory`: the scan root does not exist (fatal, checked once)
//! - `Validation`: invalid CLI parameters
//! - `UnsupportedFormat`: no encoder mapping for a file extension
//! - `Task`: a blocking worker panicked or was cancelled

use std::path::PathBuf;

/// Custom error types for asset optimization
#[derive(thiserror::Error, Debug)]
pub enum OptimizeError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image processing error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Directory {} does not exist", .0.display())]
    MissingDirectory(PathBuf),

    #[error("Invalid parameter: {0}")]
    Validation(String),

    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),

    #[error("Background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}
