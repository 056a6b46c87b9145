//! # Asset Optimizer Library
//!
//! Shared core of the two command-line tools:
//! - `compress-png`: lossless PNG size reduction, best of several encoders
//! - `resize-images`: in-place downscaling by a scale factor
//!
//! ## Module layout:
//! - `config`: run configuration and format allow-lists
//! - `error`: typed library errors
//! - `file_manager`: directory walk, exclusions, size formatting
//! - `backup`: `.backup`/`.temp` bookkeeping with guaranteed cleanup
//! - `platform`: external tool discovery (`pngquant`)
//! - `image_processor`: PNG compression strategies
//! - `resize`: per-file resampling and re-encoding
//! - `progress`: run statistics, report lines, progress bar
//! - `optimizer`: batch drivers and the stop signal
//! - `logging`: `tracing` subscriber setup
//!
//! ## Usage:
//! ```rust,no_run
//! use asset_optimizer::{CompressConfig, PngOptimizer, StopSignal};
//!
//! # async fn demo() -> anyhow::Result<()> {
//! let optimizer = PngOptimizer::new(CompressConfig::default());
//! let stats = optimizer.run(&mut StopSignal::on_ctrl_c()).await?;
//! println!("saved {} bytes", stats.bytes_saved);
//! # Ok(())
//! # }
//! ```

pub mod backup;
pub mod config;
pub mod error;
pub mod file_manager;
pub mod image_processor;
pub mod logging;
pub mod optimizer;
pub mod platform;
pub mod progress;
pub mod resize;

#[cfg(test)]
mod test_support;

pub use config::{CompressConfig, ExtensionSet, ResizeConfig};
pub use error::OptimizeError;
pub use optimizer::{PngOptimizer, ResizeOptimizer, StopSignal};
pub use progress::RunStats;
