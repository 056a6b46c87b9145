//! # resize-images
//!
//! Downscales image assets in place by a scale factor. Files whose width
//! and height are both under `--min-size` are left alone.
//!
//! ## Usage:
//! ```bash
//! resize-images assets/ --scale 0.5 --formats png jpg --dry-run
//! resize-images textures/ -s 0.25 -q 90 --keep-backups
//! ```

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

use asset_optimizer::config::{ExtensionSet, RESIZE_DEFAULT_FORMATS};
use asset_optimizer::{logging, ResizeConfig, ResizeOptimizer, StopSignal};

#[derive(Parser)]
#[command(name = "resize-images")]
#[command(about = "Downscale images in place to reduce asset size")]
struct Args {
    /// Directory to scan
    #[arg(default_value = ".")]
    directory: PathBuf,

    /// Scale factor applied to width and height
    #[arg(short, long, default_value_t = 1.0 / 3.0, allow_negative_numbers = true)]
    scale: f64,

    /// Keep `<file>.backup` next to every resized file
    #[arg(short = 'b', long)]
    keep_backups: bool,

    /// JPEG quality (1-100)
    #[arg(short, long, default_value_t = 95)]
    quality: u8,

    /// File extensions to process
    #[arg(
        long,
        num_args = 1..,
        default_values_t = RESIZE_DEFAULT_FORMATS.iter().map(|f| f.to_string()).collect::<Vec<_>>()
    )]
    formats: Vec<String>,

    /// Skip files whose width and height are both below this (px)
    #[arg(long, default_value_t = 100)]
    min_size: u32,

    /// Only list what would be resized
    #[arg(long)]
    dry_run: bool,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    logging::init(args.verbose)?;

    let config = ResizeConfig {
        root: args.directory,
        scale_factor: args.scale,
        jpeg_quality: args.quality,
        min_dimension: args.min_size,
        keep_backups: args.keep_backups,
        dry_run: args.dry_run,
        formats: ExtensionSet::resize_supported().intersect(&args.formats),
    };

    let mut stop = StopSignal::on_ctrl_c();
    ResizeOptimizer::new(config).run(&mut stop).await?;

    Ok(())
}
