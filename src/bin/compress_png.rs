//! # compress-png
//!
//! Losslessly shrinks every PNG under a directory. Each file is re-encoded
//! with the `image` crate's best PNG settings and, when available, with
//! `pngquant`; the smallest result is kept and ties leave the file untouched.
//!
//! ## Usage:
//! ```bash
//! compress-png assets/ --verbose
//! TOOLS_DIR=./tools compress-png
//! ```

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing::debug;

use asset_optimizer::{logging, platform, CompressConfig, PngOptimizer, StopSignal};

#[derive(Parser)]
#[command(name = "compress-png")]
#[command(about = "Losslessly compress PNG files in place, keeping the smallest encoding")]
struct Args {
    /// Directory to scan
    #[arg(default_value = ".")]
    directory: PathBuf,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    logging::init(args.verbose)?;

    let pngquant = platform::find_pngquant();
    debug!("pngquant: {:?}", pngquant);

    let config = CompressConfig {
        root: args.directory,
        pngquant,
    };

    let mut stop = StopSignal::on_ctrl_c();
    PngOptimizer::new(config).run(&mut stop).await?;

    Ok(())
}
