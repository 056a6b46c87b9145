//! Logging setup shared by both binaries.
//!
//! Diagnostics go to stderr through `tracing`; the user-facing report is
//! printed to stdout by [`crate::progress::ProgressManager`].

use anyhow::Result;
use tracing_subscriber::EnvFilter;

/// Install the global subscriber: INFO by default, DEBUG with `verbose`,
/// `RUST_LOG` wins over both.
pub fn init(verbose: bool) -> Result<()> {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}
