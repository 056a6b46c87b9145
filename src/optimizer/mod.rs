//! # Optimizer Module
//!
//! Batch drivers, one per tool, plus the stop signal they poll between files:
//! - `png_optimizer`: scan → compress each PNG → summary
//! - `resize_optimizer`: scan → size pre-filter → dry-run or resize → summary

pub mod png_optimizer;
pub mod resize_optimizer;

pub use png_optimizer::PngOptimizer;
pub use resize_optimizer::ResizeOptimizer;

use tokio::sync::broadcast;
use tracing::{debug, warn};

/// Exit code used when a second Ctrl-C aborts the process
pub const FORCED_EXIT_CODE: i32 = 130;

/// Cooperative stop request observed at the per-file loop boundary.
///
/// Once a stop has been seen it stays latched.
pub struct StopSignal {
    sender: broadcast::Sender<()>,
    receiver: broadcast::Receiver<()>,
    stopped: bool,
}

impl StopSignal {
    pub fn new() -> Self {
        let (sender, receiver) = broadcast::channel(1);
        Self {
            sender,
            receiver,
            stopped: false,
        }
    }

    /// Signal fed by Ctrl-C. A second Ctrl-C exits immediately.
    pub fn on_ctrl_c() -> Self {
        let signal = Self::new();
        let sender = signal.sender();

        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_err() {
                debug!("Ctrl-C handler unavailable");
                return;
            }
            debug!("Interrupt received, finishing current file");
            let _ = sender.send(());

            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("Second interrupt, aborting");
                std::process::exit(FORCED_EXIT_CODE);
            }
        });

        signal
    }

    /// Handle for requesting a stop from elsewhere
    pub fn sender(&self) -> broadcast::Sender<()> {
        self.sender.clone()
    }

    /// Checks if a stop signal has been received
    pub fn should_stop(&mut self) -> bool {
        if self.stopped {
            return true;
        }

        self.stopped = match self.receiver.try_recv() {
            Ok(_) => true,
            Err(broadcast::error::TryRecvError::Empty) => false,
            // signal was sent but we missed it, treat as stop
            Err(broadcast::error::TryRecvError::Lagged(_)) => true,
            Err(broadcast::error::TryRecvError::Closed) => false,
        };
        self.stopped
    }
}

impl Default for StopSignal {
    fn default() -> Self {
        Self::new()
    }
}
