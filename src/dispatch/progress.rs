use std::sync::atomic::{AtomicUsize, Ordering};

use log::info;

/// Receives progress updates during dispatch. Updates are fire and forget.
#[cfg_attr(test, mockall::automock)]
pub trait ProgressSink: Send + Sync {
    fn set_total(&self, total: usize);
    fn set_progress(&self, value: usize);
}

/// Reports progress through the log.
#[derive(Debug, Default)]
pub struct LogProgress {
    total: AtomicUsize,
}

impl ProgressSink for LogProgress {
    fn set_total(&self, total: usize) {
        self.total.store(total, Ordering::Relaxed);
        info!("{} plugins to process", total);
    }

    fn set_progress(&self, value: usize) {
        info!(
            "Progress: {}/{} plugins",
            value,
            self.total.load(Ordering::Relaxed)
        );
    }
}
