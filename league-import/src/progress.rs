//! Commit progress reporting.

/// Trait for receiving commit progress updates.
pub trait CommitProgress {
    /// Called after each row is applied (or skipped).
    fn on_row(&self, current: usize, total: usize, description: &str);

    /// Called when a phase starts (e.g., "Committing 40 team rows").
    fn on_phase(&self, message: &str);

    /// Called when the commit is complete.
    fn on_complete(&self, message: &str);
}

/// A no-op progress reporter that discards all updates.
pub struct SilentProgress;

impl CommitProgress for SilentProgress {
    fn on_row(&self, _current: usize, _total: usize, _description: &str) {}
    fn on_phase(&self, _message: &str) {}
    fn on_complete(&self, _message: &str) {}
}

/// A progress reporter that logs to the `log` crate.
pub struct LogProgress;

impl CommitProgress for LogProgress {
    fn on_row(&self, current: usize, total: usize, description: &str) {
        if current.is_multiple_of(100) || current == total {
            log::info!("  [{}/{}] {}", current, total, description);
        }
    }

    fn on_phase(&self, message: &str) {
        log::info!("{}", message);
    }

    fn on_complete(&self, message: &str) {
        log::info!("{}", message);
    }
}
