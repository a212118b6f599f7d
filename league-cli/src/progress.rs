//! Terminal progress bar for commits.

use indicatif::{ProgressBar, ProgressStyle};
use league_import::CommitProgress;

use crate::commands::truncate_str;

/// Reports commit progress on an `indicatif` bar.
pub(crate) struct CommitBar {
    bar: ProgressBar,
}

impl CommitBar {
    /// When `quiet` is true, the bar is hidden.
    pub(crate) fn new(quiet: bool) -> Self {
        let bar = if quiet {
            ProgressBar::hidden()
        } else {
            ProgressBar::new(0)
        };
        let style = ProgressStyle::with_template("  {bar:30.cyan/blue} {pos}/{len} {msg}")
            .expect("static pattern")
            .progress_chars("=> ");
        bar.set_style(style);
        Self { bar }
    }
}

impl CommitProgress for CommitBar {
    fn on_row(&self, current: usize, total: usize, description: &str) {
        self.bar.set_length(total as u64);
        self.bar.set_position(current as u64);
        self.bar.set_message(truncate_str(description, 48));
    }

    fn on_phase(&self, message: &str) {
        log::info!("{}", message);
    }

    fn on_complete(&self, message: &str) {
        self.bar.finish_and_clear();
        log::debug!("{}", message);
    }
}
