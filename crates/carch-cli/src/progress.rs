//! Spinner shown on stderr while a long operation runs.

use console::Term;
use indicatif::ProgressBar;
use indicatif::ProgressStyle;
use std::time::Duration;

/// Indeterminate spinner; the core reports totals only once it is done.
///
/// Cleared automatically on drop.
pub struct CliSpinner {
    bar: ProgressBar,
}

impl CliSpinner {
    /// Starts a spinner showing `message` and the elapsed time.
    #[must_use]
    pub fn new(message: &str) -> Self {
        let bar = ProgressBar::new_spinner();
        bar.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.cyan} {msg} ({elapsed})")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        bar.set_message(message.to_string());
        bar.enable_steady_tick(Duration::from_millis(100));
        Self { bar }
    }

    /// Whether a spinner would be visible: stderr is a terminal and the
    /// output is neither quiet nor JSON.
    #[must_use]
    pub fn should_show(quiet: bool, json: bool) -> bool {
        !quiet && !json && Term::stderr().is_term()
    }

    /// Starts a spinner if [`should_show`](Self::should_show) allows it.
    #[must_use]
    pub fn maybe(message: &str, quiet: bool, json: bool) -> Option<Self> {
        Self::should_show(quiet, json).then(|| Self::new(message))
    }
}

impl Drop for CliSpinner {
    fn drop(&mut self) {
        self.bar.finish_and_clear();
    }
}
