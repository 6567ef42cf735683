//! Progress UI driven by the library's observer hooks.

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use pagegrab_core::ProgressObserver;

const BAR_TEMPLATE: &str = "{spinner} {prefix} [{bar:30}] {pos}/{len} {msg}";

/// One progress bar per document, hidden when the terminal should stay quiet.
pub(crate) struct TerminalProgress {
    bar: ProgressBar,
}

impl TerminalProgress {
    /// Creates the progress UI; when `enabled` is false every update is a no-op.
    pub(crate) fn new(enabled: bool) -> Self {
        let bar = if enabled {
            let bar = ProgressBar::new(0);
            bar.set_style(
                ProgressStyle::with_template(BAR_TEMPLATE)
                    .unwrap_or_else(|_| ProgressStyle::default_bar())
                    .progress_chars("=> "),
            );
            bar.enable_steady_tick(Duration::from_millis(100));
            bar
        } else {
            ProgressBar::hidden()
        };
        Self { bar }
    }

    /// Labels the bar with the document currently being processed.
    pub(crate) fn start_document(&self, title: &str) {
        self.bar.reset();
        self.bar.set_prefix(title.to_string());
        self.bar.set_message("");
    }

    /// Clears the bar from the terminal.
    pub(crate) fn finish(&self) {
        self.bar.finish_and_clear();
    }

    #[cfg(test)]
    fn is_hidden(&self) -> bool {
        self.bar.is_hidden()
    }
}

impl ProgressObserver for TerminalProgress {
    fn wait_started(&self, total: Duration) {
        self.bar.set_message(format!("waiting {}ms", total.as_millis()));
    }

    fn wait_tick(&self, elapsed: Duration, total: Duration) {
        let remaining = total.saturating_sub(elapsed);
        self.bar.set_message(format!("waiting {}ms", remaining.as_millis()));
    }

    fn discovery_progress(&self, resolved: usize, known: usize) {
        self.bar.set_length(known as u64);
        self.bar.set_position(resolved as u64);
        self.bar.set_message("discovering pages");
    }

    fn discovery_finished(&self, resolved: usize, known: usize) {
        self.bar.set_length(known as u64);
        self.bar.set_position(resolved as u64);
        self.bar.set_message("page list ready");
    }

    fn fetch_started(&self, total: usize) {
        self.bar.set_length(total as u64);
        self.bar.set_position(0);
        self.bar.set_message("downloading pages");
    }

    fn page_fetched(&self, done: usize, _total: usize) {
        self.bar.set_position(done as u64);
    }

    fn fetch_finished(&self, saved: usize, total: usize) {
        self.bar.set_position(total as u64);
        self.bar.set_message(format!("{saved} saved"));
    }
}
