//! Progress display for update checks
//!
//! Provides visual feedback on stderr using indicatif. Disabled in quiet,
//! JSON and list modes so stdout stays machine readable.

use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

const SPINNER_TEMPLATE: &str = "{spinner:.cyan} {msg}";
const BAR_TEMPLATE: &str = "{spinner:.cyan} {msg} [{bar:30.cyan/blue}] {pos}/{len}";

/// Progress reporter for the update workflow
pub struct Progress {
    enabled: bool,
    bar: Option<ProgressBar>,
}

impl Progress {
    pub fn new(enabled: bool) -> Self {
        Self { enabled, bar: None }
    }

    pub fn disabled() -> Self {
        Self::new(false)
    }

    /// Show a spinner for an operation of unknown length (parsing, loading)
    pub fn spinner(&mut self, message: &str) {
        if !self.enabled {
            return;
        }

        let style = ProgressStyle::default_spinner()
            .template(SPINNER_TEMPLATE)
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏");
        let spinner = ProgressBar::new_spinner().with_style(style);
        spinner.set_message(message.to_string());
        spinner.enable_steady_tick(Duration::from_millis(80));
        self.bar = Some(spinner);
    }

    /// Start a bar over `total` dependencies
    pub fn start(&mut self, total: u64, message: &str) {
        if !self.enabled || total == 0 {
            return;
        }

        let style = ProgressStyle::default_bar()
            .template(BAR_TEMPLATE)
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▓▒░");
        let bar = ProgressBar::new(total).with_style(style);
        bar.set_message(message.to_string());
        bar.enable_steady_tick(Duration::from_millis(100));
        self.bar = Some(bar);
    }

    pub fn inc(&self) {
        if let Some(bar) = &self.bar {
            bar.inc(1);
        }
    }

    pub fn set_message(&self, message: &str) {
        if let Some(bar) = &self.bar {
            bar.set_message(message.to_string());
        }
    }

    pub fn finish_and_clear(&mut self) {
        if let Some(bar) = self.bar.take() {
            bar.finish_and_clear();
        }
    }
}
