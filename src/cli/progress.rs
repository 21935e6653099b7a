//! Progress display for availability checks
//!
//! When stdout is a terminal a progress bar tracks the checks and the
//! per-shelter lines are printed above it. Otherwise the lines are printed
//! as-is and no bar is drawn, which keeps redirected output clean.

use indicatif::{ProgressBar, ProgressStyle};
use tracing::debug;

/// Configuration for progress display
#[derive(Debug, Clone)]
pub struct ProgressConfig {
    /// Enable the visual progress bar
    pub enable_progress_bar: bool,
    /// Message shown next to the bar
    pub message: String,
}

impl Default for ProgressConfig {
    fn default() -> Self {
        Self {
            enable_progress_bar: true,
            message: "Checking availability".to_string(),
        }
    }
}

/// Progress bar for a fixed number of steps, or plain output without a terminal
pub struct ProgressDisplay {
    bar: Option<ProgressBar>,
}

impl ProgressDisplay {
    /// Start a display for `total` steps
    pub fn new(total: usize, config: ProgressConfig) -> Self {
        let is_terminal = atty::is(atty::Stream::Stdout);
        if !config.enable_progress_bar || !is_terminal {
            debug!("Progress bar disabled (terminal: {})", is_terminal);
            return Self { bar: None };
        }

        let bar = ProgressBar::new(total as u64);
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}")
            .map(|style| style.progress_chars("##-"))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        bar.set_style(style);
        bar.set_message(config.message);

        Self { bar: Some(bar) }
    }

    /// Print a line without tearing the bar
    pub fn println(&self, line: impl AsRef<str>) {
        match &self.bar {
            Some(bar) => bar.println(line.as_ref()),
            None => println!("{}", line.as_ref()),
        }
    }

    /// Advance by one step
    pub fn inc(&self) {
        if let Some(bar) = &self.bar {
            bar.inc(1);
        }
    }

    /// Remove the bar
    pub fn finish(self) {
        if let Some(bar) = self.bar {
            bar.finish_and_clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disabled_display_has_no_bar() {
        let config = ProgressConfig {
            enable_progress_bar: false,
            ..Default::default()
        };
        let display = ProgressDisplay::new(10, config);

        assert!(display.bar.is_none());
        display.inc();
        display.println("  Not available for your range.");
        display.finish();
    }

    #[test]
    fn test_progress_config_defaults() {
        let config = ProgressConfig::default();
        assert!(config.enable_progress_bar);
        assert_eq!(config.message, "Checking availability");
    }
}
