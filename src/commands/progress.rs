// src/commands/progress.rs
//! Terminal progress display for refresh passes

use indicatif::{ProgressBar, ProgressStyle};
use stencil::ProgressTracker;
use std::time::Duration;

/// Progress bar showing the current status line and overall percentage
pub struct RefreshProgress {
    bar: ProgressBar,
}

impl RefreshProgress {
    pub fn new() -> Self {
        let bar = ProgressBar::new(0);
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.green/dim}] {percent:>3}% {msg}")
            .map(|style| style.progress_chars("##-"))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        bar.set_style(style);
        bar.enable_steady_tick(Duration::from_millis(100));
        Self { bar }
    }
}

impl ProgressTracker for RefreshProgress {
    fn set_message(&self, message: &str) {
        self.bar.set_message(message.to_string());
    }

    fn set_length(&self, length: u64) {
        self.bar.set_length(length);
    }

    fn increment(&self, amount: u64) {
        self.bar.inc(amount);
    }

    fn position(&self) -> u64 {
        self.bar.position()
    }

    fn length(&self) -> u64 {
        self.bar.length().unwrap_or(0)
    }

    fn finish_with_message(&self, message: &str) {
        self.bar.finish_with_message(message.to_string());
    }

    fn finish_with_error(&self, message: &str) {
        self.bar.abandon_with_message(format!("Error: {message}"));
    }

    fn is_finished(&self) -> bool {
        self.bar.is_finished()
    }
}
