// src/progress.rs

//! Progress reporting for long-running operations
//!
//! The refresh pass reports a status line before each unit of work and a
//! percentage after it. Trackers are invoked on whatever thread runs the
//! operation; a UI caller is responsible for marshaling events onto its own
//! thread.
//!
//! Implementations:
//! - `SilentProgress`: no-op for scripted/quiet modes
//! - `LogProgress`: logs to tracing
//! - `CallbackProgress`: forwards `ProgressEvent`s to a closure

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use tracing::info;

/// Core trait for progress tracking
pub trait ProgressTracker: Send + Sync {
    /// Set the current status message
    fn set_message(&self, message: &str);

    /// Set the total number of steps
    fn set_length(&self, length: u64);

    /// Advance by `amount` steps
    fn increment(&self, amount: u64);

    fn position(&self) -> u64;

    fn length(&self) -> u64;

    /// Finish successfully with a final status message
    fn finish_with_message(&self, message: &str);

    fn finish_with_error(&self, message: &str);

    fn is_finished(&self) -> bool;
}

/// `round(done * 100 / total)`, clamped to 100; zero steps count as done
pub fn percent(done: u64, total: u64) -> u8 {
    if total == 0 {
        return 100;
    }
    let rounded = (done * 200 + total) / (total * 2);
    rounded.min(100) as u8
}

/// Shared position/length bookkeeping
#[derive(Debug, Default)]
struct Counter {
    position: AtomicU64,
    length: AtomicU64,
    finished: AtomicBool,
}

impl Counter {
    fn with_length(length: u64) -> Self {
        Self {
            length: AtomicU64::new(length),
            ..Default::default()
        }
    }

    /// Returns the new position
    fn advance(&self, amount: u64) -> u64 {
        self.position.fetch_add(amount, Ordering::Relaxed) + amount
    }

    fn percent(&self) -> u8 {
        percent(
            self.position.load(Ordering::Relaxed),
            self.length.load(Ordering::Relaxed),
        )
    }
}

/// Silent progress tracker (no-op)
#[derive(Debug, Default)]
pub struct SilentProgress {
    counter: Counter,
}

impl SilentProgress {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ProgressTracker for SilentProgress {
    fn set_message(&self, _message: &str) {}

    fn set_length(&self, length: u64) {
        self.counter.length.store(length, Ordering::Relaxed);
    }

    fn increment(&self, amount: u64) {
        self.counter.advance(amount);
    }

    fn position(&self) -> u64 {
        self.counter.position.load(Ordering::Relaxed)
    }

    fn length(&self) -> u64 {
        self.counter.length.load(Ordering::Relaxed)
    }

    fn finish_with_message(&self, _message: &str) {
        self.counter.finished.store(true, Ordering::Relaxed);
    }

    fn finish_with_error(&self, _message: &str) {
        self.counter.finished.store(true, Ordering::Relaxed);
    }

    fn is_finished(&self) -> bool {
        self.counter.finished.load(Ordering::Relaxed)
    }
}

/// Logging progress tracker
///
/// Logs every status message and percentage at info level.
#[derive(Debug)]
pub struct LogProgress {
    name: String,
    counter: Counter,
}

impl LogProgress {
    pub fn new(name: impl Into<String>, length: u64) -> Self {
        Self {
            name: name.into(),
            counter: Counter::with_length(length),
        }
    }
}

impl ProgressTracker for LogProgress {
    fn set_message(&self, message: &str) {
        info!("{}: {}", self.name, message);
    }

    fn set_length(&self, length: u64) {
        self.counter.length.store(length, Ordering::Relaxed);
    }

    fn increment(&self, amount: u64) {
        self.counter.advance(amount);
        info!("{}: {}%", self.name, self.counter.percent());
    }

    fn position(&self) -> u64 {
        self.counter.position.load(Ordering::Relaxed)
    }

    fn length(&self) -> u64 {
        self.counter.length.load(Ordering::Relaxed)
    }

    fn finish_with_message(&self, message: &str) {
        self.counter.finished.store(true, Ordering::Relaxed);
        info!("{}: {}", self.name, message);
    }

    fn finish_with_error(&self, message: &str) {
        self.counter.finished.store(true, Ordering::Relaxed);
        info!("{}: ERROR - {}", self.name, message);
    }

    fn is_finished(&self) -> bool {
        self.counter.finished.load(Ordering::Relaxed)
    }
}

/// Events emitted by `CallbackProgress`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressEvent {
    /// Status line changed
    Message(String),
    /// Overall completion, 0..=100
    Percent(u8),
    Finished(String),
    Error(String),
}

/// Callback-based progress tracker for GUI or custom integration
pub struct CallbackProgress<F>
where
    F: Fn(ProgressEvent) + Send + Sync,
{
    callback: F,
    counter: Counter,
}

impl<F> CallbackProgress<F>
where
    F: Fn(ProgressEvent) + Send + Sync,
{
    pub fn new(callback: F) -> Self {
        Self {
            callback,
            counter: Counter::default(),
        }
    }
}

impl<F> ProgressTracker for CallbackProgress<F>
where
    F: Fn(ProgressEvent) + Send + Sync,
{
    fn set_message(&self, message: &str) {
        (self.callback)(ProgressEvent::Message(message.to_string()));
    }

    fn set_length(&self, length: u64) {
        self.counter.length.store(length, Ordering::Relaxed);
    }

    fn increment(&self, amount: u64) {
        self.counter.advance(amount);
        (self.callback)(ProgressEvent::Percent(self.counter.percent()));
    }

    fn position(&self) -> u64 {
        self.counter.position.load(Ordering::Relaxed)
    }

    fn length(&self) -> u64 {
        self.counter.length.load(Ordering::Relaxed)
    }

    fn finish_with_message(&self, message: &str) {
        self.counter.finished.store(true, Ordering::Relaxed);
        (self.callback)(ProgressEvent::Finished(message.to_string()));
    }

    fn finish_with_error(&self, message: &str) {
        self.counter.finished.store(true, Ordering::Relaxed);
        (self.callback)(ProgressEvent::Error(message.to_string()));
    }

    fn is_finished(&self) -> bool {
        self.counter.finished.load(Ordering::Relaxed)
    }
}
