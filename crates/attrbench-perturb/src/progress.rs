//! Advisory progress reporting for long simulator runs.
//!
//! Nothing is reported until a run has been busy for longer than the
//! threshold; quick runs stay silent.

use std::time::{Duration, Instant};

use tracing::info;

/// Wall-clock time a run must exceed before progress is reported.
pub const PROGRESS_THRESHOLD: Duration = Duration::from_secs(5);

/// Receives progress notifications from the simulator.
pub trait ProgressObserver {
    /// Called once, when the threshold is first exceeded.
    fn started(&mut self, label: &str, completed: usize, total: usize);

    /// Called after every subsequent sample.
    fn advanced(&mut self, label: &str, completed: usize, total: usize);

    /// Called when a run that reported progress completes.
    fn finished(&mut self, label: &str, total: usize);
}

/// Emits progress as `tracing` events.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingProgress;

impl ProgressObserver for TracingProgress {
    fn started(&mut self, label: &str, completed: usize, total: usize) {
        info!(metric = label, completed, total, "perturbation run is taking a while");
    }

    fn advanced(&mut self, label: &str, completed: usize, total: usize) {
        info!(metric = label, completed, total, "perturbation progress");
    }

    fn finished(&mut self, label: &str, total: usize) {
        info!(metric = label, total, "perturbation run finished");
    }
}

/// Discards all progress notifications.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentProgress;

impl ProgressObserver for SilentProgress {
    fn started(&mut self, _label: &str, _completed: usize, _total: usize) {}

    fn advanced(&mut self, _label: &str, _completed: usize, _total: usize) {}

    fn finished(&mut self, _label: &str, _total: usize) {}
}

pub(crate) struct ProgressTracker<'a> {
    observer: &'a mut dyn ProgressObserver,
    label: String,
    threshold: Duration,
    start: Instant,
    total: usize,
    active: bool,
}

impl<'a> ProgressTracker<'a> {
    pub(crate) fn new(
        observer: &'a mut dyn ProgressObserver,
        label: String,
        threshold: Duration,
        total: usize,
    ) -> Self {
        Self {
            observer,
            label,
            threshold,
            start: Instant::now(),
            total,
            active: false,
        }
    }

    pub(crate) fn tick(&mut self, completed: usize) {
        if self.active {
            self.observer.advanced(&self.label, completed, self.total);
        } else if self.start.elapsed() >= self.threshold {
            self.active = true;
            self.observer.started(&self.label, completed, self.total);
        }
    }

    pub(crate) fn finish(self) {
        if self.active {
            self.observer.finished(&self.label, self.total);
        }
    }
}
