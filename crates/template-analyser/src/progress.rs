use std::sync::Mutex;

use crossbeam_channel::{unbounded, Receiver, Sender};

/// `(completed, total)` snapshot emitted after every finished template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressUpdate {
    pub completed: usize,
    pub total: usize,
}

impl ProgressUpdate {
    pub fn new(completed: usize, total: usize) -> Self {
        Self { completed, total }
    }

    /// Completion percentage in `0..=100`. An empty run counts as complete.
    pub fn percent(&self) -> u8 {
        if self.total == 0 {
            return 100;
        }
        ((self.completed.min(self.total) * 100) / self.total) as u8
    }

    pub fn is_complete(&self) -> bool {
        self.completed == self.total
    }
}

/// Receives progress notifications from a run.
///
/// Notifications are delivered one at a time from the thread that called
/// [`run_analysis`](crate::scheduler::run_analysis), never from a worker.
pub trait ProgressListener {
    fn on_progress(&self, update: ProgressUpdate);
}

impl<F> ProgressListener for F
where
    F: Fn(ProgressUpdate),
{
    fn on_progress(&self, update: ProgressUpdate) {
        self(update)
    }
}

/// Listener that ignores everything.
pub struct NoopProgress;

impl ProgressListener for NoopProgress {
    fn on_progress(&self, _update: ProgressUpdate) {}
}

/// Forwards updates to a channel so another thread (e.g. a UI) can poll
/// without blocking the run.
pub struct ChannelProgress {
    sender: Sender<ProgressUpdate>,
}

impl ChannelProgress {
    pub fn channel() -> (Self, Receiver<ProgressUpdate>) {
        let (sender, receiver) = unbounded();
        (Self { sender }, receiver)
    }
}

impl ProgressListener for ChannelProgress {
    fn on_progress(&self, update: ProgressUpdate) {
        // A dropped receiver just means nobody is watching any more.
        let _ = self.sender.send(update);
    }
}

/// Keeps every update in memory.
#[derive(Default)]
pub struct RecordingProgress {
    updates: Mutex<Vec<ProgressUpdate>>,
}

impl RecordingProgress {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn updates(&self) -> Vec<ProgressUpdate> {
        self.updates
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }

    pub fn completed_counts(&self) -> Vec<usize> {
        self.updates().iter().map(|u| u.completed).collect()
    }
}

impl ProgressListener for RecordingProgress {
    fn on_progress(&self, update: ProgressUpdate) {
        if let Ok(mut guard) = self.updates.lock() {
            guard.push(update);
        }
    }
}

/// Owns the completed counter for one run.
pub(crate) struct ProgressTracker<'a> {
    completed: usize,
    total: usize,
    listener: &'a dyn ProgressListener,
}

impl<'a> ProgressTracker<'a> {
    pub(crate) fn new(total: usize, listener: &'a dyn ProgressListener) -> Self {
        Self {
            completed: 0,
            total,
            listener,
        }
    }

    /// Announces the denominator before any template finishes.
    pub(crate) fn start(&self) {
        self.listener
            .on_progress(ProgressUpdate::new(self.completed, self.total));
    }

    pub(crate) fn template_completed(&mut self) {
        self.completed += 1;
        self.listener
            .on_progress(ProgressUpdate::new(self.completed, self.total));
    }

    pub(crate) fn completed(&self) -> usize {
        self.completed
    }
}
