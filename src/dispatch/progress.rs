use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

/// Cooperative cancellation flag, checked by the dispatcher before each patch starts.
///
/// Patches already running are not interrupted.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    /// Create an untripped token.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    /// Return `true` once [`CancelToken::cancel`] has been called.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Notified from worker threads after each processed patch.
pub trait ProgressObserver: Send + Sync {
    /// `completed` counts processed patches so far (including failed ones), out of `total`.
    fn on_patch_done(&self, completed: usize, total: usize);
}

/// Logs progress through `tracing` every time another tenth of the patches is done.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogProgress;

impl ProgressObserver for LogProgress {
    fn on_patch_done(&self, completed: usize, total: usize) {
        if crosses_decile(completed, total) {
            tracing::info!(
                completed,
                total,
                "render {:.0}% complete",
                completed as f64 * 100.0 / total as f64
            );
        }
    }
}

/// `true` when the `completed`-th patch moves progress into a new tenth of `total`.
pub(crate) fn crosses_decile(completed: usize, total: usize) -> bool {
    if total == 0 || completed == 0 {
        return false;
    }
    completed * 10 / total != (completed - 1) * 10 / total
}

#[derive(Debug, Default)]
pub(crate) struct ProgressCounter {
    completed: AtomicUsize,
    total: AtomicUsize,
}

impl ProgressCounter {
    pub(crate) fn reset(&self, total: usize) {
        self.total.store(total, Ordering::Release);
        self.completed.store(0, Ordering::Release);
    }

    /// Increment and return the new completed count.
    pub(crate) fn bump(&self) -> usize {
        self.completed.fetch_add(1, Ordering::AcqRel) + 1
    }
}

/// Read-only view of a dispatcher's progress counter, safe to poll from any thread.
#[derive(Clone, Debug)]
pub struct ProgressHandle(pub(crate) Arc<ProgressCounter>);

impl ProgressHandle {
    /// Patches processed so far in the current (or last) dispatch.
    pub fn completed(&self) -> usize {
        self.0.completed.load(Ordering::Acquire)
    }

    /// Patches in the current (or last) dispatch.
    pub fn total(&self) -> usize {
        self.0.total.load(Ordering::Acquire)
    }

    /// Completed fraction in `[0, 1]`; `0` before the first dispatch.
    pub fn fraction(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            return 0.0;
        }
        self.completed() as f64 / total as f64
    }
}

#[cfg(test)]
#[path = "../../tests/unit/dispatch/progress.rs"]
mod tests;
