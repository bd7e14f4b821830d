//! Parallel patch dispatch over a worker pool.

mod dispatcher;
mod progress;

pub use dispatcher::{DispatchOpts, DispatchReport, WorkDispatcher};
pub use progress::{CancelToken, LogProgress, ProgressHandle, ProgressObserver};
