use std::fmt;
use std::path::PathBuf;

use crate::buffer::PixelBuffer;
use crate::foundation::core::Patch;

/// Convenience result type used across tilecast.
pub type TilecastResult<T> = Result<T, TilecastError>;

/// Top-level error taxonomy for render jobs.
#[derive(thiserror::Error, Debug)]
pub enum TilecastError {
    /// Invalid geometry, patch layout or option values.
    #[error("validation error: {0}")]
    Validation(String),

    /// The engine could not construct its scene; nothing was dispatched.
    #[error("engine init error: {0}")]
    EngineInit(String),

    /// A single patch's compute call reported failure.
    #[error("patch compute error at {patch}: {message}")]
    PatchCompute {
        /// Bounds of the failing patch.
        patch: Patch,
        /// Engine-provided failure description.
        message: String,
    },

    /// Some patches failed; the rest of the frame was rendered.
    #[error("partial failure: {0}")]
    PartialFailure(Box<PartialFailure>),

    /// Every patch rendered but the image could not be written; the buffer is handed back.
    #[error("output error: {0}")]
    Output(Box<OutputFailure>),

    /// Dispatch stopped at patch granularity because the cancel token was tripped.
    #[error("render cancelled after {completed} of {total} patches")]
    Cancelled {
        /// Patches that ran before cancellation took effect.
        completed: usize,
        /// Patches in the job.
        total: usize,
    },

    /// Image encoding failed.
    #[error("encode error: {0}")]
    Encode(#[from] image::ImageError),

    /// Filesystem failure while persisting output.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Wrapped lower-level error.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl TilecastError {
    /// Build a [`TilecastError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`TilecastError::EngineInit`] value.
    pub fn engine_init(msg: impl Into<String>) -> Self {
        Self::EngineInit(msg.into())
    }

    /// Build a [`TilecastError::PatchCompute`] value.
    pub fn patch_compute(patch: Patch, msg: impl Into<String>) -> Self {
        Self::PatchCompute {
            patch,
            message: msg.into(),
        }
    }

    /// `true` when the job left no rendered samples behind (validation, init, cancel, encode, io).
    pub fn is_total(&self) -> bool {
        !matches!(
            self,
            Self::PartialFailure(_) | Self::PatchCompute { .. } | Self::Output(_)
        )
    }
}

/// One failed patch, recorded by the dispatcher.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PatchFailure {
    /// Bounds of the failing patch.
    pub patch: Patch,
    /// Engine-provided failure description.
    pub message: String,
}

impl From<PatchFailure> for TilecastError {
    fn from(f: PatchFailure) -> Self {
        Self::PatchCompute {
            patch: f.patch,
            message: f.message,
        }
    }
}

/// Job-level aggregate for a render where some patches failed.
///
/// The buffer is handed back so callers can inspect what was rendered.
#[derive(Debug)]
pub struct PartialFailure {
    /// Failed patches, in plan order.
    pub failed: Vec<PatchFailure>,
    /// Patches never started because dispatch was cancelled after the first failure.
    pub skipped: Vec<Patch>,
    /// Patches in the job.
    pub total: usize,
    /// Buffer with every successful patch populated.
    pub buffer: PixelBuffer,
    /// Image written from the partial buffer, if assembly succeeded.
    pub output: Option<PathBuf>,
    /// Why the partial image could not be written, when the job had an output path.
    pub write_error: Option<TilecastError>,
}

impl PartialFailure {
    /// Bounds of every failed patch.
    pub fn failed_patches(&self) -> Vec<Patch> {
        self.failed.iter().map(|f| f.patch).collect()
    }
}

impl fmt::Display for PartialFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} of {} patches failed", self.failed.len(), self.total)?;
        if !self.skipped.is_empty() {
            write!(f, " ({} skipped)", self.skipped.len())?;
        }
        for failure in &self.failed {
            write!(f, "; {}: {}", failure.patch, failure.message)?;
        }
        if let Some(e) = &self.write_error {
            write!(f, "; image not written: {e}")?;
        }
        Ok(())
    }
}

/// A complete frame whose image could not be persisted.
#[derive(Debug)]
pub struct OutputFailure {
    /// Destination that failed.
    pub path: PathBuf,
    /// The `Encode` or `Io` error raised while writing.
    pub error: TilecastError,
    /// Fully rendered samples.
    pub buffer: PixelBuffer,
}

impl fmt::Display for OutputFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "image '{}' not written: {}", self.path.display(), self.error)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
