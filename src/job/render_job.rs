use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use crate::assemble::write_image;
use crate::buffer::PixelBuffer;
use crate::dispatch::{DispatchOpts, DispatchReport, WorkDispatcher};
use crate::engine::{ComputeEngine, SceneHandle};
use crate::foundation::core::{Patch, SamplingParams, ScreenGeometry};
use crate::foundation::error::{OutputFailure, PartialFailure, TilecastError, TilecastResult};
use crate::job::config::RenderConfig;
use crate::plan::{PatchSize, plan_patches};

/// One frame's worth of work: geometry, patch plan, sampling and dispatch settings.
#[derive(Clone, Debug)]
pub struct RenderJob {
    geometry: ScreenGeometry,
    patches: Vec<Patch>,
    sampling: SamplingParams,
    dispatch: DispatchOpts,
    output: Option<PathBuf>,
}

/// A fully rendered frame.
#[derive(Debug)]
pub struct RenderOutput {
    /// Accumulated samples.
    pub buffer: PixelBuffer,
    /// Dispatch statistics.
    pub report: DispatchReport,
    /// Image written, when the job had an output path.
    pub output: Option<PathBuf>,
    /// Wall time for the whole job, scene construction and assembly included.
    pub elapsed: Duration,
}

impl RenderJob {
    /// Plan a job over `geometry` tiled by `patch_size`.
    pub fn new(
        geometry: ScreenGeometry,
        patch_size: impl Into<PatchSize>,
        sampling: SamplingParams,
    ) -> TilecastResult<Self> {
        sampling.validate()?;
        let patches = plan_patches(&geometry, patch_size)?;
        Ok(Self {
            geometry,
            patches,
            sampling,
            dispatch: DispatchOpts::default(),
            output: None,
        })
    }

    /// Build a job from a validated [`RenderConfig`], writing to its `output` path.
    pub fn from_config(cfg: &RenderConfig) -> TilecastResult<Self> {
        cfg.validate()?;
        Ok(Self::new(cfg.geometry()?, cfg.patch_size, cfg.sampling()?)?
            .with_dispatch(cfg.dispatch_opts())
            .with_output(&cfg.output))
    }

    /// Replace the dispatch options.
    pub fn with_dispatch(mut self, opts: DispatchOpts) -> Self {
        self.dispatch = opts;
        self
    }

    /// Write the assembled image to `path` once dispatch finishes.
    pub fn with_output(mut self, path: impl AsRef<Path>) -> Self {
        self.output = Some(path.as_ref().to_path_buf());
        self
    }

    /// Frame geometry.
    pub fn geometry(&self) -> ScreenGeometry {
        self.geometry
    }

    /// Planned patches in dispatch order.
    pub fn patches(&self) -> &[Patch] {
        &self.patches
    }

    /// Sampling parameters.
    pub fn sampling(&self) -> SamplingParams {
        self.sampling
    }

    /// Dispatch options.
    pub fn dispatch_opts(&self) -> &DispatchOpts {
        &self.dispatch
    }

    /// Render the frame with `engine`, building its scene from `desc`.
    ///
    /// The scene is acquired after the buffer is partitioned and released once dispatch returns,
    /// on every path. Outcomes:
    /// - `Ok` when every patch succeeded (and the image, if any, was written);
    /// - [`TilecastError::EngineInit`] when the scene could not be built;
    /// - [`TilecastError::Cancelled`] when the cancel token stopped dispatch with no failures;
    /// - [`TilecastError::PartialFailure`] when some patches failed; the image is still written,
    ///   and a write failure is recorded in its `write_error`;
    /// - [`TilecastError::Output`] when every patch succeeded but the image could not be written;
    ///   the rendered buffer comes back with the error.
    #[tracing::instrument(skip_all, fields(
        width = self.geometry.width,
        height = self.geometry.height,
        patches = self.patches.len(),
    ))]
    pub fn render<E: ComputeEngine + ?Sized>(
        &self,
        engine: &E,
        desc: &E::SceneDesc,
    ) -> TilecastResult<RenderOutput> {
        let started = Instant::now();
        tracing::info!(
            subpixels = self.sampling.subpixel_count,
            iterations = self.sampling.iteration_count,
            parallel = self.dispatch.parallel,
            "render started"
        );
        let mut dispatcher = WorkDispatcher::new(self.dispatch.clone())?;
        let mut buffer = PixelBuffer::new(self.geometry)?;
        let views = buffer.patch_views(&self.patches)?;

        let scene = SceneHandle::acquire(engine, desc)?;
        let report = dispatcher.dispatch(
            engine,
            scene.scene(),
            self.geometry,
            self.sampling,
            views,
        );
        scene.release();
        let report = report?;

        if !report.skipped.is_empty() && report.failures.is_empty() {
            return Err(TilecastError::Cancelled {
                completed: report.completed,
                total: report.total,
            });
        }

        let write_error = match &self.output {
            Some(path) => write_image(&buffer, path).err(),
            None => None,
        };
        if let Some(e) = &write_error {
            tracing::warn!(error = %e, "image not written");
        }
        let output = match &write_error {
            None => self.output.clone(),
            Some(_) => None,
        };

        if !report.failures.is_empty() {
            return Err(TilecastError::PartialFailure(Box::new(PartialFailure {
                failed: report.failures,
                skipped: report.skipped,
                total: report.total,
                buffer,
                output,
                write_error,
            })));
        }

        if let (Some(error), Some(path)) = (write_error, &self.output) {
            return Err(TilecastError::Output(Box::new(OutputFailure {
                path: path.clone(),
                error,
                buffer,
            })));
        }

        let elapsed = started.elapsed();
        tracing::info!(elapsed_s = elapsed.as_secs_f64(), "render finished");
        Ok(RenderOutput {
            buffer,
            report,
            output: self.output.clone(),
            elapsed,
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/job/render_job.rs"]
mod tests;
