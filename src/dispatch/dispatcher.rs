use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use rayon::prelude::*;

use crate::buffer::PatchView;
use crate::dispatch::progress::{CancelToken, ProgressCounter, ProgressHandle, ProgressObserver};
use crate::engine::{ComputeEngine, PatchRequest};
use crate::foundation::core::{Patch, SamplingParams, ScreenGeometry};
use crate::foundation::error::{PatchFailure, TilecastError, TilecastResult};

/// Threading, cancellation and progress controls for [`WorkDispatcher`].
#[derive(Clone)]
pub struct DispatchOpts {
    /// Run patches on a rayon pool when `true`, in plan order on the caller's thread otherwise.
    pub parallel: bool,
    /// Optional explicit worker thread count (parallel mode only).
    pub threads: Option<usize>,
    /// Cancellation signal checked before each patch starts.
    pub cancel: Option<CancelToken>,
    /// Trip the cancellation signal on the first failed patch.
    pub cancel_on_failure: bool,
    /// Optional observer called after each processed patch.
    pub progress: Option<Arc<dyn ProgressObserver>>,
}

impl Default for DispatchOpts {
    fn default() -> Self {
        Self {
            parallel: true,
            threads: None,
            cancel: None,
            cancel_on_failure: false,
            progress: None,
        }
    }
}

impl fmt::Debug for DispatchOpts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DispatchOpts")
            .field("parallel", &self.parallel)
            .field("threads", &self.threads)
            .field("cancel", &self.cancel)
            .field("cancel_on_failure", &self.cancel_on_failure)
            .field("progress", &self.progress.is_some())
            .finish()
    }
}

/// Outcome of one dispatch.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DispatchReport {
    /// Patches handed to the dispatcher.
    pub total: usize,
    /// Patches whose compute call ran, successfully or not.
    pub completed: usize,
    /// Failed patches, in plan order.
    pub failures: Vec<PatchFailure>,
    /// Patches never started because of cancellation, in plan order.
    pub skipped: Vec<Patch>,
    /// Wall time spent dispatching.
    pub elapsed: Duration,
}

impl DispatchReport {
    /// Return `true` when every patch ran and none failed.
    pub fn is_success(&self) -> bool {
        self.failures.is_empty() && self.skipped.is_empty()
    }
}

enum PatchOutcome {
    Done,
    Failed(PatchFailure),
    Skipped(Patch),
}

struct PatchCtx<'a> {
    screen: ScreenGeometry,
    sampling: SamplingParams,
    total: usize,
    counter: &'a ProgressCounter,
    cancel: &'a CancelToken,
    cancel_on_failure: bool,
    observer: Option<&'a dyn ProgressObserver>,
}

/// Runs the compute contract once per patch over a bounded worker pool.
///
/// Owns the progress counter; [`WorkDispatcher::progress`] hands out read-only handles to it.
pub struct WorkDispatcher {
    opts: DispatchOpts,
    counter: Arc<ProgressCounter>,
}

impl WorkDispatcher {
    /// Create a dispatcher; a thread count of zero is rejected.
    pub fn new(opts: DispatchOpts) -> TilecastResult<Self> {
        if let Some(n) = opts.threads
            && n == 0
        {
            return Err(TilecastError::validation(
                "dispatch 'threads' must be >= 1 when set",
            ));
        }
        Ok(Self {
            opts,
            counter: Arc::new(ProgressCounter::default()),
        })
    }

    /// Options this dispatcher was built with.
    pub fn opts(&self) -> &DispatchOpts {
        &self.opts
    }

    /// Read-only handle to the completion counter.
    pub fn progress(&self) -> ProgressHandle {
        ProgressHandle(Arc::clone(&self.counter))
    }

    /// Compute every view's patch with `engine`.
    ///
    /// Each view is consumed exactly once. Failing patches are recorded and the remaining patches
    /// still run; only the cancel token stops dispatch early, and then only between patches.
    /// Takes `&mut self` because every dispatch resets the shared progress counter.
    #[tracing::instrument(skip_all, fields(patches = views.len(), parallel = self.opts.parallel))]
    pub fn dispatch<E: ComputeEngine + ?Sized>(
        &mut self,
        engine: &E,
        scene: &E::Scene,
        screen: ScreenGeometry,
        sampling: SamplingParams,
        views: Vec<PatchView<'_>>,
    ) -> TilecastResult<DispatchReport> {
        sampling.validate()?;
        let total = views.len();
        self.counter.reset(total);

        let cancel = self.opts.cancel.clone().unwrap_or_default();
        let ctx = PatchCtx {
            screen,
            sampling,
            total,
            counter: &self.counter,
            cancel: &cancel,
            cancel_on_failure: self.opts.cancel_on_failure,
            observer: self.opts.progress.as_deref(),
        };

        let started = Instant::now();
        let outcomes: Vec<PatchOutcome> = if self.opts.parallel {
            let pool = build_thread_pool(self.opts.threads)?;
            pool.install(|| {
                views
                    .into_par_iter()
                    .map(|view| run_patch(engine, scene, view, &ctx))
                    .collect()
            })
        } else {
            views
                .into_iter()
                .map(|view| run_patch(engine, scene, view, &ctx))
                .collect()
        };

        let mut report = DispatchReport {
            total,
            elapsed: started.elapsed(),
            ..DispatchReport::default()
        };
        for outcome in outcomes {
            match outcome {
                PatchOutcome::Done => report.completed += 1,
                PatchOutcome::Failed(f) => {
                    report.completed += 1;
                    report.failures.push(f);
                }
                PatchOutcome::Skipped(p) => report.skipped.push(p),
            }
        }

        tracing::info!(
            completed = report.completed,
            failed = report.failures.len(),
            skipped = report.skipped.len(),
            elapsed_ms = report.elapsed.as_secs_f64() * 1000.0,
            "dispatch finished"
        );
        Ok(report)
    }
}

fn run_patch<E: ComputeEngine + ?Sized>(
    engine: &E,
    scene: &E::Scene,
    mut view: PatchView<'_>,
    ctx: &PatchCtx<'_>,
) -> PatchOutcome {
    let patch = view.patch();
    if ctx.cancel.is_cancelled() {
        return PatchOutcome::Skipped(patch);
    }

    let request = PatchRequest {
        screen: ctx.screen,
        patch,
        scene,
        sampling: ctx.sampling,
    };
    let result = engine.compute_patch(&request, &mut view);

    let done = ctx.counter.bump();
    if let Some(observer) = ctx.observer {
        observer.on_patch_done(done, ctx.total);
    }

    match result {
        Ok(()) => {
            tracing::debug!(%patch, "patch done");
            PatchOutcome::Done
        }
        Err(e) => {
            let message = format!("{e:#}");
            tracing::warn!(%patch, error = %message, "patch failed");
            if ctx.cancel_on_failure {
                ctx.cancel.cancel();
            }
            PatchOutcome::Failed(PatchFailure { patch, message })
        }
    }
}

fn build_thread_pool(threads: Option<usize>) -> TilecastResult<rayon::ThreadPool> {
    let mut builder = rayon::ThreadPoolBuilder::new().thread_name(|i| format!("tilecast-{i}"));
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder
        .build()
        .map_err(|e| TilecastError::Other(anyhow::anyhow!("failed to build rayon thread pool: {e}")))
}

#[cfg(test)]
#[path = "../../tests/unit/dispatch/dispatcher.rs"]
mod tests;
