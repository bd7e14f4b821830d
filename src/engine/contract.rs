use crate::buffer::PatchView;
use crate::foundation::core::{Patch, SamplingParams, ScreenGeometry};

/// Everything an engine needs to render one patch.
#[derive(Debug)]
pub struct PatchRequest<'s, S> {
    /// Full frame dimensions.
    pub screen: ScreenGeometry,
    /// Inclusive bounds of the patch being rendered.
    pub patch: Patch,
    /// Shared scene, read-only for every worker.
    pub scene: &'s S,
    /// Sampling density.
    pub sampling: SamplingParams,
}

/// Per-patch compute contract of a rendering engine.
///
/// `compute_patch` is called concurrently from pool threads with the same scene, so the scene is
/// only ever seen through `&`. Each call gets the patch's own [`PatchView`] and must confine its
/// writes to it (the view enforces this).
pub trait ComputeEngine: Sync {
    /// Engine-side scene state.
    type Scene: Sync;
    /// Description the scene is built from.
    type SceneDesc: ?Sized;

    /// Build the scene. Errors abort the job before anything is dispatched.
    fn create_scene(&self, desc: &Self::SceneDesc) -> anyhow::Result<Self::Scene>;

    /// Tear down a scene built by [`ComputeEngine::create_scene`].
    ///
    /// Called exactly once per scene; the value itself is dropped right after.
    fn destroy_scene(&self, _scene: &mut Self::Scene) {}

    /// Render one patch into `out`.
    fn compute_patch(
        &self,
        request: &PatchRequest<'_, Self::Scene>,
        out: &mut PatchView<'_>,
    ) -> anyhow::Result<()>;
}

/// Adapter for engines without scene state: only geometry and sampling reach the closure.
///
/// Build with [`stateless`] so the closure signature is inferred correctly.
pub struct Stateless<F>(F);

/// Wrap a per-patch closure as a [`ComputeEngine`] whose scene is `()`.
pub fn stateless<F>(f: F) -> Stateless<F>
where
    F: Fn(&PatchRequest<'_, ()>, &mut PatchView<'_>) -> anyhow::Result<()> + Sync,
{
    Stateless(f)
}

impl<F> ComputeEngine for Stateless<F>
where
    F: Fn(&PatchRequest<'_, ()>, &mut PatchView<'_>) -> anyhow::Result<()> + Sync,
{
    type Scene = ();
    type SceneDesc = ();

    fn create_scene(&self, _desc: &()) -> anyhow::Result<()> {
        Ok(())
    }

    fn compute_patch(
        &self,
        request: &PatchRequest<'_, ()>,
        out: &mut PatchView<'_>,
    ) -> anyhow::Result<()> {
        (self.0)(request, out)
    }
}
