//! Boundary with the external compute engine.
//!
//! The engine is reached through [`ComputeEngine`]: one scene constructed per job, then one
//! blocking `compute_patch` call per patch. [`SceneHandle`] owns the scene for the duration of a
//! job and releases it exactly once.

mod contract;
mod scene;
/// Built-in analytic sphere engine.
pub mod spheres;

pub use contract::{ComputeEngine, PatchRequest, Stateless, stateless};
pub use scene::SceneHandle;
