//! tilecast orchestrates tiled, parallel rendering around an external compute engine.
//!
//! The engine itself (intersection, shading, acceleration structures) sits behind the
//! [`ComputeEngine`] contract. This crate owns everything around it:
//!
//! 1. **Plan**: [`plan_patches`] splits the frame into row-major patches that cover every pixel
//!    exactly once.
//! 2. **Partition**: [`PixelBuffer::patch_views`] hands out one disjoint, bounds-checked write view
//!    per patch.
//! 3. **Acquire**: [`SceneHandle`] builds the engine scene and releases it exactly once.
//! 4. **Dispatch**: [`WorkDispatcher`] runs one compute call per patch on a rayon pool, counting
//!    completions and collecting failures without stopping sibling patches.
//! 5. **Assemble**: [`write_image`] turns the float buffer into an opaque 8-bit image on disk.
//!
//! [`RenderJob`] drives the whole sequence and returns either a complete frame or a structured
//! [`TilecastError`].
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod assemble;
mod buffer;
mod dispatch;
mod foundation;
mod job;
mod plan;

/// Compute-engine boundary and the built-in sphere engine.
pub mod engine;

pub use assemble::{assemble_image, ensure_parent_dir, write_image};
pub use buffer::{PatchView, PixelBuffer};
pub use dispatch::{
    CancelToken, DispatchOpts, DispatchReport, LogProgress, ProgressHandle, ProgressObserver,
    WorkDispatcher,
};
pub use engine::spheres::{CameraDesc, SphereDesc, SphereEngine, SphereScene, SphereSceneDesc};
pub use engine::{ComputeEngine, PatchRequest, SceneHandle, Stateless, stateless};
pub use foundation::core::{CHANNELS, Patch, PixelPos, SamplingParams, ScreenGeometry};
pub use foundation::error::{
    OutputFailure, PartialFailure, PatchFailure, TilecastError, TilecastResult,
};
pub use job::{RenderConfig, RenderJob, RenderOutput};
pub use plan::{PatchSize, plan_patches};
