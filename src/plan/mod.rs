//! Frame partitioning into patches.

mod planner;

pub use planner::{PatchSize, plan_patches};
