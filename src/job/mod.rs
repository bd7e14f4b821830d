//! Whole-frame render jobs and their configuration.

mod config;
mod render_job;

pub use config::RenderConfig;
pub use render_job::{RenderJob, RenderOutput};
