use crate::engine::contract::ComputeEngine;
use crate::foundation::error::{TilecastError, TilecastResult};

/// Owned engine scene with a single release.
///
/// `release` consumes the handle, so the scene cannot be reached afterwards; dropping an
/// unreleased handle releases it, which covers early returns and unwinding.
pub struct SceneHandle<'e, E: ComputeEngine + ?Sized> {
    engine: &'e E,
    scene: E::Scene,
}

impl<'e, E: ComputeEngine + ?Sized> SceneHandle<'e, E> {
    /// Build the scene through `engine`.
    ///
    /// A failed build returns [`TilecastError::EngineInit`]; there is nothing to release in that
    /// case.
    pub fn acquire(engine: &'e E, desc: &E::SceneDesc) -> TilecastResult<Self> {
        let scene = engine
            .create_scene(desc)
            .map_err(|e| TilecastError::engine_init(format!("{e:#}")))?;
        tracing::debug!("scene acquired");
        Ok(Self { engine, scene })
    }

    /// Borrow the scene for read-only use by workers.
    pub fn scene(&self) -> &E::Scene {
        &self.scene
    }

    /// Destroy the scene now.
    pub fn release(self) {
        drop(self);
    }
}

impl<E: ComputeEngine + ?Sized> Drop for SceneHandle<'_, E> {
    fn drop(&mut self) {
        self.engine.destroy_scene(&mut self.scene);
        tracing::debug!("scene released");
    }
}

#[cfg(test)]
#[path = "../../tests/unit/engine/scene.rs"]
mod tests;
