use std::sync::atomic::{AtomicUsize, Ordering};

use super::*;
use crate::buffer::PatchView;
use crate::engine::contract::PatchRequest;

#[derive(Default)]
struct CountingEngine {
    created: AtomicUsize,
    destroyed: AtomicUsize,
}

impl ComputeEngine for CountingEngine {
    type Scene = u32;
    type SceneDesc = bool;

    fn create_scene(&self, ok: &bool) -> anyhow::Result<u32> {
        if !*ok {
            anyhow::bail!("scene rejected");
        }
        self.created.fetch_add(1, Ordering::SeqCst);
        Ok(7)
    }

    fn destroy_scene(&self, _scene: &mut u32) {
        self.destroyed.fetch_add(1, Ordering::SeqCst);
    }

    fn compute_patch(
        &self,
        _request: &PatchRequest<'_, u32>,
        _out: &mut PatchView<'_>,
    ) -> anyhow::Result<()> {
        Ok(())
    }
}

#[test]
fn release_destroys_exactly_once() {
    let engine = CountingEngine::default();
    let handle = SceneHandle::acquire(&engine, &true).unwrap();
    assert_eq!(*handle.scene(), 7);
    handle.release();
    assert_eq!(engine.created.load(Ordering::SeqCst), 1);
    assert_eq!(engine.destroyed.load(Ordering::SeqCst), 1);
}

#[test]
fn drop_releases_unreleased_handle() {
    let engine = CountingEngine::default();
    {
        let _handle = SceneHandle::acquire(&engine, &true).unwrap();
    }
    assert_eq!(engine.destroyed.load(Ordering::SeqCst), 1);
}

#[test]
fn failed_acquire_has_nothing_to_release() {
    let engine = CountingEngine::default();
    let err = SceneHandle::acquire(&engine, &false).err().unwrap();
    assert!(matches!(err, TilecastError::EngineInit(ref m) if m.contains("scene rejected")));
    assert_eq!(engine.created.load(Ordering::SeqCst), 0);
    assert_eq!(engine.destroyed.load(Ordering::SeqCst), 0);
}

struct TrackingEngine {
    log: std::sync::Mutex<Vec<u32>>,
}

impl ComputeEngine for TrackingEngine {
    type Scene = Vec<u32>;
    type SceneDesc = u32;

    fn create_scene(&self, n: &u32) -> anyhow::Result<Vec<u32>> {
        Ok((0..*n).collect())
    }

    fn destroy_scene(&self, scene: &mut Vec<u32>) {
        self.log.lock().unwrap().append(scene);
    }

    fn compute_patch(
        &self,
        _request: &PatchRequest<'_, Vec<u32>>,
        _out: &mut PatchView<'_>,
    ) -> anyhow::Result<()> {
        Ok(())
    }
}

#[test]
fn scene_is_borrowed_directly_and_torn_down_on_early_exit() {
    let engine = TrackingEngine {
        log: std::sync::Mutex::new(Vec::new()),
    };
    let result: TilecastResult<()> = (|| {
        let handle = SceneHandle::acquire(&engine, &3)?;
        assert_eq!(handle.scene(), &vec![0, 1, 2]);
        Err(TilecastError::validation("bail out before release"))
    })();
    assert!(result.is_err());
    assert_eq!(*engine.log.lock().unwrap(), vec![0, 1, 2]);
}
