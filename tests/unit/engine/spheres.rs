use super::*;
use crate::buffer::PixelBuffer;
use crate::foundation::core::{SamplingParams, ScreenGeometry};

fn render(desc: &SphereSceneDesc, g: ScreenGeometry, sampling: SamplingParams) -> PixelBuffer {
    let engine = SphereEngine;
    let scene = engine.create_scene(desc).unwrap();
    let mut buf = PixelBuffer::new(g).unwrap();
    {
        let patch = g.full_patch();
        let mut views = buf.patch_views(&[patch]).unwrap();
        let req = PatchRequest {
            screen: g,
            patch,
            scene: &scene,
            sampling,
        };
        engine.compute_patch(&req, &mut views[0]).unwrap();
    }
    buf
}

#[test]
fn default_scene_is_valid() {
    let scene = SphereEngine
        .create_scene(&SphereSceneDesc::default())
        .unwrap();
    assert_eq!(scene.sphere_count(), 3);
}

#[test]
fn invalid_descriptions_are_rejected() {
    let mut desc = SphereSceneDesc::default();
    desc.camera.fov_deg = 180.0;
    assert!(SphereEngine.create_scene(&desc).is_err());

    let mut desc = SphereSceneDesc::default();
    desc.spheres[1].radius = 0.0;
    let err = SphereEngine.create_scene(&desc).unwrap_err();
    assert!(err.to_string().contains("sphere 1"));

    let mut desc = SphereSceneDesc::default();
    desc.camera.up = Vec3::X;
    assert!(SphereEngine.create_scene(&desc).is_err());

    let mut desc = SphereSceneDesc::default();
    desc.camera.look_at = desc.camera.position;
    assert!(SphereEngine.create_scene(&desc).is_err());

    let mut desc = SphereSceneDesc::default();
    desc.light_dir = Vec3::ZERO;
    assert!(SphereEngine.create_scene(&desc).is_err());
}

#[test]
fn empty_scene_renders_background_with_zero_alpha() {
    let desc = SphereSceneDesc {
        spheres: vec![],
        ..SphereSceneDesc::default()
    };
    let g = ScreenGeometry::new(4, 3).unwrap();
    let buf = render(&desc, g, SamplingParams::new(3, 2).unwrap());
    for px in buf.samples().chunks_exact(4) {
        for c in 0..3 {
            assert!((px[c] - desc.background[c]).abs() < 1e-5, "{px:?}");
        }
        assert_eq!(px[3], 0.0);
    }
}

#[test]
fn center_ray_hits_nearest_sphere() {
    let desc = SphereSceneDesc::default();
    let g = ScreenGeometry::new(9, 9).unwrap();
    let buf = render(&desc, g, SamplingParams::default());
    let [r, gr, b, _] = buf.pixel(4, 4).unwrap();
    assert!(r > gr && r > b, "expected red sphere at center, got {r} {gr} {b}");
    let corner = buf.pixel(0, 0).unwrap();
    assert!((corner[0] - desc.background[0]).abs() < 1e-5);
}

#[test]
fn rendering_is_deterministic() {
    let desc = SphereSceneDesc::default();
    let g = ScreenGeometry::new(16, 8).unwrap();
    let sampling = SamplingParams::new(2, 3).unwrap();
    assert_eq!(render(&desc, g, sampling), render(&desc, g, sampling));
}

#[test]
fn jitter_stays_in_unit_square() {
    for x in 0..8 {
        for it in 0..4 {
            let (a, b) = jitter(x, 3, x * 2, it);
            assert!((0.0..1.0).contains(&a));
            assert!((0.0..1.0).contains(&b));
        }
    }
}
