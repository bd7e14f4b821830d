//! A small analytic ray caster used by the `tilecast` binary and the benchmarks.
//!
//! Rays leave a pinhole camera, hit the nearest sphere and are shaded with a single directional
//! light plus an ambient term. Sampling follows the accumulation scheme of the compute contract:
//! every iteration adds the average of a `subpixel_count²` stratified grid into the patch, then
//! the patch is divided by the iteration count. Sample jitter is a hash of pixel, subpixel and
//! iteration, so output does not depend on how patches are scheduled.

use anyhow::{bail, ensure};
use glam::Vec3;

use crate::buffer::PatchView;
use crate::engine::contract::{ComputeEngine, PatchRequest};
use crate::foundation::core::CHANNELS;

const HIT_EPSILON: f32 = 1e-4;

/// Pinhole camera description.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct CameraDesc {
    /// Eye position.
    pub position: Vec3,
    /// Point the camera looks at.
    pub look_at: Vec3,
    /// Approximate up direction.
    pub up: Vec3,
    /// Vertical field of view in degrees, in `(0, 180)`.
    pub fov_deg: f32,
}

impl Default for CameraDesc {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            look_at: Vec3::X,
            up: Vec3::Y,
            fov_deg: 90.0,
        }
    }
}

/// One sphere with a flat albedo.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SphereDesc {
    /// Center in world space.
    pub center: Vec3,
    /// Radius, `> 0`.
    pub radius: f32,
    /// Linear RGB albedo.
    pub color: [f32; 3],
}

/// Scene description consumed by [`SphereEngine::create_scene`].
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct SphereSceneDesc {
    /// Camera.
    pub camera: CameraDesc,
    /// Direction light travels in (towards the scene).
    pub light_dir: Vec3,
    /// Ambient fraction in `[0, 1]`.
    pub ambient: f32,
    /// Linear RGB returned for rays that miss.
    pub background: [f32; 3],
    /// Spheres.
    pub spheres: Vec<SphereDesc>,
}

impl Default for SphereSceneDesc {
    fn default() -> Self {
        Self {
            camera: CameraDesc::default(),
            light_dir: Vec3::new(1.0, -1.0, -0.5),
            ambient: 0.1,
            background: [0.05, 0.06, 0.09],
            spheres: vec![
                SphereDesc {
                    center: Vec3::new(10.0, 0.0, 0.0),
                    radius: 2.0,
                    color: [0.9, 0.2, 0.2],
                },
                SphereDesc {
                    center: Vec3::new(13.0, 0.0, 3.0),
                    radius: 2.0,
                    color: [0.2, 0.8, 0.3],
                },
                SphereDesc {
                    center: Vec3::new(17.0, 0.0, -4.0),
                    radius: 2.0,
                    color: [0.2, 0.4, 0.9],
                },
            ],
        }
    }
}

/// Validated, render-ready form of a [`SphereSceneDesc`].
#[derive(Clone, Debug)]
pub struct SphereScene {
    eye: Vec3,
    forward: Vec3,
    right: Vec3,
    up: Vec3,
    tan_half_fov: f32,
    to_light: Vec3,
    ambient: f32,
    background: Vec3,
    spheres: Vec<SphereDesc>,
}

impl SphereScene {
    /// Number of spheres in the scene.
    pub fn sphere_count(&self) -> usize {
        self.spheres.len()
    }

    fn trace(&self, dir: Vec3) -> Vec3 {
        let mut nearest: Option<(f32, &SphereDesc)> = None;
        for s in &self.spheres {
            if let Some(t) = intersect(self.eye, dir, s)
                && nearest.is_none_or(|(best, _)| t < best)
            {
                nearest = Some((t, s));
            }
        }

        let Some((t, sphere)) = nearest else {
            return self.background;
        };
        let hit = self.eye + dir * t;
        let normal = (hit - sphere.center) / sphere.radius;
        let lambert = normal.dot(self.to_light).max(0.0);
        Vec3::from(sphere.color) * (self.ambient + (1.0 - self.ambient) * lambert)
    }
}

fn intersect(origin: Vec3, dir: Vec3, sphere: &SphereDesc) -> Option<f32> {
    let oc = origin - sphere.center;
    let b = oc.dot(dir);
    let c = oc.length_squared() - sphere.radius * sphere.radius;
    let disc = b * b - c;
    if disc < 0.0 {
        return None;
    }
    let root = disc.sqrt();
    [-b - root, -b + root]
        .into_iter()
        .find(|&t| t > HIT_EPSILON)
}

/// Reference [`ComputeEngine`] rendering a [`SphereSceneDesc`].
#[derive(Clone, Copy, Debug, Default)]
pub struct SphereEngine;

impl ComputeEngine for SphereEngine {
    type Scene = SphereScene;
    type SceneDesc = SphereSceneDesc;

    fn create_scene(&self, desc: &SphereSceneDesc) -> anyhow::Result<SphereScene> {
        let cam = &desc.camera;
        ensure!(
            cam.fov_deg.is_finite() && cam.fov_deg > 0.0 && cam.fov_deg < 180.0,
            "camera fov_deg must be in (0, 180), got {}",
            cam.fov_deg
        );
        ensure!(
            cam.position.is_finite() && cam.look_at.is_finite() && cam.up.is_finite(),
            "camera vectors must be finite"
        );
        let forward = (cam.look_at - cam.position).normalize_or_zero();
        if forward == Vec3::ZERO {
            bail!("camera look_at must differ from position");
        }
        let right = forward.cross(cam.up).normalize_or_zero();
        if right == Vec3::ZERO {
            bail!("camera up must not be parallel to the view direction");
        }
        let up = right.cross(forward);

        let to_light = -desc.light_dir.normalize_or_zero();
        ensure!(
            to_light != Vec3::ZERO && to_light.is_finite(),
            "light_dir must be a finite non-zero vector"
        );
        ensure!(
            (0.0..=1.0).contains(&desc.ambient),
            "ambient must be in [0, 1], got {}",
            desc.ambient
        );
        for (i, s) in desc.spheres.iter().enumerate() {
            ensure!(
                s.radius.is_finite() && s.radius > 0.0,
                "sphere {i}: radius must be finite and > 0, got {}",
                s.radius
            );
            ensure!(s.center.is_finite(), "sphere {i}: center must be finite");
        }

        Ok(SphereScene {
            eye: cam.position,
            forward,
            right,
            up,
            tan_half_fov: (cam.fov_deg.to_radians() * 0.5).tan(),
            to_light,
            ambient: desc.ambient,
            background: Vec3::from(desc.background),
            spheres: desc.spheres.clone(),
        })
    }

    fn compute_patch(
        &self,
        request: &PatchRequest<'_, SphereScene>,
        out: &mut PatchView<'_>,
    ) -> anyhow::Result<()> {
        let scene = request.scene;
        let screen = request.screen;
        let n = request.sampling.subpixel_count;
        let iterations = request.sampling.iteration_count;
        let width = screen.width as f32;
        let height = screen.height as f32;
        let aspect = width / height;
        let inv_samples = 1.0 / (n * n) as f32;

        for iteration in 0..iterations {
            for (y, row) in out.rows_mut() {
                for (i, px) in row.chunks_exact_mut(CHANNELS).enumerate() {
                    let x = request.patch.start.x + i as u32;
                    let mut color = Vec3::ZERO;
                    for sy in 0..n {
                        for sx in 0..n {
                            let (jx, jy) = jitter(x, y, sy * n + sx, iteration);
                            let u = (x as f32 + (sx as f32 + jx) / n as f32) / width;
                            let v = (y as f32 + (sy as f32 + jy) / n as f32) / height;
                            let ndc_x = (2.0 * u - 1.0) * aspect * scene.tan_half_fov;
                            let ndc_y = (1.0 - 2.0 * v) * scene.tan_half_fov;
                            let dir = (scene.forward + scene.right * ndc_x + scene.up * ndc_y)
                                .normalize();
                            color += nan_to_zero(scene.trace(dir));
                        }
                    }
                    color *= inv_samples;
                    px[0] += color.x;
                    px[1] += color.y;
                    px[2] += color.z;
                    px[3] += 0.0;
                }
            }
        }

        out.scale(1.0 / iterations as f32);
        Ok(())
    }
}

fn nan_to_zero(c: Vec3) -> Vec3 {
    Vec3::new(
        if c.x.is_nan() { 0.0 } else { c.x },
        if c.y.is_nan() { 0.0 } else { c.y },
        if c.z.is_nan() { 0.0 } else { c.z },
    )
}

// splitmix64 over the packed sample coordinates
fn jitter(x: u32, y: u32, subpixel: u32, iteration: u32) -> (f32, f32) {
    let coords = (u64::from(x) << 32) | u64::from(y);
    let sample = (u64::from(subpixel) << 16) | u64::from(iteration);
    let mut z = coords ^ sample.wrapping_mul(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^= z >> 31;
    let hi = (z >> 40) as f32 / (1u64 << 24) as f32;
    let lo = ((z >> 8) & 0xFF_FFFF) as f32 / (1u64 << 24) as f32;
    (hi, lo)
}

#[cfg(test)]
#[path = "../../tests/unit/engine/spheres.rs"]
mod tests;
