//! The blob's implicit surface.
//!
//! A pointer-tracking sphere and `count` animated spheres, folded together
//! with a polynomial smooth union. Sphere sizes and motion come from a
//! sine-based hash of the sphere index, so the same index and time always
//! give the same geometry.

use crate::constants::*;
use crate::input::PointerState;
use crate::params::ParamSnapshot;
use crate::texture::Texture2D;
use glam::{Vec2, Vec3};
use std::f32::consts::PI;

/// GLSL `fract`: always in `[0, 1)`, unlike `f32::fract` for negatives.
#[inline]
pub fn fract(v: f32) -> f32 {
    v - v.floor()
}

/// `fract(sin(v) * 43237.5324)`
#[inline]
pub fn hash(v: f32) -> f32 {
    fract(v.sin() * HASH_SCALE)
}

#[inline]
pub fn hash3(v: f32) -> Vec3 {
    Vec3::new(hash(v), hash(v * HASH3_Y_SCALE), hash(v * HASH3_Z_SCALE))
}

/// Polynomial smooth minimum.
///
/// Never exceeds `min(d1, d2)`, is symmetric in its distance arguments and
/// collapses to `min` as `k -> 0`.
#[inline]
pub fn op_smooth_union(d1: f32, d2: f32, k: f32) -> f32 {
    if k <= 0.0 {
        return d1.min(d2);
    }
    let h = (0.5 + 0.5 * (d2 - d1) / k).clamp(0.0, 1.0);
    d2 + (d1 - d2) * h - k * h * (1.0 - h)
}

/// GLSL `smoothstep`, including reversed edges.
#[inline]
pub fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// Longitude/latitude of a direction, both in `[0, 1]`.
#[inline]
pub fn spherical_uv(p: Vec3) -> Vec2 {
    let len = p.length().max(f32::MIN_POSITIVE);
    Vec2::new(
        0.5 + p.z.atan2(p.x) / (2.0 * PI),
        0.5 + (p.y / len).clamp(-1.0, 1.0).asin() / PI,
    )
}

/// Scrolled noise coordinate used both for surface displacement and for the
/// noise-sphere base color. The axes swap on purpose.
#[inline]
pub fn animated_noise_uv(p: Vec3, noise_scale: f32, time: f32) -> Vec2 {
    let uv = spherical_uv(p) * noise_scale;
    Vec2::new(uv.y + time * NOISE_SCROLL_U, uv.x + time * NOISE_SCROLL_V)
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Sphere {
    pub center: Vec3,
    pub radius: f32,
}

impl Sphere {
    #[inline]
    pub fn distance(&self, p: Vec3) -> f32 {
        (p - self.center).length() - self.radius
    }
}

/// Animated sphere `index` (0-based) at animation time `time`.
pub fn static_sphere(index: u32, size: f32, time: f32) -> Sphere {
    let fi = index as f32 + 1.0;
    let radius = MAX_BALL_RADIUS.min(size + BALL_RADIUS_HASH_SPAN * hash(fi));
    let phase = hash3(fi) * time;
    let center = BALL_ORBIT_AMPLITUDE * Vec3::new(phase.x.sin(), phase.y.sin(), phase.z.sin());
    Sphere { center, radius }
}

/// Sphere following the pointer in the `z = 0` plane.
pub fn pointer_sphere(pointer: PointerState, aspect: f32, radius: f32) -> Sphere {
    Sphere {
        center: Vec3::new(
            pointer.x * aspect * POINTER_SPREAD,
            pointer.y * POINTER_SPREAD,
            0.0,
        ),
        radius,
    }
}

/// Optional noise displacement of each sphere's surface.
#[derive(Clone, Copy)]
pub struct SurfaceNoise<'a> {
    pub texture: &'a Texture2D,
    pub scale: f32,
    pub amount: f32,
}

/// One frame's distance field. Cheap to build; spheres are resolved up front
/// so the per-step cost is `count + 1` sphere evaluations.
#[derive(Clone)]
pub struct SceneField<'a> {
    pointer: Sphere,
    spheres: Vec<Sphere>,
    time: f32,
    noise: Option<SurfaceNoise<'a>>,
}

impl<'a> SceneField<'a> {
    /// `time` is the animation time (elapsed seconds times speed), `aspect`
    /// the viewport width over height.
    pub fn new(params: &ParamSnapshot, pointer: PointerState, aspect: f32, time: f32) -> Self {
        let count = params.count.clamp(1, MAX_BALLS);
        Self {
            pointer: pointer_sphere(pointer, aspect, params.pointer_size),
            spheres: (0..count).map(|i| static_sphere(i, params.size, time)).collect(),
            time,
            noise: None,
        }
    }

    pub fn with_surface_noise(mut self, noise: SurfaceNoise<'a>) -> Self {
        self.noise = Some(noise);
        self
    }

    pub fn pointer(&self) -> &Sphere {
        &self.pointer
    }

    pub fn spheres(&self) -> &[Sphere] {
        &self.spheres
    }

    #[inline]
    fn sphere_distance(&self, s: &Sphere, p: Vec3) -> f32 {
        let local = p - s.center;
        let d = local.length() - s.radius;
        match self.noise {
            Some(n) if local.length_squared() > 1e-12 => {
                let uv = animated_noise_uv(local, n.scale, self.time);
                let fade = smoothstep(SURFACE_NOISE_FADE_OUTER, SURFACE_NOISE_FADE_INNER, local.x.abs());
                d - n.texture.sample(uv).x * fade * n.amount
            }
            _ => d,
        }
    }

    /// Signed distance from `p` to the blob.
    pub fn map(&self, p: Vec3) -> f32 {
        self.spheres.iter().fold(self.sphere_distance(&self.pointer, p), |res, s| {
            op_smooth_union(res, self.sphere_distance(s, p), SMOOTH_UNION_K)
        })
    }

    /// Tetrahedral 4-tap gradient, normalized. Zero where the gradient vanishes.
    pub fn normal(&self, p: Vec3) -> Vec3 {
        let e = NORMAL_EPSILON;
        let k_xyy = Vec3::new(e, -e, -e);
        let k_yxy = Vec3::new(-e, e, -e);
        let k_yyx = Vec3::new(-e, -e, e);
        let k_xxx = Vec3::new(e, e, e);
        (k_xyy * self.map(p + k_xyy)
            + k_yxy * self.map(p + k_yxy)
            + k_yyx * self.map(p + k_yyx)
            + k_xxx * self.map(p + k_xxx))
        .normalize_or_zero()
    }
}
