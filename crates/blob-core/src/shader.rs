//! CPU reference of the per-pixel raymarch shader.
//!
//! `shaders/overlay.wgsl` is a line-for-line port of this module; the CPU
//! version exists for headless snapshots and for testing the numerics.

use crate::camera::CameraFrame;
use crate::constants::*;
use crate::field::{animated_noise_uv, SceneField};
use crate::params::ParamSnapshot;
use crate::texture::{CubeMap, Texture2D};
use glam::{Vec2, Vec3, Vec4};
use serde::Deserialize;

/// How a hit pixel gets its base color before the fresnel blend.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ShadingMode {
    /// Scrolling noise texture mapped by longitude/latitude of the hit point.
    NoiseSphere,
    /// Backdrop refracted per color channel with a slightly different IOR.
    ChromaticDispersion,
}

impl ShadingMode {
    pub const fn as_u32(self) -> u32 {
        match self {
            ShadingMode::NoiseSphere => 0,
            ShadingMode::ChromaticDispersion => 1,
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "noise-sphere" => Some(Self::NoiseSphere),
            "chromatic-dispersion" => Some(Self::ChromaticDispersion),
            _ => None,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            ShadingMode::NoiseSphere => "noise-sphere",
            ShadingMode::ChromaticDispersion => "chromatic-dispersion",
        }
    }
}

/// Anything that can be sphere traced.
pub trait DistanceField {
    fn distance(&self, p: Vec3) -> f32;
}

impl DistanceField for SceneField<'_> {
    #[inline]
    fn distance(&self, p: Vec3) -> f32 {
        self.map(p)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MarchStatus {
    /// Field dropped below `MIN_DIST`.
    Hit,
    /// Travelled past `MAX_DIST`, or the field produced a non-finite value.
    Miss,
    /// Ran out of iterations while still inside `MAX_DIST`. Shaded like a hit.
    Exhausted,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MarchResult {
    pub t: f32,
    pub steps: u32,
    pub status: MarchStatus,
}

impl MarchResult {
    #[inline]
    pub fn is_surface(&self) -> bool {
        !matches!(self.status, MarchStatus::Miss)
    }
}

/// Sphere trace from `origin` along unit `dir`.
///
/// Always terminates within `MAX_STEPS` field evaluations, whatever the field
/// returns. A step that lands past `MAX_DIST` is a miss even if the field is
/// already below `MIN_DIST` there.
pub fn march<F: DistanceField + ?Sized>(field: &F, origin: Vec3, dir: Vec3) -> MarchResult {
    let mut t = 0.0_f32;
    for i in 0..MAX_STEPS {
        let d = field.distance(origin + dir * t);
        let steps = i + 1;
        if !d.is_finite() {
            return MarchResult { t, steps, status: MarchStatus::Miss };
        }
        if t > MAX_DIST {
            return MarchResult { t, steps, status: MarchStatus::Miss };
        }
        if d < MIN_DIST {
            return MarchResult { t, steps, status: MarchStatus::Hit };
        }
        t += d * STEP_RELAXATION;
    }
    let status = if t > MAX_DIST {
        MarchStatus::Miss
    } else {
        MarchStatus::Exhausted
    };
    MarchResult { t, steps: MAX_STEPS, status }
}

/// GLSL `reflect`.
#[inline]
pub fn reflect(i: Vec3, n: Vec3) -> Vec3 {
    i - 2.0 * n.dot(i) * n
}

/// GLSL `refract`; zero vector on total internal reflection.
#[inline]
pub fn refract(i: Vec3, n: Vec3, eta: f32) -> Vec3 {
    let cos_i = n.dot(i);
    let k = 1.0 - eta * eta * (1.0 - cos_i * cos_i);
    if k < 0.0 {
        Vec3::ZERO
    } else {
        eta * i - (eta * cos_i + k.sqrt()) * n
    }
}

/// `(1 + rd.n)^exponent`, with the base kept non-negative.
#[inline]
pub fn fresnel(rd: Vec3, n: Vec3, exponent: f32) -> f32 {
    (1.0 + rd.dot(n)).max(0.0).powf(exponent)
}

/// Inputs bound to the shader for one frame.
#[derive(Clone, Copy)]
pub struct ShaderContext<'a> {
    pub camera: &'a CameraFrame,
    pub params: &'a ParamSnapshot,
    /// Animation time: elapsed seconds times the speed parameter.
    pub time: f32,
    pub mode: ShadingMode,
    pub backdrop: &'a Texture2D,
    pub environment: &'a CubeMap,
    pub noise: &'a Texture2D,
}

pub struct RaymarchShader<'a> {
    ctx: ShaderContext<'a>,
    field: SceneField<'a>,
}

impl<'a> RaymarchShader<'a> {
    pub fn new(ctx: ShaderContext<'a>, field: SceneField<'a>) -> Self {
        Self { ctx, field }
    }

    /// Color for the pixel at quad/screen `uv`. Alpha is 0 on a miss, 1 on
    /// a hit.
    pub fn shade(&self, uv: Vec2) -> Vec4 {
        self.shade_with_stats(uv).0
    }

    pub fn shade_with_stats(&self, uv: Vec2) -> (Vec4, MarchResult) {
        let (ro, rd) = self.ctx.camera.ray(uv);
        let result = march(&self.field, ro, rd);
        if !result.is_surface() {
            return (Vec4::new(1.0, 1.0, 1.0, 0.0), result);
        }

        let pos = ro + rd * result.t;
        let nor = self.field.normal(pos);
        let reflected = self.ctx.environment.sample(reflect(rd, nor)).truncate();

        let base = match self.ctx.mode {
            ShadingMode::NoiseSphere => self.noise_base(pos),
            ShadingMode::ChromaticDispersion => self.dispersion_base(uv, rd, nor),
        };

        let f = fresnel(rd, nor, self.ctx.params.reflection);
        let color = base
            .lerp(reflected, f)
            .clamp(Vec3::ZERO, Vec3::ONE)
            .powf(OUTPUT_GAMMA);
        (color.extend(1.0), result)
    }

    fn noise_base(&self, pos: Vec3) -> Vec3 {
        let uv = animated_noise_uv(pos, self.ctx.params.noise_scale, self.ctx.time);
        self.ctx.noise.sample(uv).truncate()
    }

    /// Averages `DISPERSION_TAPS` backdrop lookups per channel. Each tap pushes
    /// the refraction offset a little further, more so for blue than red,
    /// scaled by the chromatic-aberration weight.
    fn dispersion_base(&self, uv: Vec2, rd: Vec3, nor: Vec3) -> Vec3 {
        let p = self.ctx.params;
        let offsets = [
            refract(rd, nor, p.ior + p.dispersion).truncate(),
            refract(rd, nor, p.ior).truncate(),
            refract(rd, nor, p.ior - p.dispersion).truncate(),
        ];
        let mut color = Vec3::ZERO;
        for i in 0..DISPERSION_TAPS {
            let slide = i as f32 / DISPERSION_TAPS as f32 * DISPERSION_SLIDE_SPAN;
            for (c, offset) in offsets.iter().enumerate() {
                let strength = p.refract + slide * p.chromatic_aberration * (c as f32 + 1.0);
                color[c] += self.ctx.backdrop.sample(uv + *offset * strength)[c];
            }
        }
        color / DISPERSION_TAPS as f32
    }
}
