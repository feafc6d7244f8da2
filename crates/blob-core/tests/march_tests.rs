// Sphere tracing and per-pixel shading.

use blob_core::*;
use glam::{Vec2, Vec3, Vec4};
use std::cell::Cell;

/// Field with a fixed value that counts its evaluations.
struct CountingField {
    value: f32,
    calls: Cell<u32>,
}

impl CountingField {
    fn new(value: f32) -> Self {
        Self {
            value,
            calls: Cell::new(0),
        }
    }
}

impl DistanceField for CountingField {
    fn distance(&self, _p: Vec3) -> f32 {
        self.calls.set(self.calls.get() + 1);
        self.value
    }
}

/// Wall at `x = offset`, facing the origin.
struct Plane {
    offset: f32,
}

impl DistanceField for Plane {
    fn distance(&self, p: Vec3) -> f32 {
        self.offset - p.x
    }
}

fn scene(count: u32) -> (ParamSnapshot, CameraFrame) {
    let mut params = ParamSnapshot::default();
    params.count = count;
    (params, CameraFrame::default())
}

// ---------------- march ----------------

#[test]
fn march_hits_blob_at_screen_center() {
    let (params, camera) = scene(3);
    let field = SceneField::new(&params, PointerState::default(), camera.aspect(), 0.0);
    let (ro, rd) = camera.ray(Vec2::splat(0.5));
    let r = march(&field, ro, rd);
    assert_eq!(r.status, MarchStatus::Hit);
    assert!(r.t > 0.0 && r.t < 3.0);
    assert!(r.steps <= MAX_STEPS);
}

#[test]
fn march_misses_past_max_dist() {
    let (params, camera) = scene(3);
    let field = SceneField::new(&params, PointerState::default(), camera.aspect(), 0.0);
    let (ro, rd) = camera.ray(Vec2::ZERO);
    let r = march(&field, ro, rd);
    assert_eq!(r.status, MarchStatus::Miss);
    assert!(!r.is_surface());
}

#[test]
fn march_iteration_cap_is_enforced_for_any_count() {
    for count in [1, 3, 20] {
        let (params, camera) = scene(count);
        let field = SceneField::new(&params, PointerState::default(), camera.aspect(), 1.3);
        for uv in [Vec2::ZERO, Vec2::splat(0.5), Vec2::new(0.3, 0.7), Vec2::ONE] {
            let (ro, rd) = camera.ray(uv);
            assert!(march(&field, ro, rd).steps <= MAX_STEPS);
        }
    }
}

#[test]
fn march_terminates_on_field_that_never_converges() {
    // tiny positive steps: never hits, never reaches MAX_DIST
    let field = CountingField::new(MIN_DIST * 2.0);
    let r = march(&field, Vec3::ZERO, Vec3::Z);
    assert_eq!(field.calls.get(), MAX_STEPS);
    assert_eq!(r.steps, MAX_STEPS);
    assert_eq!(r.status, MarchStatus::Exhausted);
    assert!(r.is_surface());
}

#[test]
fn march_treats_non_finite_field_as_miss() {
    for value in [f32::NAN, f32::INFINITY, f32::NEG_INFINITY] {
        let field = CountingField::new(value);
        let r = march(&field, Vec3::ZERO, Vec3::Z);
        assert_eq!(r.status, MarchStatus::Miss);
        assert_eq!(field.calls.get(), 1);
    }
}

#[test]
fn march_hits_plane_inside_max_dist() {
    let r = march(&Plane { offset: 3.0 }, Vec3::ZERO, Vec3::X);
    assert_eq!(r.status, MarchStatus::Hit);
    assert!(r.t <= MAX_DIST && (r.t - 3.0).abs() < MIN_DIST);
}

#[test]
fn march_never_hits_beyond_max_dist() {
    // walls just past MAX_DIST: the last step can land beyond it with the
    // field already under MIN_DIST
    let mut beyond = 0;
    for i in 0..=500 {
        let offset = MAX_DIST + i as f32 * 1e-4;
        let r = march(&Plane { offset }, Vec3::ZERO, Vec3::X);
        if r.t > MAX_DIST {
            beyond += 1;
            assert_eq!(r.status, MarchStatus::Miss, "offset {} -> {:?}", offset, r);
        }
        if r.is_surface() {
            assert!(r.t <= MAX_DIST, "offset {} -> {:?}", offset, r);
        }
    }
    assert!(beyond > 0);
}

#[test]
fn march_reports_hit_when_starting_inside() {
    let field = CountingField::new(-1.0);
    let r = march(&field, Vec3::ZERO, Vec3::Z);
    assert_eq!(r.status, MarchStatus::Hit);
    assert_eq!(r.t, 0.0);
    assert_eq!(r.steps, 1);
}

// ---------------- optics helpers ----------------

#[test]
fn reflect_mirrors_about_normal() {
    let r = reflect(Vec3::new(1.0, -1.0, 0.0), Vec3::Y);
    assert!(r.abs_diff_eq(Vec3::new(1.0, 1.0, 0.0), 1e-6));
}

#[test]
fn refract_straight_through_keeps_direction() {
    let r = refract(-Vec3::Z, Vec3::Z, 0.8);
    assert!(r.abs_diff_eq(-Vec3::Z, 1e-6));
}

#[test]
fn refract_total_internal_reflection_is_zero() {
    let i = Vec3::new(1.0, -0.01, 0.0).normalize();
    assert_eq!(refract(i, Vec3::Y, 1.5), Vec3::ZERO);
}

#[test]
fn fresnel_is_zero_head_on_and_one_at_grazing() {
    assert_eq!(fresnel(-Vec3::Z, Vec3::Z, 1.5), 0.0);
    assert!((fresnel(Vec3::X, Vec3::Z, 1.5) - 1.0).abs() < 1e-6);
    // never negative, even for back-facing normals
    assert!(fresnel(Vec3::Z, Vec3::Z, 2.0) >= 0.0);
}

// ---------------- shader ----------------

fn shade_pixels(mode: ShadingMode, uvs: &[Vec2]) -> Vec<Vec4> {
    let (params, camera) = scene(3);
    let backdrop = Texture2D::new(8, 8, Vec4::new(0.2, 0.4, 0.6, 1.0), SamplerDesc::CLAMP_LINEAR);
    let assets = SceneAssets::placeholder();
    let field = SceneField::new(&params, PointerState::default(), camera.aspect(), 0.0);
    let shader = RaymarchShader::new(
        ShaderContext {
            camera: &camera,
            params: &params,
            time: 0.0,
            mode,
            backdrop: &backdrop,
            environment: &assets.environment,
            noise: &assets.noise,
        },
        field,
    );
    uvs.iter().map(|&uv| shader.shade(uv)).collect()
}

#[test]
fn miss_pixels_are_fully_transparent() {
    for mode in [ShadingMode::NoiseSphere, ShadingMode::ChromaticDispersion] {
        let c = shade_pixels(mode, &[Vec2::ZERO, Vec2::ONE]);
        for px in c {
            assert_eq!(px, Vec4::new(1.0, 1.0, 1.0, 0.0));
        }
    }
}

#[test]
fn hit_pixels_are_opaque_and_in_range() {
    for mode in [ShadingMode::NoiseSphere, ShadingMode::ChromaticDispersion] {
        let c = shade_pixels(mode, &[Vec2::splat(0.5), Vec2::new(0.52, 0.48)]);
        for px in c {
            assert_eq!(px.w, 1.0);
            assert!(px.truncate().cmpge(Vec3::ZERO).all() && px.truncate().cmple(Vec3::ONE).all());
        }
    }
}

#[test]
fn head_on_dispersion_pixel_shows_backdrop_through_gamma() {
    // at the exact center the normal faces the camera, so fresnel is ~0 and
    // the uniform backdrop comes through unchanged apart from gamma
    let px = shade_pixels(ShadingMode::ChromaticDispersion, &[Vec2::splat(0.5)])[0];
    let expected = Vec3::new(0.2, 0.4, 0.6).powf(OUTPUT_GAMMA);
    assert!(px.truncate().abs_diff_eq(expected, 1e-2), "{:?} vs {:?}", px, expected);
}

#[test]
fn shading_mode_names_round_trip() {
    for mode in [ShadingMode::NoiseSphere, ShadingMode::ChromaticDispersion] {
        assert_eq!(ShadingMode::parse(mode.as_str()), Some(mode));
    }
    assert_eq!(ShadingMode::parse("plasma"), None);
}
