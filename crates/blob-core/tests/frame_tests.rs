// Whole-frame pipeline on the CPU: snapshot, backdrop, quad, raymarch, composite.

use blob_core::*;
use glam::Vec4;

fn renderer(mode: ShadingMode, buffering: BufferingMode) -> FrameRenderer<StudioBackdrop> {
    FrameRenderer::new(
        StudioBackdrop::default(),
        buffering,
        SceneAssets::placeholder(),
        RenderSettings {
            shading: mode,
            surface_noise: false,
        },
    )
}

fn small_viewport() -> Viewport {
    Viewport::new(32, 18, 1.0).unwrap()
}

#[test]
fn frame_numbers_increase_and_time_scales_with_speed() {
    let mut r = renderer(ShadingMode::NoiseSphere, BufferingMode::ZeroLag);
    let mut store = ParameterStore::default();
    store.set(ParamKey::Speed, 2.0);
    let (_input, mut reader) = InputState::new(small_viewport());
    let a = r.begin_frame(0.5, &store, &mut reader);
    let b = r.begin_frame(0.75, &store, &mut reader);
    assert_eq!((a.frame, b.frame), (0, 1));
    assert_eq!(a.animation_time(), 1.0);
    assert_eq!(b.animation_time(), 1.5);
}

#[test]
fn parameter_changes_after_begin_frame_are_not_seen() {
    let mut r = renderer(ShadingMode::NoiseSphere, BufferingMode::ZeroLag);
    let mut store = ParameterStore::default();
    let (mut input, mut reader) = InputState::new(small_viewport());
    let inputs = r.begin_frame(0.0, &store, &mut reader);
    store.set(ParamKey::Count, 12.0);
    input.on_pointer_move(0.0, 0.0);
    assert_eq!(inputs.params.count, 3);
    assert_eq!(inputs.input.pointer, PointerState::default());
}

#[test]
fn blob_covers_center_and_leaves_corners_transparent() {
    for mode in [ShadingMode::NoiseSphere, ShadingMode::ChromaticDispersion] {
        let mut r = renderer(mode, BufferingMode::ZeroLag);
        let (_input, mut reader) = InputState::new(small_viewport());
        let inputs = r.begin_frame(0.0, &ParameterStore::default(), &mut reader);
        let camera = CameraFrame::default().with_aspect(inputs.viewport().aspect()).unwrap();
        let frame = r.render_frame(&inputs, &camera);

        assert_eq!(frame.overlay.size(), (32, 18));
        assert_eq!(frame.overlay.texel(16, 9).w, 1.0);
        assert_eq!(frame.overlay.texel(0, 0).w, 0.0);
        assert!(frame.stats.hits > 0 && frame.stats.misses > 0);
        assert_eq!(frame.stats.hits + frame.stats.misses + frame.stats.exhausted, 32 * 18);
        assert!(frame.stats.max_steps <= MAX_STEPS);
    }
}

#[test]
fn composite_shows_backdrop_where_ray_missed() {
    let mut r = renderer(ShadingMode::ChromaticDispersion, BufferingMode::ZeroLag);
    let (_input, mut reader) = InputState::new(small_viewport());
    let inputs = r.begin_frame(0.0, &ParameterStore::default(), &mut reader);
    let camera = CameraFrame::default().with_aspect(inputs.viewport().aspect()).unwrap();
    let frame = r.render_frame(&inputs, &camera);

    let backdrop = r.compositor().texture();
    assert_eq!(frame.composited.texel(0, 0), backdrop.texel(0, 0));
    assert!(frame.composited.texels().iter().all(|t| t.w == 1.0));
    let center = frame.composited.texel(16, 9);
    assert!(center.abs_diff_eq(frame.overlay.texel(16, 9).truncate().extend(1.0), 1e-6));
}

#[test]
fn zero_lag_samples_same_frame_backdrop() {
    let mut r = renderer(ShadingMode::NoiseSphere, BufferingMode::ZeroLag);
    let (_input, mut reader) = InputState::new(small_viewport());
    let store = ParameterStore::default();
    let camera = CameraFrame::default().with_aspect(small_viewport().aspect()).unwrap();
    for _ in 0..3 {
        let inputs = r.begin_frame(0.0, &store, &mut reader);
        let frame = r.render_frame(&inputs, &camera);
        assert_eq!(frame.backdrop_frame, Some(inputs.frame));
    }
}

#[test]
fn double_buffered_samples_previous_backdrop() {
    let mut r = renderer(ShadingMode::NoiseSphere, BufferingMode::DoubleBuffered);
    let (_input, mut reader) = InputState::new(small_viewport());
    let store = ParameterStore::default();
    let camera = CameraFrame::default().with_aspect(small_viewport().aspect()).unwrap();
    let first = r.begin_frame(0.0, &store, &mut reader);
    assert_eq!(r.render_frame(&first, &camera).backdrop_frame, Some(0));
    let second = r.begin_frame(0.016, &store, &mut reader);
    assert_eq!(r.render_frame(&second, &camera).backdrop_frame, Some(0));
    let third = r.begin_frame(0.032, &store, &mut reader);
    assert_eq!(r.render_frame(&third, &camera).backdrop_frame, Some(1));
}

#[test]
fn resize_between_frames_reallocates_before_sampling() {
    let mut r = renderer(ShadingMode::NoiseSphere, BufferingMode::ZeroLag);
    let (mut input, mut reader) = InputState::new(small_viewport());
    let store = ParameterStore::default();
    let inputs = r.begin_frame(0.0, &store, &mut reader);
    let camera = CameraFrame::default().with_aspect(inputs.viewport().aspect()).unwrap();
    r.render_frame(&inputs, &camera);

    input.on_resize(16, 16, 3.0);
    let inputs = r.begin_frame(0.0, &store, &mut reader);
    let camera = camera.with_aspect(inputs.viewport().aspect()).unwrap();
    let frame = r.render_frame(&inputs, &camera);
    assert_eq!(r.compositor().pixel_size(), (32, 32));
    assert_eq!(frame.composited.size(), (32, 32));
}

#[test]
fn moving_pointer_moves_the_blob() {
    let mut r = renderer(ShadingMode::NoiseSphere, BufferingMode::ZeroLag);
    let (mut input, mut reader) = InputState::new(small_viewport());
    let store = ParameterStore::default();
    let camera = CameraFrame::default().with_aspect(small_viewport().aspect()).unwrap();
    let inputs = r.begin_frame(0.0, &store, &mut reader);
    let still = r.render_frame(&inputs, &camera);

    // halfway to the right edge: pointer sphere lands at x = 0.5 * aspect * 2.5
    input.on_pointer_move(24.0, 9.0);
    let inputs = r.begin_frame(0.0, &store, &mut reader);
    let moved = r.render_frame(&inputs, &camera);
    assert_eq!(still.overlay.texel(24, 9).w, 0.0);
    assert_eq!(moved.overlay.texel(24, 9).w, 1.0);
}

#[test]
fn surface_noise_changes_the_silhouette() {
    let white = SceneAssets {
        environment: CubeMap::uniform(Vec4::ONE),
        noise: Texture2D::solid(Vec4::ONE, SamplerDesc::REPEAT_LINEAR),
    };
    let mut r = FrameRenderer::new(
        StudioBackdrop::default(),
        BufferingMode::ZeroLag,
        white,
        RenderSettings {
            shading: ShadingMode::NoiseSphere,
            surface_noise: true,
        },
    );
    let (_input, mut reader) = InputState::new(small_viewport());
    let mut store = ParameterStore::default();
    store.set(ParamKey::NoiseAmount, 0.5);
    let camera = CameraFrame::default().with_aspect(small_viewport().aspect()).unwrap();
    let inputs = r.begin_frame(0.0, &store, &mut reader);
    let noisy = r.render_frame(&inputs, &camera);

    let mut plain = renderer(ShadingMode::NoiseSphere, BufferingMode::ZeroLag);
    let (_input, mut reader) = InputState::new(small_viewport());
    let inputs = plain.begin_frame(0.0, &store, &mut reader);
    let flat = plain.render_frame(&inputs, &camera);
    assert!(noisy.stats.hits > flat.stats.hits);
}

#[test]
fn rendered_frame_exports_to_rgba8() {
    let mut r = renderer(ShadingMode::NoiseSphere, BufferingMode::ZeroLag);
    let (_input, mut reader) = InputState::new(small_viewport());
    let inputs = r.begin_frame(0.0, &ParameterStore::default(), &mut reader);
    let camera = CameraFrame::default().with_aspect(inputs.viewport().aspect()).unwrap();
    let image = r.render_frame(&inputs, &camera).composited.to_rgba8();
    assert_eq!(image.dimensions(), (32, 18));
    assert!(image.pixels().all(|p| p.0[3] == 255));
}
