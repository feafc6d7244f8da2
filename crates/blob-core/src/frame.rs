//! Frame sequencing for the CPU reference pipeline.
//!
//! Order within one frame:
//! 1. snapshot parameters and input (once; later events wait for next frame)
//! 2. off-screen backdrop render (reallocating first if the viewport changed)
//! 3. overlay quad placement from the camera
//! 4. per-pixel raymarch, composited over the backdrop
//!
//! Textures loaded at startup live in [`SceneAssets`] and are released when the
//! renderer is dropped, on every exit path.

use crate::camera::CameraFrame;
use crate::compositor::{BackdropScene, BufferingMode, FrameBufferCompositor};
use crate::config::AssetConfig;
use crate::error::Result;
use crate::field::{SceneField, SurfaceNoise};
use crate::input::{InputReader, InputSnapshot, Viewport};
use crate::params::{ParamSnapshot, ParameterStore};
use crate::quad::OverlayQuad;
use crate::shader::{MarchStatus, RaymarchShader, ShaderContext, ShadingMode};
use crate::texture::{CubeMap, SamplerDesc, Texture2D};
use glam::{Vec2, Vec4};
use instant::Instant;

/// Wall clock for the animation, started when the renderer comes up.
#[derive(Clone, Copy, Debug)]
pub struct FrameClock {
    start: Instant,
}

impl FrameClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    pub fn elapsed_secs(&self) -> f32 {
        self.start.elapsed().as_secs_f32()
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

/// Immutable per-frame snapshot. Built once at frame start and passed by
/// reference; nothing re-reads the live stores mid-frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameInputs {
    pub frame: u64,
    pub elapsed: f32,
    pub params: ParamSnapshot,
    pub input: InputSnapshot,
}

impl FrameInputs {
    /// Snapshot the live stores for frame `frame`.
    pub fn capture(frame: u64, elapsed: f32, params: &ParameterStore, input: &mut InputReader) -> Self {
        Self {
            frame,
            elapsed,
            params: params.snapshot(),
            input: input.snapshot(),
        }
    }

    /// Elapsed time scaled by the speed parameter; drives all sphere motion.
    #[inline]
    pub fn animation_time(&self) -> f32 {
        self.elapsed * self.params.speed
    }

    #[inline]
    pub fn viewport(&self) -> Viewport {
        self.input.viewport
    }
}

/// Textures loaded once at startup.
pub struct SceneAssets {
    pub environment: CubeMap,
    pub noise: Texture2D,
}

impl SceneAssets {
    /// Load the cubemap faces and the noise texture. Any missing file fails
    /// the whole load.
    pub fn load(config: &AssetConfig) -> Result<Self> {
        let environment = CubeMap::load(&config.cubemap_dir, &config.cubemap_faces)?;
        let noise = Texture2D::load(&config.noise_texture, SamplerDesc::REPEAT_LINEAR)?;
        log::info!(
            "[assets] cubemap {}px, noise {}x{}",
            environment.face_size(),
            noise.width(),
            noise.height()
        );
        Ok(Self { environment, noise })
    }

    /// Flat placeholders, handy for tests and previews without asset files.
    pub fn placeholder() -> Self {
        Self {
            environment: CubeMap::uniform(Vec4::new(0.8, 0.85, 0.9, 1.0)),
            noise: Texture2D::solid(Vec4::new(0.5, 0.5, 0.5, 1.0), SamplerDesc::REPEAT_LINEAR),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RenderSettings {
    pub shading: ShadingMode,
    pub surface_noise: bool,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub hits: u32,
    pub misses: u32,
    pub exhausted: u32,
    /// Largest number of march iterations any pixel used.
    pub max_steps: u32,
}

pub struct RenderedFrame {
    /// Raymarch output alone; alpha 0 where the ray missed.
    pub overlay: Texture2D,
    /// Overlay composited over the backdrop, alpha 1 everywhere.
    pub composited: Texture2D,
    pub quad: OverlayQuad,
    pub backdrop_frame: Option<u64>,
    pub stats: FrameStats,
}

pub struct FrameRenderer<S: BackdropScene> {
    compositor: FrameBufferCompositor<S>,
    assets: SceneAssets,
    settings: RenderSettings,
    next_frame: u64,
}

impl<S: BackdropScene> FrameRenderer<S> {
    pub fn new(scene: S, buffering: BufferingMode, assets: SceneAssets, settings: RenderSettings) -> Self {
        Self {
            compositor: FrameBufferCompositor::new(scene, buffering),
            assets,
            settings,
            next_frame: 0,
        }
    }

    pub fn compositor(&self) -> &FrameBufferCompositor<S> {
        &self.compositor
    }

    /// Take this frame's snapshot. Events that arrive after this call are
    /// only seen by the next frame.
    pub fn begin_frame(&mut self, elapsed: f32, params: &ParameterStore, input: &mut InputReader) -> FrameInputs {
        let frame = self.next_frame;
        self.next_frame += 1;
        FrameInputs::capture(frame, elapsed, params, input)
    }

    /// Run the full pipeline for one frame at the off-screen resolution.
    pub fn render_frame(&mut self, inputs: &FrameInputs, camera: &CameraFrame) -> RenderedFrame {
        let viewport = inputs.viewport();

        // backdrop strictly before anything samples it
        self.compositor.render(inputs.frame, viewport, camera);
        let backdrop = self.compositor.texture();
        debug_assert!(
            self.compositor.mode() != BufferingMode::ZeroLag
                || self.compositor.sampled_frame() == Some(inputs.frame)
        );

        let quad = OverlayQuad::place(camera);
        let time = inputs.animation_time();
        let (w, h) = backdrop.size();
        let aspect = w as f32 / h as f32;

        let mut field = SceneField::new(&inputs.params, inputs.input.pointer, aspect, time);
        if self.settings.surface_noise {
            field = field.with_surface_noise(SurfaceNoise {
                texture: &self.assets.noise,
                scale: inputs.params.noise_scale,
                amount: inputs.params.noise_amount,
            });
        }
        let shader = RaymarchShader::new(
            ShaderContext {
                camera,
                params: &inputs.params,
                time,
                mode: self.settings.shading,
                backdrop,
                environment: &self.assets.environment,
                noise: &self.assets.noise,
            },
            field,
        );

        let mut overlay = Texture2D::new(w, h, Vec4::ZERO, SamplerDesc::CLAMP_LINEAR);
        let mut composited = overlay.clone();
        let mut stats = FrameStats::default();
        for y in 0..h {
            for x in 0..w {
                let uv = Vec2::new((x as f32 + 0.5) / w as f32, 1.0 - (y as f32 + 0.5) / h as f32);
                let (color, result) = shader.shade_with_stats(uv);
                match result.status {
                    MarchStatus::Hit => stats.hits += 1,
                    MarchStatus::Miss => stats.misses += 1,
                    MarchStatus::Exhausted => stats.exhausted += 1,
                }
                stats.max_steps = stats.max_steps.max(result.steps);
                let under = backdrop.texel(x, y);
                let over = under.truncate().lerp(color.truncate(), color.w);
                overlay.set_texel(x, y, color);
                composited.set_texel(x, y, over.extend(1.0));
            }
        }

        RenderedFrame {
            overlay,
            composited,
            quad,
            backdrop_frame: self.compositor.sampled_frame(),
            stats,
        }
    }
}
