//! Off-screen capture of the secondary scene.
//!
//! Every frame the compositor renders its own scene (disjoint from the overlay
//! draw list) through the current camera into an off-screen color buffer. The
//! raymarch pass samples that buffer as backdrop and refraction source.

use crate::camera::CameraFrame;
use crate::constants::{BACKDROP_BOX_HALF_EXTENT, BACKDROP_BOX_ROTATION, BACKDROP_CLEAR_RGB};
use crate::input::Viewport;
use crate::texture::{SamplerDesc, Texture2D};
use glam::{EulerRot, Quat, Vec2, Vec3, Vec4};
use serde::Deserialize;

/// The captured scene. Implementors return the color seen along a camera ray.
pub trait BackdropScene {
    fn radiance(&self, origin: Vec3, dir: Vec3) -> Vec4;
}

/// Stand-in for the host's 3D content: flat background with a tilted
/// metallic box at the origin.
#[derive(Clone, Debug)]
pub struct StudioBackdrop {
    pub clear: Vec3,
    pub box_rotation: Quat,
    pub box_half_extent: f32,
    pub light_dir: Vec3,
}

impl Default for StudioBackdrop {
    fn default() -> Self {
        let [x, y, z] = BACKDROP_BOX_ROTATION;
        Self {
            clear: Vec3::from(BACKDROP_CLEAR_RGB),
            box_rotation: Quat::from_euler(EulerRot::XYZ, x, y, z),
            box_half_extent: BACKDROP_BOX_HALF_EXTENT,
            light_dir: Vec3::new(0.4, 0.8, 0.6).normalize(),
        }
    }
}

impl StudioBackdrop {
    /// Slab test against the rotated box. Returns distance and world normal.
    pub fn intersect_box(&self, origin: Vec3, dir: Vec3) -> Option<(f32, Vec3)> {
        let inv = self.box_rotation.inverse();
        let o = inv * origin;
        let d = inv * dir;
        let h = Vec3::splat(self.box_half_extent);
        let inv_d = d.recip();
        let t0 = (-h - o) * inv_d;
        let t1 = (h - o) * inv_d;
        let t_near = t0.min(t1);
        let t_far = t0.max(t1);
        let enter = t_near.max_element();
        let exit = t_far.min_element();
        if enter > exit || exit < 0.0 {
            return None;
        }
        let t = if enter >= 0.0 { enter } else { exit };
        let local = o + d * t;
        let a = (local / h).abs();
        let n = if a.x >= a.y && a.x >= a.z {
            Vec3::new(local.x.signum(), 0.0, 0.0)
        } else if a.y >= a.z {
            Vec3::new(0.0, local.y.signum(), 0.0)
        } else {
            Vec3::new(0.0, 0.0, local.z.signum())
        };
        Some((t, self.box_rotation * n))
    }
}

impl BackdropScene for StudioBackdrop {
    fn radiance(&self, origin: Vec3, dir: Vec3) -> Vec4 {
        match self.intersect_box(origin, dir) {
            Some((_, n)) => {
                let diffuse = n.dot(self.light_dir).max(0.0);
                let half = (self.light_dir - dir).normalize_or_zero();
                let spec = n.dot(half).max(0.0).powf(48.0);
                let metal = Vec3::new(0.62, 0.64, 0.68);
                (metal * (0.2 + 0.8 * diffuse) + Vec3::splat(spec)).extend(1.0)
            }
            None => self.clear.extend(1.0),
        }
    }
}

/// Which backdrop render the raymarch pass samples.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BufferingMode {
    /// Render then sample within the same frame.
    #[default]
    ZeroLag,
    /// Sample last frame's render while this frame's is produced. One frame
    /// of lag, no intra-frame dependency.
    DoubleBuffered,
}

pub struct FrameBufferCompositor<S: BackdropScene> {
    scene: S,
    mode: BufferingMode,
    front: Texture2D,
    back: Texture2D,
    viewport: Option<Viewport>,
    front_frame: Option<u64>,
    back_frame: Option<u64>,
}

impl<S: BackdropScene> FrameBufferCompositor<S> {
    pub fn new(scene: S, mode: BufferingMode) -> Self {
        let empty = Texture2D::new(1, 1, Vec4::ZERO, SamplerDesc::CLAMP_LINEAR);
        Self {
            scene,
            mode,
            front: empty.clone(),
            back: empty,
            viewport: None,
            front_frame: None,
            back_frame: None,
        }
    }

    pub fn scene(&self) -> &S {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut S {
        &mut self.scene
    }

    pub fn mode(&self) -> BufferingMode {
        self.mode
    }

    /// Reallocate the targets if the viewport's backing size changed.
    /// Returns whether a reallocation happened.
    pub fn ensure_viewport(&mut self, viewport: Viewport) -> bool {
        let size = viewport.pixel_size();
        let changed = self.front.size() != size || self.viewport.is_none();
        self.viewport = Some(viewport);
        if changed {
            log::debug!("[compositor] reallocating off-screen target {}x{}", size.0, size.1);
            self.front.reallocate(size.0, size.1, Vec4::ZERO);
            self.back.reallocate(size.0, size.1, Vec4::ZERO);
            self.front_frame = None;
            self.back_frame = None;
        }
        changed
    }

    /// Render the secondary scene for `frame`. The viewport is applied first,
    /// so a resize never leaves a stale-resolution buffer to be sampled.
    pub fn render(&mut self, frame: u64, viewport: Viewport, camera: &CameraFrame) {
        self.ensure_viewport(viewport);
        match self.mode {
            BufferingMode::ZeroLag => {
                draw_scene(&self.scene, camera, &mut self.front);
                self.front_frame = Some(frame);
            }
            BufferingMode::DoubleBuffered => {
                if self.back_frame.is_some() {
                    std::mem::swap(&mut self.front, &mut self.back);
                    std::mem::swap(&mut self.front_frame, &mut self.back_frame);
                }
                draw_scene(&self.scene, camera, &mut self.back);
                self.back_frame = Some(frame);
                if self.front_frame.is_none() {
                    // nothing older to show yet
                    self.front.texels_mut().copy_from_slice(self.back.texels());
                    self.front_frame = Some(frame);
                }
            }
        }
    }

    /// The texture the raymarch pass should sample this frame.
    pub fn texture(&self) -> &Texture2D {
        &self.front
    }

    /// Frame index whose render [`Self::texture`] currently holds.
    pub fn sampled_frame(&self) -> Option<u64> {
        self.front_frame
    }

    pub fn pixel_size(&self) -> (u32, u32) {
        self.front.size()
    }
}

/// Bind `target`, render `scene` through `camera`, leave the result in it.
fn draw_scene<S: BackdropScene>(scene: &S, camera: &CameraFrame, target: &mut Texture2D) {
    let (w, h) = target.size();
    for y in 0..h {
        for x in 0..w {
            let uv = Vec2::new((x as f32 + 0.5) / w as f32, 1.0 - (y as f32 + 0.5) / h as f32);
            let (ro, rd) = camera.ray(uv);
            target.set_texel(x, y, scene.radiance(ro, rd));
        }
    }
}
