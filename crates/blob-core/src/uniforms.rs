//! Uniform block shared by the CPU host and `shaders/overlay.wgsl`.
//!
//! Parameters reach the shader through an explicit `ParamKey -> field`
//! mapping. Adding a key without a slot is a compile error (the match in
//! [`BlobUniforms::set_param`] is exhaustive).

use crate::camera::CameraFrame;
use crate::compositor::StudioBackdrop;
use crate::frame::{FrameInputs, RenderSettings};
use crate::params::ParamKey;
use crate::quad::OverlayQuad;
use glam::{Mat4, Vec4};

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct BlobUniforms {
    pub cam_to_world: [[f32; 4]; 4],
    pub cam_inverse_proj: [[f32; 4]; 4],
    pub view_proj: [[f32; 4]; 4],
    pub model: [[f32; 4]; 4],
    pub cam_pos: [f32; 4],
    pub mouse: [f32; 2],
    pub resolution: [f32; 2],
    pub time: f32,
    pub reflection: f32,
    pub speed: f32,
    pub ior: f32,
    pub count: u32,
    pub size: f32,
    pub dispersion: f32,
    pub refract_strength: f32,
    pub chromatic_aberration: f32,
    pub pointer_size: f32,
    pub noise_scale: f32,
    pub noise_amount: f32,
    pub shading_mode: u32,
    pub surface_noise: u32,
    pub _pad: [u32; 2],
}

/// Name of the WGSL struct member a parameter is written to.
pub const fn uniform_field(key: ParamKey) -> &'static str {
    match key {
        ParamKey::Reflection => "reflection",
        ParamKey::Speed => "speed",
        ParamKey::Ior => "ior",
        ParamKey::Count => "count",
        ParamKey::Size => "size",
        ParamKey::Dispersion => "dispersion",
        ParamKey::Refract => "refract_strength",
        ParamKey::ChromaticAberration => "chromatic_aberration",
        ParamKey::PointerSize => "pointer_size",
        ParamKey::NoiseScale => "noise_scale",
        ParamKey::NoiseAmount => "noise_amount",
    }
}

impl BlobUniforms {
    /// Write one (already clamped) parameter into its slot.
    pub fn set_param(&mut self, key: ParamKey, value: f32) {
        match key {
            ParamKey::Reflection => self.reflection = value,
            ParamKey::Speed => self.speed = value,
            ParamKey::Ior => self.ior = value,
            ParamKey::Count => self.count = value as u32,
            ParamKey::Size => self.size = value,
            ParamKey::Dispersion => self.dispersion = value,
            ParamKey::Refract => self.refract_strength = value,
            ParamKey::ChromaticAberration => self.chromatic_aberration = value,
            ParamKey::PointerSize => self.pointer_size = value,
            ParamKey::NoiseScale => self.noise_scale = value,
            ParamKey::NoiseAmount => self.noise_amount = value,
        }
    }

    /// Pack everything the overlay pass needs for one frame.
    ///
    /// `resolution` is the off-screen buffer's pixel size; the pointer sphere
    /// uses its aspect ratio.
    pub fn from_frame(
        inputs: &FrameInputs,
        camera: &CameraFrame,
        quad: &OverlayQuad,
        resolution: (u32, u32),
        settings: RenderSettings,
    ) -> Self {
        // wgpu clip space: depth in [0, 1]
        let projection = Mat4::perspective_rh(
            camera.fov_y_degrees().to_radians(),
            camera.aspect(),
            camera.near(),
            camera.far(),
        );
        let mut u = Self {
            cam_to_world: camera.world().to_cols_array_2d(),
            cam_inverse_proj: camera.inverse_projection().to_cols_array_2d(),
            view_proj: (projection * camera.view()).to_cols_array_2d(),
            model: quad.model_matrix().to_cols_array_2d(),
            cam_pos: camera.position().extend(1.0).to_array(),
            mouse: inputs.input.pointer.as_vec2().to_array(),
            resolution: [resolution.0 as f32, resolution.1 as f32],
            time: inputs.animation_time(),
            shading_mode: settings.shading.as_u32(),
            surface_noise: settings.surface_noise as u32,
            ..<Self as bytemuck::Zeroable>::zeroed()
        };
        for key in ParamKey::ALL {
            u.set_param(key, inputs.params.get(key));
        }
        u
    }
}

/// Uniform block for `fs_backdrop` in `shaders/backdrop.wgsl`.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct BackdropUniforms {
    pub cam_to_world: [[f32; 4]; 4],
    pub cam_inverse_proj: [[f32; 4]; 4],
    pub box_to_world: [[f32; 4]; 4],
    pub cam_pos: [f32; 4],
    pub clear: [f32; 4],
    /// xyz light direction, w box half extent.
    pub light: [f32; 4],
}

impl BackdropUniforms {
    pub fn new(scene: &StudioBackdrop, camera: &CameraFrame) -> Self {
        Self {
            cam_to_world: camera.world().to_cols_array_2d(),
            cam_inverse_proj: camera.inverse_projection().to_cols_array_2d(),
            box_to_world: Mat4::from_quat(scene.box_rotation).to_cols_array_2d(),
            cam_pos: camera.position().extend(1.0).to_array(),
            clear: scene.clear.extend(1.0).to_array(),
            light: Vec4::from((scene.light_dir, scene.box_half_extent)).to_array(),
        }
    }
}
