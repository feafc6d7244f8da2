//! TOML configuration for hosts.
//!
//! Every section is optional. Example:
//!
//! ```toml
//! shading = "chromatic-dispersion"
//! buffering = "zero-lag"
//!
//! [params]
//! count = 8
//! reflection = 2.0
//!
//! [camera]
//! position = [0.0, 0.0, 3.0]
//! ```

use crate::camera::CameraFrame;
use crate::compositor::BufferingMode;
use crate::constants::{DEFAULT_CAMERA_POSITION, DEFAULT_FAR, DEFAULT_FOV_DEGREES, DEFAULT_NEAR};
use crate::error::{BlobError, Result};
use crate::params::{ParamKey, ParameterStore};
use crate::shader::ShadingMode;
use crate::texture::CUBE_FACE_FILES;
use glam::Vec3;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BlobConfig {
    /// No default: hosts must pick one explicitly.
    pub shading: Option<ShadingMode>,
    pub buffering: BufferingMode,
    pub surface_noise: bool,
    pub params: BTreeMap<String, f32>,
    pub assets: AssetConfig,
    pub camera: CameraConfig,
    pub window: WindowConfig,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AssetConfig {
    pub noise_texture: PathBuf,
    pub cubemap_dir: PathBuf,
    pub cubemap_faces: [String; 6],
}

impl Default for AssetConfig {
    fn default() -> Self {
        Self {
            noise_texture: PathBuf::from("assets/textures/uv_map_01.jpg"),
            cubemap_dir: PathBuf::from("assets/cubemap/potsdamer_platz"),
            cubemap_faces: CUBE_FACE_FILES.map(String::from),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CameraConfig {
    pub position: [f32; 3],
    pub target: [f32; 3],
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            position: DEFAULT_CAMERA_POSITION,
            target: [0.0, 0.0, 0.0],
            fov_degrees: DEFAULT_FOV_DEGREES,
            near: DEFAULT_NEAR,
            far: DEFAULT_FAR,
        }
    }
}

impl CameraConfig {
    pub fn camera_frame(&self, aspect: f32) -> Result<CameraFrame> {
        CameraFrame::look_at(
            Vec3::from(self.position),
            Vec3::from(self.target),
            Vec3::Y,
            self.fov_degrees,
            aspect,
            self.near,
            self.far,
        )
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WindowConfig {
    pub width: u32,
    pub height: u32,
    pub title: String,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
            title: "Liquid Blob".to_string(),
        }
    }
}

impl BlobConfig {
    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| BlobError::Config(e.to_string()))
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(BlobError::ResourceNotFound(path.to_path_buf()));
        }
        let text = std::fs::read_to_string(path).map_err(|source| BlobError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&text)?;
        log::info!("[config] loaded {}", path.display());
        Ok(config)
    }

    /// Defaults overridden by `[params]`. Unknown names are an error;
    /// out-of-range values are kept and clamped (with a warning) at snapshot.
    pub fn parameter_store(&self) -> Result<ParameterStore> {
        let mut store = ParameterStore::default();
        for (name, value) in &self.params {
            let key = ParamKey::from_name(name)
                .ok_or_else(|| BlobError::Config(format!("unknown parameter `{}`", name)))?;
            store.set(key, *value);
        }
        Ok(store)
    }
}
