//! CPU-side textures with GL-style sampling.
//!
//! UV `(0,0)` is the bottom-left corner and `(1,1)` the top-right, matching the
//! convention of the GPU path (textures are uploaded bottom row last, the
//! sampler flips v). Texel storage is row-major from the top row down.

use crate::error::{BlobError, Result};
use glam::{Vec2, Vec3, Vec4};
use image::RgbaImage;
use std::path::{Path, PathBuf};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WrapMode {
    Repeat,
    ClampToEdge,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FilterMode {
    Nearest,
    Linear,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SamplerDesc {
    pub wrap: WrapMode,
    pub filter: FilterMode,
}

impl SamplerDesc {
    /// Noise lookups tile across the sphere.
    pub const REPEAT_LINEAR: Self = Self {
        wrap: WrapMode::Repeat,
        filter: FilterMode::Linear,
    };
    /// Render-target style sampling.
    pub const CLAMP_LINEAR: Self = Self {
        wrap: WrapMode::ClampToEdge,
        filter: FilterMode::Linear,
    };
}

#[derive(Clone, Debug)]
pub struct Texture2D {
    width: u32,
    height: u32,
    texels: Vec<Vec4>,
    sampler: SamplerDesc,
}

impl Texture2D {
    pub fn new(width: u32, height: u32, fill: Vec4, sampler: SamplerDesc) -> Self {
        let (width, height) = (width.max(1), height.max(1));
        Self {
            width,
            height,
            texels: vec![fill; (width * height) as usize],
            sampler,
        }
    }

    pub fn solid(color: Vec4, sampler: SamplerDesc) -> Self {
        Self::new(1, 1, color, sampler)
    }

    /// Build from tightly packed 8-bit RGBA rows, top row first.
    pub fn from_rgba8(width: u32, height: u32, data: &[u8], sampler: SamplerDesc) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(BlobError::InvalidTexture("zero-sized texture".into()));
        }
        let expected = (width * height * 4) as usize;
        if data.len() != expected {
            return Err(BlobError::InvalidTexture(format!(
                "expected {} bytes for {}x{} RGBA, got {}",
                expected,
                width,
                height,
                data.len()
            )));
        }
        let texels = data
            .chunks_exact(4)
            .map(|c| Vec4::new(c[0] as f32, c[1] as f32, c[2] as f32, c[3] as f32) / 255.0)
            .collect();
        Ok(Self {
            width,
            height,
            texels,
            sampler,
        })
    }

    /// Decode an image file. A missing file is reported as
    /// [`BlobError::ResourceNotFound`]; nothing is substituted.
    pub fn load(path: impl AsRef<Path>, sampler: SamplerDesc) -> Result<Self> {
        let image = load_rgba8(path.as_ref())?;
        let (w, h) = image.dimensions();
        Self::from_rgba8(w, h, image.as_raw(), sampler)
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    #[inline]
    pub fn sampler(&self) -> SamplerDesc {
        self.sampler
    }

    pub fn texels(&self) -> &[Vec4] {
        &self.texels
    }

    pub fn texels_mut(&mut self) -> &mut [Vec4] {
        &mut self.texels
    }

    /// Texel at column `x`, row `y` counted from the top.
    #[inline]
    pub fn texel(&self, x: u32, y: u32) -> Vec4 {
        self.texels[(y * self.width + x) as usize]
    }

    #[inline]
    pub fn set_texel(&mut self, x: u32, y: u32, value: Vec4) {
        let i = (y * self.width + x) as usize;
        self.texels[i] = value;
    }

    /// Reallocate to a new size, discarding contents.
    pub fn reallocate(&mut self, width: u32, height: u32, fill: Vec4) {
        self.width = width.max(1);
        self.height = height.max(1);
        self.texels.clear();
        self.texels.resize((self.width * self.height) as usize, fill);
    }

    pub fn sample(&self, uv: Vec2) -> Vec4 {
        // texel space, rows from the top
        let x = uv.x * self.width as f32;
        let y = (1.0 - uv.y) * self.height as f32;
        match self.sampler.filter {
            FilterMode::Nearest => self.fetch(x.floor() as i64, y.floor() as i64),
            FilterMode::Linear => {
                let (x, y) = (x - 0.5, y - 0.5);
                let (x0, y0) = (x.floor(), y.floor());
                let (fx, fy) = (x - x0, y - y0);
                let (x0, y0) = (x0 as i64, y0 as i64);
                let top = self.fetch(x0, y0).lerp(self.fetch(x0 + 1, y0), fx);
                let bottom = self.fetch(x0, y0 + 1).lerp(self.fetch(x0 + 1, y0 + 1), fx);
                top.lerp(bottom, fy)
            }
        }
    }

    #[inline]
    fn fetch(&self, x: i64, y: i64) -> Vec4 {
        let (w, h) = (self.width as i64, self.height as i64);
        let (x, y) = match self.sampler.wrap {
            WrapMode::Repeat => (x.rem_euclid(w), y.rem_euclid(h)),
            WrapMode::ClampToEdge => (x.clamp(0, w - 1), y.clamp(0, h - 1)),
        };
        self.texels[(y * w + x) as usize]
    }

    /// Quantize to 8-bit RGBA for export or GPU upload.
    pub fn to_rgba8(&self) -> RgbaImage {
        let mut out = RgbaImage::new(self.width, self.height);
        for (dst, src) in out.pixels_mut().zip(self.texels.iter()) {
            let c = src.clamp(Vec4::ZERO, Vec4::ONE) * 255.0 + 0.5;
            dst.0 = [c.x as u8, c.y as u8, c.z as u8, c.w as u8];
        }
        out
    }
}

/// Face order: +X, -X, +Y, -Y, +Z, -Z.
pub const CUBE_FACE_FILES: [&str; 6] = ["px.png", "nx.png", "py.png", "ny.png", "pz.png", "nz.png"];

/// Six-face environment map sampled by direction.
#[derive(Clone, Debug)]
pub struct CubeMap {
    faces: [Texture2D; 6],
}

impl CubeMap {
    pub fn from_faces(faces: [Texture2D; 6]) -> Result<Self> {
        let (w, h) = faces[0].size();
        if w != h {
            return Err(BlobError::InvalidCubemap(format!("face 0 is {}x{}, faces must be square", w, h)));
        }
        if let Some((i, f)) = faces.iter().enumerate().find(|(_, f)| f.size() != (w, h)) {
            return Err(BlobError::InvalidCubemap(format!(
                "face {} is {}x{}, expected {}x{}",
                i,
                f.width(),
                f.height(),
                w,
                h
            )));
        }
        Ok(Self { faces })
    }

    /// Load `dir/<name>` for each of the six face names.
    pub fn load(dir: impl AsRef<Path>, names: &[String; 6]) -> Result<Self> {
        let dir = dir.as_ref();
        let mut faces = Vec::with_capacity(6);
        for name in names {
            faces.push(Texture2D::load(dir.join(name), SamplerDesc::CLAMP_LINEAR)?);
        }
        let faces: [Texture2D; 6] = faces
            .try_into()
            .map_err(|_| BlobError::InvalidCubemap("expected six faces".into()))?;
        Self::from_faces(faces)
    }

    pub fn uniform(color: Vec4) -> Self {
        let face = Texture2D::solid(color, SamplerDesc::CLAMP_LINEAR);
        Self {
            faces: std::array::from_fn(|_| face.clone()),
        }
    }

    pub fn face(&self, index: usize) -> &Texture2D {
        &self.faces[index]
    }

    pub fn face_size(&self) -> u32 {
        self.faces[0].width()
    }

    pub fn sample(&self, dir: Vec3) -> Vec4 {
        let (face, s, t) = cube_face_coords(dir);
        // t runs top-down on the face image
        self.faces[face].sample(Vec2::new(s, 1.0 - t))
    }
}

/// Major-axis face selection. Returns `(face, s, t)` with `s`, `t` in `[0,1]`
/// and `t` measured from the top of the face image.
pub fn cube_face_coords(dir: Vec3) -> (usize, f32, f32) {
    let a = dir.abs();
    let (face, sc, tc, ma) = if a.x >= a.y && a.x >= a.z {
        if dir.x >= 0.0 {
            (0, -dir.z, -dir.y, a.x)
        } else {
            (1, dir.z, -dir.y, a.x)
        }
    } else if a.y >= a.z {
        if dir.y >= 0.0 {
            (2, dir.x, dir.z, a.y)
        } else {
            (3, dir.x, -dir.z, a.y)
        }
    } else if dir.z >= 0.0 {
        (4, dir.x, -dir.y, a.z)
    } else {
        (5, -dir.x, -dir.y, a.z)
    };
    let ma = ma.max(f32::MIN_POSITIVE);
    (face, 0.5 * (sc / ma + 1.0), 0.5 * (tc / ma + 1.0))
}

fn load_rgba8(path: &Path) -> Result<RgbaImage> {
    if !path.is_file() {
        return Err(BlobError::ResourceNotFound(path.to_path_buf()));
    }
    let image = image::open(path).map_err(|source| BlobError::TextureDecode {
        path: PathBuf::from(path),
        source,
    })?;
    log::info!("[texture] loaded {} ({}x{})", path.display(), image.width(), image.height());
    Ok(image.to_rgba8())
}
