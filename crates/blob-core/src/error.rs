use std::path::PathBuf;
use thiserror::Error;

/// Failures at configuration and resource boundaries.
///
/// The per-pixel pipeline itself never fails; everything that can go wrong is
/// caught here, before a frame is rendered.
#[derive(Debug, Error)]
pub enum BlobError {
    #[error("resource not found: {}", .0.display())]
    ResourceNotFound(PathBuf),
    #[error("failed to decode texture {}: {source}", path.display())]
    TextureDecode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("invalid texture data: {0}")]
    InvalidTexture(String),
    #[error("invalid cubemap: {0}")]
    InvalidCubemap(String),
    #[error("degenerate camera: {0}")]
    DegenerateCamera(&'static str),
    #[error("degenerate viewport: {0}")]
    DegenerateViewport(&'static str),
    #[error("config error: {0}")]
    Config(String),
    #[error("i/o error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, BlobError>;
