pub mod camera;
pub mod cell;
pub mod compositor;
pub mod config;
pub mod constants;
pub mod error;
pub mod field;
pub mod frame;
pub mod input;
pub mod params;
pub mod quad;
pub mod shader;
pub mod texture;
pub mod uniforms;

pub static OVERLAY_WGSL: &str = include_str!("../shaders/overlay.wgsl");
pub static BACKDROP_WGSL: &str = include_str!("../shaders/backdrop.wgsl");

pub use camera::*;
pub use compositor::*;
pub use config::*;
pub use constants::*;
pub use error::*;
pub use field::*;
pub use frame::*;
pub use input::*;
pub use params::*;
pub use quad::*;
pub use shader::*;
pub use texture::*;
pub use uniforms::*;
