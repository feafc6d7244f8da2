use crate::helpers;

pub const OFFSCREEN_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;

/// Off-screen backdrop color buffers.
///
/// Zero-lag rendering only ever touches slot 0. Double buffering alternates
/// between the two: one is written while the other is sampled.
pub struct RenderTargets {
    pub views: [wgpu::TextureView; 2],
    pub width: u32,
    pub height: u32,
}

impl RenderTargets {
    pub fn new(device: &wgpu::Device, width: u32, height: u32) -> Self {
        let (_, a_view) = create_slot(device, "backdrop_a", width, height);
        let (_, b_view) = create_slot(device, "backdrop_b", width, height);
        Self {
            views: [a_view, b_view],
            width,
            height,
        }
    }

    /// Reallocate both slots if the size changed. Returns whether it did.
    pub fn resize_if_needed(&mut self, device: &wgpu::Device, width: u32, height: u32) -> bool {
        if self.width == width && self.height == height {
            return false;
        }
        log::debug!("[targets] reallocating off-screen buffers {}x{}", width, height);
        *self = Self::new(device, width, height);
        true
    }
}

fn create_slot(device: &wgpu::Device, label: &str, width: u32, height: u32) -> (wgpu::Texture, wgpu::TextureView) {
    helpers::create_color_texture(
        device,
        label,
        width.max(1),
        height.max(1),
        OFFSCREEN_FORMAT,
        wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
    )
}
