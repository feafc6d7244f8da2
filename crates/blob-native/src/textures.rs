//! Upload of the startup textures to the GPU.

use blob_core::{CubeMap, SamplerDesc, Texture2D, WrapMode};

const FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;

/// The view keeps the underlying texture alive.
pub struct GpuTexture {
    pub view: wgpu::TextureView,
    pub sampler: wgpu::Sampler,
}

fn write_layer(queue: &wgpu::Queue, texture: &wgpu::Texture, layer: u32, src: &Texture2D) {
    let image = src.to_rgba8();
    let (w, h) = image.dimensions();
    queue.write_texture(
        wgpu::TexelCopyTextureInfo {
            texture,
            mip_level: 0,
            origin: wgpu::Origin3d { x: 0, y: 0, z: layer },
            aspect: wgpu::TextureAspect::All,
        },
        image.as_raw(),
        wgpu::TexelCopyBufferLayout {
            offset: 0,
            bytes_per_row: Some(4 * w),
            rows_per_image: Some(h),
        },
        wgpu::Extent3d {
            width: w,
            height: h,
            depth_or_array_layers: 1,
        },
    );
}

fn create_sampler(device: &wgpu::Device, label: &str, desc: SamplerDesc) -> wgpu::Sampler {
    let address_mode = match desc.wrap {
        WrapMode::Repeat => wgpu::AddressMode::Repeat,
        WrapMode::ClampToEdge => wgpu::AddressMode::ClampToEdge,
    };
    let filter = match desc.filter {
        blob_core::FilterMode::Nearest => wgpu::FilterMode::Nearest,
        blob_core::FilterMode::Linear => wgpu::FilterMode::Linear,
    };
    device.create_sampler(&wgpu::SamplerDescriptor {
        label: Some(label),
        address_mode_u: address_mode,
        address_mode_v: address_mode,
        address_mode_w: address_mode,
        mag_filter: filter,
        min_filter: filter,
        ..Default::default()
    })
}

pub fn upload_texture(device: &wgpu::Device, queue: &wgpu::Queue, label: &str, src: &Texture2D) -> GpuTexture {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some(label),
        size: wgpu::Extent3d {
            width: src.width(),
            height: src.height(),
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: FORMAT,
        usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        view_formats: &[],
    });
    write_layer(queue, &texture, 0, src);
    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
    let sampler = create_sampler(device, label, src.sampler());
    GpuTexture { view, sampler }
}

/// Six layers in +x, -x, +y, -y, +z, -z order, viewed as a cube.
pub fn upload_cubemap(device: &wgpu::Device, queue: &wgpu::Queue, label: &str, src: &CubeMap) -> GpuTexture {
    let size = src.face_size();
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some(label),
        size: wgpu::Extent3d {
            width: size,
            height: size,
            depth_or_array_layers: 6,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: FORMAT,
        usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        view_formats: &[],
    });
    for layer in 0..6 {
        write_layer(queue, &texture, layer, src.face(layer as usize));
    }
    let view = texture.create_view(&wgpu::TextureViewDescriptor {
        label: Some(label),
        dimension: Some(wgpu::TextureViewDimension::Cube),
        ..Default::default()
    });
    let sampler = create_sampler(device, label, SamplerDesc::CLAMP_LINEAR);
    GpuTexture { view, sampler }
}
