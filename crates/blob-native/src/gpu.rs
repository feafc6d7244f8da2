use crate::helpers;
use crate::targets::{RenderTargets, OFFSCREEN_FORMAT};
use crate::textures::{self, GpuTexture};
use blob_core::{
    BackdropUniforms, BlobUniforms, BufferingMode, CameraFrame, FrameInputs, OverlayQuad, RenderSettings,
    SceneAssets, StudioBackdrop,
};

pub struct GpuState<'w> {
    pub window: &'w winit::window::Window,
    surface: wgpu::Surface<'w>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    backdrop_pipeline: wgpu::RenderPipeline,
    blit_pipeline: wgpu::RenderPipeline,
    overlay_pipeline: wgpu::RenderPipeline,
    backdrop_uniforms: wgpu::Buffer,
    overlay_uniforms: wgpu::Buffer,
    backdrop_bg: wgpu::BindGroup,
    blit_bgl: wgpu::BindGroupLayout,
    overlay_bgl: wgpu::BindGroupLayout,
    blit_bgs: [wgpu::BindGroup; 2],
    overlay_bgs: [wgpu::BindGroup; 2],
    targets: RenderTargets,
    target_sampler: wgpu::Sampler,
    environment: GpuTexture,
    noise: GpuTexture,
    scene: StudioBackdrop,
    settings: RenderSettings,
    buffering: BufferingMode,
    /// Slot holding the most recent backdrop render, if still valid.
    last_written: Option<usize>,
}

impl<'w> GpuState<'w> {
    pub async fn new(
        window: &'w winit::window::Window,
        assets: &SceneAssets,
        settings: RenderSettings,
        buffering: BufferingMode,
        offscreen_size: (u32, u32),
    ) -> anyhow::Result<Self> {
        let size = window.inner_size();
        let instance = wgpu::Instance::default();
        let surface = instance.create_surface(window)?;
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or_else(|| anyhow::anyhow!("No GPU adapter"))?;
        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                    memory_hints: wgpu::MemoryHints::Performance,
                    label: None,
                },
                None,
            )
            .await?;

        let surface_caps = surface.get_capabilities(&adapter);
        // gamma is applied in the shader
        let format = surface_caps
            .formats
            .iter()
            .copied()
            .find(|f| !f.is_srgb())
            .unwrap_or(surface_caps.formats[0]);
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: surface_caps.alpha_modes[0],
            desired_maximum_frame_latency: 2,
            view_formats: vec![],
        };
        surface.configure(&device, &config);
        log::info!("[gpu] surface {:?} {}x{}", format, config.width, config.height);

        let backdrop_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("backdrop_shader"),
            source: wgpu::ShaderSource::Wgsl(blob_core::BACKDROP_WGSL.into()),
        });
        let overlay_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("overlay_shader"),
            source: wgpu::ShaderSource::Wgsl(blob_core::OVERLAY_WGSL.into()),
        });

        let backdrop_uniforms = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("backdrop_uniforms"),
            size: std::mem::size_of::<BackdropUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let overlay_uniforms = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("overlay_uniforms"),
            size: std::mem::size_of::<BlobUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let backdrop_bgl = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("backdrop_bgl"),
            entries: &[helpers::uniform_entry(0, wgpu::ShaderStages::FRAGMENT)],
        });
        let blit_bgl = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("blit_bgl"),
            entries: &[
                helpers::texture_entry(1, wgpu::TextureViewDimension::D2),
                helpers::sampler_entry(2),
            ],
        });
        let overlay_bgl = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("overlay_bgl"),
            entries: &[
                helpers::uniform_entry(0, wgpu::ShaderStages::VERTEX_FRAGMENT),
                helpers::texture_entry(1, wgpu::TextureViewDimension::D2),
                helpers::sampler_entry(2),
                helpers::texture_entry(3, wgpu::TextureViewDimension::Cube),
                helpers::sampler_entry(4),
                helpers::texture_entry(5, wgpu::TextureViewDimension::D2),
                helpers::sampler_entry(6),
            ],
        });

        let backdrop_bg = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("backdrop_bg"),
            layout: &backdrop_bgl,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: backdrop_uniforms.as_entire_binding(),
            }],
        });

        let pl_backdrop = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("pl_backdrop"),
            bind_group_layouts: &[&backdrop_bgl],
            push_constant_ranges: &[],
        });
        let pl_blit = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("pl_blit"),
            bind_group_layouts: &[&blit_bgl],
            push_constant_ranges: &[],
        });
        let pl_overlay = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("pl_overlay"),
            bind_group_layouts: &[&overlay_bgl],
            push_constant_ranges: &[],
        });

        let backdrop_pipeline = helpers::make_fullscreen_pipeline(
            &device,
            "backdrop_pipeline",
            &pl_backdrop,
            &backdrop_shader,
            "fs_backdrop",
            OFFSCREEN_FORMAT,
            None,
        );
        let blit_pipeline = helpers::make_fullscreen_pipeline(
            &device,
            "blit_pipeline",
            &pl_blit,
            &backdrop_shader,
            "fs_blit",
            format,
            Some(wgpu::BlendState::REPLACE),
        );
        let overlay_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("overlay_pipeline"),
            layout: Some(&pl_overlay),
            vertex: wgpu::VertexState {
                module: &overlay_shader,
                entry_point: Some("vs_main"),
                buffers: &[],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            primitive: wgpu::PrimitiveState::default(),
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            fragment: Some(wgpu::FragmentState {
                module: &overlay_shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            cache: None,
            multiview: None,
        });

        let environment = textures::upload_cubemap(&device, &queue, "environment", &assets.environment);
        let noise = textures::upload_texture(&device, &queue, "noise", &assets.noise);
        let target_sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("backdrop_sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });
        let targets = RenderTargets::new(&device, offscreen_size.0, offscreen_size.1);

        let (blit_bgs, overlay_bgs) = target_bind_groups(
            &device,
            &blit_bgl,
            &overlay_bgl,
            &targets,
            &target_sampler,
            &overlay_uniforms,
            &environment,
            &noise,
        );

        Ok(Self {
            window,
            surface,
            device,
            queue,
            config,
            backdrop_pipeline,
            blit_pipeline,
            overlay_pipeline,
            backdrop_uniforms,
            overlay_uniforms,
            backdrop_bg,
            blit_bgl,
            overlay_bgl,
            blit_bgs,
            overlay_bgs,
            targets,
            target_sampler,
            environment,
            noise,
            scene: StudioBackdrop::default(),
            settings,
            buffering,
            last_written: None,
        })
    }

    pub fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if new_size.width == 0 || new_size.height == 0 {
            return;
        }
        self.config.width = new_size.width;
        self.config.height = new_size.height;
        self.surface.configure(&self.device, &self.config);
    }

    /// Off-screen buffers follow the frame's viewport, never the surface.
    fn resize_targets_if_needed(&mut self, width: u32, height: u32) {
        if !self.targets.resize_if_needed(&self.device, width, height) {
            return;
        }
        (self.blit_bgs, self.overlay_bgs) = target_bind_groups(
            &self.device,
            &self.blit_bgl,
            &self.overlay_bgl,
            &self.targets,
            &self.target_sampler,
            &self.overlay_uniforms,
            &self.environment,
            &self.noise,
        );
        self.last_written = None;
    }

    /// Slots to (write, sample) this frame.
    fn slots(&self) -> (usize, usize) {
        match (self.buffering, self.last_written) {
            (BufferingMode::DoubleBuffered, Some(prev)) => (1 - prev, prev),
            _ => (0, 0),
        }
    }

    pub fn render(&mut self, inputs: &FrameInputs, camera: &CameraFrame) -> Result<(), wgpu::SurfaceError> {
        let (w, h) = inputs.viewport().pixel_size();
        self.resize_targets_if_needed(w, h);
        let (write, read) = self.slots();

        let frame = self.surface.get_current_texture()?;
        let view = frame.texture.create_view(&wgpu::TextureViewDescriptor::default());

        self.queue.write_buffer(
            &self.backdrop_uniforms,
            0,
            bytemuck::bytes_of(&BackdropUniforms::new(&self.scene, camera)),
        );
        let quad = OverlayQuad::place(camera);
        self.queue.write_buffer(
            &self.overlay_uniforms,
            0,
            bytemuck::bytes_of(&BlobUniforms::from_frame(inputs, camera, &quad, (w, h), self.settings)),
        );

        let mut encoder = self.device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("encoder"),
        });
        helpers::draw_pass(
            &mut encoder,
            "backdrop",
            &self.targets.views[write],
            wgpu::LoadOp::Clear(wgpu::Color::BLACK),
            &self.backdrop_pipeline,
            &self.backdrop_bg,
            0..3,
        );
        helpers::draw_pass(
            &mut encoder,
            "blit",
            &view,
            wgpu::LoadOp::Clear(wgpu::Color::BLACK),
            &self.blit_pipeline,
            &self.blit_bgs[read],
            0..3,
        );
        helpers::draw_pass(
            &mut encoder,
            "overlay",
            &view,
            wgpu::LoadOp::Load,
            &self.overlay_pipeline,
            &self.overlay_bgs[read],
            0..6,
        );
        self.queue.submit(Some(encoder.finish()));
        frame.present();
        self.last_written = Some(write);
        Ok(())
    }
}

#[allow(clippy::too_many_arguments)]
fn target_bind_groups(
    device: &wgpu::Device,
    blit_bgl: &wgpu::BindGroupLayout,
    overlay_bgl: &wgpu::BindGroupLayout,
    targets: &RenderTargets,
    target_sampler: &wgpu::Sampler,
    overlay_uniforms: &wgpu::Buffer,
    environment: &GpuTexture,
    noise: &GpuTexture,
) -> ([wgpu::BindGroup; 2], [wgpu::BindGroup; 2]) {
    let blit = |slot: usize| {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("blit_bg"),
            layout: blit_bgl,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(&targets.views[slot]),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(target_sampler),
                },
            ],
        })
    };
    let overlay = |slot: usize| {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("overlay_bg"),
            layout: overlay_bgl,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: overlay_uniforms.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(&targets.views[slot]),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(target_sampler),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: wgpu::BindingResource::TextureView(&environment.view),
                },
                wgpu::BindGroupEntry {
                    binding: 4,
                    resource: wgpu::BindingResource::Sampler(&environment.sampler),
                },
                wgpu::BindGroupEntry {
                    binding: 5,
                    resource: wgpu::BindingResource::TextureView(&noise.view),
                },
                wgpu::BindGroupEntry {
                    binding: 6,
                    resource: wgpu::BindingResource::Sampler(&noise.sampler),
                },
            ],
        })
    };
    ([blit(0), blit(1)], [overlay(0), overlay(1)])
}
