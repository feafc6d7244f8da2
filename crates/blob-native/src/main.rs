mod gpu;
mod helpers;
mod targets;
mod textures;

use anyhow::Context;
use blob_core::{
    BlobConfig, CameraFrame, FrameClock, FrameInputs, FrameRenderer, InputState, ParameterStore, RenderSettings,
    SceneAssets, ShadingMode, StudioBackdrop, Viewport,
};
use clap::Parser;
use std::path::{Path, PathBuf};
use winit::{event::*, event_loop::EventLoop, window::WindowBuilder};

#[derive(Parser, Debug)]
#[command(name = "blob-native")]
#[command(about = "Raymarched liquid blob over a captured backdrop", long_about = None)]
struct Args {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// noise-sphere or chromatic-dispersion (overrides the config)
    #[arg(long, value_parser = parse_shading)]
    shading: Option<ShadingMode>,

    /// Render a single frame on the CPU into this PNG and exit
    #[arg(long)]
    snapshot: Option<PathBuf>,

    /// Logical width (overrides the config)
    #[arg(long)]
    width: Option<u32>,

    /// Logical height (overrides the config)
    #[arg(long)]
    height: Option<u32>,

    /// Elapsed seconds for the snapshot frame
    #[arg(long, default_value = "0.0")]
    time: f32,

    /// Device pixel ratio for the snapshot frame
    #[arg(long, default_value = "1.0")]
    dpr: f32,

    /// Pointer position in logical pixels for the snapshot frame
    #[arg(long, num_args = 2, value_names = ["X", "Y"])]
    pointer: Option<Vec<f32>>,

    /// Use flat placeholder textures instead of loading the asset files
    #[arg(long)]
    placeholder_assets: bool,
}

fn parse_shading(value: &str) -> Result<ShadingMode, String> {
    ShadingMode::parse(value)
        .ok_or_else(|| format!("unknown shading mode `{}` (noise-sphere, chromatic-dispersion)", value))
}

fn main() -> anyhow::Result<()> {
    env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .init();

    let args = Args::parse();
    let config = match &args.config {
        Some(path) => BlobConfig::load(path).with_context(|| format!("reading {}", path.display()))?,
        None => BlobConfig::default(),
    };
    let shading = args
        .shading
        .or(config.shading)
        .context("no shading mode: pass --shading or set `shading` in the config")?;
    let settings = RenderSettings {
        shading,
        surface_noise: config.surface_noise,
    };
    let params = config.parameter_store()?;
    let assets = if args.placeholder_assets {
        log::warn!("[assets] using flat placeholder textures");
        SceneAssets::placeholder()
    } else {
        SceneAssets::load(&config.assets).context("loading textures")?
    };
    let width = args.width.unwrap_or(config.window.width);
    let height = args.height.unwrap_or(config.window.height);
    log::info!(
        "[main] shading {} buffering {:?} surface noise {}",
        shading.as_str(),
        config.buffering,
        settings.surface_noise
    );

    match &args.snapshot {
        Some(path) => {
            let viewport = Viewport::new(width, height, args.dpr)?;
            snapshot(&args, &config, &params, assets, settings, viewport, path)
        }
        None => run_window(&config, params, assets, settings, width, height),
    }
}

fn snapshot(
    args: &Args,
    config: &BlobConfig,
    params: &ParameterStore,
    assets: SceneAssets,
    settings: RenderSettings,
    viewport: Viewport,
    path: &Path,
) -> anyhow::Result<()> {
    let (mut input, mut reader) = InputState::new(viewport);
    if let Some([x, y]) = args.pointer.as_deref() {
        input.on_pointer_move(*x, *y);
    }
    let camera = config.camera.camera_frame(viewport.aspect())?;
    let mut renderer = FrameRenderer::new(StudioBackdrop::default(), config.buffering, assets, settings);
    let inputs = renderer.begin_frame(args.time, params, &mut reader);
    let frame = renderer.render_frame(&inputs, &camera);
    log::info!(
        "[snapshot] {}x{} hits {} misses {} exhausted {} max steps {}",
        frame.composited.width(),
        frame.composited.height(),
        frame.stats.hits,
        frame.stats.misses,
        frame.stats.exhausted,
        frame.stats.max_steps
    );
    frame
        .composited
        .to_rgba8()
        .save(path)
        .with_context(|| format!("writing {}", path.display()))?;
    log::info!("[snapshot] wrote {}", path.display());
    Ok(())
}

fn logical_size(size: winit::dpi::PhysicalSize<u32>, scale: f64) -> (u32, u32) {
    let logical = size.to_logical::<f64>(scale);
    (logical.width.round() as u32, logical.height.round() as u32)
}

fn run_window(
    config: &BlobConfig,
    params: ParameterStore,
    assets: SceneAssets,
    settings: RenderSettings,
    width: u32,
    height: u32,
) -> anyhow::Result<()> {
    let event_loop = EventLoop::new()?;
    let window = WindowBuilder::new()
        .with_title(config.window.title.as_str())
        .with_inner_size(winit::dpi::LogicalSize::new(width, height))
        .build(&event_loop)?;

    let scale = window.scale_factor();
    let (w, h) = logical_size(window.inner_size(), scale);
    let viewport = Viewport::new(w.max(1), h.max(1), scale as f32)?;
    let (mut input, mut reader) = InputState::new(viewport);
    let mut camera: CameraFrame = config.camera.camera_frame(viewport.aspect())?;

    let mut state = pollster::block_on(gpu::GpuState::new(
        &window,
        &assets,
        settings,
        config.buffering,
        viewport.pixel_size(),
    ))?;
    // textures live on the GPU from here on
    drop(assets);

    let clock = FrameClock::new();
    let mut frame = 0u64;

    event_loop.run(move |event, elwt| match event {
        Event::WindowEvent {
            event: WindowEvent::Resized(size),
            ..
        } => {
            state.resize(size);
            let scale = state.window.scale_factor();
            let (w, h) = logical_size(size, scale);
            input.on_resize(w, h, scale as f32);
            match camera.with_aspect(input.latest().viewport.aspect()) {
                Ok(c) => camera = c,
                Err(e) => log::warn!("[main] keeping previous camera: {}", e),
            }
        }
        Event::WindowEvent {
            event: WindowEvent::CursorMoved { position, .. },
            ..
        } => {
            let p = position.to_logical::<f32>(state.window.scale_factor());
            input.on_pointer_move(p.x, p.y);
        }
        Event::WindowEvent {
            event: WindowEvent::CloseRequested,
            ..
        } => elwt.exit(),
        Event::AboutToWait => {
            let inputs = FrameInputs::capture(frame, clock.elapsed_secs(), &params, &mut reader);
            frame += 1;
            match state.render(&inputs, &camera) {
                Ok(_) => state.window.request_redraw(),
                Err(wgpu::SurfaceError::Lost) => {
                    log::warn!("[gpu] surface lost, reconfiguring");
                    state.resize(state.window.inner_size());
                }
                Err(wgpu::SurfaceError::OutOfMemory) => {
                    log::error!("[gpu] out of memory, exiting");
                    elwt.exit();
                }
                Err(e) => log::warn!("[gpu] {:?}", e),
            }
        }
        _ => {}
    })?;
    Ok(())
}
