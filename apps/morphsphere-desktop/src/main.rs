use anyhow::{Context, Result};
use clap::Parser;
use egui::Context as EguiContext;
use morphsphere_common::ParameterSnapshot;
use morphsphere_input::Action;
use morphsphere_render::{RenderLoop, RenderSettings, Viewport};
use morphsphere_render_wgpu::{GpuFrame, WgpuRenderer, supported_sample_count};
use morphsphere_scene::Geometry;
use morphsphere_timeline::{ObjectTimeline, TimelineChannel};
use morphsphere_tools::LoopInspector;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing_subscriber::EnvFilter;
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{ElementState, KeyEvent, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

#[derive(Parser)]
#[command(name = "morphsphere-desktop", about = "Morphsphere desktop application")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Render settings file (.json, .yaml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Timeline project-state file driving the parameters
    #[arg(short, long)]
    track: Option<PathBuf>,

    /// Sheet holding the animated object
    #[arg(long, default_value = "Scene")]
    sheet: String,

    /// Object whose tracks drive the mesh
    #[arg(long, default_value = "Shader")]
    object: String,

    /// Initial window width
    #[arg(long, default_value = "1280")]
    width: u32,

    /// Initial window height
    #[arg(long, default_value = "720")]
    height: u32,

    /// Start with playback paused
    #[arg(long)]
    paused: bool,
}

fn key_action(key: KeyCode) -> Option<Action> {
    match key {
        KeyCode::Space => Some(Action::TogglePlayback),
        KeyCode::Home => Some(Action::Rewind),
        KeyCode::F1 => Some(Action::ToggleInspector),
        KeyCode::Escape => Some(Action::Exit),
        _ => None,
    }
}

/// Application state.
struct AppState {
    render_loop: RenderLoop<TimelineChannel>,
    show_inspector: bool,
    last_frame: Instant,
}

impl AppState {
    fn new(settings: &RenderSettings, channel: TimelineChannel, width: u32, height: u32) -> Self {
        let render_loop = RenderLoop::new(
            settings.build_mesh(),
            settings.camera(),
            Viewport::new(width, height),
            settings.viewport_controller(),
            channel,
        );
        Self {
            render_loop,
            show_inspector: true,
            last_frame: Instant::now(),
        }
    }

    /// Apply an action. Returns `false` when the app should exit.
    fn apply(&mut self, action: Action) -> bool {
        match action {
            Action::ToggleInspector => {
                self.show_inspector = !self.show_inspector;
            }
            Action::Exit => {
                self.render_loop.stop();
                return false;
            }
            transport => {
                transport.apply(self.render_loop.channel_mut().playhead_mut());
            }
        }
        true
    }

    fn draw_ui(&self, ctx: &EguiContext) -> Vec<Action> {
        let mut actions = Vec::new();
        if !self.show_inspector {
            return actions;
        }

        let summary = LoopInspector::summary(&self.render_loop);
        let playback = LoopInspector::playback(self.render_loop.channel().playhead());
        let mesh = self.render_loop.mesh();

        egui::SidePanel::left("inspector")
            .default_width(280.0)
            .show(ctx, |ui| {
                ui.heading("Morphsphere");
                ui.separator();
                ui.label(format!("Loop: {:?}  Frames: {}", summary.state, summary.frames));
                ui.label(format!(
                    "Viewport: {}x{}  aspect {:.3}",
                    summary.viewport.width, summary.viewport.height, summary.aspect
                ));
                ui.label(format!("Vertices: {}", summary.vertices));
                ui.separator();

                ui.heading("Playback");
                ui.label(playback.to_string());
                ui.horizontal(|ui| {
                    let label = if playback.playing {
                        "Pause (Space)"
                    } else {
                        "Play (Space)"
                    };
                    if ui.button(label).clicked() {
                        actions.push(Action::TogglePlayback);
                    }
                    if ui.button("Rewind (Home)").clicked() {
                        actions.push(Action::Rewind);
                    }
                });
                let mut position = playback.position;
                let slider = egui::Slider::new(&mut position, 0.0..=playback.length).suffix(" s");
                if ui.add(slider).changed() {
                    actions.push(Action::Seek(position));
                }
                ui.separator();

                ui.heading("Uniforms");
                egui::Grid::new("uniforms").striped(true).show(ui, |ui| {
                    for (name, value) in LoopInspector::uniform_rows(mesh) {
                        ui.label(name);
                        ui.label(value);
                        ui.end_row();
                    }
                });
                ui.separator();

                ui.heading("Transform");
                egui::Grid::new("transform").striped(true).show(ui, |ui| {
                    for (name, value) in LoopInspector::transform_rows(&mesh.transform) {
                        ui.label(name);
                        ui.label(value);
                        ui.end_row();
                    }
                });

                ui.separator();
                ui.small("F1: Toggle Inspector | Space: Play/Pause | Home: Rewind | Esc: Quit");
            });

        actions
    }
}

/// Window and GPU resources, created once the event loop resumes.
struct Gpu {
    window: Arc<Window>,
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    renderer: WgpuRenderer,
    egui_winit: egui_winit::State,
    egui_renderer: egui_wgpu::Renderer,
    max_pixel_ratio: f32,
}

impl Gpu {
    fn new(
        event_loop: &ActiveEventLoop,
        settings: &RenderSettings,
        egui_ctx: &EguiContext,
        size: PhysicalSize<u32>,
        geometry: &Geometry,
    ) -> Result<Self> {
        let attrs = Window::default_attributes()
            .with_title("Morphsphere")
            .with_inner_size(size)
            .with_transparent(settings.clear_color[3] < 1.0);
        let window = Arc::new(event_loop.create_window(attrs)?);

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let surface = instance.create_surface(window.clone())?;

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .context("no suitable GPU adapter")?;

        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("morphsphere_device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
            },
            None,
        ))?;

        let render_size = Viewport::new(window.inner_size().width, window.inner_size().height)
            .capped_to_pixel_ratio(window.scale_factor(), settings.max_pixel_ratio);
        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first())
            .copied()
            .context("surface reports no formats")?;
        let alpha_mode = surface_caps
            .alpha_modes
            .iter()
            .find(|m| **m == wgpu::CompositeAlphaMode::PreMultiplied)
            .or_else(|| surface_caps.alpha_modes.first())
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: render_size.width.max(1),
            height: render_size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let sample_count = supported_sample_count(&adapter, surface_format, settings.msaa_samples);
        if sample_count != settings.msaa_samples.max(1) {
            tracing::warn!(
                requested = settings.msaa_samples,
                using = sample_count,
                "MSAA sample count not supported"
            );
        }
        let renderer = WgpuRenderer::new(
            &device,
            surface_format,
            config.width,
            config.height,
            geometry,
            settings.clear_color,
            sample_count,
        );

        let egui_winit = egui_winit::State::new(
            egui_ctx.clone(),
            egui::ViewportId::ROOT,
            &window,
            Some(window.scale_factor() as f32),
            None,
            None,
        );
        let egui_renderer = egui_wgpu::Renderer::new(&device, surface_format, None, 1, false);

        tracing::info!(
            backend = adapter.get_info().backend.to_str(),
            format = ?surface_format,
            width = config.width,
            height = config.height,
            sample_count,
            "GPU initialized"
        );

        Ok(Self {
            window,
            surface,
            device,
            queue,
            config,
            renderer,
            egui_winit,
            egui_renderer,
            max_pixel_ratio: settings.max_pixel_ratio,
        })
    }

    /// Drawable size for a window of `width` x `height` physical pixels,
    /// after the pixel-ratio cap.
    fn render_size(&self, width: u32, height: u32) -> Viewport {
        Viewport::new(width, height)
            .capped_to_pixel_ratio(self.window.scale_factor(), self.max_pixel_ratio)
    }

    fn surface_size(&self) -> Viewport {
        Viewport::new(self.config.width, self.config.height)
    }

    fn resize(&mut self, width: u32, height: u32) {
        let size = self.render_size(width, height);
        self.config.width = size.width.max(1);
        self.config.height = size.height.max(1);
        self.surface.configure(&self.device, &self.config);
        self.renderer
            .resize(&self.device, self.config.width, self.config.height);
    }

    /// Surface pixels per window pixel; below 1 when the cap applies.
    fn surface_scale(&self) -> f32 {
        let window_width = self.window.inner_size().width.max(1);
        self.config.width as f32 / window_width as f32
    }

    /// Tick the loop into the next surface texture, overlay the inspector,
    /// present. Returns the actions the inspector produced.
    fn frame(&mut self, state: &mut AppState, egui_ctx: &EguiContext) -> Vec<Action> {
        let output = match self.surface.get_current_texture() {
            Ok(t) => t,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                tracing::debug!("surface lost or outdated; reconfiguring");
                self.surface.configure(&self.device, &self.config);
                return Vec::new();
            }
            Err(e) => {
                tracing::error!("surface error: {e}");
                return Vec::new();
            }
        };

        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut frame = GpuFrame {
            renderer: &self.renderer,
            device: &self.device,
            queue: &self.queue,
            view: &view,
        };
        state.render_loop.tick(&mut frame);

        let raw_input = self.egui_winit.take_egui_input(&self.window);
        let mut actions = Vec::new();
        let full_output = egui_ctx.run(raw_input, |ctx| {
            actions = state.draw_ui(ctx);
        });

        self.egui_winit
            .handle_platform_output(&self.window, full_output.platform_output);

        // egui lays out in window points; draw them into the capped surface.
        let pixels_per_point = full_output.pixels_per_point * self.surface_scale();
        let paint_jobs = egui_ctx.tessellate(full_output.shapes, pixels_per_point);

        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [self.config.width, self.config.height],
            pixels_per_point,
        };

        for (id, image_delta) in &full_output.textures_delta.set {
            self.egui_renderer
                .update_texture(&self.device, &self.queue, *id, image_delta);
        }
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("egui_encoder"),
            });
        self.egui_renderer.update_buffers(
            &self.device,
            &self.queue,
            &mut encoder,
            &paint_jobs,
            &screen_descriptor,
        );
        {
            let mut pass = encoder
                .begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("egui_pass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view: &view,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Load,
                            store: wgpu::StoreOp::Store,
                        },
                    })],
                    depth_stencil_attachment: None,
                    ..Default::default()
                })
                .forget_lifetime();
            self.egui_renderer
                .render(&mut pass, &paint_jobs, &screen_descriptor);
        }
        self.queue.submit(std::iter::once(encoder.finish()));
        for id in &full_output.textures_delta.free {
            self.egui_renderer.free_texture(id);
        }

        output.present();
        actions
    }
}

struct GpuApp {
    settings: RenderSettings,
    state: AppState,
    initial_size: PhysicalSize<u32>,
    gpu: Option<Gpu>,
    egui_ctx: EguiContext,
}

impl GpuApp {
    fn new(settings: RenderSettings, channel: TimelineChannel, width: u32, height: u32) -> Self {
        let state = AppState::new(&settings, channel, width, height);
        Self {
            settings,
            state,
            initial_size: PhysicalSize::new(width, height),
            gpu: None,
            egui_ctx: EguiContext::default(),
        }
    }

    fn dispatch(&mut self, event_loop: &ActiveEventLoop, actions: Vec<Action>) {
        for action in actions {
            if !self.state.apply(action) {
                event_loop.exit();
                return;
            }
        }
    }
}

impl ApplicationHandler for GpuApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.gpu.is_some() {
            return;
        }

        let geometry = self.state.render_loop.mesh().geometry();
        match Gpu::new(
            event_loop,
            &self.settings,
            &self.egui_ctx,
            self.initial_size,
            geometry,
        ) {
            Ok(gpu) => {
                let size = gpu.surface_size();
                self.state.render_loop.resize(size.width, size.height);
                self.gpu = Some(gpu);
            }
            Err(e) => {
                tracing::error!("failed to initialise window or GPU: {e:#}");
                event_loop.exit();
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        let Some(gpu) = &mut self.gpu else {
            return;
        };

        let response = gpu.egui_winit.on_window_event(&gpu.window, &event);
        if response.consumed {
            return;
        }

        match event {
            WindowEvent::CloseRequested => {
                self.state.render_loop.stop();
                event_loop.exit();
            }
            WindowEvent::Resized(new_size) => {
                gpu.resize(new_size.width, new_size.height);
                let size = gpu.surface_size();
                self.state.render_loop.resize(size.width, size.height);
            }
            WindowEvent::ScaleFactorChanged { .. } => {
                let window_size = gpu.window.inner_size();
                gpu.resize(window_size.width, window_size.height);
                let size = gpu.surface_size();
                self.state.render_loop.resize(size.width, size.height);
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(key),
                        state: ElementState::Pressed,
                        repeat: false,
                        ..
                    },
                ..
            } => {
                if let Some(action) = key_action(key) {
                    self.dispatch(event_loop, vec![action]);
                }
            }
            WindowEvent::RedrawRequested => {
                let now = Instant::now();
                let dt = (now - self.state.last_frame).as_secs_f32().min(0.1);
                self.state.last_frame = now;
                self.state.render_loop.channel_mut().advance(dt);

                let actions = gpu.frame(&mut self.state, &self.egui_ctx);
                gpu.window.request_redraw();
                self.dispatch(event_loop, actions);
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(gpu) = &self.gpu {
            gpu.window.request_redraw();
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    tracing::info!("morphsphere-desktop starting");

    let settings = match &cli.config {
        Some(path) => RenderSettings::load(path)
            .with_context(|| format!("loading settings {}", path.display()))?,
        None => RenderSettings::default(),
    };

    let mut channel = match &cli.track {
        Some(path) => TimelineChannel::from_file(path, &cli.sheet, &cli.object)
            .with_context(|| format!("loading track {}", path.display()))?,
        None => TimelineChannel::new(ObjectTimeline::constant(ParameterSnapshot::default())),
    };
    if cli.paused {
        channel.playhead_mut().pause();
    }

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = GpuApp::new(settings, channel, cli.width, cli.height);
    event_loop.run_app(&mut app)?;

    Ok(())
}
