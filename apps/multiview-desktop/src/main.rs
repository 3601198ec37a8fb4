use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use egui::Context as EguiContext;
use multiview_common::{Color, SurfaceSize};
use multiview_render::{CompositeMode, DemoCompositor, RenderError, Renderer, initial_mode};
use multiview_render_wgpu::{CanvasTexture, Presenter, WgpuRenderer};
use multiview_scene::{Demo, DemoConfig, SPIN_STEP};
use tracing_subscriber::EnvFilter;
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{ElementState, KeyEvent, MouseScrollDelta, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

/// Pixels scrolled per mouse-wheel line.
const SCROLL_LINE: f32 = 40.0;
const PAGE_BACKGROUND: Color = Color::WHITE;

#[derive(Parser)]
#[command(name = "multiview-desktop", about = "Multi-viewport cube demos")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// stacked, copy-out, toggle or grid
    #[arg(short, long)]
    demo: Option<Demo>,

    /// RNG seed for scene generation
    #[arg(short, long)]
    seed: Option<u64>,

    /// JSON demo config; flags override its values
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Initial window width
    #[arg(long)]
    width: Option<u32>,

    /// Initial window height
    #[arg(long)]
    height: Option<u32>,

    /// Spin the cubes every frame (default depends on the demo)
    #[arg(long)]
    animate: Option<bool>,
}

impl Cli {
    fn demo_config(&self) -> Result<DemoConfig> {
        let mut config = load_config(self.config.as_deref())?;
        if let Some(demo) = self.demo {
            config.demo = demo;
        }
        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        if let Some(width) = self.width {
            config.width = width;
        }
        if let Some(height) = self.height {
            config.height = height;
        }
        if self.animate.is_some() {
            config.animate = self.animate;
        }
        Ok(config)
    }
}

fn load_config(path: Option<&Path>) -> Result<DemoConfig> {
    let Some(path) = path else {
        return Ok(DemoConfig::default());
    };
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    let config = DemoConfig::from_json(&text)
        .with_context(|| format!("parsing config {}", path.display()))?;
    Ok(config)
}

/// Things the UI asks for; applied after the egui pass.
#[derive(Default)]
struct UiAction {
    toggle_mode: bool,
}

/// Demo state, independent of the GPU.
struct AppState {
    config: DemoConfig,
    compositor: DemoCompositor,
    mode: CompositeMode,
    animate: bool,
    scroll_top: u32,
    show_shared: bool,
    show_panel: bool,
}

impl AppState {
    fn new(config: DemoConfig) -> Result<Self, RenderError> {
        let compositor = DemoCompositor::build(&config)?;
        Ok(Self {
            mode: initial_mode(config.demo),
            animate: config.animate(),
            compositor,
            config,
            scroll_top: 0,
            show_shared: false,
            show_panel: true,
        })
    }

    /// Switch between one scissored surface and dedicated canvases. The
    /// arena is rebuilt from scratch, at the current window width.
    fn toggle_mode(
        &mut self,
        canvases: &mut Vec<CanvasTexture>,
        size: SurfaceSize,
    ) -> Result<(), RenderError> {
        self.mode = self.mode.toggled();
        self.config.width = size.width;
        self.config.height = size.height;
        self.compositor = DemoCompositor::build(&self.config)?;
        canvases.clear();
        self.scroll_top = 0;
        tracing::info!(mode = ?self.mode, "composite mode toggled");
        Ok(())
    }

    fn max_scroll(&self, view_height: u32) -> u32 {
        match &self.compositor {
            DemoCompositor::Stacked(c) => c.layout().total_height().saturating_sub(view_height),
            DemoCompositor::Grid(_) => 0,
        }
    }

    fn scroll_by(&mut self, dy: f32, view_height: u32) {
        let target = (self.scroll_top as f32 + dy).max(0.0) as u32;
        self.scroll_top = target.min(self.max_scroll(view_height));
    }

    /// Relayout, animate, draw and present one frame into `target`.
    fn draw(
        &mut self,
        gpu: &mut GpuContext,
        size: SurfaceSize,
        target: &wgpu::TextureView,
    ) -> Result<(), RenderError> {
        let step = self.animate.then_some(SPIN_STEP);
        match &mut self.compositor {
            DemoCompositor::Stacked(compositor) => {
                compositor.prepare(size.width, step)?;
                let max_scroll = compositor.layout().total_height().saturating_sub(size.height);
                self.scroll_top = self.scroll_top.min(max_scroll);
                match self.mode {
                    CompositeMode::Scissored => {
                        compositor.draw_scissored(&mut gpu.renderer, self.scroll_top, size.height)?;
                        gpu.renderer.submit();
                        gpu.present_frame(target, size);
                    }
                    CompositeMode::DedicatedCanvases => {
                        compositor.draw_to_canvases(&mut gpu.renderer, &mut gpu.canvases)?;
                        if self.show_shared {
                            // The copy-out frames end at the last batch; redraw the
                            // scroll window of the whole shared surface.
                            compositor.draw_scissored(
                                &mut gpu.renderer,
                                self.scroll_top,
                                size.height,
                            )?;
                        }
                        gpu.renderer.submit();
                        if self.show_shared {
                            gpu.present_frame(target, size);
                        } else {
                            gpu.presenter.present_canvases(
                                &gpu.device,
                                &gpu.queue,
                                target,
                                size,
                                PAGE_BACKGROUND,
                                &gpu.canvases,
                                self.scroll_top,
                            );
                        }
                    }
                }
            }
            DemoCompositor::Grid(compositor) => {
                compositor.tick(&mut gpu.renderer, size, step)?;
                gpu.renderer.submit();
                gpu.present_frame(target, size);
            }
        }
        Ok(())
    }

    fn draw_ui(&mut self, ctx: &EguiContext) -> UiAction {
        let mut action = UiAction::default();
        if !self.show_panel {
            return action;
        }

        egui::Window::new("Multiview")
            .default_pos([12.0, 12.0])
            .resizable(false)
            .show(ctx, |ui| {
                ui.label(format!("Demo: {}  Seed: {}", self.config.demo, self.config.seed));
                ui.label(format!("Scenes: {}", self.compositor.len()));
                ui.label(format!("Mode: {:?}", self.mode));
                if let DemoCompositor::Stacked(c) = &self.compositor {
                    ui.label(format!(
                        "Surface: {}x{}  Scroll: {}",
                        c.layout().width(),
                        c.layout().total_height(),
                        self.scroll_top
                    ));
                }
                ui.checkbox(&mut self.animate, "Animate");
                if self.mode == CompositeMode::DedicatedCanvases {
                    ui.checkbox(&mut self.show_shared, "Show shared surface");
                }
                if self.config.demo == Demo::Toggle && ui.button("Toggle mode (T)").clicked() {
                    action.toggle_mode = true;
                }
                ui.separator();
                ui.small("F1: Toggle panel | Wheel: Scroll");
            });
        action
    }
}

/// Everything that exists once the window and device are up.
struct GpuContext {
    window: Arc<Window>,
    surface: wgpu::Surface<'static>,
    device: Arc<wgpu::Device>,
    queue: Arc<wgpu::Queue>,
    config: wgpu::SurfaceConfiguration,
    renderer: WgpuRenderer,
    presenter: Presenter,
    canvases: Vec<CanvasTexture>,
    egui_winit: egui_winit::State,
    egui_renderer: egui_wgpu::Renderer,
}

impl GpuContext {
    fn new(
        event_loop: &ActiveEventLoop,
        egui_ctx: &EguiContext,
        size: PhysicalSize<u32>,
    ) -> Result<Self> {
        let attrs = Window::default_attributes()
            .with_title("Multiview")
            .with_inner_size(size);
        let window = Arc::new(event_loop.create_window(attrs).context("create window")?);

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let surface = instance
            .create_surface(window.clone())
            .context("create surface")?;

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .context("find adapter")?;

        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("multiview_device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
            },
            None,
        ))
        .context("create device")?;
        let device = Arc::new(device);
        let queue = Arc::new(queue);

        let size = window.inner_size();
        let surface_caps = surface.get_capabilities(&adapter);
        // Clear colors are given as raw hex values; a linear surface keeps them exact.
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| !f.is_srgb())
            .copied()
            .or_else(|| surface_caps.formats.first().copied())
            .context("surface has no formats")?;
        let alpha_mode = surface_caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let renderer = WgpuRenderer::new(
            device.clone(),
            queue.clone(),
            SurfaceSize::new(config.width, config.height),
        );
        let presenter = Presenter::new(&device, surface_format);

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
            "GPU initialized with {} backend, surface {:?}",
            adapter.get_info().backend.to_str(),
            surface_format
        );

        Ok(Self {
            window,
            surface,
            device,
            queue,
            config,
            renderer,
            presenter,
            canvases: Vec::new(),
            egui_winit,
            egui_renderer,
        })
    }

    fn size(&self) -> SurfaceSize {
        SurfaceSize::new(self.config.width, self.config.height)
    }

    fn resize(&mut self, new_size: PhysicalSize<u32>) {
        self.config.width = new_size.width.max(1);
        self.config.height = new_size.height.max(1);
        self.surface.configure(&self.device, &self.config);
    }

    fn present_frame(&self, target: &wgpu::TextureView, size: SurfaceSize) {
        self.presenter.present_frame(
            &self.device,
            &self.queue,
            target,
            size,
            PAGE_BACKGROUND,
            self.renderer.frame_view(),
            self.renderer.size(),
        );
    }

    fn paint_ui(
        &mut self,
        egui_ctx: &EguiContext,
        full_output: egui::FullOutput,
        view: &wgpu::TextureView,
    ) {
        self.egui_winit
            .handle_platform_output(&self.window, full_output.platform_output);

        let paint_jobs = egui_ctx.tessellate(full_output.shapes, full_output.pixels_per_point);
        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [self.config.width, self.config.height],
            pixels_per_point: full_output.pixels_per_point,
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
                        view,
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
    }
}

struct GpuApp {
    state: AppState,
    gpu: Option<GpuContext>,
    egui_ctx: EguiContext,
}

impl GpuApp {
    fn new(state: AppState) -> Self {
        Self {
            state,
            gpu: None,
            egui_ctx: EguiContext::default(),
        }
    }

    fn request_redraw(&self) {
        if let Some(gpu) = &self.gpu {
            gpu.window.request_redraw();
        }
    }

    fn toggle_mode(&mut self, event_loop: &ActiveEventLoop) {
        let Some(gpu) = self.gpu.as_mut() else {
            return;
        };
        let size = gpu.size();
        if let Err(e) = self.state.toggle_mode(&mut gpu.canvases, size) {
            tracing::error!("failed to rebuild demo: {e}");
            event_loop.exit();
            return;
        }
        self.request_redraw();
    }

    fn handle_key(&mut self, event_loop: &ActiveEventLoop, key: KeyCode) {
        match key {
            KeyCode::KeyT if self.state.config.demo == Demo::Toggle => {
                self.toggle_mode(event_loop);
            }
            KeyCode::F1 => {
                self.state.show_panel = !self.state.show_panel;
            }
            KeyCode::Escape => {
                event_loop.exit();
            }
            _ => {}
        }
        self.request_redraw();
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let Some(gpu) = self.gpu.as_mut() else {
            return;
        };

        let output = match gpu.surface.get_current_texture() {
            Ok(t) => t,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                gpu.surface.configure(&gpu.device, &gpu.config);
                gpu.window.request_redraw();
                return;
            }
            Err(e) => {
                tracing::error!("surface error: {e}");
                return;
            }
        };
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let size = gpu.size();
        if let Err(e) = self.state.draw(gpu, size, &view) {
            tracing::error!("render failed: {e}");
            event_loop.exit();
            return;
        }

        let raw_input = gpu.egui_winit.take_egui_input(&gpu.window);
        let mut action = UiAction::default();
        let full_output = self.egui_ctx.run(raw_input, |ctx| {
            action = self.state.draw_ui(ctx);
        });
        gpu.paint_ui(&self.egui_ctx, full_output, &view);

        output.present();

        if action.toggle_mode {
            self.toggle_mode(event_loop);
        }
        if self.state.animate {
            self.request_redraw();
        }
    }
}

impl ApplicationHandler for GpuApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.gpu.is_some() {
            return;
        }
        let size = PhysicalSize::new(self.state.config.width, self.state.config.height);
        match GpuContext::new(event_loop, &self.egui_ctx, size) {
            Ok(gpu) => {
                gpu.window.request_redraw();
                self.gpu = Some(gpu);
            }
            Err(e) => {
                tracing::error!("failed to initialize GPU: {e:#}");
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
        if let Some(gpu) = &mut self.gpu {
            let response = gpu.egui_winit.on_window_event(&gpu.window, &event);
            if response.repaint {
                gpu.window.request_redraw();
            }
            if response.consumed {
                return;
            }
        }

        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(new_size) => {
                if let Some(gpu) = &mut self.gpu {
                    gpu.resize(new_size);
                    tracing::debug!(
                        width = new_size.width,
                        height = new_size.height,
                        "window resized"
                    );
                }
                self.request_redraw();
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
                self.handle_key(event_loop, key);
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let dy = match delta {
                    MouseScrollDelta::LineDelta(_, lines) => -lines * SCROLL_LINE,
                    MouseScrollDelta::PixelDelta(pos) => -pos.y as f32,
                };
                let view_height = self.gpu.as_ref().map_or(0, |gpu| gpu.config.height);
                self.state.scroll_by(dy, view_height);
                self.request_redraw();
            }
            WindowEvent::RedrawRequested => {
                self.redraw(event_loop);
            }
            _ => {}
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    let config = cli.demo_config()?;
    tracing::info!(demo = %config.demo, "multiview-desktop starting");

    let state = AppState::new(config)?;

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Wait);

    let mut app = GpuApp::new(state);
    event_loop.run_app(&mut app)?;

    Ok(())
}
