use anyhow::{Context as _, Result, anyhow};
use clap::Parser;
use egui::Context as EguiContext;
use labwalk_input::{InputEvent, InputState, MouseButton};
use labwalk_kernel::{SimConfig, SimEvent, Simulation, TriggerState};
use labwalk_render::{BodyShape, DrawList, RenderView};
use labwalk_render_wgpu::{Projection, WgpuRenderer};
use labwalk_tools::SimInspector;
use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing_subscriber::EnvFilter;
use winit::application::ApplicationHandler;
use winit::dpi::{PhysicalPosition, PhysicalSize};
use winit::event::{
    DeviceEvent, ElementState, KeyEvent, MouseButton as WinitButton, Touch, TouchPhase,
    WindowEvent,
};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

/// Longest frame fed to the simulation. Longer stalls are clamped.
const MAX_FRAME_DT: f32 = 0.1;
const EVENT_HISTORY: usize = 12;

#[derive(Parser)]
#[command(name = "labwalk-desktop", about = "Walk up to the laboratory entrance")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Simulation config file (.yaml, .yml or .json)
    #[arg(short, long)]
    config: Option<PathBuf>,
}

/// Textual key id understood by the input bindings.
fn key_id(key: KeyCode) -> Option<&'static str> {
    Some(match key {
        KeyCode::KeyW => "w",
        KeyCode::KeyA => "a",
        KeyCode::KeyS => "s",
        KeyCode::KeyD => "d",
        KeyCode::ArrowUp => "arrowup",
        KeyCode::ArrowDown => "arrowdown",
        KeyCode::ArrowLeft => "arrowleft",
        KeyCode::ArrowRight => "arrowright",
        KeyCode::Space => "space",
        KeyCode::ShiftLeft => "shift",
        _ => return None,
    })
}

/// Application state.
struct AppState {
    sim: Simulation,
    input: InputState,
    projection: Projection,
    show_inspector: bool,
    body: BodyShape,
    paused: bool,
    last_frame: Instant,
    /// Touch currently steering the virtual joystick and where it started.
    touch_origin: Option<(u64, PhysicalPosition<f64>)>,
    recent_events: VecDeque<String>,
}

impl AppState {
    fn new(sim: Simulation) -> Self {
        Self {
            sim,
            input: InputState::new(),
            projection: Projection::default(),
            show_inspector: true,
            body: BodyShape::default(),
            paused: false,
            last_frame: Instant::now(),
            touch_origin: None,
            recent_events: VecDeque::with_capacity(EVENT_HISTORY),
        }
    }

    fn update(&mut self, dt: f32) {
        if self.paused {
            // Drop look motion gathered while paused.
            self.input.snapshot();
            return;
        }

        let snapshot = self.input.snapshot();
        self.sim.step(dt, &snapshot);

        for event in self.sim.drain_events() {
            let line = match event {
                SimEvent::Collided { tick, push } => {
                    tracing::debug!(tick, %push, "collision");
                    continue;
                }
                SimEvent::DoorTriggered { tick, position } => {
                    format!("#{tick} door triggered at ({:.1}, {:.1})", position.x, position.z)
                }
                SimEvent::FadeStarted { tick } => format!("#{tick} fade started"),
                SimEvent::SceneSwitched { tick } => format!("#{tick} scene switched"),
            };
            tracing::info!("{line}");
            if self.recent_events.len() == EVENT_HISTORY {
                self.recent_events.pop_front();
            }
            self.recent_events.push_back(line);
        }
    }

    fn reset(&mut self) {
        self.sim.reset();
        self.input.release_all();
        self.recent_events.clear();
        tracing::info!("scene reset");
    }

    fn handle_key(&mut self, key: KeyCode, pressed: bool) {
        if let Some(id) = key_id(key) {
            let event = if pressed {
                InputEvent::KeyDown(id.to_string())
            } else {
                InputEvent::KeyUp(id.to_string())
            };
            self.input.apply(&event);
        }

        if !pressed {
            return;
        }

        match key {
            KeyCode::F1 => {
                self.show_inspector = !self.show_inspector;
            }
            KeyCode::F2 => {
                let enabled = !self.sim.collision_enabled();
                self.sim.set_collision_enabled(enabled);
            }
            KeyCode::F3 => {
                self.body = match self.body {
                    BodyShape::Stickman => BodyShape::Capsule,
                    BodyShape::Capsule => BodyShape::Stickman,
                };
            }
            KeyCode::KeyR => self.reset(),
            KeyCode::KeyP => {
                self.paused = !self.paused;
            }
            _ => {}
        }
    }

    fn handle_touch(&mut self, touch: Touch) {
        match touch.phase {
            TouchPhase::Started => {
                if self.touch_origin.is_none() {
                    self.touch_origin = Some((touch.id, touch.location));
                }
            }
            TouchPhase::Moved => {
                if let Some((id, origin)) = self.touch_origin {
                    if id == touch.id {
                        self.input.apply(&InputEvent::JoystickDrag {
                            x: (touch.location.x - origin.x) as f32,
                            y: (touch.location.y - origin.y) as f32,
                        });
                    }
                }
            }
            TouchPhase::Ended | TouchPhase::Cancelled => {
                if self.touch_origin.is_some_and(|(id, _)| id == touch.id) {
                    self.touch_origin = None;
                    self.input.apply(&InputEvent::JoystickRelease);
                }
            }
        }
    }

    fn draw_ui(&mut self, ctx: &EguiContext, draw_list: &DrawList) {
        if draw_list.fade_alpha > 0.0 {
            let alpha = (draw_list.fade_alpha.clamp(0.0, 1.0) * 255.0) as u8;
            ctx.layer_painter(egui::LayerId::new(
                egui::Order::Foreground,
                egui::Id::new("fade_overlay"),
            ))
            .rect_filled(ctx.screen_rect(), 0.0, egui::Color32::from_black_alpha(alpha));
        }

        if draw_list.scene_switched {
            egui::Area::new(egui::Id::new("scene_notice"))
                .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
                .order(egui::Order::Foreground)
                .show(ctx, |ui| {
                    ui.label(
                        egui::RichText::new("Entering the laboratory...")
                            .size(28.0)
                            .color(egui::Color32::WHITE),
                    );
                    if ui.button("Back to the entrance (R)").clicked() {
                        self.reset();
                    }
                });
        }

        if !self.show_inspector {
            return;
        }

        let summary = SimInspector::summary(&self.sim);

        egui::SidePanel::left("inspector")
            .default_width(280.0)
            .show(ctx, |ui| {
                ui.heading("Lab Entrance");
                ui.separator();
                ui.label(format!("Tick: {}  Time: {:.1}s", summary.tick, summary.elapsed));
                ui.label(format!(
                    "Avatar: ({:.2}, {:.2}, {:.2})",
                    summary.position.x, summary.position.y, summary.position.z
                ));
                ui.label(format!(
                    "Speed: {:.2}  Walking: {}",
                    summary.speed, summary.walking
                ));
                ui.label(format!(
                    "Yaw: {:.2}  Pitch: {:.2}",
                    summary.yaw, summary.pitch
                ));
                let eye = self.sim.camera().position();
                ui.label(format!("Camera: ({:.1}, {:.1}, {:.1})", eye.x, eye.y, eye.z));
                ui.separator();

                ui.heading("Door");
                ui.label(format!("State: {:?}", summary.door));
                ui.label(format!("Distance: {:.2}", summary.door_distance));
                if let Some(left) = self.sim.door().pending_remaining() {
                    ui.label(format!("Next transition in {left:.2}s"));
                }
                ui.label(format!("Fade: {:.2}", summary.fade_alpha));
                ui.separator();

                ui.heading("Controls");
                let mut collision = self.sim.collision_enabled();
                if ui
                    .checkbox(&mut collision, format!("Collision ({} obstacles)", summary.obstacles))
                    .changed()
                {
                    self.sim.set_collision_enabled(collision);
                }
                ui.checkbox(&mut self.paused, "Paused (P)");
                if ui.button("Reset (R)").clicked() {
                    self.reset();
                }

                ui.separator();
                ui.heading("Nearby obstacles");
                for (id, distance) in SimInspector::nearest_obstacles(&self.sim, 3) {
                    if let Some(info) = SimInspector::inspect_obstacle(&self.sim, id) {
                        ui.small(format!("{info} d={distance:.2}"));
                    }
                }

                ui.separator();
                ui.heading("Events");
                if self.recent_events.is_empty() {
                    ui.small("(none)");
                }
                for line in &self.recent_events {
                    ui.small(line);
                }

                ui.separator();
                ui.small("F1: Inspector | F2: Collision | F3: Body | LMB drag: Look | WASD/Arrows: Move");
                if self.sim.trigger_state() == TriggerState::Idle {
                    ui.small("Walk up to the door to enter.");
                }
            });
    }
}

/// Window, surface and renderers, created once the event loop resumes.
struct Gpu {
    window: Arc<Window>,
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    renderer: WgpuRenderer,
    egui_winit: egui_winit::State,
    egui_renderer: egui_wgpu::Renderer,
}

impl Gpu {
    fn new(event_loop: &ActiveEventLoop, egui_ctx: &EguiContext) -> Result<Self> {
        let attrs = Window::default_attributes()
            .with_title("Lab Entrance")
            .with_inner_size(PhysicalSize::new(1280u32, 720));
        let window = Arc::new(
            event_loop
                .create_window(attrs)
                .context("create window")?,
        );

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
        .ok_or_else(|| anyhow!("no suitable GPU adapter"))?;

        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("labwalk_device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
            },
            None,
        ))
        .context("create device")?;

        let size = window.inner_size();
        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first())
            .copied()
            .ok_or_else(|| anyhow!("surface reports no formats"))?;
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

        let renderer = WgpuRenderer::new(&device, surface_format, config.width, config.height);

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
            "GPU initialized with {} backend",
            adapter.get_info().backend.to_str()
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
        })
    }

    fn resize(&mut self, size: PhysicalSize<u32>) {
        self.config.width = size.width.max(1);
        self.config.height = size.height.max(1);
        self.surface.configure(&self.device, &self.config);
        self.renderer
            .resize(&self.device, self.config.width, self.config.height);
    }
}

struct GpuApp {
    state: AppState,
    gpu: Option<Gpu>,
    egui_ctx: EguiContext,
}

impl GpuApp {
    fn new(sim: Simulation) -> Self {
        Self {
            state: AppState::new(sim),
            gpu: None,
            egui_ctx: EguiContext::default(),
        }
    }

    fn render_frame(&mut self) {
        let Some(gpu) = self.gpu.as_mut() else {
            return;
        };

        let output = match gpu.surface.get_current_texture() {
            Ok(t) => t,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                gpu.surface.configure(&gpu.device, &gpu.config);
                return;
            }
            Err(e) => {
                tracing::error!("surface error: {e}");
                return;
            }
        };

        let target = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let draw_list = DrawList::build_with(&self.state.sim, self.state.body);
        let view = RenderView::of(&self.state.sim);
        gpu.renderer.render(
            &gpu.device,
            &gpu.queue,
            &target,
            &self.state.projection,
            &view,
            &draw_list,
        );

        let raw_input = gpu.egui_winit.take_egui_input(&gpu.window);
        let state = &mut self.state;
        let full_output = self.egui_ctx.run(raw_input, |ctx| {
            state.draw_ui(ctx, &draw_list);
        });

        gpu.egui_winit
            .handle_platform_output(&gpu.window, full_output.platform_output);

        let paint_jobs = self
            .egui_ctx
            .tessellate(full_output.shapes, full_output.pixels_per_point);

        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [gpu.config.width, gpu.config.height],
            pixels_per_point: full_output.pixels_per_point,
        };

        for (id, image_delta) in &full_output.textures_delta.set {
            gpu.egui_renderer
                .update_texture(&gpu.device, &gpu.queue, *id, image_delta);
        }
        let mut encoder = gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("egui_encoder"),
            });
        gpu.egui_renderer.update_buffers(
            &gpu.device,
            &gpu.queue,
            &mut encoder,
            &paint_jobs,
            &screen_descriptor,
        );
        {
            let mut pass = encoder
                .begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("egui_pass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view: &target,
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
            gpu.egui_renderer
                .render(&mut pass, &paint_jobs, &screen_descriptor);
        }
        gpu.queue.submit(std::iter::once(encoder.finish()));
        for id in &full_output.textures_delta.free {
            gpu.egui_renderer.free_texture(id);
        }

        output.present();
        gpu.window.request_redraw();
    }
}

impl ApplicationHandler for GpuApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.gpu.is_some() {
            return;
        }

        match Gpu::new(event_loop, &self.egui_ctx) {
            Ok(gpu) => {
                self.state
                    .projection
                    .resize(gpu.config.width, gpu.config.height);
                self.gpu = Some(gpu);
            }
            Err(e) => {
                tracing::error!("failed to initialize graphics: {e:#}");
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
            if response.consumed {
                return;
            }
        }

        match event {
            WindowEvent::CloseRequested => {
                self.state.sim.teardown();
                event_loop.exit();
            }
            WindowEvent::Resized(new_size) => {
                if let Some(gpu) = &mut self.gpu {
                    gpu.resize(new_size);
                    self.state
                        .projection
                        .resize(gpu.config.width, gpu.config.height);
                }
            }
            WindowEvent::Focused(false) => {
                self.state.input.apply(&InputEvent::FocusLost);
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(key),
                        state: key_state,
                        repeat: false,
                        ..
                    },
                ..
            } => {
                self.state
                    .handle_key(key, key_state == ElementState::Pressed);
            }
            WindowEvent::MouseInput {
                button: WinitButton::Left,
                state: btn_state,
                ..
            } => {
                let pressed = btn_state == ElementState::Pressed;
                if pressed {
                    self.state.input.mouse_down(MouseButton::Left);
                } else {
                    self.state.input.mouse_up(MouseButton::Left);
                }
                if let Some(gpu) = &self.gpu {
                    gpu.window.set_cursor_visible(!pressed);
                }
            }
            WindowEvent::Touch(touch) => {
                self.state.handle_touch(touch);
            }
            WindowEvent::RedrawRequested => {
                let now = Instant::now();
                let dt = (now - self.state.last_frame)
                    .as_secs_f32()
                    .min(MAX_FRAME_DT);
                self.state.last_frame = now;
                self.state.update(dt);
                self.render_frame();
            }
            _ => {}
        }
    }

    fn device_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _device_id: winit::event::DeviceId,
        event: DeviceEvent,
    ) {
        if let DeviceEvent::MouseMotion { delta } = event {
            self.state
                .input
                .mouse_moved(delta.0 as f32, delta.1 as f32);
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

    tracing::info!("labwalk-desktop starting");

    let config = match &cli.config {
        Some(path) => SimConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => SimConfig::default(),
    };
    let sim = Simulation::new(config)?;

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = GpuApp::new(sim);
    event_loop.run_app(&mut app)?;

    Ok(())
}
