use anyhow::{Context, Result};
use clap::Parser;
use egui::Context as EguiContext;
use glam::Vec3;
use meshview_assets::{MeshData, TextureImage, load_obj};
use meshview_common::ModelTransform;
use meshview_input::{Button, Callbacks, EventKind, InputEvent, KeyCode};
use meshview_render::{ClearColor, MeshRenderer, OrbitCamera};
use std::cell::Cell;
use std::rc::Rc;
use std::sync::Arc;
use std::time::Instant;
use tracing_subscriber::EnvFilter;
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{ElementState, KeyEvent, MouseButton, MouseScrollDelta, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode as WinitKey, PhysicalKey};
use winit::window::{Window, WindowId};

#[derive(Parser)]
#[command(name = "meshview", about = "Minimal OBJ viewer with a debug panel")]
struct Cli {
    /// OBJ model to display
    #[arg(long, default_value = "assets/models/viking_room.obj")]
    model: String,

    /// Diffuse texture for the model
    #[arg(long, default_value = "assets/models/viking_room.png")]
    texture: String,

    /// Initial window width
    #[arg(long, default_value_t = 800)]
    width: u32,

    /// Initial window height
    #[arg(long, default_value_t = 600)]
    height: u32,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

/// Viewer state: the values the debug panel edits, plus input plumbing.
struct AppState {
    model: ModelTransform,
    auto_rotate: bool,
    camera: OrbitCamera,
    clear_color: ClearColor,
    callbacks: Callbacks,
    close_requested: Rc<Cell<bool>>,
    last_frame: Instant,
    // Exponentially smoothed frame time, milliseconds
    frame_ms: f32,
}

impl AppState {
    fn new() -> Self {
        let close_requested = Rc::new(Cell::new(false));
        let mut callbacks = Callbacks::new();

        let flag = close_requested.clone();
        callbacks.append(EventKind::Key, move |event| {
            if let InputEvent::Key {
                code: KeyCode::Escape,
                pressed: true,
            } = event
            {
                flag.set(true);
            }
        });
        callbacks.append(EventKind::Key, |event| {
            tracing::debug!(?event, "keyboard");
        });
        callbacks.append(EventKind::Resized, |event| {
            tracing::debug!(?event, "framebuffer resized");
        });
        callbacks.append(EventKind::MouseButton, |event| {
            tracing::debug!(?event, "mouse button");
        });
        callbacks.append(EventKind::CursorEntered, |event| {
            tracing::debug!(?event, "cursor enter");
        });
        callbacks.append(EventKind::CursorMoved, |event| {
            tracing::trace!(?event, "cursor position");
        });
        callbacks.append(EventKind::Scroll, |event| {
            tracing::trace!(?event, "scroll");
        });

        Self {
            model: ModelTransform::default(),
            auto_rotate: true,
            camera: OrbitCamera::default(),
            clear_color: ClearColor::default(),
            callbacks,
            close_requested,
            last_frame: Instant::now(),
            frame_ms: 16.0,
        }
    }

    fn update(&mut self, dt: f32) {
        if self.auto_rotate {
            // 60 degrees per second, frame-rate independent
            self.model.rotation_deg = (self.model.rotation_deg + 60.0 * dt).rem_euclid(360.0);
        }
        self.frame_ms = self.frame_ms * 0.9 + dt * 1000.0 * 0.1;
    }

    fn draw_ui(&mut self, ctx: &EguiContext) {
        egui::Window::new("Debug")
            .default_width(300.0)
            .show(ctx, |ui| {
                ui.heading("Model Matrix");
                vec3_drag(ui, "Scale", &mut self.model.scale, 0.01);
                ui.horizontal(|ui| {
                    ui.label("Rotate");
                    ui.add(egui::DragValue::new(&mut self.model.rotation_deg).speed(1.0));
                    ui.checkbox(&mut self.auto_rotate, "Auto Rotate");
                });
                vec3_drag(ui, "Translate", &mut self.model.translation, 0.01);

                ui.separator();
                ui.heading("View Matrix");
                vec3_drag(ui, "Camera Position", &mut self.camera.position, 0.05);
                vec3_drag(ui, "Camera Target", &mut self.camera.target, 0.05);

                ui.separator();
                ui.heading("Projection Matrix");
                ui.horizontal(|ui| {
                    ui.label("FOV");
                    ui.add(
                        egui::DragValue::new(&mut self.camera.fov_deg)
                            .speed(1.0)
                            .range(0.0..=180.0),
                    );
                });

                ui.separator();
                ui.horizontal(|ui| {
                    ui.label("Clear Color");
                    ui.color_edit_button_rgba_unmultiplied(&mut self.clear_color.0);
                });

                ui.separator();
                ui.label(format!(
                    "{:.3} ms/frame ({:.1} FPS)",
                    self.frame_ms,
                    1000.0 / self.frame_ms.max(0.001)
                ));
            });
    }
}

/// Edit a Vec3 as three drag values on one row.
fn vec3_drag(ui: &mut egui::Ui, label: &str, v: &mut Vec3, speed: f64) {
    ui.horizontal(|ui| {
        ui.label(label);
        ui.add(egui::DragValue::new(&mut v.x).prefix("X: ").speed(speed));
        ui.add(egui::DragValue::new(&mut v.y).prefix("Y: ").speed(speed));
        ui.add(egui::DragValue::new(&mut v.z).prefix("Z: ").speed(speed));
    });
}

/// Translate a winit window event into the viewer's input vocabulary.
fn map_window_event(event: &WindowEvent) -> Option<InputEvent> {
    match event {
        WindowEvent::Resized(size) => Some(InputEvent::Resized {
            width: size.width,
            height: size.height,
        }),
        WindowEvent::KeyboardInput {
            event:
                KeyEvent {
                    physical_key: PhysicalKey::Code(key),
                    state,
                    ..
                },
            ..
        } => {
            let code = match key {
                WinitKey::Escape => KeyCode::Escape,
                WinitKey::Space => KeyCode::Space,
                _ => KeyCode::Other,
            };
            Some(InputEvent::Key {
                code,
                pressed: *state == ElementState::Pressed,
            })
        }
        WindowEvent::CursorMoved { position, .. } => Some(InputEvent::CursorMoved {
            x: position.x,
            y: position.y,
        }),
        WindowEvent::CursorEntered { .. } => Some(InputEvent::CursorEntered(true)),
        WindowEvent::CursorLeft { .. } => Some(InputEvent::CursorEntered(false)),
        WindowEvent::MouseInput { button, state, .. } => {
            let button = match button {
                MouseButton::Left => Button::Left,
                MouseButton::Right => Button::Right,
                MouseButton::Middle => Button::Middle,
                MouseButton::Back => Button::Other(3),
                MouseButton::Forward => Button::Other(4),
                MouseButton::Other(n) => Button::Other(*n),
            };
            Some(InputEvent::MouseButton {
                button,
                pressed: *state == ElementState::Pressed,
            })
        }
        WindowEvent::MouseWheel { delta, .. } => {
            let (dx, dy) = match delta {
                MouseScrollDelta::LineDelta(x, y) => (*x, *y),
                MouseScrollDelta::PixelDelta(p) => (p.x as f32, p.y as f32),
            };
            Some(InputEvent::Scroll { dx, dy })
        }
        _ => None,
    }
}

struct GpuApp {
    state: AppState,
    mesh: MeshData,
    texture: TextureImage,
    initial_size: PhysicalSize<u32>,
    window: Option<Arc<Window>>,
    surface: Option<wgpu::Surface<'static>>,
    device: Option<wgpu::Device>,
    queue: Option<wgpu::Queue>,
    config: Option<wgpu::SurfaceConfiguration>,
    renderer: Option<MeshRenderer>,
    egui_ctx: EguiContext,
    egui_winit: Option<egui_winit::State>,
    egui_renderer: Option<egui_wgpu::Renderer>,
}

impl GpuApp {
    fn new(mesh: MeshData, texture: TextureImage, width: u32, height: u32) -> Self {
        Self {
            state: AppState::new(),
            mesh,
            texture,
            initial_size: PhysicalSize::new(width.max(1), height.max(1)),
            window: None,
            surface: None,
            device: None,
            queue: None,
            config: None,
            renderer: None,
            egui_ctx: EguiContext::default(),
            egui_winit: None,
            egui_renderer: None,
        }
    }
}

impl ApplicationHandler for GpuApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let attrs = Window::default_attributes()
            .with_title("meshview")
            .with_inner_size(self.initial_size)
            .with_transparent(true);
        let window = Arc::new(event_loop.create_window(attrs).expect("create window"));

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let surface = instance
            .create_surface(window.clone())
            .expect("create surface");

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .expect("find adapter");

        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("meshview_device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
            },
            None,
        ))
        .expect("create device");

        let size = window.inner_size();
        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .copied()
            .unwrap_or(surface_caps.formats[0]);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        self.state.camera.aspect = size.width as f32 / size.height.max(1) as f32;

        let renderer = MeshRenderer::new(
            &device,
            &queue,
            surface_format,
            size.width,
            size.height,
            &self.mesh,
            &self.texture,
        );

        let egui_winit = egui_winit::State::new(
            self.egui_ctx.clone(),
            egui::ViewportId::ROOT,
            &window,
            Some(window.scale_factor() as f32),
            None,
            None,
        );
        let egui_renderer = egui_wgpu::Renderer::new(&device, surface_format, None, 1, false);

        self.window = Some(window);
        self.surface = Some(surface);
        self.device = Some(device);
        self.queue = Some(queue);
        self.config = Some(config);
        self.renderer = Some(renderer);
        self.egui_winit = Some(egui_winit);
        self.egui_renderer = Some(egui_renderer);

        tracing::info!(
            "GPU initialized with {} backend",
            adapter.get_info().backend.to_str()
        );
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        if let Some(egui_winit) = &mut self.egui_winit {
            let response = egui_winit.on_window_event(self.window.as_ref().unwrap(), &event);
            if response.consumed {
                return;
            }
        }

        if let Some(input) = map_window_event(&event) {
            self.state.callbacks.dispatch(&input);
            if self.state.close_requested.get() {
                event_loop.exit();
                return;
            }
        }

        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(new_size) => {
                if let (Some(surface), Some(device), Some(config)) =
                    (&self.surface, &self.device, &mut self.config)
                {
                    config.width = new_size.width.max(1);
                    config.height = new_size.height.max(1);
                    surface.configure(device, config);
                    self.state.camera.aspect =
                        config.width as f32 / config.height.max(1) as f32;
                    if let Some(renderer) = &mut self.renderer {
                        renderer.resize(device, config.width, config.height);
                    }
                }
            }
            WindowEvent::RedrawRequested => {
                let now = Instant::now();
                let dt = (now - self.state.last_frame).as_secs_f32().min(0.1);
                self.state.last_frame = now;
                self.state.update(dt);

                let (Some(surface), Some(device), Some(queue)) =
                    (&self.surface, &self.device, &self.queue)
                else {
                    return;
                };

                let output = match surface.get_current_texture() {
                    Ok(t) => t,
                    Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                        if let Some(config) = &self.config {
                            surface.configure(device, config);
                        }
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

                if let Some(renderer) = &self.renderer {
                    let mvp = self.state.camera.view_projection() * self.state.model.matrix();
                    renderer.render(device, queue, &view, mvp, self.state.clear_color);
                }

                let raw_input = self
                    .egui_winit
                    .as_mut()
                    .unwrap()
                    .take_egui_input(self.window.as_ref().unwrap());
                let full_output = self.egui_ctx.run(raw_input, |ctx| {
                    self.state.draw_ui(ctx);
                });

                self.egui_winit.as_mut().unwrap().handle_platform_output(
                    self.window.as_ref().unwrap(),
                    full_output.platform_output,
                );

                let paint_jobs = self
                    .egui_ctx
                    .tessellate(full_output.shapes, full_output.pixels_per_point);

                let screen_descriptor = egui_wgpu::ScreenDescriptor {
                    size_in_pixels: [
                        self.config.as_ref().unwrap().width,
                        self.config.as_ref().unwrap().height,
                    ],
                    pixels_per_point: full_output.pixels_per_point,
                };

                {
                    let egui_renderer = self.egui_renderer.as_mut().unwrap();
                    for (id, image_delta) in &full_output.textures_delta.set {
                        egui_renderer.update_texture(device, queue, *id, image_delta);
                    }
                    let mut encoder =
                        device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
                            label: Some("egui_encoder"),
                        });
                    egui_renderer.update_buffers(
                        device,
                        queue,
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
                        egui_renderer.render(&mut pass, &paint_jobs, &screen_descriptor);
                    }
                    queue.submit(std::iter::once(encoder.finish()));
                    for id in &full_output.textures_delta.free {
                        egui_renderer.free_texture(id);
                    }
                }

                output.present();
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    tracing::info!("meshview starting");

    // Load assets before opening a window so failures are plain errors.
    let mesh = load_obj(&cli.model).with_context(|| format!("loading model {}", cli.model))?;
    let texture = TextureImage::from_path(&cli.texture)
        .with_context(|| format!("loading texture {}", cli.texture))?;
    tracing::info!(
        vertices = mesh.vertex_count(),
        indices = mesh.index_count(),
        "model ready"
    );

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = GpuApp::new(mesh, texture, cli.width, cli.height);
    event_loop.run_app(&mut app)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escape_sets_close_flag() {
        let mut state = AppState::new();
        assert!(!state.close_requested.get());
        state.callbacks.dispatch(&InputEvent::Key {
            code: KeyCode::Escape,
            pressed: true,
        });
        assert!(state.close_requested.get());
    }

    #[test]
    fn escape_release_does_not_close() {
        let mut state = AppState::new();
        state.callbacks.dispatch(&InputEvent::Key {
            code: KeyCode::Escape,
            pressed: false,
        });
        assert!(!state.close_requested.get());
    }

    #[test]
    fn auto_rotate_wraps() {
        let mut state = AppState::new();
        state.model.rotation_deg = 359.0;
        state.update(1.0); // +60 degrees
        assert!(state.model.rotation_deg >= 0.0 && state.model.rotation_deg < 360.0);
    }

    #[test]
    fn rotation_is_fixed_when_auto_rotate_off() {
        let mut state = AppState::new();
        state.auto_rotate = false;
        state.model.rotation_deg = 42.0;
        state.update(0.5);
        assert_eq!(state.model.rotation_deg, 42.0);
    }

    #[test]
    fn resize_maps_to_input_event() {
        let event = WindowEvent::Resized(PhysicalSize::new(1024, 768));
        assert_eq!(
            map_window_event(&event),
            Some(InputEvent::Resized {
                width: 1024,
                height: 768,
            })
        );
    }
}
