use std::time::Instant;

use wgpu::SurfaceError;
use winit::{
    dpi::PhysicalSize,
    event::*,
    event_loop::{ControlFlow, EventLoop, EventLoopWindowTarget},
    window::{Window, WindowBuilder},
};

use crate::error::{Error, Result};

#[derive(Debug)]
pub struct AppState {
    previous_time: Instant,
    elapsed_time: f32,
    frame_count: u64,
}

impl AppState {
    pub fn new() -> Self {
        Self {
            previous_time: Instant::now(),
            elapsed_time: 0.0,
            frame_count: 0,
        }
    }

    pub fn update(&mut self) {
        let current_time = Instant::now();
        self.elapsed_time = current_time
            .duration_since(self.previous_time)
            .as_secs_f32();
        self.previous_time = current_time;
        self.frame_count += 1;
    }

    /// Seconds between the last two updates.
    pub fn elapsed_time(&self) -> f32 {
        self.elapsed_time
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

pub struct Application<L: Layer + 'static> {
    layer: Option<L>,
    context: Option<L::Context>,
    screen: Screen,
    state: AppState,
}

impl<L: Layer + 'static> Application<L> {
    pub fn new(screen: Screen, context: L::Context) -> Self {
        Self {
            screen,
            layer: None,
            context: Some(context),
            state: AppState::new(),
        }
    }

    fn exit(&mut self, control_flow: &mut ControlFlow, code: i32) {
        control_flow.set_exit_with_code(code);
        if let Some(mut layer) = self.layer.take() {
            if let Err(err) = layer.shutdown(&self.state, &mut self.screen) {
                tracing::error!("shutdown failed: {err}");
                control_flow.set_exit_with_code(1);
            }
        }
    }

    fn run(
        &mut self,
        event: Event<()>,
        _event_loop: &EventLoopWindowTarget<()>,
        control_flow: &mut ControlFlow,
    ) {
        control_flow.set_poll();

        if let Some(layer) = self.layer.as_mut() {
            layer.process_event(&event, &mut self.screen);
        }

        match event {
            Event::NewEvents(StartCause::Init) => {
                let Some(context) = self.context.take() else {
                    return;
                };
                match L::start(&mut self.screen, &self.state, context) {
                    Ok(layer) => self.layer = Some(layer),
                    Err(err) => {
                        tracing::error!("failed to start: {err}");
                        control_flow.set_exit_with_code(1);
                    }
                }
            }
            Event::WindowEvent {
                window_id,
                ref event,
            } if self.screen.window().id() == window_id => match event {
                WindowEvent::CloseRequested
                | WindowEvent::KeyboardInput {
                    input:
                        KeyboardInput {
                            state: ElementState::Pressed,
                            virtual_keycode: Some(VirtualKeyCode::Escape),
                            ..
                        },
                    ..
                } => self.exit(control_flow, 0),
                WindowEvent::Resized(physical_size) => {
                    self.screen.resize(*physical_size);
                }
                WindowEvent::ScaleFactorChanged { new_inner_size, .. } => {
                    self.screen.resize(**new_inner_size);
                }
                _ => {}
            },
            Event::MainEventsCleared => {
                self.state.update();
                self.screen.window().request_redraw();
            }
            Event::RedrawRequested(window_id) if self.screen.window().id() == window_id => {
                let Some(layer) = self.layer.as_mut() else {
                    return;
                };
                if let Err(err) = layer.update(&self.state, &mut self.screen) {
                    tracing::error!("frame update failed: {err}");
                    self.exit(control_flow, 1);
                    return;
                }

                match layer.render(&self.state, &mut self.screen) {
                    Ok(_) => {}
                    Err(SurfaceError::Lost) => self.screen.resize_to_current(),
                    Err(SurfaceError::OutOfMemory) => self.exit(control_flow, 137),
                    Err(e) => tracing::error!("{:?}", e),
                }
            }
            _ => {}
        }
    }

    /// Opens the window and runs the event loop until the window closes.
    /// Never returns on success.
    pub async fn init(title: &str, size: PhysicalSize<u32>, context: L::Context) -> Result<()> {
        let event_loop = EventLoop::new();
        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor::default());
        let screen = Screen::new(&event_loop, &instance, title, size).await?;
        let mut application = Self::new(screen, context);
        event_loop.run(move |event, event_loop, control_flow| {
            application.run(event, event_loop, control_flow);
        });
    }
}

pub struct Screen {
    pub surface: wgpu::Surface,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub config: wgpu::SurfaceConfiguration,
    window: Window,
}

impl Screen {
    pub async fn new(
        event_loop: &EventLoopWindowTarget<()>,
        instance: &wgpu::Instance,
        title: &str,
        size: PhysicalSize<u32>,
    ) -> Result<Self> {
        // frames are rendered at a fixed resolution
        let window = WindowBuilder::new()
            .with_title(title)
            .with_inner_size(size)
            .with_resizable(false)
            .build(event_loop)
            .map_err(|err| Error::Gpu(format!("failed to open window: {err}")))?;

        // SAFETY:
        // The surface needs to live as long as the window that created it.
        // Screen owns the window so this should be safe.
        let surface = unsafe { instance.create_surface(&window) }
            .map_err(|err| Error::Gpu(format!("failed to create surface: {err}")))?;
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or_else(|| Error::Gpu("no adapter can present to the window".into()))?;
        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    features: adapter.features(),
                    limits: wgpu::Limits::default(),
                    label: None,
                },
                None,
            )
            .await
            .map_err(|err| Error::Gpu(format!("request_device failed: {err}")))?;
        let size = window.inner_size();
        let mut config = surface
            .get_default_config(&adapter, size.width, size.height)
            .ok_or_else(|| Error::Gpu("surface is not supported by the adapter".into()))?;
        if let Some(format) = preferred_format(&surface.get_capabilities(&adapter).formats) {
            config.format = format;
        }
        surface.configure(&device, &config);

        Ok(Self {
            window,
            surface,
            device,
            queue,
            config,
        })
    }

    pub fn window(&self) -> &Window {
        &self.window
    }

    /// Resize the screen to new window size.
    pub fn resize(&mut self, new_size: PhysicalSize<u32>) {
        if new_size.width > 0 && new_size.height > 0 {
            self.config.width = new_size.width;
            self.config.height = new_size.height;
            self.surface.configure(&self.device, &self.config);
        }
    }

    /// Resize the screen to current window inner size.
    pub fn resize_to_current(&mut self) {
        self.resize(self.window.inner_size());
    }
}

/// First sRGB format the surface offers. Frame textures hold sRGB-encoded
/// bytes, so presenting to a linear format would darken them.
pub fn preferred_format(formats: &[wgpu::TextureFormat]) -> Option<wgpu::TextureFormat> {
    formats.iter().copied().find(|format| format.is_srgb())
}

/// Per-window behavior driven by [`Application`]. Each redraw calls `update`
/// then `render`.
pub trait Layer: Sized {
    /// Data handed to [`Layer::start`] once the window exists.
    type Context;
    type LayerErr: std::fmt::Display + 'static;

    fn start(screen: &mut Screen, app: &AppState, context: Self::Context) -> Result<Self>;
    fn process_event(&mut self, event: &Event<()>, screen: &mut Screen);
    fn update(&mut self, app: &AppState, screen: &mut Screen) -> std::result::Result<(), Self::LayerErr>;
    fn render(&mut self, app: &AppState, screen: &mut Screen) -> std::result::Result<(), SurfaceError>;
    fn shutdown(&mut self, app: &AppState, screen: &mut Screen) -> std::result::Result<(), Self::LayerErr>;
}
