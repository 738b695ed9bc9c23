//! Application event loop.
//!
//! [`App`] hosts the viewer inside winit's [`ApplicationHandler`]. Input events
//! mutate the camera as they arrive; render ticks are driven by a
//! [`TickTimer`] through `ControlFlow::WaitUntil`.
//!
//! # Lifecycle
//!
//! 1. `resumed` creates the window, the GPU context and loads the scene
//! 2. keyboard and cursor events go to the [`CameraController`]
//! 3. when the timer fires, a redraw runs one [`FrameRenderer::tick`]
//! 4. the timer is re-armed once the tick is done

use std::sync::Arc;

use anyhow::Context as _;
use instant::{Duration, Instant};
use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::{ElementState, KeyEvent, StartCause, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{Key, NamedKey},
    window::{Window, WindowId},
};

use crate::{
    camera::{Camera, CameraController},
    config::ViewerConfig,
    context::Context,
    data_structures::scene::SceneRegistry,
    manifest::ObjectDescriptor,
    render::{FrameRenderer, TickTimer},
};

/// Everything that only exists once the window is up.
#[derive(Debug)]
struct AppState {
    ctx: Context,
    registry: SceneRegistry,
    renderer: FrameRenderer,
}

impl AppState {
    async fn new(
        window: Arc<Window>,
        config: &ViewerConfig,
        manifest: &[ObjectDescriptor],
    ) -> anyhow::Result<Self> {
        let ctx = Context::new(window, config).await?;
        let registry = SceneRegistry::load(&config.asset_root, manifest, &ctx.upload_targets())
            .await
            .with_context(|| format!("failed to load the scene from {}", config.asset_root.display()))?;
        Ok(Self {
            ctx,
            registry,
            renderer: FrameRenderer::new(),
        })
    }
}

pub struct App {
    async_runtime: tokio::runtime::Runtime,
    config: ViewerConfig,
    manifest: Vec<ObjectDescriptor>,
    state: Option<AppState>,
    camera: Camera,
    controller: CameraController,
    timer: TickTimer,
    /// Elapsed time of the last render tick; scales keyboard movement.
    last_dt: Duration,
    /// Startup failure to hand back to [`run`] once the loop has exited.
    error: Option<anyhow::Error>,
}

impl App {
    pub fn new(config: ViewerConfig, manifest: Vec<ObjectDescriptor>) -> anyhow::Result<Self> {
        let async_runtime =
            tokio::runtime::Runtime::new().context("failed to start the async runtime")?;
        let controller = CameraController::new(config.screen_center());
        let timer = TickTimer::new(config.tick_interval, Instant::now());
        Ok(Self {
            async_runtime,
            config,
            manifest,
            state: None,
            camera: Camera::default(),
            controller,
            timer,
            last_dt: Duration::ZERO,
            error: None,
        })
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, error: anyhow::Error) {
        log::error!("{:#}", error);
        self.error = Some(error);
        event_loop.exit();
    }

    fn on_key(&mut self, event_loop: &ActiveEventLoop, event: &KeyEvent) {
        if event.state != ElementState::Pressed {
            return;
        }
        if event.logical_key == Key::Named(NamedKey::Escape) {
            event_loop.exit();
            return;
        }
        if let Some(key) = event.logical_key.to_text().and_then(|text| text.chars().next()) {
            self.controller
                .on_key(&mut self.camera, key, self.last_dt.as_secs_f32());
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.state.is_some() {
            return;
        }
        let (width, height) = self.config.window_size;
        let window_attributes = Window::default_attributes()
            .with_title(self.config.title.clone())
            .with_inner_size(PhysicalSize::new(width, height))
            .with_resizable(false);

        let window = match event_loop.create_window(window_attributes) {
            Ok(window) => Arc::new(window),
            Err(e) => return self.fail(event_loop, e.into()),
        };
        window.set_cursor_visible(false);
        let size = window.inner_size();
        self.controller.screen_center = (
            f64::from(size.width) / 2.0,
            f64::from(size.height) / 2.0,
        );

        let init = AppState::new(window, &self.config, &self.manifest);
        match self.async_runtime.block_on(init) {
            Ok(state) => {
                log::info!("Entering the render loop");
                self.state = Some(state);
                self.timer = TickTimer::new(self.config.tick_interval, Instant::now());
            }
            Err(e) => self.fail(event_loop, e),
        }
    }

    fn new_events(&mut self, _event_loop: &ActiveEventLoop, cause: StartCause) {
        if let StartCause::ResumeTimeReached { .. } = cause {
            if let Some(state) = &self.state {
                state.ctx.window().request_redraw();
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::KeyboardInput { event, .. } => self.on_key(event_loop, &event),
            WindowEvent::CursorMoved { position, .. } => {
                let Some(state) = &self.state else { return };
                if let Some(centre) =
                    self.controller
                        .on_mouse_move(&mut self.camera, position.x, position.y)
                {
                    if let Err(e) = state.ctx.window().set_cursor_position(centre) {
                        log::debug!("Cannot warp the cursor: {}", e);
                    }
                }
            }
            WindowEvent::Resized(size) => {
                if let Some(state) = &mut self.state {
                    state.ctx.resize(size.width, size.height);
                }
            }
            WindowEvent::RedrawRequested => {
                let Some(state) = &mut self.state else { return };
                let now = Instant::now();
                if !self.timer.due(now) {
                    return;
                }
                match state
                    .renderer
                    .tick(now, &state.ctx, &mut state.registry, &self.camera)
                {
                    Ok(dt) => self.last_dt = dt,
                    // Reconfigure the surface if it's lost or outdated
                    Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                        log::warn!("Surface lost or outdated, reconfiguring");
                        let size = state.ctx.window().inner_size();
                        state.ctx.resize(size.width, size.height);
                    }
                    Err(wgpu::SurfaceError::OutOfMemory) => {
                        log::error!("Out of GPU memory, exiting");
                        event_loop.exit();
                    }
                    Err(e) => log::error!("Unable to render {}", e),
                }
                self.timer.rearm(Instant::now());
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if self.state.is_some() {
            event_loop.set_control_flow(ControlFlow::WaitUntil(self.timer.deadline()));
        }
    }
}

/// Opens the viewer window and runs until it is closed.
///
/// Startup failures (no adapter, missing assets) are returned after the event
/// loop exits.
pub fn run(config: ViewerConfig, manifest: Vec<ObjectDescriptor>) -> anyhow::Result<()> {
    if let Err(e) = env_logger::try_init() {
        println!("Warning: Could not initialize logger: {}", e);
    };

    let event_loop = EventLoop::new()?;
    let mut app = App::new(config, manifest)?;
    event_loop.run_app(&mut app)?;

    match app.error.take() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}
