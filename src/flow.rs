//! Application shell and event loop.
//!
//! [`run`] opens a window (or attaches to a `<canvas>` on the web), creates
//! the GPU [`Context`], bootstraps the chosen [`Program`] and then drives it:
//!
//! 1. `RedrawRequested` ticks the [`RenderLoop`], which draws one frame, and
//!    schedules the next redraw while the loop is running
//! 2. `Resized` goes to the [`ResizeResponder`] for programs that handle it
//! 3. `CloseRequested` tears the [`Mount`] down and exits
//!
//! GPU initialisation is asynchronous. Native targets block on it with a
//! tokio runtime; on the web it is spawned and its result comes back to the
//! event loop as a user event.

use std::{fmt::Debug, sync::Arc};

use instant::Instant;
use winit::{
    application::ApplicationHandler,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, EventLoop},
    window::{Window, WindowAttributes},
};

use crate::{
    bootstrap::{Program, SceneContext, bootstrap},
    config::SceneConfig,
    context::Context,
    lifecycle::{Mount, ResizeResponder, WindowHost},
    render_loop::{LoopState, RenderLoop},
    resources::load_environment_map,
    viewport::Viewport,
};

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

/// A running program: its GPU context, scene and loop.
pub struct AppState {
    window: Arc<Window>,
    ctx: Context,
    scene: SceneContext,
    render_loop: RenderLoop,
    mount: Mount<WindowHost>,
}

impl AppState {
    async fn new(
        window: Arc<Window>,
        program: Program,
        config: SceneConfig,
    ) -> anyhow::Result<Self> {
        // GPU setup and the environment download run concurrently
        let load_environment = async {
            if program.uses_environment() {
                load_environment_map(&config.environment_map_path()).await
            } else {
                None
            }
        };
        let (ctx, environment) =
            futures::future::join(Context::new(window.clone(), &config), load_environment).await;
        let ctx = ctx?;

        let viewport = Viewport::from(window.inner_size());
        let mut scene = bootstrap(program, viewport)?;
        scene.scene.set_environment(environment);

        let render_loop = RenderLoop::new(config.rotation_step);
        let mount = Mount::new(WindowHost::new(window.clone()), render_loop.token());
        Ok(Self {
            window,
            ctx,
            scene,
            render_loop,
            mount,
        })
    }

    fn resize(&mut self, viewport: Viewport) {
        ResizeResponder::apply(&mut self.scene, &mut self.ctx, viewport);
    }

    fn redraw(&mut self, dt: instant::Duration) {
        match self.render_loop.tick(&mut self.scene, &mut self.ctx, dt) {
            Ok(LoopState::Running) => self.window.request_redraw(),
            Ok(LoopState::Stopped) => {}
            Err(e) => log::error!("Unable to render {:#}", e),
        }
    }
}

pub struct App {
    #[cfg(not(target_arch = "wasm32"))]
    async_runtime: tokio::runtime::Runtime,
    #[cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]
    proxy: winit::event_loop::EventLoopProxy<FlowEvent>,
    program: Program,
    config: SceneConfig,
    state: Option<AppState>,
    last_time: Instant,
    fatal: Fatal,
}

impl App {
    fn new(event_loop: &EventLoop<FlowEvent>, program: Program, config: SceneConfig) -> anyhow::Result<Self> {
        #[cfg(not(target_arch = "wasm32"))]
        let async_runtime = tokio::runtime::Runtime::new()?;
        Ok(Self {
            #[cfg(not(target_arch = "wasm32"))]
            async_runtime,
            proxy: event_loop.create_proxy(),
            program,
            config,
            state: None,
            last_time: Instant::now(),
            fatal: Fatal::default(),
        })
    }

    fn start(&mut self, mut state: AppState) {
        // sizes the surface to the window once, even for programs that ignore later resizes
        let size = state.window.inner_size();
        state.resize(size.into());
        state.window.request_redraw();
        self.last_time = Instant::now();
        self.state = Some(state);
    }

    fn teardown(&mut self, event_loop: &ActiveEventLoop) {
        if let Some(mut state) = self.state.take() {
            if let Err(e) = state.mount.teardown() {
                log::error!("Teardown failed: {:#}", e);
            }
        }
        event_loop.exit();
    }

    /// Records an error that ends the program and leaves the event loop.
    fn fail(&mut self, event_loop: &ActiveEventLoop, error: anyhow::Error) {
        self.fatal.record(error);
        event_loop.exit();
    }
}

/// The first error that ended the event loop, returned by [`run`].
#[derive(Debug, Default)]
struct Fatal(Option<anyhow::Error>);

impl Fatal {
    fn record(&mut self, error: anyhow::Error) {
        log::error!("{:#}", error);
        if self.0.is_none() {
            self.0 = Some(error);
        }
    }

    fn into_result(self) -> anyhow::Result<()> {
        match self.0 {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

pub enum FlowEvent {
    #[allow(dead_code)]
    Initialized(Box<AppState>),
    #[allow(dead_code)]
    Failed(anyhow::Error),
}

impl Debug for FlowEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Initialized(_) => f.write_str("Initialized"),
            Self::Failed(e) => f.debug_tuple("Failed").field(e).finish(),
        }
    }
}

/// Window of `program`. Programs without a resize responder get a fixed
/// size window, so the surface never falls out of step with it.
fn window_attributes(program: Program, #[allow(unused)] config: &SceneConfig) -> WindowAttributes {
    #[allow(unused_mut)]
    let mut attributes = Window::default_attributes()
        .with_title(program.title())
        .with_resizable(program.handles_resize());

    #[cfg(target_arch = "wasm32")]
    {
        use wasm_bindgen::JsCast;
        use winit::platform::web::WindowAttributesExtWebSys;

        let canvas = web_sys::window()
            .and_then(|window| window.document())
            .and_then(|document| document.get_element_by_id(&config.canvas_id))
            .and_then(|element| element.dyn_into::<web_sys::HtmlCanvasElement>().ok());
        if canvas.is_none() {
            log::warn!("No <canvas id={:?}>, winit creates one", config.canvas_id);
        }
        attributes = attributes.with_canvas(canvas);
    }

    attributes
}

impl ApplicationHandler<FlowEvent> for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.state.is_some() {
            return;
        }

        let window_attributes = window_attributes(self.program, &self.config);

        let window = match event_loop.create_window(window_attributes) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                self.fail(event_loop, anyhow::Error::from(e).context("cannot create a window"));
                return;
            }
        };

        let init_future = AppState::new(window, self.program, self.config.clone());

        #[cfg(not(target_arch = "wasm32"))]
        match self.async_runtime.block_on(init_future) {
            Ok(state) => self.start(state),
            Err(e) => self.fail(event_loop, e.context("app initialization failed")),
        }

        #[cfg(target_arch = "wasm32")]
        {
            let proxy = self.proxy.clone();
            wasm_bindgen_futures::spawn_local(async move {
                let event = match init_future.await {
                    Ok(state) => FlowEvent::Initialized(Box::new(state)),
                    Err(e) => FlowEvent::Failed(e),
                };
                if proxy.send_event(event).is_err() {
                    log::error!("Event loop closed before initialization finished");
                }
            });
        }
    }

    fn user_event(&mut self, event_loop: &ActiveEventLoop, event: FlowEvent) {
        match event {
            // This is the message from our wasm `spawn_local`
            FlowEvent::Initialized(state) => self.start(*state),
            FlowEvent::Failed(e) => self.fail(event_loop, e.context("app initialization failed")),
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: winit::window::WindowId,
        event: WindowEvent,
    ) {
        let Some(state) = &mut self.state else {
            return;
        };

        match event {
            WindowEvent::CloseRequested | WindowEvent::Destroyed => self.teardown(event_loop),
            WindowEvent::Resized(size) => {
                if self.program.handles_resize() && state.mount.host().is_listening() {
                    state.resize(size.into());
                }
            }
            WindowEvent::RedrawRequested => {
                let dt = self.last_time.elapsed();
                self.last_time = Instant::now();
                state.redraw(dt);
            }
            _ => {}
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(mut state) = self.state.take() {
            if let Err(e) = state.mount.teardown() {
                log::error!("Teardown failed: {:#}", e);
            }
        }
    }
}

fn init_logging(config: &SceneConfig) {
    #[cfg(not(target_arch = "wasm32"))]
    {
        let mut builder =
            env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
        if let Some(filter) = &config.log_filter {
            builder.parse_filters(filter);
        }
        if let Err(e) = builder.try_init() {
            println!("Warning: Could not initialize logger: {}", e);
        }
    }

    #[cfg(target_arch = "wasm32")]
    {
        let level = config
            .log_filter
            .as_deref()
            .and_then(|filter| filter.parse().ok())
            .unwrap_or(log::Level::Info);
        if console_log::init_with_level(level).is_err() {
            web_sys::console::warn_1(&"Could not initialize logger".into());
        }
    }
}

/// Runs `program` until its window is closed.
pub fn run(program: Program, config: SceneConfig) -> anyhow::Result<()> {
    init_logging(&config);
    log::info!("Starting {:?}", program);

    let event_loop: EventLoop<FlowEvent> = EventLoop::with_user_event().build()?;
    let mut app = App::new(&event_loop, program, config)?;

    event_loop.run_app(&mut app)?;

    app.fatal.into_result()
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn start() {
    std::panic::set_hook(Box::new(|info| {
        web_sys::console::error_1(&info.to_string().into());
    }));
}

/// Web entry point of the icosahedron scene.
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub fn run_getting_started() -> Result<(), JsValue> {
    run(Program::GettingStarted, SceneConfig::default()).map_err(|e| JsValue::from_str(&format!("{:#}", e)))
}

/// Web entry point of the glass cube scene.
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub fn run_glass_cube() -> Result<(), JsValue> {
    run(Program::GlassCube, SceneConfig::default()).map_err(|e| JsValue::from_str(&format!("{:#}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_resizing_programs_get_a_resizable_window() {
        let config = SceneConfig::default();
        let getting_started = window_attributes(Program::GettingStarted, &config);
        let glass_cube = window_attributes(Program::GlassCube, &config);

        assert!(!getting_started.resizable);
        assert!(glass_cube.resizable);
        assert_eq!(glass_cube.title, "Glass cube");
    }

    #[test]
    fn the_first_fatal_error_is_returned() {
        assert!(Fatal::default().into_result().is_ok());

        let mut fatal = Fatal::default();
        fatal.record(anyhow::anyhow!("no adapter"));
        fatal.record(anyhow::anyhow!("event loop closed"));
        let err = fatal.into_result().unwrap_err();
        assert_eq!(err.to_string(), "no adapter");
    }
}
