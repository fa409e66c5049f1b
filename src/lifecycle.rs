//! Resizing and teardown of a mounted scene.

use std::sync::Arc;

use winit::window::Window;

use crate::{
    bootstrap::SceneContext, render::Renderer, render_loop::CancellationToken, viewport::Viewport,
};

/// Fits the camera and the renderer surface to a new size.
pub struct ResizeResponder;

impl ResizeResponder {
    /// Applies `viewport` to `ctx` and `renderer`.
    ///
    /// Zero dimensions are clamped to one pixel. Applying the same size twice
    /// leaves the same state as applying it once.
    pub fn apply<R: Renderer + ?Sized>(ctx: &mut SceneContext, renderer: &mut R, viewport: Viewport) {
        let viewport = viewport.clamped();
        ctx.camera.set_aspect(viewport);
        ctx.viewport = viewport;
        if renderer.size() != viewport {
            log::debug!("Resizing surface to {}x{}", viewport.width, viewport.height);
            renderer.set_size(viewport);
        }
    }
}

/// The environment a scene is mounted into: a window or a page element.
pub trait Host {
    /// Removes the rendering surface from the host.
    fn detach_surface(&mut self) -> anyhow::Result<()>;

    /// Stops delivering resize notifications.
    fn remove_resize_listener(&mut self) -> anyhow::Result<()>;
}

/// A scene attached to a [`Host`] together with the token of the loop that
/// renders it.
///
/// Each teardown step is recorded only once it succeeds, so a failed step is
/// retried by the next [`Mount::teardown`] (or by drop) while completed steps
/// are never repeated.
#[derive(Debug)]
pub struct Mount<H: Host> {
    host: H,
    token: CancellationToken,
    listener_removed: bool,
    surface_detached: bool,
}

impl<H: Host> Mount<H> {
    pub fn new(host: H, token: CancellationToken) -> Self {
        Self {
            host,
            token,
            listener_removed: false,
            surface_detached: false,
        }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn is_torn_down(&self) -> bool {
        self.listener_removed && self.surface_detached
    }

    /// Stops the render loop, then detaches the resize listener and the
    /// surface. Both host steps run even if the other fails; the first error
    /// is returned. Once everything succeeded later calls do nothing.
    pub fn teardown(&mut self) -> anyhow::Result<()> {
        if self.is_torn_down() {
            return Ok(());
        }
        self.token.cancel();

        let mut first_error = None;
        if !self.listener_removed {
            match self.host.remove_resize_listener() {
                Ok(()) => self.listener_removed = true,
                Err(e) => first_error = Some(e.context("cannot remove the resize listener")),
            }
        }
        if !self.surface_detached {
            match self.host.detach_surface() {
                Ok(()) => self.surface_detached = true,
                Err(e) => {
                    if first_error.is_none() {
                        first_error = Some(e.context("cannot detach the surface"));
                    }
                }
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => {
                log::info!("Scene torn down");
                Ok(())
            }
        }
    }
}

impl<H: Host> Drop for Mount<H> {
    fn drop(&mut self) {
        if let Err(e) = self.teardown() {
            log::error!("Teardown failed: {:#}", e);
        }
    }
}

/// Host backed by a `winit` window. On the web the window's canvas is also
/// removed from the page.
#[derive(Debug)]
pub struct WindowHost {
    window: Option<Arc<Window>>,
    listening: bool,
}

impl WindowHost {
    pub fn new(window: Arc<Window>) -> Self {
        Self {
            window: Some(window),
            listening: true,
        }
    }

    pub fn is_listening(&self) -> bool {
        self.listening
    }

    pub fn is_attached(&self) -> bool {
        self.window.is_some()
    }
}

impl Host for WindowHost {
    fn detach_surface(&mut self) -> anyhow::Result<()> {
        let Some(window) = self.window.take() else {
            return Ok(());
        };
        #[cfg(target_arch = "wasm32")]
        {
            use winit::platform::web::WindowExtWebSys;

            if let Some(canvas) = window.canvas() {
                canvas.remove();
            }
        }
        window.set_visible(false);
        Ok(())
    }

    fn remove_resize_listener(&mut self) -> anyhow::Result<()> {
        self.listening = false;
        Ok(())
    }
}
