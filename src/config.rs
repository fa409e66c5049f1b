//! Runtime configuration shared by both programs.
//!
//! There is no configuration file. Defaults reproduce the original scenes and
//! can be adjusted through the `with_*` builders before calling
//! [`crate::flow::run`]. The asset root can also be overridden with the
//! `SPIN_NGIN_ASSETS` environment variable on native targets.

use std::path::PathBuf;

use crate::render_loop::RotationStep;

/// Environment variable that overrides [`SceneConfig::asset_root`].
pub const ASSET_ROOT_ENV: &str = "SPIN_NGIN_ASSETS";

/// Default location of the environment map, relative to the asset root.
pub const DEFAULT_ENVIRONMENT_MAP: &str = "textures/equirectangular/royal_esplanade_1k.hdr";

#[derive(Clone, Debug)]
pub struct SceneConfig {
    /// Directory (native) or URL path segment (wasm) assets are resolved against.
    pub asset_root: PathBuf,
    /// Environment map path relative to `asset_root`. Only used by programs with an environment.
    pub environment_map: String,
    pub rotation_step: RotationStep,
    pub clear_colour: wgpu::Color,
    /// Prefer `Fifo` (vsync). Falls back to whatever the surface offers first.
    pub vsync: bool,
    /// `env_logger` filter. `None` defers to `RUST_LOG`, then `info`.
    pub log_filter: Option<String>,
    /// Id of the `<canvas>` the surface attaches to on the web.
    pub canvas_id: String,
}

impl Default for SceneConfig {
    fn default() -> Self {
        let asset_root = std::env::var(ASSET_ROOT_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("assets"));
        Self {
            asset_root,
            environment_map: DEFAULT_ENVIRONMENT_MAP.to_string(),
            rotation_step: RotationStep::default(),
            clear_colour: wgpu::Color::BLACK,
            vsync: true,
            log_filter: None,
            canvas_id: "canvas".to_string(),
        }
    }
}

impl SceneConfig {
    pub fn with_asset_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.asset_root = root.into();
        self
    }

    pub fn with_environment_map(mut self, path: impl Into<String>) -> Self {
        self.environment_map = path.into();
        self
    }

    pub fn with_rotation_step(mut self, step: RotationStep) -> Self {
        self.rotation_step = step;
        self
    }

    pub fn with_clear_colour(mut self, colour: wgpu::Color) -> Self {
        self.clear_colour = colour;
        self
    }

    pub fn with_vsync(mut self, vsync: bool) -> Self {
        self.vsync = vsync;
        self
    }

    pub fn with_log_filter(mut self, filter: impl Into<String>) -> Self {
        self.log_filter = Some(filter.into());
        self
    }

    pub fn with_canvas_id(mut self, id: impl Into<String>) -> Self {
        self.canvas_id = id.into();
        self
    }

    /// Full path of the environment map.
    pub fn environment_map_path(&self) -> PathBuf {
        self.asset_root.join(&self.environment_map)
    }
}
