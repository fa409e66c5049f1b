//! spin-ngin
//!
//! Two small scenes, each a single mesh spinning under simple lights,
//! rendered with wgpu into a native window or a browser canvas.
//!
//! High-level modules
//! - `bootstrap`: builds the scene, camera and lights of each [`Program`]
//! - `render_loop`: per-frame rotation and drawing, stoppable through a cancellation token
//! - `lifecycle`: resize handling and idempotent teardown of a mounted scene
//! - `render`: the [`render::Renderer`] seam and draw ordering
//! - `context`: the wgpu renderer that owns device, surface and pipelines
//! - `camera`, `viewport`: projection parameters and surface dimensions
//! - `data_structures`: geometry, materials, lights, transforms and the scene graph
//! - `pipelines`: render pipelines and their shaders
//! - `resources`: asset loading and GPU resource creation
//! - `flow`: the winit application shell
//! - `config`: runtime configuration
//!

pub mod bootstrap;
pub mod camera;
pub mod config;
pub mod context;
pub mod data_structures;
pub mod flow;
pub mod lifecycle;
pub mod pipelines;
pub mod render;
pub mod render_loop;
pub mod resources;
pub mod viewport;

// Re-exports commonly used types for convenience in downstream code.
pub use bootstrap::{Program, SceneContext, bootstrap};
pub use config::SceneConfig;
pub use render_loop::{CancellationToken, LoopState, RenderLoop, RotationStep};
pub use viewport::Viewport;

pub use cgmath;
pub use wgpu;
pub use winit;
