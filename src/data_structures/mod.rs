//! Scene data: geometry, materials, lights, transforms and the scene graph.
//!
//! - `geometry` contains procedural shapes and the vertex layout
//! - `material` holds surface appearance descriptors
//! - `light` contains hemisphere and directional lights
//! - `texture` contains the GPU texture wrapper and CPU image helpers
//! - `transform` holds local transforms and world matrix composition
//! - `scene_graph` enables hierarchical scene organization

pub mod geometry;
pub mod light;
pub mod material;
pub mod scene_graph;
pub mod texture;
pub mod transform;
