//! Draw composition and the renderer seam.
//!
//! [`Renderer`] is what the render loop and the resize responder talk to. The
//! wgpu implementation lives in [`crate::context::Context`]; tests substitute
//! a recording fake. [`draw_list`] flattens the scene graph into the order the
//! GPU renderer batches pipelines in: opaque, then transparent, then
//! wireframe overlays.

use std::sync::Arc;

use cgmath::Matrix4;

use crate::{
    camera::Camera,
    data_structures::{
        geometry::Geometry,
        material::{Material, Pass},
        scene_graph::{NodeId, Scene},
    },
    viewport::Viewport,
};

/// Owns the output surface and issues draw calls.
pub trait Renderer {
    /// Current pixel size of the output surface.
    fn size(&self) -> Viewport;

    /// Resizes the output surface. Degenerate sizes are clamped to one pixel.
    fn set_size(&mut self, viewport: Viewport);

    /// Draws one frame of `scene` as seen by `camera`.
    fn draw(&mut self, scene: &Scene, camera: &Camera) -> anyhow::Result<()>;
}

/// One mesh node ready to be drawn.
#[derive(Debug)]
pub struct DrawItem<'a> {
    pub id: NodeId,
    pub name: &'a str,
    pub geometry: &'a Arc<Geometry>,
    pub material: &'a Material,
    pub world: Matrix4<f32>,
    pub pass: Pass,
}

/// All drawable nodes of `scene`, grouped by pass. Within a pass nodes keep
/// scene order (parents before children).
pub fn draw_list(scene: &Scene) -> Vec<DrawItem<'_>> {
    let mut items = Vec::new();
    scene.visit(&mut |node| {
        if let Some(mesh) = node.mesh() {
            items.push(DrawItem {
                id: node.id(),
                name: node.name(),
                geometry: &mesh.geometry,
                material: &mesh.material,
                world: node.world_transform(),
                pass: mesh.material.render_pass(),
            });
        }
    });
    // stable: keeps scene order inside each pass
    items.sort_by_key(|item| item.pass);
    items
}
