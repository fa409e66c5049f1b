//! Builds the two demo scenes.
//!
//! [`bootstrap`] is pure: it only creates CPU-side data, so it can run before
//! a GPU context exists and in tests without one. The resulting
//! [`SceneContext`] is handed explicitly to the render loop, the resize
//! responder and the renderer.

use std::sync::Arc;

use cgmath::Deg;

use crate::{
    camera::Camera,
    data_structures::{
        geometry::Geometry,
        light::Light,
        material::{Colour, Material, TextureSource},
        scene_graph::{MeshNode, NodeId, Scene},
    },
    viewport::Viewport,
};

const FOVY: Deg<f32> = Deg(75.0);
const ZNEAR: f32 = 0.1;
const ZFAR: f32 = 1000.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Program {
    /// Flat shaded icosahedron with a wireframe overlay, hemisphere light.
    GettingStarted,
    /// Transparent textured cube with a glass material and an environment map.
    GlassCube,
}

impl Program {
    pub fn title(&self) -> &'static str {
        match self {
            Program::GettingStarted => "Getting started",
            Program::GlassCube => "Glass cube",
        }
    }

    /// Whether window resizes are forwarded to the [`crate::lifecycle::ResizeResponder`].
    /// Without it the surface keeps its startup size.
    pub fn handles_resize(&self) -> bool {
        matches!(self, Program::GlassCube)
    }

    /// Whether the scene loads the equirectangular environment map.
    pub fn uses_environment(&self) -> bool {
        matches!(self, Program::GlassCube)
    }
}

/// Everything the per-frame callbacks operate on.
#[derive(Debug)]
pub struct SceneContext {
    pub camera: Camera,
    pub scene: Scene,
    /// The top-level mesh the render loop rotates.
    pub animated: NodeId,
    pub(crate) viewport: Viewport,
}

impl SceneContext {
    /// Surface size the camera was last fitted to, already clamped.
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }
}

/// Creates the scene, camera and lights of `program` for a surface of
/// `viewport` pixels.
///
/// Zero dimensions are clamped to one pixel, so the camera aspect is always
/// finite. The scene holds exactly one top-level mesh.
pub fn bootstrap(program: Program, viewport: Viewport) -> anyhow::Result<SceneContext> {
    let viewport = viewport.clamped();
    let ctx = match program {
        Program::GettingStarted => getting_started(viewport),
        Program::GlassCube => glass_cube(viewport),
    };

    anyhow::ensure!(
        ctx.scene.top_level_meshes().count() == 1,
        "{:?} must have exactly one top-level mesh",
        program
    );
    anyhow::ensure!(!ctx.scene.lights().is_empty(), "{:?} has no light", program);
    log::info!(
        "Bootstrapped {:?} at {}x{} (aspect {:.4})",
        program,
        viewport.width,
        viewport.height,
        ctx.camera.aspect()
    );
    Ok(ctx)
}

fn getting_started(viewport: Viewport) -> SceneContext {
    let camera = Camera::new((0.0, 0.0, 2.0), FOVY, ZNEAR, ZFAR, viewport);

    let geometry = Arc::new(Geometry::icosahedron(1.0, 2));
    let mesh = MeshNode::new(
        "icosahedron",
        geometry,
        Material::standard(Colour::WHITE).flat_shading(),
    );
    let wireframe = mesh.overlay(
        "icosahedron wireframe",
        Material::basic(Colour::WHITE).wireframe(),
    );
    let mesh = mesh.with_child(wireframe);

    let mut scene = Scene::new();
    let animated = scene.add(mesh);
    scene.add_light(Light::hemisphere(
        Colour::from_hex(0x00ffff),
        Colour::from_hex(0x000000),
    ));

    SceneContext {
        camera,
        scene,
        animated,
        viewport,
    }
}

fn glass_cube(viewport: Viewport) -> SceneContext {
    let camera = Camera::new((0.0, 0.0, 5.0), FOVY, ZNEAR, ZFAR, viewport);

    let material = Material::physical(Colour::WHITE)
        .with_metal_rough(0.25, 0.1)
        .with_opacity(0.75)
        .double_sided()
        .with_clearcoat(1.0, 0.1)
        .with_env_map_intensity(1.0)
        .with_map(TextureSource::rgb_gradient(512));
    let cube = MeshNode::new("glass cube", Arc::new(Geometry::cuboid(1.0, 1.0, 1.0)), material);

    let mut scene = Scene::new();
    let animated = scene.add(cube);
    scene.add_light(
        Light::hemisphere(Colour::from_hex(0xffffff), Colour::from_hex(0x000000))
            .at((0.0, 20.0, 0.0)),
    );
    scene.add_light(
        Light::directional(Colour::from_hex(0xffffff))
            .at((3.0, 10.0, 10.0))
            .casting_shadow(),
    );

    SceneContext {
        camera,
        scene,
        animated,
        viewport,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn glass_cube_material_is_transparent_and_double_sided() {
        let ctx = bootstrap(Program::GlassCube, Viewport::new(800, 600)).unwrap();
        let cube = ctx.scene.find(ctx.animated).unwrap();
        let material = &cube.mesh().unwrap().material;
        assert!(material.transparent);
        assert_eq!(material.opacity, 0.75);
        assert!(material.map.is_some());
        assert_eq!(ctx.scene.lights().len(), 2);
        assert!(ctx.scene.environment().is_none());
    }

    #[test]
    fn only_the_glass_cube_listens_for_resizes() {
        assert!(!Program::GettingStarted.handles_resize());
        assert!(Program::GlassCube.handles_resize());
    }
}
