mod common;

use std::sync::Arc;

use cgmath::Point3;
use common::test_utils::assert_close;
use spin_ngin::{
    Program, Viewport, bootstrap,
    data_structures::{light::Light, material::Pass},
    render::draw_list,
};

#[test]
fn getting_started_fits_the_camera_to_the_surface() {
    let ctx = bootstrap(Program::GettingStarted, Viewport::new(800, 600)).unwrap();

    assert_close(ctx.camera.aspect(), 800.0 / 600.0, 1e-9);
    assert_eq!(ctx.camera.position, Point3::new(0.0, 0.0, 2.0));
    assert_eq!(ctx.scene.top_level_meshes().count(), 1);
    assert!(!ctx.scene.lights().is_empty());
    assert_eq!(ctx.viewport(), Viewport::new(800, 600));
}

#[test]
fn getting_started_overlays_a_wireframe_on_the_same_geometry() {
    let ctx = bootstrap(Program::GettingStarted, Viewport::new(800, 600)).unwrap();
    let mesh = ctx.scene.find(ctx.animated).unwrap();
    let children = mesh.get_children();
    assert_eq!(children.len(), 1);

    let solid = mesh.mesh().unwrap();
    let wire = children[0].mesh().unwrap();
    assert!(Arc::ptr_eq(&solid.geometry, &wire.geometry));
    assert_eq!(solid.geometry.triangle_count(), 20 * 9);
    assert_eq!(solid.material.render_pass(), Pass::Opaque);
    assert_eq!(wire.material.render_pass(), Pass::Wireframe);

    let passes: Vec<Pass> = draw_list(&ctx.scene).iter().map(|item| item.pass).collect();
    assert_eq!(passes, vec![Pass::Opaque, Pass::Wireframe]);
}

#[test]
fn getting_started_is_lit_by_a_cyan_hemisphere() {
    let ctx = bootstrap(Program::GettingStarted, Viewport::new(800, 600)).unwrap();
    match &ctx.scene.lights()[0] {
        Light::Hemisphere { sky, ground, .. } => {
            assert_close(sky.r as f64, 0.0, 1e-6);
            assert_close(sky.g as f64, 1.0, 1e-6);
            assert_close(sky.b as f64, 1.0, 1e-6);
            assert_eq!(ground.to_array(), [0.0, 0.0, 0.0]);
        }
        other => panic!("expected a hemisphere light, got {:?}", other),
    }
}

#[test]
fn glass_cube_has_one_mesh_and_two_lights() {
    let ctx = bootstrap(Program::GlassCube, Viewport::new(1024, 768)).unwrap();

    assert_close(ctx.camera.aspect(), 1024.0 / 768.0, 1e-9);
    assert_eq!(ctx.camera.position, Point3::new(0.0, 0.0, 5.0));
    assert_eq!(ctx.scene.top_level_meshes().count(), 1);
    assert_eq!(ctx.scene.lights().len(), 2);
    assert!(matches!(
        ctx.scene.lights()[1],
        Light::Directional {
            cast_shadow: true,
            ..
        }
    ));

    let items = draw_list(&ctx.scene);
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].pass, Pass::Transparent);
    assert_eq!(items[0].geometry.triangle_count(), 12);
}

#[test]
fn zero_sized_surfaces_still_produce_a_finite_aspect() {
    for viewport in [Viewport::new(0, 600), Viewport::new(800, 0), Viewport::new(0, 0)] {
        let ctx = bootstrap(Program::GettingStarted, viewport).unwrap();
        assert!(ctx.camera.aspect().is_finite());
        assert!(ctx.camera.aspect() > 0.0);
        assert!(!ctx.viewport().is_degenerate());
    }
}

#[test]
fn every_bootstrap_creates_fresh_nodes() {
    let first = bootstrap(Program::GlassCube, Viewport::new(800, 600)).unwrap();
    let second = bootstrap(Program::GlassCube, Viewport::new(800, 600)).unwrap();
    assert_ne!(first.animated, second.animated);
}

#[test]
fn aspect_matches_the_surface_for_many_shapes() {
    let sizes = [
        (1, 1),
        (1, 4096),
        (4096, 1),
        (1280, 720),
        (720, 1280),
        (2560, 1080),
        (333, 777),
        (3840, 2160),
        (u32::MAX, 3),
    ];
    for program in [Program::GettingStarted, Program::GlassCube] {
        for (width, height) in sizes {
            let ctx = bootstrap(program, Viewport::new(width, height)).unwrap();
            let expected = width as f64 / height as f64;
            assert!(
                (ctx.camera.aspect() - expected).abs() <= 1e-9 * expected.max(1.0),
                "{:?} at {}x{}: aspect {} != {}",
                program,
                width,
                height,
                ctx.camera.aspect(),
                expected
            );
        }
    }
}
