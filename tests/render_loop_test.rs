mod common;

use std::f32::consts::TAU;

use cgmath::Rad;
use common::test_utils::{RecordingRenderer, assert_close};
use instant::Duration;
use spin_ngin::{
    LoopState, Program, RenderLoop, RotationStep, SceneContext, Viewport, bootstrap,
};

const FRAME: Duration = Duration::from_millis(16);

fn rotation(ctx: &SceneContext) -> (f32, f32) {
    let rotation = ctx.scene.find(ctx.animated).unwrap().local_transform().rotation;
    (rotation.x.0, rotation.y.0)
}

fn setup() -> (SceneContext, RecordingRenderer) {
    let viewport = Viewport::new(800, 600);
    (
        bootstrap(Program::GettingStarted, viewport).unwrap(),
        RecordingRenderer::new(viewport),
    )
}

#[test]
fn hundred_ticks_turn_the_mesh_by_one_radian() {
    let (mut ctx, mut renderer) = setup();
    let mut render_loop = RenderLoop::new(RotationStep::default());

    for _ in 0..100 {
        assert_eq!(
            render_loop.tick(&mut ctx, &mut renderer, FRAME).unwrap(),
            LoopState::Running
        );
    }

    let (x, y) = rotation(&ctx);
    assert_close(x as f64, 1.0, 1e-4);
    assert_close(y as f64, 1.0, 1e-4);
    assert_eq!(renderer.draws, 100);
    assert_eq!(render_loop.frames(), 100);
}

#[test]
fn every_tick_draws_exactly_once() {
    let (mut ctx, mut renderer) = setup();
    let mut render_loop = RenderLoop::new(RotationStep::default());

    render_loop.tick(&mut ctx, &mut renderer, FRAME).unwrap();
    assert_eq!(renderer.draws, 1);
    // mesh and wireframe overlay
    assert_eq!(renderer.last_items, 2);
    render_loop.tick(&mut ctx, &mut renderer, FRAME).unwrap();
    assert_eq!(renderer.draws, 2);
}

#[test]
fn rotation_wraps_after_a_full_turn() {
    let (mut ctx, mut renderer) = setup();
    let mut render_loop = RenderLoop::new(RotationStep::PerTick(Rad(0.01)));

    for _ in 0..700 {
        render_loop.tick(&mut ctx, &mut renderer, FRAME).unwrap();
    }

    let (x, y) = rotation(&ctx);
    assert!((0.0..TAU).contains(&x));
    assert_close(x as f64, (7.0 - TAU) as f64, 1e-3);
    assert_eq!(x, y);
}

#[test]
fn per_second_steps_follow_elapsed_time() {
    let (mut ctx, mut renderer) = setup();
    let mut render_loop = RenderLoop::new(RotationStep::PerSecond(Rad(0.5)));

    render_loop
        .tick(&mut ctx, &mut renderer, Duration::from_secs(1))
        .unwrap();
    render_loop
        .tick(&mut ctx, &mut renderer, Duration::from_millis(500))
        .unwrap();

    let (x, _) = rotation(&ctx);
    assert_close(x as f64, 0.75, 1e-6);
}

#[test]
fn children_follow_the_rotating_parent() {
    let (mut ctx, mut renderer) = setup();
    let mut render_loop = RenderLoop::new(RotationStep::default());
    for _ in 0..10 {
        render_loop.tick(&mut ctx, &mut renderer, FRAME).unwrap();
    }

    let mesh = ctx.scene.find(ctx.animated).unwrap();
    let wireframe = &mesh.get_children()[0];
    assert_eq!(wireframe.local_transform().rotation.x, Rad(0.0));
    assert_eq!(wireframe.world_transform(), mesh.world_transform());
}

#[test]
fn a_cancelled_loop_stops_without_drawing() {
    let (mut ctx, mut renderer) = setup();
    let mut render_loop = RenderLoop::new(RotationStep::default());
    render_loop.tick(&mut ctx, &mut renderer, FRAME).unwrap();
    let before = rotation(&ctx);

    render_loop.token().cancel();

    for _ in 0..3 {
        assert_eq!(
            render_loop.tick(&mut ctx, &mut renderer, FRAME).unwrap(),
            LoopState::Stopped
        );
    }
    assert_eq!(render_loop.state(), LoopState::Stopped);
    assert_eq!(renderer.draws, 1);
    assert_eq!(rotation(&ctx), before);
}

#[test]
fn stop_ends_the_loop() {
    let (mut ctx, mut renderer) = setup();
    let mut render_loop = RenderLoop::new(RotationStep::default());
    assert_eq!(render_loop.state(), LoopState::Running);

    render_loop.stop();

    assert_eq!(
        render_loop.tick(&mut ctx, &mut renderer, FRAME).unwrap(),
        LoopState::Stopped
    );
    assert_eq!(renderer.draws, 0);
    assert!(render_loop.token().is_cancelled());
}
