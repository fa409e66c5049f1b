//! Per-frame driver of the animated mesh.
//!
//! A [`RenderLoop`] is `Running` from construction until its
//! [`CancellationToken`] is cancelled, either through [`RenderLoop::stop`] or
//! by whoever holds a clone of the token (the [`crate::lifecycle::Mount`]).
//! Cancellation is observed at the top of the next tick; a stopped loop never
//! draws again.

use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use anyhow::Context as _;
use cgmath::Rad;
use instant::Duration;

use crate::{bootstrap::SceneContext, render::Renderer};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoopState {
    Running,
    Stopped,
}

/// Shared stop flag. Clones observe the same flag.
#[derive(Clone, Debug, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// How far the animated mesh turns per tick on both the x and y axis.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum RotationStep {
    /// Fixed increment per frame, so the speed follows the display refresh rate.
    PerTick(Rad<f32>),
    /// Angular velocity in radians per second, scaled by the frame time.
    PerSecond(Rad<f32>),
}

impl RotationStep {
    pub fn angle(&self, dt: Duration) -> Rad<f32> {
        match *self {
            RotationStep::PerTick(step) => step,
            RotationStep::PerSecond(velocity) => velocity * dt.as_secs_f32(),
        }
    }
}

impl Default for RotationStep {
    fn default() -> Self {
        RotationStep::PerTick(Rad(0.01))
    }
}

#[derive(Debug)]
pub struct RenderLoop {
    step: RotationStep,
    state: LoopState,
    token: CancellationToken,
    frames: u64,
}

impl RenderLoop {
    pub fn new(step: RotationStep) -> Self {
        Self {
            step,
            state: LoopState::Running,
            token: CancellationToken::new(),
            frames: 0,
        }
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    /// Number of frames drawn so far.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// A handle that stops this loop when cancelled.
    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }

    pub fn stop(&mut self) {
        self.token.cancel();
        self.state = LoopState::Stopped;
    }

    /// Advances the animation by one step and draws exactly one frame.
    ///
    /// Once cancelled this returns `Stopped` without touching the scene or the
    /// renderer.
    pub fn tick<R: Renderer + ?Sized>(
        &mut self,
        ctx: &mut SceneContext,
        renderer: &mut R,
        dt: Duration,
    ) -> anyhow::Result<LoopState> {
        if self.token.is_cancelled() {
            if self.state == LoopState::Running {
                log::info!("Render loop stopped after {} frames", self.frames);
            }
            self.state = LoopState::Stopped;
            return Ok(self.state);
        }

        let angle = self.step.angle(dt);
        let animated = ctx.animated;
        ctx.scene
            .find_mut(animated)
            .with_context(|| format!("animated node {:?} is not part of the scene", animated))?
            .local_transform_mut()
            .rotate_xy(angle, angle);
        ctx.scene.update_world_transforms();

        renderer.draw(&ctx.scene, &ctx.camera)?;
        self.frames += 1;
        Ok(self.state)
    }
}
