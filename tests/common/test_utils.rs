#![allow(dead_code)]

use std::{cell::RefCell, rc::Rc};

use spin_ngin::{
    camera::Camera,
    data_structures::scene_graph::Scene,
    lifecycle::Host,
    render::{Renderer, draw_list},
    viewport::Viewport,
};

/// Renderer that records what it was asked to do instead of touching a GPU.
#[derive(Debug)]
pub struct RecordingRenderer {
    size: Viewport,
    pub resizes: Vec<Viewport>,
    pub draws: usize,
    /// Number of draw items in the last frame.
    pub last_items: usize,
    /// Camera aspect seen by the last frame.
    pub last_aspect: Option<f64>,
}

impl RecordingRenderer {
    pub fn new(size: Viewport) -> Self {
        Self {
            size,
            resizes: Vec::new(),
            draws: 0,
            last_items: 0,
            last_aspect: None,
        }
    }
}

impl Renderer for RecordingRenderer {
    fn size(&self) -> Viewport {
        self.size
    }

    fn set_size(&mut self, viewport: Viewport) {
        self.size = viewport.clamped();
        self.resizes.push(viewport);
    }

    fn draw(&mut self, scene: &Scene, camera: &Camera) -> anyhow::Result<()> {
        self.draws += 1;
        self.last_items = draw_list(scene).len();
        self.last_aspect = Some(camera.aspect());
        Ok(())
    }
}

#[derive(Debug)]
pub struct HostLog {
    pub surface_attached: bool,
    pub listening: bool,
    pub detach_calls: u32,
    pub remove_listener_calls: u32,
    /// Number of upcoming listener removals that fail.
    pub failing_listener_removals: u32,
    /// Number of upcoming surface detaches that fail.
    pub failing_detaches: u32,
}

/// Host whose calls can be observed after the mount that owns it is gone.
#[derive(Debug, Clone)]
pub struct FakeHost {
    pub log: Rc<RefCell<HostLog>>,
}

impl FakeHost {
    pub fn new() -> Self {
        Self {
            log: Rc::new(RefCell::new(HostLog {
                surface_attached: true,
                listening: true,
                detach_calls: 0,
                remove_listener_calls: 0,
                failing_listener_removals: 0,
                failing_detaches: 0,
            })),
        }
    }

    pub fn failing_listener_removals(self, n: u32) -> Self {
        self.log.borrow_mut().failing_listener_removals = n;
        self
    }

    pub fn failing_detaches(self, n: u32) -> Self {
        self.log.borrow_mut().failing_detaches = n;
        self
    }
}

impl Host for FakeHost {
    fn detach_surface(&mut self) -> anyhow::Result<()> {
        let mut log = self.log.borrow_mut();
        if log.failing_detaches > 0 {
            log.failing_detaches -= 1;
            anyhow::bail!("surface busy");
        }
        anyhow::ensure!(log.surface_attached, "surface detached twice");
        log.surface_attached = false;
        log.detach_calls += 1;
        Ok(())
    }

    fn remove_resize_listener(&mut self) -> anyhow::Result<()> {
        let mut log = self.log.borrow_mut();
        if log.failing_listener_removals > 0 {
            log.failing_listener_removals -= 1;
            anyhow::bail!("listener busy");
        }
        log.listening = false;
        log.remove_listener_calls += 1;
        Ok(())
    }
}

pub fn assert_close(actual: f64, expected: f64, tolerance: f64) {
    assert!(
        (actual - expected).abs() <= tolerance,
        "expected {} to be within {} of {}",
        actual,
        tolerance,
        expected
    );
}
