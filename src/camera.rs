//! Perspective camera and its GPU uniform.
//!
//! The camera keeps its aspect ratio in `f64` so that it tracks the surface
//! dimensions exactly; the projection matrix handed to the GPU is `f32`.

use cgmath::{InnerSpace, Matrix4, Point3, Rad, SquareMatrix, Vector3, Vector4};

use crate::viewport::Viewport;

/// wgpu clips depth to `0..1` while cgmath builds OpenGL style `-1..1` projections.
#[rustfmt::skip]
pub const OPENGL_TO_WGPU_MATRIX: Matrix4<f32> = Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.0,
    0.0, 0.0, 0.5, 1.0,
);

#[derive(Clone, Debug, PartialEq)]
pub struct Camera {
    pub position: Point3<f32>,
    /// Direction the camera looks at. Defaults to `-Z`.
    pub direction: Vector3<f32>,
    pub fovy: Rad<f32>,
    pub znear: f32,
    pub zfar: f32,
    aspect: f64,
    projection: Matrix4<f32>,
}

impl Camera {
    pub fn new<P: Into<Point3<f32>>, F: Into<Rad<f32>>>(
        position: P,
        fovy: F,
        znear: f32,
        zfar: f32,
        viewport: Viewport,
    ) -> Self {
        let mut camera = Self {
            position: position.into(),
            direction: -Vector3::unit_z(),
            fovy: fovy.into(),
            znear,
            zfar,
            aspect: 1.0,
            projection: Matrix4::identity(),
        };
        camera.set_aspect(viewport);
        camera
    }

    /// Width over height of the surface this camera renders into.
    pub fn aspect(&self) -> f64 {
        self.aspect
    }

    /// Tracks a new surface size. Degenerate sizes are clamped to one pixel.
    pub fn set_aspect(&mut self, viewport: Viewport) {
        self.aspect = viewport.aspect();
        self.update_projection_matrix();
    }

    /// Recomputes the cached projection from fov, aspect and clip planes.
    pub fn update_projection_matrix(&mut self) {
        self.projection = OPENGL_TO_WGPU_MATRIX
            * cgmath::perspective(self.fovy, self.aspect as f32, self.znear, self.zfar);
    }

    pub fn projection_matrix(&self) -> Matrix4<f32> {
        self.projection
    }

    pub fn view_matrix(&self) -> Matrix4<f32> {
        Matrix4::look_to_rh(self.position, self.direction.normalize(), Vector3::unit_y())
    }

    pub fn view_proj(&self) -> Matrix4<f32> {
        self.projection * self.view_matrix()
    }

    /// Inverse of projection times the rotation part of the view.
    pub fn inverse_sky_matrix(&self) -> Matrix4<f32> {
        let mut view = self.view_matrix();
        view.w = Vector4::new(0.0, 0.0, 0.0, 1.0);
        (self.projection * view)
            .invert()
            .unwrap_or_else(Matrix4::identity)
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniform {
    view_position: [f32; 4],
    view_proj: [[f32; 4]; 4],
    // clip space to world direction, translation dropped; used by the background
    inv_sky: [[f32; 4]; 4],
}

impl CameraUniform {
    pub fn new() -> Self {
        Self {
            view_position: [0.0; 4],
            view_proj: Matrix4::identity().into(),
            inv_sky: Matrix4::identity().into(),
        }
    }

    pub fn update_view_proj(&mut self, camera: &Camera) {
        self.view_position = camera.position.to_homogeneous().into();
        self.view_proj = camera.view_proj().into();
        self.inv_sky = camera.inverse_sky_matrix().into();
    }
}

impl Default for CameraUniform {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use cgmath::Deg;

    use super::*;

    #[test]
    fn aspect_tracks_viewport_exactly() {
        let mut camera = Camera::new((0.0, 0.0, 2.0), Deg(75.0), 0.1, 1000.0, Viewport::new(800, 600));
        assert!((camera.aspect() - 800.0 / 600.0).abs() < 1e-9);

        camera.set_aspect(Viewport::new(1024, 768));
        assert!((camera.aspect() - 1024.0 / 768.0).abs() < 1e-9);
    }

    #[test]
    fn projection_is_recomputed_on_resize() {
        let mut camera = Camera::new((0.0, 0.0, 5.0), Deg(75.0), 0.1, 1000.0, Viewport::new(800, 600));
        let before = camera.projection_matrix();
        camera.set_aspect(Viewport::new(600, 800));
        assert_ne!(before, camera.projection_matrix());
    }
}
