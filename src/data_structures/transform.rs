//! Local transforms and their GPU representation.
//!
//! A node's world matrix is always derived as `parent_world * local.to_matrix()`
//! by [`world_transform`]; nothing writes world matrices directly.

use cgmath::{Angle, Euler, Matrix, Matrix3, Matrix4, Rad, SquareMatrix, Vector3};

use crate::data_structures::geometry::Vertex;

/// Position, Euler rotation (XYZ order) and scale of a node relative to its parent.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    pub position: Vector3<f32>,
    pub rotation: Euler<Rad<f32>>,
    pub scale: Vector3<f32>,
}

impl Transform {
    /// Identity transform: no translation, no rotation, unit scale.
    pub fn new() -> Self {
        Self {
            position: Vector3::new(0.0, 0.0, 0.0),
            rotation: Euler::new(Rad(0.0), Rad(0.0), Rad(0.0)),
            scale: Vector3::new(1.0, 1.0, 1.0),
        }
    }

    pub fn from_position<V: Into<Vector3<f32>>>(position: V) -> Self {
        Self {
            position: position.into(),
            ..Self::new()
        }
    }

    /// Adds `dx`/`dy` to the x and y rotation, wrapped into `[0, 2π)`.
    pub fn rotate_xy(&mut self, dx: Rad<f32>, dy: Rad<f32>) {
        self.rotation.x = (self.rotation.x + dx).normalize();
        self.rotation.y = (self.rotation.y + dy).normalize();
    }

    pub fn to_matrix(&self) -> Matrix4<f32> {
        Matrix4::from_translation(self.position)
            * Matrix4::from(self.rotation)
            * Matrix4::from_nonuniform_scale(self.scale.x, self.scale.y, self.scale.z)
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Vector3<f32>> for Transform {
    fn from(position: Vector3<f32>) -> Self {
        Self::from_position(position)
    }
}

/// World matrix of a node given its parent's world matrix.
pub fn world_transform(parent_world: &Matrix4<f32>, local: &Transform) -> Matrix4<f32> {
    parent_world * local.to_matrix()
}

/**
 * The raw transform is the data stored on the GPU: the model matrix plus the
 * matrix used to bring normals into world space.
 */
#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct TransformRaw {
    model: [[f32; 4]; 4],
    // mat3 columns padded to vec4 for uniform layout
    normal: [[f32; 4]; 3],
}

impl TransformRaw {
    pub fn from_world(world: &Matrix4<f32>) -> Self {
        let upper = Matrix3::from_cols(world.x.truncate(), world.y.truncate(), world.z.truncate());
        // inverse transpose keeps normals perpendicular under non-uniform scale
        let normal = upper
            .invert()
            .map(|inv| inv.transpose())
            .unwrap_or_else(Matrix3::identity);
        Self {
            model: (*world).into(),
            normal: [
                normal.x.extend(0.0).into(),
                normal.y.extend(0.0).into(),
                normal.z.extend(0.0).into(),
            ],
        }
    }
}

impl Vertex for TransformRaw {
    fn desc() -> wgpu::VertexBufferLayout<'static> {
        use std::mem;
        wgpu::VertexBufferLayout {
            array_stride: mem::size_of::<TransformRaw>() as wgpu::BufferAddress,
            // One transform per drawn object, advanced per instance
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &[
                // A mat4 takes up 4 vertex slots as it is technically 4 vec4s.
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 5,
                    format: wgpu::VertexFormat::Float32x4,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 4]>() as wgpu::BufferAddress,
                    shader_location: 6,
                    format: wgpu::VertexFormat::Float32x4,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 8]>() as wgpu::BufferAddress,
                    shader_location: 7,
                    format: wgpu::VertexFormat::Float32x4,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 12]>() as wgpu::BufferAddress,
                    shader_location: 8,
                    format: wgpu::VertexFormat::Float32x4,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 16]>() as wgpu::BufferAddress,
                    shader_location: 9,
                    format: wgpu::VertexFormat::Float32x4,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 20]>() as wgpu::BufferAddress,
                    shader_location: 10,
                    format: wgpu::VertexFormat::Float32x4,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 24]>() as wgpu::BufferAddress,
                    shader_location: 11,
                    format: wgpu::VertexFormat::Float32x4,
                },
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use std::f32::consts::TAU;

    use cgmath::{Deg, Vector4};

    use super::*;

    #[test]
    fn rotation_wraps_into_a_full_turn() {
        let mut t = Transform::new();
        t.rotate_xy(Rad(TAU + 0.5), Rad(-0.25));
        assert!((t.rotation.x.0 - 0.5).abs() < 1e-5);
        assert!((t.rotation.y.0 - (TAU - 0.25)).abs() < 1e-5);
    }

    #[test]
    fn world_is_parent_then_local() {
        let mut parent = Transform::from_position(Vector3::new(1.0, 0.0, 0.0));
        parent.rotation.y = Deg(90.0).into();
        let child = Transform::from_position(Vector3::new(0.0, 0.0, 1.0));

        let world = world_transform(&parent.to_matrix(), &child);
        let origin = world * Vector4::new(0.0, 0.0, 0.0, 1.0);
        // +Z rotated 90° about Y lands on +X
        assert!((origin.x - 2.0).abs() < 1e-5);
        assert!(origin.z.abs() < 1e-5);
    }
}
