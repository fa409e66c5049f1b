//! Procedural shape generators.
//!
//! Geometry lives on the CPU until [`crate::resources::mesh::GpuMesh`] uploads
//! it. Both generators emit counter-clockwise triangles seen from outside.

use std::collections::BTreeSet;

use cgmath::{InnerSpace, Vector3, VectorSpace};

/// Describes how vertex bytes are laid out for a pipeline.
pub trait Vertex {
    fn desc() -> wgpu::VertexBufferLayout<'static>;
}

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ModelVertex {
    pub position: [f32; 3],
    /// Normal of the face this vertex belongs to. Used by flat shading.
    pub face_normal: [f32; 3],
    /// Interpolated surface normal. Used by smooth shading.
    pub normal: [f32; 3],
    pub tex_coords: [f32; 2],
}

impl Vertex for ModelVertex {
    fn desc() -> wgpu::VertexBufferLayout<'static> {
        use std::mem;
        wgpu::VertexBufferLayout {
            array_stride: mem::size_of::<ModelVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 3]>() as wgpu::BufferAddress,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 6]>() as wgpu::BufferAddress,
                    shader_location: 2,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 9]>() as wgpu::BufferAddress,
                    shader_location: 3,
                    format: wgpu::VertexFormat::Float32x2,
                },
            ],
        }
    }
}

/// Triangle list with per-vertex attributes.
#[derive(Clone, Debug, Default)]
pub struct Geometry {
    pub vertices: Vec<ModelVertex>,
    pub indices: Vec<u32>,
}

const ICOSAHEDRON_VERTICES: [[f32; 3]; 12] = {
    const T: f32 = 1.618_034;
    [
        [-1.0, T, 0.0],
        [1.0, T, 0.0],
        [-1.0, -T, 0.0],
        [1.0, -T, 0.0],
        [0.0, -1.0, T],
        [0.0, 1.0, T],
        [0.0, -1.0, -T],
        [0.0, 1.0, -T],
        [T, 0.0, -1.0],
        [T, 0.0, 1.0],
        [-T, 0.0, -1.0],
        [-T, 0.0, 1.0],
    ]
};

#[rustfmt::skip]
const ICOSAHEDRON_FACES: [[usize; 3]; 20] = [
    [0, 11, 5], [0, 5, 1], [0, 1, 7], [0, 7, 10], [0, 10, 11],
    [1, 5, 9], [5, 11, 4], [11, 10, 2], [10, 7, 6], [7, 1, 8],
    [3, 9, 4], [3, 4, 2], [3, 2, 6], [3, 6, 8], [3, 8, 9],
    [4, 9, 5], [2, 4, 11], [6, 2, 10], [8, 6, 7], [9, 8, 1],
];

impl Geometry {
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Icosahedron of `radius`, each face split into `(detail + 1)²` triangles
    /// whose corners are pushed out onto the sphere.
    ///
    /// Every triangle owns its three vertices so flat shading gets a clean face
    /// normal without a geometry shader.
    pub fn icosahedron(radius: f32, detail: u32) -> Self {
        let cols = detail as usize + 1;
        let mut geometry = Geometry::default();

        for face in ICOSAHEDRON_FACES {
            let [a, b, c] = face.map(|i| Vector3::from(ICOSAHEDRON_VERTICES[i]));

            // grid[i][j]: row i walks from edge a-b towards c
            let grid: Vec<Vec<Vector3<f32>>> = (0..=cols)
                .map(|i| {
                    let t = i as f32 / cols as f32;
                    let aj = a.lerp(c, t);
                    let bj = b.lerp(c, t);
                    let rows = cols - i;
                    (0..=rows)
                        .map(|j| {
                            if rows == 0 {
                                aj
                            } else {
                                aj.lerp(bj, j as f32 / rows as f32)
                            }
                        })
                        .collect()
                })
                .collect();

            for i in 0..cols {
                for j in 0..(2 * (cols - i) - 1) {
                    let k = j / 2;
                    let tri = if j % 2 == 0 {
                        [grid[i][k + 1], grid[i + 1][k], grid[i][k]]
                    } else {
                        [grid[i][k + 1], grid[i + 1][k + 1], grid[i + 1][k]]
                    };
                    geometry.push_sphere_triangle(tri.map(|p| p.normalize() * radius));
                }
            }
        }
        geometry
    }

    fn push_sphere_triangle(&mut self, [p0, p1, p2]: [Vector3<f32>; 3]) {
        let mut corners = [p0, p1, p2];
        let mut face_normal = (p1 - p0).cross(p2 - p0).normalize();
        let centroid = (p0 + p1 + p2) / 3.0;
        if face_normal.dot(centroid) < 0.0 {
            corners.swap(1, 2);
            face_normal = -face_normal;
        }
        let base = self.vertices.len() as u32;
        for p in corners {
            let n = p.normalize();
            let u = n.z.atan2(n.x) / std::f32::consts::TAU + 0.5;
            let v = n.y.clamp(-1.0, 1.0).asin() / std::f32::consts::PI + 0.5;
            self.vertices.push(ModelVertex {
                position: p.into(),
                face_normal: face_normal.into(),
                normal: n.into(),
                tex_coords: [u, v],
            });
        }
        self.indices.extend([base, base + 1, base + 2]);
    }

    /// Axis aligned box centred on the origin. Each face has its own four
    /// vertices with `0..1` texture coordinates.
    pub fn cuboid(width: f32, height: f32, depth: f32) -> Self {
        let half = Vector3::new(width / 2.0, height / 2.0, depth / 2.0);
        // (normal, u, v) with u × v == normal
        let faces: [([f32; 3], [f32; 3], [f32; 3]); 6] = [
            ([1.0, 0.0, 0.0], [0.0, 0.0, -1.0], [0.0, 1.0, 0.0]),
            ([-1.0, 0.0, 0.0], [0.0, 0.0, 1.0], [0.0, 1.0, 0.0]),
            ([0.0, 1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, -1.0]),
            ([0.0, -1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, 1.0]),
            ([0.0, 0.0, 1.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
            ([0.0, 0.0, -1.0], [-1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
        ];

        let mut geometry = Geometry::default();
        for (n, u, v) in faces {
            let (n, u, v) = (Vector3::from(n), Vector3::from(u), Vector3::from(v));
            let base = geometry.vertices.len() as u32;
            for (su, sv) in [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)] {
                let corner = n + u * su + v * sv;
                let position = Vector3::new(corner.x * half.x, corner.y * half.y, corner.z * half.z);
                geometry.vertices.push(ModelVertex {
                    position: position.into(),
                    face_normal: n.into(),
                    normal: n.into(),
                    tex_coords: [(su + 1.0) / 2.0, (1.0 - sv) / 2.0],
                });
            }
            geometry
                .indices
                .extend([base, base + 1, base + 2, base + 2, base + 3, base]);
        }
        geometry
    }

    /// Unique undirected edges of the triangle list, as a line-list index buffer.
    pub fn wireframe_indices(&self) -> Vec<u32> {
        let mut edges = BTreeSet::new();
        for tri in self.indices.chunks_exact(3) {
            for (a, b) in [(tri[0], tri[1]), (tri[1], tri[2]), (tri[2], tri[0])] {
                edges.insert((a.min(b), a.max(b)));
            }
        }
        edges.into_iter().flat_map(|(a, b)| [a, b]).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn icosahedron_vertices_sit_on_the_sphere() {
        let geo = Geometry::icosahedron(1.0, 2);
        assert_eq!(geo.triangle_count(), 20 * 9);
        for v in &geo.vertices {
            let len = Vector3::from(v.position).magnitude();
            assert!((len - 1.0).abs() < 1e-5, "vertex off sphere: {len}");
        }
    }

    #[test]
    fn face_normals_point_outwards() {
        let geo = Geometry::icosahedron(2.0, 1);
        for tri in geo.indices.chunks_exact(3) {
            let v = geo.vertices[tri[0] as usize];
            assert!(Vector3::from(v.face_normal).dot(Vector3::from(v.position)) > 0.0);
        }
    }

    #[test]
    fn cuboid_has_six_quads() {
        let geo = Geometry::cuboid(1.0, 1.0, 1.0);
        assert_eq!(geo.vertices.len(), 24);
        assert_eq!(geo.triangle_count(), 12);
        for v in &geo.vertices {
            assert!(v.position.iter().all(|c| c.abs() == 0.5));
        }
        // four sides and a diagonal per face
        assert_eq!(geo.wireframe_indices().len(), 6 * 5 * 2);
    }
}
