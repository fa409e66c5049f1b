use cgmath::Matrix4;
use wgpu::util::DeviceExt;

use crate::{
    data_structures::{
        geometry::Geometry,
        material::{Material, Pass, Side, TextureSource},
        texture::Texture,
        transform::TransformRaw,
    },
    resources::texture::texture_from_source,
};

/// Vertex data of one geometry, uploaded once and shared by every node that
/// draws it (the glass cube and its overlay, the icosahedron and its wireframe).
pub struct GpuMesh {
    pub vertex_buffer: wgpu::Buffer,
    pub index_buffer: wgpu::Buffer,
    pub num_elements: u32,
    pub wire_index_buffer: wgpu::Buffer,
    pub num_wire_elements: u32,
}

impl GpuMesh {
    pub fn new(device: &wgpu::Device, geometry: &Geometry, name: &str) -> Self {
        let wire_indices = geometry.wireframe_indices();
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{:?} Vertex Buffer", name)),
            contents: bytemuck::cast_slice(&geometry.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{:?} Index Buffer", name)),
            contents: bytemuck::cast_slice(&geometry.indices),
            usage: wgpu::BufferUsages::INDEX,
        });
        let wire_index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{:?} Wireframe Index Buffer", name)),
            contents: bytemuck::cast_slice(&wire_indices),
            usage: wgpu::BufferUsages::INDEX,
        });
        Self {
            vertex_buffer,
            index_buffer,
            num_elements: geometry.indices.len() as u32,
            wire_index_buffer,
            num_wire_elements: wire_indices.len() as u32,
        }
    }
}

/// Per-node GPU state: world transform, material uniform and bind group.
///
/// Transform and material uniform are rewritten every frame by
/// [`GpuObject::update`]. The colour map is baked into the bind group, so a
/// material whose map changes needs a new object (see [`GpuObject::matches_map`]).
pub struct GpuObject {
    pub transform_buffer: wgpu::Buffer,
    pub material_buffer: wgpu::Buffer,
    pub bind_group: wgpu::BindGroup,
    pub pass: Pass,
    pub side: Side,
    map_source: Option<TextureSource>,
    // keeps the map alive for the bind group
    #[allow(dead_code)]
    map: Texture,
}

impl GpuObject {
    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        layout: &wgpu::BindGroupLayout,
        fallback_map: &Texture,
        material: &Material,
        world: &Matrix4<f32>,
        name: &str,
    ) -> anyhow::Result<Self> {
        let transform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{:?} Transform Buffer", name)),
            contents: bytemuck::cast_slice(&[TransformRaw::from_world(world)]),
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        });
        let material_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{:?} Material Buffer", name)),
            contents: bytemuck::cast_slice(&[material.to_uniform()]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let map = match &material.map {
            Some(source) => texture_from_source(device, queue, source)?,
            None => fallback_map.clone(),
        };
        let sampler = map
            .sampler
            .clone()
            .unwrap_or_else(|| crate::data_structures::texture::create_default_sampler(device));
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: material_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(&map.view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(&sampler),
                },
            ],
            label: Some(&format!("{:?} Material Bind Group", name)),
        });
        Ok(Self {
            transform_buffer,
            material_buffer,
            bind_group,
            pass: material.render_pass(),
            side: material.side,
            map_source: material.map.clone(),
            map,
        })
    }

    /// Whether the bind group was built for the map of `material`.
    pub fn matches_map(&self, material: &Material) -> bool {
        self.map_source == material.map
    }

    /// Uploads the current transform and material parameters.
    pub fn update(&mut self, queue: &wgpu::Queue, material: &Material, world: &Matrix4<f32>) {
        queue.write_buffer(
            &self.transform_buffer,
            0,
            bytemuck::cast_slice(&[TransformRaw::from_world(world)]),
        );
        queue.write_buffer(
            &self.material_buffer,
            0,
            bytemuck::cast_slice(&[material.to_uniform()]),
        );
        self.pass = material.render_pass();
        self.side = material.side;
    }
}
