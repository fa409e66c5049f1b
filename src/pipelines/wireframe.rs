use crate::{
    data_structures::{
        geometry::{ModelVertex, Vertex},
        texture::Texture,
        transform::TransformRaw,
    },
    pipelines::{PipelineOptions, mk_render_pipeline},
};

/// Unlit line list over a geometry's unique edges, coloured by the material.
pub fn mk_wireframe_pipeline(
    device: &wgpu::Device,
    format: wgpu::TextureFormat,
    camera_bind_group_layout: &wgpu::BindGroupLayout,
    material_bind_group_layout: &wgpu::BindGroupLayout,
) -> wgpu::RenderPipeline {
    let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("Wireframe Pipeline Layout"),
        bind_group_layouts: &[camera_bind_group_layout, material_bind_group_layout],
        immediate_size: 0,
    });
    mk_render_pipeline(
        device,
        "Wireframe Pipeline",
        &layout,
        format,
        Some(Texture::DEPTH_FORMAT),
        &[ModelVertex::desc(), TransformRaw::desc()],
        wgpu::ShaderModuleDescriptor {
            label: Some("Wireframe Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("wireframe.wgsl").into()),
        },
        PipelineOptions {
            topology: wgpu::PrimitiveTopology::LineList,
            cull_mode: None,
            // lines sit exactly on the surface they outline
            depth_compare: wgpu::CompareFunction::LessEqual,
            ..Default::default()
        },
    )
}
