use crate::{
    data_structures::texture::Texture,
    pipelines::{PipelineOptions, mk_render_pipeline},
};

/// Draws the environment map behind everything. Only used when the scene has
/// an environment; otherwise the clear colour shows.
pub fn mk_background_pipeline(
    device: &wgpu::Device,
    format: wgpu::TextureFormat,
    camera_bind_group_layout: &wgpu::BindGroupLayout,
    environment_bind_group_layout: &wgpu::BindGroupLayout,
) -> wgpu::RenderPipeline {
    let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("Background Pipeline Layout"),
        bind_group_layouts: &[camera_bind_group_layout, environment_bind_group_layout],
        immediate_size: 0,
    });
    mk_render_pipeline(
        device,
        "Background Pipeline",
        &layout,
        format,
        Some(Texture::DEPTH_FORMAT),
        &[],
        wgpu::ShaderModuleDescriptor {
            label: Some("Background Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("background.wgsl").into()),
        },
        PipelineOptions {
            cull_mode: None,
            depth_write: false,
            depth_compare: wgpu::CompareFunction::LessEqual,
            ..Default::default()
        },
    )
}
