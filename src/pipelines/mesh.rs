use crate::{
    data_structures::{
        geometry::{ModelVertex, Vertex},
        material::{Pass, Side},
        texture::Texture,
        transform::TransformRaw,
    },
    pipelines::{PipelineOptions, mk_render_pipeline},
};

/// Bind group layouts of the lit mesh shader, in group order.
pub struct MeshLayouts<'a> {
    pub camera: &'a wgpu::BindGroupLayout,
    pub light: &'a wgpu::BindGroupLayout,
    pub material: &'a wgpu::BindGroupLayout,
    pub environment: &'a wgpu::BindGroupLayout,
}

/// The four triangle pipelines a material can select: opaque or blended,
/// front faces only or both sides.
pub struct MeshPipelines {
    opaque_front: wgpu::RenderPipeline,
    opaque_double: wgpu::RenderPipeline,
    transparent_front: wgpu::RenderPipeline,
    transparent_double: wgpu::RenderPipeline,
}

impl MeshPipelines {
    pub fn new(
        device: &wgpu::Device,
        format: wgpu::TextureFormat,
        layouts: &MeshLayouts,
    ) -> Self {
        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Mesh Pipeline Layout"),
            bind_group_layouts: &[
                layouts.camera,
                layouts.light,
                layouts.material,
                layouts.environment,
            ],
            immediate_size: 0,
        });

        let mk = |label: &str, side: Side, transparent: bool| {
            let options = PipelineOptions {
                cull_mode: match side {
                    Side::Front => Some(wgpu::Face::Back),
                    Side::Double => None,
                },
                blend: Some(if transparent {
                    wgpu::BlendState::ALPHA_BLENDING
                } else {
                    wgpu::BlendState::REPLACE
                }),
                // blended surfaces are sorted after opaque ones and must not
                // hide each other
                depth_write: !transparent,
                ..Default::default()
            };
            mk_render_pipeline(
                device,
                label,
                &layout,
                format,
                Some(Texture::DEPTH_FORMAT),
                &[ModelVertex::desc(), TransformRaw::desc()],
                wgpu::ShaderModuleDescriptor {
                    label: Some("Mesh Shader"),
                    source: wgpu::ShaderSource::Wgsl(include_str!("mesh.wgsl").into()),
                },
                options,
            )
        };

        Self {
            opaque_front: mk("Opaque Mesh Pipeline", Side::Front, false),
            opaque_double: mk("Opaque Double Sided Mesh Pipeline", Side::Double, false),
            transparent_front: mk("Transparent Mesh Pipeline", Side::Front, true),
            transparent_double: mk("Transparent Double Sided Mesh Pipeline", Side::Double, true),
        }
    }

    /// Pipeline for a triangle pass. Wireframe materials are drawn by
    /// [`super::wireframe`] instead and fall back to the opaque pipeline here.
    pub fn select(&self, pass: Pass, side: Side) -> &wgpu::RenderPipeline {
        match (pass, side) {
            (Pass::Transparent, Side::Front) => &self.transparent_front,
            (Pass::Transparent, Side::Double) => &self.transparent_double,
            (_, Side::Front) => &self.opaque_front,
            (_, Side::Double) => &self.opaque_double,
        }
    }
}
