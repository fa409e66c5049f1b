use crate::data_structures::{
    material::TextureSource,
    texture::{Environment, Texture, gradient_image},
};

/// Group 0 (camera) and group 1 (lights) share this shape: one uniform buffer.
pub fn uniform_layout(device: &wgpu::Device, label: &str) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        entries: &[wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        }],
        label: Some(label),
    })
}

/// Group 2: material uniform plus its colour map.
pub fn material_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        entries: &[
            wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: 1,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Texture {
                    multisampled: false,
                    view_dimension: wgpu::TextureViewDimension::D2,
                    sample_type: wgpu::TextureSampleType::Float { filterable: true },
                },
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: 2,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                count: None,
            },
        ],
        label: Some("material_bind_group_layout"),
    })
}

/// Group 3: equirectangular environment, sampled by materials and the background.
pub fn environment_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        entries: &[
            wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Texture {
                    multisampled: false,
                    view_dimension: wgpu::TextureViewDimension::D2,
                    sample_type: wgpu::TextureSampleType::Float { filterable: true },
                },
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: 1,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                count: None,
            },
        ],
        label: Some("environment_bind_group_layout"),
    })
}

pub fn texture_from_source(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    source: &TextureSource,
) -> anyhow::Result<Texture> {
    match source {
        TextureSource::Gradient { size, stops } => {
            let img = image::DynamicImage::ImageRgba8(gradient_image(*size, stops));
            Texture::from_image(device, queue, &img, Some("gradient texture"))
        }
    }
}

/// GPU side of the scene environment. A black 1x1 texture stands in when the
/// scene has none; `present` tells the shaders whether to use it.
pub struct EnvironmentResources {
    pub texture: Texture,
    pub bind_group: wgpu::BindGroup,
    pub present: bool,
    /// [`Environment::id`] of the uploaded image.
    pub id: Option<u64>,
}

impl EnvironmentResources {
    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        layout: &wgpu::BindGroupLayout,
        environment: Option<&Environment>,
    ) -> anyhow::Result<Self> {
        let (texture, present) = match environment {
            Some(env) => (
                Texture::from_image(
                    device,
                    queue,
                    &image::DynamicImage::ImageRgba8(env.image.clone()),
                    Some("environment map"),
                )?,
                true,
            ),
            None => (
                Texture::solid(device, queue, [0, 0, 0, 255], "empty environment")?,
                false,
            ),
        };
        let sampler = texture
            .sampler
            .clone()
            .unwrap_or_else(|| crate::data_structures::texture::create_default_sampler(device));
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&texture.view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&sampler),
                },
            ],
            label: Some("environment_bind_group"),
        });
        Ok(Self {
            texture,
            bind_group,
            present,
            id: environment.map(Environment::id),
        })
    }
}
