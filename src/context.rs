//! The wgpu renderer.
//!
//! [`Context`] owns the device, the surface and every GPU resource derived
//! from the scene. Resources are created lazily on the first draw that needs
//! them: vertex data per shared [`Geometry`], uniforms and bind groups per
//! scene node. Later draws only rewrite the transform and uniform buffers.

use std::{collections::HashMap, iter, sync::Arc};

use anyhow::Context as _;
use winit::window::Window;

use crate::{
    camera::{Camera, CameraUniform},
    config::SceneConfig,
    data_structures::{
        geometry::Geometry,
        light::LightUniform,
        material::Pass,
        scene_graph::{NodeId, Scene},
        texture::{Environment, Texture},
    },
    pipelines::{
        background::mk_background_pipeline,
        mesh::{MeshLayouts, MeshPipelines},
        wireframe::mk_wireframe_pipeline,
    },
    render::{DrawItem, Renderer, draw_list},
    resources::{
        mesh::{GpuMesh, GpuObject},
        texture::{EnvironmentResources, environment_layout, material_layout, uniform_layout},
    },
    viewport::Viewport,
};

/// A uniform buffer and the bind group exposing it.
struct UniformBinding {
    buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

impl UniformBinding {
    fn new<T: bytemuck::Pod>(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        contents: &T,
        label: &str,
    ) -> Self {
        use wgpu::util::DeviceExt;

        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{} Buffer", label)),
            contents: bytemuck::cast_slice(&[*contents]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            }],
            label: Some(&format!("{} Bind Group", label)),
        });
        Self { buffer, bind_group }
    }

    fn write<T: bytemuck::Pod>(&self, queue: &wgpu::Queue, contents: &T) {
        queue.write_buffer(&self.buffer, 0, bytemuck::cast_slice(&[*contents]));
    }
}

struct Layouts {
    camera: wgpu::BindGroupLayout,
    light: wgpu::BindGroupLayout,
    material: wgpu::BindGroupLayout,
    environment: wgpu::BindGroupLayout,
}

struct Pipelines {
    mesh: MeshPipelines,
    wireframe: wgpu::RenderPipeline,
    background: wgpu::RenderPipeline,
}

pub struct Context {
    surface: Option<wgpu::Surface<'static>>,
    #[cfg(feature = "integration-tests")]
    offscreen: Option<wgpu::Texture>,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub config: wgpu::SurfaceConfiguration,
    pub clear_colour: wgpu::Color,
    depth_texture: Texture,
    layouts: Layouts,
    pipelines: Pipelines,
    camera: UniformBinding,
    light: UniformBinding,
    environment: EnvironmentResources,
    // bound as the colour map of materials without one
    blank_map: Texture,
    meshes: HashMap<usize, (Arc<Geometry>, GpuMesh)>,
    objects: HashMap<NodeId, GpuObject>,
}

impl Context {
    /// Creates a context rendering into `window`.
    pub async fn new(window: Arc<Window>, scene_config: &SceneConfig) -> anyhow::Result<Self> {
        let viewport = Viewport::from(window.inner_size()).clamped();

        log::info!("WGPU setup");
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            #[cfg(not(target_arch = "wasm32"))]
            backends: wgpu::Backends::PRIMARY,
            #[cfg(target_arch = "wasm32")]
            backends: wgpu::Backends::GL,
            ..Default::default()
        });

        let surface = instance
            .create_surface(window)
            .context("cannot create a surface for the window")?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .context("no GPU adapter can present to this surface")?;
        let (device, queue) = request_device(&adapter).await?;

        let surface_caps = surface.get_capabilities(&adapter);
        // The shaders output linear colour and rely on an sRGB target for encoding.
        let format = surface_caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first().copied())
            .context("the surface reports no supported formats")?;
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: viewport.width,
            height: viewport.height,
            present_mode: if scene_config.vsync {
                wgpu::PresentMode::AutoVsync
            } else {
                wgpu::PresentMode::AutoNoVsync
            },
            alpha_mode: surface_caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);
        log::info!(
            "Surface configured: {:?} {}x{} on {}",
            config.format,
            config.width,
            config.height,
            adapter.get_info().name
        );

        Self::with_target(device, queue, config, scene_config, Some(surface))
    }

    /// Creates a context without a window that renders into a texture which
    /// can be read back with [`Context::read_pixels`].
    #[cfg(feature = "integration-tests")]
    pub async fn headless(viewport: Viewport, scene_config: &SceneConfig) -> anyhow::Result<Self> {
        let viewport = viewport.clamped();
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor::default());
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions::default())
            .await
            .context("no GPU adapter available for offscreen rendering")?;
        let (device, queue) = request_device(&adapter).await?;
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            width: viewport.width,
            height: viewport.height,
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: wgpu::CompositeAlphaMode::Opaque,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        let mut ctx = Self::with_target(device, queue, config, scene_config, None)?;
        ctx.offscreen = Some(ctx.create_offscreen_texture());
        Ok(ctx)
    }

    fn with_target(
        device: wgpu::Device,
        queue: wgpu::Queue,
        config: wgpu::SurfaceConfiguration,
        scene_config: &SceneConfig,
        surface: Option<wgpu::Surface<'static>>,
    ) -> anyhow::Result<Self> {
        let layouts = Layouts {
            camera: uniform_layout(&device, "camera_bind_group_layout"),
            light: uniform_layout(&device, "light_bind_group_layout"),
            material: material_layout(&device),
            environment: environment_layout(&device),
        };
        let pipelines = Pipelines {
            mesh: MeshPipelines::new(
                &device,
                config.format,
                &MeshLayouts {
                    camera: &layouts.camera,
                    light: &layouts.light,
                    material: &layouts.material,
                    environment: &layouts.environment,
                },
            ),
            wireframe: mk_wireframe_pipeline(
                &device,
                config.format,
                &layouts.camera,
                &layouts.material,
            ),
            background: mk_background_pipeline(
                &device,
                config.format,
                &layouts.camera,
                &layouts.environment,
            ),
        };

        let camera = UniformBinding::new(&device, &layouts.camera, &CameraUniform::new(), "Camera");
        let light = UniformBinding::new(
            &device,
            &layouts.light,
            &LightUniform::from_lights(std::iter::empty()),
            "Light",
        );
        let environment = EnvironmentResources::new(&device, &queue, &layouts.environment, None)?;
        let blank_map = Texture::solid(&device, &queue, [255, 255, 255, 255], "blank map")?;
        let depth_texture =
            Texture::create_depth_texture(&device, [config.width, config.height], "depth_texture");

        Ok(Self {
            surface,
            #[cfg(feature = "integration-tests")]
            offscreen: None,
            device,
            queue,
            config,
            clear_colour: scene_config.clear_colour,
            depth_texture,
            layouts,
            pipelines,
            camera,
            light,
            environment,
            blank_map,
            meshes: HashMap::new(),
            objects: HashMap::new(),
        })
    }

    #[cfg(feature = "integration-tests")]
    fn create_offscreen_texture(&self) -> wgpu::Texture {
        self.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Offscreen Render Target"),
            size: wgpu::Extent3d {
                width: self.config.width,
                height: self.config.height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: self.config.format,
            usage: self.config.usage,
            view_formats: &[],
        })
    }

    /// Copies the last rendered frame of a headless context into an image.
    #[cfg(feature = "integration-tests")]
    pub async fn read_pixels(&self) -> anyhow::Result<image::RgbaImage> {
        let texture = self
            .offscreen
            .as_ref()
            .context("only headless contexts can be read back")?;
        let (width, height) = (self.config.width, self.config.height);
        let unpadded = 4 * width;
        let align = wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;
        let padded = unpadded.div_ceil(align) * align;

        let output_buffer = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Readback Buffer"),
            size: (padded * height) as wgpu::BufferAddress,
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
            mapped_at_creation: false,
        });
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Readback Encoder"),
            });
        encoder.copy_texture_to_buffer(
            wgpu::TexelCopyTextureInfo {
                aspect: wgpu::TextureAspect::All,
                texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
            },
            wgpu::TexelCopyBufferInfo {
                buffer: &output_buffer,
                layout: wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(padded),
                    rows_per_image: Some(height),
                },
            },
            texture.size(),
        );
        self.queue.submit(iter::once(encoder.finish()));

        let buffer_slice = output_buffer.slice(..);
        let (tx, rx) = futures_intrusive::channel::shared::oneshot_channel();
        buffer_slice.map_async(wgpu::MapMode::Read, move |result| {
            let _ = tx.send(result);
        });
        self.device
            .poll(wgpu::PollType::Wait {
                submission_index: None,
                timeout: Some(instant::Duration::from_secs(3)),
            })
            .context("device lost while waiting for the readback")?;
        rx.receive()
            .await
            .context("readback callback dropped")?
            .context("cannot map the readback buffer")?;

        let pixels: Vec<u8> = {
            let data = buffer_slice.get_mapped_range();
            data.chunks(padded as usize)
                .flat_map(|row| row[..unpadded as usize].iter().copied())
                .collect()
        };
        output_buffer.unmap();
        image::RgbaImage::from_raw(width, height, pixels).context("readback has the wrong size")
    }

    /// Uploads or replaces the environment texture whenever the scene's
    /// environment is added, removed or swapped for another one.
    fn sync_environment(&mut self, environment: Option<&Environment>) -> anyhow::Result<()> {
        if environment.map(Environment::id) == self.environment.id {
            return Ok(());
        }
        self.environment = EnvironmentResources::new(
            &self.device,
            &self.queue,
            &self.layouts.environment,
            environment,
        )
        .context("cannot upload the environment map")?;
        Ok(())
    }

    fn prepare(&mut self, item: &DrawItem) -> anyhow::Result<()> {
        let key = geometry_key(item.geometry);
        if !self.meshes.contains_key(&key) {
            let mesh = GpuMesh::new(&self.device, item.geometry, item.name);
            self.meshes.insert(key, (item.geometry.clone(), mesh));
        }

        match self.objects.get_mut(&item.id) {
            Some(object) if object.matches_map(item.material) => {
                object.update(&self.queue, item.material, &item.world)
            }
            _ => {
                let object = GpuObject::new(
                    &self.device,
                    &self.queue,
                    &self.layouts.material,
                    &self.blank_map,
                    item.material,
                    &item.world,
                    item.name,
                )
                .with_context(|| format!("cannot create GPU resources for {:?}", item.name))?;
                self.objects.insert(item.id, object);
            }
        }
        Ok(())
    }

    /// The view to render into this frame. `None` means the frame is skipped,
    /// for instance because the surface had to be reconfigured.
    fn acquire(&self) -> anyhow::Result<Option<(Option<wgpu::SurfaceTexture>, wgpu::TextureView)>> {
        #[cfg(feature = "integration-tests")]
        if let Some(texture) = &self.offscreen {
            let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
            return Ok(Some((None, view)));
        }

        let surface = self.surface.as_ref().context("context has no render target")?;
        match surface.get_current_texture() {
            Ok(output) => {
                let view = output
                    .texture
                    .create_view(&wgpu::TextureViewDescriptor::default());
                Ok(Some((Some(output), view)))
            }
            // Reconfigure the surface if it's lost or outdated
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                log::warn!(
                    "Surface lost or outdated, reconfiguring at {}x{}",
                    self.config.width,
                    self.config.height
                );
                surface.configure(&self.device, &self.config);
                Ok(None)
            }
            Err(wgpu::SurfaceError::Timeout) => {
                log::warn!("Timed out waiting for the surface, skipping frame");
                Ok(None)
            }
            Err(e) => Err(e).context("cannot acquire the next surface texture"),
        }
    }
}

fn geometry_key(geometry: &Arc<Geometry>) -> usize {
    Arc::as_ptr(geometry) as usize
}

async fn request_device(adapter: &wgpu::Adapter) -> anyhow::Result<(wgpu::Device, wgpu::Queue)> {
    adapter
        .request_device(&wgpu::DeviceDescriptor {
            label: None,
            required_features: wgpu::Features::empty(),
            // WebGL doesn't support all of wgpu's features, so if
            // we're building for the web we'll have to disable some.
            required_limits: if cfg!(target_arch = "wasm32") {
                wgpu::Limits::downlevel_webgl2_defaults()
            } else {
                wgpu::Limits::default()
            },
            experimental_features: wgpu::ExperimentalFeatures::disabled(),
            memory_hints: Default::default(),
            trace: wgpu::Trace::Off,
        })
        .await
        .context("cannot open the GPU device")
}

impl Renderer for Context {
    fn size(&self) -> Viewport {
        Viewport::new(self.config.width, self.config.height)
    }

    fn set_size(&mut self, viewport: Viewport) {
        let viewport = viewport.clamped();
        self.config.width = viewport.width;
        self.config.height = viewport.height;
        if let Some(surface) = &self.surface {
            surface.configure(&self.device, &self.config);
        }
        #[cfg(feature = "integration-tests")]
        if self.offscreen.is_some() {
            self.offscreen = Some(self.create_offscreen_texture());
        }
        self.depth_texture = Texture::create_depth_texture(
            &self.device,
            [self.config.width, self.config.height],
            "depth_texture",
        );
    }

    fn draw(&mut self, scene: &Scene, camera: &Camera) -> anyhow::Result<()> {
        let mut camera_uniform = CameraUniform::new();
        camera_uniform.update_view_proj(camera);
        self.camera.write(&self.queue, &camera_uniform);

        self.sync_environment(scene.environment())?;
        let light_uniform =
            LightUniform::from_lights(scene.lights()).with_environment(self.environment.present);
        self.light.write(&self.queue, &light_uniform);

        let items = draw_list(scene);
        for item in &items {
            self.prepare(item)?;
        }

        let Some((output, view)) = self.acquire()? else {
            return Ok(());
        };

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });
        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.clear_colour),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_texture.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
                multiview_mask: None,
            });

            if self.environment.present {
                render_pass.set_pipeline(&self.pipelines.background);
                render_pass.set_bind_group(0, &self.camera.bind_group, &[]);
                render_pass.set_bind_group(1, &self.environment.bind_group, &[]);
                render_pass.draw(0..3, 0..1);
            }

            for item in &items {
                let (Some((_, mesh)), Some(object)) = (
                    self.meshes.get(&geometry_key(item.geometry)),
                    self.objects.get(&item.id),
                ) else {
                    continue;
                };
                render_pass.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
                render_pass.set_vertex_buffer(1, object.transform_buffer.slice(..));
                match object.pass {
                    Pass::Wireframe => {
                        render_pass.set_pipeline(&self.pipelines.wireframe);
                        render_pass.set_bind_group(0, &self.camera.bind_group, &[]);
                        render_pass.set_bind_group(1, &object.bind_group, &[]);
                        render_pass.set_index_buffer(
                            mesh.wire_index_buffer.slice(..),
                            wgpu::IndexFormat::Uint32,
                        );
                        render_pass.draw_indexed(0..mesh.num_wire_elements, 0, 0..1);
                    }
                    pass => {
                        render_pass.set_pipeline(self.pipelines.mesh.select(pass, object.side));
                        render_pass.set_bind_group(0, &self.camera.bind_group, &[]);
                        render_pass.set_bind_group(1, &self.light.bind_group, &[]);
                        render_pass.set_bind_group(2, &object.bind_group, &[]);
                        render_pass.set_bind_group(3, &self.environment.bind_group, &[]);
                        render_pass.set_index_buffer(
                            mesh.index_buffer.slice(..),
                            wgpu::IndexFormat::Uint32,
                        );
                        render_pass.draw_indexed(0..mesh.num_elements, 0, 0..1);
                    }
                }
            }
        }

        self.queue.submit(iter::once(encoder.finish()));
        if let Some(output) = output {
            output.present();
        }
        Ok(())
    }
}
