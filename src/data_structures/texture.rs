//! GPU textures and the CPU images they are created from.
//!
//! This module provides [`Texture`], a wrapper around WGPU texture resources,
//! together with the procedural gradient used by the glass cube and the HDR
//! tonemapping applied to environment maps before upload.

use std::sync::atomic::{AtomicU64, Ordering};

use anyhow::*;
use image::{GenericImageView, Rgb32FImage, RgbaImage};

use crate::data_structures::material::Colour;

/// An equirectangular environment, already tonemapped to 8-bit sRGB.
///
/// Used as the scene background and as the reflection source of materials
/// with a non-zero `env_map_intensity`.
///
/// Every [`Environment::new`] gets a fresh id; clones share it. The renderer
/// re-uploads the texture whenever the scene's environment id changes.
#[derive(Clone, Debug)]
pub struct Environment {
    id: u64,
    pub image: RgbaImage,
}

impl Environment {
    pub fn new(image: RgbaImage) -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(0);
        Self {
            id: NEXT.fetch_add(1, Ordering::Relaxed),
            image,
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }
}

/// Rasterises a diagonal linear gradient from `(0, 0)` to `(size, size)`.
///
/// Stops are `(offset, colour)` pairs with offsets in `0..=1`. Pixels are
/// sampled at their centres; positions before the first or after the last stop
/// take that stop's colour.
pub fn gradient_image(size: u32, stops: &[(f32, Colour)]) -> RgbaImage {
    let size = size.max(1);
    let mut stops = stops.to_vec();
    stops.sort_by(|a, b| a.0.total_cmp(&b.0));

    RgbaImage::from_fn(size, size, |x, y| {
        let t = (x as f32 + 0.5 + y as f32 + 0.5) / (2.0 * size as f32);
        let colour = sample_stops(&stops, t);
        let to_u8 = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        image::Rgba([to_u8(colour.r), to_u8(colour.g), to_u8(colour.b), 255])
    })
}

fn sample_stops(stops: &[(f32, Colour)], t: f32) -> Colour {
    let (Some(first), Some(last)) = (stops.first(), stops.last()) else {
        return Colour::BLACK;
    };
    if t <= first.0 {
        return first.1;
    }
    if t >= last.0 {
        return last.1;
    }
    stops
        .windows(2)
        .find(|w| t >= w[0].0 && t <= w[1].0)
        .map(|w| {
            let span = (w[1].0 - w[0].0).max(f32::EPSILON);
            let f = (t - w[0].0) / span;
            let (a, b) = (w[0].1, w[1].1);
            Colour::rgb(
                a.r + (b.r - a.r) * f,
                a.g + (b.g - a.g) * f,
                a.b + (b.b - a.b) * f,
            )
        })
        .unwrap_or(last.1)
}

/// Reinhard tonemap of linear HDR radiance, encoded as sRGB.
pub fn tonemap_hdr(hdr: &Rgb32FImage, exposure: f32) -> RgbaImage {
    let (width, height) = hdr.dimensions();
    RgbaImage::from_fn(width, height, |x, y| {
        let px = hdr.get_pixel(x, y);
        let map = |c: f32| {
            let c = (c.max(0.0) * exposure).max(0.0);
            let mapped = c / (1.0 + c);
            (linear_to_srgb(mapped) * 255.0).round() as u8
        };
        image::Rgba([map(px[0]), map(px[1]), map(px[2]), 255])
    })
}

fn linear_to_srgb(c: f32) -> f32 {
    if c <= 0.003_130_8 {
        c * 12.92
    } else {
        1.055 * c.powf(1.0 / 2.4) - 0.055
    }
}

/// A GPU texture with a view and optional sampler.
///
/// Typically created via [`from_image`](Self::from_image) or
/// [`create_depth_texture`](Self::create_depth_texture).
#[derive(Clone, Debug)]
pub struct Texture {
    #[allow(unused)]
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub sampler: Option<wgpu::Sampler>,
}

impl Texture {
    /// Standard depth buffer texture format (32-bit float).
    pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

    /// Create a depth texture for depth-testing during rendering.
    ///
    /// * `size` is [width, height] of the texture in pixels, each clamped to at least 1
    /// * `label` is used as a debug label for the GPU resource
    pub fn create_depth_texture(device: &wgpu::Device, size: [u32; 2], label: &str) -> Self {
        let size = wgpu::Extent3d {
            width: size[0].max(1),
            height: size[1].max(1),
            depth_or_array_layers: 1,
        };
        let desc = wgpu::TextureDescriptor {
            label: Some(label),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: Self::DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[Self::DEPTH_FORMAT],
        };
        let texture = device.create_texture(&desc);
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        Self {
            texture,
            view,
            sampler: None,
        }
    }

    /// A 1x1 texture of a single colour. Bound wherever a material has no map
    /// or the scene has no environment, so the pipelines never change shape.
    pub fn solid(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        rgba: [u8; 4],
        label: &str,
    ) -> Result<Texture> {
        let img = image::DynamicImage::ImageRgba8(RgbaImage::from_pixel(1, 1, image::Rgba(rgba)));
        Self::from_image(device, queue, &img, Some(label))
    }

    /// Upload an sRGB image.
    pub fn from_image(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        img: &image::DynamicImage,
        label: Option<&str>,
    ) -> Result<Self> {
        let dimensions = img.dimensions();
        if dimensions.0 == 0 || dimensions.1 == 0 {
            bail!("cannot upload an empty image ({:?})", label);
        }
        let rgba = img.to_rgba8();

        let size = wgpu::Extent3d {
            width: dimensions.0,
            height: dimensions.1,
            depth_or_array_layers: 1,
        };
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label,
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                aspect: wgpu::TextureAspect::All,
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
            },
            &rgba,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(4 * dimensions.0),
                rows_per_image: Some(dimensions.1),
            },
            size,
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let sampler = Some(create_default_sampler(device));

        Ok(Self {
            texture,
            view,
            sampler,
        })
    }
}

pub fn create_default_sampler(device: &wgpu::Device) -> wgpu::Sampler {
    device.create_sampler(&wgpu::SamplerDescriptor {
        address_mode_u: wgpu::AddressMode::Repeat,
        address_mode_v: wgpu::AddressMode::ClampToEdge,
        address_mode_w: wgpu::AddressMode::Repeat,
        mag_filter: wgpu::FilterMode::Linear,
        min_filter: wgpu::FilterMode::Linear,
        ..Default::default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gradient_runs_red_green_blue_along_the_diagonal() {
        let stops = [
            (0.0, Colour::rgb(1.0, 0.0, 0.0)),
            (0.5, Colour::rgb(0.0, 1.0, 0.0)),
            (1.0, Colour::rgb(0.0, 0.0, 1.0)),
        ];
        let img = gradient_image(512, &stops);
        assert_eq!(img.dimensions(), (512, 512));

        let top_left = img.get_pixel(0, 0);
        let bottom_right = img.get_pixel(511, 511);
        let anti_diagonal = img.get_pixel(511, 0);
        assert!(top_left[0] > 250 && top_left[2] < 5);
        assert!(bottom_right[2] > 250 && bottom_right[0] < 5);
        assert!(anti_diagonal[1] > 250);
    }

    #[test]
    fn environments_are_told_apart_by_id() {
        let a = Environment::new(RgbaImage::new(2, 1));
        let b = Environment::new(RgbaImage::new(2, 1));
        assert_ne!(a.id(), b.id());
        assert_eq!(a.clone().id(), a.id());
    }

    #[test]
    fn tonemap_keeps_values_in_range() {
        let mut hdr = Rgb32FImage::new(2, 1);
        hdr.put_pixel(0, 0, image::Rgb([0.0, 0.0, 0.0]));
        hdr.put_pixel(1, 0, image::Rgb([1000.0, 1.0, -3.0]));
        let ldr = tonemap_hdr(&hdr, 1.0);
        assert_eq!(ldr.get_pixel(0, 0).0, [0, 0, 0, 255]);
        let bright = ldr.get_pixel(1, 0);
        assert!(bright[0] >= 254);
        assert_eq!(bright[2], 0);
    }
}
