//! Surface appearance descriptors.
//!
//! A [`Material`] is plain data. The GPU side only sees the packed
//! [`MaterialUniform`] and, for textured materials, a bind group created in
//! [`crate::resources::mesh`].

/// An sRGB colour given as `0xRRGGBB`, stored as linear floats.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Colour {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Colour {
    pub const WHITE: Colour = Colour::rgb(1.0, 1.0, 1.0);
    pub const BLACK: Colour = Colour::rgb(0.0, 0.0, 0.0);

    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Decodes `0xRRGGBB` and converts each channel from sRGB to linear.
    pub fn from_hex(hex: u32) -> Self {
        let channel = |shift: u32| srgb_to_linear(((hex >> shift) & 0xff) as f32 / 255.0);
        Self::rgb(channel(16), channel(8), channel(0))
    }

    pub fn to_array(self) -> [f32; 3] {
        [self.r, self.g, self.b]
    }
}

pub fn srgb_to_linear(c: f32) -> f32 {
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Shading {
    /// One normal per triangle.
    Flat,
    /// Normals interpolated across the triangle.
    Smooth,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Side {
    Front,
    Double,
}

/// How a material is lit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Model {
    /// Unlit, flat colour.
    Basic,
    /// Metal/roughness.
    Standard,
    /// Standard plus clearcoat.
    Physical,
}

/// Procedural texture sources. Images are produced in [`crate::data_structures::texture`].
#[derive(Clone, Debug, PartialEq)]
pub enum TextureSource {
    /// Diagonal linear gradient from the top-left to the bottom-right corner.
    Gradient { size: u32, stops: Vec<(f32, Colour)> },
}

impl TextureSource {
    /// The red, green, blue gradient of the glass cube.
    pub fn rgb_gradient(size: u32) -> Self {
        TextureSource::Gradient {
            size,
            stops: vec![
                (0.0, Colour::rgb(1.0, 0.0, 0.0)),
                (0.5, Colour::rgb(0.0, 1.0, 0.0)),
                (1.0, Colour::rgb(0.0, 0.0, 1.0)),
            ],
        }
    }
}

/// Which batch of the frame a material is drawn in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Pass {
    Opaque,
    Transparent,
    Wireframe,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Material {
    pub model: Model,
    pub colour: Colour,
    pub shading: Shading,
    pub side: Side,
    pub wireframe: bool,
    pub transparent: bool,
    pub opacity: f32,
    pub metalness: f32,
    pub roughness: f32,
    pub clearcoat: f32,
    pub clearcoat_roughness: f32,
    pub env_map_intensity: f32,
    pub map: Option<TextureSource>,
}

impl Material {
    fn with_model(model: Model, colour: Colour) -> Self {
        Self {
            model,
            colour,
            shading: Shading::Smooth,
            side: Side::Front,
            wireframe: false,
            transparent: false,
            opacity: 1.0,
            metalness: 0.0,
            roughness: 1.0,
            clearcoat: 0.0,
            clearcoat_roughness: 0.0,
            env_map_intensity: 1.0,
            map: None,
        }
    }

    pub fn basic(colour: Colour) -> Self {
        Self::with_model(Model::Basic, colour)
    }

    pub fn standard(colour: Colour) -> Self {
        Self::with_model(Model::Standard, colour)
    }

    pub fn physical(colour: Colour) -> Self {
        Self::with_model(Model::Physical, colour)
    }

    pub fn flat_shading(mut self) -> Self {
        self.shading = Shading::Flat;
        self
    }

    pub fn wireframe(mut self) -> Self {
        self.wireframe = true;
        self
    }

    pub fn double_sided(mut self) -> Self {
        self.side = Side::Double;
        self
    }

    /// Marks the material as alpha blended. Opacity is clamped to `0..=1`.
    pub fn with_opacity(mut self, opacity: f32) -> Self {
        self.transparent = true;
        self.opacity = opacity.clamp(0.0, 1.0);
        self
    }

    pub fn with_metal_rough(mut self, metalness: f32, roughness: f32) -> Self {
        self.metalness = metalness.clamp(0.0, 1.0);
        self.roughness = roughness.clamp(0.0, 1.0);
        self
    }

    pub fn with_clearcoat(mut self, clearcoat: f32, roughness: f32) -> Self {
        self.clearcoat = clearcoat.clamp(0.0, 1.0);
        self.clearcoat_roughness = roughness.clamp(0.0, 1.0);
        self
    }

    pub fn with_env_map_intensity(mut self, intensity: f32) -> Self {
        self.env_map_intensity = intensity.max(0.0);
        self
    }

    pub fn with_map(mut self, map: TextureSource) -> Self {
        self.map = Some(map);
        self
    }

    pub fn render_pass(&self) -> Pass {
        if self.wireframe {
            Pass::Wireframe
        } else if self.transparent {
            Pass::Transparent
        } else {
            Pass::Opaque
        }
    }

    pub fn to_uniform(&self) -> MaterialUniform {
        let flags = (self.model == Model::Basic) as u32 * MaterialUniform::UNLIT
            | (self.shading == Shading::Flat) as u32 * MaterialUniform::FLAT
            | self.map.is_some() as u32 * MaterialUniform::MAPPED;
        MaterialUniform {
            colour: [self.colour.r, self.colour.g, self.colour.b, self.opacity],
            metalness: self.metalness,
            roughness: self.roughness,
            clearcoat: self.clearcoat,
            clearcoat_roughness: self.clearcoat_roughness,
            env_map_intensity: self.env_map_intensity,
            flags,
            _padding: [0; 2],
        }
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MaterialUniform {
    colour: [f32; 4],
    metalness: f32,
    roughness: f32,
    clearcoat: f32,
    clearcoat_roughness: f32,
    env_map_intensity: f32,
    flags: u32,
    // Uniforms require 16 byte alignment
    _padding: [u32; 2],
}

impl MaterialUniform {
    pub const UNLIT: u32 = 1;
    pub const FLAT: u32 = 1 << 1;
    pub const MAPPED: u32 = 1 << 2;

    pub fn flags(&self) -> u32 {
        self.flags
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_white_is_linear_white() {
        let white = Colour::from_hex(0xffffff).to_array();
        assert!(white.iter().all(|c| (c - 1.0).abs() < 1e-6));
        assert_eq!(Colour::from_hex(0x000000), Colour::BLACK);
    }

    #[test]
    fn passes_follow_material_flags() {
        assert_eq!(Material::standard(Colour::WHITE).render_pass(), Pass::Opaque);
        assert_eq!(
            Material::physical(Colour::WHITE).with_opacity(0.75).render_pass(),
            Pass::Transparent
        );
        assert_eq!(Material::basic(Colour::WHITE).wireframe().render_pass(), Pass::Wireframe);
    }

    #[test]
    fn uniform_flags() {
        let flags = Material::basic(Colour::WHITE).flat_shading().to_uniform().flags();
        assert_eq!(flags, MaterialUniform::UNLIT | MaterialUniform::FLAT);
    }
}
