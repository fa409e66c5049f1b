//! Scene lights and their packed GPU representation.

use cgmath::{InnerSpace, Vector3};

use crate::data_structures::material::Colour;

#[derive(Clone, Debug, PartialEq)]
pub enum Light {
    /// Sky colour from above fading to ground colour from below.
    Hemisphere {
        sky: Colour,
        ground: Colour,
        position: Vector3<f32>,
        intensity: f32,
    },
    /// Parallel rays shining from `position` towards the origin.
    Directional {
        colour: Colour,
        position: Vector3<f32>,
        intensity: f32,
        cast_shadow: bool,
    },
}

impl Light {
    /// Hemisphere light above the scene (`(0, 1, 0)`).
    pub fn hemisphere(sky: Colour, ground: Colour) -> Self {
        Light::Hemisphere {
            sky,
            ground,
            position: Vector3::unit_y(),
            intensity: 1.0,
        }
    }

    /// Directional light placed above the scene.
    pub fn directional(colour: Colour) -> Self {
        Light::Directional {
            colour,
            position: Vector3::unit_y(),
            intensity: 1.0,
            cast_shadow: false,
        }
    }

    pub fn at<V: Into<Vector3<f32>>>(mut self, at: V) -> Self {
        match &mut self {
            Light::Hemisphere { position, .. } | Light::Directional { position, .. } => {
                *position = at.into()
            }
        }
        self
    }

    pub fn casting_shadow(mut self) -> Self {
        if let Light::Directional { cast_shadow, .. } = &mut self {
            *cast_shadow = true;
        } else {
            log::warn!("Only directional lights can cast shadows, ignoring.");
        }
        self
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LightUniform {
    sky: [f32; 4],
    ground: [f32; 4],
    // xyz: up direction of the hemisphere light
    hemisphere_up: [f32; 4],
    directional_colour: [f32; 4],
    // xyz: direction towards the light
    directional_dir: [f32; 4],
    // x: 1.0 when an environment map is bound
    environment: [f32; 4],
}

impl LightUniform {
    /// Packs the first hemisphere and the first directional light. Missing
    /// lights contribute black.
    pub fn from_lights<'a>(lights: impl IntoIterator<Item = &'a Light>) -> Self {
        let mut uniform = LightUniform {
            sky: [0.0; 4],
            ground: [0.0; 4],
            hemisphere_up: [0.0, 1.0, 0.0, 0.0],
            directional_colour: [0.0; 4],
            directional_dir: [0.0, 1.0, 0.0, 0.0],
            environment: [0.0; 4],
        };
        let (mut hemi_seen, mut dir_seen) = (false, false);
        for light in lights {
            match light {
                Light::Hemisphere {
                    sky,
                    ground,
                    position,
                    intensity,
                } if !hemi_seen => {
                    hemi_seen = true;
                    uniform.sky = scaled(*sky, *intensity);
                    uniform.ground = scaled(*ground, *intensity);
                    uniform.hemisphere_up = direction(*position);
                }
                Light::Directional {
                    colour,
                    position,
                    intensity,
                    ..
                } if !dir_seen => {
                    dir_seen = true;
                    uniform.directional_colour = scaled(*colour, *intensity);
                    uniform.directional_dir = direction(*position);
                }
                _ => log::warn!("Only one light of each kind is shaded, ignoring {:?}", light),
            }
        }
        uniform
    }

    pub fn with_environment(mut self, present: bool) -> Self {
        self.environment[0] = if present { 1.0 } else { 0.0 };
        self
    }
}

fn scaled(colour: Colour, intensity: f32) -> [f32; 4] {
    [colour.r * intensity, colour.g * intensity, colour.b * intensity, 1.0]
}

fn direction(position: Vector3<f32>) -> [f32; 4] {
    if position.magnitude2() == 0.0 {
        return [0.0, 1.0, 0.0, 0.0];
    }
    position.normalize().extend(0.0).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn packs_one_light_of_each_kind() {
        let lights = [
            Light::hemisphere(Colour::WHITE, Colour::BLACK).at((0.0, 20.0, 0.0)),
            Light::directional(Colour::WHITE).at((3.0, 10.0, 10.0)).casting_shadow(),
        ];
        let uniform = LightUniform::from_lights(&lights);
        assert_eq!(uniform.sky, [1.0, 1.0, 1.0, 1.0]);
        assert_eq!(uniform.ground, [0.0, 0.0, 0.0, 1.0]);
        assert_eq!(uniform.hemisphere_up, [0.0, 1.0, 0.0, 0.0]);
        assert!(uniform.directional_dir[2] > 0.0);
    }
}
