use crate::scene::texture::Texture;
use nalgebra::Vector3;
use std::sync::Arc;

/// Phong material parameters, optionally textured.
#[derive(Debug, Clone)]
pub struct Material {
    pub name: String,
    pub diffuse_color: Vector3<f32>,
    pub specular_color: Vector3<f32>,
    pub shininess: f32,
    pub diffuse_texture: Option<Arc<Texture>>,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            name: "default".to_string(),
            diffuse_color: Vector3::new(0.8, 0.8, 0.8),
            specular_color: Vector3::new(0.5, 0.5, 0.5),
            shininess: 32.0,
            diffuse_texture: None,
        }
    }
}

impl Material {
    /// Untextured material with the given diffuse color, used for meshes
    /// that arrive without a material library entry.
    pub fn untextured(name: String, diffuse_color: Vector3<f32>) -> Self {
        Self {
            name,
            diffuse_color,
            ..Default::default()
        }
    }
}
