pub mod camera;
pub mod light;
pub mod material;
pub mod mesh;
pub mod model;
pub mod orbit;
pub mod texture;
pub mod utils;

use crate::core::framebuffer::ClearOptions;
use crate::io::config::ViewerConfig;
use crate::scene::camera::Camera;
use crate::scene::light::Light;
use crate::scene::model::Model;
use log::info;
use nalgebra::{Point3, Vector3};

/// Holds everything the renderer needs for a frame: camera, lights, the
/// background, and the model once it has finished loading.
pub struct Scene {
    pub camera: Camera,
    pub lights: Vec<Light>,
    /// Ambient term (color * intensity) applied uniformly to all surfaces.
    pub ambient: Vector3<f32>,
    pub background: ClearOptions,
    pub model: Option<Model>,
}

impl Scene {
    /// Builds camera, lights and background from the configuration. The model
    /// slot stays empty until the asset loader delivers one.
    pub fn from_config(config: &ViewerConfig, aspect_ratio: f32) -> Self {
        let camera = Camera::perspective(
            Point3::from(config.camera.position),
            Point3::from(config.camera.target),
            Vector3::from(config.camera.up),
            config.camera.fov,
            aspect_ratio,
            config.camera.near,
            config.camera.far,
        );

        let lights: Vec<Light> = config
            .lights
            .iter()
            .map(|l| {
                Light::new_directional(
                    Vector3::from(l.direction),
                    Vector3::from(l.color),
                    l.intensity,
                )
            })
            .collect();

        let ambient = Vector3::from(config.ambient.color) * config.ambient.intensity;

        let background = ClearOptions {
            color: Vector3::from(config.background.color),
            gradient: config
                .background
                .gradient_top
                .zip(config.background.gradient_bottom)
                .map(|(top, bottom)| (Vector3::from(top), Vector3::from(bottom))),
        };

        info!(
            "Scene initialized: {} directional light(s), ambient {:?}",
            lights.len(),
            ambient
        );

        Scene {
            camera,
            lights,
            ambient,
            background,
            model: None,
        }
    }

    /// Attaches a loaded (already recentered) model to the scene.
    pub fn attach_model(&mut self, model: Model) {
        info!(
            "Model '{}' added to scene ({} meshes, {} materials)",
            model.name,
            model.meshes.len(),
            model.materials.len()
        );
        self.model = Some(model);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::config::ViewerConfig;
    use float_cmp::assert_approx_eq;

    #[test]
    fn scene_from_default_config() {
        let config = ViewerConfig::default();
        let scene = Scene::from_config(&config, 16.0 / 9.0);

        assert_eq!(scene.lights.len(), 1);
        assert!(scene.model.is_none());
        assert_approx_eq!(f32, scene.camera.aspect_ratio(), 16.0 / 9.0, epsilon = 1e-6);
        // 0x888888 ambient from the default config
        assert!(scene.ambient.x > 0.5 && scene.ambient.x < 0.6);
    }

    #[test]
    fn attach_model_fills_slot() {
        let config = ViewerConfig::default();
        let mut scene = Scene::from_config(&config, 1.0);
        scene.attach_model(Model::new("test".to_string(), vec![], vec![]));
        assert!(scene.model.is_some());
    }
}
