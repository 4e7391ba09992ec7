use crate::core::framebuffer::FrameBuffer;
use crate::core::pipeline::Shader;
use crate::core::rasterizer::Rasterizer;
use crate::pipeline::shaders::phong::PhongShader;
use crate::scene::Scene;
use crate::scene::material::Material;
use crate::scene::mesh::Mesh;
use crate::scene::model::Model;
use nalgebra::Matrix4;

/// The high-level renderer that orchestrates the pipeline stages.
pub struct Renderer {
    pub rasterizer: Rasterizer,
    pub framebuffer: FrameBuffer,
}

impl Renderer {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            rasterizer: Rasterizer::new(),
            framebuffer: FrameBuffer::new(width, height),
        }
    }

    /// Resizes the output surface. The caller is responsible for keeping the
    /// camera aspect ratio in sync (see `ViewerApp`).
    pub fn resize(&mut self, width: usize, height: usize) {
        self.framebuffer.resize(width.max(1), height.max(1));
    }

    /// Renders one frame of the scene: clears to the scene background and
    /// draws the model if one is attached. A scene without a model still
    /// produces a valid (background-only) frame.
    pub fn render_scene(&mut self, scene: &Scene) {
        self.framebuffer.clear(&scene.background);

        if let Some(model) = &scene.model {
            let mut shader = PhongShader::new(
                Matrix4::identity(),
                scene.camera.view_matrix(),
                scene.camera.projection_matrix(),
                scene.camera.position,
            );
            shader.lights = scene.lights.clone();
            shader.ambient = scene.ambient;

            self.draw_model(model, &shader);
        }
    }

    /// Draws a complete model containing multiple meshes.
    pub fn draw_model<S: Shader>(&mut self, model: &Model, shader: &S) {
        for mesh in &model.meshes {
            // Invalid material ids fall back to the shader's default.
            let material = model.materials.get(mesh.material_id);
            self.draw_mesh(mesh, shader, material);
        }
    }

    /// Draws a mesh using the provided shader and material.
    pub fn draw_mesh<S: Shader>(&mut self, mesh: &Mesh, shader: &S, material: Option<&Material>) {
        for chunk in mesh.indices.chunks(3) {
            if chunk.len() < 3 {
                break;
            }

            let v0 = &mesh.vertices[chunk[0] as usize];
            let v1 = &mesh.vertices[chunk[1] as usize];
            let v2 = &mesh.vertices[chunk[2] as usize];

            let (pos0, var0) = shader.vertex(v0);
            let (pos1, var1) = shader.vertex(v1);
            let (pos2, var2) = shader.vertex(v2);

            self.rasterizer.rasterize_triangle(
                &self.framebuffer,
                shader,
                &[pos0, pos1, pos2],
                &[var0, var1, var2],
                material,
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::geometry::Vertex;
    use crate::core::rasterizer::CullMode;
    use crate::io::config::ViewerConfig;
    use crate::scene::mesh::Mesh;
    use float_cmp::assert_approx_eq;
    use nalgebra::{Point3, Vector2, Vector3};

    fn default_scene() -> Scene {
        Scene::from_config(&ViewerConfig::default(), 1.0)
    }

    #[test]
    fn scene_without_model_renders_background() {
        let mut renderer = Renderer::new(16, 16);
        let mut scene = default_scene();
        scene.background.gradient = None;
        scene.background.color = Vector3::new(1.0, 0.0, 0.0);

        renderer.render_scene(&scene);

        assert_eq!(renderer.framebuffer.get_pixel_packed(8, 8), Some(0xFF0000));
        assert_eq!(renderer.framebuffer.get_depth(8, 8), Some(f32::INFINITY));
    }

    #[test]
    fn model_in_front_of_camera_covers_pixels() {
        let mut renderer = Renderer::new(32, 32);
        renderer.rasterizer.cull_mode = CullMode::None;

        let mut scene = default_scene();
        scene.background.gradient = None;
        scene.background.color = Vector3::zeros();

        // A large quad at the origin, facing the default camera.
        let size = 100.0;
        let mesh = Mesh::new(
            "quad".to_string(),
            vec![
                Vertex::new(Point3::new(-size, -size, 0.0), Vector3::z(), Vector2::zeros()),
                Vertex::new(Point3::new(size, -size, 0.0), Vector3::z(), Vector2::zeros()),
                Vertex::new(Point3::new(size, size, 0.0), Vector3::z(), Vector2::zeros()),
                Vertex::new(Point3::new(-size, size, 0.0), Vector3::z(), Vector2::zeros()),
            ],
            vec![0, 1, 2, 0, 2, 3],
            0,
        );
        scene.attach_model(Model::new(
            "quad".to_string(),
            vec![mesh],
            vec![Material::default()],
        ));

        renderer.render_scene(&scene);

        // The quad spans the view center: depth must have been written there.
        assert!(renderer.framebuffer.get_depth(16, 16).unwrap() < f32::INFINITY);
        assert_ne!(renderer.framebuffer.get_pixel_packed(16, 16), Some(0x000000));
    }

    #[test]
    fn resize_keeps_camera_aspect_consistent() {
        let mut renderer = Renderer::new(100, 100);
        let mut scene = default_scene();

        renderer.resize(200, 100);
        scene
            .camera
            .set_aspect_ratio(renderer.framebuffer.width as f32 / renderer.framebuffer.height as f32);

        assert_eq!(renderer.framebuffer.width, 200);
        assert_eq!(renderer.framebuffer.height, 100);
        assert_approx_eq!(f32, scene.camera.aspect_ratio(), 2.0, epsilon = 1e-6);

        // Rendering after the resize produces a full-size frame.
        renderer.render_scene(&scene);
        assert_eq!(renderer.framebuffer.to_rgba_bytes().len(), 200 * 100 * 4);
    }

    #[test]
    fn resize_to_zero_clamps_to_one() {
        let mut renderer = Renderer::new(10, 10);
        renderer.resize(0, 0);
        assert_eq!(renderer.framebuffer.width, 1);
        assert_eq!(renderer.framebuffer.height, 1);
    }
}
