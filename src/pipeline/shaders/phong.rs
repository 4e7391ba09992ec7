use crate::core::geometry::Vertex;
use crate::core::pipeline::{Interpolatable, Shader};
use crate::scene::light::Light;
use crate::scene::material::Material;
use nalgebra::{Matrix4, Point3, Vector2, Vector3, Vector4};
use std::ops::{Add, Mul};

/// Data interpolated across the triangle surface, passed from the vertex
/// stage to the fragment stage.
#[derive(Clone, Copy, Debug)]
pub struct PhongVarying {
    /// Normal vector in World Space.
    pub normal: Vector3<f32>,
    /// Position in World Space (needed for the view vector).
    pub world_pos: Point3<f32>,
    /// Texture coordinates (UV).
    pub uv: Vector2<f32>,
}

// nalgebra's Point3 doesn't support Point + Point, so go through coords.
impl Add for PhongVarying {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self {
            normal: self.normal + other.normal,
            world_pos: Point3::from(self.world_pos.coords + other.world_pos.coords),
            uv: self.uv + other.uv,
        }
    }
}

impl Mul<f32> for PhongVarying {
    type Output = Self;

    fn mul(self, scalar: f32) -> Self {
        Self {
            normal: self.normal * scalar,
            world_pos: Point3::from(self.world_pos.coords * scalar),
            uv: self.uv * scalar,
        }
    }
}

impl Interpolatable for PhongVarying {}

/// Blinn-Phong lighting shader: ambient term plus diffuse and specular
/// contributions from each directional light.
pub struct PhongShader {
    pub model_matrix: Matrix4<f32>,
    pub view_matrix: Matrix4<f32>,
    pub projection_matrix: Matrix4<f32>,
    pub camera_pos: Point3<f32>,

    pub lights: Vec<Light>,
    pub ambient: Vector3<f32>,

    /// Used when a mesh carries no valid material id.
    pub fallback_material: Material,
}

impl PhongShader {
    pub fn new(
        model: Matrix4<f32>,
        view: Matrix4<f32>,
        projection: Matrix4<f32>,
        camera_pos: Point3<f32>,
    ) -> Self {
        Self {
            model_matrix: model,
            view_matrix: view,
            projection_matrix: projection,
            camera_pos,
            lights: Vec::new(),
            ambient: Vector3::new(0.1, 0.1, 0.1),
            fallback_material: Material::default(),
        }
    }
}

impl Shader for PhongShader {
    type Varying = PhongVarying;

    fn vertex(&self, vertex: &Vertex) -> (Vector4<f32>, Self::Varying) {
        // 1. Transform position to world space
        let world_pos_homo = self.model_matrix * vertex.position.to_homogeneous();
        let world_pos = Point3::from_homogeneous(world_pos_homo)
            .unwrap_or_else(|| Point3::from(world_pos_homo.xyz()));

        // 2. Transform normal to world space. The model matrix here is a pure
        // rotation/translation, so its upper-left 3x3 is sufficient.
        let normal_matrix = self.model_matrix.fixed_view::<3, 3>(0, 0);
        let world_normal = (normal_matrix * vertex.normal).normalize();

        // 3. Clip-space position (MVP)
        let mvp = self.projection_matrix * self.view_matrix * self.model_matrix;
        let clip_pos = mvp * vertex.position.to_homogeneous();

        let varying = PhongVarying {
            normal: world_normal,
            world_pos,
            uv: vertex.texcoord,
        };

        (clip_pos, varying)
    }

    fn fragment(&self, varying: Self::Varying, material: Option<&Material>) -> Vector3<f32> {
        let mat = material.unwrap_or(&self.fallback_material);

        // Sample texture or fall back to the flat diffuse color.
        let diffuse_color = if let Some(texture) = &mat.diffuse_texture {
            texture.sample(varying.uv.x, varying.uv.y)
        } else {
            mat.diffuse_color
        };

        let normal = varying.normal.normalize();
        let view_dir = (self.camera_pos - varying.world_pos).normalize();

        let mut result = self.ambient.component_mul(&diffuse_color);

        for light in &self.lights {
            let light_dir = light.direction_to_light();
            let radiance = light.radiance();

            // Diffuse
            let diff = normal.dot(&light_dir).max(0.0);
            result += radiance.component_mul(&diffuse_color) * diff;

            // Specular (Blinn-Phong half vector)
            if diff > 0.0 {
                let half = (light_dir + view_dir).normalize();
                let spec = normal.dot(&half).max(0.0).powf(mat.shininess);
                result += radiance.component_mul(&mat.specular_color) * spec;
            }
        }

        Vector3::new(result.x.min(1.0), result.y.min(1.0), result.z.min(1.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::assert_approx_eq;
    use nalgebra::Matrix4;

    fn shader_with_light() -> PhongShader {
        let mut shader = PhongShader::new(
            Matrix4::identity(),
            Matrix4::identity(),
            Matrix4::identity(),
            Point3::new(0.0, 0.0, 5.0),
        );
        shader.lights = vec![Light::new_directional(
            Vector3::new(0.0, 0.0, -1.0),
            Vector3::new(1.0, 1.0, 1.0),
            1.0,
        )];
        shader.ambient = Vector3::zeros();
        shader
    }

    fn varying(normal: Vector3<f32>) -> PhongVarying {
        PhongVarying {
            normal,
            world_pos: Point3::origin(),
            uv: Vector2::zeros(),
        }
    }

    #[test]
    fn facing_surface_is_lit() {
        let shader = shader_with_light();
        let lit = shader.fragment(varying(Vector3::new(0.0, 0.0, 1.0)), None);
        assert!(lit.x > 0.5);
    }

    #[test]
    fn back_surface_gets_no_direct_light() {
        let shader = shader_with_light();
        let unlit = shader.fragment(varying(Vector3::new(0.0, 0.0, -1.0)), None);
        assert_approx_eq!(f32, unlit.x, 0.0, epsilon = 1e-5);
    }

    #[test]
    fn ambient_applies_without_lights() {
        let mut shader = shader_with_light();
        shader.lights.clear();
        shader.ambient = Vector3::new(0.5, 0.5, 0.5);
        let color = shader.fragment(varying(Vector3::new(0.0, 0.0, 1.0)), None);
        // 0.5 ambient on the 0.8 default diffuse
        assert_approx_eq!(f32, color.x, 0.4, epsilon = 1e-5);
    }

    #[test]
    fn vertex_produces_clip_position() {
        let shader = shader_with_light();
        let vert = Vertex::new(
            Point3::new(1.0, 2.0, 3.0),
            Vector3::y(),
            Vector2::new(0.5, 0.5),
        );
        let (clip, vary) = shader.vertex(&vert);
        assert_approx_eq!(f32, clip.x, 1.0, epsilon = 1e-6);
        assert_approx_eq!(f32, vary.world_pos.z, 3.0, epsilon = 1e-6);
        assert_approx_eq!(f32, vary.uv.x, 0.5, epsilon = 1e-6);
    }
}
