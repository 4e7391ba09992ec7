use crate::scene::model::Model;
use nalgebra::{Point3, Vector3};

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy)]
pub struct Aabb {
    pub min: Point3<f32>,
    pub max: Point3<f32>,
}

impl Aabb {
    /// Computes the bounding box over all mesh vertices.
    /// Returns `None` for a model with no vertices.
    pub fn from_model(model: &Model) -> Option<Self> {
        let mut min = Point3::new(f32::MAX, f32::MAX, f32::MAX);
        let mut max = Point3::new(f32::MIN, f32::MIN, f32::MIN);
        let mut has_verts = false;

        for mesh in &model.meshes {
            for vertex in &mesh.vertices {
                min.x = min.x.min(vertex.position.x);
                min.y = min.y.min(vertex.position.y);
                min.z = min.z.min(vertex.position.z);

                max.x = max.x.max(vertex.position.x);
                max.y = max.y.max(vertex.position.y);
                max.z = max.z.max(vertex.position.z);
                has_verts = true;
            }
        }

        has_verts.then_some(Self { min, max })
    }

    pub fn center(&self) -> Point3<f32> {
        nalgebra::center(&self.min, &self.max)
    }

    /// Radius of the sphere through the box corners, centered at the box
    /// center. Used to frame the camera around the model.
    pub fn bounding_radius(&self) -> f32 {
        ((self.max - self.min) / 2.0).norm()
    }
}

/// Translates all vertices so the model's bounding-box center lands at the
/// origin. The model keeps its original scale.
///
/// Returns the original center and the bounding radius, or `None` if the
/// model has no vertices (which leaves it untouched).
pub fn center_model(model: &mut Model) -> Option<(Point3<f32>, f32)> {
    let aabb = Aabb::from_model(model)?;
    let center = aabb.center();
    let offset: Vector3<f32> = center.coords;

    for mesh in &mut model.meshes {
        for vertex in &mut mesh.vertices {
            vertex.position -= offset;
        }
    }

    Some((center, aabb.bounding_radius()))
}
