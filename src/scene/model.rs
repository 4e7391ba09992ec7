use crate::scene::material::Material;
use crate::scene::mesh::Mesh;

/// A complete 3D object: one or more meshes plus the materials they index.
pub struct Model {
    pub name: String,
    pub meshes: Vec<Mesh>,
    pub materials: Vec<Material>,
}

impl Model {
    pub fn new(name: String, meshes: Vec<Mesh>, materials: Vec<Material>) -> Self {
        Self {
            name,
            meshes,
            materials,
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.meshes.iter().map(|m| m.vertices.len()).sum()
    }

    pub fn triangle_count(&self) -> usize {
        self.meshes.iter().map(|m| m.indices.len() / 3).sum()
    }
}
