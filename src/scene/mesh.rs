use crate::core::geometry::Vertex;

/// A collection of vertices and indices representing one piece of a model.
pub struct Mesh {
    pub name: String,
    pub vertices: Vec<Vertex>,
    /// Indices defining triangles (3 indices per triangle).
    pub indices: Vec<u32>,
    /// Index into the owning model's material list.
    pub material_id: usize,
}

impl Mesh {
    pub fn new(name: String, vertices: Vec<Vertex>, indices: Vec<u32>, material_id: usize) -> Self {
        Self {
            name,
            vertices,
            indices,
            material_id,
        }
    }
}
