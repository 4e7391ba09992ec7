use crate::core::geometry::Vertex;
use crate::scene::material::Material;
use nalgebra::{Vector3, Vector4};
use std::ops::{Add, Mul};

/// Trait for types that can be linearly interpolated across a triangle's surface.
///
/// Requirements:
/// - Copy + Clone: cheaply duplicable values for per-vertex storage.
/// - Add + Mul<f32>: support the linear combinations used by barycentric
///   interpolation.
/// - Send + Sync: safe to use from multiple threads during parallel
///   rasterization.
pub trait Interpolatable:
    Copy + Clone + Add<Output = Self> + Mul<f32, Output = Self> + Send + Sync
{
}

/// Shader represents the programmable stages of the pipeline.
///
/// Implementations must be thread-safe (Send + Sync) because shading is
/// invoked concurrently across fragments.
pub trait Shader: Send + Sync {
    /// Per-vertex outputs from the vertex stage, interpolated per fragment.
    type Varying: Interpolatable;

    /// Vertex shader stage.
    ///
    /// Transforms the given vertex into homogeneous clip space and returns
    /// the varying data associated with that vertex.
    fn vertex(&self, vertex: &Vertex) -> (Vector4<f32>, Self::Varying);

    /// Fragment shader stage.
    ///
    /// Computes the final linear RGB color for the current fragment from the
    /// interpolated varying and the optional material.
    fn fragment(&self, varying: Self::Varying, material: Option<&Material>) -> Vector3<f32>;
}
