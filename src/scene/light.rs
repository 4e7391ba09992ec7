use nalgebra::Vector3;

/// A light source that is infinitely far away (e.g. the sun).
/// Rays are parallel; `direction` is the direction the light travels.
#[derive(Debug, Clone)]
pub struct Light {
    pub direction: Vector3<f32>,
    pub color: Vector3<f32>,
    pub intensity: f32,
}

impl Light {
    pub fn new_directional(direction: Vector3<f32>, color: Vector3<f32>, intensity: f32) -> Self {
        Self {
            direction: direction.normalize(),
            color,
            intensity,
        }
    }

    /// Direction FROM a surface point TO the light source.
    pub fn direction_to_light(&self) -> Vector3<f32> {
        -self.direction
    }

    /// Radiance arriving at a surface.
    pub fn radiance(&self) -> Vector3<f32> {
        self.color * self.intensity
    }
}
