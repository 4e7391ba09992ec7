use crate::core::math::transform::TransformFactory;
use nalgebra::{Matrix4, Point3, Vector3};

/// Perspective camera with cached View and Projection matrices.
#[derive(Debug, Clone)]
pub struct Camera {
    pub position: Point3<f32>,
    pub target: Point3<f32>,
    pub up: Vector3<f32>,
    pub fov_y_degrees: f32,
    pub near: f32,
    pub far: f32,

    aspect_ratio: f32,
    view_matrix: Matrix4<f32>,
    projection_matrix: Matrix4<f32>,
}

impl Camera {
    pub fn perspective(
        position: Point3<f32>,
        target: Point3<f32>,
        up: Vector3<f32>,
        fov_y_degrees: f32,
        aspect_ratio: f32,
        near: f32,
        far: f32,
    ) -> Self {
        let mut camera = Self {
            position,
            target,
            up: up.normalize(),
            fov_y_degrees,
            near,
            far,
            aspect_ratio,
            view_matrix: Matrix4::identity(),
            projection_matrix: Matrix4::identity(),
        };
        camera.update_matrices();
        camera
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.aspect_ratio
    }

    /// Updates the aspect ratio, keeping the projection matrix in sync.
    /// Called whenever the output surface is resized.
    pub fn set_aspect_ratio(&mut self, aspect_ratio: f32) {
        if aspect_ratio > 0.0 && aspect_ratio.is_finite() {
            self.aspect_ratio = aspect_ratio;
            self.update_matrices();
        }
    }

    pub fn view_matrix(&self) -> Matrix4<f32> {
        self.view_matrix
    }

    pub fn projection_matrix(&self) -> Matrix4<f32> {
        self.projection_matrix
    }

    /// Moves the camera so that a sphere of the given radius around `center`
    /// is fully visible, keeping the current viewing direction.
    pub fn focus_on(&mut self, center: Point3<f32>, radius: f32) {
        let fov_rad = self.fov_y_degrees.to_radians();
        let distance = (radius / (fov_rad / 2.0).tan() * 1.5).max(self.near * 2.0);

        let direction = (self.position - self.target).normalize();
        self.target = center;
        self.position = center + direction * distance;
        self.update_matrices();
    }

    /// Recalculates View and Projection matrices after any parameter change.
    pub fn update_matrices(&mut self) {
        self.view_matrix = TransformFactory::view(&self.position, &self.target, &self.up);
        self.projection_matrix = TransformFactory::perspective(
            self.aspect_ratio,
            self.fov_y_degrees.to_radians(),
            self.near,
            self.far,
        );
    }
}
