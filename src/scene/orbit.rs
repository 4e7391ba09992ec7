use crate::io::config::ControlsConfig;
use crate::scene::camera::Camera;
use nalgebra::{Point3, Vector3};
use std::f32::consts::PI;

/// Orbit-style camera controller.
///
/// Keeps the camera on a sphere around its target, expressed in spherical
/// coordinates: `azimuth` rotates around the world Y axis, `polar` is the
/// angle from +Y (0 = looking straight down from above). Drag input moves
/// target angles; `update` eases the current angles toward them (damping)
/// and writes the result back to the camera.
pub struct OrbitController {
    pub orbit_sensitivity: f32,
    pub dolly_sensitivity: f32,
    /// Per-frame easing factor; 0 disables damping (input applies instantly).
    pub damping: f32,

    // Clamp ranges in radians. A range with min > max disables the clamp.
    polar_range: (f32, f32),
    azimuth_range: (f32, f32),

    // Spherical state around the camera target.
    radius: f32,
    azimuth: f32,
    polar: f32,
    target_radius: f32,
    target_azimuth: f32,
    target_polar: f32,

    initial: (f32, f32, f32),
    min_radius: f32,
}

/// Base rotation applied per pixel of drag before sensitivity scaling.
const BASE_ROTATION_PER_PIXEL: f32 = 0.01;
/// Polar angles are kept away from the poles to avoid view/up degeneracy.
const POLE_MARGIN: f32 = 0.01;

impl OrbitController {
    /// Derives the controller state from the camera's current position and
    /// target, so the configured start pose is also the orbit start pose.
    pub fn from_camera(camera: &Camera, config: &ControlsConfig) -> Self {
        let offset = camera.position - camera.target;
        let radius = offset.norm().max(1e-4);
        let polar = (offset.y / radius).clamp(-1.0, 1.0).acos();
        let azimuth = offset.x.atan2(offset.z);

        let mut controller = Self {
            orbit_sensitivity: config.orbit_sensitivity,
            dolly_sensitivity: config.dolly_sensitivity,
            damping: config.damping,
            polar_range: (
                config.polar_min_deg.to_radians(),
                config.polar_max_deg.to_radians(),
            ),
            azimuth_range: (
                config.azimuth_min_deg.to_radians(),
                config.azimuth_max_deg.to_radians(),
            ),
            radius,
            azimuth,
            polar,
            target_radius: radius,
            target_azimuth: azimuth,
            target_polar: polar,
            initial: (radius, azimuth, polar),
            min_radius: (camera.near * 2.0).max(1e-3),
        };
        controller.clamp_targets();
        controller
    }

    /// Applies a screen-space drag delta (pixels) as an orbit rotation.
    pub fn orbit_by(&mut self, delta_x: f32, delta_y: f32) {
        let step = BASE_ROTATION_PER_PIXEL * self.orbit_sensitivity;
        self.target_azimuth -= delta_x * step;
        self.target_polar -= delta_y * step;
        self.clamp_targets();
    }

    /// Applies scroll input as a dolly along the view direction.
    /// The step scales with the current distance so zooming stays usable at
    /// any model size.
    pub fn dolly_by(&mut self, scroll_delta: f32) {
        let amount = scroll_delta * 0.1 * self.dolly_sensitivity;
        self.target_radius = (self.target_radius * (1.0 - amount)).max(self.min_radius);
    }

    /// Returns to the pose the controller was created with.
    pub fn reset(&mut self) {
        let (radius, azimuth, polar) = self.initial;
        self.target_radius = radius;
        self.target_azimuth = azimuth;
        self.target_polar = polar;
        self.clamp_targets();
    }

    /// Eases the current angles toward their targets and positions the
    /// camera accordingly. Returns true while the controller is still moving.
    pub fn update(&mut self, dt: f32, camera: &mut Camera) -> bool {
        let t = if self.damping > 0.0 {
            (self.damping * dt * 60.0).clamp(0.0, 1.0)
        } else {
            1.0
        };

        self.azimuth += (self.target_azimuth - self.azimuth) * t;
        self.polar += (self.target_polar - self.polar) * t;
        self.radius += (self.target_radius - self.radius) * t;

        let offset = Vector3::new(
            self.radius * self.polar.sin() * self.azimuth.sin(),
            self.radius * self.polar.cos(),
            self.radius * self.polar.sin() * self.azimuth.cos(),
        );
        camera.position = camera.target + offset;
        camera.update_matrices();

        (self.target_azimuth - self.azimuth).abs() > 1e-4
            || (self.target_polar - self.polar).abs() > 1e-4
            || (self.target_radius - self.radius).abs() > 1e-3
    }

    /// Refocuses the orbit on a new target point and distance.
    pub fn set_focus(&mut self, camera: &mut Camera, center: Point3<f32>, radius: f32) {
        camera.target = center;
        camera.focus_on(center, radius);
        let distance = (camera.position - camera.target).norm();
        self.radius = distance;
        self.target_radius = distance;
    }

    pub fn polar(&self) -> f32 {
        self.polar
    }

    pub fn azimuth(&self) -> f32 {
        self.azimuth
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    fn clamp_targets(&mut self) {
        let (min, max) = self.polar_range;
        if min <= max {
            self.target_polar = self.target_polar.clamp(min, max);
        }
        self.target_polar = self
            .target_polar
            .clamp(POLE_MARGIN, PI - POLE_MARGIN);

        let (min, max) = self.azimuth_range;
        if min <= max {
            self.target_azimuth = self.target_azimuth.clamp(min, max);
        }
    }
}
