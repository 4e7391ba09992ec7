use crate::core::color::linear_rgb_to_packed;
use crate::core::framebuffer::FrameBuffer;
use crate::core::math::interpolation::{
    barycentric_coordinates, is_inside_triangle, perspective_correct_barycentric,
};
use crate::core::math::transform::{apply_perspective_division, ndc_to_screen};
use crate::core::pipeline::{Interpolatable, Shader};
use crate::scene::material::Material;
use nalgebra::{Point2, Vector4};
use rayon::prelude::*;

/// Which faces are discarded before shading.
#[derive(PartialEq, Copy, Clone, Debug)]
pub enum CullMode {
    Back,
    Front,
    None,
}

/// The Rasterizer draws clip-space triangles onto the FrameBuffer.
pub struct Rasterizer {
    pub cull_mode: CullMode,
}

impl Default for Rasterizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Rasterizer {
    pub fn new() -> Self {
        Self {
            cull_mode: CullMode::Back,
        }
    }

    /// Rasterizes a single triangle given clip-space coordinates and
    /// per-vertex varyings.
    ///
    /// The triangle is clipped against the near plane before the perspective
    /// divide; geometry fully behind the camera is discarded, and triangles
    /// straddling the plane are re-triangulated. Out-of-view x/y regions are
    /// handled by clamping the screen-space bounding box.
    pub fn rasterize_triangle<S: Shader>(
        &self,
        framebuffer: &FrameBuffer,
        shader: &S,
        clip_coords: &[Vector4<f32>; 3],
        varyings: &[S::Varying; 3],
        material: Option<&Material>,
    ) {
        let polygon = clip_near_plane::<S>(clip_coords, varyings);
        if polygon.len() < 3 {
            return;
        }

        // Fan-triangulate the (convex) clipped polygon.
        let v0 = polygon[0];
        for i in 1..(polygon.len() - 1) {
            let v1 = polygon[i];
            let v2 = polygon[i + 1];
            self.rasterize_clipped(
                framebuffer,
                shader,
                &[v0.0, v1.0, v2.0],
                &[v0.1, v1.1, v2.1],
                material,
            );
        }
    }

    /// Rasterizes a triangle whose vertices are all in front of the near plane.
    fn rasterize_clipped<S: Shader>(
        &self,
        framebuffer: &FrameBuffer,
        shader: &S,
        clip_coords: &[Vector4<f32>; 3],
        varyings: &[S::Varying; 3],
        material: Option<&Material>,
    ) {
        let width = framebuffer.width as f32;
        let height = framebuffer.height as f32;

        // 1. Perspective Division & Viewport Transform
        let mut screen_coords = [Point2::origin(); 3];
        let mut w_values = [0.0; 3];

        for i in 0..3 {
            if clip_coords[i].w.abs() < 1e-6 {
                return;
            }
            let ndc = apply_perspective_division(&clip_coords[i]);
            w_values[i] = clip_coords[i].w;
            screen_coords[i] = ndc_to_screen(ndc.x, ndc.y, width, height);
        }

        // 2. Backface Culling (screen-space winding)
        let edge1 = screen_coords[1] - screen_coords[0];
        let edge2 = screen_coords[2] - screen_coords[1];
        let signed_area = edge1.x * edge2.y - edge1.y * edge2.x;

        match self.cull_mode {
            CullMode::Back if signed_area >= 0.0 => return,
            CullMode::Front if signed_area <= 0.0 => return,
            _ => {}
        }

        // 3. Bounding Box, clamped to the viewport
        let (min_x, min_y, max_x, max_y) = bounding_box(&screen_coords);
        if max_x < 0 || max_y < 0 || min_x >= framebuffer.width as i32 || min_y >= framebuffer.height as i32
        {
            return;
        }

        let start_x = min_x.max(0) as usize;
        let end_x = (max_x.min(framebuffer.width as i32 - 1)) as usize;
        let start_y = min_y.max(0) as usize;
        let end_y = (max_y.min(framebuffer.height as i32 - 1)) as usize;

        // 4. Pixel Loop - rows in parallel, work-stealing balances uneven rows
        (start_y..=end_y).into_par_iter().for_each(|y| {
            for x in start_x..=end_x {
                let pixel_center = Point2::new(x as f32 + 0.5, y as f32 + 0.5);

                let Some(bary) = barycentric_coordinates(
                    pixel_center,
                    screen_coords[0],
                    screen_coords[1],
                    screen_coords[2],
                ) else {
                    continue;
                };
                if !is_inside_triangle(bary) {
                    continue;
                }

                let Some(corrected) =
                    perspective_correct_barycentric(bary, w_values[0], w_values[1], w_values[2])
                else {
                    continue;
                };

                // NDC z interpolates linearly in screen space; map [-1, 1]
                // to the depth range [0, 1].
                let z_ndc = bary.x * clip_coords[0].z / w_values[0]
                    + bary.y * clip_coords[1].z / w_values[1]
                    + bary.z * clip_coords[2].z / w_values[2];
                let depth = z_ndc * 0.5 + 0.5;

                if framebuffer.depth_test_and_update(x, y, depth) {
                    let varying = varyings[0] * corrected.x
                        + varyings[1] * corrected.y
                        + varyings[2] * corrected.z;
                    let color = shader.fragment(varying, material);
                    framebuffer.set_pixel_packed(x, y, linear_rgb_to_packed(color));
                }
            }
        });
    }
}

/// Clips the triangle against the near plane (-Z <= W) in homogeneous clip
/// space, interpolating varyings along cut edges. Returns the resulting
/// convex polygon (possibly empty).
fn clip_near_plane<S: Shader>(
    clip_coords: &[Vector4<f32>; 3],
    varyings: &[S::Varying; 3],
) -> Vec<(Vector4<f32>, S::Varying)> {
    // Signed "distance" to the near plane; >= 0 means in front of it.
    let dist = |p: &Vector4<f32>| p.z + p.w;

    let mut output: Vec<(Vector4<f32>, S::Varying)> = Vec::with_capacity(4);

    for i in 0..3 {
        let curr = (clip_coords[i], varyings[i]);
        let prev = (clip_coords[(i + 2) % 3], varyings[(i + 2) % 3]);
        let curr_d = dist(&curr.0);
        let prev_d = dist(&prev.0);

        if curr_d >= 0.0 {
            if prev_d < 0.0 {
                if let Some(inter) = intersect(prev, curr, prev_d, curr_d) {
                    output.push(inter);
                }
            }
            output.push(curr);
        } else if prev_d >= 0.0 {
            if let Some(inter) = intersect(prev, curr, prev_d, curr_d) {
                output.push(inter);
            }
        }
    }

    output
}

#[inline]
fn intersect<V: Interpolatable>(
    a: (Vector4<f32>, V),
    b: (Vector4<f32>, V),
    a_dist: f32,
    b_dist: f32,
) -> Option<(Vector4<f32>, V)> {
    let denom = a_dist - b_dist;
    if denom.abs() < 1e-9 {
        return None;
    }
    let t = a_dist / denom;
    if !t.is_finite() {
        return None;
    }
    let pos = a.0 + (b.0 - a.0) * t;
    let vary = a.1 * (1.0 - t) + b.1 * t;
    Some((pos, vary))
}

fn bounding_box(points: &[Point2<f32>; 3]) -> (i32, i32, i32, i32) {
    let min_x = points[0].x.min(points[1].x).min(points[2].x).floor() as i32;
    let min_y = points[0].y.min(points[1].y).min(points[2].y).floor() as i32;
    let max_x = points[0].x.max(points[1].x).max(points[2].x).ceil() as i32;
    let max_y = points[0].y.max(points[1].y).max(points[2].y).ceil() as i32;
    (min_x, min_y, max_x, max_y)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::framebuffer::ClearOptions;
    use crate::core::geometry::Vertex;
    use nalgebra::Vector3;

    /// Minimal pass-through shader: clip position is the vertex position,
    /// fragments are solid white.
    struct FlatShader;

    #[derive(Clone, Copy)]
    struct NoVarying;

    impl std::ops::Add for NoVarying {
        type Output = Self;
        fn add(self, _: Self) -> Self {
            NoVarying
        }
    }
    impl std::ops::Mul<f32> for NoVarying {
        type Output = Self;
        fn mul(self, _: f32) -> Self {
            NoVarying
        }
    }
    impl Interpolatable for NoVarying {}

    impl Shader for FlatShader {
        type Varying = NoVarying;

        fn vertex(&self, vertex: &Vertex) -> (Vector4<f32>, NoVarying) {
            (vertex.position.to_homogeneous(), NoVarying)
        }

        fn fragment(&self, _: NoVarying, _: Option<&Material>) -> Vector3<f32> {
            Vector3::new(1.0, 1.0, 1.0)
        }
    }

    fn cleared_framebuffer(size: usize) -> FrameBuffer {
        let mut fb = FrameBuffer::new(size, size);
        fb.clear(&ClearOptions {
            color: Vector3::zeros(),
            gradient: None,
        });
        fb
    }

    #[test]
    fn triangle_covers_center_pixel() {
        let fb = cleared_framebuffer(8);
        let rasterizer = Rasterizer {
            cull_mode: CullMode::None,
        };

        // NDC-space triangle covering the middle of the viewport (w = 1).
        let clip = [
            Vector4::new(-0.9, -0.9, 0.0, 1.0),
            Vector4::new(0.9, -0.9, 0.0, 1.0),
            Vector4::new(0.0, 0.9, 0.0, 1.0),
        ];
        rasterizer.rasterize_triangle(&fb, &FlatShader, &clip, &[NoVarying; 3], None);

        assert_eq!(fb.get_pixel_packed(4, 4), Some(0xFFFFFF));
        // Corner stays background: the triangle does not reach it.
        assert_eq!(fb.get_pixel_packed(0, 0), Some(0x000000));
        // Depth was written for the covered pixel.
        assert!(fb.get_depth(4, 4).unwrap() < f32::INFINITY);
    }

    #[test]
    fn farther_triangle_does_not_overwrite() {
        let fb = cleared_framebuffer(8);
        let rasterizer = Rasterizer {
            cull_mode: CullMode::None,
        };

        let near = [
            Vector4::new(-1.0, -1.0, -0.5, 1.0),
            Vector4::new(1.0, -1.0, -0.5, 1.0),
            Vector4::new(0.0, 1.0, -0.5, 1.0),
        ];
        rasterizer.rasterize_triangle(&fb, &FlatShader, &near, &[NoVarying; 3], None);
        let depth_after_near = fb.get_depth(4, 4).unwrap();

        let far = [
            Vector4::new(-1.0, -1.0, 0.5, 1.0),
            Vector4::new(1.0, -1.0, 0.5, 1.0),
            Vector4::new(0.0, 1.0, 0.5, 1.0),
        ];
        rasterizer.rasterize_triangle(&fb, &FlatShader, &far, &[NoVarying; 3], None);

        assert_eq!(fb.get_depth(4, 4).unwrap(), depth_after_near);
    }

    #[test]
    fn triangle_behind_near_plane_discarded() {
        let fb = cleared_framebuffer(8);
        let rasterizer = Rasterizer {
            cull_mode: CullMode::None,
        };

        // z + w < 0 for all vertices: fully behind the camera.
        let clip = [
            Vector4::new(-0.5, -0.5, -2.0, 1.0),
            Vector4::new(0.5, -0.5, -2.0, 1.0),
            Vector4::new(0.0, 0.5, -2.0, 1.0),
        ];
        rasterizer.rasterize_triangle(&fb, &FlatShader, &clip, &[NoVarying; 3], None);

        assert_eq!(fb.get_pixel_packed(4, 4), Some(0x000000));
    }

    #[test]
    fn near_plane_clip_produces_polygon() {
        let clip = [
            Vector4::new(0.0, 0.0, 0.5, 1.0),
            Vector4::new(1.0, 0.0, -2.0, 1.0),
            Vector4::new(0.0, 1.0, 0.5, 1.0),
        ];
        let polygon = clip_near_plane::<FlatShader>(&clip, &[NoVarying; 3]);
        // One vertex clipped away, two intersection points added.
        assert_eq!(polygon.len(), 4);
        for (pos, _) in &polygon {
            assert!(pos.z + pos.w >= -1e-4);
        }
    }
}
