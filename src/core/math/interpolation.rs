use nalgebra::{Point2, Vector3};

const EPSILON: f32 = 1e-5;

/// Calculates the barycentric coordinates (alpha, beta, gamma) of point p
/// with respect to triangle (v1, v2, v3).
///
/// Returns `None` if the triangle is degenerate (area is near zero).
pub fn barycentric_coordinates(
    p: Point2<f32>,
    v1: Point2<f32>,
    v2: Point2<f32>,
    v3: Point2<f32>,
) -> Option<Vector3<f32>> {
    let e1 = v2 - v1;
    let e2 = v3 - v1;
    let p_v1 = p - v1;

    // Determinant = 2x the triangle area
    let total_area_x2 = e1.x * e2.y - e1.y * e2.x;

    if total_area_x2.abs() < EPSILON {
        return None;
    }

    let inv_total_area_x2 = 1.0 / total_area_x2;

    let beta = (p_v1.x * e2.y - p_v1.y * e2.x) * inv_total_area_x2;
    let gamma = (e1.x * p_v1.y - e1.y * p_v1.x) * inv_total_area_x2;
    let alpha = 1.0 - beta - gamma;

    Some(Vector3::new(alpha, beta, gamma))
}

/// Checks if the barycentric coordinates represent a point inside the triangle.
#[inline(always)]
pub fn is_inside_triangle(bary: Vector3<f32>) -> bool {
    bary.x >= -EPSILON && bary.y >= -EPSILON && bary.z >= -EPSILON
}

/// Computes perspective-correct barycentric coordinates.
///
/// The screen-space weights are divided by each vertex's clip-space w and
/// renormalized, yielding weights that interpolate attributes linearly in
/// world space.
///
/// Returns `None` when numerical instability is detected (sum near zero).
pub fn perspective_correct_barycentric(
    bary: Vector3<f32>,
    w1: f32,
    w2: f32,
    w3: f32,
) -> Option<Vector3<f32>> {
    let inv_w1 = if w1.abs() > EPSILON { 1.0 / w1 } else { 1.0 };
    let inv_w2 = if w2.abs() > EPSILON { 1.0 / w2 } else { 1.0 };
    let inv_w3 = if w3.abs() > EPSILON { 1.0 / w3 } else { 1.0 };

    let wa = bary.x * inv_w1;
    let wb = bary.y * inv_w2;
    let wc = bary.z * inv_w3;

    let sum = wa + wb + wc;
    if sum.abs() < EPSILON {
        return None;
    }
    let inv_sum = 1.0 / sum;
    Some(Vector3::new(wa * inv_sum, wb * inv_sum, wc * inv_sum))
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::assert_approx_eq;

    fn triangle() -> (Point2<f32>, Point2<f32>, Point2<f32>) {
        (
            Point2::new(0.0, 0.0),
            Point2::new(10.0, 0.0),
            Point2::new(0.0, 10.0),
        )
    }

    #[test]
    fn barycentric_at_vertex() {
        let (v1, v2, v3) = triangle();
        let bary = barycentric_coordinates(v1, v1, v2, v3).unwrap();
        assert_approx_eq!(f32, bary.x, 1.0, epsilon = 1e-5);
        assert_approx_eq!(f32, bary.y, 0.0, epsilon = 1e-5);
        assert_approx_eq!(f32, bary.z, 0.0, epsilon = 1e-5);
    }

    #[test]
    fn barycentric_sums_to_one() {
        let (v1, v2, v3) = triangle();
        let bary = barycentric_coordinates(Point2::new(3.0, 3.0), v1, v2, v3).unwrap();
        assert_approx_eq!(f32, bary.x + bary.y + bary.z, 1.0, epsilon = 1e-5);
        assert!(is_inside_triangle(bary));
    }

    #[test]
    fn barycentric_outside_triangle() {
        let (v1, v2, v3) = triangle();
        let bary = barycentric_coordinates(Point2::new(20.0, 20.0), v1, v2, v3).unwrap();
        assert!(!is_inside_triangle(bary));
    }

    #[test]
    fn degenerate_triangle_rejected() {
        let p = Point2::new(1.0, 1.0);
        let v = Point2::new(0.0, 0.0);
        assert!(barycentric_coordinates(p, v, v, v).is_none());
    }

    #[test]
    fn perspective_correction_equal_w_is_identity() {
        let bary = Vector3::new(0.25, 0.25, 0.5);
        let corrected = perspective_correct_barycentric(bary, 2.0, 2.0, 2.0).unwrap();
        assert_approx_eq!(f32, corrected.x, 0.25, epsilon = 1e-5);
        assert_approx_eq!(f32, corrected.y, 0.25, epsilon = 1e-5);
        assert_approx_eq!(f32, corrected.z, 0.5, epsilon = 1e-5);
    }

    #[test]
    fn perspective_correction_favors_near_vertex() {
        // The vertex with smaller w (closer to the camera) gains weight.
        let bary = Vector3::new(0.5, 0.5, 0.0);
        let corrected = perspective_correct_barycentric(bary, 1.0, 10.0, 1.0).unwrap();
        assert!(corrected.x > corrected.y);
    }
}
