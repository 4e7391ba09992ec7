use nalgebra::Vector3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Converts linear RGB to sRGB (Gamma Correction).
/// Applied when writing shaded colors to the display buffer.
pub fn linear_to_srgb(color: Vector3<f32>) -> Vector3<f32> {
    let gamma = 1.0 / 2.2;
    Vector3::new(
        color.x.powf(gamma),
        color.y.powf(gamma),
        color.z.powf(gamma),
    )
}

/// Converts a linear RGB color to a packed 0RGB u32, applying gamma correction.
pub fn linear_rgb_to_packed(color: Vector3<f32>) -> u32 {
    let display = linear_to_srgb(color);
    let r = (display.x.clamp(0.0, 1.0) * 255.0) as u32;
    let g = (display.y.clamp(0.0, 1.0) * 255.0) as u32;
    let b = (display.z.clamp(0.0, 1.0) * 255.0) as u32;
    (r << 16) | (g << 8) | b
}

/// Packs an sRGB color (already gamma-encoded, 0.0..1.0) into 0RGB.
pub fn srgb_to_packed(color: Vector3<f32>) -> u32 {
    let r = (color.x.clamp(0.0, 1.0) * 255.0) as u32;
    let g = (color.y.clamp(0.0, 1.0) * 255.0) as u32;
    let b = (color.z.clamp(0.0, 1.0) * 255.0) as u32;
    (r << 16) | (g << 8) | b
}

/// Unpacks a 0RGB u32 into sRGB components in 0.0..1.0.
pub fn packed_to_srgb(packed: u32) -> Vector3<f32> {
    Vector3::new(
        ((packed >> 16) & 0xFF) as f32 / 255.0,
        ((packed >> 8) & 0xFF) as f32 / 255.0,
        (packed & 0xFF) as f32 / 255.0,
    )
}

/// Returns a deterministic tint for the given seed.
///
/// Used to color meshes that arrive without any material so that sub-meshes
/// remain distinguishable. The same seed always yields the same color.
pub fn seeded_tint(seed: u64) -> Vector3<f32> {
    let mut rng = StdRng::seed_from_u64(seed);
    Vector3::new(
        0.3 + rng.random::<f32>() * 0.4,
        0.3 + rng.random::<f32>() * 0.4,
        0.3 + rng.random::<f32>() * 0.4,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::assert_approx_eq;

    #[test]
    fn packed_roundtrip() {
        let packed = srgb_to_packed(Vector3::new(1.0, 0.5, 0.0));
        let back = packed_to_srgb(packed);
        assert_approx_eq!(f32, back.x, 1.0, epsilon = 1e-2);
        assert_approx_eq!(f32, back.y, 0.5, epsilon = 1e-2);
        assert_approx_eq!(f32, back.z, 0.0, epsilon = 1e-2);
    }

    #[test]
    fn gamma_brightens_midtones() {
        let srgb = linear_to_srgb(Vector3::new(0.5, 0.5, 0.5));
        assert!(srgb.x > 0.5);
    }

    #[test]
    fn seeded_tint_is_deterministic() {
        assert_eq!(seeded_tint(42), seeded_tint(42));
        assert_ne!(seeded_tint(1), seeded_tint(2));
    }

    #[test]
    fn seeded_tint_in_range() {
        let c = seeded_tint(7);
        for v in [c.x, c.y, c.z] {
            assert!((0.3..0.7).contains(&v));
        }
    }
}
