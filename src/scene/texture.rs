use image::{DynamicImage, GenericImageView};
use log::info;
use nalgebra::Vector3;
use std::path::Path;
use std::sync::Arc;

/// Represents a 2D texture map.
#[derive(Debug, Clone)]
pub struct Texture {
    pub image: Arc<DynamicImage>,
    pub width: u32,
    pub height: u32,
}

impl Texture {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, String> {
        let path_ref = path.as_ref();
        let img = image::open(path_ref)
            .map_err(|e| format!("Failed to load texture '{}': {}", path_ref.display(), e))?;

        let width = img.width();
        let height = img.height();

        info!("Loaded texture: {:?} ({}x{})", path_ref, width, height);

        Ok(Self {
            width,
            height,
            image: Arc::new(img),
        })
    }

    /// Builds a 1x1 texture from a single sRGB color. Used as a stand-in
    /// when a referenced texture image cannot be read.
    pub fn solid(color: [u8; 3]) -> Self {
        let mut img = image::RgbImage::new(1, 1);
        img.put_pixel(0, 0, image::Rgb(color));
        Self {
            width: 1,
            height: 1,
            image: Arc::new(DynamicImage::ImageRgb8(img)),
        }
    }

    /// Samples the texture using Bilinear Interpolation.
    /// UV coordinates wrap (repeat mode); the result is linear RGB.
    pub fn sample(&self, u: f32, v: f32) -> Vector3<f32> {
        // Wrap into [0, 1). fract() keeps the sign, so shift negatives.
        let u = u.fract();
        let v = v.fract();
        let u = if u < 0.0 { 1.0 + u } else { u };
        let v = if v < 0.0 { 1.0 + v } else { v };

        // Map to pixel coordinates; pixel centers sit at 0.5. V is flipped
        // (OBJ UV origin is bottom-left, image origin is top-left).
        let x = u * self.width as f32 - 0.5;
        let y = (1.0 - v) * self.height as f32 - 0.5;

        let x0 = x.floor() as i32;
        let y0 = y.floor() as i32;
        let wx = x - x.floor();
        let wy = y - y.floor();

        let c00 = self.get_pixel_wrapped(x0, y0);
        let c10 = self.get_pixel_wrapped(x0 + 1, y0);
        let c01 = self.get_pixel_wrapped(x0, y0 + 1);
        let c11 = self.get_pixel_wrapped(x0 + 1, y0 + 1);

        let top = c00 * (1.0 - wx) + c10 * wx;
        let bottom = c01 * (1.0 - wx) + c11 * wx;
        let srgb = top * (1.0 - wy) + bottom * wy;

        // sRGB to linear before lighting math.
        Vector3::new(srgb.x.powf(2.2), srgb.y.powf(2.2), srgb.z.powf(2.2))
    }

    fn get_pixel_wrapped(&self, x: i32, y: i32) -> Vector3<f32> {
        let w = self.width as i32;
        let h = self.height as i32;

        // Euclidean modulo so negative coordinates wrap correctly.
        let x_wrapped = ((x % w) + w) % w;
        let y_wrapped = ((y % h) + h) % h;

        let pixel = self.image.get_pixel(x_wrapped as u32, y_wrapped as u32);
        Vector3::new(
            pixel[0] as f32 / 255.0,
            pixel[1] as f32 / 255.0,
            pixel[2] as f32 / 255.0,
        )
    }
}
