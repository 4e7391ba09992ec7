use image::ImageBuffer;
use std::path::Path;

/// Saves a packed 0RGB buffer to a PNG file.
pub fn save_buffer_to_image(
    buffer: &[u32],
    width: usize,
    height: usize,
    path: &Path,
) -> Result<(), String> {
    let mut img_buf = ImageBuffer::new(width as u32, height as u32);

    for (x, y, pixel) in img_buf.enumerate_pixels_mut() {
        let packed = buffer[(y as usize) * width + (x as usize)];

        let r = ((packed >> 16) & 0xFF) as u8;
        let g = ((packed >> 8) & 0xFF) as u8;
        let b = (packed & 0xFF) as u8;

        *pixel = image::Rgb([r, g, b]);
    }

    img_buf
        .save(path)
        .map_err(|e| format!("Failed to save image to '{}': {}", path.display(), e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn saves_png_roundtrip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("pixel.png");

        save_buffer_to_image(&[0xFF0000, 0x00FF00, 0x0000FF, 0xFFFFFF], 2, 2, &path).unwrap();

        let img = image::open(&path).unwrap().to_rgb8();
        assert_eq!(img.get_pixel(0, 0).0, [255, 0, 0]);
        assert_eq!(img.get_pixel(1, 1).0, [255, 255, 255]);
    }

    #[test]
    fn unwritable_path_is_an_error() {
        let result = save_buffer_to_image(&[0], 1, 1, Path::new("/nonexistent/dir/out.png"));
        assert!(result.is_err());
    }
}
