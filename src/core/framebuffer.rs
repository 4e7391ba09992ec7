use crate::core::color::srgb_to_packed;
use nalgebra::Vector3;
use rayon::prelude::*;
use std::sync::atomic::{AtomicU32, Ordering};

/// How the framebuffer is filled before drawing geometry.
#[derive(Debug, Clone)]
pub struct ClearOptions {
    /// Solid fallback color (sRGB).
    pub color: Vector3<f32>,
    /// Optional vertical gradient (top, bottom) overriding the solid color.
    pub gradient: Option<(Vector3<f32>, Vector3<f32>)>,
}

impl Default for ClearOptions {
    fn default() -> Self {
        Self {
            color: Vector3::new(0.1, 0.1, 0.1),
            gradient: None,
        }
    }
}

/// A 2D buffer holding color and depth, safe to write from parallel
/// rasterization threads.
///
/// Color is stored as packed 0RGB words and depth as f32 bit patterns, both
/// behind atomics: the depth test runs as a CAS loop and the color store is a
/// plain atomic write afterwards. Two fragments racing on the same pixel at
/// nearly equal depth resolve to either color, never to torn data.
pub struct FrameBuffer {
    pub width: usize,
    pub height: usize,
    color_buffer: Vec<AtomicU32>,
    depth_buffer: Vec<AtomicU32>,
}

impl FrameBuffer {
    pub fn new(width: usize, height: usize) -> Self {
        let size = width * height;
        let inf_bits = f32::INFINITY.to_bits();

        Self {
            width,
            height,
            color_buffer: (0..size).map(|_| AtomicU32::new(0)).collect(),
            depth_buffer: (0..size).map(|_| AtomicU32::new(inf_bits)).collect(),
        }
    }

    /// Reallocates the buffers for new dimensions.
    pub fn resize(&mut self, width: usize, height: usize) {
        *self = Self::new(width, height);
    }

    #[inline(always)]
    pub fn in_bounds(&self, x: usize, y: usize) -> bool {
        x < self.width && y < self.height
    }

    #[inline(always)]
    fn index(&self, x: usize, y: usize) -> usize {
        y * self.width + x
    }

    /// Fills color and depth. The gradient is interpolated per row.
    pub fn clear(&mut self, options: &ClearOptions) {
        let width = self.width;
        let height = self.height;
        let inf_bits = f32::INFINITY.to_bits();

        self.depth_buffer
            .par_iter_mut()
            .for_each(|d| *d = AtomicU32::new(inf_bits));

        match options.gradient {
            Some((top, bottom)) => {
                self.color_buffer
                    .par_chunks_mut(width)
                    .enumerate()
                    .for_each(|(y, row)| {
                        let t = if height > 1 {
                            y as f32 / (height - 1) as f32
                        } else {
                            0.0
                        };
                        let packed = srgb_to_packed(top * (1.0 - t) + bottom * t);
                        for pixel in row {
                            *pixel = AtomicU32::new(packed);
                        }
                    });
            }
            None => {
                let packed = srgb_to_packed(options.color);
                self.color_buffer
                    .par_iter_mut()
                    .for_each(|c| *c = AtomicU32::new(packed));
            }
        }
    }

    /// Thread-safe depth test and update.
    /// Returns true if the new depth is closer than the stored value; the
    /// depth buffer is updated atomically in that case.
    #[inline]
    pub fn depth_test_and_update(&self, x: usize, y: usize, new_depth: f32) -> bool {
        if !self.in_bounds(x, y) {
            return false;
        }
        let new_bits = new_depth.to_bits();
        let depth_atomic = &self.depth_buffer[self.index(x, y)];

        let mut current_bits = depth_atomic.load(Ordering::Relaxed);
        loop {
            if new_depth >= f32::from_bits(current_bits) {
                return false;
            }
            match depth_atomic.compare_exchange_weak(
                current_bits,
                new_bits,
                Ordering::Acquire,
                Ordering::Relaxed,
            ) {
                Ok(_) => return true,
                Err(updated_bits) => current_bits = updated_bits,
            }
        }
    }

    /// Stores a packed 0RGB color. Call only after `depth_test_and_update`
    /// returned true for the same pixel.
    #[inline]
    pub fn set_pixel_packed(&self, x: usize, y: usize, packed: u32) {
        if self.in_bounds(x, y) {
            self.color_buffer[self.index(x, y)].store(packed, Ordering::Relaxed);
        }
    }

    pub fn get_pixel_packed(&self, x: usize, y: usize) -> Option<u32> {
        if !self.in_bounds(x, y) {
            return None;
        }
        Some(self.color_buffer[self.index(x, y)].load(Ordering::Relaxed))
    }

    pub fn get_depth(&self, x: usize, y: usize) -> Option<f32> {
        if !self.in_bounds(x, y) {
            return None;
        }
        Some(f32::from_bits(
            self.depth_buffer[self.index(x, y)].load(Ordering::Relaxed),
        ))
    }

    /// Snapshots the color buffer as packed 0RGB words.
    pub fn to_packed(&self) -> Vec<u32> {
        self.color_buffer
            .iter()
            .map(|c| c.load(Ordering::Relaxed))
            .collect()
    }

    /// Snapshots the color buffer as interleaved RGBA bytes (alpha opaque),
    /// the layout the GUI texture upload expects.
    pub fn to_rgba_bytes(&self) -> Vec<u8> {
        let mut bytes = vec![0u8; self.width * self.height * 4];
        bytes
            .par_chunks_mut(4)
            .zip(self.color_buffer.par_iter())
            .for_each(|(px, packed)| {
                let c = packed.load(Ordering::Relaxed);
                px[0] = ((c >> 16) & 0xFF) as u8;
                px[1] = ((c >> 8) & 0xFF) as u8;
                px[2] = (c & 0xFF) as u8;
                px[3] = 255;
            });
        bytes
    }
}
