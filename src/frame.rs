//! # Frame Reduction Module
//!
//! Reduces a raw camera frame to a single scalar reflectance value: the
//! arithmetic mean of the red channel over every pixel. With the fingertip
//! covering the lens, blood volume changes modulate red reflectance, which
//! is the PPG signal everything downstream analyzes.
//!
//! Reduction is a pure read over the pixel buffer, so it is safe to run on
//! the camera's own delivery context before the scalar is handed to the
//! serialized processing path.

/// Bytes per pixel in the expected packed BGRA layout.
const BYTES_PER_PIXEL: usize = 4;

/// Byte offset of the red channel within a BGRA pixel.
const RED_OFFSET: usize = 2;

/// A borrowed view of one raw video frame in packed BGRA format.
///
/// `bytes_per_row` may exceed `width * 4` when rows carry alignment padding.
#[derive(Debug, Clone, Copy)]
pub struct Frame<'a> {
    pub width: usize,
    pub height: usize,
    pub bytes_per_row: usize,
    pub data: &'a [u8],
}

impl<'a> Frame<'a> {
    /// Mean red-channel intensity over the whole frame.
    ///
    /// Returns `None` when the frame cannot be interpreted (zero pixels, a
    /// row stride too small for the declared width, or a pixel buffer
    /// shorter than `height * bytes_per_row`). An unreadable frame is
    /// dropped by the caller; it is never retried.
    pub fn mean_red(&self) -> Option<f64> {
        if self.width == 0 || self.height == 0 {
            return None;
        }
        if self.bytes_per_row < self.width * BYTES_PER_PIXEL {
            return None;
        }
        if self.data.len() < self.height * self.bytes_per_row {
            return None;
        }

        let mut red_sum: u64 = 0;
        for y in 0..self.height {
            let row = &self.data[y * self.bytes_per_row..];
            for x in 0..self.width {
                red_sum += u64::from(row[x * BYTES_PER_PIXEL + RED_OFFSET]);
            }
        }

        let pixel_count = (self.width * self.height) as f64;
        Some(red_sum as f64 / pixel_count)
    }
}
