use super::{DEFAULT_HEIGHT, DEFAULT_WIDTH};
use crate::error::FilterError;

/// Bytes per pixel (R, G, B, A)
pub const CHANNELS: usize = 4;

// ============================================================================
// Utility Functions
// ============================================================================

/// Store an interpolated channel value: round to nearest, then saturate to 0..=255.
/// NaN collapses to 0.
#[inline]
pub fn store_channel(value: f32) -> u8 {
    value.round().clamp(0.0, 255.0) as u8
}

// ============================================================================
// PixelBuffer
// ============================================================================

/// RGBA8 pixel buffer, row-major, one pixel = 4 consecutive bytes in R, G, B, A order.
///
/// `index(x, y, c) = (y * width + x) * 4 + c`
#[derive(Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    pixels: Vec<u8>,
    width: u32,
    height: u32,
}

impl PixelBuffer {
    /// Create a new pixel buffer with default resolution (640x480)
    pub fn new() -> Self {
        Self::with_size(DEFAULT_WIDTH, DEFAULT_HEIGHT)
    }

    /// Create a transparent black buffer with custom resolution
    pub fn with_size(width: u32, height: u32) -> Self {
        Self {
            pixels: vec![0; width as usize * height as usize * CHANNELS],
            width,
            height,
        }
    }

    /// Wrap raw RGBA bytes. The length must be exactly `width * height * 4`.
    pub fn from_rgba(width: u32, height: u32, data: Vec<u8>) -> Result<Self, FilterError> {
        let expected = width as usize * height as usize * CHANNELS;
        if data.len() != expected {
            return Err(FilterError::invalid(format!(
                "{}x{} RGBA buffer needs {} bytes, got {}",
                width,
                height,
                expected,
                data.len()
            )));
        }
        Ok(Self {
            pixels: data,
            width,
            height,
        })
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// True when both buffers have identical dimensions
    #[inline]
    pub fn same_size(&self, other: &PixelBuffer) -> bool {
        self.width == other.width && self.height == other.height
    }

    /// Check if coordinates are within bounds
    #[inline]
    fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && x < self.width as i32 && y >= 0 && y < self.height as i32
    }

    /// Byte offset of channel 0 of pixel (x, y)
    #[inline]
    pub fn pixel_index(&self, x: u32, y: u32) -> usize {
        (y as usize * self.width as usize + x as usize) * CHANNELS
    }

    /// Clear to a solid color
    /// Uses u32 writes instead of byte-by-byte
    pub fn clear_rgba(&mut self, r: u8, g: u8, b: u8, a: u8) {
        let pixel = u32::from_ne_bytes([r, g, b, a]);
        let ptr = self.pixels.as_mut_ptr() as *mut u32;
        let len = self.pixels.len() / CHANNELS;
        for i in 0..len {
            // Safety: pixels.len() is always width * height * 4 and i < len.
            // write_unaligned because Vec<u8> carries no u32 alignment guarantee.
            unsafe {
                ptr.add(i).write_unaligned(pixel);
            }
        }
    }

    /// Set a single pixel (bounds checked)
    #[inline]
    pub fn set_pixel_rgba(&mut self, x: i32, y: i32, r: u8, g: u8, b: u8, a: u8) {
        if self.in_bounds(x, y) {
            let idx = self.pixel_index(x as u32, y as u32);
            self.pixels[idx..idx + CHANNELS].copy_from_slice(&[r, g, b, a]);
        }
    }

    /// Read all 4 channels of a pixel (bounds checked)
    /// Returns (r, g, b, a) or None if out of bounds
    #[inline]
    pub fn get_pixel_rgba(&self, x: i32, y: i32) -> Option<(u8, u8, u8, u8)> {
        if self.in_bounds(x, y) {
            let idx = self.pixel_index(x as u32, y as u32);
            Some((
                self.pixels[idx],
                self.pixels[idx + 1],
                self.pixels[idx + 2],
                self.pixels[idx + 3],
            ))
        } else {
            None
        }
    }

    /// Write interpolated channel values at (x, y), rounding and saturating each.
    /// Panics if (x, y) is out of bounds.
    #[inline]
    pub fn store_pixel(&mut self, x: u32, y: u32, channels: [f32; 4]) {
        let idx = self.pixel_index(x, y);
        let dest = &mut self.pixels[idx..idx + CHANNELS];
        for (d, v) in dest.iter_mut().zip(channels) {
            *d = store_channel(v);
        }
    }

    /// One row of RGBA bytes
    #[inline]
    pub fn row(&self, y: u32) -> &[u8] {
        let start = self.pixel_index(0, y);
        &self.pixels[start..start + self.width as usize * CHANNELS]
    }

    /// One row of RGBA bytes, mutable
    #[inline]
    pub fn row_mut(&mut self, y: u32) -> &mut [u8] {
        let start = self.pixel_index(0, y);
        let len = self.width as usize * CHANNELS;
        &mut self.pixels[start..start + len]
    }

    /// Copy another buffer of the same size into this one
    pub fn copy_from(&mut self, src: &PixelBuffer) -> Result<(), FilterError> {
        if !self.same_size(src) {
            return Err(FilterError::invalid(format!(
                "cannot copy {}x{} buffer into {}x{}",
                src.width, src.height, self.width, self.height
            )));
        }
        self.pixels.copy_from_slice(&src.pixels);
        Ok(())
    }

    /// Largest absolute per-channel difference between two same-sized buffers
    pub fn max_channel_diff(&self, other: &PixelBuffer) -> Option<u8> {
        if !self.same_size(other) {
            return None;
        }
        Some(
            self.pixels
                .iter()
                .zip(&other.pixels)
                .map(|(a, b)| a.abs_diff(*b))
                .max()
                .unwrap_or(0),
        )
    }

    /// Raw RGBA bytes
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.pixels
    }

    /// Raw RGBA bytes, mutable
    #[inline]
    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        &mut self.pixels
    }
}

impl Default for PixelBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for PixelBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PixelBuffer")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish_non_exhaustive()
    }
}
