//! Bilinear Sampler
//!
//! Shared resampling primitive for the polar passes. The requested point is
//! treated as the center of a 1x1 cell spanning [fx-0.5, fx+0.5] x [fy-0.5, fy+0.5];
//! each of the four pixels it overlaps contributes in proportion to the overlap area.
//! Pixel `i` therefore sits at coordinate `i + 0.5`.

use crate::display::PixelBuffer;
use crate::error::FilterError;

/// Corner pixels and weights of one bilinear footprint
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BilinearWeights {
    /// Left/right columns: floor(fx - 0.5), floor(fx + 0.5)
    pub x: [i64; 2],
    /// Top/bottom rows: floor(fy - 0.5), floor(fy + 0.5)
    pub y: [i64; 2],
    /// Weights for (x0,y0), (x0,y1), (x1,y1), (x1,y0)
    pub w: [f32; 4],
}

impl BilinearWeights {
    pub fn at(fx: f32, fy: f32) -> Self {
        let x1 = fx - 0.5;
        let x2 = fx + 0.5;
        let y1 = fy - 0.5;
        let y2 = fy + 0.5;
        let x1i = x1.floor();
        let x2i = x2.floor();
        let y1i = y1.floor();
        let y2i = y2.floor();

        // Overlap of the cell with the left column / top row, and with the right / bottom
        let left = 1.0 - (x1 - x1i);
        let right = x2 - x2i;
        let top = 1.0 - (y1 - y1i);
        let bottom = y2 - y2i;

        Self {
            x: [x1i as i64, x2i as i64],
            y: [y1i as i64, y2i as i64],
            w: [left * top, left * bottom, right * bottom, right * top],
        }
    }

    /// Sum of the four weights (1.0 up to rounding)
    #[inline]
    pub fn total(&self) -> f32 {
        self.w.iter().sum()
    }

    #[inline]
    fn fits(&self, width: u32, height: u32) -> bool {
        self.x[0] >= 0 && self.y[0] >= 0 && self.x[1] < width as i64 && self.y[1] < height as i64
    }
}

/// Interpolated (r, g, b, a) at fractional coordinate (fx, fy), not yet rounded.
///
/// The caller keeps the coordinate inside the buffer (see `clamp_axis`); a
/// footprint that leaves the buffer, or a non-finite coordinate, is reported as
/// `OutOfBounds`.
pub fn sample_bilinear(src: &PixelBuffer, fx: f32, fy: f32) -> Result<[f32; 4], FilterError> {
    let out_of_bounds = || FilterError::OutOfBounds {
        x: fx,
        y: fy,
        width: src.width(),
        height: src.height(),
    };
    if !fx.is_finite() || !fy.is_finite() {
        return Err(out_of_bounds());
    }

    let weights = BilinearWeights::at(fx, fy);
    if !weights.fits(src.width(), src.height()) {
        return Err(out_of_bounds());
    }

    let [x0, x1] = weights.x;
    let [y0, y1] = weights.y;
    let corners = [(x0, y0), (x0, y1), (x1, y1), (x1, y0)];

    let bytes = src.as_bytes();
    let mut out = [0.0f32; 4];
    for ((cx, cy), scale) in corners.into_iter().zip(weights.w) {
        let idx = src.pixel_index(cx as u32, cy as u32);
        for (c, acc) in out.iter_mut().enumerate() {
            *acc += bytes[idx + c] as f32 * scale;
        }
    }
    Ok(out)
}

/// Pull a sample coordinate back inside an axis of `size` pixels: values at or
/// below 1 snap to 1, values at or past `size - 0.5` snap to `size - 1`.
/// For `size >= 2` the result always yields an in-range footprint.
#[inline]
pub fn clamp_axis(v: f32, size: u32) -> f32 {
    let size = size as f32;
    let mut v = v;
    if v <= 1.0 {
        v = 1.0;
    }
    if v >= size - 0.5 {
        v = size - 1.0;
    }
    v
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn gradient(width: u32, height: u32) -> PixelBuffer {
        let mut buf = PixelBuffer::with_size(width, height);
        for y in 0..height {
            for x in 0..width {
                buf.set_pixel_rgba(x as i32, y as i32, (x * 10) as u8, (y * 10) as u8, 7, 255);
            }
        }
        buf
    }

    #[test]
    fn test_pixel_center_returns_pixel() {
        let buf = gradient(4, 4);
        // Pixel (2, 1) lives at coordinate (2.5, 1.5)
        let v = sample_bilinear(&buf, 2.5, 1.5).unwrap();
        assert_eq!(v, [20.0, 10.0, 7.0, 255.0]);
    }

    #[test]
    fn test_integer_coordinate_averages_neighbors() {
        let buf = gradient(4, 4);
        let v = sample_bilinear(&buf, 2.0, 2.0).unwrap();
        assert!((v[0] - 15.0).abs() < 1e-4);
        assert!((v[1] - 15.0).abs() < 1e-4);
        assert!((v[3] - 255.0).abs() < 1e-3);
    }

    #[test]
    fn test_weights_for_quarter_offsets() {
        let w = BilinearWeights::at(1.75, 1.25);
        assert_eq!(w.x, [1, 2]);
        assert_eq!(w.y, [0, 1]);
        // Cell spans [1.25, 2.25] x [0.75, 1.75]
        assert!((w.w[0] - 0.75 * 0.25).abs() < 1e-6);
        assert!((w.w[1] - 0.75 * 0.75).abs() < 1e-6);
        assert!((w.w[2] - 0.25 * 0.75).abs() < 1e-6);
        assert!((w.w[3] - 0.25 * 0.25).abs() < 1e-6);
    }

    #[test]
    fn test_out_of_range_is_reported() {
        let buf = gradient(4, 4);
        assert!(matches!(
            sample_bilinear(&buf, 0.25, 2.0),
            Err(FilterError::OutOfBounds { .. })
        ));
        assert!(matches!(
            sample_bilinear(&buf, 2.0, 3.75),
            Err(FilterError::OutOfBounds { .. })
        ));
        assert!(matches!(
            sample_bilinear(&buf, f32::NAN, 2.0),
            Err(FilterError::OutOfBounds { .. })
        ));
    }

    #[test]
    fn test_clamp_axis_limits() {
        assert_eq!(clamp_axis(-3.0, 8), 1.0);
        assert_eq!(clamp_axis(1.0, 8), 1.0);
        assert_eq!(clamp_axis(4.2, 8), 4.2);
        assert_eq!(clamp_axis(7.5, 8), 7.0);
        assert_eq!(clamp_axis(100.0, 8), 7.0);
        // Two-pixel axis collapses onto the shared edge
        assert_eq!(clamp_axis(0.0, 2), 1.0);
        assert_eq!(clamp_axis(1.9, 2), 1.0);
    }

    proptest! {
        #[test]
        fn prop_weights_sum_to_one(fx in -1000.0f32..1000.0, fy in -1000.0f32..1000.0) {
            let w = BilinearWeights::at(fx, fy);
            prop_assert!((w.total() - 1.0).abs() < 1e-3);
            prop_assert!(w.w.iter().all(|&v| v >= -1e-4));
        }

        #[test]
        fn prop_clamped_coordinates_always_sample(
            fx in -50.0f32..50.0,
            fy in -50.0f32..50.0,
            width in 2u32..16,
            height in 2u32..16,
        ) {
            let buf = gradient(width, height);
            let x = clamp_axis(fx, width);
            let y = clamp_axis(fy, height);
            prop_assert!(sample_bilinear(&buf, x, y).is_ok());
        }
    }
}
