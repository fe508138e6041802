//! Procedural source images
//!
//! Inputs for the viewer and the benchmarks: the kaleidoscope needs something
//! with structure in both radius and angle to look like anything.

use crate::display::PixelBuffer;
use crate::util::{hsv_to_rgb, Rng};
use std::f32::consts::TAU;

// SMPTE color bar colors (75% intensity)
const BARS: [(u8, u8, u8); 7] = [
    (191, 191, 191),
    (191, 191, 0),
    (0, 191, 191),
    (0, 191, 0),
    (191, 0, 191),
    (191, 0, 0),
    (0, 0, 191),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pattern {
    ColorBars,
    Checkerboard,
    Xor,
    Plasma,
    Rings,
    Noise,
}

impl Pattern {
    pub const ALL: [Pattern; 6] = [
        Pattern::ColorBars,
        Pattern::Checkerboard,
        Pattern::Xor,
        Pattern::Plasma,
        Pattern::Rings,
        Pattern::Noise,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Pattern::ColorBars => "Color Bars",
            Pattern::Checkerboard => "Checkerboard",
            Pattern::Xor => "XOR",
            Pattern::Plasma => "Plasma",
            Pattern::Rings => "Rings",
            Pattern::Noise => "Noise",
        }
    }

    /// Render the pattern into a new opaque buffer
    pub fn render(&self, width: u32, height: u32) -> PixelBuffer {
        let mut buf = PixelBuffer::with_size(width, height);
        match self {
            Pattern::ColorBars => color_bars(&mut buf),
            Pattern::Checkerboard => checkerboard(&mut buf, 32, (255, 100, 50), (50, 100, 255)),
            Pattern::Xor => xor_pattern(&mut buf),
            Pattern::Plasma => plasma(&mut buf),
            Pattern::Rings => rings(&mut buf),
            Pattern::Noise => noise(&mut buf, 0x5EED),
        }
        buf
    }
}

fn fill(buf: &mut PixelBuffer, mut shade: impl FnMut(u32, u32) -> (u8, u8, u8)) {
    for y in 0..buf.height() {
        for x in 0..buf.width() {
            let (r, g, b) = shade(x, y);
            buf.set_pixel_rgba(x as i32, y as i32, r, g, b, 255);
        }
    }
}

/// Vertical bars over a hue ramp along the bottom third
fn color_bars(buf: &mut PixelBuffer) {
    let width = buf.width().max(1);
    let split = buf.height() * 2 / 3;
    fill(buf, |x, y| {
        if y < split {
            BARS[(x * BARS.len() as u32 / width) as usize]
        } else {
            hsv_to_rgb(x as f32 / width as f32 * 360.0, 0.8, 0.9)
        }
    });
}

fn checkerboard(buf: &mut PixelBuffer, tile_size: u32, c1: (u8, u8, u8), c2: (u8, u8, u8)) {
    fill(buf, |x, y| {
        if ((x / tile_size) + (y / tile_size)) % 2 == 0 {
            c1
        } else {
            c2
        }
    });
}

fn xor_pattern(buf: &mut PixelBuffer) {
    fill(buf, |x, y| {
        let v = (x ^ y) as u8;
        (v, v.wrapping_mul(3), 255 - v)
    });
}

/// Sum of sines mapped through the hue wheel
fn plasma(buf: &mut PixelBuffer) {
    let scale = TAU / buf.width().max(buf.height()).max(1) as f32;
    fill(buf, |x, y| {
        let fx = x as f32 * scale;
        let fy = y as f32 * scale;

        let v1 = (fx * 2.0).sin();
        let v2 = (fy * 3.0).sin();
        let v3 = ((fx + fy) * 1.5).sin();
        let v4 = ((fx * fx + fy * fy).sqrt() * 2.0).sin();

        let sum = (v1 + v2 + v3 + v4 + 4.0) / 8.0; // Normalize to 0-1
        hsv_to_rgb(sum * 360.0, 0.8, 0.9)
    });
}

/// Concentric rings with spokes, centered on the buffer
fn rings(buf: &mut PixelBuffer) {
    let cx = buf.width() as f32 / 2.0;
    let cy = buf.height() as f32 / 2.0;
    fill(buf, |x, y| {
        let dx = x as f32 - cx;
        let dy = y as f32 - cy;
        let d = (dx * dx + dy * dy).sqrt();
        let a = dy.atan2(dx);
        let ring = (d * 0.15).sin() * 0.5 + 0.5;
        let spoke = (a * 6.0).cos() * 0.5 + 0.5;
        hsv_to_rgb(d * 2.0, 0.6 + 0.4 * spoke, 0.3 + 0.7 * ring)
    });
}

fn noise(buf: &mut PixelBuffer, seed: u64) {
    let mut rng = Rng::new(seed);
    fill(buf, |_, _| (rng.next_u8(), rng.next_u8(), rng.next_u8()));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_patterns_render_opaque() {
        for pattern in Pattern::ALL {
            let buf = pattern.render(48, 32);
            assert_eq!((buf.width(), buf.height()), (48, 32));
            assert!(
                buf.as_bytes().chunks_exact(4).all(|px| px[3] == 255),
                "{} has transparent pixels",
                pattern.name()
            );
        }
    }

    #[test]
    fn test_noise_is_reproducible() {
        assert_eq!(Pattern::Noise.render(16, 16), Pattern::Noise.render(16, 16));
    }

    #[test]
    fn test_checkerboard_tiles() {
        let buf = Pattern::Checkerboard.render(64, 64);
        assert_eq!(buf.get_pixel_rgba(0, 0), Some((255, 100, 50, 255)));
        assert_eq!(buf.get_pixel_rgba(32, 0), Some((50, 100, 255, 255)));
        assert_eq!(buf.get_pixel_rgba(32, 32), Some((255, 100, 50, 255)));
    }
}
