//! Polar Transform
//!
//! Rectangular <-> polar resampling. In polar space the row index is the
//! radius (0..height maps to 0..max_radius) and the column index is the
//! angle (0..width maps to 0..360 degrees). Both directions sample through
//! the shared bilinear sampler.

use super::sampler::{clamp_axis, sample_bilinear};
use crate::display::PixelBuffer;
use crate::error::FilterError;
use crate::geometry::{length, Point};
use std::f32::consts::TAU;

/// Options shared by both polar passes
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PolarOptions {
    /// Center of the polar grid; `None` uses the buffer midpoint
    pub center: Option<Point>,
    /// Degrees added to every angle by the inverse pass (counterclockwise)
    pub rotation: f32,
}

impl PolarOptions {
    pub fn centered_at(center: Point) -> Self {
        Self {
            center: Some(center),
            rotation: 0.0,
        }
    }

    pub fn with_rotation(mut self, degrees: f32) -> Self {
        self.rotation = degrees;
        self
    }

    /// Center and max radius of the polar grid. A center so far away that
    /// the radius overflows is rejected along with non-finite ones.
    fn resolve_grid(&self, width: u32, height: u32) -> Result<(Point, f32), FilterError> {
        let center = self.center.unwrap_or_else(|| Point::center_of(width, height));
        if !center.is_finite() {
            return Err(FilterError::invalid(format!(
                "polar center must be finite, got ({}, {})",
                center.x, center.y
            )));
        }
        let r_max = max_radius(width, height, center);
        if !r_max.is_finite() {
            return Err(FilterError::invalid(format!(
                "polar center ({}, {}) is too far from the buffer",
                center.x, center.y
            )));
        }
        Ok((center, r_max))
    }
}

/// Distance from `center` to the farther of the (0,0) and (width,height) corners.
/// Radius `height` in polar space maps to this distance.
pub fn max_radius(width: u32, height: u32, center: Point) -> f32 {
    let to_origin = length(center.x, center.y);
    let to_far = length(width as f32 - center.x, height as f32 - center.y);
    to_origin.max(to_far)
}

/// Both passes need at least two pixels per axis for a bilinear footprint
/// and identically sized source and destination.
fn check_pass_buffers(src: &PixelBuffer, dst: &PixelBuffer) -> Result<(), FilterError> {
    if src.width() < 2 || src.height() < 2 {
        return Err(FilterError::invalid(format!(
            "polar transform needs at least 2x2 pixels, got {}x{}",
            src.width(),
            src.height()
        )));
    }
    if !src.same_size(dst) {
        return Err(FilterError::invalid(format!(
            "source is {}x{} but destination is {}x{}",
            src.width(),
            src.height(),
            dst.width(),
            dst.height()
        )));
    }
    Ok(())
}

/// Resample a rectangular image into polar space.
///
/// Destination pixel (theta, radius) receives the source sampled at
/// `center + max_radius * radius / height * (cos, sin)(theta * 360 / width)`.
pub fn to_polar(
    src: &PixelBuffer,
    dst: &mut PixelBuffer,
    opts: &PolarOptions,
) -> Result<(), FilterError> {
    check_pass_buffers(src, dst)?;
    let width = src.width();
    let height = src.height();
    let (center, r_max) = opts.resolve_grid(width, height)?;

    // One (cos, sin) per destination column
    let step = TAU / width as f32;
    let angles: Vec<(f32, f32)> = (0..width)
        .map(|theta| {
            let a = theta as f32 * step;
            (a.cos(), a.sin())
        })
        .collect();

    for radius in 0..height {
        let r = r_max * radius as f32 / height as f32;
        for (theta, &(cos, sin)) in angles.iter().enumerate() {
            let x = clamp_axis(center.x + r * cos, width);
            let y = clamp_axis(center.y + r * sin, height);
            let value = sample_bilinear(src, x, y)?;
            dst.store_pixel(theta as u32, radius, value);
        }
    }

    tracing::trace!(width, height, r_max, "rectangular -> polar");
    Ok(())
}

/// Resample a polar image back into rectangular space.
///
/// Destination pixel (x, y) samples the polar source at column
/// `(atan2(dy, dx) + rotation) mod 360 * width / 360` and row
/// `|(dx, dy)| * height / max_radius`, with `(dx, dy) = (x, y) - center`.
pub fn from_polar(
    src: &PixelBuffer,
    dst: &mut PixelBuffer,
    opts: &PolarOptions,
) -> Result<(), FilterError> {
    check_pass_buffers(src, dst)?;
    if !opts.rotation.is_finite() {
        return Err(FilterError::invalid(format!(
            "polar rotation must be finite, got {}",
            opts.rotation
        )));
    }
    let width = src.width();
    let height = src.height();
    let (center, r_max) = opts.resolve_grid(width, height)?;

    let phase = opts.rotation.rem_euclid(360.0);
    let radius_scale = height as f32 / r_max;
    let column_scale = width as f32 / 360.0;

    for y in 0..height {
        let dy = y as f32 - center.y;
        for x in 0..width {
            let dx = x as f32 - center.x;
            let radius = length(dx, dy) * radius_scale;
            let theta = (dy.atan2(dx).to_degrees() + 360.0 + phase).rem_euclid(360.0);
            let column = theta * column_scale;

            let value = sample_bilinear(
                src,
                clamp_axis(column, width),
                clamp_axis(radius, height),
            )?;
            dst.store_pixel(x, y, value);
        }
    }

    tracing::trace!(width, height, r_max, rotation = phase, "polar -> rectangular");
    Ok(())
}

/// Polar image of `src` in a newly allocated buffer of the same size
pub fn polar_forward(src: &PixelBuffer, center: Option<Point>) -> Result<PixelBuffer, FilterError> {
    let mut dst = PixelBuffer::with_size(src.width(), src.height());
    to_polar(
        src,
        &mut dst,
        &PolarOptions {
            center,
            rotation: 0.0,
        },
    )?;
    Ok(dst)
}

/// Rectangular image of polar `src` in a newly allocated buffer of the same size
pub fn polar_inverse(
    src: &PixelBuffer,
    rotation: Option<f32>,
    center: Option<Point>,
) -> Result<PixelBuffer, FilterError> {
    let mut dst = PixelBuffer::with_size(src.width(), src.height());
    from_polar(
        src,
        &mut dst,
        &PolarOptions {
            center,
            rotation: rotation.unwrap_or(0.0),
        },
    )?;
    Ok(dst)
}
