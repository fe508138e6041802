//! Sector Mirror
//!
//! Builds the kaleidoscope pattern in polar space. A wedge of columns
//! (one angular sector) is rotated to column 0, then reflected onto itself
//! `power` times, doubling the mirrored span each time, so the wedge is
//! repeated `2^power` times around the full sweep.

use crate::display::{PixelBuffer, CHANNELS};

/// Sectors narrower than this many columns are widened (and the power lowered)
pub const MIN_SECTION_WIDTH: f64 = 8.0;

/// Past this every `u32` width has already shrunk below `MIN_SECTION_WIDTH`
const MAX_USEFUL_POWER: u32 = 32;

/// Width of the seed sector and the number of doublings that will actually run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectionPlan {
    pub section_size: u32,
    pub power: u32,
}

impl SectionPlan {
    /// Start from `width / 2^power` and double while the sector is
    /// `MIN_SECTION_WIDTH` columns or narrower, dropping one power per doubling.
    pub fn new(width: u32, requested_power: u32) -> Self {
        if width == 0 {
            return Self {
                section_size: 0,
                power: 0,
            };
        }

        let mut power = requested_power.min(MAX_USEFUL_POWER) as i32;
        let mut size = f64::from(width) / 2f64.powi(power);
        while size <= MIN_SECTION_WIDTH {
            size *= 2.0;
            power -= 1;
        }

        Self {
            section_size: size.ceil() as u32,
            power: power.max(0) as u32,
        }
    }

    /// False when the buffer is too narrow for even one reflection;
    /// the seed sector is still rotated into place.
    pub fn reflects(&self) -> bool {
        self.power > 0
    }
}

/// Column offset selected by `angle`: floor(width * (angle mod 360) / 360)
pub fn column_offset(width: u32, angle_degrees: i32) -> u32 {
    let angle = u64::from(angle_degrees.rem_euclid(360).unsigned_abs());
    (u64::from(width) * angle / 360) as u32
}

/// Sector mirror with a reusable row buffer for the in-place rotation
#[derive(Debug, Default)]
pub struct SectorMirror {
    row: Vec<u8>,
}

impl SectorMirror {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run the rotation and the reflections on a polar buffer.
    /// Returns the plan that was applied. A requested power of 0 leaves the
    /// buffer untouched; a power reduced to 0 by section sizing still rotates.
    pub fn apply(&mut self, polar: &mut PixelBuffer, power: u32, angle_degrees: i32) -> SectionPlan {
        let plan = SectionPlan::new(polar.width(), power);
        if power == 0 {
            return plan;
        }
        if plan.power < power {
            tracing::debug!(
                width = polar.width(),
                requested = power,
                effective = plan.power,
                "sector too narrow, reduced power"
            );
        }

        let offset = column_offset(polar.width(), angle_degrees);
        self.rotate_columns(polar, offset, plan.section_size);
        reflect_sections(polar, &plan);
        plan
    }

    /// Every row: columns `0..=count` receive source column `(x + offset) mod width`.
    ///
    /// The row is snapshotted first so no read sees an already rotated pixel.
    pub fn rotate_columns(&mut self, polar: &mut PixelBuffer, offset: u32, count: u32) {
        let width = polar.width() as usize;
        if width == 0 || offset as usize % width == 0 {
            return;
        }
        let last = (count as usize).min(width - 1);

        for y in 0..polar.height() {
            let row = polar.row_mut(y);
            self.row.clear();
            self.row.extend_from_slice(row);

            for x in 0..=last {
                let src = (x + offset as usize) % width * CHANNELS;
                let dst = x * CHANNELS;
                row[dst..dst + CHANNELS].copy_from_slice(&self.row[src..src + CHANNELS]);
            }
        }
    }
}

/// Every row: reflect columns `[0, s)` onto `[s, 2s)` so column `2s - 1 - x`
/// receives column `x`, then double `s`; `plan.power` times. Writes past the
/// row end are dropped.
pub fn reflect_sections(polar: &mut PixelBuffer, plan: &SectionPlan) {
    let width = polar.width() as usize;

    for y in 0..polar.height() {
        let row = polar.row_mut(y);
        let mut section = plan.section_size as usize;

        for _ in 0..plan.power {
            if section == 0 || section >= width {
                break;
            }
            let (head, tail) = row.split_at_mut(section * CHANNELS);
            let span = section.min(width - section);
            for k in 0..span {
                let src = (section - 1 - k) * CHANNELS;
                let dst = k * CHANNELS;
                tail[dst..dst + CHANNELS].copy_from_slice(&head[src..src + CHANNELS]);
            }
            section *= 2;
        }
    }
}

/// Rotate and reflect `polar` in place with a throwaway row buffer
pub fn mirror_sectors(polar: &mut PixelBuffer, power: u32, angle_degrees: i32) -> SectionPlan {
    SectorMirror::new().apply(polar, power, angle_degrees)
}
