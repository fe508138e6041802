//! Kaleidoscope Effect
//!
//! rectangular -> polar, sector mirror in polar space, polar -> rectangular.
//! The image is filtered in place; the intermediate polar buffer comes from
//! the filter's own scratch pool and is returned to it after every call.

use super::mirror::{SectionPlan, SectorMirror};
use super::polar::{from_polar, to_polar, PolarOptions};
use super::Filter;
use crate::display::PixelBuffer;
use crate::error::FilterError;
use crate::params::EffectParameters;
use crate::scratch::ScratchPool;

/// Kaleidoscope filter with a reusable scratch pool
#[derive(Debug, Default)]
pub struct Kaleidoscope {
    pool: ScratchPool,
    mirror: SectorMirror,
}

impl Kaleidoscope {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run the effect and report the section plan that was used.
    ///
    /// A rounded power of 0 leaves the image untouched. A buffer too narrow
    /// for one 9-column sector still goes through both polar passes and the
    /// sector rotation, with no reflections.
    pub fn render(
        &mut self,
        image: &mut PixelBuffer,
        params: &EffectParameters,
    ) -> Result<SectionPlan, FilterError> {
        let power = params.rounded_power()?;
        let angle = params.rounded_angle()?;
        if !params.polar_rotation.is_finite() {
            return Err(FilterError::invalid(format!(
                "polar rotation must be finite, got {}",
                params.polar_rotation
            )));
        }
        if power == 0 {
            return Ok(SectionPlan {
                section_size: image.width(),
                power: 0,
            });
        }
        if image.width() < 2 || image.height() < 2 {
            return Err(FilterError::invalid(format!(
                "kaleidoscope needs at least 2x2 pixels, got {}x{}",
                image.width(),
                image.height()
            )));
        }

        let forward = PolarOptions {
            center: params.polar_center,
            rotation: 0.0,
        };
        let inverse = PolarOptions {
            center: params.polar_center,
            rotation: params.polar_rotation,
        };

        let mut polar = self.pool.checkout(image.width(), image.height());
        let result = run_passes(&mut self.mirror, image, &mut polar, power, angle, &forward, &inverse);
        self.pool.give_back(polar);
        result
    }
}

fn run_passes(
    mirror: &mut SectorMirror,
    image: &mut PixelBuffer,
    polar: &mut PixelBuffer,
    power: u32,
    angle: i32,
    forward: &PolarOptions,
    inverse: &PolarOptions,
) -> Result<SectionPlan, FilterError> {
    to_polar(image, polar, forward)?;
    let plan = mirror.apply(polar, power, angle);
    from_polar(polar, image, inverse)?;
    Ok(plan)
}

impl Filter for Kaleidoscope {
    fn apply(&mut self, image: &mut PixelBuffer, params: &EffectParameters) -> Result<(), FilterError> {
        self.render(image, params).map(|_| ())
    }

    fn name(&self) -> &str {
        "Kaleidoscope"
    }
}

/// One-shot kaleidoscope: filters `image` in place.
///
/// `power` < 0 and non-finite `angle_degrees` are rejected; `power` == 0
/// leaves the image unchanged.
pub fn kaleidoscope(
    image: &mut PixelBuffer,
    power: i32,
    angle_degrees: f32,
) -> Result<(), FilterError> {
    if power < 0 {
        return Err(FilterError::invalid(format!("power must be >= 0, got {power}")));
    }
    let params = EffectParameters::new(power as f32, angle_degrees);
    Kaleidoscope::new().apply(image, &params)
}

/// Shows the intermediate polar image (angle across, radius down)
#[derive(Debug, Default)]
pub struct PolarView {
    pool: ScratchPool,
}

impl PolarView {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Filter for PolarView {
    fn apply(&mut self, image: &mut PixelBuffer, params: &EffectParameters) -> Result<(), FilterError> {
        let mut polar = self.pool.checkout(image.width(), image.height());
        let opts = PolarOptions {
            center: params.polar_center,
            rotation: 0.0,
        };
        let result = to_polar(image, &mut polar, &opts).and_then(|()| image.copy_from(&polar));
        self.pool.give_back(polar);
        result
    }

    fn name(&self) -> &str {
        "Polar View"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filters::{mirror_sectors, polar_forward, polar_inverse};
    use crate::geometry::Point;
    use crate::pattern::Pattern;
    use proptest::prelude::*;

    #[test]
    fn test_power_zero_is_exact_noop() {
        let original = Pattern::Plasma.render(64, 48);
        for angle in [0.0, 45.0, -720.0, 1234.5] {
            let mut image = original.clone();
            kaleidoscope(&mut image, 0, angle).unwrap();
            assert_eq!(image, original);
        }
    }

    #[test]
    fn test_fractional_power_below_half_is_noop() {
        let original = Pattern::Xor.render(64, 48);
        let mut image = original.clone();
        Kaleidoscope::new()
            .apply(&mut image, &EffectParameters::new(0.4, 30.0))
            .unwrap();
        assert_eq!(image, original);
    }

    #[test]
    fn test_invalid_parameters() {
        let mut image = Pattern::Rings.render(32, 32);
        assert!(matches!(
            kaleidoscope(&mut image, -1, 0.0),
            Err(FilterError::InvalidParameter(_))
        ));
        assert!(matches!(
            kaleidoscope(&mut image, 2, f32::NAN),
            Err(FilterError::InvalidParameter(_))
        ));
        let mut params = EffectParameters::new(2.0, 0.0);
        params.polar_rotation = f32::INFINITY;
        assert!(Kaleidoscope::new().apply(&mut image, &params).is_err());
    }

    #[test]
    fn test_degenerate_buffer_is_rejected() {
        let mut tiny = PixelBuffer::with_size(1, 1);
        assert!(matches!(
            kaleidoscope(&mut tiny, 2, 0.0),
            Err(FilterError::InvalidParameter(_))
        ));
        // Power 0 is still a no-op on any size
        assert!(kaleidoscope(&mut tiny, 0, 0.0).is_ok());
    }

    #[test]
    fn test_narrow_image_runs_both_passes() {
        // 16 columns: section sizing drops power 1 to 0, but the image still
        // goes forward, gets its seed sector rotated, and comes back.
        let original = Pattern::Plasma.render(16, 16);
        let mut image = original.clone();
        let plan = Kaleidoscope::new()
            .render(&mut image, &EffectParameters::new(1.0, 90.0))
            .unwrap();
        assert!(!plan.reflects());
        assert_ne!(image, original);

        let mut polar = polar_forward(&original, None).unwrap();
        mirror_sectors(&mut polar, 1, 90);
        let expected = polar_inverse(&polar, None, None).unwrap();
        assert_eq!(image, expected);
    }

    #[test]
    fn test_effect_changes_image_and_reports_plan() {
        let original = Pattern::ColorBars.render(128, 96);
        let mut image = original.clone();
        let plan = Kaleidoscope::new()
            .render(&mut image, &EffectParameters::new(2.0, 0.0))
            .unwrap();
        assert_eq!(
            plan,
            SectionPlan {
                section_size: 32,
                power: 2
            }
        );
        assert_ne!(image, original);
        assert!(image.as_bytes().chunks_exact(4).all(|px| px[3] == 255));
    }

    #[test]
    fn test_mirror_axis_is_symmetric_in_output() {
        // Power 1 reflects columns 0..32 onto 32..64 in polar space, so the
        // result is symmetric about the horizontal line through the center.
        // Angles stay clear of the 0/180 degree seams for y in 4..28.
        let mut image = Pattern::Noise.render(64, 64);
        kaleidoscope(&mut image, 1, 0.0).unwrap();
        let mut worst = 0;
        for y in 4..28u32 {
            for x in 4..60u32 {
                let a = image.get_pixel_rgba(x as i32, y as i32).unwrap();
                let b = image.get_pixel_rgba(x as i32, (64 - y) as i32).unwrap();
                worst = worst.max(a.0.abs_diff(b.0)).max(a.1.abs_diff(b.1));
            }
        }
        assert!(worst <= 2, "mirror halves differ by {}", worst);
    }

    #[test]
    fn test_scratch_buffer_returns_to_pool() {
        let mut filter = Kaleidoscope::new();
        let mut image = Pattern::Rings.render(40, 30);
        filter.apply(&mut image, &EffectParameters::default()).unwrap();
        assert_eq!(filter.pool.idle(), 1);
        filter.apply(&mut image, &EffectParameters::default()).unwrap();
        assert_eq!(filter.pool.idle(), 1);
    }

    #[test]
    fn test_custom_center_and_rotation() {
        let mut image = Pattern::Plasma.render(48, 48);
        let params = EffectParameters {
            power: 2.0,
            angle: 10.0,
            polar_center: Some(Point::new(12.0, 30.0)),
            polar_rotation: 90.0,
        };
        Kaleidoscope::new().apply(&mut image, &params).unwrap();
    }

    #[test]
    fn test_unreachable_center_is_invalid_parameter() {
        let mut image = Pattern::Plasma.render(32, 32);
        let params = EffectParameters {
            polar_center: Some(Point::new(1e30, 1e30)),
            ..EffectParameters::default()
        };
        assert!(matches!(
            Kaleidoscope::new().apply(&mut image, &params),
            Err(FilterError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_polar_view_matches_forward_pass() {
        let source = Pattern::Rings.render(32, 24);
        let mut image = source.clone();
        PolarView::new()
            .apply(&mut image, &EffectParameters::default())
            .unwrap();
        let expected = polar_forward(&source, None).unwrap();
        assert_eq!(image, expected);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn prop_angle_period_is_360(angle in -720i32..720, power in 1i32..4) {
            let source = Pattern::Plasma.render(48, 24);
            let mut a = source.clone();
            let mut b = source;
            kaleidoscope(&mut a, power, angle as f32).unwrap();
            kaleidoscope(&mut b, power, (angle + 360) as f32).unwrap();
            prop_assert_eq!(a, b);
        }
    }
}
