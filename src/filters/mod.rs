mod kaleidoscope;
pub mod mirror;
pub mod polar;
pub mod sampler;

pub use kaleidoscope::{kaleidoscope, Kaleidoscope, PolarView};
pub use mirror::{column_offset, mirror_sectors, reflect_sections, SectionPlan, SectorMirror};
pub use polar::{from_polar, max_radius, polar_forward, polar_inverse, to_polar, PolarOptions};
pub use sampler::{clamp_axis, sample_bilinear, BilinearWeights};

use crate::display::PixelBuffer;
use crate::error::FilterError;
use crate::params::EffectParameters;

/// Trait for in-place image filters driven by effect parameters
pub trait Filter {
    /// Filter `image` in place. On error the image contents are unspecified.
    fn apply(&mut self, image: &mut PixelBuffer, params: &EffectParameters)
        -> Result<(), FilterError>;

    /// Filter name for UI/debugging
    fn name(&self) -> &str;
}
