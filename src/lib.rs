//! Kaleidoscope filter for RGBA8 pixel buffers.
//!
//! The image is remapped into polar space (angle across, radius down), one
//! angular wedge is rotated into place and mirrored `2^power` times, and the
//! result is mapped back to rectangular coordinates. Both remaps sample with
//! a bilinear 1x1 footprint.
//!
//! ```no_run
//! use kaleidoscope::{kaleidoscope, pattern::Pattern};
//!
//! let mut image = Pattern::Plasma.render(640, 480);
//! kaleidoscope(&mut image, 3, 45.0)?;
//! # Ok::<(), kaleidoscope::FilterError>(())
//! ```

pub mod control;
pub mod display;
pub mod error;
pub mod filters;
pub mod geometry;
pub mod host;
pub mod mqtt;
pub mod params;
pub mod pattern;
pub mod scratch;
pub mod util;

pub use display::PixelBuffer;
pub use error::FilterError;
pub use filters::{kaleidoscope, polar_forward, polar_inverse, Filter, Kaleidoscope, PolarView};
pub use geometry::Point;
pub use host::{FilteredImage, ParameterSource};
pub use params::{EffectParameters, ParamUpdate};
pub use scratch::ScratchPool;
