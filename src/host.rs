//! Host-side seam
//!
//! The host owns the parameters and decides when they change. It hands the
//! filter a way to read the current parameters and tells the cached output it
//! is stale out of band; the output is recomputed only on the next read.

use crate::display::PixelBuffer;
use crate::error::FilterError;
use crate::filters::Filter;
use crate::params::EffectParameters;

/// Read the current effect parameters
pub trait ParameterSource {
    fn parameters(&self) -> EffectParameters;
}

impl ParameterSource for EffectParameters {
    fn parameters(&self) -> EffectParameters {
        *self
    }
}

impl<F> ParameterSource for F
where
    F: Fn() -> EffectParameters,
{
    fn parameters(&self) -> EffectParameters {
        self()
    }
}

/// An unfiltered source image and its cached filtered output
pub struct FilteredImage {
    source: PixelBuffer,
    output: PixelBuffer,
    up_to_date: bool,
}

impl FilteredImage {
    pub fn new(source: PixelBuffer) -> Self {
        Self {
            output: source.clone(),
            source,
            up_to_date: false,
        }
    }

    pub fn source(&self) -> &PixelBuffer {
        &self.source
    }

    /// Replace the source image; the output is stale afterwards
    pub fn set_source(&mut self, source: PixelBuffer) {
        self.source = source;
        self.mark_stale();
    }

    /// Parameters changed; recompute on the next `output` call
    pub fn mark_stale(&mut self) {
        self.up_to_date = false;
    }

    pub fn is_stale(&self) -> bool {
        !self.up_to_date
    }

    /// Last filtered output, if it is still current
    pub fn cached(&self) -> Option<&PixelBuffer> {
        self.up_to_date.then_some(&self.output)
    }

    /// Filtered image, re-running `filter` on a fresh copy of the source if stale.
    /// A failed run leaves the output stale.
    pub fn output<F, S>(&mut self, filter: &mut F, params: &S) -> Result<&PixelBuffer, FilterError>
    where
        F: Filter + ?Sized,
        S: ParameterSource + ?Sized,
    {
        if !self.up_to_date {
            self.output.clone_from(&self.source);
            filter.apply(&mut self.output, &params.parameters())?;
            self.up_to_date = true;
            tracing::trace!(filter = filter.name(), "filtered image refreshed");
        }
        Ok(&self.output)
    }
}
