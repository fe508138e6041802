//! Error type shared by the filter passes

use std::fmt;

/// Errors raised by the polar passes, the sector mirror and the sampler
#[derive(Debug, Clone, PartialEq)]
pub enum FilterError {
    /// A caller-supplied value the passes cannot work with: negative power,
    /// non-finite angle, buffers smaller than 2x2, mismatched dimensions.
    InvalidParameter(String),
    /// A sample footprint left the source buffer. The public passes clamp
    /// their coordinates, so this indicates a broken internal invariant.
    OutOfBounds {
        x: f32,
        y: f32,
        width: u32,
        height: u32,
    },
}

impl FilterError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidParameter(msg.into())
    }
}

impl fmt::Display for FilterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidParameter(msg) => write!(f, "invalid parameter: {msg}"),
            Self::OutOfBounds {
                x,
                y,
                width,
                height,
            } => write!(
                f,
                "sample at ({x}, {y}) falls outside {width}x{height} buffer"
            ),
        }
    }
}

impl std::error::Error for FilterError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        let err = FilterError::invalid("power must be >= 0, got -1");
        assert_eq!(err.to_string(), "invalid parameter: power must be >= 0, got -1");

        let err = FilterError::OutOfBounds {
            x: 0.25,
            y: 3.0,
            width: 4,
            height: 4,
        };
        assert_eq!(err.to_string(), "sample at (0.25, 3) falls outside 4x4 buffer");
    }
}
