//! Geometry utilities for the polar transform

use serde::{Deserialize, Serialize};

/// A point in buffer space (pixels, origin top-left)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Midpoint of a width x height buffer
    pub fn center_of(width: u32, height: u32) -> Self {
        Self::new(width as f32 / 2.0, height as f32 / 2.0)
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    pub fn distance_to(&self, other: &Point) -> f32 {
        length(self.x - other.x, self.y - other.y)
    }
}

/// Get the length of a vector
#[inline]
pub fn length(x: f32, y: f32) -> f32 {
    (x * x + y * y).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_center_of() {
        assert_eq!(Point::center_of(640, 480), Point::new(320.0, 240.0));
        assert_eq!(Point::center_of(5, 3), Point::new(2.5, 1.5));
    }

    #[test]
    fn test_distance() {
        let a = Point::new(1.0, 1.0);
        let b = Point::new(4.0, 5.0);
        assert_eq!(a.distance_to(&b), 5.0);
        assert_eq!(length(3.0, 4.0), 5.0);
    }

    #[test]
    fn test_finite() {
        assert!(Point::new(0.0, 2.0).is_finite());
        assert!(!Point::new(f32::NAN, 2.0).is_finite());
        assert!(!Point::new(1.0, f32::INFINITY).is_finite());
    }
}
