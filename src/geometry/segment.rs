use crate::error::{GeometryError, Result};
use crate::math::{Point3, Vector3, TOLERANCE};

/// A bounded line segment in 3D space.
///
/// The parametric form is `P(t) = start + t * (end - start)` with
/// `t` in `[0, 1]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    start: Point3,
    end: Point3,
}

impl Segment {
    /// Creates a new segment between two points.
    ///
    /// # Errors
    ///
    /// Returns an error if the segment is degenerate (zero length).
    pub fn new(start: Point3, end: Point3) -> Result<Self> {
        if (end - start).norm() < TOLERANCE {
            return Err(GeometryError::Degenerate("zero-length segment".into()).into());
        }
        Ok(Self { start, end })
    }

    /// Returns the start point.
    #[must_use]
    pub fn start(&self) -> &Point3 {
        &self.start
    }

    /// Returns the end point.
    #[must_use]
    pub fn end(&self) -> &Point3 {
        &self.end
    }

    /// Returns the length of the segment.
    #[must_use]
    pub fn length(&self) -> f64 {
        (self.end - self.start).norm()
    }

    /// Returns the unit direction from start to end.
    ///
    /// The constructor guarantees a non-zero length, so this is total.
    #[must_use]
    pub fn direction(&self) -> Vector3 {
        (self.end - self.start).normalize()
    }

    /// Evaluates the segment at normalized parameter `t`.
    #[must_use]
    pub fn point_at(&self, t: f64) -> Point3 {
        self.start + (self.end - self.start) * t
    }

    /// Returns the midpoint of the segment.
    #[must_use]
    pub fn midpoint(&self) -> Point3 {
        nalgebra::center(&self.start, &self.end)
    }

    /// Returns the normalized parameter of the point on the segment
    /// closest to `point`, clamped to `[0, 1]`.
    #[must_use]
    pub fn closest_param(&self, point: &Point3) -> f64 {
        let d = self.end - self.start;
        let t = (point - self.start).dot(&d) / d.dot(&d);
        t.clamp(0.0, 1.0)
    }

    /// Returns a copy of the segment with its endpoints pushed outward
    /// along the segment direction by the given non-negative deltas.
    #[must_use]
    pub fn extended(&self, start_delta: f64, end_delta: f64) -> Self {
        let u = self.direction();
        Self {
            start: self.start - u * start_delta,
            end: self.end + u * end_delta,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn rejects_zero_length() {
        let p = Point3::new(1.0, 2.0, 3.0);
        assert!(Segment::new(p, p).is_err());
    }

    #[test]
    fn direction_is_unit() {
        let s = Segment::new(Point3::origin(), Point3::new(0.0, 0.0, 4.0)).unwrap();
        assert_relative_eq!(s.direction().norm(), 1.0, epsilon = 1e-12);
        assert_relative_eq!(s.length(), 4.0, epsilon = 1e-12);
    }

    #[test]
    fn closest_param_clamps() {
        let s = Segment::new(Point3::origin(), Point3::new(10.0, 0.0, 0.0)).unwrap();
        assert!((s.closest_param(&Point3::new(5.0, 3.0, 0.0)) - 0.5).abs() < 1e-12);
        assert!(s.closest_param(&Point3::new(-5.0, 0.0, 0.0)).abs() < 1e-12);
        assert!((s.closest_param(&Point3::new(15.0, 0.0, 0.0)) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn extended_pushes_both_ends() {
        let s = Segment::new(Point3::origin(), Point3::new(10.0, 0.0, 0.0)).unwrap();
        let e = s.extended(1.0, 2.0);
        assert!((e.start().x + 1.0).abs() < 1e-12);
        assert!((e.end().x - 12.0).abs() < 1e-12);
    }
}
