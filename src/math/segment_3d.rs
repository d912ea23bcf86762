use super::{Point3, Vector3, TOLERANCE};

/// Result of a segment-segment closest approach computation.
///
/// Parameters are normalized to `[0, 1]` along each segment.
#[derive(Debug, Clone, Copy)]
pub struct SegmentClosest {
    /// Parameter of the closest point on the first segment.
    pub ta: f64,
    /// Parameter of the closest point on the second segment.
    pub tb: f64,
    /// Closest point on the first segment.
    pub pa: Point3,
    /// Closest point on the second segment.
    pub pb: Point3,
    /// Distance between the two closest points.
    pub distance: f64,
}

impl SegmentClosest {
    /// Midpoint of the two closest-approach points.
    #[must_use]
    pub fn midpoint(&self) -> Point3 {
        nalgebra::center(&self.pa, &self.pb)
    }
}

/// Computes the closest approach between two bounded segments.
///
/// Clamps both parameters to `[0, 1]`; degenerate (zero-length) segments
/// collapse to their start point.
#[must_use]
pub fn segment_segment_closest(
    a0: &Point3,
    a1: &Point3,
    b0: &Point3,
    b1: &Point3,
) -> SegmentClosest {
    let d1 = a1 - a0;
    let d2 = b1 - b0;
    let r = a0 - b0;
    let a = d1.dot(&d1);
    let e = d2.dot(&d2);
    let f = d2.dot(&r);

    let (s, t) = if a < TOLERANCE && e < TOLERANCE {
        (0.0, 0.0)
    } else if a < TOLERANCE {
        (0.0, (f / e).clamp(0.0, 1.0))
    } else {
        let c = d1.dot(&r);
        if e < TOLERANCE {
            ((-c / a).clamp(0.0, 1.0), 0.0)
        } else {
            let b = d1.dot(&d2);
            let denom = a.mul_add(e, -(b * b));

            // Parallel segments have denom ~ 0; pick s = 0 and let the
            // clamping below locate the nearest point on the other segment.
            let mut s = if denom > TOLERANCE {
                (b.mul_add(f, -(c * e)) / denom).clamp(0.0, 1.0)
            } else {
                0.0
            };
            let mut t = b.mul_add(s, f) / e;

            if t < 0.0 {
                t = 0.0;
                s = (-c / a).clamp(0.0, 1.0);
            } else if t > 1.0 {
                t = 1.0;
                s = ((b - c) / a).clamp(0.0, 1.0);
            }
            (s, t)
        }
    };

    let pa = a0 + d1 * s;
    let pb = b0 + d2 * t;
    SegmentClosest {
        ta: s,
        tb: t,
        pa,
        pb,
        distance: (pa - pb).norm(),
    }
}

/// Returns `true` when two unit directions are parallel or anti-parallel.
#[must_use]
pub fn directions_parallel(da: &Vector3, db: &Vector3) -> bool {
    da.cross(db).norm() < 1e-8
}

/// Returns `true` when the second segment lies on the carrier line of the
/// first, within `lateral_tolerance`.
#[must_use]
pub fn segments_collinear(
    a0: &Point3,
    a1: &Point3,
    b0: &Point3,
    b1: &Point3,
    lateral_tolerance: f64,
) -> bool {
    let d = a1 - a0;
    let len = d.norm();
    if len < TOLERANCE {
        return false;
    }
    let u = d / len;
    let off0 = (b0 - a0) - u * (b0 - a0).dot(&u);
    let off1 = (b1 - a0) - u * (b1 - a0).dot(&u);
    off0.norm() <= lateral_tolerance && off1.norm() <= lateral_tolerance
}

/// Length by which the second segment's span overlaps the first's when
/// both are projected onto the first segment's direction. Negative for
/// disjoint spans (the gap length).
#[must_use]
pub fn projected_span_overlap(a0: &Point3, a1: &Point3, b0: &Point3, b1: &Point3) -> f64 {
    let d = a1 - a0;
    let len = d.norm();
    if len < TOLERANCE {
        return 0.0;
    }
    let u = d / len;
    let t0 = (b0 - a0).dot(&u);
    let t1 = (b1 - a0).dot(&u);
    let (lo, hi) = if t0 <= t1 { (t0, t1) } else { (t1, t0) };

    hi.min(len) - lo.max(0.0)
}

/// Returns `true` when the projected spans of two collinear segments
/// overlap by more than `overlap_tolerance` (endpoint contact does not
/// count as overlap).
#[must_use]
pub fn collinear_span_overlap(
    a0: &Point3,
    a1: &Point3,
    b0: &Point3,
    b1: &Point3,
    overlap_tolerance: f64,
) -> bool {
    projected_span_overlap(a0, a1, b0, b1) > overlap_tolerance.max(TOLERANCE)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn p(x: f64, y: f64, z: f64) -> Point3 {
        Point3::new(x, y, z)
    }

    // ── segment_segment_closest ──

    #[test]
    fn crossing_segments_meet_at_interior_point() {
        let cl = segment_segment_closest(
            &p(0.0, 0.0, 0.0),
            &p(2.0, 0.0, 0.0),
            &p(1.0, -1.0, 0.0),
            &p(1.0, 1.0, 0.0),
        );
        assert!((cl.ta - 0.5).abs() < 1e-10, "ta={}", cl.ta);
        assert!((cl.tb - 0.5).abs() < 1e-10, "tb={}", cl.tb);
        assert!(cl.distance < 1e-10);
        assert!((cl.midpoint() - p(1.0, 0.0, 0.0)).norm() < 1e-10);
    }

    #[test]
    fn skew_segments_report_gap() {
        let cl = segment_segment_closest(
            &p(0.0, 0.0, 0.0),
            &p(2.0, 0.0, 0.0),
            &p(1.0, -1.0, 0.5),
            &p(1.0, 1.0, 0.5),
        );
        assert_relative_eq!(cl.distance, 0.5, epsilon = 1e-10);
        assert_relative_eq!(cl.ta, 0.5, epsilon = 1e-10);
    }

    #[test]
    fn endpoint_to_endpoint() {
        let cl = segment_segment_closest(
            &p(0.0, 0.0, 0.0),
            &p(1.0, 0.0, 0.0),
            &p(1.0, 0.0, 0.0),
            &p(1.0, 1.0, 0.0),
        );
        assert!((cl.ta - 1.0).abs() < 1e-10);
        assert!(cl.tb.abs() < 1e-10);
        assert!(cl.distance < 1e-10);
    }

    #[test]
    fn clamped_beyond_segment_end() {
        // Second segment's closest point lies past the first one's end.
        let cl = segment_segment_closest(
            &p(0.0, 0.0, 0.0),
            &p(1.0, 0.0, 0.0),
            &p(3.0, -1.0, 0.0),
            &p(3.0, 1.0, 0.0),
        );
        assert!((cl.ta - 1.0).abs() < 1e-10);
        assert!((cl.distance - 2.0).abs() < 1e-10);
    }

    #[test]
    fn degenerate_first_segment() {
        let cl = segment_segment_closest(
            &p(0.0, 3.0, 0.0),
            &p(0.0, 3.0, 0.0),
            &p(-1.0, 0.0, 0.0),
            &p(1.0, 0.0, 0.0),
        );
        assert_relative_eq!(cl.distance, 3.0, epsilon = 1e-10);
        assert_relative_eq!(cl.tb, 0.5, epsilon = 1e-10);
    }

    // ── collinearity / overlap ──

    #[test]
    fn collinear_segments_detected() {
        assert!(segments_collinear(
            &p(0.0, 0.0, 0.0),
            &p(1.0, 0.0, 0.0),
            &p(2.0, 0.0, 0.0),
            &p(3.0, 0.0, 0.0),
            1e-6,
        ));
    }

    #[test]
    fn offset_parallel_segments_not_collinear() {
        assert!(!segments_collinear(
            &p(0.0, 0.0, 0.0),
            &p(1.0, 0.0, 0.0),
            &p(0.0, 0.5, 0.0),
            &p(1.0, 0.5, 0.0),
            1e-6,
        ));
    }

    #[test]
    fn end_to_end_contact_is_not_overlap() {
        assert!(!collinear_span_overlap(
            &p(0.0, 0.0, 0.0),
            &p(1.0, 0.0, 0.0),
            &p(1.0, 0.0, 0.0),
            &p(2.0, 0.0, 0.0),
            1e-6,
        ));
    }

    #[test]
    fn interior_containment_is_overlap() {
        assert!(collinear_span_overlap(
            &p(0.0, 0.0, 0.0),
            &p(3.0, 0.0, 0.0),
            &p(1.0, 0.0, 0.0),
            &p(2.0, 0.0, 0.0),
            1e-6,
        ));
    }

    #[test]
    fn gapped_collinear_segments_do_not_overlap() {
        assert!(!collinear_span_overlap(
            &p(0.0, 0.0, 0.0),
            &p(1.0, 0.0, 0.0),
            &p(2.0, 0.0, 0.0),
            &p(3.0, 0.0, 0.0),
            1e-6,
        ));
    }
}
