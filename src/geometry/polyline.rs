use crate::error::{GeometryError, Result};
use crate::math::{Point3, Vector3, TOLERANCE};

use super::{Plane, Segment};

/// A closed planar polyline, used as a plate boundary.
///
/// The boundary is implicitly closed: the last point connects back to
/// the first.
#[derive(Debug, Clone)]
pub struct Polyline {
    points: Vec<Point3>,
}

impl Polyline {
    /// Creates a closed polyline from its corner points.
    ///
    /// # Errors
    ///
    /// Returns an error if fewer than three points are supplied or two
    /// consecutive points coincide.
    pub fn new(points: Vec<Point3>) -> Result<Self> {
        if points.len() < 3 {
            return Err(
                GeometryError::Degenerate("polyline needs at least 3 points".into()).into(),
            );
        }
        for i in 0..points.len() {
            let next = points[(i + 1) % points.len()];
            if (next - points[i]).norm() < TOLERANCE {
                return Err(
                    GeometryError::Degenerate("coincident polyline points".into()).into(),
                );
            }
        }
        Ok(Self { points })
    }

    /// Returns the corner points.
    #[must_use]
    pub fn points(&self) -> &[Point3] {
        &self.points
    }

    /// Number of boundary edges (equal to the number of points, since
    /// the boundary is closed).
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.points.len()
    }

    /// Returns boundary edge `i`, wrapping at the end.
    ///
    /// # Errors
    ///
    /// Returns an error if the edge index is out of range.
    pub fn edge(&self, i: usize) -> Result<Segment> {
        if i >= self.points.len() {
            return Err(GeometryError::Degenerate(format!(
                "edge index {i} out of range"
            ))
            .into());
        }
        Segment::new(self.points[i], self.points[(i + 1) % self.points.len()])
    }

    /// Fits the boundary plane using the Newell normal and the centroid
    /// as origin.
    ///
    /// # Errors
    ///
    /// Returns an error if the points are collinear (degenerate normal).
    pub fn plane(&self) -> Result<Plane> {
        let mut normal = Vector3::zeros();
        let mut centroid = Vector3::zeros();
        let n = self.points.len();

        for i in 0..n {
            let p = self.points[i];
            let q = self.points[(i + 1) % n];
            normal.x += (p.y - q.y) * (p.z + q.z);
            normal.y += (p.z - q.z) * (p.x + q.x);
            normal.z += (p.x - q.x) * (p.y + q.y);
            centroid += p.coords;
        }

        #[allow(clippy::cast_precision_loss)]
        let origin = Point3::from(centroid / n as f64);
        Plane::from_normal(origin, normal)
    }

    /// Point-in-polygon test for a point at or near the boundary plane.
    ///
    /// Projects to the plane's UV coordinate space and uses the winding
    /// number. Returns `true` if the projected point is inside.
    ///
    /// # Errors
    ///
    /// Returns an error if the boundary plane is degenerate.
    pub fn contains(&self, point: &Point3) -> Result<bool> {
        let plane = self.plane()?;
        let (px, py) = plane.project_uv(point);
        let uvs: Vec<(f64, f64)> = self.points.iter().map(|p| plane.project_uv(p)).collect();
        Ok(winding_number(px, py, &uvs) != 0)
    }
}

/// Winding number of point `(px, py)` with respect to polygon `verts`.
/// Non-zero => inside.
fn winding_number(px: f64, py: f64, verts: &[(f64, f64)]) -> i32 {
    let n = verts.len();
    let mut winding = 0i32;
    for i in 0..n {
        let (x0, y0) = verts[i];
        let (x1, y1) = verts[(i + 1) % n];
        let cross = (x1 - x0) * (py - y0) - (y1 - y0) * (px - x0);

        if y0 <= py {
            if y1 > py && cross > 0.0 {
                winding += 1;
            }
        } else if y1 <= py && cross < 0.0 {
            winding -= 1;
        }
    }
    winding
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn square() -> Polyline {
        Polyline::new(vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(2.0, 0.0, 0.0),
            Point3::new(2.0, 2.0, 0.0),
            Point3::new(0.0, 2.0, 0.0),
        ])
        .unwrap()
    }

    #[test]
    fn rejects_too_few_points() {
        assert!(
            Polyline::new(vec![Point3::origin(), Point3::new(1.0, 0.0, 0.0)]).is_err()
        );
    }

    #[test]
    fn plane_normal_is_perpendicular() {
        let plane = square().plane().unwrap();
        assert!(plane.normal().z.abs() > 0.99);
        assert!((plane.origin().x - 1.0).abs() < 1e-12);
    }

    #[test]
    fn contains_interior_point() {
        assert!(square().contains(&Point3::new(1.0, 1.0, 0.0)).unwrap());
    }

    #[test]
    fn excludes_exterior_point() {
        assert!(!square().contains(&Point3::new(3.0, 1.0, 0.0)).unwrap());
    }

    #[test]
    fn edges_wrap_around() {
        let sq = square();
        assert_eq!(sq.edge_count(), 4);
        let last = sq.edge(3).unwrap();
        assert!((last.end() - Point3::origin()).norm() < 1e-12);
        assert!(sq.edge(4).is_err());
    }
}
