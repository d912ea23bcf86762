use crate::error::Result;
use crate::math::segment_3d::{
    directions_parallel, projected_span_overlap, segment_segment_closest,
};
use crate::math::{Point3, TOLERANCE};
use crate::model::{JointTopology, MemberId, Model};

use super::DEFAULT_MAX_DISTANCE;

/// Result of a plate-pair topology classification.
#[derive(Debug, Clone, Copy)]
pub struct PlatePairResult {
    /// [`JointTopology::EdgeEdge`], [`JointTopology::EdgeFace`], or
    /// [`JointTopology::Unknown`].
    pub topology: JointTopology,
    /// Matching boundary segment index on the first plate, if any.
    pub segment_a: Option<usize>,
    /// Matching boundary segment index on the second plate, if any.
    pub segment_b: Option<usize>,
    /// Measured distance, `None` for [`JointTopology::Unknown`].
    pub distance: Option<f64>,
    /// Junction location, `None` for [`JointTopology::Unknown`].
    pub location: Option<Point3>,
}

impl PlatePairResult {
    fn unknown() -> Self {
        Self {
            topology: JointTopology::Unknown,
            segment_a: None,
            segment_b: None,
            distance: None,
            location: None,
        }
    }
}

/// Classifies the relationship of two plate members through their
/// boundary edges and face planes.
pub struct PlatePairTopology {
    a: MemberId,
    b: MemberId,
    max_distance: f64,
}

impl PlatePairTopology {
    /// Creates a new plate-pair query with the default max distance.
    #[must_use]
    pub fn new(a: MemberId, b: MemberId) -> Self {
        Self {
            a,
            b,
            max_distance: DEFAULT_MAX_DISTANCE,
        }
    }

    /// Overrides the maximum allowed gap distance.
    #[must_use]
    pub fn with_max_distance(mut self, max_distance: f64) -> Self {
        self.max_distance = max_distance;
        self
    }

    /// Executes the query.
    ///
    /// Prefers `EdgeEdge` (a boundary segment of each plate running
    /// along the other's within tolerance) over `EdgeFace` (a boundary
    /// segment of one plate lying inside the other's face).
    ///
    /// # Errors
    ///
    /// Returns an error only if a member is not found in the model or a
    /// plate boundary is degenerate.
    pub fn execute(&self, model: &Model) -> Result<PlatePairResult> {
        let member_a = model.member(self.a)?;
        let member_b = model.member(self.b)?;

        let (Some(boundary_a), Some(boundary_b)) = (member_a.boundary(), member_b.boundary())
        else {
            return Ok(PlatePairResult::unknown());
        };

        // Edge-edge: the closest near-parallel boundary segment pair
        // that actually runs alongside (corner contact is not a seam).
        let mut best: Option<PlatePairResult> = None;
        let mut best_distance = f64::INFINITY;
        for i in 0..boundary_a.edge_count() {
            let edge_a = boundary_a.edge(i)?;
            for j in 0..boundary_b.edge_count() {
                let edge_b = boundary_b.edge(j)?;
                if !directions_parallel(&edge_a.direction(), &edge_b.direction()) {
                    continue;
                }
                let overlap = projected_span_overlap(
                    edge_a.start(),
                    edge_a.end(),
                    edge_b.start(),
                    edge_b.end(),
                );
                if overlap <= self.max_distance.max(TOLERANCE) {
                    continue;
                }
                let cl = segment_segment_closest(
                    edge_a.start(),
                    edge_a.end(),
                    edge_b.start(),
                    edge_b.end(),
                );
                if cl.distance > self.max_distance || cl.distance >= best_distance {
                    continue;
                }
                best_distance = cl.distance;
                best = Some(PlatePairResult {
                    topology: JointTopology::EdgeEdge,
                    segment_a: Some(i),
                    segment_b: Some(j),
                    distance: Some(cl.distance),
                    location: Some(cl.midpoint()),
                });
            }
        }
        if let Some(result) = best {
            return Ok(result);
        }

        // Edge-face: a boundary segment of one plate inside the other's face.
        let plane_b = boundary_b.plane()?;
        for i in 0..boundary_a.edge_count() {
            let edge = boundary_a.edge(i)?;
            let on_plane = plane_b.signed_distance(edge.start()).abs() <= self.max_distance
                && plane_b.signed_distance(edge.end()).abs() <= self.max_distance;
            if on_plane && boundary_b.contains(&edge.midpoint())? {
                return Ok(PlatePairResult {
                    topology: JointTopology::EdgeFace,
                    segment_a: Some(i),
                    segment_b: None,
                    distance: Some(plane_b.signed_distance(&edge.midpoint()).abs()),
                    location: Some(edge.midpoint()),
                });
            }
        }
        let plane_a = boundary_a.plane()?;
        for j in 0..boundary_b.edge_count() {
            let edge = boundary_b.edge(j)?;
            let on_plane = plane_a.signed_distance(edge.start()).abs() <= self.max_distance
                && plane_a.signed_distance(edge.end()).abs() <= self.max_distance;
            if on_plane && boundary_a.contains(&edge.midpoint())? {
                return Ok(PlatePairResult {
                    topology: JointTopology::EdgeFace,
                    segment_a: None,
                    segment_b: Some(j),
                    distance: Some(plane_a.signed_distance(&edge.midpoint()).abs()),
                    location: Some(edge.midpoint()),
                });
            }
        }

        Ok(PlatePairResult::unknown())
    }
}
