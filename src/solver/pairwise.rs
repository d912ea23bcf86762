use crate::error::Result;
use crate::math::segment_3d::{
    collinear_span_overlap, directions_parallel, segment_segment_closest, segments_collinear,
};
use crate::math::{near_endpoint, Point3};
use crate::model::{JointTopology, MemberId, Model};

use super::DEFAULT_MAX_DISTANCE;

/// Result of a pairwise topology classification.
#[derive(Debug, Clone, Copy)]
pub struct PairTopologyResult {
    /// Classified topology of the pair.
    pub topology: JointTopology,
    /// The member terminating at the junction (meaningful for T);
    /// echoes the first argument for symmetric topologies.
    pub main: MemberId,
    /// The member continuing through the junction (meaningful for T);
    /// echoes the second argument for symmetric topologies.
    pub cross: MemberId,
    /// Measured distance between the members, `None` for [`JointTopology::Unknown`].
    pub distance: Option<f64>,
    /// Junction location (midpoint of the closest-approach points),
    /// `None` for [`JointTopology::Unknown`].
    pub location: Option<Point3>,
}

impl PairTopologyResult {
    fn unknown(a: MemberId, b: MemberId) -> Self {
        Self {
            topology: JointTopology::Unknown,
            main: a,
            cross: b,
            distance: None,
            location: None,
        }
    }
}

/// Classifies the spatial relationship of two beam members.
///
/// The classification is direction-independent: swapping the two
/// members yields the same topology with main/cross roles swapped.
pub struct PairTopology {
    a: MemberId,
    b: MemberId,
    max_distance: f64,
}

impl PairTopology {
    /// Creates a new pairwise topology query with the default max
    /// distance.
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
    /// Never fails to classify well-formed input: pairs beyond
    /// tolerance, parallel offsets, collinear overlaps, and plate
    /// members all come back as [`JointTopology::Unknown`] with no
    /// distance or location.
    ///
    /// # Errors
    ///
    /// Returns an error only if a member is not found in the model.
    pub fn execute(&self, model: &Model) -> Result<PairTopologyResult> {
        let member_a = model.member(self.a)?;
        let member_b = model.member(self.b)?;

        let (Some(seg_a), Some(seg_b)) = (member_a.centerline(), member_b.centerline())
        else {
            // Plates go through the plate solver.
            return Ok(PairTopologyResult::unknown(self.a, self.b));
        };

        let da = seg_a.direction();
        let db = seg_b.direction();

        if directions_parallel(&da, &db) {
            if !segments_collinear(
                seg_a.start(),
                seg_a.end(),
                seg_b.start(),
                seg_b.end(),
                self.max_distance,
            ) {
                return Ok(PairTopologyResult::unknown(self.a, self.b));
            }
            if collinear_span_overlap(
                seg_a.start(),
                seg_a.end(),
                seg_b.start(),
                seg_b.end(),
                self.max_distance,
            ) {
                // Ambiguous double-connection; report no relationship.
                return Ok(PairTopologyResult::unknown(self.a, self.b));
            }
            let cl = segment_segment_closest(
                seg_a.start(),
                seg_a.end(),
                seg_b.start(),
                seg_b.end(),
            );
            if cl.distance > self.max_distance {
                return Ok(PairTopologyResult::unknown(self.a, self.b));
            }
            return Ok(PairTopologyResult {
                topology: JointTopology::I,
                main: self.a,
                cross: self.b,
                distance: Some(cl.distance),
                location: Some(cl.midpoint()),
            });
        }

        let cl = segment_segment_closest(
            seg_a.start(),
            seg_a.end(),
            seg_b.start(),
            seg_b.end(),
        );
        if cl.distance > self.max_distance {
            return Ok(PairTopologyResult::unknown(self.a, self.b));
        }

        let (topology, main, cross) = match (near_endpoint(cl.ta), near_endpoint(cl.tb)) {
            (true, true) => (JointTopology::L, self.a, self.b),
            (true, false) => (JointTopology::T, self.a, self.b),
            (false, true) => (JointTopology::T, self.b, self.a),
            (false, false) => (JointTopology::X, self.a, self.b),
        };

        Ok(PairTopologyResult {
            topology,
            main,
            cross,
            distance: Some(cl.distance),
            location: Some(cl.midpoint()),
        })
    }
}
