use crate::math::Point3;

use super::member::MemberId;

slotmap::new_key_type! {
    /// Unique identifier for a joint candidate in the model.
    pub struct CandidateId;
}

/// Classified geometric relationship between two or more members.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JointTopology {
    /// End-to-end collinear continuation.
    I,
    /// End-to-end, angled.
    L,
    /// End-to-middle; one member terminates on the other.
    T,
    /// Middle-to-middle crossing.
    X,
    /// General N-ary junction (any T or X present in the cluster).
    K,
    /// N-ary junction of end-to-end members only.
    Y,
    /// Plate boundary edge meeting another plate's boundary edge.
    EdgeEdge,
    /// Plate boundary edge lying on another plate's face.
    EdgeFace,
    /// No relationship established within tolerance.
    Unknown,
}

impl JointTopology {
    /// Human-readable tag, used in error messages.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::I => "I",
            Self::L => "L",
            Self::T => "T",
            Self::X => "X",
            Self::K => "K",
            Self::Y => "Y",
            Self::EdgeEdge => "EDGE_EDGE",
            Self::EdgeFace => "EDGE_FACE",
            Self::Unknown => "UNKNOWN",
        }
    }
}

/// An unconfirmed two-member adjacency detected by the topology solver.
///
/// For asymmetric topologies the first member is the "main" role (the
/// one terminating at the junction) and the second the "cross" role.
#[derive(Debug, Clone)]
pub struct CandidateData {
    /// The two members, in resolved role order.
    pub members: [MemberId; 2],
    /// Classified topology of the pair.
    pub topology: JointTopology,
    /// Intersection/closest-approach location.
    pub location: Point3,
    /// Perpendicular distance between the members at the location.
    pub distance: f64,
}

impl CandidateData {
    /// Creates a new candidate record.
    #[must_use]
    pub fn new(
        members: [MemberId; 2],
        topology: JointTopology,
        location: Point3,
        distance: f64,
    ) -> Self {
        Self {
            members,
            topology,
            location,
            distance,
        }
    }

    /// Returns `true` when the candidate references the given unordered
    /// member pair.
    #[must_use]
    pub fn is_pair(&self, a: MemberId, b: MemberId) -> bool {
        (self.members[0] == a && self.members[1] == b)
            || (self.members[0] == b && self.members[1] == a)
    }
}
