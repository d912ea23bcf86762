use crate::math::Point3;

use super::candidate::JointTopology;
use super::member::MemberId;

slotmap::new_key_type! {
    /// Unique identifier for a joint in the model.
    pub struct JointId;
}

/// Registry of concrete joint types.
///
/// Each kind carries its supported topologies, element-count constraint,
/// and whether its constructor is role-ordered as static metadata; the
/// behavior lives in [`crate::joints`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JointKind {
    /// Corner miter between two end-to-end members (L).
    Miter,
    /// Butt of a main member against a crossing member (T).
    Butt,
    /// Half-lap between two crossing members (X).
    Lap,
    /// N-ary hub joint gathering three or more members (K or Y).
    Hub,
}

impl JointKind {
    /// Human-readable name, used in error messages.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Miter => "MiterJoint",
            Self::Butt => "ButtJoint",
            Self::Lap => "LapJoint",
            Self::Hub => "HubJoint",
        }
    }

    /// Topologies this joint kind can be constructed on.
    #[must_use]
    pub fn supported_topologies(self) -> &'static [JointTopology] {
        match self {
            Self::Miter => &[JointTopology::L],
            Self::Butt => &[JointTopology::T],
            Self::Lap => &[JointTopology::X],
            Self::Hub => &[JointTopology::K, JointTopology::Y],
        }
    }

    /// Whether the constructor is role-ordered (main/cross matter).
    #[must_use]
    pub fn ordered(self) -> bool {
        matches!(self, Self::Butt)
    }

    /// Inclusive element-count constraint `(min, max)`.
    #[must_use]
    pub fn element_count(self) -> (usize, usize) {
        match self {
            Self::Miter | Self::Butt | Self::Lap => (2, 2),
            Self::Hub => (3, usize::MAX),
        }
    }

    /// Returns `true` when the kind accepts the given topology.
    #[must_use]
    pub fn supports(self, topology: JointTopology) -> bool {
        self.supported_topologies().contains(&topology)
    }
}

/// Extra constructor arguments carried by rules into concrete joints.
#[derive(Debug, Clone, Default)]
pub struct JointOptions {
    /// Caps the blank extension a joint may request on any member.
    pub cutoff: Option<f64>,
    /// Pocket depth milled into the cross member of a butt joint.
    /// Zero disables the pocket.
    pub mill_depth: f64,
}

/// A confirmed joint attached to the model graph.
#[derive(Debug, Clone)]
pub struct JointData {
    /// Concrete joint type.
    pub kind: JointKind,
    /// Participating members; for ordered kinds the first element is
    /// the main role.
    pub elements: Vec<MemberId>,
    /// Topology the joint was resolved on.
    pub topology: JointTopology,
    /// Junction location.
    pub location: Point3,
    /// Constructor options carried from the matching rule.
    pub options: JointOptions,
}
