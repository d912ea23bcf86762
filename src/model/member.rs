use std::collections::HashMap;

use crate::geometry::{Plane, Polyline, Segment};

use super::joint::JointId;

slotmap::new_key_type! {
    /// Unique identifier for a member in the model.
    pub struct MemberId;
}

/// Geometric form of a member.
#[derive(Debug, Clone)]
pub enum MemberGeometry {
    /// A linear member with a centerline and rectangular cross-section.
    Beam {
        centerline: Segment,
        width: f64,
        height: f64,
    },
    /// A planar member bounded by a closed polyline.
    Plate { boundary: Polyline, thickness: f64 },
}

/// Additive blank-length extension on one side pair of a member.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BlankExtension {
    /// Extension beyond the start of the member.
    pub start: f64,
    /// Extension beyond the end of the member.
    pub end: f64,
}

/// A machining feature descriptor attached to a member.
///
/// Descriptors are consumed by the external feature-geometry generators;
/// this crate only records them. Cut-plane normals point toward the
/// material to remove.
#[derive(Debug, Clone)]
pub enum Feature {
    /// A planar cut through the member blank.
    CutPlane { plane: Plane, requester: JointId },
    /// A flat-bottomed pocket milled from a face plane.
    Pocket {
        plane: Plane,
        depth: f64,
        requester: JointId,
    },
    /// A half-lap notch over a parameter range of the centerline.
    Lap {
        t_start: f64,
        t_end: f64,
        depth: f64,
        requester: JointId,
    },
}

impl Feature {
    /// The joint that requested this feature.
    #[must_use]
    pub fn requester(&self) -> JointId {
        match self {
            Self::CutPlane { requester, .. }
            | Self::Pocket { requester, .. }
            | Self::Lap { requester, .. } => *requester,
        }
    }
}

/// Data associated with a structural member.
///
/// Members carry their geometry, free-form attributes (the `category`
/// key feeds category-based joint rules), the per-requester blank
/// extension accumulator, and the machining features appended by joints.
#[derive(Debug, Clone)]
pub struct MemberData {
    /// Geometric form of the member.
    pub geometry: MemberGeometry,
    /// Free-form attributes.
    pub attributes: HashMap<String, String>,
    blank_extensions: HashMap<JointId, BlankExtension>,
    features: Vec<Feature>,
}

impl MemberData {
    /// Creates a beam member from its centerline and cross-section.
    #[must_use]
    pub fn beam(centerline: Segment, width: f64, height: f64) -> Self {
        Self {
            geometry: MemberGeometry::Beam {
                centerline,
                width,
                height,
            },
            attributes: HashMap::new(),
            blank_extensions: HashMap::new(),
            features: Vec::new(),
        }
    }

    /// Creates a plate member from its boundary and thickness.
    #[must_use]
    pub fn plate(boundary: Polyline, thickness: f64) -> Self {
        Self {
            geometry: MemberGeometry::Plate {
                boundary,
                thickness,
            },
            attributes: HashMap::new(),
            blank_extensions: HashMap::new(),
            features: Vec::new(),
        }
    }

    /// Returns the member's category attribute, if set.
    #[must_use]
    pub fn category(&self) -> Option<&str> {
        self.attributes.get("category").map(String::as_str)
    }

    /// Sets the member's category attribute.
    pub fn set_category(&mut self, category: impl Into<String>) {
        self.attributes.insert("category".into(), category.into());
    }

    /// Returns the centerline for beam members.
    #[must_use]
    pub fn centerline(&self) -> Option<&Segment> {
        match &self.geometry {
            MemberGeometry::Beam { centerline, .. } => Some(centerline),
            MemberGeometry::Plate { .. } => None,
        }
    }

    /// Returns `(width, height)` for beam members.
    #[must_use]
    pub fn cross_section(&self) -> Option<(f64, f64)> {
        match &self.geometry {
            MemberGeometry::Beam { width, height, .. } => Some((*width, *height)),
            MemberGeometry::Plate { .. } => None,
        }
    }

    /// Returns the boundary for plate members.
    #[must_use]
    pub fn boundary(&self) -> Option<&Polyline> {
        match &self.geometry {
            MemberGeometry::Plate { boundary, .. } => Some(boundary),
            MemberGeometry::Beam { .. } => None,
        }
    }

    /// Records a blank extension request from a joint.
    ///
    /// Requests under the same requester merge with `max` per side, so
    /// re-requesting never compounds; requests from distinct joints
    /// stay independent.
    pub fn add_blank_extension(&mut self, start: f64, end: f64, requester: JointId) {
        let entry = self.blank_extensions.entry(requester).or_default();
        entry.start = entry.start.max(start);
        entry.end = entry.end.max(end);
    }

    /// Removes one requester's blank extension, leaving others intact.
    pub fn remove_blank_extension(&mut self, requester: JointId) {
        self.blank_extensions.remove(&requester);
    }

    /// The effective blank extension: the per-side maximum over all
    /// requesters.
    #[must_use]
    pub fn blank_extension(&self) -> BlankExtension {
        self.blank_extensions
            .values()
            .fold(BlankExtension::default(), |acc, e| BlankExtension {
                start: acc.start.max(e.start),
                end: acc.end.max(e.end),
            })
    }

    /// The centerline with the effective blank extension applied.
    #[must_use]
    pub fn extended_centerline(&self) -> Option<Segment> {
        let ext = self.blank_extension();
        self.centerline().map(|c| c.extended(ext.start, ext.end))
    }

    /// Appends a machining feature descriptor.
    pub fn add_feature(&mut self, feature: Feature) {
        self.features.push(feature);
    }

    /// Returns the accumulated machining features.
    #[must_use]
    pub fn features(&self) -> &[Feature] {
        &self.features
    }

    /// Drops all features requested by the given joint.
    pub fn remove_features_of(&mut self, requester: JointId) {
        self.features.retain(|f| f.requester() != requester);
    }
}
