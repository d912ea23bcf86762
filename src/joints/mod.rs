mod butt;
mod hub;
mod lap;
mod miter;

use crate::error::{JoineryError, Result, TenonError};
use crate::geometry::Segment;
use crate::math::Point3;
use crate::model::{
    JointData, JointId, JointKind, JointOptions, JointTopology, MemberId, Model,
};

/// Constructs a joint record, validating the element-count constraint,
/// the supported topology, and the kind's geometric compatibility.
///
/// # Errors
///
/// Returns a [`JoineryError`] describing the first violated constraint.
pub fn try_new_joint(
    model: &Model,
    kind: JointKind,
    elements: Vec<MemberId>,
    topology: JointTopology,
    location: Point3,
    options: JointOptions,
) -> Result<JointData> {
    let (min, max) = kind.element_count();
    if elements.len() < min || elements.len() > max {
        let expected = if max == usize::MAX {
            format!("at least {min}")
        } else {
            format!("{min}")
        };
        return Err(JoineryError::WrongElementCount {
            joint: kind.name().into(),
            expected,
            got: elements.len(),
        }
        .into());
    }
    if !kind.supports(topology) {
        return Err(JoineryError::UnsupportedTopology {
            joint: kind.name().into(),
            topology: topology.name().into(),
        }
        .into());
    }

    let data = JointData {
        kind,
        elements,
        topology,
        location,
        options,
    };
    check_compatibility(model, &data)?;
    Ok(data)
}

/// Re-validates a stored joint's members against its kind.
///
/// # Errors
///
/// Returns a [`JoineryError`] when the members cannot be joined.
pub fn check_elements_compatibility(model: &Model, joint: JointId) -> Result<()> {
    let data = model.joint(joint)?.clone();
    check_compatibility(model, &data)
}

fn check_compatibility(model: &Model, data: &JointData) -> Result<()> {
    for (i, a) in data.elements.iter().enumerate() {
        if data.elements[i + 1..].contains(a) {
            return Err(incompatible(data.kind, "elements must be distinct"));
        }
    }
    match data.kind {
        JointKind::Miter => miter::check(model, data),
        JointKind::Butt => butt::check(model, data),
        JointKind::Lap => lap::check(model, data),
        JointKind::Hub => hub::check(model, data),
    }
}

/// Phase 1: requests blank-length extensions on the joint's members.
///
/// # Errors
///
/// Returns a [`JoineryError`] when the members cannot be joined.
pub fn add_extensions(model: &mut Model, joint: JointId) -> Result<()> {
    let data = model.joint(joint)?.clone();
    match data.kind {
        JointKind::Miter => miter::add_extensions(model, &data, joint),
        JointKind::Butt => butt::add_extensions(model, &data, joint),
        JointKind::Lap => Ok(()),
        JointKind::Hub => hub::add_extensions(model, &data, joint),
    }
}

/// Phase 2: appends machining feature descriptors to the joint's
/// members. Must run only after every joint has finished Phase 1.
///
/// # Errors
///
/// Returns a [`JoineryError`] when feature geometry cannot be derived.
pub fn add_features(model: &mut Model, joint: JointId) -> Result<()> {
    let data = model.joint(joint)?.clone();
    match data.kind {
        JointKind::Miter => miter::add_features(model, &data, joint),
        JointKind::Butt => butt::add_features(model, &data, joint),
        JointKind::Lap => lap::add_features(model, &data, joint),
        JointKind::Hub => hub::add_features(model, &data, joint),
    }
}

pub(crate) fn incompatible(kind: JointKind, reason: impl Into<String>) -> TenonError {
    JoineryError::IncompatibleElements {
        joint: kind.name().into(),
        reason: reason.into(),
    }
    .into()
}

pub(crate) fn feature_failed(kind: JointKind, reason: impl Into<String>) -> TenonError {
    JoineryError::FeatureFailed {
        joint: kind.name().into(),
        reason: reason.into(),
    }
    .into()
}

/// Fetches a member's centerline and cross-section, rejecting plates.
pub(crate) fn beam_parts(
    model: &Model,
    kind: JointKind,
    id: MemberId,
) -> Result<(Segment, f64, f64)> {
    let member = model.member(id)?;
    match (member.centerline(), member.cross_section()) {
        (Some(centerline), Some((width, height))) => {
            Ok((centerline.clone(), width, height))
        }
        _ => Err(incompatible(kind, "plate members are not supported")),
    }
}

/// Half of the cross-section diagonal, the usual safety margin past a
/// junction point.
pub(crate) fn half_diagonal(width: f64, height: f64) -> f64 {
    0.5 * width.hypot(height)
}

/// Applies the optional extension cap from the joint options.
pub(crate) fn capped(amount: f64, options: &JointOptions) -> f64 {
    options.cutoff.map_or(amount, |cap| amount.min(cap))
}
