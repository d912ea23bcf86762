use crate::error::Result;
use crate::geometry::Plane;
use crate::math::near_endpoint;
use crate::model::{Feature, JointData, JointId, Model};

use super::{beam_parts, capped, feature_failed, half_diagonal};

pub(super) fn check(model: &Model, data: &JointData) -> Result<()> {
    for &id in &data.elements {
        beam_parts(model, data.kind, id)?;
    }
    Ok(())
}

/// Extends every member terminating at the junction past it by a
/// safety margin; members passing through the junction are untouched.
pub(super) fn add_extensions(model: &mut Model, data: &JointData, joint: JointId) -> Result<()> {
    for &id in &data.elements {
        let (centerline, width, height) = beam_parts(model, data.kind, id)?;
        let t = centerline.closest_param(&data.location);
        if !near_endpoint(t) {
            continue;
        }
        let margin = half_diagonal(width, height);
        let (start, end) = if t < 0.5 {
            (
                capped(
                    (data.location - centerline.start()).norm() + margin,
                    &data.options,
                ),
                0.0,
            )
        } else {
            (
                0.0,
                capped(
                    (data.location - centerline.end()).norm() + margin,
                    &data.options,
                ),
            )
        };
        model.member_mut(id)?.add_blank_extension(start, end, joint);
    }
    Ok(())
}

/// Emits one junction-facing cut plane per terminating member.
pub(super) fn add_features(model: &mut Model, data: &JointData, joint: JointId) -> Result<()> {
    for &id in &data.elements {
        let (centerline, _, _) = beam_parts(model, data.kind, id)?;
        let t = centerline.closest_param(&data.location);
        if !near_endpoint(t) {
            continue;
        }
        let far = if t < 0.5 {
            centerline.end()
        } else {
            centerline.start()
        };
        let outward = (far - data.location).normalize();
        // Waste lies on the far side of the junction from the member.
        let plane = Plane::from_normal(data.location, -outward)
            .map_err(|_| feature_failed(data.kind, "member collapses onto the junction"))?;
        model.member_mut(id)?.add_feature(Feature::CutPlane {
            plane,
            requester: joint,
        });
    }
    Ok(())
}
