use crate::error::Result;
use crate::geometry::Plane;
use crate::math::segment_3d::directions_parallel;
use crate::math::{Point3, Vector3};
use crate::model::{Feature, JointData, JointId, Model};

use super::{beam_parts, capped, feature_failed, half_diagonal, incompatible};

/// Unit direction from the corner toward the member's far end.
fn away_direction(
    centerline: &crate::geometry::Segment,
    corner: &Point3,
) -> Vector3 {
    let far = if centerline.closest_param(corner) < 0.5 {
        centerline.end()
    } else {
        centerline.start()
    };
    (far - corner).normalize()
}

pub(super) fn check(model: &Model, data: &JointData) -> Result<()> {
    let (a, _, _) = beam_parts(model, data.kind, data.elements[0])?;
    let (b, _, _) = beam_parts(model, data.kind, data.elements[1])?;
    if directions_parallel(&a.direction(), &b.direction()) {
        return Err(incompatible(data.kind, "parallel members cannot be mitered"));
    }
    Ok(())
}

/// Extends both members past the shared corner so the blank covers the
/// miter cut.
pub(super) fn add_extensions(model: &mut Model, data: &JointData, joint: JointId) -> Result<()> {
    for &id in &data.elements {
        let (centerline, width, height) = beam_parts(model, data.kind, id)?;
        let t = centerline.closest_param(&data.location);
        let margin = half_diagonal(width, height);

        let (start, end) = if t < 0.5 {
            (
                capped((data.location - centerline.start()).norm() + margin, &data.options),
                0.0,
            )
        } else {
            (
                0.0,
                capped((data.location - centerline.end()).norm() + margin, &data.options),
            )
        };
        model.member_mut(id)?.add_blank_extension(start, end, joint);
    }
    Ok(())
}

/// Emits the bisector cut plane on both members.
pub(super) fn add_features(model: &mut Model, data: &JointData, joint: JointId) -> Result<()> {
    let (a, _, _) = beam_parts(model, data.kind, data.elements[0])?;
    let (b, _, _) = beam_parts(model, data.kind, data.elements[1])?;
    let u_a = away_direction(&a, &data.location);
    let u_b = away_direction(&b, &data.location);

    // The plane normal to u_a - u_b contains the angle bisector.
    let plane = Plane::from_normal(data.location, u_a - u_b)
        .map_err(|_| feature_failed(data.kind, "degenerate miter bisector"))?;

    for &id in &data.elements {
        model.member_mut(id)?.add_feature(Feature::CutPlane {
            plane: plane.clone(),
            requester: joint,
        });
    }
    Ok(())
}
