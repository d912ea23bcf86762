use crate::error::Result;
use crate::geometry::{LinePlaneRelation, Plane};
use crate::math::segment_3d::directions_parallel;
use crate::math::{Point3, Vector3, TOLERANCE};
use crate::model::{Feature, JointData, JointId, Model};

use super::{beam_parts, capped, feature_failed, incompatible};

/// Geometry of the main member's landing on the cross member.
struct Landing {
    /// Point on the cross centerline nearest the junction.
    cross_point: Point3,
    /// Unit normal of the cross faces, pointing from the main side
    /// through the cross member.
    normal: Vector3,
    /// The main member's endpoint at the junction.
    main_end: Point3,
    /// Unit approach direction of the main member into the junction.
    approach: Vector3,
    /// `true` when the main member meets the junction at its start.
    main_at_start: bool,
    /// Half the cross member's width (face offset from its centerline).
    half_width: f64,
}

fn landing(model: &Model, data: &JointData) -> Result<Landing> {
    let (main, _, _) = beam_parts(model, data.kind, data.elements[0])?;
    let (cross, cross_width, _) = beam_parts(model, data.kind, data.elements[1])?;

    let main_at_start = main.closest_param(&data.location) < 0.5;
    let (main_end, approach) = if main_at_start {
        (*main.start(), -main.direction())
    } else {
        (*main.end(), main.direction())
    };

    let cross_dir = cross.direction();
    let lateral = approach - cross_dir * approach.dot(&cross_dir);
    if lateral.norm() < TOLERANCE {
        return Err(incompatible(data.kind, "main member is parallel to the cross member"));
    }

    Ok(Landing {
        cross_point: cross.point_at(cross.closest_param(&data.location)),
        normal: lateral.normalize(),
        main_end,
        approach,
        main_at_start,
        half_width: cross_width * 0.5,
    })
}

pub(super) fn check(model: &Model, data: &JointData) -> Result<()> {
    let (main, _, _) = beam_parts(model, data.kind, data.elements[0])?;
    let (cross, _, _) = beam_parts(model, data.kind, data.elements[1])?;
    if directions_parallel(&main.direction(), &cross.direction()) {
        return Err(incompatible(data.kind, "parallel members cannot butt"));
    }
    Ok(())
}

/// Extends the main member to the far face of the cross member.
pub(super) fn add_extensions(model: &mut Model, data: &JointData, joint: JointId) -> Result<()> {
    let landing = landing(model, data)?;

    let far_face = Plane::from_normal(
        landing.cross_point + landing.normal * landing.half_width,
        landing.normal,
    )
    .map_err(|_| incompatible(data.kind, "degenerate cross face"))?;

    let amount = match far_face.intersect_line(&landing.main_end, &landing.approach) {
        LinePlaneRelation::Point { t, .. } => t.max(0.0),
        // Oblique landings always intersect; keep a safe fallback.
        LinePlaneRelation::Parallel | LinePlaneRelation::OnPlane => {
            (landing.cross_point - landing.main_end).norm() + landing.half_width
        }
    };
    let amount = capped(amount, &data.options);

    let (start, end) = if landing.main_at_start {
        (amount, 0.0)
    } else {
        (0.0, amount)
    };
    model
        .member_mut(data.elements[0])?
        .add_blank_extension(start, end, joint);
    Ok(())
}

/// Cuts the main member flush with the cross member's near face and,
/// when a mill depth is set, pockets the cross member.
pub(super) fn add_features(model: &mut Model, data: &JointData, joint: JointId) -> Result<()> {
    let landing = landing(model, data)?;

    let near_origin = landing.cross_point - landing.normal * landing.half_width;
    let cut = Plane::from_normal(near_origin, landing.normal)
        .map_err(|_| feature_failed(data.kind, "degenerate cross face"))?;
    model.member_mut(data.elements[0])?.add_feature(Feature::CutPlane {
        plane: cut,
        requester: joint,
    });

    if data.options.mill_depth > 0.0 {
        // Pocket plane normal points out of the cross member, toward
        // the main.
        let pocket = Plane::from_normal(near_origin, -landing.normal)
            .map_err(|_| feature_failed(data.kind, "degenerate cross face"))?;
        model.member_mut(data.elements[1])?.add_feature(Feature::Pocket {
            plane: pocket,
            depth: data.options.mill_depth,
            requester: joint,
        });
    }
    Ok(())
}
