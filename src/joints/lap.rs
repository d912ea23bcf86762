use crate::error::Result;
use crate::math::segment_3d::directions_parallel;
use crate::math::PARAM_TOLERANCE;
use crate::model::{Feature, JointData, JointId, Model};

use super::{beam_parts, feature_failed, incompatible};

pub(super) fn check(model: &Model, data: &JointData) -> Result<()> {
    let (a, _, _) = beam_parts(model, data.kind, data.elements[0])?;
    let (b, _, _) = beam_parts(model, data.kind, data.elements[1])?;
    if directions_parallel(&a.direction(), &b.direction()) {
        return Err(incompatible(data.kind, "parallel members cannot lap"));
    }
    Ok(())
}

/// Notches both members over the crossing, each to half its own height.
pub(super) fn add_features(model: &mut Model, data: &JointData, joint: JointId) -> Result<()> {
    let pairs = [
        (data.elements[0], data.elements[1]),
        (data.elements[1], data.elements[0]),
    ];
    for (own, other) in pairs {
        let (centerline, _, height) = beam_parts(model, data.kind, own)?;
        let (_, other_width, _) = beam_parts(model, data.kind, other)?;

        let t_center = centerline.closest_param(&data.location);
        let half_span = other_width * 0.5 / centerline.length();
        let t_start = (t_center - half_span).clamp(0.0, 1.0);
        let t_end = (t_center + half_span).clamp(0.0, 1.0);
        if t_end - t_start < PARAM_TOLERANCE {
            return Err(feature_failed(data.kind, "degenerate lap span"));
        }

        model.member_mut(own)?.add_feature(Feature::Lap {
            t_start,
            t_end,
            depth: height * 0.5,
            requester: joint,
        });
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::geometry::Segment;
    use crate::joints;
    use crate::math::Point3;
    use crate::model::{JointKind, JointOptions, JointTopology, MemberData, MemberId};

    fn p(x: f64, y: f64, z: f64) -> Point3 {
        Point3::new(x, y, z)
    }

    fn beam(model: &mut Model, start: Point3, end: Point3, width: f64) -> MemberId {
        model.add_member(MemberData::beam(
            Segment::new(start, end).unwrap(),
            width,
            width,
        ))
    }

    #[test]
    fn both_members_get_half_depth_notches() {
        let mut model = Model::new();
        let a = beam(&mut model, p(0.0, 0.0, 0.0), p(2.0, 0.0, 0.0), 0.2);
        let b = beam(&mut model, p(1.0, -1.0, 0.0), p(1.0, 1.0, 0.0), 0.2);
        let data = joints::try_new_joint(
            &model,
            JointKind::Lap,
            vec![a, b],
            JointTopology::X,
            p(1.0, 0.0, 0.0),
            JointOptions::default(),
        )
        .unwrap();
        let joint = model.add_joint(data).unwrap();

        // No extensions in Phase 1.
        joints::add_extensions(&mut model, joint).unwrap();
        assert!(model.member(a).unwrap().blank_extension().end.abs() < 1e-12);

        joints::add_features(&mut model, joint).unwrap();
        let features = model.member(a).unwrap().features();
        assert_eq!(features.len(), 1);
        let Feature::Lap {
            t_start,
            t_end,
            depth,
            ..
        } = &features[0]
        else {
            panic!("expected a lap");
        };
        // Crossing at the middle of a length-2 member, other width 0.2.
        assert!((t_start - 0.45).abs() < 1e-9);
        assert!((t_end - 0.55).abs() < 1e-9);
        assert!((depth - 0.1).abs() < 1e-12);

        assert_eq!(model.member(b).unwrap().features().len(), 1);
    }

    #[test]
    fn degenerate_span_fails_feature_generation() {
        let mut model = Model::new();
        // A zero-width member crossing at its very end leaves no span
        // to notch.
        let a = beam(&mut model, p(0.0, 0.0, 0.0), p(2.0, 0.0, 0.0), 0.0);
        let b = beam(&mut model, p(1.0, -1.0, 0.0), p(1.0, 0.0, 0.0), 0.0);
        let data = JointData {
            kind: JointKind::Lap,
            elements: vec![a, b],
            topology: JointTopology::X,
            location: p(1.0, 0.0, 0.0),
            options: JointOptions::default(),
        };
        let joint = model.add_joint(data).unwrap();

        assert!(joints::add_features(&mut model, joint).is_err());
    }
}
