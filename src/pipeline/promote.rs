use crate::error::{JoineryError, Result};
use crate::joints;
use crate::model::{CandidateId, JointId, JointKind, JointOptions, MemberId, Model};
use crate::solver::Cluster;

/// Promotes a joint candidate into a concrete joint.
///
/// The joint is constructed from the candidate's members (or the
/// explicitly reordered elements, which must be a permutation of them)
/// and registered in the model; the candidate is removed only after
/// construction succeeds, so a failed promotion leaves it intact.
///
/// # Errors
///
/// Construction and compatibility failures surface unmodified; catching
/// them belongs to the rule resolver, not here.
pub fn promote_joint_candidate(
    model: &mut Model,
    candidate: CandidateId,
    kind: JointKind,
    reordered_elements: Option<Vec<MemberId>>,
    options: JointOptions,
) -> Result<JointId> {
    let data = model.candidate(candidate)?.clone();

    let elements = match reordered_elements {
        Some(elements) => {
            let permutation = elements.len() == 2
                && data.members.iter().all(|m| elements.contains(m));
            if !permutation {
                return Err(JoineryError::ElementsMismatch.into());
            }
            elements
        }
        None => data.members.to_vec(),
    };

    let joint = joints::try_new_joint(
        model,
        kind,
        elements,
        data.topology,
        data.location,
        options,
    )?;
    let id = model.add_joint(joint)?;
    model.remove_joint_candidate(candidate)?;
    Ok(id)
}

/// Promotes a cluster into a concrete joint.
///
/// A single-candidate cluster delegates to
/// [`promote_joint_candidate`]; otherwise the joint is constructed
/// from the full element set with the cluster's derived topology, and
/// every member candidate is removed after construction succeeds.
///
/// # Errors
///
/// Construction and compatibility failures surface unmodified, leaving
/// all candidates intact.
pub fn promote_cluster(
    model: &mut Model,
    cluster: &Cluster,
    kind: JointKind,
    reordered_elements: Option<Vec<MemberId>>,
    options: JointOptions,
) -> Result<JointId> {
    if let [candidate] = cluster.candidates() {
        return promote_joint_candidate(model, *candidate, kind, reordered_elements, options);
    }

    let natural = cluster.elements(model);
    let elements = match reordered_elements {
        Some(elements) => {
            let permutation = elements.len() == natural.len()
                && natural.iter().all(|m| elements.contains(m));
            if !permutation {
                return Err(JoineryError::ElementsMismatch.into());
            }
            elements
        }
        None => natural,
    };

    let topology = cluster.topology(model);
    let Some(location) = cluster.location(model) else {
        return Err(JoineryError::IncompatibleElements {
            joint: kind.name().into(),
            reason: "empty cluster".into(),
        }
        .into());
    };

    let joint = joints::try_new_joint(model, kind, elements, topology, location, options)?;
    let id = model.add_joint(joint)?;
    for candidate in cluster.candidates() {
        model.remove_joint_candidate(*candidate)?;
    }
    Ok(id)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::geometry::Segment;
    use crate::math::Point3;
    use crate::model::{CandidateData, JointTopology, MemberData};
    use crate::solver::NBeamKdTreeAnalyzer;

    fn p(x: f64, y: f64, z: f64) -> Point3 {
        Point3::new(x, y, z)
    }

    fn beam(model: &mut Model, start: Point3, end: Point3) -> MemberId {
        model.add_member(MemberData::beam(
            Segment::new(start, end).unwrap(),
            0.1,
            0.1,
        ))
    }

    #[test]
    fn promotion_removes_exactly_its_candidate() {
        let mut model = Model::new();
        let a = beam(&mut model, p(0.0, 0.0, 0.0), p(1.0, 0.0, 0.0));
        let b = beam(&mut model, p(1.0, 0.0, 0.0), p(1.0, 1.0, 0.0));
        let c = beam(&mut model, p(0.2, -0.5, 0.0), p(0.2, 0.5, 0.0));

        let l_candidate = model
            .add_joint_candidate(CandidateData::new(
                [a, b],
                JointTopology::L,
                p(1.0, 0.0, 0.0),
                0.0,
            ))
            .unwrap();
        let x_candidate = model
            .add_joint_candidate(CandidateData::new(
                [a, c],
                JointTopology::X,
                p(0.2, 0.0, 0.0),
                0.0,
            ))
            .unwrap();

        let joint = promote_joint_candidate(
            &mut model,
            l_candidate,
            JointKind::Miter,
            None,
            JointOptions::default(),
        )
        .unwrap();

        assert!(model.candidate(l_candidate).is_err());
        assert!(model.candidate(x_candidate).is_ok());
        assert_eq!(model.joint(joint).unwrap().elements, vec![a, b]);

        // Removal does not resurrect the candidate.
        model.remove_joint(joint).unwrap();
        assert!(model.candidate(l_candidate).is_err());
        assert_eq!(model.joint_candidates().count(), 1);
    }

    #[test]
    fn failed_promotion_leaves_candidate_intact() {
        let mut model = Model::new();
        let a = beam(&mut model, p(0.0, 0.0, 0.0), p(2.0, 0.0, 0.0));
        let b = beam(&mut model, p(1.0, -1.0, 0.0), p(1.0, 1.0, 0.0));
        let candidate = model
            .add_joint_candidate(CandidateData::new(
                [a, b],
                JointTopology::X,
                p(1.0, 0.0, 0.0),
                0.0,
            ))
            .unwrap();

        // A miter rejects an X candidate.
        let res = promote_joint_candidate(
            &mut model,
            candidate,
            JointKind::Miter,
            None,
            JointOptions::default(),
        );
        assert!(res.is_err());
        assert!(model.candidate(candidate).is_ok());
        assert_eq!(model.joints().count(), 0);
    }

    #[test]
    fn reordered_elements_must_be_a_permutation() {
        let mut model = Model::new();
        let a = beam(&mut model, p(0.0, 0.0, 0.0), p(1.0, 0.0, 0.0));
        let b = beam(&mut model, p(1.0, 0.0, 0.0), p(1.0, 1.0, 0.0));
        let stranger = beam(&mut model, p(5.0, 0.0, 0.0), p(6.0, 0.0, 0.0));
        let candidate = model
            .add_joint_candidate(CandidateData::new(
                [a, b],
                JointTopology::L,
                p(1.0, 0.0, 0.0),
                0.0,
            ))
            .unwrap();

        let res = promote_joint_candidate(
            &mut model,
            candidate,
            JointKind::Miter,
            Some(vec![a, stranger]),
            JointOptions::default(),
        );
        assert!(matches!(
            res,
            Err(crate::TenonError::Joinery(JoineryError::ElementsMismatch))
        ));
    }

    #[test]
    fn cluster_promotion_consumes_all_member_candidates() {
        let mut model = Model::new();
        // A three-member Y junction out of two L candidates.
        let a = beam(&mut model, p(0.0, 0.0, 0.0), p(1.0, 0.0, 0.0));
        let b = beam(&mut model, p(0.0, 0.0, 0.0), p(0.0, 1.0, 0.0));
        let c = beam(&mut model, p(0.0, 0.0, 0.0), p(-1.0, 1.0, 0.0));
        for pair in [[a, b], [a, c]] {
            model
                .add_joint_candidate(CandidateData::new(
                    pair,
                    JointTopology::L,
                    p(0.0, 0.0, 0.0),
                    0.0,
                ))
                .unwrap();
        }

        let clusters = NBeamKdTreeAnalyzer::new(3).find(&model).unwrap();
        assert_eq!(clusters.len(), 1);

        let joint = promote_cluster(
            &mut model,
            &clusters[0],
            JointKind::Hub,
            None,
            JointOptions::default(),
        )
        .unwrap();

        assert_eq!(model.joint_candidates().count(), 0);
        assert_eq!(model.joint(joint).unwrap().elements.len(), 3);
        assert_eq!(model.joint(joint).unwrap().topology, JointTopology::Y);
    }
}
