pub mod candidate;
pub mod joint;
pub mod member;

pub use candidate::{CandidateData, CandidateId, JointTopology};
pub use joint::{JointData, JointId, JointKind, JointOptions};
pub use member::{BlankExtension, Feature, MemberData, MemberGeometry, MemberId};

use crate::error::ModelError;
use slotmap::SlotMap;

/// Central arena that owns all members, joint candidates, and joints.
///
/// Entities reference each other via typed IDs (generational indices).
/// The candidate and joint collections are mutated only by the solver,
/// resolver, and lifecycle layers.
#[derive(Debug, Default)]
pub struct Model {
    members: SlotMap<MemberId, MemberData>,
    candidates: SlotMap<CandidateId, CandidateData>,
    joints: SlotMap<JointId, JointData>,
}

impl Model {
    /// Creates a new, empty model.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // --- Member operations ---

    /// Inserts a member and returns its ID.
    pub fn add_member(&mut self, data: MemberData) -> MemberId {
        self.members.insert(data)
    }

    /// Returns a reference to the member data, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the model.
    pub fn member(&self, id: MemberId) -> Result<&MemberData, ModelError> {
        self.members
            .get(id)
            .ok_or_else(|| ModelError::EntityNotFound("member".into()))
    }

    /// Returns a mutable reference to the member data, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the model.
    pub fn member_mut(&mut self, id: MemberId) -> Result<&mut MemberData, ModelError> {
        self.members
            .get_mut(id)
            .ok_or_else(|| ModelError::EntityNotFound("member".into()))
    }

    /// Iterates over all member IDs.
    pub fn elements(&self) -> impl Iterator<Item = MemberId> + '_ {
        self.members.keys()
    }

    /// Iterates over all members with their IDs.
    pub fn members(&self) -> impl Iterator<Item = (MemberId, &MemberData)> {
        self.members.iter()
    }

    /// Number of members in the model.
    #[must_use]
    pub fn member_count(&self) -> usize {
        self.members.len()
    }

    // --- Candidate operations ---

    /// Inserts a joint candidate and returns its ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the candidate's members are not distinct, a
    /// member is missing from the model, or a candidate already exists
    /// for the unordered pair.
    pub fn add_joint_candidate(
        &mut self,
        data: CandidateData,
    ) -> Result<CandidateId, ModelError> {
        let [a, b] = data.members;
        if a == b {
            return Err(ModelError::IdenticalMembers);
        }
        if !self.members.contains_key(a) || !self.members.contains_key(b) {
            return Err(ModelError::EntityNotFound("member".into()));
        }
        if self.candidate_between(a, b).is_some() {
            return Err(ModelError::DuplicateCandidate);
        }
        Ok(self.candidates.insert(data))
    }

    /// Removes a joint candidate, returning its data.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the model.
    pub fn remove_joint_candidate(
        &mut self,
        id: CandidateId,
    ) -> Result<CandidateData, ModelError> {
        self.candidates
            .remove(id)
            .ok_or_else(|| ModelError::EntityNotFound("joint candidate".into()))
    }

    /// Returns a reference to the candidate data, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the model.
    pub fn candidate(&self, id: CandidateId) -> Result<&CandidateData, ModelError> {
        self.candidates
            .get(id)
            .ok_or_else(|| ModelError::EntityNotFound("joint candidate".into()))
    }

    /// Iterates over all joint candidates with their IDs.
    pub fn joint_candidates(&self) -> impl Iterator<Item = (CandidateId, &CandidateData)> {
        self.candidates.iter()
    }

    /// Returns the candidate linking the unordered member pair, if any.
    #[must_use]
    pub fn candidate_between(&self, a: MemberId, b: MemberId) -> Option<CandidateId> {
        self.candidates
            .iter()
            .find(|(_, c)| c.is_pair(a, b))
            .map(|(id, _)| id)
    }

    // --- Joint operations ---

    /// Inserts a joint and returns its ID.
    ///
    /// Geometric validation belongs to the lifecycle layer; this only
    /// checks that every element is present in the model.
    ///
    /// # Errors
    ///
    /// Returns an error if an element is missing from the model.
    pub fn add_joint(&mut self, data: JointData) -> Result<JointId, ModelError> {
        if data
            .elements
            .iter()
            .any(|id| !self.members.contains_key(*id))
        {
            return Err(ModelError::EntityNotFound("member".into()));
        }
        Ok(self.joints.insert(data))
    }

    /// Removes a joint, reverting the blank extensions and dropping the
    /// features it requested on its members.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the model.
    pub fn remove_joint(&mut self, id: JointId) -> Result<JointData, ModelError> {
        let data = self
            .joints
            .remove(id)
            .ok_or_else(|| ModelError::EntityNotFound("joint".into()))?;
        for element in &data.elements {
            if let Some(member) = self.members.get_mut(*element) {
                member.remove_blank_extension(id);
                member.remove_features_of(id);
            }
        }
        Ok(data)
    }

    /// Returns a reference to the joint data, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the model.
    pub fn joint(&self, id: JointId) -> Result<&JointData, ModelError> {
        self.joints
            .get(id)
            .ok_or_else(|| ModelError::EntityNotFound("joint".into()))
    }

    /// Iterates over all joints with their IDs.
    pub fn joints(&self) -> impl Iterator<Item = (JointId, &JointData)> {
        self.joints.iter()
    }

    /// Returns `true` when some joint references both members.
    #[must_use]
    pub fn are_joined(&self, a: MemberId, b: MemberId) -> bool {
        self.joints
            .values()
            .any(|j| j.elements.contains(&a) && j.elements.contains(&b))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::geometry::Segment;
    use crate::math::Point3;

    fn beam(model: &mut Model, start: Point3, end: Point3) -> MemberId {
        model.add_member(MemberData::beam(
            Segment::new(start, end).unwrap(),
            0.1,
            0.1,
        ))
    }

    #[test]
    fn duplicate_candidate_rejected_either_order() {
        let mut model = Model::new();
        let a = beam(&mut model, Point3::origin(), Point3::new(1.0, 0.0, 0.0));
        let b = beam(
            &mut model,
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
        );

        model
            .add_joint_candidate(CandidateData::new(
                [a, b],
                JointTopology::L,
                Point3::new(1.0, 0.0, 0.0),
                0.0,
            ))
            .unwrap();

        let dup = model.add_joint_candidate(CandidateData::new(
            [b, a],
            JointTopology::L,
            Point3::new(1.0, 0.0, 0.0),
            0.0,
        ));
        assert!(matches!(dup, Err(ModelError::DuplicateCandidate)));
    }

    #[test]
    fn identical_members_rejected() {
        let mut model = Model::new();
        let a = beam(&mut model, Point3::origin(), Point3::new(1.0, 0.0, 0.0));
        let res = model.add_joint_candidate(CandidateData::new(
            [a, a],
            JointTopology::L,
            Point3::origin(),
            0.0,
        ));
        assert!(matches!(res, Err(ModelError::IdenticalMembers)));
    }

    #[test]
    fn remove_joint_reverts_extensions_and_features() {
        let mut model = Model::new();
        let a = beam(&mut model, Point3::origin(), Point3::new(1.0, 0.0, 0.0));
        let b = beam(
            &mut model,
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
        );
        let joint = model
            .add_joint(JointData {
                kind: JointKind::Miter,
                elements: vec![a, b],
                topology: JointTopology::L,
                location: Point3::new(1.0, 0.0, 0.0),
                options: JointOptions::default(),
            })
            .unwrap();

        model.member_mut(a).unwrap().add_blank_extension(0.0, 0.5, joint);
        assert!(model.member(a).unwrap().blank_extension().end > 0.0);

        model.remove_joint(joint).unwrap();
        assert_eq!(
            model.member(a).unwrap().blank_extension(),
            BlankExtension::default()
        );
        assert!(!model.are_joined(a, b));
    }
}
