use crate::error::Result;
use crate::math::{Point3, PARAM_TOLERANCE};
use crate::model::{CandidateId, JointTopology, MemberId, Model};

/// An ordered collection of joint candidates sharing a junction region.
#[derive(Debug, Clone, Default)]
pub struct Cluster {
    candidates: Vec<CandidateId>,
}

/// Partition of a cluster's members into node roles.
#[derive(Debug, Clone, Default)]
pub struct ClusterRoles {
    /// Members continuing through the junction (or forming a collinear
    /// continuation across it).
    pub cross: Vec<MemberId>,
    /// Members terminating at the junction.
    pub main: Vec<MemberId>,
}

impl Cluster {
    /// Creates a cluster from its candidate IDs.
    #[must_use]
    pub fn new(candidates: Vec<CandidateId>) -> Self {
        Self { candidates }
    }

    /// The candidate IDs, in insertion order.
    #[must_use]
    pub fn candidates(&self) -> &[CandidateId] {
        &self.candidates
    }

    /// Returns `true` when the cluster holds no candidates.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    /// Union of the member references of all candidates, in first-seen
    /// order.
    #[must_use]
    pub fn elements(&self, model: &Model) -> Vec<MemberId> {
        let mut members = Vec::new();
        for id in &self.candidates {
            if let Ok(candidate) = model.candidate(*id) {
                for m in candidate.members {
                    if !members.contains(&m) {
                        members.push(m);
                    }
                }
            }
        }
        members
    }

    /// Mean of the candidate locations, or `None` for an empty cluster.
    #[must_use]
    pub fn location(&self, model: &Model) -> Option<Point3> {
        let mut sum = nalgebra::Vector3::zeros();
        let mut count = 0usize;
        for id in &self.candidates {
            if let Ok(candidate) = model.candidate(*id) {
                sum += candidate.location.coords;
                count += 1;
            }
        }
        if count == 0 {
            return None;
        }
        #[allow(clippy::cast_precision_loss)]
        let mean = Point3::from(sum / count as f64);
        Some(mean)
    }

    /// Largest candidate distance in the cluster, used against rule
    /// max-distance limits.
    #[must_use]
    pub fn max_candidate_distance(&self, model: &Model) -> f64 {
        self.candidates
            .iter()
            .filter_map(|id| model.candidate(*id).ok())
            .map(|c| c.distance)
            .fold(0.0, f64::max)
    }

    /// Derives the aggregate topology of the cluster.
    ///
    /// Precedence: empty clusters are `Unknown`; a single candidate
    /// contributes its own topology; any `T` or `X` among multiple
    /// candidates makes the junction `K`; multiple candidates all in
    /// `{L, I}` make it `Y`; every other mix (an `Unknown` member, or
    /// plate topologies mixed with centerline ones) is `Unknown`.
    #[must_use]
    pub fn topology(&self, model: &Model) -> JointTopology {
        let topologies: Vec<JointTopology> = self
            .candidates
            .iter()
            .filter_map(|id| model.candidate(*id).ok())
            .map(|c| c.topology)
            .collect();

        match topologies.as_slice() {
            [] => JointTopology::Unknown,
            [single] => *single,
            many => {
                if many
                    .iter()
                    .any(|t| matches!(t, JointTopology::T | JointTopology::X))
                {
                    JointTopology::K
                } else if many
                    .iter()
                    .all(|t| matches!(t, JointTopology::L | JointTopology::I))
                {
                    JointTopology::Y
                } else {
                    JointTopology::Unknown
                }
            }
        }
    }

    /// Partitions the cluster's beam members into "cross" members that
    /// continue through the junction and "main" members that terminate
    /// at it.
    ///
    /// A member is cross when its junction parameter is interior, or
    /// when it pairs with another terminating member into a collinear
    /// opposite-facing continuation; relative length breaks such pairs
    /// toward the longer members.
    ///
    /// # Errors
    ///
    /// Returns an error if a referenced member is missing from the model.
    pub fn partition_roles(&self, model: &Model) -> Result<ClusterRoles> {
        let Some(junction) = self.location(model) else {
            return Ok(ClusterRoles::default());
        };

        let mut roles = ClusterRoles::default();
        // Terminating members with their outward unit direction and length.
        let mut terminating: Vec<(MemberId, nalgebra::Vector3<f64>, f64)> = Vec::new();

        for id in self.elements(model) {
            let member = model.member(id)?;
            let Some(centerline) = member.centerline() else {
                continue;
            };
            let t = centerline.closest_param(&junction);
            if t > PARAM_TOLERANCE && t < 1.0 - PARAM_TOLERANCE {
                roles.cross.push(id);
            } else {
                let far = if t < 0.5 {
                    centerline.end()
                } else {
                    centerline.start()
                };
                let outward = (far - junction).normalize();
                terminating.push((id, outward, centerline.length()));
            }
        }

        // Collinear opposite-facing pairs form a continuation: treat
        // both halves as one cross member split at the node.
        let mut paired = vec![false; terminating.len()];
        for i in 0..terminating.len() {
            if paired[i] {
                continue;
            }
            let mut partner: Option<usize> = None;
            for j in (i + 1)..terminating.len() {
                if paired[j] {
                    continue;
                }
                if terminating[i].1.dot(&terminating[j].1) < -0.999 {
                    let better = partner.is_none()
                        || terminating[j].2 > partner.map_or(0.0, |p| terminating[p].2);
                    if better {
                        partner = Some(j);
                    }
                }
            }
            if let Some(j) = partner {
                paired[i] = true;
                paired[j] = true;
                roles.cross.push(terminating[i].0);
                roles.cross.push(terminating[j].0);
            }
        }
        for (k, (id, _, _)) in terminating.iter().enumerate() {
            if !paired[k] {
                roles.main.push(*id);
            }
        }

        Ok(roles)
    }
}
