use tracing::{debug, info};

use crate::error::{ResolutionError, Result};
use crate::math::TOLERANCE;
use crate::model::{JointKind, JointOptions, JointTopology, MemberId, Model};
use crate::pipeline::promote_cluster;
use crate::solver::{Cluster, CompositeAnalyzer};

/// Rule naming an exact member pair.
#[derive(Debug, Clone)]
pub struct ExplicitPairRule {
    /// The named members; order fixes the roles for ordered joint kinds.
    pub members: (MemberId, MemberId),
    /// Target joint type.
    pub kind: JointKind,
    /// Per-rule max-distance override.
    pub max_distance: Option<f64>,
    /// Extra constructor arguments.
    pub options: JointOptions,
}

/// Rule matching members by their category attribute.
#[derive(Debug, Clone)]
pub struct CategoryPairRule {
    /// The two category labels; for ordered joint kinds the first
    /// label maps to the main role.
    pub categories: (String, String),
    /// Target joint type.
    pub kind: JointKind,
    /// Per-rule max-distance override.
    pub max_distance: Option<f64>,
    /// Extra constructor arguments.
    pub options: JointOptions,
}

/// Rule matching purely on the candidate's or cluster's topology.
#[derive(Debug, Clone)]
pub struct TopologyRule {
    /// Topology tag to match.
    pub topology: JointTopology,
    /// Target joint type.
    pub kind: JointKind,
    /// Per-rule max-distance override.
    pub max_distance: Option<f64>,
    /// Extra constructor arguments.
    pub options: JointOptions,
}

impl TopologyRule {
    /// Shorthand for a bare topology-to-kind mapping.
    #[must_use]
    pub fn new(topology: JointTopology, kind: JointKind) -> Self {
        Self {
            topology,
            kind,
            max_distance: None,
            options: JointOptions::default(),
        }
    }
}

/// A declarative mapping from a matching condition to a concrete joint
/// type. Evaluated in fixed priority order: explicit pairs, then
/// category pairs, then topology rules.
#[derive(Debug, Clone)]
pub enum JointRule {
    /// Names exact members.
    ExplicitPair(ExplicitPairRule),
    /// Matches by the members' category attribute.
    CategoryPair(CategoryPairRule),
    /// Matches by topology tag alone.
    Topology(TopologyRule),
}

impl JointRule {
    fn priority(&self) -> u8 {
        match self {
            Self::ExplicitPair(_) => 0,
            Self::CategoryPair(_) => 1,
            Self::Topology(_) => 2,
        }
    }

    fn kind(&self) -> JointKind {
        match self {
            Self::ExplicitPair(r) => r.kind,
            Self::CategoryPair(r) => r.kind,
            Self::Topology(r) => r.kind,
        }
    }

    fn max_distance(&self) -> Option<f64> {
        match self {
            Self::ExplicitPair(r) => r.max_distance,
            Self::CategoryPair(r) => r.max_distance,
            Self::Topology(r) => r.max_distance,
        }
    }

    fn options(&self) -> JointOptions {
        match self {
            Self::ExplicitPair(r) => r.options.clone(),
            Self::CategoryPair(r) => r.options.clone(),
            Self::Topology(r) => r.options.clone(),
        }
    }
}

/// A captured failure of one rule match against one cluster.
#[derive(Debug)]
pub struct ResolutionFailure {
    /// The cluster's member references.
    pub elements: Vec<MemberId>,
    /// The joint kind that rejected the match.
    pub kind: JointKind,
    /// Debug message from the rejection.
    pub message: String,
}

/// Result of a full rule-resolution pass.
#[derive(Debug, Default)]
pub struct RuleApplication {
    /// Captured per-cluster failures, in processing order.
    pub errors: Vec<ResolutionFailure>,
    /// Clusters that matched no rule, or failed validation for every
    /// rule that did match.
    pub unjoined: Vec<Cluster>,
}

/// Structural match of one rule against one cluster.
enum RuleMatch {
    /// Matched; carries the element order to construct with, when the
    /// rule fixes one.
    Matched(Option<Vec<MemberId>>),
    NotMatched,
}

/// Consumes every joint candidate (grouped into clusters for dense
/// junctions) and resolves each to at most one concrete joint.
///
/// First matching rule wins per cluster, in explicit > category >
/// topology order. A rule-level max distance supersedes
/// `default_max_distance` for that match; validation failures are
/// captured into the returned error list, leaving the cluster in
/// `unjoined`.
///
/// # Errors
///
/// Fails hard only for misconfigurations not attributable to a single
/// candidate: a matched rule with no resolvable max distance while the
/// candidate lies beyond zero tolerance.
pub fn apply_rules_to_model(
    rules: &[JointRule],
    model: &mut Model,
    default_max_distance: Option<f64>,
) -> Result<RuleApplication> {
    let mut application = RuleApplication::default();
    if model.joint_candidates().next().is_none() {
        return Ok(application);
    }

    // Dense junctions first, leftovers as singleton clusters.
    let mut clusters = CompositeAnalyzer::descending().find(model)?;
    let mut claimed: Vec<_> = Vec::new();
    for cluster in &clusters {
        claimed.extend_from_slice(cluster.candidates());
    }
    for (id, _) in model.joint_candidates() {
        if !claimed.contains(&id) {
            clusters.push(Cluster::new(vec![id]));
        }
    }

    // Fixed priority order, stable within each class.
    let mut ordered: Vec<&JointRule> = rules.iter().collect();
    ordered.sort_by_key(|r| r.priority());

    let mut joined = 0usize;
    for cluster in clusters {
        let mut resolved = false;
        for &rule in &ordered {
            let matched = match_rule(rule, model, &cluster)?;
            let RuleMatch::Matched(reordered) = matched else {
                continue;
            };

            let effective_max = rule.max_distance().or(default_max_distance);
            let distance = cluster.max_candidate_distance(model);
            match effective_max {
                Some(limit) if distance > limit => continue,
                None if distance > TOLERANCE => {
                    return Err(ResolutionError::NoMaxDistance { distance }.into());
                }
                _ => {}
            }

            match promote_cluster(model, &cluster, rule.kind(), reordered, rule.options()) {
                Ok(joint) => {
                    debug!(kind = rule.kind().name(), ?joint, "cluster resolved");
                    joined += 1;
                    resolved = true;
                    break;
                }
                Err(e) => {
                    application.errors.push(ResolutionFailure {
                        elements: cluster.elements(model),
                        kind: rule.kind(),
                        message: e.to_string(),
                    });
                }
            }
        }
        if !resolved {
            application.unjoined.push(cluster);
        }
    }

    info!(
        joined,
        unjoined = application.unjoined.len(),
        errors = application.errors.len(),
        "rule resolution complete"
    );
    Ok(application)
}

fn match_rule(rule: &JointRule, model: &Model, cluster: &Cluster) -> Result<RuleMatch> {
    match rule {
        JointRule::ExplicitPair(r) => {
            let [candidate] = cluster.candidates() else {
                return Ok(RuleMatch::NotMatched);
            };
            let members = model.candidate(*candidate)?.members;
            let (a, b) = r.members;
            let matched = if r.kind.ordered() {
                members == [a, b]
            } else {
                members == [a, b] || members == [b, a]
            };
            if matched {
                Ok(RuleMatch::Matched(Some(vec![members[0], members[1]])))
            } else {
                Ok(RuleMatch::NotMatched)
            }
        }
        JointRule::CategoryPair(r) => {
            let [candidate] = cluster.candidates() else {
                return Ok(RuleMatch::NotMatched);
            };
            let members = model.candidate(*candidate)?.members;
            let (Some(cat_a), Some(cat_b)) = (
                model.member(members[0])?.category(),
                model.member(members[1])?.category(),
            ) else {
                return Ok(RuleMatch::NotMatched);
            };

            if r.kind.ordered() {
                // The first label maps to the main role, which the
                // solver stored as the candidate's first member.
                if cat_a == r.categories.0 && cat_b == r.categories.1 {
                    Ok(RuleMatch::Matched(Some(vec![members[0], members[1]])))
                } else {
                    Ok(RuleMatch::NotMatched)
                }
            } else {
                let forward = cat_a == r.categories.0 && cat_b == r.categories.1;
                let reverse = cat_a == r.categories.1 && cat_b == r.categories.0;
                if forward || reverse {
                    Ok(RuleMatch::Matched(None))
                } else {
                    Ok(RuleMatch::NotMatched)
                }
            }
        }
        JointRule::Topology(r) => {
            if cluster.topology(model) == r.topology {
                Ok(RuleMatch::Matched(None))
            } else {
                Ok(RuleMatch::NotMatched)
            }
        }
    }
}
