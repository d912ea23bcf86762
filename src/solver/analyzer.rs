use kiddo::{KdTree, SquaredEuclidean};
use tracing::debug;

use crate::error::{ModelError, Result};
use crate::model::{CandidateId, Model};

use super::{Cluster, DEFAULT_JUNCTION_TOLERANCE};

/// Finds all groups of exactly `n` members whose candidate locations
/// coincide at a shared junction.
///
/// The clustering key is mutual proximity of the candidate locations,
/// not transitive pairwise adjacency of the members: two members that
/// never pairwise intersect still cluster when their candidates with
/// other members land on the same junction point.
pub struct NBeamKdTreeAnalyzer {
    n: usize,
    tolerance: f64,
}

impl NBeamKdTreeAnalyzer {
    /// Creates an analyzer for junctions of exactly `n` members.
    #[must_use]
    pub fn new(n: usize) -> Self {
        Self {
            n,
            tolerance: DEFAULT_JUNCTION_TOLERANCE,
        }
    }

    /// Overrides the junction radius.
    #[must_use]
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Finds every `n`-member junction among the model's candidates.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::EmptyModel`] when the model has no members.
    pub fn find(&self, model: &Model) -> Result<Vec<Cluster>> {
        Ok(self.find_among(model, None)?)
    }

    /// As [`find`](Self::find), restricted to the given candidates when
    /// a subset is supplied.
    fn find_among(
        &self,
        model: &Model,
        subset: Option<&[CandidateId]>,
    ) -> std::result::Result<Vec<Cluster>, ModelError> {
        if model.member_count() == 0 {
            return Err(ModelError::EmptyModel);
        }

        let candidates: Vec<CandidateId> = match subset {
            Some(ids) => ids.to_vec(),
            None => model.joint_candidates().map(|(id, _)| id).collect(),
        };
        if candidates.is_empty() {
            return Ok(Vec::new());
        }

        let mut tree: KdTree<f64, 3> = KdTree::new();
        let mut coords = Vec::with_capacity(candidates.len());
        for (i, id) in candidates.iter().enumerate() {
            let location = model.candidate(*id)?.location;
            let coord = [location.x, location.y, location.z];
            #[allow(clippy::cast_possible_truncation)]
            tree.add(&coord, i as u64);
            coords.push(coord);
        }

        let radius_sq = self.tolerance * self.tolerance;
        let mut claimed = vec![false; candidates.len()];
        let mut clusters = Vec::new();

        for i in 0..candidates.len() {
            if claimed[i] {
                continue;
            }
            let neighbors = tree.within_unsorted::<SquaredEuclidean>(&coords[i], radius_sq);
            let mut group = vec![i];
            for neighbor in neighbors {
                #[allow(clippy::cast_possible_truncation)]
                let j = neighbor.item as usize;
                if j == i || claimed[j] {
                    continue;
                }
                // Two locations belong to the same junction only when
                // they are mutually close to every member of the group.
                let mutual = group.iter().all(|&k| {
                    squared_distance(&coords[j], &coords[k]) <= radius_sq
                });
                if mutual {
                    group.push(j);
                }
            }

            for &k in &group {
                claimed[k] = true;
            }

            let cluster = Cluster::new(group.iter().map(|&k| candidates[k]).collect());
            let members = cluster.elements(model).len();
            if members == self.n {
                clusters.push(cluster);
            }
        }

        debug!(
            arity = self.n,
            clusters = clusters.len(),
            "junction scan complete"
        );
        Ok(clusters)
    }
}

fn squared_distance(a: &[f64; 3], b: &[f64; 3]) -> f64 {
    (a[0] - b[0]).powi(2) + (a[1] - b[1]).powi(2) + (a[2] - b[2]).powi(2)
}

/// Composes several fixed-arity analyzers so a model with mixed
/// junction sizes produces a clean partition.
///
/// Arities run in the given order; candidates claimed by an earlier
/// cluster are withheld from later passes, so no candidate is counted
/// twice.
pub struct CompositeAnalyzer {
    arities: Vec<usize>,
    tolerance: f64,
}

impl CompositeAnalyzer {
    /// Creates a composite over the given arities.
    #[must_use]
    pub fn new(arities: Vec<usize>) -> Self {
        Self {
            arities,
            tolerance: DEFAULT_JUNCTION_TOLERANCE,
        }
    }

    /// Composite over arities 6 down to 3, the usual sweep before rule
    /// resolution.
    #[must_use]
    pub fn descending() -> Self {
        Self::new(vec![6, 5, 4, 3])
    }

    /// Overrides the junction radius.
    #[must_use]
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Runs every arity in order and concatenates the cluster results.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::EmptyModel`] when the model has no members.
    pub fn find(&self, model: &Model) -> Result<Vec<Cluster>> {
        let mut remaining: Vec<CandidateId> =
            model.joint_candidates().map(|(id, _)| id).collect();
        let mut clusters = Vec::new();

        for &arity in &self.arities {
            let analyzer = NBeamKdTreeAnalyzer::new(arity).with_tolerance(self.tolerance);
            let found = analyzer.find_among(model, Some(&remaining))?;
            for cluster in found {
                remaining.retain(|id| !cluster.candidates().contains(id));
                clusters.push(cluster);
            }
        }
        Ok(clusters)
    }
}
