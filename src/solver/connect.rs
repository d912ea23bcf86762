use tracing::{debug, info};

use crate::error::Result;
use crate::math::Point3;
use crate::model::{CandidateData, CandidateId, JointTopology, MemberData, MemberId, Model};

use super::{PairTopology, PlatePairTopology};

/// Axis-aligned bounding box used to prune the pairwise sweep.
#[derive(Debug, Clone, Copy)]
struct Aabb {
    min: Point3,
    max: Point3,
}

impl Aabb {
    fn from_points<'a>(points: impl Iterator<Item = &'a Point3>, inflate: f64) -> Self {
        let mut min = Point3::new(f64::INFINITY, f64::INFINITY, f64::INFINITY);
        let mut max = Point3::new(f64::NEG_INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY);
        for p in points {
            min = Point3::new(min.x.min(p.x), min.y.min(p.y), min.z.min(p.z));
            max = Point3::new(max.x.max(p.x), max.y.max(p.y), max.z.max(p.z));
        }
        Self {
            min: min - nalgebra::Vector3::repeat(inflate),
            max: max + nalgebra::Vector3::repeat(inflate),
        }
    }

    fn overlaps(&self, other: &Self) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
            && self.min.z <= other.max.z
            && self.max.z >= other.min.z
    }
}

fn member_aabb(data: &MemberData, inflate: f64) -> Option<Aabb> {
    if let Some(centerline) = data.centerline() {
        Some(Aabb::from_points(
            [centerline.start(), centerline.end()].into_iter(),
            inflate,
        ))
    } else {
        data.boundary()
            .map(|b| Aabb::from_points(b.points().iter(), inflate))
    }
}

/// Sweeps every unordered beam pair in the model and stores a joint
/// candidate for each pair found adjacent within `max_distance`.
///
/// Pairs already joined or already candidate-linked are skipped, so
/// calling this twice on an unchanged model creates no duplicates. An
/// AABB prefilter (boxes inflated by `max_distance`) avoids running
/// the solver on distant pairs.
///
/// # Errors
///
/// Returns an error if the model graph rejects a candidate insert;
/// geometric non-relationships are not errors.
pub fn connect_adjacent_beams(
    model: &mut Model,
    max_distance: f64,
) -> Result<Vec<CandidateId>> {
    let beams: Vec<MemberId> = model
        .members()
        .filter(|(_, m)| m.centerline().is_some())
        .map(|(id, _)| id)
        .collect();
    connect_members(model, &beams, max_distance, false)
}

/// Plate counterpart of [`connect_adjacent_beams`], storing `EdgeEdge`
/// and `EdgeFace` candidates.
///
/// # Errors
///
/// Returns an error if a plate boundary is degenerate or the model
/// graph rejects a candidate insert.
pub fn connect_adjacent_plates(
    model: &mut Model,
    max_distance: f64,
) -> Result<Vec<CandidateId>> {
    let plates: Vec<MemberId> = model
        .members()
        .filter(|(_, m)| m.boundary().is_some())
        .map(|(id, _)| id)
        .collect();
    connect_members(model, &plates, max_distance, true)
}

fn connect_members(
    model: &mut Model,
    ids: &[MemberId],
    max_distance: f64,
    plates: bool,
) -> Result<Vec<CandidateId>> {
    let aabbs: Vec<Option<Aabb>> = ids
        .iter()
        .map(|id| model.member(*id).ok().and_then(|m| member_aabb(m, max_distance)))
        .collect();

    let mut created = Vec::new();
    let mut pairs_tested = 0usize;

    for i in 0..ids.len() {
        for j in (i + 1)..ids.len() {
            let (a, b) = (ids[i], ids[j]);
            match (&aabbs[i], &aabbs[j]) {
                (Some(box_a), Some(box_b)) if box_a.overlaps(box_b) => {}
                _ => continue,
            }
            if model.candidate_between(a, b).is_some() || model.are_joined(a, b) {
                continue;
            }
            pairs_tested += 1;

            let candidate = if plates {
                let res = PlatePairTopology::new(a, b)
                    .with_max_distance(max_distance)
                    .execute(model)?;
                match (res.topology, res.location, res.distance) {
                    (JointTopology::Unknown, _, _) | (_, None, _) | (_, _, None) => None,
                    (topology, Some(location), Some(distance)) => {
                        Some(CandidateData::new([a, b], topology, location, distance))
                    }
                }
            } else {
                let res = PairTopology::new(a, b)
                    .with_max_distance(max_distance)
                    .execute(model)?;
                match (res.topology, res.location, res.distance) {
                    (JointTopology::Unknown, _, _) | (_, None, _) | (_, _, None) => None,
                    (topology, Some(location), Some(distance)) => Some(CandidateData::new(
                        [res.main, res.cross],
                        topology,
                        location,
                        distance,
                    )),
                }
            };

            if let Some(data) = candidate {
                debug!(
                    topology = data.topology.name(),
                    distance = data.distance,
                    "adjacency detected"
                );
                created.push(model.add_joint_candidate(data)?);
            }
        }
    }

    info!(
        members = ids.len(),
        pairs_tested,
        candidates = created.len(),
        "adjacency sweep complete"
    );
    Ok(created)
}
