//! Skeleton reconstruction from weighted vertex groups.
//!
//! CAR-style data carries vertex-to-group ownership but no bone tree.
//! Reconstruction computes a weighted centroid per group and grows a
//! spanning tree outward from a root, with one twist: candidate edges that
//! cross the model's lateral center plane are penalized hard, because a
//! plain nearest-centroid tree reliably wires mirrored extremities to each
//! other (left foot to right foot) whenever they sit closer together than
//! to their true parent.

use cgmath::{InnerSpace, Vector3};

use crate::math::DfVector3;
use crate::model::records::Bone;

/// Lateral deadzone around x = 0; bones inside it count as center-line.
pub const SYMMETRY_DEADZONE: f32 = 0.05;

/// Distance multiplier for edges crossing the center plane.
pub const SYMMETRY_PENALTY: f32 = 50.0;

/// Reserved group-name token marking the ground/floor anchor bone.
const ROOT_NAME_TOKEN: &str = "floor";

/// Weighted centroid per group.
///
/// `memberships[v]` lists `(group, weight)` pairs for vertex `v`. A group
/// that owns no weight falls back to the overall mesh centroid.
pub fn weighted_centroids(
    positions: &[Vector3<f32>],
    memberships: &[Vec<(usize, f32)>],
    group_count: usize,
) -> Vec<Vector3<f32>> {
    let mut accum = vec![Vector3::new(0.0f32, 0.0, 0.0); group_count];
    let mut weight_sum = vec![0.0f32; group_count];

    for (v, groups) in memberships.iter().enumerate() {
        let pos = positions[v];
        for &(group, weight) in groups {
            if group < group_count {
                accum[group] += pos * weight;
                weight_sum[group] += weight;
            }
        }
    }

    let mesh_centroid = if positions.is_empty() {
        Vector3::new(0.0, 0.0, 0.0)
    } else {
        positions.iter().fold(Vector3::new(0.0f32, 0.0, 0.0), |a, p| a + *p)
            / positions.len() as f32
    };

    accum
        .into_iter()
        .zip(weight_sum)
        .map(|(sum, w)| if w > 0.0 { sum / w } else { mesh_centroid })
        .collect()
}

fn crosses_center_plane(a: &Vector3<f32>, b: &Vector3<f32>) -> bool {
    (a.x > SYMMETRY_DEADZONE && b.x < -SYMMETRY_DEADZONE)
        || (a.x < -SYMMETRY_DEADZONE && b.x > SYMMETRY_DEADZONE)
}

/// Infer a parent index per group (-1 for the root) from unordered
/// centroids via greedy nearest-unconnected expansion.
///
/// The result is a heuristic rig: deterministic, acyclic and single-rooted,
/// but it may still need manual correction for unusual anatomy.
pub fn infer_parents(centroids: &[Vector3<f32>], names: &[String]) -> Vec<i32> {
    let n = centroids.len();
    if n <= 1 {
        return vec![-1; n];
    }

    let root = names
        .iter()
        .position(|name| name.to_lowercase().contains(ROOT_NAME_TOKEN))
        .unwrap_or(0);

    let mut parents = vec![-1i32; n];
    let mut connected = vec![false; n];
    connected[root] = true;

    for _ in 0..n - 1 {
        let mut best_dist = f32::INFINITY;
        let mut best_pair: (usize, usize) = (usize::MAX, usize::MAX);

        for i in 0..n {
            if !connected[i] {
                continue;
            }
            for j in 0..n {
                if connected[j] {
                    continue;
                }
                let mut dist = (centroids[i] - centroids[j]).magnitude();
                if crosses_center_plane(&centroids[i], &centroids[j]) {
                    dist *= SYMMETRY_PENALTY;
                }
                if dist < best_dist {
                    best_dist = dist;
                    best_pair = (i, j);
                }
            }
        }

        if best_pair.1 != usize::MAX {
            parents[best_pair.1] = best_pair.0 as i32;
            connected[best_pair.1] = true;
        }
    }

    parents
}

/// Full reconstruction: centroids, inferred hierarchy, assembled bone list.
pub fn reconstruct_skeleton(
    positions: &[Vector3<f32>],
    memberships: &[Vec<(usize, f32)>],
    names: &[String],
) -> Vec<Bone> {
    let centroids = weighted_centroids(positions, memberships, names.len());
    let parents = infer_parents(&centroids, names);

    names
        .iter()
        .zip(centroids.iter())
        .zip(parents.iter())
        .map(|((name, centroid), &parent)| Bone {
            name: name.clone(),
            pos: DfVector3(*centroid),
            parent: parent as i16,
            hidden: 0,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn centroid_weights_average_positions() {
        let positions = vec![
            Vector3::new(0.0, 0.0, 0.0),
            Vector3::new(2.0, 0.0, 0.0),
        ];
        let memberships = vec![vec![(0usize, 1.0f32)], vec![(0, 3.0)]];
        let centroids = weighted_centroids(&positions, &memberships, 1);
        assert_eq!(centroids[0], Vector3::new(1.5, 0.0, 0.0));
    }

    #[test]
    fn empty_group_falls_back_to_mesh_centroid() {
        let positions = vec![
            Vector3::new(0.0, 0.0, 0.0),
            Vector3::new(4.0, 0.0, 0.0),
        ];
        let memberships = vec![vec![(0usize, 1.0f32)], vec![(0, 1.0)]];
        let centroids = weighted_centroids(&positions, &memberships, 2);
        assert_eq!(centroids[1], Vector3::new(2.0, 0.0, 0.0));
    }

    #[test]
    fn root_prefers_floor_named_group() {
        let centroids = vec![
            Vector3::new(0.0, 0.0, 5.0),
            Vector3::new(0.0, 0.0, 0.0),
            Vector3::new(0.0, 0.0, 1.0),
        ];
        let parents = infer_parents(&centroids, &names(&["Head", "FloorAnchor", "Spine"]));
        assert_eq!(parents[1], -1);
        assert_ne!(parents[0], -1);
        assert_ne!(parents[2], -1);
    }

    #[test]
    fn tree_is_acyclic_single_rooted_and_connected() {
        let centroids: Vec<Vector3<f32>> = (0..8)
            .map(|i| Vector3::new((i % 3) as f32 - 1.0, i as f32 * 0.3, (i / 3) as f32))
            .collect();
        let group_names = names(&["a", "b", "c", "d", "e", "f", "g", "h"]);
        let parents = infer_parents(&centroids, &group_names);

        assert_eq!(parents.iter().filter(|&&p| p == -1).count(), 1);
        for start in 0..parents.len() {
            let mut node = start;
            let mut steps = 0;
            while parents[node] != -1 {
                node = parents[node] as usize;
                steps += 1;
                assert!(steps <= parents.len(), "cycle reached from {}", start);
            }
        }
    }

    #[test]
    fn mirrored_limbs_never_cross_link() {
        // Two limb chains mirrored across x = 0, closer to each other than to
        // the spine at their tips.
        let mut centroids = vec![
            Vector3::new(0.0, 0.0, 0.0), // pelvis (root)
            Vector3::new(0.0, 0.0, 1.0), // spine
        ];
        for i in 0..3 {
            centroids.push(Vector3::new(0.2, 0.0, -0.5 * i as f32)); // right chain
            centroids.push(Vector3::new(-0.2, 0.0, -0.5 * i as f32)); // left chain
        }
        let group_names = names(&["floor", "spine", "r0", "l0", "r1", "l1", "r2", "l2"]);
        let parents = infer_parents(&centroids, &group_names);

        for (child, &parent) in parents.iter().enumerate() {
            if parent == -1 {
                continue;
            }
            let c = centroids[child];
            let p = centroids[parent as usize];
            assert!(
                !crosses_center_plane(&c, &p),
                "node {} (x={}) linked across the center plane to {} (x={})",
                child,
                c.x,
                parent,
                p.x
            );
        }
    }

    #[test]
    fn single_group_is_root_only() {
        assert_eq!(infer_parents(&[Vector3::new(0.0, 0.0, 0.0)], &names(&["only"])), vec![-1]);
        assert!(infer_parents(&[], &[]).is_empty());
    }

    #[test]
    fn reconstruct_assembles_bones() {
        let positions = vec![
            Vector3::new(0.0, 0.0, 0.0),
            Vector3::new(0.0, 0.0, 1.0),
        ];
        let memberships = vec![vec![(0usize, 1.0f32)], vec![(1, 1.0)]];
        let bones = reconstruct_skeleton(&positions, &memberships, &names(&["hip", "chest"]));
        assert_eq!(bones.len(), 2);
        assert_eq!(bones[0].parent, -1);
        assert_eq!(bones[1].parent, 0);
        assert_eq!(bones[1].pos.0, Vector3::new(0.0, 0.0, 1.0));
    }
}
