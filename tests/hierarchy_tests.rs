// Hierarchy consistency tests: decoded bone forests are always acyclic and
// skeleton inference produces structurally sound rigs.

use car_tools_lib::model::threedf;
use car_tools_lib::skeleton;
use car_tools_lib::{DecodeOptions, EncodeOptions, ValidationReport};
use cgmath::Vector3;

#[path = "common/mod.rs"]
mod common;

/// Follow parents from every bone; must reach -1 within bone_count steps.
fn assert_acyclic(parents: &[i16]) {
    for start in 0..parents.len() {
        let mut node = start;
        let mut steps = 0;
        while parents[node] != -1 {
            node = parents[node] as usize;
            steps += 1;
            assert!(
                steps <= parents.len(),
                "parent chain from bone {} does not terminate",
                start
            );
        }
    }
}

#[test]
fn decoded_bone_forest_is_acyclic_after_repair() {
    let mut model = common::rigged_quad();
    // Wire the two bones into a cycle.
    model.bones[0].parent = 1;
    model.bones[1].parent = 0;

    let mut report = ValidationReport::new();
    let bytes = threedf::encode(&model, &EncodeOptions::default(), &mut report).unwrap();
    let (decoded, report) = threedf::decode(&bytes, &DecodeOptions::default()).unwrap();

    let parents: Vec<i16> = decoded.bones.iter().map(|b| b.parent).collect();
    assert_acyclic(&parents);
    assert!(report.items.iter().any(|i| i.code == "BONE_CYCLE"));
}

#[test]
fn out_of_range_parent_becomes_root() {
    let mut model = common::rigged_quad();
    model.bones[1].parent = 17;

    let mut report = ValidationReport::new();
    let bytes = threedf::encode(&model, &EncodeOptions::default(), &mut report).unwrap();
    let (decoded, report) = threedf::decode(&bytes, &DecodeOptions::default()).unwrap();

    assert_eq!(decoded.bones[1].parent, -1);
    assert!(report.items.iter().any(|i| i.code == "PARENT_OUT_OF_RANGE"));
    let parents: Vec<i16> = decoded.bones.iter().map(|b| b.parent).collect();
    assert_acyclic(&parents);
}

#[test]
fn duplicate_bone_names_reported_not_renamed() {
    let mut model = common::rigged_quad();
    model.bones[1].name = "Root".to_string();

    let mut report = ValidationReport::new();
    let bytes = threedf::encode(&model, &EncodeOptions::default(), &mut report).unwrap();
    let (decoded, report) = threedf::decode(&bytes, &DecodeOptions::default()).unwrap();

    assert_eq!(decoded.bones[0].name, "Root");
    assert_eq!(decoded.bones[1].name, "Root");
    assert!(report.items.iter().any(|i| i.code == "DUPLICATE_BONE_NAMES"));
}

#[test]
fn inferred_rig_has_single_root_and_full_reachability() {
    // A humanoid-ish cluster cloud: pelvis, spine, head, two arms, two legs.
    let centroids = vec![
        Vector3::new(0.0, 0.0, 1.0),   // pelvis
        Vector3::new(0.0, 0.0, 1.5),   // spine
        Vector3::new(0.0, 0.0, 2.0),   // head
        Vector3::new(0.4, 0.0, 1.6),   // r upper arm
        Vector3::new(0.8, 0.0, 1.4),   // r forearm
        Vector3::new(-0.4, 0.0, 1.6),  // l upper arm
        Vector3::new(-0.8, 0.0, 1.4),  // l forearm
        Vector3::new(0.2, 0.0, 0.5),   // r thigh
        Vector3::new(0.2, 0.0, 0.0),   // r foot
        Vector3::new(-0.2, 0.0, 0.5),  // l thigh
        Vector3::new(-0.2, 0.0, 0.0),  // l foot
    ];
    let names: Vec<String> = [
        "pelvis", "spine", "head", "r_arm", "r_fore", "l_arm", "l_fore", "r_thigh", "r_foot",
        "l_thigh", "l_foot",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect();

    let parents = skeleton::infer_parents(&centroids, &names);

    assert_eq!(parents.iter().filter(|&&p| p == -1).count(), 1);
    assert_eq!(parents[0], -1, "first group is the root when no floor bone exists");
    for start in 0..parents.len() {
        let mut node = start;
        let mut steps = 0;
        while parents[node] != -1 {
            node = parents[node] as usize;
            steps += 1;
            assert!(steps <= parents.len());
        }
        assert_eq!(node, 0, "group {} does not reach the root", start);
    }
}

#[test]
fn mirrored_feet_are_never_cross_wired() {
    // Feet sit 0.4 apart across the plane but 0.5 from their own thighs;
    // without the symmetry penalty the left foot would parent to the right.
    let centroids = vec![
        Vector3::new(0.0, 0.0, 1.0),
        Vector3::new(0.2, 0.0, 0.5),
        Vector3::new(0.2, 0.0, 0.0),
        Vector3::new(-0.2, 0.0, 0.5),
        Vector3::new(-0.2, 0.0, 0.0),
    ];
    let names: Vec<String> = ["pelvis", "r_thigh", "r_foot", "l_thigh", "l_foot"]
        .iter()
        .map(|s| s.to_string())
        .collect();

    let parents = skeleton::infer_parents(&centroids, &names);

    for (child, &parent) in parents.iter().enumerate() {
        if parent == -1 {
            continue;
        }
        let cx = centroids[child].x;
        let px = centroids[parent as usize].x;
        assert!(
            !(cx > 0.05 && px < -0.05) && !(cx < -0.05 && px > 0.05),
            "group {} (x={}) wired across the symmetry plane to {} (x={})",
            child,
            cx,
            parent,
            px
        );
    }
}

#[test]
fn reconstructed_skeleton_round_trips_through_threedf() {
    // Infer a rig from weighted groups, embed it, and round-trip it.
    let positions = vec![
        Vector3::new(0.0, 0.0, 0.0),
        Vector3::new(0.0, 0.0, 1.0),
        Vector3::new(0.0, 0.0, 2.0),
    ];
    let memberships = vec![
        vec![(0usize, 1.0f32)],
        vec![(0, 0.5), (1, 0.5)],
        vec![(1, 1.0)],
    ];
    let names = vec!["floor_anchor".to_string(), "upper".to_string()];
    let bones = skeleton::reconstruct_skeleton(&positions, &memberships, &names);
    assert_eq!(bones[0].parent, -1);

    let mut model = common::rigged_quad();
    model.vertices.iter_mut().for_each(|v| v.owner = 0);
    model.bones = bones.clone();

    let mut report = ValidationReport::new();
    let bytes = threedf::encode(&model, &EncodeOptions::default(), &mut report).unwrap();
    let (decoded, _) = threedf::decode(&bytes, &DecodeOptions::default()).unwrap();
    assert_eq!(decoded.bones, bones);
}
