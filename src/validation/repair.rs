use super::report::{ValidationCategory, ValidationReport};
use crate::model::records::{Bone, Face, Vertex};

/// Clamp face vertex indices into `[0, vertex_count)`.
pub fn clamp_face_indices(faces: &mut [Face], vertex_count: u32, report: &mut ValidationReport) {
    if vertex_count == 0 {
        return;
    }
    let max = vertex_count - 1;
    let mut clamped = 0usize;
    for face in faces.iter_mut() {
        for v in face.v.iter_mut() {
            if *v >= vertex_count {
                *v = max;
                clamped += 1;
            }
        }
    }
    if clamped > 0 {
        report.repaired(
            "FACE_INDEX_OUT_OF_RANGE",
            ValidationCategory::Mesh,
            format!(
                "{} face-vertex indices out of range [0, {}]; clamped",
                clamped, max
            ),
        );
    }
}

/// Clamp per-corner texel coordinates into the texture bounds.
pub fn clamp_face_uvs(faces: &mut [Face], texture_height: u32, report: &mut ValidationReport) {
    let max_v = texture_height.saturating_sub(1);
    let mut bad_u = 0usize;
    let mut bad_v = 0usize;
    for face in faces.iter_mut() {
        for u in face.u_tex.iter_mut() {
            if *u > 255 {
                *u = 255;
                bad_u += 1;
            }
        }
        for v in face.v_tex.iter_mut() {
            if *v > max_v {
                *v = max_v;
                bad_v += 1;
            }
        }
    }
    if bad_u > 0 {
        report.repaired(
            "FACE_U_OUT_OF_RANGE",
            ValidationCategory::Mesh,
            format!("{} U coords >255; clipped", bad_u),
        );
    }
    if bad_v > 0 {
        report.repaired(
            "FACE_V_OUT_OF_RANGE",
            ValidationCategory::Mesh,
            format!("{} V coords >{}; clipped", bad_v, max_v),
        );
    }
}

/// Clamp vertex owners against the bone table. With no bones every owner
/// must be zero.
pub fn clamp_vertex_owners(vertices: &mut [Vertex], bone_count: u32, report: &mut ValidationReport) {
    if bone_count > 0 {
        let mut clamped = 0usize;
        for v in vertices.iter_mut() {
            if u32::from(v.owner) >= bone_count {
                v.owner = 0;
                clamped += 1;
            }
        }
        if clamped > 0 {
            report.repaired(
                "OWNER_OUT_OF_RANGE",
                ValidationCategory::Mesh,
                format!(
                    "{} vertices have invalid owner indices (>= {}); clamped to 0",
                    clamped, bone_count
                ),
            );
        }
    } else if vertices.iter().any(|v| v.owner != 0) {
        for v in vertices.iter_mut() {
            v.owner = 0;
        }
        report.repaired(
            "OWNER_WITHOUT_BONES",
            ValidationCategory::Mesh,
            "Bone count is zero; all vertex owners set to 0".to_string(),
        );
    }
}

/// Pure cycle scan over a parent array: returns the first node whose walk
/// revisits a node already on the current path, or None when the forest is
/// acyclic. No state survives between calls.
pub fn detect_bone_cycles(parents: &[i16]) -> Option<usize> {
    let n = parents.len();
    for start in 0..n {
        let mut on_path = vec![false; n];
        let mut node = start;
        for _ in 0..=n {
            if on_path[node] {
                return Some(start);
            }
            on_path[node] = true;
            match parents[node] {
                -1 => break,
                p if (p as usize) < n && p >= 0 => node = p as usize,
                _ => break,
            }
        }
    }
    None
}

/// Sever every edge that closes a cycle (`parent = -1`). Cutting the closing
/// edge is the minimal edit that restores a forest without reordering it.
fn break_bone_cycles(parents: &mut [i16]) {
    let n = parents.len();
    for start in 0..n {
        let mut on_path = vec![false; n];
        let mut node = start;
        loop {
            on_path[node] = true;
            let p = parents[node];
            if p < 0 || p as usize >= n {
                break;
            }
            let parent = p as usize;
            if on_path[parent] {
                parents[node] = -1;
                break;
            }
            node = parent;
        }
    }
}

/// Repair the bone table: out-of-range parents clamp to -1, cycles are
/// broken, empty names get placeholders.
pub fn repair_bones(bones: &mut [Bone], report: &mut ValidationReport) {
    let bone_count = bones.len();

    let mut bad_parents = 0usize;
    for bone in bones.iter_mut() {
        let p = bone.parent;
        if p != -1 && !(p >= 0 && (p as usize) < bone_count) {
            bone.parent = -1;
            bad_parents += 1;
        }
    }
    if bad_parents > 0 {
        report.repaired(
            "PARENT_OUT_OF_RANGE",
            ValidationCategory::Skeleton,
            format!(
                "{} bones have invalid parent indices (must be -1 or 0..{}); reset to root",
                bad_parents,
                bone_count.saturating_sub(1)
            ),
        );
    }

    let mut parents: Vec<i16> = bones.iter().map(|b| b.parent).collect();
    if let Some(entry) = detect_bone_cycles(&parents) {
        break_bone_cycles(&mut parents);
        for (bone, &p) in bones.iter_mut().zip(parents.iter()) {
            bone.parent = p;
        }
        report.repaired(
            "BONE_CYCLE",
            ValidationCategory::Skeleton,
            format!(
                "Cycle detected in bone hierarchy starting at bone {}; closing edges severed",
                entry
            ),
        );
    }

    let mut placeholders = 0usize;
    for (i, bone) in bones.iter_mut().enumerate() {
        if bone.name.is_empty() {
            bone.name = format!("Bone_{}", i);
            placeholders += 1;
        }
    }
    if placeholders > 0 {
        report.repaired(
            "EMPTY_BONE_NAME",
            ValidationCategory::Skeleton,
            format!("{} bones had empty names; placeholders assigned", placeholders),
        );
    }
}

/// Clamp animation-to-sound references: anything outside `{-1} ∪ [0,
/// sound_count)` becomes -1. Valid entries are never touched.
pub fn clamp_cross_ref(table: &mut [i32], sound_count: usize, report: &mut ValidationReport) {
    let mut clamped = 0usize;
    for entry in table.iter_mut() {
        if *entry < -1 || *entry >= sound_count as i32 {
            *entry = -1;
            clamped += 1;
        }
    }
    if clamped > 0 {
        report.repaired(
            "CROSS_REF_OUT_OF_RANGE",
            ValidationCategory::Sound,
            format!(
                "{} cross-reference entries outside [-1, {}); reset to -1",
                clamped, sound_count
            ),
        );
    }
}
