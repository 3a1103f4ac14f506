//! Structural validation for decoded models.
//!
//! Fatal corruption aborts the decode as a typed [`FormatError`];
//! everything else is clamped to the nearest valid value (or just noted)
//! and reported through a [`ValidationReport`]. The core never logs:
//! the report is returned to the caller, who decides how to surface it.
//!
//! [`FormatError`]: crate::error::FormatError
//! [`ValidationReport`]: report::ValidationReport

pub mod limits;
pub mod repair;
pub mod report;
pub mod rules;

use crate::error::Result;
use crate::model::records::{Bone, Face, Vertex};
use report::ValidationReport;

/// Run the full mesh-record pass in its fixed order: fatal scans first,
/// then repairs, then advisories.
pub fn validate_mesh(
    faces: &mut [Face],
    vertices: &mut [Vertex],
    bones: &mut [Bone],
    texture_height: u32,
    report: &mut ValidationReport,
) -> Result<()> {
    rules::ensure_finite_vertices(vertices)?;
    rules::ensure_finite_bones(bones)?;

    repair::clamp_face_indices(faces, vertices.len() as u32, report);
    repair::clamp_face_uvs(faces, texture_height, report);
    repair::clamp_vertex_owners(vertices, bones.len() as u32, report);
    repair::repair_bones(bones, report);

    if let Some(item) = rules::validate_degenerate_faces(faces) {
        report.add(item);
    }
    if let Some(item) = rules::validate_face_flags(faces) {
        report.add(item);
    }
    for item in rules::validate_legacy_face_fields(faces) {
        report.add(item);
    }
    if let Some(item) = rules::validate_hidden_vertices(vertices) {
        report.add(item);
    }
    if let Some(item) = rules::validate_hidden_bones(bones) {
        report.add(item);
    }
    let names: Vec<String> = bones.iter().map(|b| b.name.clone()).collect();
    if let Some(item) = rules::validate_duplicate_bone_names(&names) {
        report.add(item);
    }

    Ok(())
}

/// CAR variant of the mesh pass. CAR files carry no bone table, so vertex
/// owners are left for the format-specific re-basing step instead of being
/// clamped here.
pub fn validate_car_mesh(
    faces: &mut [Face],
    vertices: &mut [Vertex],
    texture_height: u32,
    report: &mut ValidationReport,
) -> Result<()> {
    rules::ensure_finite_vertices(vertices)?;

    repair::clamp_face_indices(faces, vertices.len() as u32, report);
    repair::clamp_face_uvs(faces, texture_height, report);

    if let Some(item) = rules::validate_degenerate_faces(faces) {
        report.add(item);
    }
    if let Some(item) = rules::validate_face_flags(faces) {
        report.add(item);
    }
    for item in rules::validate_legacy_face_fields(faces) {
        report.add(item);
    }
    if let Some(item) = rules::validate_hidden_vertices(vertices) {
        report.add(item);
    }

    Ok(())
}
