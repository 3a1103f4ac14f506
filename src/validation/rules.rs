use super::limits::*;
use super::report::*;
use crate::error::{FormatError, Result};
use crate::model::flags;
use crate::model::records::{Face, Vertex};

/// Fatal bounds checks on header counts. Counts above the tool ceilings mean
/// a corrupted file, not a large model.
pub fn ensure_counts(vertex_count: u32, face_count: u32, bone_count: u32) -> Result<()> {
    if vertex_count > MAX_VERTEX_COUNT {
        return Err(FormatError::InvalidCount {
            field: "vertex_count",
            value: vertex_count as u64,
            max: MAX_VERTEX_COUNT as u64,
        });
    }
    if face_count > MAX_FACE_COUNT {
        return Err(FormatError::InvalidCount {
            field: "face_count",
            value: face_count as u64,
            max: MAX_FACE_COUNT as u64,
        });
    }
    if bone_count > MAX_BONE_COUNT {
        return Err(FormatError::InvalidCount {
            field: "bone_count",
            value: bone_count as u64,
            max: MAX_BONE_COUNT as u64,
        });
    }
    Ok(())
}

/// Fatal texture-size checks: the payload must describe whole 256-pixel rows.
pub fn ensure_texture_size(texture_size: u32) -> Result<()> {
    if texture_size > MAX_TEXTURE_SIZE {
        return Err(FormatError::InvalidCount {
            field: "texture_size",
            value: texture_size as u64,
            max: MAX_TEXTURE_SIZE as u64,
        });
    }
    if texture_size % TEXTURE_ROW_BYTES != 0 {
        return Err(FormatError::TextureLayout {
            message: format!(
                "texture_size {} is not a multiple of the {}-byte row",
                texture_size, TEXTURE_ROW_BYTES
            ),
        });
    }
    Ok(())
}

/// Fatal whole-file size check; surplus bytes are only advisory.
pub fn ensure_total_size(
    section: &'static str,
    expected: u64,
    actual: u64,
) -> Result<Option<ValidationItem>> {
    if actual < expected {
        return Err(FormatError::Truncated {
            section,
            expected,
            actual,
        });
    }
    if actual > expected {
        return Ok(Some(ValidationItem {
            code: "TRAILING_BYTES".to_string(),
            message: format!(
                "File has {} extra bytes after the last section (trailing garbage or corruption?)",
                actual - expected
            ),
            severity: ValidationSeverity::Warning,
            category: ValidationCategory::Header,
            repaired: false,
        }));
    }
    Ok(None)
}

/// Fatal non-finite coordinate scan.
pub fn ensure_finite_vertices(vertices: &[Vertex]) -> Result<()> {
    for (i, v) in vertices.iter().enumerate() {
        if !v.coord.is_finite() {
            return Err(FormatError::NonFinite {
                record: "vertex",
                index: i,
            });
        }
    }
    Ok(())
}

pub fn ensure_finite_bones(bones: &[crate::model::records::Bone]) -> Result<()> {
    for (i, b) in bones.iter().enumerate() {
        if !b.pos.is_finite() {
            return Err(FormatError::NonFinite {
                record: "bone",
                index: i,
            });
        }
    }
    Ok(())
}

/// Warn when a count sits above the legacy tooling ceiling.
pub fn validate_legacy_count(field: &str, count: u32) -> Option<ValidationItem> {
    if count > LEGACY_TOOL_COUNT {
        Some(ValidationItem {
            code: format!("{}_HIGH", field.to_uppercase()),
            message: format!(
                "High {}: {}. Above {} legacy editors cannot open the file.",
                field, count, LEGACY_TOOL_COUNT
            ),
            severity: ValidationSeverity::Warning,
            category: ValidationCategory::Header,
            repaired: false,
        })
    } else {
        None
    }
}

/// Warn about an implausibly tall texture.
pub fn validate_texture_height(height: u32) -> Option<ValidationItem> {
    if height > SUSPICIOUS_TEXTURE_HEIGHT {
        Some(ValidationItem {
            code: "TEXTURE_HEIGHT_SUSPICIOUS".to_string(),
            message: format!(
                "Unusually high texture height: {}px (may indicate corruption)",
                height
            ),
            severity: ValidationSeverity::Warning,
            category: ValidationCategory::Texture,
            repaired: false,
        })
    } else {
        None
    }
}

/// Report unknown face-flag bits. The bits themselves are preserved.
pub fn validate_face_flags(faces: &[Face]) -> Option<ValidationItem> {
    let mut bad = 0usize;
    let mut first_mask = 0u16;
    for face in faces {
        let unknown = flags::unknown_bits(face.flags);
        if unknown != 0 {
            if bad == 0 {
                first_mask = unknown;
            }
            bad += 1;
        }
    }
    if bad > 0 {
        Some(ValidationItem {
            code: "UNKNOWN_FACE_FLAGS".to_string(),
            message: format!(
                "{} faces have unknown flag bits set (first mask: 0x{:04X}); bits preserved",
                bad, first_mask
            ),
            severity: ValidationSeverity::Warning,
            category: ValidationCategory::Mesh,
            repaired: false,
        })
    } else {
        None
    }
}

/// Report degenerate triangles (duplicate corner indices).
pub fn validate_degenerate_faces(faces: &[Face]) -> Option<ValidationItem> {
    let count = faces.iter().filter(|f| f.is_degenerate()).count();
    if count > 0 {
        Some(ValidationItem {
            code: "DEGENERATE_FACES".to_string(),
            message: format!("{} degenerate faces detected (duplicate vertex indices)", count),
            severity: ValidationSeverity::Warning,
            category: ValidationCategory::Mesh,
            repaired: false,
        })
    } else {
        None
    }
}

/// Report non-zero legacy face fields; they survive round-trip untouched.
pub fn validate_legacy_face_fields(faces: &[Face]) -> Vec<ValidationItem> {
    let mut items = vec![];
    let counters = [
        ("dmask", faces.iter().filter(|f| f.dmask != 0).count()),
        ("distant", faces.iter().filter(|f| f.distant != 0).count()),
        ("next", faces.iter().filter(|f| f.next != 0).count()),
        ("group", faces.iter().filter(|f| f.group != 0).count()),
    ];
    for (field, count) in counters {
        if count > 0 {
            items.push(ValidationItem {
                code: "LEGACY_FIELD_SET".to_string(),
                message: format!("{} faces have non-zero '{}' values (likely unused)", count, field),
                severity: ValidationSeverity::Info,
                category: ValidationCategory::Mesh,
                repaired: false,
            });
        }
    }
    if faces.iter().any(|f| f.reserved.iter().any(|&b| b != 0)) {
        items.push(ValidationItem {
            code: "RESERVED_BYTES_SET".to_string(),
            message: "Non-zero reserved bytes detected in faces (likely unused)".to_string(),
            severity: ValidationSeverity::Info,
            category: ValidationCategory::Mesh,
            repaired: false,
        });
    }
    items
}

/// Report cosmetic hide flags; they have no in-game effect.
pub fn validate_hidden_vertices(vertices: &[Vertex]) -> Option<ValidationItem> {
    let count = vertices.iter().filter(|v| v.hide != 0).count();
    if count > 0 {
        Some(ValidationItem {
            code: "HIDDEN_VERTICES".to_string(),
            message: format!(
                "{} vertices have non-zero 'hide' values (no in-game effect, likely editor-specific)",
                count
            ),
            severity: ValidationSeverity::Info,
            category: ValidationCategory::Mesh,
            repaired: false,
        })
    } else {
        None
    }
}

pub fn validate_hidden_bones(bones: &[crate::model::records::Bone]) -> Option<ValidationItem> {
    let count = bones.iter().filter(|b| b.hidden != 0).count();
    if count > 0 {
        Some(ValidationItem {
            code: "HIDDEN_BONES".to_string(),
            message: format!(
                "{} bones have non-zero 'hidden' values (no in-game effect, likely editor-specific)",
                count
            ),
            severity: ValidationSeverity::Info,
            category: ValidationCategory::Skeleton,
            repaired: false,
        })
    } else {
        None
    }
}

/// Advisory texture content checks; none of these block decoding.
pub fn validate_texture_words(words: &[u16]) -> Vec<ValidationItem> {
    let mut items = vec![];

    let alpha_set = words.iter().filter(|&&w| w & 0x8000 != 0).count();
    if alpha_set > 0 {
        items.push(ValidationItem {
            code: "TEXTURE_ALPHA_BITS".to_string(),
            message: format!(
                "{} texture pixels have the alpha bit set; values preserved",
                alpha_set
            ),
            severity: ValidationSeverity::Warning,
            category: ValidationCategory::Texture,
            repaired: false,
        });
    }

    if !words.is_empty() && words.iter().all(|&w| w == 0) {
        items.push(ValidationItem {
            code: "TEXTURE_ALL_ZERO".to_string(),
            message: "Texture data is completely zero (black/transparent); possible corruption"
                .to_string(),
            severity: ValidationSeverity::Warning,
            category: ValidationCategory::Texture,
            repaired: false,
        });
    }

    items
}

/// Loose check for the conventional CAR model-name suffix.
pub fn validate_car_model_name(name: &str) -> Option<ValidationItem> {
    if !name.ends_with("msc: #") {
        Some(ValidationItem {
            code: "MODEL_NAME_SUFFIX".to_string(),
            message: format!(
                "Unexpected model name format: '{}' (expected suffix 'msc: #')",
                name
            ),
            severity: ValidationSeverity::Info,
            category: ValidationCategory::Header,
            repaired: false,
        })
    } else {
        None
    }
}

/// Report duplicate bone names. Names are not renamed: downstream hosts may
/// merge them, which is their call to make.
pub fn validate_duplicate_bone_names(names: &[String]) -> Option<ValidationItem> {
    let mut seen = std::collections::HashSet::new();
    let mut dupes: Vec<&str> = vec![];
    for name in names {
        if !seen.insert(name.as_str()) && !dupes.contains(&name.as_str()) {
            dupes.push(name);
        }
    }
    if dupes.is_empty() {
        None
    } else {
        dupes.sort_unstable();
        Some(ValidationItem {
            code: "DUPLICATE_BONE_NAMES".to_string(),
            message: format!("Duplicate bone names: {:?}. Hosts may merge these.", dupes),
            severity: ValidationSeverity::Warning,
            category: ValidationCategory::Skeleton,
            repaired: false,
        })
    }
}
