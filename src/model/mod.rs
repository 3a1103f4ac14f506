//! Decoded in-memory model and the format entry points.
//!
//! The three on-disk variants (3DF, CAR, 3DN) all decode into [`Model`];
//! which sections are populated depends on the variant. Encoding is the
//! mirror image and takes the same arrays back.

pub mod car;
pub mod flags;
pub mod records;
pub mod threedf;
pub mod threedn;

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::error::{FormatError, Result};
use crate::texture;
use crate::validation::limits::{TEXTURE_ROW_BYTES, TEXTURE_WIDTH};
use crate::validation::report::{ValidationCategory, ValidationReport};
use car::{CarAnimation, CarSound, CrossRefTable};
use records::{Bone, Face, Vertex, NAME_LEN};

/// Packed texture payload: 16-bit words in fixed 256-pixel rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackedTexture {
    pub words: Vec<u16>,
    pub height: u32,
}

impl PackedTexture {
    /// Payload size in bytes as stored in the header.
    pub fn size_bytes(&self) -> u32 {
        (self.words.len() * 2) as u32
    }

    /// Raw payload view for hosts that want the bytes.
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.words)
    }

    /// Unpack into RGBA floats (row-flipped, alpha forced 0).
    pub fn unpack(&self) -> Vec<f32> {
        texture::unpack_argb1555(&self.words, self.height)
    }

    /// Pack RGBA floats into a texture payload.
    pub fn from_pixels(pixels: &[f32], width: u32, height: u32) -> Result<Self> {
        let words = texture::pack_argb1555(pixels, width, height)?;
        Ok(PackedTexture { words, height })
    }
}

/// A fully decoded model. Sections a variant does not carry stay empty.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Model {
    /// CAR/3DN model name.
    pub name: Option<String>,
    /// 3DN sprite reference, when the header flags one.
    pub sprite_name: Option<String>,
    pub faces: Vec<Face>,
    pub vertices: Vec<Vertex>,
    pub bones: Vec<Bone>,
    pub texture: Option<PackedTexture>,
    pub animations: Vec<CarAnimation>,
    pub sounds: Vec<CarSound>,
    pub cross_ref: Option<CrossRefTable>,
    /// CAR only: synthesized vertex-group labels for the re-based owners
    /// (the format stores no bone table).
    pub group_names: Vec<String>,
}

impl Model {
    /// Float UVs for every face corner, in face order.
    ///
    /// U maps texels through /255; V is flipped against the texture height
    /// (a missing texture falls back to the conventional 256).
    pub fn face_uvs(&self) -> Vec<[f32; 2]> {
        let height = self
            .texture
            .as_ref()
            .map(|t| t.height)
            .filter(|&h| h > 0)
            .unwrap_or(256) as f32;
        let mut uvs = Vec::with_capacity(self.faces.len() * 3);
        for face in &self.faces {
            for corner in 0..3 {
                uvs.push([
                    face.u_tex[corner] as f32 / 255.0,
                    1.0 - face.v_tex[corner] as f32 / height.max(1.0),
                ]);
            }
        }
        uvs
    }
}

/// Decode-side options.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecodeOptions {
    /// Run the validation/repair pass. Off, only the fatal size checks run.
    pub validate: bool,
    /// Keep the texture payload in the decoded model.
    pub parse_texture: bool,
    /// Reverse winding and per-corner UVs to match right-handed hosts.
    pub flip_handedness: bool,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        DecodeOptions {
            validate: true,
            parse_texture: true,
            flip_handedness: true,
        }
    }
}

/// Encode-side options.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EncodeOptions {
    /// Uniform scale applied to vertex coordinates and bone positions.
    pub scale: f32,
    /// Reverse winding and per-corner UVs back to the file convention.
    pub flip_handedness: bool,
    pub flip_u: bool,
    pub flip_v: bool,
    /// Write the texture payload (headers record size 0 otherwise).
    pub export_texture: bool,
    /// Per-animation key-rate overrides, by animation name.
    pub kps_overrides: HashMap<String, u32>,
}

impl Default for EncodeOptions {
    fn default() -> Self {
        EncodeOptions {
            scale: 1.0,
            flip_handedness: true,
            flip_u: false,
            flip_v: false,
            export_texture: true,
            kps_overrides: HashMap::new(),
        }
    }
}

/// Clean a name for a fixed 32-byte field: non-ASCII characters are dropped
/// and overlong names truncated, each with a warning. This is the only place
/// data may be lost silently at the byte level, so it is always reported.
pub(crate) fn sanitize_name(
    name: &str,
    what: &str,
    category: ValidationCategory,
    report: &mut ValidationReport,
) -> String {
    let mut cleaned: String = name.chars().filter(char::is_ascii).collect();
    if cleaned.len() != name.len() {
        report.warn(
            "NAME_NON_ASCII",
            category,
            format!(
                "{} name '{}' contains non-ASCII characters; they were dropped",
                what, name
            ),
        );
    }
    if cleaned.len() > NAME_LEN {
        cleaned.truncate(NAME_LEN);
        report.warn(
            "NAME_TRUNCATED",
            category,
            format!("{} name '{}' truncated to {} characters", what, name, NAME_LEN),
        );
    }
    cleaned
}

/// Apply the export scale to a copy of the vertex array.
pub(crate) fn scaled_vertices(vertices: &[Vertex], scale: f32) -> Vec<Vertex> {
    vertices
        .iter()
        .map(|v| Vertex {
            coord: crate::math::DfVector3(v.coord.0 * scale),
            owner: v.owner,
            hide: v.hide,
        })
        .collect()
}

/// Faces prepared for disk: handedness and optional U/V mirroring applied.
pub(crate) fn faces_for_disk(faces: &[Face], opts: &EncodeOptions, texture_height: u32) -> Vec<Face> {
    let mut out = faces.to_vec();
    for face in out.iter_mut() {
        if opts.flip_handedness {
            face.flip_handedness();
        }
        if opts.flip_u {
            for u in face.u_tex.iter_mut() {
                *u = 255u32.saturating_sub(*u);
            }
        }
        if opts.flip_v {
            let max_v = texture_height.saturating_sub(1);
            for v in face.v_tex.iter_mut() {
                *v = max_v.saturating_sub(*v);
            }
        }
    }
    out
}

/// Derived texture height for a header-declared payload size.
pub(crate) fn texture_height_for(texture_size: u32) -> u32 {
    texture_size / TEXTURE_ROW_BYTES
}

/// Sanity-check a texture against the fixed row width before encoding.
pub(crate) fn ensure_texture_rows(texture: &PackedTexture) -> Result<()> {
    let expected = TEXTURE_WIDTH as usize * texture.height as usize;
    if texture.words.len() != expected {
        return Err(FormatError::TextureLayout {
            message: format!(
                "texture has {} words, expected {} ({}x{})",
                texture.words.len(),
                expected,
                TEXTURE_WIDTH,
                texture.height
            ),
        });
    }
    Ok(())
}

fn write_atomic(path: &Path, bytes: &[u8]) -> io::Result<()> {
    // A failed write must not leave a truncated file at the target path.
    let tmp = path.with_extension("tmp");
    fs::write(&tmp, bytes)?;
    fs::rename(&tmp, path)
}

/// Read and decode a 3DF file.
pub fn read_threedf_file(
    path: impl AsRef<Path>,
    opts: &DecodeOptions,
) -> anyhow::Result<(Model, ValidationReport)> {
    let path = path.as_ref();
    let bytes = fs::read(path)
        .with_context(|| format!("Failed to open 3DF file '{}'", path.display()))?;
    threedf::decode(&bytes, opts)
        .with_context(|| format!("Failed to parse 3DF file '{}' ({} bytes)", path.display(), bytes.len()))
}

/// Encode and atomically write a 3DF file.
pub fn write_threedf_file(
    path: impl AsRef<Path>,
    model: &Model,
    opts: &EncodeOptions,
) -> anyhow::Result<ValidationReport> {
    let path = path.as_ref();
    let mut report = ValidationReport::new();
    let bytes = threedf::encode(model, opts, &mut report)
        .with_context(|| format!("Failed to encode 3DF file '{}'", path.display()))?;
    write_atomic(path, &bytes)
        .with_context(|| format!("Failed to write 3DF file '{}'", path.display()))?;
    Ok(report)
}

/// Read and decode a CAR bundle.
pub fn read_car_file(
    path: impl AsRef<Path>,
    opts: &DecodeOptions,
) -> anyhow::Result<(Model, ValidationReport)> {
    let path = path.as_ref();
    let bytes = fs::read(path)
        .with_context(|| format!("Failed to open CAR file '{}'", path.display()))?;
    car::decode(&bytes, opts)
        .with_context(|| format!("Failed to parse CAR file '{}' ({} bytes)", path.display(), bytes.len()))
}

/// Encode and atomically write a CAR bundle.
pub fn write_car_file(
    path: impl AsRef<Path>,
    model: &Model,
    opts: &EncodeOptions,
) -> anyhow::Result<ValidationReport> {
    let path = path.as_ref();
    let mut report = ValidationReport::new();
    let bytes = car::encode(model, opts, &mut report)
        .with_context(|| format!("Failed to encode CAR file '{}'", path.display()))?;
    write_atomic(path, &bytes)
        .with_context(|| format!("Failed to write CAR file '{}'", path.display()))?;
    Ok(report)
}

/// Read and decode a 3DN file.
pub fn read_threedn_file(
    path: impl AsRef<Path>,
    opts: &DecodeOptions,
) -> anyhow::Result<(Model, ValidationReport)> {
    let path = path.as_ref();
    let bytes = fs::read(path)
        .with_context(|| format!("Failed to open 3DN file '{}'", path.display()))?;
    threedn::decode(&bytes, opts)
        .with_context(|| format!("Failed to parse 3DN file '{}' ({} bytes)", path.display(), bytes.len()))
}

/// Encode and atomically write a 3DN file.
pub fn write_threedn_file(
    path: impl AsRef<Path>,
    model: &Model,
    opts: &EncodeOptions,
) -> anyhow::Result<ValidationReport> {
    let path = path.as_ref();
    let mut report = ValidationReport::new();
    let bytes = threedn::encode(model, opts, &mut report)
        .with_context(|| format!("Failed to encode 3DN file '{}'", path.display()))?;
    write_atomic(path, &bytes)
        .with_context(|| format!("Failed to write 3DN file '{}'", path.display()))?;
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_reports_dropped_characters() {
        let mut report = ValidationReport::new();
        let clean = sanitize_name("Tricé", "Bone", ValidationCategory::Skeleton, &mut report);
        assert_eq!(clean, "Tric");
        assert!(report.items.iter().any(|i| i.code == "NAME_NON_ASCII"));
    }

    #[test]
    fn sanitize_truncates_long_names() {
        let mut report = ValidationReport::new();
        let clean = sanitize_name(&"x".repeat(40), "Animation", ValidationCategory::Animation, &mut report);
        assert_eq!(clean.len(), 32);
        assert!(report.items.iter().any(|i| i.code == "NAME_TRUNCATED"));
    }

    #[test]
    fn sanitize_leaves_clean_names_alone() {
        let mut report = ValidationReport::new();
        let clean = sanitize_name("Bip01 L Foot", "Bone", ValidationCategory::Skeleton, &mut report);
        assert_eq!(clean, "Bip01 L Foot");
        assert!(report.is_empty());
    }

    #[test]
    fn face_uvs_use_texture_height() {
        let mut model = Model::default();
        let mut face = Face::default();
        face.u_tex = [255, 0, 0];
        face.v_tex = [0, 64, 0];
        model.faces.push(face);
        model.texture = Some(PackedTexture {
            words: vec![0; 256 * 64],
            height: 64,
        });
        let uvs = model.face_uvs();
        assert_eq!(uvs[0][0], 1.0);
        assert_eq!(uvs[1][1], 0.0);
    }
}
