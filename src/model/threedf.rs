//! 3DF whole-file codec.
//!
//! Layout: 16-byte header, faces, vertices, bones, packed texture. All
//! counts live in the header; every section length is implied, so the
//! decoder checks the full size up front and treats a short file as fatal.

use std::io::Cursor;

use binrw::{binrw, BinRead, BinWrite, VecArgs};

use super::records::{Bone, Face, Vertex};
use super::{
    ensure_texture_rows, faces_for_disk, sanitize_name, scaled_vertices, texture_height_for,
    DecodeOptions, EncodeOptions, Model, PackedTexture,
};
use crate::error::Result;
use crate::validation::report::{ValidationCategory, ValidationReport};
use crate::validation::{rules, validate_mesh};

#[binrw]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[br(little)]
#[bw(little)]
pub struct ThreeDfHeader {
    pub vertex_count: u32,
    pub face_count: u32,
    pub bone_count: u32,
    pub texture_size: u32,
}

impl ThreeDfHeader {
    pub const SIZE: u64 = 16;

    /// Total file size this header implies.
    pub fn expected_size(&self) -> u64 {
        Self::SIZE
            + self.face_count as u64 * Face::SIZE
            + self.vertex_count as u64 * Vertex::SIZE
            + self.bone_count as u64 * Bone::SIZE
            + self.texture_size as u64
    }
}

/// Decode a 3DF byte stream into a model plus its validation report.
pub fn decode(bytes: &[u8], opts: &DecodeOptions) -> Result<(Model, ValidationReport)> {
    let mut report = ValidationReport::new();

    if (bytes.len() as u64) < ThreeDfHeader::SIZE {
        return Err(crate::error::FormatError::Truncated {
            section: "3DF header",
            expected: ThreeDfHeader::SIZE,
            actual: bytes.len() as u64,
        });
    }
    let mut cursor = Cursor::new(bytes);
    let header = ThreeDfHeader::read(&mut cursor)?;

    rules::ensure_counts(header.vertex_count, header.face_count, header.bone_count)?;
    rules::ensure_texture_size(header.texture_size)?;
    if let Some(item) = rules::ensure_total_size("3DF records", header.expected_size(), bytes.len() as u64)? {
        report.add(item);
    }

    let texture_height = texture_height_for(header.texture_size);
    if opts.validate {
        for (field, count) in [
            ("vertex_count", header.vertex_count),
            ("face_count", header.face_count),
            ("bone_count", header.bone_count),
        ] {
            if let Some(item) = rules::validate_legacy_count(field, count) {
                report.add(item);
            }
        }
        if let Some(item) = rules::validate_texture_height(texture_height) {
            report.add(item);
        }
    }

    let mut faces: Vec<Face> = BinRead::read_options(
        &mut cursor,
        binrw::Endian::Little,
        VecArgs {
            count: header.face_count as usize,
            inner: (),
        },
    )?;
    let mut vertices: Vec<Vertex> = BinRead::read_options(
        &mut cursor,
        binrw::Endian::Little,
        VecArgs {
            count: header.vertex_count as usize,
            inner: (),
        },
    )?;
    let mut bones: Vec<Bone> = BinRead::read_options(
        &mut cursor,
        binrw::Endian::Little,
        VecArgs {
            count: header.bone_count as usize,
            inner: (),
        },
    )?;
    let words: Vec<u16> = BinRead::read_options(
        &mut cursor,
        binrw::Endian::Little,
        VecArgs {
            count: (header.texture_size / 2) as usize,
            inner: (),
        },
    )?;

    if opts.flip_handedness {
        for face in faces.iter_mut() {
            face.flip_handedness();
        }
    }

    if opts.validate {
        validate_mesh(&mut faces, &mut vertices, &mut bones, texture_height, &mut report)?;
        for item in rules::validate_texture_words(&words) {
            report.add(item);
        }
    }

    let texture = if opts.parse_texture && header.texture_size > 0 {
        Some(PackedTexture {
            words,
            height: texture_height,
        })
    } else {
        None
    };

    let model = Model {
        faces,
        vertices,
        bones,
        texture,
        ..Model::default()
    };
    Ok((model, report))
}

/// Encode a model as a 3DF byte stream.
pub fn encode(model: &Model, opts: &EncodeOptions, report: &mut ValidationReport) -> Result<Vec<u8>> {
    rules::ensure_counts(
        model.vertices.len() as u32,
        model.faces.len() as u32,
        model.bones.len() as u32,
    )?;
    for (field, count) in [
        ("vertex_count", model.vertices.len() as u32),
        ("face_count", model.faces.len() as u32),
        ("bone_count", model.bones.len() as u32),
    ] {
        if let Some(item) = rules::validate_legacy_count(field, count) {
            report.add(item);
        }
    }

    let texture = if opts.export_texture {
        model.texture.as_ref()
    } else {
        None
    };
    if let Some(tex) = texture {
        ensure_texture_rows(tex)?;
    }
    let texture_size = texture.map(PackedTexture::size_bytes).unwrap_or(0);
    let texture_height = texture_height_for(texture_size);

    let header = ThreeDfHeader {
        vertex_count: model.vertices.len() as u32,
        face_count: model.faces.len() as u32,
        bone_count: model.bones.len() as u32,
        texture_size,
    };

    let faces = faces_for_disk(&model.faces, opts, texture_height);
    let vertices = scaled_vertices(&model.vertices, opts.scale);
    let bones: Vec<Bone> = model
        .bones
        .iter()
        .map(|b| Bone {
            name: sanitize_name(&b.name, "Bone", ValidationCategory::Skeleton, report),
            pos: crate::math::DfVector3(b.pos.0 * opts.scale),
            parent: b.parent,
            hidden: b.hidden,
        })
        .collect();

    let mut cursor = Cursor::new(Vec::new());
    header.write(&mut cursor)?;
    faces.write_options(&mut cursor, binrw::Endian::Little, ())?;
    vertices.write_options(&mut cursor, binrw::Endian::Little, ())?;
    bones.write_options(&mut cursor, binrw::Endian::Little, ())?;
    if let Some(tex) = texture {
        tex.words.write_options(&mut cursor, binrw::Endian::Little, ())?;
    }

    Ok(cursor.into_inner())
}
