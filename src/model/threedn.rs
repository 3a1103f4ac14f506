//! 3DN variant codec.
//!
//! Same family, different packing: a named header with a sprite reference,
//! vertices ahead of faces, signed pixel-space UVs, no embedded texture.
//! Bones use the shared 48-byte record.

use std::io::Cursor;

use binrw::{binrw, BinRead, BinWrite, VecArgs};

use super::records::{decode_name32, encode_name32, Bone, Face, ThreeDnFace, ThreeDnVertex, Vertex};
use super::{sanitize_name, DecodeOptions, EncodeOptions, Model};
use crate::math::DfVector3;
use crate::validation::report::{ValidationCategory, ValidationReport};
use crate::validation::{rules, validate_mesh};
use crate::error::Result;

#[binrw]
#[derive(Debug, Clone, Default, PartialEq)]
#[br(little)]
#[bw(little)]
pub struct ThreeDnHeader {
    pub vertex_count: u32,
    pub face_count: u32,
    pub bone_count: u32,
    #[br(map = decode_name32)]
    #[bw(map = |name: &String| encode_name32(name))]
    pub model_name: String,
    pub has_sprite: u32,
}

impl ThreeDnHeader {
    pub const SIZE: u64 = 48;

    pub fn expected_size(&self) -> u64 {
        let sprite = if self.has_sprite != 0 { 32 } else { 0 };
        Self::SIZE
            + sprite
            + self.vertex_count as u64 * ThreeDnVertex::SIZE
            + self.face_count as u64 * ThreeDnFace::SIZE
            + self.bone_count as u64 * Bone::SIZE
    }
}

/// Decode a 3DN byte stream into a model plus its validation report.
pub fn decode(bytes: &[u8], opts: &DecodeOptions) -> Result<(Model, ValidationReport)> {
    let mut report = ValidationReport::new();

    if (bytes.len() as u64) < ThreeDnHeader::SIZE {
        return Err(crate::error::FormatError::Truncated {
            section: "3DN header",
            expected: ThreeDnHeader::SIZE,
            actual: bytes.len() as u64,
        });
    }
    let mut cursor = Cursor::new(bytes);
    let header = ThreeDnHeader::read(&mut cursor)?;

    rules::ensure_counts(header.vertex_count, header.face_count, header.bone_count)?;
    if let Some(item) = rules::ensure_total_size("3DN records", header.expected_size(), bytes.len() as u64)? {
        report.add(item);
    }
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
    }

    let sprite_name = if header.has_sprite != 0 {
        let mut raw = [0u8; 32];
        std::io::Read::read_exact(&mut cursor, &mut raw)?;
        Some(decode_name32(raw))
    } else {
        None
    };

    let dn_vertices: Vec<ThreeDnVertex> = BinRead::read_options(
        &mut cursor,
        binrw::Endian::Little,
        VecArgs {
            count: header.vertex_count as usize,
            inner: (),
        },
    )?;
    let mut dn_faces: Vec<ThreeDnFace> = BinRead::read_options(
        &mut cursor,
        binrw::Endian::Little,
        VecArgs {
            count: header.face_count as usize,
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

    if opts.flip_handedness {
        for face in dn_faces.iter_mut() {
            face.flip_handedness();
        }
    }

    // Fold into the shared records. Negative pixel UVs are outside the texel
    // bounds and clamp to 0; the 3DN reserved word rides in `dmask`.
    let mut negative_uvs = 0usize;
    let mut faces: Vec<Face> = dn_faces
        .iter()
        .map(|f| {
            let mut texel = |v: i16| -> u32 {
                if v < 0 {
                    negative_uvs += 1;
                    0
                } else {
                    v as u32
                }
            };
            Face {
                v: [f.v1, f.v2, f.v3],
                u_tex: [texel(f.tax), texel(f.tbx), texel(f.tcx)],
                v_tex: [texel(f.tay), texel(f.tby), texel(f.tcy)],
                flags: f.flags,
                dmask: f.reserved,
                ..Face::default()
            }
        })
        .collect();
    if negative_uvs > 0 {
        report.repaired(
            "FACE_UV_NEGATIVE",
            ValidationCategory::Mesh,
            format!("{} negative pixel UVs clamped to 0", negative_uvs),
        );
    }

    let mut vertices: Vec<Vertex> = dn_vertices
        .iter()
        .map(|v| Vertex {
            coord: v.coord,
            owner: v.owner.min(u16::MAX as u32) as u16,
            hide: 0,
        })
        .collect();

    if opts.validate {
        // 3DN has no texture payload; UVs address the external 256-tall sheet.
        validate_mesh(&mut faces, &mut vertices, &mut bones, 256, &mut report)?;
    }

    let model = Model {
        name: Some(header.model_name),
        sprite_name,
        faces,
        vertices,
        bones,
        ..Model::default()
    };
    Ok((model, report))
}

/// Encode a model as a 3DN byte stream.
pub fn encode(model: &Model, opts: &EncodeOptions, report: &mut ValidationReport) -> Result<Vec<u8>> {
    rules::ensure_counts(
        model.vertices.len() as u32,
        model.faces.len() as u32,
        model.bones.len() as u32,
    )?;

    let header = ThreeDnHeader {
        vertex_count: model.vertices.len() as u32,
        face_count: model.faces.len() as u32,
        bone_count: model.bones.len() as u32,
        model_name: sanitize_name(
            model.name.as_deref().unwrap_or(""),
            "Model",
            ValidationCategory::Header,
            report,
        ),
        has_sprite: u32::from(model.sprite_name.is_some()),
    };

    let faces = super::faces_for_disk(&model.faces, opts, 256);
    let dn_faces: Vec<ThreeDnFace> = faces
        .iter()
        .map(|f| ThreeDnFace {
            v1: f.v[0],
            v2: f.v[1],
            v3: f.v[2],
            tax: f.u_tex[0].min(i16::MAX as u32) as i16,
            tbx: f.u_tex[1].min(i16::MAX as u32) as i16,
            tcx: f.u_tex[2].min(i16::MAX as u32) as i16,
            tay: f.v_tex[0].min(i16::MAX as u32) as i16,
            tby: f.v_tex[1].min(i16::MAX as u32) as i16,
            tcy: f.v_tex[2].min(i16::MAX as u32) as i16,
            flags: f.flags,
            reserved: f.dmask,
        })
        .collect();

    let dn_vertices: Vec<ThreeDnVertex> = model
        .vertices
        .iter()
        .map(|v| ThreeDnVertex {
            coord: DfVector3(v.coord.0 * opts.scale),
            owner: u32::from(v.owner),
        })
        .collect();

    let bones: Vec<Bone> = model
        .bones
        .iter()
        .map(|b| Bone {
            name: sanitize_name(&b.name, "Bone", ValidationCategory::Skeleton, report),
            pos: DfVector3(b.pos.0 * opts.scale),
            parent: b.parent,
            hidden: b.hidden,
        })
        .collect();

    let mut cursor = Cursor::new(Vec::new());
    header.write(&mut cursor)?;
    if let Some(sprite) = &model.sprite_name {
        let clean = sanitize_name(sprite, "Sprite", ValidationCategory::Header, report);
        std::io::Write::write_all(&mut cursor, &encode_name32(&clean))?;
    }
    dn_vertices.write_options(&mut cursor, binrw::Endian::Little, ())?;
    dn_faces.write_options(&mut cursor, binrw::Endian::Little, ())?;
    bones.write_options(&mut cursor, binrw::Endian::Little, ())?;

    Ok(cursor.into_inner())
}
