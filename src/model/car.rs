//! CAR bundle codec.
//!
//! A CAR file is a 3DF-style mesh plus animation, sound and cross-reference
//! sections: 52-byte header, faces, vertices, texture, then repeated
//! length-prefixed animation and sound blocks and a fixed 64-slot
//! animation-to-sound table. The trailing sections are decoded in a loop;
//! the mesh survives even when an animation block turns out to be garbage.

use std::io::Cursor;

use binrw::{binrw, BinRead, BinWrite, VecArgs};

use super::records::{decode_name32, encode_name32, Face, Vertex};
use super::{
    ensure_texture_rows, faces_for_disk, sanitize_name, scaled_vertices, texture_height_for,
    DecodeOptions, EncodeOptions, Model, PackedTexture,
};
use crate::error::{FormatError, Result};
use crate::validation::limits::CROSS_REF_SLOTS;
use crate::validation::report::{ValidationCategory, ValidationReport};
use crate::validation::{repair, rules, validate_car_mesh};

#[binrw]
#[derive(Debug, Clone, Default, PartialEq)]
#[br(little)]
#[bw(little)]
pub struct CarHeader {
    #[br(map = decode_name32)]
    #[bw(map = |name: &String| encode_name32(name))]
    pub model_name: String,
    pub animation_count: u32,
    pub sound_count: u32,
    pub vertex_count: u32,
    pub face_count: u32,
    pub texture_size: u32,
}

impl CarHeader {
    pub const SIZE: u64 = 52;

    /// Size of the mesh part (everything before the animation blocks).
    pub fn expected_mesh_size(&self) -> u64 {
        Self::SIZE
            + self.face_count as u64 * Face::SIZE
            + self.vertex_count as u64 * Vertex::SIZE
            + self.texture_size as u64
    }
}

/// One baked animation: per-frame, per-vertex deltas in 1/16-unit fixed
/// point. The raw words are kept so a decode/encode pass is lossless.
#[binrw]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[br(little, import(vertex_count: usize))]
#[bw(little)]
pub struct CarAnimation {
    #[br(map = decode_name32)]
    #[bw(map = |name: &String| encode_name32(name))]
    pub name: String,
    pub kps: u32,
    pub frame_count: u32,
    #[br(count = frame_count as usize * vertex_count * 3)]
    pub frames: Vec<i16>,
}

impl CarAnimation {
    /// Block header size (name + kps + frame_count).
    pub const HEADER_SIZE: u64 = 40;

    /// Decode one frame to float positions (stored value / 16).
    pub fn frame_positions(&self, frame: usize, vertex_count: usize) -> Vec<[f32; 3]> {
        let start = frame * vertex_count * 3;
        self.frames[start..start + vertex_count * 3]
            .chunks_exact(3)
            .map(|c| [c[0] as f32 / 16.0, c[1] as f32 / 16.0, c[2] as f32 / 16.0])
            .collect()
    }

    /// True when every frame repeats the first one.
    pub fn is_static(&self, vertex_count: usize) -> bool {
        let stride = vertex_count * 3;
        if self.frame_count <= 1 || stride == 0 {
            return false;
        }
        let first = &self.frames[..stride];
        self.frames.chunks_exact(stride).skip(1).all(|f| f == first)
    }
}

/// One bundled sound: mono 16-bit PCM at the fixed 22050 Hz rate.
#[binrw]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[br(little)]
#[bw(little)]
pub struct CarSound {
    #[br(map = decode_name32)]
    #[bw(map = |name: &String| encode_name32(name))]
    pub name: String,
    #[br(temp)]
    #[bw(calc = (data.len() * 2) as u32)]
    length: u32,
    #[br(count = (length / 2) as usize)]
    pub data: Vec<i16>,
}

impl CarSound {
    pub const HEADER_SIZE: u64 = 36;

    /// Payload length in bytes as stored in the block header.
    pub fn byte_len(&self) -> u32 {
        (self.data.len() * 2) as u32
    }

    /// Raw PCM byte view for hosts feeding an audio backend.
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.data)
    }
}

/// Fixed-capacity animation-slot → sound-index table; -1 means no sound.
#[binrw]
#[derive(Debug, Clone, PartialEq, Eq)]
#[br(little)]
#[bw(little)]
pub struct CrossRefTable {
    pub slots: [i32; CROSS_REF_SLOTS],
}

impl CrossRefTable {
    pub const SIZE: u64 = CROSS_REF_SLOTS as u64 * 4;

    /// Sound index for an animation slot, if one is assigned.
    pub fn sound_for(&self, animation: usize) -> Option<usize> {
        self.slots
            .get(animation)
            .copied()
            .filter(|&s| s >= 0)
            .map(|s| s as usize)
    }
}

impl Default for CrossRefTable {
    fn default() -> Self {
        CrossRefTable {
            slots: [-1; CROSS_REF_SLOTS],
        }
    }
}

/// Re-base the 1-based on-disk owner indices to 0 and synthesize group
/// labels. CAR stores no bone table, only owner indices whose numbering
/// starts wherever the exporting tool left it.
fn rebase_owners(vertices: &mut [Vertex], report: &mut ValidationReport) -> Vec<String> {
    let min_nonzero = vertices
        .iter()
        .map(|v| v.owner)
        .filter(|&o| o > 0)
        .min();
    let Some(min) = min_nonzero else {
        return vec![];
    };

    for v in vertices.iter_mut() {
        if v.owner > 0 {
            v.owner -= min;
        }
    }
    report.repaired(
        "OWNER_REBASED",
        ValidationCategory::Mesh,
        format!("Owner indices started at {}; offset by -{} to start at index 0", min, min),
    );

    let max_owner = vertices.iter().map(|v| v.owner).max().unwrap_or(0);
    let names: Vec<String> = (0..=max_owner)
        .map(|i| format!("CarBone_{}", i + min))
        .collect();
    report.info(
        "OWNER_GROUPS_SYNTHESIZED",
        ValidationCategory::Mesh,
        format!(
            "Created {} placeholder groups for vertex owners starting from {} (no positions/parents in CAR)",
            names.len(),
            min
        ),
    );
    names
}

/// Decode a CAR byte stream into a model plus its validation report.
pub fn decode(bytes: &[u8], opts: &DecodeOptions) -> Result<(Model, ValidationReport)> {
    let mut report = ValidationReport::new();

    if (bytes.len() as u64) < CarHeader::SIZE {
        return Err(FormatError::Truncated {
            section: "CAR header",
            expected: CarHeader::SIZE,
            actual: bytes.len() as u64,
        });
    }
    let mut cursor = Cursor::new(bytes);
    let header = CarHeader::read(&mut cursor)?;

    rules::ensure_counts(header.vertex_count, header.face_count, 0)?;
    rules::ensure_texture_size(header.texture_size)?;
    // The trailing sections are variable, so only the mesh part is size-checked
    // up front; anything after it is consumed block by block.
    if (bytes.len() as u64) < header.expected_mesh_size() {
        return Err(FormatError::Truncated {
            section: "CAR mesh records",
            expected: header.expected_mesh_size(),
            actual: bytes.len() as u64,
        });
    }

    let texture_height = texture_height_for(header.texture_size);
    if opts.validate {
        if let Some(item) = rules::validate_car_model_name(&header.model_name) {
            report.add(item);
        }
        for (field, count) in [
            ("vertex_count", header.vertex_count),
            ("face_count", header.face_count),
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
        validate_car_mesh(&mut faces, &mut vertices, texture_height, &mut report)?;
        for item in rules::validate_texture_words(&words) {
            report.add(item);
        }
    }
    let group_names = rebase_owners(&mut vertices, &mut report);

    // Animation blocks. Each block declares its own frame count, so a
    // corrupt count is caught before slurping the payload; after the first
    // unreadable block the stream offset cannot be trusted any more.
    let vertex_count = header.vertex_count as usize;
    let mut animations = Vec::new();
    let mut stream_ok = true;
    for index in 0..header.animation_count {
        let remaining = bytes.len() as u64 - cursor.position();
        if remaining < CarAnimation::HEADER_SIZE {
            report.warn(
                "ANIMATION_TRUNCATED",
                ValidationCategory::Animation,
                format!(
                    "Animation block {} is truncated ({} bytes left); remaining animations skipped",
                    index, remaining
                ),
            );
            stream_ok = false;
            break;
        }

        let mut name_raw = [0u8; 32];
        std::io::Read::read_exact(&mut cursor, &mut name_raw)?;
        let name = decode_name32(name_raw);
        let kps = u32::read_le(&mut cursor)?;
        let frame_count = u32::read_le(&mut cursor)?;

        let payload = frame_count as u64 * vertex_count as u64 * 6;
        let remaining = bytes.len() as u64 - cursor.position();
        if payload > remaining {
            report.warn(
                "ANIMATION_TRUNCATED",
                ValidationCategory::Animation,
                format!(
                    "Animation {} '{}' declares {} frames ({} bytes) but only {} bytes remain; remaining animations skipped",
                    index, name, frame_count, payload, remaining
                ),
            );
            stream_ok = false;
            break;
        }

        let frames: Vec<i16> = BinRead::read_options(
            &mut cursor,
            binrw::Endian::Little,
            VecArgs {
                count: frame_count as usize * vertex_count * 3,
                inner: (),
            },
        )?;

        if frame_count == 0 {
            report.warn(
                "ANIMATION_EMPTY",
                ValidationCategory::Animation,
                format!("Animation {} '{}' has zero frames; skipped", index, name),
            );
            continue;
        }
        let kps = if kps == 0 {
            report.repaired(
                "ANIMATION_ZERO_KPS",
                ValidationCategory::Animation,
                format!("Animation {} '{}' has kps 0; clamped to 1", index, name),
            );
            1
        } else {
            kps
        };

        animations.push(CarAnimation {
            name,
            kps,
            frame_count,
            frames,
        });
    }

    // Sound blocks, same discipline.
    let mut sounds = Vec::new();
    if stream_ok {
        for index in 0..header.sound_count {
            let remaining = bytes.len() as u64 - cursor.position();
            if remaining < CarSound::HEADER_SIZE {
                report.warn(
                    "SOUND_TRUNCATED",
                    ValidationCategory::Sound,
                    format!(
                        "Sound block {} is truncated ({} bytes left); remaining sounds skipped",
                        index, remaining
                    ),
                );
                stream_ok = false;
                break;
            }

            let mut name_raw = [0u8; 32];
            std::io::Read::read_exact(&mut cursor, &mut name_raw)?;
            let name = decode_name32(name_raw);
            let length = u32::read_le(&mut cursor)?;

            let remaining = bytes.len() as u64 - cursor.position();
            if length as u64 > remaining {
                report.warn(
                    "SOUND_TRUNCATED",
                    ValidationCategory::Sound,
                    format!(
                        "Sound {} '{}' declares {} bytes but only {} remain; remaining sounds skipped",
                        index, name, length, remaining
                    ),
                );
                stream_ok = false;
                break;
            }
            if length % 2 != 0 {
                report.repaired(
                    "SOUND_ODD_LENGTH",
                    ValidationCategory::Sound,
                    format!(
                        "Sound {} '{}' has odd byte length {}; last byte dropped",
                        index, name, length
                    ),
                );
            }

            let data: Vec<i16> = BinRead::read_options(
                &mut cursor,
                binrw::Endian::Little,
                VecArgs {
                    count: (length / 2) as usize,
                    inner: (),
                },
            )?;
            if length % 2 != 0 {
                cursor.set_position(cursor.position() + 1);
            }

            sounds.push(CarSound { name, data });
        }
    }

    // Cross-reference table. When every block decoded cleanly a missing
    // table is real truncation; after a bad block the offset is meaningless
    // and an empty table with a warning is the best that can be done.
    let cross_ref = if stream_ok {
        let remaining = bytes.len() as u64 - cursor.position();
        if remaining < CrossRefTable::SIZE {
            return Err(FormatError::Truncated {
                section: "CAR cross-reference table",
                expected: CrossRefTable::SIZE,
                actual: remaining,
            });
        }
        let mut table = CrossRefTable::read(&mut cursor)?;
        repair::clamp_cross_ref(&mut table.slots, sounds.len(), &mut report);
        if let Some(item) = rules::ensure_total_size("CAR", cursor.position(), bytes.len() as u64)? {
            report.add(item);
        }
        table
    } else {
        report.warn(
            "CROSS_REF_UNREADABLE",
            ValidationCategory::Sound,
            "Cross-reference table skipped after malformed block; all animations unlinked".to_string(),
        );
        CrossRefTable::default()
    };

    let texture = if opts.parse_texture && header.texture_size > 0 {
        Some(PackedTexture {
            words,
            height: texture_height,
        })
    } else {
        None
    };

    let model = Model {
        name: Some(header.model_name),
        faces,
        vertices,
        texture,
        animations,
        sounds,
        cross_ref: Some(cross_ref),
        group_names,
        ..Model::default()
    };
    Ok((model, report))
}

/// Encode a model as a CAR byte stream.
pub fn encode(model: &Model, opts: &EncodeOptions, report: &mut ValidationReport) -> Result<Vec<u8>> {
    rules::ensure_counts(model.vertices.len() as u32, model.faces.len() as u32, 0)?;

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

    let vertex_count = model.vertices.len();
    let mut animations = Vec::with_capacity(model.animations.len());
    for anim in &model.animations {
        let per_frame = vertex_count * 3;
        if per_frame == 0 || anim.frames.len() % per_frame != 0 {
            return Err(FormatError::VertexCountMismatch {
                animation: anim.name.clone(),
                expected: vertex_count,
                actual: anim.frames.len() / 3,
            });
        }
        let frame_count = (anim.frames.len() / per_frame) as u32;
        let kps = opts.kps_overrides.get(&anim.name).copied().unwrap_or(anim.kps);
        animations.push(CarAnimation {
            name: sanitize_name(&anim.name, "Animation", ValidationCategory::Animation, report),
            kps,
            frame_count,
            frames: anim.frames.clone(),
        });
    }

    if animations.len() > CROSS_REF_SLOTS {
        report.warn(
            "CROSS_REF_OVERFLOW",
            ValidationCategory::Sound,
            format!(
                "More than {} animations; sound associations past slot {} are dropped",
                CROSS_REF_SLOTS,
                CROSS_REF_SLOTS - 1
            ),
        );
    }

    let sounds: Vec<CarSound> = model
        .sounds
        .iter()
        .map(|s| CarSound {
            name: sanitize_name(&s.name, "Sound", ValidationCategory::Sound, report),
            data: s.data.clone(),
        })
        .collect();

    let mut cross_ref = model.cross_ref.clone().unwrap_or_default();
    repair::clamp_cross_ref(&mut cross_ref.slots, sounds.len(), report);

    let header = CarHeader {
        model_name: sanitize_name(
            model.name.as_deref().unwrap_or(""),
            "Model",
            ValidationCategory::Header,
            report,
        ),
        animation_count: animations.len() as u32,
        sound_count: sounds.len() as u32,
        vertex_count: vertex_count as u32,
        face_count: model.faces.len() as u32,
        texture_size,
    };

    let faces = faces_for_disk(&model.faces, opts, texture_height);
    // On disk owners are 1-based.
    let mut vertices = scaled_vertices(&model.vertices, opts.scale);
    for v in vertices.iter_mut() {
        v.owner += 1;
    }

    let mut cursor = Cursor::new(Vec::new());
    header.write(&mut cursor)?;
    faces.write_options(&mut cursor, binrw::Endian::Little, ())?;
    vertices.write_options(&mut cursor, binrw::Endian::Little, ())?;
    if let Some(tex) = texture {
        tex.words.write_options(&mut cursor, binrw::Endian::Little, ())?;
    }
    for anim in &animations {
        anim.write(&mut cursor)?;
    }
    for sound in &sounds {
        sound.write(&mut cursor)?;
    }
    cross_ref.write(&mut cursor)?;

    Ok(cursor.into_inner())
}
