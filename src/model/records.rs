use binrw::binrw;

use crate::math::DfVector3;

/// Fixed width of every name field in the 3DF family.
pub const NAME_LEN: usize = 32;

/// Decode a NUL-padded 32-byte name field.
pub(crate) fn decode_name32(raw: [u8; NAME_LEN]) -> String {
    let end = raw.iter().position(|&b| b == 0).unwrap_or(NAME_LEN);
    String::from_utf8_lossy(&raw[..end]).to_string()
}

/// Encode a name into a NUL-padded 32-byte field.
///
/// Callers are expected to run names through `sanitize_name` first so that
/// any dropped characters are reported; this function itself just ignores
/// whatever non-ASCII bytes are left.
pub(crate) fn encode_name32(name: &str) -> [u8; NAME_LEN] {
    let mut raw = [0u8; NAME_LEN];
    let mut i = 0;
    for b in name.bytes() {
        if !b.is_ascii() {
            continue;
        }
        if i >= NAME_LEN {
            break;
        }
        raw[i] = b;
        i += 1;
    }
    raw
}

/// A triangle record, 64 bytes on disk.
///
/// `dmask`, `distant`, `next`, `group` and the reserved tail are legacy
/// fields with no modeled behavior; they are carried through verbatim so
/// a decode/encode pass reproduces the source bytes.
#[binrw]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[br(little)]
#[bw(little)]
pub struct Face {
    pub v: [u32; 3],
    pub u_tex: [u32; 3],
    pub v_tex: [u32; 3],
    pub flags: u16,
    pub dmask: u16,
    pub distant: u32,
    pub next: u32,
    pub group: u32,
    pub reserved: [u8; 12],
}

impl Face {
    /// On-disk record size in bytes.
    pub const SIZE: u64 = 64;

    /// Reverse the winding order together with both texel triples.
    ///
    /// The vertex indices and their per-corner UVs must always flip as a
    /// unit; reversing only one of them leaves indices and texels paired
    /// wrong and corrupts texturing without any visible geometry error.
    pub fn flip_handedness(&mut self) {
        self.v.reverse();
        self.u_tex.reverse();
        self.v_tex.reverse();
    }

    /// True when two or more corners share a vertex index.
    pub fn is_degenerate(&self) -> bool {
        self.v[0] == self.v[1] || self.v[1] == self.v[2] || self.v[0] == self.v[2]
    }
}

/// A mesh vertex, 16 bytes on disk.
///
/// `hide` is cosmetic editor state with no in-game effect.
#[binrw]
#[derive(Debug, Clone, Default, PartialEq)]
#[br(little)]
#[bw(little)]
pub struct Vertex {
    pub coord: DfVector3,
    pub owner: u16,
    pub hide: u16,
}

impl Vertex {
    pub const SIZE: u64 = 16;
}

/// A skeleton node, 48 bytes on disk. `parent == -1` marks a root.
#[binrw]
#[derive(Debug, Clone, PartialEq)]
#[br(little)]
#[bw(little)]
pub struct Bone {
    #[br(map = decode_name32)]
    #[bw(map = |name: &String| encode_name32(name))]
    pub name: String,
    pub pos: DfVector3,
    pub parent: i16,
    pub hidden: u16,
}

impl Bone {
    pub const SIZE: u64 = 48;
}

impl Default for Bone {
    fn default() -> Self {
        Bone {
            name: String::new(),
            pos: DfVector3::default(),
            parent: -1,
            hidden: 0,
        }
    }
}

/// 3DN vertex, 16 bytes: no hide flag, wide owner field.
#[binrw]
#[derive(Debug, Clone, Default, PartialEq)]
#[br(little)]
#[bw(little)]
pub struct ThreeDnVertex {
    pub coord: DfVector3,
    pub owner: u32,
}

impl ThreeDnVertex {
    pub const SIZE: u64 = 16;
}

/// 3DN triangle, 28 bytes: UVs are signed per-corner pixel coordinates.
#[binrw]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[br(little)]
#[bw(little)]
pub struct ThreeDnFace {
    pub v1: u32,
    pub v2: u32,
    pub v3: u32,
    pub tax: i16,
    pub tay: i16,
    pub tbx: i16,
    pub tby: i16,
    pub tcx: i16,
    pub tcy: i16,
    pub flags: u16,
    pub reserved: u16,
}

impl ThreeDnFace {
    pub const SIZE: u64 = 28;

    pub fn flip_handedness(&mut self) {
        std::mem::swap(&mut self.v1, &mut self.v3);
        std::mem::swap(&mut self.tax, &mut self.tcx);
        std::mem::swap(&mut self.tay, &mut self.tcy);
    }
}
