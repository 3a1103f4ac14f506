/// Face flag bits.
///
/// These come straight from the engine's material attribute word. The file
/// format stores the full 16-bit word; bits outside `KNOWN_MASK` are kept
/// as-is and reported by validation.
pub const FACE_FLAG_DOUBLE_SIDE: u16 = 0x0001;
pub const FACE_FLAG_DARK_BACK: u16 = 0x0002;
pub const FACE_FLAG_OPACITY: u16 = 0x0004;
pub const FACE_FLAG_TRANSPARENT: u16 = 0x0008;
pub const FACE_FLAG_MORTAL: u16 = 0x0010;
pub const FACE_FLAG_PHONG: u16 = 0x0020;
pub const FACE_FLAG_ENV_MAP: u16 = 0x0040;
pub const FACE_FLAG_NEED_VC: u16 = 0x0080;
pub const FACE_FLAG_DARK_FRONT: u16 = 0x8000;

pub const KNOWN_MASK: u16 = FACE_FLAG_DOUBLE_SIDE
    | FACE_FLAG_DARK_BACK
    | FACE_FLAG_OPACITY
    | FACE_FLAG_TRANSPARENT
    | FACE_FLAG_MORTAL
    | FACE_FLAG_PHONG
    | FACE_FLAG_ENV_MAP
    | FACE_FLAG_NEED_VC
    | FACE_FLAG_DARK_FRONT;

/// Human-readable names for the known bits, in bit order.
pub const FLAG_NAMES: &[(u16, &str)] = &[
    (FACE_FLAG_DOUBLE_SIDE, "Double Side"),
    (FACE_FLAG_DARK_BACK, "Dark Back"),
    (FACE_FLAG_OPACITY, "Opacity"),
    (FACE_FLAG_TRANSPARENT, "Transparent"),
    (FACE_FLAG_MORTAL, "Mortal"),
    (FACE_FLAG_PHONG, "Phong"),
    (FACE_FLAG_ENV_MAP, "Env Map"),
    (FACE_FLAG_NEED_VC, "Need VC"),
    (FACE_FLAG_DARK_FRONT, "Dark"),
];

/// Bits of `flags` that no known tool assigns meaning to.
pub fn unknown_bits(flags: u16) -> u16 {
    flags & !KNOWN_MASK
}

/// Names of the known bits set in `flags`.
pub fn flag_names(flags: u16) -> Vec<&'static str> {
    FLAG_NAMES
        .iter()
        .filter(|(bit, _)| flags & bit != 0)
        .map(|(_, name)| *name)
        .collect()
}
