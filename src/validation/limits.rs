/// Hard ceiling shared by the original tool chain; counts above this are
/// treated as corruption, not as a big model.
pub const MAX_VERTEX_COUNT: u32 = 2048;
pub const MAX_FACE_COUNT: u32 = 2048;
pub const MAX_BONE_COUNT: u32 = 2048;

/// Legacy editors cannot open files above this, so counts in
/// (1024, 2048] get a warning.
pub const LEGACY_TOOL_COUNT: u32 = 1024;

/// Fixed texture row width in pixels; every format variant uses it.
pub const TEXTURE_WIDTH: u32 = 256;

/// Bytes per texture row (256 pixels x 2 bytes).
pub const TEXTURE_ROW_BYTES: u32 = TEXTURE_WIDTH * 2;

/// Largest texture payload any known file carries.
pub const MAX_TEXTURE_SIZE: u32 = 131072;

/// Texture heights above this are almost certainly corruption.
pub const SUSPICIOUS_TEXTURE_HEIGHT: u32 = 512;

/// Animation-to-sound cross reference table capacity.
pub const CROSS_REF_SLOTS: usize = 64;

/// Fixed PCM rate for bundled sounds.
pub const SOUND_SAMPLE_RATE: u32 = 22050;
