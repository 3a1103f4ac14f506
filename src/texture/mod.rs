//! ARGB1555 texture codec.
//!
//! Textures are stored as 16-bit little-endian words, one alpha bit and
//! five bits per color channel, in fixed 256-pixel rows. Disk row 0 is the
//! bottom row of the unpacked image, so both directions flip vertically.

use crate::error::{FormatError, Result};
use crate::validation::limits::TEXTURE_WIDTH;

/// Floats per unpacked pixel (RGBA).
const CHANNELS: usize = 4;

/// Unpack ARGB1555 words into RGBA floats in [0, 1].
///
/// The alpha bit is not used as transparency by the consuming pipeline, so
/// the alpha channel is forced to 0 regardless of the stored bit (the raw
/// words keep whatever was there; validation reports set bits separately).
pub fn unpack_argb1555(words: &[u16], height: u32) -> Vec<f32> {
    let width = TEXTURE_WIDTH as usize;
    let mut pixels = vec![0.0f32; words.len() * CHANNELS];

    for (i, &word) in words.iter().enumerate() {
        let r = ((word >> 10) & 0x1F) as f32 / 31.0;
        let g = ((word >> 5) & 0x1F) as f32 / 31.0;
        let b = (word & 0x1F) as f32 / 31.0;

        // Vertical flip: disk row 0 lands on the last unpacked row.
        let row = i / width;
        let col = i % width;
        let flipped = (height as usize - 1 - row) * width + col;
        let out = flipped * CHANNELS;
        pixels[out] = r;
        pixels[out + 1] = g;
        pixels[out + 2] = b;
        pixels[out + 3] = 0.0;
    }

    pixels
}

/// Pack RGBA floats back into ARGB1555 words.
///
/// Channels are rounded, not truncated, then clamped to [0, 31]. The alpha
/// bit is always written 0. The row order is flipped back to the disk
/// convention.
pub fn pack_argb1555(pixels: &[f32], width: u32, height: u32) -> Result<Vec<u16>> {
    if width != TEXTURE_WIDTH {
        return Err(FormatError::TextureLayout {
            message: format!("texture width {} must be {} pixels", width, TEXTURE_WIDTH),
        });
    }
    let expected = width as usize * height as usize * CHANNELS;
    if pixels.len() != expected {
        return Err(FormatError::TextureLayout {
            message: format!(
                "pixel data length {} does not match expected {} (width={}, height={})",
                pixels.len(),
                expected,
                width,
                height
            ),
        });
    }

    let width = width as usize;
    let mut words = vec![0u16; width * height as usize];

    for (i, word) in words.iter_mut().enumerate() {
        let row = i / width;
        let col = i % width;
        let src = ((height as usize - 1 - row) * width + col) * CHANNELS;

        let quant = |c: f32| -> u16 { (c * 31.0).round().clamp(0.0, 31.0) as u16 };
        let r = quant(pixels[src]);
        let g = quant(pixels[src + 1]);
        let b = quant(pixels[src + 2]);

        *word = (r << 10) | (g << 5) | b;
    }

    Ok(words)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pack_unpack_roundtrip_exact_for_zero_alpha() {
        // One full row of every representable RGB pattern slice.
        let height = 2u32;
        let words: Vec<u16> = (0..TEXTURE_WIDTH * height)
            .map(|i| (i % 0x8000) as u16)
            .collect();
        let pixels = unpack_argb1555(&words, height);
        let packed = pack_argb1555(&pixels, TEXTURE_WIDTH, height).unwrap();
        assert_eq!(packed, words);
    }

    #[test]
    fn alpha_bit_is_stripped_on_unpack() {
        let mut words = vec![0u16; TEXTURE_WIDTH as usize];
        words[0] = 0x8000 | (31 << 10);
        let pixels = unpack_argb1555(&words, 1);
        // Alpha channel of every pixel is forced to 0.
        assert!(pixels.iter().skip(3).step_by(4).all(|&a| a == 0.0));
    }

    #[test]
    fn rows_flip_vertically() {
        let height = 2u32;
        let mut words = vec![0u16; (TEXTURE_WIDTH * height) as usize];
        // Mark the first disk pixel (row 0, col 0) pure red.
        words[0] = 31 << 10;
        let pixels = unpack_argb1555(&words, height);
        // It must land on the last unpacked row.
        let bottom_row_start = (TEXTURE_WIDTH * (height - 1)) as usize * 4;
        assert_eq!(pixels[bottom_row_start], 1.0);
        assert_eq!(pixels[0], 0.0);
    }

    #[test]
    fn channel_values_round_not_truncate() {
        // 0.5 * 31 = 15.5 must round to 16, not truncate to 15.
        let pixels: Vec<f32> = (0..TEXTURE_WIDTH as usize)
            .flat_map(|_| [0.5, 0.0, 0.0, 0.0])
            .collect();
        let words = pack_argb1555(&pixels, TEXTURE_WIDTH, 1).unwrap();
        assert_eq!((words[0] >> 10) & 0x1F, 16);
    }

    #[test]
    fn out_of_range_channels_clamp() {
        let pixels: Vec<f32> = (0..TEXTURE_WIDTH as usize)
            .flat_map(|_| [2.0, -1.0, 1.0, 0.0])
            .collect();
        let words = pack_argb1555(&pixels, TEXTURE_WIDTH, 1).unwrap();
        assert_eq!((words[0] >> 10) & 0x1F, 31);
        assert_eq!((words[0] >> 5) & 0x1F, 0);
        assert_eq!(words[0] & 0x1F, 31);
    }

    #[test]
    fn wrong_width_is_fatal() {
        let pixels = vec![0.0f32; 128 * 4];
        assert!(matches!(
            pack_argb1555(&pixels, 128, 1),
            Err(FormatError::TextureLayout { .. })
        ));
    }

    #[test]
    fn wrong_pixel_length_is_fatal() {
        let pixels = vec![0.0f32; 10];
        assert!(matches!(
            pack_argb1555(&pixels, TEXTURE_WIDTH, 1),
            Err(FormatError::TextureLayout { .. })
        ));
    }
}
