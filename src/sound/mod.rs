//! Sound bundling: PCM conversion to the fixed 22050 Hz mono format and
//! management of the animation-to-sound cross-reference table.

use std::collections::HashMap;

use crate::model::car::{CarSound, CrossRefTable};
use crate::validation::limits::{CROSS_REF_SLOTS, SOUND_SAMPLE_RATE};
use crate::validation::report::{ValidationCategory, ValidationReport};

/// Average interleaved channels down to mono.
pub fn mix_to_mono(samples: &[f32], channels: u16) -> Vec<f32> {
    if channels <= 1 {
        return samples.to_vec();
    }
    let channels = channels as usize;
    samples
        .chunks(channels)
        .map(|frame| frame.iter().sum::<f32>() / frame.len() as f32)
        .collect()
}

/// Linear-interpolation resampler. Not sinc quality, but fast and fine for
/// short game effects.
pub fn resample_linear(samples: &[f32], source_rate: u32, target_rate: u32) -> Vec<f32> {
    if samples.is_empty() || source_rate == target_rate {
        return samples.to_vec();
    }

    let ratio = source_rate as f64 / target_rate as f64;
    let output_len = (samples.len() as f64 / ratio).ceil() as usize;
    let mut output = Vec::with_capacity(output_len);

    for i in 0..output_len {
        let src_pos = i as f64 * ratio;
        let src_idx = src_pos.floor() as usize;
        let frac = src_pos - src_idx as f64;

        let sample = if src_idx + 1 < samples.len() {
            let s1 = samples[src_idx] as f64;
            let s2 = samples[src_idx + 1] as f64;
            (s1 + (s2 - s1) * frac) as f32
        } else if src_idx < samples.len() {
            samples[src_idx]
        } else {
            break;
        };
        output.push(sample);
    }

    output
}

/// Quantize float samples in [-1, 1] to 16-bit signed PCM.
pub fn quantize_pcm(samples: &[f32]) -> Vec<i16> {
    samples
        .iter()
        .map(|&s| (s * 32767.0).round().clamp(-32768.0, 32767.0) as i16)
        .collect()
}

/// Full conversion pipeline: mono-mix, resample to 22050 Hz, quantize.
pub fn convert_pcm(samples: &[f32], channels: u16, source_rate: u32) -> Vec<i16> {
    let mono = mix_to_mono(samples, channels);
    let resampled = resample_linear(&mono, source_rate, SOUND_SAMPLE_RATE);
    quantize_pcm(&resampled)
}

/// Collects sounds for a CAR export, deduplicating by name and filling the
/// fixed 64-slot animation-to-sound table.
#[derive(Debug, Default)]
pub struct SoundBundler {
    sounds: Vec<CarSound>,
    index_by_name: HashMap<String, i32>,
    cross_ref: CrossRefTable,
    overflow_reported: bool,
}

impl SoundBundler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a raw audio source to an animation slot, converting it to the
    /// bundle format. A name seen before reuses its payload.
    pub fn attach(
        &mut self,
        animation_slot: usize,
        name: &str,
        samples: &[f32],
        channels: u16,
        source_rate: u32,
        report: &mut ValidationReport,
    ) {
        let data = convert_pcm(samples, channels, source_rate);
        self.attach_pcm(animation_slot, name, data, report);
    }

    /// Attach pre-converted 22050 Hz mono PCM to an animation slot.
    pub fn attach_pcm(
        &mut self,
        animation_slot: usize,
        name: &str,
        data: Vec<i16>,
        report: &mut ValidationReport,
    ) {
        if animation_slot >= CROSS_REF_SLOTS {
            if !self.overflow_reported {
                self.overflow_reported = true;
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
            return;
        }

        let index = match self.index_by_name.get(name) {
            Some(&index) => index,
            None => {
                let index = if data.is_empty() {
                    report.warn(
                        "SOUND_EMPTY",
                        ValidationCategory::Sound,
                        format!("Sound '{}' has no samples; animation left unlinked", name),
                    );
                    -1
                } else {
                    let index = self.sounds.len() as i32;
                    self.sounds.push(CarSound {
                        name: name.to_string(),
                        data,
                    });
                    index
                };
                self.index_by_name.insert(name.to_string(), index);
                index
            }
        };

        self.cross_ref.slots[animation_slot] = index;
    }

    /// Bundled sound count so far.
    pub fn sound_count(&self) -> usize {
        self.sounds.len()
    }

    /// Finish and hand the sections to the encoder.
    pub fn into_parts(self) -> (Vec<CarSound>, CrossRefTable) {
        (self.sounds, self.cross_ref)
    }
}
