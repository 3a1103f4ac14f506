//! Bake a continuous deformation source into discrete fixed-point frames.

use super::{frame_step, sample_count};
use crate::error::{FormatError, Result};
use crate::model::car::CarAnimation;
use crate::validation::report::{ValidationCategory, ValidationReport};

/// Host-supplied evaluator for deformed geometry at a continuous time.
pub trait DeformSource {
    /// Deformed vertex positions at `time` (in host frames).
    fn evaluate(&mut self, time: f64) -> Vec<[f32; 3]>;
}

/// Sampling parameters for one bake.
#[derive(Debug, Clone)]
pub struct BakeSettings {
    pub host_fps: f64,
    pub range_start: f64,
    pub range_end: f64,
    pub kps: u32,
    /// Uniform scale applied before quantization.
    pub scale: f32,
}

impl Default for BakeSettings {
    fn default() -> Self {
        BakeSettings {
            host_fps: 30.0,
            range_start: 0.0,
            range_end: 0.0,
            kps: 15,
            scale: 1.0,
        }
    }
}

/// 1/16-unit fixed point: clamp, then truncate toward zero like the
/// original exporter's integer cast.
fn quantize(value: f32) -> i16 {
    (value * 16.0).clamp(-32768.0, 32767.0) as i16
}

/// Bake one animation.
///
/// The evaluator must keep the mesh topology stable: a frame with a
/// different vertex count aborts this animation (and only this one).
pub fn bake_animation<S: DeformSource>(
    name: &str,
    source: &mut S,
    base_vertex_count: usize,
    settings: &BakeSettings,
    report: &mut ValidationReport,
) -> Result<CarAnimation> {
    let step = frame_step(settings.host_fps, settings.kps);
    let count = sample_count(settings.range_start, settings.range_end, step);

    let mut frames = Vec::with_capacity(count * base_vertex_count * 3);
    for i in 0..count {
        let time = settings.range_start + i as f64 * step;
        let positions = source.evaluate(time);
        if positions.len() != base_vertex_count {
            return Err(FormatError::VertexCountMismatch {
                animation: name.to_string(),
                expected: base_vertex_count,
                actual: positions.len(),
            });
        }
        for p in positions {
            frames.push(quantize(p[0] * settings.scale));
            frames.push(quantize(p[1] * settings.scale));
            frames.push(quantize(p[2] * settings.scale));
        }
    }

    let animation = CarAnimation {
        name: name.to_string(),
        kps: settings.kps.max(1),
        frame_count: count as u32,
        frames,
    };

    if animation.is_static(base_vertex_count) {
        report.warn(
            "ANIMATION_STATIC",
            ValidationCategory::Animation,
            format!(
                "Animation '{}' appears to be static (all {} frames identical)",
                name, count
            ),
        );
    }

    Ok(animation)
}

/// Bake a batch, isolating per-animation failures: a bad animation is
/// skipped with a warning naming it, the rest still bake.
pub fn bake_all<S: DeformSource>(
    jobs: Vec<(String, S, BakeSettings)>,
    base_vertex_count: usize,
    report: &mut ValidationReport,
) -> Vec<CarAnimation> {
    let mut baked = Vec::with_capacity(jobs.len());
    for (name, mut source, settings) in jobs {
        match bake_animation(&name, &mut source, base_vertex_count, &settings, report) {
            Ok(animation) => baked.push(animation),
            Err(err) => report.warn(
                "ANIMATION_BAKE_FAILED",
                ValidationCategory::Animation,
                format!("Animation '{}' skipped: {}", name, err),
            ),
        }
    }
    baked
}
