//! Animation export tooling: baking a continuous deformation source into
//! fixed-rate frames, and re-timing already-discrete keyframe timelines.

pub mod baker;
pub mod resample;

/// Host-timeline step between successive game keys, in host frames.
pub fn frame_step(host_fps: f64, kps: u32) -> f64 {
    host_fps / kps.max(1) as f64
}

/// Number of samples covering `[range_start, range_end]` at `step`.
///
/// The quotient is snapped to the nearest whole step (rounding half up)
/// when it lands within noise of one, so a long timeline whose division
/// comes out as 6.9999999 still yields the sample at the far end instead
/// of drifting one short.
pub fn sample_count(range_start: f64, range_end: f64, step: f64) -> usize {
    let steps = (range_end - range_start) / step;
    let nearest = (steps + 0.5).floor();
    let steps = if (steps - nearest).abs() < 1e-6 {
        nearest
    } else {
        steps
    };
    steps.floor() as usize + 1
}
