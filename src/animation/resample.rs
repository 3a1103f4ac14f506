//! Re-time an already-discrete keyframe timeline to a new key rate.
//!
//! Used when the intended key rate changes after import: the existing keys
//! are treated as sequential game frames, so the i-th unique key time across
//! all channels maps to `start + i * step`. Handles keep their relative
//! offset to the key (shifted, not rescaled), which preserves interpolation
//! shape to first order; that is a deliberate simplification.

use std::collections::HashMap;

use super::frame_step;

/// One keyframe with absolute Bezier handle positions.
#[derive(Debug, Clone, PartialEq)]
pub struct Keyframe {
    pub time: f64,
    pub value: f64,
    pub handle_left: [f64; 2],
    pub handle_right: [f64; 2],
}

impl Keyframe {
    pub fn new(time: f64, value: f64) -> Self {
        Keyframe {
            time,
            value,
            handle_left: [time - 0.5, value],
            handle_right: [time + 0.5, value],
        }
    }
}

/// One animated channel (a single property's curve).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Channel {
    pub keys: Vec<Keyframe>,
}

/// Remap every channel's key times onto the `host_fps / kps` grid.
pub fn resample_timeline(channels: &mut [Channel], kps: u32, host_fps: f64) {
    let step = frame_step(host_fps, kps);

    let mut times: Vec<f64> = channels
        .iter()
        .flat_map(|c| c.keys.iter().map(|k| k.time))
        .collect();
    times.sort_by(f64::total_cmp);
    times.dedup();
    let Some(&start) = times.first() else {
        return;
    };

    let mapping: HashMap<u64, f64> = times
        .iter()
        .enumerate()
        .map(|(i, t)| (t.to_bits(), start + i as f64 * step))
        .collect();

    for channel in channels.iter_mut() {
        for key in channel.keys.iter_mut() {
            if let Some(&new_time) = mapping.get(&key.time.to_bits()) {
                let delta = new_time - key.time;
                key.time = new_time;
                key.handle_left[0] += delta;
                key.handle_right[0] += delta;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn channel(times: &[f64]) -> Channel {
        Channel {
            keys: times.iter().map(|&t| Keyframe::new(t, 0.0)).collect(),
        }
    }

    #[test]
    fn ordinals_map_to_the_new_grid() {
        // Keys imported at 1 frame apart, re-timed to 10 kps at 30 fps.
        let mut channels = vec![channel(&[1.0, 2.0, 3.0, 4.0])];
        resample_timeline(&mut channels, 10, 30.0);
        let times: Vec<f64> = channels[0].keys.iter().map(|k| k.time).collect();
        assert_eq!(times, vec![1.0, 4.0, 7.0, 10.0]);
    }

    #[test]
    fn unique_times_are_collected_across_channels() {
        let mut channels = vec![channel(&[0.0, 2.0]), channel(&[1.0, 2.0])];
        resample_timeline(&mut channels, 15, 30.0);
        // Unique sorted times 0,1,2 -> 0,2,4.
        assert_eq!(channels[0].keys[0].time, 0.0);
        assert_eq!(channels[0].keys[1].time, 4.0);
        assert_eq!(channels[1].keys[0].time, 2.0);
        assert_eq!(channels[1].keys[1].time, 4.0);
    }

    #[test]
    fn handles_shift_with_their_key() {
        let mut key = Keyframe::new(2.0, 1.0);
        key.handle_left = [1.25, 1.0];
        key.handle_right = [2.75, 1.0];
        let mut channels = vec![Channel {
            keys: vec![Keyframe::new(1.0, 0.0), key],
        }];
        resample_timeline(&mut channels, 10, 30.0);
        let moved = &channels[0].keys[1];
        assert_eq!(moved.time, 4.0);
        // Relative offsets survive: -0.75 and +0.75 around the key.
        assert_eq!(moved.handle_left[0], 3.25);
        assert_eq!(moved.handle_right[0], 4.75);
    }

    #[test]
    fn empty_timeline_is_a_no_op() {
        let mut channels: Vec<Channel> = vec![Channel::default()];
        resample_timeline(&mut channels, 10, 30.0);
        assert!(channels[0].keys.is_empty());
    }

    #[test]
    fn irregular_spacing_becomes_regular() {
        let mut channels = vec![channel(&[5.0, 5.5, 9.0, 23.0])];
        resample_timeline(&mut channels, 15, 30.0);
        let times: Vec<f64> = channels[0].keys.iter().map(|k| k.time).collect();
        assert_eq!(times, vec![5.0, 7.0, 9.0, 11.0]);
    }
}
