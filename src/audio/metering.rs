//! Audio level measurement over raw i16 sample frames
//!
//! Provides the peak scan used by the voice-activity classifier. For stereo
//! frames only one physical channel is examined (stride 2 over interleaved
//! samples) as a proxy for overall level.

/// Peak absolute amplitude over a frame, examining every `stride`-th sample
/// starting at index 0.
///
/// `stride` of 1 scans a mono frame; 2 scans the designated channel of an
/// interleaved stereo frame. Samples are widened to i32 before taking the
/// absolute value so `i16::MIN` cannot overflow.
pub fn peak_level(samples: &[i16], stride: usize) -> i32 {
    samples
        .iter()
        .step_by(stride.max(1))
        .map(|&s| (s as i32).abs())
        .max()
        .unwrap_or(0)
}
