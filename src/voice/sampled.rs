//! Pitch-shifted playback of a cached piano sample.

use crate::samples::SampleData;

use super::envelope::SampleEnvelope;

/// Render `duration` seconds of `sample` read at `playback_rate`.
///
/// The output stops early when the sample runs out. Reads use linear
/// interpolation between neighbouring frames.
pub fn render_sampled(
    sample: &SampleData,
    playback_rate: f64,
    duration: f64,
    envelope: &SampleEnvelope,
) -> Vec<f32> {
    let data = sample.samples();
    if data.is_empty() || duration <= 0.0 || playback_rate <= 0.0 {
        return Vec::new();
    }

    let sample_rate = sample.sample_rate() as f64;
    let sample_secs = sample.duration_secs();
    let wanted = (duration * sample_rate) as usize;
    let available = ((data.len() - 1) as f64 / playback_rate) as usize + 1;
    let num_samples = wanted.min(available);

    let mut output = Vec::with_capacity(num_samples);
    for i in 0..num_samples {
        let pos = i as f64 * playback_rate;
        let idx = pos as usize;
        let frac = (pos - idx as f64) as f32;
        let value = match data.get(idx + 1) {
            Some(&next) => data[idx] * (1.0 - frac) + next * frac,
            None => data[idx.min(data.len() - 1)],
        };
        let t = i as f64 / sample_rate;
        output.push(value * envelope.gain(t, duration, sample_secs) as f32);
    }

    output
}
