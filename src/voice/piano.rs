//! Synthesized piano fallback — triangle fundamental plus a soft octave, low-passed.

use super::envelope::AdsrEnvelope;
use super::filter::BiquadLowPass;
use super::oscillator::{advance, oscillator, Waveform};

/// Fallback piano voice used when no samples are loaded.
#[derive(Debug, Clone, Copy)]
pub struct PianoSynth {
    envelope: AdsrEnvelope,
    overtone_gain: f64,
    /// Cutoff is `cutoff_ratio * f`, capped at `max_cutoff`.
    cutoff_ratio: f64,
    max_cutoff: f64,
    q: f64,
}

impl PianoSynth {
    pub fn new() -> Self {
        Self {
            envelope: AdsrEnvelope::PIANO,
            overtone_gain: 0.15,
            cutoff_ratio: 6.0,
            max_cutoff: 8000.0,
            q: 0.5,
        }
    }

    pub fn cutoff(&self, freq: f64) -> f64 {
        (freq * self.cutoff_ratio).min(self.max_cutoff)
    }

    /// Render `duration` seconds of mono audio at `freq`.
    pub fn render(&self, freq: f64, duration: f64, sample_rate: u32) -> Vec<f32> {
        if duration <= 0.0 || freq <= 0.0 {
            return Vec::new();
        }
        let num_samples = (duration * sample_rate as f64) as usize;
        let mut filter = BiquadLowPass::new(self.cutoff(freq), self.q, sample_rate);

        let mut fundamental = 0.0_f64;
        let mut octave = 0.0_f64;
        let mut output = Vec::with_capacity(num_samples);

        for i in 0..num_samples {
            let t = i as f64 / sample_rate as f64;
            let raw = oscillator(Waveform::Triangle, fundamental)
                + oscillator(Waveform::Sine, octave) * self.overtone_gain;
            let env = self.envelope.amplitude(t, duration);
            output.push((filter.process(raw) * env) as f32);

            fundamental = advance(fundamental, freq, sample_rate);
            octave = advance(octave, freq * 2.0, sample_rate);
        }

        output
    }
}

impl Default for PianoSynth {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::voice::oscillator::midi_to_freq;

    fn rms(buf: &[f32]) -> f32 {
        (buf.iter().map(|s| s * s).sum::<f32>() / buf.len() as f32).sqrt()
    }

    #[test]
    fn length_matches_duration() {
        let out = PianoSynth::new().render(440.0, 0.5, 44100);
        assert_eq!(out.len(), 22050);
    }

    #[test]
    fn audible_and_bounded() {
        let out = PianoSynth::new().render(midi_to_freq(60), 1.0, 44100);
        assert!(out.iter().any(|s| s.abs() > 0.1));
        assert!(out.iter().all(|s| s.abs() <= 1.0));
    }

    #[test]
    fn fades_out_at_end() {
        let out = PianoSynth::new().render(midi_to_freq(69), 1.0, 44100);
        let middle = rms(&out[20_000..22_000]);
        let tail = rms(&out[out.len() - 200..]);
        assert!(tail < middle * 0.1, "middle={middle} tail={tail}");
    }

    #[test]
    fn cutoff_capped() {
        let synth = PianoSynth::new();
        assert_eq!(synth.cutoff(440.0), 2640.0);
        assert_eq!(synth.cutoff(2000.0), 8000.0);
    }

    #[test]
    fn degenerate_input_is_silent() {
        let synth = PianoSynth::new();
        assert!(synth.render(440.0, 0.0, 44100).is_empty());
        assert!(synth.render(0.0, 1.0, 44100).is_empty());
    }
}
