//! Oscillator primitives used by the piano synth and the metronome click.

use std::f64::consts::PI;

/// Waveform shapes the voices need.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Waveform {
    Sine,
    Triangle,
}

/// One sample of `waveform` at `phase` in [0.0, 1.0). Output is in [-1.0, 1.0].
pub fn oscillator(waveform: Waveform, phase: f64) -> f64 {
    match waveform {
        Waveform::Sine => (phase * 2.0 * PI).sin(),
        Waveform::Triangle => {
            if phase < 0.25 {
                4.0 * phase
            } else if phase < 0.75 {
                2.0 - 4.0 * phase
            } else {
                4.0 * phase - 4.0
            }
        }
    }
}

/// Equal-tempered frequency of a MIDI note, A4 (69) = 440 Hz.
///
/// Takes `i32` because pitches below C-1 are representable in the theory engine.
pub fn midi_to_freq(midi: i32) -> f64 {
    440.0 * 2.0f64.powf((midi as f64 - 69.0) / 12.0)
}

/// Advance a phase accumulator by one sample.
#[inline]
pub fn advance(phase: f64, freq: f64, sample_rate: u32) -> f64 {
    (phase + freq / sample_rate as f64).fract()
}
