//! Metronome click: a short decaying sine, higher on the downbeat.

use super::envelope::DecayEnvelope;
use super::oscillator::{advance, oscillator, Waveform};

pub const DOWNBEAT_FREQ: f64 = 1000.0;
pub const BEAT_FREQ: f64 = 800.0;
pub const CLICK_SECS: f64 = 0.05;

const CLICK_ENVELOPE: DecayEnvelope = DecayEnvelope {
    start: 0.3,
    end: 0.01,
    length: CLICK_SECS,
};

pub fn render_click(is_downbeat: bool, sample_rate: u32) -> Vec<f32> {
    let freq = if is_downbeat { DOWNBEAT_FREQ } else { BEAT_FREQ };
    let num_samples = (CLICK_SECS * sample_rate as f64) as usize;

    let mut phase = 0.0;
    (0..num_samples)
        .map(|i| {
            let t = i as f64 / sample_rate as f64;
            let s = oscillator(Waveform::Sine, phase) * CLICK_ENVELOPE.gain(t);
            phase = advance(phase, freq, sample_rate);
            s as f32
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn zero_crossings(buf: &[f32]) -> usize {
        buf.windows(2).filter(|w| w[0] <= 0.0 && w[1] > 0.0).count()
    }

    #[test]
    fn lasts_fifty_ms() {
        assert_eq!(render_click(true, 48000).len(), 2400);
    }

    #[test]
    fn downbeat_is_higher() {
        let down = zero_crossings(&render_click(true, 48000));
        let up = zero_crossings(&render_click(false, 48000));
        // 50 and 40 cycles in 50 ms
        assert!((49..=50).contains(&down), "down={down}");
        assert!((39..=40).contains(&up), "up={up}");
    }

    #[test]
    fn decays() {
        let click = render_click(false, 48000);
        let peak = |s: &[f32]| s.iter().fold(0.0f32, |m, x| m.max(x.abs()));
        assert!(peak(&click[..240]) > 0.25);
        assert!(peak(&click[2160..]) < 0.02);
    }
}
