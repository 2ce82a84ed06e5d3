//! Voice mixer — sums overlapping voices, applies master volume and the limiter.
//!
//! Lives on whichever thread produces output: the cpal callback or the offline
//! renderer. Voices are mono; every output channel gets the same signal.

use super::command::{AudioCommand, ScheduledVoice};

/// Hard limiter ceiling applied after volume.
pub const LIMITER_CEILING: f32 = 0.95;

#[derive(Debug)]
struct ActiveVoice {
    samples: Vec<f32>,
    delay: usize,
    pos: usize,
}

impl ActiveVoice {
    fn finished(&self) -> bool {
        self.delay == 0 && self.pos >= self.samples.len()
    }

    fn remaining(&self) -> usize {
        self.delay + self.samples.len().saturating_sub(self.pos)
    }

    fn next(&mut self) -> f32 {
        if self.delay > 0 {
            self.delay -= 1;
            return 0.0;
        }
        match self.samples.get(self.pos) {
            Some(&s) => {
                self.pos += 1;
                s
            }
            None => 0.0,
        }
    }
}

impl From<ScheduledVoice> for ActiveVoice {
    fn from(v: ScheduledVoice) -> Self {
        Self {
            samples: v.samples,
            delay: v.delay_frames,
            pos: 0,
        }
    }
}

#[derive(Debug)]
pub struct Mixer {
    voices: Vec<ActiveVoice>,
    volume: f32,
    channels: u16,
}

impl Mixer {
    pub fn new(channels: u16, volume: f32) -> Self {
        Self {
            voices: Vec::new(),
            volume: volume.clamp(0.0, 1.0),
            channels: channels.max(1),
        }
    }

    pub fn apply(&mut self, command: AudioCommand) {
        match command {
            AudioCommand::Play(voice) => self.voices.push(voice.into()),
            AudioCommand::SetVolume(v) => self.volume = v.clamp(0.0, 1.0),
            AudioCommand::Stop => self.voices.clear(),
        }
    }

    /// Fill interleaved `output`, advancing every voice.
    pub fn render(&mut self, output: &mut [f32]) {
        let channels = self.channels as usize;
        for frame in output.chunks_mut(channels) {
            let sum: f32 = self.voices.iter_mut().map(ActiveVoice::next).sum();
            let value = (sum * self.volume).clamp(-LIMITER_CEILING, LIMITER_CEILING);
            frame.fill(value);
        }
        self.voices.retain(|v| !v.finished());
    }

    pub fn is_idle(&self) -> bool {
        self.voices.is_empty()
    }

    /// Frames until the last active voice ends.
    pub fn remaining_frames(&self) -> usize {
        self.voices.iter().map(ActiveVoice::remaining).max().unwrap_or(0)
    }

    pub fn active_voices(&self) -> usize {
        self.voices.len()
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    pub fn channels(&self) -> u16 {
        self.channels
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn play(m: &mut Mixer, samples: Vec<f32>, delay: usize) {
        m.apply(AudioCommand::Play(ScheduledVoice {
            samples,
            delay_frames: delay,
        }));
    }

    #[test]
    fn silence_when_idle() {
        let mut m = Mixer::new(2, 1.0);
        let mut out = vec![9.0; 8];
        m.render(&mut out);
        assert!(out.iter().all(|&s| s == 0.0));
    }

    #[test]
    fn mono_voice_duplicated_across_channels() {
        let mut m = Mixer::new(2, 1.0);
        play(&mut m, vec![0.1, 0.2], 0);
        let mut out = vec![0.0; 4];
        m.render(&mut out);
        assert_eq!(out, vec![0.1, 0.1, 0.2, 0.2]);
        assert!(m.is_idle());
    }

    #[test]
    fn overlapping_voices_sum() {
        let mut m = Mixer::new(1, 1.0);
        play(&mut m, vec![0.1, 0.1, 0.1], 0);
        play(&mut m, vec![0.2, 0.2], 1);
        let mut out = vec![0.0; 4];
        m.render(&mut out);
        let expected = [0.1, 0.3, 0.3, 0.0];
        for (o, e) in out.iter().zip(expected) {
            assert!((o - e).abs() < 1e-6, "{out:?}");
        }
    }

    #[test]
    fn delay_spans_render_calls() {
        let mut m = Mixer::new(1, 1.0);
        play(&mut m, vec![0.5], 3);
        let mut out = vec![0.0; 2];
        m.render(&mut out);
        assert_eq!(out, vec![0.0, 0.0]);
        assert_eq!(m.active_voices(), 1);
        assert_eq!(m.remaining_frames(), 2);
        m.render(&mut out);
        assert_eq!(out, vec![0.0, 0.5]);
        assert!(m.is_idle());
    }

    #[test]
    fn volume_then_limiter() {
        let mut m = Mixer::new(1, 0.5);
        play(&mut m, vec![0.4, 4.0, -4.0], 0);
        let mut out = vec![0.0; 3];
        m.render(&mut out);
        assert!((out[0] - 0.2).abs() < 1e-6);
        assert_eq!(out[1], LIMITER_CEILING);
        assert_eq!(out[2], -LIMITER_CEILING);
    }

    #[test]
    fn volume_clamped_and_stop_clears() {
        let mut m = Mixer::new(1, 1.0);
        m.apply(AudioCommand::SetVolume(3.0));
        assert_eq!(m.volume(), 1.0);
        play(&mut m, vec![0.5; 10], 0);
        m.apply(AudioCommand::Stop);
        assert!(m.is_idle());
    }
}
