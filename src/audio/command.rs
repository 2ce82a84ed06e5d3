//! Commands sent from the engine to the audio thread via ring buffer.

/// A mono voice to start after `delay_frames` output frames.
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduledVoice {
    pub samples: Vec<f32>,
    pub delay_frames: usize,
}

impl ScheduledVoice {
    pub fn now(samples: Vec<f32>) -> Self {
        Self {
            samples,
            delay_frames: 0,
        }
    }

    /// Frames from submission until the voice has finished.
    pub fn end_frame(&self) -> usize {
        self.delay_frames + self.samples.len()
    }
}

#[derive(Debug)]
pub enum AudioCommand {
    /// Mix a new voice in alongside the ones already sounding.
    Play(ScheduledVoice),
    /// Master volume, clamped to 0.0..=1.0 on the audio thread.
    SetVolume(f32),
    /// Silence and drop every voice.
    Stop,
}
