//! Offline backend — renders the engine's output into memory instead of a device.
//!
//! Every command is placed on a tape at the engine clock's current time, so
//! with a [`ManualClock`](super::clock::ManualClock) the whole engine runs
//! without hardware and without waiting. Used by the integration tests and by
//! the CLI's WAV export.

use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use crate::config::AudioConfig;

use super::backend::{AudioBackend, AudioOutput};
use super::clock::Clock;
use super::command::AudioCommand;
use super::mixer::Mixer;
use super::AudioError;

/// One voice as it landed on the tape.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VoiceOnset {
    /// When the voice starts sounding, relative to the backend's creation.
    pub at: Duration,
    /// Voice length in frames.
    pub frames: usize,
    /// Largest absolute sample value before volume.
    pub peak: f32,
}

impl VoiceOnset {
    pub fn length(&self, sample_rate: u32) -> Duration {
        Duration::from_secs_f64(self.frames as f64 / sample_rate as f64)
    }
}

#[derive(Debug)]
struct Tape {
    mixer: Mixer,
    rendered: Vec<f32>,
    cursor: usize,
    onsets: Vec<VoiceOnset>,
    opened: usize,
    suspended: bool,
}

impl Tape {
    /// Render the mixer forward to `frame`.
    fn advance_to(&mut self, frame: usize) {
        if frame <= self.cursor {
            return;
        }
        let channels = self.mixer.channels() as usize;
        let start = self.rendered.len();
        self.rendered.resize(start + (frame - self.cursor) * channels, 0.0);
        self.mixer.render(&mut self.rendered[start..]);
        self.cursor = frame;
    }
}

fn lock(tape: &Mutex<Tape>) -> MutexGuard<'_, Tape> {
    tape.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// In-memory backend driven by a [`Clock`].
pub struct OfflineBackend {
    clock: Arc<dyn Clock>,
    origin: Duration,
    sample_rate: u32,
    channels: u16,
    available: bool,
    tape: Arc<Mutex<Tape>>,
}

impl OfflineBackend {
    pub fn new(clock: Arc<dyn Clock>, sample_rate: u32, channels: u16) -> Self {
        let origin = clock.now();
        Self {
            clock,
            origin,
            sample_rate,
            channels,
            available: true,
            tape: Arc::new(Mutex::new(Tape {
                mixer: Mixer::new(channels, 1.0),
                rendered: Vec::new(),
                cursor: 0,
                onsets: Vec::new(),
                opened: 0,
                suspended: false,
            })),
        }
    }

    /// A backend whose `open` always fails, for exercising init errors.
    pub fn unavailable(clock: Arc<dyn Clock>) -> Self {
        Self {
            available: false,
            ..Self::new(clock, 44100, 1)
        }
    }

    /// Handle for inspecting what the engine played.
    pub fn recording(&self) -> OfflineRecording {
        OfflineRecording {
            tape: Arc::clone(&self.tape),
            sample_rate: self.sample_rate,
            channels: self.channels,
        }
    }
}

impl AudioBackend for OfflineBackend {
    fn open(&mut self, config: &AudioConfig) -> Result<Box<dyn AudioOutput>, AudioError> {
        if !self.available {
            return Err(AudioError::NoOutputDevice);
        }
        {
            let mut tape = lock(&self.tape);
            tape.opened += 1;
            tape.suspended = false;
            tape.mixer.apply(AudioCommand::SetVolume(config.volume));
        }
        Ok(Box::new(OfflineOutput {
            clock: Arc::clone(&self.clock),
            origin: self.origin,
            sample_rate: self.sample_rate,
            channels: self.channels,
            tape: Arc::clone(&self.tape),
        }))
    }

    fn is_available(&self) -> bool {
        self.available
    }
}

struct OfflineOutput {
    clock: Arc<dyn Clock>,
    origin: Duration,
    sample_rate: u32,
    channels: u16,
    tape: Arc<Mutex<Tape>>,
}

impl OfflineOutput {
    fn frame_of(&self, t: Duration) -> usize {
        (t.saturating_sub(self.origin).as_secs_f64() * self.sample_rate as f64).round() as usize
    }
}

impl AudioOutput for OfflineOutput {
    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn channels(&self) -> u16 {
        self.channels
    }

    fn submit(&mut self, command: AudioCommand) -> Result<(), AudioError> {
        let now = self.clock.now();
        let frame = self.frame_of(now);
        let mut tape = lock(&self.tape);
        tape.advance_to(frame);
        if let AudioCommand::Play(voice) = &command {
            let delay = Duration::from_secs_f64(voice.delay_frames as f64 / self.sample_rate as f64);
            tape.onsets.push(VoiceOnset {
                at: now.saturating_sub(self.origin) + delay,
                frames: voice.samples.len(),
                peak: voice.samples.iter().fold(0.0f32, |m, s| m.max(s.abs())),
            });
        }
        tape.mixer.apply(command);
        Ok(())
    }

    fn is_suspended(&self) -> bool {
        lock(&self.tape).suspended
    }

    fn suspend(&mut self) -> Result<(), AudioError> {
        lock(&self.tape).suspended = true;
        Ok(())
    }

    fn resume(&mut self) -> Result<(), AudioError> {
        lock(&self.tape).suspended = false;
        Ok(())
    }
}

/// Read side of an [`OfflineBackend`].
#[derive(Clone)]
pub struct OfflineRecording {
    tape: Arc<Mutex<Tape>>,
    sample_rate: u32,
    channels: u16,
}

impl OfflineRecording {
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn channels(&self) -> u16 {
        self.channels
    }

    /// Every voice submitted so far, in submission order.
    pub fn onsets(&self) -> Vec<VoiceOnset> {
        lock(&self.tape).onsets.clone()
    }

    /// How many times the backend has been opened.
    pub fn times_opened(&self) -> usize {
        lock(&self.tape).opened
    }

    /// Mark the output suspended, as a host might after focus loss.
    pub fn suspend(&self) {
        lock(&self.tape).suspended = true;
    }

    /// Render until every voice has finished and return the interleaved tape.
    pub fn finish(&self) -> Vec<f32> {
        let mut tape = lock(&self.tape);
        let end = tape.cursor + tape.mixer.remaining_frames();
        tape.advance_to(end);
        tape.rendered.clone()
    }

    /// Render to completion and write a 32-bit float WAV.
    pub fn write_wav(&self, path: &Path) -> Result<(), hound::Error> {
        let spec = hound::WavSpec {
            channels: self.channels,
            sample_rate: self.sample_rate,
            bits_per_sample: 32,
            sample_format: hound::SampleFormat::Float,
        };
        let mut writer = hound::WavWriter::create(path, spec)?;
        for s in self.finish() {
            writer.write_sample(s)?;
        }
        writer.finalize()
    }
}
