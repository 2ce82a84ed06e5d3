//! Audio engine — lazily opened output, background sample loading, and timed playback.
//!
//! The engine renders every note to a mono buffer on the caller's thread and
//! hands it to an [`AudioOutput`]. For the cpal backend that means a lock-free
//! ring buffer into the audio callback, where overlapping voices are mixed.
//! Notes are rendered from the nearest cached piano sample when the sample
//! set has loaded, and by the synthesized piano otherwise.

pub mod backend;
pub mod callback;
pub mod clock;
pub mod command;
pub mod device;
pub mod mixer;
pub mod offline;

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, RwLock};
use std::thread::JoinHandle;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::config::AudioConfig;
use crate::playback::{
    arpeggio_onsets, CancellationToken, IntervalMode, PlaybackOutcome, ReferencePitch,
    Subdivision, Voicing, CHORD_ARPEGGIO_GAP_SECS, CHORD_ARPEGGIO_NOTE_SECS, MELODIC_PAUSE,
    NOTE_FILL, REFERENCE_SECS,
};
use crate::samples::{load_samples, SampleCache, SampleSource, SAMPLE_NOTES};
use crate::theory::{Chord, NoteName, Pitch};
use crate::voice::{render_click, render_note, select_render_path};

pub use backend::{AudioBackend, AudioOutput};
pub use clock::{Clock, ManualClock, SystemClock};
pub use command::{AudioCommand, ScheduledVoice};
pub use device::CpalBackend;
pub use mixer::Mixer;
pub use offline::{OfflineBackend, OfflineRecording, VoiceOnset};

#[derive(Debug, thiserror::Error)]
pub enum AudioError {
    #[error("no audio output device found")]
    NoOutputDevice,
    #[error("device config error: {0}")]
    DeviceConfig(String),
    #[error("stream build error: {0}")]
    StreamBuild(String),
    #[error("stream play error: {0}")]
    StreamPlay(String),
    #[error("audio command ring buffer is full")]
    BufferFull,
    #[error("audio output is not initialized")]
    NotInitialized,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    Uninitialized,
    Ready,
}

/// Progress of the background sample load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleState {
    Idle,
    Loading,
    Loaded(usize),
    /// Loading finished with no usable sample.
    Unavailable,
}

/// State shared with the loader thread.
#[derive(Debug)]
struct SharedSamples {
    cache: RwLock<SampleCache>,
    state: Mutex<SampleState>,
    /// Bumped on dispose so a stale loader cannot publish.
    generation: AtomicU64,
}

impl SharedSamples {
    fn new() -> Self {
        Self {
            cache: RwLock::new(SampleCache::new()),
            state: Mutex::new(SampleState::Idle),
            generation: AtomicU64::new(0),
        }
    }

    fn state(&self) -> MutexGuard<'_, SampleState> {
        self.state.lock().unwrap_or_else(|p| p.into_inner())
    }

    fn publish(&self, generation: u64, cache: SampleCache) {
        let mut state = self.state();
        if self.generation.load(Ordering::SeqCst) != generation {
            debug!("discarding samples from a disposed engine");
            return;
        }
        let count = cache.len();
        *self.cache.write().unwrap_or_else(|p| p.into_inner()) = cache;
        *state = if count > 0 {
            SampleState::Loaded(count)
        } else {
            warn!("no piano samples could be loaded, using synthesized piano");
            SampleState::Unavailable
        };
    }

    fn reset(&self) {
        let mut state = self.state();
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.cache.write().unwrap_or_else(|p| p.into_inner()).clear();
        *state = SampleState::Idle;
    }
}

/// The playback context handed to exercises.
///
/// Created uninitialized; the first playback call (or an explicit
/// [`initialize`](AudioEngine::initialize)) opens the output and starts
/// loading samples in the background.
pub struct AudioEngine {
    backend: Box<dyn AudioBackend>,
    clock: Arc<dyn Clock>,
    config: AudioConfig,
    source: Option<Arc<dyn SampleSource>>,
    output: Option<Box<dyn AudioOutput>>,
    samples: Arc<SharedSamples>,
    loader: Option<JoinHandle<()>>,
    volume: f32,
    enabled: bool,
}

impl AudioEngine {
    pub fn new(backend: impl AudioBackend + 'static, config: AudioConfig) -> Self {
        let source = config.sample_source();
        Self {
            backend: Box::new(backend),
            clock: Arc::new(SystemClock::new()),
            volume: config.volume.clamp(0.0, 1.0),
            enabled: config.enabled,
            config,
            source,
            output: None,
            samples: Arc::new(SharedSamples::new()),
            loader: None,
        }
    }

    /// Replace the time source used for sequencing waits.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Replace the sample source derived from the config. `None` disables samples.
    pub fn with_sample_source(mut self, source: Option<Arc<dyn SampleSource>>) -> Self {
        self.source = source;
        self
    }

    /// Open the output and start the background sample load.
    ///
    /// Calling it on a ready engine does nothing.
    pub fn initialize(&mut self) -> Result<(), AudioError> {
        if self.output.is_some() {
            return Ok(());
        }
        let mut output = self.backend.open(&self.config)?;
        output.submit(AudioCommand::SetVolume(self.volume))?;
        info!(
            sample_rate = output.sample_rate(),
            channels = output.channels(),
            "audio engine ready"
        );
        let sample_rate = output.sample_rate();
        self.output = Some(output);
        self.start_sample_load(sample_rate);
        Ok(())
    }

    fn start_sample_load(&mut self, sample_rate: u32) {
        let Some(source) = self.source.clone() else {
            return;
        };
        let generation = {
            let mut state = self.samples.state();
            if matches!(*state, SampleState::Loading | SampleState::Loaded(_)) {
                return;
            }
            *state = SampleState::Loading;
            self.samples.generation.load(Ordering::SeqCst)
        };

        let shared = Arc::clone(&self.samples);
        let spawned = std::thread::Builder::new()
            .name("sample-loader".to_string())
            .spawn(move || {
                let cache = load_samples(source.as_ref(), &SAMPLE_NOTES, sample_rate);
                shared.publish(generation, cache);
            });
        match spawned {
            Ok(handle) => self.loader = Some(handle),
            Err(e) => {
                warn!(error = %e, "could not start sample loader");
                *self.samples.state() = SampleState::Unavailable;
            }
        }
    }

    /// Block until the current sample load (if any) has finished.
    pub fn wait_for_samples(&mut self) -> SampleState {
        if let Some(handle) = self.loader.take() {
            if handle.join().is_err() {
                warn!("sample loader panicked");
            }
        }
        self.sample_state()
    }

    /// Close the output and drop every cached sample. The engine can be
    /// initialized again afterwards.
    pub fn dispose(&mut self) {
        if let Some(mut output) = self.output.take() {
            if let Err(e) = output.submit(AudioCommand::Stop) {
                debug!(error = %e, "stop on dispose");
            }
            info!("audio engine disposed");
        }
        // A running loader finishes on its own and is discarded by generation.
        self.loader = None;
        self.samples.reset();
    }

    /// Resume a suspended output. A running output is left alone.
    pub fn ensure_resumed(&mut self) -> Result<(), AudioError> {
        match self.output.as_mut() {
            Some(output) if output.is_suspended() => output.resume(),
            Some(_) => Ok(()),
            None => Err(AudioError::NotInitialized),
        }
    }

    /// Pause the output without closing it. The next playback call resumes it.
    pub fn suspend(&mut self) -> Result<(), AudioError> {
        self.output()?.suspend()
    }

    /// Common preamble of every playback call: initialize lazily and resume.
    /// `false` means playback is disabled and the call should do nothing.
    fn prepare(&mut self) -> Result<bool, AudioError> {
        if !self.enabled {
            return Ok(false);
        }
        self.initialize()?;
        self.ensure_resumed()?;
        Ok(true)
    }

    fn output(&mut self) -> Result<&mut Box<dyn AudioOutput>, AudioError> {
        self.output.as_mut().ok_or(AudioError::NotInitialized)
    }

    fn sample_rate_or_default(&self) -> u32 {
        self.output.as_ref().map_or(44100, |o| o.sample_rate())
    }

    fn render(&self, pitch: Pitch, duration: f64) -> Vec<f32> {
        let midi = pitch.midi();
        let sample_rate = self.sample_rate_or_default();
        let loaded = self.are_samples_loaded();
        let cache = self.samples.cache.read().unwrap_or_else(|p| p.into_inner());
        let path = select_render_path(loaded, &cache, midi);
        debug!(%pitch, midi, sampled = path.is_sampled(), "render note");
        render_note(&path, midi, duration, sample_rate)
    }

    fn schedule(&mut self, samples: Vec<f32>, delay: Duration) -> Result<(), AudioError> {
        let output = self.output()?;
        let delay_frames = (delay.as_secs_f64() * output.sample_rate() as f64).round() as usize;
        output.submit(AudioCommand::Play(ScheduledVoice {
            samples,
            delay_frames,
        }))
    }

    pub fn play_note(&mut self, pitch: Pitch, duration: f64) -> Result<(), AudioError> {
        if !self.prepare()? {
            return Ok(());
        }
        let voice = self.render(pitch, duration);
        self.schedule(voice, Duration::ZERO)
    }

    /// All notes start together.
    pub fn play_chord_block(&mut self, notes: &[Pitch], duration: f64) -> Result<(), AudioError> {
        if !self.prepare()? {
            return Ok(());
        }
        let voices: Vec<Vec<f32>> = notes.iter().map(|&p| self.render(p, duration)).collect();
        for voice in voices {
            self.schedule(voice, Duration::ZERO)?;
        }
        Ok(())
    }

    /// Schedule the notes one after another and return their onset offsets
    /// without waiting for them to sound. Disabled engines return no onsets.
    pub fn play_chord_arpeggiated(
        &mut self,
        notes: &[Pitch],
        note_duration: f64,
        gap: f64,
    ) -> Result<Vec<Duration>, AudioError> {
        if !self.prepare()? {
            return Ok(Vec::new());
        }
        let onsets = arpeggio_onsets(notes.len(), note_duration, gap);
        for (&pitch, &onset) in notes.iter().zip(&onsets) {
            let voice = self.render(pitch, note_duration);
            self.schedule(voice, onset)?;
        }
        Ok(onsets)
    }

    pub fn play_chord(&mut self, chord: &Chord, voicing: Voicing, duration: f64) -> Result<(), AudioError> {
        let notes = chord.notes();
        match voicing {
            Voicing::Block => self.play_chord_block(&notes, duration),
            Voicing::Arpeggiated => self
                .play_chord_arpeggiated(&notes, CHORD_ARPEGGIO_NOTE_SECS, CHORD_ARPEGGIO_GAP_SECS)
                .map(|_| ()),
        }
    }

    /// Harmonic intervals sound together. Melodic ones play `first`, wait
    /// `duration` plus a short pause, then play `second`.
    pub fn play_interval(
        &mut self,
        first: Pitch,
        second: Pitch,
        mode: IntervalMode,
        duration: f64,
    ) -> Result<(), AudioError> {
        match mode {
            IntervalMode::Harmonic => self.play_chord_block(&[first, second], duration),
            IntervalMode::Melodic => {
                self.play_note(first, duration)?;
                if self.enabled {
                    self.clock
                        .sleep(Duration::from_secs_f64(duration.max(0.0)) + MELODIC_PAUSE);
                }
                self.play_note(second, duration)
            }
        }
    }

    pub fn play_reference_pitch(&mut self, reference: ReferencePitch) -> Result<(), AudioError> {
        self.play_note(reference.pitch(), REFERENCE_SECS)
    }

    /// Step through an on/off grid at `tempo`, playing C4 on every on-step.
    ///
    /// Blocks for the length of the pattern. The token is checked before each
    /// step. A tempo with no representable step (zero, negative, NaN) plays
    /// nothing.
    pub fn play_rhythm(
        &mut self,
        pattern: &[bool],
        tempo: f64,
        subdivision: Subdivision,
        token: &CancellationToken,
    ) -> Result<PlaybackOutcome, AudioError> {
        let step = subdivision.step_secs(tempo);
        let Ok(step_len) = Duration::try_from_secs_f64(step) else {
            return Ok(PlaybackOutcome::Completed);
        };
        if !self.prepare()? {
            return Ok(PlaybackOutcome::Completed);
        }
        let note = Pitch::natural(NoteName::C, 4);

        for &on in pattern {
            if token.is_cancelled() {
                debug!("rhythm playback cancelled");
                return Ok(PlaybackOutcome::Cancelled);
            }
            if on {
                self.play_note(note, step * NOTE_FILL)?;
            }
            self.clock.sleep(step_len);
        }
        Ok(PlaybackOutcome::Completed)
    }

    pub fn play_metronome_click(&mut self, is_downbeat: bool) -> Result<(), AudioError> {
        if !self.prepare()? {
            return Ok(());
        }
        let click = render_click(is_downbeat, self.sample_rate_or_default());
        self.schedule(click, Duration::ZERO)
    }

    /// Clamped to 0.0..=1.0. Takes effect immediately on a ready engine.
    pub fn set_volume(&mut self, volume: f32) {
        self.volume = volume.clamp(0.0, 1.0);
        if let Some(output) = self.output.as_mut() {
            if let Err(e) = output.submit(AudioCommand::SetVolume(self.volume)) {
                warn!(error = %e, "volume change dropped");
            }
        }
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    /// While disabled, playback calls return immediately without sound.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn sample_state(&self) -> SampleState {
        *self.samples.state()
    }

    pub fn are_samples_loaded(&self) -> bool {
        matches!(self.sample_state(), SampleState::Loaded(n) if n > 0)
    }

    /// Whether the backend can produce sound on this machine.
    pub fn is_available(&self) -> bool {
        self.backend.is_available()
    }

    pub fn state(&self) -> EngineState {
        if self.output.is_some() {
            EngineState::Ready
        } else {
            EngineState::Uninitialized
        }
    }

    pub fn clock(&self) -> Arc<dyn Clock> {
        Arc::clone(&self.clock)
    }

    /// Output sample rate, once initialized.
    pub fn sample_rate(&self) -> Option<u32> {
        self.output.as_ref().map(|o| o.sample_rate())
    }
}
