//! Voices — everything that turns one note into a mono buffer.
//!
//! A note is rendered either from the nearest cached piano sample, shifted to
//! pitch, or by the [`PianoSynth`] fallback. The choice is made once per note
//! by [`select_render_path`].

pub mod click;
pub mod envelope;
pub mod filter;
pub mod oscillator;
pub mod piano;
pub mod sampled;

pub use click::render_click;
pub use envelope::{AdsrEnvelope, DecayEnvelope, SampleEnvelope};
pub use oscillator::midi_to_freq;
pub use piano::PianoSynth;

use crate::samples::{SampleCache, SampleData};

/// Nearest cached sample for a target note.
#[derive(Debug, Clone, Copy)]
pub struct SampleMatch<'a> {
    /// MIDI note the sample was recorded at.
    pub midi: i32,
    pub sample: &'a SampleData,
    /// `2^((target - midi) / 12)`
    pub playback_rate: f64,
}

#[derive(Debug, Clone, Copy)]
pub enum RenderPath<'a> {
    Sampled(SampleMatch<'a>),
    Synthesized,
}

impl RenderPath<'_> {
    pub fn is_sampled(&self) -> bool {
        matches!(self, RenderPath::Sampled(_))
    }
}

/// Sampled when samples are loaded and the cache has an entry, else synthesized.
pub fn select_render_path(samples_loaded: bool, cache: &SampleCache, target_midi: i32) -> RenderPath<'_> {
    if !samples_loaded {
        return RenderPath::Synthesized;
    }
    match cache.nearest(target_midi) {
        Some((midi, sample)) => RenderPath::Sampled(SampleMatch {
            midi,
            sample,
            playback_rate: 2.0f64.powf((target_midi - midi) as f64 / 12.0),
        }),
        None => RenderPath::Synthesized,
    }
}

/// Render one note along `path`.
pub fn render_note(path: &RenderPath<'_>, target_midi: i32, duration: f64, sample_rate: u32) -> Vec<f32> {
    match path {
        RenderPath::Sampled(m) => {
            sampled::render_sampled(m.sample, m.playback_rate, duration, &SampleEnvelope::default())
        }
        RenderPath::Synthesized => PianoSynth::new().render(midi_to_freq(target_midi), duration, sample_rate),
    }
}
