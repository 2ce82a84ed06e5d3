//! Playback vocabulary shared by the engine's sequencing operations.

pub mod transcription;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::theory::{NoteName, Pitch};

pub use transcription::{play_with_metronome, TranscriptionOptions};

pub const DEFAULT_BLOCK_SECS: f64 = 1.5;
pub const DEFAULT_ARPEGGIO_NOTE_SECS: f64 = 0.3;
pub const DEFAULT_ARPEGGIO_GAP_SECS: f64 = 0.15;
/// Note length and gap used by [`Voicing::Arpeggiated`] chords.
pub const CHORD_ARPEGGIO_NOTE_SECS: f64 = 0.4;
pub const CHORD_ARPEGGIO_GAP_SECS: f64 = 0.1;
pub const DEFAULT_INTERVAL_SECS: f64 = 0.8;
/// Extra silence between the two notes of a melodic interval.
pub const MELODIC_PAUSE: Duration = Duration::from_millis(200);
pub const REFERENCE_SECS: f64 = 1.5;
/// Fraction of a rhythm step or event that the note sounds.
pub const NOTE_FILL: f64 = 0.8;

/// Shared stop flag for long-running playback.
///
/// Checked between steps only; a wait already in progress always finishes.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackOutcome {
    Completed,
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Subdivision {
    #[default]
    Eighth,
    Sixteenth,
}

impl Subdivision {
    pub fn steps_per_beat(self) -> u32 {
        match self {
            Subdivision::Eighth => 2,
            Subdivision::Sixteenth => 4,
        }
    }

    /// Seconds per step at `tempo` quarter notes per minute.
    pub fn step_secs(self, tempo: f64) -> f64 {
        60.0 / tempo / self.steps_per_beat() as f64
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Voicing {
    #[default]
    Block,
    Arpeggiated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IntervalMode {
    #[default]
    Melodic,
    Harmonic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ReferencePitch {
    #[default]
    A4,
    C4,
}

impl ReferencePitch {
    pub fn pitch(self) -> Pitch {
        match self {
            ReferencePitch::A4 => Pitch::natural(NoteName::A, 4),
            ReferencePitch::C4 => Pitch::natural(NoteName::C, 4),
        }
    }
}

/// Onset offsets for an arpeggio: `i * (note_secs * 0.5 + gap_secs)`.
pub fn arpeggio_onsets(count: usize, note_secs: f64, gap_secs: f64) -> Vec<Duration> {
    let spacing = (note_secs * 0.5 + gap_secs).max(0.0);
    (0..count)
        .map(|i| Duration::from_secs_f64(i as f64 * spacing))
        .collect()
}
