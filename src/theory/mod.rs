//! Theory engine — pitch spelling, intervals, chords, rhythms, and answer generation.
//!
//! Everything here is a pure function over small `Copy` values. Randomized
//! helpers take the RNG as a parameter.

pub mod chord;
pub mod distractor;
pub mod interval;
pub mod pitch;
pub mod question;
pub mod random;
pub mod rhythm;

pub use chord::{build_chord, is_chord_correct, Chord, ChordQuality};
pub use distractor::{chord_distractors, interval_distractors};
pub use interval::{
    apply_interval, get_interval, interval_by_semitones, Direction, Interval, IntervalQuality,
    Language, ALL_INTERVALS,
};
pub use pitch::{
    are_enharmonic, note_to_semitones, semitones_to_note, sharp_to_flat, Accidental, NoteName,
    NoteRange, Pitch, MIDI_OFFSET,
};
pub use question::{ChordQuestion, ChordQuestionSettings, DirectionChoice, IntervalQuestion, IntervalQuestionSettings};
pub use random::{random_note_in_range, shuffle};
pub use rhythm::{
    events_to_string, generate_rhythm_pattern, rhythms_match, total_beats, RhythmEvent,
    RhythmValue, TimeSignature,
};

/// Theory errors. Only text parsing can fail.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TheoryError {
    #[error("invalid pitch '{0}' (expected e.g. C4, F#3, Eb2)")]
    InvalidPitch(String),
    #[error("unknown chord quality '{0}'")]
    UnknownChordQuality(String),
}
