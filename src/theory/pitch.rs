//! Pitch spelling and the semitones-from-C0 absolute scale.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::TheoryError;

/// Offset between the semitones-from-C0 scale and MIDI note numbers (C0 = MIDI 12).
pub const MIDI_OFFSET: i32 = 12;

/// The seven natural note letters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NoteName {
    C,
    D,
    E,
    F,
    G,
    A,
    B,
}

impl NoteName {
    pub const ALL: [NoteName; 7] = [
        NoteName::C,
        NoteName::D,
        NoteName::E,
        NoteName::F,
        NoteName::G,
        NoteName::A,
        NoteName::B,
    ];

    /// Semitones above C within the same octave.
    pub fn semitone_offset(self) -> i32 {
        match self {
            NoteName::C => 0,
            NoteName::D => 2,
            NoteName::E => 4,
            NoteName::F => 5,
            NoteName::G => 7,
            NoteName::A => 9,
            NoteName::B => 11,
        }
    }

    fn from_char(c: char) -> Option<Self> {
        match c {
            'C' => Some(NoteName::C),
            'D' => Some(NoteName::D),
            'E' => Some(NoteName::E),
            'F' => Some(NoteName::F),
            'G' => Some(NoteName::G),
            'A' => Some(NoteName::A),
            'B' => Some(NoteName::B),
            _ => None,
        }
    }
}

impl fmt::Display for NoteName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

/// Accidental applied to a note letter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Accidental {
    #[default]
    Natural,
    Sharp,
    Flat,
}

impl Accidental {
    /// Semitone adjustment: +1 sharp, -1 flat.
    pub fn delta(self) -> i32 {
        match self {
            Accidental::Natural => 0,
            Accidental::Sharp => 1,
            Accidental::Flat => -1,
        }
    }

    fn symbol(self) -> &'static str {
        match self {
            Accidental::Natural => "",
            Accidental::Sharp => "#",
            Accidental::Flat => "b",
        }
    }
}

/// A spelled pitch: letter, octave and accidental.
///
/// Equality is spelling equality (`C#4 != Db4`). Use [`are_enharmonic`] to
/// compare sounding pitch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Pitch {
    pub name: NoteName,
    pub octave: i32,
    pub accidental: Accidental,
}

impl Pitch {
    pub const fn new(name: NoteName, octave: i32, accidental: Accidental) -> Self {
        Self {
            name,
            octave,
            accidental,
        }
    }

    pub const fn natural(name: NoteName, octave: i32) -> Self {
        Self::new(name, octave, Accidental::Natural)
    }

    pub const fn sharp(name: NoteName, octave: i32) -> Self {
        Self::new(name, octave, Accidental::Sharp)
    }

    pub const fn flat(name: NoteName, octave: i32) -> Self {
        Self::new(name, octave, Accidental::Flat)
    }

    /// Absolute semitones from C0.
    pub fn semitones(self) -> i32 {
        note_to_semitones(self)
    }

    /// MIDI note number (C4 = 60, A4 = 69).
    pub fn midi(self) -> i32 {
        self.semitones() + MIDI_OFFSET
    }

    pub fn is_natural(self) -> bool {
        self.accidental == Accidental::Natural
    }
}

impl fmt::Display for Pitch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.name, self.accidental.symbol(), self.octave)
    }
}

impl FromStr for Pitch {
    type Err = TheoryError;

    /// Parse scientific pitch notation: `<letter><# | b>?<octave>`, e.g. `C4`,
    /// `F#3`, `Eb2`, `C-1`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || TheoryError::InvalidPitch(s.to_string());
        let mut chars = s.chars();

        let name = chars
            .next()
            .map(|c| c.to_ascii_uppercase())
            .and_then(NoteName::from_char)
            .ok_or_else(invalid)?;

        let rest = chars.as_str();
        let (accidental, octave_str) = if let Some(r) = rest.strip_prefix('#') {
            (Accidental::Sharp, r)
        } else if let Some(r) = rest.strip_prefix('b') {
            (Accidental::Flat, r)
        } else {
            (Accidental::Natural, rest)
        };

        let octave: i32 = octave_str.parse().map_err(|_| invalid())?;
        Ok(Pitch::new(name, octave, accidental))
    }
}

/// An inclusive pitch range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteRange {
    pub low: Pitch,
    pub high: Pitch,
}

impl NoteRange {
    pub const fn new(low: Pitch, high: Pitch) -> Self {
        Self { low, high }
    }

    /// Whether `pitch` sounds within the range, regardless of spelling.
    pub fn contains(&self, pitch: Pitch) -> bool {
        let s = pitch.semitones();
        s >= self.low.semitones() && s <= self.high.semitones()
    }
}

/// Absolute pitch in semitones from C0. Total over all spellings.
pub fn note_to_semitones(note: Pitch) -> i32 {
    note.octave * 12 + note.name.semitone_offset() + note.accidental.delta()
}

/// Default spelling per pitch class: naturals first, sharps for black keys.
const PITCH_CLASS_SPELLINGS: [(NoteName, Accidental); 12] = [
    (NoteName::C, Accidental::Natural),
    (NoteName::C, Accidental::Sharp),
    (NoteName::D, Accidental::Natural),
    (NoteName::D, Accidental::Sharp),
    (NoteName::E, Accidental::Natural),
    (NoteName::F, Accidental::Natural),
    (NoteName::F, Accidental::Sharp),
    (NoteName::G, Accidental::Natural),
    (NoteName::G, Accidental::Sharp),
    (NoteName::A, Accidental::Natural),
    (NoteName::A, Accidental::Sharp),
    (NoteName::B, Accidental::Natural),
];

/// Spell an absolute semitone value using the naturals-then-sharps table.
pub fn semitones_to_note(semitones: i32) -> Pitch {
    let octave = semitones.div_euclid(12);
    let (name, accidental) = PITCH_CLASS_SPELLINGS[semitones.rem_euclid(12) as usize];
    Pitch::new(name, octave, accidental)
}

/// Respell a sharp as a flat. Non-sharps are returned unchanged.
///
/// E# and B# map to `Fb` and `Cb` (the latter one octave up). These two
/// entries are a display convention and are kept as-is.
pub fn sharp_to_flat(note: Pitch) -> Pitch {
    if note.accidental != Accidental::Sharp {
        return note;
    }

    let (name, octave_adjust) = match note.name {
        NoteName::C => (NoteName::D, 0),
        NoteName::D => (NoteName::E, 0),
        NoteName::F => (NoteName::G, 0),
        NoteName::G => (NoteName::A, 0),
        NoteName::A => (NoteName::B, 0),
        NoteName::E => (NoteName::F, 0),
        NoteName::B => (NoteName::C, 1),
    };

    Pitch::flat(name, note.octave + octave_adjust)
}

/// Same sounding pitch, spelling ignored.
pub fn are_enharmonic(a: Pitch, b: Pitch) -> bool {
    note_to_semitones(a) == note_to_semitones(b)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(s: &str) -> Pitch {
        s.parse().unwrap()
    }

    #[test]
    fn c0_is_zero() {
        assert_eq!(note_to_semitones(Pitch::natural(NoteName::C, 0)), 0);
    }

    #[test]
    fn middle_c_and_a4() {
        assert_eq!(p("C4").semitones(), 48);
        assert_eq!(p("C4").midi(), 60);
        assert_eq!(p("A4").midi(), 69);
    }

    #[test]
    fn accidentals_shift_by_one() {
        assert_eq!(p("C#4").semitones(), p("C4").semitones() + 1);
        assert_eq!(p("Db4").semitones(), p("D4").semitones() - 1);
        assert_eq!(p("Cb4").semitones(), p("B3").semitones());
    }

    #[test]
    fn semitones_prefer_naturals_then_sharps() {
        assert_eq!(semitones_to_note(48), p("C4"));
        assert_eq!(semitones_to_note(49), p("C#4"));
        assert_eq!(semitones_to_note(58), p("A#4"));
        assert_eq!(semitones_to_note(59), p("B4"));
    }

    #[test]
    fn negative_semitones_floor_octave() {
        assert_eq!(semitones_to_note(-1), p("B-1"));
        assert_eq!(semitones_to_note(-12), p("C-1"));
    }

    #[test]
    fn round_trip_is_enharmonic() {
        for octave in -1..9 {
            for name in NoteName::ALL {
                for acc in [Accidental::Natural, Accidental::Sharp, Accidental::Flat] {
                    let pitch = Pitch::new(name, octave, acc);
                    let back = semitones_to_note(note_to_semitones(pitch));
                    assert!(are_enharmonic(pitch, back), "{pitch} -> {back}");
                }
            }
        }
    }

    #[test]
    fn sharp_to_flat_common_keys() {
        assert_eq!(sharp_to_flat(p("C#4")), p("Db4"));
        assert_eq!(sharp_to_flat(p("D#4")), p("Eb4"));
        assert_eq!(sharp_to_flat(p("F#4")), p("Gb4"));
        assert_eq!(sharp_to_flat(p("G#4")), p("Ab4"));
        assert_eq!(sharp_to_flat(p("A#4")), p("Bb4"));
        for s in ["C#4", "D#4", "F#4", "G#4", "A#4"] {
            assert!(are_enharmonic(p(s), sharp_to_flat(p(s))));
        }
    }

    #[test]
    fn sharp_to_flat_edge_mappings() {
        assert_eq!(sharp_to_flat(p("E#4")), p("Fb4"));
        assert_eq!(sharp_to_flat(p("B#4")), p("Cb5"));
    }

    #[test]
    fn sharp_to_flat_leaves_others() {
        assert_eq!(sharp_to_flat(p("C4")), p("C4"));
        assert_eq!(sharp_to_flat(p("Eb4")), p("Eb4"));
    }

    #[test]
    fn enharmonic_reflexive_and_symmetric() {
        let a = p("G#3");
        let b = p("Ab3");
        assert!(are_enharmonic(a, a));
        assert!(are_enharmonic(a, b));
        assert!(are_enharmonic(b, a));
        assert!(!are_enharmonic(a, p("A3")));
    }

    #[test]
    fn parse_and_display() {
        assert_eq!(p("F#3").to_string(), "F#3");
        assert_eq!(p("Eb2").to_string(), "Eb2");
        assert_eq!(p("c4"), p("C4"));
        assert_eq!(p("C-1").octave, -1);
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!("".parse::<Pitch>().is_err());
        assert!("X4".parse::<Pitch>().is_err());
        assert!("C".parse::<Pitch>().is_err());
        assert!("C#".parse::<Pitch>().is_err());
        assert!("Cx4".parse::<Pitch>().is_err());
    }

    #[test]
    fn range_contains_by_sound() {
        let range = NoteRange::new(p("C4"), p("C5"));
        assert!(range.contains(p("C4")));
        assert!(range.contains(p("Cb5")));
        assert!(range.contains(p("C5")));
        assert!(!range.contains(p("B3")));
        assert!(!range.contains(p("C#5")));
    }
}
