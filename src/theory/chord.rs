//! Chord qualities, chord spelling with inversions, and answer checking.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::pitch::{are_enharmonic, note_to_semitones, semitones_to_note, Pitch};
use super::TheoryError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChordQuality {
    Major,
    Minor,
    Diminished,
    Augmented,
    Major7,
    Minor7,
    Dominant7,
}

impl ChordQuality {
    pub const ALL: [ChordQuality; 7] = [
        ChordQuality::Major,
        ChordQuality::Minor,
        ChordQuality::Diminished,
        ChordQuality::Augmented,
        ChordQuality::Major7,
        ChordQuality::Minor7,
        ChordQuality::Dominant7,
    ];

    /// Ascending semitone offsets from the root.
    pub fn intervals(self) -> &'static [i32] {
        match self {
            ChordQuality::Major => &[0, 4, 7],
            ChordQuality::Minor => &[0, 3, 7],
            ChordQuality::Diminished => &[0, 3, 6],
            ChordQuality::Augmented => &[0, 4, 8],
            ChordQuality::Major7 => &[0, 4, 7, 11],
            ChordQuality::Minor7 => &[0, 3, 7, 10],
            ChordQuality::Dominant7 => &[0, 4, 7, 10],
        }
    }

    pub fn note_count(self) -> usize {
        self.intervals().len()
    }

    /// English abbreviation used on answer buttons.
    pub fn abbreviation(self) -> &'static str {
        match self {
            ChordQuality::Major => "Maj",
            ChordQuality::Minor => "min",
            ChordQuality::Diminished => "dim",
            ChordQuality::Augmented => "aug",
            ChordQuality::Major7 => "Maj7",
            ChordQuality::Minor7 => "min7",
            ChordQuality::Dominant7 => "dom7",
        }
    }

    fn name(self) -> &'static str {
        match self {
            ChordQuality::Major => "major",
            ChordQuality::Minor => "minor",
            ChordQuality::Diminished => "diminished",
            ChordQuality::Augmented => "augmented",
            ChordQuality::Major7 => "major7",
            ChordQuality::Minor7 => "minor7",
            ChordQuality::Dominant7 => "dominant7",
        }
    }
}

impl fmt::Display for ChordQuality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ChordQuality {
    type Err = TheoryError;

    /// Accepts the full name or the abbreviation, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_ascii_lowercase();
        ChordQuality::ALL
            .into_iter()
            .find(|q| q.name() == lower || q.abbreviation().to_ascii_lowercase() == lower)
            .ok_or_else(|| TheoryError::UnknownChordQuality(s.to_string()))
    }
}

/// A chord rooted on a spelled pitch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Chord {
    pub root: Pitch,
    pub quality: ChordQuality,
    /// Number of lowest notes moved up an octave (0..=3).
    pub inversion: u8,
}

impl Chord {
    pub fn new(root: Pitch, quality: ChordQuality) -> Self {
        Self {
            root,
            quality,
            inversion: 0,
        }
    }

    pub fn with_inversion(mut self, inversion: u8) -> Self {
        self.inversion = inversion;
        self
    }

    /// The chord tones, lowest first after inversion.
    ///
    /// Inversions beyond `note_count - 1` are clamped: rotating every note is
    /// the same pitch set one octave higher.
    pub fn notes(&self) -> Vec<Pitch> {
        let mut notes = build_chord(self.root, self.quality);
        let rotations = (self.inversion as usize).min(notes.len().saturating_sub(1));
        for _ in 0..rotations {
            let mut lowest = notes.remove(0);
            lowest.octave += 1;
            notes.push(lowest);
        }
        notes
    }
}

/// Root-position chord tones, respelled with the default spelling table.
pub fn build_chord(root: Pitch, quality: ChordQuality) -> Vec<Pitch> {
    let base = note_to_semitones(root);
    quality
        .intervals()
        .iter()
        .map(|offset| semitones_to_note(base + offset))
        .collect()
}

/// Whether the drawn notes sound the same pitch set as the correct ones.
///
/// Entry order and spelling are irrelevant; octave placement is not.
pub fn is_chord_correct(drawn: &[Pitch], correct: &[Pitch]) -> bool {
    if drawn.len() != correct.len() {
        return false;
    }

    let mut drawn_sorted = drawn.to_vec();
    let mut correct_sorted = correct.to_vec();
    drawn_sorted.sort_by_key(|p| note_to_semitones(*p));
    correct_sorted.sort_by_key(|p| note_to_semitones(*p));

    drawn_sorted
        .iter()
        .zip(&correct_sorted)
        .all(|(a, b)| are_enharmonic(*a, *b))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(s: &str) -> Pitch {
        s.parse().unwrap()
    }

    fn ps(names: &[&str]) -> Vec<Pitch> {
        names.iter().map(|s| p(s)).collect()
    }

    #[test]
    fn c_major7() {
        let notes = build_chord(p("C4"), ChordQuality::Major7);
        assert_eq!(notes, ps(&["C4", "E4", "G4", "B4"]));
    }

    #[test]
    fn every_quality_starts_on_root() {
        for q in ChordQuality::ALL {
            let notes = build_chord(p("D4"), q);
            assert_eq!(notes[0], p("D4"));
            assert_eq!(notes.len(), q.note_count());
        }
    }

    #[test]
    fn flat_root_is_respelled() {
        let notes = build_chord(p("Eb4"), ChordQuality::Major);
        assert_eq!(notes, ps(&["D#4", "G4", "A#4"]));
    }

    #[test]
    fn first_inversion() {
        let chord = Chord::new(p("C4"), ChordQuality::Major).with_inversion(1);
        assert_eq!(chord.notes(), ps(&["E4", "G4", "C5"]));
    }

    #[test]
    fn third_inversion_of_seventh() {
        let chord = Chord::new(p("G3"), ChordQuality::Dominant7).with_inversion(3);
        assert_eq!(chord.notes(), ps(&["F4", "G4", "B4", "D5"]));
    }

    #[test]
    fn inversion_clamped_for_triads() {
        let second = Chord::new(p("C4"), ChordQuality::Major).with_inversion(2);
        let third = Chord::new(p("C4"), ChordQuality::Major).with_inversion(3);
        assert_eq!(second.notes(), third.notes());
    }

    #[test]
    fn note_counts_and_abbreviations() {
        assert_eq!(ChordQuality::Minor7.note_count(), 4);
        assert_eq!(ChordQuality::Major.note_count(), 3);
        assert_eq!(ChordQuality::Dominant7.abbreviation(), "dom7");
        assert_eq!(ChordQuality::Major7.abbreviation(), "Maj7");
    }

    #[test]
    fn parse_quality() {
        assert_eq!("dominant7".parse::<ChordQuality>(), Ok(ChordQuality::Dominant7));
        assert_eq!("dom7".parse::<ChordQuality>(), Ok(ChordQuality::Dominant7));
        assert_eq!("MAJ".parse::<ChordQuality>(), Ok(ChordQuality::Major));
        assert!("sus4".parse::<ChordQuality>().is_err());
    }

    #[test]
    fn chord_check_ignores_order() {
        let correct = ps(&["C4", "E4", "G4"]);
        assert!(is_chord_correct(&ps(&["G4", "C4", "E4"]), &correct));
        assert!(is_chord_correct(&correct, &ps(&["E4", "G4", "C4"])));
    }

    #[test]
    fn chord_check_accepts_enharmonic_spelling() {
        let correct = build_chord(p("Eb4"), ChordQuality::Major);
        assert!(is_chord_correct(&ps(&["Eb4", "G4", "Bb4"]), &correct));
    }

    #[test]
    fn chord_check_rejects_wrong_sets() {
        let correct = ps(&["C4", "E4", "G4"]);
        assert!(!is_chord_correct(&ps(&["C4", "E4"]), &correct));
        assert!(!is_chord_correct(&ps(&["C4", "Eb4", "G4"]), &correct));
        assert!(!is_chord_correct(&ps(&["C4", "E4", "G5"]), &correct));
    }
}
