//! Interval catalog, interval arithmetic, and short interval labels.

use serde::{Deserialize, Serialize};

use super::pitch::{note_to_semitones, semitones_to_note, Pitch};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IntervalQuality {
    Minor,
    Major,
    Perfect,
    Augmented,
    Diminished,
}

impl IntervalQuality {
    fn key_name(self) -> &'static str {
        match self {
            IntervalQuality::Minor => "minor",
            IntervalQuality::Major => "major",
            IntervalQuality::Perfect => "perfect",
            IntervalQuality::Augmented => "augmented",
            IntervalQuality::Diminished => "diminished",
        }
    }
}

/// Which way an interval is applied from a reference note.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Above,
    Below,
}

impl Direction {
    fn arrow(self) -> char {
        match self {
            Direction::Above => '↑',
            Direction::Below => '↓',
        }
    }
}

/// Label language for interval abbreviations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Nl,
}

/// A named interval. `semitones` is canonical for every comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Interval {
    pub quality: IntervalQuality,
    pub number: u8,
    pub semitones: i32,
}

impl Interval {
    pub const fn new(quality: IntervalQuality, number: u8, semitones: i32) -> Self {
        Self {
            quality,
            number,
            semitones,
        }
    }

    /// The augmented fourth shown as "tritone".
    pub fn is_tritone(&self) -> bool {
        self.number == 4 && self.semitones == 6
    }

    /// The same interval widened by whole octaves.
    pub fn extended(self, octaves: u32) -> Self {
        Self {
            semitones: self.semitones + octaves as i32 * 12,
            ..self
        }
    }

    /// Translation key, e.g. `interval.major3` or `interval.tritone`.
    pub fn key(&self) -> String {
        if self.is_tritone() {
            return "interval.tritone".to_string();
        }
        format!("interval.{}{}", self.quality.key_name(), self.number)
    }

    /// Short label without direction, e.g. `M3`, `P5`, `tt`.
    ///
    /// Dutch uses k (klein), G (groot), r (rein), + and v, with `p1` for the
    /// prime and `o8` for the octave.
    pub fn abbreviation(&self, language: Language) -> String {
        if self.is_tritone() {
            return "tt".to_string();
        }

        match language {
            Language::Nl => {
                if self.number == 1 {
                    return "p1".to_string();
                }
                if self.number == 8 {
                    return "o8".to_string();
                }
                let symbol = match self.quality {
                    IntervalQuality::Minor => 'k',
                    IntervalQuality::Major => 'G',
                    IntervalQuality::Perfect => 'r',
                    IntervalQuality::Augmented => '+',
                    IntervalQuality::Diminished => 'v',
                };
                format!("{symbol}{}", self.number)
            }
            Language::En => {
                let symbol = match self.quality {
                    IntervalQuality::Minor => 'm',
                    IntervalQuality::Major => 'M',
                    IntervalQuality::Perfect => 'P',
                    IntervalQuality::Augmented => 'A',
                    IntervalQuality::Diminished => 'd',
                };
                format!("{symbol}{}", self.number)
            }
        }
    }

    /// Abbreviation with a direction arrow, e.g. `M2↑`.
    pub fn symbol(&self, direction: Direction, language: Language) -> String {
        format!("{}{}", self.abbreviation(language), direction.arrow())
    }
}

/// Unison through octave, one entry per semitone count.
pub const ALL_INTERVALS: [Interval; 13] = [
    Interval::new(IntervalQuality::Perfect, 1, 0),
    Interval::new(IntervalQuality::Minor, 2, 1),
    Interval::new(IntervalQuality::Major, 2, 2),
    Interval::new(IntervalQuality::Minor, 3, 3),
    Interval::new(IntervalQuality::Major, 3, 4),
    Interval::new(IntervalQuality::Perfect, 4, 5),
    Interval::new(IntervalQuality::Augmented, 4, 6),
    Interval::new(IntervalQuality::Perfect, 5, 7),
    Interval::new(IntervalQuality::Minor, 6, 8),
    Interval::new(IntervalQuality::Major, 6, 9),
    Interval::new(IntervalQuality::Minor, 7, 10),
    Interval::new(IntervalQuality::Major, 7, 11),
    Interval::new(IntervalQuality::Perfect, 8, 12),
];

/// Catalog entry with the given semitone count, if any.
pub fn interval_by_semitones(semitones: i32) -> Option<Interval> {
    ALL_INTERVALS
        .iter()
        .copied()
        .find(|i| i.semitones == semitones)
}

/// Simple interval class between two notes, ignoring direction.
///
/// The distance is reduced mod 12, so a compound interval resolves to its
/// simple class and an exact octave resolves to unison.
pub fn get_interval(a: Pitch, b: Pitch) -> Interval {
    let semitones = (note_to_semitones(b) - note_to_semitones(a)).abs() % 12;
    interval_by_semitones(semitones).unwrap_or(ALL_INTERVALS[0])
}

/// Move `note` by `interval` and respell the result.
pub fn apply_interval(note: Pitch, interval: Interval, direction: Direction) -> Pitch {
    let base = note_to_semitones(note);
    let target = match direction {
        Direction::Above => base + interval.semitones,
        Direction::Below => base - interval.semitones,
    };
    semitones_to_note(target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::theory::pitch::are_enharmonic;

    fn p(s: &str) -> Pitch {
        s.parse().unwrap()
    }

    const MAJOR_THIRD: Interval = Interval::new(IntervalQuality::Major, 3, 4);

    #[test]
    fn catalog_covers_every_semitone_once() {
        for (i, interval) in ALL_INTERVALS.iter().enumerate() {
            assert_eq!(interval.semitones, i as i32);
        }
    }

    #[test]
    fn c4_major_third_above_is_e4() {
        let e = apply_interval(p("C4"), MAJOR_THIRD, Direction::Above);
        assert!(are_enharmonic(e, p("E4")));
    }

    #[test]
    fn apply_below_respells_with_sharps() {
        let below = apply_interval(p("C4"), MAJOR_THIRD, Direction::Below);
        assert_eq!(below, p("G#3"));
    }

    #[test]
    fn above_then_below_is_identity() {
        for interval in ALL_INTERVALS {
            for start in ["C4", "Eb3", "F#5", "B2", "Cb4"] {
                let up = apply_interval(p(start), interval, Direction::Above);
                let back = apply_interval(up, interval, Direction::Below);
                assert!(are_enharmonic(back, p(start)), "{start} via {interval:?}");
            }
        }
    }

    #[test]
    fn get_interval_is_directionless() {
        assert_eq!(get_interval(p("C4"), p("G4")).semitones, 7);
        assert_eq!(get_interval(p("G4"), p("C4")).semitones, 7);
    }

    #[test]
    fn get_interval_reduces_compound() {
        // C4 -> E5 is a major tenth; reported as a major third.
        assert_eq!(get_interval(p("C4"), p("E5")), MAJOR_THIRD);
        // An exact octave reduces to unison.
        assert_eq!(get_interval(p("C4"), p("C5")).semitones, 0);
    }

    #[test]
    fn extended_adds_octaves() {
        let tenth = MAJOR_THIRD.extended(1);
        assert_eq!(tenth.semitones, 16);
        assert_eq!(tenth.number, 3);
        let e5 = apply_interval(p("C4"), tenth, Direction::Above);
        assert_eq!(e5, p("E5"));
    }

    #[test]
    fn keys_and_tritone_alias() {
        assert_eq!(MAJOR_THIRD.key(), "interval.major3");
        assert_eq!(ALL_INTERVALS[6].key(), "interval.tritone");
        assert_eq!(ALL_INTERVALS[12].key(), "interval.perfect8");
    }

    #[test]
    fn english_abbreviations() {
        let abbrs: Vec<String> = ALL_INTERVALS
            .iter()
            .map(|i| i.abbreviation(Language::En))
            .collect();
        assert_eq!(
            abbrs,
            ["P1", "m2", "M2", "m3", "M3", "P4", "tt", "P5", "m6", "M6", "m7", "M7", "P8"]
        );
    }

    #[test]
    fn dutch_abbreviations() {
        assert_eq!(ALL_INTERVALS[0].abbreviation(Language::Nl), "p1");
        assert_eq!(ALL_INTERVALS[3].abbreviation(Language::Nl), "k3");
        assert_eq!(ALL_INTERVALS[4].abbreviation(Language::Nl), "G3");
        assert_eq!(ALL_INTERVALS[5].abbreviation(Language::Nl), "r4");
        assert_eq!(ALL_INTERVALS[6].abbreviation(Language::Nl), "tt");
        assert_eq!(ALL_INTERVALS[12].abbreviation(Language::Nl), "o8");
    }

    #[test]
    fn symbol_appends_arrow() {
        let m2 = ALL_INTERVALS[2];
        assert_eq!(m2.symbol(Direction::Above, Language::En), "M2↑");
        assert_eq!(m2.symbol(Direction::Below, Language::Nl), "G2↓");
    }
}
