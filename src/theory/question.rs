//! One multiple-choice question at a time, for interval and chord exercises.

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::chord::{Chord, ChordQuality};
use super::distractor::{chord_distractors, interval_distractors};
use super::interval::{apply_interval, Direction, Interval, ALL_INTERVALS};
use super::pitch::{NoteName, NoteRange, Pitch};
use super::random::{choose, random_note_in_range, shuffle};

/// Attempts at drawing a question different from the previous one.
const MAX_REPEAT_ATTEMPTS: usize = 10;

/// Which directions an interval question may use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DirectionChoice {
    #[default]
    Above,
    Below,
    Both,
}

impl DirectionChoice {
    fn pick<R: Rng + ?Sized>(self, rng: &mut R) -> Direction {
        match self {
            DirectionChoice::Above => Direction::Above,
            DirectionChoice::Below => Direction::Below,
            DirectionChoice::Both => {
                if rng.gen_bool(0.5) {
                    Direction::Above
                } else {
                    Direction::Below
                }
            }
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntervalQuestionSettings {
    /// Candidate intervals; empty means the whole catalog.
    pub intervals: Vec<Interval>,
    /// Range for the first note (naturals only).
    pub range: NoteRange,
    pub direction: DirectionChoice,
    /// Max octaves between the notes; 1 keeps the interval simple.
    pub octave_span: u32,
    /// Number of answer buttons including the correct one.
    pub option_count: usize,
}

impl Default for IntervalQuestionSettings {
    fn default() -> Self {
        Self {
            intervals: ALL_INTERVALS.to_vec(),
            range: NoteRange::new(Pitch::natural(NoteName::C, 3), Pitch::natural(NoteName::C, 5)),
            direction: DirectionChoice::Above,
            octave_span: 1,
            option_count: 4,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntervalQuestion {
    /// The simple interval being asked for.
    pub interval: Interval,
    pub first: Pitch,
    pub second: Pitch,
    pub direction: Direction,
    pub extra_octaves: u32,
    /// Correct answer and distractors, shuffled.
    pub options: Vec<Interval>,
}

impl IntervalQuestion {
    /// Draw a question, avoiding `previous_key` when possible.
    pub fn generate<R: Rng + ?Sized>(
        rng: &mut R,
        settings: &IntervalQuestionSettings,
        previous_key: Option<&str>,
    ) -> Self {
        let pool: &[Interval] = if settings.intervals.is_empty() {
            &ALL_INTERVALS
        } else {
            &settings.intervals
        };

        let mut attempts = 0;
        let question = loop {
            // The pool is never empty.
            let interval = choose(rng, pool).copied().unwrap_or(ALL_INTERVALS[0]);
            let first = random_note_in_range(rng, settings.range, false);
            let direction = settings.direction.pick(rng);
            let extra_octaves = if settings.octave_span > 1 {
                rng.gen_range(0..settings.octave_span)
            } else {
                0
            };
            let second = apply_interval(first, interval.extended(extra_octaves), direction);

            let candidate = Self {
                interval,
                first,
                second,
                direction,
                extra_octaves,
                options: Vec::new(),
            };
            attempts += 1;
            if previous_key != Some(candidate.key().as_str()) || attempts >= MAX_REPEAT_ATTEMPTS {
                break candidate;
            }
        };

        let wrong = interval_distractors(
            &question.interval,
            settings.option_count.saturating_sub(1),
            None,
        );
        let mut options = vec![question.interval];
        options.extend(wrong);

        Self {
            options: shuffle(rng, &options),
            ..question
        }
    }

    /// Identity used for repeat avoidance.
    pub fn key(&self) -> String {
        format!(
            "{}{}-{}-{}-{:?}",
            self.first.name, self.first.octave, self.interval.semitones, self.extra_octaves, self.direction
        )
    }

    /// Answers are compared by semitones, so the tritone alias is accepted.
    pub fn is_correct(&self, answer: &Interval) -> bool {
        answer.semitones == self.interval.semitones
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChordQuestionSettings {
    /// Candidate qualities; empty means major and minor.
    pub qualities: Vec<ChordQuality>,
    /// Range for the root (naturals only).
    pub range: NoteRange,
    pub include_inversions: bool,
    pub option_count: usize,
}

impl Default for ChordQuestionSettings {
    fn default() -> Self {
        Self {
            qualities: vec![ChordQuality::Major, ChordQuality::Minor],
            range: NoteRange::new(Pitch::natural(NoteName::C, 3), Pitch::natural(NoteName::G, 4)),
            include_inversions: false,
            option_count: 4,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChordQuestion {
    pub chord: Chord,
    pub notes: Vec<Pitch>,
    pub options: Vec<ChordQuality>,
}

impl ChordQuestion {
    pub fn generate<R: Rng + ?Sized>(
        rng: &mut R,
        settings: &ChordQuestionSettings,
        previous_key: Option<&str>,
    ) -> Self {
        let default_pool = [ChordQuality::Major, ChordQuality::Minor];
        let pool: &[ChordQuality] = if settings.qualities.is_empty() {
            &default_pool
        } else {
            &settings.qualities
        };

        let mut attempts = 0;
        let chord = loop {
            let quality = choose(rng, pool).copied().unwrap_or(ChordQuality::Major);
            let root = random_note_in_range(rng, settings.range, false);
            let inversion = if settings.include_inversions {
                rng.gen_range(0..quality.note_count()) as u8
            } else {
                0
            };
            let chord = Chord::new(root, quality).with_inversion(inversion);
            attempts += 1;
            if previous_key != Some(chord_key(&chord).as_str()) || attempts >= MAX_REPEAT_ATTEMPTS {
                break chord;
            }
        };

        let wrong = chord_distractors(
            rng,
            chord.quality,
            settings.option_count.saturating_sub(1),
            Some(pool),
        );
        let mut options = vec![chord.quality];
        options.extend(wrong);

        Self {
            notes: chord.notes(),
            options: shuffle(rng, &options),
            chord,
        }
    }

    pub fn key(&self) -> String {
        chord_key(&self.chord)
    }

    pub fn is_correct(&self, answer: ChordQuality) -> bool {
        answer == self.chord.quality
    }
}

fn chord_key(chord: &Chord) -> String {
    format!("{}{}-{}", chord.root.name, chord.root.octave, chord.quality)
}
