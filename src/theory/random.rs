//! Randomized helpers: note draws within a range and option shuffling.
//!
//! Every function takes the RNG explicitly so exercises can seed it.

use rand::Rng;

use super::pitch::{semitones_to_note, sharp_to_flat, Accidental, NoteRange, Pitch};

/// Upper bound on rejection-sampling draws before giving up on a range.
const MAX_DRAWS: usize = 1000;

/// Draw a pitch uniformly from the inclusive semitone span of `range`.
///
/// With `include_accidentals == false`, black keys are rejected and redrawn.
/// Otherwise a black key keeps its sharp spelling or becomes the flat spelling
/// with equal probability, so every black key is split 50/50 between the two
/// spellings. Pitches are therefore not uniform over all spellings.
///
/// A range with no natural in it cannot satisfy a naturals-only draw; the low
/// end of the range is returned after [`MAX_DRAWS`] attempts.
pub fn random_note_in_range<R: Rng + ?Sized>(
    rng: &mut R,
    range: NoteRange,
    include_accidentals: bool,
) -> Pitch {
    let a = range.low.semitones();
    let b = range.high.semitones();
    let (low, high) = if a <= b { (a, b) } else { (b, a) };

    for _ in 0..MAX_DRAWS {
        let note = semitones_to_note(rng.gen_range(low..=high));

        if !include_accidentals && note.accidental != Accidental::Natural {
            continue;
        }

        if include_accidentals && note.accidental == Accidental::Sharp && rng.gen_bool(0.5) {
            return sharp_to_flat(note);
        }

        return note;
    }

    range.low
}

/// Fisher–Yates shuffle into a new vector.
pub fn shuffle<T: Clone, R: Rng + ?Sized>(rng: &mut R, items: &[T]) -> Vec<T> {
    let mut result = items.to_vec();
    for i in (1..result.len()).rev() {
        let j = rng.gen_range(0..=i);
        result.swap(i, j);
    }
    result
}

/// Uniform pick from a non-empty slice.
pub fn choose<'a, T, R: Rng + ?Sized>(rng: &mut R, items: &'a [T]) -> Option<&'a T> {
    if items.is_empty() {
        None
    } else {
        Some(&items[rng.gen_range(0..items.len())])
    }
}
