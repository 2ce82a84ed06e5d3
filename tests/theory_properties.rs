//! Cross-module properties of the theory layer.
//!
//! Seeded generators only, so failures reproduce.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use solfege::theory::{
    apply_interval, are_enharmonic, build_chord, generate_rhythm_pattern, get_interval,
    is_chord_correct, note_to_semitones, random_note_in_range, rhythms_match, semitones_to_note,
    sharp_to_flat, total_beats, Accidental, ChordQuality, ChordQuestion, ChordQuestionSettings,
    Direction, IntervalQuestion, IntervalQuestionSettings, NoteRange, Pitch, RhythmValue,
    TimeSignature, ALL_INTERVALS,
};

const SEED: u64 = 7;

fn p(s: &str) -> Pitch {
    s.parse().unwrap()
}

#[test]
fn semitone_spelling_round_trips() {
    for s in -24..120 {
        let note = semitones_to_note(s);
        assert_eq!(note_to_semitones(note), s, "{note}");
        assert_ne!(note.accidental, Accidental::Flat);
    }
}

#[test]
fn flat_respelling_is_enharmonic() {
    for s in 0..96 {
        let note = semitones_to_note(s);
        let flat = sharp_to_flat(note);
        assert!(are_enharmonic(note, flat), "{note} vs {flat}");
        if note.accidental == Accidental::Sharp {
            assert_eq!(flat.accidental, Accidental::Flat);
        } else {
            assert_eq!(flat, note);
        }
    }
}

#[test]
fn applied_interval_is_recovered() {
    let root = p("D4");
    for interval in ALL_INTERVALS.iter().filter(|i| i.semitones < 12) {
        for direction in [Direction::Above, Direction::Below] {
            let other = apply_interval(root, *interval, direction);
            assert_eq!(get_interval(root, other).semitones, interval.semitones);
            assert_eq!(get_interval(other, root).semitones, interval.semitones);
        }
    }
}

#[test]
fn chord_answers_ignore_order_and_spelling() {
    for quality in ChordQuality::ALL {
        let notes = build_chord(p("Eb3"), quality);
        let mut reversed = notes.clone();
        reversed.reverse();
        assert!(is_chord_correct(&reversed, &notes), "{quality}");

        let respelled: Vec<Pitch> = notes.iter().map(|&n| sharp_to_flat(n)).collect();
        assert!(is_chord_correct(&respelled, &notes), "{quality}");

        let mut wrong_octave = notes.clone();
        wrong_octave[0].octave += 1;
        assert!(!is_chord_correct(&wrong_octave, &notes), "{quality}");
    }
}

#[test]
fn random_notes_stay_in_range() {
    let mut rng = ChaCha8Rng::seed_from_u64(SEED);
    let range = NoteRange::new(p("A2"), p("E4"));
    for _ in 0..500 {
        let note = random_note_in_range(&mut rng, range, true);
        assert!(range.contains(note), "{note}");
    }
}

#[test]
fn generated_rhythms_fill_their_bars() {
    let mut rng = ChaCha8Rng::seed_from_u64(SEED);
    let values = [RhythmValue::Half, RhythmValue::Quarter, RhythmValue::Eighth];
    for ts in [TimeSignature::TWO_FOUR, TimeSignature::THREE_FOUR, TimeSignature::FOUR_FOUR] {
        for bars in 1..=4 {
            let events = generate_rhythm_pattern(&mut rng, ts, bars, &values, true);
            assert_eq!(total_beats(&events), ts.total_beats(bars));
            assert!(!events[0].is_rest);

            let mut altered = events.clone();
            let last = altered.len() - 1;
            altered[last].is_rest = !altered[last].is_rest;
            assert!(!rhythms_match(&altered, &events));
        }
    }
}

#[test]
fn interval_questions_are_answerable() {
    let mut rng = ChaCha8Rng::seed_from_u64(SEED);
    let settings = IntervalQuestionSettings::default();
    let mut previous: Option<String> = None;
    for _ in 0..100 {
        let q = IntervalQuestion::generate(&mut rng, &settings, previous.as_deref());
        assert!(q.options.iter().any(|o| q.is_correct(o)));
        assert_eq!(q.options.len(), settings.option_count);
        assert!(settings.range.contains(q.first));
        previous = Some(q.key());
    }
}

#[test]
fn chord_questions_match_their_notes() {
    let mut rng = ChaCha8Rng::seed_from_u64(SEED);
    let settings = ChordQuestionSettings {
        qualities: ChordQuality::ALL.to_vec(),
        include_inversions: true,
        ..Default::default()
    };
    for _ in 0..100 {
        let q = ChordQuestion::generate(&mut rng, &settings, None);
        assert_eq!(q.notes, q.chord.notes());
        assert_eq!(q.notes.len(), q.chord.quality.note_count());
        assert!(q.is_correct(q.chord.quality));
        assert_eq!(q.options.len(), settings.option_count);
    }
}
