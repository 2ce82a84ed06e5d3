//! Plausible wrong answers for multiple-choice questions.
//!
//! Both generators fill commonly confused answers first, then pad from the
//! rest of the pool.

use rand::Rng;

use super::chord::ChordQuality;
use super::interval::{Interval, ALL_INTERVALS};

/// Interval pairs (by semitones) that students mix up.
const INTERVAL_CONFUSIONS: [(i32, i32); 5] = [(3, 4), (1, 2), (5, 7), (8, 9), (10, 11)];

/// Chord quality pairs that students mix up.
const CHORD_CONFUSIONS: [(ChordQuality, ChordQuality); 4] = [
    (ChordQuality::Major, ChordQuality::Minor),
    (ChordQuality::Major7, ChordQuality::Dominant7),
    (ChordQuality::Minor7, ChordQuality::Dominant7),
    (ChordQuality::Diminished, ChordQuality::Minor),
];

/// Up to `count` wrong intervals for `correct`, distinct by semitones.
///
/// Confused partners come first, then the remaining intervals nearest in
/// semitones (catalog order breaks ties). `pool` restricts the candidates;
/// `None` or an empty pool means the full catalog. Fewer than `count` are
/// returned only when the pool runs out.
pub fn interval_distractors(
    correct: &Interval,
    count: usize,
    pool: Option<&[Interval]>,
) -> Vec<Interval> {
    let candidates: &[Interval] = match pool {
        Some(p) if !p.is_empty() => p,
        _ => &ALL_INTERVALS,
    };

    let mut distractors: Vec<Interval> = Vec::with_capacity(count);
    let is_new = |list: &[Interval], s: i32| {
        s != correct.semitones && !list.iter().any(|d| d.semitones == s)
    };

    for (a, b) in INTERVAL_CONFUSIONS {
        let partner = if correct.semitones == a {
            b
        } else if correct.semitones == b {
            a
        } else {
            continue;
        };
        if distractors.len() >= count || !is_new(&distractors, partner) {
            continue;
        }
        if let Some(found) = candidates.iter().find(|i| i.semitones == partner) {
            distractors.push(*found);
        }
    }

    let mut nearest = candidates.to_vec();
    nearest.sort_by_key(|i| (i.semitones - correct.semitones).abs());

    for interval in nearest {
        if distractors.len() >= count {
            break;
        }
        if is_new(&distractors, interval.semitones) {
            distractors.push(interval);
        }
    }

    distractors
}

/// Up to `count` wrong chord qualities for `correct`.
///
/// The pool falls back to all qualities when it is missing or holds a single
/// entry. Confused partners present in the pool come first; the rest are
/// drawn at random without repetition.
pub fn chord_distractors<R: Rng + ?Sized>(
    rng: &mut R,
    correct: ChordQuality,
    count: usize,
    pool: Option<&[ChordQuality]>,
) -> Vec<ChordQuality> {
    let all: Vec<ChordQuality> = match pool {
        Some(p) if p.len() > 1 => p.to_vec(),
        _ => ChordQuality::ALL.to_vec(),
    };

    let mut distractors = Vec::with_capacity(count);

    for (a, b) in CHORD_CONFUSIONS {
        if distractors.len() >= count {
            break;
        }
        let partner = if correct == a {
            b
        } else if correct == b {
            a
        } else {
            continue;
        };
        if all.contains(&partner) && !distractors.contains(&partner) {
            distractors.push(partner);
        }
    }

    let mut remaining: Vec<ChordQuality> = all
        .into_iter()
        .filter(|q| *q != correct && !distractors.contains(q))
        .collect();

    while distractors.len() < count && !remaining.is_empty() {
        let idx = rng.gen_range(0..remaining.len());
        distractors.push(remaining.remove(idx));
    }

    distractors
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::theory::interval::IntervalQuality;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn semis(list: &[Interval]) -> Vec<i32> {
        list.iter().map(|i| i.semitones).collect()
    }

    #[test]
    fn minor_third_confused_with_major_third_first() {
        let m3 = ALL_INTERVALS[3];
        let d = interval_distractors(&m3, 3, None);
        assert_eq!(d[0].semitones, 4);
        assert_eq!(semis(&d), vec![4, 2, 1]);
    }

    #[test]
    fn never_contains_correct_and_always_distinct() {
        for correct in ALL_INTERVALS {
            for n in 1..ALL_INTERVALS.len() {
                let d = interval_distractors(&correct, n, None);
                assert_eq!(d.len(), n, "{correct:?} n={n}");
                assert!(d.iter().all(|i| i.semitones != correct.semitones));
                let mut s = semis(&d);
                s.sort_unstable();
                s.dedup();
                assert_eq!(s.len(), n);
            }
        }
    }

    #[test]
    fn tritone_uses_nearest_only() {
        let tt = ALL_INTERVALS[6];
        let d = interval_distractors(&tt, 2, None);
        assert_eq!(semis(&d), vec![5, 7]);
    }

    #[test]
    fn pool_limits_candidates() {
        let pool = [ALL_INTERVALS[3], ALL_INTERVALS[7], ALL_INTERVALS[12]];
        let d = interval_distractors(&ALL_INTERVALS[3], 3, Some(&pool));
        assert_eq!(semis(&d), vec![7, 12]);
    }

    #[test]
    fn confused_partner_outside_pool_is_skipped() {
        let pool = [
            ALL_INTERVALS[3],
            ALL_INTERVALS[5],
            Interval::new(IntervalQuality::Perfect, 8, 12),
        ];
        let d = interval_distractors(&ALL_INTERVALS[3], 1, Some(&pool));
        assert_eq!(semis(&d), vec![5]);
    }

    #[test]
    fn chord_confusions_come_first() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let d = chord_distractors(&mut rng, ChordQuality::Minor, 3, None);
        assert_eq!(d[0], ChordQuality::Major);
        assert_eq!(d[1], ChordQuality::Diminished);
        assert_eq!(d.len(), 3);
        assert!(!d.contains(&ChordQuality::Minor));

        let d = chord_distractors(&mut rng, ChordQuality::Dominant7, 2, None);
        assert_eq!(d, vec![ChordQuality::Major7, ChordQuality::Minor7]);
    }

    #[test]
    fn chord_distractors_distinct_and_bounded_by_pool() {
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let pool = [ChordQuality::Major, ChordQuality::Minor, ChordQuality::Augmented];
        for _ in 0..50 {
            let d = chord_distractors(&mut rng, ChordQuality::Major, 3, Some(&pool));
            assert_eq!(d.len(), 2);
            assert_eq!(d[0], ChordQuality::Minor);
            assert_eq!(d[1], ChordQuality::Augmented);
        }
    }

    #[test]
    fn single_entry_pool_falls_back_to_all() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let d = chord_distractors(&mut rng, ChordQuality::Major, 6, Some(&[ChordQuality::Major]));
        assert_eq!(d.len(), 6);
        let mut sorted = d.clone();
        sorted.sort_by_key(|q| q.abbreviation());
        sorted.dedup();
        assert_eq!(sorted.len(), 6);
    }
}
