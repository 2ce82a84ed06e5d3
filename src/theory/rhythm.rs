//! Rhythm values, time signatures, and random rhythm patterns that fill whole bars.

use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Note value, measured in quarter-note beats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RhythmValue {
    Whole,
    Half,
    Quarter,
    Eighth,
    Sixteenth,
}

impl RhythmValue {
    pub const ALL: [RhythmValue; 5] = [
        RhythmValue::Whole,
        RhythmValue::Half,
        RhythmValue::Quarter,
        RhythmValue::Eighth,
        RhythmValue::Sixteenth,
    ];

    pub fn beats(self) -> f64 {
        match self {
            RhythmValue::Whole => 4.0,
            RhythmValue::Half => 2.0,
            RhythmValue::Quarter => 1.0,
            RhythmValue::Eighth => 0.5,
            RhythmValue::Sixteenth => 0.25,
        }
    }

    fn name(self) -> &'static str {
        match self {
            RhythmValue::Whole => "whole",
            RhythmValue::Half => "half",
            RhythmValue::Quarter => "quarter",
            RhythmValue::Eighth => "eighth",
            RhythmValue::Sixteenth => "sixteenth",
        }
    }
}

impl fmt::Display for RhythmValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One note or rest in a rhythm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RhythmEvent {
    pub value: RhythmValue,
    pub is_rest: bool,
}

impl RhythmEvent {
    pub const fn note(value: RhythmValue) -> Self {
        Self {
            value,
            is_rest: false,
        }
    }

    pub const fn rest(value: RhythmValue) -> Self {
        Self {
            value,
            is_rest: true,
        }
    }

    pub fn beats(&self) -> f64 {
        self.value.beats()
    }
}

impl fmt::Display for RhythmEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = if self.is_rest { 'R' } else { 'N' };
        write!(f, "{kind}:{}", self.value)
    }
}

/// Simple meters with a quarter-note beat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeSignature {
    pub beats_per_bar: u8,
    pub beat_unit: u8,
}

impl TimeSignature {
    pub const FOUR_FOUR: TimeSignature = TimeSignature::new(4);
    pub const THREE_FOUR: TimeSignature = TimeSignature::new(3);
    pub const TWO_FOUR: TimeSignature = TimeSignature::new(2);

    pub const fn new(beats_per_bar: u8) -> Self {
        Self {
            beats_per_bar,
            beat_unit: 4,
        }
    }

    /// 4/4 or 3/4 with equal probability.
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        if rng.gen_bool(0.5) {
            Self::FOUR_FOUR
        } else {
            Self::THREE_FOUR
        }
    }

    pub fn total_beats(&self, bars: u32) -> f64 {
        self.beats_per_bar as f64 * bars as f64
    }
}

impl Default for TimeSignature {
    fn default() -> Self {
        Self::FOUR_FOUR
    }
}

impl fmt::Display for TimeSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.beats_per_bar, self.beat_unit)
    }
}

/// Probability that a generated event (other than the first) is a rest.
const REST_PROBABILITY: f64 = 0.25;

/// Sum of event lengths in beats.
pub fn total_beats(events: &[RhythmEvent]) -> f64 {
    events.iter().map(RhythmEvent::beats).sum()
}

/// Whether `value` can be appended without overflowing `bars` bars.
pub fn fits(events: &[RhythmEvent], value: RhythmValue, time_signature: TimeSignature, bars: u32) -> bool {
    total_beats(events) + value.beats() <= time_signature.total_beats(bars)
}

/// Generate a random pattern that fills exactly `bars` bars when the chosen
/// values allow it.
///
/// Each step picks uniformly among the values that still fit. The first event
/// is never a rest. Generation stops early if no value fits the remainder.
pub fn generate_rhythm_pattern<R: Rng + ?Sized>(
    rng: &mut R,
    time_signature: TimeSignature,
    bars: u32,
    values: &[RhythmValue],
    include_rests: bool,
) -> Vec<RhythmEvent> {
    let total = time_signature.total_beats(bars);
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| b.beats().total_cmp(&a.beats()));

    let mut events = Vec::new();
    let mut current = 0.0;

    while current < total {
        let remaining = total - current;
        let valid: Vec<RhythmValue> = sorted
            .iter()
            .copied()
            .filter(|v| v.beats() <= remaining)
            .collect();
        if valid.is_empty() {
            break;
        }

        let value = valid[rng.gen_range(0..valid.len())];
        let is_rest = include_rests && !events.is_empty() && rng.gen_bool(REST_PROBABILITY);

        events.push(RhythmEvent { value, is_rest });
        current += value.beats();
    }

    events
}

/// Element-wise comparison of value and rest flag.
pub fn rhythms_match(user: &[RhythmEvent], correct: &[RhythmEvent]) -> bool {
    user == correct
}

/// Compact text form, e.g. `N:quarter R:eighth N:eighth`.
pub fn events_to_string(events: &[RhythmEvent]) -> String {
    events
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn beat_values() {
        assert_eq!(RhythmValue::Whole.beats(), 4.0);
        assert_eq!(RhythmValue::Half.beats(), 2.0);
        assert_eq!(RhythmValue::Quarter.beats(), 1.0);
        assert_eq!(RhythmValue::Eighth.beats(), 0.5);
        assert_eq!(RhythmValue::Sixteenth.beats(), 0.25);
    }

    #[test]
    fn generated_patterns_fill_the_bar() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let values = [RhythmValue::Quarter, RhythmValue::Eighth];
        for ts in [TimeSignature::FOUR_FOUR, TimeSignature::THREE_FOUR, TimeSignature::TWO_FOUR] {
            for _ in 0..50 {
                let events = generate_rhythm_pattern(&mut rng, ts, 2, &values, true);
                assert_eq!(total_beats(&events), ts.total_beats(2));
                assert!(!events[0].is_rest);
            }
        }
    }

    #[test]
    fn no_rests_when_disabled() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        for _ in 0..50 {
            let events = generate_rhythm_pattern(
                &mut rng,
                TimeSignature::FOUR_FOUR,
                1,
                &RhythmValue::ALL,
                false,
            );
            assert!(events.iter().all(|e| !e.is_rest));
        }
    }

    #[test]
    fn stops_when_nothing_fits() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let events =
            generate_rhythm_pattern(&mut rng, TimeSignature::THREE_FOUR, 1, &[RhythmValue::Half], false);
        assert_eq!(events, vec![RhythmEvent::note(RhythmValue::Half)]);
    }

    #[test]
    fn empty_value_list_yields_empty_pattern() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let events = generate_rhythm_pattern(&mut rng, TimeSignature::FOUR_FOUR, 1, &[], true);
        assert!(events.is_empty());
    }

    #[test]
    fn matching_is_elementwise() {
        let a = [
            RhythmEvent::note(RhythmValue::Quarter),
            RhythmEvent::rest(RhythmValue::Quarter),
        ];
        let b = [
            RhythmEvent::note(RhythmValue::Quarter),
            RhythmEvent::note(RhythmValue::Quarter),
        ];
        assert!(rhythms_match(&a, &a));
        assert!(!rhythms_match(&a, &b));
        assert!(!rhythms_match(&a[..1], &a));
    }

    #[test]
    fn fits_respects_bar_length() {
        let events = [RhythmEvent::note(RhythmValue::Half), RhythmEvent::note(RhythmValue::Quarter)];
        assert!(fits(&events, RhythmValue::Quarter, TimeSignature::FOUR_FOUR, 1));
        assert!(!fits(&events, RhythmValue::Half, TimeSignature::FOUR_FOUR, 1));
    }

    #[test]
    fn string_form() {
        let events = [
            RhythmEvent::note(RhythmValue::Quarter),
            RhythmEvent::rest(RhythmValue::Eighth),
        ];
        assert_eq!(events_to_string(&events), "N:quarter R:eighth");
        assert_eq!(TimeSignature::THREE_FOUR.to_string(), "3/4");
    }
}
