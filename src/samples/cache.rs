//! Sample cache keyed by the MIDI note each sample was recorded at.

use std::collections::BTreeMap;

use super::SampleData;

#[derive(Debug, Clone, Default)]
pub struct SampleCache {
    samples: BTreeMap<i32, SampleData>,
}

impl SampleCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, midi: i32, data: SampleData) {
        self.samples.insert(midi, data);
    }

    pub fn get(&self, midi: i32) -> Option<&SampleData> {
        self.samples.get(&midi)
    }

    /// Closest sample by MIDI distance. Ties go to the lower note.
    pub fn nearest(&self, midi: i32) -> Option<(i32, &SampleData)> {
        let below = self.samples.range(..=midi).next_back();
        let above = self.samples.range(midi..).next();
        let (m, data) = match (below, above) {
            (Some(b), Some(a)) => {
                if a.0 - midi < midi - b.0 {
                    a
                } else {
                    b
                }
            }
            (Some(b), None) => b,
            (None, Some(a)) => a,
            (None, None) => return None,
        };
        Some((*m, data))
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }

    /// Recorded MIDI notes in ascending order.
    pub fn notes(&self) -> impl Iterator<Item = i32> + '_ {
        self.samples.keys().copied()
    }
}
