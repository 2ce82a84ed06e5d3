//! Rhythm playback against a metronome, as used by the transcription exercise.

use std::time::Duration;

use tracing::debug;

use crate::audio::{AudioEngine, AudioError};
use crate::theory::{NoteName, Pitch, RhythmEvent};

use super::{CancellationToken, PlaybackOutcome, NOTE_FILL};

/// Polling interval while an event sounds.
const POLL: Duration = Duration::from_millis(20);

/// Pitch every rhythm event is played at.
pub const RHYTHM_PITCH: Pitch = Pitch::natural(NoteName::C, 5);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TranscriptionOptions {
    /// Quarter notes per minute. Zero, negative or NaN plays nothing.
    pub tempo: f64,
    pub beats_per_bar: u8,
    /// Count-in bar plus a click on every whole beat.
    pub metronome: bool,
}

impl Default for TranscriptionOptions {
    fn default() -> Self {
        Self {
            tempo: 30.0,
            beats_per_bar: 4,
            metronome: true,
        }
    }
}

fn is_downbeat(beat: f64, beats_per_bar: u8) -> bool {
    beat % beats_per_bar.max(1) as f64 == 0.0
}

/// Play `events` in time, calling `on_event(i)` as event `i` starts.
///
/// With the metronome on, a one-bar count-in precedes the rhythm (downbeat
/// first) and a click sounds on every whole beat, whether an event starts
/// there or it falls inside a longer note. The token is checked before each
/// count-in beat, before each event, and on every poll.
pub fn play_with_metronome(
    engine: &mut AudioEngine,
    events: &[RhythmEvent],
    options: &TranscriptionOptions,
    token: &CancellationToken,
    mut on_event: impl FnMut(usize),
) -> Result<PlaybackOutcome, AudioError> {
    let beat_secs = 60.0 / options.tempo;
    let Ok(beat) = Duration::try_from_secs_f64(beat_secs) else {
        return Ok(PlaybackOutcome::Completed);
    };
    let clock = engine.clock();

    if options.metronome {
        for i in 0..options.beats_per_bar {
            if token.is_cancelled() {
                return Ok(PlaybackOutcome::Cancelled);
            }
            engine.play_metronome_click(i == 0)?;
            clock.sleep(beat);
        }
    }

    let mut current_beat = 0.0_f64;
    for (i, event) in events.iter().enumerate() {
        if token.is_cancelled() {
            return Ok(PlaybackOutcome::Cancelled);
        }
        on_event(i);

        let event_beats = event.beats();
        let event_secs = beat_secs * event_beats;
        debug!(index = i, event = %event, beat = current_beat, "rhythm event");

        if options.metronome && current_beat.fract() == 0.0 {
            engine.play_metronome_click(is_downbeat(current_beat, options.beats_per_bar))?;
        }
        if !event.is_rest {
            engine.play_note(RHYTHM_PITCH, event_secs * NOTE_FILL)?;
        }

        let start = clock.now();
        let Some(end) = Duration::try_from_secs_f64(event_secs)
            .ok()
            .and_then(|len| start.checked_add(len))
        else {
            return Ok(PlaybackOutcome::Completed);
        };
        let mut next_click = (current_beat + 0.001).ceil();

        loop {
            let now = clock.now();
            if now >= end {
                break;
            }
            if token.is_cancelled() {
                return Ok(PlaybackOutcome::Cancelled);
            }
            let elapsed = now.saturating_sub(start).as_secs_f64() / beat_secs;
            let position = current_beat + elapsed;
            if options.metronome && position >= next_click && next_click < current_beat + event_beats {
                engine.play_metronome_click(is_downbeat(next_click, options.beats_per_bar))?;
                next_click += 1.0;
            }
            clock.sleep(POLL.min(end.saturating_sub(now)));
        }

        current_beat += event_beats;
    }

    Ok(PlaybackOutcome::Completed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn downbeat_detection() {
        assert!(is_downbeat(0.0, 4));
        assert!(is_downbeat(4.0, 4));
        assert!(!is_downbeat(3.0, 4));
        assert!(is_downbeat(3.0, 3));
        assert!(is_downbeat(2.0, 0) == is_downbeat(2.0, 1));
    }

    #[test]
    fn default_options() {
        let opts = TranscriptionOptions::default();
        assert_eq!(opts.tempo, 30.0);
        assert_eq!(opts.beats_per_bar, 4);
        assert!(opts.metronome);
    }
}
