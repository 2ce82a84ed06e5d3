//! Gain envelopes for the three voice kinds.
//!
//! All times are in seconds from note onset. Unlike a keyboard ADSR, every
//! envelope here finishes inside the requested note duration, so a voice
//! rendered for `d` seconds is silent at `d`.

/// Attack, decay, sustain and a release that ends exactly at the note end.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AdsrEnvelope {
    pub attack: f64,
    pub decay: f64,
    /// Level after the decay, as a fraction of `peak`.
    pub sustain: f64,
    /// Length of the final ramp to zero.
    pub release: f64,
    pub peak: f64,
}

impl AdsrEnvelope {
    /// The synthesized piano shape: 0.8 at 20 ms, 0.48 by 120 ms, 300 ms release.
    pub const PIANO: AdsrEnvelope = AdsrEnvelope {
        attack: 0.02,
        decay: 0.1,
        sustain: 0.6,
        release: 0.3,
        peak: 0.8,
    };

    /// Attack/decay/sustain curve, ignoring release.
    fn held_level(&self, t: f64) -> f64 {
        let sustain_level = self.peak * self.sustain;
        if t < self.attack {
            self.peak * t / self.attack
        } else if t < self.attack + self.decay {
            let decay_t = (t - self.attack) / self.decay;
            self.peak - decay_t * (self.peak - sustain_level)
        } else {
            sustain_level
        }
    }

    /// Gain at `t` for a note lasting `note_duration`.
    ///
    /// The release starts at `note_duration - release` (never before 0) from
    /// whatever level the curve has reached, so short notes fade out of the
    /// attack or decay instead of jumping to the sustain level.
    pub fn amplitude(&self, t: f64, note_duration: f64) -> f64 {
        if t < 0.0 || t >= note_duration {
            return 0.0;
        }
        let release_start = (note_duration - self.release).max(0.0);
        if t < release_start {
            return self.held_level(t);
        }
        let from = self.held_level(release_start);
        let span = note_duration - release_start;
        from * (1.0 - (t - release_start) / span)
    }
}

/// Two-stage gain for sampled notes: quick attack, hold, linear fade.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SampleEnvelope {
    pub attack: f64,
    pub peak: f64,
    /// Fade length before the note end.
    pub tail: f64,
    /// Fraction of the sample length after which the fade must have begun.
    pub max_sample_fraction: f64,
}

impl Default for SampleEnvelope {
    fn default() -> Self {
        Self {
            attack: 0.01,
            peak: 0.85,
            tail: 0.2,
            max_sample_fraction: 0.8,
        }
    }
}

impl SampleEnvelope {
    /// When the fade begins for a note of `duration` using a sample `sample_secs` long.
    pub fn release_start(&self, duration: f64, sample_secs: f64) -> f64 {
        (duration - self.tail).min(sample_secs * self.max_sample_fraction)
    }

    pub fn gain(&self, t: f64, duration: f64, sample_secs: f64) -> f64 {
        if t < 0.0 || t >= duration {
            return 0.0;
        }
        let release_start = self.release_start(duration, sample_secs);

        if release_start > self.attack {
            if t < self.attack {
                return self.peak * t / self.attack;
            }
            if t < release_start {
                return self.peak;
            }
            return self.peak * (duration - t) / (duration - release_start);
        }

        // Too short to hold: rise to the peak then fall straight to zero.
        let attack_end = self.attack.min(duration);
        let top = if self.attack > 0.0 {
            self.peak * attack_end / self.attack
        } else {
            self.peak
        };
        if t < attack_end {
            self.peak * t / self.attack
        } else {
            top * (duration - t) / (duration - attack_end)
        }
    }
}

/// Exponential decay from `start` to `end` over `length`, then silence.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DecayEnvelope {
    pub start: f64,
    pub end: f64,
    pub length: f64,
}

impl DecayEnvelope {
    pub fn gain(&self, t: f64) -> f64 {
        if t < 0.0 || t >= self.length {
            return 0.0;
        }
        self.start * (self.end / self.start).powf(t / self.length)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn piano_reaches_peak_then_sustain() {
        let env = AdsrEnvelope::PIANO;
        assert_approx_eq!(env.amplitude(0.0, 1.5), 0.0, 1e-12);
        assert_approx_eq!(env.amplitude(0.02, 1.5), 0.8, 1e-9);
        assert_approx_eq!(env.amplitude(0.12, 1.5), 0.48, 1e-9);
        assert_approx_eq!(env.amplitude(1.0, 1.5), 0.48, 1e-9);
    }

    #[test]
    fn piano_release_reaches_zero_at_duration() {
        let env = AdsrEnvelope::PIANO;
        assert_approx_eq!(env.amplitude(1.2, 1.5), 0.48, 1e-9);
        assert_approx_eq!(env.amplitude(1.35, 1.5), 0.24, 1e-9);
        assert!(env.amplitude(1.4999, 1.5) < 1e-3);
        assert_eq!(env.amplitude(1.5, 1.5), 0.0);
    }

    #[test]
    fn short_note_releases_from_current_level() {
        let env = AdsrEnvelope::PIANO;
        // 0.31 s: release starts at 10 ms, halfway up the attack.
        assert_approx_eq!(env.amplitude(0.01, 0.31), 0.4, 1e-9);
        for i in 0..310 {
            let t = i as f64 / 1000.0;
            assert!(env.amplitude(t, 0.31) <= 0.4 + 1e-9);
        }
        // Shorter than the release: fades from zero, so stays silent.
        assert_eq!(env.amplitude(0.1, 0.2), 0.0);
    }

    #[test]
    fn adsr_bounded() {
        let env = AdsrEnvelope::PIANO;
        for d in [0.1, 0.4, 0.8, 1.5] {
            for i in 0..2000 {
                let a = env.amplitude(i as f64 / 1000.0, d);
                assert!((0.0..=0.8 + 1e-9).contains(&a), "d={d} i={i}: {a}");
            }
        }
    }

    #[test]
    fn sample_envelope_holds_then_fades() {
        let env = SampleEnvelope::default();
        // Long sample: release at duration - 0.2.
        assert_approx_eq!(env.release_start(1.5, 10.0), 1.3, 1e-12);
        assert_approx_eq!(env.gain(0.005, 1.5, 10.0), 0.425, 1e-9);
        assert_approx_eq!(env.gain(0.5, 1.5, 10.0), 0.85, 1e-12);
        assert_approx_eq!(env.gain(1.4, 1.5, 10.0), 0.425, 1e-9);
        assert_eq!(env.gain(1.5, 1.5, 10.0), 0.0);
    }

    #[test]
    fn sample_envelope_limited_by_sample_length() {
        let env = SampleEnvelope::default();
        // 1 s sample: fade must begin by 0.8 s.
        assert_approx_eq!(env.release_start(1.5, 1.0), 0.8, 1e-12);
        assert_approx_eq!(env.gain(1.15, 1.5, 1.0), 0.425, 1e-9);
    }

    #[test]
    fn very_short_sampled_note_ramps_down_from_peak() {
        let env = SampleEnvelope::default();
        // release start = 0.15 - 0.2 < attack.
        assert_approx_eq!(env.gain(0.01, 0.15, 10.0), 0.85, 1e-9);
        assert_approx_eq!(env.gain(0.08, 0.15, 10.0), 0.425, 1e-9);
        assert!(env.gain(0.1499, 0.15, 10.0) < 0.01);
    }

    #[test]
    fn decay_envelope_endpoints() {
        let env = DecayEnvelope {
            start: 0.3,
            end: 0.01,
            length: 0.05,
        };
        assert_approx_eq!(env.gain(0.0), 0.3, 1e-12);
        assert!(env.gain(0.0499) > 0.01 && env.gain(0.0499) < 0.011);
        assert_eq!(env.gain(0.05), 0.0);
        assert!(env.gain(0.01) > env.gain(0.02));
    }
}
