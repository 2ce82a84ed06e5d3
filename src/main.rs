//! solfege — play notes, chords, intervals, and rhythms from the command line.
//!
//! Sound goes to the default output device, or to a WAV file with `--wav`.

use std::path::PathBuf;
use std::process;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand, ValueEnum};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use solfege::audio::{AudioEngine, Clock, CpalBackend, ManualClock, OfflineBackend, OfflineRecording};
use solfege::config::AudioConfig;
use solfege::playback::{
    play_with_metronome, CancellationToken, IntervalMode, PlaybackOutcome, ReferencePitch,
    TranscriptionOptions, Voicing, CHORD_ARPEGGIO_GAP_SECS, CHORD_ARPEGGIO_NOTE_SECS,
    DEFAULT_BLOCK_SECS, DEFAULT_INTERVAL_SECS, REFERENCE_SECS,
};
use solfege::theory::{
    events_to_string, generate_rhythm_pattern, get_interval, Chord, ChordQuality,
    ChordQuestion, ChordQuestionSettings, DirectionChoice, IntervalQuestion,
    IntervalQuestionSettings, Language, Pitch, RhythmValue, TimeSignature,
};

/// Extra time to let the last voice ring out before exiting.
const TAIL: Duration = Duration::from_millis(300);
const WAV_SAMPLE_RATE: u32 = 44100;
const MAX_SECS: f64 = 60.0;
const MIN_TEMPO: f64 = 10.0;
const MAX_TEMPO: f64 = 400.0;

#[derive(Parser)]
#[command(name = "solfege", about = "Music-theory trainer playback tool")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Master volume (0.0 to 1.0)
    #[arg(long, global = true)]
    volume: Option<f32>,

    /// Always use the synthesized piano
    #[arg(long, global = true)]
    no_samples: bool,

    /// Render to a WAV file instead of the sound card
    #[arg(long, global = true)]
    wav: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Command {
    /// Play a single note, e.g. `note C#4`
    Note {
        pitch: Pitch,
        #[arg(long, default_value_t = 1.0, value_parser = parse_seconds)]
        duration: f64,
    },

    /// Play a chord, e.g. `chord C4 maj7`
    Chord {
        root: Pitch,
        quality: ChordQuality,
        #[arg(long, default_value_t = 0)]
        inversion: u8,
        #[arg(long)]
        arpeggiate: bool,
        #[arg(long, default_value_t = DEFAULT_BLOCK_SECS, value_parser = parse_seconds)]
        duration: f64,
    },

    /// Play two notes, one after the other or together
    Interval {
        first: Pitch,
        second: Pitch,
        #[arg(long)]
        harmonic: bool,
        #[arg(long, default_value_t = DEFAULT_INTERVAL_SECS, value_parser = parse_seconds)]
        duration: f64,
    },

    /// Play a tuning reference
    Reference {
        #[arg(value_enum, default_value_t = RefArg::A4)]
        pitch: RefArg,
    },

    /// Generate a random rhythm and play it against a metronome
    Rhythm {
        /// Quarter notes per minute
        #[arg(long, default_value_t = 60.0, value_parser = parse_tempo)]
        tempo: f64,
        #[arg(long, default_value_t = 1)]
        bars: u32,
        /// Beats per bar (quarter-note beat)
        #[arg(long, default_value_t = 4)]
        beats: u8,
        #[arg(long)]
        no_metronome: bool,
        #[arg(long)]
        rests: bool,
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Generate and play one ear-training question
    Question {
        #[arg(value_enum)]
        kind: QuestionKind,
        #[arg(long)]
        seed: Option<u64>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum RefArg {
    A4,
    C4,
}

#[derive(Clone, Copy, ValueEnum)]
enum QuestionKind {
    Interval,
    Chord,
}

fn parse_seconds(s: &str) -> Result<f64, String> {
    let secs: f64 = s.parse().map_err(|_| format!("`{s}` is not a number"))?;
    if (0.0..=MAX_SECS).contains(&secs) {
        Ok(secs)
    } else {
        Err(format!("duration must be between 0 and {MAX_SECS} seconds"))
    }
}

fn parse_tempo(s: &str) -> Result<f64, String> {
    let bpm: f64 = s.parse().map_err(|_| format!("`{s}` is not a number"))?;
    if (MIN_TEMPO..=MAX_TEMPO).contains(&bpm) {
        Ok(bpm)
    } else {
        Err(format!("tempo must be between {MIN_TEMPO} and {MAX_TEMPO} BPM"))
    }
}

fn rng(seed: Option<u64>) -> ChaCha8Rng {
    match seed {
        Some(s) => ChaCha8Rng::seed_from_u64(s),
        None => ChaCha8Rng::from_entropy(),
    }
}

fn build_engine(cli: &Cli) -> (AudioEngine, Option<OfflineRecording>) {
    let mut config = AudioConfig::load().unwrap_or_default();
    if let Some(v) = cli.volume {
        config.volume = v;
    }
    if cli.no_samples {
        config.load_samples = false;
    }

    match &cli.wav {
        Some(_) => {
            let clock = Arc::new(ManualClock::new());
            let backend = OfflineBackend::new(
                clock.clone(),
                config.sample_rate.unwrap_or(WAV_SAMPLE_RATE),
                config.channels.unwrap_or(2),
            );
            let recording = backend.recording();
            let engine = AudioEngine::new(backend, config).with_clock(clock);
            (engine, Some(recording))
        }
        None => (AudioEngine::new(CpalBackend::new(), config), None),
    }
}

/// Runs one command, returning how long the caller must wait for it to finish sounding.
fn run(engine: &mut AudioEngine, command: &Command, token: &CancellationToken) -> Result<Duration, String> {
    let secs = Duration::from_secs_f64;
    let err = |e: solfege::audio::AudioError| e.to_string();

    match command {
        Command::Note { pitch, duration } => {
            println!("{pitch} (MIDI {})", pitch.midi());
            engine.play_note(*pitch, *duration).map_err(err)?;
            Ok(secs(*duration))
        }
        Command::Chord {
            root,
            quality,
            inversion,
            arpeggiate,
            duration,
        } => {
            let chord = Chord::new(*root, *quality).with_inversion(*inversion);
            let names: Vec<String> = chord.notes().iter().map(ToString::to_string).collect();
            println!("{root}{} : {}", quality.abbreviation(), names.join(" "));
            if *arpeggiate {
                let onsets = engine
                    .play_chord_arpeggiated(&chord.notes(), CHORD_ARPEGGIO_NOTE_SECS, CHORD_ARPEGGIO_GAP_SECS)
                    .map_err(err)?;
                let last = onsets.last().copied().unwrap_or_default();
                Ok(last + secs(CHORD_ARPEGGIO_NOTE_SECS))
            } else {
                engine.play_chord(&chord, Voicing::Block, *duration).map_err(err)?;
                Ok(secs(*duration))
            }
        }
        Command::Interval {
            first,
            second,
            harmonic,
            duration,
        } => {
            let interval = get_interval(*first, *second);
            println!("{first} {second} : {}", interval.abbreviation(Language::En));
            let mode = if *harmonic {
                IntervalMode::Harmonic
            } else {
                IntervalMode::Melodic
            };
            engine.play_interval(*first, *second, mode, *duration).map_err(err)?;
            Ok(secs(*duration))
        }
        Command::Reference { pitch } => {
            let reference = match pitch {
                RefArg::A4 => ReferencePitch::A4,
                RefArg::C4 => ReferencePitch::C4,
            };
            engine.play_reference_pitch(reference).map_err(err)?;
            Ok(secs(REFERENCE_SECS))
        }
        Command::Rhythm {
            tempo,
            bars,
            beats,
            no_metronome,
            rests,
            seed,
        } => {
            let ts = TimeSignature::new(*beats);
            let values = [RhythmValue::Half, RhythmValue::Quarter, RhythmValue::Eighth];
            let events = generate_rhythm_pattern(&mut rng(*seed), ts, *bars, &values, *rests);
            println!("{ts}: {}", events_to_string(&events));

            let options = TranscriptionOptions {
                tempo: *tempo,
                beats_per_bar: *beats,
                metronome: !no_metronome,
            };
            let outcome = play_with_metronome(engine, &events, &options, token, |i| {
                tracing::debug!(event = i, "playing");
            })
            .map_err(err)?;
            if outcome == PlaybackOutcome::Cancelled {
                println!("stopped");
            }
            Ok(Duration::ZERO)
        }
        Command::Question { kind, seed } => {
            let mut rng = rng(*seed);
            match kind {
                QuestionKind::Interval => {
                    let settings = IntervalQuestionSettings {
                        direction: DirectionChoice::Both,
                        ..Default::default()
                    };
                    let q = IntervalQuestion::generate(&mut rng, &settings, None);
                    let options: Vec<String> =
                        q.options.iter().map(|i| i.abbreviation(Language::En)).collect();
                    println!("options: {}", options.join("  "));
                    engine
                        .play_interval(q.first, q.second, IntervalMode::Melodic, DEFAULT_INTERVAL_SECS)
                        .map_err(err)?;
                    println!(
                        "answer: {} ({} {})",
                        q.interval.symbol(q.direction, Language::En),
                        q.first,
                        q.second
                    );
                    Ok(secs(DEFAULT_INTERVAL_SECS))
                }
                QuestionKind::Chord => {
                    let q = ChordQuestion::generate(&mut rng, &ChordQuestionSettings::default(), None);
                    let options: Vec<&str> = q.options.iter().map(|c| c.abbreviation()).collect();
                    println!("options: {}", options.join("  "));
                    engine
                        .play_chord(&q.chord, Voicing::Block, DEFAULT_BLOCK_SECS)
                        .map_err(err)?;
                    println!("answer: {} {}", q.chord.root, q.chord.quality);
                    Ok(secs(DEFAULT_BLOCK_SECS))
                }
            }
        }
    }
}

fn main() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let (mut engine, recording) = build_engine(&cli);

    if recording.is_none() && !engine.is_available() {
        eprintln!("no audio output device found");
        process::exit(1);
    }

    if let Err(e) = engine.initialize() {
        eprintln!("failed to start audio engine: {e}");
        process::exit(1);
    }
    // Offline renders wait for the sample set so the export uses it.
    if recording.is_some() {
        engine.wait_for_samples();
    }

    let token = CancellationToken::new();
    let handler_token = token.clone();
    if let Err(e) = ctrlc::set_handler(move || handler_token.cancel()) {
        tracing::warn!(error = %e, "could not install Ctrl-C handler");
    }

    let ring = match run(&mut engine, &cli.command, &token) {
        Ok(d) => d,
        Err(e) => {
            eprintln!("playback error: {e}");
            process::exit(1);
        }
    };

    match (recording, &cli.wav) {
        (Some(recording), Some(path)) => {
            if let Err(e) = recording.write_wav(path) {
                eprintln!("failed to write {}: {e}", path.display());
                process::exit(1);
            }
            println!("wrote {}", path.display());
        }
        _ => {
            let clock = engine.clock();
            let end = clock.now() + ring + TAIL;
            while clock.now() < end && !token.is_cancelled() {
                clock.sleep(Duration::from_millis(50));
            }
        }
    }

    engine.dispose();
}
