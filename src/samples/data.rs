//! Decoded piano sample — WAV and MP3 decoding, mono mixdown, and linear resampling.

use std::io::{Cursor, Read, Seek};

use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::DecoderOptions;
use symphonia::core::errors::Error as CodecError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use tracing::debug;

use super::SampleError;

/// A mono buffer at a known sample rate.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleData {
    samples: Vec<f32>,
    sample_rate: u32,
}

impl SampleData {
    pub fn from_mono(samples: Vec<f32>, sample_rate: u32) -> Self {
        Self {
            samples,
            sample_rate,
        }
    }

    /// Decode a WAV stream to mono f32 at `target_sample_rate`.
    ///
    /// Integer formats of any bit depth and 32-bit float are accepted.
    /// Channels are averaged.
    pub fn from_wav<R: Read + Seek>(reader: R, target_sample_rate: u32) -> Result<Self, SampleError> {
        let wav = hound::WavReader::new(reader)?;
        let spec = wav.spec();
        let channels = spec.channels.max(1) as usize;

        let interleaved: Vec<f32> = match spec.sample_format {
            hound::SampleFormat::Int => {
                let scale = (1u64 << (spec.bits_per_sample - 1)) as f32;
                wav.into_samples::<i32>()
                    .map(|s| s.map(|v| v as f32 / scale))
                    .collect::<Result<_, _>>()?
            }
            hound::SampleFormat::Float => wav.into_samples::<f32>().collect::<Result<_, _>>()?,
        };

        if interleaved.is_empty() {
            return Err(SampleError::Empty);
        }

        let mono: Vec<f32> = interleaved
            .chunks_exact(channels)
            .map(|frame| frame.iter().sum::<f32>() / channels as f32)
            .collect();

        Ok(Self::at_rate(mono, spec.sample_rate, target_sample_rate))
    }

    /// Decode a WAV payload held in memory.
    pub fn from_wav_bytes(bytes: &[u8], target_sample_rate: u32) -> Result<Self, SampleError> {
        Self::from_wav(Cursor::new(bytes), target_sample_rate)
    }

    /// Decode a fetched payload, WAV or MP3, picked by its leading bytes.
    pub fn from_bytes(bytes: &[u8], target_sample_rate: u32) -> Result<Self, SampleError> {
        if bytes.starts_with(b"RIFF") {
            Self::from_wav_bytes(bytes, target_sample_rate)
        } else {
            Self::from_compressed(bytes.to_vec(), target_sample_rate)
        }
    }

    /// Decode a compressed stream (MP3) to mono f32 at `target_sample_rate`.
    ///
    /// Corrupt frames are skipped; the stream ends at the first I/O error.
    pub fn from_compressed(bytes: Vec<u8>, target_sample_rate: u32) -> Result<Self, SampleError> {
        let mss = MediaSourceStream::new(Box::new(Cursor::new(bytes)), Default::default());
        let probed = symphonia::default::get_probe().format(
            &Hint::new(),
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )?;
        let mut format = probed.format;

        let track = format
            .tracks()
            .iter()
            .find(|t| t.codec_params.sample_rate.is_some())
            .ok_or(CodecError::Unsupported("no audio track"))?
            .clone();
        let mut decoder =
            symphonia::default::get_codecs().make(&track.codec_params, &DecoderOptions::default())?;

        let mut source_rate = track.codec_params.sample_rate.unwrap_or(target_sample_rate);
        let mut mono = Vec::new();
        loop {
            let packet = match format.next_packet() {
                Ok(p) => p,
                Err(CodecError::IoError(_)) => break,
                Err(e) => return Err(e.into()),
            };
            if packet.track_id() != track.id {
                continue;
            }
            let decoded = match decoder.decode(&packet) {
                Ok(d) => d,
                Err(CodecError::DecodeError(reason)) => {
                    debug!(reason, "skipping corrupt frame");
                    continue;
                }
                Err(CodecError::IoError(_)) => break,
                Err(e) => return Err(e.into()),
            };

            let spec = *decoded.spec();
            let channels = spec.channels.count().max(1);
            source_rate = spec.rate;
            let mut buf = SampleBuffer::<f32>::new(decoded.capacity() as u64, spec);
            buf.copy_interleaved_ref(decoded);
            mono.extend(
                buf.samples()
                    .chunks_exact(channels)
                    .map(|frame| frame.iter().sum::<f32>() / channels as f32),
            );
        }

        if mono.is_empty() {
            return Err(SampleError::Empty);
        }
        Ok(Self::at_rate(mono, source_rate, target_sample_rate))
    }

    fn at_rate(mono: Vec<f32>, source_rate: u32, target_sample_rate: u32) -> Self {
        let samples = if source_rate == target_sample_rate {
            mono
        } else {
            resample_linear(&mono, source_rate, target_sample_rate)
        };
        Self {
            samples,
            sample_rate: target_sample_rate,
        }
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f64 / self.sample_rate as f64
    }
}

fn resample_linear(input: &[f32], source_rate: u32, target_rate: u32) -> Vec<f32> {
    if input.len() < 2 {
        return input.to_vec();
    }

    let ratio = source_rate as f64 / target_rate as f64;
    let output_len = (input.len() as f64 / ratio).ceil() as usize;

    (0..output_len)
        .map(|i| {
            let pos = i as f64 * ratio;
            let idx = pos as usize;
            let frac = (pos - idx as f64) as f32;
            match input.get(idx + 1) {
                Some(&next) => input[idx] * (1.0 - frac) + next * frac,
                None => input[idx.min(input.len() - 1)],
            }
        })
        .collect()
}
