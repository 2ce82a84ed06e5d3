//! cpal output — the hardware backend.

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use ringbuf::{
    traits::{Producer, Split},
    HeapRb,
};
use tracing::{error, info};

use crate::config::AudioConfig;

use super::backend::{AudioBackend, AudioOutput};
use super::callback::AudioCallback;
use super::command::AudioCommand;
use super::AudioError;

/// Ring buffer capacity (number of commands).
const RING_BUFFER_CAPACITY: usize = 1024;

/// Default output device of the default host.
#[derive(Debug, Default, Clone, Copy)]
pub struct CpalBackend;

impl CpalBackend {
    pub fn new() -> Self {
        Self
    }
}

impl AudioBackend for CpalBackend {
    fn open(&mut self, config: &AudioConfig) -> Result<Box<dyn AudioOutput>, AudioError> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or(AudioError::NoOutputDevice)?;

        let default = device
            .default_output_config()
            .map_err(|e| AudioError::DeviceConfig(e.to_string()))?;

        let sample_rate = config.sample_rate.unwrap_or(default.sample_rate().0);
        let channels = config.channels.unwrap_or(default.channels());

        let output = CpalOutput::build(&device, sample_rate, channels, config.volume)?;
        info!(
            device = %device.name().unwrap_or_else(|_| "unknown".to_string()),
            sample_rate,
            channels,
            "audio output opened"
        );
        Ok(Box::new(output))
    }

    fn is_available(&self) -> bool {
        cpal::default_host().default_output_device().is_some()
    }
}

/// A running cpal stream fed through a lock-free command queue.
pub struct CpalOutput {
    stream: cpal::Stream,
    producer: ringbuf::HeapProd<AudioCommand>,
    sample_rate: u32,
    channels: u16,
    suspended: bool,
}

impl CpalOutput {
    fn build(
        device: &cpal::Device,
        sample_rate: u32,
        channels: u16,
        volume: f32,
    ) -> Result<Self, AudioError> {
        let rb = HeapRb::<AudioCommand>::new(RING_BUFFER_CAPACITY);
        let (producer, consumer) = rb.split();

        let mut audio_callback = AudioCallback::new(consumer, channels, volume);

        let stream_config = cpal::StreamConfig {
            channels,
            sample_rate: cpal::SampleRate(sample_rate),
            buffer_size: cpal::BufferSize::Default,
        };

        let err_fn = |err: cpal::StreamError| {
            error!(error = %err, "audio stream error");
        };

        let stream = device
            .build_output_stream(
                &stream_config,
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                    audio_callback.process(data);
                },
                err_fn,
                None,
            )
            .map_err(|e| AudioError::StreamBuild(e.to_string()))?;

        stream
            .play()
            .map_err(|e| AudioError::StreamPlay(e.to_string()))?;

        Ok(Self {
            stream,
            producer,
            sample_rate,
            channels,
            suspended: false,
        })
    }
}

impl AudioOutput for CpalOutput {
    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn channels(&self) -> u16 {
        self.channels
    }

    fn submit(&mut self, command: AudioCommand) -> Result<(), AudioError> {
        self.producer
            .try_push(command)
            .map_err(|_| AudioError::BufferFull)
    }

    fn is_suspended(&self) -> bool {
        self.suspended
    }

    fn suspend(&mut self) -> Result<(), AudioError> {
        self.stream
            .pause()
            .map_err(|e| AudioError::StreamPlay(e.to_string()))?;
        self.suspended = true;
        Ok(())
    }

    fn resume(&mut self) -> Result<(), AudioError> {
        self.stream
            .play()
            .map_err(|e| AudioError::StreamPlay(e.to_string()))?;
        self.suspended = false;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::command::ScheduledVoice;

    #[test]
    #[ignore] // Requires audio device — run manually with `cargo test -- --ignored`
    fn opens_default_device() {
        let mut backend = CpalBackend::new();
        let output = backend.open(&AudioConfig::default());
        assert!(output.is_ok(), "open failed: {:?}", output.err());
        let output = output.unwrap();
        assert!(output.sample_rate() > 0);
        assert!(output.channels() > 0);
    }

    #[test]
    #[ignore] // Requires audio device
    fn submit_and_resume() {
        let mut output = CpalBackend::new()
            .open(&AudioConfig::default())
            .expect("no audio device");
        assert!(output
            .submit(AudioCommand::Play(ScheduledVoice::now(vec![0.0; 1024])))
            .is_ok());
        assert!(output.submit(AudioCommand::SetVolume(0.5)).is_ok());
        assert!(output.suspend().is_ok());
        assert!(output.is_suspended());
        assert!(output.resume().is_ok());
        assert!(!output.is_suspended());
    }
}
