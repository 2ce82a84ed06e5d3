//! Audio callback — runs on the cpal audio thread.
//!
//! Drains commands from the ring buffer into the [`Mixer`], then renders the
//! requested block.

use ringbuf::traits::Consumer;
use ringbuf::HeapCons;

use super::command::AudioCommand;
use super::mixer::Mixer;

pub struct AudioCallback {
    consumer: HeapCons<AudioCommand>,
    mixer: Mixer,
}

impl AudioCallback {
    pub fn new(consumer: HeapCons<AudioCommand>, channels: u16, volume: f32) -> Self {
        Self {
            consumer,
            mixer: Mixer::new(channels, volume),
        }
    }

    /// Called by cpal for each output block.
    pub fn process(&mut self, output: &mut [f32]) {
        while let Some(cmd) = self.consumer.try_pop() {
            self.mixer.apply(cmd);
        }
        self.mixer.render(output);
    }
}
