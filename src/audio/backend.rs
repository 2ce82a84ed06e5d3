//! Output abstraction — where the engine's voices end up.

use crate::config::AudioConfig;

use super::command::AudioCommand;
use super::AudioError;

/// An open output graph. Not `Send`: a cpal stream must stay on the thread
/// that built it.
pub trait AudioOutput {
    fn sample_rate(&self) -> u32;
    fn channels(&self) -> u16;
    fn submit(&mut self, command: AudioCommand) -> Result<(), AudioError>;
    fn is_suspended(&self) -> bool;
    /// Pause processing without closing the output.
    fn suspend(&mut self) -> Result<(), AudioError>;
    fn resume(&mut self) -> Result<(), AudioError>;
}

/// Opens outputs. One backend can open, close, and reopen many times.
pub trait AudioBackend {
    fn open(&mut self, config: &AudioConfig) -> Result<Box<dyn AudioOutput>, AudioError>;

    /// Whether this platform can produce sound at all.
    fn is_available(&self) -> bool;
}
