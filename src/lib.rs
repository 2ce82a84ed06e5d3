//! Solfege — music-theory engine and piano playback core for an ear-training trainer.

pub mod audio;
pub mod config;
pub mod playback;
pub mod samples;
pub mod theory;
pub mod voice;
