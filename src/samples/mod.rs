//! Sampled piano — the sparse note set, sources, decoding, and the in-memory cache.

pub mod cache;
pub mod data;
pub mod loader;
pub mod names;
pub mod source;

pub use cache::SampleCache;
pub use data::SampleData;
pub use loader::load_samples;
pub use names::{sample_name_to_midi, SAMPLE_NOTES};
#[cfg(feature = "remote-samples")]
pub use source::HttpSampleSource;
pub use source::{DirSampleSource, SampleSource};

/// Sample loading errors. Each one is logged and the sample skipped.
#[derive(Debug, thiserror::Error)]
pub enum SampleError {
    #[error("could not fetch sample '{name}': {reason}")]
    Fetch { name: String, reason: String },
    #[error("WAV decode error: {0}")]
    Decode(#[from] hound::Error),
    #[error("compressed audio decode error: {0}")]
    Codec(#[from] symphonia::core::errors::Error),
    #[error("sample contains no audio")]
    Empty,
    #[error("unknown sample name '{0}'")]
    UnknownName(String),
}
