//! Audio configuration loaded from ~/.solfege/audio.yaml.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

#[cfg(feature = "remote-samples")]
use crate::samples::HttpSampleSource;
use crate::samples::{DirSampleSource, SampleSource};

pub const DEFAULT_SAMPLE_BASE_URL: &str = "https://tonejs.github.io/audio/salamander/";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("invalid config YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    /// Master volume, 0.0 to 1.0.
    pub volume: f32,
    /// When false, every playback call is a no-op.
    pub enabled: bool,
    /// Fetch piano samples on initialize. When false the synth is always used.
    pub load_samples: bool,
    pub sample_base_url: String,
    /// File extension fetched, `mp3` or `wav`. Payloads are decoded by content.
    pub sample_extension: String,
    /// Local sample directory. Takes precedence over `sample_base_url`.
    pub sample_dir: Option<PathBuf>,
    /// Output overrides. None = device default.
    pub sample_rate: Option<u32>,
    pub channels: Option<u16>,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            volume: 0.7,
            enabled: true,
            load_samples: true,
            sample_base_url: DEFAULT_SAMPLE_BASE_URL.to_string(),
            sample_extension: "mp3".to_string(),
            sample_dir: None,
            sample_rate: None,
            channels: None,
        }
    }
}

pub fn default_config_path() -> PathBuf {
    let mut path = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push(".solfege");
    path.push("audio.yaml");
    path
}

impl AudioConfig {
    /// Load from the standard path. None if the file is missing or unreadable.
    pub fn load() -> Option<Self> {
        let path = default_config_path();
        if !path.exists() {
            return None;
        }
        match Self::load_from(&path) {
            Ok(config) => Some(config),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "ignoring audio config");
                None
            }
        }
    }

    /// Load from `path`; a missing file gives the defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        Ok(serde_yaml::from_str(&content)?)
    }

    /// Save to `path`, creating parent directories as needed.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, serde_yaml::to_string(self)?)?;
        Ok(())
    }

    /// Where samples come from, or None when sample loading is off.
    pub fn sample_source(&self) -> Option<Arc<dyn SampleSource>> {
        if !self.load_samples {
            return None;
        }
        if let Some(dir) = &self.sample_dir {
            return Some(Arc::new(DirSampleSource::new(dir, &self.sample_extension)));
        }
        self.remote_source()
    }

    #[cfg(feature = "remote-samples")]
    fn remote_source(&self) -> Option<Arc<dyn SampleSource>> {
        match HttpSampleSource::new(&self.sample_base_url, &self.sample_extension) {
            Ok(source) => Some(Arc::new(source)),
            Err(e) => {
                tracing::warn!(error = %e, "HTTP sample source unavailable");
                None
            }
        }
    }

    #[cfg(not(feature = "remote-samples"))]
    fn remote_source(&self) -> Option<Arc<dyn SampleSource>> {
        None
    }
}
