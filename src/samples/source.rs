//! Where sample payloads come from.

use std::path::PathBuf;

use super::SampleError;

/// Fetches the raw bytes of one named sample, e.g. `Ds4`.
pub trait SampleSource: Send + Sync {
    fn fetch(&self, name: &str) -> Result<Vec<u8>, SampleError>;

    /// Human-readable origin for log lines.
    fn describe(&self) -> String;
}

/// Reads `{dir}/{name}.{extension}`.
#[derive(Debug, Clone)]
pub struct DirSampleSource {
    dir: PathBuf,
    extension: String,
}

impl DirSampleSource {
    pub fn new(dir: impl Into<PathBuf>, extension: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            extension: extension.into(),
        }
    }

    fn path_for(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{name}.{}", self.extension))
    }
}

impl SampleSource for DirSampleSource {
    fn fetch(&self, name: &str) -> Result<Vec<u8>, SampleError> {
        std::fs::read(self.path_for(name)).map_err(|e| SampleError::Fetch {
            name: name.to_string(),
            reason: e.to_string(),
        })
    }

    fn describe(&self) -> String {
        self.dir.display().to_string()
    }
}

/// Downloads `{base_url}{name}.{extension}` with a blocking client.
#[cfg(feature = "remote-samples")]
#[derive(Debug, Clone)]
pub struct HttpSampleSource {
    client: reqwest::blocking::Client,
    base_url: String,
    extension: String,
}

#[cfg(feature = "remote-samples")]
impl HttpSampleSource {
    const TIMEOUT: std::time::Duration = std::time::Duration::from_secs(30);

    pub fn new(base_url: impl Into<String>, extension: impl Into<String>) -> Result<Self, SampleError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Self::TIMEOUT)
            .build()
            .map_err(|e| SampleError::Fetch {
                name: String::new(),
                reason: e.to_string(),
            })?;
        Ok(Self {
            client,
            base_url: base_url.into(),
            extension: extension.into(),
        })
    }

    pub fn url_for(&self, name: &str) -> String {
        format!("{}{name}.{}", self.base_url, self.extension)
    }
}

#[cfg(feature = "remote-samples")]
impl SampleSource for HttpSampleSource {
    fn fetch(&self, name: &str) -> Result<Vec<u8>, SampleError> {
        let fetch_err = |e: reqwest::Error| SampleError::Fetch {
            name: name.to_string(),
            reason: e.to_string(),
        };
        let response = self
            .client
            .get(self.url_for(name))
            .send()
            .and_then(|r| r.error_for_status())
            .map_err(fetch_err)?;
        let bytes = response.bytes().map_err(fetch_err)?;
        Ok(bytes.to_vec())
    }

    fn describe(&self) -> String {
        self.base_url.clone()
    }
}
