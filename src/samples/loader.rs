//! Fetch and decode the whole sample set, tolerating individual failures.

use tracing::{debug, info, warn};

use super::{sample_name_to_midi, SampleCache, SampleData, SampleError, SampleSource};

fn load_one(source: &dyn SampleSource, name: &str, sample_rate: u32) -> Result<(i32, SampleData), SampleError> {
    let midi = sample_name_to_midi(name)?;
    let bytes = source.fetch(name)?;
    let data = SampleData::from_bytes(&bytes, sample_rate)?;
    Ok((midi, data))
}

/// Load every name in `names` concurrently, one thread per sample.
///
/// Failed samples are logged and skipped. The result may be empty.
pub fn load_samples(source: &dyn SampleSource, names: &[&str], sample_rate: u32) -> SampleCache {
    let results: Vec<(&str, Result<(i32, SampleData), SampleError>)> = std::thread::scope(|scope| {
        let handles: Vec<_> = names
            .iter()
            .map(|&name| (name, scope.spawn(move || load_one(source, name, sample_rate))))
            .collect();
        handles
            .into_iter()
            .map(|(name, handle)| {
                let result = handle.join().unwrap_or_else(|_| {
                    Err(SampleError::Fetch {
                        name: name.to_string(),
                        reason: "loader thread panicked".to_string(),
                    })
                });
                (name, result)
            })
            .collect()
    });

    let mut cache = SampleCache::new();
    for (name, result) in results {
        match result {
            Ok((midi, data)) => {
                debug!(name, midi, frames = data.len(), "sample decoded");
                cache.insert(midi, data);
            }
            Err(e) => warn!(name, error = %e, "skipping sample"),
        }
    }

    info!(
        loaded = cache.len(),
        requested = names.len(),
        source = %source.describe(),
        "piano samples loaded"
    );
    cache
}
