use crate::error::{ProcessingError, Result};
use crate::models::{ObservationRow, WeatherObservation};
use std::path::Path;

/// Reads a previously exported observation table back for offline analysis
pub struct ObservationReader;

impl ObservationReader {
    pub fn new() -> Self {
        Self
    }

    pub fn read_observations(&self, path: &Path) -> Result<Vec<WeatherObservation>> {
        if !path.exists() {
            return Err(ProcessingError::SourceMissing(format!(
                "{} does not exist",
                path.display()
            )));
        }

        let mut reader = csv::Reader::from_path(path)?;
        let observations = reader
            .deserialize::<ObservationRow>()
            .map(|row| row.map(WeatherObservation::from).map_err(ProcessingError::from))
            .collect::<Result<Vec<_>>>()?;

        tracing::info!("Read {} observations from {}", observations.len(), path.display());
        Ok(observations)
    }
}

impl Default for ObservationReader {
    fn default() -> Self {
        Self::new()
    }
}
