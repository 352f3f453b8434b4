use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::CityKey;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObservationSource {
    Historical,
    Forecast,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherObservation {
    pub city: CityKey,
    pub day: NaiveDate,
    pub temp: f64,
    pub temp_min: f64,
    pub temp_max: f64,
    pub source: ObservationSource,
}

impl WeatherObservation {
    pub fn new(
        city: CityKey,
        day: NaiveDate,
        temp: f64,
        temp_min: f64,
        temp_max: f64,
        source: ObservationSource,
    ) -> Self {
        Self {
            city,
            day,
            temp,
            temp_min,
            temp_max,
            source,
        }
    }

    /// Spread between the day's maximum and minimum
    pub fn intraday_swing(&self) -> f64 {
        self.temp_max - self.temp_min
    }
}

/// Flat CSV shape of an observation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObservationRow {
    pub country: String,
    pub city: String,
    pub day: NaiveDate,
    pub temp: f64,
    pub temp_min: f64,
    pub temp_max: f64,
    pub source: ObservationSource,
}

impl From<&WeatherObservation> for ObservationRow {
    fn from(o: &WeatherObservation) -> Self {
        Self {
            country: o.city.country.clone(),
            city: o.city.city.clone(),
            day: o.day,
            temp: o.temp,
            temp_min: o.temp_min,
            temp_max: o.temp_max,
            source: o.source,
        }
    }
}

impl From<ObservationRow> for WeatherObservation {
    fn from(row: ObservationRow) -> Self {
        WeatherObservation::new(
            CityKey::new(row.country, row.city),
            row.day,
            row.temp,
            row.temp_min,
            row.temp_max,
            row.source,
        )
    }
}
