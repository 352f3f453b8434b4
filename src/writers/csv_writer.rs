use crate::analyzers::AnalyticsResult;
use crate::error::Result;
use crate::models::{CityCentroid, CityKey, ObservationRow, ResolvedHotel, StageFailure, WeatherObservation};
use crate::utils::constants::{
    CENTROIDS_FILE, CITY_SWING_FILE, COLDEST_FILE, FAILURES_FILE, HOTELS_CHUNK_SIZE, HOTTEST_FILE,
    INTRADAY_SWING_FILE, OBSERVATIONS_FILE,
};
use crate::utils::filename::{city_dir, hotel_chunk_filename, temperature_series_filename};
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

#[derive(Serialize)]
struct HotelRow<'a> {
    #[serde(rename = "Name")]
    name: &'a str,
    #[serde(rename = "Country")]
    country: &'a str,
    #[serde(rename = "City")]
    city: &'a str,
    #[serde(rename = "Address")]
    address: &'a str,
    #[serde(rename = "Latitude")]
    latitude: f64,
    #[serde(rename = "Longitude")]
    longitude: f64,
}

#[derive(Serialize)]
struct CentroidRow<'a> {
    country: &'a str,
    city: &'a str,
    hotels: usize,
    min_lat: f64,
    min_lon: f64,
    max_lat: f64,
    max_lon: f64,
    center_lat: f64,
    center_lon: f64,
}

#[derive(Serialize)]
struct TemperatureSeriesRow {
    day: NaiveDate,
    temp_min: f64,
    temp_max: f64,
}

#[derive(Serialize)]
struct IntradaySwingRow<'a> {
    country: &'a str,
    city: &'a str,
    day: NaiveDate,
    temp: f64,
    temp_min: f64,
    temp_max: f64,
    day_temp_delta: f64,
}

#[derive(Serialize)]
struct CitySwingRow<'a> {
    country: &'a str,
    city: &'a str,
    max_temp_low: f64,
    max_temp_high: f64,
    max_temp_delta: f64,
}

/// Writes pipeline results as CSV under one output directory
pub struct CsvExporter {
    output_dir: PathBuf,
    chunk_size: usize,
}

impl CsvExporter {
    pub fn new(output_dir: &Path) -> Self {
        Self {
            output_dir: output_dir.to_path_buf(),
            chunk_size: HOTELS_CHUNK_SIZE,
        }
    }

    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// One directory per city, hotels split into files of at most
    /// `chunk_size` rows. Hotels without a city are not exported.
    pub fn export_hotels(&self, hotels: &[ResolvedHotel]) -> Result<Vec<PathBuf>> {
        let mut by_city: BTreeMap<CityKey, Vec<&ResolvedHotel>> = BTreeMap::new();
        for hotel in hotels.iter().filter(|h| h.has_locality()) {
            by_city
                .entry(CityKey::new(hotel.country.clone(), hotel.city.clone()))
                .or_default()
                .push(hotel);
        }

        let mut written = Vec::new();
        for (key, group) in by_city {
            let dir = city_dir(&self.output_dir, &key.country, &key.city);
            std::fs::create_dir_all(&dir)?;

            for (chunk_index, chunk) in group.chunks(self.chunk_size).enumerate() {
                let path = dir.join(hotel_chunk_filename(&key.country, &key.city, chunk_index));
                let mut writer = csv::Writer::from_path(&path)?;
                for hotel in chunk {
                    writer.serialize(HotelRow {
                        name: &hotel.name,
                        country: &hotel.country,
                        city: &hotel.city,
                        address: &hotel.address,
                        latitude: hotel.latitude,
                        longitude: hotel.longitude,
                    })?;
                }
                writer.flush()?;
                written.push(path);
            }
        }

        tracing::debug!("Wrote {} hotel files", written.len());
        Ok(written)
    }

    pub fn export_centroids(&self, centroids: &[CityCentroid]) -> Result<PathBuf> {
        let path = self.prepare(CENTROIDS_FILE)?;
        let mut writer = csv::Writer::from_path(&path)?;
        for c in centroids {
            writer.serialize(CentroidRow {
                country: &c.key.country,
                city: &c.key.city,
                hotels: c.hotel_count,
                min_lat: c.bounds.min_lat,
                min_lon: c.bounds.min_lon,
                max_lat: c.bounds.max_lat,
                max_lon: c.bounds.max_lon,
                center_lat: c.center_lat,
                center_lon: c.center_lon,
            })?;
        }
        writer.flush()?;
        Ok(path)
    }

    /// The merged observation table plus one day/min/max series per city
    pub fn export_observations(&self, observations: &[WeatherObservation]) -> Result<Vec<PathBuf>> {
        let path = self.prepare(OBSERVATIONS_FILE)?;
        let mut writer = csv::Writer::from_path(&path)?;
        for observation in observations {
            writer.serialize(ObservationRow::from(observation))?;
        }
        writer.flush()?;

        let mut written = vec![path];

        let mut by_city: BTreeMap<&CityKey, Vec<&WeatherObservation>> = BTreeMap::new();
        for observation in observations {
            by_city.entry(&observation.city).or_default().push(observation);
        }

        for (key, mut series) in by_city {
            series.sort_by_key(|o| o.day);
            let dir = city_dir(&self.output_dir, &key.country, &key.city);
            std::fs::create_dir_all(&dir)?;

            let path = dir.join(temperature_series_filename(&key.country, &key.city));
            let mut writer = csv::Writer::from_path(&path)?;
            for o in series {
                writer.serialize(TemperatureSeriesRow {
                    day: o.day,
                    temp_min: o.temp_min,
                    temp_max: o.temp_max,
                })?;
            }
            writer.flush()?;
            written.push(path);
        }

        Ok(written)
    }

    pub fn export_analytics(&self, result: &AnalyticsResult) -> Result<Vec<PathBuf>> {
        let hottest = self.write_single(HOTTEST_FILE, ObservationRow::from(&result.hottest))?;
        let coldest = self.write_single(COLDEST_FILE, ObservationRow::from(&result.coldest))?;
        let widest = &result.max_intraday_swing.observation;
        let intraday = self.write_single(
            INTRADAY_SWING_FILE,
            IntradaySwingRow {
                country: &widest.city.country,
                city: &widest.city.city,
                day: widest.day,
                temp: widest.temp,
                temp_min: widest.temp_min,
                temp_max: widest.temp_max,
                day_temp_delta: result.max_intraday_swing.delta,
            },
        )?;

        let swing = &result.max_city_high_swing;
        let city_swing = self.write_single(
            CITY_SWING_FILE,
            CitySwingRow {
                country: &swing.city.country,
                city: &swing.city.city,
                max_temp_low: swing.max_temp_low,
                max_temp_high: swing.max_temp_high,
                max_temp_delta: swing.delta,
            },
        )?;

        Ok(vec![hottest, coldest, intraday, city_swing])
    }

    /// Nothing is written when there were no failures
    pub fn export_failures(&self, failures: &[StageFailure]) -> Result<Option<PathBuf>> {
        if failures.is_empty() {
            return Ok(None);
        }

        let path = self.prepare(FAILURES_FILE)?;
        let mut writer = csv::Writer::from_path(&path)?;
        for failure in failures {
            writer.serialize(failure)?;
        }
        writer.flush()?;
        Ok(Some(path))
    }

    fn prepare(&self, file_name: &str) -> Result<PathBuf> {
        std::fs::create_dir_all(&self.output_dir)?;
        Ok(self.output_dir.join(file_name))
    }

    fn write_single<T: Serialize>(&self, file_name: &str, row: T) -> Result<PathBuf> {
        let path = self.prepare(file_name)?;
        let mut writer = csv::Writer::from_path(&path)?;
        writer.serialize(row)?;
        writer.flush()?;
        Ok(path)
    }
}
