use crate::error::{ProcessingError, Result};
use crate::models::{CityKey, WeatherObservation};
use serde::Serialize;
use std::collections::HashMap;

/// Observation with the largest gap between its day's max and min
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IntradaySwing {
    pub observation: WeatherObservation,
    pub delta: f64,
}

/// City whose daily maximum moved the most across the observed days
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CityHighSwing {
    pub city: CityKey,
    pub max_temp_low: f64,
    pub max_temp_high: f64,
    pub delta: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalyticsResult {
    pub hottest: WeatherObservation,
    pub coldest: WeatherObservation,
    pub max_intraday_swing: IntradaySwing,
    pub max_city_high_swing: CityHighSwing,
}

impl AnalyticsResult {
    pub fn summary(&self) -> String {
        format!(
            "Climate Extremes:\n\
            - Hottest: {} on {} ({:.2}°C)\n\
            - Coldest: {} on {} ({:.2}°C)\n\
            - Largest daily range: {} on {} ({:.2}°C, {:.2}°C to {:.2}°C)\n\
            - Largest change in daily maximum: {} ({:.2}°C, {:.2}°C to {:.2}°C)",
            self.hottest.city,
            self.hottest.day,
            self.hottest.temp,
            self.coldest.city,
            self.coldest.day,
            self.coldest.temp,
            self.max_intraday_swing.observation.city,
            self.max_intraday_swing.observation.day,
            self.max_intraday_swing.delta,
            self.max_intraday_swing.observation.temp_min,
            self.max_intraday_swing.observation.temp_max,
            self.max_city_high_swing.city,
            self.max_city_high_swing.delta,
            self.max_city_high_swing.max_temp_low,
            self.max_city_high_swing.max_temp_high,
        )
    }
}

/// Pure reductions over a complete observation set. Ties go to the first
/// observation (or city) in input order.
pub struct ClimateAnalyzer;

impl ClimateAnalyzer {
    pub fn new() -> Self {
        Self
    }

    pub fn analyze(&self, observations: &[WeatherObservation]) -> Result<AnalyticsResult> {
        if observations.is_empty() {
            return Err(ProcessingError::MissingData(
                "No weather observations to analyze".to_string(),
            ));
        }

        Ok(AnalyticsResult {
            hottest: self.hottest(observations)?.clone(),
            coldest: self.coldest(observations)?.clone(),
            max_intraday_swing: self.max_intraday_swing(observations)?,
            max_city_high_swing: self.max_city_high_swing(observations)?,
        })
    }

    pub fn hottest<'a>(&self, observations: &'a [WeatherObservation]) -> Result<&'a WeatherObservation> {
        first_max_by(observations, |o| o.temp)
    }

    pub fn coldest<'a>(&self, observations: &'a [WeatherObservation]) -> Result<&'a WeatherObservation> {
        first_max_by(observations, |o| -o.temp)
    }

    pub fn max_intraday_swing(&self, observations: &[WeatherObservation]) -> Result<IntradaySwing> {
        let observation = first_max_by(observations, WeatherObservation::intraday_swing)?;
        Ok(IntradaySwing {
            delta: observation.intraday_swing(),
            observation: observation.clone(),
        })
    }

    pub fn max_city_high_swing(&self, observations: &[WeatherObservation]) -> Result<CityHighSwing> {
        // (low, high) of temp_max per city, cities in first-seen order
        let mut order: Vec<&CityKey> = Vec::new();
        let mut ranges: HashMap<&CityKey, (f64, f64)> = HashMap::new();

        for observation in observations {
            ranges
                .entry(&observation.city)
                .and_modify(|(low, high)| {
                    *low = low.min(observation.temp_max);
                    *high = high.max(observation.temp_max);
                })
                .or_insert_with(|| {
                    order.push(&observation.city);
                    (observation.temp_max, observation.temp_max)
                });
        }

        let mut best: Option<CityHighSwing> = None;
        for city in order {
            let (low, high) = ranges[city];
            let delta = high - low;
            if best.as_ref().map_or(true, |b| delta > b.delta) {
                best = Some(CityHighSwing {
                    city: city.clone(),
                    max_temp_low: low,
                    max_temp_high: high,
                    delta,
                });
            }
        }

        best.ok_or_else(|| ProcessingError::MissingData("No cities to compare".to_string()))
    }
}

impl Default for ClimateAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

/// First element with the strictly greatest key
fn first_max_by<F>(observations: &[WeatherObservation], key: F) -> Result<&WeatherObservation>
where
    F: Fn(&WeatherObservation) -> f64,
{
    let mut iter = observations.iter();
    let first = iter
        .next()
        .ok_or_else(|| ProcessingError::MissingData("No weather observations".to_string()))?;

    let (best, _) = iter.fold((first, key(first)), |(best, best_key), candidate| {
        let candidate_key = key(candidate);
        if candidate_key > best_key {
            (candidate, candidate_key)
        } else {
            (best, best_key)
        }
    });

    Ok(best)
}
