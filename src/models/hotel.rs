use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::utils::coordinates::validate_coordinates;

/// A hotel row whose coordinates parsed and passed the bounds check
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawLocationRecord {
    pub name: String,
    pub country: Option<String>,
    pub city: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
}

impl RawLocationRecord {
    pub fn new(
        name: String,
        country: Option<String>,
        city: Option<String>,
        latitude: f64,
        longitude: f64,
    ) -> Result<Self> {
        validate_coordinates(latitude, longitude)?;

        Ok(Self {
            name,
            country,
            city,
            latitude,
            longitude,
        })
    }

    /// Coordinates rendered the way the geocoder is queried, e.g. "41.39, 2.19"
    pub fn coordinates_label(&self) -> String {
        format!("{}, {}", self.latitude, self.longitude)
    }
}

/// A hotel after reverse geocoding corrected its country and city
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedHotel {
    pub name: String,
    pub country: String,
    pub city: String,
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl ResolvedHotel {
    pub fn from_raw(record: RawLocationRecord, address: String, country: String, city: String) -> Self {
        Self {
            name: record.name,
            country,
            city,
            address,
            latitude: record.latitude,
            longitude: record.longitude,
        }
    }

    /// False when neither the geocoder nor the source named a city
    pub fn has_locality(&self) -> bool {
        !self.city.trim().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_record_rejects_boundary_coordinates() {
        assert!(RawLocationRecord::new("a".into(), None, None, 90.0, 0.0).is_err());
        assert!(RawLocationRecord::new("a".into(), None, None, 0.0, -180.0).is_err());
        assert!(RawLocationRecord::new("a".into(), None, None, 41.39, 2.19).is_ok());
    }

    #[test]
    fn test_resolved_hotel_keeps_position() {
        let raw = RawLocationRecord::new(
            "Hotel Spa Villa Olimpica Suites".into(),
            Some("US".into()),
            Some("Barcelona".into()),
            41.3971434,
            2.1921947,
        )
        .unwrap();
        assert_eq!(raw.coordinates_label(), "41.3971434, 2.1921947");

        let hotel = ResolvedHotel::from_raw(
            raw,
            "Carrer de Pujades, Barcelona, Spain".into(),
            "ES".into(),
            "Barcelona".into(),
        );
        assert_eq!(hotel.country, "ES");
        assert_eq!(hotel.latitude, 41.3971434);
        assert_eq!(hotel.longitude, 2.1921947);
    }
}
