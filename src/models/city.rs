use serde::{Deserialize, Serialize};
use std::fmt;

use crate::utils::coordinates::midpoint;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CityKey {
    pub country: String,
    pub city: String,
}

impl CityKey {
    pub fn new(country: impl Into<String>, city: impl Into<String>) -> Self {
        Self {
            country: country.into(),
            city: city.into(),
        }
    }
}

impl fmt::Display for CityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.country, self.city)
    }
}

/// Running min/max extent of a set of positions
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

impl BoundingBox {
    pub fn from_point(latitude: f64, longitude: f64) -> Self {
        Self {
            min_lat: latitude,
            max_lat: latitude,
            min_lon: longitude,
            max_lon: longitude,
        }
    }

    #[must_use]
    pub fn include(self, latitude: f64, longitude: f64) -> Self {
        Self {
            min_lat: self.min_lat.min(latitude),
            max_lat: self.max_lat.max(latitude),
            min_lon: self.min_lon.min(longitude),
            max_lon: self.max_lon.max(longitude),
        }
    }

    pub fn center(&self) -> (f64, f64) {
        (
            midpoint(self.min_lat, self.max_lat),
            midpoint(self.min_lon, self.max_lon),
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CityCentroid {
    pub key: CityKey,
    pub bounds: BoundingBox,
    pub center_lat: f64,
    pub center_lon: f64,
    pub hotel_count: usize,
}

impl CityCentroid {
    pub fn new(key: CityKey, bounds: BoundingBox, hotel_count: usize) -> Self {
        let (center_lat, center_lon) = bounds.center();
        Self {
            key,
            bounds,
            center_lat,
            center_lon,
            hotel_count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounding_box_center_ignores_interior_points() {
        let bounds = BoundingBox::from_point(30.0, -160.0)
            .include(31.0, -159.0)
            .include(31.0, -159.0)
            .include(50.0, -40.0);
        assert_eq!(bounds.center(), (40.0, -100.0));
    }

    #[test]
    fn test_city_key_ordering() {
        let mut keys = vec![
            CityKey::new("US", "Coalville"),
            CityKey::new("UK", "Sallisaw"),
            CityKey::new("AT", "Vienna"),
        ];
        keys.sort();
        assert_eq!(keys[0].to_string(), "AT/Vienna");
        assert_eq!(keys[2].to_string(), "US/Coalville");
    }
}
