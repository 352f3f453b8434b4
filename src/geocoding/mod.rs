//! Reverse geocoding: corrects each hotel's country and city from its
//! coordinates.

pub mod nominatim;
pub mod resolver;

pub use nominatim::NominatimClient;
pub use resolver::AddressResolver;

use crate::error::Result;

/// Reverse-geocoding answer for one coordinate pair
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GeocodedAddress {
    pub display_address: String,
    pub country_code: String,
    pub city: Option<String>,
    pub town: Option<String>,
    pub village: Option<String>,
}

impl GeocodedAddress {
    /// City name by fixed precedence: city, town, village, then the
    /// city the source record carried.
    pub fn locality<'a>(&'a self, source_city: Option<&'a str>) -> Option<&'a str> {
        self.city
            .as_deref()
            .or(self.town.as_deref())
            .or(self.village.as_deref())
            .or(source_city)
    }

    pub fn normalized_country(&self) -> String {
        self.country_code.trim().to_uppercase()
    }
}

/// A blocking reverse-geocoding service shared by every resolver worker
pub trait Geocoder: Sync {
    fn reverse(&self, latitude: f64, longitude: f64) -> Result<GeocodedAddress>;
}

impl<G: Geocoder + ?Sized> Geocoder for &G {
    fn reverse(&self, latitude: f64, longitude: f64) -> Result<GeocodedAddress> {
        (**self).reverse(latitude, longitude)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn address(city: Option<&str>, town: Option<&str>, village: Option<&str>) -> GeocodedAddress {
        GeocodedAddress {
            display_address: "somewhere".to_string(),
            country_code: "at".to_string(),
            city: city.map(str::to_string),
            town: town.map(str::to_string),
            village: village.map(str::to_string),
        }
    }

    #[test]
    fn test_city_wins_over_town_and_village() {
        let a = address(Some("Vienna"), Some("Schwechat"), Some("Rannersdorf"));
        assert_eq!(a.locality(Some("Wien")), Some("Vienna"));
    }

    #[test]
    fn test_fallback_order() {
        assert_eq!(address(None, Some("Hallstatt"), Some("Lahn")).locality(None), Some("Hallstatt"));
        assert_eq!(address(None, None, Some("Lahn")).locality(Some("Gosau")), Some("Lahn"));
        assert_eq!(address(None, None, None).locality(Some("Gosau")), Some("Gosau"));
        assert_eq!(address(None, None, None).locality(None), None);
    }

    #[test]
    fn test_country_is_uppercased() {
        assert_eq!(address(None, None, None).normalized_country(), "AT");
    }
}
