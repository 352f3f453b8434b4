use crate::error::{ProcessingError, Result};
use crate::geocoding::{GeocodedAddress, Geocoder};
use crate::utils::retry::{is_transient_http, is_transient_status};
use reqwest::blocking::Client;
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Deserialize)]
struct ReverseResponse {
    display_name: Option<String>,
    address: Option<ReverseAddress>,
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ReverseAddress {
    country_code: Option<String>,
    city: Option<String>,
    town: Option<String>,
    village: Option<String>,
}

/// Blocking Nominatim (OpenStreetMap) reverse-geocoding client
pub struct NominatimClient {
    client: Client,
    base_url: String,
    language: String,
}

impl NominatimClient {
    pub fn new(base_url: &str, user_agent: &str, language: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            language: language.to_string(),
        })
    }

    fn error(latitude: f64, longitude: f64, message: String, transient: bool) -> ProcessingError {
        ProcessingError::Geocoding {
            latitude,
            longitude,
            message,
            transient,
        }
    }
}

impl Geocoder for NominatimClient {
    fn reverse(&self, latitude: f64, longitude: f64) -> Result<GeocodedAddress> {
        let url = format!("{}/reverse", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[
                ("lat", latitude.to_string()),
                ("lon", longitude.to_string()),
                ("format", "jsonv2".to_string()),
                ("addressdetails", "1".to_string()),
                ("accept-language", self.language.clone()),
            ])
            .send()
            .map_err(|e| Self::error(latitude, longitude, e.to_string(), is_transient_http(&e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Self::error(
                latitude,
                longitude,
                format!("service returned {}", status),
                is_transient_status(status),
            ));
        }

        let body: ReverseResponse = response
            .json()
            .map_err(|e| Self::error(latitude, longitude, format!("malformed response: {}", e), false))?;

        if let Some(message) = body.error {
            return Err(Self::error(latitude, longitude, message, false));
        }

        let address = body.address.ok_or_else(|| {
            Self::error(latitude, longitude, "response has no address".to_string(), false)
        })?;

        let country_code = address.country_code.ok_or_else(|| {
            Self::error(latitude, longitude, "response has no country_code".to_string(), false)
        })?;

        Ok(GeocodedAddress {
            display_address: body.display_name.unwrap_or_default(),
            country_code,
            city: address.city,
            town: address.town,
            village: address.village,
        })
    }
}
