use crate::error::{ProcessingError, Result};
use crate::utils::constants::{MAX_ABS_LATITUDE, MAX_ABS_LONGITUDE};

/// Parse a decimal coordinate cell
///
/// # Examples
/// ```
/// use hotel_weather::utils::coordinates::parse_coordinate;
///
/// assert!((parse_coordinate(" 41.3971434 ").unwrap() - 41.3971434).abs() < 1e-9);
/// assert!(parse_coordinate("n/a").is_err());
/// ```
pub fn parse_coordinate(raw: &str) -> Result<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ProcessingError::InvalidCoordinate(
            "Missing coordinate value".to_string(),
        ));
    }

    let value = trimmed.parse::<f64>().map_err(|_| {
        ProcessingError::InvalidCoordinate(format!("Invalid coordinate value: '{}'", raw))
    })?;

    // "NaN" and "inf" parse successfully but are not positions
    if !value.is_finite() {
        return Err(ProcessingError::InvalidCoordinate(format!(
            "Non-finite coordinate value: '{}'",
            raw
        )));
    }

    Ok(value)
}

/// Check |latitude| < 90 and |longitude| < 180, boundary values excluded
pub fn validate_coordinates(latitude: f64, longitude: f64) -> Result<()> {
    if latitude.is_nan() || latitude.abs() >= MAX_ABS_LATITUDE {
        return Err(ProcessingError::InvalidCoordinate(format!(
            "Latitude {} is outside (-{}, {})",
            latitude, MAX_ABS_LATITUDE, MAX_ABS_LATITUDE
        )));
    }

    if longitude.is_nan() || longitude.abs() >= MAX_ABS_LONGITUDE {
        return Err(ProcessingError::InvalidCoordinate(format!(
            "Longitude {} is outside (-{}, {})",
            longitude, MAX_ABS_LONGITUDE, MAX_ABS_LONGITUDE
        )));
    }

    Ok(())
}

/// Parse and validate a latitude/longitude pair
pub fn parse_position(latitude: &str, longitude: &str) -> Result<(f64, f64)> {
    let lat = parse_coordinate(latitude)?;
    let lon = parse_coordinate(longitude)?;
    validate_coordinates(lat, lon)?;
    Ok((lat, lon))
}

pub fn midpoint(a: f64, b: f64) -> f64 {
    (a + b) * 0.5
}
