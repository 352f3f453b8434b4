use std::path::{Path, PathBuf};

/// Replace characters that would escape or break a single path component
pub fn sanitize_component(value: &str) -> String {
    let cleaned: String = value
        .trim()
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();

    match cleaned.as_str() {
        "" => "unknown".to_string(),
        "." | ".." => cleaned.replace('.', "_"),
        _ => cleaned,
    }
}

/// Directory for one city: {output}/{country}/{city}
pub fn city_dir(output_dir: &Path, country: &str, city: &str) -> PathBuf {
    output_dir
        .join(sanitize_component(country))
        .join(sanitize_component(city))
}

/// Hotel chunk filename: {country}_{city}_hotels_p{NNN}.csv
pub fn hotel_chunk_filename(country: &str, city: &str, chunk: usize) -> String {
    format!(
        "{}_{}_hotels_p{:03}.csv",
        sanitize_component(country),
        sanitize_component(city),
        chunk
    )
}

/// Per-city temperature series filename: {country}_{city}_temperatures.csv
pub fn temperature_series_filename(country: &str, city: &str) -> String {
    format!(
        "{}_{}_temperatures.csv",
        sanitize_component(country),
        sanitize_component(city)
    )
}
