use crate::error::{ProcessingError, Result};
use crate::models::RawLocationRecord;
use crate::utils::constants::{
    COLUMN_CITY, COLUMN_COUNTRY, COLUMN_LATITUDE, COLUMN_LONGITUDE, COLUMN_NAME,
};
use crate::utils::coordinates::parse_position;
use csv::StringRecord;
use std::io::Read;

/// Positions of the columns the loader keeps. `Id` and the positional
/// index column are never looked up.
#[derive(Debug, Clone, Copy)]
struct ColumnLayout {
    name: usize,
    country: usize,
    city: usize,
    latitude: usize,
    longitude: usize,
}

impl ColumnLayout {
    fn from_headers(headers: &StringRecord, source: &str) -> Result<Self> {
        let find = |column: &str| {
            headers
                .iter()
                .position(|h| h.trim().eq_ignore_ascii_case(column))
                .ok_or_else(|| {
                    ProcessingError::Schema(format!(
                        "Column '{}' not found in {}",
                        column, source
                    ))
                })
        };

        Ok(Self {
            name: find(COLUMN_NAME)?,
            country: find(COLUMN_COUNTRY)?,
            city: find(COLUMN_CITY)?,
            latitude: find(COLUMN_LATITUDE)?,
            longitude: find(COLUMN_LONGITUDE)?,
        })
    }
}

/// Rows read from one CSV source
#[derive(Debug, Default)]
pub struct ParsedRows {
    pub records: Vec<RawLocationRecord>,
    pub rows_read: usize,
    pub rows_dropped: usize,
}

pub struct HotelReader {
    delimiter: u8,
}

impl HotelReader {
    pub fn new() -> Self {
        Self { delimiter: b',' }
    }

    pub fn with_delimiter(delimiter: u8) -> Self {
        Self { delimiter }
    }

    /// Parse one CSV document. Every row is checked on its own; a bad row is
    /// counted and skipped without affecting the rows after it.
    pub fn read_hotels<R: Read>(&self, reader: R, source: &str) -> Result<ParsedRows> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .delimiter(self.delimiter)
            .flexible(true)
            .from_reader(reader);

        let headers = csv_reader.headers()?.clone();
        let layout = ColumnLayout::from_headers(&headers, source)?;

        let mut parsed = ParsedRows::default();
        for (row_index, row) in csv_reader.records().enumerate() {
            let row = row?;
            parsed.rows_read += 1;

            match self.parse_row(&row, &layout) {
                Ok(record) => parsed.records.push(record),
                Err(e) => {
                    parsed.rows_dropped += 1;
                    tracing::debug!("{} row {}: dropped ({})", source, row_index + 1, e);
                }
            }
        }

        Ok(parsed)
    }

    /// Decode raw bytes, falling back to Windows-1252 for legacy exports
    pub fn read_hotels_from_bytes(&self, bytes: &[u8], source: &str) -> Result<ParsedRows> {
        match std::str::from_utf8(bytes) {
            Ok(text) => self.read_hotels(text.as_bytes(), source),
            Err(_) => {
                tracing::debug!("{} is not valid UTF-8, decoding as Windows-1252", source);
                let (text, _, _) = encoding_rs::WINDOWS_1252.decode(bytes);
                self.read_hotels(text.as_bytes(), source)
            }
        }
    }

    fn parse_row(&self, row: &StringRecord, layout: &ColumnLayout) -> Result<RawLocationRecord> {
        let cell = |index: usize| row.get(index).unwrap_or("").trim();

        let (latitude, longitude) = parse_position(cell(layout.latitude), cell(layout.longitude))?;

        RawLocationRecord::new(
            cell(layout.name).to_string(),
            non_empty(cell(layout.country)),
            non_empty(cell(layout.city)),
            latitude,
            longitude,
        )
    }
}

impl Default for HotelReader {
    fn default() -> Self {
        Self::new()
    }
}

fn non_empty(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}
