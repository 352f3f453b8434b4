use crate::error::{ProcessingError, Result};
use crate::models::RawLocationRecord;
use crate::readers::HotelReader;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use zip::ZipArchive;

/// Cleaned hotel records plus what the loader saw on the way
#[derive(Debug)]
pub struct LoadReport {
    pub records: Vec<RawLocationRecord>,
    pub files_read: usize,
    pub rows_read: usize,
    pub rows_dropped: usize,
}

impl LoadReport {
    pub fn summary(&self) -> String {
        format!(
            "Files: {}\nRows read: {}\nRows dropped (invalid coordinates): {}\nValid records: {}",
            self.files_read,
            self.rows_read,
            self.rows_dropped,
            self.records.len()
        )
    }
}

/// Loads hotel CSVs from a zip archive, a directory or a single file
pub struct SourceLoader {
    reader: HotelReader,
}

impl SourceLoader {
    pub fn new() -> Self {
        Self {
            reader: HotelReader::new(),
        }
    }

    pub fn with_reader(reader: HotelReader) -> Self {
        Self { reader }
    }

    pub fn load(&self, path: &Path) -> Result<LoadReport> {
        if !path.exists() {
            return Err(ProcessingError::SourceMissing(format!(
                "{} does not exist",
                path.display()
            )));
        }

        let documents = if path.is_dir() {
            read_directory(path)?
        } else if has_extension(path, "zip") {
            read_archive(path)?
        } else {
            vec![(path.display().to_string(), std::fs::read(path)?)]
        };

        if documents.is_empty() {
            return Err(ProcessingError::SourceMissing(format!(
                "No CSV files found in {}",
                path.display()
            )));
        }

        let mut report = LoadReport {
            records: Vec::new(),
            files_read: documents.len(),
            rows_read: 0,
            rows_dropped: 0,
        };

        for (name, bytes) in &documents {
            let parsed = self.reader.read_hotels_from_bytes(bytes, name)?;
            tracing::debug!(
                "{}: {} rows, {} dropped",
                name,
                parsed.rows_read,
                parsed.rows_dropped
            );
            report.rows_read += parsed.rows_read;
            report.rows_dropped += parsed.rows_dropped;
            report.records.extend(parsed.records);
        }

        if report.rows_read == 0 {
            return Err(ProcessingError::SourceMissing(format!(
                "{} contains no hotel rows",
                path.display()
            )));
        }

        if report.records.is_empty() {
            return Err(ProcessingError::SourceMissing(format!(
                "{} contains no rows with valid coordinates ({} dropped)",
                path.display(),
                report.rows_dropped
            )));
        }

        tracing::info!(
            "Loaded {} hotels from {} file(s), dropped {} invalid rows",
            report.records.len(),
            report.files_read,
            report.rows_dropped
        );

        Ok(report)
    }
}

impl Default for SourceLoader {
    fn default() -> Self {
        Self::new()
    }
}

fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case(extension))
}

fn read_archive(path: &Path) -> Result<Vec<(String, Vec<u8>)>> {
    let file = File::open(path)?;
    let mut archive = ZipArchive::new(file)?;
    let mut documents = Vec::new();

    for i in 0..archive.len() {
        let mut entry = archive.by_index(i)?;
        let name = entry.name().to_string();
        if entry.is_dir() || !name.to_ascii_lowercase().ends_with(".csv") {
            continue;
        }

        let mut bytes = Vec::with_capacity(entry.size() as usize);
        entry.read_to_end(&mut bytes)?;
        documents.push((name, bytes));
    }

    Ok(documents)
}

fn read_directory(path: &Path) -> Result<Vec<(String, Vec<u8>)>> {
    let mut files: Vec<PathBuf> = Vec::new();
    for entry in std::fs::read_dir(path)? {
        let entry_path = entry?.path();
        if entry_path.is_file() && has_extension(&entry_path, "csv") {
            files.push(entry_path);
        }
    }
    files.sort();

    files
        .into_iter()
        .map(|file| {
            let bytes = std::fs::read(&file)?;
            Ok((file.display().to_string(), bytes))
        })
        .collect()
}
