use thiserror::Error;

pub type Result<T> = std::result::Result<T, ProcessingError>;

#[derive(Error, Debug)]
pub enum ProcessingError {
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Archive error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("Invalid coordinate: {0}")]
    InvalidCoordinate(String),

    #[error("Input source missing or empty: {0}")]
    SourceMissing(String),

    #[error("Schema error: {0}")]
    Schema(String),

    #[error("Geocoding service error at ({latitude}, {longitude}): {message}")]
    Geocoding {
        latitude: f64,
        longitude: f64,
        message: String,
        transient: bool,
    },

    #[error("Weather service error for {location}: {message}")]
    Weather {
        location: String,
        message: String,
        transient: bool,
    },

    #[error("Missing required data: {0}")]
    MissingData(String),

    #[error("Worker pool error: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

impl ProcessingError {
    /// Whether retrying the failed operation could succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            ProcessingError::Geocoding { transient, .. }
            | ProcessingError::Weather { transient, .. } => *transient,
            ProcessingError::Http(e) => crate::utils::retry::is_transient_http(e),
            _ => false,
        }
    }
}

impl From<::config::ConfigError> for ProcessingError {
    fn from(e: ::config::ConfigError) -> Self {
        ProcessingError::Config(e.to_string())
    }
}
