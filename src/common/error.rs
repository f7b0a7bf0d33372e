use crate::domain::query::EntityType;
use thiserror::Error;

/// Why a request to the upstream service did not yield a usable body.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchCause {
    #[error("transport failure: {0}")]
    Transport(String),

    #[error("upstream responded with HTTP status {status}")]
    Status { status: u16 },
}

/// Network, authentication or HTTP-status failure while querying Movebank.
/// Sub-cases are not distinguished by callers; `cause` is for logs.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("failed to fetch '{entity_type}' from Movebank: {cause}")]
pub struct UpstreamFetchError {
    pub entity_type: EntityType,
    #[source]
    pub cause: FetchCause,
}

/// Structural malformation of a CSV payload. `row` is the 1-based index of the
/// offending body row (0 means the header row).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("CSV parse failed at row {row}: {message}")]
pub struct CsvParseError {
    pub row: usize,
    pub message: String,
}

#[derive(Error, Debug)]
pub enum MovebankError {
    #[error(transparent)]
    UpstreamFetch(#[from] UpstreamFetchError),

    #[error(transparent)]
    CsvParse(#[from] CsvParseError),

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid value for field '{field}': {message}")]
    InvalidField { field: String, message: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML deserialization failed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),
}

impl MovebankError {
    pub fn invalid_field(field: &str, message: impl Into<String>) -> Self {
        MovebankError::InvalidField {
            field: field.to_string(),
            message: message.into(),
        }
    }

    /// Short label used for metrics and log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            MovebankError::UpstreamFetch(_) => "upstream_fetch",
            MovebankError::CsvParse(_) => "csv_parse",
            MovebankError::MissingField(_) => "missing_field",
            MovebankError::InvalidField { .. } => "invalid_field",
            MovebankError::Config(_) => "config",
            MovebankError::Io(_) => "io",
            MovebankError::Toml(_) => "toml",
            MovebankError::Json(_) => "json",
        }
    }
}

pub type Result<T> = std::result::Result<T, MovebankError>;
