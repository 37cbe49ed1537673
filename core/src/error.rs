//! Error types for the Mushaf reader

use thiserror::Error;

/// Failure to fetch or parse the corpus document.
///
/// Loading is all-or-nothing: any of these leaves the reader without a
/// corpus rather than with a partial one.
#[derive(Error, Debug)]
pub enum DataLoadError {
    #[error("Corpus source unreachable: {0}")]
    Unreachable(String),

    #[error("I/O error reading corpus: {0}")]
    Io(#[from] std::io::Error),

    #[error("Corpus is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Malformed corpus: {0}")]
    Malformed(String),

    #[error("Corpus contains no usable verses")]
    Empty,

    #[error("Corpus checksum mismatch: expected {expected}, got {actual}")]
    Integrity { expected: String, actual: String },
}

#[derive(Error, Debug)]
pub enum MushafError {
    #[error("Data load error: {0}")]
    DataLoad(#[from] DataLoadError),

    #[error("Corpus not ready: {0}")]
    CorpusNotReady(String),

    #[error("Invalid page: {0}")]
    InvalidPage(u32),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("{0}")]
    Other(String),
}

impl From<rusqlite::Error> for MushafError {
    fn from(e: rusqlite::Error) -> Self {
        MushafError::Database(e.to_string())
    }
}

impl serde::Serialize for MushafError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}
