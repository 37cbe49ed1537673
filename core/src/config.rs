//! Reader configuration from `MUSHAF_*` environment variables

use crate::fetch::CorpusSource;
use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::path::PathBuf;

const CORPUS_FILE_NAME: &str = "quran_data.json";
const SETTINGS_DB_NAME: &str = "settings.db";
const DEFAULT_BIND: &str = "127.0.0.1:3000";

#[derive(Debug, Clone)]
pub struct ReaderConfig {
    pub data_dir: PathBuf,
    pub corpus_source: CorpusSource,
    /// Hex SHA-256 the corpus document must match, if set
    pub corpus_sha256: Option<String>,
    pub settings_db_path: PathBuf,
    pub bind_addr: SocketAddr,
}

impl ReaderConfig {
    /// Load from the process environment, reading a `.env` file first if present.
    pub fn from_env() -> Result<Self> {
        if let Ok(path) = dotenvy::dotenv() {
            tracing::debug!(path = %path.display(), "loaded .env");
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup.
    ///
    /// - `MUSHAF_DATA_DIR`: data directory (defaults to [`default_data_dir`])
    /// - `MUSHAF_CORPUS_URL`: fetch the corpus over HTTP, cached in the data directory
    /// - `MUSHAF_CORPUS_PATH`: corpus file (default `{data_dir}/quran_data.json`)
    /// - `MUSHAF_CORPUS_SHA256`: expected digest of the corpus document
    /// - `MUSHAF_BIND`: listen address for the HTTP API
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let data_dir = get("MUSHAF_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(default_data_dir);

        let corpus_path = get("MUSHAF_CORPUS_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| data_dir.join(CORPUS_FILE_NAME));

        let corpus_source = match get("MUSHAF_CORPUS_URL") {
            Some(url) => CorpusSource::Url {
                url,
                cache_path: Some(corpus_path),
            },
            None => CorpusSource::File(corpus_path),
        };

        let bind = get("MUSHAF_BIND").unwrap_or_else(|| DEFAULT_BIND.to_string());
        let bind_addr = bind
            .parse()
            .with_context(|| format!("Invalid MUSHAF_BIND address: {}", bind))?;

        Ok(Self {
            settings_db_path: data_dir.join(SETTINGS_DB_NAME),
            data_dir,
            corpus_source,
            corpus_sha256: get("MUSHAF_CORPUS_SHA256"),
            bind_addr,
        })
    }
}

/// Get the data directory
///
/// - Development: `./data` when it already holds a corpus
/// - Otherwise: the platform data directory (`~/.local/share/Mushaf`, ...)
/// - Fallback: `./data`
pub fn default_data_dir() -> PathBuf {
    let local = PathBuf::from("data");
    if local.join(CORPUS_FILE_NAME).exists() {
        return local;
    }

    if let Some(data_dir) = dirs::data_dir() {
        return data_dir.join("Mushaf");
    }

    local
}
