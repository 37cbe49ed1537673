//! Fetching the corpus document from disk or over HTTP
//!
//! The reader only needs "fetch this JSON resource"; whether the bytes come
//! from the network or from the last cached copy is decided here.

use crate::error::DataLoadError;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub enum CorpusSource {
    File(PathBuf),
    Url {
        url: String,
        /// Copy refreshed after every accepted download, read when offline
        cache_path: Option<PathBuf>,
    },
}

impl std::fmt::Display for CorpusSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CorpusSource::File(path) => write!(f, "{}", path.display()),
            CorpusSource::Url { url, .. } => write!(f, "{}", url),
        }
    }
}

/// Fetch the raw corpus bytes, optionally verifying a SHA-256 digest (hex).
pub async fn fetch(source: &CorpusSource, expected_sha256: Option<&str>) -> Result<Vec<u8>, DataLoadError> {
    fetch_with(source, expected_sha256, |bytes| Ok(bytes.to_vec())).await
}

/// Fetch, verify and decode the corpus with `accept`.
///
/// A download only replaces the cached copy once it has passed the digest
/// check and `accept`. Any failure on the network path falls back to the
/// cached copy, which must pass the same checks.
pub async fn fetch_with<T, F>(
    source: &CorpusSource,
    expected_sha256: Option<&str>,
    accept: F,
) -> Result<T, DataLoadError>
where
    F: Fn(&[u8]) -> Result<T, DataLoadError>,
{
    let check = |bytes: &[u8]| -> Result<T, DataLoadError> {
        if let Some(expected) = expected_sha256 {
            verify_sha256(bytes, expected)?;
        }
        accept(bytes)
    };

    let (url, cache_path) = match source {
        CorpusSource::File(path) => return check(&read_file(path).await?),
        CorpusSource::Url { url, cache_path } => (url, cache_path),
    };

    let downloaded = match download(url).await {
        Ok(bytes) => check(&bytes).map(|value| (value, bytes)),
        Err(e) => Err(e),
    };

    match downloaded {
        Ok((value, bytes)) => {
            if let Some(cache_path) = cache_path {
                if let Err(e) = write_cache(cache_path, &bytes).await {
                    tracing::warn!(path = %cache_path.display(), "failed to update corpus cache: {}", e);
                }
            }
            Ok(value)
        }
        Err(e) => match cache_path {
            Some(cache_path) if cache_path.exists() => {
                tracing::warn!(url = %url, "corpus download rejected ({}), using cached copy", e);
                check(&read_file(cache_path).await?)
            }
            _ => Err(e),
        },
    }
}

async fn read_file(path: &Path) -> Result<Vec<u8>, DataLoadError> {
    tokio::fs::read(path).await.map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            DataLoadError::Unreachable(format!("{} not found", path.display()))
        } else {
            DataLoadError::Io(e)
        }
    })
}

async fn download(url: &str) -> Result<Vec<u8>, DataLoadError> {
    let response = reqwest::get(url)
        .await
        .map_err(|e| DataLoadError::Unreachable(format!("{}: {}", url, e)))?;

    if !response.status().is_success() {
        return Err(DataLoadError::Unreachable(format!(
            "{}: HTTP {}",
            url,
            response.status()
        )));
    }

    let bytes = response
        .bytes()
        .await
        .map_err(|e| DataLoadError::Unreachable(format!("{}: {}", url, e)))?;

    Ok(bytes.to_vec())
}

async fn write_cache(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    // Write then rename so a reader never sees a half-written cache
    let partial = path.with_extension("partial");
    tokio::fs::write(&partial, bytes).await?;
    tokio::fs::rename(&partial, path).await
}

/// Compare the SHA-256 of `bytes` against a hex digest (case-insensitive)
pub fn verify_sha256(bytes: &[u8], expected: &str) -> Result<(), DataLoadError> {
    let actual = hex::encode(Sha256::digest(bytes));
    if actual.eq_ignore_ascii_case(expected.trim()) {
        Ok(())
    } else {
        Err(DataLoadError::Integrity {
            expected: expected.trim().to_lowercase(),
            actual,
        })
    }
}
