//! Document Fetcher: permanent local cache over the public IRS e-file
//! object store.
//!
//! A cached file is authoritative — presence is never re-validated against
//! the remote store (the underlying filings are immutable historical
//! documents). On a miss, exactly one blocking GET is issued; a non-success
//! status marks the document unavailable for this run, with no retry.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::config;

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("transport error fetching {object_id}: {message}")]
    Transport { object_id: String, message: String },

    #[error("remote store returned status {status} for {object_id}")]
    Status { object_id: String, status: u16 },

    #[error("cannot write document cache: {0}")]
    Io(#[from] std::io::Error),
}

/// Where document bytes come from. The HTTP store in production; tests
/// substitute a canned source with a call counter.
pub trait DocumentSource {
    fn get(&self, object_id: &str) -> Result<Vec<u8>, FetchError>;
}

/// Blocking HTTP client for the public object store. No explicit timeout —
/// the transport default applies, acceptable for a low-volume batch tool.
pub struct HttpSource {
    client: reqwest::blocking::Client,
}

impl HttpSource {
    pub fn new() -> Self {
        Self {
            client: reqwest::blocking::Client::new(),
        }
    }
}

impl Default for HttpSource {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentSource for HttpSource {
    fn get(&self, object_id: &str) -> Result<Vec<u8>, FetchError> {
        let url = format!("{}{}{}", config::BASE_URL, object_id, config::DOC_SUFFIX);
        let response = self
            .client
            .get(&url)
            .send()
            .map_err(|e| FetchError::Transport {
                object_id: object_id.to_string(),
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                object_id: object_id.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.bytes().map_err(|e| FetchError::Transport {
            object_id: object_id.to_string(),
            message: e.to_string(),
        })?;
        Ok(body.to_vec())
    }
}

/// Expected cache location for one document: `<root>/<ein>/<object_id>_public.xml`.
pub fn document_path(cache_root: &Path, ein: &str, object_id: &str) -> PathBuf {
    cache_root
        .join(ein)
        .join(format!("{object_id}{}", config::DOC_SUFFIX))
}

/// Fetches documents into the local cache.
pub struct Fetcher<'a> {
    source: &'a dyn DocumentSource,
}

impl<'a> Fetcher<'a> {
    pub fn new(source: &'a dyn DocumentSource) -> Self {
        Self { source }
    }

    /// Return the cached path for (ein, object_id), fetching and caching
    /// the document first if it is not already present.
    pub fn fetch(
        &self,
        cache_root: &Path,
        ein: &str,
        object_id: &str,
    ) -> Result<PathBuf, FetchError> {
        let path = document_path(cache_root, ein, object_id);
        if path.exists() {
            tracing::debug!(object_id, "document cache hit");
            return Ok(path);
        }

        let body = self.source.get(object_id)?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, body)?;
        tracing::info!(ein, object_id, "fetched return into cache");
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingSource {
        calls: AtomicUsize,
        response: Result<Vec<u8>, u16>,
    }

    impl CountingSource {
        fn serving(body: &str) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                response: Ok(body.as_bytes().to_vec()),
            }
        }

        fn failing(status: u16) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                response: Err(status),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl DocumentSource for CountingSource {
        fn get(&self, object_id: &str) -> Result<Vec<u8>, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.response {
                Ok(body) => Ok(body.clone()),
                Err(status) => Err(FetchError::Status {
                    object_id: object_id.to_string(),
                    status: *status,
                }),
            }
        }
    }

    #[test]
    fn fetch_writes_body_verbatim_to_cache() {
        let dir = tempfile::tempdir().unwrap();
        let source = CountingSource::serving("<Return/>");
        let fetcher = Fetcher::new(&source);

        let path = fetcher.fetch(dir.path(), "123456789", "OBJ1").unwrap();
        assert_eq!(path, document_path(dir.path(), "123456789", "OBJ1"));
        assert_eq!(fs::read_to_string(&path).unwrap(), "<Return/>");
        assert_eq!(source.calls(), 1);
    }

    #[test]
    fn second_fetch_served_from_cache_without_network() {
        let dir = tempfile::tempdir().unwrap();
        let source = CountingSource::serving("<Return/>");
        let fetcher = Fetcher::new(&source);

        let first = fetcher.fetch(dir.path(), "123456789", "OBJ1").unwrap();
        let second = fetcher.fetch(dir.path(), "123456789", "OBJ1").unwrap();

        assert_eq!(first, second);
        assert_eq!(source.calls(), 1, "cache hit must not touch the source");
    }

    #[test]
    fn pre_seeded_cache_never_touches_source() {
        let dir = tempfile::tempdir().unwrap();
        let path = document_path(dir.path(), "123456789", "OBJ1");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "<Return/>").unwrap();

        let source = CountingSource::serving("unused");
        let fetcher = Fetcher::new(&source);

        let got = fetcher.fetch(dir.path(), "123456789", "OBJ1").unwrap();
        assert_eq!(got, path);
        assert_eq!(source.calls(), 0);
    }

    #[test]
    fn non_success_status_reports_object_and_status() {
        let dir = tempfile::tempdir().unwrap();
        let source = CountingSource::failing(404);
        let fetcher = Fetcher::new(&source);

        let err = fetcher.fetch(dir.path(), "123456789", "OBJ1").unwrap_err();
        match err {
            FetchError::Status { object_id, status } => {
                assert_eq!(object_id, "OBJ1");
                assert_eq!(status, 404);
            }
            other => panic!("unexpected error: {other}"),
        }
        // Nothing cached on failure.
        assert!(!document_path(dir.path(), "123456789", "OBJ1").exists());
        assert_eq!(source.calls(), 1);
    }
}
