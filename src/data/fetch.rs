//! Retrieval of raw data files, remote or local

use crate::error::{LoadError, LoadResult};
use reqwest::blocking::Client;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;
use tracing::debug;

/// A data file location
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    /// `http://` or `https://` URL
    Remote(String),
    /// Anything else is treated as a filesystem path
    Local(PathBuf),
}

impl Source {
    pub fn parse(location: &str) -> Self {
        let lower = location.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            Source::Remote(location.to_string())
        } else {
            Source::Local(PathBuf::from(location))
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::Remote(url) => write!(f, "{}", url),
            Source::Local(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Blocking fetcher shared by both startup reads
pub struct Fetcher {
    client: Client,
}

impl Fetcher {
    pub fn new(timeout: Duration) -> LoadResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(LoadError::Client)?;
        Ok(Self { client })
    }

    /// Read the whole resource into memory
    pub fn fetch(&self, source: &Source) -> LoadResult<Vec<u8>> {
        match source {
            Source::Remote(url) => {
                debug!(%url, "fetching");
                let response = self.client.get(url).send().map_err(|source| LoadError::Fetch {
                    url: url.clone(),
                    source,
                })?;

                let status = response.status();
                if !status.is_success() {
                    return Err(LoadError::Status {
                        url: url.clone(),
                        status: status.as_u16(),
                    });
                }

                let body = response.bytes().map_err(|source| LoadError::Fetch {
                    url: url.clone(),
                    source,
                })?;
                debug!(%url, bytes = body.len(), "fetched");
                Ok(body.to_vec())
            }
            Source::Local(path) => {
                debug!(path = %path.display(), "reading");
                Ok(std::fs::read(path)?)
            }
        }
    }
}
