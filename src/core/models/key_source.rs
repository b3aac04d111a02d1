use std::fmt;
use std::path::PathBuf;

use crate::core::errors::{Result, ScrambleError};

/// Where the recipient's public key comes from for an encrypt run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeySource {
    /// A short link that redirects to the key text.
    Url(String),
    /// A key file on the local filesystem.
    File(PathBuf),
}

impl KeySource {
    /// Pick the key source from the two optional inputs.
    ///
    /// Exactly one must be present. Performs no I/O.
    pub fn from_options(url: Option<String>, file: Option<PathBuf>) -> Result<Self> {
        match (url, file) {
            (Some(url), None) => Ok(KeySource::Url(url)),
            (None, Some(path)) => Ok(KeySource::File(path)),
            (None, None) => Err(ScrambleError::ConfigurationError {
                detail: "Either --url or --public-key must be specified".into(),
            }),
            (Some(_), Some(_)) => Err(ScrambleError::ConfigurationError {
                detail: "--url and --public-key are mutually exclusive".into(),
            }),
        }
    }
}

impl fmt::Display for KeySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeySource::Url(url) => write!(f, "URL {url}"),
            KeySource::File(path) => write!(f, "file {}", path.display()),
        }
    }
}
