use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::adapters::http::link_resolver::DEFAULT_TIMEOUT;
use crate::core::errors::{Result, ScrambleError};
use crate::core::models::compression::CompressionMethod;

/// Top-level configuration read from `config.toml`.
///
/// Every section is optional; missing values fall back to defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    #[serde(default)]
    pub keystore: KeystoreSection,
    #[serde(default)]
    pub network: NetworkSection,
    #[serde(default)]
    pub archive: ArchiveSection,
}

impl AppConfig {
    /// Load the configuration.
    ///
    /// An explicit path must exist. Without one, the per-user file is read
    /// when present; otherwise defaults are used.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => {
                if !path.is_file() {
                    return Err(ScrambleError::ConfigurationError {
                        detail: format!("config file {} not found", path.display()),
                    });
                }
                Self::from_file(path)
            }
            None => match default_config_path() {
                Some(path) if path.is_file() => Self::from_file(&path),
                _ => Ok(Self::default()),
            },
        }
    }

    /// Parse and validate a config file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config = Self::parse(&content).map_err(|e| match e {
            ScrambleError::ConfigurationError { detail } => ScrambleError::ConfigurationError {
                detail: format!("{}: {detail}", path.display()),
            },
            other => other,
        })?;
        tracing::debug!(path = %path.display(), "loaded configuration");
        Ok(config)
    }

    fn parse(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).map_err(|e| ScrambleError::ConfigurationError {
            detail: format!("Failed to parse config: {e}"),
        })?;

        if config.network.timeout_secs == 0 {
            return Err(ScrambleError::ConfigurationError {
                detail: "network.timeout_secs must be greater than zero".into(),
            });
        }
        if let Some(method) = &config.archive.compression {
            method.parse::<CompressionMethod>()?;
        }

        Ok(config)
    }

    /// Network timeout for link resolution.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.network.timeout_secs)
    }

    /// Default compression method for `encrypt`.
    pub fn compression(&self) -> Result<CompressionMethod> {
        match &self.archive.compression {
            Some(method) => method.parse(),
            None => Ok(CompressionMethod::default()),
        }
    }
}

/// `<user config dir>/jibberscramble/config.toml`, if the platform has one.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("jibberscramble").join("config.toml"))
}

/// The `[keystore]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct KeystoreSection {
    /// Persistent keystore directory. A temporary one is used when unset.
    pub home: Option<PathBuf>,
    #[serde(default = "default_gpg_binary")]
    pub gpg_binary: PathBuf,
}

impl Default for KeystoreSection {
    fn default() -> Self {
        Self {
            home: None,
            gpg_binary: default_gpg_binary(),
        }
    }
}

fn default_gpg_binary() -> PathBuf {
    PathBuf::from("gpg")
}

/// The `[network]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NetworkSection {
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for NetworkSection {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT.as_secs()
}

/// The `[archive]` section.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ArchiveSection {
    /// `zip` or `tar.gz`.
    pub compression: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        let config = AppConfig::parse("").unwrap();
        assert_eq!(config.timeout(), Duration::from_secs(10));
        assert_eq!(config.compression().unwrap(), CompressionMethod::Zip);
        assert_eq!(config.keystore.gpg_binary, PathBuf::from("gpg"));
        assert!(config.keystore.home.is_none());
    }

    #[test]
    fn full_file_is_read() {
        let config = AppConfig::parse(
            r#"
            [keystore]
            home = "/var/lib/jibberscramble/gnupg"
            gpg_binary = "/usr/local/bin/gpg2"

            [network]
            timeout_secs = 3

            [archive]
            compression = "tar.gz"
            "#,
        )
        .unwrap();
        assert_eq!(
            config.keystore.home.as_deref(),
            Some(Path::new("/var/lib/jibberscramble/gnupg"))
        );
        assert_eq!(config.keystore.gpg_binary, PathBuf::from("/usr/local/bin/gpg2"));
        assert_eq!(config.timeout(), Duration::from_secs(3));
        assert_eq!(config.compression().unwrap(), CompressionMethod::TarGz);
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let err = AppConfig::parse("[network]\ntimeout_secs = 0\n").unwrap_err();
        assert!(matches!(err, ScrambleError::ConfigurationError { .. }));
    }

    #[test]
    fn unknown_compression_is_rejected() {
        let err = AppConfig::parse("[archive]\ncompression = \"rar\"\n").unwrap_err();
        assert!(matches!(err, ScrambleError::UnsupportedMethod { .. }));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = AppConfig::parse("[keystore]\nhomedir = \"/tmp\"\n").unwrap_err();
        assert!(matches!(err, ScrambleError::ConfigurationError { .. }));
    }

    #[test]
    fn explicit_missing_file_is_configuration_error() {
        let err = AppConfig::load(Some(Path::new("/nonexistent/config.toml"))).unwrap_err();
        assert!(matches!(err, ScrambleError::ConfigurationError { .. }));
    }

    #[test]
    fn explicit_file_is_loaded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[network]\ntimeout_secs = 7\n").unwrap();
        let config = AppConfig::load(Some(&path)).unwrap();
        assert_eq!(config.timeout(), Duration::from_secs(7));
    }
}
