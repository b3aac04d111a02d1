use std::fmt;
use std::str::FromStr;

use crate::core::errors::ScrambleError;

/// Archive format chosen when a folder is compressed.
///
/// Decompression never consults this; it sniffs the archive content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CompressionMethod {
    #[default]
    Zip,
    TarGz,
}

impl CompressionMethod {
    /// File suffix for archives written with this method, dot included.
    pub fn suffix(&self) -> &'static str {
        match self {
            CompressionMethod::Zip => ".zip",
            CompressionMethod::TarGz => ".tar.gz",
        }
    }
}

impl FromStr for CompressionMethod {
    type Err = ScrambleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "zip" => Ok(CompressionMethod::Zip),
            "tar.gz" => Ok(CompressionMethod::TarGz),
            other => Err(ScrambleError::UnsupportedMethod {
                method: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for CompressionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompressionMethod::Zip => f.write_str("zip"),
            CompressionMethod::TarGz => f.write_str("tar.gz"),
        }
    }
}
