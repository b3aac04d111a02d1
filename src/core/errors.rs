use std::fmt;
use std::path::PathBuf;

/// All domain errors for jibberscramble.
///
/// Each variant names the failing input so a single log line is enough
/// to diagnose the issue.
#[derive(Debug, thiserror::Error)]
pub enum ScrambleError {
    #[error("Failed to resolve URL {url}: {reason}")]
    ResolutionError { url: String, reason: String },

    #[error("Failed to fetch {url}: {reason}")]
    FetchError { url: String, reason: String },

    #[error("Invalid GPG key format: {detail}")]
    InvalidKeyFormat { detail: String },

    #[error("Key file not found: {path}")]
    KeyFileNotFound { path: PathBuf },

    #[error("Failed to read key file {path}: {reason}")]
    KeyReadError { path: PathBuf, reason: String },

    #[error("Keystore directory {path} is unusable: {reason}")]
    StorageError { path: PathBuf, reason: String },

    #[error("Path {path} is not a directory")]
    NotADirectory { path: PathBuf },

    #[error("Unsupported compression method: '{method}'. Use 'zip' or 'tar.gz'.")]
    UnsupportedMethod { method: String },

    #[error("Unsupported archive format: {path} (unknown file signature)")]
    UnrecognizedFormat { path: PathBuf },

    #[error("Path {path} is not a file")]
    NotAFile { path: PathBuf },

    #[error("Invalid public key fingerprint: {fingerprint}")]
    UnknownRecipient { fingerprint: String },

    #[error("Encryption failed: {reason}")]
    EncryptionFailed { reason: String },

    #[error("Decryption failed: {reason}")]
    DecryptionFailed { reason: String },

    #[error("Invalid configuration: {detail}")]
    ConfigurationError { detail: String },

    #[error("Keystore engine error: {reason}")]
    EngineError { reason: String },

    #[error("Archive error in {path}: {reason}")]
    ArchiveError { path: PathBuf, reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, ScrambleError>;

/// One step of an encrypt or decrypt run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Configure,
    AcquireKey,
    ImportKey,
    Compress,
    Encrypt,
    Decrypt,
    Decompress,
    Deliver,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Configure => "configure",
            Stage::AcquireKey => "acquire-key",
            Stage::ImportKey => "import-key",
            Stage::Compress => "compress",
            Stage::Encrypt => "encrypt",
            Stage::Decrypt => "decrypt",
            Stage::Decompress => "decompress",
            Stage::Deliver => "deliver",
        };
        f.write_str(name)
    }
}

/// A failed pipeline run: the stage that aborted it and its cause.
#[derive(Debug, thiserror::Error)]
#[error("{stage} failed: {error}")]
pub struct PipelineError {
    pub stage: Stage,
    #[source]
    pub error: ScrambleError,
}

impl PipelineError {
    pub fn new(stage: Stage, error: ScrambleError) -> Self {
        Self { stage, error }
    }
}

/// Attach a stage to a domain error: `.map_err(at(Stage::Compress))`.
pub fn at(stage: Stage) -> impl FnOnce(ScrambleError) -> PipelineError {
    move |error| PipelineError::new(stage, error)
}
