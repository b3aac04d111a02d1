use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};
use tempfile::TempPath;

use crate::adapters::http::link_resolver::LinkResolver;
use crate::core::errors::{PipelineError, Result, ScrambleError, Stage, at};
use crate::core::models::compression::CompressionMethod;
use crate::core::models::fingerprint::{Fingerprint, KeyKind};
use crate::core::models::key_source::KeySource;
use crate::core::services::archiver::Archiver;
use crate::core::services::cipher_engine::CipherEngine;
use crate::core::services::keystore::{self, Keystore};
use crate::core::traits::keyring::KeyringEngine;

/// Inputs of one encrypt run.
#[derive(Debug, Clone)]
pub struct EncryptRequest {
    pub key_source: KeySource,
    pub folder: PathBuf,
    pub compression: CompressionMethod,
    /// Final location for the ciphertext; left next to the archive if unset.
    pub output: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct EncryptReport {
    pub fingerprint: Fingerprint,
    pub ciphertext: PathBuf,
    /// Lowercase hex SHA-256 of the ciphertext.
    pub sha256: String,
}

/// Inputs of one decrypt run.
#[derive(Debug, Clone)]
pub struct DecryptRequest {
    pub private_key: PathBuf,
    pub ciphertext: PathBuf,
    /// Defaults to the ciphertext's directory.
    pub output_dir: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct DecryptReport {
    pub fingerprint: Fingerprint,
    pub output_dir: PathBuf,
}

/// Runs the encrypt and decrypt flows end to end.
///
/// Stages run strictly in order and the first failure ends the run. Every
/// run gets its own keystore session; transient archives are removed
/// before a run returns, on success and on failure alike.
pub struct Pipeline<E: KeyringEngine> {
    keystore_home: Option<PathBuf>,
    resolver: LinkResolver,
    scratch_dir: PathBuf,
    bind_engine: Box<dyn Fn(&Path) -> E>,
}

impl<E: KeyringEngine> Pipeline<E> {
    /// `bind_engine` creates the keyring engine for each run's storage dir.
    pub fn new(bind_engine: impl Fn(&Path) -> E + 'static) -> Self {
        Self {
            keystore_home: None,
            resolver: LinkResolver::default(),
            scratch_dir: std::env::temp_dir(),
            bind_engine: Box::new(bind_engine),
        }
    }

    /// Use a persistent keystore directory instead of a temporary one.
    pub fn keystore_home(mut self, home: Option<PathBuf>) -> Self {
        self.keystore_home = home;
        self
    }

    pub fn resolver(mut self, resolver: LinkResolver) -> Self {
        self.resolver = resolver;
        self
    }

    /// Directory for transient archives and decrypted temporaries.
    #[cfg(test)]
    pub fn scratch_dir(mut self, dir: PathBuf) -> Self {
        self.scratch_dir = dir;
        self
    }

    fn open_keystore(&self) -> Result<Keystore<E>> {
        Keystore::open(self.keystore_home.as_deref(), |home: &Path| (self.bind_engine)(home))
    }

    fn acquire_key(&self, source: &KeySource) -> Result<Vec<u8>> {
        match source {
            KeySource::Url(url) => {
                tracing::info!(url, "resolving key link");
                let target = self.resolver.resolve_indirection(url)?;
                let text = self.resolver.fetch_text(&target)?;
                tracing::info!(resolved = %target, "fetched key");
                Ok(text.into_bytes())
            }
            KeySource::File(path) => {
                tracing::info!(path = %path.display(), "reading key file");
                keystore::read_key_file(path)
            }
        }
    }

    fn log_imported(keystore: &Keystore<E>, fingerprint: &Fingerprint, kind: KeyKind) {
        match keystore.find_key(fingerprint, kind) {
            Ok(Some(listing)) => tracing::info!(key = %listing, "imported key"),
            Ok(None) => tracing::info!(%fingerprint, "imported key"),
            Err(e) => tracing::debug!(error = %e, "could not list imported key"),
        }
    }

    /// AcquireKey → ImportKey → Compress → Encrypt (→ Deliver).
    pub fn encrypt(&self, request: &EncryptRequest) -> std::result::Result<EncryptReport, PipelineError> {
        tracing::info!(folder = %request.folder.display(), "starting encryption");

        let key_data = self
            .acquire_key(&request.key_source)
            .map_err(at(Stage::AcquireKey))?;

        let keystore = self.open_keystore().map_err(at(Stage::ImportKey))?;
        let fingerprint = keystore
            .import_key_material(&key_data)
            .map_err(at(Stage::ImportKey))?;
        Self::log_imported(&keystore, &fingerprint, KeyKind::Public);

        let archive = Archiver::new(self.scratch_dir.clone())
            .compress(&request.folder, request.compression)
            .map_err(at(Stage::Compress))?;
        tracing::info!(archive = %archive.display(), "compressed folder");

        let encrypted = CipherEngine::new(&keystore, self.scratch_dir.clone())
            .encrypt(&archive, &fingerprint);
        release_artifact(archive, "compressed archive");
        // Removed again unless the run reaches the end.
        let pending = TempPath::from_path(encrypted.map_err(at(Stage::Encrypt))?);
        tracing::info!(ciphertext = %pending.display(), "encrypted archive");

        let sha256 = file_sha256(&pending).map_err(at(Stage::Deliver))?;
        let ciphertext = match &request.output {
            Some(dest) => {
                let delivered = deliver(pending, dest).map_err(at(Stage::Deliver))?;
                tracing::info!(ciphertext = %delivered.display(), "moved ciphertext");
                delivered
            }
            None => pending
                .keep()
                .map_err(|e| ScrambleError::from(e.error))
                .map_err(at(Stage::Deliver))?,
        };

        Ok(EncryptReport {
            fingerprint,
            ciphertext,
            sha256,
        })
    }

    /// ImportKey → Decrypt → Decompress.
    pub fn decrypt(&self, request: &DecryptRequest) -> std::result::Result<DecryptReport, PipelineError> {
        tracing::info!(file = %request.ciphertext.display(), "starting decryption");

        let keystore = self.open_keystore().map_err(at(Stage::ImportKey))?;
        let fingerprint = keystore
            .import_key_from_file(&request.private_key)
            .map_err(at(Stage::ImportKey))?;
        match keystore.validate_fingerprint(&fingerprint, KeyKind::Private) {
            Ok(true) => Self::log_imported(&keystore, &fingerprint, KeyKind::Private),
            Ok(false) => tracing::warn!(
                %fingerprint,
                "imported key has no secret part; decryption will likely fail"
            ),
            Err(e) => tracing::warn!(error = %e, "could not check imported key"),
        }

        let plaintext = CipherEngine::new(&keystore, self.scratch_dir.clone())
            .decrypt(&request.ciphertext)
            .map_err(at(Stage::Decrypt))?;
        tracing::info!(plaintext = %plaintext.display(), "decrypted to temporary file");

        let output_dir = request
            .output_dir
            .clone()
            .unwrap_or_else(|| default_output_dir(&request.ciphertext));
        let extracted = Archiver::new(self.scratch_dir.clone()).decompress(&plaintext, &output_dir);
        release_artifact(plaintext, "decrypted archive");
        let output_dir = extracted.map_err(at(Stage::Decompress))?;
        tracing::info!(output = %output_dir.display(), "decompressed content");

        Ok(DecryptReport {
            fingerprint,
            output_dir,
        })
    }
}

/// Delete a transient artifact now, logging rather than failing.
fn release_artifact(artifact: TempPath, what: &str) {
    let path = artifact.to_path_buf();
    if let Err(e) = artifact.close() {
        tracing::warn!(path = %path.display(), error = %e, "could not remove {what}");
    }
}

/// Parent directory of `ciphertext`, or the current directory.
fn default_output_dir(ciphertext: &Path) -> PathBuf {
    match ciphertext.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// Move `ciphertext` to `dest` (or into it, if `dest` is a directory).
///
/// On failure nothing is left behind: neither the scratch ciphertext nor
/// a partial copy at the destination.
fn deliver(ciphertext: TempPath, dest: &Path) -> Result<PathBuf> {
    let target = match (dest.is_dir(), ciphertext.file_name()) {
        (true, Some(name)) => dest.join(name),
        _ => dest.to_path_buf(),
    };

    if fs::rename(&ciphertext, &target).is_ok() {
        // The scratch path is gone; nothing left to remove.
        let _ = ciphertext.keep();
        return Ok(target);
    }

    // Across filesystems rename fails; copy then drop the original.
    if let Err(e) = fs::copy(&ciphertext, &target) {
        let _ = fs::remove_file(&target);
        return Err(e.into());
    }
    release_artifact(ciphertext, "scratch ciphertext");
    Ok(target)
}

fn file_sha256(path: &Path) -> Result<String> {
    let mut hasher = Sha256::new();
    io::copy(&mut File::open(path)?, &mut hasher)?;
    Ok(format!("{:x}", hasher.finalize()))
}
