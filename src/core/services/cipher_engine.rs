use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempPath;

use crate::core::errors::{Result, ScrambleError};
use crate::core::models::fingerprint::{Fingerprint, KeyKind};
use crate::core::services::keystore::Keystore;
use crate::core::traits::keyring::KeyringEngine;

/// Suffix appended to a file's name to form its ciphertext path.
pub const CIPHERTEXT_SUFFIX: &str = ".gpg";

/// Encrypts and decrypts single files through the engine of a `Keystore`.
pub struct CipherEngine<'k, E: KeyringEngine> {
    keystore: &'k Keystore<E>,
    /// Where decrypted temporaries are created.
    scratch_dir: PathBuf,
}

impl<'k, E: KeyringEngine> CipherEngine<'k, E> {
    pub fn new(keystore: &'k Keystore<E>, scratch_dir: PathBuf) -> Self {
        Self {
            keystore,
            scratch_dir,
        }
    }

    /// Encrypt `plaintext` to `recipient`, writing `<plaintext>.gpg`.
    ///
    /// The recipient must be a public key held by the keystore; it is
    /// trusted without any further check.
    pub fn encrypt(&self, plaintext: &Path, recipient: &Fingerprint) -> Result<PathBuf> {
        if !plaintext.is_file() {
            return Err(ScrambleError::NotAFile {
                path: plaintext.to_path_buf(),
            });
        }
        if !self.keystore.validate_fingerprint(recipient, KeyKind::Public)? {
            return Err(ScrambleError::UnknownRecipient {
                fingerprint: recipient.to_string(),
            });
        }

        let output = ciphertext_path(plaintext);
        if let Err(e) = self.keystore.engine().encrypt_to(plaintext, &output, recipient) {
            let _ = fs::remove_file(&output);
            return Err(e);
        }

        tracing::debug!(
            plaintext = %plaintext.display(),
            ciphertext = %output.display(),
            %recipient,
            "encrypted file"
        );
        Ok(output)
    }

    /// Decrypt `ciphertext` into a fresh temporary file.
    ///
    /// The returned path deletes the file when dropped; on failure the
    /// temporary is already gone.
    pub fn decrypt(&self, ciphertext: &Path) -> Result<TempPath> {
        if !ciphertext.is_file() {
            return Err(ScrambleError::NotAFile {
                path: ciphertext.to_path_buf(),
            });
        }

        let output = tempfile::Builder::new()
            .prefix("jibberscramble-")
            .tempfile_in(&self.scratch_dir)?
            .into_temp_path();

        // On error `output` is dropped here, removing any partial plaintext.
        self.keystore.engine().decrypt_from(ciphertext, &output)?;

        tracing::debug!(
            ciphertext = %ciphertext.display(),
            plaintext = %output.display(),
            "decrypted file"
        );
        Ok(output)
    }
}

/// `<path>.gpg`, keeping the full original file name.
pub fn ciphertext_path(plaintext: &Path) -> PathBuf {
    let mut name = OsString::from(plaintext.as_os_str());
    name.push(CIPHERTEXT_SUFFIX);
    PathBuf::from(name)
}
