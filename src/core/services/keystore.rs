use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use crate::core::errors::{Result, ScrambleError};
use crate::core::models::fingerprint::{Fingerprint, KeyKind, KeyListing};
use crate::core::traits::keyring::KeyringEngine;

/// Storage directory of a keystore session.
enum StorageDir {
    /// Created for this session; removed with it.
    Owned(TempDir),
    /// Supplied by the caller; never removed.
    Borrowed(PathBuf),
}

impl StorageDir {
    fn path(&self) -> &Path {
        match self {
            StorageDir::Owned(dir) => dir.path(),
            StorageDir::Borrowed(path) => path,
        }
    }
}

/// Imports and looks up keys through a `KeyringEngine` bound to one
/// storage directory.
///
/// When no directory is supplied a fresh private one is created, and it
/// is erased together with every imported key when the keystore is
/// dropped, whichever way the run ends. Teardown errors are ignored.
pub struct Keystore<E: KeyringEngine> {
    engine: E,
    storage: StorageDir,
}

impl<E: KeyringEngine> Keystore<E> {
    /// Open a keystore session, binding an engine to its directory.
    pub fn open(storage_dir: Option<&Path>, bind: impl FnOnce(&Path) -> E) -> Result<Self> {
        let storage = match storage_dir {
            Some(dir) => {
                ensure_dir(dir)?;
                StorageDir::Borrowed(dir.to_path_buf())
            }
            None => {
                let dir = tempfile::Builder::new()
                    .prefix("jibberscramble-keys-")
                    .tempdir()
                    .map_err(|e| ScrambleError::StorageError {
                        path: std::env::temp_dir(),
                        reason: e.to_string(),
                    })?;
                StorageDir::Owned(dir)
            }
        };

        let engine = bind(storage.path());
        let keystore = Self { engine, storage };
        tracing::debug!(
            dir = %keystore.storage_dir().display(),
            owned = keystore.owns_storage(),
            engine = keystore.engine.name(),
            "opened keystore"
        );
        Ok(keystore)
    }

    pub fn storage_dir(&self) -> &Path {
        self.storage.path()
    }

    /// Whether the storage directory goes away with this keystore.
    pub fn owns_storage(&self) -> bool {
        matches!(self.storage, StorageDir::Owned(_))
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Import one key and return its fingerprint.
    ///
    /// If the blob holds several keys only the first reported fingerprint
    /// is returned.
    pub fn import_key_material(&self, key_data: &[u8]) -> Result<Fingerprint> {
        let fingerprints = self.engine.import(key_data)?;
        let mut iter = fingerprints.into_iter();
        let first = iter.next().ok_or_else(|| ScrambleError::InvalidKeyFormat {
            detail: "no key could be imported from the supplied data".into(),
        })?;

        let others = iter.filter(|f| *f != first).count();
        if others > 0 {
            tracing::debug!(fingerprint = %first, ignored = others, "using first imported key");
        }

        Ok(first)
    }

    /// Read a key file and import it.
    pub fn import_key_from_file(&self, path: &Path) -> Result<Fingerprint> {
        let key_data = read_key_file(path)?;
        self.import_key_material(&key_data)
    }

    /// Listing entry for `fingerprint` among keys of `kind`, exact match only.
    pub fn find_key(&self, fingerprint: &Fingerprint, kind: KeyKind) -> Result<Option<KeyListing>> {
        Ok(self
            .engine
            .list(kind)?
            .into_iter()
            .find(|k| k.fingerprint == *fingerprint))
    }

    /// Check that a key with exactly this fingerprint and kind is held.
    pub fn validate_fingerprint(&self, fingerprint: &Fingerprint, kind: KeyKind) -> Result<bool> {
        Ok(self.find_key(fingerprint, kind)?.is_some())
    }
}

impl<E: KeyringEngine> Drop for Keystore<E> {
    fn drop(&mut self) {
        if let StorageDir::Owned(dir) = &self.storage {
            self.engine.release();
            tracing::debug!(dir = %dir.path().display(), "removing keystore directory");
        }
        // The TempDir field removes the directory after this returns.
    }
}

/// Read raw key material from a file.
pub fn read_key_file(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => ScrambleError::KeyFileNotFound {
            path: path.to_path_buf(),
        },
        _ => ScrambleError::KeyReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        },
    })
}

/// Create a caller-supplied storage directory if it does not exist yet.
fn ensure_dir(dir: &Path) -> Result<()> {
    if dir.is_dir() {
        return Ok(());
    }

    let mut builder = fs::DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(0o700);
    }

    builder
        .create(dir)
        .map_err(|e| ScrambleError::StorageError {
            path: dir.to_path_buf(),
            reason: e.to_string(),
        })
}
