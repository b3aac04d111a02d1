use std::path::Path;

use crate::core::errors::Result;
use crate::core::models::fingerprint::{Fingerprint, KeyKind, KeyListing};

/// Port for the OpenPGP engine that holds key material and does the
/// actual cryptography.
///
/// Implementations live in `adapters::engine` (e.g. GpgEngine). An engine
/// instance is bound to one storage directory for its whole life.
pub trait KeyringEngine: Send + Sync {
    /// Import key material, returning the fingerprints the engine reports
    /// in order. An empty list means nothing was imported.
    fn import(&self, key_data: &[u8]) -> Result<Vec<Fingerprint>>;

    /// List the keys of one kind currently held.
    fn list(&self, kind: KeyKind) -> Result<Vec<KeyListing>>;

    /// Encrypt `input` to `recipient`, writing ciphertext to `output`.
    /// The recipient is always trusted.
    fn encrypt_to(&self, input: &Path, output: &Path, recipient: &Fingerprint) -> Result<()>;

    /// Decrypt `input` with whatever secret key is held, writing to `output`.
    fn decrypt_from(&self, input: &Path, output: &Path) -> Result<()>;

    /// Stop any helper processes bound to the storage directory.
    /// Called before an owned directory is removed; must not fail.
    fn release(&self) {}

    /// Human-readable name of this engine (e.g. "gpg").
    fn name(&self) -> &str;
}
