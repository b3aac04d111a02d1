//! File-backed stand-in for gpg used by service tests.
//!
//! Key blobs are lines of `FAKEKEY PUB <fpr>` or `FAKEKEY SEC <fpr>`.
//! Ciphertext is a `FAKEPGP <fpr>` header line followed by the plaintext.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::core::errors::{Result, ScrambleError};
use crate::core::models::fingerprint::{Fingerprint, KeyKind, KeyListing};
use crate::core::traits::keyring::KeyringEngine;

const KEYRING: &str = "keyring.txt";

pub fn public_key_blob(fpr: &str) -> Vec<u8> {
    format!("FAKEKEY PUB {fpr}\n").into_bytes()
}

pub fn secret_key_blob(fpr: &str) -> Vec<u8> {
    format!("FAKEKEY SEC {fpr}\n").into_bytes()
}

pub struct MemoryEngine {
    home: PathBuf,
    fail_encrypt: bool,
    releases: Arc<AtomicUsize>,
}

impl MemoryEngine {
    pub fn new(home: &Path) -> Self {
        Self {
            home: home.to_path_buf(),
            fail_encrypt: false,
            releases: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn failing_encrypt(home: &Path) -> Self {
        Self {
            fail_encrypt: true,
            ..Self::new(home)
        }
    }

    pub fn counting_releases(home: &Path, releases: Arc<AtomicUsize>) -> Self {
        Self {
            releases,
            ..Self::new(home)
        }
    }

    fn keyring(&self) -> Vec<(String, String)> {
        fs::read_to_string(self.home.join(KEYRING))
            .unwrap_or_default()
            .lines()
            .filter_map(|l| l.split_once(' '))
            .map(|(k, f)| (k.to_string(), f.to_string()))
            .collect()
    }

    fn holds(&self, record: &str, fpr: &str) -> bool {
        self.keyring().iter().any(|(k, f)| k == record && f == fpr)
    }
}

impl KeyringEngine for MemoryEngine {
    fn import(&self, key_data: &[u8]) -> Result<Vec<Fingerprint>> {
        let text = String::from_utf8_lossy(key_data);
        let mut ring = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.home.join(KEYRING))?;
        let mut imported = Vec::new();

        for line in text.lines() {
            let mut parts = line.split_whitespace();
            let (Some("FAKEKEY"), Some(kind), Some(fpr)) = (parts.next(), parts.next(), parts.next())
            else {
                continue;
            };
            match kind {
                "PUB" => writeln!(ring, "pub {fpr}")?,
                "SEC" => writeln!(ring, "pub {fpr}\nsec {fpr}")?,
                _ => continue,
            }
            imported.push(Fingerprint::new(fpr));
        }

        Ok(imported)
    }

    fn list(&self, kind: KeyKind) -> Result<Vec<KeyListing>> {
        let record = match kind {
            KeyKind::Public => "pub",
            KeyKind::Private => "sec",
        };
        Ok(self
            .keyring()
            .into_iter()
            .filter(|(k, _)| k == record)
            .map(|(_, f)| KeyListing {
                fingerprint: Fingerprint::new(f),
                kind,
                created_at: None,
            })
            .collect())
    }

    fn encrypt_to(&self, input: &Path, output: &Path, recipient: &Fingerprint) -> Result<()> {
        if self.fail_encrypt {
            fs::write(output, b"partial")?;
            return Err(ScrambleError::EncryptionFailed {
                reason: "engine refused".into(),
            });
        }
        let mut data = format!("FAKEPGP {recipient}\n").into_bytes();
        data.extend(fs::read(input)?);
        fs::write(output, data)?;
        Ok(())
    }

    fn decrypt_from(&self, input: &Path, output: &Path) -> Result<()> {
        let data = fs::read(input)?;
        // Written before the key check to mimic an engine that fails midway.
        fs::write(output, b"partial")?;

        let header_end = data.iter().position(|b| *b == b'\n').unwrap_or(data.len());
        let header = String::from_utf8_lossy(&data[..header_end]);
        let fpr = header.strip_prefix("FAKEPGP ").unwrap_or_default();

        if fpr.is_empty() || !self.holds("sec", fpr) {
            return Err(ScrambleError::DecryptionFailed {
                reason: "no secret key".into(),
            });
        }

        fs::write(output, &data[(header_end + 1).min(data.len())..])?;
        Ok(())
    }

    fn release(&self) {
        self.releases.fetch_add(1, Ordering::SeqCst);
    }

    fn name(&self) -> &str {
        "memory"
    }
}
