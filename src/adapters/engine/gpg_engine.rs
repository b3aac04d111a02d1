use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};
use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;

use crate::core::errors::{Result, ScrambleError};
use crate::core::models::fingerprint::{Fingerprint, KeyKind, KeyListing};
use crate::core::traits::keyring::KeyringEngine;

/// `[GNUPG:] IMPORT_OK <flags> <fingerprint>` status line.
static IMPORT_OK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\[GNUPG:\] IMPORT_OK \d+ ([0-9A-Fa-f]+)\s*$").expect("static regex")
});

/// Keystore engine that shells out to the system `gpg` binary.
///
/// Every invocation is pinned to one home directory with `--homedir`,
/// so the user's own keyring is never touched.
pub struct GpgEngine {
    /// Path to the gpg binary (defaults to "gpg").
    gpg_path: PathBuf,
    /// Keyring directory this engine is bound to.
    home: PathBuf,
}

impl GpgEngine {
    /// Bind the default `gpg` binary to `home`.
    #[cfg(test)]
    pub fn new(home: &Path) -> Self {
        Self::with_path(PathBuf::from("gpg"), home)
    }

    /// Bind a custom gpg binary to `home`.
    pub fn with_path(gpg_path: PathBuf, home: &Path) -> Self {
        Self {
            gpg_path,
            home: home.to_path_buf(),
        }
    }

    /// Check if the gpg binary can be run.
    pub fn is_available(gpg_path: &Path) -> bool {
        Command::new(gpg_path)
            .arg("--version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .is_ok_and(|s| s.success())
    }

    /// Base command with the flags shared by every call.
    fn command(&self) -> Command {
        let mut cmd = Command::new(&self.gpg_path);
        cmd.arg("--homedir")
            .arg(&self.home)
            .args(["--batch", "--no-tty", "--yes"]);
        cmd
    }

    /// Run a prepared command, feeding `stdin_data` if given.
    ///
    /// Only a failure to start gpg is an error here; the exit status is
    /// left to the caller.
    fn run(&self, mut cmd: Command, stdin_data: Option<&[u8]>) -> Result<Output> {
        cmd.stdin(if stdin_data.is_some() {
            Stdio::piped()
        } else {
            Stdio::null()
        })
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

        let mut child = cmd.spawn().map_err(|e| ScrambleError::EngineError {
            reason: format!("Failed to run {}: {e}", self.gpg_path.display()),
        })?;

        if let (Some(data), Some(mut stdin)) = (stdin_data, child.stdin.take()) {
            stdin
                .write_all(data)
                .map_err(|e| ScrambleError::EngineError {
                    reason: format!("Failed to write to gpg stdin: {e}"),
                })?;
        }

        child
            .wait_with_output()
            .map_err(|e| ScrambleError::EngineError {
                reason: format!("gpg process failed: {e}"),
            })
    }

    /// Fingerprints from `IMPORT_OK` status lines, in the order reported.
    fn parse_import_status(status: &str) -> Vec<Fingerprint> {
        status
            .lines()
            .filter_map(|line| IMPORT_OK.captures(line))
            .map(|caps| Fingerprint::new(caps[1].to_ascii_uppercase()))
            .collect()
    }

    /// Primary keys from `--with-colons` listing output.
    ///
    /// A `pub`/`sec` record is followed by its own `fpr` record; `fpr`
    /// records of subkeys are skipped.
    fn parse_colon_listing(listing: &str, kind: KeyKind) -> Vec<KeyListing> {
        let primary = match kind {
            KeyKind::Public => "pub",
            KeyKind::Private => "sec",
        };

        let mut keys = Vec::new();
        let mut pending: Option<Option<DateTime<Utc>>> = None;

        for line in listing.lines() {
            let fields: Vec<&str> = line.split(':').collect();
            match fields.first().copied() {
                Some(record) if record == primary => {
                    let created = fields
                        .get(5)
                        .and_then(|f| f.parse::<i64>().ok())
                        .and_then(|secs| DateTime::from_timestamp(secs, 0));
                    pending = Some(created);
                }
                Some("fpr") => {
                    if let (Some(created_at), Some(fpr)) = (pending.take(), fields.get(9)) {
                        keys.push(KeyListing {
                            fingerprint: Fingerprint::new(*fpr),
                            kind,
                            created_at,
                        });
                    }
                }
                Some("sub") | Some("ssb") => pending = None,
                _ => {}
            }
        }

        keys
    }

    fn stderr_detail(output: &Output) -> String {
        let stderr = String::from_utf8_lossy(&output.stderr);
        let trimmed = stderr.trim();
        if trimmed.is_empty() {
            format!("gpg exited with {}", output.status)
        } else {
            trimmed.to_string()
        }
    }

    /// Path of the `gpgconf` that ships next to the configured gpg.
    fn gpgconf_path(&self) -> PathBuf {
        match self.gpg_path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir.join("gpgconf"),
            _ => PathBuf::from("gpgconf"),
        }
    }
}

impl KeyringEngine for GpgEngine {
    fn import(&self, key_data: &[u8]) -> Result<Vec<Fingerprint>> {
        let mut cmd = self.command();
        cmd.args(["--status-fd", "1", "--import"]);

        let output = self.run(cmd, Some(key_data))?;
        let fingerprints = Self::parse_import_status(&String::from_utf8_lossy(&output.stdout));

        if fingerprints.is_empty() && !output.status.success() {
            tracing::debug!(detail = %Self::stderr_detail(&output), "gpg rejected key data");
        }

        Ok(fingerprints)
    }

    fn list(&self, kind: KeyKind) -> Result<Vec<KeyListing>> {
        let mut cmd = self.command();
        cmd.arg("--with-colons").arg(match kind {
            KeyKind::Public => "--list-keys",
            KeyKind::Private => "--list-secret-keys",
        });

        let output = self.run(cmd, None)?;
        if !output.status.success() {
            return Err(ScrambleError::EngineError {
                reason: format!("Listing {kind} keys failed: {}", Self::stderr_detail(&output)),
            });
        }

        Ok(Self::parse_colon_listing(
            &String::from_utf8_lossy(&output.stdout),
            kind,
        ))
    }

    fn encrypt_to(&self, input: &Path, output: &Path, recipient: &Fingerprint) -> Result<()> {
        let mut cmd = self.command();
        cmd.args(["--trust-model", "always", "--armor", "--recipient"])
            .arg(recipient.as_str())
            .arg("--output")
            .arg(output)
            .arg("--encrypt")
            .arg(input);

        let result = self.run(cmd, None)?;
        if !result.status.success() {
            return Err(ScrambleError::EncryptionFailed {
                reason: Self::stderr_detail(&result),
            });
        }
        Ok(())
    }

    fn decrypt_from(&self, input: &Path, output: &Path) -> Result<()> {
        let mut cmd = self.command();
        cmd.arg("--output").arg(output).arg("--decrypt").arg(input);

        let result = self.run(cmd, None)?;
        if !result.status.success() {
            return Err(ScrambleError::DecryptionFailed {
                reason: Self::stderr_detail(&result),
            });
        }
        Ok(())
    }

    fn release(&self) {
        let _ = Command::new(self.gpgconf_path())
            .arg("--homedir")
            .arg(&self.home)
            .args(["--kill", "all"])
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status();
    }

    fn name(&self) -> &str {
        "gpg"
    }
}
