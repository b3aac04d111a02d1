use std::fmt;

use chrono::{DateTime, Utc};

/// Stable identifier of a key imported into one keystore session.
///
/// Only meaningful for the `Keystore` that returned it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fingerprint(String);

impl Fingerprint {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Which half of a key pair a lookup is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyKind {
    Public,
    Private,
}

impl fmt::Display for KeyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyKind::Public => f.write_str("public"),
            KeyKind::Private => f.write_str("private"),
        }
    }
}

/// One key as reported by the keystore engine's listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyListing {
    pub fingerprint: Fingerprint,
    pub kind: KeyKind,
    pub created_at: Option<DateTime<Utc>>,
}

impl fmt::Display for KeyListing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.created_at {
            Some(created) => write!(
                f,
                "{} {} (created {})",
                self.kind,
                self.fingerprint,
                created.format("%Y-%m-%d")
            ),
            None => write!(f, "{} {}", self.kind, self.fingerprint),
        }
    }
}
