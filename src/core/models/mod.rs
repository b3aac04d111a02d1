pub mod compression;
pub mod fingerprint;
pub mod key_source;
