pub mod decrypt;
pub mod encrypt;

use std::path::Path;

use crate::adapters::engine::gpg_engine::GpgEngine;
use crate::adapters::http::link_resolver::LinkResolver;
use crate::config::app_config::AppConfig;
use crate::core::errors::{Result, ScrambleError};
use crate::core::services::pipeline::Pipeline;

/// Build a gpg-backed pipeline from the loaded config.
///
/// `--gnupghome` wins over `[keystore] home`.
pub(crate) fn gpg_pipeline(
    config: &AppConfig,
    gnupghome: Option<&Path>,
) -> Result<Pipeline<GpgEngine>> {
    let gpg = config.keystore.gpg_binary.clone();
    if !GpgEngine::is_available(&gpg) {
        return Err(ScrambleError::EngineError {
            reason: format!("gpg binary '{}' not found or not runnable", gpg.display()),
        });
    }

    let home = gnupghome
        .map(Path::to_path_buf)
        .or_else(|| config.keystore.home.clone());
    let resolver = LinkResolver::new(config.timeout());
    tracing::debug!(
        gpg = %gpg.display(),
        home = ?home,
        timeout = ?resolver.timeout(),
        "using gpg keystore"
    );

    Ok(Pipeline::new(move |dir: &Path| GpgEngine::with_path(gpg.clone(), dir))
        .keystore_home(home)
        .resolver(resolver))
}
