use std::path::Path;

use crate::cli::EncryptArgs;
use crate::cli::output;
use crate::config::app_config::AppConfig;
use crate::core::errors::{PipelineError, Stage, at};
use crate::core::models::compression::CompressionMethod;
use crate::core::models::key_source::KeySource;
use crate::core::services::pipeline::EncryptRequest;

/// Execute the `jibberscramble encrypt` command.
///
/// The key source is checked before anything touches the disk or network.
pub fn execute(
    args: &EncryptArgs,
    config_path: Option<&Path>,
    gnupghome: Option<&Path>,
) -> Result<(), PipelineError> {
    let key_source = KeySource::from_options(args.url.clone(), args.public_key.clone())
        .map_err(at(Stage::Configure))?;
    let config = AppConfig::load(config_path).map_err(at(Stage::Configure))?;
    let compression = match &args.compression {
        Some(method) => method.parse::<CompressionMethod>(),
        None => config.compression(),
    }
    .map_err(at(Stage::Configure))?;
    let pipeline = super::gpg_pipeline(&config, gnupghome).map_err(at(Stage::Configure))?;

    let request = EncryptRequest {
        key_source,
        folder: args.folder.clone(),
        compression,
        output: args.output.clone(),
    };

    let sp = output::spinner(&format!(
        "Encrypting {} ({compression})...",
        args.folder.display()
    ));
    match pipeline.encrypt(&request) {
        Ok(report) => {
            output::finish_spinner(sp, &format!("Encrypted {}", args.folder.display()));
            output::detail(&format!("Recipient: {}", report.fingerprint));
            output::detail(&format!("Output:    {}", report.ciphertext.display()));
            output::detail(&format!("SHA-256:   {}", report.sha256));
            Ok(())
        }
        Err(e) => {
            output::abandon_spinner(sp);
            Err(e)
        }
    }
}
