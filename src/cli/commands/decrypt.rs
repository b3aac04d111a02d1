use std::path::Path;

use crate::cli::DecryptArgs;
use crate::cli::output;
use crate::config::app_config::AppConfig;
use crate::core::errors::{PipelineError, Stage, at};
use crate::core::services::pipeline::DecryptRequest;

/// Execute the `jibberscramble decrypt` command.
pub fn execute(
    args: &DecryptArgs,
    config_path: Option<&Path>,
    gnupghome: Option<&Path>,
) -> Result<(), PipelineError> {
    let config = AppConfig::load(config_path).map_err(at(Stage::Configure))?;
    let pipeline = super::gpg_pipeline(&config, gnupghome).map_err(at(Stage::Configure))?;

    let request = DecryptRequest {
        private_key: args.private_key.clone(),
        ciphertext: args.file.clone(),
        output_dir: args.output_dir.clone(),
    };

    let sp = output::spinner(&format!("Decrypting {}...", args.file.display()));
    match pipeline.decrypt(&request) {
        Ok(report) => {
            output::finish_spinner(sp, &format!("Decrypted {}", args.file.display()));
            output::detail(&format!("Key:    {}", report.fingerprint));
            output::detail(&format!("Output: {}", report.output_dir.display()));
            Ok(())
        }
        Err(e) => {
            output::abandon_spinner(sp);
            Err(e)
        }
    }
}
