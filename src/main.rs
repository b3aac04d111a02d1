mod adapters;
mod cli;
mod config;
mod core;

use clap::Parser;

use cli::{Cli, Commands};

fn main() {
    let args = match Cli::try_parse() {
        Ok(args) => args,
        Err(e) => {
            // Usage errors exit 1 like every other failure; help and version exit 0.
            let code = if e.use_stderr() { 1 } else { 0 };
            let _ = e.print();
            std::process::exit(code);
        }
    };

    cli::logging::init(args.verbose, args.quiet, args.log_format);
    cli::output::set_quiet(args.quiet);

    let config = args.config.as_deref();
    let gnupghome = args.gnupghome.as_deref();
    let result = match &args.command {
        Commands::Encrypt(encrypt) => cli::commands::encrypt::execute(encrypt, config, gnupghome),
        Commands::Decrypt(decrypt) => cli::commands::decrypt::execute(decrypt, config, gnupghome),
    };

    if let Err(e) = result {
        tracing::debug!(stage = %e.stage, error = ?e.error, "run aborted");
        cli::output::error(&e.to_string());
        std::process::exit(1);
    }
}
