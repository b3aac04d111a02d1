pub mod commands;
pub mod logging;
pub mod output;

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};

/// Encrypt a folder for transport with a GnuPG key from a file or a short link.
#[derive(Parser, Debug)]
#[command(name = "jibberscramble", version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Keystore directory (GnuPG home). A temporary one is used when unset
    #[arg(long, global = true, value_name = "DIR")]
    pub gnupghome: Option<PathBuf>,

    /// Path to alternative config file
    #[arg(long, global = true, env = "JIBBERSCRAMBLE_CONFIG", value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// More log output (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode: only show errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Log line format
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Compress and encrypt a folder
    Encrypt(EncryptArgs),

    /// Decrypt a file and extract the folder inside it
    Decrypt(DecryptArgs),
}

#[derive(Args, Debug)]
pub struct EncryptArgs {
    /// Short link (e.g. bit.ly) that leads to the public key
    #[arg(long)]
    pub url: Option<String>,

    /// Path to local public key file
    #[arg(long, value_name = "PATH")]
    pub public_key: Option<PathBuf>,

    /// Compression method (default: zip, or [archive] compression from config)
    #[arg(long, value_name = "METHOD", value_parser = ["zip", "tar.gz"])]
    pub compression: Option<String>,

    /// Where to put the encrypted file (file or directory)
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Folder to encrypt
    pub folder: PathBuf,
}

#[derive(Args, Debug)]
pub struct DecryptArgs {
    /// Path to private key file
    #[arg(long, value_name = "PATH")]
    pub private_key: PathBuf,

    /// Directory for decrypted output (default: next to the encrypted file)
    #[arg(long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Encrypted file
    pub file: PathBuf,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}
