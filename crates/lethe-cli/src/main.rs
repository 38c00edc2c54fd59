//! Lethe command-line tool.
//!
//! Encrypts a file under a custodian-held expiring key, decrypts it while
//! the key is still alive, and reads artifact metadata.

#![allow(clippy::print_stdout, reason = "user-facing CLI output")]
#![allow(clippy::print_stderr, reason = "user-facing CLI output")]

mod commands;
mod config;
mod error;
mod expiry;
mod fileio;
mod password;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Lethe: encryption with an expiry date
#[derive(Parser, Debug)]
#[command(name = "lethe")]
#[command(about = "Encrypt files that become permanently undecryptable after they expire")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Encrypt a file under a fresh custodian-held key
    Encrypt(EncryptArgs),
    /// Decrypt a file while its key is still alive
    Decrypt(DecryptArgs),
    /// Print the metadata embedded in an encrypted file
    Metadata(MetadataArgs),
}

#[derive(Args, Debug)]
struct EncryptArgs {
    /// Path to the input file
    #[arg(short, long)]
    input: PathBuf,

    /// Path to the output file (default: <input>.lethe)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Password to encrypt with (default: $LETHE_PASSWORD, then a prompt)
    #[arg(short, long)]
    password: Option<String>,

    /// Time until expiration (format: <n><y|mo|w|d|h|min|s>)
    #[arg(short, long, default_value = "1d")]
    expires_in: String,

    /// Custodian base URL (default: taken from the config file)
    #[arg(short, long)]
    server_address: Option<String>,

    /// Overwrite the output file if it already exists
    #[arg(short = 'w', long)]
    overwrite: bool,

    /// Never prompt; generate a password when none is supplied
    #[arg(long)]
    non_interactive: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Only report errors
    #[arg(short, long)]
    quiet: bool,
}

#[derive(Args, Debug)]
struct DecryptArgs {
    /// Path to the encrypted file
    #[arg(short, long)]
    input: PathBuf,

    /// Path to the output file (default: input without its .lethe suffix)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Password to decrypt with (default: $LETHE_PASSWORD, then a prompt)
    #[arg(short, long)]
    password: Option<String>,

    /// Custodian base URL (default: the address stored in the artifact)
    #[arg(short, long)]
    server_address: Option<String>,

    /// Overwrite the output file if it already exists
    #[arg(short = 'w', long)]
    overwrite: bool,

    /// Never prompt; fail when no password is supplied
    #[arg(long)]
    non_interactive: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Only report errors
    #[arg(short, long)]
    quiet: bool,
}

#[derive(Args, Debug)]
struct MetadataArgs {
    /// Path to the encrypted file
    #[arg(short, long)]
    input: PathBuf,
}

fn init_logging(verbose: bool, quiet: bool) {
    let level = if quiet {
        "error"
    } else if verbose {
        "debug"
    } else {
        "info"
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::registry().with(fmt::layer().without_time()).with(filter).init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Encrypt(args) => {
            init_logging(args.verbose, args.quiet);
            commands::encrypt(args)
        },
        Command::Decrypt(args) => {
            init_logging(args.verbose, args.quiet);
            commands::decrypt(args)
        },
        Command::Metadata(args) => {
            init_logging(false, false);
            commands::metadata(&args)
        },
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{e}");
            ExitCode::FAILURE
        },
    }
}
