//! Vouch CLI: command-line access to keys, credentials and sealed careers.
//!
//! Subcommands: keygen, decrypt (local), status, resolve, issue, present,
//! verify (against a running node).

mod commands;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

/// Vouch: DID-backed employment credentials.
#[derive(Parser, Debug)]
#[command(name = "vouch", version, about, long_about = None)]
struct Cli {
    /// Log requests and responses to stderr.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate a keystore (DID, address, key pair) locally.
    Keygen(commands::keygen::KeygenArgs),
    /// Open a sealed career with the holder's private key.
    Decrypt(commands::decrypt::DecryptArgs),
    /// Query the health of a running node.
    Status(commands::status::StatusArgs),
    /// Resolve a DID to its document.
    Resolve(commands::resolve::ResolveArgs),
    /// Issue a verifiable credential.
    Issue(commands::issue::IssueArgs),
    /// Wrap credentials in a verifiable presentation.
    Present(commands::present::PresentArgs),
    /// Verify a credential or presentation token.
    Verify(commands::verify::VerifyArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    match &cli.command {
        Commands::Keygen(args) => commands::keygen::run(args),
        Commands::Decrypt(args) => commands::decrypt::run(args),
        Commands::Status(args) => commands::status::run(args).await,
        Commands::Resolve(args) => commands::resolve::run(args).await,
        Commands::Issue(args) => commands::issue::run(args).await,
        Commands::Present(args) => commands::present::run(args).await,
        Commands::Verify(args) => commands::verify::run(args).await,
    }
}
