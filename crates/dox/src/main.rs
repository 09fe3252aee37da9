//! dox CLI - publish directive-annotated markdown to Confluence.
//!
//! Provides commands for:
//! - `publish`: Stub and sync every source document in the repository
//! - `list`: Show discovered sources with their identities and flags

mod commands;
mod error;
mod output;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{ListArgs, PublishArgs};
use output::Output;

/// dox - publish markdown documentation to Confluence.
#[derive(Parser)]
#[command(name = "dox", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Publish all source documents to Confluence.
    Publish(PublishArgs),
    /// List source documents without contacting Confluence.
    List(ListArgs),
}

fn main() {
    let cli = Cli::parse();
    let output = Output::new();

    // --verbose enables INFO level, otherwise RUST_LOG decides
    let verbose = matches!(&cli.command, Commands::Publish(args) if args.verbose);
    let filter = if verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Publish(args) => args.execute(),
        Commands::List(args) => args.execute(),
    };

    if let Err(err) = result {
        output.error(&format!("Error: {err}"));
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_publish_flags() {
        let cli =
            Cli::try_parse_from(["dox", "publish", "-n", "-v", "--repo", "/tmp/repo"]).unwrap();
        let Commands::Publish(args) = cli.command else {
            panic!("expected publish");
        };
        assert!(args.verbose);
    }
}
