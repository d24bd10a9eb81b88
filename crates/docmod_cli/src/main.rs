//! docmod CLI
//!
//! Command-line tools for building and inspecting update commands.
//!
//! # Commands
//!
//! - `build` - Validate modifiers against a schema and print the command
//! - `operators` - List field types and the operators they accept
//! - `version` - Show version information

mod commands;
mod error;
mod schema;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

/// Update-command tooling for typed document stores.
#[derive(Parser)]
#[command(name = "docmod")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(global = true, short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build an update against a schema without sending it
    Build(commands::build::BuildArgs),

    /// List field types and the operators they accept
    Operators {
        /// Only show operators available at this server version
        #[arg(long, value_name = "X.Y.Z")]
        server_version: Option<String>,
    },

    /// Show version information
    Version,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Build(args) => commands::build::run(&args)?,
        Commands::Operators { server_version } => {
            commands::operators::run(server_version.as_deref())?;
        }
        Commands::Version => {
            println!("docmod CLI v{}", env!("CARGO_PKG_VERSION"));
            println!("docmod core v{}", docmod_core::VERSION);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use commands::build::OutputFormat;

    #[test]
    fn parses_build_arguments() {
        let cli = Cli::try_parse_from([
            "docmod",
            "build",
            "--schema",
            "schema.json",
            "--set",
            "name=\"bob\"",
            "--set",
            "age=3",
            "--push-all",
            "tags=[\"a\",\"b\"]",
            "--pop-first",
            "queue",
            "--upsert",
            "--format",
            "cbor",
            "-v",
        ])
        .unwrap();

        assert!(cli.verbose);
        match cli.command {
            Commands::Build(args) => {
                assert_eq!(args.set, vec!["name=\"bob\"", "age=3"]);
                assert_eq!(args.push_all.len(), 1);
                assert_eq!(args.pop_first, vec!["queue"]);
                assert!(args.upsert);
                assert!(!args.multi);
                assert_eq!(args.format, OutputFormat::Cbor);
            }
            _ => panic!("expected build"),
        }
    }

    #[test]
    fn build_requires_schema() {
        assert!(Cli::try_parse_from(["docmod", "build", "--set", "a=1"]).is_err());
    }

    #[test]
    fn parses_operators_filter() {
        let cli =
            Cli::try_parse_from(["docmod", "operators", "--server-version", "1.2"]).unwrap();
        match cli.command {
            Commands::Operators { server_version } => {
                assert_eq!(server_version.as_deref(), Some("1.2"));
            }
            _ => panic!("expected operators"),
        }
    }
}
