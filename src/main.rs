mod cli;
mod server;
mod tools;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use cli::search::SearchArgs;
use cli::session::SessionAction;
use cli::track::TrackAction;
use tome::config::TomeConfig;

#[derive(Parser)]
#[command(name = "tome", version, about = "Knowledge packages for AI coding agents")]
struct Cli {
    /// Project root holding `.tome/` (defaults to the current directory)
    #[arg(long, global = true)]
    project: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Search the knowledge store
    Search(SearchArgs),
    /// List every category
    Categories,
    /// List every tag
    Tags,
    /// Rebuild the knowledge store from the vault
    Build {
        /// Ignore the fingerprint cache and re-parse every document
        #[arg(long)]
        force_rebuild: bool,
        /// Print per-file timings and cache statistics
        #[arg(long)]
        verbose: bool,
    },
    /// Inspect or modify the current session
    Session {
        #[command(subcommand)]
        action: SessionAction,
    },
    /// Load packages, skipping those already delivered this session
    Load {
        /// Comma-separated package names
        #[arg(long, value_delimiter = ',', required = true)]
        packages: Vec<String>,
        /// Tracking id from a previous search; records the read
        #[arg(long)]
        tracking_id: Option<String>,
    },
    /// Record and report knowledge usage
    Track {
        #[command(subcommand)]
        action: TrackAction,
    },
    /// Check the corpus for metadata problems
    Validate {
        /// Print counts only
        #[arg(long)]
        summary: bool,
    },
    /// Start the MCP server (stdio transport)
    Serve,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let project_root = match cli.project {
        Some(path) => path,
        None => std::env::current_dir().context("failed to read current directory")?,
    };
    let config = TomeConfig::load(&project_root)?;

    // Log to stderr so stdout stays clean for JSON output and MCP JSON-RPC.
    let filter = EnvFilter::try_new(&config.log.level).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::Search(args) => cli::search::search(&config, args)?,
        Command::Categories => cli::discover::categories(&config)?,
        Command::Tags => cli::discover::tags(&config)?,
        Command::Build {
            force_rebuild,
            verbose,
        } => cli::build::build(&config, force_rebuild, verbose)?,
        Command::Session { action } => cli::session::session(&config, action)?,
        Command::Load {
            packages,
            tracking_id,
        } => cli::load::load(&config, &packages, tracking_id.as_deref())?,
        Command::Track { action } => cli::track::track(&config, action)?,
        Command::Validate { summary } => cli::validate::validate(&config, summary)?,
        Command::Serve => server::serve_stdio(config).await?,
    }

    Ok(())
}
