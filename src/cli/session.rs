//! CLI `session` subcommands.

use anyhow::Result;
use clap::Subcommand;

use tome::config::TomeConfig;

#[derive(Debug, Subcommand)]
pub enum SessionAction {
    /// Start a new session, forgetting loaded packages
    Init,
    /// Mark packages as loaded
    Add {
        #[arg(value_delimiter = ',', required = true)]
        names: Vec<String>,
    },
    /// Report whether each package is loaded
    Check {
        #[arg(value_delimiter = ',', required = true)]
        names: Vec<String>,
    },
    /// Print the session state
    List,
    /// Forget loaded packages and the categories-shown flag
    Clear,
    /// Split packages into unloaded and already loaded
    Filter {
        #[arg(value_delimiter = ',', required = true)]
        names: Vec<String>,
    },
    /// Record that the category overview was shown
    MarkShown,
    /// Report whether this is the first overview of the session
    CheckShown,
}

pub fn session(config: &TomeConfig, action: SessionAction) -> Result<()> {
    let mut tracker = super::open_tracker(config)?;

    match action {
        SessionAction::Init => {
            let state = tracker.init()?;
            super::print_json(&state)?;
        }
        SessionAction::Add { names } => {
            tracker.mark_loaded(&names)?;
            println!("Marked {} package(s) as loaded", names.len());
        }
        SessionAction::Check { names } => {
            super::print_json(&tracker.check(&names)?)?;
        }
        SessionAction::List => {
            super::print_json(&tracker.snapshot()?)?;
        }
        SessionAction::Clear => {
            tracker.clear()?;
            println!("Session cleared");
        }
        SessionAction::Filter { names } => {
            super::print_json(&tracker.filter_unloaded(&names)?)?;
        }
        SessionAction::MarkShown => {
            tracker.mark_shown()?;
            println!("Categories marked as shown");
        }
        SessionAction::CheckShown => {
            let first_invocation = tracker.is_first_invocation()?;
            super::print_json(&serde_json::json!({ "first_invocation": first_invocation }))?;
        }
    }

    Ok(())
}
