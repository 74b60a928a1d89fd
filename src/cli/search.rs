//! CLI `search` command.

use anyhow::Result;
use clap::Args;

use tome::config::TomeConfig;
use tome::search::{self, SearchOutput, SearchQuery, SearchRequest};
use tome::session::SearchRecord;

#[derive(Debug, Args)]
pub struct SearchArgs {
    /// Comma-separated tags; any overlap matches
    #[arg(long, value_delimiter = ',')]
    pub tags: Vec<String>,
    /// Case-insensitive substring of the description
    #[arg(long)]
    pub text: Option<String>,
    /// Comma-separated category paths (exact match)
    #[arg(long)]
    pub category: Option<String>,
    /// Only packages used by this agent
    #[arg(long)]
    pub agent: Option<String>,
    /// Source file being edited; excludes other languages' standards
    #[arg(long)]
    pub file_path: Option<String>,
    #[arg(long)]
    pub max_results: Option<usize>,
    /// Named command profile from the store
    #[arg(long)]
    pub command_profile: Option<String>,
    /// Dependency expansion depth
    #[arg(long)]
    pub depth: Option<usize>,
    /// Record this search under the given tracking id
    #[arg(long)]
    pub tracking_id: Option<String>,
    /// Record this search for the named agent
    #[arg(long)]
    pub agent_name: Option<String>,
    #[arg(long)]
    pub session_id: Option<String>,
    #[arg(long)]
    pub prompt: Option<String>,
}

/// Run a search and print the JSON result envelope.
pub fn search(config: &TomeConfig, args: SearchArgs) -> Result<()> {
    let store = super::open_store(config)?;

    let request = SearchRequest {
        query: SearchQuery {
            tags: args.tags,
            text: args.text,
            category: args.category,
            agent: args.agent,
            source_file_path: args.file_path,
            max_results: args
                .max_results
                .unwrap_or(config.search.default_max_results),
        },
        command_profile: args.command_profile,
        depth: args.depth.unwrap_or(config.search.dependency_depth),
    };
    let outcome = search::execute(&store, &request)?;

    let tracking_id = if args.tracking_id.is_some() || args.agent_name.is_some() {
        let mut record = outcome.search_record(&request);
        record.tracking_id = args.tracking_id;
        record.agent_name = args.agent_name;
        record.session_id = args.session_id;
        record.prompt = args.prompt;
        track_search(config, record)
    } else {
        None
    };

    let mut output = SearchOutput::new(&request, outcome)?;
    output.tracking_id = tracking_id;

    if output.results.is_empty() {
        eprintln!("No packages matched. Suggestions:");
        for hint in &output.suggestions {
            eprintln!("  - {hint}");
        }
    }
    super::print_json(&output)
}

/// Tracking never fails a search.
fn track_search(config: &TomeConfig, record: SearchRecord) -> Option<String> {
    let mut tracker = match super::open_tracker(config) {
        Ok(tracker) => tracker,
        Err(e) => {
            tracing::error!(error = %e, "search tracking unavailable");
            return None;
        }
    };
    match tracker.record_search(record) {
        Ok(id) => Some(id),
        Err(e) => {
            tracing::error!(error = %e, "failed to record search");
            None
        }
    }
}
