//! CLI `track` subcommands: record agent decisions and report on them.

use anyhow::{anyhow, Result};
use clap::Subcommand;

use tome::config::TomeConfig;

#[derive(Debug, Subcommand)]
pub enum TrackAction {
    /// Record which packages were read
    Read {
        #[arg(long)]
        tracking_id: String,
        #[arg(long, value_delimiter = ',', required = true)]
        packages: Vec<String>,
    },
    /// Record which candidates were selected and why
    Select {
        #[arg(long)]
        tracking_id: String,
        #[arg(long, value_delimiter = ',')]
        selected: Vec<String>,
        #[arg(long, value_delimiter = ',')]
        skipped: Vec<String>,
        #[arg(long)]
        reasoning: Option<String>,
    },
    /// Record which read packages influenced the output
    Usage {
        #[arg(long)]
        tracking_id: String,
        #[arg(long, value_delimiter = ',')]
        used: Vec<String>,
        #[arg(long, value_delimiter = ',')]
        unused: Vec<String>,
    },
    /// Print one tracking record
    Show {
        #[arg(long)]
        tracking_id: String,
    },
    /// Print aggregate precision and the most read packages
    Summary,
    /// Print every tracking record as JSON
    Export,
}

pub fn track(config: &TomeConfig, action: TrackAction) -> Result<()> {
    let mut tracker = super::open_tracker(config)?;

    match action {
        TrackAction::Read {
            tracking_id,
            packages,
        } => {
            tracker.record_read(&tracking_id, packages)?;
            println!("Recorded read for {tracking_id}");
        }
        TrackAction::Select {
            tracking_id,
            selected,
            skipped,
            reasoning,
        } => {
            tracker.record_selection(&tracking_id, selected, skipped, reasoning)?;
            println!("Recorded selection for {tracking_id}");
        }
        TrackAction::Usage {
            tracking_id,
            used,
            unused,
        } => {
            tracker.record_usage(&tracking_id, used, unused)?;
            if let Some(usage) = tracker.record(&tracking_id)?.and_then(|r| r.usage) {
                println!(
                    "Recorded usage for {tracking_id} (precision {:.2})",
                    usage.precision
                );
            }
        }
        TrackAction::Show { tracking_id } => {
            let record = tracker
                .record(&tracking_id)?
                .ok_or_else(|| anyhow!("no tracking record found for id `{tracking_id}`"))?;
            super::print_json(&record)?;
        }
        TrackAction::Summary => print_summary(&tracker.summary()?),
        TrackAction::Export => super::print_json(&tracker.records()?)?,
    }

    Ok(())
}

fn print_summary(summary: &tome::session::TrackingSummary) {
    println!("Tracking Summary");
    println!("{}", "=".repeat(40));
    println!("  Searches tracked:    {}", summary.records);
    println!("  With selection:      {}", summary.with_selection);
    println!("  With reads:          {}", summary.with_reads);
    println!("  With usage:          {}", summary.with_usage);
    match summary.mean_precision {
        Some(p) => println!("  Mean precision:      {p:.2}"),
        None => println!("  Mean precision:      -"),
    }

    if !summary.most_read.is_empty() {
        println!();
        println!("Most read:");
        for entry in &summary.most_read {
            println!("  {:<32} {}", entry.name, entry.count);
        }
    }
}
