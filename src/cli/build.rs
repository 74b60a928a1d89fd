//! CLI `build` command: rebuild the metadata store and report cache statistics.

use anyhow::Result;

use tome::config::TomeConfig;
use tome::index::{self, BuildOptions};

const SLOWEST_SHOWN: usize = 5;

pub fn build(config: &TomeConfig, force_rebuild: bool, verbose: bool) -> Result<()> {
    if force_rebuild {
        eprintln!("Force rebuild: cache cleared");
    }

    let report = index::build(config, &BuildOptions { force_rebuild })?;
    let elapsed_ms = report.elapsed.as_millis();

    if report.slow {
        eprintln!(
            "Warning: build took {elapsed_ms}ms (soft limit {}ms)",
            config.build.soft_warn_ms
        );
    }
    for name in &report.duplicates {
        eprintln!("Warning: duplicate package name `{name}` ignored");
    }

    if !verbose {
        println!(
            "Knowledge index generated ({} packages, {}ms)",
            report.package_count, elapsed_ms
        );
        return Ok(());
    }

    println!("Build Report");
    println!("{}", "=".repeat(40));
    println!("  Documents:           {}", report.total_files);
    println!("  Packages:            {}", report.package_count);
    println!("  Parsed:              {}", report.rebuilt);
    println!("  Cached:              {}", report.cached);
    println!("  Skipped:             {}", report.skipped);
    println!("  Evicted from cache:  {}", report.evicted);
    println!("  Cache hit rate:      {}%", report.hit_rate_percent());
    println!(
        "  Avg parse time:      {:.2}ms",
        report.average_parse_time().as_secs_f64() * 1000.0
    );
    println!("  Total time:          {elapsed_ms}ms");

    let slowest = report.slowest(SLOWEST_SHOWN);
    if !slowest.is_empty() {
        println!();
        println!("Slowest documents:");
        for timing in slowest {
            println!(
                "  {:>8.2}ms  {}",
                timing.elapsed.as_secs_f64() * 1000.0,
                timing.path
            );
        }
    }

    Ok(())
}
