//! CLI `validate` command: print corpus findings, failing on any error.

use anyhow::{bail, Result};

use tome::config::TomeConfig;

pub fn validate(config: &TomeConfig, summary: bool) -> Result<()> {
    let store = super::open_store(config)?;
    let report = tome::validate::validate(&store, &config.project_root, &config.vault_root())?;

    if !summary {
        for pkg in &report.packages {
            println!("{}/{}", pkg.category, pkg.name);
            for error in &pkg.errors {
                println!("  error:   {error}");
            }
            for warning in &pkg.warnings {
                println!("  warning: {warning}");
            }
        }
        for warning in &report.category_warnings {
            println!("warning: {warning}");
        }
        for path in &report.orphaned {
            println!("warning: orphaned document {}", path.display());
        }
        if report.warning_count() + report.error_count() > 0 {
            println!();
        }
    }

    println!("Validation Summary");
    println!("{}", "=".repeat(40));
    println!("  Packages checked:    {}", report.packages_checked);
    println!("  Errors:              {}", report.error_count());
    println!("  Warnings:            {}", report.warning_count());
    println!("  Orphaned documents:  {}", report.orphaned.len());

    if !report.is_ok() {
        bail!(
            "validation failed for: {}",
            report.failed_packages().join(", ")
        );
    }
    Ok(())
}
