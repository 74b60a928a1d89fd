//! CLI `categories` and `tags` commands.

use anyhow::Result;

use tome::config::TomeConfig;

/// Print every category with its package count.
pub fn categories(config: &TomeConfig) -> Result<()> {
    let store = super::open_store(config)?;

    println!("Categories ({})", store.knowledge.len());
    println!("{}", "=".repeat(40));
    for (category, packages) in &store.knowledge {
        println!("  {:<32} {}", category, packages.len());
    }
    Ok(())
}

/// Print every tag, one per line.
pub fn tags(config: &TomeConfig) -> Result<()> {
    let store = super::open_store(config)?;
    for tag in store.tags() {
        println!("{tag}");
    }
    Ok(())
}
