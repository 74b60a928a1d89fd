//! MCP server over stdio.
//!
//! [`serve_stdio`] opens the session database, wraps it in a tracker, and hands both to
//! the MCP tool handler.

use crate::tools::TomeTools;
use anyhow::{Context, Result};
use rmcp::ServiceExt;
use std::sync::{Arc, Mutex};
use tome::config::TomeConfig;
use tome::session::{SessionTracker, SqliteStore};

/// Start the MCP server over stdio transport.
pub async fn serve_stdio(config: TomeConfig) -> Result<()> {
    tracing::info!("starting tome MCP server on stdio");

    let db_path = config.session_db_path();
    let store = SqliteStore::open(&db_path)
        .with_context(|| format!("failed to open session database at {}", db_path.display()))?;
    tracing::info!(db = %db_path.display(), "session database ready");

    let tracker = Arc::new(Mutex::new(SessionTracker::new(store)));
    let tools = TomeTools::new(tracker, Arc::new(config));
    let transport = rmcp::transport::stdio();

    let server = tools.serve(transport).await?;
    tracing::info!("MCP server running, waiting for client");

    server.waiting().await?;
    tracing::info!("MCP server shut down");

    Ok(())
}
