pub mod knowledge_overview;
pub mod load_knowledge;
pub mod search_knowledge;
pub mod track_usage;

use knowledge_overview::KnowledgeOverviewParams;
use load_knowledge::LoadKnowledgeParams;
use rmcp::handler::server::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::{tool, tool_handler, tool_router, ServerHandler};
use search_knowledge::SearchKnowledgeParams;
use std::sync::{Arc, Mutex};
use track_usage::TrackUsageParams;

use tome::config::TomeConfig;
use tome::search::{self, SearchOutput, SearchQuery, SearchRequest};
use tome::session::{SessionTracker, SqliteStore};
use tome::store::KnowledgeStore;

type SharedTracker = Arc<Mutex<SessionTracker<SqliteStore>>>;

/// The tome MCP tool handler. Holds the session tracker and config; the knowledge store
/// is reloaded on every call so a rebuild is picked up without restarting.
#[derive(Clone)]
pub struct TomeTools {
    tool_router: ToolRouter<Self>,
    tracker: SharedTracker,
    config: Arc<TomeConfig>,
}

#[tool_router]
impl TomeTools {
    pub fn new(tracker: SharedTracker, config: Arc<TomeConfig>) -> Self {
        Self {
            tool_router: Self::tool_router(),
            tracker,
            config,
        }
    }

    /// Search knowledge packages by tags, text, category, or command profile.
    #[tool(description = "Search knowledge packages by tags, description text, category, or a named command profile. Results are ranked by tag relevance and expanded with required dependencies.")]
    async fn search_knowledge(
        &self,
        Parameters(params): Parameters<SearchKnowledgeParams>,
    ) -> Result<String, String> {
        tracing::info!(
            tags = ?params.tags,
            profile = params.command_profile.as_deref().unwrap_or("-"),
            "search_knowledge called"
        );

        let config = Arc::clone(&self.config);
        let tracker = Arc::clone(&self.tracker);
        tokio::task::spawn_blocking(move || -> anyhow::Result<String> {
            let store = KnowledgeStore::load(config.store_path())?;
            let request = SearchRequest {
                query: SearchQuery {
                    tags: params.tags.unwrap_or_default(),
                    text: params.text,
                    category: params.category,
                    agent: params.agent,
                    source_file_path: params.file_path,
                    max_results: params
                        .max_results
                        .unwrap_or(config.search.default_max_results),
                },
                command_profile: params.command_profile,
                depth: params.depth.unwrap_or(config.search.dependency_depth),
            };
            let outcome = search::execute(&store, &request)?;

            let tracking_id = if params.tracking_id.is_some() || params.agent_name.is_some() {
                let mut record = outcome.search_record(&request);
                record.tracking_id = params.tracking_id;
                record.agent_name = params.agent_name;
                record.prompt = params.prompt;
                with_tracker(&tracker, |t| t.record_search(record))
            } else {
                None
            };

            let mut output = SearchOutput::new(&request, outcome)?;
            output.tracking_id = tracking_id;
            Ok(serde_json::to_string(&output)?)
        })
        .await
        .map_err(|e| format!("search task failed: {e}"))?
        .map_err(|e| format!("search failed: {e}"))
    }

    /// Load package documents, skipping those already delivered this session.
    #[tool(description = "Load knowledge packages by name. Packages already loaded in this session are reported but not returned again.")]
    async fn load_knowledge(
        &self,
        Parameters(params): Parameters<LoadKnowledgeParams>,
    ) -> Result<String, String> {
        tracing::info!(packages = ?params.packages, "load_knowledge called");

        let config = Arc::clone(&self.config);
        let tracker = Arc::clone(&self.tracker);
        tokio::task::spawn_blocking(move || -> anyhow::Result<String> {
            let store = KnowledgeStore::load(config.store_path())?;
            let outcome = {
                let mut tracker = tracker
                    .lock()
                    .map_err(|e| anyhow::anyhow!("session lock poisoned: {e}"))?;
                tome::load::load(
                    &store,
                    &mut *tracker,
                    &config.project_root,
                    &params.packages,
                    params.tracking_id.as_deref(),
                )?
            };

            let include_content = params.include_content.unwrap_or(true);
            let loaded: Vec<serde_json::Value> = outcome
                .loaded
                .iter()
                .map(|pkg| {
                    let mut entry = serde_json::json!({
                        "name": pkg.name,
                        "category": pkg.category,
                        "path": pkg.path,
                    });
                    if include_content {
                        entry["content"] = match std::fs::read_to_string(&pkg.path) {
                            Ok(text) => serde_json::Value::String(text),
                            Err(e) => {
                                tracing::warn!(path = %pkg.path.display(), error = %e, "could not read document");
                                serde_json::Value::Null
                            }
                        };
                    }
                    entry
                })
                .collect();

            Ok(serde_json::json!({
                "loaded": loaded,
                "already_loaded": outcome.already_loaded,
            })
            .to_string())
        })
        .await
        .map_err(|e| format!("load task failed: {e}"))?
        .map_err(|e| format!("load failed: {e}"))
    }

    /// Record which loaded packages actually influenced the output.
    #[tool(description = "Record which packages from a tracked search were used. Returns the updated tracking record with precision.")]
    async fn track_usage(
        &self,
        Parameters(params): Parameters<TrackUsageParams>,
    ) -> Result<String, String> {
        tracing::info!(tracking_id = %params.tracking_id, "track_usage called");

        let tracker = Arc::clone(&self.tracker);
        tokio::task::spawn_blocking(move || -> anyhow::Result<String> {
            let mut tracker = tracker
                .lock()
                .map_err(|e| anyhow::anyhow!("session lock poisoned: {e}"))?;
            tracker.record_usage(
                &params.tracking_id,
                params.used,
                params.unused.unwrap_or_default(),
            )?;
            let record = tracker.record(&params.tracking_id)?;
            Ok(serde_json::to_string(&record)?)
        })
        .await
        .map_err(|e| format!("tracking task failed: {e}"))?
        .map_err(|e| format!("tracking failed: {e}"))
    }

    /// List categories (and optionally tags) in the knowledge store.
    #[tool(description = "List knowledge categories and optionally all tags. Reports whether this is the first overview shown in the session.")]
    async fn knowledge_overview(
        &self,
        Parameters(params): Parameters<KnowledgeOverviewParams>,
    ) -> Result<String, String> {
        tracing::info!("knowledge_overview called");

        let config = Arc::clone(&self.config);
        let tracker = Arc::clone(&self.tracker);
        tokio::task::spawn_blocking(move || -> anyhow::Result<String> {
            let store = KnowledgeStore::load(config.store_path())?;
            let first_invocation = with_tracker(&tracker, |t| {
                let first = t.is_first_invocation()?;
                t.mark_shown()?;
                Ok(first)
            })
            .unwrap_or(true);

            let mut overview = serde_json::json!({
                "first_invocation": first_invocation,
                "package_count": store.package_count(),
                "categories": store.categories(),
            });
            if params.include_tags.unwrap_or(false) {
                overview["tags"] = serde_json::json!(store.tags());
            }
            Ok(overview.to_string())
        })
        .await
        .map_err(|e| format!("overview task failed: {e}"))?
        .map_err(|e| format!("overview failed: {e}"))
    }
}

/// Run a session operation whose failure must not fail the tool call.
fn with_tracker<T>(
    tracker: &SharedTracker,
    op: impl FnOnce(&mut SessionTracker<SqliteStore>) -> tome::error::Result<T>,
) -> Option<T> {
    let mut guard = match tracker.lock() {
        Ok(guard) => guard,
        Err(e) => {
            tracing::error!(error = %e, "session lock poisoned");
            return None;
        }
    };
    match op(&mut *guard) {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::error!(error = %e, "session tracking failed");
            None
        }
    }
}

#[tool_handler]
impl ServerHandler for TomeTools {
    fn get_info(&self) -> rmcp::model::ServerInfo {
        rmcp::model::ServerInfo {
            instructions: Some(
                "tome serves a local knowledge base. Use knowledge_overview to see categories, \
                 search_knowledge to find packages, load_knowledge to read them, and \
                 track_usage to report which ones helped."
                    .into(),
            ),
            capabilities: rmcp::model::ServerCapabilities::builder()
                .enable_tools()
                .build(),
            ..Default::default()
        }
    }
}
