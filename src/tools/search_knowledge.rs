//! MCP `search_knowledge` tool parameter definition.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Parameters for the `search_knowledge` MCP tool.
///
/// With `command_profile`, `tags` are added to the profile's own tags and `text`,
/// `category`, and `agent` are ignored.
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct SearchKnowledgeParams {
    #[schemars(description = "Tags to match against package tags (exact or substring)")]
    pub tags: Option<Vec<String>>,

    #[schemars(description = "Case-insensitive substring that must appear in the description")]
    pub text: Option<String>,

    #[schemars(description = "Comma-separated exact categories, e.g. 'technical/react,ai'")]
    pub category: Option<String>,

    #[schemars(description = "Only packages whose used_by_agents contains this value")]
    pub agent: Option<String>,

    #[schemars(
        description = "Path of the file being worked on. Its extension hides standards/tooling packages for other languages."
    )]
    pub file_path: Option<String>,

    #[schemars(description = "Maximum number of primary results. Defaults to 15.")]
    pub max_results: Option<usize>,

    #[schemars(description = "Named command profile from the knowledge store")]
    pub command_profile: Option<String>,

    #[schemars(description = "Dependency expansion depth. 0 disables expansion. Defaults to 1.")]
    pub depth: Option<usize>,

    #[schemars(
        description = "Correlation id for tracking. Supplying this or agent_name records the search."
    )]
    pub tracking_id: Option<String>,

    #[schemars(description = "Name of the calling agent, stored on the tracking record")]
    pub agent_name: Option<String>,

    #[schemars(description = "The prompt that triggered this search, stored on the tracking record")]
    pub prompt: Option<String>,
}
