//! MCP `track_usage` tool parameter definition.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Parameters for the `track_usage` MCP tool.
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct TrackUsageParams {
    #[schemars(description = "Tracking id returned by search_knowledge")]
    pub tracking_id: String,

    #[schemars(description = "Packages that influenced the output")]
    pub used: Vec<String>,

    #[schemars(description = "Packages that were read but did not help")]
    pub unused: Option<Vec<String>>,
}
