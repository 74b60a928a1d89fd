use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct LoadKnowledgeParams {
    #[schemars(description = "Package names to load. Packages already loaded this session are skipped.")]
    pub packages: Vec<String>,

    #[schemars(description = "Tracking id from search_knowledge; the load is recorded as a read")]
    pub tracking_id: Option<String>,

    #[schemars(description = "If true, include each document's markdown content. Defaults to true.")]
    pub include_content: Option<bool>,
}
