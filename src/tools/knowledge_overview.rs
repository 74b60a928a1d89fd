use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct KnowledgeOverviewParams {
    #[schemars(description = "Include every known tag as well as categories. Defaults to false.")]
    pub include_tags: Option<bool>,
}
