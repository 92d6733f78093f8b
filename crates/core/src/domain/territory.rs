use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Territory {
    #[serde(rename = "territory_name")]
    pub name: String,
    #[serde(rename = "parent_territory", default)]
    pub parent: Option<String>,
}
