use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServicePerson {
    pub name: String,
    #[serde(default)]
    pub employee: Option<String>,
    #[serde(default)]
    pub territory: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
    #[serde(rename = "name")]
    pub id: String,
    #[serde(default)]
    pub employee_name: Option<String>,
}
