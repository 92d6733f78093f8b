use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    pub name: String,
    #[serde(default)]
    pub territory: Option<String>,
}

/// One child link of an ERP `Address` record.
///
/// An address linked to several parties yields one row per link.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressLink {
    #[serde(rename = "name")]
    pub address: String,
    #[serde(rename = "link_name", default)]
    pub customer: Option<String>,
}
