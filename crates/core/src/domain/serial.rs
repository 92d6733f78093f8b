use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerialNumber {
    pub name: String,
    #[serde(default)]
    pub item_name: Option<String>,
    #[serde(default)]
    pub item_code: Option<String>,
    #[serde(default)]
    pub customer_instrument_id: Option<String>,
    #[serde(default)]
    pub customer: Option<String>,
    #[serde(rename = "custom_amc_type_name", default)]
    pub amc_type: Option<String>,
    #[serde(default)]
    pub warranty_expiry_date: Option<String>,
}

/// A serial number with every instrument-table column present.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct IssueTableRow {
    pub serial_no: String,
    pub item_name: String,
    pub item_code: String,
    pub customer_instrument_id: String,
    pub customer: String,
    pub amc_type: String,
}

impl SerialNumber {
    /// `None` when any column is missing on the ERP record.
    pub fn into_issue_row(self) -> Option<IssueTableRow> {
        Some(IssueTableRow {
            item_name: self.item_name?,
            item_code: self.item_code?,
            customer_instrument_id: self.customer_instrument_id?,
            customer: self.customer?,
            amc_type: self.amc_type?,
            serial_no: self.name,
        })
    }
}
