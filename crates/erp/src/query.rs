//! Typed descriptions of the filtered reads the portal issues.
//!
//! The ERP takes `filters` as a JSON array of `[field, operator, value]`
//! triples. Building them as [`serde_json::Value`] keeps user search terms
//! escaped.

use serde_json::{json, Value};

use econnect_core::zonal::{ACTIVE_EMPLOYEE_STATUS, ZONAL_MANAGER_DESIGNATION};

pub const SERVICE_PERSON_FIELDS: &[&str] = &["name", "employee", "territory"];
pub const EMPLOYEE_FIELDS: &[&str] = &["name", "employee_name"];
pub const CUSTOMER_FIELDS: &[&str] = &["name", "territory"];
pub const TERRITORY_FIELDS: &[&str] = &["territory_name", "parent_territory"];
pub const ADDRESS_FIELDS: &[&str] = &["name", "links.link_name"];
pub const ISSUE_TABLE_FIELDS: &[&str] = &[
    "name",
    "item_name",
    "item_code",
    "customer_instrument_id",
    "customer",
    "custom_amc_type_name",
];
pub const SERIAL_DETAIL_FIELDS: &[&str] =
    &["name", "warranty_expiry_date", "customer", "item_name", "custom_amc_type_name"];
pub const SERIAL_PICKER_FIELDS: &[&str] = &["name"];

pub const ISSUE_TABLE_LIMIT: u64 = 20;
pub const SERIAL_PICKER_LIMIT: u64 = 10;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EmployeeFilter {
    pub designation: String,
    pub status: String,
}

impl EmployeeFilter {
    /// Active Area Service Managers.
    pub fn zonal_managers() -> Self {
        Self {
            designation: ZONAL_MANAGER_DESIGNATION.to_string(),
            status: ACTIVE_EMPLOYEE_STATUS.to_string(),
        }
    }

    pub fn to_filters(&self) -> Value {
        json!([["designation", "=", self.designation], ["status", "=", self.status]])
    }
}

/// A `Serial No` listing narrowed by a name fragment.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SerialSearch {
    pub name_contains: String,
    pub require_customer: bool,
    pub fields: &'static [&'static str],
    pub limit: u64,
}

impl SerialSearch {
    /// Rows for the issue form's instrument table.
    pub fn issue_table(term: &str) -> Self {
        Self {
            name_contains: term.to_string(),
            require_customer: false,
            fields: ISSUE_TABLE_FIELDS,
            limit: ISSUE_TABLE_LIMIT,
        }
    }

    /// Names for the serial-number autocomplete.
    pub fn picker(term: &str) -> Self {
        Self {
            name_contains: term.to_string(),
            require_customer: true,
            fields: SERIAL_PICKER_FIELDS,
            limit: SERIAL_PICKER_LIMIT,
        }
    }

    pub fn to_filters(&self) -> Value {
        let like = json!(["name", "like", format!("%{}%", self.name_contains)]);
        if self.require_customer {
            json!([["customer", "is", "set"], like])
        } else {
            json!([like])
        }
    }

    /// Case-insensitive `like` semantics, for in-process evaluation.
    pub fn matches(&self, name: &str, customer: Option<&str>) -> bool {
        if self.require_customer && customer.map_or(true, str::is_empty) {
            return false;
        }
        name.to_lowercase().contains(&self.name_contains.to_lowercase())
    }
}

/// Filter selecting one serial number by exact name.
pub fn serial_name_filter(name: &str) -> Value {
    json!([["name", "=", name]])
}
