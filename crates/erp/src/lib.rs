//! Access to the ERP's `/api/resource` REST surface.
//!
//! Handlers and the zonal resolver talk to [`ErpApi`]; production wires in
//! [`HttpErpClient`], tests wire in [`InMemoryErp`].

use async_trait::async_trait;
use thiserror::Error;

use econnect_core::domain::{
    AddressLink, Customer, Employee, SerialNumber, ServicePerson, Territory,
};
use econnect_core::errors::ApplicationError;
use econnect_core::forms::{IssuePayload, WarrantyClaimPayload};

pub mod client;
pub mod memory;
pub mod query;
pub mod resolver;

pub use client::HttpErpClient;
pub use memory::InMemoryErp;
pub use query::{EmployeeFilter, SerialSearch};
pub use resolver::{build_zonal_map, fetch_zonal_inputs, spawn_refresh, ZonalDirectory};

/// ERP document types used by the portal.
pub mod doctype {
    pub const SERVICE_PERSON: &str = "Service Person";
    pub const EMPLOYEE: &str = "Employee";
    pub const CUSTOMER: &str = "Customer";
    pub const TERRITORY: &str = "Territory";
    pub const SERIAL_NO: &str = "Serial No";
    pub const ADDRESS: &str = "Address";
    pub const ISSUE: &str = "Issue";
    pub const WARRANTY_CLAIM: &str = "Warranty Claim";
}

/// Name reported when a create succeeds without echoing `data.name`.
pub const UNKNOWN_RECORD_NAME: &str = "Unknown";

#[derive(Debug, Error)]
pub enum ErpError {
    #[error("erp request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("erp returned status {status} for `{doctype}`")]
    Status { doctype: String, status: u16 },
    #[error("could not decode erp response for `{doctype}`: {message}")]
    Decode { doctype: String, message: String },
    #[error("erp base url `{0}` cannot carry a resource path")]
    InvalidBaseUrl(String),
}

impl ErpError {
    pub fn upstream_status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<ErpError> for ApplicationError {
    fn from(error: ErpError) -> Self {
        match error {
            ErpError::Status { status, .. } => Self::UpstreamStatus { status },
            ErpError::InvalidBaseUrl(_) => Self::Configuration(error.to_string()),
            other => Self::Integration(other.to_string()),
        }
    }
}

/// Record created by a successful POST.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CreatedRecord {
    pub name: String,
}

#[async_trait]
pub trait ErpApi: Send + Sync {
    async fn list_service_persons(&self) -> Result<Vec<ServicePerson>, ErpError>;
    async fn list_employees(&self, filter: &EmployeeFilter) -> Result<Vec<Employee>, ErpError>;
    async fn list_customers(&self) -> Result<Vec<Customer>, ErpError>;
    async fn list_territories(&self) -> Result<Vec<Territory>, ErpError>;
    async fn list_serial_numbers(
        &self,
        search: &SerialSearch,
    ) -> Result<Vec<SerialNumber>, ErpError>;
    async fn list_addresses(&self) -> Result<Vec<AddressLink>, ErpError>;
    async fn get_serial_number(&self, name: &str) -> Result<Option<SerialNumber>, ErpError>;
    async fn create_issue(&self, payload: &IssuePayload) -> Result<CreatedRecord, ErpError>;
    async fn create_warranty_claim(
        &self,
        payload: &WarrantyClaimPayload,
    ) -> Result<CreatedRecord, ErpError>;
}

#[cfg(test)]
mod tests {
    use econnect_core::errors::ApplicationError;

    use crate::ErpError;

    #[test]
    fn status_error_becomes_upstream_status() {
        let error = ErpError::Status { doctype: "Issue".to_owned(), status: 417 };
        assert_eq!(error.upstream_status(), Some(417));

        let application = ApplicationError::from(error);
        assert_eq!(application, ApplicationError::UpstreamStatus { status: 417 });
    }

    #[test]
    fn decode_error_becomes_integration_failure() {
        let error =
            ErpError::Decode { doctype: "Issue".to_owned(), message: "expected value".to_owned() };
        let application = ApplicationError::from(error);

        assert!(matches!(
            application,
            ApplicationError::Integration(ref message) if message.contains("expected value")
        ));
    }
}
