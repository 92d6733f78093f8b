use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use econnect_core::domain::{
    AddressLink, Customer, Employee, SerialNumber, ServicePerson, Territory,
};
use econnect_core::forms::{IssuePayload, WarrantyClaimPayload};

use crate::query::{EmployeeFilter, SerialSearch};
use crate::{doctype, CreatedRecord, ErpApi, ErpError};

#[derive(Clone, Debug)]
struct StaffRecord {
    employee: Employee,
    designation: String,
    status: String,
}

/// In-process ERP with seeded collections and recorded writes.
#[derive(Default)]
pub struct InMemoryErp {
    service_persons: Vec<ServicePerson>,
    staff: Vec<StaffRecord>,
    customers: Vec<Customer>,
    territories: Vec<Territory>,
    serial_numbers: Vec<SerialNumber>,
    addresses: Vec<AddressLink>,
    failures: RwLock<HashMap<String, u16>>,
    issues: RwLock<Vec<IssuePayload>>,
    warranty_claims: RwLock<Vec<WarrantyClaimPayload>>,
}

impl InMemoryErp {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_service_persons(mut self, rows: Vec<ServicePerson>) -> Self {
        self.service_persons = rows;
        self
    }

    pub fn with_employee(mut self, employee: Employee, designation: &str, status: &str) -> Self {
        self.staff.push(StaffRecord {
            employee,
            designation: designation.to_string(),
            status: status.to_string(),
        });
        self
    }

    pub fn with_customers(mut self, rows: Vec<Customer>) -> Self {
        self.customers = rows;
        self
    }

    pub fn with_territories(mut self, rows: Vec<Territory>) -> Self {
        self.territories = rows;
        self
    }

    pub fn with_serial_numbers(mut self, rows: Vec<SerialNumber>) -> Self {
        self.serial_numbers = rows;
        self
    }

    pub fn with_addresses(mut self, rows: Vec<AddressLink>) -> Self {
        self.addresses = rows;
        self
    }

    /// Make every call touching `doctype` answer with `status`.
    pub async fn fail_doctype(&self, doctype: &str, status: u16) {
        self.failures.write().await.insert(doctype.to_string(), status);
    }

    pub async fn clear_failures(&self) {
        self.failures.write().await.clear();
    }

    pub async fn created_issues(&self) -> Vec<IssuePayload> {
        self.issues.read().await.clone()
    }

    pub async fn created_warranty_claims(&self) -> Vec<WarrantyClaimPayload> {
        self.warranty_claims.read().await.clone()
    }

    async fn check(&self, doctype: &str) -> Result<(), ErpError> {
        match self.failures.read().await.get(doctype) {
            Some(status) => Err(ErpError::Status { doctype: doctype.to_string(), status: *status }),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl ErpApi for InMemoryErp {
    async fn list_service_persons(&self) -> Result<Vec<ServicePerson>, ErpError> {
        self.check(doctype::SERVICE_PERSON).await?;
        Ok(self.service_persons.clone())
    }

    async fn list_employees(&self, filter: &EmployeeFilter) -> Result<Vec<Employee>, ErpError> {
        self.check(doctype::EMPLOYEE).await?;
        Ok(self
            .staff
            .iter()
            .filter(|record| {
                record.designation == filter.designation && record.status == filter.status
            })
            .map(|record| record.employee.clone())
            .collect())
    }

    async fn list_customers(&self) -> Result<Vec<Customer>, ErpError> {
        self.check(doctype::CUSTOMER).await?;
        Ok(self.customers.clone())
    }

    async fn list_territories(&self) -> Result<Vec<Territory>, ErpError> {
        self.check(doctype::TERRITORY).await?;
        Ok(self.territories.clone())
    }

    async fn list_serial_numbers(
        &self,
        search: &SerialSearch,
    ) -> Result<Vec<SerialNumber>, ErpError> {
        self.check(doctype::SERIAL_NO).await?;
        let limit = usize::try_from(search.limit).unwrap_or(usize::MAX);
        Ok(self
            .serial_numbers
            .iter()
            .filter(|row| search.matches(&row.name, row.customer.as_deref()))
            .take(limit)
            .cloned()
            .collect())
    }

    async fn list_addresses(&self) -> Result<Vec<AddressLink>, ErpError> {
        self.check(doctype::ADDRESS).await?;
        Ok(self.addresses.clone())
    }

    async fn get_serial_number(&self, name: &str) -> Result<Option<SerialNumber>, ErpError> {
        self.check(doctype::SERIAL_NO).await?;
        Ok(self.serial_numbers.iter().find(|row| row.name == name).cloned())
    }

    async fn create_issue(&self, payload: &IssuePayload) -> Result<CreatedRecord, ErpError> {
        self.check(doctype::ISSUE).await?;
        let mut issues = self.issues.write().await;
        issues.push(payload.clone());
        Ok(CreatedRecord { name: format!("ISS-{:05}", issues.len()) })
    }

    async fn create_warranty_claim(
        &self,
        payload: &WarrantyClaimPayload,
    ) -> Result<CreatedRecord, ErpError> {
        self.check(doctype::WARRANTY_CLAIM).await?;
        let mut claims = self.warranty_claims.write().await;
        claims.push(payload.clone());
        Ok(CreatedRecord { name: format!("WC-{:05}", claims.len()) })
    }
}
