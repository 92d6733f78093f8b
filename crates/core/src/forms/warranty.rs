use chrono::NaiveDate;
use serde::Serialize;

use super::FormFields;
use crate::errors::DomainError;

/// Body of `POST /api/resource/Warranty Claim`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct WarrantyClaimPayload {
    pub naming_series: Option<String>,
    pub status: Option<String>,
    pub custom_contact_email: String,
    pub priority: Option<String>,
    pub customer: Option<String>,
    pub serial_no: Option<String>,
    pub issue_type: Option<String>,
    pub complaint_date: String,
    pub zonal_manager: Option<String>,
    pub territory: Option<String>,
    pub job_type: Option<String>,
    pub warranty_claim_responsibility_with: Option<String>,
    pub prio_po_number: Option<String>,
    pub amc_type: Option<String>,
    pub warranty_amc_status: Option<String>,
    pub complaint: Option<String>,
    pub warranty_expiry_date: Option<String>,
    pub customer_name: Option<String>,
    pub customer_address: Option<String>,
    pub complaint_raised_by: String,
    pub claim_received_date: String,
}

impl WarrantyClaimPayload {
    pub fn from_form(form: &FormFields, today: NaiveDate) -> Result<Self, DomainError> {
        let custom_contact_email = form.contact_email()?;
        let complaint_date = form.date_or_today("complaint_date", today);
        let claim_received_date = form
            .get("claim_received_date[]")
            .map(str::to_string)
            .unwrap_or_else(|| complaint_date.clone());

        Ok(Self {
            naming_series: form.owned("naming_series"),
            status: form.owned("status"),
            custom_contact_email,
            priority: form.owned("priority"),
            customer: form.owned("customer"),
            serial_no: form.owned("serial_no"),
            issue_type: form.owned("issue_type"),
            complaint_date,
            zonal_manager: form.owned("zonal_manager"),
            territory: form.owned("territory"),
            job_type: form.owned("job_type"),
            warranty_claim_responsibility_with: form.owned("warranty_claim_responsibility_with"),
            prio_po_number: form.owned("prio_po_number"),
            amc_type: form.owned("amc_type"),
            warranty_amc_status: form.owned("warranty_amc_status"),
            complaint: form.owned("complaint"),
            warranty_expiry_date: form.owned("warranty_expiry_date"),
            customer_name: form.owned("customer_name"),
            customer_address: form.owned("customer_address"),
            complaint_raised_by: format!(
                "{} {}",
                form.text("contact_person_name"),
                form.text("phone_number")
            ),
            claim_received_date,
        })
    }
}
