use chrono::NaiveDate;
use serde::Serialize;

use super::FormFields;
use crate::errors::DomainError;

pub const SUBJECT_MAX_CHARS: usize = 20;
pub const DEFAULT_ISSUE_TYPE: &str = "NA";
pub const DEFAULT_JOB_TYPE: &str = "ONLINE SUPPORT";
pub const DEFAULT_PO_NUMBER: &str = "NA";
pub const DEFAULT_AMC_TYPE: &str = "Out Of Warranty";

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct IssueItem {
    pub serial_no: String,
    pub item_name: String,
    pub item_code: String,
    pub customer_instrument_id: String,
}

/// Body of `POST /api/resource/Issue`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct IssuePayload {
    pub naming_series: Option<String>,
    pub status: Option<String>,
    pub subject: String,
    pub priority: Option<String>,
    pub issue_type: String,
    pub serial_no: Option<String>,
    pub customer: Option<String>,
    pub custom_contact_email: String,
    pub issue_generate_date: String,
    pub zonal_manager: Option<String>,
    pub territory: Option<String>,
    pub job_type: String,
    pub issue_responsibility_with: Option<String>,
    pub prio_po_number: String,
    pub amc_type: String,
    pub description: String,
    pub issue_received_date: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub issue_details: Vec<IssueItem>,
}

impl IssuePayload {
    pub fn from_form(form: &FormFields, today: NaiveDate) -> Result<Self, DomainError> {
        let custom_contact_email = form.contact_email()?;

        let description = form.text("description");
        let subject = description.chars().take(SUBJECT_MAX_CHARS).collect();

        let issue_types = form.get_all("issue_type");
        let issue_type = if issue_types.is_empty() {
            DEFAULT_ISSUE_TYPE.to_string()
        } else {
            issue_types.join(", ")
        };

        let issue_generate_date = form.date_or_today("issue_generate_date", today);
        let issue_received_date = form
            .get("issue_received_date[]")
            .map(str::to_string)
            .unwrap_or_else(|| issue_generate_date.clone());

        Ok(Self {
            naming_series: form.owned("naming_series"),
            status: form.owned("status"),
            subject,
            priority: form.owned("priority"),
            issue_type,
            serial_no: form.owned("serial_no"),
            customer: form.owned("customer"),
            custom_contact_email,
            issue_generate_date,
            zonal_manager: form.owned("zonal_manager"),
            territory: form.owned("territory"),
            job_type: form.or_default("job_type", DEFAULT_JOB_TYPE),
            issue_responsibility_with: form.owned("issue_responsibility_with"),
            prio_po_number: form.or_default("prio_po_number", DEFAULT_PO_NUMBER),
            amc_type: form.or_default("amc_type", DEFAULT_AMC_TYPE),
            description: format!(
                "{}<br><br><b>{} {}{}</b>",
                description.trim(),
                form.text("contact_person_name").trim(),
                form.text("phone_extension").trim(),
                form.text("phone_number").trim(),
            ),
            issue_received_date,
            issue_details: item_rows(form)?,
        })
    }
}

/// One row per non-blank `item_name[]`, zipped with its sibling columns.
fn item_rows(form: &FormFields) -> Result<Vec<IssueItem>, DomainError> {
    let serials = form.get_all("serial_no[]");
    let names = form.get_all("item_name[]");
    let codes = form.get_all("item_code[]");
    let instrument_ids = form.get_all("customer_instrument_id[]");

    let mut items = Vec::new();
    for (row, name) in names.iter().enumerate() {
        if name.trim().is_empty() {
            continue;
        }
        items.push(IssueItem {
            serial_no: column(&serials, row, "serial_no[]")?,
            item_name: name.to_string(),
            item_code: column(&codes, row, "item_code[]")?,
            customer_instrument_id: column(&instrument_ids, row, "customer_instrument_id[]")?,
        });
    }
    Ok(items)
}

fn column(values: &[&str], row: usize, field: &'static str) -> Result<String, DomainError> {
    values
        .get(row)
        .map(|value| value.to_string())
        .ok_or(DomainError::IncompleteItemRow { row: row + 1, field })
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use serde_json::Value;

    use super::IssuePayload;
    use crate::errors::DomainError;
    use crate::forms::fields;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 2).expect("valid date")
    }

    #[test]
    fn minimal_form_gets_documented_defaults() {
        let form = fields(&[
            ("custom_contact_email", "lab@pharma.example.com"),
            ("description", "Paddle speed drifts above 50 rpm during runs"),
            ("contact_person_name", " Meera "),
            ("phone_extension", "+91"),
            ("phone_number", " 9876543210"),
        ]);

        let payload = IssuePayload::from_form(&form, today()).expect("valid form");

        assert_eq!(payload.subject, "Paddle speed drifts ");
        assert_eq!(payload.issue_type, "NA");
        assert_eq!(payload.job_type, "ONLINE SUPPORT");
        assert_eq!(payload.prio_po_number, "NA");
        assert_eq!(payload.amc_type, "Out Of Warranty");
        assert_eq!(payload.issue_generate_date, "2025-06-02");
        assert_eq!(payload.issue_received_date, "2025-06-02");
        assert_eq!(
            payload.description,
            "Paddle speed drifts above 50 rpm during runs<br><br><b>Meera +919876543210</b>"
        );
        assert!(payload.issue_details.is_empty());
    }

    #[test]
    fn explicit_values_override_defaults() {
        let form = fields(&[
            ("custom_contact_email", "lab@pharma.example.com"),
            ("issue_type", "Calibration"),
            ("issue_type", "Breakdown"),
            ("job_type", "SITE VISIT"),
            ("prio_po_number", "PO-7781"),
            ("amc_type", "Comprehensive AMC"),
            ("issue_generate_date", "2025-05-30"),
            ("issue_received_date[]", "2025-05-31"),
            ("issue_received_date[]", "2025-06-01"),
        ]);

        let payload = IssuePayload::from_form(&form, today()).expect("valid form");

        assert_eq!(payload.issue_type, "Calibration, Breakdown");
        assert_eq!(payload.job_type, "SITE VISIT");
        assert_eq!(payload.prio_po_number, "PO-7781");
        assert_eq!(payload.amc_type, "Comprehensive AMC");
        assert_eq!(payload.issue_generate_date, "2025-05-30");
        assert_eq!(payload.issue_received_date, "2025-05-31");
    }

    #[test]
    fn empty_default_fields_fall_back() {
        let form = fields(&[
            ("custom_contact_email", "lab@pharma.example.com"),
            ("job_type", ""),
            ("issue_generate_date", ""),
        ]);

        let payload = IssuePayload::from_form(&form, today()).expect("valid form");

        assert_eq!(payload.job_type, "ONLINE SUPPORT");
        assert_eq!(payload.issue_generate_date, "2025-06-02");
    }

    #[test]
    fn blank_item_rows_are_skipped() {
        let form = fields(&[
            ("custom_contact_email", "lab@pharma.example.com"),
            ("serial_no[]", "SN-1"),
            ("serial_no[]", "SN-2"),
            ("item_name[]", "Dissolution Tester"),
            ("item_name[]", "   "),
            ("item_code[]", "DT-8"),
            ("item_code[]", ""),
            ("customer_instrument_id[]", "QC-04"),
            ("customer_instrument_id[]", ""),
        ]);

        let payload = IssuePayload::from_form(&form, today()).expect("valid form");

        assert_eq!(payload.issue_details.len(), 1);
        assert_eq!(payload.issue_details[0].serial_no, "SN-1");
        assert_eq!(payload.issue_details[0].item_code, "DT-8");
        assert_eq!(payload.issue_details[0].customer_instrument_id, "QC-04");
    }

    #[test]
    fn short_sibling_column_rejects_the_form() {
        let form = fields(&[
            ("custom_contact_email", "lab@pharma.example.com"),
            ("serial_no[]", "SN-1"),
            ("item_name[]", "Dissolution Tester"),
            ("item_code[]", "DT-8"),
        ]);

        assert_eq!(
            IssuePayload::from_form(&form, today()),
            Err(DomainError::IncompleteItemRow { row: 1, field: "customer_instrument_id[]" })
        );
    }

    #[test]
    fn invalid_email_is_rejected_before_anything_else() {
        let form = fields(&[("custom_contact_email", "abc"), ("item_name[]", "Orphan")]);

        assert_eq!(
            IssuePayload::from_form(&form, today()),
            Err(DomainError::InvalidContactEmail("abc".to_string()))
        );
    }

    #[test]
    fn absent_pass_through_fields_serialize_as_null_and_empty_details_are_omitted() {
        let form = fields(&[("custom_contact_email", "lab@pharma.example.com")]);
        let payload = IssuePayload::from_form(&form, today()).expect("valid form");

        let json = serde_json::to_value(&payload).expect("serialize");

        assert_eq!(json["priority"], Value::Null);
        assert_eq!(json["customer"], Value::Null);
        assert!(json.get("issue_details").is_none());
    }
}
