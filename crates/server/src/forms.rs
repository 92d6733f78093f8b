//! Issue (`POST /submit`) and warranty claim (`POST /submit2`) submissions.
//!
//! Both relay the form to the ERP, email the submitter on success and
//! redirect back to the form page with a `flash`/`message` query pair.

use axum::extract::{Form, State};
use axum::response::Redirect;
use chrono::{Local, NaiveDate};
use tracing::{info, warn};
use uuid::Uuid;

use econnect_core::errors::ApplicationError;
use econnect_core::forms::{FormFields, IssuePayload, WarrantyClaimPayload};
use econnect_erp::CreatedRecord;

use crate::notifier::Notification;
use crate::state::AppState;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SubmissionKind {
    Issue,
    Warranty,
}

impl SubmissionKind {
    pub fn label(self) -> &'static str {
        match self {
            Self::Issue => "Issue",
            Self::Warranty => "Warranty",
        }
    }

    pub fn page(self) -> &'static str {
        match self {
            Self::Issue => "/issue",
            Self::Warranty => "/warranty",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FlashKind {
    Success,
    Error,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Flash {
    pub kind: FlashKind,
    pub message: String,
}

impl Flash {
    pub fn success(message: String) -> Self {
        Self { kind: FlashKind::Success, message }
    }

    pub fn error(message: String) -> Self {
        Self { kind: FlashKind::Error, message }
    }

    /// `{page}?flash=<success|error>&message=<url-encoded text>`
    pub fn location(&self, page: &str) -> String {
        let kind = match self.kind {
            FlashKind::Success => "success",
            FlashKind::Error => "error",
        };
        format!("{page}?flash={kind}&message={}", urlencoding::encode(&self.message))
    }
}

pub fn success_message(kind: SubmissionKind, name: &str, support_contact: &str) -> String {
    format!(
        "Request submitted successfully! {} Name: {name}, for any query contact us on: {support_contact}",
        kind.label()
    )
}

pub fn confirmation(kind: SubmissionKind, brand: &str, to: &str, name: &str) -> Notification {
    Notification {
        to: to.to_string(),
        subject: format!("{brand} {} Form Notification", kind.label()),
        body: format!("Your File is submitted with ID : {name}"),
    }
}

pub async fn submit_issue(
    State(state): State<AppState>,
    Form(pairs): Form<Vec<(String, String)>>,
) -> Redirect {
    let form = FormFields::new(pairs);
    let today = Local::now().date_naive();
    let flash = submit(&state, SubmissionKind::Issue, &form, today).await;
    Redirect::to(&flash.location(SubmissionKind::Issue.page()))
}

pub async fn submit_warranty_claim(
    State(state): State<AppState>,
    Form(pairs): Form<Vec<(String, String)>>,
) -> Redirect {
    let form = FormFields::new(pairs);
    let today = Local::now().date_naive();
    let flash = submit(&state, SubmissionKind::Warranty, &form, today).await;
    Redirect::to(&flash.location(SubmissionKind::Warranty.page()))
}

async fn submit(
    state: &AppState,
    kind: SubmissionKind,
    form: &FormFields,
    today: NaiveDate,
) -> Flash {
    let correlation_id = Uuid::new_v4();

    let (created, contact_email) = match relay(state, kind, form, today).await {
        Ok(result) => result,
        Err(error) => {
            warn!(
                event_name = "portal.submission.rejected",
                correlation_id = %correlation_id,
                kind = kind.label(),
                error = %error,
                "form submission failed"
            );
            return Flash::error(error.flash_message());
        }
    };

    info!(
        event_name = "portal.submission.created",
        correlation_id = %correlation_id,
        kind = kind.label(),
        record = %created.name,
        "form relayed to erp"
    );

    let notification = confirmation(kind, &state.portal.brand, &contact_email, &created.name);
    if let Err(error) = state.notifier.send(&notification).await {
        warn!(
            event_name = "portal.notification.failed",
            correlation_id = %correlation_id,
            record = %created.name,
            error = %error,
            "confirmation email not delivered"
        );
    }

    Flash::success(success_message(kind, &created.name, &state.portal.support_contact))
}

async fn relay(
    state: &AppState,
    kind: SubmissionKind,
    form: &FormFields,
    today: NaiveDate,
) -> Result<(CreatedRecord, String), ApplicationError> {
    match kind {
        SubmissionKind::Issue => {
            let payload = IssuePayload::from_form(form, today)?;
            let created = state.erp.create_issue(&payload).await?;
            Ok((created, payload.custom_contact_email))
        }
        SubmissionKind::Warranty => {
            let payload = WarrantyClaimPayload::from_form(form, today)?;
            let created = state.erp.create_warranty_claim(&payload).await?;
            Ok((created, payload.custom_contact_email))
        }
    }
}

#[cfg(test)]
mod tests {
    use axum::extract::{Form, State};
    use axum::http::header::LOCATION;
    use axum::http::StatusCode;
    use axum::response::IntoResponse;
    use chrono::NaiveDate;

    use econnect_core::forms::FormFields;
    use econnect_erp::{doctype, InMemoryErp};

    use super::{submit, submit_issue, submit_warranty_claim, Flash, FlashKind, SubmissionKind};
    use crate::notifier::testing::RecordingNotifier;
    use crate::state::testing::{harness, harness_with_notifier};

    fn pairs(values: &[(&str, &str)]) -> Vec<(String, String)> {
        values.iter().map(|(key, value)| (key.to_string(), value.to_string())).collect()
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 14).expect("valid date")
    }

    fn issue_form() -> Vec<(String, String)> {
        pairs(&[
            ("custom_contact_email", " qa@acme.example.com "),
            ("customer", "Acme Pharma"),
            ("description", "Paddle wobble above 100 rpm"),
            ("contact_person_name", "Meera"),
            ("phone_extension", "+91"),
            ("phone_number", "9800000000"),
            ("issue_type", "Hardware"),
            ("item_name[]", "Dissolution Tester"),
            ("serial_no[]", "SN-1"),
            ("item_code[]", "EDT-08Lx"),
            ("customer_instrument_id[]", "QC-DT-3"),
        ])
    }

    #[tokio::test]
    async fn issue_submission_creates_record_and_notifies() {
        let harness = harness(InMemoryErp::new(), None);

        let flash =
            submit(&harness.state, SubmissionKind::Issue, &FormFields::new(issue_form()), today())
                .await;

        assert_eq!(flash.kind, FlashKind::Success);
        assert_eq!(
            flash.message,
            "Request submitted successfully! Issue Name: ISS-00001, for any query contact us on: service@example.com"
        );

        let issues = harness.erp.created_issues().await;
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].custom_contact_email, "qa@acme.example.com");
        assert_eq!(issues[0].issue_details.len(), 1);

        let sent = harness.notifier.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, "qa@acme.example.com");
        assert_eq!(sent[0].subject, "Electrolab Issue Form Notification");
        assert_eq!(sent[0].body, "Your File is submitted with ID : ISS-00001");
    }

    #[tokio::test]
    async fn invalid_email_blocks_erp_call() {
        let harness = harness(InMemoryErp::new(), None);

        let response = submit_issue(
            State(harness.state.clone()),
            Form(pairs(&[("custom_contact_email", "not-an-email"), ("description", "x")])),
        )
        .await
        .into_response();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        let location = response
            .headers()
            .get(LOCATION)
            .and_then(|value| value.to_str().ok())
            .expect("redirect location");
        assert_eq!(
            location,
            "/issue?flash=error&message=Invalid%20email%20address.%20Please%20enter%20a%20valid%20email."
        );
        assert!(harness.erp.created_issues().await.is_empty());
        assert!(harness.notifier.sent().is_empty());
    }

    #[tokio::test]
    async fn rejected_issue_reports_upstream_status() {
        let erp = InMemoryErp::new();
        erp.fail_doctype(doctype::ISSUE, 417).await;
        let harness = harness(erp, None);

        let flash =
            submit(&harness.state, SubmissionKind::Issue, &FormFields::new(issue_form()), today())
                .await;

        assert_eq!(
            flash,
            Flash::error("Error 417, please check the form and submit again.".to_string())
        );
        assert!(harness.notifier.sent().is_empty());
    }

    #[tokio::test]
    async fn incomplete_item_row_is_rejected_before_erp() {
        let harness = harness(InMemoryErp::new(), None);
        let mut form = issue_form();
        form.push(("item_name[]".to_string(), "Friability Tester".to_string()));

        let flash =
            submit(&harness.state, SubmissionKind::Issue, &FormFields::new(form), today()).await;

        assert_eq!(flash.kind, FlashKind::Error);
        assert!(flash.message.starts_with("Error occurred: item row 2"));
        assert!(harness.erp.created_issues().await.is_empty());
    }

    #[tokio::test]
    async fn warranty_claim_redirects_with_success_even_when_email_fails() {
        let harness =
            harness_with_notifier(InMemoryErp::new(), None, RecordingNotifier::failing());

        let response = submit_warranty_claim(
            State(harness.state.clone()),
            Form(pairs(&[
                ("custom_contact_email", "plant@acme.example.com"),
                ("contact_person_name", "Ravi"),
                ("phone_number", "9811111111"),
                ("complaint", "Display flickers"),
            ])),
        )
        .await
        .into_response();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        let location = response
            .headers()
            .get(LOCATION)
            .and_then(|value| value.to_str().ok())
            .expect("redirect location");
        assert!(location.starts_with("/warranty?flash=success&message=Request%20submitted"));
        assert!(location.contains("Warranty%20Name%3A%20WC-00001"));

        let claims = harness.erp.created_warranty_claims().await;
        assert_eq!(claims.len(), 1);
        assert_eq!(claims[0].complaint_raised_by, "Ravi 9811111111");
        assert_eq!(harness.notifier.sent().len(), 1);
        assert_eq!(harness.notifier.sent()[0].subject, "Electrolab Warranty Form Notification");
    }

    #[test]
    fn flash_location_encodes_message() {
        let flash = Flash::error("Error occurred: a&b=c".to_string());

        assert_eq!(
            flash.location("/issue"),
            "/issue?flash=error&message=Error%20occurred%3A%20a%26b%3Dc"
        );
    }
}
