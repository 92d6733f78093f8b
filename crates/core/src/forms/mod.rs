//! Portal form submissions and the ERP payloads built from them.

pub mod issue;
pub mod warranty;

pub use issue::{IssueItem, IssuePayload};
pub use warranty::WarrantyClaimPayload;

use chrono::NaiveDate;

use crate::email::is_valid_email;
use crate::errors::DomainError;

pub const FORM_DATE_FORMAT: &str = "%Y-%m-%d";

/// Raw `application/x-www-form-urlencoded` fields in submission order.
///
/// Keys may repeat (`issue_type`, `serial_no[]`, ...); single-value lookups
/// return the first occurrence.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FormFields {
    pairs: Vec<(String, String)>,
}

impl FormFields {
    pub fn new(pairs: Vec<(String, String)>) -> Self {
        Self { pairs }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs.iter().find(|(name, _)| name == key).map(|(_, value)| value.as_str())
    }

    pub fn get_all(&self, key: &str) -> Vec<&str> {
        self.pairs
            .iter()
            .filter(|(name, _)| name == key)
            .map(|(_, value)| value.as_str())
            .collect()
    }

    fn owned(&self, key: &str) -> Option<String> {
        self.get(key).map(str::to_string)
    }

    fn text(&self, key: &str) -> &str {
        self.get(key).unwrap_or_default()
    }

    /// Missing and empty values both fall back to `default`.
    fn or_default(&self, key: &str, default: &str) -> String {
        match self.get(key) {
            Some(value) if !value.is_empty() => value.to_string(),
            _ => default.to_string(),
        }
    }

    fn date_or_today(&self, key: &str, today: NaiveDate) -> String {
        self.or_default(key, &today.format(FORM_DATE_FORMAT).to_string())
    }

    /// Trimmed `custom_contact_email`, rejected unless it looks like an address.
    pub fn contact_email(&self) -> Result<String, DomainError> {
        let email = self.text("custom_contact_email").trim();
        if email.is_empty() || !is_valid_email(email) {
            return Err(DomainError::InvalidContactEmail(email.to_string()));
        }
        Ok(email.to_string())
    }
}

impl FromIterator<(String, String)> for FormFields {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self { pairs: iter.into_iter().collect() }
    }
}

#[cfg(test)]
pub(crate) fn fields(pairs: &[(&str, &str)]) -> FormFields {
    pairs.iter().map(|(key, value)| (key.to_string(), value.to_string())).collect()
}

#[cfg(test)]
mod tests {
    use super::fields;
    use crate::errors::DomainError;

    #[test]
    fn repeated_keys_keep_submission_order() {
        let form = fields(&[("issue_type", "Hardware"), ("other", "x"), ("issue_type", "Software")]);

        assert_eq!(form.get("issue_type"), Some("Hardware"));
        assert_eq!(form.get_all("issue_type"), vec!["Hardware", "Software"]);
        assert!(form.get_all("missing").is_empty());
    }

    #[test]
    fn contact_email_is_trimmed_before_validation() {
        let form = fields(&[("custom_contact_email", "  qa@lab.example.com ")]);

        assert_eq!(form.contact_email(), Ok("qa@lab.example.com".to_string()));
    }

    #[test]
    fn blank_or_malformed_contact_email_is_rejected() {
        assert_eq!(
            fields(&[("custom_contact_email", "   ")]).contact_email(),
            Err(DomainError::InvalidContactEmail(String::new()))
        );
        assert!(fields(&[("custom_contact_email", "qa@lab")]).contact_email().is_err());
        assert!(fields(&[]).contact_email().is_err());
    }
}
