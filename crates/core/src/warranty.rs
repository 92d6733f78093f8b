use chrono::NaiveDate;
use serde::Serialize;

pub const EXPIRY_DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum WarrantyStatus {
    #[serde(rename = "Under Warranty")]
    UnderWarranty,
    #[serde(rename = "Out of Warranty")]
    OutOfWarranty,
    #[serde(rename = "Unknown")]
    Unknown,
}

impl WarrantyStatus {
    /// Date-only comparison: an instrument is still covered on its expiry day.
    pub fn from_expiry(expiry: Option<&str>, today: NaiveDate) -> Self {
        let Some(raw) = expiry else {
            return Self::Unknown;
        };

        match NaiveDate::parse_from_str(raw, EXPIRY_DATE_FORMAT) {
            Ok(expires_on) if expires_on >= today => Self::UnderWarranty,
            Ok(_) => Self::OutOfWarranty,
            Err(_) => Self::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::UnderWarranty => "Under Warranty",
            Self::OutOfWarranty => "Out of Warranty",
            Self::Unknown => "Unknown",
        }
    }
}

impl std::fmt::Display for WarrantyStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::WarrantyStatus;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 14).expect("valid date")
    }

    #[test]
    fn expiry_today_is_still_under_warranty() {
        assert_eq!(
            WarrantyStatus::from_expiry(Some("2025-03-14"), today()),
            WarrantyStatus::UnderWarranty
        );
    }

    #[test]
    fn expiry_yesterday_is_out_of_warranty() {
        assert_eq!(
            WarrantyStatus::from_expiry(Some("2025-03-13"), today()),
            WarrantyStatus::OutOfWarranty
        );
    }

    #[test]
    fn future_expiry_is_under_warranty() {
        assert_eq!(
            WarrantyStatus::from_expiry(Some("2027-01-01"), today()),
            WarrantyStatus::UnderWarranty
        );
    }

    #[test]
    fn unparsable_or_missing_expiry_is_unknown() {
        assert_eq!(WarrantyStatus::from_expiry(Some("not-a-date"), today()), WarrantyStatus::Unknown);
        assert_eq!(WarrantyStatus::from_expiry(Some("14/03/2025"), today()), WarrantyStatus::Unknown);
        assert_eq!(WarrantyStatus::from_expiry(Some(""), today()), WarrantyStatus::Unknown);
        assert_eq!(WarrantyStatus::from_expiry(None, today()), WarrantyStatus::Unknown);
    }

    #[test]
    fn serializes_as_display_text() {
        let json = serde_json::to_string(&WarrantyStatus::OutOfWarranty).expect("serialize");
        assert_eq!(json, "\"Out of Warranty\"");
    }
}
