use std::sync::LazyLock;

use regex::Regex;

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^@]+@[^@]+\.[^@]+$").expect("email pattern compiles"));

/// Shape check only: `local@domain.tld`, exactly one `@`, a dot after it.
pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}
