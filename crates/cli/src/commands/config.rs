use std::env;
use std::fs;
use std::path::Path;

use econnect_core::config::{resolve_config_path, AppConfig, LoadOptions};
use secrecy::ExposeSecret;
use toml::Value;

struct Field {
    key: &'static str,
    env_keys: &'static [&'static str],
    value: String,
}

pub fn run() -> String {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => return format!("config validation failed: {error}"),
    };

    let config_file_path = resolve_config_path(None);
    let config_file_doc = load_config_file_doc(config_file_path.as_deref());

    let mut lines = vec!["effective config (source precedence: env > file > default):".to_string()];
    for field in fields(&config) {
        let source = field_source(
            field.key,
            field.env_keys,
            config_file_doc.as_ref(),
            config_file_path.as_deref(),
        );
        lines.push(format!("- {} = {} (source: {source})", field.key, field.value));
    }

    lines.join("\n")
}

fn fields(config: &AppConfig) -> Vec<Field> {
    fn field(key: &'static str, env_keys: &'static [&'static str], value: String) -> Field {
        Field { key, env_keys, value }
    }

    vec![
        field("erp.base_url", &["ECONNECT_ERP_BASE_URL"], config.erp.base_url.clone()),
        field("erp.api_key", &["ECONNECT_ERP_API_KEY"], redact_key(&config.erp.api_key)),
        field(
            "erp.api_secret",
            &["ECONNECT_ERP_API_SECRET"],
            redact_secret(config.erp.api_secret.expose_secret()),
        ),
        field("erp.page_length", &["ECONNECT_ERP_PAGE_LENGTH"], config.erp.page_length.to_string()),
        field(
            "erp.timeout_secs",
            &["ECONNECT_ERP_TIMEOUT_SECS"],
            config.erp.timeout_secs.to_string(),
        ),
        field("smtp.enabled", &["ECONNECT_SMTP_ENABLED"], config.smtp.enabled.to_string()),
        field("smtp.host", &["ECONNECT_SMTP_HOST"], config.smtp.host.clone()),
        field("smtp.port", &["ECONNECT_SMTP_PORT"], config.smtp.port.to_string()),
        field("smtp.tls", &["ECONNECT_SMTP_TLS"], format!("{:?}", config.smtp.tls)),
        field("smtp.username", &["ECONNECT_SMTP_USERNAME"], config.smtp.username.clone()),
        field(
            "smtp.password",
            &["ECONNECT_SMTP_PASSWORD"],
            redact_secret(config.smtp.password.expose_secret()),
        ),
        field(
            "smtp.from_address",
            &["ECONNECT_SMTP_FROM_ADDRESS"],
            config.smtp.from_address.clone(),
        ),
        field("smtp.brand", &["ECONNECT_SMTP_BRAND"], config.smtp.brand.clone()),
        field(
            "server.bind_address",
            &["ECONNECT_SERVER_BIND_ADDRESS"],
            config.server.bind_address.clone(),
        ),
        field("server.port", &["ECONNECT_SERVER_PORT"], config.server.port.to_string()),
        field(
            "server.pages_dir",
            &["ECONNECT_SERVER_PAGES_DIR"],
            config.server.pages_dir.display().to_string(),
        ),
        field(
            "server.static_dir",
            &["ECONNECT_SERVER_STATIC_DIR"],
            config.server.static_dir.display().to_string(),
        ),
        field(
            "portal.support_contact",
            &["ECONNECT_PORTAL_SUPPORT_CONTACT"],
            config.portal.support_contact.clone(),
        ),
        field(
            "zonal.refresh_interval_secs",
            &["ECONNECT_ZONAL_REFRESH_INTERVAL_SECS"],
            config.zonal.refresh_interval_secs.to_string(),
        ),
        field(
            "logging.level",
            &["ECONNECT_LOGGING_LEVEL", "ECONNECT_LOG_LEVEL"],
            config.logging.level.clone(),
        ),
        field(
            "logging.format",
            &["ECONNECT_LOGGING_FORMAT", "ECONNECT_LOG_FORMAT"],
            format!("{:?}", config.logging.format),
        ),
    ]
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let path = path?;
    let raw = fs::read_to_string(path).ok()?;
    raw.parse::<Value>().ok()
}

fn field_source(
    key_path: &str,
    env_keys: &[&str],
    config_file_doc: Option<&Value>,
    config_file_path: Option<&Path>,
) -> String {
    if let Some(env_key) = env_keys.iter().find(|key| env::var_os(key).is_some()) {
        return format!("env ({env_key})");
    }

    if let Some(doc) = config_file_doc {
        if contains_path(doc, key_path) {
            let file_path = config_file_path
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| "config file".to_string());
            return format!("file ({file_path})");
        }
    }

    "default".to_string()
}

fn contains_path(root: &Value, key_path: &str) -> bool {
    let mut current = root;
    for key in key_path.split('.') {
        let Some(next) = current.get(key) else {
            return false;
        };
        current = next;
    }
    true
}

/// API keys are identifiers; the first four characters help tell them apart.
fn redact_key(key: &str) -> String {
    let trimmed = key.trim();
    if trimmed.is_empty() {
        return "<empty>".to_string();
    }

    let prefix: String = trimmed.chars().take(4).collect();
    format!("{prefix}***")
}

fn redact_secret(secret: &str) -> String {
    if secret.trim().is_empty() {
        "<empty>".to_string()
    } else {
        "<redacted>".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::{contains_path, redact_key, redact_secret};

    #[test]
    fn keys_keep_a_short_prefix_and_secrets_are_hidden() {
        assert_eq!(redact_key("3ee8d0394951"), "3ee8***");
        assert_eq!(redact_key("  "), "<empty>");
        assert_eq!(redact_secret("hunter2"), "<redacted>");
        assert_eq!(redact_secret(""), "<empty>");
    }

    #[test]
    fn dotted_paths_walk_nested_tables() {
        let doc: toml::Value = "[erp]\nbase_url = \"https://erp.example/\"\n"
            .parse()
            .expect("toml should parse");

        assert!(contains_path(&doc, "erp.base_url"));
        assert!(!contains_path(&doc, "erp.api_key"));
        assert!(!contains_path(&doc, "smtp.host"));
    }
}
