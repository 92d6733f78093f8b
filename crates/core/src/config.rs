use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::email::is_valid_email;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub erp: ErpConfig,
    pub smtp: SmtpConfig,
    pub server: ServerConfig,
    pub portal: PortalConfig,
    pub zonal: ZonalConfig,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug)]
pub struct ErpConfig {
    pub base_url: String,
    pub api_key: String,
    pub api_secret: SecretString,
    /// Page length sent on "fetch everything" reads.
    pub page_length: u64,
    pub timeout_secs: u64,
}

#[derive(Clone, Debug)]
pub struct SmtpConfig {
    pub enabled: bool,
    pub host: String,
    pub port: u16,
    pub tls: SmtpTls,
    pub username: String,
    pub password: SecretString,
    pub from_address: String,
    pub brand: String,
}

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub bind_address: String,
    pub port: u16,
    pub pages_dir: PathBuf,
    pub static_dir: PathBuf,
}

#[derive(Clone, Debug)]
pub struct PortalConfig {
    pub support_contact: String,
}

#[derive(Clone, Debug)]
pub struct ZonalConfig {
    /// Zero disables the background rebuild.
    pub refresh_interval_secs: u64,
}

#[derive(Clone, Debug)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SmtpTls {
    /// TLS from the first byte, usually port 465.
    Implicit,
    /// Plain connection upgraded with STARTTLS, usually port 587.
    Starttls,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub erp_base_url: Option<String>,
    pub erp_api_key: Option<String>,
    pub erp_api_secret: Option<String>,
    pub smtp_enabled: Option<bool>,
    pub smtp_password: Option<String>,
    pub server_port: Option<u16>,
    pub log_level: Option<String>,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
    pub overrides: ConfigOverrides,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("required config file was not found: `{0}`")]
    MissingConfigFile(PathBuf),
    #[error("environment variable interpolation failed for `{var}`")]
    MissingEnvInterpolation { var: String },
    #[error("unterminated environment interpolation expression")]
    UnterminatedInterpolation,
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            erp: ErpConfig {
                base_url: "https://erpv14.electrolabgroup.com/".to_string(),
                api_key: String::new(),
                api_secret: String::new().into(),
                page_length: 100_000_000_000,
                timeout_secs: 30,
            },
            smtp: SmtpConfig {
                enabled: true,
                host: "email.electrolabgroup.com".to_string(),
                port: 465,
                tls: SmtpTls::Implicit,
                username: "econnect".to_string(),
                password: String::new().into(),
                from_address: "econnect@electrolabgroup.com".to_string(),
                brand: "Electrolab".to_string(),
            },
            server: ServerConfig {
                bind_address: "0.0.0.0".to_string(),
                port: 5001,
                pages_dir: PathBuf::from("templates"),
                static_dir: PathBuf::from("static"),
            },
            portal: PortalConfig {
                support_contact: "service@electrolabgroup.com or +91 9167839674".to_string(),
            },
            zonal: ZonalConfig { refresh_interval_secs: 0 },
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
        }
    }
}

fn secret_value(value: String) -> SecretString {
    value.into()
}

impl std::str::FromStr for SmtpTls {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "implicit" | "tls" | "ssl" => Ok(Self::Implicit),
            "starttls" => Ok(Self::Starttls),
            other => Err(ConfigError::Validation(format!(
                "unsupported smtp tls mode `{other}` (expected implicit|starttls)"
            ))),
        }
    }
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Validation(format!(
                "unsupported log format `{other}` (expected compact|pretty|json)"
            ))),
        }
    }
}

impl AppConfig {
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let maybe_path = resolve_config_path(options.config_path.as_deref());

        if let Some(path) = maybe_path {
            let patch = read_patch(&path)?;
            config.apply_patch(patch);
        } else if options.require_file {
            let expected = options.config_path.unwrap_or_else(|| PathBuf::from("econnect.toml"));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides);
        config.validate()?;

        Ok(config)
    }

    fn apply_patch(&mut self, patch: ConfigPatch) {
        if let Some(erp) = patch.erp {
            if let Some(base_url) = erp.base_url {
                self.erp.base_url = base_url;
            }
            if let Some(api_key) = erp.api_key {
                self.erp.api_key = api_key;
            }
            if let Some(api_secret) = erp.api_secret {
                self.erp.api_secret = secret_value(api_secret);
            }
            if let Some(page_length) = erp.page_length {
                self.erp.page_length = page_length;
            }
            if let Some(timeout_secs) = erp.timeout_secs {
                self.erp.timeout_secs = timeout_secs;
            }
        }

        if let Some(smtp) = patch.smtp {
            if let Some(enabled) = smtp.enabled {
                self.smtp.enabled = enabled;
            }
            if let Some(host) = smtp.host {
                self.smtp.host = host;
            }
            if let Some(port) = smtp.port {
                self.smtp.port = port;
            }
            if let Some(tls) = smtp.tls {
                self.smtp.tls = tls;
            }
            if let Some(username) = smtp.username {
                self.smtp.username = username;
            }
            if let Some(password) = smtp.password {
                self.smtp.password = secret_value(password);
            }
            if let Some(from_address) = smtp.from_address {
                self.smtp.from_address = from_address;
            }
            if let Some(brand) = smtp.brand {
                self.smtp.brand = brand;
            }
        }

        if let Some(server) = patch.server {
            if let Some(bind_address) = server.bind_address {
                self.server.bind_address = bind_address;
            }
            if let Some(port) = server.port {
                self.server.port = port;
            }
            if let Some(pages_dir) = server.pages_dir {
                self.server.pages_dir = pages_dir;
            }
            if let Some(static_dir) = server.static_dir {
                self.server.static_dir = static_dir;
            }
        }

        if let Some(portal) = patch.portal {
            if let Some(support_contact) = portal.support_contact {
                self.portal.support_contact = support_contact;
            }
        }

        if let Some(zonal) = patch.zonal {
            if let Some(refresh_interval_secs) = zonal.refresh_interval_secs {
                self.zonal.refresh_interval_secs = refresh_interval_secs;
            }
        }

        if let Some(logging) = patch.logging {
            if let Some(level) = logging.level {
                self.logging.level = level;
            }
            if let Some(format) = logging.format {
                self.logging.format = format;
            }
        }
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Some(value) = read_env("ECONNECT_ERP_BASE_URL") {
            self.erp.base_url = value;
        }
        if let Some(value) = read_env("ECONNECT_ERP_API_KEY") {
            self.erp.api_key = value;
        }
        if let Some(value) = read_env("ECONNECT_ERP_API_SECRET") {
            self.erp.api_secret = secret_value(value);
        }
        if let Some(value) = read_env("ECONNECT_ERP_PAGE_LENGTH") {
            self.erp.page_length = parse_u64("ECONNECT_ERP_PAGE_LENGTH", &value)?;
        }
        if let Some(value) = read_env("ECONNECT_ERP_TIMEOUT_SECS") {
            self.erp.timeout_secs = parse_u64("ECONNECT_ERP_TIMEOUT_SECS", &value)?;
        }

        if let Some(value) = read_env("ECONNECT_SMTP_ENABLED") {
            self.smtp.enabled = parse_bool("ECONNECT_SMTP_ENABLED", &value)?;
        }
        if let Some(value) = read_env("ECONNECT_SMTP_HOST") {
            self.smtp.host = value;
        }
        if let Some(value) = read_env("ECONNECT_SMTP_PORT") {
            self.smtp.port = parse_u16("ECONNECT_SMTP_PORT", &value)?;
        }
        if let Some(value) = read_env("ECONNECT_SMTP_TLS") {
            self.smtp.tls = value.parse()?;
        }
        if let Some(value) = read_env("ECONNECT_SMTP_USERNAME") {
            self.smtp.username = value;
        }
        if let Some(value) = read_env("ECONNECT_SMTP_PASSWORD") {
            self.smtp.password = secret_value(value);
        }
        if let Some(value) = read_env("ECONNECT_SMTP_FROM_ADDRESS") {
            self.smtp.from_address = value;
        }
        if let Some(value) = read_env("ECONNECT_SMTP_BRAND") {
            self.smtp.brand = value;
        }

        if let Some(value) = read_env("ECONNECT_SERVER_BIND_ADDRESS") {
            self.server.bind_address = value;
        }
        if let Some(value) = read_env("ECONNECT_SERVER_PORT") {
            self.server.port = parse_u16("ECONNECT_SERVER_PORT", &value)?;
        }
        if let Some(value) = read_env("ECONNECT_SERVER_PAGES_DIR") {
            self.server.pages_dir = PathBuf::from(value);
        }
        if let Some(value) = read_env("ECONNECT_SERVER_STATIC_DIR") {
            self.server.static_dir = PathBuf::from(value);
        }

        if let Some(value) = read_env("ECONNECT_PORTAL_SUPPORT_CONTACT") {
            self.portal.support_contact = value;
        }

        if let Some(value) = read_env("ECONNECT_ZONAL_REFRESH_INTERVAL_SECS") {
            self.zonal.refresh_interval_secs =
                parse_u64("ECONNECT_ZONAL_REFRESH_INTERVAL_SECS", &value)?;
        }

        let log_level =
            read_env("ECONNECT_LOGGING_LEVEL").or_else(|| read_env("ECONNECT_LOG_LEVEL"));
        if let Some(value) = log_level {
            self.logging.level = value;
        }
        let log_format =
            read_env("ECONNECT_LOGGING_FORMAT").or_else(|| read_env("ECONNECT_LOG_FORMAT"));
        if let Some(value) = log_format {
            self.logging.format = value.parse()?;
        }

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(base_url) = overrides.erp_base_url {
            self.erp.base_url = base_url;
        }
        if let Some(api_key) = overrides.erp_api_key {
            self.erp.api_key = api_key;
        }
        if let Some(api_secret) = overrides.erp_api_secret {
            self.erp.api_secret = secret_value(api_secret);
        }
        if let Some(enabled) = overrides.smtp_enabled {
            self.smtp.enabled = enabled;
        }
        if let Some(password) = overrides.smtp_password {
            self.smtp.password = secret_value(password);
        }
        if let Some(port) = overrides.server_port {
            self.server.port = port;
        }
        if let Some(log_level) = overrides.log_level {
            self.logging.level = log_level;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_erp(&self.erp)?;
        validate_smtp(&self.smtp)?;
        validate_server(&self.server)?;
        validate_portal(&self.portal)?;
        validate_logging(&self.logging)?;
        Ok(())
    }
}

pub fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then_some(path.to_path_buf());
    }

    [PathBuf::from("econnect.toml"), PathBuf::from("config/econnect.toml")]
        .into_iter()
        .find(|path| path.exists())
}

fn read_patch(path: &Path) -> Result<ConfigPatch, ConfigError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;

    let interpolated = interpolate_env_vars(&raw)?;
    toml::from_str::<ConfigPatch>(&interpolated)
        .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
}

fn interpolate_env_vars(input: &str) -> Result<String, ConfigError> {
    let mut output = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && matches!(chars.peek(), Some('{')) {
            chars.next();
            let mut key = String::new();

            loop {
                match chars.next() {
                    Some('}') => break,
                    Some(next) => key.push(next),
                    None => return Err(ConfigError::UnterminatedInterpolation),
                }
            }

            let value = env::var(&key)
                .map_err(|_| ConfigError::MissingEnvInterpolation { var: key.clone() })?;
            output.push_str(&value);
            continue;
        }

        output.push(ch);
    }

    Ok(output)
}

fn validate_erp(erp: &ErpConfig) -> Result<(), ConfigError> {
    let base_url = erp.base_url.trim();
    if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
        return Err(ConfigError::Validation(
            "erp.base_url must start with http:// or https://".to_string(),
        ));
    }

    if erp.api_key.trim().is_empty() {
        return Err(ConfigError::Validation(
            "erp.api_key is required. Generate it from the ERP user settings > API Access"
                .to_string(),
        ));
    }
    if erp.api_secret.expose_secret().trim().is_empty() {
        return Err(ConfigError::Validation(
            "erp.api_secret is required. It is shown once when the ERP API key is generated"
                .to_string(),
        ));
    }

    if erp.page_length == 0 {
        return Err(ConfigError::Validation(
            "erp.page_length must be greater than zero".to_string(),
        ));
    }

    if erp.timeout_secs == 0 || erp.timeout_secs > 600 {
        return Err(ConfigError::Validation(
            "erp.timeout_secs must be in range 1..=600".to_string(),
        ));
    }

    Ok(())
}

fn validate_smtp(smtp: &SmtpConfig) -> Result<(), ConfigError> {
    if !smtp.enabled {
        return Ok(());
    }

    if smtp.host.trim().is_empty() {
        return Err(ConfigError::Validation(
            "smtp.host is required when smtp.enabled is true".to_string(),
        ));
    }
    if smtp.port == 0 {
        return Err(ConfigError::Validation("smtp.port must be greater than zero".to_string()));
    }
    if smtp.username.trim().is_empty() || smtp.password.expose_secret().is_empty() {
        return Err(ConfigError::Validation(
            "smtp.username and smtp.password are required when smtp.enabled is true (set smtp.enabled = false to skip notifications)".to_string(),
        ));
    }
    if !is_valid_email(smtp.from_address.trim()) {
        return Err(ConfigError::Validation(format!(
            "smtp.from_address `{}` is not a valid email address",
            smtp.from_address
        )));
    }

    Ok(())
}

fn validate_server(server: &ServerConfig) -> Result<(), ConfigError> {
    if server.bind_address.trim().is_empty() {
        return Err(ConfigError::Validation("server.bind_address must not be empty".to_string()));
    }

    if server.port == 0 {
        return Err(ConfigError::Validation("server.port must be greater than zero".to_string()));
    }

    Ok(())
}

fn validate_portal(portal: &PortalConfig) -> Result<(), ConfigError> {
    if portal.support_contact.trim().is_empty() {
        return Err(ConfigError::Validation(
            "portal.support_contact must not be empty".to_string(),
        ));
    }
    Ok(())
}

fn validate_logging(logging: &LoggingConfig) -> Result<(), ConfigError> {
    let level = logging.level.trim().to_ascii_lowercase();
    match level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        _ => Err(ConfigError::Validation(
            "logging.level must be one of trace|debug|info|warn|error".to_string(),
        )),
    }
}

fn read_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_u16(key: &str, value: &str) -> Result<u16, ConfigError> {
    value.parse::<u16>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_u64(key: &str, value: &str) -> Result<u64, ConfigError> {
    value.parse::<u64>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    value.parse::<bool>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    erp: Option<ErpPatch>,
    smtp: Option<SmtpPatch>,
    server: Option<ServerPatch>,
    portal: Option<PortalPatch>,
    zonal: Option<ZonalPatch>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct ErpPatch {
    base_url: Option<String>,
    api_key: Option<String>,
    api_secret: Option<String>,
    page_length: Option<u64>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct SmtpPatch {
    enabled: Option<bool>,
    host: Option<String>,
    port: Option<u16>,
    tls: Option<SmtpTls>,
    username: Option<String>,
    password: Option<String>,
    from_address: Option<String>,
    brand: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ServerPatch {
    bind_address: Option<String>,
    port: Option<u16>,
    pages_dir: Option<PathBuf>,
    static_dir: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
struct PortalPatch {
    support_contact: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ZonalPatch {
    refresh_interval_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}
