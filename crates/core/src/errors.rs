use thiserror::Error;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error("invalid contact email `{0}`")]
    InvalidContactEmail(String),
    #[error("item row {row} is missing `{field}`")]
    IncompleteItemRow { row: usize, field: &'static str },
    #[error("domain invariant violation: {0}")]
    InvariantViolation(String),
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ApplicationError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error("upstream returned status {status}")]
    UpstreamStatus { status: u16 },
    #[error("integration failure: {0}")]
    Integration(String),
    #[error("configuration failure: {0}")]
    Configuration(String),
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum InterfaceError {
    #[error("bad request: {message}")]
    BadRequest { message: String },
    #[error("not found: {message}")]
    NotFound { message: String },
    #[error("upstream failure: {message}")]
    Upstream { message: String, upstream_status: Option<u16> },
    #[error("internal error: {message}")]
    Internal { message: String },
}

impl InterfaceError {
    pub fn status_code(&self) -> u16 {
        match self {
            Self::BadRequest { .. } => 400,
            Self::NotFound { .. } => 404,
            Self::Upstream { .. } | Self::Internal { .. } => 500,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::BadRequest { message }
            | Self::NotFound { message }
            | Self::Upstream { message, .. }
            | Self::Internal { message } => message,
        }
    }

    pub fn upstream_status(&self) -> Option<u16> {
        match self {
            Self::Upstream { upstream_status, .. } => *upstream_status,
            _ => None,
        }
    }
}

impl ApplicationError {
    /// Text shown to the person who submitted a portal form.
    pub fn flash_message(&self) -> String {
        match self {
            Self::Domain(DomainError::InvalidContactEmail(_)) => {
                "Invalid email address. Please enter a valid email.".to_string()
            }
            Self::UpstreamStatus { status } => {
                format!("Error {status}, please check the form and submit again.")
            }
            Self::Domain(error) => format!("Error occurred: {error}"),
            Self::Integration(message) | Self::Configuration(message) => {
                format!("Error occurred: {message}")
            }
        }
    }
}

impl From<ApplicationError> for InterfaceError {
    fn from(value: ApplicationError) -> Self {
        match value {
            ApplicationError::Domain(error) => Self::BadRequest { message: error.to_string() },
            ApplicationError::UpstreamStatus { status } => Self::Upstream {
                message: "Failed to fetch data from API".to_owned(),
                upstream_status: Some(status),
            },
            ApplicationError::Integration(message) => {
                Self::Upstream { message, upstream_status: None }
            }
            ApplicationError::Configuration(message) => Self::Internal { message },
        }
    }
}
