use crate::domain::model::{ModuleId, PartySide};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum OcpiError {
    #[error("Invalid {side} party identifier '{value}': expected two upper-case letters followed by three upper-case alphanumerics")]
    InvalidRoutingParty { side: PartySide, value: String },

    #[error("OCPI request failed with HTTP status {status}: {body}")]
    Http { status: u16, body: String },

    #[error("Connection failed: {0}")]
    Connection(#[from] reqwest::Error),

    #[error("Could not decode OCPI response: {message}")]
    Decode { message: String },

    #[error("Module '{module}' is not served by the remote platform")]
    ModuleNotServed { module: ModuleId },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration field: {field}")]
    MissingConfigError { field: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Validation,
    Authentication,
    Remote,
    Network,
    Resolution,
    Configuration,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl OcpiError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            OcpiError::InvalidRoutingParty { .. } => ErrorCategory::Validation,
            OcpiError::Http { status, .. } if matches!(*status, 401 | 403) => {
                ErrorCategory::Authentication
            }
            OcpiError::Http { .. } | OcpiError::Decode { .. } => ErrorCategory::Remote,
            OcpiError::Connection(_) => ErrorCategory::Network,
            OcpiError::ModuleNotServed { .. } => ErrorCategory::Resolution,
            OcpiError::InvalidConfigValueError { .. }
            | OcpiError::MissingConfigError { .. }
            | OcpiError::TomlError(_) => ErrorCategory::Configuration,
            OcpiError::IoError(_) | OcpiError::SerializationError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            OcpiError::Connection(_) => ErrorSeverity::Medium,
            OcpiError::Http { status, .. } if *status >= 500 => ErrorSeverity::Medium,
            OcpiError::IoError(_) => ErrorSeverity::Critical,
            _ => ErrorSeverity::High,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            OcpiError::InvalidRoutingParty { .. } => {
                "Use a party identifier such as NLABC: country code plus party id, upper-case"
            }
            OcpiError::Http { status, .. } if (400..500).contains(status) => {
                "Check that the session token is still registered with the platform"
            }
            OcpiError::Http { .. } => "The platform reported a server error, try again later",
            OcpiError::Connection(_) => "Check network connectivity and the endpoint URLs in the session file",
            OcpiError::Decode { .. } => "The platform did not answer with an OCPI response envelope",
            OcpiError::ModuleNotServed { .. } => {
                "Run the endpoints command to list the modules this platform serves"
            }
            OcpiError::IoError(_) => "Check that the session file exists and is readable",
            OcpiError::SerializationError(_) | OcpiError::TomlError(_) => {
                "Check the syntax of the session file"
            }
            OcpiError::InvalidConfigValueError { .. } | OcpiError::MissingConfigError { .. } => {
                "Check the command line arguments and session file"
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            OcpiError::Http { status, .. } => {
                format!("The platform rejected the request (HTTP {})", status)
            }
            OcpiError::Connection(_) => "Could not reach the platform".to_string(),
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, OcpiError>;
