use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, Clone, Serialize, Deserialize)]
pub enum PartforgeError {
    #[error("Invalid input: {field} - {message}")]
    Validation { field: String, message: String },

    #[error("Circular BOM reference: {}", path.join(" -> "))]
    CycleDetected { path: Vec<String> },

    #[error("Not found: {resource}")]
    NotFound { resource: String },

    #[error("Database error: {message}")]
    Database { message: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("I/O error: {message}")]
    Io { message: String },

    #[error("Internal server error: {message}")]
    Internal { message: String },
}

impl PartforgeError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn cycle_detected(path: Vec<String>) -> Self {
        Self::CycleDetected { path }
    }

    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::NotFound {
            resource: resource.into(),
        }
    }

    pub fn database(message: impl Into<String>) -> Self {
        Self::Database {
            message: message.into(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Validation { .. } => "INVALID_INPUT",
            Self::CycleDetected { .. } => "CYCLE_DETECTED",
            Self::NotFound { .. } => "NOT_FOUND",
            Self::Database { .. } => "DATABASE_ERROR",
            Self::Configuration { .. } => "CONFIGURATION_ERROR",
            Self::Io { .. } => "IO_ERROR",
            Self::Internal { .. } => "INTERNAL_SERVER_ERROR",
        }
    }

    pub fn http_status_code(&self) -> u16 {
        match self {
            Self::Validation { .. } => 400,
            Self::CycleDetected { .. } => 422,
            Self::NotFound { .. } => 404,
            Self::Database { .. } => 500,
            Self::Configuration { .. } => 500,
            Self::Io { .. } => 500,
            Self::Internal { .. } => 500,
        }
    }
}

pub type PartforgeResult<T> = Result<T, PartforgeError>;

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
    pub message: String,
    pub details: Option<serde_json::Value>,
}

impl From<PartforgeError> for ErrorResponse {
    fn from(error: PartforgeError) -> Self {
        let details = match &error {
            PartforgeError::Validation { field, .. } => Some(serde_json::json!({ "field": field })),
            PartforgeError::CycleDetected { path } => Some(serde_json::json!({ "path": path })),
            _ => None,
        };
        let message = match &error {
            PartforgeError::Validation { message, .. } => message.clone(),
            other => other.to_string(),
        };

        Self {
            error: error.to_string(),
            code: error.error_code().to_string(),
            message,
            details,
        }
    }
}

// Conversion from common error types
impl From<sqlx::Error> for PartforgeError {
    fn from(error: sqlx::Error) -> Self {
        Self::database(error.to_string())
    }
}

impl From<std::io::Error> for PartforgeError {
    fn from(error: std::io::Error) -> Self {
        Self::Io {
            message: error.to_string(),
        }
    }
}

impl From<csv::Error> for PartforgeError {
    fn from(error: csv::Error) -> Self {
        Self::Io {
            message: error.to_string(),
        }
    }
}

impl From<serde_json::Error> for PartforgeError {
    fn from(error: serde_json::Error) -> Self {
        Self::validation("JSON", error.to_string())
    }
}

impl From<config::ConfigError> for PartforgeError {
    fn from(error: config::ConfigError) -> Self {
        Self::configuration(error.to_string())
    }
}
