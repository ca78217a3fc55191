use thiserror::Error;

/// 後端沒有提供訊息時顯示給使用者的預設文字
pub const FALLBACK_MESSAGE: &str = "Something went wrong. Please try again.";

#[derive(Error, Debug)]
pub enum ZooError {
    #[error("{message}")]
    Validation { field: String, message: String },

    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("Backend request failed ({status}): {message}")]
    Backend {
        status: u16,
        code: Option<String>,
        message: String,
    },

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("CSV processing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Invalid configuration value for {field} ({value}): {reason}")]
    InvalidConfigValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfig { field: String },

    #[error(
        "Animal {animal_id} was moved to {destination} but its history record could not be written{}: {source}",
        revert_suffix(.compensated)
    )]
    LedgerAppendFailed {
        animal_id: String,
        destination: String,
        compensated: bool,
        #[source]
        source: Box<ZooError>,
    },

    #[error("QR payload error: {message}")]
    Qr { message: String },
}

fn revert_suffix(compensated: &bool) -> &'static str {
    if *compensated {
        " (move reverted)"
    } else {
        ""
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Validation,
    NotFound,
    Backend,
    Network,
    PartialFailure,
    Configuration,
    Internal,
}

impl ZooError {
    pub fn validation(field: &str, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.to_string(),
            message: message.into(),
        }
    }

    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity,
            id: id.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Validation { .. } => ErrorCategory::Validation,
            Self::NotFound { .. } => ErrorCategory::NotFound,
            Self::Backend { .. } => ErrorCategory::Backend,
            Self::Http(_) => ErrorCategory::Network,
            Self::LedgerAppendFailed { .. } => ErrorCategory::PartialFailure,
            Self::Config { .. } | Self::InvalidConfigValue { .. } | Self::MissingConfig { .. } => {
                ErrorCategory::Configuration
            }
            Self::Serialization(_) | Self::Csv(_) | Self::Io(_) | Self::Qr { .. } => {
                ErrorCategory::Internal
            }
        }
    }

    /// The animal row was already mutated when this error was produced.
    pub fn is_partial_failure(&self) -> bool {
        matches!(
            self,
            Self::LedgerAppendFailed {
                compensated: false,
                ..
            }
        )
    }

    /// 給使用者確認對話框用的訊息，空訊息時回退到預設文字
    pub fn user_message(&self) -> String {
        let message = match self {
            Self::Validation { message, .. } | Self::Backend { message, .. } => message.clone(),
            other => other.to_string(),
        };

        if message.trim().is_empty() {
            FALLBACK_MESSAGE.to_string()
        } else {
            message
        }
    }
}

pub type Result<T> = std::result::Result<T, ZooError>;
