use thiserror::Error;

#[derive(Error, Debug)]
pub enum SyncError {
    #[error("{service} rejected the credentials (HTTP {status})")]
    AuthenticationError { service: String, status: u16 },

    #[error("Transient failure talking to {service}: {message}")]
    TransientError { service: String, message: String },

    #[error("Malformed response from {service}: {message}")]
    FatalError { service: String, message: String },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Missing configuration value: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid configuration value for {field}: '{value}' ({reason})")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Contact lookup failed for order {order_id}: {message}")]
    ContactLookupError { order_id: String, message: String },

    #[error("Credential signing failed: {0}")]
    TokenError(#[from] jsonwebtoken::errors::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("CSV rendering error: {0}")]
    CsvError(#[from] csv::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Authentication,
    Network,
    Data,
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

impl SyncError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            SyncError::AuthenticationError { .. } => ErrorCategory::Authentication,
            SyncError::TransientError { .. } => ErrorCategory::Network,
            SyncError::FatalError { .. } | SyncError::ContactLookupError { .. } => {
                ErrorCategory::Data
            }
            SyncError::ConfigError { .. }
            | SyncError::MissingConfigError { .. }
            | SyncError::InvalidConfigValueError { .. }
            | SyncError::TokenError(_) => ErrorCategory::Configuration,
            SyncError::IoError(_) | SyncError::CsvError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            SyncError::ContactLookupError { .. } => ErrorSeverity::Low,
            SyncError::TransientError { .. } => ErrorSeverity::Medium,
            SyncError::AuthenticationError { .. }
            | SyncError::FatalError { .. }
            | SyncError::ConfigError { .. }
            | SyncError::MissingConfigError { .. }
            | SyncError::InvalidConfigValueError { .. } => ErrorSeverity::High,
            SyncError::TokenError(_)
            | SyncError::IoError(_)
            | SyncError::CsvError(_) => ErrorSeverity::Critical,
        }
    }

    /// Process exit code for a run that ended with this error.
    pub fn exit_code(&self) -> i32 {
        match self.severity() {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            SyncError::AuthenticationError { .. } => {
                "Check the API key, site id and service-account key, then re-run"
            }
            SyncError::TransientError { .. } => "The remote service is unavailable; re-run later",
            SyncError::FatalError { .. } => {
                "The API returned an unexpected payload; check for API changes"
            }
            SyncError::ConfigError { .. } => {
                "Share the spreadsheet with the service account and check the worksheet id"
            }
            SyncError::MissingConfigError { .. } | SyncError::InvalidConfigValueError { .. } => {
                "Fix the configuration file or the environment variables it references"
            }
            SyncError::ContactLookupError { .. } => "The order was skipped; verify the contact exists",
            SyncError::TokenError(_) => "The service-account private key is invalid",
            SyncError::IoError(_) => "Check file paths and permissions",
            SyncError::CsvError(_) => "Re-run with --verbose and report the failing record",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Authentication => format!("Authentication failed: {}", self),
            ErrorCategory::Network => format!("Network problem: {}", self),
            ErrorCategory::Data => format!("Unexpected data: {}", self),
            ErrorCategory::Configuration => format!("Configuration problem: {}", self),
            ErrorCategory::System => format!("System error: {}", self),
        }
    }

    /// Whether the failure is confined to the record being processed. Rejected
    /// credentials, bad configuration and local I/O recur on every request.
    pub fn is_record_level(&self) -> bool {
        matches!(
            self,
            SyncError::ContactLookupError { .. }
                | SyncError::TransientError { .. }
                | SyncError::FatalError { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, SyncError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_maps_to_exit_code() {
        let auth = SyncError::AuthenticationError {
            service: "wix".to_string(),
            status: 401,
        };
        let transient = SyncError::TransientError {
            service: "wix".to_string(),
            message: "HTTP 503".to_string(),
        };
        let lookup = SyncError::ContactLookupError {
            order_id: "1".to_string(),
            message: "not found".to_string(),
        };

        assert_eq!(auth.exit_code(), 1);
        assert_eq!(transient.exit_code(), 2);
        assert_eq!(lookup.exit_code(), 0);
    }

    #[test]
    fn test_record_level_errors() {
        let not_found = SyncError::FatalError {
            service: "Wix Contacts".to_string(),
            message: "unexpected HTTP 404".to_string(),
        };
        let timeout = SyncError::TransientError {
            service: "Wix Contacts".to_string(),
            message: "operation timed out".to_string(),
        };
        let lookup = SyncError::ContactLookupError {
            order_id: "1".to_string(),
            message: "no subscriber".to_string(),
        };
        assert!(not_found.is_record_level());
        assert!(timeout.is_record_level());
        assert!(lookup.is_record_level());

        let auth = SyncError::AuthenticationError {
            service: "Wix Contacts".to_string(),
            status: 403,
        };
        let config = SyncError::ConfigError {
            message: "bad".to_string(),
        };
        let io = SyncError::IoError(std::io::Error::other("disk full"));
        assert!(!auth.is_record_level());
        assert!(!config.is_record_level());
        assert!(!io.is_record_level());
    }

    #[test]
    fn test_user_friendly_message_mentions_category() {
        let err = SyncError::ConfigError {
            message: "worksheet 7 not found".to_string(),
        };
        assert_eq!(err.category(), ErrorCategory::Configuration);
        assert!(err.user_friendly_message().starts_with("Configuration problem"));
        assert!(err.user_friendly_message().contains("worksheet 7"));
    }
}
