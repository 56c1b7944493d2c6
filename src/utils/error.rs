use thiserror::Error;

#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("{service} returned {status}: {body}")]
    UpstreamError {
        service: String,
        status: u16,
        body: String,
    },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid configuration value for {field} ('{value}'): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Validation error: {message}")]
    ValidationError { message: String },

    #[error("{kind} similarity too high ({:.2}%). Cannot register.", .score * 100.0)]
    SimilarityRejected { kind: String, score: f64 },

    #[error("Contract call failed: {message}")]
    ContractError { message: String },

    #[error("Session error: {message}")]
    SessionError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Upstream,
    Configuration,
    Input,
    Chain,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl RegistryError {
    pub fn upstream(service: &str, status: u16, body: impl Into<String>) -> Self {
        Self::UpstreamError {
            service: service.to_string(),
            status,
            body: body.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::ValidationError {
            message: message.into(),
        }
    }

    pub fn session(message: impl Into<String>) -> Self {
        Self::SessionError {
            message: message.into(),
        }
    }

    pub fn contract(message: impl Into<String>) -> Self {
        Self::ContractError {
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::HttpError(_) => ErrorCategory::Network,
            Self::UpstreamError { .. } => ErrorCategory::Upstream,
            Self::ConfigError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::MissingConfigError { .. } => ErrorCategory::Configuration,
            Self::ValidationError { .. }
            | Self::SimilarityRejected { .. }
            | Self::SessionError { .. }
            | Self::SerializationError(_) => ErrorCategory::Input,
            Self::ContractError { .. } => ErrorCategory::Chain,
            Self::IoError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::ValidationError { .. }
            | Self::SimilarityRejected { .. }
            | Self::SessionError { .. } => ErrorSeverity::Low,
            Self::HttpError(_) | Self::UpstreamError { .. } | Self::SerializationError(_) => {
                ErrorSeverity::Medium
            }
            Self::ContractError { .. } => ErrorSeverity::High,
            Self::ConfigError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::MissingConfigError { .. }
            | Self::IoError(_) => ErrorSeverity::Critical,
        }
    }

    /// 是否為呼叫端輸入錯誤 (對應 HTTP 400)
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::ValidationError { .. })
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            Self::HttpError(e) if e.is_timeout() => {
                "An upstream service took too long to answer".to_string()
            }
            Self::HttpError(_) => "Could not reach an upstream service".to_string(),
            Self::UpstreamError { service, body, .. } => {
                format!("The {} service reported an error: {}", service, body)
            }
            Self::ValidationError { message } | Self::SessionError { message } => message.clone(),
            Self::MissingConfigError { field } => format!("Configuration value '{}' is missing", field),
            Self::InvalidConfigValueError { field, reason, .. } => {
                format!("Configuration value '{}' is invalid: {}", field, reason)
            }
            other => other.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Network => "Check that the upstream service is running and reachable",
            ErrorCategory::Upstream => "Inspect the upstream service logs for the failing request",
            ErrorCategory::Configuration => {
                "Review the TOML configuration file and the environment variables it references"
            }
            ErrorCategory::Input => "Correct the submitted form and try again",
            ErrorCategory::Chain => "Verify the RPC endpoint, contract address and signer balance",
            ErrorCategory::System => "Check file permissions and available disk space",
        }
    }
}

pub type Result<T> = std::result::Result<T, RegistryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_similarity_rejection_message() {
        let err = RegistryError::SimilarityRejected {
            kind: "PDF".to_string(),
            score: 0.8,
        };
        assert_eq!(
            err.to_string(),
            "PDF similarity too high (80.00%). Cannot register."
        );
        assert_eq!(err.severity(), ErrorSeverity::Low);
    }

    #[test]
    fn test_config_errors_are_critical() {
        let err = RegistryError::MissingConfigError {
            field: "pinata.jwt".to_string(),
        };
        assert_eq!(err.category(), ErrorCategory::Configuration);
        assert_eq!(err.severity(), ErrorSeverity::Critical);
        assert!(err.user_friendly_message().contains("pinata.jwt"));
    }

    #[test]
    fn test_upstream_error_display() {
        let err = RegistryError::upstream("pinata", 401, "unauthorized");
        assert_eq!(err.to_string(), "pinata returned 401: unauthorized");
        assert!(!err.is_client_error());
        assert_eq!(
            err.user_friendly_message(),
            "The pinata service reported an error: unauthorized"
        );
    }

    #[test]
    fn test_input_errors_show_bare_message() {
        let err = RegistryError::session("No PDF found to register.");
        assert_eq!(err.user_friendly_message(), "No PDF found to register.");
        assert_eq!(err.category(), ErrorCategory::Input);
        assert!(RegistryError::validation("bad").is_client_error());
    }
}
