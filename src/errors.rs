use crate::{config::API_KEY_ENV, CheckResult, ErrorKind, LookupFailure};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum WhoisError {
    #[error("invalid domain format: {0}")]
    InvalidDomain(String),

    #[error("expected exactly one domain argument, got {0}")]
    InvalidArguments(usize),

    #[error("credential not set: {} is missing", API_KEY_ENV)]
    MissingCredential,

    #[error("Configuration error: {0}")]
    ConfigError(#[from] config::ConfigError),

    #[error("invalid whois API endpoint: {0}")]
    InvalidEndpoint(#[from] url::ParseError),

    #[error("request timed out")]
    Timeout,

    #[error("{0}")]
    Network(String),

    #[error("credential invalid or missing")]
    Unauthorized,

    #[error("rate limit reached")]
    RateLimited,

    #[error("unexpected status {0}")]
    UnexpectedStatus(u16),

    #[error("invalid response from whois API: {0}")]
    InvalidResponse(String),

    #[error("System error: {0}")]
    System(String),
}

impl From<reqwest::Error> for WhoisError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            WhoisError::Timeout
        } else {
            WhoisError::Network(error.to_string())
        }
    }
}

impl WhoisError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            WhoisError::InvalidDomain(_) | WhoisError::InvalidArguments(_) => {
                ErrorKind::ValidationError
            }
            WhoisError::MissingCredential
            | WhoisError::ConfigError(_)
            | WhoisError::InvalidEndpoint(_) => ErrorKind::ConfigurationError,
            WhoisError::Timeout
            | WhoisError::Network(_)
            | WhoisError::Unauthorized
            | WhoisError::RateLimited
            | WhoisError::UnexpectedStatus(_)
            | WhoisError::InvalidResponse(_) => ErrorKind::ApiError,
            WhoisError::System(_) => ErrorKind::SystemError,
        }
    }

    /// What the caller can do about it, shown next to the message.
    pub fn suggested_action(&self) -> String {
        match self {
            WhoisError::InvalidDomain(_) => {
                "Use a domain name like example.com or sub.example.co.uk".to_string()
            }
            WhoisError::InvalidArguments(_) => {
                "Usage: whois-check <domain> (e.g. whois-check example.com)".to_string()
            }
            WhoisError::MissingCredential => {
                format!("Set {} to your whois API key, e.g. export {}=<key>", API_KEY_ENV, API_KEY_ENV)
            }
            WhoisError::ConfigError(_) | WhoisError::InvalidEndpoint(_) => {
                "Check the WHOIS_* environment variables".to_string()
            }
            WhoisError::Timeout | WhoisError::Network(_) => {
                "Check your network connectivity".to_string()
            }
            WhoisError::Unauthorized => {
                format!("Check that {} holds a valid API key", API_KEY_ENV)
            }
            WhoisError::RateLimited => {
                "Cached results are still usable; retry later".to_string()
            }
            WhoisError::UnexpectedStatus(_) | WhoisError::InvalidResponse(_) => {
                "Retry later".to_string()
            }
            WhoisError::System(_) => "Check the runtime environment".to_string(),
        }
    }
}

impl From<WhoisError> for CheckResult {
    fn from(error: WhoisError) -> Self {
        CheckResult::Error(LookupFailure {
            error_kind: error.kind(),
            message: error.to_string(),
            suggested_action: error.suggested_action(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        assert_eq!(WhoisError::InvalidDomain("x".into()).kind(), ErrorKind::ValidationError);
        assert_eq!(WhoisError::InvalidArguments(0).kind(), ErrorKind::ValidationError);
        assert_eq!(WhoisError::MissingCredential.kind(), ErrorKind::ConfigurationError);
        assert_eq!(WhoisError::Timeout.kind(), ErrorKind::ApiError);
        assert_eq!(WhoisError::RateLimited.kind(), ErrorKind::ApiError);
        assert_eq!(WhoisError::UnexpectedStatus(503).kind(), ErrorKind::ApiError);
        assert_eq!(WhoisError::System("no runtime".into()).kind(), ErrorKind::SystemError);
    }

    #[test]
    fn test_conversion_to_check_result() {
        let result = CheckResult::from(WhoisError::UnexpectedStatus(503));
        match result {
            CheckResult::Error(failure) => {
                assert_eq!(failure.error_kind, ErrorKind::ApiError);
                assert_eq!(failure.message, "unexpected status 503");
                assert_eq!(failure.suggested_action, "Retry later");
            }
            other => panic!("expected error result, got {:?}", other),
        }
    }

    #[test]
    fn test_rate_limit_hints_at_cache() {
        let action = WhoisError::RateLimited.suggested_action();
        assert!(action.contains("Cached results"));
        assert!(action.contains("retry later"));
    }
}
