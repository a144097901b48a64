use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Model API error: {0}")]
    ExternalService(String),

    #[error("Model API rate limit exceeded: {0}")]
    RateLimited(String),

    #[error("Model request timed out after {0} seconds")]
    Timeout(u64),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Failed to parse response: {0}")]
    ParseError(String),

    #[error("Could not classify sentiment: {0}")]
    Classification(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Page template error: {0}")]
    Template(#[from] handlebars::TemplateError),

    #[error("Page rendering error: {0}")]
    Render(#[from] handlebars::RenderError),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Coarse error category surfaced to callers of the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Configuration,
    ExternalService,
    Parse,
    Classification,
    InvalidInput,
    Internal,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Config(_) => ErrorKind::Configuration,
            Error::ExternalService(_)
            | Error::RateLimited(_)
            | Error::Timeout(_)
            | Error::Network(_) => ErrorKind::ExternalService,
            Error::ParseError(_) => ErrorKind::Parse,
            Error::Classification(_) => ErrorKind::Classification,
            Error::InvalidInput(_) => ErrorKind::InvalidInput,
            Error::Io(_) | Error::Template(_) | Error::Render(_) => ErrorKind::Internal,
        }
    }

    pub fn is_external(&self) -> bool {
        self.kind() == ErrorKind::ExternalService
    }

    /// Maps a reqwest failure onto the taxonomy, keeping timeouts distinct.
    pub(crate) fn from_request(err: reqwest::Error, timeout_secs: u64) -> Self {
        if err.is_timeout() {
            Error::Timeout(timeout_secs)
        } else {
            Error::Network(err)
        }
    }

    /// Like `from_request`, for failures while reading or decoding a 2xx body.
    pub(crate) fn from_body(err: reqwest::Error, timeout_secs: u64, provider: &str) -> Self {
        if err.is_timeout() {
            Error::Timeout(timeout_secs)
        } else {
            Error::ExternalService(format!("Failed to parse {} response: {}", provider, err))
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorKind::Configuration => write!(f, "CONFIGURATION_ERROR"),
            ErrorKind::ExternalService => write!(f, "EXTERNAL_SERVICE_ERROR"),
            ErrorKind::Parse => write!(f, "PARSE_ERROR"),
            ErrorKind::Classification => write!(f, "CLASSIFICATION_ERROR"),
            ErrorKind::InvalidInput => write!(f, "INVALID_INPUT"),
            ErrorKind::Internal => write!(f, "INTERNAL_ERROR"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        assert_eq!(Error::Config("x".into()).kind(), ErrorKind::Configuration);
        assert_eq!(Error::Timeout(30).kind(), ErrorKind::ExternalService);
        assert_eq!(Error::RateLimited("x".into()).kind(), ErrorKind::ExternalService);
        assert_eq!(Error::ParseError("x".into()).kind(), ErrorKind::Parse);
        assert!(Error::ExternalService("503".into()).is_external());
        assert!(!Error::Classification("maybe".into()).is_external());
    }

    #[test]
    fn test_template_errors_are_internal() {
        let mut handlebars = handlebars::Handlebars::new();
        let err: Error = handlebars
            .register_template_string("broken", "{{#if open}}never closed")
            .unwrap_err()
            .into();
        assert_eq!(err.kind(), ErrorKind::Internal);
        assert!(!err.is_external());
    }

    #[test]
    fn test_error_kind_codes() {
        assert_eq!(ErrorKind::Parse.to_string(), "PARSE_ERROR");
        assert_eq!(
            serde_json::to_string(&ErrorKind::ExternalService).unwrap(),
            "\"external_service\""
        );
    }
}
