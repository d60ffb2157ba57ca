use std::time::Duration;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CiceroneError {
    #[error("{service} API key is missing, check your environment variables")]
    MissingCredential { service: &'static str },

    #[error("Unauthorized: check {service} API key")]
    Unauthorized { service: &'static str },

    #[error("{service} API error: {message}")]
    Upstream {
        service: &'static str,
        status: Option<u16>,
        code: Option<String>,
        message: String,
    },

    #[error("rewrite timed out after {0:?}")]
    RewriteTimeout(Duration),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CiceroneError {
    pub fn upstream(
        service: &'static str,
        status: Option<u16>,
        code: Option<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::Upstream {
            service,
            status,
            code,
            message: message.into(),
        }
    }

    /// Whether this is the recommendation API's internal-error signature,
    /// which permits a one-time session-reset retry.
    pub fn is_internal_upstream(&self) -> bool {
        match self {
            Self::Upstream { code, message, .. } => {
                if code.as_deref() == Some("internal_error") {
                    return true;
                }
                let lowered = message.to_lowercase();
                lowered.contains("internal_error")
                    || lowered.contains("something went wrong internally")
            }
            _ => false,
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Upstream { status, .. } => *status,
            Self::Unauthorized { .. } => Some(401),
            Self::Http(err) => err.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    pub fn upstream_code(&self) -> Option<&str> {
        match self {
            Self::Upstream { code, .. } => code.as_deref(),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, CiceroneError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_internal_signature_by_code() {
        let err = CiceroneError::upstream(
            "recs",
            Some(500),
            Some("internal_error".to_string()),
            "Something went wrong internally",
        );
        assert!(err.is_internal_upstream());
    }

    #[test]
    fn test_internal_signature_by_message() {
        let err = CiceroneError::upstream(
            "recs",
            Some(500),
            None,
            "Something went wrong INTERNALLY, try again later",
        );
        assert!(err.is_internal_upstream());
    }

    #[test]
    fn test_non_internal_errors() {
        let rate_limited = CiceroneError::upstream("recs", Some(429), None, "slow down");
        assert!(!rate_limited.is_internal_upstream());

        let unauthorized = CiceroneError::Unauthorized { service: "recs" };
        assert!(!unauthorized.is_internal_upstream());
        assert_eq!(unauthorized.status(), Some(401));
        assert!(unauthorized.to_string().contains("Unauthorized"));
    }
}
