//! Error types for the CRM core.
//!
//! Errors are classified by who can act on them:
//! - Validation: rejected before any remote call
//! - Forbidden: authenticated but not authorized
//! - Transport/Timeout: remote call failed, no state change happened
//! - Conflict: the operation cannot apply (e.g. admin already exists)

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CrmError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Missing or invalid token")]
    Unauthenticated,

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Operation timed out after {0} seconds")]
    Timeout(u64),

    #[error("Store error {status}: {message}")]
    Store { status: u16, message: String },

    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

impl CrmError {
    /// Transport failures and timeouts may be retried by the caller;
    /// nothing is retried automatically.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            CrmError::Transport(_)
                | CrmError::Timeout(_)
                | CrmError::Store { status: 500..=599, .. }
        )
    }

    /// The HTTP status this error surfaces as on the admin API.
    pub fn status_code(&self) -> u16 {
        match self {
            CrmError::Validation(_) => 400,
            CrmError::Unauthenticated => 401,
            CrmError::Forbidden(_) => 403,
            CrmError::Conflict(_) => 409,
            CrmError::Store { status, .. } if *status >= 400 && *status < 500 => *status,
            _ => 500,
        }
    }
}

impl From<crate::store::StoreError> for CrmError {
    fn from(err: crate::store::StoreError) -> Self {
        use crate::store::StoreError;
        match err {
            StoreError::Http(e) => CrmError::Transport(e.to_string()),
            StoreError::Timeout(secs) => CrmError::Timeout(secs),
            StoreError::Api { status, message } => CrmError::Store { status, message },
            StoreError::Json(e) => CrmError::Unexpected(e.to_string()),
            StoreError::EmptyResponse => {
                CrmError::Unexpected("empty response from store".to_string())
            }
        }
    }
}

/// Serializable error shape surfaced to callers; the message is passed
/// through verbatim.
#[derive(Debug, Clone, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SurfacedError {
    pub error: String,
    pub can_retry: bool,
}

impl From<&CrmError> for SurfacedError {
    fn from(err: &CrmError) -> Self {
        SurfacedError {
            error: err.to_string(),
            can_retry: err.is_retryable(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_classification() {
        assert!(CrmError::Transport("connection reset".into()).is_retryable());
        assert!(CrmError::Timeout(15).is_retryable());
        assert!(CrmError::Store { status: 503, message: "unavailable".into() }.is_retryable());
        assert!(!CrmError::Validation("bad email".into()).is_retryable());
        assert!(!CrmError::Forbidden("role".into()).is_retryable());
        assert!(!CrmError::Store { status: 404, message: "missing".into() }.is_retryable());
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(CrmError::Validation("x".into()).status_code(), 400);
        assert_eq!(CrmError::Unauthenticated.status_code(), 401);
        assert_eq!(CrmError::Forbidden("x".into()).status_code(), 403);
        assert_eq!(CrmError::Conflict("x".into()).status_code(), 409);
        assert_eq!(CrmError::Unexpected("x".into()).status_code(), 500);
        assert_eq!(
            CrmError::Store { status: 404, message: "m".into() }.status_code(),
            404
        );
    }

    #[test]
    fn test_surfaced_error_verbatim_message() {
        let err = CrmError::Forbidden("a manager may only create advisors".into());
        let surfaced = SurfacedError::from(&err);
        assert_eq!(surfaced.error, "Forbidden: a manager may only create advisors");
        assert!(!surfaced.can_retry);
    }
}
