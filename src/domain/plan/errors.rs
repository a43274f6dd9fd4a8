//! Upload-path error types.
//!
//! # HTTP Status Mapping
//!
//! | Error | HTTP Status |
//! |-------|-------------|
//! | Rejected | 403 |
//! | Forbidden | 403 |
//! | LostRace | 409 |
//! | ValidationFailed | 400 |
//! | Infrastructure | 503 |

use super::UploadRejection;
use crate::domain::foundation::{DomainError, ErrorCategory};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadError {
    /// The plan guard refused the upload.
    Rejected(UploadRejection),

    /// The guard passed but another upload took the last slot first.
    LostRace,

    /// Request input was missing or malformed.
    ValidationFailed { field: String, message: String },

    /// The caller may not act for this seller.
    Forbidden(String),

    /// The store failed.
    Infrastructure(String),
}

impl UploadError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        UploadError::ValidationFailed {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn infrastructure(message: impl Into<String>) -> Self {
        UploadError::Infrastructure(message.into())
    }

    pub fn code(&self) -> &'static str {
        match self {
            UploadError::Rejected(reason) => reason.as_str(),
            UploadError::LostRace => UploadRejection::QuotaExhausted.as_str(),
            UploadError::ValidationFailed { .. } => "VALIDATION_FAILED",
            UploadError::Forbidden(_) => "FORBIDDEN",
            UploadError::Infrastructure(_) => "SERVICE_UNAVAILABLE",
        }
    }

    pub fn message(&self) -> String {
        match self {
            UploadError::Rejected(reason) => format!("Upload rejected: {}", reason),
            UploadError::LostRace => "Upload quota was consumed concurrently".to_string(),
            UploadError::ValidationFailed { field, message } => {
                format!("Validation failed for '{}': {}", field, message)
            }
            UploadError::Forbidden(msg) => msg.clone(),
            UploadError::Infrastructure(msg) => format!("Error: {}", msg),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            UploadError::Rejected(_) | UploadError::Forbidden(_) => ErrorCategory::Auth,
            UploadError::LostRace => ErrorCategory::Conflict,
            UploadError::ValidationFailed { .. } => ErrorCategory::Validation,
            UploadError::Infrastructure(_) => ErrorCategory::Upstream,
        }
    }
}

impl std::fmt::Display for UploadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for UploadError {}

impl From<UploadRejection> for UploadError {
    fn from(reason: UploadRejection) -> Self {
        UploadError::Rejected(reason)
    }
}

impl From<DomainError> for UploadError {
    fn from(err: DomainError) -> Self {
        UploadError::Infrastructure(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lost_race_reports_quota_exhausted_as_conflict() {
        let err = UploadError::LostRace;
        assert_eq!(err.code(), "QuotaExhausted");
        assert_eq!(err.category(), ErrorCategory::Conflict);
    }

    #[test]
    fn guard_rejection_keeps_reason() {
        let err: UploadError = UploadRejection::PlanExpired.into();
        assert_eq!(err.code(), "PlanExpired");
        assert_eq!(err.category(), ErrorCategory::Auth);
    }
}
