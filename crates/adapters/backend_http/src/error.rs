//! Backend adapter error types.

use crisiswatch_domain::error::{ComplianceUpdateError, DetectionError, DispatchError};

/// Errors specific to the backend HTTP adapter.
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    /// The request never produced a response (connect, timeout, TLS, …).
    #[error("backend request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The backend answered with a non-success HTTP status.
    #[error("backend answered with status {0}")]
    Status(u16),

    /// The backend answered `success: false`.
    #[error("{0}")]
    Rejected(String),

    /// The body could not be understood.
    #[error("malformed backend response: {0}")]
    Malformed(String),
}

impl BackendError {
    /// Convert into a [`DetectionError`] for propagation across the
    /// detection port.
    #[must_use]
    pub fn into_detection(self) -> DetectionError {
        match self {
            Self::Rejected(reason) => DetectionError::Rejected { reason },
            malformed @ Self::Malformed(_) => DetectionError::Malformed(Box::new(malformed)),
            other => DetectionError::Unavailable(Box::new(other)),
        }
    }

    /// Convert into a [`DispatchError`].
    #[must_use]
    pub fn into_dispatch(self) -> DispatchError {
        match self {
            Self::Rejected(reason) => DispatchError::Rejected { reason },
            other => DispatchError::Unavailable(Box::new(other)),
        }
    }

    /// Convert into a [`ComplianceUpdateError`].
    #[must_use]
    pub fn into_compliance(self) -> ComplianceUpdateError {
        match self {
            Self::Rejected(_) => ComplianceUpdateError::Rejected,
            other => ComplianceUpdateError::Unavailable(Box::new(other)),
        }
    }
}

impl From<BackendError> for DetectionError {
    fn from(err: BackendError) -> Self {
        err.into_detection()
    }
}

impl From<BackendError> for DispatchError {
    fn from(err: BackendError) -> Self {
        err.into_dispatch()
    }
}

impl From<BackendError> for ComplianceUpdateError {
    fn from(err: BackendError) -> Self {
        err.into_compliance()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_display_rejection_reason_verbatim() {
        let err = BackendError::Rejected("quota exceeded".to_string());
        assert_eq!(err.to_string(), "quota exceeded");
    }

    #[test]
    fn should_convert_rejection_to_detection_rejected() {
        let err: DetectionError = BackendError::Rejected("not connected".to_string()).into();
        assert!(matches!(
            err,
            DetectionError::Rejected { ref reason } if reason == "not connected"
        ));
    }

    #[test]
    fn should_convert_status_to_detection_unavailable() {
        let err: DetectionError = BackendError::Status(503).into();
        assert!(matches!(err, DetectionError::Unavailable(_)));
        assert!(err.to_string().contains("503"));
    }

    #[test]
    fn should_convert_malformed_to_detection_malformed() {
        let err: DetectionError = BackendError::Malformed("missing crisis".to_string()).into();
        assert!(matches!(err, DetectionError::Malformed(_)));
    }

    #[test]
    fn should_keep_dispatch_rejection_text() {
        let err: DispatchError = BackendError::Rejected("quota exceeded".to_string()).into();
        assert_eq!(err.to_string(), "quota exceeded");
    }

    #[test]
    fn should_convert_rejection_to_compliance_rejected() {
        let err: ComplianceUpdateError = BackendError::Rejected(String::new()).into();
        assert!(matches!(err, ComplianceUpdateError::Rejected));
    }
}
