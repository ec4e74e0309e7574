//! HTTP error response mapping.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use crisiswatch_domain::error::{CrisisWatchError, ValidationError};

/// JSON error body returned by API endpoints.
#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

/// Maps [`CrisisWatchError`] to an HTTP response with appropriate status code.
#[derive(Debug)]
pub struct ApiError(CrisisWatchError);

impl From<CrisisWatchError> for ApiError {
    fn from(err: CrisisWatchError) -> Self {
        Self(err)
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        Self(err.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self.0 {
            CrisisWatchError::Validation(err) => (StatusCode::BAD_REQUEST, err.to_string()),
            other => {
                tracing::error!(error = %other, "unexpected error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
        };

        (status, Json(ErrorBody { error: message })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crisiswatch_domain::error::DispatchError;

    #[test]
    fn should_map_validation_error_to_bad_request() {
        let response = ApiError::from(ValidationError::ZeroInterval).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn should_hide_details_of_other_errors() {
        let err = CrisisWatchError::from(DispatchError::Rejected {
            reason: "smtp credentials expired".to_string(),
        });
        let response = ApiError::from(err).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
