//! Mapping of core errors onto HTTP responses.

use api_shared::{ErrorRes, UploadFailureRes};
use axum::extract::multipart::MultipartError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use zenpic_core::{CoreError, UploadError};

use crate::summary_res;

/// Error returned by every handler.
#[derive(Debug)]
pub enum ApiError {
    Core(CoreError),
    Multipart(MultipartError),
    Metrics(prometheus::Error),
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        ApiError::Core(err)
    }
}

impl From<prometheus::Error> for ApiError {
    fn from(err: prometheus::Error) -> Self {
        ApiError::Metrics(err)
    }
}

impl From<MultipartError> for ApiError {
    fn from(err: MultipartError) -> Self {
        ApiError::Multipart(err)
    }
}

/// HTTP status for a core error.
pub fn status_for(err: &CoreError) -> StatusCode {
    match err {
        CoreError::NotFound(_) => StatusCode::NOT_FOUND,
        CoreError::InvalidPath(_)
        | CoreError::MissingCondition
        | CoreError::InvalidCondition(_)
        | CoreError::InvalidDimensions(_)
        | CoreError::Upload(UploadError::NoFiles) => StatusCode::BAD_REQUEST,
        CoreError::Transform(_) => StatusCode::UNPROCESSABLE_ENTITY,
        CoreError::Upload(UploadError::Partial { .. })
        | CoreError::InvalidConfig(_)
        | CoreError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Server errors are logged at error level, rejected requests at warn.
fn log_failure(status: StatusCode, message: &dyn std::fmt::Display) {
    if status.is_server_error() {
        tracing::error!(%status, "Request failed: {}", message);
    } else {
        tracing::warn!(%status, "Request rejected: {}", message);
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Multipart(err) => {
                let status = err.status();
                log_failure(status, &err.body_text());
                (status, Json(ErrorRes::new(err.body_text()))).into_response()
            }
            ApiError::Metrics(err) => {
                let status = StatusCode::INTERNAL_SERVER_ERROR;
                log_failure(status, &err);
                (status, Json(ErrorRes::new(err.to_string()))).into_response()
            }
            ApiError::Core(err) => {
                let status = status_for(&err);
                log_failure(status, &err);

                let mut body = ErrorRes::new(err.to_string());
                if let CoreError::Upload(UploadError::Partial { stored, failed }) = err {
                    body.stored = Some(stored.into_iter().map(summary_res).collect());
                    body.failed = Some(
                        failed
                            .into_iter()
                            .map(|f| UploadFailureRes {
                                name: f.name,
                                reason: f.reason,
                            })
                            .collect(),
                    );
                }

                (status, Json(body)).into_response()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_follow_error_taxonomy() {
        assert_eq!(
            status_for(&CoreError::NotFound("x".into())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_for(&CoreError::InvalidPath("x".into())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(status_for(&CoreError::MissingCondition), StatusCode::BAD_REQUEST);
        assert_eq!(
            status_for(&CoreError::InvalidDimensions("x".into())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_for(&CoreError::Transform("x".into())),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            status_for(&CoreError::Upload(UploadError::NoFiles)),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_for(&CoreError::Upload(UploadError::Partial {
                stored: vec![],
                failed: vec![]
            })),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
