use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde::Serialize;

use sweetrivia_core::{DraftError, ExportError, FlowError, ValidationError};
use sweetrivia_publish::PublishError;

/// Error body: `{ "message": ... }`
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub message: String,
}

/// A failed request, rendered as a status code plus a message for the author.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::error!(status = %self.status, message = %self.message, "Request failed");
        }
        (
            self.status,
            Json(ErrorBody {
                message: self.message,
            }),
        )
            .into_response()
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::new(StatusCode::UNPROCESSABLE_ENTITY, err.to_string())
    }
}

impl From<FlowError> for ApiError {
    fn from(err: FlowError) -> Self {
        let status = match &err {
            FlowError::StepOutOfRange { .. } | FlowError::NotConfigured => StatusCode::NOT_FOUND,
            FlowError::AlreadyConfigured(_)
            | FlowError::NotEditing
            | FlowError::Incomplete { .. } => StatusCode::CONFLICT,
            FlowError::Store(DraftError::Corrupt { .. }) => StatusCode::CONFLICT,
            FlowError::Store(DraftError::Unavailable(_)) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        ApiError::new(status, err.user_message())
    }
}

impl From<ExportError> for ApiError {
    fn from(err: ExportError) -> Self {
        match err {
            ExportError::Empty => {
                ApiError::new(StatusCode::UNPROCESSABLE_ENTITY, "No questions to download")
            }
            other => ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, other.to_string()),
        }
    }
}

impl From<PublishError> for ApiError {
    fn from(err: PublishError) -> Self {
        let status = match &err {
            PublishError::Empty => StatusCode::UNPROCESSABLE_ENTITY,
            PublishError::InFlight(_) => StatusCode::CONFLICT,
            PublishError::BucketMissing(_) => StatusCode::SERVICE_UNAVAILABLE,
            PublishError::UploadRejected { .. } | PublishError::Transport(_) => {
                StatusCode::BAD_GATEWAY
            }
        };
        tracing::warn!(error = %err, "Publish failed");
        ApiError::new(status, err.user_message())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sweetrivia_core::FieldError;

    #[test]
    fn test_status_mapping() {
        let cases: Vec<(ApiError, StatusCode)> = vec![
            (
                ValidationError::Field(FieldError::EmptyQuestion).into(),
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (
                FlowError::StepOutOfRange { step: 9, count: 2 }.into(),
                StatusCode::NOT_FOUND,
            ),
            (
                FlowError::Store(DraftError::corrupt("triviaQuestions", "bad")).into(),
                StatusCode::CONFLICT,
            ),
            (
                FlowError::Store(DraftError::Unavailable("gone".into())).into(),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                PublishError::InFlight("s".into()).into(),
                StatusCode::CONFLICT,
            ),
            (
                PublishError::BucketMissing("b".into()).into(),
                StatusCode::SERVICE_UNAVAILABLE,
            ),
            (
                PublishError::UploadRejected {
                    filename: "f".into(),
                    reason: "r".into(),
                }
                .into(),
                StatusCode::BAD_GATEWAY,
            ),
        ];

        for (err, status) in cases {
            assert_eq!(err.status, status, "{}", err.message);
        }
    }

    #[test]
    fn test_validation_message_is_user_facing() {
        let err: ApiError = ValidationError::Field(FieldError::MissingCorrectAnswer).into();
        assert_eq!(err.message, "Please select the correct answer");
    }
}
