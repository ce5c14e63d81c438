use axum::extract::multipart::MultipartError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

/// Failures of the one-shot detection endpoint.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("missing multipart field 'image'")]
    MissingImage,
    #[error("invalid multipart upload: {0}")]
    InvalidUpload(String),
    #[error("upload too large: {0}")]
    UploadTooLarge(String),
    #[error("invalid image: {0}")]
    InvalidImage(String),
    #[error("inference failed: {0:#}")]
    Inference(anyhow::Error),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Inference(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::UploadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            _ => StatusCode::UNPROCESSABLE_ENTITY,
        }
    }
}

impl From<MultipartError> for ApiError {
    fn from(err: MultipartError) -> Self {
        if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
            ApiError::UploadTooLarge(err.body_text())
        } else {
            ApiError::InvalidUpload(err.body_text())
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            log::error!("{}", self);
        } else {
            log::debug!("rejected upload: {}", self);
        }
        (status, Json(json!({ "detail": self.to_string() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_errors_are_unprocessable() {
        assert_eq!(ApiError::MissingImage.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(ApiError::InvalidImage("bad".into()).status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(ApiError::InvalidUpload("bad".into()).status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(ApiError::UploadTooLarge("big".into()).status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(
            ApiError::Inference(anyhow::anyhow!("boom")).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
