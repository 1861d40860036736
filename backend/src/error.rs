use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use shared::RemovalResponse;
use thiserror::Error;

/// Failures the gateway reports to the client as `{"error": ...}`.
#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("No image file provided")]
    MissingImage,
    #[error("Failed to read image")]
    UnreadableImage,
    #[error("Image exceeds the {0} byte upload limit")]
    PayloadTooLarge(usize),
    #[error("Malformed upload: {0}")]
    Multipart(String),
    #[error("Removal service is not configured")]
    NotConfigured,
    #[error("Removal service timed out")]
    Timeout,
    #[error("Removal service unavailable: {0}")]
    Upstream(String),
}

impl From<actix_multipart::MultipartError> for GatewayError {
    fn from(err: actix_multipart::MultipartError) -> Self {
        GatewayError::Multipart(err.to_string())
    }
}

impl From<reqwest::Error> for GatewayError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            GatewayError::Timeout
        } else {
            GatewayError::Upstream(err.to_string())
        }
    }
}

impl ResponseError for GatewayError {
    fn status_code(&self) -> StatusCode {
        match self {
            GatewayError::MissingImage
            | GatewayError::UnreadableImage
            | GatewayError::Multipart(_) => StatusCode::BAD_REQUEST,
            GatewayError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            GatewayError::NotConfigured => StatusCode::SERVICE_UNAVAILABLE,
            GatewayError::Timeout => StatusCode::GATEWAY_TIMEOUT,
            GatewayError::Upstream(_) => StatusCode::BAD_GATEWAY,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(RemovalResponse::failure(self.to_string()))
    }
}
