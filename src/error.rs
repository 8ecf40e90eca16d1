use actix_web::HttpResponse;
use actix_web::http::StatusCode;
use thiserror::Error;

use crate::io_struct::ErrorBody;

/// Failures of the feed orchestrator. Every variant maps to a structured
/// JSON response; none of them terminate the service.
#[derive(Debug, Error)]
pub enum FeedError {
    #[error("Invalid or corrupted image.")]
    InvalidImage,
    #[error("No images found.")]
    NoImagesAvailable,
    #[error("image source error: {0}")]
    Source(#[from] std::io::Error),
    #[error("classification failed: {0}")]
    ClassificationFault(String),
    #[error("internal error: {0}")]
    Internal(String),
}

impl actix_web::ResponseError for FeedError {
    fn status_code(&self) -> StatusCode {
        match self {
            FeedError::InvalidImage => StatusCode::BAD_REQUEST,
            FeedError::NoImagesAvailable => StatusCode::NOT_FOUND,
            FeedError::Source(_) | FeedError::ClassificationFault(_) => StatusCode::BAD_GATEWAY,
            FeedError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorBody::new(self.to_string()))
    }
}

/// Failures of the classifier service itself.
#[derive(Debug, Error)]
pub enum ClassifierError {
    #[error("Invalid or corrupted image.")]
    InvalidImage,
    #[error("model error: {0}")]
    Model(String),
}

impl actix_web::ResponseError for ClassifierError {
    fn status_code(&self) -> StatusCode {
        match self {
            ClassifierError::InvalidImage => StatusCode::BAD_REQUEST,
            ClassifierError::Model(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorBody::new(self.to_string()))
    }
}
