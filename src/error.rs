use axum::{
    response::{IntoResponse, Response},
    http::StatusCode,
};

use crate::api::response;
use crate::llm::GenerationError;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Invalid input: {0}")]
    InputError(String),

    #[error("No API credential configured. Set OPENAI_API_KEY or enter a key with the request.")]
    CredentialMissing,

    #[error("Request failed: could not reach the generation service ({0})")]
    TransportFailure(String),

    #[error("Request failed: generation service returned {code}: {message}")]
    ServiceError { code: u16, message: String },

    #[error("Request superseded by a newer submission")]
    Superseded,

    #[error("Request processing timed out")]
    Timeout,

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::InputError(_) => StatusCode::BAD_REQUEST,
            AppError::CredentialMissing => StatusCode::UNAUTHORIZED,
            AppError::TransportFailure(_) => StatusCode::BAD_GATEWAY,
            AppError::ServiceError { .. } => StatusCode::BAD_GATEWAY,
            AppError::Superseded => StatusCode::CONFLICT,
            AppError::Timeout => StatusCode::REQUEST_TIMEOUT,
            AppError::ConfigError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        response::error::<()>(status, self.to_string()).into_response()
    }
}

impl From<GenerationError> for AppError {
    fn from(err: GenerationError) -> Self {
        match err {
            GenerationError::MissingCredential => AppError::CredentialMissing,
            GenerationError::TransportFailure(msg) => AppError::TransportFailure(msg),
            GenerationError::ServiceError { code, message } => AppError::ServiceError { code, message },
        }
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
