use crate::config::ConfigError;
use crate::exchange::{DrawFailure, ExchangeServiceError};
use crate::import::ImportError;
use crate::telemetry::TelemetryError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::fmt;

#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Telemetry(TelemetryError),
    Io(std::io::Error),
    Server(axum::Error),
    Import(ImportError),
    Exchange(ExchangeServiceError),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            AppError::Io(err) => write!(f, "io error: {}", err),
            AppError::Server(err) => write!(f, "server error: {}", err),
            AppError::Import(err) => write!(f, "import error: {}", err),
            AppError::Exchange(ExchangeServiceError::Draw(failure)) => {
                write!(f, "{}: {}", failure, failure.details())
            }
            AppError::Exchange(err) => write!(f, "exchange error: {}", err),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(err) => Some(err),
            AppError::Telemetry(err) => Some(err),
            AppError::Io(err) => Some(err),
            AppError::Server(err) => Some(err),
            AppError::Import(err) => Some(err),
            AppError::Exchange(err) => Some(err),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::Import(_) => StatusCode::BAD_REQUEST,
            AppError::Exchange(ExchangeServiceError::Draw(_)) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Config(_)
            | AppError::Telemetry(_)
            | AppError::Io(_)
            | AppError::Server(_)
            | AppError::Exchange(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}

impl From<ConfigError> for AppError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<TelemetryError> for AppError {
    fn from(value: TelemetryError) -> Self {
        Self::Telemetry(value)
    }
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<axum::Error> for AppError {
    fn from(value: axum::Error) -> Self {
        Self::Server(value)
    }
}

impl From<ImportError> for AppError {
    fn from(value: ImportError) -> Self {
        Self::Import(value)
    }
}

impl From<ExchangeServiceError> for AppError {
    fn from(value: ExchangeServiceError) -> Self {
        Self::Exchange(value)
    }
}

impl From<DrawFailure> for AppError {
    fn from(value: DrawFailure) -> Self {
        Self::Exchange(ExchangeServiceError::Draw(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn draw_failures_render_message_and_details() {
        let error = AppError::from(DrawFailure::TooFewParticipants { count: 2 });
        let rendered = error.to_string();
        assert!(rendered.starts_with("Not enough players: "));
        assert!(rendered.contains("at least 3"));
        assert_eq!(
            error.into_response().status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
    }

    #[test]
    fn import_errors_are_client_errors() {
        let error = AppError::from(ImportError::NoValidParticipants);
        assert_eq!(error.into_response().status(), StatusCode::BAD_REQUEST);
    }
}
