use crate::config::ConfigError;
use crate::telemetry::TelemetryError;
use crate::workflows::actions::ActionError;
use crate::workflows::cycle_risk::RiskServiceError;
use crate::workflows::trajectory::{SignalImportError, TrajectoryServiceError};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::fmt;

/// Top-level error for the binaries: start-up, CSV import and workflow failures.
#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Telemetry(TelemetryError),
    Io(std::io::Error),
    Server(axum::Error),
    Import(SignalImportError),
    Trajectory(TrajectoryServiceError),
    Risk(RiskServiceError),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Import(_) => StatusCode::BAD_REQUEST,
            AppError::Trajectory(TrajectoryServiceError::InvalidRequest(_))
            | AppError::Risk(RiskServiceError::InvalidRequest(_)) => StatusCode::BAD_REQUEST,
            AppError::Risk(RiskServiceError::RiskNotFound(_)) => StatusCode::NOT_FOUND,
            AppError::Trajectory(TrajectoryServiceError::Repository(err))
            | AppError::Risk(RiskServiceError::Repository(err)) => {
                ActionError::from(err.clone()).status()
            }
            AppError::Config(_)
            | AppError::Telemetry(_)
            | AppError::Io(_)
            | AppError::Server(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            AppError::Io(err) => write!(f, "io error: {}", err),
            AppError::Server(err) => write!(f, "server error: {}", err),
            AppError::Import(err) => write!(f, "signal import error: {}", err),
            AppError::Trajectory(err) => write!(f, "trajectory workflow error: {}", err),
            AppError::Risk(err) => write!(f, "risk workflow error: {}", err),
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
            AppError::Trajectory(err) => Some(err),
            AppError::Risk(err) => Some(err),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = Json(json!({ "error": self.to_string() }));
        (self.status(), body).into_response()
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

impl From<SignalImportError> for AppError {
    fn from(value: SignalImportError) -> Self {
        Self::Import(value)
    }
}

impl From<TrajectoryServiceError> for AppError {
    fn from(value: TrajectoryServiceError) -> Self {
        Self::Trajectory(value)
    }
}

impl From<RiskServiceError> for AppError {
    fn from(value: RiskServiceError) -> Self {
        Self::Risk(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::storage::RepositoryError;
    use uuid::Uuid;

    #[test]
    fn import_errors_map_to_bad_request() {
        let err = AppError::from(SignalImportError::InvalidRow {
            line: 3,
            reason: "signal_value must be finite".to_string(),
        });
        assert!(err.to_string().contains("line 3"));
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn config_errors_map_to_internal_error() {
        let response = AppError::from(ConfigError::InvalidPort).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn workflow_errors_keep_their_category() {
        let invalid = AppError::from(TrajectoryServiceError::InvalidRequest(
            "employee_id is required".to_string(),
        ));
        assert_eq!(invalid.status(), StatusCode::BAD_REQUEST);

        let missing = AppError::from(RiskServiceError::RiskNotFound(Uuid::nil()));
        assert_eq!(missing.status(), StatusCode::NOT_FOUND);

        let storage = AppError::from(RiskServiceError::Repository(RepositoryError::Unavailable(
            "lock poisoned".to_string(),
        )));
        assert_eq!(storage.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(storage.to_string().contains("risk workflow error"));
    }
}
