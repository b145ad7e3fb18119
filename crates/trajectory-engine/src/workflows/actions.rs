//! Request boundary shared by the workflow routers.
//!
//! Every workflow accepts a JSON body tagged by `action`. Unknown actions and missing or
//! blank required fields are rejected as bad requests before any service call runs.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};

use super::storage::RepositoryError;

/// Error categories surfaced to callers of the action endpoints.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ActionError {
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("storage failure: {0}")]
    Storage(String),
}

impl ActionError {
    pub fn status(&self) -> StatusCode {
        match self {
            ActionError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ActionError::NotFound(_) => StatusCode::NOT_FOUND,
            ActionError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<RepositoryError> for ActionError {
    fn from(value: RepositoryError) -> Self {
        match value {
            RepositoryError::NotFound => ActionError::NotFound(value.to_string()),
            other => ActionError::Storage(other.to_string()),
        }
    }
}

impl IntoResponse for ActionError {
    fn into_response(self) -> Response {
        let body = Json(json!({ "error": self.to_string() }));
        (self.status(), body).into_response()
    }
}

/// Decode an action envelope, mapping unknown tags and missing fields to `BadRequest`.
pub fn parse_action<T: DeserializeOwned>(payload: Value) -> Result<T, ActionError> {
    if payload.get("action").and_then(Value::as_str).is_none() {
        return Err(ActionError::BadRequest(
            "missing required field `action`".to_string(),
        ));
    }
    serde_json::from_value(payload).map_err(|err| ActionError::BadRequest(err.to_string()))
}

pub(crate) fn to_json<T: serde::Serialize>(value: &T) -> Result<Value, ActionError> {
    serde_json::to_value(value).map_err(|err| ActionError::Storage(err.to_string()))
}
