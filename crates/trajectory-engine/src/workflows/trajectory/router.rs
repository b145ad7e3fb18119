use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};

use super::domain::NewSignal;
use super::repository::TrajectoryRepository;
use super::service::{TrajectoryService, TrajectoryServiceError};
use crate::workflows::actions::{parse_action, to_json, ActionError};
use crate::workflows::directory::{CompanyId, EmployeeId};

/// Actions accepted by the trajectory endpoint.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum TrajectoryAction {
    RecordSignal(NewSignal),
    ComputeTrajectory {
        employee_id: EmployeeId,
        company_id: CompanyId,
    },
    GenerateInterventionPrompts {
        company_id: CompanyId,
        manager_id: EmployeeId,
    },
    GetEmployeeTrajectory {
        employee_id: EmployeeId,
    },
}

impl From<TrajectoryServiceError> for ActionError {
    fn from(value: TrajectoryServiceError) -> Self {
        match value {
            TrajectoryServiceError::InvalidRequest(message) => ActionError::BadRequest(message),
            TrajectoryServiceError::Repository(err) => ActionError::from(err),
        }
    }
}

/// Router builder exposing the trajectory action endpoint.
pub fn trajectory_router<R>(service: Arc<TrajectoryService<R>>) -> Router
where
    R: TrajectoryRepository + 'static,
{
    Router::new()
        .route(
            "/api/v1/performance/trajectory",
            post(trajectory_action_handler::<R>),
        )
        .with_state(service)
}

pub fn dispatch_trajectory_action<R>(
    service: &TrajectoryService<R>,
    action: TrajectoryAction,
) -> Result<(StatusCode, Value), ActionError>
where
    R: TrajectoryRepository + 'static,
{
    match action {
        TrajectoryAction::RecordSignal(request) => {
            let signal = service.record_signal(request)?;
            Ok((StatusCode::CREATED, to_json(&signal)?))
        }
        TrajectoryAction::ComputeTrajectory {
            employee_id,
            company_id,
        } => {
            let trajectory = service.compute_trajectory(&company_id, &employee_id)?;
            Ok((StatusCode::OK, to_json(&trajectory)?))
        }
        TrajectoryAction::GenerateInterventionPrompts {
            company_id,
            manager_id,
        } => {
            let report = service.generate_intervention_prompts(&company_id, &manager_id)?;
            Ok((
                StatusCode::OK,
                json!({
                    "prompts": to_json(&report.prompts)?,
                    "count": report.prompts.len(),
                    "failures": to_json(&report.failures)?,
                }),
            ))
        }
        TrajectoryAction::GetEmployeeTrajectory { employee_id } => {
            let history = service.employee_trajectory(&employee_id)?;
            Ok((StatusCode::OK, to_json(&history)?))
        }
    }
}

pub(crate) async fn trajectory_action_handler<R>(
    State(service): State<Arc<TrajectoryService<R>>>,
    Json(payload): Json<Value>,
) -> Response
where
    R: TrajectoryRepository + 'static,
{
    let outcome = parse_action::<TrajectoryAction>(payload)
        .and_then(|action| dispatch_trajectory_action(&service, action));

    match outcome {
        Ok((status, body)) => (status, Json(body)).into_response(),
        Err(err) => err.into_response(),
    }
}
