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
use uuid::Uuid;

use super::domain::RiskInterventionKind;
use super::repository::{PerformanceHistory, RiskRepository};
use super::service::{RiskAnalysisService, RiskServiceError};
use crate::workflows::actions::{parse_action, to_json, ActionError};
use crate::workflows::directory::{CompanyId, EmployeeId};

/// Actions accepted by the risk endpoint.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum RiskAction {
    AnalyzeRisk {
        company_id: CompanyId,
        #[serde(default)]
        employee_id: Option<EmployeeId>,
    },
    GetRiskSummary {
        company_id: CompanyId,
    },
    TriggerIntervention {
        risk_id: Uuid,
        intervention_type: RiskInterventionKind,
    },
}

impl From<RiskServiceError> for ActionError {
    fn from(value: RiskServiceError) -> Self {
        match value {
            RiskServiceError::InvalidRequest(message) => ActionError::BadRequest(message),
            RiskServiceError::RiskNotFound(_) => ActionError::NotFound(value.to_string()),
            RiskServiceError::Repository(err) => ActionError::from(err),
        }
    }
}

/// Router builder exposing the risk action endpoint.
pub fn risk_router<R, H>(service: Arc<RiskAnalysisService<R, H>>) -> Router
where
    R: RiskRepository + 'static,
    H: PerformanceHistory + 'static,
{
    Router::new()
        .route("/api/v1/performance/risk", post(risk_action_handler::<R, H>))
        .with_state(service)
}

pub async fn dispatch_risk_action<R, H>(
    service: &RiskAnalysisService<R, H>,
    action: RiskAction,
) -> Result<(StatusCode, Value), ActionError>
where
    R: RiskRepository + 'static,
    H: PerformanceHistory + 'static,
{
    match action {
        RiskAction::AnalyzeRisk {
            company_id,
            employee_id,
        } => {
            let report = service
                .analyze_risk(&company_id, employee_id.as_ref())
                .await?;
            Ok((StatusCode::OK, to_json(&report)?))
        }
        RiskAction::GetRiskSummary { company_id } => {
            let summary = service.risk_summary(&company_id)?;
            Ok((StatusCode::OK, to_json(&summary)?))
        }
        RiskAction::TriggerIntervention {
            risk_id,
            intervention_type,
        } => {
            let record = service.trigger_intervention(risk_id, intervention_type)?;
            Ok((
                StatusCode::CREATED,
                json!({ "risk_id": risk_id, "intervention": to_json(&record)? }),
            ))
        }
    }
}

pub(crate) async fn risk_action_handler<R, H>(
    State(service): State<Arc<RiskAnalysisService<R, H>>>,
    Json(payload): Json<Value>,
) -> Response
where
    R: RiskRepository + 'static,
    H: PerformanceHistory + 'static,
{
    let outcome = match parse_action::<RiskAction>(payload) {
        Ok(action) => dispatch_risk_action(&service, action).await,
        Err(err) => Err(err),
    };

    match outcome {
        Ok((status, body)) => (status, Json(body)).into_response(),
        Err(err) => err.into_response(),
    }
}
