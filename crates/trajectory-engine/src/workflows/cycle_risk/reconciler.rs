use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::debug;

use super::domain::{PerformanceRisk, RiskDetection, RiskType};
use super::repository::{RepositoryError, RiskRepository, RiskUpsert};
use crate::workflows::directory::{CompanyId, EmployeeId};

pub const AUTO_RESOLUTION_NOTE: &str =
    "Automatically resolved: pattern no longer detected during risk analysis";

/// What one reconciliation pass changed.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ReconcileOutcome {
    pub created: Vec<RiskType>,
    pub updated: Vec<RiskType>,
    pub resolved: Vec<RiskType>,
    pub active: Vec<PerformanceRisk>,
}

/// Bring the active-risk set for one employee in line with `detections`, one conditional
/// write per risk type.
pub fn reconcile<R>(
    repository: &R,
    company_id: &CompanyId,
    employee_id: &EmployeeId,
    detections: Vec<RiskDetection>,
    now: DateTime<Utc>,
) -> Result<ReconcileOutcome, RepositoryError>
where
    R: RiskRepository + ?Sized,
{
    let mut by_type: BTreeMap<RiskType, RiskDetection> = detections
        .into_iter()
        .map(|detection| (detection.risk_type, detection))
        .collect();
    let mut outcome = ReconcileOutcome::default();

    for risk_type in RiskType::ALL {
        match by_type.remove(&risk_type) {
            Some(detection) => {
                match repository.upsert_active(company_id, employee_id, detection, now)? {
                    RiskUpsert::Created(risk) => {
                        outcome.created.push(risk_type);
                        outcome.active.push(risk);
                    }
                    RiskUpsert::Updated(risk) => {
                        outcome.updated.push(risk_type);
                        outcome.active.push(risk);
                    }
                }
            }
            None => {
                if repository
                    .resolve_active(employee_id, risk_type, now, AUTO_RESOLUTION_NOTE)?
                    .is_some()
                {
                    outcome.resolved.push(risk_type);
                }
            }
        }
    }

    debug!(
        employee_id = %employee_id,
        created = outcome.created.len(),
        updated = outcome.updated.len(),
        resolved = outcome.resolved.len(),
        "risks reconciled"
    );
    Ok(outcome)
}
