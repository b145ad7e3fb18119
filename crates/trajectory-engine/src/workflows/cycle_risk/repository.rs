use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::domain::{
    Certification, CycleRating, InterventionRecord, PerformanceRisk, RiskDetection, RiskType,
};
use crate::workflows::directory::{CompanyId, EmployeeId};
pub use crate::workflows::storage::RepositoryError;

/// Read-only feed of completed appraisal cycles and certification status.
pub trait PerformanceHistory: Send + Sync {
    /// Completed cycles, most recent first, at most `limit` rows.
    fn recent_cycles(
        &self,
        company_id: &CompanyId,
        employee_id: &EmployeeId,
        limit: usize,
    ) -> Result<Vec<CycleRating>, RepositoryError>;

    /// Certifications currently held by the employee.
    fn certifications(
        &self,
        company_id: &CompanyId,
        employee_id: &EmployeeId,
    ) -> Result<Vec<Certification>, RepositoryError>;
}

/// Whether an upsert created a new active record or refreshed the existing one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", content = "risk", rename_all = "snake_case")]
pub enum RiskUpsert {
    Created(PerformanceRisk),
    Updated(PerformanceRisk),
}

impl RiskUpsert {
    pub fn risk(&self) -> &PerformanceRisk {
        match self {
            RiskUpsert::Created(risk) | RiskUpsert::Updated(risk) => risk,
        }
    }
}

/// Storage for persistent risk records.
///
/// `upsert_active` and `resolve_active` must each be a single conditional write keyed on
/// `(employee_id, risk_type, is_active)` so concurrent analyses cannot create duplicates.
pub trait RiskRepository: Send + Sync {
    fn upsert_active(
        &self,
        company_id: &CompanyId,
        employee_id: &EmployeeId,
        detection: RiskDetection,
        now: DateTime<Utc>,
    ) -> Result<RiskUpsert, RepositoryError>;

    /// Resolve the active record for the pair, returning it when one existed.
    fn resolve_active(
        &self,
        employee_id: &EmployeeId,
        risk_type: RiskType,
        now: DateTime<Utc>,
        note: &str,
    ) -> Result<Option<PerformanceRisk>, RepositoryError>;

    fn active_for_employee(
        &self,
        employee_id: &EmployeeId,
    ) -> Result<Vec<PerformanceRisk>, RepositoryError>;

    fn active_for_company(
        &self,
        company_id: &CompanyId,
    ) -> Result<Vec<PerformanceRisk>, RepositoryError>;

    fn fetch(&self, risk_id: Uuid) -> Result<Option<PerformanceRisk>, RepositoryError>;

    fn append_intervention(
        &self,
        risk_id: Uuid,
        record: InterventionRecord,
    ) -> Result<PerformanceRisk, RepositoryError>;
}

/// Outbound hook creating individual development plans in the HR system.
pub trait DevelopmentPlanGateway: Send + Sync {
    fn create_plan(&self, risk: &PerformanceRisk) -> Result<String, RepositoryError>;
}
