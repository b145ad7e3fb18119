use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration as StdDuration;

use async_trait::async_trait;
use axum::response::Response;
use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use serde_json::Value;

use crate::workflows::cycle_risk::{
    Certification, CycleRating, DetectionConfig, PerformanceHistory, RecommendationError,
    RecommendationGenerator, RecommendationRequest, RiskAnalysisService,
};
use crate::workflows::directory::{CompanyId, EmployeeId, EmployeeProfile};
use crate::workflows::memory::{
    InMemoryDevelopmentPlans, InMemoryDirectory, InMemoryPerformanceHistory,
    InMemoryRiskRepository,
};
use crate::workflows::storage::RepositoryError;

pub(super) fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 1, 9, 0, 0)
        .single()
        .expect("valid timestamp")
}

pub(super) fn today() -> NaiveDate {
    now().date_naive()
}

pub(super) fn company() -> CompanyId {
    CompanyId::from("acme")
}

pub(super) fn employee(id: &str) -> EmployeeId {
    EmployeeId::from(id)
}

/// Cycle completed `quarters_ago` quarters before today.
pub(super) fn cycle(
    quarters_ago: i64,
    overall: f64,
    goal: f64,
    competency: f64,
    responsibility: f64,
) -> CycleRating {
    CycleRating {
        cycle_id: format!("cycle-{quarters_ago}"),
        cycle_name: format!("Q-{quarters_ago}"),
        completed_on: today() - Duration::days(91 * quarters_ago),
        overall,
        goal,
        competency,
        responsibility,
    }
}

/// Most-recent-first cycles with only the overall rating varying.
pub(super) fn overall_history(overall: &[f64]) -> Vec<CycleRating> {
    overall
        .iter()
        .enumerate()
        .map(|(index, value)| cycle(index as i64 + 1, *value, 3.5, 3.5, 3.5))
        .collect()
}

pub(super) fn certification(id: &str, days_until_expiry: i64, mandatory: bool) -> Certification {
    Certification {
        certification_id: id.to_string(),
        name: format!("Certification {id}"),
        expires_on: today() + Duration::days(days_until_expiry),
        mandatory,
    }
}

pub(super) fn profile(id: &str, active: bool) -> EmployeeProfile {
    EmployeeProfile {
        employee_id: employee(id),
        company_id: company(),
        full_name: format!("Employee {id}"),
        manager_id: Some(employee("mgr-1")),
        active,
    }
}

pub(super) fn directory(ids: &[&str]) -> InMemoryDirectory {
    let mut employees: Vec<EmployeeProfile> = ids.iter().map(|id| profile(id, true)).collect();
    employees.push(profile("emp-gone", false));
    InMemoryDirectory::with_employees(employees)
}

pub(super) fn seed_cycles(history: &InMemoryPerformanceHistory, id: &str, cycles: Vec<CycleRating>) {
    for rating in cycles {
        history
            .record_cycle(&company(), &employee(id), rating)
            .expect("cycle recorded");
    }
}

pub(super) fn seed_certifications(
    history: &InMemoryPerformanceHistory,
    id: &str,
    certifications: Vec<Certification>,
) {
    for certification in certifications {
        history
            .record_certification(&company(), &employee(id), certification)
            .expect("certification recorded");
    }
}

pub(super) struct Harness {
    pub(super) service: RiskAnalysisService<InMemoryRiskRepository, InMemoryPerformanceHistory>,
    pub(super) risks: Arc<InMemoryRiskRepository>,
    pub(super) history: Arc<InMemoryPerformanceHistory>,
    pub(super) plans: Arc<InMemoryDevelopmentPlans>,
}

pub(super) fn build_service(ids: &[&str]) -> Harness {
    let risks = Arc::new(InMemoryRiskRepository::default());
    let history = Arc::new(InMemoryPerformanceHistory::default());
    let plans = Arc::new(InMemoryDevelopmentPlans::default());
    let service = RiskAnalysisService::new(
        risks.clone(),
        history.clone(),
        Arc::new(directory(ids)),
        plans.clone(),
        DetectionConfig::default(),
    );
    Harness {
        service,
        risks,
        history,
        plans,
    }
}

/// Two sub-par cycles in a row: chronic underperformance at high.
pub(super) fn chronic_pattern() -> Vec<CycleRating> {
    vec![
        cycle(1, 2.5, 2.5, 3.0, 3.0),
        cycle(2, 2.0, 2.0, 2.0, 3.0),
        cycle(3, 4.0, 4.0, 4.0, 4.0),
    ]
}

/// Feed that fails for one employee and delegates for the rest.
pub(super) struct FlakyHistory {
    pub(super) inner: InMemoryPerformanceHistory,
    pub(super) failing: BTreeSet<EmployeeId>,
}

impl PerformanceHistory for FlakyHistory {
    fn recent_cycles(
        &self,
        company_id: &CompanyId,
        employee_id: &EmployeeId,
        limit: usize,
    ) -> Result<Vec<CycleRating>, RepositoryError> {
        if self.failing.contains(employee_id) {
            return Err(RepositoryError::Unavailable("ratings feed timed out".to_string()));
        }
        self.inner.recent_cycles(company_id, employee_id, limit)
    }

    fn certifications(
        &self,
        company_id: &CompanyId,
        employee_id: &EmployeeId,
    ) -> Result<Vec<Certification>, RepositoryError> {
        self.inner.certifications(company_id, employee_id)
    }
}

pub(super) struct FailingRecommendations;

#[async_trait]
impl RecommendationGenerator for FailingRecommendations {
    async fn recommend(
        &self,
        _request: &RecommendationRequest,
    ) -> Result<Option<String>, RecommendationError> {
        Err(RecommendationError::Unavailable("model quota exhausted".to_string()))
    }
}

pub(super) struct SlowRecommendations;

#[async_trait]
impl RecommendationGenerator for SlowRecommendations {
    async fn recommend(
        &self,
        _request: &RecommendationRequest,
    ) -> Result<Option<String>, RecommendationError> {
        tokio::time::sleep(StdDuration::from_secs(5)).await;
        Ok(Some("too late".to_string()))
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
