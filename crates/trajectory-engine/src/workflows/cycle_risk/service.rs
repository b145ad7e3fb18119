use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures_util::future::join_all;
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use super::detectors::{detect_all, DetectionConfig, DetectionReport};
use super::domain::{InterventionRecord, RiskInterventionKind, RiskType, TrendHistoryEntry};
use super::reconciler::reconcile;
use super::recommendation::{
    best_effort_recommendation, NoRecommendations, RecommendationGenerator, RecommendationRequest,
};
use super::repository::{DevelopmentPlanGateway, PerformanceHistory, RepositoryError, RiskRepository};
use crate::config::AnalysisConfig;
use crate::workflows::directory::{CompanyId, EmployeeDirectory, EmployeeId};
use crate::workflows::trajectory::RiskLevel;

/// Result of analyzing one employee.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmployeeRiskSummary {
    pub employee_id: EmployeeId,
    pub risks_found: usize,
    pub risk_types: Vec<RiskType>,
    pub highest_risk_level: Option<RiskLevel>,
    pub resolved: Vec<RiskType>,
    pub trend_history: Vec<TrendHistoryEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmployeeAnalysisFailure {
    pub employee_id: EmployeeId,
    pub error: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskAnalysisReport {
    pub company_id: CompanyId,
    pub summaries: Vec<EmployeeRiskSummary>,
    pub failures: Vec<EmployeeAnalysisFailure>,
}

/// Aggregated counts of active risks for one company.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RiskSummary {
    pub company_id: CompanyId,
    pub total_active: usize,
    pub by_type: BTreeMap<RiskType, usize>,
    pub by_level: BTreeMap<RiskLevel, usize>,
    pub affected_employees: usize,
}

/// Service composing the rating feed, detectors, reconciler and optional recommendations.
pub struct RiskAnalysisService<R, H> {
    risks: Arc<R>,
    history: Arc<H>,
    directory: Arc<dyn EmployeeDirectory>,
    plans: Arc<dyn DevelopmentPlanGateway>,
    recommendations: Arc<dyn RecommendationGenerator>,
    config: DetectionConfig,
    analysis: AnalysisConfig,
}

impl<R, H> RiskAnalysisService<R, H>
where
    R: RiskRepository + 'static,
    H: PerformanceHistory + 'static,
{
    pub fn new(
        risks: Arc<R>,
        history: Arc<H>,
        directory: Arc<dyn EmployeeDirectory>,
        plans: Arc<dyn DevelopmentPlanGateway>,
        config: DetectionConfig,
    ) -> Self {
        Self {
            risks,
            history,
            directory,
            plans,
            recommendations: Arc::new(NoRecommendations),
            config,
            analysis: AnalysisConfig::default(),
        }
    }

    pub fn with_recommendations(mut self, generator: Arc<dyn RecommendationGenerator>) -> Self {
        self.recommendations = generator;
        self
    }

    pub fn with_analysis_config(mut self, analysis: AnalysisConfig) -> Self {
        self.analysis = analysis;
        self
    }

    pub async fn analyze_risk(
        &self,
        company_id: &CompanyId,
        employee_id: Option<&EmployeeId>,
    ) -> Result<RiskAnalysisReport, RiskServiceError> {
        self.analyze_risk_at(company_id, employee_id, Utc::now()).await
    }

    /// Analyze one employee, or every active employee of the company when `employee_id`
    /// is absent. Batch failures are collected per employee instead of aborting the run.
    pub async fn analyze_risk_at(
        &self,
        company_id: &CompanyId,
        employee_id: Option<&EmployeeId>,
        now: DateTime<Utc>,
    ) -> Result<RiskAnalysisReport, RiskServiceError> {
        if company_id.0.trim().is_empty() {
            return Err(RiskServiceError::InvalidRequest(
                "company_id is required".to_string(),
            ));
        }

        if let Some(employee_id) = employee_id {
            if employee_id.0.trim().is_empty() {
                return Err(RiskServiceError::InvalidRequest(
                    "employee_id must not be blank".to_string(),
                ));
            }
            let summary = self.analyze_employee_at(company_id, employee_id, now).await?;
            return Ok(RiskAnalysisReport {
                company_id: company_id.clone(),
                summaries: vec![summary],
                failures: Vec::new(),
            });
        }

        let employees = self.directory.active_employees(company_id)?;
        let mut results = Vec::with_capacity(employees.len());
        for chunk in employees.chunks(self.analysis.max_concurrency.max(1)) {
            let batch = chunk
                .iter()
                .map(|profile| self.analyze_in_batch(company_id, profile.employee_id.clone(), now));
            results.extend(join_all(batch).await);
        }

        let mut summaries = Vec::new();
        let mut failures = Vec::new();
        for (employee_id, result) in results {
            match result {
                Ok(summary) => summaries.push(summary),
                Err(err) => {
                    warn!(employee_id = %employee_id, error = %err, "risk analysis failed");
                    failures.push(EmployeeAnalysisFailure {
                        employee_id,
                        error: err.to_string(),
                    });
                }
            }
        }
        summaries.sort_by(|a, b| a.employee_id.cmp(&b.employee_id));
        failures.sort_by(|a, b| a.employee_id.cmp(&b.employee_id));

        info!(
            company_id = %company_id,
            analyzed = summaries.len(),
            failed = failures.len(),
            "company risk analysis finished"
        );

        Ok(RiskAnalysisReport {
            company_id: company_id.clone(),
            summaries,
            failures,
        })
    }

    async fn analyze_in_batch(
        &self,
        company_id: &CompanyId,
        employee_id: EmployeeId,
        now: DateTime<Utc>,
    ) -> (EmployeeId, Result<EmployeeRiskSummary, RiskServiceError>) {
        let result = self.analyze_employee_at(company_id, &employee_id, now).await;
        (employee_id, result)
    }

    pub async fn analyze_employee_at(
        &self,
        company_id: &CompanyId,
        employee_id: &EmployeeId,
        now: DateTime<Utc>,
    ) -> Result<EmployeeRiskSummary, RiskServiceError> {
        let ratings = self
            .history
            .recent_cycles(company_id, employee_id, self.config.cycle_limit)?;
        let certifications = self.history.certifications(company_id, employee_id)?;

        let DetectionReport {
            mut detections,
            trend_history,
        } = detect_all(&ratings, &certifications, now.date_naive(), &self.config);

        for detection in detections
            .iter_mut()
            .filter(|detection| detection.risk_level != RiskLevel::Low)
        {
            let request = RecommendationRequest::for_detection(employee_id, detection);
            detection.recommendation = best_effort_recommendation(
                self.recommendations.as_ref(),
                &request,
                self.analysis.recommendation_timeout,
            )
            .await;
        }

        let outcome = reconcile(self.risks.as_ref(), company_id, employee_id, detections, now)?;
        let summary = EmployeeRiskSummary {
            employee_id: employee_id.clone(),
            risks_found: outcome.active.len(),
            risk_types: outcome.active.iter().map(|risk| risk.risk_type).collect(),
            highest_risk_level: outcome.active.iter().map(|risk| risk.risk_level).max(),
            resolved: outcome.resolved,
            trend_history,
        };

        info!(
            employee_id = %employee_id,
            risks_found = summary.risks_found,
            highest = summary.highest_risk_level.map(RiskLevel::label).unwrap_or("none"),
            "employee risk analysis finished"
        );
        Ok(summary)
    }

    pub fn risk_summary(&self, company_id: &CompanyId) -> Result<RiskSummary, RiskServiceError> {
        if company_id.0.trim().is_empty() {
            return Err(RiskServiceError::InvalidRequest(
                "company_id is required".to_string(),
            ));
        }

        let active = self.risks.active_for_company(company_id)?;
        let mut by_type: BTreeMap<RiskType, usize> =
            RiskType::ALL.iter().map(|risk_type| (*risk_type, 0)).collect();
        let mut by_level: BTreeMap<RiskLevel, usize> = [
            RiskLevel::Low,
            RiskLevel::Medium,
            RiskLevel::High,
            RiskLevel::Critical,
        ]
        .into_iter()
        .map(|level| (level, 0))
        .collect();
        let mut employees = BTreeSet::new();

        for risk in &active {
            *by_type.entry(risk.risk_type).or_insert(0) += 1;
            *by_level.entry(risk.risk_level).or_insert(0) += 1;
            employees.insert(risk.employee_id.clone());
        }

        Ok(RiskSummary {
            company_id: company_id.clone(),
            total_active: active.len(),
            by_type,
            by_level,
            affected_employees: employees.len(),
        })
    }

    pub fn trigger_intervention(
        &self,
        risk_id: Uuid,
        kind: RiskInterventionKind,
    ) -> Result<InterventionRecord, RiskServiceError> {
        self.trigger_intervention_at(risk_id, kind, Utc::now())
    }

    /// `idp` creates a development plan through the gateway; other kinds are recorded
    /// against the risk with a generated id.
    pub fn trigger_intervention_at(
        &self,
        risk_id: Uuid,
        kind: RiskInterventionKind,
        now: DateTime<Utc>,
    ) -> Result<InterventionRecord, RiskServiceError> {
        let risk = self
            .risks
            .fetch(risk_id)?
            .ok_or(RiskServiceError::RiskNotFound(risk_id))?;
        if !risk.is_active {
            return Err(RiskServiceError::InvalidRequest(format!(
                "risk {risk_id} is already resolved"
            )));
        }

        let id = match kind {
            RiskInterventionKind::Idp => self.plans.create_plan(&risk)?,
            RiskInterventionKind::Coaching | RiskInterventionKind::Pip => {
                Uuid::new_v4().to_string()
            }
        };
        let record = InterventionRecord {
            intervention_type: kind,
            id,
            triggered_at: now,
        };
        self.risks.append_intervention(risk_id, record.clone())?;

        info!(risk_id = %risk_id, intervention = ?kind, "risk intervention triggered");
        Ok(record)
    }
}

/// Error raised by the risk analysis service.
#[derive(Debug, thiserror::Error)]
pub enum RiskServiceError {
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    #[error("risk {0} not found")]
    RiskNotFound(Uuid),
}
