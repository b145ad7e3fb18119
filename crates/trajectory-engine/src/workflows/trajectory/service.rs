use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::domain::{NewSignal, Signal, TrajectoryHistory, TrajectoryScore};
use super::intervention::{prompt_for, GeneratedPrompt};
use super::repository::{RepositoryError, TrajectoryRepository};
use super::scoring::{ScoringConfig, TrajectoryAnalysis, TrajectoryEngine};
use crate::workflows::directory::{CompanyId, EmployeeDirectory, EmployeeId, EmployeeProfile};

/// Prompts created for one manager plus the direct reports that could not be processed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PromptGenerationReport {
    pub manager_id: EmployeeId,
    pub prompts: Vec<GeneratedPrompt>,
    pub failures: Vec<PromptFailure>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PromptFailure {
    pub employee_id: EmployeeId,
    pub error: String,
}

/// Number of snapshots returned for charting.
pub const TRAJECTORY_HISTORY_LIMIT: usize = 12;

/// Service composing the signal store, scoring engine and employee directory.
pub struct TrajectoryService<R> {
    repository: Arc<R>,
    directory: Arc<dyn EmployeeDirectory>,
    engine: Arc<TrajectoryEngine>,
}

impl<R> TrajectoryService<R>
where
    R: TrajectoryRepository + 'static,
{
    pub fn new(
        repository: Arc<R>,
        directory: Arc<dyn EmployeeDirectory>,
        config: ScoringConfig,
    ) -> Self {
        Self {
            repository,
            directory,
            engine: Arc::new(TrajectoryEngine::new(config)),
        }
    }

    pub fn engine(&self) -> &TrajectoryEngine {
        &self.engine
    }

    pub fn record_signal(&self, request: NewSignal) -> Result<Signal, TrajectoryServiceError> {
        self.record_signal_at(request, Utc::now())
    }

    /// Validate and append one signal. Values outside 0-100 are accepted as-is.
    pub fn record_signal_at(
        &self,
        request: NewSignal,
        now: DateTime<Utc>,
    ) -> Result<Signal, TrajectoryServiceError> {
        require_id("employee_id", &request.employee_id.0)?;
        require_id("company_id", &request.company_id.0)?;
        if !request.signal_value.is_finite() {
            return Err(TrajectoryServiceError::InvalidRequest(
                "signal_value must be a finite number".to_string(),
            ));
        }
        let signal_weight = request.signal_weight.unwrap_or(1.0);
        if !signal_weight.is_finite() || signal_weight < 0.0 {
            return Err(TrajectoryServiceError::InvalidRequest(
                "signal_weight must be a non-negative number".to_string(),
            ));
        }

        let signal = Signal {
            id: Uuid::new_v4(),
            employee_id: request.employee_id,
            company_id: request.company_id,
            signal_type: request.signal_type,
            signal_value: Some(request.signal_value),
            signal_sentiment: request.signal_sentiment,
            signal_weight,
            captured_at: request.captured_at.unwrap_or(now),
            source_id: request.source_id,
            source_table: request.source_table,
        };

        let stored = self.repository.append_signal(signal)?;
        debug!(
            employee_id = %stored.employee_id,
            signal_type = stored.signal_type.label(),
            "signal recorded"
        );
        Ok(stored)
    }

    /// Score the trailing window without persisting anything.
    pub fn analyze_at(
        &self,
        company_id: &CompanyId,
        employee_id: &EmployeeId,
        now: DateTime<Utc>,
    ) -> Result<TrajectoryAnalysis, TrajectoryServiceError> {
        let since = now - self.engine.config().window();
        let signals = self
            .repository
            .signals_since(company_id, employee_id, since)?;
        Ok(self.engine.analyze(employee_id, company_id, &signals, now))
    }

    pub fn compute_trajectory(
        &self,
        company_id: &CompanyId,
        employee_id: &EmployeeId,
    ) -> Result<TrajectoryScore, TrajectoryServiceError> {
        self.compute_trajectory_at(company_id, employee_id, Utc::now())
    }

    /// Score, then persist the snapshot together with its explainability record.
    pub fn compute_trajectory_at(
        &self,
        company_id: &CompanyId,
        employee_id: &EmployeeId,
        now: DateTime<Utc>,
    ) -> Result<TrajectoryScore, TrajectoryServiceError> {
        require_id("employee_id", &employee_id.0)?;
        require_id("company_id", &company_id.0)?;

        let TrajectoryAnalysis {
            score,
            explainability,
        } = self.analyze_at(company_id, employee_id, now)?;

        debug!(
            trajectory_id = %explainability.trajectory_id,
            confidence = explainability.confidence_score,
            requires_human_review = explainability.requires_human_review,
            factors = explainability.contributing_factors.len(),
            "trajectory explainability"
        );

        let stored = self.repository.insert_snapshot(score, explainability)?;
        info!(
            employee_id = %stored.employee_id,
            score = stored.trajectory_score,
            risk_level = stored.risk_level.label(),
            "trajectory computed"
        );
        Ok(stored)
    }

    pub fn generate_intervention_prompts(
        &self,
        company_id: &CompanyId,
        manager_id: &EmployeeId,
    ) -> Result<PromptGenerationReport, TrajectoryServiceError> {
        self.generate_intervention_prompts_at(company_id, manager_id, Utc::now())
    }

    /// Creates a fresh prompt for every direct report needing one. Repeated calls create
    /// repeated prompts; de-duplication is left to the caller. A failing report is recorded
    /// in `failures` and the remaining reports are still processed.
    pub fn generate_intervention_prompts_at(
        &self,
        company_id: &CompanyId,
        manager_id: &EmployeeId,
        now: DateTime<Utc>,
    ) -> Result<PromptGenerationReport, TrajectoryServiceError> {
        require_id("company_id", &company_id.0)?;
        require_id("manager_id", &manager_id.0)?;

        let reports = self.directory.direct_reports(company_id, manager_id)?;
        let mut prompts = Vec::new();
        let mut failures = Vec::new();

        for employee in reports {
            let employee_id = employee.employee_id.clone();
            match self.prompt_for_report(company_id, manager_id, employee, now) {
                Ok(Some(generated)) => prompts.push(generated),
                Ok(None) => {}
                Err(err) => {
                    warn!(employee_id = %employee_id, error = %err, "intervention prompt failed");
                    failures.push(PromptFailure {
                        employee_id,
                        error: err.to_string(),
                    });
                }
            }
        }

        info!(
            manager_id = %manager_id,
            prompts = prompts.len(),
            failed = failures.len(),
            "intervention prompts generated"
        );
        Ok(PromptGenerationReport {
            manager_id: manager_id.clone(),
            prompts,
            failures,
        })
    }

    fn prompt_for_report(
        &self,
        company_id: &CompanyId,
        manager_id: &EmployeeId,
        employee: EmployeeProfile,
        now: DateTime<Utc>,
    ) -> Result<Option<GeneratedPrompt>, TrajectoryServiceError> {
        let analysis = self.analyze_at(company_id, &employee.employee_id, now)?;
        let Some(prompt) = prompt_for(manager_id, &employee, &analysis.score, now) else {
            return Ok(None);
        };

        let prompt = self.repository.insert_prompt(prompt)?;
        Ok(Some(GeneratedPrompt {
            prompt,
            employee_name: employee.full_name,
            trajectory_score: analysis.score.trajectory_score,
            risk_level: analysis.score.risk_level,
        }))
    }

    pub fn employee_trajectory(
        &self,
        employee_id: &EmployeeId,
    ) -> Result<TrajectoryHistory, TrajectoryServiceError> {
        require_id("employee_id", &employee_id.0)?;
        let history = self
            .repository
            .snapshots(employee_id, TRAJECTORY_HISTORY_LIMIT)?;
        Ok(TrajectoryHistory {
            employee_id: employee_id.clone(),
            latest: history.first().cloned(),
            history,
        })
    }
}

fn require_id(field: &str, value: &str) -> Result<(), TrajectoryServiceError> {
    if value.trim().is_empty() {
        return Err(TrajectoryServiceError::InvalidRequest(format!(
            "{field} is required"
        )));
    }
    Ok(())
}

/// Error raised by the trajectory service.
#[derive(Debug, thiserror::Error)]
pub enum TrajectoryServiceError {
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}
