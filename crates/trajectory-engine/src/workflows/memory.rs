//! Mutex-backed stores used by the demo server, the CLI and tests.
//!
//! Each store keeps its rows behind one lock, so the conditional writes on the risk table
//! are atomic with respect to concurrent analyses.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::cycle_risk::{
    Certification, CycleRating, DevelopmentPlanGateway, InterventionRecord, PerformanceHistory,
    PerformanceRisk, RiskDetection, RiskRepository, RiskType, RiskUpsert,
};
use super::directory::{CompanyId, EmployeeDirectory, EmployeeId, EmployeeProfile};
use super::storage::RepositoryError;
use super::trajectory::{
    ExplainabilityRecord, InterventionPrompt, Signal, TrajectoryRepository, TrajectoryScore,
};

fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>, RepositoryError> {
    mutex
        .lock()
        .map_err(|_| RepositoryError::Unavailable("in-memory store poisoned".to_string()))
}

#[derive(Debug, Default)]
struct TrajectoryTables {
    signals: Vec<Signal>,
    snapshots: Vec<TrajectoryScore>,
    explainability: Vec<ExplainabilityRecord>,
    prompts: Vec<InterventionPrompt>,
}

#[derive(Debug, Default, Clone)]
pub struct InMemoryTrajectoryRepository {
    tables: Arc<Mutex<TrajectoryTables>>,
}

impl InMemoryTrajectoryRepository {
    pub fn signal_count(&self) -> usize {
        lock(&self.tables).map(|tables| tables.signals.len()).unwrap_or(0)
    }

    pub fn explainability(&self) -> Vec<ExplainabilityRecord> {
        lock(&self.tables)
            .map(|tables| tables.explainability.clone())
            .unwrap_or_default()
    }

    pub fn prompts(&self) -> Vec<InterventionPrompt> {
        lock(&self.tables)
            .map(|tables| tables.prompts.clone())
            .unwrap_or_default()
    }
}

impl TrajectoryRepository for InMemoryTrajectoryRepository {
    fn append_signal(&self, signal: Signal) -> Result<Signal, RepositoryError> {
        let mut tables = lock(&self.tables)?;
        if tables.signals.iter().any(|existing| existing.id == signal.id) {
            return Err(RepositoryError::Conflict);
        }
        tables.signals.push(signal.clone());
        Ok(signal)
    }

    fn signals_since(
        &self,
        company_id: &CompanyId,
        employee_id: &EmployeeId,
        since: DateTime<Utc>,
    ) -> Result<Vec<Signal>, RepositoryError> {
        let tables = lock(&self.tables)?;
        Ok(tables
            .signals
            .iter()
            .filter(|signal| {
                &signal.company_id == company_id
                    && &signal.employee_id == employee_id
                    && signal.captured_at >= since
            })
            .cloned()
            .collect())
    }

    fn insert_snapshot(
        &self,
        score: TrajectoryScore,
        explainability: ExplainabilityRecord,
    ) -> Result<TrajectoryScore, RepositoryError> {
        let mut tables = lock(&self.tables)?;
        tables.snapshots.push(score.clone());
        tables.explainability.push(explainability);
        Ok(score)
    }

    fn snapshots(
        &self,
        employee_id: &EmployeeId,
        limit: usize,
    ) -> Result<Vec<TrajectoryScore>, RepositoryError> {
        let tables = lock(&self.tables)?;
        let mut snapshots: Vec<TrajectoryScore> = tables
            .snapshots
            .iter()
            .filter(|snapshot| &snapshot.employee_id == employee_id)
            .cloned()
            .collect();
        // Stable sort keeps insertion order for equal timestamps; reverse puts newest first.
        snapshots.sort_by_key(|snapshot| snapshot.calculated_at);
        snapshots.reverse();
        snapshots.truncate(limit);
        Ok(snapshots)
    }

    fn insert_prompt(
        &self,
        prompt: InterventionPrompt,
    ) -> Result<InterventionPrompt, RepositoryError> {
        lock(&self.tables)?.prompts.push(prompt.clone());
        Ok(prompt)
    }
}

#[derive(Debug, Default, Clone)]
pub struct InMemoryRiskRepository {
    risks: Arc<Mutex<HashMap<Uuid, PerformanceRisk>>>,
}

impl InMemoryRiskRepository {
    /// Every record, active or resolved, ordered by first detection.
    pub fn all(&self) -> Vec<PerformanceRisk> {
        let mut risks: Vec<PerformanceRisk> = lock(&self.risks)
            .map(|risks| risks.values().cloned().collect())
            .unwrap_or_default();
        risks.sort_by(|a, b| {
            a.first_detected_at
                .cmp(&b.first_detected_at)
                .then_with(|| a.risk_type.cmp(&b.risk_type))
        });
        risks
    }
}

fn active_key<'a>(
    risks: &'a mut HashMap<Uuid, PerformanceRisk>,
    employee_id: &EmployeeId,
    risk_type: RiskType,
) -> Option<&'a mut PerformanceRisk> {
    risks.values_mut().find(|risk| {
        risk.is_active && &risk.employee_id == employee_id && risk.risk_type == risk_type
    })
}

impl RiskRepository for InMemoryRiskRepository {
    fn upsert_active(
        &self,
        company_id: &CompanyId,
        employee_id: &EmployeeId,
        detection: RiskDetection,
        now: DateTime<Utc>,
    ) -> Result<RiskUpsert, RepositoryError> {
        let mut risks = lock(&self.risks)?;
        if let Some(existing) = active_key(&mut risks, employee_id, detection.risk_type) {
            existing.refresh(detection, now);
            return Ok(RiskUpsert::Updated(existing.clone()));
        }

        let risk = PerformanceRisk::from_detection(company_id, employee_id, detection, now);
        risks.insert(risk.id, risk.clone());
        Ok(RiskUpsert::Created(risk))
    }

    fn resolve_active(
        &self,
        employee_id: &EmployeeId,
        risk_type: RiskType,
        now: DateTime<Utc>,
        note: &str,
    ) -> Result<Option<PerformanceRisk>, RepositoryError> {
        let mut risks = lock(&self.risks)?;
        Ok(active_key(&mut risks, employee_id, risk_type).map(|risk| {
            risk.is_active = false;
            risk.resolved_at = Some(now);
            risk.resolution_notes = Some(note.to_string());
            risk.clone()
        }))
    }

    fn active_for_employee(
        &self,
        employee_id: &EmployeeId,
    ) -> Result<Vec<PerformanceRisk>, RepositoryError> {
        let risks = lock(&self.risks)?;
        let mut active: Vec<PerformanceRisk> = risks
            .values()
            .filter(|risk| risk.is_active && &risk.employee_id == employee_id)
            .cloned()
            .collect();
        active.sort_by_key(|risk| risk.risk_type);
        Ok(active)
    }

    fn active_for_company(
        &self,
        company_id: &CompanyId,
    ) -> Result<Vec<PerformanceRisk>, RepositoryError> {
        let risks = lock(&self.risks)?;
        let mut active: Vec<PerformanceRisk> = risks
            .values()
            .filter(|risk| risk.is_active && &risk.company_id == company_id)
            .cloned()
            .collect();
        active.sort_by(|a, b| {
            a.employee_id
                .cmp(&b.employee_id)
                .then_with(|| a.risk_type.cmp(&b.risk_type))
        });
        Ok(active)
    }

    fn fetch(&self, risk_id: Uuid) -> Result<Option<PerformanceRisk>, RepositoryError> {
        Ok(lock(&self.risks)?.get(&risk_id).cloned())
    }

    fn append_intervention(
        &self,
        risk_id: Uuid,
        record: InterventionRecord,
    ) -> Result<PerformanceRisk, RepositoryError> {
        let mut risks = lock(&self.risks)?;
        let risk = risks.get_mut(&risk_id).ok_or(RepositoryError::NotFound)?;
        risk.interventions.push(record);
        Ok(risk.clone())
    }
}

#[derive(Debug, Default)]
struct HistoryTables {
    cycles: HashMap<EmployeeId, Vec<(CompanyId, CycleRating)>>,
    certifications: HashMap<EmployeeId, Vec<(CompanyId, Certification)>>,
}

/// Appraisal and certification feed seeded by callers.
#[derive(Debug, Default, Clone)]
pub struct InMemoryPerformanceHistory {
    tables: Arc<Mutex<HistoryTables>>,
}

impl InMemoryPerformanceHistory {
    pub fn record_cycle(
        &self,
        company_id: &CompanyId,
        employee_id: &EmployeeId,
        rating: CycleRating,
    ) -> Result<(), RepositoryError> {
        lock(&self.tables)?
            .cycles
            .entry(employee_id.clone())
            .or_default()
            .push((company_id.clone(), rating));
        Ok(())
    }

    pub fn record_certification(
        &self,
        company_id: &CompanyId,
        employee_id: &EmployeeId,
        certification: Certification,
    ) -> Result<(), RepositoryError> {
        lock(&self.tables)?
            .certifications
            .entry(employee_id.clone())
            .or_default()
            .push((company_id.clone(), certification));
        Ok(())
    }
}

impl PerformanceHistory for InMemoryPerformanceHistory {
    fn recent_cycles(
        &self,
        company_id: &CompanyId,
        employee_id: &EmployeeId,
        limit: usize,
    ) -> Result<Vec<CycleRating>, RepositoryError> {
        let tables = lock(&self.tables)?;
        let mut cycles: Vec<CycleRating> = tables
            .cycles
            .get(employee_id)
            .map(|rows| {
                rows.iter()
                    .filter(|(company, _)| company == company_id)
                    .map(|(_, rating)| rating.clone())
                    .collect()
            })
            .unwrap_or_default();
        cycles.sort_by(|a, b| b.completed_on.cmp(&a.completed_on));
        cycles.truncate(limit);
        Ok(cycles)
    }

    fn certifications(
        &self,
        company_id: &CompanyId,
        employee_id: &EmployeeId,
    ) -> Result<Vec<Certification>, RepositoryError> {
        let tables = lock(&self.tables)?;
        Ok(tables
            .certifications
            .get(employee_id)
            .map(|rows| {
                rows.iter()
                    .filter(|(company, _)| company == company_id)
                    .map(|(_, certification)| certification.clone())
                    .collect()
            })
            .unwrap_or_default())
    }
}

#[derive(Debug, Default, Clone)]
pub struct InMemoryDirectory {
    employees: Arc<Mutex<Vec<EmployeeProfile>>>,
}

impl InMemoryDirectory {
    pub fn with_employees(employees: Vec<EmployeeProfile>) -> Self {
        Self {
            employees: Arc::new(Mutex::new(employees)),
        }
    }

    pub fn add(&self, profile: EmployeeProfile) -> Result<(), RepositoryError> {
        lock(&self.employees)?.push(profile);
        Ok(())
    }
}

impl EmployeeDirectory for InMemoryDirectory {
    fn direct_reports(
        &self,
        company_id: &CompanyId,
        manager_id: &EmployeeId,
    ) -> Result<Vec<EmployeeProfile>, RepositoryError> {
        let employees = lock(&self.employees)?;
        Ok(employees
            .iter()
            .filter(|profile| {
                profile.active
                    && &profile.company_id == company_id
                    && profile.manager_id.as_ref() == Some(manager_id)
            })
            .cloned()
            .collect())
    }

    fn active_employees(
        &self,
        company_id: &CompanyId,
    ) -> Result<Vec<EmployeeProfile>, RepositoryError> {
        let employees = lock(&self.employees)?;
        Ok(employees
            .iter()
            .filter(|profile| profile.active && &profile.company_id == company_id)
            .cloned()
            .collect())
    }
}

/// Records plan requests and hands back sequential plan ids.
#[derive(Debug, Default, Clone)]
pub struct InMemoryDevelopmentPlans {
    created: Arc<Mutex<Vec<Uuid>>>,
}

impl InMemoryDevelopmentPlans {
    /// Risk ids for which a plan was created, in request order.
    pub fn requested_for(&self) -> Vec<Uuid> {
        lock(&self.created)
            .map(|created| created.clone())
            .unwrap_or_default()
    }
}

impl DevelopmentPlanGateway for InMemoryDevelopmentPlans {
    fn create_plan(&self, risk: &PerformanceRisk) -> Result<String, RepositoryError> {
        let mut created = lock(&self.created)?;
        created.push(risk.id);
        Ok(format!("idp-{}", created.len()))
    }
}
