use std::sync::Arc;

use axum::response::Response;
use chrono::{DateTime, Duration, TimeZone, Utc};
use serde_json::Value;
use uuid::Uuid;

use crate::workflows::directory::{CompanyId, EmployeeId, EmployeeProfile};
use crate::workflows::memory::{InMemoryDirectory, InMemoryTrajectoryRepository};
use crate::workflows::storage::RepositoryError;
use crate::workflows::trajectory::{
    ExplainabilityRecord, InterventionPrompt, NewSignal, ScoringConfig, Signal, SignalType,
    TrajectoryRepository, TrajectoryScore, TrajectoryService,
};

pub(super) fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0)
        .single()
        .expect("valid timestamp")
}

pub(super) fn company() -> CompanyId {
    CompanyId::from("acme")
}

pub(super) fn manager() -> EmployeeId {
    EmployeeId::from("mgr-1")
}

pub(super) fn signal(signal_type: SignalType, value: f64, days_ago: i64) -> Signal {
    Signal {
        id: Uuid::new_v4(),
        employee_id: EmployeeId::from("emp-1"),
        company_id: company(),
        signal_type,
        signal_value: Some(value),
        signal_sentiment: None,
        signal_weight: 1.0,
        captured_at: now() - Duration::days(days_ago),
        source_id: None,
        source_table: None,
    }
}

pub(super) fn new_signal(employee: &str, signal_type: SignalType, value: f64, days_ago: i64) -> NewSignal {
    NewSignal {
        employee_id: EmployeeId::from(employee),
        company_id: company(),
        signal_type,
        signal_value: value,
        signal_sentiment: None,
        source_id: Some("review-42".to_string()),
        source_table: Some("feedback".to_string()),
        signal_weight: None,
        captured_at: Some(now() - Duration::days(days_ago)),
    }
}

pub(super) fn report(employee: &str, name: &str) -> EmployeeProfile {
    EmployeeProfile {
        employee_id: EmployeeId::from(employee),
        company_id: company(),
        full_name: name.to_string(),
        manager_id: Some(manager()),
        active: true,
    }
}

pub(super) fn directory() -> InMemoryDirectory {
    InMemoryDirectory::with_employees(vec![
        report("emp-1", "Dana Reyes"),
        report("emp-2", "Sam Okafor"),
        EmployeeProfile {
            active: false,
            ..report("emp-3", "Former Staff")
        },
    ])
}

pub(super) fn build_service() -> (
    TrajectoryService<InMemoryTrajectoryRepository>,
    Arc<InMemoryTrajectoryRepository>,
) {
    let repository = Arc::new(InMemoryTrajectoryRepository::default());
    let service = TrajectoryService::new(
        repository.clone(),
        Arc::new(directory()),
        ScoringConfig::default(),
    );
    (service, repository)
}

pub(super) fn seed(service: &TrajectoryService<InMemoryTrajectoryRepository>, signals: Vec<NewSignal>) {
    for request in signals {
        service
            .record_signal_at(request, now())
            .expect("signal recorded");
    }
}

pub(super) struct UnavailableRepository;

impl TrajectoryRepository for UnavailableRepository {
    fn append_signal(&self, _signal: Signal) -> Result<Signal, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn signals_since(
        &self,
        _company_id: &CompanyId,
        _employee_id: &EmployeeId,
        _since: DateTime<Utc>,
    ) -> Result<Vec<Signal>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn insert_snapshot(
        &self,
        _score: TrajectoryScore,
        _explainability: ExplainabilityRecord,
    ) -> Result<TrajectoryScore, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn snapshots(
        &self,
        _employee_id: &EmployeeId,
        _limit: usize,
    ) -> Result<Vec<TrajectoryScore>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn insert_prompt(
        &self,
        _prompt: InterventionPrompt,
    ) -> Result<InterventionPrompt, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

/// Delegates to the in-memory store but fails window reads for one employee.
pub(super) struct FlakyTrajectoryRepository {
    pub(super) inner: Arc<InMemoryTrajectoryRepository>,
    pub(super) failing: EmployeeId,
}

impl TrajectoryRepository for FlakyTrajectoryRepository {
    fn append_signal(&self, signal: Signal) -> Result<Signal, RepositoryError> {
        self.inner.append_signal(signal)
    }

    fn signals_since(
        &self,
        company_id: &CompanyId,
        employee_id: &EmployeeId,
        since: DateTime<Utc>,
    ) -> Result<Vec<Signal>, RepositoryError> {
        if *employee_id == self.failing {
            return Err(RepositoryError::Unavailable("replica lagging".to_string()));
        }
        self.inner.signals_since(company_id, employee_id, since)
    }

    fn insert_snapshot(
        &self,
        score: TrajectoryScore,
        explainability: ExplainabilityRecord,
    ) -> Result<TrajectoryScore, RepositoryError> {
        self.inner.insert_snapshot(score, explainability)
    }

    fn snapshots(
        &self,
        employee_id: &EmployeeId,
        limit: usize,
    ) -> Result<Vec<TrajectoryScore>, RepositoryError> {
        self.inner.snapshots(employee_id, limit)
    }

    fn insert_prompt(&self, prompt: InterventionPrompt) -> Result<InterventionPrompt, RepositoryError> {
        self.inner.insert_prompt(prompt)
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
