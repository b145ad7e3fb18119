use chrono::{DateTime, Utc};

use super::domain::{ExplainabilityRecord, Signal, TrajectoryScore};
use super::intervention::InterventionPrompt;
use crate::workflows::directory::{CompanyId, EmployeeId};
pub use crate::workflows::storage::RepositoryError;

/// Storage abstraction over the signal log, snapshot history and prompt table.
pub trait TrajectoryRepository: Send + Sync {
    fn append_signal(&self, signal: Signal) -> Result<Signal, RepositoryError>;

    /// Signals for one employee captured at or after `since`, in any order.
    fn signals_since(
        &self,
        company_id: &CompanyId,
        employee_id: &EmployeeId,
        since: DateTime<Utc>,
    ) -> Result<Vec<Signal>, RepositoryError>;

    /// Persist a snapshot and its explainability record as one unit.
    fn insert_snapshot(
        &self,
        score: TrajectoryScore,
        explainability: ExplainabilityRecord,
    ) -> Result<TrajectoryScore, RepositoryError>;

    /// Most recent snapshots first.
    fn snapshots(
        &self,
        employee_id: &EmployeeId,
        limit: usize,
    ) -> Result<Vec<TrajectoryScore>, RepositoryError>;

    fn insert_prompt(
        &self,
        prompt: InterventionPrompt,
    ) -> Result<InterventionPrompt, RepositoryError>;
}
