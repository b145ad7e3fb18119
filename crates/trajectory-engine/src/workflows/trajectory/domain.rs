use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::workflows::directory::{CompanyId, EmployeeId};

/// Closed set of performance events the feed can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalType {
    GoalProgress,
    Feedback,
    Training,
    Recognition,
    CheckIn,
    Project,
    SkillValidation,
}

impl SignalType {
    pub const ALL: [SignalType; 7] = [
        SignalType::GoalProgress,
        SignalType::Feedback,
        SignalType::Training,
        SignalType::Recognition,
        SignalType::CheckIn,
        SignalType::Project,
        SignalType::SkillValidation,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            SignalType::GoalProgress => "goal_progress",
            SignalType::Feedback => "feedback",
            SignalType::Training => "training",
            SignalType::Recognition => "recognition",
            SignalType::CheckIn => "check_in",
            SignalType::Project => "project",
            SignalType::SkillValidation => "skill_validation",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalSentiment {
    Positive,
    Neutral,
    Negative,
}

/// One immutable observation in the signal log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    pub id: Uuid,
    pub employee_id: EmployeeId,
    pub company_id: CompanyId,
    pub signal_type: SignalType,
    /// Conventionally 0-100; legacy rows may carry no value and score as neutral.
    pub signal_value: Option<f64>,
    pub signal_sentiment: Option<SignalSentiment>,
    pub signal_weight: f64,
    pub captured_at: DateTime<Utc>,
    pub source_id: Option<String>,
    pub source_table: Option<String>,
}

/// Inbound request to append a signal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewSignal {
    pub employee_id: EmployeeId,
    pub company_id: CompanyId,
    pub signal_type: SignalType,
    pub signal_value: f64,
    #[serde(default)]
    pub signal_sentiment: Option<SignalSentiment>,
    #[serde(default)]
    pub source_id: Option<String>,
    #[serde(default)]
    pub source_table: Option<String>,
    #[serde(default)]
    pub signal_weight: Option<f64>,
    #[serde(default)]
    pub captured_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Momentum {
    Accelerating,
    Stable,
    Decelerating,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendDirection {
    Improving,
    Stable,
    Declining,
}

/// Ordinal risk classification shared by trajectory snapshots and cycle-based risks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    pub const fn label(self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
            RiskLevel::Critical => "critical",
        }
    }
}

/// Managerial action category recommended from a trajectory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterventionType {
    Pip,
    Support,
    Coaching,
    Recognition,
    CheckIn,
}

/// Per-type breakdown used to explain a score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContributingFactor {
    pub signal_type: SignalType,
    pub average_value: f64,
    pub event_count: usize,
}

/// Append-only snapshot produced by one scoring run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrajectoryScore {
    pub id: Uuid,
    pub employee_id: EmployeeId,
    pub company_id: CompanyId,
    pub trajectory_score: f64,
    pub momentum: Momentum,
    pub trend_direction: TrendDirection,
    pub risk_level: RiskLevel,
    pub contributing_factors: Vec<ContributingFactor>,
    pub intervention_recommended: bool,
    pub intervention_type: Option<InterventionType>,
    /// Whole days since the newest signal; absent when the window is empty.
    pub data_freshness_days: Option<i64>,
    pub minimum_signals_met: bool,
    pub calculated_at: DateTime<Utc>,
}

/// Audit trail persisted next to every snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExplainabilityRecord {
    pub trajectory_id: Uuid,
    pub employee_id: EmployeeId,
    pub company_id: CompanyId,
    pub trajectory_score: f64,
    pub type_weights: BTreeMap<SignalType, f64>,
    pub contributing_factors: Vec<ContributingFactor>,
    pub confidence_score: f64,
    pub requires_human_review: bool,
    pub logged_at: DateTime<Utc>,
}

/// Latest snapshot plus bounded history for charting, newest first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrajectoryHistory {
    pub employee_id: EmployeeId,
    pub latest: Option<TrajectoryScore>,
    pub history: Vec<TrajectoryScore>,
}
