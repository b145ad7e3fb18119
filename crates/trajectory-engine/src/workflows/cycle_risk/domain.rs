use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::workflows::directory::{CompanyId, EmployeeId};
use crate::workflows::trajectory::RiskLevel;

/// The four patterns tracked as persistent risks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskType {
    ChronicUnderperformance,
    SkillsDecay,
    ToxicHighPerformer,
    DecliningTrend,
}

impl RiskType {
    pub const ALL: [RiskType; 4] = [
        RiskType::ChronicUnderperformance,
        RiskType::SkillsDecay,
        RiskType::ToxicHighPerformer,
        RiskType::DecliningTrend,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            RiskType::ChronicUnderperformance => "chronic_underperformance",
            RiskType::SkillsDecay => "skills_decay",
            RiskType::ToxicHighPerformer => "toxic_high_performer",
            RiskType::DecliningTrend => "declining_trend",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuccessionImpact {
    None,
    Flagged,
    Excluded,
}

/// Ratings from one completed appraisal cycle, each nominally on a 1-5 scale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CycleRating {
    pub cycle_id: String,
    pub cycle_name: String,
    pub completed_on: NaiveDate,
    pub overall: f64,
    pub goal: f64,
    pub competency: f64,
    pub responsibility: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Certification {
    pub certification_id: String,
    pub name: String,
    pub expires_on: NaiveDate,
    pub mandatory: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CycleTrend {
    Improving,
    Stable,
    Declining,
}

/// Per-cycle row emitted by the declining-trend walk, oldest first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendHistoryEntry {
    pub cycle_id: String,
    pub cycle_name: String,
    pub overall: f64,
    pub delta: Option<f64>,
    pub trend: CycleTrend,
    pub consecutive_declines: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpiringCertification {
    pub certification_id: String,
    pub name: String,
    pub expires_on: NaiveDate,
    pub mandatory: bool,
    pub days_until_expiry: i64,
}

/// Type-specific evidence attached to a risk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RiskEvidence {
    ChronicUnderperformance {
        consecutive_underperformance_count: u32,
        affected_competencies: Vec<String>,
        cycle_ids: Vec<String>,
    },
    SkillsDecay {
        mandatory_expiring: u32,
        optional_expiring: u32,
        expiring_certifications: Vec<ExpiringCertification>,
    },
    ToxicHighPerformer {
        goal_rating: f64,
        behavior_rating: f64,
        goal_vs_behavior_gap: f64,
        promotion_block_reason: String,
    },
    DecliningTrend {
        consecutive_declines: u32,
        total_drop: f64,
        trend_history: Vec<TrendHistoryEntry>,
    },
}

/// Output of one detector: what the pattern looks like right now.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskDetection {
    pub risk_type: RiskType,
    pub risk_level: RiskLevel,
    pub risk_score: f64,
    pub succession_impact: SuccessionImpact,
    pub risk_factors: Vec<String>,
    pub evidence: RiskEvidence,
    pub recommendation: Option<String>,
}

/// Intervention appended to a risk's history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskInterventionKind {
    Idp,
    Coaching,
    Pip,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterventionRecord {
    #[serde(rename = "type")]
    pub intervention_type: RiskInterventionKind,
    pub id: String,
    pub triggered_at: DateTime<Utc>,
}

/// Persistent, mutable record of an ongoing pattern. At most one active record exists per
/// `(employee_id, risk_type)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceRisk {
    pub id: Uuid,
    pub employee_id: EmployeeId,
    pub company_id: CompanyId,
    pub risk_type: RiskType,
    pub risk_level: RiskLevel,
    pub risk_score: f64,
    pub risk_factors: Vec<String>,
    pub evidence: RiskEvidence,
    pub succession_impact: SuccessionImpact,
    pub ai_recommendation: Option<String>,
    pub is_active: bool,
    pub first_detected_at: DateTime<Utc>,
    pub last_analyzed_at: DateTime<Utc>,
    pub resolved_at: Option<DateTime<Utc>>,
    pub resolution_notes: Option<String>,
    pub interventions: Vec<InterventionRecord>,
}

impl PerformanceRisk {
    /// Fresh active record for a first detection.
    pub fn from_detection(
        company_id: &CompanyId,
        employee_id: &EmployeeId,
        detection: RiskDetection,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            employee_id: employee_id.clone(),
            company_id: company_id.clone(),
            risk_type: detection.risk_type,
            risk_level: detection.risk_level,
            risk_score: detection.risk_score,
            risk_factors: detection.risk_factors,
            evidence: detection.evidence,
            succession_impact: detection.succession_impact,
            ai_recommendation: detection.recommendation,
            is_active: true,
            first_detected_at: now,
            last_analyzed_at: now,
            resolved_at: None,
            resolution_notes: None,
            interventions: Vec::new(),
        }
    }

    /// Overwrite the analysis fields in place, keeping identity and history.
    pub fn refresh(&mut self, detection: RiskDetection, now: DateTime<Utc>) {
        self.risk_level = detection.risk_level;
        self.risk_score = detection.risk_score;
        self.risk_factors = detection.risk_factors;
        self.evidence = detection.evidence;
        self.succession_impact = detection.succession_impact;
        self.ai_recommendation = detection.recommendation;
        self.last_analyzed_at = now;
    }
}
