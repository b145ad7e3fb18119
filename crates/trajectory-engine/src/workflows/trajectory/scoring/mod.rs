mod config;
mod policy;
mod rules;

pub use config::ScoringConfig;
pub use policy::{classify_risk_level, decide_intervention};
pub use rules::{
    contributing_factors, momentum, recency_weight, regression_slope, trajectory_score,
    trend_direction,
};

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::domain::{ExplainabilityRecord, RiskLevel, Signal, TrajectoryScore};
use crate::workflows::directory::{CompanyId, EmployeeId};

/// Stateless scorer applying one [`ScoringConfig`] to a signal window.
#[derive(Debug, Clone)]
pub struct TrajectoryEngine {
    config: ScoringConfig,
}

/// Snapshot and its audit record, persisted together.
#[derive(Debug, Clone, PartialEq)]
pub struct TrajectoryAnalysis {
    pub score: TrajectoryScore,
    pub explainability: ExplainabilityRecord,
}

impl TrajectoryEngine {
    pub fn new(config: ScoringConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    /// Score the signals captured within the window ending at `now`. Older signals are
    /// ignored even if the caller passes them.
    pub fn analyze(
        &self,
        employee_id: &EmployeeId,
        company_id: &CompanyId,
        signals: &[Signal],
        now: DateTime<Utc>,
    ) -> TrajectoryAnalysis {
        let window_start = now - self.config.window();
        let window: Vec<Signal> = signals
            .iter()
            .filter(|signal| signal.captured_at >= window_start)
            .cloned()
            .collect();

        let summary = rules::summarize(&window, &self.config, now);
        let risk_level = classify_risk_level(
            summary.trajectory_score,
            summary.trend_direction,
            summary.momentum,
            &self.config,
        );
        let intervention_type = decide_intervention(
            risk_level,
            summary.trend_direction,
            summary.trajectory_score,
            &self.config,
        );

        let score = TrajectoryScore {
            id: Uuid::new_v4(),
            employee_id: employee_id.clone(),
            company_id: company_id.clone(),
            trajectory_score: summary.trajectory_score,
            momentum: summary.momentum,
            trend_direction: summary.trend_direction,
            risk_level,
            contributing_factors: summary.contributing_factors,
            intervention_recommended: intervention_type.is_some(),
            intervention_type,
            data_freshness_days: summary.data_freshness_days,
            minimum_signals_met: summary.signal_count >= self.config.minimum_signals,
            calculated_at: now,
        };

        let total_events: usize = score
            .contributing_factors
            .iter()
            .map(|factor| factor.event_count)
            .sum();
        let confidence_score = if total_events >= self.config.confidence_event_threshold {
            self.config.high_confidence
        } else {
            self.config.low_confidence
        };

        let explainability = ExplainabilityRecord {
            trajectory_id: score.id,
            employee_id: employee_id.clone(),
            company_id: company_id.clone(),
            trajectory_score: score.trajectory_score,
            type_weights: self.config.resolved_type_weights(),
            contributing_factors: score.contributing_factors.clone(),
            confidence_score,
            requires_human_review: matches!(risk_level, RiskLevel::High | RiskLevel::Critical),
            logged_at: now,
        };

        TrajectoryAnalysis {
            score,
            explainability,
        }
    }
}

impl Default for TrajectoryEngine {
    fn default() -> Self {
        Self::new(ScoringConfig::default())
    }
}
