use std::collections::BTreeMap;

use chrono::Duration;
use serde::{Deserialize, Serialize};

use super::super::domain::SignalType;

/// Weights and thresholds driving trajectory scoring and classification.
///
/// Production code builds one [`ScoringConfig::default`] at start-up; tests override single
/// fields instead of patching globals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringConfig {
    pub type_weights: BTreeMap<SignalType, f64>,
    /// Weight for any signal type missing from `type_weights`.
    pub fallback_type_weight: f64,
    pub neutral_score: f64,
    pub window_days: i64,
    pub recent_window_days: i64,
    pub recency_floor: f64,
    pub recency_decay: f64,
    pub minimum_signals: usize,
    pub momentum_min_per_bucket: usize,
    pub momentum_delta_threshold: f64,
    pub trend_min_signals: usize,
    pub trend_sample_size: usize,
    pub trend_slope_threshold: f64,
    pub critical_below: f64,
    pub high_below: f64,
    pub medium_below: f64,
    pub recognition_min_score: f64,
    pub confidence_event_threshold: usize,
    pub high_confidence: f64,
    pub low_confidence: f64,
}

impl ScoringConfig {
    pub fn type_weight(&self, signal_type: SignalType) -> f64 {
        self.type_weights
            .get(&signal_type)
            .copied()
            .unwrap_or(self.fallback_type_weight)
    }

    /// Weight table with every signal type resolved, as logged for explainability.
    pub fn resolved_type_weights(&self) -> BTreeMap<SignalType, f64> {
        SignalType::ALL
            .iter()
            .map(|signal_type| (*signal_type, self.type_weight(*signal_type)))
            .collect()
    }

    pub fn window(&self) -> Duration {
        Duration::days(self.window_days)
    }

    pub fn recent_window(&self) -> Duration {
        Duration::days(self.recent_window_days)
    }
}

impl Default for ScoringConfig {
    fn default() -> Self {
        let type_weights = BTreeMap::from([
            (SignalType::GoalProgress, 0.25),
            (SignalType::Feedback, 0.20),
            (SignalType::Training, 0.15),
            (SignalType::Recognition, 0.15),
            (SignalType::CheckIn, 0.10),
            (SignalType::Project, 0.10),
            (SignalType::SkillValidation, 0.05),
        ]);

        Self {
            type_weights,
            fallback_type_weight: 0.10,
            neutral_score: 50.0,
            window_days: 90,
            recent_window_days: 30,
            recency_floor: 0.3,
            recency_decay: 0.7,
            minimum_signals: 5,
            momentum_min_per_bucket: 2,
            momentum_delta_threshold: 10.0,
            trend_min_signals: 3,
            trend_sample_size: 10,
            trend_slope_threshold: 2.0,
            critical_below: 30.0,
            high_below: 45.0,
            medium_below: 60.0,
            recognition_min_score: 85.0,
            confidence_event_threshold: 10,
            high_confidence: 0.85,
            low_confidence: 0.65,
        }
    }
}
