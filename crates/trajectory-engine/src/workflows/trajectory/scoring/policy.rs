use super::super::domain::{InterventionType, Momentum, RiskLevel, TrendDirection};
use super::config::ScoringConfig;

/// Bands are inclusive on their lower bound. A medium score that is both declining and
/// decelerating escalates to high.
pub fn classify_risk_level(
    score: f64,
    trend: TrendDirection,
    momentum: Momentum,
    config: &ScoringConfig,
) -> RiskLevel {
    if score < config.critical_below {
        RiskLevel::Critical
    } else if score < config.high_below {
        RiskLevel::High
    } else if score < config.medium_below {
        if trend == TrendDirection::Declining && momentum == Momentum::Decelerating {
            RiskLevel::High
        } else {
            RiskLevel::Medium
        }
    } else {
        RiskLevel::Low
    }
}

/// First matching row of the intervention table wins.
pub fn decide_intervention(
    risk_level: RiskLevel,
    trend: TrendDirection,
    score: f64,
    config: &ScoringConfig,
) -> Option<InterventionType> {
    match (risk_level, trend) {
        (RiskLevel::Critical, _) => Some(InterventionType::Pip),
        (RiskLevel::High, _) => Some(InterventionType::Support),
        (RiskLevel::Medium, TrendDirection::Declining) => Some(InterventionType::Coaching),
        (_, TrendDirection::Improving) if score >= config.recognition_min_score => {
            Some(InterventionType::Recognition)
        }
        _ => None,
    }
}
