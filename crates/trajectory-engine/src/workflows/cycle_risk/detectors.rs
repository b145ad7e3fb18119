use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use super::domain::{
    Certification, CycleRating, CycleTrend, ExpiringCertification, RiskDetection, RiskEvidence,
    RiskType, SuccessionImpact, TrendHistoryEntry,
};
use crate::workflows::trajectory::RiskLevel;

/// Constants for the cycle-based detectors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionConfig {
    pub cycle_limit: usize,
    pub underperformance_threshold: f64,
    pub competency_floor: f64,
    pub chronic_min_streak: u32,
    pub chronic_base_score: f64,
    pub chronic_per_cycle: f64,
    pub critical_score: f64,
    pub high_score: f64,
    pub certification_horizon_days: i64,
    pub mandatory_base_score: f64,
    pub mandatory_per_certification: f64,
    pub optional_base_score: f64,
    pub optional_per_certification: f64,
    pub optional_score_cap: f64,
    pub toxic_min_goal: f64,
    pub toxic_max_behavior: f64,
    pub toxic_base_score: f64,
    pub toxic_gap_multiplier: f64,
    pub toxic_high_gap: f64,
    pub trend_delta_threshold: f64,
    pub trend_min_declines: u32,
    pub trend_high_declines: u32,
    pub trend_base_score: f64,
    pub trend_per_decline: f64,
    pub trend_drop_multiplier: f64,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            cycle_limit: 5,
            underperformance_threshold: 3.0,
            competency_floor: 2.5,
            chronic_min_streak: 2,
            chronic_base_score: 40.0,
            chronic_per_cycle: 15.0,
            critical_score: 75.0,
            high_score: 50.0,
            certification_horizon_days: 90,
            mandatory_base_score: 30.0,
            mandatory_per_certification: 20.0,
            optional_base_score: 15.0,
            optional_per_certification: 10.0,
            optional_score_cap: 60.0,
            toxic_min_goal: 4.0,
            toxic_max_behavior: 2.5,
            toxic_base_score: 50.0,
            toxic_gap_multiplier: 10.0,
            toxic_high_gap: 2.0,
            trend_delta_threshold: 0.2,
            trend_min_declines: 2,
            trend_high_declines: 3,
            trend_base_score: 30.0,
            trend_per_decline: 15.0,
            trend_drop_multiplier: 10.0,
        }
    }
}

/// Detections plus the per-cycle trend rows used for charting.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DetectionReport {
    pub detections: Vec<RiskDetection>,
    pub trend_history: Vec<TrendHistoryEntry>,
}

/// Run every detector. `ratings` are most recent first and truncated to the cycle limit.
pub fn detect_all(
    ratings: &[CycleRating],
    certifications: &[Certification],
    today: NaiveDate,
    config: &DetectionConfig,
) -> DetectionReport {
    let ratings = &ratings[..ratings.len().min(config.cycle_limit)];
    let (declining, trend_history) = declining_trend(ratings, config);

    let detections = [
        chronic_underperformance(ratings, config),
        skills_decay(certifications, today, config),
        toxic_high_performer(ratings, config),
        declining,
    ]
    .into_iter()
    .flatten()
    .collect();

    DetectionReport {
        detections,
        trend_history,
    }
}

fn level_for_score(score: f64, config: &DetectionConfig) -> RiskLevel {
    if score >= config.critical_score {
        RiskLevel::Critical
    } else if score >= config.high_score {
        RiskLevel::High
    } else {
        RiskLevel::Medium
    }
}

/// Currently running streak of sub-par cycles, counted from the most recent backwards.
pub fn chronic_underperformance(
    ratings: &[CycleRating],
    config: &DetectionConfig,
) -> Option<RiskDetection> {
    let streak: Vec<&CycleRating> = ratings
        .iter()
        .take_while(|cycle| {
            cycle.overall < config.underperformance_threshold
                || cycle.goal < config.underperformance_threshold
        })
        .collect();

    let count = streak.len() as u32;
    if count < config.chronic_min_streak {
        return None;
    }

    let mut affected_competencies = Vec::new();
    if streak.iter().any(|cycle| cycle.competency < config.competency_floor) {
        affected_competencies.push("competency".to_string());
    }
    if streak
        .iter()
        .any(|cycle| cycle.responsibility < config.competency_floor)
    {
        affected_competencies.push("responsibility".to_string());
    }

    let risk_score =
        (config.chronic_base_score + f64::from(count) * config.chronic_per_cycle).min(100.0);
    let risk_level = level_for_score(risk_score, config);
    let succession_impact = match risk_level {
        RiskLevel::Critical => SuccessionImpact::Excluded,
        RiskLevel::High => SuccessionImpact::Flagged,
        _ => SuccessionImpact::None,
    };

    let mut risk_factors = vec![format!(
        "{count} consecutive cycles rated below {:.1} overall or on goals",
        config.underperformance_threshold
    )];
    if !affected_competencies.is_empty() {
        risk_factors.push(format!(
            "{} rated below {:.1} during the streak",
            affected_competencies.join(" and "),
            config.competency_floor
        ));
    }

    Some(RiskDetection {
        risk_type: RiskType::ChronicUnderperformance,
        risk_level,
        risk_score,
        succession_impact,
        risk_factors,
        evidence: RiskEvidence::ChronicUnderperformance {
            consecutive_underperformance_count: count,
            affected_competencies,
            cycle_ids: streak.iter().map(|cycle| cycle.cycle_id.clone()).collect(),
        },
        recommendation: None,
    })
}

/// Active certifications expiring between today and the horizon. Lapsed ones are ignored.
pub fn skills_decay(
    certifications: &[Certification],
    today: NaiveDate,
    config: &DetectionConfig,
) -> Option<RiskDetection> {
    let horizon = today + Duration::days(config.certification_horizon_days);
    let expiring: Vec<ExpiringCertification> = certifications
        .iter()
        .filter(|certification| {
            certification.expires_on >= today && certification.expires_on <= horizon
        })
        .map(|certification| ExpiringCertification {
            certification_id: certification.certification_id.clone(),
            name: certification.name.clone(),
            expires_on: certification.expires_on,
            mandatory: certification.mandatory,
            days_until_expiry: (certification.expires_on - today).num_days(),
        })
        .collect();

    if expiring.is_empty() {
        return None;
    }

    let mandatory = expiring.iter().filter(|cert| cert.mandatory).count() as u32;
    let optional = expiring.len() as u32 - mandatory;

    let (risk_score, risk_level) = if mandatory > 0 {
        let score = (config.mandatory_base_score
            + f64::from(mandatory) * config.mandatory_per_certification)
            .min(100.0);
        let level = if mandatory >= 2 {
            RiskLevel::High
        } else {
            RiskLevel::Medium
        };
        (score, level)
    } else {
        let score = (config.optional_base_score
            + expiring.len() as f64 * config.optional_per_certification)
            .min(config.optional_score_cap);
        (score, RiskLevel::Low)
    };

    let mut risk_factors = Vec::new();
    if mandatory > 0 {
        risk_factors.push(format!(
            "{mandatory} mandatory certification(s) expiring within {} days",
            config.certification_horizon_days
        ));
    }
    if optional > 0 {
        risk_factors.push(format!(
            "{optional} optional certification(s) expiring within {} days",
            config.certification_horizon_days
        ));
    }

    Some(RiskDetection {
        risk_type: RiskType::SkillsDecay,
        risk_level,
        risk_score,
        succession_impact: SuccessionImpact::None,
        risk_factors,
        evidence: RiskEvidence::SkillsDecay {
            mandatory_expiring: mandatory,
            optional_expiring: optional,
            expiring_certifications: expiring,
        },
        recommendation: None,
    })
}

/// Strong goal delivery paired with weak behavioral ratings in the latest cycle.
pub fn toxic_high_performer(
    ratings: &[CycleRating],
    config: &DetectionConfig,
) -> Option<RiskDetection> {
    let latest = ratings.first()?;
    let behavior = (latest.competency + latest.responsibility) / 2.0;
    let gap = latest.goal - behavior;

    if latest.goal < config.toxic_min_goal || behavior >= config.toxic_max_behavior {
        return None;
    }

    let risk_score = (config.toxic_base_score + gap * config.toxic_gap_multiplier).min(100.0);
    let risk_level = if gap >= config.toxic_high_gap {
        RiskLevel::High
    } else {
        RiskLevel::Medium
    };
    let promotion_block_reason = format!(
        "Promotion blocked: goal rating {:.1} is not matched by behavioral rating {:.1}",
        latest.goal, behavior
    );

    Some(RiskDetection {
        risk_type: RiskType::ToxicHighPerformer,
        risk_level,
        risk_score,
        succession_impact: SuccessionImpact::Flagged,
        risk_factors: vec![
            format!("goal rating {:.1} in cycle {}", latest.goal, latest.cycle_name),
            format!("behavioral rating {:.1} (gap {:.1})", behavior, gap),
        ],
        evidence: RiskEvidence::ToxicHighPerformer {
            goal_rating: latest.goal,
            behavior_rating: behavior,
            goal_vs_behavior_gap: gap,
            promotion_block_reason,
        },
        recommendation: None,
    })
}

/// Walk cycles oldest to newest tracking consecutive overall-rating drops. Trend rows are
/// returned whether or not the risk fires.
pub fn declining_trend(
    ratings: &[CycleRating],
    config: &DetectionConfig,
) -> (Option<RiskDetection>, Vec<TrendHistoryEntry>) {
    let mut history = Vec::with_capacity(ratings.len());
    let mut previous: Option<f64> = None;
    let mut running = 0u32;
    let mut declines = 0u32;

    for cycle in ratings.iter().rev() {
        let delta = previous.map(|prior| cycle.overall - prior);
        let trend = match delta {
            Some(change) if change > config.trend_delta_threshold => CycleTrend::Improving,
            Some(change) if change < -config.trend_delta_threshold => CycleTrend::Declining,
            _ => CycleTrend::Stable,
        };

        running = if trend == CycleTrend::Declining {
            running + 1
        } else {
            0
        };
        declines = declines.max(running);

        history.push(TrendHistoryEntry {
            cycle_id: cycle.cycle_id.clone(),
            cycle_name: cycle.cycle_name.clone(),
            overall: cycle.overall,
            delta,
            trend,
            consecutive_declines: running,
        });
        previous = Some(cycle.overall);
    }

    if declines < config.trend_min_declines {
        return (None, history);
    }

    // Oldest minus newest over the whole queried range, not just the streak.
    let total_drop = match (history.first(), history.last()) {
        (Some(first), Some(last)) => first.overall - last.overall,
        _ => 0.0,
    };
    let risk_score = (config.trend_base_score
        + f64::from(declines) * config.trend_per_decline
        + total_drop.abs() * config.trend_drop_multiplier)
        .min(100.0);
    let severe = declines >= config.trend_high_declines;

    let detection = RiskDetection {
        risk_type: RiskType::DecliningTrend,
        risk_level: if severe {
            RiskLevel::High
        } else {
            RiskLevel::Medium
        },
        risk_score,
        succession_impact: if severe {
            SuccessionImpact::Flagged
        } else {
            SuccessionImpact::None
        },
        risk_factors: vec![
            format!("{declines} consecutive cycles of declining overall rating"),
            if total_drop >= 0.0 {
                format!("overall rating dropped {:.1} across the reviewed cycles", total_drop)
            } else {
                format!(
                    "overall rating rose {:.1} across the reviewed cycles despite the recent declines",
                    total_drop.abs()
                )
            },
        ],
        evidence: RiskEvidence::DecliningTrend {
            consecutive_declines: declines,
            total_drop,
            trend_history: history.clone(),
        },
        recommendation: None,
    };

    (Some(detection), history)
}
