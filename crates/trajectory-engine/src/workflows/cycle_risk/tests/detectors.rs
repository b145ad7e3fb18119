use super::common::*;

use crate::workflows::cycle_risk::{
    chronic_underperformance, declining_trend, detect_all, skills_decay, toxic_high_performer,
    CycleTrend, DetectionConfig, RiskEvidence, RiskType, SuccessionImpact,
};
use crate::workflows::trajectory::RiskLevel;

fn config() -> DetectionConfig {
    DetectionConfig::default()
}

#[test]
fn chronic_counts_active_streak_only() {
    let detection = chronic_underperformance(&overall_history(&[2.5, 2.0, 4.0, 4.5]), &config())
        .expect("streak of two fires");

    assert_eq!(detection.risk_type, RiskType::ChronicUnderperformance);
    assert_eq!(detection.risk_score, 70.0);
    assert_eq!(detection.risk_level, RiskLevel::High);
    assert_eq!(detection.succession_impact, SuccessionImpact::Flagged);
    match detection.evidence {
        RiskEvidence::ChronicUnderperformance {
            consecutive_underperformance_count,
            cycle_ids,
            ..
        } => {
            assert_eq!(consecutive_underperformance_count, 2);
            assert_eq!(cycle_ids, vec!["cycle-1".to_string(), "cycle-2".to_string()]);
        }
        other => panic!("unexpected evidence: {other:?}"),
    }
}

#[test]
fn chronic_streak_stops_at_passing_latest_cycle() {
    assert!(chronic_underperformance(&overall_history(&[4.0, 2.0]), &config()).is_none());
    assert!(chronic_underperformance(&overall_history(&[2.0]), &config()).is_none());
    assert!(chronic_underperformance(&[], &config()).is_none());
}

#[test]
fn chronic_goal_shortfall_counts_and_long_streak_is_critical() {
    let ratings = vec![
        cycle(1, 3.5, 2.0, 2.0, 3.0),
        cycle(2, 2.5, 3.0, 3.0, 2.0),
        cycle(3, 2.0, 2.0, 3.0, 3.0),
        cycle(4, 1.5, 1.5, 3.0, 3.0),
    ];

    let detection = chronic_underperformance(&ratings, &config()).expect("fires");
    assert_eq!(detection.risk_score, 100.0);
    assert_eq!(detection.risk_level, RiskLevel::Critical);
    assert_eq!(detection.succession_impact, SuccessionImpact::Excluded);
    match detection.evidence {
        RiskEvidence::ChronicUnderperformance {
            affected_competencies,
            ..
        } => assert_eq!(
            affected_competencies,
            vec!["competency".to_string(), "responsibility".to_string()]
        ),
        other => panic!("unexpected evidence: {other:?}"),
    }
}

#[test]
fn two_mandatory_certifications_expiring_is_high() {
    let certifications = vec![
        certification("cpr", 30, true),
        certification("forklift", 30, true),
        certification("excel", 200, false),
    ];

    let detection = skills_decay(&certifications, today(), &config()).expect("fires");
    assert_eq!(detection.risk_level, RiskLevel::High);
    assert_eq!(detection.risk_score, 70.0);
    match detection.evidence {
        RiskEvidence::SkillsDecay {
            mandatory_expiring,
            optional_expiring,
            expiring_certifications,
        } => {
            assert_eq!(mandatory_expiring, 2);
            assert_eq!(optional_expiring, 0);
            assert!(expiring_certifications
                .iter()
                .all(|cert| cert.days_until_expiry == 30));
        }
        other => panic!("unexpected evidence: {other:?}"),
    }
}

#[test]
fn single_mandatory_certification_is_medium() {
    let certifications = vec![certification("cpr", 90, true), certification("excel", 10, false)];

    let detection = skills_decay(&certifications, today(), &config()).expect("fires");
    assert_eq!(detection.risk_level, RiskLevel::Medium);
    assert_eq!(detection.risk_score, 50.0);
}

#[test]
fn optional_only_expiry_is_low_and_capped() {
    let few = vec![certification("excel", 10, false)];
    let detection = skills_decay(&few, today(), &config()).expect("fires");
    assert_eq!(detection.risk_level, RiskLevel::Low);
    assert_eq!(detection.risk_score, 25.0);

    let many: Vec<_> = (0..8)
        .map(|index| certification(&format!("opt-{index}"), 5, false))
        .collect();
    let detection = skills_decay(&many, today(), &config()).expect("fires");
    assert_eq!(detection.risk_score, 60.0);
}

#[test]
fn certifications_outside_the_horizon_are_ignored() {
    assert!(skills_decay(&[certification("cpr", 91, true)], today(), &config()).is_none());
    assert!(skills_decay(&[], today(), &config()).is_none());
    assert!(skills_decay(&[certification("cpr", -3, true)], today(), &config()).is_none());
    assert!(skills_decay(&[certification("cpr", -365, true)], today(), &config()).is_none());

    let detection = skills_decay(
        &[
            certification("cpr", -365, true),
            certification("first-aid", 0, true),
        ],
        today(),
        &config(),
    )
    .expect("certification expiring today counts");
    match detection.evidence {
        RiskEvidence::SkillsDecay {
            mandatory_expiring,
            expiring_certifications,
            ..
        } => {
            assert_eq!(mandatory_expiring, 1);
            assert_eq!(expiring_certifications.len(), 1);
            assert_eq!(expiring_certifications[0].certification_id, "first-aid");
            assert_eq!(expiring_certifications[0].days_until_expiry, 0);
        }
        other => panic!("unexpected evidence: {other:?}"),
    }
}

#[test]
fn toxic_high_performer_uses_latest_cycle() {
    let ratings = vec![cycle(1, 4.0, 4.5, 2.0, 2.0), cycle(2, 4.0, 3.0, 4.0, 4.0)];

    let detection = toxic_high_performer(&ratings, &config()).expect("fires");
    assert_eq!(detection.risk_level, RiskLevel::High);
    assert_eq!(detection.risk_score, 75.0);
    assert_eq!(detection.succession_impact, SuccessionImpact::Flagged);
    match detection.evidence {
        RiskEvidence::ToxicHighPerformer {
            behavior_rating,
            goal_vs_behavior_gap,
            promotion_block_reason,
            ..
        } => {
            assert_eq!(behavior_rating, 2.0);
            assert_eq!(goal_vs_behavior_gap, 2.5);
            assert!(promotion_block_reason.starts_with("Promotion blocked"));
        }
        other => panic!("unexpected evidence: {other:?}"),
    }
}

#[test]
fn toxic_high_performer_small_gap_is_medium() {
    let ratings = vec![cycle(1, 4.0, 4.0, 2.4, 2.4)];
    let detection = toxic_high_performer(&ratings, &config()).expect("fires");
    assert_eq!(detection.risk_level, RiskLevel::Medium);
}

#[test]
fn toxic_high_performer_requires_both_conditions() {
    assert!(toxic_high_performer(&[cycle(1, 4.0, 3.9, 1.0, 1.0)], &config()).is_none());
    assert!(toxic_high_performer(&[cycle(1, 4.0, 5.0, 2.5, 2.5)], &config()).is_none());
    assert!(toxic_high_performer(&[], &config()).is_none());
}

#[test]
fn two_declines_fire_at_medium() {
    // Oldest to newest: 4.0, 3.5, 3.0.
    let (detection, history) = declining_trend(&overall_history(&[3.0, 3.5, 4.0]), &config());

    let detection = detection.expect("fires");
    assert_eq!(detection.risk_level, RiskLevel::Medium);
    assert_eq!(detection.risk_score, 70.0);
    assert_eq!(detection.succession_impact, SuccessionImpact::None);

    assert_eq!(history.len(), 3);
    assert_eq!(history[0].overall, 4.0);
    assert_eq!(history[0].delta, None);
    assert_eq!(history[0].trend, CycleTrend::Stable);
    assert_eq!(history[2].trend, CycleTrend::Declining);
    assert_eq!(history[2].consecutive_declines, 2);
}

#[test]
fn three_declines_fire_at_high_and_flag_succession() {
    let (detection, _) = declining_trend(&overall_history(&[2.5, 3.0, 3.5, 4.0]), &config());

    let detection = detection.expect("fires");
    assert_eq!(detection.risk_level, RiskLevel::High);
    assert_eq!(detection.succession_impact, SuccessionImpact::Flagged);
    assert_eq!(detection.risk_score, 90.0);
}

#[test]
fn total_drop_spans_the_whole_range() {
    // Oldest to newest: 3.0, 4.5, 4.0, 3.5. Only the last two transitions decline.
    let (detection, _) = declining_trend(&overall_history(&[3.5, 4.0, 4.5, 3.0]), &config());

    match detection.expect("fires").evidence {
        RiskEvidence::DecliningTrend {
            consecutive_declines,
            total_drop,
            ..
        } => {
            assert_eq!(consecutive_declines, 2);
            assert_eq!(total_drop, -0.5);
        }
        other => panic!("unexpected evidence: {other:?}"),
    }
}

#[test]
fn net_rise_is_described_without_a_negative_drop() {
    // Oldest to newest: 2.0, 4.5, 4.0, 3.5.
    let (detection, _) = declining_trend(&overall_history(&[3.5, 4.0, 4.5, 2.0]), &config());

    let detection = detection.expect("fires");
    assert!(detection
        .risk_factors
        .iter()
        .any(|factor| factor.contains("rose 1.5")));
    assert!(detection
        .risk_factors
        .iter()
        .all(|factor| !factor.contains("dropped -")));
}

#[test]
fn interrupted_declines_emit_history_without_risk() {
    // Oldest to newest: 4.0, 3.5, 3.8, 3.4.
    let (detection, history) =
        declining_trend(&overall_history(&[3.4, 3.8, 3.5, 4.0]), &config());

    assert!(detection.is_none());
    assert_eq!(history.len(), 4);
    assert_eq!(history[2].trend, CycleTrend::Improving);
    assert_eq!(history[2].consecutive_declines, 0);
}

#[test]
fn small_changes_are_stable() {
    let (detection, history) = declining_trend(&overall_history(&[3.7, 3.85, 4.0]), &config());
    assert!(detection.is_none());
    assert!(history.iter().all(|row| row.trend == CycleTrend::Stable));
}

#[test]
fn detect_all_only_reads_the_cycle_limit() {
    // Cycles six and seven would extend the chronic streak past the limit.
    let ratings = overall_history(&[2.0, 2.0, 2.0, 2.0, 2.0, 2.0, 2.0]);
    let config = DetectionConfig {
        cycle_limit: 2,
        ..DetectionConfig::default()
    };

    let report = detect_all(&ratings, &[], today(), &config);
    let chronic = report
        .detections
        .iter()
        .find(|detection| detection.risk_type == RiskType::ChronicUnderperformance)
        .expect("chronic fires");
    assert_eq!(chronic.risk_score, 70.0);
    assert_eq!(report.trend_history.len(), 2);
}

#[test]
fn detect_all_combines_detectors() {
    let ratings = vec![
        cycle(1, 3.0, 4.5, 2.0, 2.0),
        cycle(2, 3.6, 3.6, 3.6, 3.6),
        cycle(3, 4.2, 4.2, 4.2, 4.2),
    ];
    let certifications = vec![certification("cpr", 20, true)];

    let report = detect_all(&ratings, &certifications, today(), &config());
    let types: Vec<RiskType> = report
        .detections
        .iter()
        .map(|detection| detection.risk_type)
        .collect();
    assert_eq!(
        types,
        vec![
            RiskType::SkillsDecay,
            RiskType::ToxicHighPerformer,
            RiskType::DecliningTrend
        ]
    );
    assert!(report
        .detections
        .iter()
        .all(|detection| detection.recommendation.is_none()));
}
