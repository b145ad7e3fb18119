use super::common::*;

use chrono::Duration;

use crate::workflows::cycle_risk::{
    detect_all, reconcile, DetectionConfig, RiskDetection, RiskRepository, RiskType,
    AUTO_RESOLUTION_NOTE,
};
use crate::workflows::memory::InMemoryRiskRepository;

fn chronic_detections() -> Vec<RiskDetection> {
    detect_all(&chronic_pattern(), &[], today(), &DetectionConfig::default()).detections
}

#[test]
fn unchanged_pattern_updates_the_single_active_record() {
    let repository = InMemoryRiskRepository::default();
    let first_run = now();
    let second_run = now() + Duration::days(7);

    let first = reconcile(&repository, &company(), &employee("emp-1"), chronic_detections(), first_run)
        .expect("first pass");
    assert_eq!(first.created, vec![RiskType::ChronicUnderperformance]);
    assert!(first.updated.is_empty());

    let second = reconcile(&repository, &company(), &employee("emp-1"), chronic_detections(), second_run)
        .expect("second pass");
    assert!(second.created.is_empty());
    assert_eq!(second.updated, vec![RiskType::ChronicUnderperformance]);

    let active = repository
        .active_for_employee(&employee("emp-1"))
        .expect("active risks");
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].id, first.active[0].id);
    assert_eq!(active[0].first_detected_at, first_run);
    assert_eq!(active[0].last_analyzed_at, second_run);
}

#[test]
fn vanished_pattern_is_resolved_without_duplicates() {
    let repository = InMemoryRiskRepository::default();
    for day in 0..2 {
        reconcile(
            &repository,
            &company(),
            &employee("emp-1"),
            chronic_detections(),
            now() + Duration::days(day),
        )
        .expect("pass succeeds");
    }

    let resolved_at = now() + Duration::days(2);
    let third = reconcile(&repository, &company(), &employee("emp-1"), Vec::new(), resolved_at)
        .expect("third pass");
    assert_eq!(third.resolved, vec![RiskType::ChronicUnderperformance]);
    assert!(third.active.is_empty());

    let all = repository.all();
    assert_eq!(all.len(), 1);
    assert!(!all[0].is_active);
    assert_eq!(all[0].resolved_at, Some(resolved_at));
    assert_eq!(all[0].resolution_notes.as_deref(), Some(AUTO_RESOLUTION_NOTE));

    let fourth = reconcile(&repository, &company(), &employee("emp-1"), Vec::new(), resolved_at)
        .expect("fourth pass");
    assert!(fourth.resolved.is_empty());
}

#[test]
fn recurring_pattern_opens_a_new_record() {
    let repository = InMemoryRiskRepository::default();
    reconcile(&repository, &company(), &employee("emp-1"), chronic_detections(), now())
        .expect("detected");
    reconcile(&repository, &company(), &employee("emp-1"), Vec::new(), now() + Duration::days(1))
        .expect("resolved");
    let outcome = reconcile(
        &repository,
        &company(),
        &employee("emp-1"),
        chronic_detections(),
        now() + Duration::days(2),
    )
    .expect("detected again");

    assert_eq!(outcome.created, vec![RiskType::ChronicUnderperformance]);
    assert_eq!(repository.all().len(), 2);
    assert_eq!(
        repository
            .active_for_employee(&employee("emp-1"))
            .expect("active risks")
            .len(),
        1
    );
}

#[test]
fn reconciliation_is_scoped_to_the_employee() {
    let repository = InMemoryRiskRepository::default();
    reconcile(&repository, &company(), &employee("emp-1"), chronic_detections(), now())
        .expect("emp-1 detected");
    reconcile(&repository, &company(), &employee("emp-2"), Vec::new(), now())
        .expect("emp-2 clean");

    let active = repository.active_for_company(&company()).expect("active risks");
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].employee_id, employee("emp-1"));
}

#[test]
fn concurrent_passes_keep_one_active_record() {
    let repository = std::sync::Arc::new(InMemoryRiskRepository::default());
    let handles: Vec<_> = (0..8)
        .map(|offset| {
            let repository = repository.clone();
            std::thread::spawn(move || {
                reconcile(
                    repository.as_ref(),
                    &company(),
                    &employee("emp-1"),
                    chronic_detections(),
                    now() + Duration::minutes(offset),
                )
                .expect("pass succeeds");
            })
        })
        .collect();
    for handle in handles {
        handle.join().expect("thread completes");
    }

    assert_eq!(repository.all().len(), 1);
}
