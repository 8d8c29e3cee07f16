use super::common::*;
use std::sync::Arc;

use crate::evaluations::domain::{EvaluationId, TrackStatus};
use crate::evaluations::history::{HistoryAggregator, TimelineKind};
use crate::evaluations::reopen::ReopenCoordinator;
use crate::evaluations::FixedClock;
use chrono::Duration;

#[test]
fn unknown_associate_has_an_empty_timeline() {
    let store = seeded_store(vec![evaluation(
        "eval-1",
        "A-1",
        "Northwind",
        TrackStatus::Pending,
        TrackStatus::Pending,
        1,
    )]);
    let aggregator = HistoryAggregator::new(store);

    let timeline = aggregator.timeline("A-404").expect("timeline builds");
    assert!(timeline.is_empty());
}

#[test]
fn timeline_merges_current_and_historical_newest_first() {
    let store = seeded_store(vec![
        evaluation(
            "eval-a",
            "A-1",
            "Northwind",
            TrackStatus::Pass,
            TrackStatus::Fail,
            50,
        ),
        evaluation(
            "eval-b",
            "A-1",
            "Globex",
            TrackStatus::Fail,
            TrackStatus::Pending,
            30,
        ),
        evaluation(
            "eval-c",
            "A-2",
            "Initech",
            TrackStatus::Pass,
            TrackStatus::Pass,
            10,
        ),
    ]);

    let first = ReopenCoordinator::new(
        store.clone(),
        Arc::new(FixedClock(now() - Duration::days(5))),
    );
    first
        .reopen(&EvaluationId("eval-a".to_string()), "new role", "lead")
        .expect("reopen eval-a");
    let second = ReopenCoordinator::new(store.clone(), clock());
    second
        .reopen(&EvaluationId("eval-b".to_string()), "retest", "lead")
        .expect("reopen eval-b");
    second
        .reopen(&EvaluationId("eval-c".to_string()), "other associate", "lead")
        .expect("reopen eval-c");

    let aggregator = HistoryAggregator::new(store);
    let timeline = aggregator.timeline("A-1").expect("timeline builds");

    // two live records plus one snapshot for each
    assert_eq!(timeline.len(), 4);
    let kinds: Vec<TimelineKind> = timeline.iter().map(|entry| entry.kind).collect();
    assert_eq!(
        kinds,
        vec![
            TimelineKind::Current,
            TimelineKind::Current,
            TimelineKind::Historical,
            TimelineKind::Historical,
        ]
    );
    assert!(timeline
        .windows(2)
        .all(|pair| pair[0].evaluation_date >= pair[1].evaluation_date));

    let globex_snapshot = &timeline[2];
    assert_eq!(globex_snapshot.client_name, "Globex");
    assert_eq!(globex_snapshot.internal_status, TrackStatus::Fail);
    assert_eq!(globex_snapshot.reopen_reason.as_deref(), Some("retest"));
    assert!(globex_snapshot.history_id.is_some());

    let northwind_snapshot = &timeline[3];
    assert_eq!(northwind_snapshot.client_name, "Northwind");
    assert_eq!(northwind_snapshot.client_status, TrackStatus::Fail);
    assert!(timeline.iter().all(|entry| entry.client_name != "Initech"));
}

#[test]
fn timeline_length_counts_every_snapshot() {
    let (service, _) = build_service(vec![evaluation(
        "eval-x",
        "A-9",
        "Wayne",
        TrackStatus::Pass,
        TrackStatus::Pass,
        15,
    )]);
    let id = EvaluationId("eval-x".to_string());
    service
        .reopen_evaluation(&id, "new client brief", "lead")
        .expect("reopen");

    let timeline = service.associate_history("A-9").expect("history");
    assert_eq!(timeline.len(), 2);
    assert_eq!(timeline[0].kind, TimelineKind::Current);
    assert_eq!(timeline[0].internal_status, TrackStatus::Pending);
    assert_eq!(timeline[1].kind, TimelineKind::Historical);
}
