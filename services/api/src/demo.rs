use crate::infra::{parse_date, reporting_instant};
use chrono::{DateTime, Duration, NaiveDate, Utc};
use clap::Args;
use resource_eval::config::AppConfig;
use resource_eval::error::AppError;
use resource_eval::evaluations::{
    AgingBucket, DashboardSnapshot, Evaluation, EvaluationId, EvaluationService,
    EvaluationServiceError, FixedClock, HistoricalEvaluationRecord, InMemoryEvaluationStore,
    JsonFileEvaluationStore, ListQuery, NewEvaluation, TimelineEntry, TimelineKind,
    TrackStatus, TrackUpdate, ViewFilter,
};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Args, Debug, Default)]
pub(crate) struct DashboardArgs {
    /// Evaluation document to read (defaults to APP_DATA_PATH)
    #[arg(long)]
    pub(crate) data_path: Option<PathBuf>,
    /// Reporting date (YYYY-MM-DD). Defaults to now.
    #[arg(long, value_parser = parse_date)]
    pub(crate) today: Option<NaiveDate>,
    /// Emit the raw analytics payload as JSON
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Reporting date (YYYY-MM-DD) the seeded records are aged against. Defaults to now.
    #[arg(long, value_parser = parse_date)]
    pub(crate) today: Option<NaiveDate>,
    /// Emit the closing dashboard as JSON instead of a text summary
    #[arg(long)]
    pub(crate) json: bool,
}

pub(crate) fn run_dashboard(args: DashboardArgs) -> Result<(), AppError> {
    let DashboardArgs {
        data_path,
        today,
        json,
    } = args;

    let data_path = match data_path {
        Some(path) => path,
        None => match AppConfig::load()?.storage.data_path {
            Some(path) => path,
            None => {
                println!("No evaluation document configured; pass --data-path or set APP_DATA_PATH");
                return Ok(());
            }
        },
    };

    let store = Arc::new(JsonFileEvaluationStore::open(&data_path)?);
    let clock = Arc::new(FixedClock(reporting_instant(today)));
    let service = EvaluationService::new(store, clock);
    let snapshot = service.dashboard_analytics()?;

    if json {
        print_json(&snapshot);
    } else {
        println!("Evaluation dashboard for {}", data_path.display());
        render_dashboard(&snapshot);
    }
    Ok(())
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs { today, json } = args;
    let now = reporting_instant(today);

    let store = Arc::new(InMemoryEvaluationStore::with_records(
        demo_roster(now),
        Vec::<HistoricalEvaluationRecord>::new(),
    ));
    let service = EvaluationService::new(store, Arc::new(FixedClock(now)));

    println!("Resource evaluation demo ({})", now.format("%Y-%m-%d"));

    let registered = service.register(NewEvaluation {
        associate_id: "A-1007".to_string(),
        associate_name: "Lena Fischer".to_string(),
        client_name: "Contoso".to_string(),
        remarks: Some("referred by delivery lead".to_string()),
        resume_reference: Some("resumes/a-1007.pdf".to_string()),
    })?;
    println!(
        "- Registered {} for {} ({})",
        registered.associate_name, registered.client_name, registered.id
    );

    let promoted = service.update_internal_track(
        &EvaluationId("eval-1002".to_string()),
        TrackUpdate {
            status: TrackStatus::Pass,
            feedback: Some("solid pairing session".to_string()),
        },
    )?;
    println!(
        "- Internal track for {} moved to {}",
        promoted.associate_name, promoted.internal_status
    );

    match service.update_client_track(
        &EvaluationId("eval-1005".to_string()),
        TrackUpdate {
            status: TrackStatus::Pass,
            feedback: None,
        },
    ) {
        Ok(_) => println!("- Client track for eval-1005 updated"),
        Err(EvaluationServiceError::Track(err)) => println!("- Client update refused: {err}"),
        Err(err) => return Err(err.into()),
    }

    let reopened = service.reopen_evaluation(
        &EvaluationId("eval-1001".to_string()),
        "Northwind opened a second requisition",
        "talent-lead",
    )?;
    println!(
        "- Reopened {} with {}; prior outcome {}/{} archived as {}",
        reopened.evaluation.id,
        reopened.evaluation.client_name,
        reopened.historical.internal_status,
        reopened.historical.client_status,
        reopened.historical.id
    );

    println!("\nActive evaluations");
    for listing in service.list_evaluations(&ListQuery::view(ViewFilter::Active))? {
        println!(
            "  - {:<16} {:<10} internal {:<11} client {:<11} {} days ({})",
            listing.evaluation.associate_name,
            listing.evaluation.client_name,
            listing.evaluation.internal_status,
            listing.evaluation.client_status,
            listing.age_days,
            listing.aging_bucket.map(AgingBucket::label).unwrap_or("-")
        );
    }

    println!("\nCompleted evaluations");
    for listing in service.list_evaluations(&ListQuery::view(ViewFilter::Completed))? {
        println!(
            "  - {:<16} {:<10} internal {:<11} client {}",
            listing.evaluation.associate_name,
            listing.evaluation.client_name,
            listing.evaluation.internal_status,
            listing.evaluation.client_status
        );
    }

    println!("\nTimeline for A-1001");
    render_timeline(&service.associate_history("A-1001")?);

    let snapshot = service.dashboard_analytics()?;
    if json {
        print_json(&snapshot);
    } else {
        println!();
        render_dashboard(&snapshot);
    }
    Ok(())
}

pub(crate) fn render_dashboard(snapshot: &DashboardSnapshot) {
    println!(
        "- {} evaluations | {} active | {} completed",
        snapshot.total_evaluations, snapshot.active_evaluations, snapshot.completed_evaluations
    );

    let aging = &snapshot.aging_analytics;
    println!("Aging of active evaluations:");
    for (bucket, count) in [
        (AgingBucket::Under7Days, aging.under7_days),
        (AgingBucket::Between7And14Days, aging.between7_and14_days),
        (AgingBucket::Between15And30Days, aging.between15_and30_days),
        (AgingBucket::Over30Days, aging.over30_days),
    ] {
        println!("  - {:<10} {}", bucket.label(), count);
    }

    let completion = &snapshot.completion_status;
    println!(
        "Completion: {} both | {} internal only | {} client only | {} neither",
        completion.both_complete,
        completion.internal_only,
        completion.client_only,
        completion.neither_complete
    );

    let pass_fail = &snapshot.pass_fail_analytics;
    println!(
        "Internal track: {} pass | {} fail | {} pending",
        pass_fail.internal.pass, pass_fail.internal.fail, pass_fail.internal.pending
    );
    println!(
        "Client track:   {} pass | {} fail | {} pending",
        pass_fail.client.pass, pass_fail.client.fail, pass_fail.client.pending
    );
    let overall = &pass_fail.overall;
    println!(
        "Outcomes: {} both pass | {} internal pass, client fail | {} internal fail, client pass | {} both fail | {} pending",
        overall.both_pass,
        overall.internal_pass_client_fail,
        overall.internal_fail_client_pass,
        overall.both_fail,
        overall.pending
    );

    if snapshot.recent_activity.is_empty() {
        println!("Recent activity: none");
        return;
    }
    println!("Recent activity:");
    for entry in &snapshot.recent_activity {
        println!(
            "  - {} @ {}: {} ({})",
            entry.associate_name, entry.client_name, entry.activity_label, entry.relative_time
        );
    }
}

fn render_timeline(timeline: &[TimelineEntry]) {
    if timeline.is_empty() {
        println!("  (no evaluations)");
        return;
    }
    for entry in timeline {
        let kind = match entry.kind {
            TimelineKind::Current => "current",
            TimelineKind::Historical => "archived",
        };
        println!(
            "  - [{kind}] {} {} internal {} / client {}",
            entry.evaluation_date.format("%Y-%m-%d"),
            entry.client_name,
            entry.internal_status,
            entry.client_status
        );
        if let Some(reason) = &entry.reopen_reason {
            println!("      reopened: {reason}");
        }
    }
}

fn print_json(snapshot: &DashboardSnapshot) {
    match serde_json::to_string_pretty(snapshot) {
        Ok(json) => println!("{json}"),
        Err(err) => println!("Dashboard payload unavailable: {err}"),
    }
}

struct Seed {
    id: &'static str,
    associate_id: &'static str,
    associate_name: &'static str,
    client_name: &'static str,
    internal: TrackStatus,
    client: TrackStatus,
    age_days: i64,
}

const DEMO_SEEDS: [Seed; 6] = [
    Seed {
        id: "eval-1001",
        associate_id: "A-1001",
        associate_name: "Priya Raman",
        client_name: "Northwind",
        internal: TrackStatus::Pass,
        client: TrackStatus::Pass,
        age_days: 40,
    },
    Seed {
        id: "eval-1002",
        associate_id: "A-1002",
        associate_name: "Marcus Lee",
        client_name: "Globex",
        internal: TrackStatus::InProgress,
        client: TrackStatus::Pending,
        age_days: 3,
    },
    Seed {
        id: "eval-1003",
        associate_id: "A-1003",
        associate_name: "Sofia Alvarez",
        client_name: "Initech",
        internal: TrackStatus::Pass,
        client: TrackStatus::InProgress,
        age_days: 12,
    },
    Seed {
        id: "eval-1004",
        associate_id: "A-1004",
        associate_name: "Kenji Watanabe",
        client_name: "Umbrella",
        internal: TrackStatus::Fail,
        client: TrackStatus::Pending,
        age_days: 25,
    },
    Seed {
        id: "eval-1005",
        associate_id: "A-1005",
        associate_name: "Amara Okafor",
        client_name: "Hooli",
        internal: TrackStatus::Pending,
        client: TrackStatus::Pending,
        age_days: 21,
    },
    Seed {
        id: "eval-1006",
        associate_id: "A-1001",
        associate_name: "Priya Raman",
        client_name: "Globex",
        internal: TrackStatus::Pending,
        client: TrackStatus::Pending,
        age_days: 35,
    },
];

fn demo_roster(now: DateTime<Utc>) -> Vec<Evaluation> {
    DEMO_SEEDS.iter().map(|seed| seeded(seed, now)).collect()
}

fn seeded(seed: &Seed, now: DateTime<Utc>) -> Evaluation {
    let created = now - Duration::days(seed.age_days);
    let mut evaluation = Evaluation::register(
        EvaluationId(seed.id.to_string()),
        NewEvaluation {
            associate_id: seed.associate_id.to_string(),
            associate_name: seed.associate_name.to_string(),
            client_name: seed.client_name.to_string(),
            remarks: None,
            resume_reference: Some(format!("resumes/{}.pdf", seed.associate_id.to_lowercase())),
        },
        created,
    );

    evaluation.internal_status = seed.internal;
    evaluation.client_status = seed.client;
    if seed.internal != TrackStatus::Pending {
        let at = (created + Duration::days(1)).min(now);
        evaluation.internal_evaluation_date = Some(at);
        evaluation.updated_date = at;
    }
    if seed.client != TrackStatus::Pending {
        let at = (created + Duration::days(2)).min(now);
        evaluation.client_evaluation_date = Some(at);
        evaluation.updated_date = at;
    }
    evaluation
}
