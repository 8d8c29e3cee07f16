use super::super::domain::Evaluation;
use super::views::{ActivityType, RecentActivityEntry};
use chrono::{DateTime, Utc};

/// Size of the recent-activity feed.
pub const RECENT_ACTIVITY_LIMIT: usize = 10;

pub(crate) fn recent_activity(
    evaluations: &[Evaluation],
    now: DateTime<Utc>,
) -> Vec<RecentActivityEntry> {
    let mut ordered: Vec<&Evaluation> = evaluations.iter().collect();
    ordered.sort_by(|a, b| {
        b.updated_date
            .cmp(&a.updated_date)
            .then_with(|| a.id.cmp(&b.id))
    });

    ordered
        .into_iter()
        .take(RECENT_ACTIVITY_LIMIT)
        .map(|evaluation| {
            let activity_type = latest_activity(evaluation);
            let timestamp = evaluation.updated_date;
            RecentActivityEntry {
                evaluation_id: evaluation.id.clone(),
                associate_name: evaluation.associate_name.clone(),
                client_name: evaluation.client_name.clone(),
                activity_type,
                activity_label: activity_type.label(),
                internal_status: evaluation.internal_status,
                client_status: evaluation.client_status,
                timestamp,
                relative_time: relative_time(timestamp, now),
            }
        })
        .collect()
}

/// Whichever of the three timestamps is newest. Ties favour the client track,
/// then the internal track, over creation. The feed itself is ranked and
/// stamped by `updated_date`.
pub(crate) fn latest_activity(evaluation: &Evaluation) -> ActivityType {
    let mut latest = (ActivityType::Created, evaluation.created_date);
    if let Some(internal) = evaluation.internal_evaluation_date {
        if internal >= latest.1 {
            latest = (ActivityType::InternalUpdated, internal);
        }
    }
    if let Some(client) = evaluation.client_evaluation_date {
        if client >= latest.1 {
            latest = (ActivityType::ClientUpdated, client);
        }
    }
    latest.0
}

pub fn relative_time(timestamp: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let elapsed = now - timestamp;
    let minutes = elapsed.num_minutes();
    if minutes < 1 {
        return "just now".to_string();
    }
    if minutes < 60 {
        return ago(minutes, "minute");
    }
    let hours = elapsed.num_hours();
    if hours < 24 {
        return ago(hours, "hour");
    }
    let days = elapsed.num_days();
    if days < 30 {
        return ago(days, "day");
    }
    if days < 365 {
        return ago(days / 30, "month");
    }
    ago(days / 365, "year")
}

fn ago(count: i64, unit: &str) -> String {
    if count == 1 {
        format!("1 {unit} ago")
    } else {
        format!("{count} {unit}s ago")
    }
}
