use super::super::aging::AgingAnalytics;
use super::super::domain::{EvaluationId, TrackStatus};
use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionStatus {
    pub both_complete: usize,
    pub internal_only: usize,
    pub client_only: usize,
    pub neither_complete: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TrackTally {
    pub pass: usize,
    pub fail: usize,
    pub pending: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OverallTally {
    pub both_pass: usize,
    pub internal_pass_client_fail: usize,
    pub internal_fail_client_pass: usize,
    pub both_fail: usize,
    pub pending: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PassFailAnalytics {
    pub internal: TrackTally,
    pub client: TrackTally,
    pub overall: OverallTally,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityType {
    Created,
    InternalUpdated,
    ClientUpdated,
}

impl ActivityType {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Created => "Evaluation created",
            Self::InternalUpdated => "Internal evaluation updated",
            Self::ClientUpdated => "Client evaluation updated",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentActivityEntry {
    pub evaluation_id: EvaluationId,
    pub associate_name: String,
    pub client_name: String,
    pub activity_type: ActivityType,
    pub activity_label: &'static str,
    pub internal_status: TrackStatus,
    pub client_status: TrackStatus,
    pub timestamp: DateTime<Utc>,
    pub relative_time: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSnapshot {
    pub total_evaluations: usize,
    pub active_evaluations: usize,
    pub completed_evaluations: usize,
    pub aging_analytics: AgingAnalytics,
    pub completion_status: CompletionStatus,
    pub pass_fail_analytics: PassFailAnalytics,
    pub recent_activity: Vec<RecentActivityEntry>,
    pub generated_at: DateTime<Utc>,
}
