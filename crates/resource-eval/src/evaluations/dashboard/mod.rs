mod activity;
pub mod views;

pub use activity::{relative_time, RECENT_ACTIVITY_LIMIT};
pub use views::{
    ActivityType, CompletionStatus, DashboardSnapshot, OverallTally, PassFailAnalytics,
    RecentActivityEntry, TrackTally,
};

use super::aging::AgingAnalyzer;
use super::classifier::{classify, Lifecycle, TrackProgress};
use super::domain::{Evaluation, TrackStatus};
use chrono::{DateTime, Utc};

/// Aggregates the full record set into the dashboard snapshot.
pub struct DashboardAnalyticsBuilder;

impl DashboardAnalyticsBuilder {
    pub fn build(evaluations: &[Evaluation], now: DateTime<Utc>) -> DashboardSnapshot {
        let active: Vec<&Evaluation> = evaluations
            .iter()
            .filter(|evaluation| classify(evaluation) == Lifecycle::Active)
            .collect();

        let mut completion_status = CompletionStatus::default();
        let mut pass_fail = PassFailAnalytics::default();
        for evaluation in evaluations {
            match TrackProgress::of(evaluation) {
                TrackProgress::BothComplete => completion_status.both_complete += 1,
                TrackProgress::InternalOnly => completion_status.internal_only += 1,
                TrackProgress::ClientOnly => completion_status.client_only += 1,
                TrackProgress::NeitherComplete => completion_status.neither_complete += 1,
            }

            pass_fail.internal.record(evaluation.internal_status);
            pass_fail.client.record(evaluation.client_status);
            pass_fail
                .overall
                .record(evaluation.internal_status, evaluation.client_status);
        }

        DashboardSnapshot {
            total_evaluations: evaluations.len(),
            active_evaluations: active.len(),
            completed_evaluations: evaluations.len() - active.len(),
            aging_analytics: AgingAnalyzer::analyze(active.iter().copied(), now),
            completion_status,
            pass_fail_analytics: pass_fail,
            recent_activity: activity::recent_activity(evaluations, now),
            generated_at: now,
        }
    }
}

impl TrackTally {
    /// `pending` here means neither pass nor fail, so it includes in-progress.
    fn record(&mut self, status: TrackStatus) {
        match status {
            TrackStatus::Pass => self.pass += 1,
            TrackStatus::Fail => self.fail += 1,
            TrackStatus::Pending | TrackStatus::InProgress => self.pending += 1,
        }
    }
}

impl OverallTally {
    fn record(&mut self, internal: TrackStatus, client: TrackStatus) {
        match (internal, client) {
            (TrackStatus::Pass, TrackStatus::Pass) => self.both_pass += 1,
            (TrackStatus::Pass, TrackStatus::Fail) => self.internal_pass_client_fail += 1,
            (TrackStatus::Fail, TrackStatus::Pass) => self.internal_fail_client_pass += 1,
            (TrackStatus::Fail, TrackStatus::Fail) => self.both_fail += 1,
            _ => self.pending += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.both_pass
            + self.internal_pass_client_fail
            + self.internal_fail_client_pass
            + self.both_fail
            + self.pending
    }
}
