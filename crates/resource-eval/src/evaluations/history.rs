use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::domain::{Evaluation, EvaluationId, HistoricalEvaluationRecord, HistoryId, TrackStatus};
use super::store::{EvaluationStore, StoreError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TimelineKind {
    Current,
    Historical,
}

/// One evaluation cycle in an associate's timeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineEntry {
    pub kind: TimelineKind,
    pub evaluation_id: EvaluationId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub history_id: Option<HistoryId>,
    pub associate_name: String,
    pub client_name: String,
    pub internal_status: TrackStatus,
    pub client_status: TrackStatus,
    pub internal_feedback: Option<String>,
    pub client_feedback: Option<String>,
    pub evaluation_date: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reopened_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reopened_by: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reopen_reason: Option<String>,
}

impl TimelineEntry {
    pub fn current(evaluation: &Evaluation) -> Self {
        Self {
            kind: TimelineKind::Current,
            evaluation_id: evaluation.id.clone(),
            history_id: None,
            associate_name: evaluation.associate_name.clone(),
            client_name: evaluation.client_name.clone(),
            internal_status: evaluation.internal_status,
            client_status: evaluation.client_status,
            internal_feedback: evaluation.internal_feedback.clone(),
            client_feedback: evaluation.client_feedback.clone(),
            evaluation_date: evaluation.updated_date,
            reopened_at: None,
            reopened_by: None,
            reopen_reason: None,
        }
    }

    pub fn historical(record: &HistoricalEvaluationRecord) -> Self {
        Self {
            kind: TimelineKind::Historical,
            evaluation_id: record.original_evaluation_id.clone(),
            history_id: Some(record.id.clone()),
            associate_name: record.associate_name.clone(),
            client_name: record.client_name.clone(),
            internal_status: record.internal_status,
            client_status: record.client_status,
            internal_feedback: record.internal_feedback.clone(),
            client_feedback: record.client_feedback.clone(),
            evaluation_date: record.evaluation_date(),
            reopened_at: Some(record.reopened_at),
            reopened_by: Some(record.reopened_by.clone()),
            reopen_reason: Some(record.reopen_reason.clone()),
        }
    }
}

/// Merges an associate's live evaluations with every snapshot taken of them.
pub struct HistoryAggregator<S> {
    store: Arc<S>,
}

impl<S> HistoryAggregator<S>
where
    S: EvaluationStore,
{
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Newest first. An associate without evaluations yields an empty list.
    pub fn timeline(&self, associate_id: &str) -> Result<Vec<TimelineEntry>, StoreError> {
        let evaluations: Vec<Evaluation> = self
            .store
            .get_all()?
            .into_iter()
            .filter(|evaluation| evaluation.associate_id == associate_id)
            .collect();

        let mut entries: Vec<TimelineEntry> =
            evaluations.iter().map(TimelineEntry::current).collect();
        for evaluation in &evaluations {
            entries.extend(
                self.store
                    .get_historical(&evaluation.id)?
                    .iter()
                    .map(TimelineEntry::historical),
            );
        }

        entries.sort_by(|a, b| b.evaluation_date.cmp(&a.evaluation_date));
        Ok(entries)
    }
}
