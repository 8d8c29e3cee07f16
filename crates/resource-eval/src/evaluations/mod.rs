//! Evaluation lifecycle and analytics engine.
//!
//! Records move through an internal and a client approval track. This module
//! classifies them, re-opens completed ones behind an immutable snapshot,
//! rebuilds per-associate timelines and aggregates dashboard analytics. All
//! state lives behind an injected [`EvaluationStore`].

pub mod aging;
pub mod classifier;
pub mod clock;
pub mod dashboard;
pub mod domain;
pub mod history;
pub mod listing;
pub mod reopen;
pub mod router;
pub mod service;
pub mod store;
pub mod tracks;

#[cfg(test)]
mod tests;

pub use aging::{AgingAnalytics, AgingAnalyzer, AgingBucket};
pub use classifier::{classify, classify_tracks, Lifecycle, TrackProgress};
pub use clock::{Clock, FixedClock, SystemClock};
pub use dashboard::{DashboardAnalyticsBuilder, DashboardSnapshot, RECENT_ACTIVITY_LIMIT};
pub use domain::{
    Evaluation, EvaluationId, EvaluationPatch, HistoricalEvaluationRecord, HistoryId,
    NewEvaluation, Track, TrackStatus,
};
pub use history::{HistoryAggregator, TimelineEntry, TimelineKind};
pub use listing::{EvaluationListing, ListQuery, ViewFilter};
pub use reopen::{ReopenCoordinator, ReopenError, ReopenedEvaluation};
pub use router::evaluation_router;
pub use service::{EvaluationService, EvaluationServiceError};
pub use store::{
    EvaluationStore, InMemoryEvaluationStore, JsonFileEvaluationStore, StoreError, WriteBatch,
};
pub use tracks::{TrackEditor, TrackError, TrackUpdate};
