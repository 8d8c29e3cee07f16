use std::sync::Arc;

use tracing::{debug, info};

use super::clock::Clock;
use super::dashboard::{DashboardAnalyticsBuilder, DashboardSnapshot};
use super::domain::{Evaluation, EvaluationId, NewEvaluation, Track};
use super::history::{HistoryAggregator, TimelineEntry};
use super::listing::{list, EvaluationListing, ListQuery};
use super::reopen::{ReopenCoordinator, ReopenError, ReopenedEvaluation};
use super::store::{EvaluationStore, StoreError};
use super::tracks::{TrackEditor, TrackError, TrackUpdate};

/// Service composing the store, lifecycle components and analytics.
pub struct EvaluationService<S, C> {
    store: Arc<S>,
    clock: Arc<C>,
    reopener: ReopenCoordinator<S, C>,
    history: HistoryAggregator<S>,
    tracks: TrackEditor<S, C>,
}

impl<S, C> EvaluationService<S, C>
where
    S: EvaluationStore + 'static,
    C: Clock + 'static,
{
    pub fn new(store: Arc<S>, clock: Arc<C>) -> Self {
        Self {
            reopener: ReopenCoordinator::new(store.clone(), clock.clone()),
            history: HistoryAggregator::new(store.clone()),
            tracks: TrackEditor::new(store.clone(), clock.clone()),
            store,
            clock,
        }
    }

    /// Create a new evaluation in the `{pending, pending}` state.
    pub fn register(&self, new: NewEvaluation) -> Result<Evaluation, EvaluationServiceError> {
        if new.associate_id.trim().is_empty() {
            return Err(EvaluationServiceError::InvalidInput(
                "associateId is required".to_string(),
            ));
        }
        if new.client_name.trim().is_empty() {
            return Err(EvaluationServiceError::InvalidInput(
                "clientName is required".to_string(),
            ));
        }

        let evaluation = Evaluation::register(EvaluationId::generate(), new, self.clock.now());
        let stored = self.store.insert(evaluation)?;
        info!(
            evaluation_id = %stored.id,
            associate_id = %stored.associate_id,
            client = %stored.client_name,
            "evaluation registered"
        );
        Ok(stored)
    }

    pub fn get(&self, id: &EvaluationId) -> Result<Evaluation, EvaluationServiceError> {
        Ok(self.store.get_by_id(id)?)
    }

    pub fn list_evaluations(
        &self,
        query: &ListQuery,
    ) -> Result<Vec<EvaluationListing>, EvaluationServiceError> {
        let evaluations = self.store.get_all()?;
        Ok(list(&evaluations, query, self.clock.now()))
    }

    pub fn update_internal_track(
        &self,
        id: &EvaluationId,
        update: TrackUpdate,
    ) -> Result<Evaluation, EvaluationServiceError> {
        Ok(self.tracks.update(id, Track::Internal, update)?)
    }

    /// Rejected with `ClientTrackLocked` until the internal track has passed.
    pub fn update_client_track(
        &self,
        id: &EvaluationId,
        update: TrackUpdate,
    ) -> Result<Evaluation, EvaluationServiceError> {
        Ok(self.tracks.update(id, Track::Client, update)?)
    }

    pub fn reopen_evaluation(
        &self,
        id: &EvaluationId,
        reason: &str,
        actor: &str,
    ) -> Result<ReopenedEvaluation, EvaluationServiceError> {
        Ok(self.reopener.reopen(id, reason, actor)?)
    }

    pub fn associate_history(
        &self,
        associate_id: &str,
    ) -> Result<Vec<TimelineEntry>, EvaluationServiceError> {
        Ok(self.history.timeline(associate_id)?)
    }

    pub fn dashboard_analytics(&self) -> Result<DashboardSnapshot, EvaluationServiceError> {
        let evaluations = self.store.get_all()?;
        let snapshot = DashboardAnalyticsBuilder::build(&evaluations, self.clock.now());
        debug!(
            total = snapshot.total_evaluations,
            active = snapshot.active_evaluations,
            completed = snapshot.completed_evaluations,
            "dashboard analytics built"
        );
        Ok(snapshot)
    }
}

/// Error raised by the evaluation service.
#[derive(Debug, thiserror::Error)]
pub enum EvaluationServiceError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error(transparent)]
    Reopen(#[from] ReopenError),
    #[error(transparent)]
    Track(#[from] TrackError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl EvaluationServiceError {
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::Store(StoreError::NotFound(_))
                | Self::Reopen(ReopenError::NotFound(_))
                | Self::Track(TrackError::NotFound(_))
        )
    }
}
