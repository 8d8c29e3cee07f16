use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use super::classifier::{classify, Lifecycle};
use super::clock::Clock;
use super::domain::{Evaluation, EvaluationId, EvaluationPatch, HistoricalEvaluationRecord};
use super::store::{EvaluationStore, StoreError, WriteBatch};

/// Conflicts are retried this many times before surfacing to the caller.
const CONFLICT_RETRIES: usize = 1;

/// Outcome of a successful reopen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReopenedEvaluation {
    pub evaluation: Evaluation,
    pub historical: HistoricalEvaluationRecord,
}

#[derive(Debug, thiserror::Error)]
pub enum ReopenError {
    #[error("evaluation {0} not found")]
    NotFound(EvaluationId),
    #[error("evaluation {0} is still active and cannot be reopened")]
    NotCompleted(EvaluationId),
    #[error("a reopen reason is required")]
    MissingReason,
    #[error("the reopening actor is required")]
    MissingActor,
    #[error("evaluation {id} could not be reopened: {detail}")]
    StorageConflict { id: EvaluationId, detail: String },
    #[error(transparent)]
    Store(StoreError),
}

/// Moves a completed evaluation back to active, archiving its prior state.
pub struct ReopenCoordinator<S, C> {
    store: Arc<S>,
    clock: Arc<C>,
}

impl<S, C> ReopenCoordinator<S, C>
where
    S: EvaluationStore,
    C: Clock,
{
    pub fn new(store: Arc<S>, clock: Arc<C>) -> Self {
        Self { store, clock }
    }

    /// Checks run in order: the record exists, it is completed, then a
    /// reason and an actor are present. Nothing is written on any failure.
    pub fn reopen(
        &self,
        id: &EvaluationId,
        reason: &str,
        reopened_by: &str,
    ) -> Result<ReopenedEvaluation, ReopenError> {
        let reason = reason.trim();
        let reopened_by = reopened_by.trim();

        let mut attempt = 0;
        loop {
            match self.try_reopen(id, reason, reopened_by) {
                Err(ReopenError::StorageConflict { detail, .. }) if attempt < CONFLICT_RETRIES => {
                    attempt += 1;
                    warn!(evaluation_id = %id, %detail, attempt, "reopen conflicted; retrying");
                }
                Ok(reopened) => {
                    info!(
                        evaluation_id = %id,
                        history_id = %reopened.historical.id.0,
                        reopened_by,
                        "evaluation reopened"
                    );
                    return Ok(reopened);
                }
                Err(err) => return Err(err),
            }
        }
    }

    fn try_reopen(
        &self,
        id: &EvaluationId,
        reason: &str,
        reopened_by: &str,
    ) -> Result<ReopenedEvaluation, ReopenError> {
        let evaluation = self.store.get_by_id(id).map_err(|err| match err {
            StoreError::NotFound(_) => ReopenError::NotFound(id.clone()),
            other => ReopenError::Store(other),
        })?;

        if classify(&evaluation) != Lifecycle::Completed {
            return Err(ReopenError::NotCompleted(id.clone()));
        }
        if reason.is_empty() {
            return Err(ReopenError::MissingReason);
        }
        if reopened_by.is_empty() {
            return Err(ReopenError::MissingActor);
        }

        let now = self.clock.now();
        let historical = HistoricalEvaluationRecord::snapshot(&evaluation, now, reopened_by, reason);
        let batch = WriteBatch::new(now)
            .expect_updated_at(id.clone(), evaluation.updated_date)
            .append_historical(historical.clone())
            .update_evaluation(id.clone(), EvaluationPatch::reset_tracks());

        let reopened = self
            .store
            .apply(batch)
            .map_err(|err| match err {
                StoreError::Conflict(detail) => ReopenError::StorageConflict {
                    id: id.clone(),
                    detail,
                },
                StoreError::NotFound(_) => ReopenError::NotFound(id.clone()),
                other => ReopenError::Store(other),
            })?
            .into_iter()
            .find(|updated| &updated.id == id)
            .ok_or_else(|| ReopenError::StorageConflict {
                id: id.clone(),
                detail: "commit returned no evaluation".to_string(),
            })?;

        if classify(&reopened) != Lifecycle::Active {
            return Err(ReopenError::StorageConflict {
                id: id.clone(),
                detail: "evaluation still completed after commit".to_string(),
            });
        }

        Ok(ReopenedEvaluation {
            evaluation: reopened,
            historical,
        })
    }
}
