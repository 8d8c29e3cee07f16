use std::sync::Arc;

use serde::{de, Deserialize, Deserializer};
use tracing::{info, warn};

use super::classifier::{classify, Lifecycle};
use super::clock::Clock;
use super::domain::{Evaluation, EvaluationId, EvaluationPatch, Track, TrackStatus};
use super::store::{EvaluationStore, StoreError, WriteBatch};

/// Requested change to one track.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TrackUpdate {
    #[serde(deserialize_with = "strict_status")]
    pub status: TrackStatus,
    #[serde(default)]
    pub feedback: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum TrackError {
    #[error("evaluation {0} not found")]
    NotFound(EvaluationId),
    #[error("client track of {id} is locked until the internal track passes (internal is {internal})")]
    ClientTrackLocked {
        id: EvaluationId,
        internal: TrackStatus,
    },
    #[error("evaluation {0} is completed; reopen it before editing its tracks")]
    EvaluationCompleted(EvaluationId),
    #[error(transparent)]
    Store(StoreError),
}

/// Unlike stored records, caller input must name a known status.
fn strict_status<'de, D>(deserializer: D) -> Result<TrackStatus, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    TrackStatus::parse_label(&raw)
        .ok_or_else(|| de::Error::custom(format!("unknown track status '{raw}'")))
}

impl From<StoreError> for TrackError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::NotFound(id) => Self::NotFound(id),
            other => Self::Store(other),
        }
    }
}

/// Single entry point for track edits; holds the client-track gate.
pub struct TrackEditor<S, C> {
    store: Arc<S>,
    clock: Arc<C>,
}

impl<S, C> TrackEditor<S, C>
where
    S: EvaluationStore,
    C: Clock,
{
    pub fn new(store: Arc<S>, clock: Arc<C>) -> Self {
        Self { store, clock }
    }

    pub fn update(
        &self,
        id: &EvaluationId,
        track: Track,
        update: TrackUpdate,
    ) -> Result<Evaluation, TrackError> {
        let current = self.store.get_by_id(id)?;

        if classify(&current) == Lifecycle::Completed {
            warn!(
                evaluation_id = %id,
                track = track.label(),
                "rejected track update on completed evaluation"
            );
            return Err(TrackError::EvaluationCompleted(id.clone()));
        }

        if track == Track::Client && current.internal_status != TrackStatus::Pass {
            warn!(
                evaluation_id = %id,
                internal = current.internal_status.label(),
                "rejected client track update before internal pass"
            );
            return Err(TrackError::ClientTrackLocked {
                id: id.clone(),
                internal: current.internal_status,
            });
        }

        let now = self.clock.now();
        let status_changed = current.status(track) != update.status;
        let feedback = update
            .feedback
            .map(|text| text.trim().to_string())
            .filter(|text| !text.is_empty());

        let mut patch = EvaluationPatch::default();
        match track {
            Track::Internal => {
                patch.internal_status = Some(update.status);
                patch.internal_feedback = Some(feedback);
                if status_changed {
                    patch.internal_evaluation_date = Some(Some(now));
                }
                // The client track only exists behind an internal pass.
                if update.status != TrackStatus::Pass
                    && current.client_status != TrackStatus::Pending
                {
                    patch.client_status = Some(TrackStatus::Pending);
                    patch.client_feedback = Some(None);
                    patch.client_evaluation_date = Some(None);
                }
            }
            Track::Client => {
                patch.client_status = Some(update.status);
                patch.client_feedback = Some(feedback);
                if status_changed {
                    patch.client_evaluation_date = Some(Some(now));
                }
            }
        }

        // Guard on the state the gate was checked against.
        let batch = WriteBatch::new(now)
            .expect_updated_at(id.clone(), current.updated_date)
            .update_evaluation(id.clone(), patch);
        let updated = self
            .store
            .apply(batch)?
            .pop()
            .ok_or_else(|| TrackError::NotFound(id.clone()))?;

        info!(
            evaluation_id = %id,
            track = track.label(),
            status = updated.status(track).label(),
            "track updated"
        );
        Ok(updated)
    }
}
