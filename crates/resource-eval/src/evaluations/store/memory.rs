use std::sync::{Arc, Mutex, MutexGuard};

use super::state::StoreState;
use super::{EvaluationStore, StoreError, WriteBatch};
use crate::evaluations::domain::{Evaluation, EvaluationId, HistoricalEvaluationRecord};

/// Process-local store. Batches are staged on a copy and swapped in whole.
#[derive(Debug, Default, Clone)]
pub struct InMemoryEvaluationStore {
    state: Arc<Mutex<StoreState>>,
}

impl InMemoryEvaluationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store with existing records, e.g. from an import.
    pub fn with_records(
        evaluations: impl IntoIterator<Item = Evaluation>,
        historical: impl IntoIterator<Item = HistoricalEvaluationRecord>,
    ) -> Self {
        let state = StoreState {
            evaluations: evaluations
                .into_iter()
                .map(|evaluation| (evaluation.id.clone(), evaluation))
                .collect(),
            historical: historical.into_iter().collect(),
        };
        Self {
            state: Arc::new(Mutex::new(state)),
        }
    }

    pub fn historical_count(&self) -> Result<usize, StoreError> {
        Ok(self.lock()?.historical.len())
    }

    fn lock(&self) -> Result<MutexGuard<'_, StoreState>, StoreError> {
        self.state
            .lock()
            .map_err(|_| StoreError::Unavailable("store mutex poisoned".to_string()))
    }
}

impl EvaluationStore for InMemoryEvaluationStore {
    fn get_all(&self) -> Result<Vec<Evaluation>, StoreError> {
        Ok(self.lock()?.evaluations.values().cloned().collect())
    }

    fn get_by_id(&self, id: &EvaluationId) -> Result<Evaluation, StoreError> {
        self.lock()?.get(id)
    }

    fn get_historical(
        &self,
        original_evaluation_id: &EvaluationId,
    ) -> Result<Vec<HistoricalEvaluationRecord>, StoreError> {
        Ok(self.lock()?.historical_for(original_evaluation_id))
    }

    fn insert(&self, evaluation: Evaluation) -> Result<Evaluation, StoreError> {
        let mut guard = self.lock()?;
        *guard = guard.with_inserted(&evaluation)?;
        Ok(evaluation)
    }

    fn apply(&self, batch: WriteBatch) -> Result<Vec<Evaluation>, StoreError> {
        let mut guard = self.lock()?;
        let (staged, updated) = guard.stage(&batch)?;
        *guard = staged;
        Ok(updated)
    }
}
