use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{StoreError, WriteBatch, WriteOp};
use crate::evaluations::domain::{Evaluation, EvaluationId, HistoricalEvaluationRecord};

/// Snapshot of everything a store holds. Also the on-disk document format.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct StoreState {
    #[serde(default)]
    pub(crate) evaluations: BTreeMap<EvaluationId, Evaluation>,
    #[serde(default)]
    pub(crate) historical: Vec<HistoricalEvaluationRecord>,
}

impl StoreState {
    pub(crate) fn get(&self, id: &EvaluationId) -> Result<Evaluation, StoreError> {
        self.evaluations
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(id.clone()))
    }

    pub(crate) fn historical_for(&self, id: &EvaluationId) -> Vec<HistoricalEvaluationRecord> {
        self.historical
            .iter()
            .filter(|record| &record.original_evaluation_id == id)
            .cloned()
            .collect()
    }

    pub(crate) fn with_inserted(&self, evaluation: &Evaluation) -> Result<Self, StoreError> {
        if self.evaluations.contains_key(&evaluation.id) {
            return Err(StoreError::Conflict(format!(
                "evaluation {} already exists",
                evaluation.id
            )));
        }
        let mut staged = self.clone();
        staged
            .evaluations
            .insert(evaluation.id.clone(), evaluation.clone());
        Ok(staged)
    }

    /// Apply `batch` to a copy of this state. `self` is untouched on error.
    pub(crate) fn stage(&self, batch: &WriteBatch) -> Result<(Self, Vec<Evaluation>), StoreError> {
        for precondition in batch.preconditions() {
            let current = self.get(&precondition.id)?;
            if current.updated_date != precondition.updated_date {
                return Err(StoreError::Conflict(format!(
                    "evaluation {} changed since {}",
                    precondition.id, precondition.updated_date
                )));
            }
        }

        let mut staged = self.clone();
        let mut updated = Vec::new();
        for operation in batch.operations() {
            match operation {
                WriteOp::AppendHistorical(record) => {
                    if !staged
                        .evaluations
                        .contains_key(&record.original_evaluation_id)
                    {
                        return Err(StoreError::NotFound(record.original_evaluation_id.clone()));
                    }
                    if staged.historical.iter().any(|existing| existing.id == record.id) {
                        return Err(StoreError::Conflict(format!(
                            "historical record {} already exists",
                            record.id.0
                        )));
                    }
                    staged.historical.push(record.clone());
                }
                WriteOp::UpdateEvaluation { id, patch } => {
                    let evaluation = staged
                        .evaluations
                        .get_mut(id)
                        .ok_or_else(|| StoreError::NotFound(id.clone()))?;
                    patch.apply_to(evaluation, batch.committed_at());
                    updated.push(evaluation.clone());
                }
            }
        }

        Ok((staged, updated))
    }
}
