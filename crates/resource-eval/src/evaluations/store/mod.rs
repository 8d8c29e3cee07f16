//! Persistence boundary for current evaluations and their historical snapshots.
//!
//! The store is the single source of truth. Every other component derives its
//! view from what these methods return, and only batches committed through
//! [`EvaluationStore::apply`] change it.

pub mod file;
pub mod memory;
mod state;

pub use file::JsonFileEvaluationStore;
pub use memory::InMemoryEvaluationStore;

use chrono::{DateTime, Utc};

use super::domain::{Evaluation, EvaluationId, EvaluationPatch, HistoricalEvaluationRecord};

/// Storage abstraction injected into the lifecycle components.
pub trait EvaluationStore: Send + Sync {
    fn get_all(&self) -> Result<Vec<Evaluation>, StoreError>;
    fn get_by_id(&self, id: &EvaluationId) -> Result<Evaluation, StoreError>;
    fn get_historical(
        &self,
        original_evaluation_id: &EvaluationId,
    ) -> Result<Vec<HistoricalEvaluationRecord>, StoreError>;
    fn insert(&self, evaluation: Evaluation) -> Result<Evaluation, StoreError>;

    /// Commit every operation in `batch` or none of them.
    ///
    /// Returns the post-commit state of each evaluation touched by an
    /// `UpdateEvaluation` operation, in batch order.
    fn apply(&self, batch: WriteBatch) -> Result<Vec<Evaluation>, StoreError>;

    fn append_historical(&self, record: HistoricalEvaluationRecord) -> Result<(), StoreError> {
        let batch = WriteBatch::new(record.reopened_at).append_historical(record);
        self.apply(batch).map(|_| ())
    }

    fn update_evaluation(
        &self,
        id: &EvaluationId,
        patch: EvaluationPatch,
        now: DateTime<Utc>,
    ) -> Result<Evaluation, StoreError> {
        let batch = WriteBatch::new(now).update_evaluation(id.clone(), patch);
        self.apply(batch)?
            .pop()
            .ok_or_else(|| StoreError::NotFound(id.clone()))
    }
}

/// A single write inside a [`WriteBatch`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOp {
    AppendHistorical(HistoricalEvaluationRecord),
    UpdateEvaluation {
        id: EvaluationId,
        patch: EvaluationPatch,
    },
}

/// Optimistic guard checked before any operation in the batch runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Precondition {
    pub id: EvaluationId,
    pub updated_date: DateTime<Utc>,
}

/// Ordered set of writes committed as one unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteBatch {
    committed_at: DateTime<Utc>,
    preconditions: Vec<Precondition>,
    operations: Vec<WriteOp>,
}

impl WriteBatch {
    pub fn new(committed_at: DateTime<Utc>) -> Self {
        Self {
            committed_at,
            preconditions: Vec::new(),
            operations: Vec::new(),
        }
    }

    /// Fail the whole batch with [`StoreError::Conflict`] unless the record
    /// still carries `updated_date`.
    pub fn expect_updated_at(mut self, id: EvaluationId, updated_date: DateTime<Utc>) -> Self {
        self.preconditions.push(Precondition { id, updated_date });
        self
    }

    pub fn append_historical(mut self, record: HistoricalEvaluationRecord) -> Self {
        self.operations.push(WriteOp::AppendHistorical(record));
        self
    }

    pub fn update_evaluation(mut self, id: EvaluationId, patch: EvaluationPatch) -> Self {
        self.operations.push(WriteOp::UpdateEvaluation { id, patch });
        self
    }

    pub fn committed_at(&self) -> DateTime<Utc> {
        self.committed_at
    }

    pub fn preconditions(&self) -> &[Precondition] {
        &self.preconditions
    }

    pub fn operations(&self) -> &[WriteOp] {
        &self.operations
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }
}

/// Error enumeration for store failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("evaluation {0} not found")]
    NotFound(EvaluationId),
    #[error("write conflict: {0}")]
    Conflict(String),
    #[error("store unavailable: {0}")]
    Unavailable(String),
    #[error("store contents unreadable: {0}")]
    Corrupt(String),
}
