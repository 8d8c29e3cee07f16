use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::response::Response;
use chrono::{DateTime, Duration, Utc};
use serde_json::Value;

use crate::evaluations::domain::{
    Evaluation, EvaluationId, HistoricalEvaluationRecord, NewEvaluation, TrackStatus,
};
use crate::evaluations::store::{
    EvaluationStore, InMemoryEvaluationStore, StoreError, WriteBatch,
};
use crate::evaluations::{evaluation_router, EvaluationService, FixedClock};

pub(super) fn now() -> DateTime<Utc> {
    "2025-06-30T12:00:00Z".parse().expect("valid timestamp")
}

pub(super) fn clock() -> Arc<FixedClock> {
    Arc::new(FixedClock(now()))
}

pub(super) fn evaluation(
    id: &str,
    associate_id: &str,
    client_name: &str,
    internal: TrackStatus,
    client: TrackStatus,
    created_days_ago: i64,
) -> Evaluation {
    let created = now() - Duration::days(created_days_ago);
    let mut evaluation = Evaluation::register(
        EvaluationId(id.to_string()),
        NewEvaluation {
            associate_id: associate_id.to_string(),
            associate_name: format!("Associate {associate_id}"),
            client_name: client_name.to_string(),
            remarks: Some("sourced via referral".to_string()),
            resume_reference: Some(format!("resumes/{associate_id}.pdf")),
        },
        created,
    );
    evaluation.internal_status = internal;
    evaluation.client_status = client;
    if internal != TrackStatus::Pending {
        evaluation.internal_evaluation_date = Some(created + Duration::hours(2));
        evaluation.updated_date = created + Duration::hours(2);
    }
    if client != TrackStatus::Pending {
        evaluation.client_evaluation_date = Some(created + Duration::hours(4));
        evaluation.updated_date = created + Duration::hours(4);
    }
    evaluation
}

pub(super) fn seeded_store(evaluations: Vec<Evaluation>) -> Arc<InMemoryEvaluationStore> {
    Arc::new(InMemoryEvaluationStore::with_records(
        evaluations,
        Vec::<HistoricalEvaluationRecord>::new(),
    ))
}

pub(super) fn build_service(
    evaluations: Vec<Evaluation>,
) -> (
    EvaluationService<InMemoryEvaluationStore, FixedClock>,
    Arc<InMemoryEvaluationStore>,
) {
    let store = seeded_store(evaluations);
    let service = EvaluationService::new(store.clone(), clock());
    (service, store)
}

pub(super) fn router_with(evaluations: Vec<Evaluation>) -> axum::Router {
    let (service, _) = build_service(evaluations);
    evaluation_router(Arc::new(service))
}

/// Delegates to an in-memory store but reports a conflict for the first
/// `conflicts` batches it is asked to apply.
pub(super) struct FlakyStore {
    pub(super) inner: InMemoryEvaluationStore,
    conflicts: AtomicUsize,
    attempts: AtomicUsize,
}

impl FlakyStore {
    pub(super) fn new(evaluations: Vec<Evaluation>, conflicts: usize) -> Self {
        Self {
            inner: InMemoryEvaluationStore::with_records(evaluations, Vec::new()),
            conflicts: AtomicUsize::new(conflicts),
            attempts: AtomicUsize::new(0),
        }
    }

    pub(super) fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

impl EvaluationStore for FlakyStore {
    fn get_all(&self) -> Result<Vec<Evaluation>, StoreError> {
        self.inner.get_all()
    }

    fn get_by_id(&self, id: &EvaluationId) -> Result<Evaluation, StoreError> {
        self.inner.get_by_id(id)
    }

    fn get_historical(
        &self,
        original_evaluation_id: &EvaluationId,
    ) -> Result<Vec<HistoricalEvaluationRecord>, StoreError> {
        self.inner.get_historical(original_evaluation_id)
    }

    fn insert(&self, evaluation: Evaluation) -> Result<Evaluation, StoreError> {
        self.inner.insert(evaluation)
    }

    fn apply(&self, batch: WriteBatch) -> Result<Vec<Evaluation>, StoreError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        let remaining = self.conflicts.load(Ordering::SeqCst);
        if remaining > 0 {
            self.conflicts.store(remaining - 1, Ordering::SeqCst);
            return Err(StoreError::Conflict("concurrent writer".to_string()));
        }
        self.inner.apply(batch)
    }
}

pub(super) struct UnavailableStore;

impl EvaluationStore for UnavailableStore {
    fn get_all(&self) -> Result<Vec<Evaluation>, StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }

    fn get_by_id(&self, _id: &EvaluationId) -> Result<Evaluation, StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }

    fn get_historical(
        &self,
        _original_evaluation_id: &EvaluationId,
    ) -> Result<Vec<HistoricalEvaluationRecord>, StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }

    fn insert(&self, _evaluation: Evaluation) -> Result<Evaluation, StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }

    fn apply(&self, _batch: WriteBatch) -> Result<Vec<Evaluation>, StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
