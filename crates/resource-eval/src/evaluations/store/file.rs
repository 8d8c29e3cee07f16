use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use tracing::{debug, warn};

use super::state::StoreState;
use super::{EvaluationStore, StoreError, WriteBatch};
use crate::evaluations::domain::{Evaluation, EvaluationId, HistoricalEvaluationRecord};

/// Durable store backed by a single JSON document.
///
/// Every write is serialized to a sibling temp file, synced and renamed over
/// the document before the call returns. When persisting fails the in-memory
/// view keeps its previous state.
#[derive(Debug)]
pub struct JsonFileEvaluationStore {
    path: PathBuf,
    state: Mutex<StoreState>,
}

impl JsonFileEvaluationStore {
    /// Open the document at `path`; a missing file is an empty store.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let state = if path.exists() {
            let bytes = fs::read(&path).map_err(|err| {
                StoreError::Unavailable(format!("failed to read {}: {err}", path.display()))
            })?;
            serde_json::from_slice(&bytes).map_err(|err| {
                StoreError::Corrupt(format!("{}: {err}", path.display()))
            })?
        } else {
            StoreState::default()
        };

        debug!(
            path = %path.display(),
            evaluations = state.evaluations.len(),
            historical = state.historical.len(),
            "opened evaluation store"
        );

        Ok(Self {
            path,
            state: Mutex::new(state),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock(&self) -> Result<MutexGuard<'_, StoreState>, StoreError> {
        self.state
            .lock()
            .map_err(|_| StoreError::Unavailable("store mutex poisoned".to_string()))
    }

    fn persist(&self, state: &StoreState) -> Result<(), StoreError> {
        let unavailable = |err: io::Error| {
            StoreError::Unavailable(format!("failed to write {}: {err}", self.path.display()))
        };

        let payload = serde_json::to_vec_pretty(state)
            .map_err(|err| StoreError::Unavailable(format!("failed to encode store: {err}")))?;

        let staging = self.path.with_extension("json.tmp");
        let written = write_synced(&staging, &payload)
            .and_then(|()| fs::rename(&staging, &self.path));
        if let Err(err) = written {
            if let Err(cleanup) = fs::remove_file(&staging) {
                if cleanup.kind() != io::ErrorKind::NotFound {
                    warn!(path = %staging.display(), error = %cleanup, "failed to remove staging file");
                }
            }
            return Err(unavailable(err));
        }
        sync_parent(&self.path).map_err(unavailable)
    }
}

fn write_synced(path: &Path, payload: &[u8]) -> io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(payload)?;
    file.sync_all()
}

/// Makes the rename itself durable.
#[cfg(unix)]
fn sync_parent(path: &Path) -> io::Result<()> {
    match path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        Some(dir) => File::open(dir)?.sync_all(),
        None => File::open(".")?.sync_all(),
    }
}

#[cfg(not(unix))]
fn sync_parent(_path: &Path) -> io::Result<()> {
    Ok(())
}

impl EvaluationStore for JsonFileEvaluationStore {
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
        let staged = guard.with_inserted(&evaluation)?;
        self.persist(&staged)?;
        *guard = staged;
        Ok(evaluation)
    }

    fn apply(&self, batch: WriteBatch) -> Result<Vec<Evaluation>, StoreError> {
        let mut guard = self.lock()?;
        let (staged, updated) = guard.stage(&batch)?;
        self.persist(&staged)?;
        *guard = staged;
        Ok(updated)
    }
}
