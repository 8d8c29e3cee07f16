use chrono::{DateTime, Utc};
use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Identifier wrapper for evaluation records.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EvaluationId(pub String);

impl EvaluationId {
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EvaluationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier wrapper for historical snapshots.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HistoryId(pub String);

impl HistoryId {
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }
}

impl fmt::Display for HistoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The two approval pipelines an evaluation moves through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Track {
    Internal,
    Client,
}

impl Track {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Internal => "internal",
            Self::Client => "client",
        }
    }
}

/// State of a single track.
///
/// Parsing is lenient: `null`, missing, empty or unrecognised values read as
/// [`TrackStatus::Pending`] so analytics keep working over partially migrated
/// data. This is intentional and is never reported as an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TrackStatus {
    #[default]
    Pending,
    InProgress,
    Pass,
    Fail,
}

impl TrackStatus {
    pub const fn ordered() -> [Self; 4] {
        [Self::Pending, Self::InProgress, Self::Pass, Self::Fail]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in-progress",
            Self::Pass => "pass",
            Self::Fail => "fail",
        }
    }

    /// Strict parse for caller input; `None` for anything unrecognised.
    pub fn parse_label(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "pending" => Some(Self::Pending),
            "in-progress" | "in_progress" | "inprogress" | "in progress" => Some(Self::InProgress),
            "pass" | "passed" => Some(Self::Pass),
            "fail" | "failed" => Some(Self::Fail),
            _ => None,
        }
    }

    /// Lenient parse for stored data: unknown labels read as `pending`.
    pub fn from_label(raw: &str) -> Self {
        Self::parse_label(raw).unwrap_or_default()
    }

    /// `pass` and `fail` end a track.
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Pass | Self::Fail)
    }
}

impl fmt::Display for TrackStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.label())
    }
}

impl Serialize for TrackStatus {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.label())
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawTrackStatus {
    Text(String),
    Other(IgnoredAny),
}

impl<'de> Deserialize<'de> for TrackStatus {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<RawTrackStatus>::deserialize(deserializer)?;
        Ok(match raw {
            Some(RawTrackStatus::Text(value)) => Self::from_label(&value),
            Some(RawTrackStatus::Other(_)) | None => Self::Pending,
        })
    }
}

/// The mutable "current" record; exactly one exists per evaluation id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Evaluation {
    pub id: EvaluationId,
    pub associate_id: String,
    pub associate_name: String,
    pub client_name: String,
    #[serde(default)]
    pub internal_status: TrackStatus,
    #[serde(default)]
    pub client_status: TrackStatus,
    #[serde(default)]
    pub internal_feedback: Option<String>,
    #[serde(default)]
    pub client_feedback: Option<String>,
    pub created_date: DateTime<Utc>,
    pub updated_date: DateTime<Utc>,
    #[serde(default)]
    pub internal_evaluation_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub client_evaluation_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub remarks: Option<String>,
    #[serde(default)]
    pub resume_reference: Option<String>,
}

impl Evaluation {
    /// Build a fresh record in the `{pending, pending}` state.
    pub fn register(id: EvaluationId, new: NewEvaluation, now: DateTime<Utc>) -> Self {
        Self {
            id,
            associate_id: new.associate_id,
            associate_name: new.associate_name,
            client_name: new.client_name,
            internal_status: TrackStatus::Pending,
            client_status: TrackStatus::Pending,
            internal_feedback: None,
            client_feedback: None,
            created_date: now,
            updated_date: now,
            internal_evaluation_date: None,
            client_evaluation_date: None,
            remarks: new.remarks,
            resume_reference: new.resume_reference,
        }
    }

    pub fn status(&self, track: Track) -> TrackStatus {
        match track {
            Track::Internal => self.internal_status,
            Track::Client => self.client_status,
        }
    }
}

/// Input produced by the creation workflow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewEvaluation {
    pub associate_id: String,
    pub associate_name: String,
    pub client_name: String,
    #[serde(default)]
    pub remarks: Option<String>,
    #[serde(default)]
    pub resume_reference: Option<String>,
}

/// Partial update over the workflow fields of an [`Evaluation`].
///
/// Identity fields, `created_date`, `remarks` and `resume_reference` have no
/// slot here, so a patch can never rewrite them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EvaluationPatch {
    pub internal_status: Option<TrackStatus>,
    pub client_status: Option<TrackStatus>,
    pub internal_feedback: Option<Option<String>>,
    pub client_feedback: Option<Option<String>>,
    pub internal_evaluation_date: Option<Option<DateTime<Utc>>>,
    pub client_evaluation_date: Option<Option<DateTime<Utc>>>,
}

impl EvaluationPatch {
    /// Patch that returns both tracks to `pending` with their dates cleared.
    pub fn reset_tracks() -> Self {
        Self {
            internal_status: Some(TrackStatus::Pending),
            client_status: Some(TrackStatus::Pending),
            internal_evaluation_date: Some(None),
            client_evaluation_date: Some(None),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    pub fn apply_to(&self, evaluation: &mut Evaluation, now: DateTime<Utc>) {
        if let Some(status) = self.internal_status {
            evaluation.internal_status = status;
        }
        if let Some(status) = self.client_status {
            evaluation.client_status = status;
        }
        if let Some(feedback) = &self.internal_feedback {
            evaluation.internal_feedback = feedback.clone();
        }
        if let Some(feedback) = &self.client_feedback {
            evaluation.client_feedback = feedback.clone();
        }
        if let Some(date) = self.internal_evaluation_date {
            evaluation.internal_evaluation_date = date;
        }
        if let Some(date) = self.client_evaluation_date {
            evaluation.client_evaluation_date = date;
        }
        evaluation.updated_date = now;
    }
}

/// Append-only snapshot taken when a completed evaluation is re-opened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoricalEvaluationRecord {
    pub id: HistoryId,
    pub original_evaluation_id: EvaluationId,
    pub associate_id: String,
    pub associate_name: String,
    pub client_name: String,
    #[serde(default)]
    pub internal_status: TrackStatus,
    #[serde(default)]
    pub client_status: TrackStatus,
    #[serde(default)]
    pub internal_feedback: Option<String>,
    #[serde(default)]
    pub client_feedback: Option<String>,
    #[serde(default)]
    pub internal_evaluation_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub client_evaluation_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub resume_reference: Option<String>,
    pub completed_at: DateTime<Utc>,
    pub reopened_at: DateTime<Utc>,
    pub reopened_by: String,
    pub reopen_reason: String,
}

impl HistoricalEvaluationRecord {
    pub fn snapshot(
        evaluation: &Evaluation,
        reopened_at: DateTime<Utc>,
        reopened_by: &str,
        reopen_reason: &str,
    ) -> Self {
        Self {
            id: HistoryId::generate(),
            original_evaluation_id: evaluation.id.clone(),
            associate_id: evaluation.associate_id.clone(),
            associate_name: evaluation.associate_name.clone(),
            client_name: evaluation.client_name.clone(),
            internal_status: evaluation.internal_status,
            client_status: evaluation.client_status,
            internal_feedback: evaluation.internal_feedback.clone(),
            client_feedback: evaluation.client_feedback.clone(),
            internal_evaluation_date: evaluation.internal_evaluation_date,
            client_evaluation_date: evaluation.client_evaluation_date,
            resume_reference: evaluation.resume_reference.clone(),
            completed_at: evaluation.updated_date,
            reopened_at,
            reopened_by: reopened_by.to_string(),
            reopen_reason: reopen_reason.to_string(),
        }
    }

    /// Date the snapshot's tracks last moved, falling back to `completed_at`.
    pub fn evaluation_date(&self) -> DateTime<Utc> {
        match (self.internal_evaluation_date, self.client_evaluation_date) {
            (Some(internal), Some(client)) => internal.max(client),
            (Some(date), None) | (None, Some(date)) => date,
            (None, None) => self.completed_at,
        }
    }
}
