use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::aging::{age_days, AgingBucket};
use super::classifier::{classify, Lifecycle};
use super::domain::{Evaluation, TrackStatus};

/// Which side of the lifecycle a listing shows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewFilter {
    #[default]
    Active,
    Completed,
}

impl ViewFilter {
    pub const fn lifecycle(self) -> Lifecycle {
        match self {
            Self::Active => Lifecycle::Active,
            Self::Completed => Lifecycle::Completed,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListQuery {
    pub view: ViewFilter,
    /// Case-insensitive match on associate id, associate name or client name.
    pub text: Option<String>,
    /// Matches when either track holds this status.
    pub status: Option<TrackStatus>,
}

impl ListQuery {
    pub fn view(view: ViewFilter) -> Self {
        Self {
            view,
            ..Self::default()
        }
    }

    fn matches_text(&self, evaluation: &Evaluation) -> bool {
        let Some(needle) = self
            .text
            .as_deref()
            .map(str::trim)
            .filter(|needle| !needle.is_empty())
        else {
            return true;
        };
        let needle = needle.to_lowercase();
        [
            &evaluation.associate_id,
            &evaluation.associate_name,
            &evaluation.client_name,
        ]
        .iter()
        .any(|field| field.to_lowercase().contains(&needle))
    }

    fn matches_status(&self, evaluation: &Evaluation) -> bool {
        match self.status {
            Some(status) => {
                evaluation.internal_status == status || evaluation.client_status == status
            }
            None => true,
        }
    }
}

/// An evaluation annotated with its lifecycle and age.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationListing {
    #[serde(flatten)]
    pub evaluation: Evaluation,
    pub lifecycle: Lifecycle,
    pub age_days: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aging_bucket: Option<AgingBucket>,
}

/// Filter and annotate `evaluations`, newest first.
pub fn list(
    evaluations: &[Evaluation],
    query: &ListQuery,
    now: DateTime<Utc>,
) -> Vec<EvaluationListing> {
    let wanted = query.view.lifecycle();
    let mut listings: Vec<EvaluationListing> = evaluations
        .iter()
        .filter(|evaluation| classify(evaluation) == wanted)
        .filter(|evaluation| query.matches_text(evaluation))
        .filter(|evaluation| query.matches_status(evaluation))
        .map(|evaluation| {
            let age = age_days(evaluation.created_date, now);
            EvaluationListing {
                evaluation: evaluation.clone(),
                lifecycle: wanted,
                age_days: age,
                aging_bucket: (wanted == Lifecycle::Active).then(|| AgingBucket::for_age(age)),
            }
        })
        .collect();

    listings.sort_by(|a, b| {
        b.evaluation
            .created_date
            .cmp(&a.evaluation.created_date)
            .then_with(|| a.evaluation.id.cmp(&b.evaluation.id))
    });
    listings
}
