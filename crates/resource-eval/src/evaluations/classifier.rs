use super::domain::{Evaluation, TrackStatus};
use serde::{Deserialize, Serialize};

/// Overall lifecycle state of an evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Lifecycle {
    Active,
    Completed,
}

impl Lifecycle {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Completed => "completed",
        }
    }
}

pub fn classify(evaluation: &Evaluation) -> Lifecycle {
    classify_tracks(evaluation.internal_status, evaluation.client_status)
}

/// Completed when internal failed, or internal passed and the client track
/// reached `pass` or `fail`. Every other combination is still active.
pub const fn classify_tracks(internal: TrackStatus, client: TrackStatus) -> Lifecycle {
    match (internal, client) {
        (TrackStatus::Fail, _) => Lifecycle::Completed,
        (TrackStatus::Pass, TrackStatus::Pass | TrackStatus::Fail) => Lifecycle::Completed,
        _ => Lifecycle::Active,
    }
}

/// Per-track progress partition used by the dashboard.
///
/// Unlike [`Lifecycle`] this only asks which tracks hold a terminal value, so
/// `{fail, pending}` is `InternalOnly` here while being `Completed` overall.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackProgress {
    BothComplete,
    InternalOnly,
    ClientOnly,
    NeitherComplete,
}

impl TrackProgress {
    pub const fn of(evaluation: &Evaluation) -> Self {
        match (
            evaluation.internal_status.is_terminal(),
            evaluation.client_status.is_terminal(),
        ) {
            (true, true) => Self::BothComplete,
            (true, false) => Self::InternalOnly,
            (false, true) => Self::ClientOnly,
            (false, false) => Self::NeitherComplete,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn internal_fail_completes_regardless_of_client() {
        for client in TrackStatus::ordered() {
            assert_eq!(
                classify_tracks(TrackStatus::Fail, client),
                Lifecycle::Completed,
                "fail/{client} should be completed"
            );
        }
    }

    #[test]
    fn internal_pass_waits_on_client_track() {
        assert_eq!(
            classify_tracks(TrackStatus::Pass, TrackStatus::Pass),
            Lifecycle::Completed
        );
        assert_eq!(
            classify_tracks(TrackStatus::Pass, TrackStatus::Fail),
            Lifecycle::Completed
        );
        assert_eq!(
            classify_tracks(TrackStatus::Pass, TrackStatus::Pending),
            Lifecycle::Active
        );
        assert_eq!(
            classify_tracks(TrackStatus::Pass, TrackStatus::InProgress),
            Lifecycle::Active
        );
    }

    #[test]
    fn open_internal_track_is_always_active() {
        for internal in [TrackStatus::Pending, TrackStatus::InProgress] {
            for client in TrackStatus::ordered() {
                assert_eq!(classify_tracks(internal, client), Lifecycle::Active);
            }
        }
    }

    #[test]
    fn unparseable_internal_status_reads_as_active() {
        let internal: TrackStatus = serde_json::from_str("null").expect("null parses");
        assert_eq!(
            classify_tracks(internal, TrackStatus::Fail),
            Lifecycle::Active
        );
    }
}
