use super::domain::Evaluation;
use chrono::{DateTime, Utc};
use serde::Serialize;

const SECONDS_PER_DAY: i64 = 86_400;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum AgingBucket {
    Under7Days,
    Between7And14Days,
    Between15And30Days,
    Over30Days,
}

impl AgingBucket {
    /// Upper edges are inclusive: 7 days is still `Under7Days`.
    pub const fn for_age(age_days: i64) -> Self {
        if age_days <= 7 {
            Self::Under7Days
        } else if age_days <= 14 {
            Self::Between7And14Days
        } else if age_days <= 30 {
            Self::Between15And30Days
        } else {
            Self::Over30Days
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Under7Days => "0-7 days",
            Self::Between7And14Days => "8-14 days",
            Self::Between15And30Days => "15-30 days",
            Self::Over30Days => "30+ days",
        }
    }
}

/// Whole days since creation, rounded up. Records dated in the future age 0.
pub fn age_days(created: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    let elapsed = (now - created).num_seconds();
    if elapsed <= 0 {
        return 0;
    }
    (elapsed + SECONDS_PER_DAY - 1) / SECONDS_PER_DAY
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AgingAnalytics {
    pub under7_days: usize,
    pub between7_and14_days: usize,
    pub between15_and30_days: usize,
    pub over30_days: usize,
}

impl AgingAnalytics {
    pub fn total(&self) -> usize {
        self.under7_days + self.between7_and14_days + self.between15_and30_days + self.over30_days
    }

    fn record(&mut self, bucket: AgingBucket) {
        match bucket {
            AgingBucket::Under7Days => self.under7_days += 1,
            AgingBucket::Between7And14Days => self.between7_and14_days += 1,
            AgingBucket::Between15And30Days => self.between15_and30_days += 1,
            AgingBucket::Over30Days => self.over30_days += 1,
        }
    }
}

/// Buckets active evaluations by age. Callers pass the active subset only.
pub struct AgingAnalyzer;

impl AgingAnalyzer {
    pub fn analyze<'a, I>(active: I, now: DateTime<Utc>) -> AgingAnalytics
    where
        I: IntoIterator<Item = &'a Evaluation>,
    {
        let mut analytics = AgingAnalytics::default();
        for evaluation in active {
            let age = age_days(evaluation.created_date, now);
            analytics.record(AgingBucket::for_age(age));
        }
        analytics
    }
}
