use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}

/// Midnight UTC of `today`, or the current instant when no date was given.
pub(crate) fn reporting_instant(today: Option<NaiveDate>) -> DateTime<Utc> {
    match today {
        Some(date) => Utc.from_utc_datetime(&date.and_time(NaiveTime::default())),
        None => Utc::now(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_iso_dates_and_rejects_garbage() {
        assert_eq!(
            parse_date(" 2025-06-30 "),
            Ok(NaiveDate::from_ymd_opt(2025, 6, 30).expect("valid date"))
        );
        let err = parse_date("30/06/2025").expect_err("slashes rejected");
        assert!(err.contains("YYYY-MM-DD"));
    }

    #[test]
    fn reporting_instant_pins_to_midnight_utc() {
        let date = NaiveDate::from_ymd_opt(2025, 6, 30).expect("valid date");
        let instant = reporting_instant(Some(date));
        assert_eq!(instant.to_rfc3339(), "2025-06-30T00:00:00+00:00");
    }
}
