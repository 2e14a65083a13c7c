use chrono::{Duration, NaiveDate, NaiveDateTime};

use crate::models::{FeatureSet, TicketRecord, UsageRecord};

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d"];
const DATETIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"];

/// Best-effort date parsing. A malformed date falls back to `now`, so a bad
/// row skews the windows instead of failing the request.
pub fn parse_date_lenient(raw: &str, now: NaiveDate) -> NaiveDate {
    let raw = raw.trim();
    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(raw, format) {
            return date;
        }
    }
    for format in DATETIME_FORMATS {
        if let Ok(datetime) = NaiveDateTime::parse_from_str(raw, format) {
            return datetime.date();
        }
    }
    now
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

pub fn compute_features(
    usage: &[UsageRecord],
    tickets: &[TicketRecord],
    now: NaiveDate,
) -> FeatureSet {
    let mut rows: Vec<(NaiveDate, &UsageRecord)> = usage
        .iter()
        .map(|row| (parse_date_lenient(&row.date, now), row))
        .collect();
    // Stable sort: duplicate dates keep input order, last one wins as "current".
    rows.sort_by_key(|(date, _)| *date);

    let dau_values: Vec<f64> = rows.iter().map(|(_, row)| row.dau).collect();
    let dau_trend_mom = if dau_values.len() < 14 {
        // Not enough history for a week-over-week comparison; neutral signal.
        0.0
    } else {
        let recent = mean(&dau_values[dau_values.len() - 7..]);
        let prior = mean(&dau_values[dau_values.len() - 14..dau_values.len() - 7]);
        if prior == 0.0 {
            0.0
        } else {
            round4((recent - prior) / prior)
        }
    };

    let license_utilization = match rows.last() {
        Some((_, latest)) if latest.licensed_seats > 0.0 => {
            round4(latest.used_seats / latest.licensed_seats)
        }
        _ => 0.0,
    };

    let window = Duration::days(14);
    let sev1_last_14d = tickets
        .iter()
        .filter(|ticket| ticket.severity == 1)
        .filter(|ticket| now - parse_date_lenient(&ticket.created_at, now) <= window)
        .count() as i64;

    FeatureSet {
        dau_trend_mom,
        license_utilization,
        sev1_last_14d,
    }
}
