//! Third-party unit-price feed (current UDI value).
//!
//! A simple GET returning `{value, date, source}`. Feed dates arrive with
//! ambiguous day/month ordering, so normalization rejects results dated
//! beyond a small clock-skew tolerance into the future, tries a day/month
//! swap, and falls back to today.

use chrono::{Datelike, Duration, NaiveDate};
use serde::Deserialize;

/// Days of clock skew tolerated before a feed date is considered bogus.
const FUTURE_SKEW_TOLERANCE_DAYS: i64 = 2;

#[derive(Debug, thiserror::Error)]
pub enum RateFeedError {
    #[error("HTTP: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Rate feed error {status}: {message}")]
    Api { status: u16, message: String },
    #[error("Rate feed URL is not configured")]
    NotConfigured,
}

#[derive(Debug, Deserialize)]
struct RateFeedBody {
    value: f64,
    #[serde(default)]
    date: Option<String>,
    #[serde(default)]
    source: Option<String>,
}

/// A normalized unit-price observation.
#[derive(Debug, Clone, PartialEq)]
pub struct UnitPrice {
    pub value: f64,
    pub date: NaiveDate,
    pub source: String,
}

fn plausible(date: NaiveDate, today: NaiveDate) -> bool {
    date <= today + Duration::days(FUTURE_SKEW_TOLERANCE_DAYS)
}

/// Resolve a feed date string against `today`.
///
/// Accepts ISO and slash-separated forms. A date too far in the future is
/// assumed to have day and month swapped; when the swap is invalid or
/// still in the future, today wins.
pub fn normalize_feed_date(raw: &str, today: NaiveDate) -> NaiveDate {
    let parsed = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(raw, "%d/%m/%Y"))
        .or_else(|_| NaiveDate::parse_from_str(raw, "%m/%d/%Y"));
    let Ok(date) = parsed else {
        return today;
    };

    if plausible(date, today) {
        return date;
    }

    // Likely day/month transposition (e.g. 04/09 read as Sep 4 vs Apr 9).
    if let Some(swapped) = NaiveDate::from_ymd_opt(date.year(), date.day(), date.month()) {
        if plausible(swapped, today) {
            return swapped;
        }
    }

    today
}

/// Fetch the current unit price from the configured feed.
pub async fn fetch_unit_price(
    http: &reqwest::Client,
    feed_url: Option<&str>,
    today: NaiveDate,
) -> Result<UnitPrice, RateFeedError> {
    let url = feed_url.ok_or(RateFeedError::NotConfigured)?;
    let resp = http.get(url).send().await?;
    let status = resp.status();
    if !status.is_success() {
        let message = resp.text().await.unwrap_or_default();
        return Err(RateFeedError::Api {
            status: status.as_u16(),
            message,
        });
    }
    let body: RateFeedBody = resp.json().await?;
    let date = body
        .date
        .as_deref()
        .map(|raw| normalize_feed_date(raw, today))
        .unwrap_or(today);
    Ok(UnitPrice {
        value: body.value,
        date,
        source: body.source.unwrap_or_else(|| "feed".to_string()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 4, 10).unwrap()
    }

    #[test]
    fn test_iso_date_within_tolerance_kept() {
        let date = normalize_feed_date("2026-04-09", today());
        assert_eq!(date, NaiveDate::from_ymd_opt(2026, 4, 9).unwrap());
        // One day ahead is within clock skew.
        let date = normalize_feed_date("2026-04-11", today());
        assert_eq!(date, NaiveDate::from_ymd_opt(2026, 4, 11).unwrap());
    }

    #[test]
    fn test_future_date_gets_day_month_swap() {
        // "2026-09-04" is months ahead; as Apr 9 it is yesterday.
        let date = normalize_feed_date("2026-09-04", today());
        assert_eq!(date, NaiveDate::from_ymd_opt(2026, 4, 9).unwrap());
    }

    #[test]
    fn test_unswappable_future_date_falls_back_to_today() {
        // Day 25 cannot be a month; the swap is invalid.
        let date = normalize_feed_date("2026-12-25", today());
        assert_eq!(date, today());
    }

    #[test]
    fn test_garbage_date_falls_back_to_today() {
        assert_eq!(normalize_feed_date("soon", today()), today());
        assert_eq!(normalize_feed_date("", today()), today());
    }

    #[test]
    fn test_slash_formats_accepted() {
        let date = normalize_feed_date("09/04/2026", today());
        // Day-first parse wins and is already plausible.
        assert_eq!(date.month(), 4);
        assert_eq!(date.day(), 9);
    }

    #[test]
    fn test_feed_body_deserialization() {
        let json = r#"{"value": 8.1130, "date": "2026-04-09", "source": "banxico"}"#;
        let body: RateFeedBody = serde_json::from_str(json).unwrap();
        assert_eq!(body.value, 8.1130);
        assert_eq!(body.source.as_deref(), Some("banxico"));
    }
}
