// Dashboard aggregation — funnel metrics over already-loaded collections.
// Pure: recomputed on every render from the current collections and range.

use chrono::{DateTime, Datelike, Duration, TimeZone, Utc};
use serde::Serialize;

use crate::types::{Activity, ActivityType, Client, Policy};
use crate::util::parse_timestamp;

/// Inclusive date range `[from, to]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
}

impl DateRange {
    pub fn contains(&self, dt: DateTime<Utc>) -> bool {
        dt >= self.from && dt <= self.to
    }

    /// Build the range for a preset, anchored at `today`.
    pub fn from_preset(preset: RangePreset, today: DateTime<Utc>) -> DateRange {
        let from = match preset {
            RangePreset::ThisWeek => today - Duration::days(7),
            RangePreset::ThisMonth => Utc
                .with_ymd_and_hms(today.year(), today.month(), 1, 0, 0, 0)
                .single()
                .unwrap_or(today),
            RangePreset::Last90Days => today - Duration::days(90),
            RangePreset::AllTime => DateTime::<Utc>::UNIX_EPOCH,
        };
        DateRange { from, to: today }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangePreset {
    ThisWeek,
    ThisMonth,
    Last90Days,
    AllTime,
}

/// Aggregated funnel metrics for a time range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub new_prospects: u32,
    pub calls_completed: u32,
    pub appointments_scheduled: u32,
    pub policies_entered: u32,
    /// Points scored today — always the current day, independent of the
    /// selected range.
    pub points_today: u32,
}

/// True when the (possibly absent) timestamp parses and falls in range.
/// Unparsable or missing dates are excluded, never an error.
fn in_range(date: Option<&str>, range: &DateRange) -> bool {
    date.and_then(parse_timestamp)
        .map(|dt| range.contains(dt))
        .unwrap_or(false)
}

/// The current-day window for the points total.
fn day_window(today: DateTime<Utc>) -> DateRange {
    let start = today
        .date_naive()
        .and_hms_opt(0, 0, 0)
        .map(|dt| DateTime::<Utc>::from_naive_utc_and_offset(dt, Utc))
        .unwrap_or(today);
    DateRange {
        from: start,
        to: start + Duration::days(1) - Duration::microseconds(1),
    }
}

/// Points contributed by one activity toward today's total: its type's
/// score when it is completed and dated today, else zero.
fn points_contribution(activity: &Activity, today_window: &DateRange) -> u32 {
    if activity.completed && in_range(Some(activity.start.as_str()), today_window) {
        activity.activity_type.points()
    } else {
        0
    }
}

/// Compute the dashboard snapshot for a range.
///
/// - new prospects: clients created within the range
/// - calls completed: Call activities, completed, dated in range
/// - appointments scheduled: initial/closing meetings in range
///   (completion not required)
/// - policies entered: policies whose intake date falls in range
/// - points today: per-type scores of activities completed today
pub fn compute_snapshot(
    clients: &[Client],
    policies: &[Policy],
    activities: &[Activity],
    range: &DateRange,
    today: DateTime<Utc>,
) -> Snapshot {
    let new_prospects = clients
        .iter()
        .filter(|c| in_range(c.created_at.as_deref(), range))
        .count() as u32;

    let calls_completed = activities
        .iter()
        .filter(|a| {
            a.activity_type == ActivityType::Call
                && a.completed
                && in_range(Some(a.start.as_str()), range)
        })
        .count() as u32;

    let appointments_scheduled = activities
        .iter()
        .filter(|a| {
            matches!(
                a.activity_type,
                ActivityType::InitialMeeting | ActivityType::ClosingMeeting
            ) && in_range(Some(a.start.as_str()), range)
        })
        .count() as u32;

    let policies_entered = policies
        .iter()
        .filter(|p| in_range(p.intake_date.as_deref(), range))
        .count() as u32;

    let today_window = day_window(today);
    let points_today = activities
        .iter()
        .map(|a| points_contribution(a, &today_window))
        .sum();

    Snapshot {
        new_prospects,
        calls_completed,
        appointments_scheduled,
        policies_entered,
        points_today,
    }
}
