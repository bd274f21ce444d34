//! Workout log period resolution and aggregation.
//!
//! Everything here is pure and takes `today` explicitly. Bad query values
//! never produce an error; they fall back to the current month.

use chrono::{Datelike, Days, NaiveDate};
use serde::Deserialize;
use std::collections::BTreeMap;

use gymbuddy_types::{
    validation::parse_date, AvailablePeriods, DateGroup, MonthOption, PeriodStats, PeriodType,
    WeekBucket, WorkoutLogResponse, WorkoutPlan,
};

pub const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// Raw `?year=&month=&week_start=` parameters, kept as strings so malformed
/// values can be defaulted instead of rejected
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LogQuery {
    #[serde(default)]
    pub year: Option<String>,
    #[serde(default)]
    pub month: Option<String>,
    #[serde(default)]
    pub week_start: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPeriod {
    pub period_type: PeriodType,
    pub year: i32,
    pub month: u32,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub week_start: Option<NaiveDate>,
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// First and last day of a calendar month
pub fn month_bounds(year: i32, month: u32) -> Option<(NaiveDate, NaiveDate)> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    Some((first, next.pred_opt()?))
}

pub fn month_name(month: u32) -> &'static str {
    month
        .checked_sub(1)
        .and_then(|idx| MONTH_NAMES.get(idx as usize))
        .copied()
        .unwrap_or("")
}

impl LogQuery {
    pub fn resolve(&self, today: NaiveDate) -> ResolvedPeriod {
        let mut year = present(&self.year)
            .and_then(|y| y.parse::<i32>().ok())
            .filter(|y| (1..=9999).contains(y))
            .unwrap_or(today.year());

        let month = match present(&self.month).map(str::parse::<i64>) {
            Some(Ok(m)) if (1..=12).contains(&m) => m as u32,
            Some(Ok(_)) => {
                year = today.year();
                today.month()
            }
            _ => today.month(),
        };

        let (month_start, month_end) = month_bounds(year, month).unwrap_or((today, today));
        let month_period = ResolvedPeriod {
            period_type: PeriodType::Month,
            year,
            month,
            start: month_start,
            end: month_end,
            week_start: None,
        };

        let Some(raw_week) = present(&self.week_start) else {
            return month_period;
        };

        match parse_date(raw_week) {
            Ok(start) => match start.checked_add_days(Days::new(6)) {
                Some(end) => ResolvedPeriod {
                    period_type: PeriodType::Week,
                    start,
                    end,
                    week_start: Some(start),
                    ..month_period
                },
                None => month_period,
            },
            Err(_) => {
                tracing::debug!("Ignoring malformed week_start {:?}", raw_week);
                month_period
            }
        }
    }
}

/// Sunday-first calendar weeks of a month, clipped to the month's days
pub fn week_buckets(year: i32, month: u32) -> Vec<WeekBucket> {
    let Some((first, last)) = month_bounds(year, month) else {
        return Vec::new();
    };

    let offset = u64::from(first.weekday().num_days_from_sunday());
    let Some(mut cursor) = first.checked_sub_days(Days::new(offset)) else {
        return Vec::new();
    };

    let mut weeks = Vec::new();
    while cursor <= last {
        let start = cursor.max(first);
        let end = cursor
            .checked_add_days(Days::new(6))
            .map_or(last, |end| end.min(last));
        weeks.push(WeekBucket {
            start,
            end,
            label: format!("{} - {}", start.format("%b %d"), end.format("%b %d")),
        });

        match cursor.checked_add_days(Days::new(7)) {
            Some(next) => cursor = next,
            None => break,
        }
    }
    weeks
}

/// Years to offer in the period picker, newest first
pub fn available_periods(plan_years: &[i32], year: i32, month: u32, today: NaiveDate) -> AvailablePeriods {
    let mut years: Vec<i32> = plan_years.to_vec();
    years.sort_unstable_by(|a, b| b.cmp(a));
    years.dedup();
    if years.is_empty() {
        years.push(today.year());
    }

    let months = (1..=12)
        .map(|number| MonthOption {
            number,
            name: month_name(number).to_string(),
        })
        .collect();

    AvailablePeriods {
        years,
        months,
        weeks: week_buckets(year, month),
    }
}

/// Group plans by their planned date, in date order
pub fn group_by_date(plans: &[WorkoutPlan]) -> Vec<DateGroup> {
    let mut groups: BTreeMap<NaiveDate, Vec<WorkoutPlan>> = BTreeMap::new();
    for plan in plans {
        groups.entry(plan.plan_date).or_default().push(plan.clone());
    }
    groups
        .into_iter()
        .map(|(date, plans)| DateGroup { date, plans })
        .collect()
}

/// Assemble the full log payload for one resolved period
pub fn build_log(
    period: &ResolvedPeriod,
    plans: Vec<WorkoutPlan>,
    plan_years: &[i32],
    today: NaiveDate,
) -> WorkoutLogResponse {
    WorkoutLogResponse {
        period_type: period.period_type,
        year: period.year,
        month: period.month,
        month_name: month_name(period.month).to_string(),
        start_date: period.start,
        end_date: period.end,
        week_start: period.week_start,
        grouped_plans: group_by_date(&plans),
        stats: PeriodStats::compute(&plans),
        available: available_periods(plan_years, period.year, period.month, today),
        plans,
    }
}
