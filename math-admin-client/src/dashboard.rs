//! Figures shown on the dashboard: pupils per grade and weekly sign-ups.

use crate::backend::AdminBackend;
use crate::error::Result;
use crate::language::Language;
use crate::models::CountResponse;
use chrono::{Datelike, NaiveDate};
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use strum_macros::Display;

/// Weekly counts keyed by month, `"MM-YYYY" -> [week 1, week 2, ..]`.
pub type WeeklyCounts = BTreeMap<String, Vec<u64>>;

#[derive(Debug, Clone, PartialEq)]
pub struct GradeShare {
    pub label: String,
    pub total: u64,
    /// Share of all pupils, rounded to two decimals.
    pub percent: f64,
}

pub fn grade_label(grade: usize, language: Language) -> String {
    match language {
        Language::Vi => format!("Lớp {}", grade),
        Language::En => format!("Grade {}", grade),
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// One share per grade, in grade order starting at grade 1.
pub fn grade_shares(total_pupils: u64, per_grade: &[u64], language: Language) -> Vec<GradeShare> {
    per_grade
        .iter()
        .enumerate()
        .map(|(index, &total)| GradeShare {
            label: grade_label(index + 1, language),
            total,
            percent: if total_pupils == 0 {
                0.0
            } else {
                round2(total as f64 / total_pupils as f64 * 100.0)
            },
        })
        .collect()
}

/// Whole months covered by a date range picker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl MonthRange {
    pub fn is_single_month(&self) -> bool {
        self.start.year() == self.end.year() && self.start.month() == self.end.month()
    }

    /// `startDate`/`endDate` query parameters, `YYYY-MM-DD`.
    pub fn params(&self) -> Vec<(&'static str, String)> {
        vec![
            ("startDate", self.start.format("%Y-%m-%d").to_string()),
            ("endDate", self.end.format("%Y-%m-%d").to_string()),
        ]
    }
}

fn first_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

fn last_of_month(date: NaiveDate) -> NaiveDate {
    let (year, month) = match date.month() {
        12 => (date.year() + 1, 1),
        month => (date.year(), month + 1),
    };
    NaiveDate::from_ymd_opt(year, month, 1)
        .and_then(|next| next.pred_opt())
        .unwrap_or(date)
}

/// From the first day of `start`'s month to the last day of `end`'s month.
/// Swapped bounds are put back in order.
pub fn month_range(start: NaiveDate, end: NaiveDate) -> MonthRange {
    let (start, end) = if start <= end { (start, end) } else { (end, start) };
    MonthRange {
        start: first_of_month(start),
        end: last_of_month(end),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum Series {
    NewParent,
    NewPupil,
}

impl Series {
    pub fn label(self, language: Language) -> &'static str {
        match (self, language) {
            (Series::NewParent, Language::Vi) => "Phụ huynh mới",
            (Series::NewParent, Language::En) => "New parent",
            (Series::NewPupil, Language::Vi) => "Học sinh mới",
            (Series::NewPupil, Language::En) => "New pupil",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeeklyPoint {
    pub label: String,
    pub total: u64,
    pub series: Series,
    /// Series name in the requested language.
    pub series_label: &'static str,
}

/// `(year, month)` of a `"MM-YYYY"` key; unparsable keys sort last.
fn month_key(key: &str) -> (i32, u32) {
    let mut parts = key.trim().splitn(2, '-');
    let month = parts.next().and_then(|m| m.parse().ok());
    let year = parts.next().and_then(|y| y.parse().ok());
    match (year, month) {
        (Some(year), Some(month)) => (year, month),
        _ => (i32::MAX, u32::MAX),
    }
}

fn week_label(week: usize, month: &str, single_month: bool, language: Language) -> String {
    match (single_month, language) {
        (true, Language::Vi) => format!("Tuần {}", week),
        (true, Language::En) => format!("Week {}", week),
        (false, Language::Vi) => format!("T{} ({})", week, month),
        (false, Language::En) => format!("W{} ({})", week, month),
    }
}

fn series_points(
    range: &MonthRange,
    counts: &WeeklyCounts,
    series: Series,
    language: Language,
) -> Vec<WeeklyPoint> {
    let mut months: Vec<_> = counts.iter().collect();
    months.sort_by_key(|(month, _)| month_key(month));

    months
        .into_iter()
        .flat_map(|(month, weeks)| {
            weeks.iter().enumerate().map(move |(index, &total)| WeeklyPoint {
                label: week_label(index + 1, month, range.is_single_month(), language),
                total,
                series,
                series_label: series.label(language),
            })
        })
        .collect()
}

/// Chart points for new parents followed by new pupils, each in
/// chronological order.
pub fn weekly_series(
    range: &MonthRange,
    users: &WeeklyCounts,
    pupils: &WeeklyCounts,
    language: Language,
) -> Vec<WeeklyPoint> {
    let mut points = series_points(range, users, Series::NewParent, language);
    points.extend(series_points(range, pupils, Series::NewPupil, language));
    points
}

/// Responses may or may not be wrapped in `{ data: .. }`.
fn unwrap_data(value: Value) -> Value {
    match value {
        Value::Object(mut map) if map.contains_key("data") => {
            map.remove("data").unwrap_or(Value::Null)
        }
        other => other,
    }
}

pub fn parse_weekly(value: Value) -> Result<WeeklyCounts> {
    match unwrap_data(value) {
        Value::Null => Ok(WeeklyCounts::new()),
        data => Ok(serde_json::from_value(data)?),
    }
}

#[derive(Debug, Deserialize)]
struct GradeTotal {
    #[serde(default, deserialize_with = "crate::models::count_value")]
    total: u64,
}

pub fn parse_grade_totals(value: Value) -> Result<Vec<u64>> {
    match unwrap_data(value) {
        Value::Null => Ok(vec![]),
        data => Ok(serde_json::from_value::<Vec<GradeTotal>>(data)?
            .into_iter()
            .map(|grade| grade.total)
            .collect()),
    }
}

/// Loads dashboard figures from the API.
pub struct DashboardService<B: AdminBackend + ?Sized> {
    backend: Arc<B>,
}

impl<B: AdminBackend + ?Sized> DashboardService<B> {
    pub fn new(backend: Arc<B>) -> Self {
        Self { backend }
    }

    pub async fn grade_distribution(&self, language: Language) -> Result<Vec<GradeShare>> {
        let (count, per_grade) = futures::try_join!(
            self.backend.get_json("pupil/countAll", &[]),
            self.backend.get_json("pupil/countByGrade", &[]),
        )?;
        let total = match count {
            Value::Null => 0,
            count => serde_json::from_value::<CountResponse>(count)?.count,
        };
        Ok(grade_shares(total, &parse_grade_totals(per_grade)?, language))
    }

    pub async fn weekly_signups(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        language: Language,
    ) -> Result<Vec<WeeklyPoint>> {
        let range = month_range(start, end);
        let params = range.params();
        let (users, pupils) = futures::try_join!(
            self.backend.get_json("user/countByWeek", &params),
            self.backend.get_json("pupil/countByWeek", &params),
        )?;
        log::debug!("Weekly sign-ups from {} to {}", range.start, range.end);
        Ok(weekly_series(
            &range,
            &parse_weekly(users)?,
            &parse_weekly(pupils)?,
            language,
        ))
    }
}
