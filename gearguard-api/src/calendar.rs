//! Month view of scheduled maintenance.
//!
//! The grid is always six weeks of seven days, starting on the Sunday on or
//! before the first of the month, so every month renders with the same
//! shape. Events land in a cell by the UTC calendar day of their scheduled
//! date; the time of day is ignored.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::models::{EnrichedMaintenanceRequest, RequestType, Stage};

pub const ALL_TECHNICIANS: &str = "All Technicians";

const WEEKS: usize = 6;
const GRID_DAYS: i64 = (WEEKS * 7) as i64;
const MONTH_NAMES: [&str; 12] = [
    "January", "February", "March", "April", "May", "June", "July", "August", "September",
    "October", "November", "December",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CalendarMonth {
    pub year: i32,
    /// 1 through 12.
    pub month: u32,
}

impl CalendarMonth {
    /// `None` unless the whole six-week grid of the month is a valid date range.
    pub fn new(year: i32, month: u32) -> Option<Self> {
        let shown = CalendarMonth { year, month };
        grid_start(shown)?.checked_add_signed(Duration::days(GRID_DAYS - 1))?;
        Some(shown)
    }

    pub fn containing(date: NaiveDate) -> Self {
        CalendarMonth {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn first_day(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
    }

    pub fn prev(&self) -> Self {
        if self.month == 1 {
            CalendarMonth { year: self.year - 1, month: 12 }
        } else {
            CalendarMonth { year: self.year, month: self.month - 1 }
        }
    }

    pub fn next(&self) -> Self {
        if self.month == 12 {
            CalendarMonth { year: self.year + 1, month: 1 }
        } else {
            CalendarMonth { year: self.year, month: self.month + 1 }
        }
    }

    /// "March 2025".
    pub fn label(&self) -> String {
        format!("{} {}", MONTH_NAMES[(self.month as usize + 11) % 12], self.year)
    }
}

impl FromStr for CalendarMonth {
    type Err = String;

    /// Parses `YYYY-MM`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || format!("expected a month as YYYY-MM, got '{}'", s);
        let (year, month) = s.trim().split_once('-').ok_or_else(invalid)?;
        let year: i32 = year.parse().map_err(|_| invalid())?;
        let month: u32 = month.parse().map_err(|_| invalid())?;
        CalendarMonth::new(year, month).ok_or_else(invalid)
    }
}

impl fmt::Display for CalendarMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// Which technician's events the grid shows.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum TechnicianFilter {
    #[default]
    All,
    Named(String),
}

impl TechnicianFilter {
    pub fn matches(&self, technician_name: Option<&str>) -> bool {
        match self {
            TechnicianFilter::All => true,
            TechnicianFilter::Named(name) => technician_name == Some(name.as_str()),
        }
    }
}

impl From<&str> for TechnicianFilter {
    fn from(value: &str) -> Self {
        let value = value.trim();
        if value.is_empty() || value == ALL_TECHNICIANS {
            TechnicianFilter::All
        } else {
            TechnicianFilter::Named(value.to_string())
        }
    }
}

impl From<Option<&str>> for TechnicianFilter {
    fn from(value: Option<&str>) -> Self {
        value.map(TechnicianFilter::from).unwrap_or_default()
    }
}

impl fmt::Display for TechnicianFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TechnicianFilter::All => f.write_str(ALL_TECHNICIANS),
            TechnicianFilter::Named(name) => f.write_str(name),
        }
    }
}

/// What a calendar cell shows for one request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CalendarEvent {
    pub id: i64,
    pub subject: String,
    pub equipment_name: Option<String>,
    pub technician_name: Option<String>,
    pub request_type: Option<RequestType>,
    pub stage: Option<Stage>,
    pub scheduled_date: Option<DateTime<Utc>>,
}

impl CalendarEvent {
    pub fn day(&self) -> Option<NaiveDate> {
        self.scheduled_date.map(|d| d.date_naive())
    }
}

impl From<&EnrichedMaintenanceRequest> for CalendarEvent {
    fn from(enriched: &EnrichedMaintenanceRequest) -> Self {
        CalendarEvent {
            id: enriched.request.id,
            subject: enriched.request.subject.clone(),
            equipment_name: enriched.equipment_name.clone(),
            technician_name: enriched.technician_name.clone(),
            request_type: enriched.request.request_type,
            stage: enriched.request.stage,
            scheduled_date: enriched.request.scheduled_date,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CalendarDay {
    pub date: NaiveDate,
    pub in_month: bool,
    pub is_today: bool,
    pub events: Vec<CalendarEvent>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CalendarGrid {
    pub month: CalendarMonth,
    pub label: String,
    pub weeks: Vec<Vec<CalendarDay>>,
}

impl CalendarGrid {
    pub fn days(&self) -> impl Iterator<Item = &CalendarDay> {
        self.weeks.iter().flatten()
    }

    pub fn day(&self, date: NaiveDate) -> Option<&CalendarDay> {
        self.days().find(|d| d.date == date)
    }
}

/// The Sunday on or before the first of the month.
pub fn grid_start(month: CalendarMonth) -> Option<NaiveDate> {
    let first = month.first_day()?;
    first.checked_sub_signed(Duration::days(first.weekday().num_days_from_sunday() as i64))
}

/// Lays `events` out on the month grid. Within a cell events keep their
/// input order. `None` when the grid would leave the supported date range,
/// which `CalendarMonth::new` already rules out.
pub fn month_grid(
    month: CalendarMonth,
    events: &[CalendarEvent],
    filter: &TechnicianFilter,
    today: NaiveDate,
) -> Option<CalendarGrid> {
    let start = grid_start(month)?;
    let mut weeks = Vec::with_capacity(WEEKS);
    for week in 0..WEEKS {
        let mut days = Vec::with_capacity(7);
        for weekday in 0..7 {
            let date = start.checked_add_signed(Duration::days((week * 7 + weekday) as i64))?;
            days.push(CalendarDay {
                date,
                in_month: date.month() == month.month && date.year() == month.year,
                is_today: date == today,
                events: events
                    .iter()
                    .filter(|e| e.day() == Some(date))
                    .filter(|e| filter.matches(e.technician_name.as_deref()))
                    .cloned()
                    .collect(),
            });
        }
        weeks.push(days);
    }

    Some(CalendarGrid {
        month,
        label: month.label(),
        weeks,
    })
}

/// Choices for the technician picker: the "All Technicians" entry followed
/// by every named technician, sorted and deduplicated.
pub fn technician_options(events: &[CalendarEvent]) -> Vec<String> {
    let names: BTreeSet<&str> = events
        .iter()
        .filter_map(|e| e.technician_name.as_deref())
        .collect();
    std::iter::once(ALL_TECHNICIANS)
        .chain(names)
        .map(str::to_string)
        .collect()
}
