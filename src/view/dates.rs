//! Due-date classification on calendar-day granularity.
//!
//! Every predicate is evaluated against a fixed "today" so results are deterministic;
//! `DateClassifier::now` takes it from the local clock.

use chrono::{DateTime, Local, NaiveDate};

/// A due date is "soon" when it falls between today and this many days ahead, inclusive.
pub const DUE_SOON_DAYS: i64 = 3;

const ISO_DATE: &str = "%Y-%m-%d";
const DISPLAY_DATE: &str = "%b %d, %Y";

/// Urgency of a single due date, most urgent first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DueState {
    Overdue,
    DueToday,
    DueSoon,
    Upcoming,
    Unset,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateClassifier {
    today: NaiveDate,
}

impl DateClassifier {
    pub fn at(today: NaiveDate) -> Self {
        Self { today }
    }

    pub fn now() -> Self {
        Self::at(Local::now().date_naive())
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    /// Today as `YYYY-MM-DD`, the earliest date a new task may be due.
    pub fn today_string(&self) -> String {
        self.today.format(ISO_DATE).to_string()
    }

    fn days_until(&self, date: Option<&str>) -> Option<i64> {
        date.and_then(parse_due_date)
            .map(|date| date.signed_duration_since(self.today).num_days())
    }

    /// Strictly before today. A date equal to today is never overdue.
    pub fn is_overdue(&self, date: Option<&str>) -> bool {
        matches!(self.days_until(date), Some(days) if days < 0)
    }

    pub fn is_due_today(&self, date: Option<&str>) -> bool {
        self.days_until(date) == Some(0)
    }

    pub fn is_due_soon(&self, date: Option<&str>) -> bool {
        matches!(self.days_until(date), Some(days) if (0..=DUE_SOON_DAYS).contains(&days))
    }

    /// Strictly after today.
    pub fn is_upcoming(&self, date: Option<&str>) -> bool {
        matches!(self.days_until(date), Some(days) if days > 0)
    }

    pub fn classify(&self, date: Option<&str>) -> DueState {
        match self.days_until(date) {
            None => DueState::Unset,
            Some(days) if days < 0 => DueState::Overdue,
            Some(0) => DueState::DueToday,
            Some(days) if days <= DUE_SOON_DAYS => DueState::DueSoon,
            Some(_) => DueState::Upcoming,
        }
    }
}

impl Default for DateClassifier {
    fn default() -> Self {
        Self::now()
    }
}

/// Parses `YYYY-MM-DD`, or takes the calendar date of an RFC3339 timestamp.
/// Blank and unparseable input yield `None`.
pub fn parse_due_date(date: &str) -> Option<NaiveDate> {
    let date = date.trim();
    if date.is_empty() {
        return None;
    }
    NaiveDate::parse_from_str(date, ISO_DATE)
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(date).ok().map(|dt| dt.date_naive()))
}

/// `Dec 31, 2024` for a parseable date, the input itself otherwise, `""` for no date.
pub fn format_date(date: Option<&str>) -> String {
    match date {
        None => String::new(),
        Some(raw) if raw.is_empty() => String::new(),
        Some(raw) => match parse_due_date(raw) {
            Some(parsed) => parsed.format(DISPLAY_DATE).to_string(),
            None => raw.to_string(),
        },
    }
}

pub fn today() -> String {
    DateClassifier::now().today_string()
}

pub fn is_overdue(date: Option<&str>) -> bool {
    DateClassifier::now().is_overdue(date)
}

pub fn is_due_soon(date: Option<&str>) -> bool {
    DateClassifier::now().is_due_soon(date)
}
