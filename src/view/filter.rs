use serde_derive::{Deserialize, Serialize};
use std::str::FromStr;

use super::dates::DateClassifier;
use super::error::ViewError;
use crate::model::{Task, TaskStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum StatusFilter {
    All,
    Todo,
    InProgress,
    Done,
}

impl StatusFilter {
    pub fn matches(&self, status: TaskStatus) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Todo => status == TaskStatus::Todo,
            StatusFilter::InProgress => status == TaskStatus::InProgress,
            StatusFilter::Done => status == TaskStatus::Done,
        }
    }
}

impl Default for StatusFilter {
    fn default() -> Self {
        StatusFilter::All
    }
}

impl FromStr for StatusFilter {
    type Err = ViewError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(StatusFilter::All),
            "todo" => Ok(StatusFilter::Todo),
            "in-progress" => Ok(StatusFilter::InProgress),
            "done" => Ok(StatusFilter::Done),
            other => Err(ViewError::UnknownStatusFilter(other.to_string())),
        }
    }
}

/// Due-date predicates. They are independent checks, not a partition: a task due
/// tomorrow matches both `DueSoon` and `Upcoming`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum DateFilter {
    All,
    Overdue,
    DueToday,
    DueSoon,
    Upcoming,
    NoDate,
}

impl DateFilter {
    pub fn matches(&self, due_date: Option<&str>, clock: &DateClassifier) -> bool {
        let due_date = match due_date.filter(|date| !date.trim().is_empty()) {
            Some(date) => date,
            None => return matches!(self, DateFilter::All | DateFilter::NoDate),
        };

        match self {
            DateFilter::All => true,
            DateFilter::Overdue => clock.is_overdue(Some(due_date)),
            DateFilter::DueToday => clock.is_due_today(Some(due_date)),
            DateFilter::DueSoon => clock.is_due_soon(Some(due_date)),
            DateFilter::Upcoming => clock.is_upcoming(Some(due_date)),
            DateFilter::NoDate => false,
        }
    }
}

impl Default for DateFilter {
    fn default() -> Self {
        DateFilter::All
    }
}

impl FromStr for DateFilter {
    type Err = ViewError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(DateFilter::All),
            "overdue" => Ok(DateFilter::Overdue),
            "due-today" => Ok(DateFilter::DueToday),
            "due-soon" => Ok(DateFilter::DueSoon),
            "upcoming" => Ok(DateFilter::Upcoming),
            "no-date" => Ok(DateFilter::NoDate),
            other => Err(ViewError::UnknownDateFilter(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct ViewFilter {
    #[serde(default)]
    pub status: StatusFilter,
    #[serde(default)]
    pub date: DateFilter,
}

impl ViewFilter {
    pub fn is_active(&self) -> bool {
        self.status != StatusFilter::All || self.date != DateFilter::All
    }
}

/// Visible subset of `tasks` for a search term and filter pair, in original order.
pub fn filter_tasks<'a>(
    tasks: &'a [Task],
    search: &str,
    filter: &ViewFilter,
    clock: &DateClassifier,
) -> Vec<&'a Task> {
    let needle = search.trim().to_lowercase();

    tasks
        .iter()
        .filter(|task| needle.is_empty() || task.title.to_lowercase().contains(&needle))
        .filter(|task| filter.status.matches(task.status))
        .filter(|task| filter.date.matches(task.due_date.as_deref(), clock))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate, Utc};

    fn clock() -> DateClassifier {
        DateClassifier::at(NaiveDate::from_ymd_opt(2024, 6, 15).unwrap())
    }

    fn task(title: &str, status: TaskStatus, due_in: Option<i64>) -> Task {
        Task {
            id: title.to_lowercase().replace(' ', "-"),
            title: title.to_string(),
            status,
            due_date: due_in.map(|days| {
                (clock().today() + Duration::days(days))
                    .format("%Y-%m-%d")
                    .to_string()
            }),
            reminder: false,
            created_at: Utc::now(),
        }
    }

    fn titles(tasks: Vec<&Task>) -> Vec<&str> {
        tasks.into_iter().map(|t| t.title.as_str()).collect()
    }

    fn by_date(tasks: &[Task], date: DateFilter) -> Vec<&str> {
        let filter = ViewFilter {
            status: StatusFilter::All,
            date,
        };
        titles(filter_tasks(tasks, "", &filter, &clock()))
    }

    #[test]
    fn test_search_and_overdue_compose() {
        let tasks = vec![
            task("Buy milk", TaskStatus::Todo, Some(-1)),
            task("Buy eggs", TaskStatus::Done, None),
        ];

        let all = filter_tasks(&tasks, "buy", &ViewFilter::default(), &clock());
        assert_eq!(titles(all), vec!["Buy milk", "Buy eggs"]);

        let overdue = ViewFilter {
            status: StatusFilter::All,
            date: DateFilter::Overdue,
        };
        assert_eq!(
            titles(filter_tasks(&tasks, "buy", &overdue, &clock())),
            vec!["Buy milk"]
        );
    }

    #[test]
    fn test_search_is_trimmed_and_case_insensitive() {
        let tasks = vec![
            task("Write REPORT", TaskStatus::Todo, None),
            task("Call mom", TaskStatus::Todo, None),
        ];
        let res = filter_tasks(&tasks, "  report ", &ViewFilter::default(), &clock());
        assert_eq!(titles(res), vec!["Write REPORT"]);

        let res = filter_tasks(&tasks, "   ", &ViewFilter::default(), &clock());
        assert_eq!(res.len(), 2, "blank search keeps everything");
    }

    #[test]
    fn test_status_filter() {
        let tasks = vec![
            task("a", TaskStatus::Todo, None),
            task("b", TaskStatus::InProgress, None),
            task("c", TaskStatus::Done, None),
            task("d", TaskStatus::InProgress, None),
        ];
        let filter = ViewFilter {
            status: StatusFilter::InProgress,
            ..Default::default()
        };
        assert_eq!(titles(filter_tasks(&tasks, "", &filter, &clock())), vec!["b", "d"]);
    }

    #[test]
    fn test_date_filters_overlap() {
        let tasks = vec![
            task("yesterday", TaskStatus::Todo, Some(-1)),
            task("today", TaskStatus::Todo, Some(0)),
            task("tomorrow", TaskStatus::Todo, Some(1)),
            task("next week", TaskStatus::Todo, Some(7)),
            task("someday", TaskStatus::Todo, None),
        ];

        assert_eq!(by_date(&tasks, DateFilter::Overdue), vec!["yesterday"]);
        assert_eq!(by_date(&tasks, DateFilter::DueToday), vec!["today"]);
        assert_eq!(
            by_date(&tasks, DateFilter::DueSoon),
            vec!["today", "tomorrow"]
        );
        assert_eq!(
            by_date(&tasks, DateFilter::Upcoming),
            vec!["tomorrow", "next week"]
        );
        assert_eq!(by_date(&tasks, DateFilter::NoDate), vec!["someday"]);
        assert_eq!(by_date(&tasks, DateFilter::All).len(), 5);
    }

    #[test]
    fn test_unparseable_due_date_is_excluded() {
        let mut broken = task("broken", TaskStatus::Todo, None);
        broken.due_date = Some("next tuesday".into());
        let tasks = vec![broken];

        for date in [
            DateFilter::Overdue,
            DateFilter::DueToday,
            DateFilter::DueSoon,
            DateFilter::Upcoming,
            DateFilter::NoDate,
        ] {
            let filter = ViewFilter {
                status: StatusFilter::All,
                date,
            };
            assert!(filter_tasks(&tasks, "", &filter, &clock()).is_empty());
        }
    }

    #[test]
    fn test_parse_filters() {
        assert_eq!("in-progress".parse::<StatusFilter>().unwrap(), StatusFilter::InProgress);
        assert_eq!("no-date".parse::<DateFilter>().unwrap(), DateFilter::NoDate);
        assert!("later".parse::<DateFilter>().is_err());
        assert!("blocked".parse::<StatusFilter>().is_err());
    }
}
