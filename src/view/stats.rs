use serde_derive::Serialize;

use super::dates::DateClassifier;
use crate::model::{Task, TaskStatus};

/// Summary counts over the whole, unfiltered collection.
///
/// The date counts skip finished tasks; `with_reminder` does not.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    pub total: usize,
    pub todo: usize,
    pub in_progress: usize,
    pub done: usize,
    pub overdue: usize,
    pub due_today: usize,
    pub due_soon: usize,
    pub with_reminder: usize,
}

impl Stats {
    pub fn compute(tasks: &[Task], clock: &DateClassifier) -> Self {
        let open = || tasks.iter().filter(|task| !task.is_done());
        let with_status = |status| tasks.iter().filter(|task| task.status == status).count();

        Self {
            total: tasks.len(),
            todo: with_status(TaskStatus::Todo),
            in_progress: with_status(TaskStatus::InProgress),
            done: with_status(TaskStatus::Done),
            overdue: open()
                .filter(|task| clock.is_overdue(task.due_date.as_deref()))
                .count(),
            due_today: open()
                .filter(|task| clock.is_due_today(task.due_date.as_deref()))
                .count(),
            due_soon: open()
                .filter(|task| clock.is_due_soon(task.due_date.as_deref()))
                .count(),
            with_reminder: tasks.iter().filter(|task| task.reminder).count(),
        }
    }
}
