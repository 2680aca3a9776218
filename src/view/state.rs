use super::dates::DateClassifier;
use super::filter::{filter_tasks, ViewFilter};
use super::stats::Stats;
use crate::model::{Task, TaskStatus};

/// Everything that may change the client state.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Loading,
    Loaded(Vec<Task>),
    Created(Task),
    Updated(Task),
    Deleted(String),
    Failed(String),
    DismissError,
    Search(String),
    Filter(ViewFilter),
    ClearFilters,
}

/// Client-side copy of the board. It is only changed through `apply`, and may be
/// stale relative to the server between loads.
#[derive(Debug, Clone, Default)]
pub struct Board {
    tasks: Vec<Task>,
    search: String,
    filter: ViewFilter,
    loading: bool,
    error: Option<String>,
}

impl Board {
    pub fn new() -> Self {
        Self {
            loading: true,
            ..Default::default()
        }
    }

    pub fn apply(&mut self, action: Action) {
        match action {
            Action::Loading => {
                self.loading = true;
                self.error = None;
            }
            Action::Loaded(tasks) => {
                self.tasks = tasks;
                self.loading = false;
            }
            Action::Created(task) => self.tasks.push(task),
            Action::Updated(task) => {
                if let Some(slot) = self.tasks.iter_mut().find(|t| t.id == task.id) {
                    *slot = task;
                }
            }
            Action::Deleted(id) => self.tasks.retain(|t| t.id != id),
            Action::Failed(message) => {
                self.error = Some(message);
                self.loading = false;
            }
            Action::DismissError => self.error = None,
            Action::Search(term) => self.search = term,
            Action::Filter(filter) => self.filter = filter,
            Action::ClearFilters => {
                self.search.clear();
                self.filter = ViewFilter::default();
            }
        }
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn filter(&self) -> ViewFilter {
        self.filter
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn has_active_filters(&self) -> bool {
        !self.search.is_empty() || self.filter.is_active()
    }

    pub fn visible(&self, clock: &DateClassifier) -> Vec<&Task> {
        filter_tasks(&self.tasks, &self.search, &self.filter, clock)
    }

    /// Visible tasks split into one column per status, in board order.
    pub fn columns(&self, clock: &DateClassifier) -> Vec<(TaskStatus, Vec<&Task>)> {
        let visible = self.visible(clock);
        TaskStatus::ALL
            .iter()
            .map(|status| {
                let column = visible
                    .iter()
                    .copied()
                    .filter(|task| task.status == *status)
                    .collect();
                (*status, column)
            })
            .collect()
    }

    pub fn stats(&self, clock: &DateClassifier) -> Stats {
        Stats::compute(&self.tasks, clock)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{NewTask, TaskPatch};
    use crate::view::filter::{DateFilter, StatusFilter};
    use chrono::NaiveDate;

    fn clock() -> DateClassifier {
        DateClassifier::at(NaiveDate::from_ymd_opt(2024, 6, 15).unwrap())
    }

    fn loaded() -> (Board, Task, Task) {
        let milk = Task::new(NewTask {
            title: Some("Buy milk".into()),
            due_date: Some("2024-06-14".into()),
            ..Default::default()
        })
        .unwrap();
        let mut eggs = Task::new(NewTask::titled("Buy eggs")).unwrap();
        eggs.apply(&TaskPatch::status(TaskStatus::Done));

        let mut board = Board::new();
        board.apply(Action::Loaded(vec![milk.clone(), eggs.clone()]));
        (board, milk, eggs)
    }

    #[test]
    fn test_load_lifecycle() {
        let mut board = Board::new();
        assert!(board.is_loading());

        board.apply(Action::Failed("Failed to load tasks.".into()));
        assert!(!board.is_loading());
        assert_eq!(board.error(), Some("Failed to load tasks."));

        board.apply(Action::Loading);
        assert!(board.is_loading());
        assert_eq!(board.error(), None);

        board.apply(Action::Loaded(vec![]));
        assert!(!board.is_loading());
        assert!(board.tasks().is_empty());
    }

    #[test]
    fn test_local_mutations() {
        let (mut board, milk, eggs) = loaded();

        let bread = Task::new(NewTask::titled("Buy bread")).unwrap();
        board.apply(Action::Created(bread.clone()));
        assert_eq!(board.tasks().len(), 3);

        let mut changed = milk.clone();
        changed.apply(&TaskPatch::status(TaskStatus::InProgress));
        board.apply(Action::Updated(changed.clone()));
        assert_eq!(board.tasks()[0], changed);

        // unknown ids are ignored
        let stranger = Task::new(NewTask::titled("stranger")).unwrap();
        board.apply(Action::Updated(stranger));
        board.apply(Action::Deleted("missing".into()));
        assert_eq!(board.tasks().len(), 3);

        board.apply(Action::Deleted(eggs.id.clone()));
        assert_eq!(board.tasks(), &[changed, bread][..]);
    }

    #[test]
    fn test_filters_and_columns() {
        let (mut board, milk, eggs) = loaded();
        assert!(!board.has_active_filters());

        board.apply(Action::Search("BUY".into()));
        board.apply(Action::Filter(ViewFilter {
            status: StatusFilter::All,
            date: DateFilter::Overdue,
        }));
        assert!(board.has_active_filters());
        assert_eq!(board.visible(&clock()), vec![&milk]);

        let columns = board.columns(&clock());
        assert_eq!(columns.len(), 3);
        assert_eq!(columns[0], (TaskStatus::Todo, vec![&milk]));
        assert!(columns[2].1.is_empty());

        board.apply(Action::ClearFilters);
        assert!(!board.has_active_filters());
        assert_eq!(board.visible(&clock()), vec![&milk, &eggs]);
    }

    #[test]
    fn test_stats_ignore_filters() {
        let (mut board, _, _) = loaded();
        board.apply(Action::Search("nothing matches".into()));

        let stats = board.stats(&clock());
        assert_eq!(stats.total, 2);
        assert_eq!(stats.overdue, 1);
        assert_eq!(stats.done, 1);
    }
}
