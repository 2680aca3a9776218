use thiserror::Error;

// Validation errors raised while building or changing a task
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ModelError {
    #[error("Task title is required")]
    TitleRequired,
    #[error("Task title cannot be empty")]
    EmptyTitle,
    #[error("Unknown task status: {0:?}.")]
    UnknownStatus(String),
}
