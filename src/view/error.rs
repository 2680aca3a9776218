use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ViewError {
    #[error("unknown status filter: {0:?}")]
    UnknownStatusFilter(String),
    #[error("unknown date filter: {0:?}")]
    UnknownDateFilter(String),
}
