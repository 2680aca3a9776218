use thiserror::*;

use super::storage::StorageError;
use crate::model::ModelError;

#[derive(Debug, Error)]
pub enum DataStoreError {
    #[error("{0}")]
    Validation(#[from] ModelError),

    #[error("task not found: {0}")]
    NotFound(String),

    #[error("storage returned error: {0}")]
    Storage(#[from] StorageError),
}
