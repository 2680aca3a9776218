use std::path::PathBuf;
use thiserror::*;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("io error on {0}: {1}")]
    Io(PathBuf, std::io::Error),

    #[error("unable to encode tasks: {0}")]
    Encode(#[from] serde_json::Error),
}
