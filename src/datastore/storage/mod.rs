mod error;
mod file;
mod memory;

use async_trait::async_trait;

use crate::model::Task;
pub use error::StorageError;
pub use file::FileTaskStorage;
pub use memory::MemoryTaskStorage;

// Storage
//
// Every mutating call reads the whole collection, changes it and writes it back.
// Implementations do not serialise concurrent callers; `SerialDataStore` does.
#[async_trait]
pub trait TaskStorage: Sync + Send + 'static {
    async fn list(&self) -> Result<Vec<Task>, StorageError>;
    async fn append(&self, item: Task) -> Result<Task, StorageError>;
    async fn replace<F>(&self, id: &str, mutator: F) -> Result<Option<Task>, StorageError>
    where
        F: FnOnce(&mut Task) + Send;
    async fn remove(&self, id: &str) -> Result<bool, StorageError>;
}
