mod datastore;
mod error;
mod storage;

pub use datastore::SerialDataStore;
pub use datastore::TaskDataStore;
pub use error::DataStoreError;
pub use storage::FileTaskStorage;
pub use storage::MemoryTaskStorage;
pub use storage::StorageError;
pub use storage::TaskStorage;
