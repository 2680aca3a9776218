use async_trait::async_trait;
use parking_lot::Mutex;

use super::super::TaskStorage;
use super::error::StorageError;
use crate::model::Task;

pub struct MemoryTaskStorage {
    tasks: Mutex<Vec<Task>>,
}

impl MemoryTaskStorage {
    pub fn new() -> Self {
        Self::with_tasks(Vec::new())
    }

    pub fn with_tasks(tasks: Vec<Task>) -> Self {
        Self {
            tasks: Mutex::new(tasks),
        }
    }
}

impl Default for MemoryTaskStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TaskStorage for MemoryTaskStorage {
    async fn list(&self) -> Result<Vec<Task>, StorageError> {
        Ok(self.tasks.lock().clone())
    }

    async fn append(&self, item: Task) -> Result<Task, StorageError> {
        self.tasks.lock().push(item.clone());
        Ok(item)
    }

    async fn replace<F>(&self, id: &str, mutator: F) -> Result<Option<Task>, StorageError>
    where
        F: FnOnce(&mut Task) + Send,
    {
        let mut tasks = self.tasks.lock();
        match tasks.iter_mut().find(|task| task.id == id) {
            Some(task) => {
                mutator(task);
                Ok(Some(task.clone()))
            }
            None => Ok(None),
        }
    }

    async fn remove(&self, id: &str) -> Result<bool, StorageError> {
        let mut tasks = self.tasks.lock();
        let before = tasks.len();
        tasks.retain(|task| task.id != id);
        Ok(tasks.len() != before)
    }
}
