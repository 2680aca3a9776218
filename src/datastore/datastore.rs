use async_trait::async_trait;
use std::sync::Arc;
use tracing::{info, warn};

use super::{error::DataStoreError, storage::TaskStorage};
use crate::model::{NewTask, Task, TaskPatch};

#[async_trait]
pub trait TaskDataStore: Send + Sync {
    async fn list(&self) -> Result<Vec<Task>, DataStoreError>;
    async fn get(&self, id: &str) -> Result<Option<Task>, DataStoreError>;
    async fn create(&self, new_task: NewTask) -> Result<Task, DataStoreError>;
    async fn update(&self, id: &str, patch: TaskPatch) -> Result<Task, DataStoreError>;
    async fn delete(&self, id: &str) -> Result<(), DataStoreError>;
}

/// Runs every storage operation under one async mutex, so the read-modify-write
/// cycle of a mutation never interleaves with another request's.
pub struct SerialDataStore<S: TaskStorage> {
    storage: Arc<tokio::sync::Mutex<S>>,
}

impl<S> SerialDataStore<S>
where
    S: TaskStorage,
{
    pub fn new(storage: S) -> Self {
        Self {
            storage: Arc::new(tokio::sync::Mutex::new(storage)),
        }
    }
}

impl<S: TaskStorage> Clone for SerialDataStore<S> {
    fn clone(&self) -> Self {
        Self {
            storage: self.storage.clone(),
        }
    }
}

#[async_trait]
impl<S> TaskDataStore for SerialDataStore<S>
where
    S: TaskStorage,
{
    async fn list(&self) -> Result<Vec<Task>, DataStoreError> {
        Ok(self.storage.lock().await.list().await?)
    }

    async fn get(&self, id: &str) -> Result<Option<Task>, DataStoreError> {
        let tasks = self.storage.lock().await.list().await?;
        Ok(tasks.into_iter().find(|task| task.id == id))
    }

    async fn create(&self, new_task: NewTask) -> Result<Task, DataStoreError> {
        let task = Task::new(new_task)?;
        let task = self.storage.lock().await.append(task).await?;
        info!(id = %task.id, "Task created.");
        Ok(task)
    }

    async fn update(&self, id: &str, patch: TaskPatch) -> Result<Task, DataStoreError> {
        patch.validate()?;
        let updated = self
            .storage
            .lock()
            .await
            .replace(id, |task| task.apply(&patch))
            .await?;

        match updated {
            Some(task) => {
                info!(id = %task.id, "Task updated.");
                Ok(task)
            }
            None => {
                warn!(id = %id, "Update of unknown task.");
                Err(DataStoreError::NotFound(id.to_string()))
            }
        }
    }

    async fn delete(&self, id: &str) -> Result<(), DataStoreError> {
        if self.storage.lock().await.remove(id).await? {
            info!(id = %id, "Task deleted.");
            Ok(())
        } else {
            warn!(id = %id, "Delete of unknown task.");
            Err(DataStoreError::NotFound(id.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datastore::storage::{FileTaskStorage, MemoryTaskStorage};
    use crate::model::{ModelError, TaskStatus};

    fn scratch_path() -> std::path::PathBuf {
        std::env::temp_dir()
            .join(format!("taskboard-{}", uuid::Uuid::new_v4()))
            .join("tasks.json")
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 1)]
    async fn test_all() {
        let ds = SerialDataStore::new(MemoryTaskStorage::new());

        // no tasks in the beginning
        assert!(ds.list().await.unwrap().is_empty());

        // create, then list returns the record unchanged
        let task = ds.create(NewTask::titled("  X  ")).await.unwrap();
        assert_eq!(task.title, "X");
        assert_eq!(task.status, TaskStatus::Todo);
        assert_eq!(task.due_date, None);
        assert!(!task.reminder);
        assert_eq!(ds.list().await.unwrap(), vec![task.clone()]);

        let task2 = ds.create(NewTask::titled("Y")).await.unwrap();

        // partial update only touches status
        let updated = ds
            .update(&task.id, TaskPatch::status(TaskStatus::Done))
            .await
            .unwrap();
        assert_eq!(updated.status, TaskStatus::Done);
        assert_eq!(updated.title, task.title);
        assert_eq!(updated.due_date, task.due_date);
        assert_eq!(updated.reminder, task.reminder);

        // other task does not change
        assert_eq!(ds.get(&task2.id).await.unwrap(), Some(task2.clone()));

        // delete removes exactly one record
        ds.delete(&task.id).await.unwrap();
        let items = ds.list().await.unwrap();
        assert_eq!(items, vec![task2]);
        assert_eq!(ds.get(&task.id).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_validation() {
        let ds = SerialDataStore::new(MemoryTaskStorage::new());

        let missing: NewTask = serde_json::from_str(r#"{"status": "todo"}"#).unwrap();
        assert!(matches!(
            ds.create(missing).await.unwrap_err(),
            DataStoreError::Validation(ModelError::TitleRequired)
        ));
        assert!(matches!(
            ds.create(NewTask::titled("   ")).await.unwrap_err(),
            DataStoreError::Validation(ModelError::TitleRequired)
        ));

        let task = ds.create(NewTask::titled("keep")).await.unwrap();
        let blank = TaskPatch {
            title: Some(" ".into()),
            ..Default::default()
        };
        assert!(matches!(
            ds.update(&task.id, blank).await.unwrap_err(),
            DataStoreError::Validation(ModelError::EmptyTitle)
        ));
        assert_eq!(ds.get(&task.id).await.unwrap().unwrap().title, "keep");
        assert!(ds.list().await.unwrap().len() == 1);
    }

    #[tokio::test]
    async fn test_not_found_leaves_collection() {
        let ds = SerialDataStore::new(MemoryTaskStorage::new());
        let task = ds.create(NewTask::titled("only")).await.unwrap();

        assert!(matches!(
            ds.update("missing", TaskPatch::status(TaskStatus::Done))
                .await
                .unwrap_err(),
            DataStoreError::NotFound(_)
        ));
        assert!(matches!(
            ds.delete("missing").await.unwrap_err(),
            DataStoreError::NotFound(_)
        ));
        assert_eq!(ds.list().await.unwrap(), vec![task]);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_mutations_do_not_lose_records() {
        // GIVEN
        let ds = SerialDataStore::new(FileTaskStorage::new(scratch_path()));
        let doomed = ds.create(NewTask::titled("doomed")).await.unwrap();

        // WHEN
        let mut handles = vec![];
        for n in 0..32 {
            let ds = ds.clone();
            handles.push(tokio::spawn(async move {
                ds.create(NewTask::titled(&format!("task {}", n))).await
            }));
        }
        let deleter = {
            let ds = ds.clone();
            let id = doomed.id.clone();
            tokio::spawn(async move { ds.delete(&id).await })
        };
        for res in futures::future::join_all(handles).await {
            res.unwrap().unwrap();
        }
        deleter.await.unwrap().unwrap();

        // THEN
        let items = ds.list().await.unwrap();
        assert_eq!(items.len(), 32, "every concurrent create survives");
        assert!(items.iter().all(|task| task.id != doomed.id));
    }
}
