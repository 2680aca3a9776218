use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use uuid::Uuid;

use super::super::TaskStorage;
use super::error::StorageError;
use crate::model::Task;

/// Keeps the whole collection as one pretty-printed JSON array in a file.
///
/// A missing, empty or unparseable file reads as an empty collection. Writes go to a
/// sibling temporary file which is then renamed over the target, so readers never
/// observe a half-written array.
pub struct FileTaskStorage {
    path: PathBuf,
}

impl FileTaskStorage {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_all(&self) -> Result<Vec<Task>, StorageError> {
        let contents = match tokio::fs::read(&self.path).await {
            Ok(contents) => contents,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(StorageError::Io(self.path.clone(), err)),
        };
        if contents.iter().all(u8::is_ascii_whitespace) {
            return Ok(Vec::new());
        }

        match serde_json::from_slice::<Vec<Task>>(&contents) {
            Ok(tasks) => Ok(tasks),
            Err(err) => {
                warn!(
                    path = %self.path.display(),
                    reason = %err,
                    "Unreadable task file, treating it as empty."
                );
                Ok(Vec::new())
            }
        }
    }

    async fn write_all(&self, tasks: &[Task]) -> Result<(), StorageError> {
        let encoded = serde_json::to_vec_pretty(tasks)?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|err| StorageError::Io(parent.to_owned(), err))?;
        }

        let tmp_path = self.tmp_path();
        tokio::fs::write(&tmp_path, &encoded)
            .await
            .map_err(|err| StorageError::Io(tmp_path.clone(), err))?;
        if let Err(err) = tokio::fs::rename(&tmp_path, &self.path).await {
            let _ = tokio::fs::remove_file(&tmp_path).await;
            return Err(StorageError::Io(self.path.clone(), err));
        }

        debug!(path = %self.path.display(), count = tasks.len(), "Task file written.");
        Ok(())
    }

    /// A sibling path unique to one write, e.g. `tasks.json.<uuid>.tmp`.
    fn tmp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|name| name.to_os_string())
            .unwrap_or_else(|| "tasks.json".into());
        name.push(format!(".{}.tmp", Uuid::new_v4().simple()));
        self.path.with_file_name(name)
    }
}

#[async_trait]
impl TaskStorage for FileTaskStorage {
    async fn list(&self) -> Result<Vec<Task>, StorageError> {
        self.read_all().await
    }

    async fn append(&self, item: Task) -> Result<Task, StorageError> {
        let mut tasks = self.read_all().await?;
        tasks.push(item.clone());
        self.write_all(&tasks).await?;
        Ok(item)
    }

    async fn replace<F>(&self, id: &str, mutator: F) -> Result<Option<Task>, StorageError>
    where
        F: FnOnce(&mut Task) + Send,
    {
        let mut tasks = self.read_all().await?;
        let updated = match tasks.iter_mut().find(|task| task.id == id) {
            Some(task) => {
                mutator(task);
                task.clone()
            }
            None => return Ok(None),
        };
        self.write_all(&tasks).await?;
        Ok(Some(updated))
    }

    async fn remove(&self, id: &str) -> Result<bool, StorageError> {
        let mut tasks = self.read_all().await?;
        let before = tasks.len();
        tasks.retain(|task| task.id != id);
        if tasks.len() == before {
            return Ok(false);
        }
        self.write_all(&tasks).await?;
        Ok(true)
    }
}
