pub mod api;
mod error;

use std::sync::Arc;
use std::time::Duration;

use tokio::runtime::Runtime;
use tracing::{info, instrument};

pub use api::ServerConfig;
pub use error::ControllerError;

use crate::datastore::TaskDataStore;

pub struct TaskController {
    _api_runtime: Runtime,
}

impl TaskController {
    #[instrument(skip(datastore))]
    pub fn start<D>(datastore: Arc<D>, cfg: ServerConfig) -> Result<Self, ControllerError>
    where
        D: TaskDataStore + 'static,
    {
        Ok(Self {
            _api_runtime: api::build_runtime(cfg, datastore)?,
        })
    }

    pub fn stop(self) -> Result<(), ControllerError> {
        info!("Stopping api...");
        self._api_runtime
            .shutdown_timeout(Duration::from_millis(500));
        Ok(())
    }
}
