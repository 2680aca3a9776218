pub mod error;
pub mod task;

pub use error::ModelError;
pub use task::{NewTask, Status as TaskStatus, Task, TaskPatch};
