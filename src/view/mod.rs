//! Presentation data derived from an in-memory task collection.

pub mod dates;
mod error;
pub mod filter;
pub mod state;
pub mod stats;

pub use dates::{format_date, DateClassifier, DueState};
pub use error::ViewError;
pub use filter::{filter_tasks, DateFilter, StatusFilter, ViewFilter};
pub use state::{Action, Board};
pub use stats::Stats;
