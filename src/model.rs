//! Core data model for storecast.
//!
//! These types are the application's view of what lives in Staffbase:
//! managed channels reconstructed from their labels, the task lists hanging
//! off them, and the tasks parsed from an upload.

mod channel;
mod outcome;
mod task;
mod user;

pub use channel::{ManagedChannel, PostStatus, PostSummary, TaskListRef};
pub use outcome::{Outcome, Warning};
pub use task::TaskRecord;
pub use user::{MatchedUser, Verification};
