//! Task records parsed from a task upload.

use jiff::civil::Date;
use serde::{Deserialize, Serialize};

/// One task to create in every matched store's task list.
///
/// Transient: exists only until it is submitted to the task API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskRecord {
    pub title: String,
    pub description: Option<String>,

    /// Calendar day the task is due. Rendered as an end-of-day UTC timestamp.
    pub due_on: Option<Date>,
}

impl TaskRecord {
    /// Due timestamp, `YYYY-MM-DDT23:59:59Z`.
    pub fn due_date(&self) -> Option<String> {
        self.due_on.map(|d| format!("{d}T23:59:59Z"))
    }

    /// Start timestamp derived from the due day, `YYYY-MM-DDT09:00:00Z`.
    pub fn start_date(&self) -> Option<String> {
        self.due_on.map(|d| format!("{d}T09:00:00Z"))
    }
}
