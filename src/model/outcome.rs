//! Two-tier operation results.
//!
//! Fatal failures travel as `Err`. Everything an operation can shrug off
//! (a missing store project, a task the token may not create, a rename that
//! did not stick) is collected as a [`Warning`] on an otherwise successful
//! [`Outcome`].

use std::fmt;

/// A successful operation, possibly with side effects that did not happen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<T> {
    Complete(T),
    Degraded(T, Vec<Warning>),
}

impl<T> Outcome<T> {
    /// Wrap a value, degraded if any warnings were collected.
    pub fn new(value: T, warnings: Vec<Warning>) -> Self {
        if warnings.is_empty() {
            Self::Complete(value)
        } else {
            Self::Degraded(value, warnings)
        }
    }

    pub fn into_parts(self) -> (T, Vec<Warning>) {
        match self {
            Self::Complete(value) => (value, Vec::new()),
            Self::Degraded(value, warnings) => (value, warnings),
        }
    }
}

/// A side effect that was skipped or failed without aborting the operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Warning {
    /// An uploaded id matched no directory user.
    UserNotFound(String),

    /// Store projects could not be listed, so no task lists were created.
    StoreDiscoveryFailed(String),

    /// No installation titled after this store exists.
    StoreProjectMissing(String),

    /// The task list for a store could not be created.
    TaskListFailed { store_id: String, reason: String },

    /// Task APIs for a project were not reachable before creating tasks.
    TaskGroupsUnavailable {
        installation_id: String,
        reason: String,
    },

    /// The token may not create tasks (403).
    TaskPermissionDenied { title: String },

    /// A single task could not be created.
    TaskFailed { title: String, reason: String },

    /// A task list was created but none of its tasks were.
    NoTasksCreated { store_id: String },

    /// The channel kept its first-phase label.
    RenameFailed(String),

    /// The channel's label could not be read before deletion.
    LabelUnavailable(String),

    /// A task list could not be deleted.
    TaskListDeleteFailed { list_id: String, reason: String },

    /// A legacy task-list id was found but no installation is configured for it.
    LegacyTaskListSkipped(String),

    /// The local registry could not be updated.
    RegistryFailed(String),
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UserNotFound(id) => write!(f, "no user found for id {id}"),
            Self::StoreDiscoveryFailed(reason) => {
                write!(f, "could not discover store projects: {reason}")
            }
            Self::StoreProjectMissing(store) => {
                write!(f, "no project found for store {store}, skipped task list")
            }
            Self::TaskListFailed { store_id, reason } => {
                write!(f, "task list for store {store_id} failed: {reason}")
            }
            Self::TaskGroupsUnavailable {
                installation_id,
                reason,
            } => write!(
                f,
                "could not read task groups of {installation_id}: {reason}"
            ),
            Self::TaskPermissionDenied { title } => write!(
                f,
                "task \"{title}\" not created: token lacks permission (403)"
            ),
            Self::TaskFailed { title, reason } => {
                write!(f, "task \"{title}\" not created: {reason}")
            }
            Self::NoTasksCreated { store_id } => write!(
                f,
                "task list for store {store_id} is empty: the token may lack create_task permission"
            ),
            Self::RenameFailed(reason) => {
                write!(f, "channel label not updated with post and task lists: {reason}")
            }
            Self::LabelUnavailable(reason) => {
                write!(f, "could not read channel label: {reason}")
            }
            Self::TaskListDeleteFailed { list_id, reason } => {
                write!(f, "task list {list_id} not deleted: {reason}")
            }
            Self::LegacyTaskListSkipped(list_id) => write!(
                f,
                "legacy task list {list_id} not deleted: no tasks installation configured"
            ),
            Self::RegistryFailed(reason) => write!(f, "local registry not updated: {reason}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_warnings_is_complete() {
        let outcome = Outcome::new(7, Vec::new());
        assert_eq!(outcome, Outcome::Complete(7));
        assert!(outcome.into_parts().1.is_empty());
    }

    #[test]
    fn warnings_degrade() {
        let outcome = Outcome::new(7, vec![Warning::RenameFailed("boom".into())]);
        assert!(matches!(outcome, Outcome::Degraded(7, _)));
        let (value, warnings) = outcome.into_parts();
        assert_eq!(value, 7);
        assert_eq!(warnings.len(), 1);
    }

    #[test]
    fn permission_warning_mentions_403() {
        let warning = Warning::TaskPermissionDenied {
            title: "Fix shelf".into(),
        };
        assert!(warning.to_string().contains("403"));
    }
}
