//! Deleting a managed channel.
//!
//! The channel's label is read back to find its task lists, each list is
//! deleted independently, and then the channel itself. Only the channel
//! deletion can fail the operation.

use serde::Serialize;
use tracing::{info, warn};

use crate::{
    config::Config,
    label,
    model::{ManagedChannel, Outcome, TaskListRef, Warning},
    staffbase::{self, Staffbase},
};

/// What a delete removed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Deleted {
    pub channel_id: String,

    /// Present when the label (or the registry) identified the channel.
    pub external_id: Option<String>,
    pub task_lists_deleted: usize,
}

/// Task lists a delete will try to remove.
#[derive(Debug, Default)]
struct Targets {
    external_id: Option<String>,
    task_lists: Vec<TaskListRef>,
    legacy_task_list_id: Option<String>,
}

/// Delete a channel and its task lists.
///
/// `recorded` is the registry's copy of the channel; its task lists are used
/// when the live label cannot be read or does not decode.
pub fn delete_channel(
    api: &impl Staffbase,
    config: &Config,
    channel_id: &str,
    recorded: Option<&ManagedChannel>,
) -> staffbase::Result<Outcome<Deleted>> {
    let mut warnings = Vec::new();
    let targets = targets(api, channel_id, recorded, &mut warnings);

    let mut task_lists_deleted = 0;
    for list in &targets.task_lists {
        match api.delete_task_list(&list.installation_id, &list.list_id) {
            Ok(()) => {
                info!(list_id = %list.list_id, store_id = %list.store_id, "deleted task list");
                task_lists_deleted += 1;
            }
            Err(e) => {
                warn!(list_id = %list.list_id, error = %e, "could not delete task list");
                warnings.push(Warning::TaskListDeleteFailed {
                    list_id: list.list_id.clone(),
                    reason: e.to_string(),
                });
            }
        }
    }

    if let Some(list_id) = &targets.legacy_task_list_id {
        match &config.legacy_tasks_installation {
            Some(installation_id) => match api.delete_task_list(installation_id, list_id) {
                Ok(()) => {
                    info!(%list_id, "deleted legacy task list");
                    task_lists_deleted += 1;
                }
                Err(e) => {
                    warn!(%list_id, error = %e, "could not delete legacy task list");
                    warnings.push(Warning::TaskListDeleteFailed {
                        list_id: list_id.clone(),
                        reason: e.to_string(),
                    });
                }
            },
            None => warnings.push(Warning::LegacyTaskListSkipped(list_id.clone())),
        }
    }

    api.delete_installation(channel_id)?;
    info!(channel_id, task_lists_deleted, "deleted channel");

    Ok(Outcome::new(
        Deleted {
            channel_id: channel_id.to_string(),
            external_id: targets.external_id,
            task_lists_deleted,
        },
        warnings,
    ))
}

fn targets(
    api: &impl Staffbase,
    channel_id: &str,
    recorded: Option<&ManagedChannel>,
    warnings: &mut Vec<Warning>,
) -> Targets {
    let decoded = match api.get_installation(channel_id) {
        Ok(installation) => label::decode(installation.title()).into_label(),
        Err(e) => {
            warn!(channel_id, error = %e, "could not read channel label");
            warnings.push(Warning::LabelUnavailable(e.to_string()));
            None
        }
    };

    match (decoded, recorded) {
        (Some(label), _) => Targets {
            external_id: Some(label.external_id),
            task_lists: label.task_lists,
            legacy_task_list_id: label.legacy_task_list_id,
        },
        (None, Some(channel)) => {
            info!(channel_id, "using task lists from the local registry");
            Targets {
                external_id: Some(channel.external_id.clone()),
                task_lists: channel.task_lists.clone(),
                legacy_task_list_id: channel.legacy_task_list_id.clone(),
            }
        }
        (None, None) => Targets::default(),
    }
}
