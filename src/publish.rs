//! Creating a managed channel.
//!
//! The channel is created with its initial label, the post is placed in it,
//! task lists are created in every matched store's project, and finally the
//! label is rewritten with the post, task lists, and department. Channel and
//! post creation are fatal when they fail; everything after them degrades to
//! warnings.

use jiff::Timestamp;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::{
    config::Config,
    discovery,
    label::{Label, Phase},
    model::{Outcome, TaskListRef, TaskRecord, Warning},
    staffbase::{ApiError, NewChannel, NewPost, Staffbase},
    users,
};

/// Everything needed to create a managed channel.
#[derive(Debug, Clone)]
pub struct CreateRequest {
    /// Ids from the store upload; used both to find users and store projects.
    pub store_ids: Vec<String>,
    pub tasks: Vec<TaskRecord>,
    pub title: String,
    pub department: String,
}

/// What was created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedChannel {
    pub channel_id: String,
    pub post_id: String,
    pub external_id: String,
    pub user_count: u32,
    pub title: String,
    pub department: String,
    pub task_count: usize,
    pub task_lists: Vec<TaskListRef>,
    pub stores: Vec<StoreResult>,

    /// The label the channel ends up with.
    pub label: String,
    pub created_at: Timestamp,
}

/// Task-list result for one store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "result", rename_all = "camelCase")]
pub enum StoreResult {
    #[serde(rename_all = "camelCase")]
    Created {
        store_id: String,
        installation_id: String,
        list_id: String,
        task_count: usize,
    },
    #[serde(rename_all = "camelCase")]
    ProjectMissing { store_id: String },
    #[serde(rename_all = "camelCase")]
    Failed { store_id: String, reason: String },
}

/// Failures that stop a create.
#[derive(Debug, thiserror::Error)]
pub enum CreateError {
    #[error("store CSV is empty")]
    EmptyStores,

    #[error("post title is required")]
    MissingTitle,

    #[error("department is required")]
    MissingDepartment,

    #[error("unknown department {department:?}, expected one of: {known}")]
    UnknownDepartment { department: String, known: String },

    #[error("no users found with {0} matching CSV IDs")]
    NoUsersFound(String),

    #[error("user lookup failed: {0}")]
    UserLookup(#[source] ApiError),

    #[error("channel creation failed: {0}")]
    Channel(#[source] ApiError),

    #[error("post creation failed: {0}")]
    Post(#[source] ApiError),
}

/// Create a managed channel, its post, and per-store task lists.
pub fn create(
    api: &impl Staffbase,
    config: &Config,
    request: &CreateRequest,
) -> Result<Outcome<CreatedChannel>, CreateError> {
    let title = request.title.trim();
    let department = request.department.trim();
    validate(config, request, title, department)?;

    let mut warnings = Vec::new();

    let verification = users::verify(
        api,
        &config.hidden_attribute_key,
        config.page_size,
        &request.store_ids,
    )
    .map_err(CreateError::UserLookup)?;
    warnings.extend(
        verification
            .not_found_ids
            .iter()
            .cloned()
            .map(Warning::UserNotFound),
    );
    let user_ids = verification.user_ids();
    if user_ids.is_empty() {
        return Err(CreateError::NoUsersFound(
            config.hidden_attribute_key.clone(),
        ));
    }

    let created_at = Timestamp::now();
    let external_id = created_at.as_millisecond().to_string();
    let user_count = u32::try_from(user_ids.len()).unwrap_or(u32::MAX);
    let mut label = Label::initial(&external_id, user_count, title);

    let channel_id = api
        .create_channel(&NewChannel {
            title: label.encode(Phase::Initial),
            accessor_ids: user_ids,
        })
        .map_err(CreateError::Channel)?;
    info!(%channel_id, %external_id, user_count, "created channel");

    let post_id = api
        .create_post(
            &channel_id,
            &NewPost {
                external_id: format!("post-{external_id}"),
                title: title.to_string(),
                content: format!("<p>{}</p>", escape_html(title)),
                teaser: department.to_string(),
            },
        )
        .map_err(CreateError::Post)?;
    info!(%channel_id, %post_id, "created post");

    let stores = if request.tasks.is_empty() {
        debug!("no tasks uploaded, skipping task lists");
        Vec::new()
    } else {
        create_task_lists(api, config, request, title, &mut warnings)
    };
    let task_lists: Vec<TaskListRef> = stores
        .iter()
        .filter_map(|result| match result {
            StoreResult::Created {
                store_id,
                installation_id,
                list_id,
                ..
            } => Some(TaskListRef {
                store_id: store_id.clone(),
                installation_id: installation_id.clone(),
                list_id: list_id.clone(),
            }),
            _ => None,
        })
        .collect();

    label.post_id = Some(post_id.clone());
    label.task_lists.clone_from(&task_lists);
    label.department = department.to_string();
    let complete = label.encode(Phase::Complete);
    let final_label = match api.rename_channel(&channel_id, &complete) {
        Ok(()) => complete,
        Err(e) => {
            warn!(%channel_id, error = %e, "could not rewrite channel label");
            warnings.push(Warning::RenameFailed(e.to_string()));
            label.encode(Phase::Initial)
        }
    };

    let created = CreatedChannel {
        channel_id,
        post_id,
        external_id,
        user_count,
        title: title.to_string(),
        department: department.to_string(),
        task_count: request.tasks.len(),
        task_lists,
        stores,
        label: final_label,
        created_at,
    };
    Ok(Outcome::new(created, warnings))
}

fn validate(
    config: &Config,
    request: &CreateRequest,
    title: &str,
    department: &str,
) -> Result<(), CreateError> {
    if request.store_ids.is_empty() {
        return Err(CreateError::EmptyStores);
    }
    if title.is_empty() {
        return Err(CreateError::MissingTitle);
    }
    if department.is_empty() {
        return Err(CreateError::MissingDepartment);
    }
    if !config.is_department(department) {
        return Err(CreateError::UnknownDepartment {
            department: department.to_string(),
            known: config.departments.join(", "),
        });
    }
    if title.contains([':', '-', '\n']) {
        warn!(title, "title contains ':' or '-' and may not decode from the channel label");
    }
    Ok(())
}

/// One task list per store that has a project, one store at a time.
fn create_task_lists(
    api: &impl Staffbase,
    config: &Config,
    request: &CreateRequest,
    title: &str,
    warnings: &mut Vec<Warning>,
) -> Vec<StoreResult> {
    let projects = match discovery::find_store_projects(api, config, &request.store_ids) {
        Ok(projects) => projects,
        Err(e) => {
            warn!(error = %e, "could not discover store projects");
            warnings.push(Warning::StoreDiscoveryFailed(e.to_string()));
            return Vec::new();
        }
    };

    request
        .store_ids
        .iter()
        .map(|store_id| match projects.get(store_id) {
            Some(installation_id) => populate_store(
                api,
                config,
                store_id,
                installation_id,
                title,
                &request.tasks,
                warnings,
            ),
            None => {
                warn!(%store_id, "no project found for store");
                warnings.push(Warning::StoreProjectMissing(store_id.clone()));
                StoreResult::ProjectMissing {
                    store_id: store_id.clone(),
                }
            }
        })
        .collect()
}

fn populate_store(
    api: &impl Staffbase,
    config: &Config,
    store_id: &str,
    installation_id: &str,
    title: &str,
    tasks: &[TaskRecord],
    warnings: &mut Vec<Warning>,
) -> StoreResult {
    let list_id = match api.create_task_list(installation_id, title, &config.task_list_color) {
        Ok(list_id) => list_id,
        Err(e) => {
            warn!(store_id, installation_id, error = %e, "could not create task list");
            warnings.push(Warning::TaskListFailed {
                store_id: store_id.to_string(),
                reason: e.to_string(),
            });
            return StoreResult::Failed {
                store_id: store_id.to_string(),
                reason: e.to_string(),
            };
        }
    };
    info!(store_id, installation_id, %list_id, "created task list");

    match api.task_group_count(installation_id) {
        Ok(groups) => debug!(installation_id, groups, "task groups reachable"),
        Err(e) => {
            warn!(installation_id, error = %e, "could not read task groups");
            warnings.push(Warning::TaskGroupsUnavailable {
                installation_id: installation_id.to_string(),
                reason: e.to_string(),
            });
        }
    }

    let mut task_count = 0;
    for task in tasks {
        if task.title.trim().is_empty() {
            debug!(store_id, "skipping task with empty title");
            continue;
        }
        match api.create_task(installation_id, &list_id, task) {
            Ok(task_id) => {
                debug!(%task_id, title = %task.title, "created task");
                task_count += 1;
            }
            Err(e) if e.is_forbidden() => {
                warn!(title = %task.title, "task creation requires additional permissions");
                warnings.push(Warning::TaskPermissionDenied {
                    title: task.title.clone(),
                });
            }
            Err(e) => {
                warn!(title = %task.title, error = %e, "could not create task");
                warnings.push(Warning::TaskFailed {
                    title: task.title.clone(),
                    reason: e.to_string(),
                });
            }
        }
    }
    if task_count == 0 && !tasks.is_empty() {
        warnings.push(Warning::NoTasksCreated {
            store_id: store_id.to_string(),
        });
    }

    StoreResult::Created {
        store_id: store_id.to_string(),
        installation_id: installation_id.to_string(),
        list_id,
        task_count,
    }
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            other => escaped.push(other),
        }
    }
    escaped
}
