//! Channel discovery: rebuilding managed channels from the vendor's
//! installation listing.
//!
//! Every read pages through all installations in the space, keeps the news
//! channels whose title carries the managed prefix, and decodes each label.
//! Labels that do not decode are not ours and are skipped.

use std::collections::HashMap;

use jiff::Timestamp;
use tracing::{debug, info, warn};

use crate::{
    config::Config,
    label::{self, Label},
    model::{ManagedChannel, PostStatus, PostSummary},
    staffbase::{self, Installation, Staffbase, collect_pages},
};

/// All managed channels, newest first.
pub fn discover(api: &impl Staffbase, config: &Config) -> staffbase::Result<Vec<ManagedChannel>> {
    let installations = collect_pages(config.page_size, |page| api.list_installations(page))?;
    let now = Timestamp::now();

    let mut channels: Vec<ManagedChannel> = installations
        .iter()
        .filter(|i| i.plugin_id == config.news_plugin && label::is_managed(i.title()))
        .filter_map(|i| reconstruct(i, now))
        .collect();
    channels.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    info!(
        installations = installations.len(),
        channels = channels.len(),
        "discovered managed channels"
    );
    Ok(channels)
}

/// Rebuild one channel from its installation, or `None` if the label is not
/// a managed label.
///
/// Installations without a creation time are stamped with `fallback_created`.
pub fn reconstruct(installation: &Installation, fallback_created: Timestamp) -> Option<ManagedChannel> {
    let Some(label) = label::decode(installation.title()).into_label() else {
        debug!(id = %installation.id, title = installation.title(), "skipping undecodable label");
        return None;
    };
    Some(from_label(
        label,
        installation.channel_id(),
        &installation.id,
        installation.created_at().unwrap_or(fallback_created),
    ))
}

/// Combine a decoded label with where the channel lives.
pub fn from_label(
    label: Label,
    channel_id: &str,
    installation_id: &str,
    created_at: Timestamp,
) -> ManagedChannel {
    let posts = label
        .post_id
        .iter()
        .map(|post_id| PostSummary {
            post_id: post_id.clone(),
            title: label.title.clone(),
            created_at,
        })
        .collect();

    ManagedChannel {
        channel_id: channel_id.to_string(),
        installation_id: installation_id.to_string(),
        external_id: label.external_id,
        user_count: label.user_count,
        post_id: label.post_id,
        task_lists: label.task_lists,
        legacy_task_list_id: label.legacy_task_list_id,
        department: label.department,
        title: label.title,
        created_at,
        posts,
    }
}

/// Publication status of a post. Any lookup failure reads as a draft.
pub fn post_status(api: &impl Staffbase, post_id: &str, now: Timestamp) -> PostStatus {
    match api.get_post(post_id) {
        Ok(post) => PostStatus::from_timestamps(post.published_at(), post.planned_at(), now),
        Err(e) => {
            warn!(post_id, error = %e, "could not read post status, treating as draft");
            PostStatus::Draft
        }
    }
}

/// Map store ids to the project installation titled after each store.
pub fn find_store_projects(
    api: &impl Staffbase,
    config: &Config,
    store_ids: &[String],
) -> staffbase::Result<HashMap<String, String>> {
    let installations = collect_pages(config.page_size, |page| api.list_installations(page))?;

    let by_title: HashMap<&str, &str> = installations
        .iter()
        .map(|i| (i.title(), i.id.as_str()))
        .collect();

    let projects: HashMap<String, String> = store_ids
        .iter()
        .filter_map(|store| {
            let title = format!("{}{store}", config.store_title_prefix);
            by_title
                .get(title.as_str())
                .map(|id| (store.clone(), (*id).to_string()))
        })
        .collect();

    info!(
        found = projects.len(),
        stores = store_ids.len(),
        "discovered store projects"
    );
    Ok(projects)
}
