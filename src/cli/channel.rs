//! Channel commands: create, list, status, delete, import.

use std::path::Path;

use jiff::Timestamp;
use serde::Serialize;
use tracing::warn;

use crate::{
    discovery, label,
    model::{ManagedChannel, PostStatus, Warning},
    publish::{self, CreateRequest, CreatedChannel},
    removal,
    staffbase::Staffbase,
    storage::{Storage, StorageError},
    upload,
};

use super::{
    format::{format_channel, format_created, format_deleted},
    print_json, print_warnings, read_file, with_api,
};

/// A channel as listed, with its post status when requested.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Listing {
    #[serde(flatten)]
    channel: ManagedChannel,
    #[serde(skip_serializing_if = "Option::is_none")]
    status: Option<PostStatus>,
}

pub(super) fn cmd_create(
    storage: &Storage,
    stores: &Path,
    tasks: Option<&Path>,
    title: &str,
    department: &str,
) -> Result<(), String> {
    let store_ids = upload::parse_id_list(&read_file(stores)?);
    let tasks = match tasks {
        Some(path) => upload::parse_tasks(&read_file(path)?),
        None => Vec::new(),
    };
    let request = CreateRequest {
        store_ids,
        tasks,
        title: title.to_string(),
        department: department.to_string(),
    };

    let outcome = with_api(storage, |config, api| {
        publish::create(api, config, &request).map_err(|e| e.to_string())
    })?;
    let (created, mut warnings) = outcome.into_parts();

    if let Err(e) = record(storage, &created) {
        warn!(error = %e, "could not record channel");
        warnings.push(Warning::RegistryFailed(e.to_string()));
    }

    println!("{}", format_created(&created));
    print_warnings(&warnings);
    Ok(())
}

/// Keep a registry copy of a freshly created channel.
fn record(storage: &Storage, created: &CreatedChannel) -> Result<(), StorageError> {
    let label = label::decode(&created.label)
        .into_label()
        .ok_or_else(|| StorageError::Corrupt(format!("label does not decode: {}", created.label)))?;
    let channel = discovery::from_label(
        label,
        &created.channel_id,
        &created.channel_id,
        created.created_at,
    );
    storage.upsert_channel(&channel)
}

pub(super) fn cmd_list(
    storage: &Storage,
    status: bool,
    local: bool,
    json: bool,
) -> Result<(), String> {
    let listed = if local && !status {
        let channels = storage
            .list_channels()
            .map_err(|e| format!("failed to read registry: {e}"))?;
        listings(channels)
    } else {
        with_api(storage, |config, api| {
            let channels = if local {
                storage
                    .list_channels()
                    .map_err(|e| format!("failed to read registry: {e}"))?
            } else {
                discovery::discover(api, config)
                    .map_err(|e| format!("failed to list channels: {e}"))?
            };
            let mut listed = listings(channels);
            if status {
                look_up_status(&mut listed, api);
                sort_by_status(&mut listed);
            }
            Ok(listed)
        })?
    };

    if json {
        return print_json(&listed);
    }
    if listed.is_empty() {
        println!("No channels");
        return Ok(());
    }
    for listing in &listed {
        println!("{}", format_channel(&listing.channel, listing.status));
    }
    Ok(())
}

fn listings(channels: Vec<ManagedChannel>) -> Vec<Listing> {
    channels
        .into_iter()
        .map(|channel| Listing {
            channel,
            status: None,
        })
        .collect()
}

/// Fill in each post's status. Channels without a post count as drafts.
fn look_up_status(listings: &mut [Listing], api: &impl Staffbase) {
    let now = Timestamp::now();
    for listing in listings {
        listing.status = Some(
            listing
                .channel
                .post_id
                .as_deref()
                .map_or(PostStatus::Draft, |post_id| {
                    discovery::post_status(api, post_id, now)
                }),
        );
    }
}

/// Drafts first, then scheduled, then published; newest first within each.
fn sort_by_status(listings: &mut [Listing]) {
    listings.sort_by(|a, b| {
        a.status
            .cmp(&b.status)
            .then_with(|| b.channel.created_at.cmp(&a.channel.created_at))
    });
}

pub(super) fn cmd_status(storage: &Storage, post_id: &str) -> Result<(), String> {
    let status = with_api(storage, |_, api| {
        Ok(discovery::post_status(api, post_id, Timestamp::now()))
    })?;
    println!("{}", status.as_str());
    Ok(())
}

pub(super) fn cmd_delete(storage: &Storage, channel_id: &str) -> Result<(), String> {
    let recorded = storage.find_channel(channel_id).unwrap_or_else(|e| {
        warn!(error = %e, "could not read registry");
        None
    });

    let outcome = with_api(storage, |config, api| {
        removal::delete_channel(api, config, channel_id, recorded.as_ref())
            .map_err(|e| format!("failed to delete channel {channel_id}: {e}"))
    })?;
    let (deleted, mut warnings) = outcome.into_parts();

    match storage.remove_channel(channel_id) {
        Ok(()) | Err(StorageError::ChannelNotFound(_)) => {}
        Err(e) => {
            warn!(error = %e, "could not update registry");
            warnings.push(Warning::RegistryFailed(e.to_string()));
        }
    }

    println!("{}", format_deleted(&deleted));
    print_warnings(&warnings);
    Ok(())
}

pub(super) fn cmd_import(storage: &Storage) -> Result<(), String> {
    let channels = with_api(storage, |config, api| {
        discovery::discover(api, config).map_err(|e| format!("failed to list channels: {e}"))
    })?;
    let count = storage
        .replace_channels(&channels)
        .map_err(|e| format!("failed to write registry: {e}"))?;
    println!("Imported {count} channels");
    Ok(())
}
