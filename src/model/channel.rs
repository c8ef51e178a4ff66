//! Managed channels: news channels this tool created, as reconstructed from
//! their labels.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

/// A task list created in one store's project for a managed channel.
///
/// Serialized into the channel label as JSON, so field names and order are
/// part of the label format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskListRef {
    pub store_id: String,
    pub installation_id: String,
    pub list_id: String,
}

/// A news channel managed by this tool.
///
/// Rebuilt from the vendor installation and its label; the local registry
/// keeps a copy keyed by `external_id`, the only stable key. `channel_id`
/// may be either the installation id or a nested plugin-instance id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManagedChannel {
    pub channel_id: String,
    pub installation_id: String,
    pub external_id: String,
    pub user_count: u32,
    pub post_id: Option<String>,
    pub task_lists: Vec<TaskListRef>,

    /// Single task-list id carried by labels written before lists were
    /// tracked per store.
    pub legacy_task_list_id: Option<String>,

    pub department: String,
    pub title: String,
    pub created_at: Timestamp,
    pub posts: Vec<PostSummary>,
}

/// The one article a managed channel holds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostSummary {
    pub post_id: String,
    pub title: String,
    pub created_at: Timestamp,
}

/// Publication state of a post.
///
/// Ordered the way listings present them: drafts first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostStatus {
    Draft,
    Scheduled,
    Published,
}

impl PostStatus {
    /// Derive a status from the post's publish and planned timestamps.
    ///
    /// Published wins whenever a publish timestamp exists. A planned
    /// timestamp only counts as scheduled when it lies after `now`.
    pub fn from_timestamps(
        published: Option<Timestamp>,
        planned: Option<Timestamp>,
        now: Timestamp,
    ) -> Self {
        if published.is_some() {
            return Self::Published;
        }
        match planned {
            Some(at) if at > now => Self::Scheduled,
            _ => Self::Draft,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Scheduled => "scheduled",
            Self::Published => "published",
        }
    }
}
