//! The Staffbase collaborator: users, installations, posts, and task lists.
//!
//! Everything the tool does against the vendor goes through the [`Staffbase`]
//! trait. [`HttpStaffbase`] implements it over the REST API; tests use an
//! in-memory fake that records every call.

#[cfg(test)]
pub mod fake;
mod http;
mod records;
mod request_log;

pub use http::HttpStaffbase;
pub use records::{Installation, NewChannel, NewPost, PageRequest, PostRecord, UserRecord};
pub use request_log::{RecordedRequest, RequestKind, RequestLog, fingerprint};

use crate::model::TaskRecord;

/// Errors from a single vendor call.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Staffbase API {status}: {body}")]
    Status { status: u16, body: String },

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("unexpected response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("{0} creation succeeded but no ID in response")]
    MissingId(&'static str),
}

impl ApiError {
    /// Whether the vendor refused the call for lack of permission.
    pub fn is_forbidden(&self) -> bool {
        matches!(self, Self::Status { status: 403, .. })
    }
}

pub type Result<T> = core::result::Result<T, ApiError>;

/// Vendor operations the tool depends on.
///
/// Every call is attempted once; nothing here retries.
pub trait Staffbase {
    /// One page of the user directory.
    fn list_users(&self, page: PageRequest) -> Result<Vec<UserRecord>>;

    /// One page of the installations in the configured space.
    fn list_installations(&self, page: PageRequest) -> Result<Vec<Installation>>;

    fn get_installation(&self, id: &str) -> Result<Installation>;

    /// Create a news channel. Returns the channel id.
    fn create_channel(&self, channel: &NewChannel) -> Result<String>;

    /// Replace a channel's localized titles.
    fn rename_channel(&self, channel_id: &str, title: &str) -> Result<()>;

    fn delete_installation(&self, id: &str) -> Result<()>;

    /// Create the article in a channel. Returns the post id.
    fn create_post(&self, channel_id: &str, post: &NewPost) -> Result<String>;

    fn get_post(&self, post_id: &str) -> Result<PostRecord>;

    /// Create a task list in a project installation. Returns the list id.
    fn create_task_list(&self, installation_id: &str, name: &str, color: &str) -> Result<String>;

    /// Number of task groups in a project; used to probe task API access.
    fn task_group_count(&self, installation_id: &str) -> Result<usize>;

    /// Create one open, unassigned task. Returns the task id.
    fn create_task(&self, installation_id: &str, list_id: &str, task: &TaskRecord)
    -> Result<String>;

    fn delete_task_list(&self, installation_id: &str, list_id: &str) -> Result<()>;
}

/// Fetch every page of a listing.
///
/// Stops at an empty page or a page shorter than `page_size`.
pub fn collect_pages<T>(
    page_size: usize,
    mut fetch: impl FnMut(PageRequest) -> Result<Vec<T>>,
) -> Result<Vec<T>> {
    let mut rows = Vec::new();
    let mut offset = 0;
    loop {
        let page = fetch(PageRequest {
            limit: page_size,
            offset,
        })?;
        let len = page.len();
        rows.extend(page);
        if len == 0 || len < page_size {
            return Ok(rows);
        }
        offset += page_size;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collects_until_short_page() {
        let mut offsets = Vec::new();
        let rows = collect_pages(100, |page| {
            offsets.push(page.offset);
            let remaining = 250usize.saturating_sub(page.offset);
            Ok((0..remaining.min(page.limit)).collect())
        })
        .unwrap();

        assert_eq!(offsets, vec![0, 100, 200]);
        assert_eq!(rows.len(), 250);
    }

    #[test]
    fn exact_multiple_ends_on_empty_page() {
        let mut calls = 0;
        let rows = collect_pages(100, |page| {
            calls += 1;
            let remaining = 200usize.saturating_sub(page.offset);
            Ok((0..remaining.min(page.limit)).collect())
        })
        .unwrap();

        assert_eq!(calls, 3);
        assert_eq!(rows.len(), 200);
    }

    #[test]
    fn page_error_propagates() {
        let result: Result<Vec<u8>> = collect_pages(10, |_| {
            Err(ApiError::Status {
                status: 500,
                body: "down".into(),
            })
        });
        assert!(matches!(result, Err(ApiError::Status { status: 500, .. })));
    }

    #[test]
    fn forbidden_is_403_only() {
        let forbidden = ApiError::Status {
            status: 403,
            body: "Access denied".into(),
        };
        let missing = ApiError::Status {
            status: 404,
            body: "Not found".into(),
        };
        assert!(forbidden.is_forbidden());
        assert!(!missing.is_forbidden());
        assert_eq!(forbidden.to_string(), "Staffbase API 403: Access denied");
    }
}
