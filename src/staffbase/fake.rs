//! In-memory Staffbase for tests.
//!
//! Holds users, installations, and posts, and records every call as a short
//! string (`"<operation> <detail>"`) so tests can assert on call order.
//! Operations named with [`FakeStaffbase::failing`] return a 500 instead.

use std::{
    cell::{Cell, RefCell},
    collections::{HashMap, HashSet},
    fmt::Display,
};

use serde_json::{Map, Value};

use crate::model::TaskRecord;

use super::{
    ApiError, Installation, NewChannel, NewPost, PageRequest, PostRecord, Result, Staffbase,
    UserRecord,
    records::{InstallationConfig, Localization, LocalizedTitle},
};

/// Profile attribute the fake stores upload ids under.
pub const ATTRIBUTE: &str = "storeNumber";

#[derive(Default)]
pub struct FakeStaffbase {
    users: Vec<UserRecord>,
    installations: RefCell<Vec<Installation>>,
    posts: HashMap<String, PostRecord>,
    failing: HashSet<&'static str>,
    forbidden_tasks: bool,
    calls: RefCell<Vec<String>>,
    next_id: Cell<u32>,
}

impl FakeStaffbase {
    pub fn with_user(mut self, id: &str, upload_id: &str, name: Option<(&str, &str)>) -> Self {
        let mut profile = Map::new();
        profile.insert(ATTRIBUTE.into(), Value::String(upload_id.into()));
        self.users.push(UserRecord {
            id: id.into(),
            first_name: name.map(|(first, _)| first.to_string()),
            last_name: name.map(|(_, last)| last.to_string()),
            profile,
        });
        self
    }

    pub fn with_installation(mut self, id: &str, plugin: &str, title: &str, created: &str) -> Self {
        self.installations
            .get_mut()
            .push(installation(id, plugin, title, Some(created)));
        self
    }

    pub fn with_post(mut self, id: &str, published: Option<&str>, planned: Option<&str>) -> Self {
        self.posts.insert(
            id.into(),
            PostRecord {
                published: published.map(String::from),
                planned: planned.map(String::from),
            },
        );
        self
    }

    /// Make every call to `operation` fail with a 500.
    pub fn failing(mut self, operation: &'static str) -> Self {
        self.failing.insert(operation);
        self
    }

    /// Make task creation fail with a 403.
    pub fn forbidding_tasks(mut self) -> Self {
        self.forbidden_tasks = true;
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    /// Calls whose operation is `operation`.
    pub fn calls_to(&self, operation: &str) -> Vec<String> {
        self.calls
            .borrow()
            .iter()
            .filter(|c| c.split(' ').next() == Some(operation))
            .cloned()
            .collect()
    }

    /// Current title of an installation.
    pub fn title_of(&self, id: &str) -> Option<String> {
        self.installations
            .borrow()
            .iter()
            .find(|i| i.id == id)
            .map(|i| i.title().to_string())
    }

    fn call(&self, operation: &'static str, detail: impl Display) -> Result<()> {
        self.calls.borrow_mut().push(format!("{operation} {detail}"));
        if self.failing.contains(operation) {
            return Err(ApiError::Status {
                status: 500,
                body: format!("{operation} failed"),
            });
        }
        Ok(())
    }

    fn mint(&self, prefix: &str) -> String {
        let n = self.next_id.get() + 1;
        self.next_id.set(n);
        format!("{prefix}{n}")
    }
}

fn installation(id: &str, plugin: &str, title: &str, created: Option<&str>) -> Installation {
    Installation {
        id: id.into(),
        plugin_id: plugin.into(),
        config: InstallationConfig {
            localization: Localization {
                en_us: Some(LocalizedTitle {
                    title: title.into(),
                }),
            },
        },
        created: created.map(String::from),
        ..Installation::default()
    }
}

fn not_found(what: &str) -> ApiError {
    ApiError::Status {
        status: 404,
        body: format!("{what} not found"),
    }
}

fn page<T: Clone>(rows: &[T], page: PageRequest) -> Vec<T> {
    rows.iter()
        .skip(page.offset)
        .take(page.limit)
        .cloned()
        .collect()
}

impl Staffbase for FakeStaffbase {
    fn list_users(&self, request: PageRequest) -> Result<Vec<UserRecord>> {
        self.call("list_users", request.offset)?;
        Ok(page(&self.users, request))
    }

    fn list_installations(&self, request: PageRequest) -> Result<Vec<Installation>> {
        self.call("list_installations", request.offset)?;
        Ok(page(&self.installations.borrow(), request))
    }

    fn get_installation(&self, id: &str) -> Result<Installation> {
        self.call("get_installation", id)?;
        self.installations
            .borrow()
            .iter()
            .find(|i| i.id == id || i.channel_id() == id)
            .cloned()
            .ok_or_else(|| not_found("installation"))
    }

    fn create_channel(&self, channel: &NewChannel) -> Result<String> {
        self.call("create_channel", &channel.title)?;
        let id = self.mint("chan");
        let created = installation(&id, "news", &channel.title, Some("2024-06-01T12:00:00Z"));
        self.installations.borrow_mut().push(created);
        Ok(id)
    }

    fn rename_channel(&self, channel_id: &str, title: &str) -> Result<()> {
        self.call("rename_channel", format!("{channel_id} {title}"))?;
        let mut installations = self.installations.borrow_mut();
        let target = installations
            .iter_mut()
            .find(|i| i.id == channel_id)
            .ok_or_else(|| not_found("installation"))?;
        target.config.localization.en_us = Some(LocalizedTitle {
            title: title.into(),
        });
        Ok(())
    }

    fn delete_installation(&self, id: &str) -> Result<()> {
        self.call("delete_installation", id)?;
        let mut installations = self.installations.borrow_mut();
        let before = installations.len();
        installations.retain(|i| i.id != id);
        if installations.len() == before {
            return Err(not_found("installation"));
        }
        Ok(())
    }

    fn create_post(&self, channel_id: &str, post: &NewPost) -> Result<String> {
        self.call("create_post", format!("{channel_id} {}", post.title))?;
        Ok(self.mint("post"))
    }

    fn get_post(&self, post_id: &str) -> Result<PostRecord> {
        self.call("get_post", post_id)?;
        self.posts
            .get(post_id)
            .cloned()
            .ok_or_else(|| not_found("post"))
    }

    fn create_task_list(&self, installation_id: &str, name: &str, _color: &str) -> Result<String> {
        self.call("create_task_list", format!("{installation_id} {name}"))?;
        Ok(self.mint("list"))
    }

    fn task_group_count(&self, installation_id: &str) -> Result<usize> {
        self.call("task_group_count", installation_id)?;
        Ok(1)
    }

    fn create_task(
        &self,
        installation_id: &str,
        list_id: &str,
        task: &TaskRecord,
    ) -> Result<String> {
        self.call(
            "create_task",
            format!("{installation_id}/{list_id} {}", task.title),
        )?;
        if self.forbidden_tasks {
            return Err(ApiError::Status {
                status: 403,
                body: "Access denied".into(),
            });
        }
        Ok(self.mint("task"))
    }

    fn delete_task_list(&self, installation_id: &str, list_id: &str) -> Result<()> {
        self.call("delete_task_list", format!("{installation_id}/{list_id}"))
    }
}
