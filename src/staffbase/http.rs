//! Staffbase over HTTP.
//!
//! One helper, [`HttpStaffbase::send`], signs and sends every request and
//! maps non-2xx responses to [`ApiError::Status`]. The typed operations on top
//! of it only build paths and payloads.

use std::sync::{Mutex, PoisonError};

use jiff::Timestamp;
use reqwest::{
    Method, StatusCode,
    blocking::Client,
    header::{AUTHORIZATION, CONTENT_TYPE},
};
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tracing::{debug, warn};

use crate::{config::Config, model::TaskRecord};

use super::{
    ApiError, Installation, NewChannel, NewPost, PageRequest, PostRecord, RecordedRequest,
    RequestKind, RequestLog, Result, Staffbase, UserRecord, fingerprint,
};

/// Blocking REST client for one Staffbase space.
pub struct HttpStaffbase {
    client: Client,
    base_url: String,
    token: String,
    space_id: String,
    news_plugin: String,
    log: Mutex<RequestLog>,
}

impl HttpStaffbase {
    pub fn new(config: &Config) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("storecast/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token: config.token.clone(),
            space_id: config.space_id.clone(),
            news_plugin: config.news_plugin.clone(),
            log: Mutex::new(RequestLog::new(config.request_log_capacity)),
        })
    }

    /// Take the requests recorded since the last call, oldest first.
    pub fn take_recorded(&self) -> Vec<RecordedRequest> {
        self.log
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .drain()
    }

    /// Send one signed request. Empty and 204 responses come back as `Null`.
    fn send(&self, method: Method, path: &str, body: Option<&Value>) -> Result<Value> {
        let url = format!("{}{path}", self.base_url);
        debug!(%method, %url, "staffbase request");
        self.record(&method, &url, path, body);

        let mut request = self
            .client
            .request(method, &url)
            .header(AUTHORIZATION, &self.token)
            .header(CONTENT_TYPE, "application/json");
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send()?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            warn!(status = status.as_u16(), %url, "staffbase request failed");
            return Err(ApiError::Status {
                status: status.as_u16(),
                body,
            });
        }
        if status == StatusCode::NO_CONTENT {
            return Ok(Value::Null);
        }

        let text = response.text()?;
        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_str(&text)?)
    }

    fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        Ok(serde_json::from_value(self.send(Method::GET, path, None)?)?)
    }

    fn get_page<T: DeserializeOwned>(&self, path: &str, page: PageRequest) -> Result<Vec<T>> {
        let separator = if path.contains('?') { '&' } else { '?' };
        let value = self.send(
            Method::GET,
            &format!("{path}{separator}limit={}&offset={}", page.limit, page.offset),
            None,
        )?;
        match value.get("data") {
            Some(data) if !data.is_null() => Ok(serde_json::from_value(data.clone())?),
            _ => Ok(Vec::new()),
        }
    }

    fn record(&self, method: &Method, url: &str, path: &str, body: Option<&Value>) {
        let request = RecordedRequest {
            method: method.to_string(),
            url: url.to_string(),
            kind: RequestKind::classify(path),
            token_fingerprint: fingerprint(&self.token),
            body: body.cloned(),
            sent_at: Timestamp::now(),
        };
        self.log
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(request);
    }
}

impl Staffbase for HttpStaffbase {
    fn list_users(&self, page: PageRequest) -> Result<Vec<UserRecord>> {
        self.get_page("/users", page)
    }

    fn list_installations(&self, page: PageRequest) -> Result<Vec<Installation>> {
        self.get_page(&format!("/spaces/{}/installations", self.space_id), page)
    }

    fn get_installation(&self, id: &str) -> Result<Installation> {
        self.get(&format!("/installations/{id}"))
    }

    fn create_channel(&self, channel: &NewChannel) -> Result<String> {
        let payload = json!({
            "pluginID": self.news_plugin,
            "config": {
                "body": { "Transform_Input_into_JSON": { "0": channel.title } },
                "localization": localized_title(&channel.title),
            },
            "accessorIDs": channel.accessor_ids,
            "contributorIDs": [],
            "contentType": "article",
            "published": "now",
            "notificationChannelsAllowed": [],
            "notificationChannelsDefault": [],
        });
        let response = self.send(
            Method::POST,
            &format!("/spaces/{}/installations", self.space_id),
            Some(&payload),
        )?;
        string_field(&response, "id")
            .or_else(|| response.get("pluginInstance").and_then(|p| string_field(p, "id")))
            .ok_or(ApiError::MissingId("channel"))
    }

    fn rename_channel(&self, channel_id: &str, title: &str) -> Result<()> {
        let payload = json!({ "config": { "localization": localized_title(title) } });
        self.send(
            Method::POST,
            &format!("/installations/{channel_id}"),
            Some(&payload),
        )?;
        Ok(())
    }

    fn delete_installation(&self, id: &str) -> Result<()> {
        self.send(Method::DELETE, &format!("/installations/{id}"), None)?;
        Ok(())
    }

    fn create_post(&self, channel_id: &str, post: &NewPost) -> Result<String> {
        let payload = json!({
            "externalID": post.external_id,
            "contents": {
                "en_US": {
                    "title": post.title,
                    "content": post.content,
                    "teaser": post.teaser,
                }
            }
        });
        let response = match self.send(
            Method::POST,
            &format!("/channels/{channel_id}/posts"),
            Some(&payload),
        ) {
            Ok(response) => response,
            Err(first) => {
                debug!(channel_id, error = %first, "channel post endpoint failed, trying installation");
                self.send(
                    Method::POST,
                    &format!("/installations/{channel_id}/posts"),
                    Some(&payload),
                )
                .map_err(|_| first)?
            }
        };
        string_field(&response, "id").ok_or(ApiError::MissingId("post"))
    }

    fn get_post(&self, post_id: &str) -> Result<PostRecord> {
        self.get(&format!("/posts/{post_id}"))
    }

    fn create_task_list(&self, installation_id: &str, name: &str, color: &str) -> Result<String> {
        let payload = json!({ "name": name, "color": color });
        let response = self.send(
            Method::POST,
            &format!("/tasks/{installation_id}/lists"),
            Some(&payload),
        )?;
        string_field(&response, "id").ok_or(ApiError::MissingId("task list"))
    }

    fn task_group_count(&self, installation_id: &str) -> Result<usize> {
        let response = self.send(
            Method::GET,
            &format!("/tasks/{installation_id}/groups"),
            None,
        )?;
        Ok(match &response {
            Value::Array(groups) => groups.len(),
            other => other
                .get("data")
                .and_then(Value::as_array)
                .map_or(0, Vec::len),
        })
    }

    fn create_task(
        &self,
        installation_id: &str,
        list_id: &str,
        task: &TaskRecord,
    ) -> Result<String> {
        let payload = task_payload(list_id, task);
        let response = self.send(
            Method::POST,
            &format!("/tasks/{installation_id}/task"),
            Some(&payload),
        )?;
        string_field(&response, "id").ok_or(ApiError::MissingId("task"))
    }

    fn delete_task_list(&self, installation_id: &str, list_id: &str) -> Result<()> {
        self.send(
            Method::DELETE,
            &format!("/tasks/{installation_id}/lists/{list_id}"),
            None,
        )?;
        Ok(())
    }
}

fn localized_title(title: &str) -> Value {
    json!({
        "de_DE": { "title": title },
        "en_US": { "title": title },
    })
}

/// Task payload: optional fields only when they carry a value.
fn task_payload(list_id: &str, task: &TaskRecord) -> Value {
    let mut payload = json!({
        "title": task.title.trim(),
        "taskListId": list_id,
        "status": "OPEN",
        "assigneeIds": [],
        "groupIds": [],
    });
    if let Some(description) = task.description.as_deref().map(str::trim)
        && !description.is_empty()
    {
        payload["description"] = json!(description);
    }
    if let (Some(due), Some(start)) = (task.due_date(), task.start_date()) {
        payload["dueDate"] = json!(due);
        payload["startDate"] = json!(start);
    }
    payload
}

/// A string id field; numeric ids are accepted and rendered as text.
fn string_field(value: &Value, key: &str) -> Option<String> {
    match value.get(key)? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
