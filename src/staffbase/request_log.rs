//! Bounded record of recent vendor requests, for debugging.
//!
//! Requests are kept newest-last in a ring buffer owned by the client. The
//! authorization token is never recorded, only a short fingerprint of it.

use std::collections::VecDeque;

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};

/// What a recorded request was for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RequestKind {
    General,
    TaskList,
    Task,
}

impl RequestKind {
    /// Classify a request by its API path.
    pub fn classify(path: &str) -> Self {
        let path = path.split('?').next().unwrap_or(path);
        if !path.contains("/tasks/") {
            Self::General
        } else if path.contains("/lists") {
            Self::TaskList
        } else if path.ends_with("/task") {
            Self::Task
        } else {
            Self::General
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::General => "general",
            Self::TaskList => "task-list",
            Self::Task => "task",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "general" => Some(Self::General),
            "task-list" => Some(Self::TaskList),
            "task" => Some(Self::Task),
            _ => None,
        }
    }
}

/// One request as it was sent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordedRequest {
    pub method: String,
    pub url: String,
    pub kind: RequestKind,
    pub token_fingerprint: String,
    pub body: Option<Value>,
    pub sent_at: Timestamp,
}

/// Ring buffer of the most recent requests.
#[derive(Debug)]
pub struct RequestLog {
    capacity: usize,
    entries: VecDeque<RecordedRequest>,
}

impl RequestLog {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            entries: VecDeque::new(),
        }
    }

    /// Record a request, evicting the oldest when full.
    pub fn push(&mut self, request: RecordedRequest) {
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(request);
    }

    /// Take every recorded request, oldest first.
    pub fn drain(&mut self) -> Vec<RecordedRequest> {
        self.entries.drain(..).collect()
    }
}

/// Short, stable identifier for a token that does not reveal it.
pub fn fingerprint(token: &str) -> String {
    let digest = Sha256::digest(token.as_bytes());
    hex::encode(&digest[..6])
}
