//! Users matched from an uploaded id list.

use serde::{Deserialize, Serialize};

/// A directory user whose hidden profile attribute matched an uploaded id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchedUser {
    pub id: String,
    pub csv_id: String,
    pub name: String,
}

/// Result of resolving an uploaded id list against the user directory.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Verification {
    pub found_users: Vec<MatchedUser>,
    pub not_found_ids: Vec<String>,
}

impl Verification {
    pub fn total_requested(&self) -> usize {
        self.found_users.len() + self.not_found_ids.len()
    }

    /// Directory ids of the matched users, in upload order, each once.
    pub fn user_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = Vec::with_capacity(self.found_users.len());
        for user in &self.found_users {
            if !ids.contains(&user.id) {
                ids.push(user.id.clone());
            }
        }
        ids
    }
}
