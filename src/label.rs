//! Encoded channel labels.
//!
//! Staffbase gives a news channel nothing but a display title, so the title
//! carries this tool's metadata for the channel:
//!
//! ```text
//! [external]{externalId}:{userCount} - {title}                                    (initial)
//! [external]{externalId}:{userCount}:{postId}:{taskLists}:{department} - {title}  (complete)
//! ```
//!
//! `taskLists` is a JSON array of [`TaskListRef`]s, a single legacy task-list
//! id, or the `unknown` placeholder. Titles must not contain `:`, `-` or a
//! newline; nothing escapes them, and a title that does may decode wrongly.
//!
//! Decoding tries an ordered list of parsers. The first to match wins; a
//! label none of them match is not a managed channel.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use serde_json::Value;

use crate::model::TaskListRef;

/// Prefix every managed channel label starts with.
pub const PREFIX: &str = "[external]";

/// Written in place of a post id or task-list payload that does not exist.
pub const PLACEHOLDER: &str = "unknown";

/// Department reported when a label carries none.
pub const UNKNOWN_DEPARTMENT: &str = "Unknown";

static CURRENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\[external\]([^:]+):(\d+):([^\s:]+):(.+?):([^\s:]+)\s*-\s*(.+)$")
        .expect("current label pattern is valid")
});

static LEGACY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\[external\]([^:]+):(\d+)(?::([^\s:]+))?(?::([^\s:]+))?(?::([^\s-]+))?\s*-\s*")
        .expect("legacy label pattern is valid")
});

/// Parsers in the order they are tried.
const PARSERS: [fn(&str) -> Option<Label>; 2] = [parse_current, parse_legacy];

/// Metadata carried by a managed channel's label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Label {
    pub external_id: String,
    pub user_count: u32,
    pub post_id: Option<String>,
    pub task_lists: Vec<TaskListRef>,
    pub legacy_task_list_id: Option<String>,
    pub department: String,
    pub title: String,
}

/// Which of the two label writes is being produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Written at channel creation, before the post and task lists exist.
    Initial,

    /// Rewritten once the post and task lists are known.
    Complete,
}

/// Result of decoding a label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LabelMatch {
    Matched(Label),
    Unmatched,
}

impl LabelMatch {
    pub fn into_label(self) -> Option<Label> {
        match self {
            Self::Matched(label) => Some(label),
            Self::Unmatched => None,
        }
    }
}

impl Label {
    /// A label for a channel that has just been created.
    pub fn initial(external_id: impl Into<String>, user_count: u32, title: impl Into<String>) -> Self {
        Self {
            external_id: external_id.into(),
            user_count,
            post_id: None,
            task_lists: Vec::new(),
            legacy_task_list_id: None,
            department: UNKNOWN_DEPARTMENT.to_string(),
            title: title.into(),
        }
    }

    /// Render the label text for the given phase.
    ///
    /// The title is written as-is.
    pub fn encode(&self, phase: Phase) -> String {
        match phase {
            Phase::Initial => format!(
                "{PREFIX}{}:{} - {}",
                self.external_id, self.user_count, self.title
            ),
            Phase::Complete => format!(
                "{PREFIX}{}:{}:{}:{}:{} - {}",
                self.external_id,
                self.user_count,
                self.post_id.as_deref().unwrap_or(PLACEHOLDER),
                self.task_list_payload(),
                self.department,
                self.title
            ),
        }
    }

    fn task_list_payload(&self) -> String {
        if self.task_lists.is_empty() {
            return self
                .legacy_task_list_id
                .clone()
                .unwrap_or_else(|| PLACEHOLDER.to_string());
        }
        serde_json::to_string(&self.task_lists).unwrap_or_else(|_| PLACEHOLDER.to_string())
    }
}

/// Decode label text. Never fails: text that is not a managed label is
/// [`LabelMatch::Unmatched`].
pub fn decode(text: &str) -> LabelMatch {
    PARSERS
        .iter()
        .find_map(|parse| parse(text))
        .map_or(LabelMatch::Unmatched, LabelMatch::Matched)
}

/// Whether a display title belongs to a managed channel.
pub fn is_managed(title: &str) -> bool {
    title.starts_with(PREFIX)
}

fn parse_current(text: &str) -> Option<Label> {
    let caps = CURRENT.captures(text)?;
    let user_count = user_count(&caps[2]);
    let (task_lists, legacy_task_list_id) = parse_task_list_payload(&caps[4]);

    Some(Label {
        external_id: caps[1].to_string(),
        user_count,
        post_id: present(&caps[3]),
        task_lists,
        legacy_task_list_id,
        department: caps[5].to_string(),
        title: caps[6].to_string(),
    })
}

fn parse_legacy(text: &str) -> Option<Label> {
    let caps = LEGACY.captures(text)?;
    let user_count = user_count(&caps[2]);
    let prefix_end = caps.get(0)?.end();

    Some(Label {
        external_id: caps[1].to_string(),
        user_count,
        post_id: caps.get(3).and_then(|m| present(m.as_str())),
        task_lists: Vec::new(),
        legacy_task_list_id: caps.get(4).and_then(|m| present(m.as_str())),
        department: caps
            .get(5)
            .map_or(UNKNOWN_DEPARTMENT, |m| m.as_str())
            .to_string(),
        title: text[prefix_end..].trim().to_string(),
    })
}

/// Digits only; counts too large for a `u32` saturate.
fn user_count(digits: &str) -> u32 {
    digits.parse().unwrap_or(u32::MAX)
}

/// The payload is JSON when written by the current format, otherwise a
/// single legacy task-list id.
///
/// Array entries missing a list or installation id are skipped. Ids written
/// as numbers are read as strings.
fn parse_task_list_payload(payload: &str) -> (Vec<TaskListRef>, Option<String>) {
    match serde_json::from_str::<Value>(payload) {
        Ok(Value::Array(entries)) => (entries.iter().filter_map(task_list_ref).collect(), None),
        Ok(Value::String(id)) => (Vec::new(), present(&id)),
        Ok(Value::Number(id)) => (Vec::new(), Some(id.to_string())),
        Ok(_) => (Vec::new(), None),
        Err(_) => (Vec::new(), present(payload)),
    }
}

fn task_list_ref(entry: &Value) -> Option<TaskListRef> {
    Some(TaskListRef {
        store_id: id_field(entry, "storeId").unwrap_or_default(),
        installation_id: id_field(entry, "installationId")?,
        list_id: id_field(entry, "listId")?,
    })
}

fn id_field(entry: &Value, key: &str) -> Option<String> {
    match entry.get(key)? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// `None` for the placeholders older writers used for missing values.
fn present(field: &str) -> Option<String> {
    match field {
        "" | PLACEHOLDER | "null" | "undefined" => None,
        other => Some(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use proptest::prelude::*;

    fn lists() -> Vec<TaskListRef> {
        vec![
            TaskListRef {
                store_id: "1001".into(),
                installation_id: "64a1f0".into(),
                list_id: "77b2c9".into(),
            },
            TaskListRef {
                store_id: "1002".into(),
                installation_id: "64a1f1".into(),
                list_id: "77b2d0".into(),
            },
        ]
    }

    fn complete_label() -> Label {
        Label {
            external_id: "1700000000000".into(),
            user_count: 12,
            post_id: Some("post42".into()),
            task_lists: lists(),
            legacy_task_list_id: None,
            department: "Operations".into(),
            title: "Spring refit".into(),
        }
    }

    #[test]
    fn encodes_initial_label() {
        let label = Label::initial("1700000000000", 12, "Spring refit");
        assert_eq!(
            label.encode(Phase::Initial),
            "[external]1700000000000:12 - Spring refit"
        );
    }

    #[test]
    fn encodes_complete_label_with_json_task_lists() {
        assert_eq!(
            complete_label().encode(Phase::Complete),
            "[external]1700000000000:12:post42:\
             [{\"storeId\":\"1001\",\"installationId\":\"64a1f0\",\"listId\":\"77b2c9\"},\
             {\"storeId\":\"1002\",\"installationId\":\"64a1f1\",\"listId\":\"77b2d0\"}]\
             :Operations - Spring refit"
        );
    }

    #[test]
    fn complete_label_without_lists_uses_placeholder() {
        let mut label = complete_label();
        label.task_lists.clear();
        assert_eq!(
            label.encode(Phase::Complete),
            "[external]1700000000000:12:post42:unknown:Operations - Spring refit"
        );
    }

    #[test]
    fn decodes_complete_label() {
        let text = complete_label().encode(Phase::Complete);
        assert_eq!(decode(&text), LabelMatch::Matched(complete_label()));
    }

    #[test]
    fn decodes_initial_label_with_defaults() {
        let label = decode("[external]1700000000000:3 - Spring refit")
            .into_label()
            .unwrap();
        assert_eq!(label.external_id, "1700000000000");
        assert_eq!(label.user_count, 3);
        assert_eq!(label.post_id, None);
        assert!(label.task_lists.is_empty());
        assert_eq!(label.department, UNKNOWN_DEPARTMENT);
        assert_eq!(label.title, "Spring refit");
    }

    #[test]
    fn scalar_payload_is_a_legacy_task_list() {
        let label = decode("[external]17:4:post9:list5:Marketing - Window display")
            .into_label()
            .unwrap();
        assert!(label.task_lists.is_empty());
        assert_eq!(label.legacy_task_list_id.as_deref(), Some("list5"));
        assert_eq!(label.post_id.as_deref(), Some("post9"));
        assert_eq!(label.department, "Marketing");
        assert_eq!(label.title, "Window display");
    }

    #[test]
    fn legacy_label_with_post_only() {
        let label = decode("[external]17:4:post9 - Window display")
            .into_label()
            .unwrap();
        assert_eq!(label.post_id.as_deref(), Some("post9"));
        assert_eq!(label.legacy_task_list_id, None);
        assert_eq!(label.department, UNKNOWN_DEPARTMENT);
        assert_eq!(label.title, "Window display");
    }

    #[test]
    fn placeholder_payload_means_no_lists() {
        let label = decode("[external]17:4:post9:unknown:Sales - Promo")
            .into_label()
            .unwrap();
        assert!(label.task_lists.is_empty());
        assert_eq!(label.legacy_task_list_id, None);
    }

    #[test]
    fn empty_json_array_means_no_lists() {
        let label = decode("[external]17:4:post9:[]:Sales - Promo")
            .into_label()
            .unwrap();
        assert!(label.task_lists.is_empty());
        assert_eq!(label.legacy_task_list_id, None);
    }

    #[test]
    fn unmanaged_titles_are_unmatched() {
        for text in [
            "",
            "Store 1001",
            "[external]",
            "[external]abc - no count",
            "[internal]17:4 - Promo",
        ] {
            assert_eq!(decode(text), LabelMatch::Unmatched, "{text:?}");
        }
    }

    #[test]
    fn oversized_user_count_saturates() {
        let label = decode("[external]17:99999999999:post9:unknown:Sales - Promo")
            .into_label()
            .unwrap();
        assert_eq!(label.user_count, u32::MAX);
        assert_eq!(label.post_id.as_deref(), Some("post9"));
        assert_eq!(label.department, "Sales");

        let label = decode("[external]17:99999999999999999999 - Promo")
            .into_label()
            .unwrap();
        assert_eq!(label.user_count, u32::MAX);
        assert_eq!(label.title, "Promo");
    }

    #[test]
    fn numeric_ids_in_task_list_payload() {
        let label = decode(
            r#"[external]17:4:post9:[{"storeId":1001,"installationId":"p1","listId":"l1"},{"storeId":"1002","installationId":42,"listId":7}]:Sales - Promo"#,
        )
        .into_label()
        .unwrap();
        assert_eq!(
            label.task_lists,
            vec![
                TaskListRef {
                    store_id: "1001".into(),
                    installation_id: "p1".into(),
                    list_id: "l1".into(),
                },
                TaskListRef {
                    store_id: "1002".into(),
                    installation_id: "42".into(),
                    list_id: "7".into(),
                },
            ]
        );
        assert_eq!(label.legacy_task_list_id, None);
    }

    #[test]
    fn incomplete_task_list_entries_are_skipped() {
        let label = decode(
            r#"[external]17:4:post9:[{"installationId":"p1","listId":"l1"},{"storeId":"1002","listId":"l2"}]:Sales - Promo"#,
        )
        .into_label()
        .unwrap();
        assert_eq!(
            label.task_lists,
            vec![TaskListRef {
                store_id: String::new(),
                installation_id: "p1".into(),
                list_id: "l1".into(),
            }]
        );
        assert_eq!(label.legacy_task_list_id, None);
    }

    #[test]
    fn numeric_payload_is_a_legacy_task_list() {
        let label = decode("[external]17:4:post9:9001:Sales - Promo")
            .into_label()
            .unwrap();
        assert!(label.task_lists.is_empty());
        assert_eq!(label.legacy_task_list_id.as_deref(), Some("9001"));
    }

    #[test]
    fn is_managed_checks_prefix() {
        assert!(is_managed("[external]17:4 - Promo"));
        assert!(!is_managed("Store 1001"));
    }

    fn task_list_ref() -> impl Strategy<Value = TaskListRef> {
        ("[A-Za-z0-9]{1,6}", "[a-f0-9]{6,24}", "[a-f0-9]{6,24}").prop_map(
            |(store_id, installation_id, list_id)| TaskListRef {
                store_id,
                installation_id,
                list_id,
            },
        )
    }

    const TITLE: &str = "[A-Za-z0-9]([A-Za-z0-9 ]{0,30}[A-Za-z0-9])?";

    proptest! {
        #[test]
        fn decode_never_panics(text in "\\PC*") {
            let _ = decode(&text);
        }

        #[test]
        fn initial_label_round_trips(
            external_id in "[0-9]{1,13}",
            user_count in any::<u32>(),
            title in TITLE,
        ) {
            let label = Label::initial(external_id, user_count, title);
            prop_assert_eq!(decode(&label.encode(Phase::Initial)), LabelMatch::Matched(label));
        }

        #[test]
        fn complete_label_round_trips(
            external_id in "[0-9]{1,13}",
            user_count in any::<u32>(),
            post_id in proptest::option::of("[a-f0-9]{6,24}"),
            task_lists in proptest::collection::vec(task_list_ref(), 0..4),
            department in "[A-Za-z]{1,12}",
            title in TITLE,
        ) {
            let label = Label {
                external_id,
                user_count,
                post_id,
                task_lists,
                legacy_task_list_id: None,
                department,
                title,
            };
            prop_assert_eq!(decode(&label.encode(Phase::Complete)), LabelMatch::Matched(label));
        }
    }
}
