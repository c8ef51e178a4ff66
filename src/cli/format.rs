//! Output formatting for CLI display.

use crate::{
    model::{ManagedChannel, PostStatus, Verification},
    publish::{CreatedChannel, StoreResult},
    removal::Deleted,
};

/// One line per channel.
pub(super) fn format_channel(channel: &ManagedChannel, status: Option<PostStatus>) -> String {
    let created = channel.created_at.strftime("%Y-%m-%d %H:%M");
    let status = status.map_or(String::new(), |s| format!("[{}] ", s.as_str()));
    format!(
        "{}  {created}  {status}[{}]  {}  ({}, {})  channel {}",
        channel.external_id,
        channel.department,
        channel.title,
        plural(channel.user_count as usize, "user"),
        plural(
            channel.task_lists.len() + usize::from(channel.legacy_task_list_id.is_some()),
            "task list"
        ),
        channel.channel_id,
    )
}

pub(super) fn format_created(created: &CreatedChannel) -> String {
    let mut lines = vec![
        format!("Created channel {}", created.channel_id),
        format!("  post:        {}", created.post_id),
        format!("  external id: {}", created.external_id),
        format!("  users:       {}", created.user_count),
        format!("  department:  {}", created.department),
    ];
    if created.task_count > 0 {
        lines.push(format!(
            "  tasks:       {} per store",
            created.task_count
        ));
    }
    lines.extend(created.stores.iter().map(format_store_result));
    lines.join("\n")
}

fn format_store_result(result: &StoreResult) -> String {
    match result {
        StoreResult::Created {
            store_id,
            list_id,
            task_count,
            ..
        } => format!(
            "  store {store_id}: list {list_id} with {}",
            plural(*task_count, "task")
        ),
        StoreResult::ProjectMissing { store_id } => {
            format!("  store {store_id}: no project, skipped")
        }
        StoreResult::Failed { store_id, reason } => format!("  store {store_id}: failed ({reason})"),
    }
}

pub(super) fn format_deleted(deleted: &Deleted) -> String {
    format!(
        "Deleted channel {} ({} deleted)",
        deleted.channel_id,
        plural(deleted.task_lists_deleted, "task list")
    )
}

pub(super) fn format_verification(verification: &Verification) -> String {
    let mut lines = vec![format!(
        "Found {} of {} ids",
        verification.found_users.len(),
        verification.total_requested()
    )];
    for user in &verification.found_users {
        lines.push(format!("  {}  {}  ({})", user.csv_id, user.name, user.id));
    }
    if !verification.not_found_ids.is_empty() {
        lines.push(format!(
            "Not found: {}",
            verification.not_found_ids.join(", ")
        ));
    }
    lines.join("\n")
}

fn plural(count: usize, noun: &str) -> String {
    if count == 1 {
        format!("1 {noun}")
    } else {
        format!("{count} {noun}s")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use jiff::Timestamp;

    use crate::model::{MatchedUser, TaskListRef};

    fn channel() -> ManagedChannel {
        ManagedChannel {
            channel_id: "chan1".into(),
            installation_id: "chan1".into(),
            external_id: "1700000000000".into(),
            user_count: 1,
            post_id: Some("post1".into()),
            task_lists: vec![TaskListRef {
                store_id: "1001".into(),
                installation_id: "proj1".into(),
                list_id: "list1".into(),
            }],
            legacy_task_list_id: None,
            department: "Sales".into(),
            title: "Promo".into(),
            created_at: "2024-03-01T08:30:00Z".parse::<Timestamp>().unwrap(),
            posts: vec![],
        }
    }

    #[test]
    fn channel_line() {
        assert_eq!(
            format_channel(&channel(), Some(PostStatus::Scheduled)),
            "1700000000000  2024-03-01 08:30  [scheduled] [Sales]  Promo  (1 user, 1 task list)  channel chan1"
        );
        assert!(format_channel(&channel(), None).contains("08:30  [Sales]"));
    }

    #[test]
    fn store_results() {
        assert_eq!(
            format_store_result(&StoreResult::Created {
                store_id: "1001".into(),
                installation_id: "proj1".into(),
                list_id: "list1".into(),
                task_count: 2,
            }),
            "  store 1001: list list1 with 2 tasks"
        );
        assert_eq!(
            format_store_result(&StoreResult::ProjectMissing {
                store_id: "1002".into()
            }),
            "  store 1002: no project, skipped"
        );
    }

    #[test]
    fn verification_summary() {
        let verification = Verification {
            found_users: vec![MatchedUser {
                id: "u1".into(),
                csv_id: "1001".into(),
                name: "Ada Lovelace".into(),
            }],
            not_found_ids: vec!["9998".into(), "9999".into()],
        };

        assert_eq!(
            format_verification(&verification),
            "Found 1 of 3 ids\n  1001  Ada Lovelace  (u1)\nNot found: 9998, 9999"
        );
    }
}
