//! Channel registry: record, list, find, and remove managed channels.

use jiff::Timestamp;
use rusqlite::{Connection, OptionalExtension, Row, params};

use crate::model::{ManagedChannel, PostSummary, TaskListRef};

use super::{Result, Storage, StorageError};

const COLUMNS: &str = "external_id, channel_id, installation_id, user_count, post_id, \
                       task_lists, legacy_task_list_id, department, title, created_at";

impl Storage {
    /// Records a channel, replacing any earlier record with the same external id.
    pub fn upsert_channel(&self, channel: &ManagedChannel) -> Result<()> {
        insert(&self.conn, channel)
    }

    /// All recorded channels, newest first.
    pub fn list_channels(&self) -> Result<Vec<ManagedChannel>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {COLUMNS} FROM channel ORDER BY created_at DESC, external_id DESC"
        ))?;
        let rows = stmt.query_map([], read_row)?;
        let mut channels = Vec::new();
        for row in rows {
            channels.push(into_channel(row?)?);
        }
        Ok(channels)
    }

    /// The recorded channel with this vendor channel id, if any.
    pub fn find_channel(&self, channel_id: &str) -> Result<Option<ManagedChannel>> {
        let row = self
            .conn
            .query_row(
                &format!("SELECT {COLUMNS} FROM channel WHERE channel_id = ?1 LIMIT 1"),
                [channel_id],
                read_row,
            )
            .optional()?;
        row.map(into_channel).transpose()
    }

    /// Forgets a channel by vendor channel id.
    pub fn remove_channel(&self, channel_id: &str) -> Result<()> {
        let rows = self
            .conn
            .execute("DELETE FROM channel WHERE channel_id = ?1", [channel_id])?;
        if rows == 0 {
            return Err(StorageError::ChannelNotFound(channel_id.to_string()));
        }
        Ok(())
    }

    /// Replaces the whole registry with `channels`.
    pub fn replace_channels(&self, channels: &[ManagedChannel]) -> Result<usize> {
        let tx = self.conn.unchecked_transaction()?;
        tx.execute("DELETE FROM channel", [])?;
        for channel in channels {
            insert(&tx, channel)?;
        }
        tx.commit()?;
        Ok(channels.len())
    }
}

fn insert(conn: &Connection, channel: &ManagedChannel) -> Result<()> {
    let task_lists = serde_json::to_string(&channel.task_lists)?;
    conn.execute(
        &format!(
            "INSERT OR REPLACE INTO channel ({COLUMNS})
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)"
        ),
        params![
            &channel.external_id,
            &channel.channel_id,
            &channel.installation_id,
            channel.user_count,
            &channel.post_id,
            task_lists,
            &channel.legacy_task_list_id,
            &channel.department,
            &channel.title,
            channel.created_at.to_string(),
        ],
    )?;
    Ok(())
}

/// Raw column values of one channel row.
struct ChannelRow {
    external_id: String,
    channel_id: String,
    installation_id: String,
    user_count: u32,
    post_id: Option<String>,
    task_lists: String,
    legacy_task_list_id: Option<String>,
    department: String,
    title: String,
    created_at: String,
}

fn read_row(row: &Row<'_>) -> rusqlite::Result<ChannelRow> {
    Ok(ChannelRow {
        external_id: row.get(0)?,
        channel_id: row.get(1)?,
        installation_id: row.get(2)?,
        user_count: row.get(3)?,
        post_id: row.get(4)?,
        task_lists: row.get(5)?,
        legacy_task_list_id: row.get(6)?,
        department: row.get(7)?,
        title: row.get(8)?,
        created_at: row.get(9)?,
    })
}

fn into_channel(row: ChannelRow) -> Result<ManagedChannel> {
    let task_lists: Vec<TaskListRef> = serde_json::from_str(&row.task_lists).map_err(|e| {
        StorageError::Corrupt(format!("invalid task lists for {}: {e}", row.external_id))
    })?;
    let created_at = row
        .created_at
        .parse::<Timestamp>()
        .map_err(|e| StorageError::Corrupt(format!("invalid created_at: {e}")))?;
    let posts = row
        .post_id
        .iter()
        .map(|post_id| PostSummary {
            post_id: post_id.clone(),
            title: row.title.clone(),
            created_at,
        })
        .collect();

    Ok(ManagedChannel {
        channel_id: row.channel_id,
        installation_id: row.installation_id,
        external_id: row.external_id,
        user_count: row.user_count,
        post_id: row.post_id,
        task_lists,
        legacy_task_list_id: row.legacy_task_list_id,
        department: row.department,
        title: row.title,
        created_at,
        posts,
    })
}
