//! Persisted request log, so `debug` can show requests from earlier runs.

use rusqlite::{OptionalExtension, params};

use crate::staffbase::{RecordedRequest, RequestKind};

use super::{Result, Storage, StorageError};

impl Storage {
    /// Appends requests (oldest first) and keeps only the newest `capacity`.
    pub fn append_requests(&self, requests: &[RecordedRequest], capacity: usize) -> Result<()> {
        if requests.is_empty() {
            return Ok(());
        }
        let tx = self.conn.unchecked_transaction()?;
        for request in requests {
            let body = request
                .body
                .as_ref()
                .map(serde_json::to_string)
                .transpose()?;
            tx.execute(
                "INSERT INTO request_log (method, url, kind, token_fingerprint, body, sent_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    &request.method,
                    &request.url,
                    request.kind.as_str(),
                    &request.token_fingerprint,
                    body,
                    request.sent_at.to_string(),
                ],
            )?;
        }
        tx.execute(
            "DELETE FROM request_log
             WHERE seq NOT IN (SELECT seq FROM request_log ORDER BY seq DESC LIMIT ?1)",
            [i64::try_from(capacity.max(1)).unwrap_or(i64::MAX)],
        )?;
        tx.commit()?;
        Ok(())
    }

    /// The most recent request, optionally of one kind only.
    pub fn latest_request(&self, kind: Option<RequestKind>) -> Result<Option<RecordedRequest>> {
        let row = self
            .conn
            .query_row(
                "SELECT method, url, kind, token_fingerprint, body, sent_at FROM request_log
                 WHERE ?1 IS NULL OR kind = ?1
                 ORDER BY seq DESC LIMIT 1",
                [kind.map(RequestKind::as_str)],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, String>(3)?,
                        row.get::<_, Option<String>>(4)?,
                        row.get::<_, String>(5)?,
                    ))
                },
            )
            .optional()?;

        let Some((method, url, kind, token_fingerprint, body, sent_at)) = row else {
            return Ok(None);
        };
        let kind = RequestKind::parse(&kind)
            .ok_or_else(|| StorageError::Corrupt(format!("unknown request kind: {kind}")))?;
        let body = body.as_deref().map(serde_json::from_str).transpose()?;
        let sent_at = sent_at
            .parse()
            .map_err(|e| StorageError::Corrupt(format!("invalid sent_at: {e}")))?;

        Ok(Some(RecordedRequest {
            method,
            url,
            kind,
            token_fingerprint,
            body,
            sent_at,
        }))
    }
}
