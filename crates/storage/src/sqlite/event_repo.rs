use async_trait::async_trait;
use chrono::{DateTime, Utc};

use revise_core::model::{CalendarEvent, EventId, UserId};

use super::SqliteRepository;
use super::mapping::map_event_row;
use crate::repository::{EventRepository, StorageError};

#[async_trait]
impl EventRepository for SqliteRepository {
    async fn upsert_event(&self, event: &CalendarEvent) -> Result<(), StorageError> {
        sqlx::query(
            r"
                INSERT INTO calendar_events (
                    id, user_id, title, start_at, end_at, is_blocking,
                    kind, subject_name
                )
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                ON CONFLICT(id) DO UPDATE SET
                    title = excluded.title,
                    start_at = excluded.start_at,
                    end_at = excluded.end_at,
                    is_blocking = excluded.is_blocking,
                    kind = excluded.kind,
                    subject_name = excluded.subject_name
            ",
        )
        .bind(event.id().to_string())
        .bind(event.user_id().to_string())
        .bind(event.title())
        .bind(event.start())
        .bind(event.end())
        .bind(event.is_blocking())
        .bind(event.kind().as_str())
        .bind(event.subject_name())
        .execute(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        Ok(())
    }

    async fn list_events(
        &self,
        user_id: UserId,
        from: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> Result<Vec<CalendarEvent>, StorageError> {
        let rows = sqlx::query(
            r"
                SELECT id, user_id, title, start_at, end_at, is_blocking,
                       kind, subject_name
                FROM calendar_events
                WHERE user_id = ?1 AND start_at >= ?2 AND start_at < ?3
                ORDER BY start_at ASC, id ASC
            ",
        )
        .bind(user_id.to_string())
        .bind(from)
        .bind(until)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            out.push(map_event_row(&row)?);
        }
        Ok(out)
    }

    async fn delete_event(&self, user_id: UserId, id: EventId) -> Result<(), StorageError> {
        let res = sqlx::query("DELETE FROM calendar_events WHERE user_id = ?1 AND id = ?2")
            .bind(user_id.to_string())
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;

        if res.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }
        Ok(())
    }
}
