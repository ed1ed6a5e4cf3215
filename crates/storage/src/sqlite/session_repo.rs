use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::Row;

use revise_core::model::{RevisionSession, SessionId, SessionStatus, UserId};

use super::SqliteRepository;
use super::mapping::{map_session_row, ser};
use crate::repository::{SessionRepository, StorageError};

#[async_trait]
impl SessionRepository for SqliteRepository {
    async fn upsert_session(&self, session: &RevisionSession) -> Result<(), StorageError> {
        sqlx::query(
            r"
                INSERT INTO revision_sessions (
                    id, user_id, subject_id, date, start_time, end_time,
                    status, notes, created_at
                )
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
                ON CONFLICT(id) DO UPDATE SET
                    subject_id = excluded.subject_id,
                    date = excluded.date,
                    start_time = excluded.start_time,
                    end_time = excluded.end_time,
                    status = excluded.status,
                    notes = excluded.notes
            ",
        )
        .bind(session.id().to_string())
        .bind(session.user_id().to_string())
        .bind(session.subject_id().map(|id| id.to_string()))
        .bind(session.date())
        .bind(session.start())
        .bind(session.end())
        .bind(session.status().as_str())
        .bind(session.notes())
        .bind(session.created_at())
        .execute(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        Ok(())
    }

    async fn get_session(
        &self,
        user_id: UserId,
        id: SessionId,
    ) -> Result<Option<RevisionSession>, StorageError> {
        let row = sqlx::query(
            r"
                SELECT id, user_id, subject_id, date, start_time, end_time,
                       status, notes, created_at
                FROM revision_sessions
                WHERE user_id = ?1 AND id = ?2
            ",
        )
        .bind(user_id.to_string())
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        row.as_ref().map(map_session_row).transpose()
    }

    async fn list_sessions(
        &self,
        user_id: UserId,
        from: NaiveDate,
        until: NaiveDate,
        status: Option<SessionStatus>,
    ) -> Result<Vec<RevisionSession>, StorageError> {
        let mut sql = String::from(
            r"
                SELECT id, user_id, subject_id, date, start_time, end_time,
                       status, notes, created_at
                FROM revision_sessions
                WHERE user_id = ?1 AND date >= ?2 AND date <= ?3
            ",
        );
        if status.is_some() {
            sql.push_str(" AND status = ?4");
        }
        sql.push_str(" ORDER BY date ASC, start_time ASC, id ASC");

        let mut query = sqlx::query(&sql)
            .bind(user_id.to_string())
            .bind(from)
            .bind(until);
        if let Some(status) = status {
            query = query.bind(status.as_str());
        }

        let rows = query
            .fetch_all(&self.pool)
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;

        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            out.push(map_session_row(&row)?);
        }
        Ok(out)
    }

    async fn list_all_sessions(
        &self,
        user_id: UserId,
        status: Option<SessionStatus>,
    ) -> Result<Vec<RevisionSession>, StorageError> {
        let mut sql = String::from(
            r"
                SELECT id, user_id, subject_id, date, start_time, end_time,
                       status, notes, created_at
                FROM revision_sessions
                WHERE user_id = ?1
            ",
        );
        if status.is_some() {
            sql.push_str(" AND status = ?2");
        }
        sql.push_str(" ORDER BY date ASC, start_time ASC, id ASC");

        let mut query = sqlx::query(&sql).bind(user_id.to_string());
        if let Some(status) = status {
            query = query.bind(status.as_str());
        }

        let rows = query
            .fetch_all(&self.pool)
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;

        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            out.push(map_session_row(&row)?);
        }
        Ok(out)
    }

    async fn delete_session(&self, user_id: UserId, id: SessionId) -> Result<(), StorageError> {
        let res = sqlx::query("DELETE FROM revision_sessions WHERE user_id = ?1 AND id = ?2")
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

    async fn done_dates(
        &self,
        user_id: UserId,
        from: NaiveDate,
        until: NaiveDate,
    ) -> Result<Vec<NaiveDate>, StorageError> {
        let rows = sqlx::query(
            r"
                SELECT DISTINCT date
                FROM revision_sessions
                WHERE user_id = ?1 AND status = 'done'
                  AND date >= ?2 AND date <= ?3
                ORDER BY date ASC
            ",
        )
        .bind(user_id.to_string())
        .bind(from)
        .bind(until)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        let mut dates = Vec::with_capacity(rows.len());
        for row in rows {
            dates.push(row.try_get("date").map_err(ser)?);
        }
        Ok(dates)
    }
}
