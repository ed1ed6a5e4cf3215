use async_trait::async_trait;

use revise_core::model::{Subject, SubjectId, SubjectStatus, UserId};

use super::SqliteRepository;
use super::mapping::map_subject_row;
use crate::repository::{StorageError, SubjectRepository};

#[async_trait]
impl SubjectRepository for SqliteRepository {
    async fn upsert_subject(&self, subject: &Subject) -> Result<(), StorageError> {
        sqlx::query(
            r"
                INSERT INTO subjects (
                    id, user_id, name, color, exam_date, exam_weight,
                    target_hours, notes, exam_type, difficulty_level,
                    status, created_at
                )
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
                ON CONFLICT(id) DO UPDATE SET
                    name = excluded.name,
                    color = excluded.color,
                    exam_date = excluded.exam_date,
                    exam_weight = excluded.exam_weight,
                    target_hours = excluded.target_hours,
                    notes = excluded.notes,
                    exam_type = excluded.exam_type,
                    difficulty_level = excluded.difficulty_level,
                    status = excluded.status
            ",
        )
        .bind(subject.id().to_string())
        .bind(subject.user_id().to_string())
        .bind(subject.name())
        .bind(subject.color())
        .bind(subject.exam_date())
        .bind(subject.exam_weight())
        .bind(subject.target_hours())
        .bind(subject.notes())
        .bind(subject.exam_type())
        .bind(subject.difficulty_level().map(i64::from))
        .bind(subject.status().as_str())
        .bind(subject.created_at())
        .execute(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        Ok(())
    }

    async fn get_subject(
        &self,
        user_id: UserId,
        id: SubjectId,
    ) -> Result<Option<Subject>, StorageError> {
        let row = sqlx::query(
            r"
                SELECT id, user_id, name, color, exam_date, exam_weight,
                       target_hours, notes, exam_type, difficulty_level,
                       status, created_at
                FROM subjects
                WHERE user_id = ?1 AND id = ?2
            ",
        )
        .bind(user_id.to_string())
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        row.as_ref().map(map_subject_row).transpose()
    }

    async fn list_subjects(
        &self,
        user_id: UserId,
        status: Option<SubjectStatus>,
    ) -> Result<Vec<Subject>, StorageError> {
        let mut sql = String::from(
            r"
                SELECT id, user_id, name, color, exam_date, exam_weight,
                       target_hours, notes, exam_type, difficulty_level,
                       status, created_at
                FROM subjects
                WHERE user_id = ?1
            ",
        );
        if status.is_some() {
            sql.push_str(" AND status = ?2");
        }
        sql.push_str(" ORDER BY name ASC, id ASC");

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
            out.push(map_subject_row(&row)?);
        }
        Ok(out)
    }

    async fn delete_subject(&self, user_id: UserId, id: SubjectId) -> Result<(), StorageError> {
        let res = sqlx::query("DELETE FROM subjects WHERE user_id = ?1 AND id = ?2")
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
