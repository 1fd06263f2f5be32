//! Task queries. Every statement that reaches a task by id joins through
//! `projects` so the owner check and the read/write happen in one round trip.

use serde::Serialize;
use sqlx::{FromRow, PgPool};

use super::{dto::TaskChanges, status::TaskStatus};

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Task {
    pub id: i64,
    pub project_id: i64,
    pub title: String,
    pub status: TaskStatus,
}

pub async fn list_by_project(db: &PgPool, project_id: i64) -> Result<Vec<Task>, sqlx::Error> {
    sqlx::query_as::<_, Task>(
        r#"
        SELECT id, project_id, title, status
        FROM tasks
        WHERE project_id = $1
        ORDER BY id
        "#,
    )
    .bind(project_id)
    .fetch_all(db)
    .await
}

/// `None` when the project does not exist or belongs to someone else.
pub async fn create_in_owned_project(
    db: &PgPool,
    project_id: i64,
    user_id: i64,
    title: &str,
) -> Result<Option<Task>, sqlx::Error> {
    sqlx::query_as::<_, Task>(
        r#"
        INSERT INTO tasks (project_id, title)
        SELECT p.id, $3
        FROM projects p
        WHERE p.id = $1 AND p.user_id = $2
        RETURNING id, project_id, title, status
        "#,
    )
    .bind(project_id)
    .bind(user_id)
    .bind(title)
    .fetch_optional(db)
    .await
}

pub async fn find_owned(db: &PgPool, task_id: i64, user_id: i64) -> Result<Option<Task>, sqlx::Error> {
    sqlx::query_as::<_, Task>(
        r#"
        SELECT t.id, t.project_id, t.title, t.status
        FROM tasks t
        JOIN projects p ON p.id = t.project_id
        WHERE t.id = $1 AND p.user_id = $2
        "#,
    )
    .bind(task_id)
    .bind(user_id)
    .fetch_optional(db)
    .await
}

/// Applies the supplied fields; absent ones keep their stored value.
pub async fn update_owned(
    db: &PgPool,
    task_id: i64,
    user_id: i64,
    changes: &TaskChanges,
) -> Result<Option<Task>, sqlx::Error> {
    sqlx::query_as::<_, Task>(
        r#"
        UPDATE tasks t
        SET title  = COALESCE($3, t.title),
            status = COALESCE($4, t.status)
        FROM projects p
        WHERE t.id = $1
          AND p.id = t.project_id
          AND p.user_id = $2
        RETURNING t.id, t.project_id, t.title, t.status
        "#,
    )
    .bind(task_id)
    .bind(user_id)
    .bind(changes.title.as_deref())
    .bind(changes.status.map(TaskStatus::as_str))
    .fetch_optional(db)
    .await
}

pub async fn delete_owned(db: &PgPool, task_id: i64, user_id: i64) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        r#"
        DELETE FROM tasks t
        USING projects p
        WHERE t.id = $1
          AND p.id = t.project_id
          AND p.user_id = $2
        "#,
    )
    .bind(task_id)
    .bind(user_id)
    .execute(db)
    .await?;
    Ok(result.rows_affected() > 0)
}
