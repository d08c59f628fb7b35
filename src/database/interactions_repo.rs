use sqlx::SqliteExecutor;

use crate::models::InteractionsRow;

const SQL_FIND_LIKE: &str = r#"
SELECT interaction_id, user_id, activity_id, interaction_type, content, created_at
FROM interactions
WHERE user_id = ? AND activity_id = ? AND interaction_type = 'Like'
"#;

pub async fn find_like(
    ex: impl SqliteExecutor<'_>,
    user_id: &str,
    activity_id: &str,
) -> sqlx::Result<Option<InteractionsRow>> {
    sqlx::query_as::<_, InteractionsRow>(SQL_FIND_LIKE)
        .bind(user_id)
        .bind(activity_id)
        .fetch_optional(ex)
        .await
}

const SQL_DELETE_INTERACTION: &str = r#"
DELETE FROM interactions
WHERE interaction_id = ?
"#;

pub async fn delete_interaction(
    ex: impl SqliteExecutor<'_>,
    interaction_id: &str,
) -> sqlx::Result<u64> {
    let res = sqlx::query(SQL_DELETE_INTERACTION)
        .bind(interaction_id)
        .execute(ex)
        .await?;
    Ok(res.rows_affected())
}

const SQL_INSERT_INTERACTION: &str = r#"
INSERT INTO interactions (interaction_id, user_id, activity_id, interaction_type, content)
VALUES (?, ?, ?, ?, ?)
"#;

pub async fn insert_interaction(
    ex: impl SqliteExecutor<'_>,
    interaction_id: &str,
    user_id: &str,
    activity_id: &str,
    interaction_type: &str,
    content: Option<&str>,
) -> sqlx::Result<u64> {
    let res = sqlx::query(SQL_INSERT_INTERACTION)
        .bind(interaction_id)
        .bind(user_id)
        .bind(activity_id)
        .bind(interaction_type)
        .bind(content)
        .execute(ex)
        .await?;
    Ok(res.rows_affected())
}

const SQL_LIKE_COUNT: &str = r#"
SELECT COUNT(*)
FROM interactions
WHERE activity_id = ? AND interaction_type = 'Like'
"#;

pub async fn like_count(
    ex: impl SqliteExecutor<'_>,
    activity_id: &str,
) -> sqlx::Result<i64> {
    sqlx::query_scalar::<_, i64>(SQL_LIKE_COUNT)
        .bind(activity_id)
        .fetch_one(ex)
        .await
}
