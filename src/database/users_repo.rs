use sqlx::SqliteExecutor;

use crate::models::UsersRow;

const SQL_LOAD_USER: &str = r#"
SELECT user_id, full_name, role, parent_id
FROM users
WHERE user_id = ?
"#;

pub async fn load_user(
    ex: impl SqliteExecutor<'_>,
    user_id: &str,
) -> sqlx::Result<Option<UsersRow>> {
    sqlx::query_as::<_, UsersRow>(SQL_LOAD_USER)
        .bind(user_id)
        .fetch_optional(ex)
        .await
}
