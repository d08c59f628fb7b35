use chrono::{NaiveDate, NaiveTime};
use sqlx::SqliteExecutor;

use crate::models::{ActivitiesRow, ActivityScheduleRow};

const SQL_LOAD_ACTIVITY: &str = r#"
SELECT
  activity_id, title, description, activity_type, price, max_participants,
  location, start_date, end_date, start_time, end_time, status, is_active,
  created_by
FROM activities
WHERE activity_id = ?
"#;

pub async fn load_activity_by_id(
    ex: impl SqliteExecutor<'_>,
    activity_id: &str,
) -> sqlx::Result<Option<ActivitiesRow>> {
    sqlx::query_as::<_, ActivitiesRow>(SQL_LOAD_ACTIVITY)
        .bind(activity_id)
        .fetch_optional(ex)
        .await
}

// The participant count is always derived from the registration set; it is
// never read from a stored counter.
const SQL_APPROVED_COUNT: &str = r#"
SELECT COUNT(*)
FROM registrations
WHERE activity_id = ? AND status = 'Approved'
"#;

pub async fn approved_count(
    ex: impl SqliteExecutor<'_>,
    activity_id: &str,
) -> sqlx::Result<i64> {
    sqlx::query_scalar::<_, i64>(SQL_APPROVED_COUNT)
        .bind(activity_id)
        .fetch_one(ex)
        .await
}

const SQL_LIST_PUBLISHED_SCHEDULES: &str = r#"
SELECT activity_id, title, start_date, end_date, start_time, end_time
FROM activities
WHERE status = 'Published' AND activity_id != ?
"#;

/// Schedules of all published activities except the given one, used by the
/// publish-time conflict warning.
pub async fn list_published_schedules(
    ex: impl SqliteExecutor<'_>,
    exclude_activity_id: &str,
) -> sqlx::Result<Vec<ActivityScheduleRow>> {
    sqlx::query_as::<_, ActivityScheduleRow>(SQL_LIST_PUBLISHED_SCHEDULES)
        .bind(exclude_activity_id)
        .fetch_all(ex)
        .await
}

pub struct NewActivity<'a> {
    pub activity_id: &'a str,
    pub title: &'a str,
    pub description: &'a str,
    pub activity_type: &'a str,
    pub price: i64,
    pub max_participants: i64,
    pub location: &'a str,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub status: &'a str,
    pub created_by: &'a str,
}

const SQL_INSERT_ACTIVITY: &str = r#"
INSERT INTO activities (
  activity_id, title, description, activity_type, price, max_participants,
  location, start_date, end_date, start_time, end_time, status, is_active,
  created_by
) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, 1, ?)
"#;

pub async fn insert_activity(
    ex: impl SqliteExecutor<'_>,
    activity: NewActivity<'_>,
) -> sqlx::Result<u64> {
    let res = sqlx::query(SQL_INSERT_ACTIVITY)
        .bind(activity.activity_id)
        .bind(activity.title)
        .bind(activity.description)
        .bind(activity.activity_type)
        .bind(activity.price)
        .bind(activity.max_participants)
        .bind(activity.location)
        .bind(activity.start_date)
        .bind(activity.end_date)
        .bind(activity.start_time)
        .bind(activity.end_time)
        .bind(activity.status)
        .bind(activity.created_by)
        .execute(ex)
        .await?;
    Ok(res.rows_affected())
}

const SQL_SET_STATUS: &str = r#"
UPDATE activities
SET status = ?, updated_at = datetime('now')
WHERE activity_id = ?
"#;

pub async fn set_status(
    ex: impl SqliteExecutor<'_>,
    activity_id: &str,
    status: &str,
) -> sqlx::Result<u64> {
    let res = sqlx::query(SQL_SET_STATUS)
        .bind(status)
        .bind(activity_id)
        .execute(ex)
        .await?;
    Ok(res.rows_affected())
}
