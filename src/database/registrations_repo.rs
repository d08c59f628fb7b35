use sqlx::SqliteExecutor;

use crate::models::{ActivityScheduleRow, RegistrationWithActivityRow, RegistrationsRow};

const SQL_LOAD_BY_ID: &str = r#"
SELECT
  registration_id, user_id, student_id, parent_id, activity_id,
  status, payment_status, attendance_status, notes, registered_at
FROM registrations
WHERE registration_id = ?
"#;

pub async fn load_by_id(
    ex: impl SqliteExecutor<'_>,
    registration_id: &str,
) -> sqlx::Result<Option<RegistrationsRow>> {
    sqlx::query_as::<_, RegistrationsRow>(SQL_LOAD_BY_ID)
        .bind(registration_id)
        .fetch_optional(ex)
        .await
}

const SQL_FIND_LIVE: &str = r#"
SELECT
  registration_id, user_id, student_id, parent_id, activity_id,
  status, payment_status, attendance_status, notes, registered_at
FROM registrations
WHERE student_id = ? AND activity_id = ? AND status IN ('Pending', 'Approved')
"#;

/// The live (Pending or Approved) registration for a student/activity pair,
/// if any. The partial unique index guarantees there is at most one; Rejected
/// and Cancelled rows are history and do not block a new attempt.
pub async fn find_live_by_student_activity(
    ex: impl SqliteExecutor<'_>,
    student_id: &str,
    activity_id: &str,
) -> sqlx::Result<Option<RegistrationsRow>> {
    sqlx::query_as::<_, RegistrationsRow>(SQL_FIND_LIVE)
        .bind(student_id)
        .bind(activity_id)
        .fetch_optional(ex)
        .await
}

const SQL_FIND_LIVE_TIED_TO_USER: &str = r#"
SELECT
  registration_id, user_id, student_id, parent_id, activity_id,
  status, payment_status, attendance_status, notes, registered_at
FROM registrations
WHERE activity_id = ?
  AND (user_id = ? OR student_id = ? OR parent_id = ?)
  AND status IN ('Pending', 'Approved')
LIMIT 1
"#;

/// The live registration for an activity that the user is tied to in any
/// capacity (initiator, student, or parent). Checkout uses this to find the
/// Pending row the paid-register flow created earlier.
pub async fn find_live_for_activity_tied_to_user(
    ex: impl SqliteExecutor<'_>,
    user_id: &str,
    activity_id: &str,
) -> sqlx::Result<Option<RegistrationsRow>> {
    sqlx::query_as::<_, RegistrationsRow>(SQL_FIND_LIVE_TIED_TO_USER)
        .bind(activity_id)
        .bind(user_id)
        .bind(user_id)
        .bind(user_id)
        .fetch_optional(ex)
        .await
}

const SQL_APPROVED_SCHEDULES_FOR_STUDENT: &str = r#"
SELECT a.activity_id, a.title, a.start_date, a.end_date, a.start_time, a.end_time
FROM registrations r
JOIN activities a ON a.activity_id = r.activity_id
WHERE r.student_id = ? AND r.status = 'Approved'
"#;

pub async fn list_approved_schedules_for_student(
    ex: impl SqliteExecutor<'_>,
    student_id: &str,
) -> sqlx::Result<Vec<ActivityScheduleRow>> {
    sqlx::query_as::<_, ActivityScheduleRow>(SQL_APPROVED_SCHEDULES_FOR_STUDENT)
        .bind(student_id)
        .fetch_all(ex)
        .await
}

const SQL_LIVE_SCHEDULES_FOR_USER: &str = r#"
SELECT a.activity_id, a.title, a.start_date, a.end_date, a.start_time, a.end_time
FROM registrations r
JOIN activities a ON a.activity_id = r.activity_id
WHERE (r.user_id = ? OR r.student_id = ? OR r.parent_id = ?)
  AND r.status IN ('Pending', 'Approved')
  AND r.activity_id != ?
"#;

/// Schedules of every activity the user is tied to through a live
/// registration, whether as initiator, student, or parent.
pub async fn list_live_schedules_for_user(
    ex: impl SqliteExecutor<'_>,
    user_id: &str,
    exclude_activity_id: &str,
) -> sqlx::Result<Vec<ActivityScheduleRow>> {
    sqlx::query_as::<_, ActivityScheduleRow>(SQL_LIVE_SCHEDULES_FOR_USER)
        .bind(user_id)
        .bind(user_id)
        .bind(user_id)
        .bind(exclude_activity_id)
        .fetch_all(ex)
        .await
}

pub struct NewRegistration<'a> {
    pub registration_id: &'a str,
    pub user_id: &'a str,
    pub student_id: &'a str,
    pub parent_id: Option<&'a str>,
    pub activity_id: &'a str,
    pub status: &'a str,
    pub payment_status: &'a str,
    pub notes: Option<&'a str>,
}

const SQL_INSERT_REGISTRATION: &str = r#"
INSERT INTO registrations (
  registration_id, user_id, student_id, parent_id, activity_id,
  status, payment_status, notes
) VALUES (?, ?, ?, ?, ?, ?, ?, ?)
"#;

pub async fn insert_registration(
    ex: impl SqliteExecutor<'_>,
    reg: NewRegistration<'_>,
) -> sqlx::Result<u64> {
    let res = sqlx::query(SQL_INSERT_REGISTRATION)
        .bind(reg.registration_id)
        .bind(reg.user_id)
        .bind(reg.student_id)
        .bind(reg.parent_id)
        .bind(reg.activity_id)
        .bind(reg.status)
        .bind(reg.payment_status)
        .bind(reg.notes)
        .execute(ex)
        .await?;
    Ok(res.rows_affected())
}

// Conditional insert for capacity-consuming (Approved) registrations: the
// row only lands while the approved count is below the ceiling, so two
// concurrent takers of the last slot cannot both commit.
const SQL_INSERT_APPROVED_IF_CAPACITY: &str = r#"
INSERT INTO registrations (
  registration_id, user_id, student_id, parent_id, activity_id,
  status, payment_status, notes
)
SELECT ?, ?, ?, ?, ?, 'Approved', ?, ?
WHERE (
    SELECT COUNT(*) FROM registrations r
    WHERE r.activity_id = ? AND r.status = 'Approved'
  ) < (
    SELECT a.max_participants FROM activities a
    WHERE a.activity_id = ?
  )
"#;

/// Returns 0 affected rows when the activity is already at capacity.
pub async fn insert_approved_if_capacity(
    ex: impl SqliteExecutor<'_>,
    reg: NewRegistration<'_>,
) -> sqlx::Result<u64> {
    let res = sqlx::query(SQL_INSERT_APPROVED_IF_CAPACITY)
        .bind(reg.registration_id)
        .bind(reg.user_id)
        .bind(reg.student_id)
        .bind(reg.parent_id)
        .bind(reg.activity_id)
        .bind(reg.payment_status)
        .bind(reg.notes)
        .bind(reg.activity_id)
        .bind(reg.activity_id)
        .execute(ex)
        .await?;
    Ok(res.rows_affected())
}

const SQL_APPROVE_IF_CAPACITY: &str = r#"
UPDATE registrations
SET status = 'Approved'
WHERE registration_id = ?
  AND status = 'Pending'
  AND (
    SELECT COUNT(*) FROM registrations r
    WHERE r.activity_id = registrations.activity_id AND r.status = 'Approved'
  ) < (
    SELECT a.max_participants FROM activities a
    WHERE a.activity_id = registrations.activity_id
  )
"#;

/// Pending -> Approved, re-checking capacity inside the update. Returns 0
/// when the row is not Pending or the activity is full.
pub async fn approve_if_capacity(
    ex: impl SqliteExecutor<'_>,
    registration_id: &str,
) -> sqlx::Result<u64> {
    let res = sqlx::query(SQL_APPROVE_IF_CAPACITY)
        .bind(registration_id)
        .execute(ex)
        .await?;
    Ok(res.rows_affected())
}

const SQL_MARK_PAID_APPROVED_IF_CAPACITY: &str = r#"
UPDATE registrations
SET status = 'Approved', payment_status = 'Paid'
WHERE registration_id = ?
  AND status = 'Pending'
  AND (
    SELECT COUNT(*) FROM registrations r
    WHERE r.activity_id = registrations.activity_id AND r.status = 'Approved'
  ) < (
    SELECT a.max_participants FROM activities a
    WHERE a.activity_id = registrations.activity_id
  )
"#;

/// Checkout path for a registration created earlier by the paid-register
/// flow: Pending/Unpaid -> Approved/Paid under the capacity guard.
pub async fn mark_paid_approved_if_capacity(
    ex: impl SqliteExecutor<'_>,
    registration_id: &str,
) -> sqlx::Result<u64> {
    let res = sqlx::query(SQL_MARK_PAID_APPROVED_IF_CAPACITY)
        .bind(registration_id)
        .execute(ex)
        .await?;
    Ok(res.rows_affected())
}

const SQL_MARK_REJECTED: &str = r#"
UPDATE registrations
SET status = 'Rejected', notes = COALESCE(?, notes)
WHERE registration_id = ? AND status = 'Pending'
"#;

pub async fn mark_rejected(
    ex: impl SqliteExecutor<'_>,
    registration_id: &str,
    notes: Option<&str>,
) -> sqlx::Result<u64> {
    let res = sqlx::query(SQL_MARK_REJECTED)
        .bind(notes)
        .bind(registration_id)
        .execute(ex)
        .await?;
    Ok(res.rows_affected())
}

// Cancelling a paid registration parks the money side in RefundPending;
// refund execution happens outside this system. Only live rows move:
// Rejected and Cancelled are terminal.
const SQL_CANCEL: &str = r#"
UPDATE registrations
SET status = 'Cancelled',
    notes = ?,
    payment_status = CASE WHEN payment_status = 'Paid' THEN 'RefundPending' ELSE payment_status END
WHERE registration_id = ? AND status IN ('Pending', 'Approved')
"#;

pub async fn cancel(
    ex: impl SqliteExecutor<'_>,
    registration_id: &str,
    notes: &str,
) -> sqlx::Result<u64> {
    let res = sqlx::query(SQL_CANCEL)
        .bind(notes)
        .bind(registration_id)
        .execute(ex)
        .await?;
    Ok(res.rows_affected())
}

const SQL_LOAD_WITH_ACTIVITY: &str = r#"
SELECT
  r.registration_id, r.user_id, r.student_id, r.parent_id, r.activity_id,
  r.status, r.payment_status, a.title, a.start_date, r.registered_at
FROM registrations r
JOIN activities a ON a.activity_id = r.activity_id
WHERE r.registration_id = ?
"#;

pub async fn load_with_activity(
    ex: impl SqliteExecutor<'_>,
    registration_id: &str,
) -> sqlx::Result<Option<RegistrationWithActivityRow>> {
    sqlx::query_as::<_, RegistrationWithActivityRow>(SQL_LOAD_WITH_ACTIVITY)
        .bind(registration_id)
        .fetch_optional(ex)
        .await
}

const SQL_LIST_FOR_USER: &str = r#"
SELECT
  r.registration_id, r.user_id, r.student_id, r.parent_id, r.activity_id,
  r.status, r.payment_status, a.title, a.start_date, r.registered_at
FROM registrations r
JOIN activities a ON a.activity_id = r.activity_id
WHERE r.user_id = ? OR r.student_id = ? OR r.parent_id = ?
ORDER BY r.registered_at DESC
"#;

/// Registrations the user initiated, attends, or parents, newest first.
pub async fn list_for_user(
    ex: impl SqliteExecutor<'_>,
    user_id: &str,
) -> sqlx::Result<Vec<RegistrationWithActivityRow>> {
    sqlx::query_as::<_, RegistrationWithActivityRow>(SQL_LIST_FOR_USER)
        .bind(user_id)
        .bind(user_id)
        .bind(user_id)
        .fetch_all(ex)
        .await
}
