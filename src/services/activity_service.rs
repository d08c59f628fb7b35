use chrono::{NaiveDate, NaiveTime};
use sqlx::SqlitePool;
use tracing::info;
use uuid::Uuid;

use crate::database::activities_repo;
use crate::models::{ActivityKind, ActivityStatus, Role};
use crate::services::error::{codes, EnrollmentError, EnrollmentResult};
use crate::services::schedule::{self, ActivityWindow};

pub struct NewActivityInput {
    pub title: String,
    pub description: String,
    pub activity_type: ActivityKind,
    pub price: i64,
    pub max_participants: i64,
    pub location: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
}

/// Publishes a new activity. Admins and teachers only. Publication is
/// blocked when the schedule clashes with another published activity, the
/// same overlap test the booking paths use.
pub async fn create_activity(
    pool: &SqlitePool,
    actor_id: &str,
    actor_role: Role,
    input: NewActivityInput,
) -> EnrollmentResult<String> {
    if actor_role != Role::Admin && actor_role != Role::Teacher {
        return Err(EnrollmentError::Forbidden);
    }
    validate(&input)?;

    let activity_id = Uuid::new_v4().to_string();
    let window = ActivityWindow {
        start_date: input.start_date,
        end_date: input.end_date,
        start_time: input.start_time,
        end_time: input.end_time,
    };
    let published = activities_repo::list_published_schedules(pool, &activity_id).await?;
    for existing in &published {
        if schedule::overlaps(&window, &existing.window()) {
            return Err(EnrollmentError::precondition(
                codes::CONFLICT,
                format!("this schedule clashes with '{}'", existing.title),
            ));
        }
    }

    activities_repo::insert_activity(
        pool,
        activities_repo::NewActivity {
            activity_id: &activity_id,
            title: &input.title,
            description: &input.description,
            activity_type: input.activity_type.as_str(),
            price: input.price,
            max_participants: input.max_participants,
            location: &input.location,
            start_date: input.start_date,
            end_date: input.end_date,
            start_time: input.start_time,
            end_time: input.end_time,
            status: ActivityStatus::Published.as_str(),
            created_by: actor_id,
        },
    )
    .await?;

    info!("activity {} ('{}') published by {}", activity_id, input.title, actor_id);
    Ok(activity_id)
}

fn validate(input: &NewActivityInput) -> EnrollmentResult<()> {
    if input.title.trim().is_empty() {
        return Err(EnrollmentError::Validation("title is required".into()));
    }
    if input.max_participants < 1 {
        return Err(EnrollmentError::Validation(
            "max participants must be at least 1".into(),
        ));
    }
    if input.end_date < input.start_date {
        return Err(EnrollmentError::Validation(
            "end date must not be before start date".into(),
        ));
    }
    if input.end_time <= input.start_time {
        return Err(EnrollmentError::Validation(
            "end time must be after start time".into(),
        ));
    }
    if input.price < 0 {
        return Err(EnrollmentError::Validation(
            "price must not be negative".into(),
        ));
    }
    if input.activity_type == ActivityKind::Free && input.price != 0 {
        return Err(EnrollmentError::Validation(
            "free activities must not carry a price".into(),
        ));
    }
    Ok(())
}
