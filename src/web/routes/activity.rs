use axum::{
    extract::{Path, State},
    response::{IntoResponse, Redirect},
    Extension, Form, Json,
};
use chrono::{NaiveDate, NaiveTime};
use serde::Deserialize;
use serde_json::json;
use sqlx::SqlitePool;
use tracing::warn;

use crate::database::activities_repo;
use crate::models::{ActivityKind, RegistrationStatus};
use crate::services::error::EnrollmentError;
use crate::services::{activity_service, interaction_service, registration_service};
use crate::web::middleware::auth::AuthenticatedUser;

/// GET /activities/:activity_id/summary. Read-only fill state for the
/// listing pages; the counts are derived from the registration set on every
/// read.
pub async fn activity_summary_handler(
    Extension(_auth_user): Extension<AuthenticatedUser>,
    Path(activity_id): Path<String>,
    State(pool): State<SqlitePool>,
) -> Result<Json<serde_json::Value>, EnrollmentError> {
    let activity = activities_repo::load_activity_by_id(&pool, &activity_id)
        .await?
        .ok_or(EnrollmentError::NotFound("activity"))?;
    let capacity = registration_service::capacity_view(&pool, &activity).await?;

    Ok(Json(json!({
        "success": true,
        "activity": {
            "activityId": activity.activity_id,
            "title": activity.title,
            "type": activity.activity_type,
            "price": activity.price,
            "status": activity.status,
            "isActive": activity.is_active(),
            "maxParticipants": capacity.max_participants,
            "currentParticipants": capacity.approved_count,
            "availableSlots": capacity.available_slots,
            "isFull": capacity.is_full,
        },
    })))
}

#[derive(Debug, Deserialize, Default)]
pub struct RegisterForm {
    pub return_to: Option<String>,
}

/// POST /activities/:activity_id/register. Students enroll themselves; the
/// listing pages (external) render the notice codes.
pub async fn register_handler(
    Extension(auth_user): Extension<AuthenticatedUser>,
    Path(activity_id): Path<String>,
    State(pool): State<SqlitePool>,
    Form(form): Form<RegisterForm>,
) -> impl IntoResponse {
    match registration_service::register(&pool, &auth_user.id, auth_user.role, &activity_id).await
    {
        Ok(outcome) => {
            // Paid registrations continue in the cart; free ones are done.
            let target = if outcome.status == RegistrationStatus::Pending {
                "/cart?notice=registered".to_string()
            } else {
                "/registrations?notice=registered".to_string()
            };
            Redirect::to(&target).into_response()
        }
        Err(e) => {
            warn!("register failed for activity {}: {:?}", activity_id, e);
            redirect_with_notice(
                form.return_to.as_deref(),
                &format!("/activities/{}", activity_id),
                e.notice_code(),
            )
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateActivityForm {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub activity_type: String,
    #[serde(default)]
    pub price: i64,
    pub max_participants: i64,
    #[serde(default)]
    pub location: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
}

/// POST /activities. Admin/Teacher publish a new activity.
pub async fn create_activity_handler(
    Extension(auth_user): Extension<AuthenticatedUser>,
    State(pool): State<SqlitePool>,
    Form(form): Form<CreateActivityForm>,
) -> impl IntoResponse {
    let activity_type = match form.activity_type.as_str() {
        "paid" => ActivityKind::Paid,
        _ => ActivityKind::Free,
    };
    let input = activity_service::NewActivityInput {
        title: form.title,
        description: form.description,
        activity_type,
        price: form.price,
        max_participants: form.max_participants,
        location: form.location,
        start_date: form.start_date,
        end_date: form.end_date,
        start_time: form.start_time,
        end_time: form.end_time,
    };
    match activity_service::create_activity(&pool, &auth_user.id, auth_user.role, input).await {
        Ok(activity_id) => {
            Redirect::to(&format!("/activities/{}?notice=created", activity_id)).into_response()
        }
        Err(e) => {
            warn!("activity creation failed: {:?}", e);
            Redirect::to(&format!("/activities?notice={}", e.notice_code())).into_response()
        }
    }
}

/// POST /activities/:activity_id/like. AJAX-style JSON response.
pub async fn like_handler(
    Extension(auth_user): Extension<AuthenticatedUser>,
    Path(activity_id): Path<String>,
    State(pool): State<SqlitePool>,
) -> impl IntoResponse {
    match interaction_service::toggle_like(&pool, &auth_user.id, &activity_id).await {
        Ok(outcome) => Json(json!({
            "success": true,
            "liked": outcome.liked,
            "likesCount": outcome.likes_count,
        }))
        .into_response(),
        Err(e) => {
            warn!("like toggle failed for activity {}: {:?}", activity_id, e);
            json_error(e)
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CommentForm {
    pub content: String,
}

/// POST /activities/:activity_id/comments. AJAX-style JSON response.
pub async fn comment_handler(
    Extension(auth_user): Extension<AuthenticatedUser>,
    Path(activity_id): Path<String>,
    State(pool): State<SqlitePool>,
    Form(form): Form<CommentForm>,
) -> impl IntoResponse {
    match interaction_service::add_comment(&pool, &auth_user.id, &activity_id, &form.content).await
    {
        Ok(outcome) => Json(json!({
            "success": true,
            "comment": {
                "content": outcome.content,
                "userName": outcome.user_name,
            },
        }))
        .into_response(),
        Err(e) => {
            warn!("comment failed for activity {}: {:?}", activity_id, e);
            json_error(e)
        }
    }
}

pub(crate) fn json_error(e: EnrollmentError) -> axum::response::Response {
    Json(json!({ "success": false, "message": e.to_string() })).into_response()
}

pub(crate) fn redirect_with_notice(
    return_to: Option<&str>,
    fallback: &str,
    notice: &str,
) -> axum::response::Response {
    let target = return_to.and_then(sanitize_return_to).unwrap_or(fallback);
    let sep = if target.contains('?') { "&" } else { "?" };
    Redirect::to(&format!("{}{}notice={}", target, sep, notice)).into_response()
}

fn sanitize_return_to(value: &str) -> Option<&str> {
    let v = value.trim();
    if !v.starts_with('/') {
        return None;
    }
    if v.starts_with("//") || v.contains("://") {
        return None;
    }
    Some(v)
}
