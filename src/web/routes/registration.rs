use axum::{
    extract::{Path, State},
    response::{IntoResponse, Redirect},
    Extension, Json,
};
use serde_json::json;
use sqlx::SqlitePool;
use tracing::warn;

use crate::services::error::EnrollmentError;
use crate::services::registration_service;
use crate::web::middleware::auth::AuthenticatedUser;

/// GET /registrations. Everything the caller initiated, attends, or parents.
pub async fn my_registrations_handler(
    Extension(auth_user): Extension<AuthenticatedUser>,
    State(pool): State<SqlitePool>,
) -> Result<Json<serde_json::Value>, EnrollmentError> {
    let rows = registration_service::my_registrations(&pool, &auth_user.id).await?;
    let registrations: Vec<_> = rows
        .iter()
        .map(|r| {
            json!({
                "registrationId": r.registration_id,
                "activityId": r.activity_id,
                "title": r.title,
                "status": r.status,
                "paymentStatus": r.payment_status,
                "startDate": r.start_date,
                "registeredAt": r.registered_at,
            })
        })
        .collect();
    Ok(Json(json!({ "success": true, "registrations": registrations })))
}

/// POST /registrations/:registration_id/cancel
pub async fn cancel_handler(
    Extension(auth_user): Extension<AuthenticatedUser>,
    Path(registration_id): Path<String>,
    State(pool): State<SqlitePool>,
) -> impl IntoResponse {
    match registration_service::cancel(&pool, &registration_id, &auth_user.id, auth_user.role)
        .await
    {
        Ok(()) => Redirect::to("/registrations?notice=cancelled").into_response(),
        Err(e) => {
            warn!("cancel failed for registration {}: {:?}", registration_id, e);
            Redirect::to(&format!("/registrations?notice={}", e.notice_code())).into_response()
        }
    }
}

/// POST /registrations/:registration_id/approve (admin)
pub async fn approve_handler(
    Extension(auth_user): Extension<AuthenticatedUser>,
    Path(registration_id): Path<String>,
    State(pool): State<SqlitePool>,
) -> impl IntoResponse {
    match registration_service::approve(&pool, &registration_id, auth_user.role).await {
        Ok(()) => Redirect::to("/admin/registrations?notice=approved").into_response(),
        Err(e) => {
            warn!("approve failed for registration {}: {:?}", registration_id, e);
            Redirect::to(&format!("/admin/registrations?notice={}", e.notice_code()))
                .into_response()
        }
    }
}

/// POST /registrations/:registration_id/decline (admin)
pub async fn decline_handler(
    Extension(auth_user): Extension<AuthenticatedUser>,
    Path(registration_id): Path<String>,
    State(pool): State<SqlitePool>,
) -> impl IntoResponse {
    match registration_service::decline(&pool, &registration_id, auth_user.role).await {
        Ok(()) => Redirect::to("/admin/registrations?notice=declined").into_response(),
        Err(e) => {
            warn!("decline failed for registration {}: {:?}", registration_id, e);
            Redirect::to(&format!("/admin/registrations?notice={}", e.notice_code()))
                .into_response()
        }
    }
}
