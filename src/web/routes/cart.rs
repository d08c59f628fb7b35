use axum::{
    extract::{Path, State},
    response::{IntoResponse, Redirect},
    Extension, Form, Json,
};
use serde::Deserialize;
use serde_json::json;
use sqlx::SqlitePool;
use tracing::warn;

use crate::services::cart_service;
use crate::services::error::EnrollmentError;
use crate::web::middleware::auth::AuthenticatedUser;
use crate::web::routes::activity::redirect_with_notice;

/// GET /cart. The caller's unpaid items as JSON; rendering is someone
/// else's job.
pub async fn cart_index_handler(
    Extension(auth_user): Extension<AuthenticatedUser>,
    State(pool): State<SqlitePool>,
) -> Result<Json<serde_json::Value>, EnrollmentError> {
    let items = cart_service::list_cart(&pool, &auth_user.id).await?;
    let items: Vec<_> = items
        .iter()
        .map(|i| {
            json!({
                "cartItemId": i.cart_item_id,
                "activityId": i.activity_id,
                "title": i.title,
                "price": i.price,
                "addedAt": i.added_at,
            })
        })
        .collect();
    Ok(Json(json!({ "success": true, "items": items })))
}

#[derive(Debug, Deserialize)]
pub struct AddToCartForm {
    pub activity_id: String,
    pub return_to: Option<String>,
}

/// POST /cart/add
pub async fn add_to_cart_handler(
    Extension(auth_user): Extension<AuthenticatedUser>,
    State(pool): State<SqlitePool>,
    Form(form): Form<AddToCartForm>,
) -> impl IntoResponse {
    match cart_service::add_to_cart(&pool, &auth_user.id, &form.activity_id).await {
        Ok(_) => Redirect::to("/cart?notice=added").into_response(),
        Err(e) => {
            warn!("add to cart failed for activity {}: {:?}", form.activity_id, e);
            redirect_with_notice(
                form.return_to.as_deref(),
                &format!("/activities/{}", form.activity_id),
                e.notice_code(),
            )
        }
    }
}

/// POST /cart/:cart_item_id/remove
pub async fn remove_from_cart_handler(
    Extension(auth_user): Extension<AuthenticatedUser>,
    Path(cart_item_id): Path<String>,
    State(pool): State<SqlitePool>,
) -> impl IntoResponse {
    match cart_service::remove_from_cart(&pool, &auth_user.id, &cart_item_id).await {
        Ok(()) => Redirect::to("/cart?notice=removed").into_response(),
        Err(e) => {
            warn!("cart removal failed for item {}: {:?}", cart_item_id, e);
            Redirect::to(&format!("/cart?notice={}", e.notice_code())).into_response()
        }
    }
}

/// POST /cart/:cart_item_id/checkout. Parent/Admin settle the bill; the
/// payment itself is simulated.
pub async fn checkout_handler(
    Extension(auth_user): Extension<AuthenticatedUser>,
    Path(cart_item_id): Path<String>,
    State(pool): State<SqlitePool>,
) -> impl IntoResponse {
    match cart_service::checkout(&pool, &auth_user.id, auth_user.role, &cart_item_id).await {
        Ok(_) => Redirect::to("/registrations?notice=paid").into_response(),
        Err(e) => {
            warn!("checkout failed for item {}: {:?}", cart_item_id, e);
            Redirect::to(&format!("/cart?notice={}", e.notice_code())).into_response()
        }
    }
}
