use sqlx::SqlitePool;
use tracing::info;
use uuid::Uuid;

use crate::database::{activities_repo, interactions_repo, users_repo};
use crate::models::{INTERACTION_COMMENT, INTERACTION_LIKE};
use crate::services::error::{EnrollmentError, EnrollmentResult};

#[derive(Debug)]
pub struct LikeOutcome {
    pub liked: bool,
    pub likes_count: i64,
}

/// Flips the caller's like on an activity and reports the fresh count.
pub async fn toggle_like(
    pool: &SqlitePool,
    user_id: &str,
    activity_id: &str,
) -> EnrollmentResult<LikeOutcome> {
    if activities_repo::load_activity_by_id(pool, activity_id)
        .await?
        .is_none()
    {
        return Err(EnrollmentError::NotFound("activity"));
    }

    let liked = match interactions_repo::find_like(pool, user_id, activity_id).await? {
        Some(existing) => {
            interactions_repo::delete_interaction(pool, &existing.interaction_id).await?;
            info!("user {} unliked activity {}", user_id, activity_id);
            false
        }
        None => {
            let interaction_id = Uuid::new_v4().to_string();
            interactions_repo::insert_interaction(
                pool,
                &interaction_id,
                user_id,
                activity_id,
                INTERACTION_LIKE,
                None,
            )
            .await?;
            info!("user {} liked activity {}", user_id, activity_id);
            true
        }
    };

    let likes_count = interactions_repo::like_count(pool, activity_id).await?;
    Ok(LikeOutcome { liked, likes_count })
}

#[derive(Debug)]
pub struct CommentOutcome {
    pub content: String,
    pub user_name: String,
}

pub async fn add_comment(
    pool: &SqlitePool,
    user_id: &str,
    activity_id: &str,
    content: &str,
) -> EnrollmentResult<CommentOutcome> {
    let content = content.trim();
    if content.is_empty() {
        return Err(EnrollmentError::Validation(
            "comment must not be empty".into(),
        ));
    }
    if activities_repo::load_activity_by_id(pool, activity_id)
        .await?
        .is_none()
    {
        return Err(EnrollmentError::NotFound("activity"));
    }

    let interaction_id = Uuid::new_v4().to_string();
    interactions_repo::insert_interaction(
        pool,
        &interaction_id,
        user_id,
        activity_id,
        INTERACTION_COMMENT,
        Some(content),
    )
    .await?;

    let user_name = users_repo::load_user(pool, user_id)
        .await?
        .map(|u| u.full_name)
        .unwrap_or_else(|| user_id.to_string());

    info!("user {} commented on activity {}", user_id, activity_id);
    Ok(CommentOutcome {
        content: content.to_string(),
        user_name,
    })
}
