#[derive(Debug, Clone, sqlx::FromRow)]
pub struct InteractionsRow {
    pub interaction_id: String,
    pub user_id: String,
    pub activity_id: String,
    pub interaction_type: String,
    pub content: Option<String>,
    pub created_at: String,
}

pub const INTERACTION_LIKE: &str = "Like";
pub const INTERACTION_COMMENT: &str = "Comment";
