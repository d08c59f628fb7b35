use chrono::{NaiveDate, NaiveTime};

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CartItemsRow {
    pub cart_item_id: String,
    pub user_id: String,
    pub activity_id: String,
    pub is_paid: i64,
    pub added_at: String,
}

/// Unpaid cart entry joined with its activity, for the cart view and for the
/// checkout preconditions.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CartItemWithActivityRow {
    pub cart_item_id: String,
    pub user_id: String,
    pub activity_id: String,
    pub added_at: String,
    pub title: String,
    pub price: i64,
    pub max_participants: i64,
    pub activity_status: String,
    pub is_active: i64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
}
