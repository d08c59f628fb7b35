use sqlx::SqliteExecutor;

use crate::models::{CartItemWithActivityRow, CartItemsRow};

const SQL_FIND_UNPAID: &str = r#"
SELECT cart_item_id, user_id, activity_id, is_paid, added_at
FROM cart_items
WHERE user_id = ? AND activity_id = ? AND is_paid = 0
"#;

pub async fn find_unpaid_by_user_activity(
    ex: impl SqliteExecutor<'_>,
    user_id: &str,
    activity_id: &str,
) -> sqlx::Result<Option<CartItemsRow>> {
    sqlx::query_as::<_, CartItemsRow>(SQL_FIND_UNPAID)
        .bind(user_id)
        .bind(activity_id)
        .fetch_optional(ex)
        .await
}

const SQL_LOAD_UNPAID_OWNED: &str = r#"
SELECT
  c.cart_item_id, c.user_id, c.activity_id, c.added_at,
  a.title, a.price, a.max_participants, a.status AS activity_status,
  a.is_active, a.start_date, a.end_date, a.start_time, a.end_time
FROM cart_items c
JOIN activities a ON a.activity_id = c.activity_id
WHERE c.cart_item_id = ? AND c.user_id = ? AND c.is_paid = 0
"#;

/// The caller's own unpaid cart item, joined with its activity. Paid or
/// foreign items come back as None, which the services report as not found.
pub async fn load_unpaid_owned(
    ex: impl SqliteExecutor<'_>,
    cart_item_id: &str,
    user_id: &str,
) -> sqlx::Result<Option<CartItemWithActivityRow>> {
    sqlx::query_as::<_, CartItemWithActivityRow>(SQL_LOAD_UNPAID_OWNED)
        .bind(cart_item_id)
        .bind(user_id)
        .fetch_optional(ex)
        .await
}

const SQL_LIST_UNPAID: &str = r#"
SELECT
  c.cart_item_id, c.user_id, c.activity_id, c.added_at,
  a.title, a.price, a.max_participants, a.status AS activity_status,
  a.is_active, a.start_date, a.end_date, a.start_time, a.end_time
FROM cart_items c
JOIN activities a ON a.activity_id = c.activity_id
WHERE c.user_id = ? AND c.is_paid = 0
ORDER BY c.added_at DESC
"#;

pub async fn list_unpaid_with_activity(
    ex: impl SqliteExecutor<'_>,
    user_id: &str,
) -> sqlx::Result<Vec<CartItemWithActivityRow>> {
    sqlx::query_as::<_, CartItemWithActivityRow>(SQL_LIST_UNPAID)
        .bind(user_id)
        .fetch_all(ex)
        .await
}

const SQL_INSERT_CART_ITEM: &str = r#"
INSERT INTO cart_items (cart_item_id, user_id, activity_id, is_paid)
VALUES (?, ?, ?, 0)
"#;

pub async fn insert_cart_item(
    ex: impl SqliteExecutor<'_>,
    cart_item_id: &str,
    user_id: &str,
    activity_id: &str,
) -> sqlx::Result<u64> {
    let res = sqlx::query(SQL_INSERT_CART_ITEM)
        .bind(cart_item_id)
        .bind(user_id)
        .bind(activity_id)
        .execute(ex)
        .await?;
    Ok(res.rows_affected())
}

const SQL_DELETE_UNPAID_OWNED: &str = r#"
DELETE FROM cart_items
WHERE cart_item_id = ? AND user_id = ? AND is_paid = 0
"#;

pub async fn delete_unpaid_owned(
    ex: impl SqliteExecutor<'_>,
    cart_item_id: &str,
    user_id: &str,
) -> sqlx::Result<u64> {
    let res = sqlx::query(SQL_DELETE_UNPAID_OWNED)
        .bind(cart_item_id)
        .bind(user_id)
        .execute(ex)
        .await?;
    Ok(res.rows_affected())
}

// Consuming the cart item is conditional on it still being unpaid. Checkout
// runs this first inside its transaction: zero affected rows means another
// checkout already took it, and no payment is written.
const SQL_MARK_PAID: &str = r#"
UPDATE cart_items
SET is_paid = 1
WHERE cart_item_id = ? AND is_paid = 0
"#;

pub async fn mark_paid(
    ex: impl SqliteExecutor<'_>,
    cart_item_id: &str,
) -> sqlx::Result<u64> {
    let res = sqlx::query(SQL_MARK_PAID)
        .bind(cart_item_id)
        .execute(ex)
        .await?;
    Ok(res.rows_affected())
}
