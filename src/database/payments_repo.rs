use sqlx::SqliteExecutor;

pub struct NewPayment<'a> {
    pub payment_id: &'a str,
    pub registration_id: &'a str,
    pub amount: i64,
    pub payment_status: &'a str,
    pub transaction_id: &'a str,
    pub payment_method: &'a str,
}

const SQL_INSERT_PAYMENT: &str = r#"
INSERT INTO payments (
  payment_id, registration_id, amount, payment_status, transaction_id,
  payment_method
) VALUES (?, ?, ?, ?, ?, ?)
"#;

pub async fn insert_payment(
    ex: impl SqliteExecutor<'_>,
    payment: NewPayment<'_>,
) -> sqlx::Result<u64> {
    let res = sqlx::query(SQL_INSERT_PAYMENT)
        .bind(payment.payment_id)
        .bind(payment.registration_id)
        .bind(payment.amount)
        .bind(payment.payment_status)
        .bind(payment.transaction_id)
        .bind(payment.payment_method)
        .execute(ex)
        .await?;
    Ok(res.rows_affected())
}

const SQL_COUNT_FOR_REGISTRATION: &str = r#"
SELECT COUNT(*)
FROM payments
WHERE registration_id = ?
"#;

pub async fn count_for_registration(
    ex: impl SqliteExecutor<'_>,
    registration_id: &str,
) -> sqlx::Result<i64> {
    sqlx::query_scalar::<_, i64>(SQL_COUNT_FOR_REGISTRATION)
        .bind(registration_id)
        .fetch_one(ex)
        .await
}
