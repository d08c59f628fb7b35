pub mod activities_repo;
pub mod cart_items_repo;
pub mod interactions_repo;
pub mod payments_repo;
pub mod registrations_repo;
pub mod users_repo;

/// Applies the embedded schema. Safe to run repeatedly; the integration
/// tests use it against in-memory databases.
pub async fn apply_schema(pool: &sqlx::SqlitePool) -> sqlx::Result<()> {
    sqlx::raw_sql(include_str!("../../db/schema.sql"))
        .execute(pool)
        .await?;
    Ok(())
}
