//! Database test fixtures
//!
//! PostgreSQL tests run only when `DATABASE_URL` points at a scratch
//! database; otherwise they return early. Every test works on fresh ids, so
//! nothing needs truncating between runs.

use sqlx::PgPool;

/// Connect and migrate, or `None` when no test database is configured
pub async fn test_pool() -> Option<PgPool> {
    let Ok(database_url) = std::env::var("DATABASE_URL") else {
        eprintln!("DATABASE_URL not set; skipping PostgreSQL test");
        return None;
    };

    let pool = PgPool::connect(&database_url)
        .await
        .expect("Failed to create test database pool");
    run_migrations(&pool).await.expect("Failed to run migrations");
    Some(pool)
}

/// Run the embedded migrations
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}

/// Rows matching `sql` with the message id bound as `$1`
pub async fn count_rows(pool: &PgPool, sql: &str, message_id: uuid::Uuid) -> i64 {
    sqlx::query_scalar(sql)
        .bind(message_id)
        .fetch_one(pool)
        .await
        .expect("count query failed")
}
