use sqlx::mysql::MySqlPoolOptions;
use sqlx::{Connection, MySqlConnection, MySqlPool};

use crate::error::SeedResult;

pub async fn create_pool(database_url: &str) -> SeedResult<MySqlPool> {
    let pool = MySqlPoolOptions::new()
        .max_connections(5)
        .connect(database_url)
        .await?;
    Ok(pool)
}

/// Create the catalog table if the product service has not done so yet.
/// Matches the schema the service generates, so running it against an
/// initialized store is a no-op.
pub async fn ensure_catalog_schema(pool: &MySqlPool) -> SeedResult<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS products (
            product_id BIGINT PRIMARY KEY AUTO_INCREMENT,
            name VARCHAR(255) NOT NULL,
            description TEXT,
            price DECIMAL(10, 2) NOT NULL,
            stock INT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;
    Ok(())
}

/// Create the order tables if the command service has not done so yet.
pub async fn ensure_order_schema(pool: &MySqlPool) -> SeedResult<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS commands (
            command_id BIGINT PRIMARY KEY AUTO_INCREMENT,
            date DATETIME NOT NULL,
            status VARCHAR(32) NOT NULL,
            total_price DECIMAL(10, 2) NOT NULL,
            user_id VARCHAR(36) NOT NULL,
            username VARCHAR(255) NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS command_items (
            id BIGINT PRIMARY KEY AUTO_INCREMENT,
            command_id BIGINT NOT NULL,
            product_id BIGINT NOT NULL,
            quantity INT NOT NULL,
            price DECIMAL(10, 2) NOT NULL,
            CONSTRAINT fk_command_items_command
                FOREIGN KEY (command_id) REFERENCES commands (command_id)
        )
        "#,
    )
    .execute(pool)
    .await?;
    Ok(())
}

/// Delete all rows from both order tables. Foreign-key checks are
/// toggled off around the deletes so the clear does not depend on
/// table ordering.
///
/// `FOREIGN_KEY_CHECKS` is a session variable, not transaction state:
/// it survives a rollback, so the whole clear runs on one dedicated
/// connection and the flag is restored before that connection returns
/// to the pool, error path included.
pub async fn clear_order_store(pool: &MySqlPool) -> SeedResult<()> {
    let mut conn = pool.acquire().await?;
    sqlx::query("SET FOREIGN_KEY_CHECKS = 0")
        .execute(&mut *conn)
        .await?;
    let cleared = delete_order_rows(&mut conn).await;
    let restored = sqlx::query("SET FOREIGN_KEY_CHECKS = 1")
        .execute(&mut *conn)
        .await;
    cleared?;
    restored?;
    Ok(())
}

async fn delete_order_rows(conn: &mut MySqlConnection) -> SeedResult<()> {
    let mut tx = conn.begin().await?;
    sqlx::query("DELETE FROM command_items")
        .execute(&mut *tx)
        .await?;
    sqlx::query("DELETE FROM commands").execute(&mut *tx).await?;
    tx.commit().await?;
    Ok(())
}
