//! Read-only reconciliation summary over both stores.

use rust_decimal::Decimal;
use sqlx::MySqlPool;

use crate::error::SeedResult;

const SAMPLE_ROWS: i64 = 5;

/// Print counts and small samples from both stores. Never mutates;
/// best-effort read consistency is enough for an operator summary.
pub async fn print_summary(catalog_pool: &MySqlPool, order_pool: &MySqlPool) -> SeedResult<()> {
    println!();
    println!("{}", "=".repeat(60));
    println!("DATABASE SUMMARY");
    println!("{}", "=".repeat(60));

    let (product_count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM products")
        .fetch_one(catalog_pool)
        .await?;
    println!("\nProducts in catalog store: {product_count}");

    let samples: Vec<(String, Decimal, i32)> =
        sqlx::query_as("SELECT name, price, stock FROM products ORDER BY product_id LIMIT ?")
            .bind(SAMPLE_ROWS)
            .fetch_all(catalog_pool)
            .await?;
    if !samples.is_empty() {
        println!("\nSample products:");
        for (name, price, stock) in samples {
            println!("  - {name}: ${price} (stock: {stock})");
        }
    }

    let (command_count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM commands")
        .fetch_one(order_pool)
        .await?;
    println!("\nOrders in order store: {command_count}");

    let recent: Vec<(i64, String, String, Decimal, i64)> = sqlx::query_as(
        r#"
        SELECT c.command_id, c.username, c.status, c.total_price, COUNT(ci.id) AS items
        FROM commands c
        LEFT JOIN command_items ci ON c.command_id = ci.command_id
        GROUP BY c.command_id, c.username, c.status, c.total_price, c.date
        ORDER BY c.date DESC
        LIMIT ?
        "#,
    )
    .bind(SAMPLE_ROWS)
    .fetch_all(order_pool)
    .await?;
    if !recent.is_empty() {
        println!("\nRecent orders:");
        for (command_id, username, status, total, items) in recent {
            println!("  - Order #{command_id} by {username}: {status} - ${total} ({items} items)");
        }
    }

    let per_user: Vec<(String, i64)> = sqlx::query_as(
        r#"
        SELECT username, COUNT(*) AS order_count
        FROM commands
        GROUP BY username
        ORDER BY order_count DESC, username
        "#,
    )
    .fetch_all(order_pool)
    .await?;
    if !per_user.is_empty() {
        println!("\nOrders per user:");
        for (username, count) in per_user {
            println!("  - {username}: {count} orders");
        }
    }

    println!("\n{}", "=".repeat(60));
    Ok(())
}
