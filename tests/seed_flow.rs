use std::collections::HashSet;

use chrono::Utc;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rust_decimal::Decimal;
use uuid::Uuid;

use trustmart_seeder::{
    data, db,
    models::{Account, CommandStatus},
    services::{catalog_service, order_service},
};

// Integration flow against real MySQL stores: replace the catalog,
// synthesize orders for fabricated accounts, and verify the cross-store
// invariants from the order tables back to the catalog snapshot.
#[tokio::test]
async fn catalog_replace_and_order_synthesis_flow() -> anyhow::Result<()> {
    // Allow skipping when no databases are configured in the environment.
    let (catalog_url, order_url) = match (
        std::env::var("TEST_CATALOG_DATABASE_URL"),
        std::env::var("TEST_ORDER_DATABASE_URL"),
    ) {
        (Ok(catalog), Ok(order)) => (catalog, order),
        _ => {
            eprintln!(
                "Skipping test: set TEST_CATALOG_DATABASE_URL and TEST_ORDER_DATABASE_URL to run the seed flow test."
            );
            return Ok(());
        }
    };

    let catalog_pool = db::create_pool(&catalog_url).await?;
    let order_pool = db::create_pool(&order_url).await?;

    db::ensure_catalog_schema(&catalog_pool).await?;
    db::ensure_order_schema(&order_pool).await?;
    db::clear_order_store(&order_pool).await?;

    // Catalog replacement is total: run it twice, the store holds
    // exactly the reference set either way.
    catalog_service::seed_catalog(&catalog_pool).await?;
    catalog_service::seed_catalog(&catalog_pool).await?;

    let snapshot = catalog_service::catalog_snapshot(&catalog_pool).await?;
    let reference = data::reference_catalog();
    assert_eq!(snapshot.len(), reference.len());
    let snapshot_names: HashSet<&str> = snapshot.iter().map(|p| p.name.as_str()).collect();
    let reference_names: HashSet<&str> = reference.iter().map(|e| e.name).collect();
    assert_eq!(snapshot_names, reference_names);

    // Synthesize for two fabricated accounts; no identity provider needed.
    let accounts = vec![test_account("it_alice"), test_account("it_bob")];
    let mut rng = StdRng::seed_from_u64(42);
    let drafts = order_service::synthesize_commands(&mut rng, &accounts, &snapshot, Utc::now())?;
    let written = order_service::persist_commands(&order_pool, &drafts).await?;
    assert_eq!(written, accounts.len() * order_service::ORDERS_PER_ACCOUNT);

    let (command_count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM commands")
        .fetch_one(&order_pool)
        .await?;
    assert_eq!(command_count as usize, written);

    // Every stored total matches the recomputed item sum.
    let totals: Vec<(i64, Decimal, Option<Decimal>)> = sqlx::query_as(
        r#"
        SELECT c.command_id, c.total_price, SUM(ci.quantity * ci.price)
        FROM commands c
        LEFT JOIN command_items ci ON c.command_id = ci.command_id
        GROUP BY c.command_id, c.total_price
        "#,
    )
    .fetch_all(&order_pool)
    .await?;
    assert_eq!(totals.len(), written);
    for (command_id, total, item_sum) in totals {
        let item_sum = item_sum.unwrap_or(Decimal::ZERO).round_dp(2);
        assert_eq!(total, item_sum, "total mismatch on command {command_id}");
    }

    // Every item references a product from the snapshot just read.
    let known_ids: HashSet<i64> = snapshot.iter().map(|p| p.product_id).collect();
    let item_product_ids: Vec<(i64,)> =
        sqlx::query_as("SELECT DISTINCT product_id FROM command_items")
            .fetch_all(&order_pool)
            .await?;
    for (product_id,) in item_product_ids {
        assert!(known_ids.contains(&product_id));
    }

    // Stored statuses are valid and keep the age correlation.
    let headers: Vec<(String, String)> = sqlx::query_as("SELECT status, username FROM commands")
        .fetch_all(&order_pool)
        .await?;
    for (status, username) in headers {
        assert!(CommandStatus::from_str_opt(&status).is_some());
        assert!(username.starts_with("it_"));
    }

    catalog_pool.close().await;
    order_pool.close().await;
    Ok(())
}

// An empty catalog must abort synthesis before anything is written.
#[tokio::test]
async fn empty_catalog_writes_no_order_rows() -> anyhow::Result<()> {
    let order_url = match std::env::var("TEST_ORDER_DATABASE_URL") {
        Ok(url) => url,
        Err(_) => {
            eprintln!("Skipping test: set TEST_ORDER_DATABASE_URL to run this test.");
            return Ok(());
        }
    };

    let order_pool = db::create_pool(&order_url).await?;
    db::ensure_order_schema(&order_pool).await?;
    db::clear_order_store(&order_pool).await?;

    let accounts = vec![test_account("it_carol")];
    let mut rng = StdRng::seed_from_u64(1);
    let result = order_service::synthesize_commands(&mut rng, &accounts, &[], Utc::now());
    assert!(result.is_err());

    let (commands,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM commands")
        .fetch_one(&order_pool)
        .await?;
    let (items,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM command_items")
        .fetch_one(&order_pool)
        .await?;
    assert_eq!(commands, 0);
    assert_eq!(items, 0);

    order_pool.close().await;
    Ok(())
}

// Clearing toggles FOREIGN_KEY_CHECKS on its session; the flag must be
// back on when the connection returns to the pool. A one-connection
// pool guarantees the follow-up insert lands on that same session.
#[tokio::test]
async fn clear_leaves_foreign_key_checks_enabled() -> anyhow::Result<()> {
    let order_url = match std::env::var("TEST_ORDER_DATABASE_URL") {
        Ok(url) => url,
        Err(_) => {
            eprintln!("Skipping test: set TEST_ORDER_DATABASE_URL to run this test.");
            return Ok(());
        }
    };

    let order_pool = sqlx::mysql::MySqlPoolOptions::new()
        .max_connections(1)
        .connect(&order_url)
        .await?;
    db::ensure_order_schema(&order_pool).await?;
    db::clear_order_store(&order_pool).await?;

    let orphan = sqlx::query(
        "INSERT INTO command_items (command_id, product_id, quantity, price) VALUES (?, ?, ?, ?)",
    )
    .bind(999_999_i64)
    .bind(1_i64)
    .bind(1_i32)
    .bind(Decimal::ONE)
    .execute(&order_pool)
    .await;
    assert!(
        orphan.is_err(),
        "insert referencing a missing command must hit the foreign key"
    );

    let (items,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM command_items")
        .fetch_one(&order_pool)
        .await?;
    assert_eq!(items, 0);

    order_pool.close().await;
    Ok(())
}

fn test_account(username: &str) -> Account {
    Account {
        external_id: Uuid::new_v4(),
        username: username.to_string(),
        email: format!("{username}@example.com"),
        first_name: "Integration".to_string(),
        last_name: "Test".to_string(),
    }
}
