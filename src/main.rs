use std::io::{self, Write};

use chrono::Utc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use trustmart_seeder::{
    config::AppConfig,
    data, db,
    models::Account,
    services::{catalog_service, identity_service, order_service, report_service},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,trustmart_seeder=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env()?;

    println!("{}", "=".repeat(60));
    println!("TrustMart Demo Data Seeder");
    println!("{}", "=".repeat(60));
    println!();
    println!("1. Full run (clear stores + provision accounts + populate)");
    println!("2. Databases only (reuse existing identity accounts)");
    println!("3. Identity accounts only");
    println!("4. Show database summary only");
    println!("5. Exit");

    print!("\nEnter your choice (1-5): ");
    io::stdout().flush()?;
    let mut choice = String::new();
    io::stdin().read_line(&mut choice)?;

    match choice.trim() {
        "2" => run_databases_only(&config).await?,
        "3" => {
            let accounts = provision_stage(&config).await;
            println!("Resolved {} account(s).", accounts.len());
        }
        "4" => run_report(&config).await?,
        "5" => println!("Goodbye!"),
        "1" => run_full(&config).await?,
        _ => {
            println!("Invalid choice, running full population...");
            run_full(&config).await?;
        }
    }

    Ok(())
}

async fn run_full(config: &AppConfig) -> anyhow::Result<()> {
    let accounts = provision_stage(config).await;
    run_database_stages(config, &accounts).await
}

/// Databases-only run: reuse accounts that already exist in the
/// identity provider, provisioning them only when none are found.
async fn run_databases_only(config: &AppConfig) -> anyhow::Result<()> {
    let client = identity_service::IdentityClient::new(config.identity.clone());
    let desired = data::desired_accounts();

    let accounts = match identity_service::lookup_accounts(&client, &desired).await {
        Ok(found) if !found.is_empty() => found,
        Ok(_) => {
            println!("No existing accounts found, provisioning first...");
            provision_stage(config).await
        }
        Err(err) => {
            tracing::error!(error = %err, "account lookup aborted");
            Vec::new()
        }
    };

    run_database_stages(config, &accounts).await
}

async fn run_report(config: &AppConfig) -> anyhow::Result<()> {
    let catalog_pool = db::create_pool(&config.catalog_database_url).await?;
    let order_pool = db::create_pool(&config.order_database_url).await?;
    let result = report_service::print_summary(&catalog_pool, &order_pool).await;
    catalog_pool.close().await;
    order_pool.close().await;
    Ok(result?)
}

/// Provisioning failures are fatal for this stage only: the run
/// continues with zero resolved accounts, seeds the catalog, and
/// writes no orders.
async fn provision_stage(config: &AppConfig) -> Vec<Account> {
    let client = identity_service::IdentityClient::new(config.identity.clone());
    match identity_service::provision_accounts(&client, &data::desired_accounts()).await {
        Ok(accounts) => accounts,
        Err(err) => {
            tracing::error!(error = %err, "provisioning aborted");
            Vec::new()
        }
    }
}

/// Stages against the two stores, with both pools closed on every
/// exit path.
async fn run_database_stages(config: &AppConfig, accounts: &[Account]) -> anyhow::Result<()> {
    let catalog_pool = db::create_pool(&config.catalog_database_url).await?;
    let order_pool = db::create_pool(&config.order_database_url).await?;

    let result = seed_and_synthesize(&catalog_pool, &order_pool, accounts).await;

    catalog_pool.close().await;
    order_pool.close().await;
    result
}

async fn seed_and_synthesize(
    catalog_pool: &sqlx::MySqlPool,
    order_pool: &sqlx::MySqlPool,
    accounts: &[Account],
) -> anyhow::Result<()> {
    db::ensure_catalog_schema(catalog_pool).await?;
    db::ensure_order_schema(order_pool).await?;

    db::clear_order_store(order_pool).await?;
    tracing::info!("order store cleared");

    // Catalog replacement commits before the snapshot is read; a
    // failure here aborts before any order can reference stale rows.
    catalog_service::seed_catalog(catalog_pool).await?;

    if accounts.is_empty() {
        tracing::warn!("no resolved accounts; skipping order synthesis");
    } else {
        let snapshot = catalog_service::catalog_snapshot(catalog_pool).await?;
        let drafts = {
            let mut rng = rand::rng();
            order_service::synthesize_commands(&mut rng, accounts, &snapshot, Utc::now())
        };
        // A failed prerequisite aborts synthesis only; the summary
        // below still reports whatever the stores hold.
        match drafts {
            Ok(drafts) => {
                order_service::persist_commands(order_pool, &drafts).await?;
            }
            Err(err) => {
                tracing::error!(error = %err, "order synthesis aborted");
            }
        }
    }

    report_service::print_summary(catalog_pool, order_pool).await?;
    Ok(())
}
