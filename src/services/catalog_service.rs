//! Catalog replacement: drop everything, insert the reference set.

use sqlx::MySqlPool;

use crate::data::reference_catalog;
use crate::error::SeedResult;
use crate::models::Product;

/// Replace the whole catalog with the fixed reference set.
///
/// Delete and bulk insert run in one store-local transaction, so a
/// failure mid-batch rolls back to the previous catalog and the caller
/// must not hand the (stale) snapshot to the order synthesizer.
pub async fn seed_catalog(pool: &MySqlPool) -> SeedResult<usize> {
    let catalog = reference_catalog();
    let mut tx = pool.begin().await?;

    sqlx::query("DELETE FROM products").execute(&mut *tx).await?;

    for entry in &catalog {
        sqlx::query(
            r#"
            INSERT INTO products (name, description, price, stock)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(entry.name)
        .bind(entry.description)
        .bind(entry.price)
        .bind(entry.stock)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    tracing::info!(products = catalog.len(), "catalog replaced");
    Ok(catalog.len())
}

/// Read back the catalog the order synthesizer references. Must run
/// after `seed_catalog` committed; order items carry these product ids.
pub async fn catalog_snapshot(pool: &MySqlPool) -> SeedResult<Vec<Product>> {
    let products = sqlx::query_as::<_, Product>(
        "SELECT product_id, name, description, price, stock FROM products ORDER BY product_id",
    )
    .fetch_all(pool)
    .await?;
    Ok(products)
}
