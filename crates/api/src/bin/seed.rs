//! Order seeding tool.
//!
//! Places `SEED_ORDER_COUNT` random orders (default 50) across existing
//! clients and sellable products, through the same repository transaction the
//! API uses, so stock and totals stay consistent.
//!
//! Run with: `cargo run --bin marketplace-seed`

use anyhow::Context;
use marketplace_core::order::validate_lines;
use marketplace_core::types::DbId;
use marketplace_db::error::DbError;
use marketplace_db::models::order::{CreateOrder, OrderLine};
use marketplace_db::repositories::OrderRepo;
use marketplace_db::DbPool;
use rand::seq::IndexedRandom;
use rand::Rng;

const DEFAULT_ORDER_COUNT: usize = 50;
const MAX_ITEMS_PER_ORDER: usize = 4;
const MAX_QUANTITY: i32 = 3;

#[derive(Debug, sqlx::FromRow)]
struct SeedClient {
    id: DbId,
    shipping_address: Option<String>,
}

#[derive(Debug, sqlx::FromRow)]
struct SeedProduct {
    id: DbId,
    stock: i32,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "marketplace_seed=info,marketplace_db=info".into()),
        )
        .init();

    let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
    let order_count = match std::env::var("SEED_ORDER_COUNT") {
        Ok(v) => v.parse::<usize>().context("SEED_ORDER_COUNT must be a valid usize")?,
        Err(_) => DEFAULT_ORDER_COUNT,
    };

    let pool = marketplace_db::create_pool(&database_url)
        .await
        .context("Failed to connect to database")?;
    marketplace_db::run_migrations(&pool)
        .await
        .context("Failed to run database migrations")?;

    let clients = load_clients(&pool).await?;
    let mut products = load_products(&pool).await?;
    if clients.is_empty() || products.is_empty() {
        tracing::warn!(
            clients = clients.len(),
            products = products.len(),
            "Nothing to seed: need at least one client and one product in stock"
        );
        return Ok(());
    }

    tracing::info!(
        order_count,
        clients = clients.len(),
        products = products.len(),
        "Seeding orders"
    );

    let mut placed = 0usize;
    let mut skipped = 0usize;
    for _ in 0..order_count {
        products.retain(|p| p.stock > 0);
        if products.is_empty() {
            tracing::warn!("All products are out of stock, stopping early");
            break;
        }

        let input = random_order(&clients, &products);
        let pairs: Vec<(DbId, i32)> =
            input.items.iter().map(|l| (l.product_id, l.quantity)).collect();
        validate_lines(&pairs)?;

        match OrderRepo::place(&pool, &input).await {
            Ok(detail) => {
                for line in &input.items {
                    if let Some(p) = products.iter_mut().find(|p| p.id == line.product_id) {
                        p.stock -= line.quantity;
                    }
                }
                tracing::debug!(order_id = detail.order.id, "Order placed");
                placed += 1;
            }
            // Stock or availability changed underneath us; try another order.
            Err(DbError::Core(e)) => {
                tracing::warn!(error = %e, "Skipped order");
                skipped += 1;
            }
            Err(DbError::Sqlx(e)) => return Err(e).context("Failed to place order"),
        }
    }

    tracing::info!(placed, skipped, "Seeding complete");
    Ok(())
}

/// A random order of 1 to 4 distinct products with quantities within stock.
fn random_order(clients: &[SeedClient], products: &[SeedProduct]) -> CreateOrder {
    let mut rng = rand::rng();
    // Both slices are checked non-empty by the caller.
    let client = &clients[rng.random_range(0..clients.len())];
    let line_count = rng.random_range(1..=MAX_ITEMS_PER_ORDER.min(products.len()));

    let chosen: Vec<&SeedProduct> = products.choose_multiple(&mut rng, line_count).collect();
    let items = chosen
        .into_iter()
        .map(|p| OrderLine {
            product_id: p.id,
            quantity: rng.random_range(1..=MAX_QUANTITY.min(p.stock)),
        })
        .collect();

    CreateOrder {
        client_id: client.id,
        shipping_address: client.shipping_address.clone(),
        shipping_fee: 0,
        items,
    }
}

async fn load_clients(pool: &DbPool) -> anyhow::Result<Vec<SeedClient>> {
    sqlx::query_as::<_, SeedClient>(
        "SELECT id, shipping_address FROM clients WHERE deleted_at IS NULL ORDER BY id",
    )
    .fetch_all(pool)
    .await
    .context("Failed to load clients")
}

/// Active products with stock whose vendor is approved and live.
async fn load_products(pool: &DbPool) -> anyhow::Result<Vec<SeedProduct>> {
    sqlx::query_as::<_, SeedProduct>(
        "SELECT p.id, p.stock
         FROM products p JOIN vendors v ON v.id = p.vendor_id
         WHERE p.deleted_at IS NULL AND p.status = 'active' AND p.stock > 0
           AND v.deleted_at IS NULL AND v.status = 'approved'
         ORDER BY p.id",
    )
    .fetch_all(pool)
    .await
    .context("Failed to load products")
}
