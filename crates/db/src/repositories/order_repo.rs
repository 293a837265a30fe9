//! Repository for `orders` and `order_items`.
//!
//! Placing and cancelling an order touch product stock, so both run in a
//! single transaction with the affected product rows locked.

use std::collections::HashMap;

use marketplace_core::catalog::ProductStatus;
use marketplace_core::error::CoreError;
use marketplace_core::order::{compute_totals, order_number, OrderStatus, PricedLine};
use marketplace_core::pagination::PageRequest;
use marketplace_core::types::{DbId, Money, Timestamp};
use marketplace_core::vendor::VendorStatus;
use sqlx::{FromRow, PgConnection, PgPool};

use crate::error::DbError;
use crate::filter::{BindValue, Filter};
use crate::models::order::{CreateOrder, Order, OrderDetail, OrderItem, OrderQuery};
use crate::repositories::DeliveryRepo;

const SELECT: &str = "SELECT o.id, o.order_number, o.client_id, u.full_name AS client_name, \
                      o.status, o.subtotal, o.shipping_fee, o.total, o.shipping_address, \
                      o.created_at, o.updated_at \
                      FROM orders o \
                      JOIN clients c ON c.id = o.client_id \
                      JOIN users u ON u.id = c.user_id";

const FROM: &str = "FROM orders o \
                    JOIN clients c ON c.id = o.client_id \
                    JOIN users u ON u.id = c.user_id";

const ITEM_SELECT: &str = "SELECT oi.id, oi.order_id, oi.product_id, p.name AS product_name, \
                           oi.vendor_id, oi.quantity, oi.unit_price, oi.line_total \
                           FROM order_items oi JOIN products p ON p.id = oi.product_id";

/// Product state read under lock while placing an order.
#[derive(Debug, FromRow)]
struct LockedProduct {
    id: DbId,
    vendor_id: DbId,
    name: String,
    price: Money,
    stock: i32,
    status: String,
    deleted_at: Option<Timestamp>,
    vendor_status: String,
    vendor_deleted_at: Option<Timestamp>,
}

pub struct OrderRepo;

impl OrderRepo {
    /// Place an order: lock products, check availability and stock, decrement
    /// stock, and insert the order with its lines at current prices.
    ///
    /// Lines must already have passed `order::validate_lines`.
    pub async fn place(pool: &PgPool, input: &CreateOrder) -> Result<OrderDetail, DbError> {
        let mut tx = pool.begin().await?;

        let client_live: Option<bool> =
            sqlx::query_scalar("SELECT deleted_at IS NULL FROM clients WHERE id = $1")
                .bind(input.client_id)
                .fetch_optional(&mut *tx)
                .await?;
        if client_live != Some(true) {
            return Err(CoreError::NotFound {
                entity: "Client",
                id: input.client_id,
            }
            .into());
        }

        // Lock in id order so concurrent orders cannot deadlock. Soft-deleted
        // rows are locked too; they fail `check_sellable` rather than vanish.
        let ids: Vec<DbId> = input.items.iter().map(|l| l.product_id).collect();
        let locked = sqlx::query_as::<_, LockedProduct>(
            "SELECT p.id, p.vendor_id, p.name, p.price, p.stock, p.status, p.deleted_at,
                    v.status AS vendor_status, v.deleted_at AS vendor_deleted_at
             FROM products p JOIN vendors v ON v.id = p.vendor_id
             WHERE p.id = ANY($1)
             ORDER BY p.id
             FOR UPDATE OF p",
        )
        .bind(&ids)
        .fetch_all(&mut *tx)
        .await?;
        let by_id: HashMap<DbId, LockedProduct> = locked.into_iter().map(|p| (p.id, p)).collect();

        let mut priced = Vec::with_capacity(input.items.len());
        for line in &input.items {
            let product = by_id.get(&line.product_id).ok_or(CoreError::NotFound {
                entity: "Product",
                id: line.product_id,
            })?;
            check_sellable(product)?;
            if product.stock < line.quantity {
                return Err(CoreError::Conflict(format!(
                    "Insufficient stock for '{}': {} available, {} requested",
                    product.name, product.stock, line.quantity
                ))
                .into());
            }
            priced.push(PricedLine {
                unit_price: product.price,
                quantity: line.quantity,
            });
        }
        let totals = compute_totals(&priced, input.shipping_fee)?;

        let (order_id, created_at): (DbId, Timestamp) = sqlx::query_as(
            "INSERT INTO orders (client_id, status, subtotal, shipping_fee, total, shipping_address)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING id, created_at",
        )
        .bind(input.client_id)
        .bind(OrderStatus::Pending.as_str())
        .bind(totals.subtotal)
        .bind(totals.shipping_fee)
        .bind(totals.total)
        .bind(&input.shipping_address)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query("UPDATE orders SET order_number = $2 WHERE id = $1")
            .bind(order_id)
            .bind(order_number(order_id, created_at))
            .execute(&mut *tx)
            .await?;

        for (line, price) in input.items.iter().zip(&priced) {
            let product = &by_id[&line.product_id];
            sqlx::query(
                "INSERT INTO order_items (order_id, product_id, vendor_id, quantity, unit_price,
                                          line_total)
                 VALUES ($1, $2, $3, $4, $5, $6)",
            )
            .bind(order_id)
            .bind(product.id)
            .bind(product.vendor_id)
            .bind(line.quantity)
            .bind(price.unit_price)
            .bind(price.line_total()?)
            .execute(&mut *tx)
            .await?;

            sqlx::query("UPDATE products SET stock = stock - $2 WHERE id = $1")
                .bind(product.id)
                .bind(line.quantity)
                .execute(&mut *tx)
                .await?;
        }

        let detail = load_detail(&mut tx, order_id).await?;
        tx.commit().await?;

        tracing::info!(
            order_id,
            client_id = input.client_id,
            total = totals.total,
            lines = input.items.len(),
            "Order placed",
        );
        Ok(detail)
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Order>, sqlx::Error> {
        let query = format!("{SELECT} WHERE o.id = $1");
        sqlx::query_as::<_, Order>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Order with its lines and delivery.
    pub async fn find_detail(pool: &PgPool, id: DbId) -> Result<Option<OrderDetail>, sqlx::Error> {
        let mut conn = pool.acquire().await?;
        match load_detail(&mut conn, id).await {
            Ok(detail) => Ok(Some(detail)),
            Err(sqlx::Error::RowNotFound) => Ok(None),
            Err(e) => Err(e),
        }
    }

    pub async fn list(
        pool: &PgPool,
        params: &OrderQuery,
        page: PageRequest,
    ) -> Result<Vec<Order>, sqlx::Error> {
        let filter = build_filter(params);
        let idx = filter.next_index();
        let query = format!(
            "{SELECT} {} ORDER BY o.created_at DESC, o.id DESC LIMIT ${idx} OFFSET ${}",
            filter.where_clause(),
            idx + 1
        );
        filter
            .bind_as(sqlx::query_as::<_, Order>(&query))
            .bind(page.limit)
            .bind(page.offset)
            .fetch_all(pool)
            .await
    }

    /// Every order matching the filter, for export.
    pub async fn list_all(pool: &PgPool, params: &OrderQuery) -> Result<Vec<Order>, sqlx::Error> {
        let filter = build_filter(params);
        let query = format!("{SELECT} {} ORDER BY o.id", filter.where_clause());
        filter
            .bind_as(sqlx::query_as::<_, Order>(&query))
            .fetch_all(pool)
            .await
    }

    pub async fn count(pool: &PgPool, params: &OrderQuery) -> Result<i64, sqlx::Error> {
        let filter = build_filter(params);
        let query = format!("SELECT COUNT(*) {FROM} {}", filter.where_clause());
        filter
            .bind_scalar(sqlx::query_scalar::<_, i64>(&query))
            .fetch_one(pool)
            .await
    }

    /// Move an order to `next`. Cancelling puts every line's quantity back
    /// into stock in the same transaction.
    pub async fn update_status(
        pool: &PgPool,
        id: DbId,
        next: OrderStatus,
    ) -> Result<Order, DbError> {
        let mut tx = pool.begin().await?;

        let current: String =
            sqlx::query_scalar("SELECT status FROM orders WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?
                .ok_or(CoreError::NotFound { entity: "Order", id })?;
        let next = current.parse::<OrderStatus>()?.transition(next)?;

        if next == OrderStatus::Cancelled {
            let restored = sqlx::query(
                "UPDATE products p SET stock = p.stock + oi.quantity
                 FROM order_items oi
                 WHERE oi.order_id = $1 AND p.id = oi.product_id",
            )
            .bind(id)
            .execute(&mut *tx)
            .await?;
            tracing::info!(order_id = id, products = restored.rows_affected(), "Stock restored");
        }

        sqlx::query("UPDATE orders SET status = $2 WHERE id = $1")
            .bind(id)
            .bind(next.as_str())
            .execute(&mut *tx)
            .await?;

        let query = format!("{SELECT} WHERE o.id = $1");
        let order = sqlx::query_as::<_, Order>(&query)
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(order)
    }

    pub async fn items_for(pool: &PgPool, order_id: DbId) -> Result<Vec<OrderItem>, sqlx::Error> {
        let query = format!("{ITEM_SELECT} WHERE oi.order_id = $1 ORDER BY oi.id");
        sqlx::query_as::<_, OrderItem>(&query)
            .bind(order_id)
            .fetch_all(pool)
            .await
    }
}

fn check_sellable(product: &LockedProduct) -> Result<(), CoreError> {
    let vendor_ok = product.vendor_deleted_at.is_none()
        && product
            .vendor_status
            .parse::<VendorStatus>()
            .is_ok_and(VendorStatus::can_sell);
    let listed = product.deleted_at.is_none() && product.status == ProductStatus::Active.as_str();
    if !listed || !vendor_ok {
        return Err(CoreError::Validation(format!(
            "Product '{}' is not available for sale",
            product.name
        )));
    }
    Ok(())
}

async fn load_detail(conn: &mut PgConnection, id: DbId) -> Result<OrderDetail, sqlx::Error> {
    let query = format!("{SELECT} WHERE o.id = $1");
    let order = sqlx::query_as::<_, Order>(&query)
        .bind(id)
        .fetch_one(&mut *conn)
        .await?;

    let query = format!("{ITEM_SELECT} WHERE oi.order_id = $1 ORDER BY oi.id");
    let items = sqlx::query_as::<_, OrderItem>(&query)
        .bind(id)
        .fetch_all(&mut *conn)
        .await?;

    let delivery = DeliveryRepo::find_by_order(&mut *conn, id).await?;

    Ok(OrderDetail {
        order,
        items,
        delivery,
    })
}

fn build_filter(params: &OrderQuery) -> Filter {
    let mut filter = Filter::new();
    filter
        .eq_text("o.status", params.status.as_deref())
        .eq_i64("o.client_id", params.client_id);
    if let Some(vendor_id) = params.vendor_id {
        filter.push(
            "EXISTS (SELECT 1 FROM order_items oi WHERE oi.order_id = o.id AND oi.vendor_id = ?)",
            BindValue::BigInt(vendor_id),
        );
    }
    if let Some(from) = params.from {
        filter.push("o.created_at >= ?", BindValue::Timestamp(from));
    }
    if let Some(to) = params.to {
        filter.push("o.created_at <= ?", BindValue::Timestamp(to));
    }
    filter
}
