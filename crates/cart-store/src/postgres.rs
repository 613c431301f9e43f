use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::{CartId, Version};
use domain::{Cart, CartItem, Money};
use sqlx::{PgPool, Row, postgres::PgRow};
use uuid::Uuid;

use crate::{CartStore, CartStoreError, Result};

/// PostgreSQL-backed cart store implementation.
///
/// Carts live in a `carts` row plus one `cart_items` row per line; updates
/// rewrite both inside a transaction guarded by a version check, and destroys
/// cascade over the line table through its foreign key.
#[derive(Clone)]
pub struct PostgresCartStore {
    pool: PgPool,
}

impl PostgresCartStore {
    /// Creates a new PostgreSQL cart store.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Runs the database migrations.
    pub async fn run_migrations(&self) -> std::result::Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("../../migrations").run(&self.pool).await
    }

    fn row_to_cart(row: &PgRow, items: Vec<CartItem>) -> Result<Cart> {
        Ok(Cart::restore(
            CartId::from_uuid(row.try_get::<Uuid, _>("id")?),
            items,
            Money::from_cents(row.try_get("total_price_cents")?),
            row.try_get("last_interaction_at")?,
            row.try_get("abandoned")?,
            row.try_get("created_at")?,
            row.try_get("updated_at")?,
            Version::new(row.try_get("version")?),
        ))
    }

    async fn load_items(&self, cart_ids: &[Uuid]) -> Result<HashMap<Uuid, Vec<CartItem>>> {
        let rows = sqlx::query(
            r#"
            SELECT cart_id, product_id, quantity
            FROM cart_items
            WHERE cart_id = ANY($1)
            ORDER BY position ASC
            "#,
        )
        .bind(cart_ids)
        .fetch_all(&self.pool)
        .await?;

        let mut items: HashMap<Uuid, Vec<CartItem>> = HashMap::new();
        for row in rows {
            let cart_id: Uuid = row.try_get("cart_id")?;
            let product_id: String = row.try_get("product_id")?;
            let quantity: i32 = row.try_get("quantity")?;
            items
                .entry(cart_id)
                .or_default()
                .push(CartItem::new(product_id, quantity as u32));
        }
        Ok(items)
    }

    async fn load_carts(&self, rows: Vec<PgRow>) -> Result<Vec<Cart>> {
        let ids: Vec<Uuid> = rows
            .iter()
            .map(|row| row.try_get::<Uuid, _>("id"))
            .collect::<std::result::Result<_, _>>()?;
        let mut items = self.load_items(&ids).await?;

        rows.iter()
            .map(|row| {
                let id: Uuid = row.try_get("id")?;
                Self::row_to_cart(row, items.remove(&id).unwrap_or_default())
            })
            .collect()
    }

    async fn insert_items(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        cart: &Cart,
    ) -> Result<()> {
        for (position, item) in cart.items().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO cart_items (cart_id, product_id, quantity, position)
                VALUES ($1, $2, $3, $4)
                "#,
            )
            .bind(cart.id().as_uuid())
            .bind(item.product_id.as_str())
            .bind(item.quantity as i32)
            .bind(position as i32)
            .execute(&mut **tx)
            .await?;
        }
        Ok(())
    }
}

const SELECT_CART_COLUMNS: &str =
    "SELECT id, total_price_cents, last_interaction_at, abandoned, created_at, updated_at, version FROM carts";

#[async_trait]
impl CartStore for PostgresCartStore {
    async fn create(&self, cart: &Cart) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO carts (id, total_price_cents, last_interaction_at, abandoned, created_at, updated_at, version)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(cart.id().as_uuid())
        .bind(cart.total_price().cents())
        .bind(cart.last_interaction_at())
        .bind(cart.is_abandoned())
        .bind(cart.created_at())
        .bind(cart.updated_at())
        .bind(cart.version().as_i64())
        .execute(&mut *tx)
        .await?;

        Self::insert_items(&mut tx, cart).await?;

        tx.commit().await?;
        Ok(())
    }

    async fn get(&self, id: CartId) -> Result<Option<Cart>> {
        let row = sqlx::query(&format!("{SELECT_CART_COLUMNS} WHERE id = $1"))
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => {
                let mut items = self.load_items(&[id.as_uuid()]).await?;
                Ok(Some(Self::row_to_cart(
                    &row,
                    items.remove(&id.as_uuid()).unwrap_or_default(),
                )?))
            }
            None => Ok(None),
        }
    }

    async fn update(&self, cart: &Cart) -> Result<Version> {
        let next = cart.version().next();
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"
            UPDATE carts
            SET total_price_cents = $1,
                last_interaction_at = $2,
                abandoned = $3,
                updated_at = $4,
                version = $5
            WHERE id = $6 AND version = $7
            "#,
        )
        .bind(cart.total_price().cents())
        .bind(cart.last_interaction_at())
        .bind(cart.is_abandoned())
        .bind(cart.updated_at())
        .bind(next.as_i64())
        .bind(cart.id().as_uuid())
        .bind(cart.version().as_i64())
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            // Either the row is gone or another writer advanced the version.
            let actual: Option<i64> =
                sqlx::query_scalar("SELECT version FROM carts WHERE id = $1")
                    .bind(cart.id().as_uuid())
                    .fetch_optional(&mut *tx)
                    .await?;

            return match actual {
                Some(actual) => {
                    tracing::debug!(
                        cart_id = %cart.id(),
                        expected = cart.version().as_i64(),
                        actual,
                        "cart update lost a version race"
                    );
                    Err(CartStoreError::ConcurrencyConflict {
                        cart_id: cart.id(),
                        expected: cart.version(),
                        actual: Version::new(actual),
                    })
                }
                None => Err(CartStoreError::CartNotFound(cart.id())),
            };
        }

        sqlx::query("DELETE FROM cart_items WHERE cart_id = $1")
            .bind(cart.id().as_uuid())
            .execute(&mut *tx)
            .await?;
        Self::insert_items(&mut tx, cart).await?;

        tx.commit().await?;
        Ok(next)
    }

    async fn destroy(&self, id: CartId) -> Result<()> {
        // cart_items cascades via its foreign key.
        let result = sqlx::query("DELETE FROM carts WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(CartStoreError::CartNotFound(id));
        }
        Ok(())
    }

    async fn find_inactive_before(&self, cutoff: DateTime<Utc>) -> Result<Vec<Cart>> {
        let rows = sqlx::query(&format!(
            "{SELECT_CART_COLUMNS} WHERE abandoned = FALSE AND last_interaction_at < $1 ORDER BY last_interaction_at ASC"
        ))
        .bind(cutoff)
        .fetch_all(&self.pool)
        .await?;

        self.load_carts(rows).await
    }

    async fn find_abandoned_before(&self, cutoff: DateTime<Utc>) -> Result<Vec<Cart>> {
        let rows = sqlx::query(&format!(
            "{SELECT_CART_COLUMNS} WHERE abandoned = TRUE AND updated_at < $1 ORDER BY updated_at ASC"
        ))
        .bind(cutoff)
        .fetch_all(&self.pool)
        .await?;

        self.load_carts(rows).await
    }
}
