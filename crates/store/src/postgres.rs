use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::{
    CartId, CartItemId, CategoryId, ColorId, CustomerId, OrderId, OrderItemId, ProductId,
    ReservationId, SellerId, SizeId,
};
use domain::{
    Cart, CartItem, CartStatus, Category, Money, Order, OrderItem, OrderStatus, PaymentMethod,
    Product, ProductVariant, ReservedStock, TaxRate, VariantKey,
};
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Postgres, Row, Transaction};
use uuid::Uuid;

use crate::{
    Result, StoreError,
    store::{
        CartRepository, CatalogRepository, CheckoutStore, InventoryRepository, OrderRepository,
        StoreTransaction,
    },
};

/// PostgreSQL-backed store.
///
/// Stock decrements are single conditional `UPDATE`s, so the row lock they
/// take serializes concurrent reservations of the same variant across every
/// server process sharing the database.
#[derive(Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Creates a new PostgreSQL store.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connects a pool to `database_url`.
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;
        tracing::info!(max_connections, "connected to PostgreSQL");
        Ok(Self::new(pool))
    }

    /// Runs the database migrations.
    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("../../migrations").run(&self.pool).await?;
        tracing::info!("database migrations applied");
        Ok(())
    }

    /// Inserts or replaces a category.
    pub async fn put_category(&self, category: &Category) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO categories (id, name, parent_id, tax_slab_basis_points)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (id) DO UPDATE SET
                name = EXCLUDED.name,
                parent_id = EXCLUDED.parent_id,
                tax_slab_basis_points = EXCLUDED.tax_slab_basis_points
            "#,
        )
        .bind(category.id.as_uuid())
        .bind(&category.name)
        .bind(category.parent_id.map(|id| id.as_uuid()))
        .bind(
            category
                .tax_slab
                .map(|rate| to_i32(rate.basis_points(), "tax_slab_basis_points"))
                .transpose()?,
        )
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Inserts or replaces a product and its category links.
    pub async fn put_product(&self, product: &Product) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO products (id, seller_id, name, sku, price, discount_percent)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (id) DO UPDATE SET
                seller_id = EXCLUDED.seller_id,
                name = EXCLUDED.name,
                sku = EXCLUDED.sku,
                price = EXCLUDED.price,
                discount_percent = EXCLUDED.discount_percent
            "#,
        )
        .bind(product.id.as_uuid())
        .bind(product.seller_id.as_uuid())
        .bind(&product.name)
        .bind(&product.sku)
        .bind(product.price.minor())
        .bind(i16::from(product.discount_percent))
        .execute(&mut *tx)
        .await?;

        sqlx::query("DELETE FROM product_categories WHERE product_id = $1")
            .bind(product.id.as_uuid())
            .execute(&mut *tx)
            .await?;

        for (position, category_id) in product.category_ids.iter().enumerate() {
            sqlx::query(
                "INSERT INTO product_categories (product_id, category_id, position) VALUES ($1, $2, $3)",
            )
            .bind(product.id.as_uuid())
            .bind(category_id.as_uuid())
            .bind(to_i32(position as u32, "position")?)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    /// Inserts or replaces a variant's stock level.
    pub async fn put_variant(&self, variant: &ProductVariant) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO product_variants (product_id, color_id, size_id, stock_available)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (product_id, color_id, size_id) DO UPDATE SET
                stock_available = EXCLUDED.stock_available
            "#,
        )
        .bind(variant.key.product_id.as_uuid())
        .bind(variant.key.color_id.as_uuid())
        .bind(variant.key.size_id.as_uuid())
        .bind(to_i32(variant.stock_available, "stock_available")?)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Current stock of a variant, read outside any transaction.
    pub async fn stock(&self, key: VariantKey) -> Result<Option<u32>> {
        let stock: Option<i32> = sqlx::query_scalar(
            "SELECT stock_available FROM product_variants WHERE product_id = $1 AND color_id = $2 AND size_id = $3",
        )
        .bind(key.product_id.as_uuid())
        .bind(key.color_id.as_uuid())
        .bind(key.size_id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        stock.map(|s| to_u32(s, "stock_available")).transpose()
    }
}

#[async_trait]
impl CheckoutStore for PostgresStore {
    type Tx = PostgresTransaction;

    async fn begin(&self) -> Result<Self::Tx> {
        Ok(PostgresTransaction {
            tx: self.pool.begin().await?,
        })
    }
}

/// First key of the advisory lock taken around cart creation.
const CART_LOCK_NAMESPACE: i32 = 0x6361_7274;

/// Folds a customer id into the 32-bit second key of an advisory lock.
/// Collisions only make unrelated customers wait on each other.
fn customer_lock_key(customer_id: CustomerId) -> i32 {
    let bits = customer_id.as_uuid().as_u128();
    let folded = (bits ^ (bits >> 64)) as u64;
    ((folded ^ (folded >> 32)) as u32) as i32
}

/// A PostgreSQL transaction. Dropping it without commit rolls back.
pub struct PostgresTransaction {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl CartRepository for PostgresTransaction {
    async fn find_active_cart(&mut self, cart_id: CartId) -> Result<Option<Cart>> {
        let row = sqlx::query(
            "SELECT id, customer_id, status FROM carts WHERE id = $1 AND status = 'ACTIVE' FOR UPDATE",
        )
        .bind(cart_id.as_uuid())
        .fetch_optional(&mut *self.tx)
        .await?;

        row.map(row_to_cart).transpose()
    }

    async fn lock_customer_carts(&mut self, customer_id: CustomerId) -> Result<()> {
        sqlx::query("SELECT pg_advisory_xact_lock($1, $2)")
            .bind(CART_LOCK_NAMESPACE)
            .bind(customer_lock_key(customer_id))
            .execute(&mut *self.tx)
            .await?;
        Ok(())
    }

    async fn find_active_cart_for_customer(
        &mut self,
        customer_id: CustomerId,
    ) -> Result<Option<Cart>> {
        let row = sqlx::query(
            r#"
            SELECT id, customer_id, status
            FROM carts
            WHERE customer_id = $1 AND status = 'ACTIVE'
            ORDER BY created_at ASC
            LIMIT 1
            FOR UPDATE
            "#,
        )
        .bind(customer_id.as_uuid())
        .fetch_optional(&mut *self.tx)
        .await?;

        row.map(row_to_cart).transpose()
    }

    async fn insert_cart(&mut self, cart: &Cart) -> Result<()> {
        sqlx::query("INSERT INTO carts (id, customer_id, status) VALUES ($1, $2, $3)")
            .bind(cart.id.as_uuid())
            .bind(cart.customer_id.as_uuid())
            .bind(cart.status.as_str())
            .execute(&mut *self.tx)
            .await?;
        Ok(())
    }

    async fn cart_items(&mut self, cart_id: CartId) -> Result<Vec<CartItem>> {
        let rows = sqlx::query(
            r#"
            SELECT id, cart_id, product_id, color_id, size_id, quantity, unit_price
            FROM cart_items
            WHERE cart_id = $1
            ORDER BY seq ASC
            "#,
        )
        .bind(cart_id.as_uuid())
        .fetch_all(&mut *self.tx)
        .await?;

        rows.into_iter().map(row_to_cart_item).collect()
    }

    async fn insert_cart_item(&mut self, item: &CartItem) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO cart_items (id, cart_id, product_id, color_id, size_id, quantity, unit_price)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(item.id.as_uuid())
        .bind(item.cart_id.as_uuid())
        .bind(item.variant.product_id.as_uuid())
        .bind(item.variant.color_id.as_uuid())
        .bind(item.variant.size_id.as_uuid())
        .bind(to_i32(item.quantity, "quantity")?)
        .bind(item.unit_price.minor())
        .execute(&mut *self.tx)
        .await?;
        Ok(())
    }

    async fn update_cart_item_quantity(
        &mut self,
        item_id: CartItemId,
        quantity: u32,
    ) -> Result<bool> {
        let result = sqlx::query("UPDATE cart_items SET quantity = $2 WHERE id = $1")
            .bind(item_id.as_uuid())
            .bind(to_i32(quantity, "quantity")?)
            .execute(&mut *self.tx)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_cart_item(&mut self, item_id: CartItemId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM cart_items WHERE id = $1")
            .bind(item_id.as_uuid())
            .execute(&mut *self.tx)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn mark_cart_checked_out(&mut self, cart_id: CartId) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE carts SET status = 'CHECKED_OUT' WHERE id = $1 AND status = 'ACTIVE'",
        )
        .bind(cart_id.as_uuid())
        .execute(&mut *self.tx)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl CatalogRepository for PostgresTransaction {
    async fn get_product(&mut self, product_id: ProductId) -> Result<Option<Product>> {
        let Some(row) = sqlx::query(
            "SELECT id, seller_id, name, sku, price, discount_percent FROM products WHERE id = $1",
        )
        .bind(product_id.as_uuid())
        .fetch_optional(&mut *self.tx)
        .await?
        else {
            return Ok(None);
        };

        let category_ids: Vec<Uuid> = sqlx::query_scalar(
            "SELECT category_id FROM product_categories WHERE product_id = $1 ORDER BY position ASC",
        )
        .bind(product_id.as_uuid())
        .fetch_all(&mut *self.tx)
        .await?;

        let discount: i16 = row.try_get("discount_percent")?;
        Ok(Some(Product {
            id: ProductId::from_uuid(row.try_get("id")?),
            seller_id: SellerId::from_uuid(row.try_get("seller_id")?),
            name: row.try_get("name")?,
            sku: row.try_get("sku")?,
            price: Money::from_minor(row.try_get("price")?),
            discount_percent: u8::try_from(discount).map_err(|_| StoreError::CorruptRow {
                column: "discount_percent",
                value: discount.to_string(),
            })?,
            category_ids: category_ids.into_iter().map(CategoryId::from_uuid).collect(),
        }))
    }

    async fn get_category(&mut self, category_id: CategoryId) -> Result<Option<Category>> {
        let row = sqlx::query(
            "SELECT id, name, parent_id, tax_slab_basis_points FROM categories WHERE id = $1",
        )
        .bind(category_id.as_uuid())
        .fetch_optional(&mut *self.tx)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };
        let tax_slab: Option<i32> = row.try_get("tax_slab_basis_points")?;
        Ok(Some(Category {
            id: CategoryId::from_uuid(row.try_get("id")?),
            name: row.try_get("name")?,
            parent_id: row
                .try_get::<Option<Uuid>, _>("parent_id")?
                .map(CategoryId::from_uuid),
            tax_slab: tax_slab
                .map(|bp| to_u32(bp, "tax_slab_basis_points").map(TaxRate::from_basis_points))
                .transpose()?,
        }))
    }

    async fn get_variant(&mut self, key: VariantKey) -> Result<Option<ProductVariant>> {
        let stock: Option<i32> = sqlx::query_scalar(
            "SELECT stock_available FROM product_variants WHERE product_id = $1 AND color_id = $2 AND size_id = $3",
        )
        .bind(key.product_id.as_uuid())
        .bind(key.color_id.as_uuid())
        .bind(key.size_id.as_uuid())
        .fetch_optional(&mut *self.tx)
        .await?;

        stock
            .map(|s| {
                Ok(ProductVariant {
                    key,
                    stock_available: to_u32(s, "stock_available")?,
                })
            })
            .transpose()
    }
}

#[async_trait]
impl InventoryRepository for PostgresTransaction {
    async fn decrement_stock(&mut self, key: VariantKey, quantity: u32) -> Result<Option<u32>> {
        let remaining: Option<i32> = sqlx::query_scalar(
            r#"
            UPDATE product_variants
            SET stock_available = stock_available - $4
            WHERE product_id = $1 AND color_id = $2 AND size_id = $3
              AND stock_available >= $4
            RETURNING stock_available
            "#,
        )
        .bind(key.product_id.as_uuid())
        .bind(key.color_id.as_uuid())
        .bind(key.size_id.as_uuid())
        .bind(to_i32(quantity, "quantity")?)
        .fetch_optional(&mut *self.tx)
        .await?;

        if remaining.is_none() {
            tracing::debug!(%key, quantity, "conditional stock decrement matched no row");
        }
        remaining.map(|s| to_u32(s, "stock_available")).transpose()
    }

    async fn increment_stock(&mut self, key: VariantKey, quantity: u32) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE product_variants
            SET stock_available = stock_available + $4
            WHERE product_id = $1 AND color_id = $2 AND size_id = $3
            "#,
        )
        .bind(key.product_id.as_uuid())
        .bind(key.color_id.as_uuid())
        .bind(key.size_id.as_uuid())
        .bind(to_i32(quantity, "quantity")?)
        .execute(&mut *self.tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("Variant", key));
        }
        Ok(())
    }

    async fn insert_reservation(&mut self, reservation: &ReservedStock) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO reserved_stock
                (id, product_id, color_id, size_id, quantity, created_at, expires_at, released_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(reservation.id.as_uuid())
        .bind(reservation.variant.product_id.as_uuid())
        .bind(reservation.variant.color_id.as_uuid())
        .bind(reservation.variant.size_id.as_uuid())
        .bind(to_i32(reservation.quantity, "quantity")?)
        .bind(reservation.created_at)
        .bind(reservation.expires_at)
        .bind(reservation.released_at)
        .execute(&mut *self.tx)
        .await?;
        Ok(())
    }

    async fn get_reservation(
        &mut self,
        reservation_id: ReservationId,
    ) -> Result<Option<ReservedStock>> {
        let row = sqlx::query(
            r#"
            SELECT id, product_id, color_id, size_id, quantity, created_at, expires_at, released_at
            FROM reserved_stock
            WHERE id = $1
            FOR UPDATE
            "#,
        )
        .bind(reservation_id.as_uuid())
        .fetch_optional(&mut *self.tx)
        .await?;

        row.map(row_to_reservation).transpose()
    }

    async fn mark_reservation_released(
        &mut self,
        reservation_id: ReservationId,
        at: DateTime<Utc>,
    ) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE reserved_stock SET released_at = $2 WHERE id = $1 AND released_at IS NULL",
        )
        .bind(reservation_id.as_uuid())
        .bind(at)
        .execute(&mut *self.tx)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_reservation(&mut self, reservation_id: ReservationId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM reserved_stock WHERE id = $1")
            .bind(reservation_id.as_uuid())
            .execute(&mut *self.tx)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn expired_unattached_reservations(
        &mut self,
        now: DateTime<Utc>,
        limit: usize,
    ) -> Result<Vec<ReservedStock>> {
        let rows = sqlx::query(
            r#"
            SELECT r.id, r.product_id, r.color_id, r.size_id, r.quantity,
                   r.created_at, r.expires_at, r.released_at
            FROM reserved_stock r
            WHERE r.released_at IS NULL
              AND r.expires_at < $1
              AND NOT EXISTS (SELECT 1 FROM order_items oi WHERE oi.reserved_stock_id = r.id)
            ORDER BY r.expires_at ASC
            LIMIT $2
            FOR UPDATE OF r SKIP LOCKED
            "#,
        )
        .bind(now)
        .bind(i64::try_from(limit).unwrap_or(i64::MAX))
        .fetch_all(&mut *self.tx)
        .await?;

        rows.into_iter().map(row_to_reservation).collect()
    }
}

#[async_trait]
impl OrderRepository for PostgresTransaction {
    async fn insert_order(&mut self, order: &Order) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO orders
                (id, customer_id, sub_total, shipping_charge, tax, total,
                 order_status, is_paid, payment_method, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(order.id.as_uuid())
        .bind(order.customer_id.as_uuid())
        .bind(order.sub_total.minor())
        .bind(order.shipping_charge.minor())
        .bind(order.tax.minor())
        .bind(order.total.minor())
        .bind(order.order_status.as_str())
        .bind(order.is_paid)
        .bind(order.payment_method.as_str())
        .bind(order.created_at)
        .execute(&mut *self.tx)
        .await?;

        for (line_no, item) in order.items.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO order_items
                    (id, order_id, line_no, product_id, color_id, size_id, seller_id,
                     quantity, unit_price, total_price, tax, product_name, product_sku,
                     reserved_stock_id)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
                "#,
            )
            .bind(item.id.as_uuid())
            .bind(item.order_id.as_uuid())
            .bind(to_i32(line_no as u32, "line_no")?)
            .bind(item.variant.product_id.as_uuid())
            .bind(item.variant.color_id.as_uuid())
            .bind(item.variant.size_id.as_uuid())
            .bind(item.seller_id.as_uuid())
            .bind(to_i32(item.quantity, "quantity")?)
            .bind(item.unit_price.minor())
            .bind(item.total_price.minor())
            .bind(item.tax.minor())
            .bind(&item.product_name)
            .bind(&item.product_sku)
            .bind(item.reserved_stock_id.as_uuid())
            .execute(&mut *self.tx)
            .await?;
        }

        Ok(())
    }

    async fn get_order(&mut self, order_id: OrderId) -> Result<Option<Order>> {
        let row = sqlx::query(
            r#"
            SELECT id, customer_id, sub_total, shipping_charge, tax, total,
                   order_status, is_paid, payment_method, created_at
            FROM orders
            WHERE id = $1
            "#,
        )
        .bind(order_id.as_uuid())
        .fetch_optional(&mut *self.tx)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let item_rows = sqlx::query(
            r#"
            SELECT id, order_id, product_id, color_id, size_id, seller_id, quantity,
                   unit_price, total_price, tax, product_name, product_sku, reserved_stock_id
            FROM order_items
            WHERE order_id = $1
            ORDER BY line_no ASC
            "#,
        )
        .bind(order_id.as_uuid())
        .fetch_all(&mut *self.tx)
        .await?;

        let status: String = row.try_get("order_status")?;
        let method: String = row.try_get("payment_method")?;
        Ok(Some(Order {
            id: OrderId::from_uuid(row.try_get("id")?),
            customer_id: CustomerId::from_uuid(row.try_get("customer_id")?),
            sub_total: Money::from_minor(row.try_get("sub_total")?),
            shipping_charge: Money::from_minor(row.try_get("shipping_charge")?),
            tax: Money::from_minor(row.try_get("tax")?),
            total: Money::from_minor(row.try_get("total")?),
            order_status: OrderStatus::parse(&status).ok_or(StoreError::CorruptRow {
                column: "order_status",
                value: status.clone(),
            })?,
            is_paid: row.try_get("is_paid")?,
            payment_method: PaymentMethod::parse(&method).ok_or(StoreError::CorruptRow {
                column: "payment_method",
                value: method.clone(),
            })?,
            created_at: row.try_get("created_at")?,
            items: item_rows
                .into_iter()
                .map(row_to_order_item)
                .collect::<Result<_>>()?,
        }))
    }

    async fn update_order_payment(&mut self, order: &Order) -> Result<()> {
        let result = sqlx::query(
            "UPDATE orders SET order_status = $2, is_paid = $3, payment_method = $4 WHERE id = $1",
        )
        .bind(order.id.as_uuid())
        .bind(order.order_status.as_str())
        .bind(order.is_paid)
        .bind(order.payment_method.as_str())
        .execute(&mut *self.tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("Order", order.id));
        }
        Ok(())
    }
}

#[async_trait]
impl StoreTransaction for PostgresTransaction {
    async fn commit(self) -> Result<()> {
        self.tx.commit().await?;
        Ok(())
    }

    async fn rollback(self) -> Result<()> {
        self.tx.rollback().await?;
        Ok(())
    }
}

fn to_u32(value: i32, column: &'static str) -> Result<u32> {
    u32::try_from(value).map_err(|_| StoreError::CorruptRow {
        column,
        value: value.to_string(),
    })
}

fn to_i32(value: u32, column: &'static str) -> Result<i32> {
    i32::try_from(value).map_err(|_| StoreError::OutOfRange {
        column,
        value: value.to_string(),
    })
}

fn row_variant(row: &PgRow) -> Result<VariantKey> {
    Ok(VariantKey::new(
        ProductId::from_uuid(row.try_get("product_id")?),
        ColorId::from_uuid(row.try_get("color_id")?),
        SizeId::from_uuid(row.try_get("size_id")?),
    ))
}

fn row_to_cart(row: PgRow) -> Result<Cart> {
    let status: String = row.try_get("status")?;
    Ok(Cart {
        id: CartId::from_uuid(row.try_get("id")?),
        customer_id: CustomerId::from_uuid(row.try_get("customer_id")?),
        status: CartStatus::parse(&status).ok_or(StoreError::CorruptRow {
            column: "status",
            value: status.clone(),
        })?,
    })
}

fn row_to_cart_item(row: PgRow) -> Result<CartItem> {
    Ok(CartItem {
        id: CartItemId::from_uuid(row.try_get("id")?),
        cart_id: CartId::from_uuid(row.try_get("cart_id")?),
        variant: row_variant(&row)?,
        quantity: to_u32(row.try_get("quantity")?, "quantity")?,
        unit_price: Money::from_minor(row.try_get("unit_price")?),
    })
}

fn row_to_reservation(row: PgRow) -> Result<ReservedStock> {
    Ok(ReservedStock {
        id: ReservationId::from_uuid(row.try_get("id")?),
        variant: row_variant(&row)?,
        quantity: to_u32(row.try_get("quantity")?, "quantity")?,
        created_at: row.try_get("created_at")?,
        expires_at: row.try_get("expires_at")?,
        released_at: row.try_get("released_at")?,
    })
}

fn row_to_order_item(row: PgRow) -> Result<OrderItem> {
    Ok(OrderItem {
        id: OrderItemId::from_uuid(row.try_get("id")?),
        order_id: OrderId::from_uuid(row.try_get("order_id")?),
        variant: row_variant(&row)?,
        seller_id: SellerId::from_uuid(row.try_get("seller_id")?),
        quantity: to_u32(row.try_get("quantity")?, "quantity")?,
        unit_price: Money::from_minor(row.try_get("unit_price")?),
        total_price: Money::from_minor(row.try_get("total_price")?),
        tax: Money::from_minor(row.try_get("tax")?),
        product_name: row.try_get("product_name")?,
        product_sku: row.try_get("product_sku")?,
        reserved_stock_id: ReservationId::from_uuid(row.try_get("reserved_stock_id")?),
    })
}
