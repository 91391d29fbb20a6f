//! Integration tests for checkout against the in-memory store.

use chrono::{Duration, Utc};
use checkout::{
    CartService, CheckoutConfig, CheckoutError, CheckoutOrchestrator, ErrorKind, OrderService,
    ReservationSweeper, SweeperConfig,
};
use common::{CategoryId, ColorId, CustomerId, ProductId, SellerId, SizeId};
use domain::{
    Category, Money, OrderStatus, PaymentMethod, Product, ProductVariant, TaxRate, VariantKey,
};
use store::InMemoryStore;

struct TestHarness {
    store: InMemoryStore,
    carts: CartService<InMemoryStore>,
    checkout: CheckoutOrchestrator<InMemoryStore>,
    orders: OrderService<InMemoryStore>,
}

impl TestHarness {
    fn new() -> Self {
        let store = InMemoryStore::new();
        let config = CheckoutConfig::default();
        Self {
            carts: CartService::new(store.clone()),
            checkout: CheckoutOrchestrator::new(store.clone(), config),
            orders: OrderService::new(store.clone(), config),
            store,
        }
    }

    fn sweeper(&self) -> ReservationSweeper<InMemoryStore> {
        ReservationSweeper::new(
            self.store.clone(),
            CheckoutConfig::default(),
            SweeperConfig::default(),
        )
    }

    async fn category(&self, parent_id: Option<CategoryId>, percent: Option<u32>) -> CategoryId {
        let category = Category {
            id: CategoryId::new(),
            name: "Apparel".to_string(),
            parent_id,
            tax_slab: percent.map(TaxRate::from_percent),
        };
        let id = category.id;
        self.store.put_category(category).await;
        id
    }

    async fn variant(&self, price: i64, stock: u32, category_ids: Vec<CategoryId>) -> VariantKey {
        let product = Product {
            id: ProductId::new(),
            seller_id: SellerId::new(),
            name: "Block Print Tunic".to_string(),
            sku: format!("BPT-{price}"),
            price: Money::from_minor(price),
            discount_percent: 0,
            category_ids,
        };
        let key = VariantKey::new(product.id, ColorId::new(), SizeId::new());
        self.store.put_product(product).await;
        self.store
            .put_variant(ProductVariant {
                key,
                stock_available: stock,
            })
            .await;
        key
    }

    /// Fills a fresh cart for a new customer and returns (customer, cart).
    async fn cart(&self, lines: &[(VariantKey, u32)]) -> (CustomerId, common::CartId) {
        let customer_id = CustomerId::new();
        let mut cart_id = None;
        for &(key, quantity) in lines {
            let snapshot = self.carts.add_item(customer_id, key, quantity).await.unwrap();
            cart_id = Some(snapshot.cart.id);
        }
        (customer_id, cart_id.unwrap())
    }
}

#[tokio::test]
async fn test_insufficient_stock_keeps_other_lines_untouched() {
    let h = TestHarness::new();
    let a = h.variant(50_000, 5, vec![]).await;
    let b = h.variant(100_000, 5, vec![]).await;
    let (customer_id, cart_id) = h.cart(&[(a, 3), (b, 1)]).await;
    // Stock for B runs out after it was added to the cart.
    h.store
        .put_variant(ProductVariant {
            key: b,
            stock_available: 0,
        })
        .await;

    let err = h
        .checkout
        .checkout(cart_id, customer_id, PaymentMethod::Online)
        .await
        .unwrap_err();

    assert!(matches!(err, CheckoutError::InsufficientStock { variant, requested: 1 } if variant == b));
    assert_eq!(h.store.stock(a).await, Some(5));
    assert_eq!(h.store.stock(b).await, Some(0));
    assert!(h.store.reservations().await.is_empty());
    assert_eq!(h.store.order_count().await, 0);

    // The cart is still open and can be checked out once restocked.
    h.store
        .put_variant(ProductVariant {
            key: b,
            stock_available: 1,
        })
        .await;
    let order = h
        .checkout
        .checkout(cart_id, customer_id, PaymentMethod::Online)
        .await
        .unwrap();
    assert_eq!(order.items.len(), 2);
    assert_eq!(h.store.stock(a).await, Some(2));
}

#[tokio::test]
async fn test_second_checkout_of_same_cart_fails() {
    let h = TestHarness::new();
    let key = h.variant(1000, 10, vec![]).await;
    let (customer_id, cart_id) = h.cart(&[(key, 2)]).await;

    h.checkout
        .checkout(cart_id, customer_id, PaymentMethod::Online)
        .await
        .unwrap();
    let err = h
        .checkout
        .checkout(cart_id, customer_id, PaymentMethod::Online)
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert_eq!(h.store.order_count().await, 1);
    assert_eq!(h.store.stock(key).await, Some(8));
}

#[tokio::test]
async fn test_checkout_of_emptied_cart() {
    let h = TestHarness::new();
    let key = h.variant(1000, 10, vec![]).await;
    let (customer_id, cart_id) = h.cart(&[(key, 2)]).await;
    let item_id = h.carts.active_cart(customer_id).await.unwrap().lines[0].item.id;
    h.carts.set_item_quantity(customer_id, item_id, 0).await.unwrap();

    let err = h
        .checkout
        .checkout(cart_id, customer_id, PaymentMethod::Online)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::EmptyCart);
}

#[tokio::test]
async fn test_checkout_by_another_customer_is_not_found() {
    let h = TestHarness::new();
    let key = h.variant(1000, 10, vec![]).await;
    let (_, cart_id) = h.cart(&[(key, 2)]).await;

    let err = h
        .checkout
        .checkout(cart_id, CustomerId::new(), PaymentMethod::Online)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert_eq!(h.store.stock(key).await, Some(10));
}

#[tokio::test]
async fn test_order_totals_match_line_arithmetic() {
    let h = TestHarness::new();
    let gst18 = h.category(None, Some(18)).await;
    let gst12 = h.category(None, Some(12)).await;
    let a = h.variant(1000, 10, vec![gst18]).await;
    let b = h.variant(333, 10, vec![gst12]).await;
    let (customer_id, cart_id) = h.cart(&[(a, 2), (b, 3)]).await;

    let order = h
        .checkout
        .checkout(cart_id, customer_id, PaymentMethod::CashOnDelivery)
        .await
        .unwrap();

    // A: 2000 + 360 + 4000; B: 999 + round(119.88) = 120 + 4000
    assert_eq!(order.items[0].total_price.minor(), 2000);
    assert_eq!(order.items[0].tax.minor(), 360);
    assert_eq!(order.items[1].total_price.minor(), 999);
    assert_eq!(order.items[1].tax.minor(), 120);
    assert_eq!(order.sub_total.minor(), 2999);
    assert_eq!(order.tax.minor(), 480);
    assert_eq!(order.shipping_charge.minor(), 8000);
    assert_eq!(order.total.minor(), 6360 + 5119);
    assert_eq!(order.payment_method, PaymentMethod::CashOnDelivery);
    assert_eq!(order.order_status, OrderStatus::Pending);
}

#[tokio::test]
async fn test_root_category_slab_applies_to_leaf() {
    let h = TestHarness::new();
    let root = h.category(None, Some(12)).await;
    let leaf = h.category(Some(root), Some(28)).await;
    let key = h.variant(1000, 10, vec![leaf]).await;
    let (customer_id, cart_id) = h.cart(&[(key, 1)]).await;

    let order = h
        .checkout
        .checkout(cart_id, customer_id, PaymentMethod::Online)
        .await
        .unwrap();
    assert_eq!(order.items[0].tax.minor(), 120);
}

#[tokio::test]
async fn test_default_tax_when_nothing_resolves() {
    let h = TestHarness::new();
    let untaxed_root = h.category(None, None).await;
    let uncategorised = h.variant(1000, 10, vec![]).await;
    let untaxed = h.variant(1000, 10, vec![untaxed_root]).await;
    let dangling = h.variant(1000, 10, vec![CategoryId::new()]).await;
    let (customer_id, cart_id) = h
        .cart(&[(uncategorised, 1), (untaxed, 1), (dangling, 1)])
        .await;

    let order = h
        .checkout
        .checkout(cart_id, customer_id, PaymentMethod::Online)
        .await
        .unwrap();
    for item in &order.items {
        assert_eq!(item.tax.minor(), 50);
    }
}

#[tokio::test]
async fn test_storage_failure_rolls_back_reservations() {
    let h = TestHarness::new();
    let a = h.variant(500, 5, vec![]).await;
    let b = h.variant(700, 5, vec![]).await;
    let (customer_id, cart_id) = h.cart(&[(a, 3), (b, 2)]).await;
    h.store.set_fail_on_order_insert(true);

    let err = h
        .checkout
        .checkout(cart_id, customer_id, PaymentMethod::Online)
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::TransactionFailure);
    assert_eq!(h.store.stock(a).await, Some(5));
    assert_eq!(h.store.stock(b).await, Some(5));
    assert!(h.store.reservations().await.is_empty());
    assert!(h.carts.active_cart(customer_id).await.is_ok());
}

#[tokio::test]
async fn test_price_overflow_is_a_validation_failure() {
    let h = TestHarness::new();
    let a = h.variant(i64::MAX / 2, 5, vec![]).await;
    let (customer_id, cart_id) = h.cart(&[(a, 3)]).await;

    let err = h
        .checkout
        .checkout(cart_id, customer_id, PaymentMethod::Online)
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::ValidationFailure);
    assert_eq!(h.store.stock(a).await, Some(5));
    assert!(h.store.reservations().await.is_empty());
    assert_eq!(h.store.order_count().await, 0);
}

#[tokio::test]
async fn test_concurrent_checkouts_do_not_oversell() {
    let h = TestHarness::new();
    let stock = 10;
    let quantity = 3;
    let key = h.variant(1000, stock, vec![]).await;

    let mut carts = Vec::new();
    for _ in 0..20 {
        carts.push(h.cart(&[(key, quantity)]).await);
    }

    let attempts = carts.into_iter().map(|(customer_id, cart_id)| {
        let checkout = h.checkout.clone();
        tokio::spawn(async move {
            checkout
                .checkout(cart_id, customer_id, PaymentMethod::Online)
                .await
        })
    });
    let results = futures_util::future::join_all(attempts).await;

    let successes = results
        .iter()
        .filter(|r| r.as_ref().unwrap().is_ok())
        .count() as u32;
    for result in &results {
        if let Err(err) = result.as_ref().unwrap() {
            assert_eq!(err.kind(), ErrorKind::InsufficientStock);
        }
    }

    assert_eq!(successes, stock / quantity);
    assert_eq!(h.store.stock(key).await, Some(stock - quantity * successes));
    assert_eq!(h.store.order_count().await, successes as usize);
}

#[tokio::test]
async fn test_paid_order() {
    let h = TestHarness::new();
    let key = h.variant(1000, 10, vec![]).await;
    let (customer_id, cart_id) = h.cart(&[(key, 2)]).await;
    let order = h
        .checkout
        .checkout(cart_id, customer_id, PaymentMethod::Online)
        .await
        .unwrap();

    let paid = h
        .orders
        .mark_paid(order.id, Some(PaymentMethod::CashOnDelivery))
        .await
        .unwrap();
    assert!(paid.is_paid);
    assert_eq!(paid.order_status, OrderStatus::Confirmed);

    let loaded = h.orders.get_order(order.id, customer_id).await.unwrap();
    assert_eq!(loaded.payment_method, PaymentMethod::CashOnDelivery);
    assert!(loaded.is_paid);
    assert_eq!(h.store.stock(key).await, Some(8));

    let err = h.orders.mark_failed(order.id).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ValidationFailure);
}

#[tokio::test]
async fn test_failed_payment_releases_stock() {
    let h = TestHarness::new();
    let key = h.variant(1000, 10, vec![]).await;
    let (customer_id, cart_id) = h.cart(&[(key, 4)]).await;
    let order = h
        .checkout
        .checkout(cart_id, customer_id, PaymentMethod::Online)
        .await
        .unwrap();
    assert_eq!(h.store.stock(key).await, Some(6));

    let failed = h.orders.mark_failed(order.id).await.unwrap();
    assert_eq!(failed.order_status, OrderStatus::PaymentFailed);
    assert!(!failed.is_paid);
    assert_eq!(h.store.stock(key).await, Some(10));
    assert!(h.store.reservations().await.iter().all(|r| r.is_released()));

    let err = h.orders.mark_paid(order.id, None).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ValidationFailure);
    assert_eq!(h.store.stock(key).await, Some(10));
}

#[tokio::test]
async fn test_orders_are_private_to_their_customer() {
    let h = TestHarness::new();
    let key = h.variant(1000, 10, vec![]).await;
    let (customer_id, cart_id) = h.cart(&[(key, 1)]).await;
    let order = h
        .checkout
        .checkout(cart_id, customer_id, PaymentMethod::Online)
        .await
        .unwrap();

    let err = h.orders.get_order(order.id, CustomerId::new()).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert_eq!(h.orders.get_order(order.id, customer_id).await.unwrap(), order);
}

#[tokio::test]
async fn test_sweeper_skips_reservations_attached_to_orders() {
    let h = TestHarness::new();
    let key = h.variant(1000, 10, vec![]).await;
    let (customer_id, cart_id) = h.cart(&[(key, 3)]).await;
    let order = h
        .checkout
        .checkout(cart_id, customer_id, PaymentMethod::Online)
        .await
        .unwrap();
    h.store
        .set_reservation_expiry(order.items[0].reserved_stock_id, Utc::now() - Duration::hours(1))
        .await;

    let swept = h.sweeper().sweep(Utc::now()).await.unwrap();
    assert_eq!(swept, 0);
    assert_eq!(h.store.stock(key).await, Some(7));
    assert_eq!(h.store.reservations().await.len(), 1);
}

#[tokio::test]
async fn test_new_cart_after_checkout() {
    let h = TestHarness::new();
    let key = h.variant(1000, 10, vec![]).await;
    let (customer_id, cart_id) = h.cart(&[(key, 1)]).await;
    h.checkout
        .checkout(cart_id, customer_id, PaymentMethod::Online)
        .await
        .unwrap();

    assert_eq!(h.carts.active_cart(customer_id).await.unwrap_err().kind(), ErrorKind::NotFound);
    let snapshot = h.carts.add_item(customer_id, key, 1).await.unwrap();
    assert_ne!(snapshot.cart.id, cart_id);
}
