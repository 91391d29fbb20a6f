//! Integration tests for the API server.

use std::sync::{Arc, OnceLock};

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use checkout::CheckoutConfig;
use common::{ColorId, CustomerId, ProductId, SellerId, SizeId};
use domain::{Money, Product, ProductVariant, VariantKey};
use metrics_exporter_prometheus::PrometheusHandle;
use serde_json::{Value, json};
use store::InMemoryStore;
use tower::ServiceExt;

static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

fn get_metrics_handle() -> PrometheusHandle {
    METRICS_HANDLE
        .get_or_init(|| {
            let builder = metrics_exporter_prometheus::PrometheusBuilder::new();
            builder
                .install_recorder()
                .expect("failed to install Prometheus recorder")
        })
        .clone()
}

struct TestApp {
    app: Router,
    store: InMemoryStore,
}

impl TestApp {
    fn new() -> Self {
        let store = InMemoryStore::new();
        let state = Arc::new(api::AppState::new(store.clone(), CheckoutConfig::default()));
        let app = api::create_app(state, get_metrics_handle());
        Self { app, store }
    }

    async fn variant(&self, price: i64, stock: u32) -> VariantKey {
        let product = Product {
            id: ProductId::new(),
            seller_id: SellerId::new(),
            name: "Ikat Cushion Cover".to_string(),
            sku: "IKT-9".to_string(),
            price: Money::from_minor(price),
            discount_percent: 0,
            category_ids: vec![],
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

    async fn send(
        &self,
        method: &str,
        uri: &str,
        customer: Option<CustomerId>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(customer) = customer {
            builder = builder.header("x-customer-id", customer.to_string());
        }
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(serde_json::to_string(&body).unwrap()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, json)
    }

    async fn add_item(&self, customer: CustomerId, key: VariantKey, quantity: u32) -> Value {
        let (status, json) = self
            .send(
                "POST",
                "/cart/items",
                Some(customer),
                Some(json!({
                    "productId": key.product_id,
                    "colorId": key.color_id,
                    "sizeId": key.size_id,
                    "quantity": quantity,
                })),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "{json}");
        json
    }
}

#[tokio::test]
async fn test_health_check() {
    let t = TestApp::new();
    let (status, json) = t.send("GET", "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");
}

#[tokio::test]
async fn test_metrics_endpoint() {
    let t = TestApp::new();
    let response = t
        .app
        .clone()
        .oneshot(Request::builder().uri("/metrics").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(
        response.headers()["content-type"]
            .to_str()
            .unwrap()
            .starts_with("text/plain")
    );
}

#[tokio::test]
async fn test_missing_or_invalid_identity_is_unauthorized() {
    let t = TestApp::new();
    let (status, json) = t.send("GET", "/cart", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json["error"]["kind"], "unauthorized");

    let response = t
        .app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/cart")
                .header("x-customer-id", "not-a-uuid")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let (status, _) = t
        .send("POST", "/checkout", None, Some(json!({ "cartId": CustomerId::new() })))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_cart_checkout_and_payment_flow() {
    let t = TestApp::new();
    let key = t.variant(1000, 5).await;
    let customer = CustomerId::new();

    let json = t.add_item(customer, key, 2).await;
    assert_eq!(json["cart"]["status"], "ACTIVE");
    assert_eq!(json["cart"]["items"][0]["quantity"], 2);
    assert_eq!(json["cart"]["subTotal"], 2000);
    let cart_id = json["cart"]["id"].clone();

    let (status, json) = t.send("GET", "/cart", Some(customer), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["cart"]["id"], cart_id);

    let (status, json) = t
        .send(
            "POST",
            "/checkout",
            Some(customer),
            Some(json!({ "cartId": cart_id })),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{json}");
    let order = &json["order"];
    assert_eq!(order["subTotal"], 2000);
    assert_eq!(order["tax"], 100);
    assert_eq!(order["shippingCharge"], 4000);
    assert_eq!(order["total"], 6100);
    assert_eq!(order["orderStatus"], "Pending");
    assert_eq!(order["isPaid"], false);
    assert_eq!(order["items"][0]["productSKU"], "IKT-9");
    assert_eq!(t.store.stock(key).await, Some(3));

    let order_id = order["id"].as_str().unwrap().to_string();
    let (status, json) = t
        .send("GET", &format!("/orders/{order_id}"), Some(customer), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["order"]["id"], order_id.as_str());

    let (status, json) = t
        .send(
            "POST",
            &format!("/orders/{order_id}/payment"),
            None,
            Some(json!({ "status": "paid", "paymentMethod": "CashOnDelivery" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{json}");
    assert_eq!(json["order"]["isPaid"], true);
    assert_eq!(json["order"]["orderStatus"], "Confirmed");
    assert_eq!(json["order"]["paymentMethod"], "CashOnDelivery");

    let (status, _) = t.send("GET", "/cart", Some(customer), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_insufficient_stock_is_conflict() {
    let t = TestApp::new();
    let plenty = t.variant(500, 5).await;
    let scarce = t.variant(1000, 1).await;
    let customer = CustomerId::new();
    t.add_item(customer, plenty, 3).await;
    let json = t.add_item(customer, scarce, 2).await;
    let cart_id = json["cart"]["id"].clone();

    let (status, json) = t
        .send("POST", "/checkout", Some(customer), Some(json!({ "cartId": cart_id })))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json["error"]["kind"], "insufficient_stock");
    assert!(json["error"]["message"].as_str().unwrap().contains("requested 2"));
    assert_eq!(t.store.stock(plenty).await, Some(5));
    assert_eq!(t.store.stock(scarce).await, Some(1));
}

#[tokio::test]
async fn test_empty_cart_is_unprocessable() {
    let t = TestApp::new();
    let key = t.variant(500, 5).await;
    let customer = CustomerId::new();
    let json = t.add_item(customer, key, 1).await;
    let cart_id = json["cart"]["id"].clone();
    let item_id = json["cart"]["items"][0]["id"].as_str().unwrap().to_string();

    let (status, json) = t
        .send(
            "PUT",
            &format!("/cart/items/{item_id}"),
            Some(customer),
            Some(json!({ "quantity": 0 })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["cart"]["items"].as_array().unwrap().len(), 0);

    let (status, json) = t
        .send("POST", "/checkout", Some(customer), Some(json!({ "cartId": cart_id })))
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(json["error"]["kind"], "empty_cart");
}

#[tokio::test]
async fn test_second_checkout_is_not_found() {
    let t = TestApp::new();
    let key = t.variant(500, 5).await;
    let customer = CustomerId::new();
    let json = t.add_item(customer, key, 1).await;
    let body = json!({ "cartId": json["cart"]["id"] });

    let (status, _) = t.send("POST", "/checkout", Some(customer), Some(body.clone())).await;
    assert_eq!(status, StatusCode::OK);
    let (status, json) = t.send("POST", "/checkout", Some(customer), Some(body)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error"]["kind"], "not_found");
    assert_eq!(t.store.order_count().await, 1);
}

#[tokio::test]
async fn test_malformed_requests_are_validation_failures() {
    let t = TestApp::new();
    let customer = CustomerId::new();

    let (status, json) = t
        .send("POST", "/checkout", Some(customer), Some(json!({ "cartId": "nope" })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"]["kind"], "validation_failure");

    let (status, json) = t
        .send("GET", "/orders/not-a-uuid", Some(customer), None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"]["kind"], "validation_failure");

    let key = t.variant(500, 5).await;
    let (status, json) = t
        .send(
            "POST",
            "/cart/items",
            Some(customer),
            Some(json!({
                "productId": key.product_id,
                "colorId": key.color_id,
                "sizeId": key.size_id,
                "quantity": 0,
            })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"]["kind"], "validation_failure");
}

#[tokio::test]
async fn test_orders_are_private() {
    let t = TestApp::new();
    let key = t.variant(500, 5).await;
    let customer = CustomerId::new();
    let json = t.add_item(customer, key, 1).await;
    let (_, json) = t
        .send(
            "POST",
            "/checkout",
            Some(customer),
            Some(json!({ "cartId": json["cart"]["id"] })),
        )
        .await;
    let order_id = json["order"]["id"].as_str().unwrap().to_string();

    let (status, json) = t
        .send("GET", &format!("/orders/{order_id}"), Some(CustomerId::new()), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error"]["kind"], "not_found");
}

#[tokio::test]
async fn test_failed_payment_releases_stock() {
    let t = TestApp::new();
    let key = t.variant(500, 5).await;
    let customer = CustomerId::new();
    let json = t.add_item(customer, key, 4).await;
    let (_, json) = t
        .send(
            "POST",
            "/checkout",
            Some(customer),
            Some(json!({ "cartId": json["cart"]["id"] })),
        )
        .await;
    let order_id = json["order"]["id"].as_str().unwrap().to_string();
    assert_eq!(t.store.stock(key).await, Some(1));

    let (status, json) = t
        .send(
            "POST",
            &format!("/orders/{order_id}/payment"),
            None,
            Some(json!({ "status": "failed" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["order"]["orderStatus"], "PaymentFailed");
    assert_eq!(t.store.stock(key).await, Some(5));

    let (status, json) = t
        .send(
            "POST",
            &format!("/orders/{order_id}/payment"),
            None,
            Some(json!({ "status": "paid" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"]["kind"], "validation_failure");
}
