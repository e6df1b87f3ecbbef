//! Integration tests for the API server.

use std::sync::{Arc, OnceLock};

use axum::body::Body;
use axum::http::{Request, StatusCode};
use fulfillment::CoordinatorConfig;
use metrics_exporter_prometheus::PrometheusHandle;
use store::{InMemoryStore, Product, ProductRepository, Shop, ShopRepository};
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

async fn setup_with_state() -> (
    axum::Router,
    Arc<api::routes::orders::AppState<InMemoryStore>>,
    InMemoryStore,
) {
    let store = InMemoryStore::new();
    store.upsert_shop(Shop::new("shop-a", "Shop A")).await.unwrap();
    store.upsert_shop(Shop::new("shop-b", "Shop B")).await.unwrap();
    store
        .upsert_product(Product::new("A1", "Lamp", 10))
        .await
        .unwrap();
    store
        .upsert_product(Product::new("B1", "Mug", 10))
        .await
        .unwrap();

    let state = api::create_default_state(store.clone(), CoordinatorConfig::default());
    let app = api::create_app(state.clone(), get_metrics_handle());
    (app, state, store)
}

async fn setup() -> axum::Router {
    setup_with_state().await.0
}

fn checkout_body(method: &str) -> serde_json::Value {
    serde_json::json!({
        "cart": [
            {
                "product_id": "A1",
                "name": "Lamp",
                "quantity": 1,
                "discount_price": 100.0,
                "seller": "shop-a",
                "shop_name": "Shop A"
            },
            {
                "product_id": "B1",
                "name": "Mug",
                "quantity": 2,
                "discount_price": 50.0,
                "seller": "shop-b",
                "shop_name": "Shop B"
            }
        ],
        "shipping_address": {
            "full_name": "Ada Lovelace",
            "address_line1": "12 Analytical St",
            "city": "London",
            "country": "UK"
        },
        "user": {
            "id": "user-1",
            "name": "Ada",
            "email": "ada@example.com"
        },
        "payment": { "method": method },
        "totals": { "shipping_price": 30.0, "discount_price": 0.0, "tax": 0.0 }
    })
}

fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_string(&body).unwrap()))
        .unwrap()
}

fn get_request(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

/// Places the two-seller checkout and returns the order IDs.
async fn place_orders(app: &axum::Router, method: &str) -> Vec<String> {
    let response = app
        .clone()
        .oneshot(json_request("POST", "/orders", checkout_body(method)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let json = body_json(response).await;
    json["orders"]
        .as_array()
        .unwrap()
        .iter()
        .map(|o| o["id"].as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn test_health_check() {
    let app = setup().await;

    let response = app.oneshot(get_request("/health")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["status"], "ok");
    assert_eq!(json["service"], "api");
}

#[tokio::test]
async fn test_create_order_splits_cart() {
    let app = setup().await;

    let response = app
        .oneshot(json_request("POST", "/orders", checkout_body("cod")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    let orders = json["orders"].as_array().unwrap();
    assert_eq!(orders.len(), 2);
    assert_eq!(orders[0]["seller"], "shop-a");
    assert_eq!(orders[0]["total_price"], 115.0);
    assert_eq!(orders[0]["status"], "Processing");
    assert_eq!(orders[0]["payment_info"]["kind"], "CashOnDelivery");
    assert_eq!(orders[1]["seller"], "shop-b");
    assert_eq!(json["effects"]["emails_sent"], 1);
    assert_eq!(json["effects"]["wallet_credits"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_prepaid_checkout_reports_credits() {
    let (app, _, store) = setup_with_state().await;

    let response = app
        .oneshot(json_request("POST", "/orders", checkout_body("Credit Card")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    let credits = json["effects"]["wallet_credits"].as_array().unwrap();
    assert_eq!(credits.len(), 2);
    assert_eq!(credits[0]["shop_id"], "shop-a");
    assert!((credits[0]["amount"].as_f64().unwrap() - 103.5).abs() < 1e-9);

    let shop = store
        .find_shop(&common::ShopId::new("shop-b"))
        .await
        .unwrap()
        .unwrap();
    assert!((shop.available_balance - 103.5).abs() < 1e-9);
}

#[tokio::test]
async fn test_create_order_empty_cart_is_bad_request() {
    let app = setup().await;
    let mut body = checkout_body("cod");
    body["cart"] = serde_json::json!([]);

    let response = app
        .oneshot(json_request("POST", "/orders", body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert!(json["error"].as_str().is_some());
}

#[tokio::test]
async fn test_get_order() {
    let app = setup().await;
    let ids = place_orders(&app, "cod").await;

    let response = app
        .oneshot(get_request(&format!("/orders/{}", ids[0])))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["id"], ids[0].as_str());
    assert_eq!(json["order_number"], "wanttar-00001");
    assert_eq!(json["status_history"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_get_order_not_found() {
    let app = setup().await;
    let fake_id = uuid::Uuid::new_v4();

    let response = app
        .oneshot(get_request(&format!("/orders/{fake_id}")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_invalid_order_id() {
    let app = setup().await;

    let response = app
        .oneshot(get_request("/orders/not-a-uuid"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_update_status_with_tracking() {
    let (app, _, store) = setup_with_state().await;
    let ids = place_orders(&app, "cod").await;

    let response = app
        .oneshot(json_request(
            "PUT",
            &format!("/orders/{}/status", ids[1]),
            serde_json::json!({
                "status": "transferred to delivery partner",
                "tracking_number": "TRK-9",
                "courier_partner": "FastShip"
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["order"]["status"], "Transferred to delivery partner");
    assert_eq!(json["order"]["tracking_number"], "TRK-9");
    assert_eq!(json["effects"]["notifications_sent"], 1);

    let mug = store
        .find_product(&common::ProductId::new("B1"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(mug.stock, 8);
    assert_eq!(mug.sold_out, 2);
}

#[tokio::test]
async fn test_update_status_unknown_status_is_bad_request() {
    let app = setup().await;
    let ids = place_orders(&app, "cod").await;

    let response = app
        .oneshot(json_request(
            "PUT",
            &format!("/orders/{}/status", ids[0]),
            serde_json::json!({ "status": "Teleported" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_backward_status_is_conflict() {
    let app = setup().await;
    let ids = place_orders(&app, "cod").await;
    let uri = format!("/orders/{}/status", ids[0]);

    let response = app
        .clone()
        .oneshot(json_request(
            "PUT",
            &uri,
            serde_json::json!({ "status": "On the way" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(json_request(
            "PUT",
            &uri,
            serde_json::json!({ "status": "Shipping" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_cancel_order() {
    let app = setup().await;
    let ids = place_orders(&app, "cod").await;

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            &format!("/orders/{}/cancel", ids[0]),
            serde_json::json!({ "reason": "Customer request" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["order"]["status"], "Cancelled");
    assert_eq!(json["order"]["cancellation_reason"], "Customer request");
    assert_eq!(json["effects"]["emails_sent"], 1);

    // Cancelling twice is a conflict.
    let response = app
        .oneshot(json_request(
            "POST",
            &format!("/orders/{}/cancel", ids[0]),
            serde_json::json!({}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_refund_flow() {
    let (app, state, _) = setup_with_state().await;
    let ids = place_orders(&app, "cod").await;
    let id = &ids[0];

    let response = app
        .clone()
        .oneshot(json_request(
            "PUT",
            &format!("/orders/{id}/status"),
            serde_json::json!({ "status": "Delivered" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["order"]["payment_info"]["status"], "Succeeded");
    let credited = json["effects"]["wallet_credits"][0]["amount"].as_f64().unwrap();
    assert!((credited - 103.5).abs() < 1e-9);

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            &format!("/orders/{id}/refund"),
            serde_json::json!({}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["order"]["status"], "Processing refund");

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(format!("/orders/{id}/refund/confirm"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["order"]["status"], "Refund Success");
    assert_eq!(json["order"]["status_history"].as_array().unwrap().len(), 4);

    let refund_emails = state
        .mailer
        .outbox()
        .into_iter()
        .filter(|e| e.subject.starts_with("Refund"))
        .count();
    assert_eq!(refund_emails, 1);
}

#[tokio::test]
async fn test_refund_before_delivery_is_conflict() {
    let app = setup().await;
    let ids = place_orders(&app, "cod").await;

    let response = app
        .oneshot(json_request(
            "POST",
            &format!("/orders/{}/refund", ids[0]),
            serde_json::json!({}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_list_orders_for_shop_and_user() {
    let app = setup().await;
    place_orders(&app, "cod").await;
    place_orders(&app, "cod").await;

    let response = app
        .clone()
        .oneshot(get_request("/shops/shop-a/orders"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["count"], 2);

    let response = app
        .oneshot(get_request("/users/user-1/orders"))
        .await
        .unwrap();
    let json = body_json(response).await;
    assert_eq!(json["count"], 4);
}

#[tokio::test]
async fn test_notification_failure_still_succeeds() {
    let (app, state, _) = setup_with_state().await;
    state.notifier.set_fail_on_notify(true);

    let response = app
        .oneshot(json_request("POST", "/orders", checkout_body("cod")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["effects"]["notifications_failed"], 4);
    assert_eq!(json["effects"]["warnings"].as_array().unwrap().len(), 4);
}

#[tokio::test]
async fn test_metrics_endpoint() {
    let app = setup().await;
    place_orders(&app, "cod").await;

    let response = app.oneshot(get_request("/metrics")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response
        .headers()
        .get("content-type")
        .unwrap()
        .to_str()
        .unwrap();
    assert!(content_type.contains("text/plain"));
}

#[tokio::test]
async fn test_create_order_with_overflowing_price_is_bad_request() {
    let (app, _, store) = setup_with_state().await;
    let mut body = checkout_body("cod");
    body["cart"][0]["discount_price"] = serde_json::json!(1e308);
    body["cart"][0]["quantity"] = serde_json::json!(10);

    let response = app
        .oneshot(json_request("POST", "/orders", body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(store.order_count().await, 0);
}

#[tokio::test]
async fn test_blank_note_uses_default_history_note() {
    let app = setup().await;
    let ids = place_orders(&app, "cod").await;

    let response = app
        .oneshot(json_request(
            "PUT",
            &format!("/orders/{}/status", ids[0]),
            serde_json::json!({ "status": "Shipping", "note": "  " }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(
        json["order"]["status_history"][1]["note"],
        "Order is being shipped"
    );
}
