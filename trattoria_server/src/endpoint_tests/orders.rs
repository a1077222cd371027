use actix_web::{http::StatusCode, test::TestRequest, web, web::ServiceConfig};
use payu_tools::{PayuOrderDetails, PayuOrderResponse, PayuOrderSummary, PayuStatus};
use serde_json::{json, Value};
use tog_common::Money;
use trattoria_engine::{
    db_types::{MenuCategory, NewMenuItem, NewOrder, OrderId},
    order_objects::LineItemRequest,
    test_utils::prepare_env::fresh_database,
    traits::{CatalogManagement, OrderManagement},
    GatewaySettings,
    OrderFlowApi,
    PaymentGatewayApi,
    SqliteDatabase,
};

use super::{
    helpers::{issue_token, send_request, with_token},
    mocks::{accepting_payu, idle_payu, MockPayu},
};
use crate::{
    auth::Role,
    config::ServerOptions,
    routes::{
        DeleteOrderRoute,
        ListOrdersRoute,
        OrderByIdRoute,
        PlaceOrderRoute,
        RetryPaymentRoute,
        UpdateOrderRoute,
    },
};

const JAN: &str = "jan@example.com";
const EWA: &str = "ewa@example.com";
const CHEF: &str = "chef@trattoria.test";

#[actix_web::test]
async fn place_order() {
    let db = fresh_database().await;
    let margherita = seed_menu(&db).await;
    let mut payu = MockPayu::new();
    payu.expect_obtain_access_token().times(1).returning(|| Ok("token-123".to_string()));
    payu.expect_submit_order()
        .times(1)
        .withf(|token, order| {
            token == "token-123" &&
                order.total_amount == "2198" &&
                order.currency_code == "PLN" &&
                order.continue_url ==
                    format!("https://trattoria.test/payment-redirect/{}?email={JAN}", order.ext_order_id) &&
                order.customer_ip.as_deref() == Some("203.0.113.7")
        })
        .returning(|_, order| {
            Ok(PayuOrderResponse {
                status: PayuStatus { status_code: "SUCCESS".into(), status_desc: None },
                redirect_uri: Some(format!("https://payu.test/pay/{}", order.ext_order_id)),
                order_id: Some(format!("PAYU-{}", order.ext_order_id)),
            })
        });
    let req = TestRequest::post()
        .uri("/orders")
        .peer_addr("203.0.113.7:5000".parse().unwrap())
        .set_json(order_body(json!([{"menu_item": margherita, "quantity": 2}])));
    let (status, body) = send_request(req, configure(db.clone(), payu)).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    let body: Value = serde_json::from_str(&body).unwrap();
    let payu_id = body["orderId"].as_str().unwrap();
    let order_id = OrderId::from(payu_id.trim_start_matches("PAYU-"));
    assert_eq!(body["redirectUri"].as_str().unwrap(), format!("https://payu.test/pay/{order_id}"));

    let order = db.fetch_order(&order_id).await.unwrap().expect("Order was not stored");
    assert_eq!(order.total_amount, Some(Money::from_cents(2198)));
    assert_eq!(order.payment_order_id.as_deref(), Some(payu_id));
}

#[actix_web::test]
async fn place_order_with_empty_items() {
    let db = fresh_database().await;
    let req = TestRequest::post().uri("/orders").set_json(order_body(json!([])));
    let (status, body) = send_request(req, configure(db.clone(), idle_payu())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.starts_with(r#"{"error":"Invalid items"#), "{body}");
    assert!(db.fetch_orders(Default::default()).await.unwrap().is_empty());
}

#[actix_web::test]
async fn place_order_with_malformed_body() {
    let db = fresh_database().await;
    let req = TestRequest::post()
        .uri("/orders")
        .insert_header(("Content-Type", "application/json"))
        .set_payload(r#"{"customer_name": "Jan""#);
    let (status, body) = send_request(req, configure(db, idle_payu())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.starts_with(r#"{"error":"Could not read request body"#), "{body}");
}

#[actix_web::test]
async fn declined_payment_keeps_the_order() {
    let db = fresh_database().await;
    let margherita = seed_menu(&db).await;
    let mut payu = MockPayu::new();
    payu.expect_obtain_access_token().returning(|| Ok("token-123".to_string()));
    payu.expect_submit_order().times(1).returning(|_, _| {
        Ok(PayuOrderResponse {
            status: PayuStatus { status_code: "ERROR_VALUE_INVALID".into(), status_desc: Some("Invalid buyer".into()) },
            ..Default::default()
        })
    });
    let req = TestRequest::post().uri("/orders").set_json(order_body(json!([{"menu_item": margherita}])));
    let (status, body) = send_request(req, configure(db.clone(), payu)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, r#"{"error":"PayU error: Invalid buyer"}"#);
    let orders = db.fetch_orders(Default::default()).await.unwrap();
    assert_eq!(orders.len(), 1);
    assert!(orders[0].payment_order_id.is_none());
}

#[actix_web::test]
async fn gateway_credentials_failure_is_not_leaked() {
    let db = fresh_database().await;
    let margherita = seed_menu(&db).await;
    let mut payu = MockPayu::new();
    payu.expect_obtain_access_token().returning(|| {
        Err(payu_tools::PayuApiError::AuthenticationFailed { status: 401, message: "invalid_client".into() })
    });
    payu.expect_submit_order().never();
    let req = TestRequest::post().uri("/orders").set_json(order_body(json!([{"menu_item": margherita}])));
    let (status, body) = send_request(req, configure(db, payu)).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, r#"{"error":"An unexpected error occurred"}"#);
}

#[actix_web::test]
async fn listing_requires_a_token() {
    let db = fresh_database().await;
    let (status, body) = send_request(TestRequest::get().uri("/orders"), configure(db, idle_payu())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, r#"{"error":"Both the order id and email are required"}"#);
}

#[actix_web::test]
async fn customers_list_their_own_orders() {
    let db = fresh_database().await;
    let margherita = seed_menu(&db).await;
    let mine = seed_order(&db, margherita, JAN).await;
    seed_order(&db, margherita, EWA).await;

    let token = issue_token(JAN, &[Role::Customer]);
    let req = with_token(TestRequest::get().uri("/orders?email=ewa@example.com"), &token);
    let (status, body) = send_request(req, configure(db.clone(), idle_payu())).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    let orders: Vec<Value> = serde_json::from_str(&body).unwrap();
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0]["order_id"], mine.as_str());
    assert_eq!(orders[0]["items"].as_array().unwrap().len(), 1);

    let req = with_token(TestRequest::get().uri("/orders"), &issue_token(CHEF, &[Role::Staff]));
    let (status, body) = send_request(req, configure(db, idle_payu())).await;
    assert_eq!(status, StatusCode::OK);
    let orders: Vec<Value> = serde_json::from_str(&body).unwrap();
    assert_eq!(orders.len(), 2);
}

#[actix_web::test]
async fn invalid_token_is_rejected() {
    let db = fresh_database().await;
    let mut token = issue_token(JAN, &[Role::Customer]);
    token.replace_range(token.len() - 6..token.len() - 1, "AAAAA");
    let req = with_token(TestRequest::get().uri("/orders"), &token);
    let (status, body) = send_request(req, configure(db, idle_payu())).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, r#"{"error":"Access token signature is invalid."}"#);
}

#[actix_web::test]
async fn anonymous_lookup_needs_the_right_email() {
    let db = fresh_database().await;
    let margherita = seed_menu(&db).await;
    let order_id = seed_order(&db, margherita, JAN).await;

    let uri = format!("/orders/{order_id}?email={JAN}");
    let (status, body) = send_request(TestRequest::get().uri(&uri), configure(db.clone(), idle_payu())).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    let order: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(order["total_amount"], "10.99");
    assert_eq!(order["status"], "pending");

    let uri = format!("/orders/{order_id}?email={EWA}");
    let (status, body) = send_request(TestRequest::get().uri(&uri), configure(db.clone(), idle_payu())).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, r#"{"error":"Order not found"}"#);

    let uri = format!("/orders/{order_id}");
    let (status, _) = send_request(TestRequest::get().uri(&uri), configure(db, idle_payu())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn check_payment_status() {
    let db = fresh_database().await;
    let margherita = seed_menu(&db).await;
    let order_id = seed_order(&db, margherita, JAN).await;
    db.set_payment_reference(&order_id, "PAYU-REMOTE-1").await.unwrap();

    let mut payu = MockPayu::new();
    payu.expect_obtain_access_token().times(1).returning(|| Ok("token-123".to_string()));
    payu.expect_query_order().times(1).withf(|_, id| id == "PAYU-REMOTE-1").returning(|_, id| {
        Ok(PayuOrderDetails {
            orders: vec![PayuOrderSummary { order_id: id.to_string(), ext_order_id: None, status: "COMPLETED".into() }],
        })
    });
    let uri = format!("/orders/{order_id}?email={JAN}&check_payment=true");
    let (status, body) = send_request(TestRequest::get().uri(&uri), configure(db.clone(), payu)).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    let result: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(result, json!({"status": "pending", "payuStatus": "confirmed", "orderNumber": order_id.as_str()}));

    // The recorded status is returned without asking the provider again
    let (status, body) = send_request(TestRequest::get().uri(&uri), configure(db, idle_payu())).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains(r#""payuStatus":"confirmed""#));
}

#[actix_web::test]
async fn customers_may_only_change_the_address() {
    let db = fresh_database().await;
    let margherita = seed_menu(&db).await;
    let order_id = seed_order(&db, margherita, JAN).await;
    let uri = format!("/orders/{order_id}?email={JAN}");

    let req = TestRequest::put().uri(&uri).set_json(json!({"status": "delivered"}));
    let (status, body) = send_request(req, configure(db.clone(), idle_payu())).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body, r#"{"error":"Customers may only change the delivery address"}"#);

    let req = TestRequest::put().uri(&uri).set_json(json!({"delivery_address": "ul. Krótka 2, Gdańsk"}));
    let (status, body) = send_request(req, configure(db.clone(), idle_payu())).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    let order: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(order["delivery_address"], "ul. Krótka 2, Gdańsk");

    let req = TestRequest::put()
        .uri(&format!("/orders/{order_id}"))
        .set_json(json!({"delivery_address": "ul. Długa 7, Gdańsk", "email": JAN}));
    let (status, body) = send_request(req, configure(db.clone(), idle_payu())).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    let order: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(order["delivery_address"], "ul. Długa 7, Gdańsk");

    let req = with_token(
        TestRequest::put().uri(&format!("/orders/{order_id}")).set_json(json!({"status": "confirmed"})),
        &issue_token(CHEF, &[Role::Staff]),
    );
    let (status, body) = send_request(req, configure(db, idle_payu())).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert!(body.contains(r#""status":"confirmed""#));
}

#[actix_web::test]
async fn anonymous_delete_needs_an_email() {
    let db = fresh_database().await;
    let margherita = seed_menu(&db).await;
    let order_id = seed_order(&db, margherita, JAN).await;

    let req = TestRequest::delete().uri(&format!("/orders/{order_id}"));
    let (status, _) = send_request(req, configure(db.clone(), idle_payu())).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let req = TestRequest::delete().uri(&format!("/orders/{order_id}")).set_json(json!({"email": "eve@example.com"}));
    let (status, _) = send_request(req, configure(db.clone(), idle_payu())).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let req = TestRequest::delete().uri(&format!("/orders/{order_id}")).set_json(json!({"email": JAN}));
    let (status, body) = send_request(req, configure(db.clone(), idle_payu())).await;
    assert_eq!(status, StatusCode::NO_CONTENT, "{body}");
    assert!(db.fetch_order(&order_id).await.unwrap().is_none());

    let order_id = seed_order(&db, margherita, JAN).await;

    let token = issue_token(CHEF, &[Role::Staff]);
    let req = with_token(TestRequest::delete().uri(&format!("/orders/{order_id}")), &token);
    let (status, body) = send_request(req, configure(db.clone(), idle_payu())).await;
    assert_eq!(status, StatusCode::NO_CONTENT, "{body}");
    assert!(db.fetch_order(&order_id).await.unwrap().is_none());
}

#[actix_web::test]
async fn retry_payment() {
    let db = fresh_database().await;
    let margherita = seed_menu(&db).await;
    let order_id = seed_order(&db, margherita, JAN).await;
    let uri = format!("/orders/{order_id}/payment");

    let req = TestRequest::post().uri(&uri).set_json(json!({"email": JAN}));
    let (status, body) = send_request(req, configure(db.clone(), accepting_payu())).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    let body: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(body["orderId"], format!("PAYU-{order_id}"));

    // The order has a payment now, so a second attempt is refused without calling the provider
    let req = TestRequest::post().uri(&format!("{uri}?email={JAN}"));
    let (status, body) = send_request(req, configure(db, idle_payu())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, format!(r#"{{"error":"Order {order_id} already has a payment"}}"#));
}

fn settings() -> GatewaySettings {
    GatewaySettings {
        merchant_pos_id: "300746".into(),
        front_base_url: "https://trattoria.test".into(),
        default_currency: "PLN".into(),
        language: "pl".into(),
    }
}

fn configure(db: SqliteDatabase, payu: MockPayu) -> impl FnOnce(&mut ServiceConfig) {
    move |cfg| {
        let orders_api = OrderFlowApi::new(db, PaymentGatewayApi::new(payu, settings()));
        cfg.service(PlaceOrderRoute::<SqliteDatabase, MockPayu>::new())
            .service(ListOrdersRoute::<SqliteDatabase, MockPayu>::new())
            .service(OrderByIdRoute::<SqliteDatabase, MockPayu>::new())
            .service(UpdateOrderRoute::<SqliteDatabase, MockPayu>::new())
            .service(DeleteOrderRoute::<SqliteDatabase, MockPayu>::new())
            .service(RetryPaymentRoute::<SqliteDatabase, MockPayu>::new())
            .app_data(web::Data::new(orders_api))
            .app_data(web::Data::new(ServerOptions::default()));
    }
}

fn order_body(items: Value) -> Value {
    json!({
        "customer_name": "Jan Kowalski",
        "customer_email": JAN,
        "customer_phone": "+48 600 100 200",
        "delivery_address": "ul. Długa 1, Gdańsk",
        "items": items,
    })
}

async fn seed_menu(db: &SqliteDatabase) -> i64 {
    let item = NewMenuItem::new("Margherita", MenuCategory::Pizza, Money::from_cents(1099));
    db.insert_menu_item(item).await.expect("Could not create menu item").id
}

async fn seed_order(db: &SqliteDatabase, menu_item: i64, email: &str) -> OrderId {
    let order = NewOrder::new("Jan Kowalski".into(), email.into(), "+48 600 100 200".into(), "ul. Długa 1".into());
    let items = [LineItemRequest::new(menu_item, 1)];
    db.insert_order_with_items(order, &items).await.expect("Could not create order").order_id
}
