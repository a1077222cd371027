use actix_web::{http::StatusCode, test::TestRequest, web, web::ServiceConfig};
use serde_json::{json, Value};
use tog_common::Money;
use trattoria_engine::{
    db_types::{MenuCategory, NewMenuItem},
    test_utils::prepare_env::fresh_database,
    traits::CatalogManagement,
    CatalogApi,
    SqliteDatabase,
};

use super::helpers::{issue_token, send_request, with_token};
use crate::{
    auth::Role,
    routes::{CreateMenuItemRoute, DeleteMenuItemRoute, MenuItemRoute, MenuRoute, UpdateMenuItemRoute},
};

#[actix_web::test]
async fn anyone_can_browse_the_menu() {
    let db = fresh_database().await;
    seed(&db).await;
    let (status, body) = send_request(TestRequest::get().uri("/menu"), configure(db.clone())).await;
    assert_eq!(status, StatusCode::OK);
    let items: Vec<Value> = serde_json::from_str(&body).unwrap();
    assert_eq!(items.len(), 2);

    let (status, body) = send_request(TestRequest::get().uri("/menu?category=dessert"), configure(db.clone())).await;
    assert_eq!(status, StatusCode::OK);
    let items: Vec<Value> = serde_json::from_str(&body).unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["name"], "Tiramisu");
    assert_eq!(items[0]["price"], "7.50");

    let (status, body) = send_request(TestRequest::get().uri("/menu?category=sushi"), configure(db)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.starts_with(r#"{"error":"#), "{body}");
}

#[actix_web::test]
async fn fetch_menu_item() {
    let db = fresh_database().await;
    let (margherita, _) = seed(&db).await;
    let (status, body) = send_request(TestRequest::get().uri(&format!("/menu/{margherita}")), configure(db.clone())).await;
    assert_eq!(status, StatusCode::OK);
    let item: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(item["category"], "pizza");
    assert_eq!(item["is_available"], true);

    let (status, _) = send_request(TestRequest::get().uri("/menu/9999"), configure(db)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn changing_the_menu_requires_a_token() {
    let db = fresh_database().await;
    let req = TestRequest::post().uri("/menu").set_json(new_item());
    let (status, body) = send_request(req, configure(db)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, r#"{"error":"Authentication is required."}"#);
}

#[actix_web::test]
async fn customers_cannot_change_the_menu() {
    let db = fresh_database().await;
    let (margherita, _) = seed(&db).await;
    let token = issue_token("jan@example.com", &[Role::Customer]);

    let req = with_token(TestRequest::post().uri("/menu").set_json(new_item()), &token);
    let (status, body) = send_request(req, configure(db.clone())).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body, r#"{"error":"Insufficient permissions."}"#);

    let req = with_token(TestRequest::delete().uri(&format!("/menu/{margherita}")), &token);
    let (status, _) = send_request(req, configure(db.clone())).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(db.fetch_menu_item(margherita).await.unwrap().is_some());
}

#[actix_web::test]
async fn staff_maintain_the_menu() {
    let db = fresh_database().await;
    let token = issue_token("chef@trattoria.test", &[Role::Staff]);

    let req = with_token(TestRequest::post().uri("/menu").set_json(new_item()), &token);
    let (status, body) = send_request(req, configure(db.clone())).await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    let item: Value = serde_json::from_str(&body).unwrap();
    let id = item["id"].as_i64().unwrap();
    assert_eq!(item["price"], "32.00");

    let update = json!({"price": "29.50", "is_available": false});
    let req = with_token(TestRequest::put().uri(&format!("/menu/{id}")).set_json(update), &token);
    let (status, body) = send_request(req, configure(db.clone())).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    let item = db.fetch_menu_item(id).await.unwrap().unwrap();
    assert_eq!(item.price, Money::from_cents(2950));
    assert!(!item.is_available);

    let req = with_token(TestRequest::put().uri(&format!("/menu/{id}")).set_json(json!({"price": -1})), &token);
    let (status, _) = send_request(req, configure(db.clone())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let req = with_token(TestRequest::delete().uri(&format!("/menu/{id}")), &token);
    let (status, _) = send_request(req, configure(db.clone())).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert!(db.fetch_menu_item(id).await.unwrap().is_none());

    let req = with_token(TestRequest::delete().uri(&format!("/menu/{id}")), &token);
    let (status, _) = send_request(req, configure(db)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

fn new_item() -> Value {
    json!({"name": "Quattro Formaggi", "category": "pizza", "price": 32, "description": "Four cheeses"})
}

async fn seed(db: &SqliteDatabase) -> (i64, i64) {
    let margherita = NewMenuItem::new("Margherita", MenuCategory::Pizza, Money::from_cents(1099));
    let tiramisu = NewMenuItem::new("Tiramisu", MenuCategory::Dessert, Money::from_cents(750));
    let margherita = db.insert_menu_item(margherita).await.expect("Could not create menu item");
    let tiramisu = db.insert_menu_item(tiramisu).await.expect("Could not create menu item");
    (margherita.id, tiramisu.id)
}

fn configure(db: SqliteDatabase) -> impl FnOnce(&mut ServiceConfig) {
    move |cfg| {
        cfg.service(MenuRoute::<SqliteDatabase>::new())
            .service(MenuItemRoute::<SqliteDatabase>::new())
            .service(CreateMenuItemRoute::<SqliteDatabase>::new())
            .service(UpdateMenuItemRoute::<SqliteDatabase>::new())
            .service(DeleteMenuItemRoute::<SqliteDatabase>::new())
            .app_data(web::Data::new(CatalogApi::new(db)));
    }
}
