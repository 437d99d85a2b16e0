use axum::body::{to_bytes, Body};
use axum::http::{header, Response, StatusCode};
use axum::Router;
use futures::future::join_all;
use futures::StreamExt;
use serde_json::Value;
use slotbook_booking::routes::routes;
use slotbook_booking::AdminCredentials;
use std::time::Duration;
use tower::ServiceExt;

use fixtures::*;

async fn app() -> Router {
    routes(create_test_config()).await.unwrap()
}

async fn body_json(response: Response<Body>) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn reserve(app: &Router, name: &str, slot: &str) -> Response<Body> {
    app.clone()
        .oneshot(json_request("POST", "/bookings", &reservation_body(name, slot)))
        .await
        .unwrap()
}

#[tokio::test]
async fn test_root_and_health() {
    let app = app().await;

    let response = app.clone().oneshot(get_request("/")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app.oneshot(get_request("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["bookings"], 0);
}

#[tokio::test]
async fn test_health_counts_bookings() {
    let app = app().await;
    reserve(&app, "Maria da Silva", "10:00").await;
    reserve(&app, "Joana Souza", "10:04").await;

    let body = body_json(app.oneshot(get_request("/health")).await.unwrap()).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["bookings"], 2);
}

#[tokio::test]
async fn test_campaign_describes_the_day() {
    let app = app().await;
    let body = body_json(app.oneshot(get_request("/campaign")).await.unwrap()).await;

    assert_eq!(body["opens_at"], "10:00");
    assert_eq!(body["closes_at"], "16:00");
    assert_eq!(body["slot_minutes"], 4);
    assert_eq!(body["total_slots"], 91);
}

#[tokio::test]
async fn test_reserve_then_slot_shows_booked() {
    let app = app().await;

    let response = reserve(&app, "Maria da Silva", "10:04").await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["booking"]["slot"], "10:04");
    assert_eq!(body["booking"]["birth_date"], "1990-02-01");

    let slots = body_json(app.clone().oneshot(get_request("/slots")).await.unwrap()).await;
    assert_eq!(slots["total"], 91);
    assert_eq!(slots["available"], 90);
    assert_eq!(slots["slots"][1]["slot"], "10:04");
    assert_eq!(slots["slots"][1]["booked"], true);

    let list = body_json(app.oneshot(get_request("/bookings")).await.unwrap()).await;
    assert_eq!(list.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_second_reservation_gets_409() {
    let app = app().await;
    assert_eq!(
        reserve(&app, "First Person", "11:00").await.status(),
        StatusCode::CREATED
    );

    let response = reserve(&app, "Second Person", "11:00").await;

    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body = body_json(response).await;
    assert_eq!(body["success"], false);
    assert_eq!(
        body["message"],
        "This time slot has already been booked by someone else!"
    );
}

#[tokio::test]
async fn test_concurrent_reservations_have_one_winner() {
    let app = app().await;

    let attempts = (0..10).map(|i| {
        let app = app.clone();
        tokio::spawn(async move { reserve(&app, &format!("Racer {}", i), "12:00").await.status() })
    });
    let statuses: Vec<StatusCode> = join_all(attempts)
        .await
        .into_iter()
        .map(|joined| joined.unwrap())
        .collect();

    assert_eq!(statuses.iter().filter(|s| **s == StatusCode::CREATED).count(), 1);
    assert_eq!(statuses.iter().filter(|s| **s == StatusCode::CONFLICT).count(), 9);

    let list = body_json(app.oneshot(get_request("/bookings")).await.unwrap()).await;
    assert_eq!(list.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_invalid_form_lists_fields() {
    let app = app().await;
    let mut body = reservation_body("Al", "10:00");
    body["phone"] = Value::from("12ab");

    let response = app
        .oneshot(json_request("POST", "/bookings", &body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    let fields: Vec<&str> = body["error"]["fields"]
        .as_array()
        .unwrap()
        .iter()
        .map(|f| f["field"].as_str().unwrap())
        .collect();
    assert_eq!(fields, vec!["name", "phone"]);
}

#[tokio::test]
async fn test_unknown_slot_is_bad_request() {
    let app = app().await;
    let response = reserve(&app, "Maria da Silva", "10:02").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_incomplete_body_uses_error_shape() {
    let app = app().await;
    let request = json_request("POST", "/bookings", &serde_json::json!({ "name": "Maria" }));

    let response = app.clone().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], 400);
    assert!(body["error"]["message"]
        .as_str()
        .unwrap()
        .starts_with("Validation error:"));

    let list = body_json(app.oneshot(get_request("/bookings")).await.unwrap()).await;
    assert!(list.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_non_json_body_uses_error_shape() {
    let app = app().await;
    let request = axum::http::Request::builder()
        .method("POST")
        .uri("/bookings")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("not json"))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"]["code"], 400);
}

#[tokio::test]
async fn test_admin_routes_require_credentials() {
    let app = app().await;

    let response = app
        .clone()
        .oneshot(admin_request("GET", "/admin/export", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(response.headers().contains_key(header::WWW_AUTHENTICATE));

    let wrong = AdminCredentials::new("admin", "nope");
    let response = app
        .oneshot(admin_request("DELETE", "/admin/bookings", Some(wrong)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(response).await;
    assert!(body["error"]["message"]
        .as_str()
        .unwrap()
        .contains("Invalid username or password."));
}

#[tokio::test]
async fn test_export_empty_is_404() {
    let app = app().await;
    let response = app
        .oneshot(admin_request("GET", "/admin/export", Some(admin_credentials())))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = body_json(response).await;
    assert!(body["error"]["message"]
        .as_str()
        .unwrap()
        .contains("There are no bookings to export"));
}

#[tokio::test]
async fn test_export_returns_workbook() {
    let app = app().await;
    reserve(&app, "Maria da Silva", "10:00").await;

    let response = app
        .oneshot(admin_request("GET", "/admin/export", Some(admin_credentials())))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let disposition = response.headers()[header::CONTENT_DISPOSITION]
        .to_str()
        .unwrap()
        .to_string();
    assert!(disposition.starts_with("attachment; filename=\"agendamentos-doacao-sangue-"));
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert!(bytes.starts_with(b"PK"));
}

#[tokio::test]
async fn test_clear_removes_everything() {
    let app = app().await;
    reserve(&app, "Maria da Silva", "10:00").await;
    reserve(&app, "Joana Souza", "10:04").await;

    let response = app
        .clone()
        .oneshot(admin_request("DELETE", "/admin/bookings", Some(admin_credentials())))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["removed"], 2);

    let slots = body_json(app.clone().oneshot(get_request("/slots")).await.unwrap()).await;
    assert_eq!(slots["available"], 91);

    // a cleared slot can be booked again
    assert_eq!(
        reserve(&app, "Maria da Silva", "10:00").await.status(),
        StatusCode::CREATED
    );
}

#[tokio::test]
async fn test_change_feed_streams_inserts() {
    let app = app().await;

    let response = app
        .clone()
        .oneshot(get_request("/bookings/changes"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "text/event-stream"
    );
    let mut frames = response.into_body().into_data_stream();

    reserve(&app, "Maria da Silva", "13:00").await;

    let frame = tokio::time::timeout(Duration::from_secs(5), frames.next())
        .await
        .expect("no change event within 5s")
        .unwrap()
        .unwrap();
    let text = String::from_utf8(frame.to_vec()).unwrap();
    assert!(text.contains("event: booking-change"));
    assert!(text.contains("\"type\":\"inserted\""));
    assert!(text.contains("13:00"));
}
