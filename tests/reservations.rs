//! End-to-end reservation flow tests
//!
//! Drives the real axum router against a tempdir-scoped embedded database,
//! with a fixed clock and a recording notifier injected through ServerState.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use chrono::{NaiveDate, NaiveDateTime};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

use booking_server::auth::JwtConfig;
use booking_server::db::DbService;
use booking_server::db::models::{Customer, CustomerCreate, CustomerRole};
use booking_server::db::repository::CustomerRepository;
use booking_server::services::Notifier;
use booking_server::{
    Config, FixedClock, JwtService, Reservation, ServerState, build_router,
};

// ========== Test doubles ==========

/// Notifier double - counts sends, success is configurable
#[derive(Debug, Default)]
struct RecordingNotifier {
    confirmations: AtomicUsize,
    cancellations: AtomicUsize,
    fail: bool,
}

impl RecordingNotifier {
    fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send_confirmation(&self, _reservation: &Reservation, _customer: &Customer) -> bool {
        self.confirmations.fetch_add(1, Ordering::SeqCst);
        !self.fail
    }

    async fn send_cancellation(&self, _reservation: &Reservation, _customer: &Customer) -> bool {
        self.cancellations.fetch_add(1, Ordering::SeqCst);
        !self.fail
    }
}

// ========== Harness ==========

struct TestApp {
    app: Router,
    state: ServerState,
    notifier: Arc<RecordingNotifier>,
    _work_dir: tempfile::TempDir,
}

fn naive(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
        .unwrap()
        .and_hms_opt(h, min, 0)
        .unwrap()
}

async fn spawn_app(now_local: NaiveDateTime, notifier: RecordingNotifier) -> TestApp {
    let work_dir = tempfile::tempdir().expect("tempdir");

    let config = Config {
        work_dir: work_dir.path().to_string_lossy().into_owned(),
        http_port: 0,
        jwt: JwtConfig {
            secret: "integration-test-secret-0123456789abcdef".to_string(),
            expiration_minutes: 60,
            issuer: "booking-server".to_string(),
            audience: "booking-clients".to_string(),
        },
        environment: "test".to_string(),
        restaurant_name: "Test Bistro".to_string(),
        mail_api_url: None,
        mail_from: "noreply@test.local".to_string(),
    };

    let db = DbService::new(&work_dir.path().join("booking.db"))
        .await
        .expect("open database")
        .db;

    let notifier = Arc::new(notifier);
    let state = ServerState::new(
        config.clone(),
        db,
        Arc::new(JwtService::new(config.jwt.clone())),
        Arc::new(FixedClock::at_local(now_local)),
        notifier.clone(),
    );

    TestApp {
        app: build_router(state.clone()),
        state,
        notifier,
        _work_dir: work_dir,
    }
}

/// Default clock: 2098-12-01 12:00 local - all 2099 bookings are in the future
async fn default_app() -> TestApp {
    spawn_app(naive(2098, 12, 1, 12, 0), RecordingNotifier::default()).await
}

async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let resp = app.clone().oneshot(req).await.expect("request failed");
    let status = resp.status();
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, body)
}

async fn get(app: &Router, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    send(app, builder.body(Body::empty()).unwrap()).await
}

async fn post_json(
    app: &Router,
    uri: &str,
    token: Option<&str>,
    body: &Value,
) -> (StatusCode, Value) {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    send(
        app,
        builder.body(Body::from(body.to_string())).unwrap(),
    )
    .await
}

/// Register a customer through the API and log in, returning (token, customer_id)
async fn register_and_login(app: &Router, email: &str) -> (String, String) {
    let (status, body) = post_json(
        app,
        "/api/auth/register",
        None,
        &json!({
            "first_name": "Ana",
            "last_name": "Silva",
            "contact": "+351910000000",
            "email": email,
            "password": "s3cret-password",
            "password2": "s3cret-password",
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "register failed: {body}");
    let customer_id = body["customer_id"].as_str().unwrap().to_string();

    let (status, body) = post_json(
        app,
        "/api/auth/login",
        None,
        &json!({"email": email, "password": "s3cret-password"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "login failed: {body}");
    let token = body["token"].as_str().unwrap().to_string();

    (token, customer_id)
}

fn booking_body(datetime: &str, people: i64, table: i64, customer_id: &str) -> Value {
    json!({
        "ReservationDateTime": datetime,
        "NumPeople": people,
        "TableNumber": table,
        "CustomerID": customer_id,
    })
}

// ========== Health & auth ==========

#[tokio::test]
async fn health_endpoint_reports_ok() {
    let t = default_app().await;
    let (status, body) = get(&t.app, "/api/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn register_rejects_duplicate_email_and_bad_passwords() {
    let t = default_app().await;
    let (token, _) = register_and_login(&t.app, "dup@example.com").await;
    assert!(!token.is_empty());

    // Same email again
    let (status, _) = post_json(
        &t.app,
        "/api/auth/register",
        None,
        &json!({
            "first_name": "Ana", "last_name": "Silva", "contact": "+351",
            "email": "dup@example.com",
            "password": "s3cret-password", "password2": "s3cret-password",
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    // Mismatched passwords
    let (status, _) = post_json(
        &t.app,
        "/api/auth/register",
        None,
        &json!({
            "first_name": "Ana", "last_name": "Silva", "contact": "+351",
            "email": "other@example.com",
            "password": "s3cret-password", "password2": "different",
        }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn login_rejects_wrong_password_with_unified_message() {
    let t = default_app().await;
    register_and_login(&t.app, "ana@example.com").await;

    let (status, body) = post_json(
        &t.app,
        "/api/auth/login",
        None,
        &json!({"email": "ana@example.com", "password": "wrong"}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid email or password");

    // Unknown email gets the same message
    let (status, body) = post_json(
        &t.app,
        "/api/auth/login",
        None,
        &json!({"email": "nobody@example.com", "password": "wrong"}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid email or password");
}

#[tokio::test]
async fn protected_endpoints_require_token() {
    let t = default_app().await;

    let (status, _) = get(&t.app, "/api/reservations/my", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = get(&t.app, "/api/reservations/my", Some("garbage")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

// ========== Time slots ==========

#[tokio::test]
async fn time_slots_future_date_returns_full_day() {
    let t = default_app().await;
    let (status, body) = get(&t.app, "/api/reservations/time-slots?date=2099-01-01", None).await;

    assert_eq!(status, StatusCode::OK);
    let slots = body["time_slots"].as_array().unwrap();
    assert_eq!(slots.len(), 24);
    assert_eq!(slots.first().unwrap(), "11:00");
    assert_eq!(slots.last().unwrap(), "22:30");
    assert_eq!(body["restaurant_hours"]["open"], "11:00");
    assert_eq!(body["restaurant_hours"]["close"], "23:00");
}

#[tokio::test]
async fn time_slots_same_day_filters_by_lead_time() {
    // Clock fixed at 18:10 local - everything before 18:40 is gone
    let t = spawn_app(naive(2099, 6, 15, 18, 10), RecordingNotifier::default()).await;
    let (status, body) = get(&t.app, "/api/reservations/time-slots?date=2099-06-15", None).await;

    assert_eq!(status, StatusCode::OK);
    let slots = body["time_slots"].as_array().unwrap();
    assert_eq!(slots.first().unwrap(), "19:00");
    assert_eq!(slots.last().unwrap(), "22:30");
}

#[tokio::test]
async fn time_slots_rejects_past_and_missing_date() {
    let t = spawn_app(naive(2099, 6, 15, 12, 0), RecordingNotifier::default()).await;

    let (status, _) = get(&t.app, "/api/reservations/time-slots?date=2099-06-14", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = get(&t.app, "/api/reservations/time-slots", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = get(&t.app, "/api/reservations/time-slots?date=nonsense", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

// ========== Available tables ==========

#[tokio::test]
async fn available_tables_all_free_on_empty_store() {
    let t = default_app().await;
    let (status, body) = get(
        &t.app,
        "/api/reservations/available-tables?date=2099-01-01&time=18:00",
        None,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let available: Vec<i64> = body["available_tables"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_i64().unwrap())
        .collect();
    assert_eq!(available, (1..=20).collect::<Vec<i64>>());
    assert_eq!(body["occupied_tables"].as_array().unwrap().len(), 0);
    assert_eq!(body["total_tables"], 20);
    assert_eq!(body["available_count"], 20);
}

#[tokio::test]
async fn available_tables_requires_both_params() {
    let t = default_app().await;

    let (status, _) = get(&t.app, "/api/reservations/available-tables?date=2099-01-01", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = get(&t.app, "/api/reservations/available-tables?time=18:00", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = get(
        &t.app,
        "/api/reservations/available-tables?date=2099-01-01&time=25:99",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn booked_table_shows_as_occupied_within_window() {
    let t = default_app().await;
    let (token, customer_id) = register_and_login(&t.app, "ana@example.com").await;

    let (status, _) = post_json(
        &t.app,
        "/api/reservations/create",
        Some(&token),
        &booking_body("2099-01-01T18:00", 4, 5, &customer_id),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    // 19:30 is inside the ±2h window around 18:00
    let (_, body) = get(
        &t.app,
        "/api/reservations/available-tables?date=2099-01-01&time=19:30",
        None,
    )
    .await;
    let occupied: Vec<i64> = body["occupied_tables"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_i64().unwrap())
        .collect();
    assert_eq!(occupied, vec![5]);
    assert_eq!(body["available_count"], 19);

    // 21:00 is outside the window
    let (_, body) = get(
        &t.app,
        "/api/reservations/available-tables?date=2099-01-01&time=21:00",
        None,
    )
    .await;
    assert_eq!(body["occupied_tables"].as_array().unwrap().len(), 0);
}

// ========== Booking ==========

#[tokio::test]
async fn booking_conflicts_inside_window_succeeds_outside() {
    let t = default_app().await;
    let (token, customer_id) = register_and_login(&t.app, "ana@example.com").await;

    // 18:00 - free table, booking succeeds
    let (status, body) = post_json(
        &t.app,
        "/api/reservations/create",
        Some(&token),
        &booking_body("2099-01-01T18:00", 4, 5, &customer_id),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "first booking failed: {body}");
    assert_eq!(body["reservation"]["status"], "Confirmed");
    assert_eq!(body["reservation"]["confirmed"], true);
    assert_eq!(body["email_sent"], true);

    // 19:30 - 1.5h later, inside the ±2h window: conflict
    let (status, body) = post_json(
        &t.app,
        "/api/reservations/create",
        Some(&token),
        &booking_body("2099-01-01T19:30", 2, 5, &customer_id),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT, "expected conflict: {body}");

    // 21:00 - 3h later, outside the window: succeeds
    let (status, _) = post_json(
        &t.app,
        "/api/reservations/create",
        Some(&token),
        &booking_body("2099-01-01T21:00", 2, 5, &customer_id),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    // Different table inside the first window is also fine
    let (status, _) = post_json(
        &t.app,
        "/api/reservations/create",
        Some(&token),
        &booking_body("2099-01-01T18:30", 2, 6, &customer_id),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    assert_eq!(t.notifier.confirmations.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn booking_validates_bounds_and_fields_in_order() {
    let t = default_app().await;
    let (token, customer_id) = register_and_login(&t.app, "ana@example.com").await;

    // Missing fields
    let (status, body) = post_json(
        &t.app,
        "/api/reservations/create",
        Some(&token),
        &json!({"NumPeople": 4, "TableNumber": 5}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "All fields are required");

    // Party size bounds
    for people in [0, 21] {
        let (status, _) = post_json(
            &t.app,
            "/api/reservations/create",
            Some(&token),
            &booking_body("2099-01-01T18:00", people, 5, &customer_id),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "NumPeople={people}");
    }

    // Table bounds
    for table in [0, 21] {
        let (status, _) = post_json(
            &t.app,
            "/api/reservations/create",
            Some(&token),
            &booking_body("2099-01-01T18:00", 4, table, &customer_id),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "TableNumber={table}");
    }

    // Unparseable datetime
    let (status, _) = post_json(
        &t.app,
        "/api/reservations/create",
        Some(&token),
        &booking_body("next friday", 4, 5, &customer_id),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Past instant (clock is fixed at 2098-12-01)
    let (status, _) = post_json(
        &t.app,
        "/api/reservations/create",
        Some(&token),
        &booking_body("2098-11-30T18:00", 4, 5, &customer_id),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Numbers as strings are accepted
    let (status, _) = post_json(
        &t.app,
        "/api/reservations/create",
        Some(&token),
        &json!({
            "ReservationDateTime": "2099-01-01T18:00",
            "NumPeople": "4",
            "TableNumber": "5",
            "CustomerID": customer_id,
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn booking_enforces_customer_identity() {
    let t = default_app().await;
    let (ana_token, ana_id) = register_and_login(&t.app, "ana@example.com").await;
    let (_bob_token, bob_id) = register_and_login(&t.app, "bob@example.com").await;

    // Ana cannot book on Bob's customer record
    let (status, _) = post_json(
        &t.app,
        "/api/reservations/create",
        Some(&ana_token),
        &booking_body("2099-01-01T18:00", 4, 5, &bob_id),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Unknown customer id
    let (status, _) = post_json(
        &t.app,
        "/api/reservations/create",
        Some(&ana_token),
        &booking_body("2099-01-01T18:00", 4, 5, "customer:doesnotexist"),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Booking for herself still works
    let (status, _) = post_json(
        &t.app,
        "/api/reservations/create",
        Some(&ana_token),
        &booking_body("2099-01-01T18:00", 4, 5, &ana_id),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn booking_survives_notification_failure() {
    let t = spawn_app(naive(2098, 12, 1, 12, 0), RecordingNotifier::failing()).await;
    let (token, customer_id) = register_and_login(&t.app, "ana@example.com").await;

    let (status, body) = post_json(
        &t.app,
        "/api/reservations/create",
        Some(&token),
        &booking_body("2099-01-01T18:00", 4, 5, &customer_id),
    )
    .await;

    // Reservation stands even though the notification failed
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["email_sent"], false);
    assert_eq!(t.notifier.confirmations.load(Ordering::SeqCst), 1);

    let (_, body) = get(&t.app, "/api/reservations/my", Some(&token)).await;
    assert_eq!(body["count"], 1);
}

// ========== My reservations ==========

#[tokio::test]
async fn my_reservations_sorted_newest_first() {
    let t = default_app().await;
    let (token, customer_id) = register_and_login(&t.app, "ana@example.com").await;

    for (datetime, table) in [
        ("2099-01-01T18:00", 5),
        ("2099-01-03T12:00", 7),
        ("2099-01-02T20:00", 9),
    ] {
        let (status, _) = post_json(
            &t.app,
            "/api/reservations/create",
            Some(&token),
            &booking_body(datetime, 2, table, &customer_id),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, body) = get(&t.app, "/api/reservations/my", Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 3);

    let tables: Vec<i64> = body["reservations"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["table_number"].as_i64().unwrap())
        .collect();
    // Most recent scheduled time first: Jan 3 (t7), Jan 2 (t9), Jan 1 (t5)
    assert_eq!(tables, vec![7, 9, 5]);
}

#[tokio::test]
async fn my_reservations_unknown_customer_is_not_found() {
    let t = default_app().await;

    // Valid token whose email has no customer record behind it
    let token = t
        .state
        .jwt_service
        .generate_token("customer:ghost", "ghost@example.com", "Ghost", "customer")
        .unwrap();

    let (status, _) = get(&t.app, "/api/reservations/my", Some(&token)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// ========== Cancellation ==========

#[tokio::test]
async fn cancellation_is_one_way_and_frees_the_table() {
    let t = default_app().await;
    let (token, customer_id) = register_and_login(&t.app, "ana@example.com").await;

    let (_, body) = post_json(
        &t.app,
        "/api/reservations/create",
        Some(&token),
        &booking_body("2099-01-01T18:00", 4, 5, &customer_id),
    )
    .await;
    let reservation_id = body["reservation"]["id"].as_str().unwrap().to_string();

    // Cancel succeeds
    let uri = format!("/api/reservations/{reservation_id}/cancel");
    let (status, body) = post_json(&t.app, &uri, Some(&token), &json!({})).await;
    assert_eq!(status, StatusCode::OK, "cancel failed: {body}");
    assert_eq!(body["reservation"]["status"], "Cancelled");
    assert_eq!(body["reservation"]["confirmed"], false);
    assert_eq!(body["email_sent"], true);
    assert_eq!(t.notifier.cancellations.load(Ordering::SeqCst), 1);

    // Second cancel is an error, not a silent success
    let (status, _) = post_json(&t.app, &uri, Some(&token), &json!({})).await;
    assert_eq!(status, StatusCode::CONFLICT);

    // The table is bookable again inside the formerly blocked window
    let (status, _) = post_json(
        &t.app,
        "/api/reservations/create",
        Some(&token),
        &booking_body("2099-01-01T19:00", 2, 5, &customer_id),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn cancellation_enforces_ownership() {
    let t = default_app().await;
    let (ana_token, ana_id) = register_and_login(&t.app, "ana@example.com").await;
    let (bob_token, _) = register_and_login(&t.app, "bob@example.com").await;

    let (_, body) = post_json(
        &t.app,
        "/api/reservations/create",
        Some(&ana_token),
        &booking_body("2099-01-01T18:00", 4, 5, &ana_id),
    )
    .await;
    let reservation_id = body["reservation"]["id"].as_str().unwrap().to_string();
    let uri = format!("/api/reservations/{reservation_id}/cancel");

    // Bob cannot cancel Ana's reservation
    let (status, _) = post_json(&t.app, &uri, Some(&bob_token), &json!({})).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Unknown reservation id
    let (status, _) = post_json(
        &t.app,
        "/api/reservations/reservation:missing/cancel",
        Some(&ana_token),
        &json!({}),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// ========== Staff listing ==========

#[tokio::test]
async fn staff_can_list_all_reservations_customers_cannot() {
    let t = default_app().await;
    let (ana_token, ana_id) = register_and_login(&t.app, "ana@example.com").await;

    post_json(
        &t.app,
        "/api/reservations/create",
        Some(&ana_token),
        &booking_body("2099-01-01T18:00", 4, 5, &ana_id),
    )
    .await;

    // Seed a staff account directly (registration only creates customers)
    let repo = CustomerRepository::new(t.state.db.clone());
    repo.create(
        CustomerCreate {
            first_name: "Sam".into(),
            last_name: "Staff".into(),
            contact: "+351".into(),
            email: "staff@example.com".into(),
            hash_pass: Customer::hash_password("s3cret-password").unwrap(),
            role: CustomerRole::Staff,
        },
        0,
    )
    .await
    .unwrap();

    let (status, body) = post_json(
        &t.app,
        "/api/auth/login",
        None,
        &json!({"email": "staff@example.com", "password": "s3cret-password"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let staff_token = body["token"].as_str().unwrap().to_string();

    let (status, body) = get(&t.app, "/api/reservations", Some(&staff_token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 1);

    let (status, _) = get(&t.app, "/api/reservations", Some(&ana_token)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}
