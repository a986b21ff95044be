//! Router tests against an in-memory database

use super::*;
use airport_common::config::DatabaseConfig;
use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use serde_json::{json, Value};
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use tower::ServiceExt;

static MEDIA_DIRS: AtomicUsize = AtomicUsize::new(0);

const BOUNDARY: &str = "airport-test-boundary";

struct TestApp {
    router: Router,
    jwt: Arc<JwtManager>,
    media_root: PathBuf,
}

async fn test_app() -> TestApp {
    let media_root = std::env::temp_dir().join(format!(
        "airport-gateway-{}-{}",
        std::process::id(),
        MEDIA_DIRS.fetch_add(1, Ordering::SeqCst)
    ));

    let mut config = AppConfig::default();
    config.database = DatabaseConfig::single("sqlite::memory:");
    config.rate_limit.enabled = false;
    config.media.root = media_root.to_string_lossy().into_owned();
    config.media.max_upload_bytes = 64 * 1024;

    let db = DbPool::new(&config.database).await.unwrap();
    let jwt = Arc::new(JwtManager::new("test-secret", 3600));
    let state = AppState {
        images: Arc::new(LocalImageStore::new(&config.media)),
        config: Arc::new(config),
        db,
        jwt: jwt.clone(),
    };

    TestApp {
        router: create_router(state).unwrap(),
        jwt,
        media_root,
    }
}

impl TestApp {
    fn token(&self, user_id: i32, is_staff: bool) -> String {
        self.jwt.generate_token(user_id, is_staff).unwrap()
    }

    fn staff(&self) -> String {
        self.token(1, true)
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, body)
    }

    async fn call(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string())),
            None => builder.body(Body::empty()),
        };
        self.send(request.unwrap()).await
    }

    async fn get(&self, uri: &str, token: &str) -> (StatusCode, Value) {
        self.call(Method::GET, uri, Some(token), None).await
    }

    async fn post(&self, uri: &str, token: &str, body: Value) -> (StatusCode, Value) {
        self.call(Method::POST, uri, Some(token), Some(body)).await
    }

    /// POST as staff and return the new id
    async fn create(&self, uri: &str, body: Value) -> i64 {
        let (status, body) = self.post(uri, &self.staff(), body).await;
        assert_eq!(status, StatusCode::CREATED, "{}: {}", uri, body);
        body["id"].as_i64().unwrap()
    }

    async fn upload(&self, airplane_id: i64, token: &str, field: &str, bytes: &[u8]) -> (StatusCode, Value) {
        let mut body = Vec::new();
        body.extend_from_slice(
            format!(
                "--{b}\r\nContent-Disposition: form-data; name=\"{f}\"; filename=\"plane.png\"\r\nContent-Type: application/octet-stream\r\n\r\n",
                b = BOUNDARY,
                f = field
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());

        let request = Request::builder()
            .method(Method::POST)
            .uri(format!("/api/airport/airplanes/{}/upload-image", airplane_id))
            .header(header::AUTHORIZATION, format!("Bearer {}", token))
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", BOUNDARY),
            )
            .body(Body::from(body))
            .unwrap();
        self.send(request).await
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.media_root);
    }
}

/// Ids of a flight on a 10x6 airplane departing 2024-09-25
struct Seeded {
    airplane: i64,
    flight: i64,
    route: i64,
}

async fn seed(app: &TestApp) -> Seeded {
    let country = app
        .create("/api/airport/countries", json!({ "name": "Ukraine" }))
        .await;
    let source = app
        .create(
            "/api/airport/airports",
            json!({ "name": "Boryspil", "closest_big_city": "Kyiv", "country": country }),
        )
        .await;
    let destination = app
        .create(
            "/api/airport/airports",
            json!({ "name": "Lviv", "closest_big_city": "Lviv", "country": country }),
        )
        .await;
    let route = app
        .create(
            "/api/airport/routes",
            json!({ "source": source, "destination": destination, "distance": 470 }),
        )
        .await;
    let airplane_type = app
        .create("/api/airport/airplane-types", json!({ "name": "Boeing 737" }))
        .await;
    let airplane = app
        .create(
            "/api/airport/airplanes",
            json!({ "name": "UR-PSA", "rows": 10, "seats_in_row": 6, "airplane_type": airplane_type }),
        )
        .await;
    let pilot = app
        .create(
            "/api/airport/crew-members",
            json!({ "first_name": "Olena", "last_name": "Kovalenko" }),
        )
        .await;
    let flight = app
        .create(
            "/api/airport/flights",
            json!({
                "route": route,
                "airplane": airplane,
                "crew": [pilot],
                "departure_time": "2024-09-25T10:00:00Z",
                "arrival_time": "2024-09-25T11:30:00Z",
            }),
        )
        .await;

    Seeded { airplane, flight, route }
}

fn png() -> Vec<u8> {
    let mut bytes = std::io::Cursor::new(Vec::new());
    image::RgbImage::new(4, 4)
        .write_to(&mut bytes, image::ImageFormat::Png)
        .unwrap();
    bytes.into_inner()
}

#[tokio::test]
async fn test_health_and_ready() {
    let app = test_app().await;

    let (status, body) = app.call(Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");

    let (status, body) = app.call(Method::GET, "/ready", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["checks"]["database"]["status"], "up");
}

#[tokio::test]
async fn test_authentication_is_required() {
    let app = test_app().await;

    let (status, body) = app
        .call(Method::GET, "/api/airport/countries", None, None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], "UNAUTHORIZED");

    let (status, _) = app.get("/api/airport/countries", "not-a-token").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_reference_data_is_staff_writable() {
    let app = test_app().await;
    let user = app.token(2, false);

    let (status, body) = app
        .post("/api/airport/countries", &user, json!({ "name": "Poland" }))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"]["code"], "FORBIDDEN");

    let id = app
        .create("/api/airport/countries", json!({ "name": "Poland" }))
        .await;
    app.create("/api/airport/countries", json!({ "name": "Portugal" }))
        .await;

    let (status, body) = app.get("/api/airport/countries?name=pol", &user).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([{ "id": id, "name": "Poland" }]));

    let (status, body) = app
        .call(
            Method::PATCH,
            &format!("/api/airport/countries/{}", id),
            Some(&app.staff()),
            Some(json!({ "name": "Polska" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Polska");

    let (status, body) = app
        .call(
            Method::DELETE,
            &format!("/api/airport/countries/{}", id),
            Some(&app.staff()),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(body, Value::Null);

    let (status, body) = app
        .get(&format!("/api/airport/countries/{}", id), &user)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_bad_payloads_are_bad_requests() {
    let app = test_app().await;
    let staff = app.staff();

    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/airport/countries")
        .header(header::AUTHORIZATION, format!("Bearer {}", staff))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{\"name\":"))
        .unwrap();
    let (status, body) = app.send(request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "INVALID_FORMAT");

    let airplane_type = app
        .create("/api/airport/airplane-types", json!({ "name": "Embraer" }))
        .await;
    let (status, body) = app
        .post(
            "/api/airport/airplanes",
            &staff,
            json!({ "name": "UR-EMA", "rows": 0, "seats_in_row": 4, "airplane_type": airplane_type }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    assert!(body["error"]["details"]["rows"].is_array());

    let (status, body) = app
        .post(
            "/api/airport/airplanes",
            &staff,
            json!({ "name": "UR-EMB", "rows": 4, "seats_in_row": 4, "airplane_type": 999 }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "INVALID_REFERENCE");
}

#[tokio::test]
async fn test_view_shapes_differ_by_action() {
    let app = test_app().await;
    let seeded = seed(&app).await;
    let user = app.token(2, false);

    let (_, list) = app.get("/api/airport/routes", &user).await;
    assert_eq!(list[0]["source"], "Boryspil");
    assert_eq!(list[0]["destination"], "Lviv");

    let (_, detail) = app
        .get(&format!("/api/airport/routes/{}", seeded.route), &user)
        .await;
    assert_eq!(detail["source"]["closest_big_city"], "Kyiv");

    let (_, list) = app.get("/api/airport/flights", &user).await;
    assert_eq!(list[0]["airplane"], "UR-PSA");
    assert_eq!(list[0]["crew"], json!(["Olena Kovalenko"]));

    let (_, list) = app.get("/api/airport/airplanes", &user).await;
    assert_eq!(list[0]["airplane_type"], "Boeing 737");
    assert_eq!(list[0]["capacity"], 60);
}

#[tokio::test]
async fn test_large_airplane_capacity() {
    let app = test_app().await;
    let airplane_type = app
        .create("/api/airport/airplane-types", json!({ "name": "Hypothetical" }))
        .await;

    let (status, body) = app
        .post(
            "/api/airport/airplanes",
            &app.staff(),
            json!({
                "name": "Huge",
                "rows": 100_000,
                "seats_in_row": 100_000,
                "airplane_type": airplane_type,
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["capacity"], 10_000_000_000_i64);
}

#[tokio::test]
async fn test_seat_coordinates_below_one() {
    let app = test_app().await;
    let seeded = seed(&app).await;
    let user = app.token(2, false);

    let (status, body) = app
        .post(
            "/api/airport/orders",
            &user,
            json!({ "tickets": [{ "row": 0, "seat": 1, "flight": seeded.flight }] }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["error"]["details"]["row"][0],
        "row number must be in available range: (1, rows): (1, 10)"
    );

    let (status, body) = app
        .post(
            "/api/airport/orders",
            &user,
            json!({ "tickets": [{ "row": 1, "seat": -3, "flight": seeded.flight }] }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["error"]["details"]["seat"][0],
        "seat number must be in available range: (1, seats_in_row): (1, 6)"
    );
}

#[tokio::test]
async fn test_flight_time_filters() {
    let app = test_app().await;
    let seeded = seed(&app).await;
    let user = app.token(2, false);

    let (status, body) = app
        .get("/api/airport/flights?departure=2024-09-25T09:00:00Z", &user)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["id"], seeded.flight);

    let (_, body) = app
        .get("/api/airport/flights?departure=2024-09-26", &user)
        .await;
    assert_eq!(body, json!([]));

    let (_, body) = app
        .get("/api/airport/flights?arrival=2024-09-25T12:00:00Z", &user)
        .await;
    assert_eq!(body.as_array().unwrap().len(), 1);

    let (status, body) = app
        .get("/api/airport/flights?departure=yesterday", &user)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"]["details"]["departure"].is_array());
}

#[tokio::test]
async fn test_booking_flow() {
    let app = test_app().await;
    let seeded = seed(&app).await;
    let alice = app.token(10, false);
    let bob = app.token(11, false);

    let (status, order) = app
        .post(
            "/api/airport/orders",
            &alice,
            json!({ "tickets": [
                { "row": 1, "seat": 1, "flight": seeded.flight },
                { "row": 1, "seat": 2, "flight": seeded.flight },
            ]}),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{}", order);
    assert_eq!(order["user"], 10);
    assert_eq!(order["tickets"].as_array().unwrap().len(), 2);

    // Same seat again
    let (status, body) = app
        .post(
            "/api/airport/orders",
            &bob,
            json!({ "tickets": [
                { "row": 5, "seat": 5, "flight": seeded.flight },
                { "row": 1, "seat": 2, "flight": seeded.flight },
            ]}),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], "SEAT_TAKEN");

    // Off the airplane
    let (status, body) = app
        .post(
            "/api/airport/orders",
            &bob,
            json!({ "tickets": [{ "row": 11, "seat": 1, "flight": seeded.flight }] }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["error"]["details"]["row"][0],
        "row number must be in available range: (1, rows): (1, 10)"
    );

    let (status, body) = app
        .post("/api/airport/orders", &bob, json!({ "tickets": [] }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"]["details"]["tickets"].is_array());

    // The failed order left nothing behind
    let (_, flight) = app
        .get(&format!("/api/airport/flights/{}", seeded.flight), &bob)
        .await;
    assert_eq!(
        flight["taken_places"],
        json!([{ "row": 1, "seat": 1 }, { "row": 1, "seat": 2 }])
    );
    assert_eq!(flight["tickets_available"], 58);

    // Bob cannot see or cancel Alice's order
    let order_uri = format!("/api/airport/orders/{}", order["id"]);
    let (status, _) = app.get(&order_uri, &bob).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = app.call(Method::DELETE, &order_uri, Some(&bob), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, detail) = app.get(&order_uri, &alice).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(detail["tickets"][0]["flight"]["id"], seeded.flight);
    assert_eq!(detail["tickets"][0]["flight"]["route"]["distance"], 470);

    let (status, _) = app.call(Method::DELETE, &order_uri, Some(&alice), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, flight) = app
        .get(&format!("/api/airport/flights/{}", seeded.flight), &bob)
        .await;
    assert_eq!(flight["taken_places"], json!([]));
    assert_eq!(flight["tickets_available"], 60);
}

#[tokio::test]
async fn test_order_listing_is_scoped_and_paginated() {
    let app = test_app().await;
    let seeded = seed(&app).await;
    let alice = app.token(10, false);
    let bob = app.token(11, false);

    for seat in 1..=3 {
        let (status, _) = app
            .post(
                "/api/airport/orders",
                &alice,
                json!({ "tickets": [{ "row": 2, "seat": seat, "flight": seeded.flight }] }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
    }
    let (status, _) = app
        .post(
            "/api/airport/orders",
            &bob,
            json!({ "tickets": [{ "row": 3, "seat": 1, "flight": seeded.flight }] }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, page) = app.get("/api/airport/orders?page_size=2", &alice).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["count"], 3);
    assert_eq!(page["results"].as_array().unwrap().len(), 2);
    assert!(page["previous"].is_null());
    assert_eq!(page["next"], 2);

    let (_, last) = app
        .get("/api/airport/orders?page=2&page_size=2", &alice)
        .await;
    assert_eq!(last["results"].as_array().unwrap().len(), 1);
    assert_eq!(last["previous"], 1);
    assert!(last["next"].is_null());
    assert!(page["results"]
        .as_array()
        .unwrap()
        .iter()
        .all(|order| order["user"] == 10));

    // Asking for someone else's orders still yields only your own
    let (_, page) = app.get("/api/airport/orders?user=11", &alice).await;
    assert_eq!(page["count"], 0);

    let (_, page) = app.get("/api/airport/orders", &app.staff()).await;
    assert_eq!(page["count"], 4);

    let (_, page) = app.get("/api/airport/orders?user=11", &app.staff()).await;
    assert_eq!(page["count"], 1);

    let (status, body) = app.get("/api/airport/orders?page=9", &alice).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "INVALID_PAGE");

    let (status, _) = app.get("/api/airport/orders?page=abc", &alice).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_upload_image() {
    let app = test_app().await;
    let seeded = seed(&app).await;
    let staff = app.staff();

    let (status, _) = app
        .upload(seeded.airplane, &app.token(2, false), "image", &png())
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = app
        .upload(seeded.airplane, &staff, "image", b"definitely not a picture")
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "INVALID_IMAGE");

    let (status, body) = app.upload(seeded.airplane, &staff, "file", &png()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "MISSING_FIELD");

    let (status, body) = app.upload(seeded.airplane, &staff, "image", &png()).await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["id"], seeded.airplane);
    let url = body["image"].as_str().unwrap().to_string();
    assert!(url.starts_with("/media/uploads/airplanes/ur-psa-"), "{}", url);
    assert!(url.ends_with(".png"));

    let (_, airplane) = app
        .get(&format!("/api/airport/airplanes/{}", seeded.airplane), &staff)
        .await;
    assert_eq!(airplane["image"], url.as_str());

    let response = app
        .router
        .clone()
        .oneshot(Request::builder().uri(&url).body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let served = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(served.as_ref(), png().as_slice());

    let (status, _) = app.upload(999, &staff, "image", &png()).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_rate_limiter_rejects_when_exhausted() {
    let mut config = AppConfig::default();
    config.database = DatabaseConfig::single("sqlite::memory:");
    config.rate_limit.requests_per_second = 1;
    config.rate_limit.burst = 1;

    let state = AppState {
        images: Arc::new(LocalImageStore::new(&config.media)),
        db: DbPool::new(&config.database).await.unwrap(),
        jwt: Arc::new(JwtManager::new("test-secret", 3600)),
        config: Arc::new(config),
    };
    let router = create_router(state).unwrap();

    let health = || Request::builder().uri("/health").body(Body::empty()).unwrap();
    let first = router.clone().oneshot(health()).await.unwrap();
    assert_eq!(first.status(), StatusCode::OK);
    let second = router.clone().oneshot(health()).await.unwrap();
    assert_eq!(second.status(), StatusCode::TOO_MANY_REQUESTS);
}
