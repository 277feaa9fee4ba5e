use axum::http::StatusCode;
use axum_test::TestServer;
use chrono::{TimeZone, Utc};
use serde_json::{json, Value};
use std::sync::Arc;
use uuid::Uuid;
use wayline_api::{app, AppState, AuthConfig};
use wayline_assistant::{default_rules, ResponseEngine};
use wayline_core::{TravelOption, TravelType};
use wayline_store::{BookingRepository, CatalogRepository, DbClient, UserRepository};

struct TestApp {
    server: TestServer,
    catalog: CatalogRepository,
}

async fn spawn() -> TestApp {
    let db = DbClient::new_in_memory().await.expect("Failed to open database");
    db.migrate().await.expect("Failed to run migrations");

    let catalog = CatalogRepository::new(db.pool.clone());
    let state = AppState {
        catalog: catalog.clone(),
        bookings: BookingRepository::new(db.pool.clone()),
        users: UserRepository::new(db.pool.clone()),
        assistant: Arc::new(ResponseEngine::with_default_rules()),
        auth: AuthConfig {
            secret: "test-secret".to_string(),
            expiration: 3600,
        },
        home_page_size: 6,
    };

    TestApp {
        server: TestServer::new(app(state)).expect("Failed to start test server"),
        catalog,
    }
}

async fn seed_option(
    catalog: &CatalogRepository,
    travel_type: TravelType,
    source: &str,
    destination: &str,
    day: u32,
    seats: i32,
) -> TravelOption {
    let option = TravelOption::new(
        travel_type,
        source,
        destination,
        Utc.with_ymd_and_hms(2025, 10, day, 8, 0, 0).unwrap(),
        Utc.with_ymd_and_hms(2025, 10, day, 10, 30, 0).unwrap(),
        15_000,
        seats,
    );
    catalog.insert(&option).await.expect("Failed to seed option");
    option
}

async fn register_and_login(server: &TestServer, username: &str) -> String {
    let response = server
        .post("/register/")
        .json(&json!({
            "username": username,
            "email": format!("{username}@example.com"),
            "password": "wanderlust",
        }))
        .await;
    response.assert_status(StatusCode::CREATED);

    let response = server
        .post("/login/")
        .json(&json!({ "username": username, "password": "wanderlust" }))
        .await;
    response.assert_status_ok();

    let body: Value = response.json();
    body["token"].as_str().expect("Missing token").to_string()
}

async fn available_seats(server: &TestServer) -> Value {
    let response = server.get("/travel/").await;
    response.assert_status_ok();
    let options: Value = response.json();
    options[0]["available_seats"].clone()
}

#[tokio::test]
async fn test_booking_lifecycle_over_http() {
    let app = spawn().await;
    let option = seed_option(&app.catalog, TravelType::Flight, "Rome", "Athens", 5, 8).await;
    let token = register_and_login(&app.server, "nils").await;

    // Create a booking for 3 seats
    let response = app
        .server
        .post(&format!("/booking/{}/", option.id))
        .authorization_bearer(&token)
        .json(&json!({ "number_of_seats": 3 }))
        .await;
    response.assert_status(StatusCode::CREATED);
    let body: Value = response.json();
    assert_eq!(body["booking"]["status"], "CONFIRMED");
    assert_eq!(body["booking"]["unit_price_cents"], 15_000);
    assert_eq!(body["booking"]["total_price_cents"], 45_000);
    assert_eq!(body["message"], "Booking confirmed successfully!");
    let booking_id = body["booking"]["id"].as_str().unwrap().to_string();

    assert_eq!(available_seats(&app.server).await, 5);

    // Detail view carries the travel duration
    let response = app
        .server
        .get(&format!("/bookings/{}/", booking_id))
        .authorization_bearer(&token)
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["duration_hours"], 2);
    assert_eq!(body["duration_minutes"], 30);
    assert_eq!(body["travel_option"]["destination"], "Athens");

    // Cancelling restores the seats
    let response = app
        .server
        .post(&format!("/bookings/{}/cancel/", booking_id))
        .authorization_bearer(&token)
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["already_cancelled"], false);
    assert_eq!(body["status"], "CANCELLED");
    assert_eq!(available_seats(&app.server).await, 8);

    // A second cancel is a distinct no-op
    let response = app
        .server
        .post(&format!("/bookings/{}/cancel/", booking_id))
        .authorization_bearer(&token)
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["already_cancelled"], true);
    assert_eq!(available_seats(&app.server).await, 8);
}

#[tokio::test]
async fn test_booking_error_cases() {
    let app = spawn().await;
    let option = seed_option(&app.catalog, TravelType::Train, "Rome", "Milan", 5, 2).await;
    let token = register_and_login(&app.server, "iris").await;

    // Requesting more seats than remain is a conflict
    let response = app
        .server
        .post(&format!("/booking/{}/", option.id))
        .authorization_bearer(&token)
        .json(&json!({ "number_of_seats": 3 }))
        .await;
    response.assert_status(StatusCode::CONFLICT);
    let body: Value = response.json();
    assert!(body["error"]
        .as_str()
        .unwrap()
        .contains("Insufficient seats"));
    assert_eq!(available_seats(&app.server).await, 2);

    // A zero seat count never reaches the ledger
    let response = app
        .server
        .post(&format!("/booking/{}/", option.id))
        .authorization_bearer(&token)
        .json(&json!({ "number_of_seats": 0 }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);

    // Unknown option
    let response = app
        .server
        .post(&format!("/booking/{}/", Uuid::new_v4()))
        .authorization_bearer(&token)
        .json(&json!({ "number_of_seats": 1 }))
        .await;
    response.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_booking_routes_require_token_and_ownership() {
    let app = spawn().await;
    let option = seed_option(&app.catalog, TravelType::Bus, "Porto", "Lisbon", 6, 4).await;

    let response = app.server.get("/bookings/").await;
    response.assert_status(StatusCode::UNAUTHORIZED);

    let response = app
        .server
        .post(&format!("/booking/{}/", option.id))
        .json(&json!({ "number_of_seats": 1 }))
        .await;
    response.assert_status(StatusCode::UNAUTHORIZED);

    // Another user's booking is indistinguishable from a missing one
    let owner = register_and_login(&app.server, "ada").await;
    let other = register_and_login(&app.server, "ben").await;

    let response = app
        .server
        .post(&format!("/booking/{}/", option.id))
        .authorization_bearer(&owner)
        .json(&json!({ "number_of_seats": 1 }))
        .await;
    response.assert_status(StatusCode::CREATED);
    let body: Value = response.json();
    let booking_id = body["booking"]["id"].as_str().unwrap().to_string();

    let response = app
        .server
        .get(&format!("/bookings/{}/", booking_id))
        .authorization_bearer(&other)
        .await;
    response.assert_status(StatusCode::NOT_FOUND);

    let response = app
        .server
        .post(&format!("/bookings/{}/cancel/", booking_id))
        .authorization_bearer(&other)
        .await;
    response.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_catalog_search_and_home_limit() {
    let app = spawn().await;
    for day in 1..=7 {
        seed_option(
            &app.catalog,
            TravelType::Bus,
            "Madrid",
            "Valencia",
            day,
            40,
        )
        .await;
    }
    seed_option(&app.catalog, TravelType::Flight, "Madrid", "Paris", 8, 40).await;

    // Home shows only the six soonest departures
    let response = app.server.get("/").await;
    response.assert_status_ok();
    let home: Value = response.json();
    assert_eq!(home.as_array().unwrap().len(), 6);

    // The full listing has everything, soonest first
    let response = app.server.get("/travel/").await;
    let all: Value = response.json();
    assert_eq!(all.as_array().unwrap().len(), 8);

    // Criteria combine with AND semantics; substrings are case-insensitive
    let response = app
        .server
        .get("/travel/")
        .add_query_param("travel_type", "FLIGHT")
        .add_query_param("destination", "par")
        .await;
    response.assert_status_ok();
    let filtered: Value = response.json();
    assert_eq!(filtered.as_array().unwrap().len(), 1);
    assert_eq!(filtered[0]["destination"], "Paris");

    // Empty parameters are ignored rather than applied
    let response = app
        .server
        .get("/travel/")
        .add_query_param("travel_type", "")
        .add_query_param("source", "")
        .await;
    response.assert_status_ok();
    let unfiltered: Value = response.json();
    assert_eq!(unfiltered.as_array().unwrap().len(), 8);

    // An unknown travel type is a validation error
    let response = app
        .server
        .get("/travel/")
        .add_query_param("travel_type", "BOAT")
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_register_and_login_errors() {
    let app = spawn().await;
    register_and_login(&app.server, "selma").await;

    // Duplicate username
    let response = app
        .server
        .post("/register/")
        .json(&json!({
            "username": "selma",
            "email": "other@example.com",
            "password": "different",
        }))
        .await;
    response.assert_status(StatusCode::CONFLICT);

    // Wrong password
    let response = app
        .server
        .post("/login/")
        .json(&json!({ "username": "selma", "password": "wrong" }))
        .await;
    response.assert_status(StatusCode::UNAUTHORIZED);

    // Blank username
    let response = app
        .server
        .post("/register/")
        .json(&json!({ "username": "  ", "email": "x@example.com", "password": "pw" }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_profile_stats_and_update() {
    let app = spawn().await;
    let option = seed_option(&app.catalog, TravelType::Train, "Ghent", "Bruges", 9, 20).await;
    let token = register_and_login(&app.server, "vera").await;

    for seats in [2, 1] {
        let response = app
            .server
            .post(&format!("/booking/{}/", option.id))
            .authorization_bearer(&token)
            .json(&json!({ "number_of_seats": seats }))
            .await;
        response.assert_status(StatusCode::CREATED);
    }

    let response = app
        .server
        .get("/bookings/")
        .authorization_bearer(&token)
        .await;
    response.assert_status_ok();
    let bookings: Value = response.json();
    let first_id = bookings[1]["id"].as_str().unwrap().to_string();

    app.server
        .post(&format!("/bookings/{}/cancel/", first_id))
        .authorization_bearer(&token)
        .await
        .assert_status_ok();

    let response = app
        .server
        .get("/profile/")
        .authorization_bearer(&token)
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["user"]["username"], "vera");
    assert_eq!(body["stats"]["total"], 2);
    assert_eq!(body["stats"]["confirmed"], 1);
    assert_eq!(body["stats"]["cancelled"], 1);

    let response = app
        .server
        .post("/profile/")
        .authorization_bearer(&token)
        .json(&json!({ "username": "vera-k", "email": "vera@wayline.test" }))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["user"]["username"], "vera-k");
    assert_eq!(body["message"], "Your profile has been updated!");

    // Taking another user's name is a conflict
    register_and_login(&app.server, "karl").await;
    let response = app
        .server
        .post("/profile/")
        .authorization_bearer(&token)
        .json(&json!({ "username": "karl", "email": "vera@wayline.test" }))
        .await;
    response.assert_status(StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_assistant_endpoints() {
    let app = spawn().await;

    let response = app.server.get("/ai-assistant/").await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["name"], "Wayline Assistant");

    // Keyword match picks one of the declared replies
    let response = app
        .server
        .post("/ai-response/")
        .json(&json!({ "message": "hello" }))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    let hello_replies = default_rules()
        .into_iter()
        .find(|r| r.name == "hello")
        .unwrap()
        .replies;
    assert!(hello_replies.contains(&body["response"].as_str().unwrap().to_string()));

    // Override precedence
    let response = app
        .server
        .post("/ai-response/")
        .json(&json!({ "message": "hi, when do flights depart" }))
        .await;
    let body: Value = response.json();
    assert_eq!(
        body["response"],
        "Departure times vary by route. Use the search filters on the Travel Options page to find specific schedules."
    );

    // Unrecognized input falls back to the default reply
    let response = app
        .server
        .post("/ai-response/")
        .json(&json!({ "message": "xyzzy" }))
        .await;
    let body: Value = response.json();
    assert_eq!(
        body["response"],
        "I'm here to help with your travel booking needs. How can I assist you today?"
    );

    // Malformed body is a structured client error
    let response = app
        .server
        .post("/ai-response/")
        .bytes("{not json".into())
        .content_type("application/json")
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["error"], "Invalid JSON");
}
