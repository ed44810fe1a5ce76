/// End-to-end tests driving the HTTP router
use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use phonebook_api::{
    config::{AuthConfig, LoggingConfig, ServerConfig, ServiceConfig, StorageConfig},
    context::AppContext,
    server,
};
use serde_json::{json, Value};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use tower::util::ServiceExt;

const DEFAULT_PROFILE_IMAGE_URL: &str =
    "https://res.cloudinary.com/demo/image/upload/v1/default-profile.png";

async fn test_app() -> Router {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(SqliteConnectOptions::new().in_memory(true).foreign_keys(true))
        .await
        .expect("in-memory pool");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("migrations");

    let config = ServerConfig {
        service: ServiceConfig {
            hostname: "localhost".to_string(),
            port: 0,
        },
        storage: StorageConfig {
            data_directory: "./data".into(),
            database: ":memory:".into(),
        },
        authentication: AuthConfig {
            jwt_secret: "0123456789abcdef0123456789abcdef".to_string(),
        },
        logging: LoggingConfig {
            level: "info".to_string(),
        },
    };

    server::build_router(AppContext::with_pool(config, pool))
}

async fn send(
    app: &Router,
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
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };

    (status, value)
}

async fn register(app: &Router, email: &str, first: &str, last: &str) -> (String, Value) {
    let (status, body) = send(
        app,
        Method::POST,
        "/api/auth/register",
        None,
        Some(json!({
            "email": email,
            "password": "secret",
            "firstName": first,
            "lastName": last,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    (body["token"].as_str().unwrap().to_string(), body)
}

#[tokio::test]
async fn register_issues_token_and_full_view() {
    let app = test_app().await;

    let (token, body) = register(&app, "marco@example.com", "Marco", "Rossi").await;
    assert!(!token.is_empty());
    assert_eq!(body["email"], "marco@example.com");
    assert_eq!(body["firstName"], "Marco");
    assert_eq!(body["lastName"], "Rossi");
    assert_eq!(body["profileImageUrl"], DEFAULT_PROFILE_IMAGE_URL);

    // Second registration with the same email conflicts
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/auth/register",
        None,
        Some(json!({
            "email": "marco@example.com",
            "password": "other",
            "firstName": "Luca",
            "lastName": "Bianchi",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "Conflict");
}

#[tokio::test]
async fn login_failures_are_indistinguishable() {
    let app = test_app().await;
    register(&app, "marco@example.com", "Marco", "Rossi").await;

    let (wrong_status, wrong_body) = send(
        &app,
        Method::POST,
        "/api/auth/login",
        None,
        Some(json!({ "email": "marco@example.com", "password": "nope" })),
    )
    .await;
    let (unknown_status, unknown_body) = send(
        &app,
        Method::POST,
        "/api/auth/login",
        None,
        Some(json!({ "email": "nobody@example.com", "password": "secret" })),
    )
    .await;

    assert_eq!(wrong_status, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_body, unknown_body);
}

#[tokio::test]
async fn contacts_require_a_valid_token() {
    let app = test_app().await;

    let (status, _) = send(&app, Method::GET, "/api/contacts", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(&app, Method::GET, "/api/contacts", Some("bogus"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn contact_listing_honors_sort_key() {
    let app = test_app().await;
    let (token, _) = register(&app, "marco@example.com", "Marco", "Rossi").await;

    for (first, last, phone) in [
        ("Anna", "Zeta", "555-0001"),
        ("Bruno", "Alpha", "555-0002"),
    ] {
        let (status, _) = send(
            &app,
            Method::POST,
            "/api/contacts",
            Some(&token),
            Some(json!({ "firstName": first, "lastName": last, "phoneNumber": phone })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, by_last) = send(&app, Method::GET, "/api/contacts", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(by_last[0]["lastName"], "Alpha");
    assert_eq!(by_last[1]["lastName"], "Zeta");

    let (status, by_first) = send(
        &app,
        Method::GET,
        "/api/contacts?sortBy=firstname",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(by_first[0]["firstName"], "Anna");
    assert_eq!(by_first[1]["firstName"], "Bruno");

    assert_ne!(by_last, by_first);
}

#[tokio::test]
async fn foreign_contacts_are_not_found() {
    let app = test_app().await;
    let (owner_token, _) = register(&app, "owner@example.com", "Marco", "Rossi").await;
    let (intruder_token, _) = register(&app, "intruder@example.com", "Eva", "Neri").await;

    let (status, created) = send(
        &app,
        Method::POST,
        "/api/contacts",
        Some(&owner_token),
        Some(json!({ "firstName": "Anna", "lastName": "Verdi", "phoneNumber": "555-0001" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = created["id"].as_i64().unwrap();

    let uri = format!("/api/contacts/{}", id);
    let (status, _) = send(&app, Method::GET, &uri, Some(&intruder_token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        &app,
        Method::PUT,
        &uri,
        Some(&intruder_token),
        Some(json!({ "firstName": "X", "lastName": "Y", "phoneNumber": "000" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, Method::DELETE, &uri, Some(&intruder_token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // The owner still sees it
    let (status, body) = send(&app, Method::GET, &uri, Some(&owner_token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["phoneNumber"], "555-0001");
}

#[tokio::test]
async fn contact_update_and_delete_roundtrip() {
    let app = test_app().await;
    let (token, _) = register(&app, "marco@example.com", "Marco", "Rossi").await;

    let (_, created) = send(
        &app,
        Method::POST,
        "/api/contacts",
        Some(&token),
        Some(json!({ "firstName": "Anna", "lastName": "Verdi", "phoneNumber": "555-0001" })),
    )
    .await;
    let uri = format!("/api/contacts/{}", created["id"].as_i64().unwrap());

    let (status, _) = send(
        &app,
        Method::PUT,
        &uri,
        Some(&token),
        Some(json!({ "firstName": "Annabella", "lastName": "Verdi", "phoneNumber": "555-0009" })),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, fetched) = send(&app, Method::GET, &uri, Some(&token), None).await;
    assert_eq!(fetched["firstName"], "Annabella");
    assert_eq!(fetched["phoneNumber"], "555-0009");

    let (status, _) = send(&app, Method::DELETE, &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(&app, Method::GET, &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn profile_update_and_image_reset() {
    let app = test_app().await;
    let (token, _) = register(&app, "marco@example.com", "Marco", "Rossi").await;

    // Password-only update leaves the rest of the profile alone
    let (status, _) = send(
        &app,
        Method::PUT,
        "/api/user/profile",
        Some(&token),
        Some(json!({ "password": "new-secret" })),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, profile) = send(&app, Method::GET, "/api/user/profile", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(profile["firstName"], "Marco");
    assert_eq!(profile["lastName"], "Rossi");
    assert_eq!(profile["profileImageUrl"], DEFAULT_PROFILE_IMAGE_URL);

    // Set a custom image, then reset it back to the documented default
    let (status, _) = send(
        &app,
        Method::PUT,
        "/api/user/profile",
        Some(&token),
        Some(json!({ "profileImageUrl": "https://example.com/me.png" })),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, reset) = send(
        &app,
        Method::POST,
        "/api/user/reset-profile-image",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(reset["profileImageUrl"], DEFAULT_PROFILE_IMAGE_URL);

    let (_, profile) = send(&app, Method::GET, "/api/user/profile", Some(&token), None).await;
    assert_eq!(profile["profileImageUrl"], DEFAULT_PROFILE_IMAGE_URL);
}

#[tokio::test]
async fn account_deletion_cascades_to_contacts() {
    let app = test_app().await;
    let (token, body) = register(&app, "marco@example.com", "Marco", "Rossi").await;
    let user_id = body["userId"].as_i64().unwrap();

    send(
        &app,
        Method::POST,
        "/api/contacts",
        Some(&token),
        Some(json!({ "firstName": "Anna", "lastName": "Verdi", "phoneNumber": "555-0001" })),
    )
    .await;

    let (status, body) = send(&app, Method::DELETE, "/api/user/account", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["message"].is_string());

    // The token still verifies, but the identity it names is gone
    let (status, _) = send(&app, Method::GET, "/api/user/profile", Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, contacts) = send(&app, Method::GET, "/api/contacts", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(contacts.as_array().unwrap().len(), 0);

    // Re-registering the email works again and gets a fresh id
    let (_, reborn) = register(&app, "marco@example.com", "Marco", "Rossi").await;
    assert_ne!(reborn["userId"].as_i64().unwrap(), user_id);
}
