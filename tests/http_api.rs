//! HTTP API Tests
//!
//! End-to-end tests over the router with in-memory stores: routing, the
//! bearer-token gate on every protected endpoint, and the JSON bodies the
//! frontend consumes.

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use booker_api::auth::jwt::{JwtConfig, JwtManager};
use booker_api::auth::user::InMemoryUserStore;
use booker_api::auth::AuthService;
use booker_api::books::store::InMemoryBookStore;
use booker_api::books::BookService;
use booker_api::http_server::{build_router, AppContext};
use serde_json::{json, Value};
use tower::ServiceExt;

// =============================================================================
// Helper Functions
// =============================================================================

fn test_router() -> Router {
    let ctx = AppContext {
        auth: AuthService::new(
            Arc::new(InMemoryUserStore::new()),
            JwtManager::new(JwtConfig {
                secret: "test-secret".to_string(),
                ..JwtConfig::default()
            }),
        ),
        books: BookService::new(Arc::new(InMemoryBookStore::new())),
    };
    build_router(Arc::new(ctx))
}

async fn send(
    router: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {}", token));
    }
    let request = match body {
        Some(payload) => builder
            .header("content-type", "application/json")
            .body(Body::from(payload.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

/// Register `email` and return a valid bearer token for it
async fn signup(router: &Router, email: &str) -> String {
    let (status, _) = send(
        router,
        "POST",
        "/register",
        None,
        Some(json!({"username": "reader", "email": email, "password": "p"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(
        router,
        "POST",
        "/login",
        None,
        Some(json!({"email": email, "password": "p"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    body["access_token"].as_str().unwrap().to_string()
}

// =============================================================================
// Basic Surface
// =============================================================================

/// The liveness probe needs no credentials.
#[tokio::test]
async fn test_health() {
    let router = test_router();
    let (status, body) = send(&router, "GET", "/health", None, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "healthy"}));
}

/// Every protected endpoint rejects a request without a token.
#[tokio::test]
async fn test_protected_endpoints_require_token() {
    let router = test_router();

    for (method, uri) in [
        ("GET", "/books"),
        ("GET", "/profile"),
        ("GET", "/stats"),
        ("GET", "/genres"),
    ] {
        let (status, body) = send(&router, method, uri, None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{} {}", method, uri);
        assert!(body["error"].is_string());
    }
}

// =============================================================================
// End-to-End Flow
// =============================================================================

/// register -> wrong-password login 401 -> add -> get -> delete -> get 403
#[tokio::test]
async fn test_full_journal_flow() {
    let router = test_router();

    let (status, _) = send(
        &router,
        "POST",
        "/register",
        None,
        Some(json!({"username": "a", "email": "a@x.com", "password": "p"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // Wrong password is a 401
    let (status, _) = send(
        &router,
        "POST",
        "/login",
        None,
        Some(json!({"email": "a@x.com", "password": "wrong"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = send(
        &router,
        "POST",
        "/login",
        None,
        Some(json!({"email": "a@x.com", "password": "p"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let token = body["access_token"].as_str().unwrap().to_string();

    // Create a book and read it back through its generated id
    let (status, body) = send(
        &router,
        "POST",
        "/books",
        Some(&token),
        Some(json!({"title": "T"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], json!("Book added successfully!"));
    let id = body["book"]["_id"].as_str().unwrap().to_string();

    let (status, body) = send(&router, "GET", &format!("/books/{}", id), Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"], json!("T"));
    assert_eq!(body["user_email"], json!("a@x.com"));

    let (status, _) = send(
        &router,
        "POST",
        "/books/delete",
        Some(&token),
        Some(json!({"id": id})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // Gone, and indistinguishable from never-existed
    let (status, body) = send(&router, "GET", &format!("/books/{}", id), Some(&token), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], json!("Book not found or unauthorized"));
}

/// A duplicate registration is a 400 with the original's message.
#[tokio::test]
async fn test_duplicate_registration_over_http() {
    let router = test_router();
    signup(&router, "a@x.com").await;

    let (status, body) = send(
        &router,
        "POST",
        "/register",
        None,
        Some(json!({"username": "b", "email": "a@x.com", "password": "q"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], json!("User already exists"));
}

// =============================================================================
// Tenancy Over HTTP
// =============================================================================

/// One user's token gets a 403 on every path into another user's book.
#[tokio::test]
async fn test_cross_user_isolation() {
    let router = test_router();
    let alice = signup(&router, "alice@x.com").await;
    let bob = signup(&router, "bob@x.com").await;

    let (_, body) = send(
        &router,
        "POST",
        "/books",
        Some(&alice),
        Some(json!({"title": "Hers"})),
    )
    .await;
    let id = body["book"]["_id"].as_str().unwrap().to_string();

    let (status, _) = send(&router, "GET", &format!("/books/{}", id), Some(&bob), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(
        &router,
        "POST",
        "/books/edit",
        Some(&bob),
        Some(json!({"id": id, "title": "Mine"})),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(
        &router,
        "POST",
        "/books/delete",
        Some(&bob),
        Some(json!({"id": id})),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Bob's listing stays empty; Alice still sees her book
    let (_, body) = send(&router, "GET", "/books", Some(&bob), None).await;
    assert_eq!(body.as_array().unwrap().len(), 0);
    let (_, body) = send(&router, "GET", "/books", Some(&alice), None).await;
    assert_eq!(body.as_array().unwrap().len(), 1);
}

// =============================================================================
// Filters, Profile, Aggregates
// =============================================================================

/// `?genre=` with an empty value is a 400; with a value it filters.
#[tokio::test]
async fn test_genre_filter() {
    let router = test_router();
    let token = signup(&router, "a@x.com").await;

    send(
        &router,
        "POST",
        "/books",
        Some(&token),
        Some(json!({"title": "1", "genre": "SF"})),
    )
    .await;
    send(
        &router,
        "POST",
        "/books",
        Some(&token),
        Some(json!({"title": "2", "genre": "Fantasy"})),
    )
    .await;

    let (status, body) = send(&router, "GET", "/books?genre=SF", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["genre"], json!("SF"));

    let (status, body) = send(&router, "GET", "/books?genre=", Some(&token), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], json!("No genre provided"));

    let (status, body) = send(&router, "GET", "/books?author=", Some(&token), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], json!("No author provided"));
}

/// Profile fetch redacts, update merges, and the edit cannot move identity.
#[tokio::test]
async fn test_profile_over_http() {
    let router = test_router();
    let token = signup(&router, "a@x.com").await;

    let (status, body) = send(&router, "GET", "/profile", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["email"], json!("a@x.com"));
    assert!(body.get("password").is_none());

    let (status, _) = send(
        &router,
        "PUT",
        "/profile",
        Some(&token),
        Some(json!({"username": "bookworm", "email": "stolen@x.com"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = send(&router, "GET", "/profile", Some(&token), None).await;
    assert_eq!(body["username"], json!("bookworm"));
    assert_eq!(body["email"], json!("a@x.com"));

    // Empty update payload
    let (status, body) = send(&router, "PUT", "/profile", Some(&token), Some(json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], json!("No data provided"));
}

/// Stats and genres endpoints, including the empty-shelf case.
#[tokio::test]
async fn test_stats_and_genres_over_http() {
    let router = test_router();
    let token = signup(&router, "a@x.com").await;

    let (status, body) = send(&router, "GET", "/stats", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_books"], json!(0));
    assert_eq!(body["avg_rating"], json!(0.0));

    for (title, genre, rating) in [("1", "SF", 5.0), ("2", "SF", 4.0), ("3", "Fantasy", 3.0)] {
        send(
            &router,
            "POST",
            "/books",
            Some(&token),
            Some(json!({"title": title, "genre": genre, "rating": rating})),
        )
        .await;
    }

    let (_, body) = send(&router, "GET", "/stats", Some(&token), None).await;
    assert_eq!(body["total_books"], json!(3));
    assert_eq!(body["avg_rating"], json!(4.0));
    assert_eq!(body["genre_distribution"][0], json!({"_id": "SF", "count": 2}));

    let (status, body) = send(&router, "GET", "/genres", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    let mut genres: Vec<String> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_str().unwrap().to_string())
        .collect();
    genres.sort();
    assert_eq!(genres, vec!["Fantasy".to_string(), "SF".to_string()]);
}

/// An edit over HTTP keeps every field the payload omitted.
#[tokio::test]
async fn test_edit_preserves_omitted_fields_over_http() {
    let router = test_router();
    let token = signup(&router, "a@x.com").await;

    let (_, body) = send(
        &router,
        "POST",
        "/books",
        Some(&token),
        Some(json!({
            "title": "Dune",
            "rating": 4.5,
            "plotTwistRating": 5.0,
            "isFavorite": true,
            "startedDate": "2024-01-01"
        })),
    )
    .await;
    let id = body["book"]["_id"].as_str().unwrap().to_string();

    let (status, body) = send(
        &router,
        "POST",
        "/books/edit",
        Some(&token),
        Some(json!({"id": id, "genre": "SF"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], json!("Book updated successfully!"));

    let (_, body) = send(&router, "GET", &format!("/books/{}", id), Some(&token), None).await;
    assert_eq!(body["genre"], json!("SF"));
    assert_eq!(body["title"], json!("Dune"));
    assert_eq!(body["rating"], json!(4.5));
    assert_eq!(body["plotTwistRating"], json!(5.0));
    assert_eq!(body["isFavorite"], json!(true));
    assert_eq!(body["startedDate"], json!("2024-01-01"));
}

/// A malformed id in the path is a 400, not a 403.
#[tokio::test]
async fn test_malformed_id_is_bad_request() {
    let router = test_router();
    let token = signup(&router, "a@x.com").await;

    let (status, body) = send(&router, "GET", "/books/not-hex", Some(&token), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], json!("Invalid book ID"));
}
