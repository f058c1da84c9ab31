//! API integration tests
//!
//! Run against a live server (with its database migrated and the bootstrap
//! admin enabled): cargo test -- --ignored

use std::sync::atomic::{AtomicU32, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use reqwest::Client;
use serde_json::{json, Value};

const BASE_URL: &str = "http://localhost:8080/api/v1";
const ADMIN_EMAIL: &str = "admin@booklend.local";
const ADMIN_PASSWORD: &str = "admin";

static COUNTER: AtomicU32 = AtomicU32::new(0);

/// Unique email per call so tests can run repeatedly against one database
fn unique_email(prefix: &str) -> String {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    let n = COUNTER.fetch_add(1, Ordering::Relaxed);
    format!("{}-{}-{}@example.org", prefix, nanos, n)
}

async fn login(client: &Client, email: &str, password: &str) -> String {
    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({ "email": email, "password": password }))
        .send()
        .await
        .expect("Failed to send login request");

    assert!(response.status().is_success(), "login failed for {}", email);

    let body: Value = response.json().await.expect("Failed to parse login response");
    body["token"].as_str().expect("No token in response").to_string()
}

async fn admin_token(client: &Client) -> String {
    login(client, ADMIN_EMAIL, ADMIN_PASSWORD).await
}

/// Register a fresh user and return their token
async fn register_and_login(client: &Client) -> String {
    let email = unique_email("reader");
    let response = client
        .post(format!("{}/auth/register", BASE_URL))
        .json(&json!({
            "name": "Test Reader",
            "email": email,
            "password": "secret99"
        }))
        .send()
        .await
        .expect("Failed to send register request");

    assert_eq!(response.status(), 201);

    login(client, &email, "secret99").await
}

/// Create a book through the admin API and return its id
async fn create_book(client: &Client, token: &str, title: &str) -> i64 {
    let response = client
        .post(format!("{}/admin/books", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({
            "title": title,
            "author": "Test Author",
            "genre": "Fiction"
        }))
        .send()
        .await
        .expect("Failed to send create book request");

    assert_eq!(response.status(), 201);

    let body: Value = response.json().await.expect("Failed to parse response");
    body["id"].as_i64().expect("No book id")
}

#[tokio::test]
#[ignore] // Run with: cargo test -- --ignored
async fn test_health_check() {
    let client = Client::new();

    let response = client
        .get(format!("{}/health", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
#[ignore]
async fn test_register_and_login() {
    let client = Client::new();
    let email = unique_email("signup");

    let response = client
        .post(format!("{}/auth/register", BASE_URL))
        .json(&json!({
            "name": "New Reader",
            "email": email,
            "password": "secret99"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 201);

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["role"], "user");
    assert!(body.get("password_hash").is_none());

    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({ "email": email, "password": "secret99" }))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body["token"].is_string());
    assert_eq!(body["token_type"], "Bearer");
}

#[tokio::test]
#[ignore]
async fn test_register_duplicate_email() {
    let client = Client::new();
    let email = unique_email("dup");

    for expected in [201, 409] {
        let response = client
            .post(format!("{}/auth/register", BASE_URL))
            .json(&json!({
                "name": "Dup Reader",
                "email": email,
                "password": "secret99"
            }))
            .send()
            .await
            .expect("Failed to send request");

        assert_eq!(response.status(), expected);
    }
}

#[tokio::test]
#[ignore]
async fn test_register_rejects_short_password() {
    let client = Client::new();

    let response = client
        .post(format!("{}/auth/register", BASE_URL))
        .json(&json!({
            "name": "Weak",
            "email": unique_email("weak"),
            "password": "short"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 400);
}

#[tokio::test]
#[ignore]
async fn test_login_invalid_credentials() {
    let client = Client::new();

    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({ "email": ADMIN_EMAIL, "password": "wrong" }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 401);
}

#[tokio::test]
#[ignore]
async fn test_books_require_authentication() {
    let client = Client::new();

    let response = client
        .get(format!("{}/books", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 401);
}

#[tokio::test]
#[ignore]
async fn test_create_book_requires_admin() {
    let client = Client::new();
    let user = register_and_login(&client).await;

    let response = client
        .post(format!("{}/admin/books", BASE_URL))
        .header("Authorization", format!("Bearer {}", user))
        .json(&json!({
            "title": "Forbidden",
            "author": "Nobody",
            "genre": "None"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 403);
}

#[tokio::test]
#[ignore]
async fn test_create_and_list_books() {
    let client = Client::new();
    let admin = admin_token(&client).await;
    let id = create_book(&client, &admin, "The Listed Book").await;

    let response = client
        .get(format!("{}/books?per_page=100", BASE_URL))
        .header("Authorization", format!("Bearer {}", admin))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body["total"].as_i64().unwrap() >= 1);

    let created = body["items"]
        .as_array()
        .unwrap()
        .iter()
        .find(|b| b["id"].as_i64() == Some(id))
        .expect("Created book missing from listing");
    assert_eq!(created["status"], "available");
}

#[tokio::test]
#[ignore]
async fn test_view_book_not_found() {
    let client = Client::new();
    let user = register_and_login(&client).await;

    let response = client
        .get(format!("{}/books/999999999", BASE_URL))
        .header("Authorization", format!("Bearer {}", user))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 404);
}

#[tokio::test]
#[ignore]
async fn test_borrow_flow() {
    let client = Client::new();
    let admin = admin_token(&client).await;
    let user = register_and_login(&client).await;
    let id = create_book(&client, &admin, "Borrow Me").await;

    // First borrow succeeds and records an event
    let response = client
        .post(format!("{}/books/{}/borrow", BASE_URL, id))
        .header("Authorization", format!("Bearer {}", user))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 201);

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["event"]["book_id"].as_i64(), Some(id));

    // Book status flipped
    let response = client
        .get(format!("{}/books/{}", BASE_URL, id))
        .header("Authorization", format!("Bearer {}", user))
        .send()
        .await
        .expect("Failed to send request");

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "borrowed");

    // Second borrow is a conflict
    let response = client
        .post(format!("{}/books/{}/borrow", BASE_URL, id))
        .header("Authorization", format!("Bearer {}", user))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 409);

    // The event shows up in the user's history
    let response = client
        .get(format!("{}/users/me/borrows?per_page=100", BASE_URL))
        .header("Authorization", format!("Bearer {}", user))
        .send()
        .await
        .expect("Failed to send request");

    let body: Value = response.json().await.expect("Failed to parse response");
    let entries = body["items"].as_array().unwrap();
    assert!(entries.iter().any(|e| e["book"]["id"].as_i64() == Some(id)));

    // And in the admin borrow log
    let response = client
        .get(format!("{}/admin/borrow-events?per_page=100", BASE_URL))
        .header("Authorization", format!("Bearer {}", admin))
        .send()
        .await
        .expect("Failed to send request");

    let body: Value = response.json().await.expect("Failed to parse response");
    let events = body["items"].as_array().unwrap();
    assert!(events.iter().any(|e| e["book"]["id"].as_i64() == Some(id)));
}

/// Count borrow events for one book via the admin log
async fn count_events_for_book(client: &Client, admin: &str, book_id: i64) -> usize {
    let response = client
        .get(format!("{}/admin/borrow-events?per_page=100", BASE_URL))
        .header("Authorization", format!("Bearer {}", admin))
        .send()
        .await
        .expect("Failed to send request");

    let body: Value = response.json().await.expect("Failed to parse response");
    body["items"]
        .as_array()
        .unwrap()
        .iter()
        .filter(|e| e["book"]["id"].as_i64() == Some(book_id))
        .count()
}

#[tokio::test]
#[ignore]
async fn test_concurrent_borrow_single_winner() {
    const ATTEMPTS: usize = 8;

    let client = Client::new();
    let admin = admin_token(&client).await;
    let user = register_and_login(&client).await;
    let id = create_book(&client, &admin, "Contended Book").await;

    let mut handles = Vec::new();
    for _ in 0..ATTEMPTS {
        let client = client.clone();
        let token = user.clone();
        handles.push(tokio::spawn(async move {
            client
                .post(format!("{}/books/{}/borrow", BASE_URL, id))
                .header("Authorization", format!("Bearer {}", token))
                .send()
                .await
                .expect("Failed to send request")
                .status()
                .as_u16()
        }));
    }

    let mut successes = 0;
    let mut conflicts = 0;
    for handle in handles {
        match handle.await.expect("borrow task panicked") {
            201 => successes += 1,
            409 => conflicts += 1,
            other => panic!("Unexpected status under contention: {}", other),
        }
    }

    assert_eq!(successes, 1, "exactly one concurrent borrow must win");
    assert_eq!(conflicts, ATTEMPTS - 1);

    // Exactly one event row was recorded
    assert_eq!(count_events_for_book(&client, &admin, id).await, 1);
}

#[tokio::test]
#[ignore]
async fn test_concurrent_borrow_different_books_independent() {
    let client = Client::new();
    let admin = admin_token(&client).await;
    let user = register_and_login(&client).await;
    let first = create_book(&client, &admin, "Left Shelf").await;
    let second = create_book(&client, &admin, "Right Shelf").await;

    let mut handles = Vec::new();
    for id in [first, second] {
        let client = client.clone();
        let token = user.clone();
        handles.push(tokio::spawn(async move {
            client
                .post(format!("{}/books/{}/borrow", BASE_URL, id))
                .header("Authorization", format!("Bearer {}", token))
                .send()
                .await
                .expect("Failed to send request")
                .status()
                .as_u16()
        }));
    }

    for handle in handles {
        assert_eq!(handle.await.expect("borrow task panicked"), 201);
    }
}

#[tokio::test]
#[ignore]
async fn test_update_borrowed_book_conflict() {
    let client = Client::new();
    let admin = admin_token(&client).await;
    let user = register_and_login(&client).await;
    let id = create_book(&client, &admin, "Frozen While Borrowed").await;

    let response = client
        .post(format!("{}/books/{}/borrow", BASE_URL, id))
        .header("Authorization", format!("Bearer {}", user))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 201);

    // Any field change on a borrowed book is rejected, including forcing
    // the status back to available
    for body in [json!({"title": "Renamed"}), json!({"status": "available"})] {
        let response = client
            .patch(format!("{}/admin/books/{}", BASE_URL, id))
            .header("Authorization", format!("Bearer {}", admin))
            .json(&body)
            .send()
            .await
            .expect("Failed to send request");

        assert_eq!(response.status(), 409);
    }

    // Fields unchanged
    let response = client
        .get(format!("{}/books/{}", BASE_URL, id))
        .header("Authorization", format!("Bearer {}", user))
        .send()
        .await
        .expect("Failed to send request");

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["title"], "Frozen While Borrowed");
    assert_eq!(body["status"], "borrowed");
}

#[tokio::test]
#[ignore]
async fn test_update_book_fields() {
    let client = Client::new();
    let admin = admin_token(&client).await;
    let id = create_book(&client, &admin, "Original Title").await;

    // Empty payload: nothing recognized to update
    let response = client
        .patch(format!("{}/admin/books/{}", BASE_URL, id))
        .header("Authorization", format!("Bearer {}", admin))
        .json(&json!({}))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 400);

    // Unknown fields are dropped silently; payload of only unknowns is empty
    let response = client
        .patch(format!("{}/admin/books/{}", BASE_URL, id))
        .header("Authorization", format!("Bearer {}", admin))
        .json(&json!({"publisher": "Ignored"}))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 400);

    // Recognized fields update, unknown ones still ignored
    let response = client
        .patch(format!("{}/admin/books/{}", BASE_URL, id))
        .header("Authorization", format!("Bearer {}", admin))
        .json(&json!({"title": "New Title", "publisher": "Ignored"}))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 200);

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["title"], "New Title");
    assert_eq!(body["author"], "Test Author");
}

#[tokio::test]
#[ignore]
async fn test_soft_delete_flow() {
    let client = Client::new();
    let admin = admin_token(&client).await;
    let user = register_and_login(&client).await;
    let id = create_book(&client, &admin, "Short Lived").await;

    let response = client
        .delete(format!("{}/admin/books/{}", BASE_URL, id))
        .header("Authorization", format!("Bearer {}", admin))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 204);

    // Deleted, not gone from the database: view distinguishes 410 from 404
    let response = client
        .get(format!("{}/books/{}", BASE_URL, id))
        .header("Authorization", format!("Bearer {}", user))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 410);

    // Excluded from the default listing
    let response = client
        .get(format!("{}/books?per_page=100", BASE_URL))
        .header("Authorization", format!("Bearer {}", user))
        .send()
        .await
        .expect("Failed to send request");
    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(!body["items"]
        .as_array()
        .unwrap()
        .iter()
        .any(|b| b["id"].as_i64() == Some(id)));

    // Still visible to the admin audit listing
    let response = client
        .get(format!("{}/admin/books?include_deleted=true&per_page=100", BASE_URL))
        .header("Authorization", format!("Bearer {}", admin))
        .send()
        .await
        .expect("Failed to send request");
    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body["items"]
        .as_array()
        .unwrap()
        .iter()
        .any(|b| b["id"].as_i64() == Some(id)));

    // Cannot be borrowed
    let response = client
        .post(format!("{}/books/{}/borrow", BASE_URL, id))
        .header("Authorization", format!("Bearer {}", user))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 404);

    // Cannot be deleted twice
    let response = client
        .delete(format!("{}/admin/books/{}", BASE_URL, id))
        .header("Authorization", format!("Bearer {}", admin))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 404);
}

#[tokio::test]
#[ignore]
async fn test_soft_delete_borrowed_book_conflict() {
    let client = Client::new();
    let admin = admin_token(&client).await;
    let user = register_and_login(&client).await;
    let id = create_book(&client, &admin, "Out On Loan").await;

    let response = client
        .post(format!("{}/books/{}/borrow", BASE_URL, id))
        .header("Authorization", format!("Bearer {}", user))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 201);

    let response = client
        .delete(format!("{}/admin/books/{}", BASE_URL, id))
        .header("Authorization", format!("Bearer {}", admin))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 409);
}

#[tokio::test]
#[ignore]
async fn test_borrow_update_race_serializes() {
    let client = Client::new();
    let admin = admin_token(&client).await;
    let user = register_and_login(&client).await;
    let id = create_book(&client, &admin, "Race Target").await;

    let borrow = {
        let client = client.clone();
        let token = user.clone();
        tokio::spawn(async move {
            client
                .post(format!("{}/books/{}/borrow", BASE_URL, id))
                .header("Authorization", format!("Bearer {}", token))
                .send()
                .await
                .expect("Failed to send request")
                .status()
                .as_u16()
        })
    };
    let update = {
        let client = client.clone();
        let token = admin.clone();
        tokio::spawn(async move {
            client
                .patch(format!("{}/admin/books/{}", BASE_URL, id))
                .header("Authorization", format!("Bearer {}", token))
                .json(&json!({"genre": "Thriller"}))
                .send()
                .await
                .expect("Failed to send request")
                .status()
                .as_u16()
        })
    };

    let borrow_status = borrow.await.expect("borrow task panicked");
    let update_status = update.await.expect("update task panicked");

    // The two operations serialize: borrow always wins an available book
    // (the update either ran first on the available book or lost with 409);
    // neither write may be dropped silently.
    assert_eq!(borrow_status, 201);
    assert!(
        update_status == 200 || update_status == 409,
        "unexpected update status {}",
        update_status
    );

    let response = client
        .get(format!("{}/books/{}", BASE_URL, id))
        .header("Authorization", format!("Bearer {}", user))
        .send()
        .await
        .expect("Failed to send request");

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "borrowed");
    if update_status == 200 {
        assert_eq!(body["genre"], "Thriller");
    } else {
        assert_eq!(body["genre"], "Fiction");
    }

    assert_eq!(count_events_for_book(&client, &admin, id).await, 1);
}
