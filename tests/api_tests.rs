//! API integration tests
//!
//! These run against a live server with a reachable database:
//! `cargo run` in one terminal, then `cargo test -- --ignored`.

use reqwest::Client;
use serde_json::{json, Value};

const BASE_URL: &str = "http://localhost:8080/api";

/// Unique suffix so repeated runs do not collide on unique keys
fn unique_suffix() -> u128 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .expect("clock before epoch")
        .as_nanos()
}

async fn create_book(client: &Client, quantity: i32) -> Value {
    let response = client
        .post(format!("{}/books", BASE_URL))
        .json(&json!({
            "isbn": format!("test-{}", unique_suffix()),
            "title": "Integration Test Book",
            "author": "Test Author",
            "genre": "Testing",
            "quantity": quantity
        }))
        .send()
        .await
        .expect("Failed to create book");

    assert_eq!(response.status(), 201);
    let body: Value = response.json().await.expect("Failed to parse book response");
    assert_eq!(body["success"], true);
    body["book"].clone()
}

async fn create_student(client: &Client, school: &str) -> Value {
    let response = client
        .post(format!("{}/students", BASE_URL))
        .json(&json!({
            "email": format!("student-{}@test.example", unique_suffix()),
            "full_name": "Integration Test Student",
            "class_name": "T1",
            "school": school
        }))
        .send()
        .await
        .expect("Failed to create student");

    assert_eq!(response.status(), 201);
    let body: Value = response
        .json()
        .await
        .expect("Failed to parse student response");
    body["student"].clone()
}

async fn borrow(client: &Client, student_id: i64, book_id: i64) -> reqwest::Response {
    client
        .post(format!("{}/borrowings", BASE_URL))
        .json(&json!({ "student_id": student_id, "book_id": book_id }))
        .send()
        .await
        .expect("Failed to send borrow request")
}

async fn get_book(client: &Client, id: i64) -> Value {
    let response = client
        .get(format!("{}/books/{}", BASE_URL, id))
        .send()
        .await
        .expect("Failed to fetch book");
    assert!(response.status().is_success());
    let body: Value = response.json().await.expect("Failed to parse book");
    body["book"].clone()
}

async fn return_borrowing(client: &Client, id: i64) -> reqwest::Response {
    client
        .post(format!("{}/borrowings/{}/return", BASE_URL, id))
        .send()
        .await
        .expect("Failed to send return request")
}

async fn delete_borrowing(client: &Client, id: i64) {
    let response = client
        .delete(format!("{}/borrowings/{}?force=true", BASE_URL, id))
        .send()
        .await
        .expect("Failed to delete borrowing");
    assert!(response.status().is_success());
}

async fn delete_book(client: &Client, id: i64) {
    let response = client
        .delete(format!("{}/books/{}", BASE_URL, id))
        .send()
        .await
        .expect("Failed to delete book");
    assert!(response.status().is_success());
}

async fn delete_student(client: &Client, id: i64) {
    let response = client
        .delete(format!("{}/students/{}", BASE_URL, id))
        .send()
        .await
        .expect("Failed to delete student");
    assert!(response.status().is_success());
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
async fn test_statistics_counters() {
    let client = Client::new();

    let response = client
        .get(format!("{}/statistics", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["success"], true);
    for counter in [
        "total_books",
        "total_copies",
        "available_books",
        "total_students",
        "active_borrowings",
        "overdue_books",
    ] {
        assert!(
            body["statistics"][counter].is_number(),
            "missing counter {}",
            counter
        );
    }
}

#[tokio::test]
#[ignore]
async fn test_new_book_starts_fully_available() {
    let client = Client::new();

    let book = create_book(&client, 3).await;
    assert_eq!(book["quantity"], 3);
    assert_eq!(book["available_quantity"], 3);

    delete_book(&client, book["id"].as_i64().unwrap()).await;
}

#[tokio::test]
#[ignore]
async fn test_duplicate_isbn_is_conflict() {
    let client = Client::new();

    let book = create_book(&client, 1).await;
    let isbn = book["isbn"].as_str().unwrap();

    let response = client
        .post(format!("{}/books", BASE_URL))
        .json(&json!({
            "isbn": isbn,
            "title": "Another Title",
            "author": "Another Author",
            "quantity": 1
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 409);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body["error"].is_string());

    delete_book(&client, book["id"].as_i64().unwrap()).await;
}

#[tokio::test]
#[ignore]
async fn test_missing_required_fields_rejected() {
    let client = Client::new();

    let response = client
        .post(format!("{}/books", BASE_URL))
        .json(&json!({ "title": "No ISBN" }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 400);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body["error"].is_string());
}

#[tokio::test]
#[ignore]
async fn test_borrow_and_return_lifecycle() {
    let client = Client::new();

    let book = create_book(&client, 1).await;
    let book_id = book["id"].as_i64().unwrap();
    let student_a = create_student(&client, "Central High School").await;
    let student_a_id = student_a["id"].as_i64().unwrap();
    let student_b = create_student(&client, "Riverside Academy").await;
    let student_b_id = student_b["id"].as_i64().unwrap();

    // Borrow by A succeeds and decrements availability
    let response = borrow(&client, student_a_id, book_id).await;
    assert_eq!(response.status(), 201);
    let body: Value = response.json().await.unwrap();
    let borrowing = &body["borrowing"];
    assert_eq!(borrowing["status"], "borrowed");
    let borrowing_id = borrowing["id"].as_i64().unwrap();

    // Due date is 14 days after the borrow date by default
    let borrow_date = chrono::DateTime::parse_from_rfc3339(borrowing["borrow_date"].as_str().unwrap())
        .expect("bad borrow_date");
    let due_date = chrono::DateTime::parse_from_rfc3339(borrowing["due_date"].as_str().unwrap())
        .expect("bad due_date");
    assert_eq!(due_date - borrow_date, chrono::Duration::days(14));

    assert_eq!(get_book(&client, book_id).await["available_quantity"], 0);

    // Borrow by B fails while no copy is free
    let response = borrow(&client, student_b_id, book_id).await;
    assert_eq!(response.status(), 409);

    // Return by A: status flips, return_date set, availability restored
    let response = return_borrowing(&client, borrowing_id).await;
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["borrowing"]["status"], "returned");
    assert!(body["borrowing"]["return_date"].is_string());
    assert_eq!(get_book(&client, book_id).await["available_quantity"], 1);

    // A second return is a conflict and does not mutate availability
    let response = return_borrowing(&client, borrowing_id).await;
    assert_eq!(response.status(), 409);
    assert_eq!(get_book(&client, book_id).await["available_quantity"], 1);

    // Borrow by B now succeeds
    let response = borrow(&client, student_b_id, book_id).await;
    assert_eq!(response.status(), 201);
    let second: Value = response.json().await.unwrap();
    let second_id = second["borrowing"]["id"].as_i64().unwrap();

    // Cleanup
    delete_borrowing(&client, second_id).await;
    delete_borrowing(&client, borrowing_id).await;
    delete_student(&client, student_a_id).await;
    delete_student(&client, student_b_id).await;
    delete_book(&client, book_id).await;
}

#[tokio::test]
#[ignore]
async fn test_borrow_missing_ids_are_not_found() {
    let client = Client::new();

    let student = create_student(&client, "Central High School").await;
    let student_id = student["id"].as_i64().unwrap();

    let response = borrow(&client, student_id, 999_999_999).await;
    assert_eq!(response.status(), 404);

    let response = borrow(&client, 999_999_999, 1).await;
    assert_eq!(response.status(), 404);

    delete_student(&client, student_id).await;
}

#[tokio::test]
#[ignore]
async fn test_active_borrowing_blocks_deletes() {
    let client = Client::new();

    let book = create_book(&client, 1).await;
    let book_id = book["id"].as_i64().unwrap();
    let student = create_student(&client, "Central High School").await;
    let student_id = student["id"].as_i64().unwrap();

    let response = borrow(&client, student_id, book_id).await;
    assert_eq!(response.status(), 201);
    let body: Value = response.json().await.unwrap();
    let borrowing_id = body["borrowing"]["id"].as_i64().unwrap();

    // Book, student and plain borrowing deletion all blocked while active
    let response = client
        .delete(format!("{}/books/{}", BASE_URL, book_id))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 409);

    let response = client
        .delete(format!("{}/students/{}", BASE_URL, student_id))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 409);

    let response = client
        .delete(format!("{}/borrowings/{}", BASE_URL, borrowing_id))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 409);

    // After the return, everything can go
    let response = return_borrowing(&client, borrowing_id).await;
    assert_eq!(response.status(), 200);

    delete_student(&client, student_id).await;
    delete_book(&client, book_id).await;
}

#[tokio::test]
#[ignore]
async fn test_force_delete_of_active_borrowing_releases_copy() {
    let client = Client::new();

    let book = create_book(&client, 1).await;
    let book_id = book["id"].as_i64().unwrap();
    let student = create_student(&client, "Central High School").await;
    let student_id = student["id"].as_i64().unwrap();

    let response = borrow(&client, student_id, book_id).await;
    assert_eq!(response.status(), 201);
    let body: Value = response.json().await.unwrap();
    let borrowing_id = body["borrowing"]["id"].as_i64().unwrap();

    assert_eq!(get_book(&client, book_id).await["available_quantity"], 0);

    delete_borrowing(&client, borrowing_id).await;

    assert_eq!(get_book(&client, book_id).await["available_quantity"], 1);

    delete_student(&client, student_id).await;
    delete_book(&client, book_id).await;
}

#[tokio::test]
#[ignore]
async fn test_quantity_edit_recomputes_availability() {
    let client = Client::new();

    let book = create_book(&client, 2).await;
    let book_id = book["id"].as_i64().unwrap();
    let student = create_student(&client, "Central High School").await;
    let student_id = student["id"].as_i64().unwrap();

    let response = borrow(&client, student_id, book_id).await;
    assert_eq!(response.status(), 201);
    let body: Value = response.json().await.unwrap();
    let borrowing_id = body["borrowing"]["id"].as_i64().unwrap();

    // 2 copies, 1 borrowed; raising the stock to 5 leaves 4 available
    let response = client
        .put(format!("{}/books/{}", BASE_URL, book_id))
        .json(&json!({ "quantity": 5 }))
        .send()
        .await
        .unwrap();
    assert!(response.status().is_success());
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["book"]["quantity"], 5);
    assert_eq!(body["book"]["available_quantity"], 4);

    // Shrinking below the borrowed count is rejected
    let response = client
        .put(format!("{}/books/{}", BASE_URL, book_id))
        .json(&json!({ "quantity": 0 }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 409);

    let response = return_borrowing(&client, borrowing_id).await;
    assert_eq!(response.status(), 200);

    delete_borrowing(&client, borrowing_id).await;
    delete_student(&client, student_id).await;
    delete_book(&client, book_id).await;
}

#[tokio::test]
#[ignore]
async fn test_concurrent_borrows_of_last_copy() {
    let client = Client::new();

    let book = create_book(&client, 1).await;
    let book_id = book["id"].as_i64().unwrap();
    let student_a = create_student(&client, "Central High School").await;
    let student_a_id = student_a["id"].as_i64().unwrap();
    let student_b = create_student(&client, "Riverside Academy").await;
    let student_b_id = student_b["id"].as_i64().unwrap();

    let (first, second) = tokio::join!(
        borrow(&client, student_a_id, book_id),
        borrow(&client, student_b_id, book_id)
    );

    let mut statuses = [first.status().as_u16(), second.status().as_u16()];
    statuses.sort();
    assert_eq!(statuses, [201, 409], "exactly one borrow may win the race");

    let book_after = get_book(&client, book_id).await;
    assert_eq!(book_after["available_quantity"], 0);

    // Cleanup the winner
    for response in [first, second] {
        if response.status() == 201 {
            let body: Value = response.json().await.unwrap();
            delete_borrowing(&client, body["borrowing"]["id"].as_i64().unwrap()).await;
        }
    }
    delete_student(&client, student_a_id).await;
    delete_student(&client, student_b_id).await;
    delete_book(&client, book_id).await;
}

#[tokio::test]
#[ignore]
async fn test_borrowing_filters() {
    let client = Client::new();

    let book = create_book(&client, 2).await;
    let book_id = book["id"].as_i64().unwrap();
    let student = create_student(&client, "Central High School").await;
    let student_id = student["id"].as_i64().unwrap();

    let response = borrow(&client, student_id, book_id).await;
    assert_eq!(response.status(), 201);
    let body: Value = response.json().await.unwrap();
    let borrowing_id = body["borrowing"]["id"].as_i64().unwrap();

    let response = client
        .get(format!(
            "{}/borrowings?status=borrowed&student_id={}",
            BASE_URL, student_id
        ))
        .send()
        .await
        .unwrap();
    assert!(response.status().is_success());
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["count"], 1);
    assert_eq!(body["borrowings"][0]["id"], borrowing_id);
    assert_eq!(body["borrowings"][0]["book_title"], "Integration Test Book");

    delete_borrowing(&client, borrowing_id).await;
    delete_student(&client, student_id).await;
    delete_book(&client, book_id).await;
}

#[tokio::test]
#[ignore]
async fn test_signup_login_me() {
    let client = Client::new();

    let email = format!("auth-{}@test.example", unique_suffix());

    let response = client
        .post(format!("{}/auth/signup", BASE_URL))
        .json(&json!({
            "email": email,
            "password": "secret-password",
            "full_name": "Auth Test",
            "class_name": "T1",
            "school": "Central High School"
        }))
        .send()
        .await
        .expect("Failed to sign up");
    assert_eq!(response.status(), 201);
    let body: Value = response.json().await.unwrap();
    let student_id = body["student"]["id"].as_i64().unwrap();

    // Wrong password is rejected
    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({ "email": email, "password": "wrong" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 401);

    // Correct password returns a bearer token
    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({ "email": email, "password": "secret-password" }))
        .send()
        .await
        .unwrap();
    assert!(response.status().is_success());
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["token_type"], "Bearer");
    let token = body["token"].as_str().unwrap().to_string();

    let response = client
        .get(format!("{}/auth/me", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .unwrap();
    assert!(response.status().is_success());
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["student"]["email"], email.as_str());

    // No token, no dashboard
    let response = client
        .get(format!("{}/dashboard", BASE_URL))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 401);

    // Student dashboard has the student shape
    let response = client
        .get(format!("{}/dashboard", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .unwrap();
    assert!(response.status().is_success());
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["role"], "student");
    assert!(body["available_books"].is_array());
    assert!(body["recommendations"].is_array());

    delete_student(&client, student_id).await;
}
