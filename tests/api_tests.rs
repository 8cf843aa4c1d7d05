use account_ledger::application::{AccountService, AccountServiceTrait};
use account_ledger::domain::Account;
use account_ledger::infrastructure::InMemoryAccountRepository;
use account_ledger::web::handlers::{ErrorResponse, HealthResponse, MessageResponse};
use account_ledger::web::create_router;
use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use rust_decimal_macros::dec;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

const ORIGIN: &str = "http://localhost:3000";

fn test_app() -> Router {
    let service: Arc<dyn AccountServiceTrait> =
        Arc::new(AccountService::new(Arc::new(InMemoryAccountRepository::new())));
    create_router(service, &[ORIGIN.to_string()])
}

fn json_request(method: Method, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn empty_request(method: Method, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Vec<u8>) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, bytes.to_vec())
}

fn parse<T: DeserializeOwned>(bytes: &[u8]) -> T {
    serde_json::from_slice(bytes).expect("response body is not the expected JSON")
}

async fn create(app: &Router, name: &str) -> Account {
    let (status, body) = send(
        app,
        json_request(
            Method::POST,
            "/api/accounts",
            json!({ "accountHolderName": name }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    parse(&body)
}

#[tokio::test]
async fn test_health_check() {
    let app = test_app();
    let (status, body) = send(&app, empty_request(Method::GET, "/health")).await;
    assert_eq!(status, StatusCode::OK);
    let health: HealthResponse = parse(&body);
    assert_eq!(health.status, "ok");
}

#[tokio::test]
async fn test_create_account_returns_camel_case_json() {
    let app = test_app();
    let (status, body) = send(
        &app,
        json_request(
            Method::POST,
            "/api/accounts",
            json!({ "accountHolderName": "Alice", "balance": 12.5 }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    let value: Value = parse(&body);
    assert_eq!(value["accountHolderName"], "Alice");
    assert_eq!(value["balance"], json!(12.5));
    assert!(value["accountNumber"].as_str().unwrap().starts_with("ACC"));
    assert!(value["id"].is_i64());
}

#[tokio::test]
async fn test_negative_initial_balance_is_bad_request() {
    let app = test_app();
    let (status, body) = send(
        &app,
        json_request(
            Method::POST,
            "/api/accounts",
            json!({ "accountHolderName": "Alice", "balance": -1 }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let error: ErrorResponse = parse(&body);
    assert!(error.error.contains("cannot be negative"));
}

#[tokio::test]
async fn test_deposit_and_withdraw_flow() {
    let app = test_app();
    let account = create(&app, "Alice").await;

    let (status, body) = send(
        &app,
        json_request(
            Method::PUT,
            "/api/accounts/deposit",
            json!({ "accountNumber": account.account_number, "amount": 100 }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let updated: Account = parse(&body);
    assert_eq!(updated.balance, dec!(100));

    let (status, body) = send(
        &app,
        json_request(
            Method::PUT,
            "/api/accounts/withdraw",
            json!({ "accountNumber": account.account_number, "amount": 40 }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let updated: Account = parse(&body);
    assert_eq!(updated.balance, dec!(60));

    let (status, body) = send(
        &app,
        json_request(
            Method::PUT,
            "/api/accounts/withdraw",
            json!({ "accountNumber": account.account_number, "amount": 1000 }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let error: ErrorResponse = parse(&body);
    assert!(error.error.starts_with("Insufficient balance"));

    let (status, body) = send(
        &app,
        empty_request(Method::GET, &format!("/api/accounts/{}", account.id)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let fetched: Account = parse(&body);
    assert_eq!(fetched.balance, dec!(60));
}

#[tokio::test]
async fn test_zero_amount_is_bad_request() {
    let app = test_app();
    let account = create(&app, "Bob").await;

    let (status, _) = send(
        &app,
        json_request(
            Method::PUT,
            "/api/accounts/deposit",
            json!({ "accountNumber": account.account_number, "amount": 0 }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_unknown_account_is_not_found() {
    let app = test_app();

    let (status, body) = send(&app, empty_request(Method::GET, "/api/accounts/999")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let error: ErrorResponse = parse(&body);
    assert_eq!(error.error, "Account not found with id: 999");

    let (status, _) = send(
        &app,
        json_request(
            Method::PUT,
            "/api/accounts/deposit",
            json!({ "accountNumber": "ACC00000000", "amount": 5 }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, empty_request(Method::DELETE, "/api/accounts/999")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_account() {
    let app = test_app();
    let first = create(&app, "First").await;
    let second = create(&app, "Second").await;

    let (status, body) = send(
        &app,
        empty_request(Method::DELETE, &format!("/api/accounts/{}", first.id)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let message: MessageResponse = parse(&body);
    assert_eq!(message.message, "Account deleted successfully");

    let (status, _) = send(
        &app,
        empty_request(Method::GET, &format!("/api/accounts/{}", first.id)),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = send(&app, empty_request(Method::GET, "/api/accounts")).await;
    assert_eq!(status, StatusCode::OK);
    let accounts: Vec<Account> = parse(&body);
    assert_eq!(accounts, vec![second]);
}

#[tokio::test]
async fn test_list_accounts_in_creation_order() {
    let app = test_app();
    let alice = create(&app, "Alice").await;
    let bob = create(&app, "Bob").await;

    let (status, body) = send(&app, empty_request(Method::GET, "/api/accounts")).await;
    assert_eq!(status, StatusCode::OK);
    let accounts: Vec<Account> = parse(&body);
    assert_eq!(accounts, vec![alice, bob]);
}

#[tokio::test]
async fn test_malformed_body_is_rejected() {
    let app = test_app();
    let (status, _) = send(
        &app,
        json_request(Method::POST, "/api/accounts", json!({ "balance": 10 })),
    )
    .await;
    assert!(status.is_client_error());
}

#[tokio::test]
async fn test_cors_allows_configured_origin() {
    let app = test_app();
    let request = Request::builder()
        .method(Method::OPTIONS)
        .uri("/api/accounts")
        .header(header::ORIGIN, ORIGIN)
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(
        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .unwrap(),
        ORIGIN
    );
}

#[tokio::test]
async fn test_cors_ignores_other_origins() {
    let app = test_app();
    let request = Request::builder()
        .method(Method::GET)
        .uri("/health")
        .header(header::ORIGIN, "http://evil.example")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response
        .headers()
        .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
        .is_none());
}

async fn balance_of(app: &Router, id: i64) -> rust_decimal::Decimal {
    let (status, body) = send(app, empty_request(Method::GET, &format!("/api/accounts/{}", id))).await;
    assert_eq!(status, StatusCode::OK);
    parse::<Account>(&body).balance
}

#[tokio::test]
async fn test_overflowing_deposit_is_bad_request() {
    let app = test_app();
    let (status, body) = send(
        &app,
        json_request(
            Method::POST,
            "/api/accounts",
            json!({ "accountHolderName": "Alice", "balance": 1 }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let account: Account = parse(&body);

    let (status, body) = send(
        &app,
        json_request(
            Method::PUT,
            "/api/accounts/deposit",
            json!({
                "accountNumber": account.account_number,
                "amount": "79228162514264337593543950335"
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let error: ErrorResponse = parse(&body);
    assert!(error.error.contains("out of range"));
    assert_eq!(balance_of(&app, account.id).await, dec!(1));

    // the server keeps serving afterwards
    let (status, _) = send(&app, empty_request(Method::GET, "/health")).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_sub_cent_fractions_beyond_four_places_are_bad_request() {
    let app = test_app();
    let account = create(&app, "Alice").await;

    let (status, body) = send(
        &app,
        json_request(
            Method::PUT,
            "/api/accounts/deposit",
            json!({ "accountNumber": account.account_number, "amount": "0.00001" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let error: ErrorResponse = parse(&body);
    assert!(error.error.contains("decimal places"));
    assert_eq!(balance_of(&app, account.id).await, dec!(0));

    let (status, _) = send(
        &app,
        json_request(
            Method::PUT,
            "/api/accounts/deposit",
            json!({ "accountNumber": account.account_number, "amount": "0.0001" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(
        &app,
        json_request(
            Method::PUT,
            "/api/accounts/withdraw",
            json!({ "accountNumber": account.account_number, "amount": "0.00004" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(balance_of(&app, account.id).await, dec!(0.0001));
}
