//! End-to-end tests driving the router with in-memory SQLite.

#![allow(clippy::too_many_lines)]

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use chrono::Utc;
use http_body_util::BodyExt;
use rstest::rstest;
use sea_orm::{ActiveModelTrait, ConnectOptions, Database, DatabaseConnection, Set};
use sea_orm_migration::MigratorTrait;
use serde_json::{Value, json};
use tower::ServiceExt;

use spendwise_api::{AppState, create_router};
use spendwise_core::auth::UserRole;
use spendwise_db::entities::users;
use spendwise_db::migration::Migrator;
use spendwise_shared::config::CorsConfig;
use spendwise_shared::{JwtConfig, JwtService};

struct TestApp {
    router: Router,
    db: DatabaseConnection,
    jwt: Arc<JwtService>,
}

impl TestApp {
    async fn new() -> Self {
        let mut options = ConnectOptions::new("sqlite::memory:");
        options
            .max_connections(1)
            .min_connections(1)
            .sqlx_logging(false);
        let db = Database::connect(options)
            .await
            .expect("Failed to connect to in-memory database");
        Migrator::up(&db, None)
            .await
            .expect("Failed to run migrations");

        let jwt = Arc::new(JwtService::new(JwtConfig {
            secret: "test-secret".to_string(),
            access_token_expires_secs: 3600,
        }));
        let state = AppState {
            db: Arc::new(db.clone()),
            jwt_service: Arc::clone(&jwt),
        };

        Self {
            router: create_router(state, &CorsConfig::default()),
            db,
            jwt,
        }
    }

    /// Inserts a user directly and returns `(id, bearer token)`.
    async fn user(&self, email: &str, role: UserRole) -> (i32, String) {
        let now = Utc::now();
        let user = users::ActiveModel {
            name: Set(email.to_string()),
            email: Set(email.to_string()),
            password_hash: Set("unused".to_string()),
            role: Set(role.into()),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&self.db)
        .await
        .expect("Failed to seed user");

        let token = self
            .jwt
            .generate_access_token(user.id, role.as_str())
            .expect("Failed to issue token");
        (user.id, token)
    }

    async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("Failed to build request");

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Router failed");
        let status = response.status();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to read body")
            .to_bytes();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, value)
    }

    async fn create_expense(&self, token: &str, body: Value) -> Value {
        let (status, expense) = self
            .send(Method::POST, "/api/expenses", Some(token), Some(body))
            .await;
        assert_eq!(status, StatusCode::OK, "create failed: {expense}");
        expense
    }
}

#[rstest]
#[case("/")]
#[case("/health")]
#[case("/api")]
#[tokio::test]
async fn test_informational_endpoints(#[case] uri: &str) {
    let app = TestApp::new().await;

    let (status, body) = app.send(Method::GET, uri, None, None).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.is_object());
    if uri == "/health" {
        assert_eq!(body["status"], "healthy");
    }
}

#[rstest]
#[case(Method::GET, "/api/expenses/abc")]
#[case(Method::PUT, "/api/users/not-a-number")]
#[case(Method::DELETE, "/api/expenses/1.5")]
#[case(Method::POST, "/api/approvals/99999999999")]
#[tokio::test]
async fn test_malformed_id_is_json_bad_request(#[case] method: Method, #[case] uri: &str) {
    let app = TestApp::new().await;
    let (_, admin) = app.user("admin@example.com", UserRole::Admin).await;

    let (status, body) = app
        .send(method, uri, Some(&admin), Some(json!({ "status": "Approved" })))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid_path");
    assert!(body["message"].is_string());
}

#[tokio::test]
async fn test_protected_routes_require_token() {
    let app = TestApp::new().await;

    let (status, body) = app.send(Method::GET, "/api/expenses/mine", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "missing_token");

    let (status, body) = app
        .send(Method::GET, "/api/expenses/mine", Some("not-a-jwt"), None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "invalid_token");
}

#[tokio::test]
async fn test_token_for_deleted_user_is_rejected() {
    let app = TestApp::new().await;
    let (_, admin) = app.user("admin@example.com", UserRole::Admin).await;
    let (alice_id, alice) = app.user("alice@example.com", UserRole::Employee).await;

    let (status, _) = app
        .send(Method::DELETE, &format!("/api/users/{alice_id}"), Some(&admin), None)
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app.send(Method::GET, "/api/auth/me", Some(&alice), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_register_login_me() {
    let app = TestApp::new().await;
    let credentials = json!({
        "name": "Erin",
        "email": "erin@example.com",
        "password": "correct horse"
    });

    let (status, user) = app
        .send(Method::POST, "/api/auth/register", None, Some(credentials.clone()))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(user["role"], "Employee");
    assert!(user.get("password_hash").is_none());

    let (status, body) = app
        .send(Method::POST, "/api/auth/register", None, Some(credentials))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "email_taken");

    let (status, body) = app
        .send(
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({ "email": "erin@example.com", "password": "wrong password" })),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "invalid_credentials");

    let (status, login) = app
        .send(
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({ "email": "erin@example.com", "password": "correct horse" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(login["token_type"], "Bearer");
    assert_eq!(login["user"]["email"], "erin@example.com");

    let token = login["access_token"].as_str().expect("token missing");
    let (status, me) = app.send(Method::GET, "/api/auth/me", Some(token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["id"], user["id"]);
}

#[tokio::test]
async fn test_register_validates_payload() {
    let app = TestApp::new().await;

    let (status, body) = app
        .send(
            Method::POST,
            "/api/auth/register",
            None,
            Some(json!({ "name": "Short", "email": "not-an-email", "password": "short" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation_error");
}

#[tokio::test]
async fn test_submit_and_approve_expense() {
    let app = TestApp::new().await;
    let (alice_id, alice) = app.user("alice@example.com", UserRole::Employee).await;
    let (_, manager) = app.user("mgr@example.com", UserRole::Manager).await;

    let expense = app
        .create_expense(
            &alice,
            json!({ "amount": 42.50, "description": "Team lunch", "status": "Approved" }),
        )
        .await;
    assert_eq!(expense["status"], "Pending");
    assert_eq!(expense["amount"], json!(42.5));
    assert_eq!(expense["currency"], "USD");
    assert_eq!(expense["owner_id"], alice_id);
    let id = expense["id"].as_i64().expect("id missing");

    let (status, pending) = app
        .send(Method::GET, "/api/approvals/pending", Some(&manager), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(pending.as_array().map(Vec::len), Some(1));
    assert_eq!(pending[0]["id"], id);

    let (status, decision) = app
        .send(
            Method::POST,
            &format!("/api/approvals/{id}"),
            Some(&manager),
            Some(json!({ "status": "Approved" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(decision["message"], "Expense approved successfully");
    assert_eq!(decision["expense"]["status"], "Approved");

    let (_, pending) = app
        .send(Method::GET, "/api/approvals/pending", Some(&manager), None)
        .await;
    assert_eq!(pending, json!([]));
}

#[tokio::test]
async fn test_decided_expense_cannot_be_reversed() {
    let app = TestApp::new().await;
    let (_, alice) = app.user("alice@example.com", UserRole::Employee).await;
    let (_, admin) = app.user("admin@example.com", UserRole::Admin).await;
    let expense = app
        .create_expense(&alice, json!({ "amount": 10, "description": "Taxi" }))
        .await;
    let uri = format!("/api/approvals/{}", expense["id"]);

    let (status, _) = app
        .send(Method::POST, &uri, Some(&admin), Some(json!({ "status": "Approved" })))
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app
        .send(
            Method::POST,
            &uri,
            Some(&admin),
            Some(json!({ "status": "Rejected", "comments": "changed my mind" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["message"],
        "Expense is already Approved. Cannot change status."
    );

    let (_, current) = app
        .send(
            Method::GET,
            &format!("/api/expenses/{}", expense["id"]),
            Some(&alice),
            None,
        )
        .await;
    assert_eq!(current["status"], "Approved");
}

#[tokio::test]
async fn test_reject_with_comments() {
    let app = TestApp::new().await;
    let (_, alice) = app.user("alice@example.com", UserRole::Employee).await;
    let (_, manager) = app.user("mgr@example.com", UserRole::Manager).await;
    let expense = app
        .create_expense(&alice, json!({ "amount": "99.99", "currency": "EUR", "description": "Gadget" }))
        .await;

    let (status, body) = app
        .send(
            Method::POST,
            &format!("/api/approvals/{}", expense["id"]),
            Some(&manager),
            Some(json!({ "status": "Rejected", "comments": "no receipt" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["message"],
        "Expense rejected successfully with comments: no receipt"
    );
    assert_eq!(body["expense"]["status"], "Rejected");
    assert_eq!(body["expense"]["currency"], "EUR");
}

#[rstest]
#[case("/api/approvals/pending")]
#[case("/api/approvals")]
#[case("/api/approvals/")]
#[tokio::test]
async fn test_approval_lists_forbid_employees(#[case] uri: &str) {
    let app = TestApp::new().await;
    let (_, alice) = app.user("alice@example.com", UserRole::Employee).await;

    let (status, body) = app.send(Method::GET, uri, Some(&alice), None).await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(
        body["message"],
        "Access denied. Manager or Admin privileges required."
    );
}

#[tokio::test]
async fn test_employee_cannot_decide() {
    let app = TestApp::new().await;
    let (_, alice) = app.user("alice@example.com", UserRole::Employee).await;
    let expense = app
        .create_expense(&alice, json!({ "amount": 5, "description": "Coffee" }))
        .await;

    let (status, _) = app
        .send(
            Method::POST,
            &format!("/api/approvals/{}", expense["id"]),
            Some(&alice),
            Some(json!({ "status": "Approved" })),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (_, current) = app
        .send(
            Method::GET,
            &format!("/api/expenses/{}", expense["id"]),
            Some(&alice),
            None,
        )
        .await;
    assert_eq!(current["status"], "Pending");
}

#[tokio::test]
async fn test_invalid_decision_and_missing_expense() {
    let app = TestApp::new().await;
    let (_, manager) = app.user("mgr@example.com", UserRole::Manager).await;

    let (status, body) = app
        .send(
            Method::POST,
            "/api/approvals/999999",
            Some(&manager),
            Some(json!({ "status": "Maybe" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid_status");

    let (status, _) = app
        .send(
            Method::POST,
            "/api/approvals/999999",
            Some(&manager),
            Some(json!({})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = app
        .send(
            Method::POST,
            "/api/approvals/999999",
            Some(&manager),
            Some(json!({ "status": "Approved" })),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Expense not found");
}

#[tokio::test]
async fn test_get_unknown_expense_is_not_found() {
    let app = TestApp::new().await;
    let (_, alice) = app.user("alice@example.com", UserRole::Employee).await;

    let (status, body) = app
        .send(Method::GET, "/api/expenses/999999", Some(&alice), None)
        .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "not_found");
}

#[tokio::test]
async fn test_update_description_only() {
    let app = TestApp::new().await;
    let (_, alice) = app.user("alice@example.com", UserRole::Employee).await;
    let expense = app
        .create_expense(&alice, json!({ "amount": 42.50, "description": "Team lunch" }))
        .await;

    let (status, updated) = app
        .send(
            Method::PUT,
            &format!("/api/expenses/{}", expense["id"]),
            Some(&alice),
            Some(json!({ "description": "Client lunch" })),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["description"], "Client lunch");
    assert_eq!(updated["amount"], expense["amount"]);
    assert_eq!(updated["currency"], expense["currency"]);
    assert_eq!(updated["date"], expense["date"]);
    assert_eq!(updated["status"], "Pending");
}

#[tokio::test]
async fn test_update_status_by_employee_is_forbidden() {
    let app = TestApp::new().await;
    let (_, alice) = app.user("alice@example.com", UserRole::Employee).await;
    let expense = app
        .create_expense(&alice, json!({ "amount": 42.50, "description": "Team lunch" }))
        .await;

    let (status, _) = app
        .send(
            Method::PUT,
            &format!("/api/expenses/{}", expense["id"]),
            Some(&alice),
            Some(json!({ "status": "Approved" })),
        )
        .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_read_others_expense_but_not_delete() {
    let app = TestApp::new().await;
    let (_, alice) = app.user("alice@example.com", UserRole::Employee).await;
    let (_, bob) = app.user("bob@example.com", UserRole::Employee).await;
    let (_, admin) = app.user("admin@example.com", UserRole::Admin).await;
    let expense = app
        .create_expense(&alice, json!({ "amount": 12, "description": "Parking" }))
        .await;
    let uri = format!("/api/expenses/{}", expense["id"]);

    let (status, _) = app.send(Method::GET, &uri, Some(&bob), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app.send(Method::DELETE, &uri, Some(&bob), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(
        body["message"],
        "Access denied. You can only modify your own expenses."
    );

    let (status, body) = app.send(Method::DELETE, &uri, Some(&admin), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Expense deleted successfully");

    let (status, _) = app.send(Method::GET, &uri, Some(&alice), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_list_mine_and_all() {
    let app = TestApp::new().await;
    let (_, alice) = app.user("alice@example.com", UserRole::Employee).await;
    let (_, bob) = app.user("bob@example.com", UserRole::Employee).await;
    let (_, admin) = app.user("admin@example.com", UserRole::Admin).await;
    app.create_expense(&alice, json!({ "amount": 1, "description": "a" }))
        .await;
    app.create_expense(&bob, json!({ "amount": 2, "description": "b" }))
        .await;

    let (_, mine) = app
        .send(Method::GET, "/api/expenses/mine", Some(&alice), None)
        .await;
    assert_eq!(mine.as_array().map(Vec::len), Some(1));
    assert_eq!(mine[0]["description"], "a");

    let (status, _) = app
        .send(Method::GET, "/api/expenses/all", Some(&alice), None)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, all) = app
        .send(Method::GET, "/api/expenses/all", Some(&admin), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(all.as_array().map(Vec::len), Some(2));
}

#[tokio::test]
async fn test_create_rejects_invalid_fields() {
    let app = TestApp::new().await;
    let (_, alice) = app.user("alice@example.com", UserRole::Employee).await;

    let (status, body) = app
        .send(
            Method::POST,
            "/api/expenses",
            Some(&alice),
            Some(json!({ "amount": -5, "description": "refund" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "negative_amount");

    let (status, body) = app
        .send(
            Method::POST,
            "/api/expenses",
            Some(&alice),
            Some(json!({ "amount": 5, "currency": "DOLLARS", "description": "x" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid_currency");
}

#[tokio::test]
async fn test_user_management() {
    let app = TestApp::new().await;
    let (_, admin) = app.user("admin@example.com", UserRole::Admin).await;
    let (alice_id, alice) = app.user("alice@example.com", UserRole::Employee).await;

    let (status, created) = app
        .send(
            Method::POST,
            "/api/users",
            Some(&admin),
            Some(json!({
                "name": "Morgan",
                "email": "morgan@example.com",
                "password": "long enough",
                "role": "Manager"
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["role"], "Manager");

    let (status, _) = app
        .send(
            Method::POST,
            "/api/users",
            Some(&alice),
            Some(json!({
                "name": "Sneaky",
                "email": "sneaky@example.com",
                "password": "long enough"
            })),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, page) = app
        .send(Method::GET, "/api/users?skip=1&limit=1", Some(&admin), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["meta"], json!({ "skip": 1, "limit": 1, "total": 3 }));
    assert_eq!(page["data"][0]["email"], "alice@example.com");

    let (status, _) = app.send(Method::GET, "/api/users", Some(&alice), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, me) = app
        .send(Method::GET, &format!("/api/users/{alice_id}"), Some(&alice), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["email"], "alice@example.com");

    let (status, _) = app
        .send(
            Method::GET,
            &format!("/api/users/{}", created["id"]),
            Some(&alice),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, renamed) = app
        .send(
            Method::PUT,
            &format!("/api/users/{alice_id}"),
            Some(&alice),
            Some(json!({ "name": "Alice Liddell" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(renamed["name"], "Alice Liddell");

    let (status, body) = app
        .send(
            Method::PUT,
            &format!("/api/users/{alice_id}"),
            Some(&alice),
            Some(json!({ "email": "morgan@example.com" })),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "email_taken");

    let (status, body) = app
        .send(
            Method::PUT,
            &format!("/api/users/{alice_id}/role"),
            Some(&admin),
            Some(json!({ "role": "Overlord" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid_role");

    let (status, promoted) = app
        .send(
            Method::PUT,
            &format!("/api/users/{alice_id}/role"),
            Some(&admin),
            Some(json!({ "role": "Manager" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(promoted["role"], "Manager");

    // The middleware reads the role from the store, so the old token now reviews.
    let (status, _) = app
        .send(Method::GET, "/api/approvals/pending", Some(&alice), None)
        .await;
    assert_eq!(status, StatusCode::OK);
}

#[rstest]
#[case("short")]
#[case("long enough password")]
#[tokio::test]
async fn test_create_user_checks_role_before_password(#[case] password: &str) {
    let app = TestApp::new().await;
    let (_, alice) = app.user("alice@example.com", UserRole::Employee).await;

    let (status, body) = app
        .send(
            Method::POST,
            "/api/users",
            Some(&alice),
            Some(json!({
                "name": "Sneaky",
                "email": "sneaky@example.com",
                "password": password
            })),
        )
        .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "forbidden");
}

#[tokio::test]
async fn test_delete_user_cascades_expenses() {
    let app = TestApp::new().await;
    let (_, admin) = app.user("admin@example.com", UserRole::Admin).await;
    let (alice_id, alice) = app.user("alice@example.com", UserRole::Employee).await;
    let expense = app
        .create_expense(&alice, json!({ "amount": 3, "description": "Gum" }))
        .await;

    let (status, body) = app
        .send(Method::DELETE, &format!("/api/users/{alice_id}"), Some(&admin), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "User deleted successfully");

    let (status, _) = app
        .send(
            Method::GET,
            &format!("/api/expenses/{}", expense["id"]),
            Some(&admin),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
