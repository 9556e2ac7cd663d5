//! Shared fixtures for repository integration tests.
//!
//! Each test gets a fresh in-memory SQLite database with migrations applied.
//! The pool holds a single connection so every query sees the same database.
//! Concurrency tests use [`setup_file_db`] instead, so calls really contend.

#![allow(dead_code)]

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, ConnectOptions, Database, DatabaseConnection, Set};
use sea_orm_migration::MigratorTrait;
use tempfile::TempDir;

use spendwise_core::access::Actor;
use spendwise_core::auth::UserRole;
use spendwise_db::ExpenseRepository;
use spendwise_db::entities::{expenses, users};
use spendwise_db::migration::Migrator;
use spendwise_db::repositories::CreateExpenseInput;

pub async fn setup_db() -> DatabaseConnection {
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
    db
}

/// File-backed database with a multi-connection pool, like the server's.
///
/// The returned directory owns the database file; keep it alive for the
/// whole test.
pub async fn setup_file_db(max_connections: u32) -> (TempDir, DatabaseConnection) {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let url = format!(
        "sqlite://{}?mode=rwc",
        dir.path().join("spendwise.db").display()
    );

    let mut options = ConnectOptions::new(url);
    options
        .max_connections(max_connections)
        .min_connections(1)
        .sqlx_logging(false);

    let db = Database::connect(options)
        .await
        .expect("Failed to connect to file database");
    Migrator::up(&db, None)
        .await
        .expect("Failed to run migrations");
    (dir, db)
}

pub async fn seed_user(db: &DatabaseConnection, email: &str, role: UserRole) -> Actor {
    let now = Utc::now();
    let user = users::ActiveModel {
        name: Set(email.split('@').next().unwrap_or(email).to_string()),
        email: Set(email.to_string()),
        password_hash: Set("$argon2id$test_hash".to_string()),
        role: Set(role.into()),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("Failed to seed user");

    Actor::new(user.id, role)
}

pub async fn seed_expense(
    db: &DatabaseConnection,
    owner: &Actor,
    amount: Decimal,
    description: &str,
) -> expenses::Model {
    ExpenseRepository::new(db.clone())
        .create(
            owner,
            CreateExpenseInput {
                amount,
                currency: None,
                date: None,
                description: description.to_string(),
            },
        )
        .await
        .expect("Failed to seed expense")
}
