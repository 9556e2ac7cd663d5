//! Database seeder for Spendwise development and testing.
//!
//! Seeds one user per role plus a few sample expenses. Safe to run
//! repeatedly: existing users are left alone.
//!
//! Usage: cargo run --bin seeder
//!
//! `SEED_PASSWORD` overrides the shared password of the seeded accounts.

use chrono::Utc;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    Set,
};
use sea_orm_migration::MigratorTrait;

use spendwise_core::auth::{UserRole, hash_password};
use spendwise_db::entities::{expenses, sea_orm_active_enums::ExpenseStatus, users};
use spendwise_db::migration::Migrator;
use spendwise_shared::AppConfig;

const DEFAULT_SEED_PASSWORD: &str = "password123";

const SEED_USERS: [(&str, &str, UserRole); 3] = [
    ("Ada Admin", "admin@spendwise.dev", UserRole::Admin),
    ("Max Manager", "manager@spendwise.dev", UserRole::Manager),
    ("Eve Employee", "employee@spendwise.dev", UserRole::Employee),
];

const SAMPLE_EXPENSES: [(Decimal, &str, &str); 3] = [
    (dec!(42.50), "USD", "Team lunch"),
    (dec!(120.00), "EUR", "Train ticket to client site"),
    (dec!(18.99), "USD", "Office supplies"),
];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load()?;
    let password =
        std::env::var("SEED_PASSWORD").unwrap_or_else(|_| DEFAULT_SEED_PASSWORD.to_string());

    println!("Connecting to database...");
    let db = spendwise_db::connect(&config.database).await?;
    Migrator::up(&db, None).await?;

    println!("Seeding users...");
    let mut employee_id = None;
    for (name, email, role) in SEED_USERS {
        let user = seed_user(&db, name, email, role, &password).await?;
        if role == UserRole::Employee {
            employee_id = Some(user.id);
        }
    }

    if let Some(owner_id) = employee_id {
        println!("Seeding sample expenses...");
        seed_expenses(&db, owner_id).await?;
    }

    println!("Seeding complete!");
    Ok(())
}

/// Inserts a user unless the email is already registered.
async fn seed_user(
    db: &DatabaseConnection,
    name: &str,
    email: &str,
    role: UserRole,
    password: &str,
) -> anyhow::Result<users::Model> {
    if let Some(existing) = users::Entity::find()
        .filter(users::Column::Email.eq(email))
        .one(db)
        .await?
    {
        println!("  {email} already exists, skipping...");
        return Ok(existing);
    }

    let now = Utc::now();
    let user = users::ActiveModel {
        name: Set(name.to_string()),
        email: Set(email.to_string()),
        password_hash: Set(hash_password(password)?),
        role: Set(role.into()),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await?;

    println!("  Created {role} {email} (id {})", user.id);
    Ok(user)
}

/// Gives the employee some Pending expenses if they have none yet.
async fn seed_expenses(db: &DatabaseConnection, owner_id: i32) -> anyhow::Result<()> {
    let existing = expenses::Entity::find()
        .filter(expenses::Column::OwnerId.eq(owner_id))
        .count(db)
        .await?;
    if existing > 0 {
        println!("  Employee already has {existing} expenses, skipping...");
        return Ok(());
    }

    let now = Utc::now();
    for (amount, currency, description) in SAMPLE_EXPENSES {
        expenses::ActiveModel {
            amount: Set(amount),
            currency: Set(currency.to_string()),
            date: Set(now),
            description: Set(description.to_string()),
            status: Set(ExpenseStatus::Pending),
            owner_id: Set(owner_id),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(db)
        .await?;
    }

    println!("  Created {} expenses", SAMPLE_EXPENSES.len());
    Ok(())
}
