//! User repository for database operations.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, SqlErr, TransactionTrait,
};
use thiserror::Error;
use tracing::info;

use spendwise_core::access::{AccessError, Actor, Capability, Resource, authorize};
use spendwise_core::auth::UserRole;
use spendwise_shared::AppError;
use spendwise_shared::types::{PageRequest, PageResponse};

use crate::entities::users;

/// Errors that can occur during user operations.
#[derive(Debug, Error)]
pub enum UserError {
    /// Caller lacks the capability for this operation.
    #[error(transparent)]
    AccessDenied(#[from] AccessError),

    /// User does not exist.
    #[error("User not found")]
    NotFound(i32),

    /// Email is already registered to another user.
    #[error("Email already registered")]
    EmailTaken,

    /// Database error.
    #[error("Database error: {0}")]
    Database(String),
}

impl UserError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::AccessDenied(_) => 403,
            Self::NotFound(_) => 404,
            Self::EmailTaken => 409,
            Self::Database(_) => 500,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::AccessDenied(_) => "forbidden",
            Self::NotFound(_) => "not_found",
            Self::EmailTaken => "email_taken",
            Self::Database(_) => "internal_error",
        }
    }
}

impl From<DbErr> for UserError {
    fn from(e: DbErr) -> Self {
        if let Some(SqlErr::UniqueConstraintViolation(_)) = e.sql_err() {
            return Self::EmailTaken;
        }
        tracing::error!(error = %e, "user query failed");
        Self::Database(e.to_string())
    }
}

impl From<UserError> for AppError {
    fn from(e: UserError) -> Self {
        let message = e.to_string();
        match e {
            UserError::AccessDenied(_) => Self::Forbidden(message),
            UserError::NotFound(_) => Self::NotFound(message),
            UserError::EmailTaken => Self::Conflict(message),
            UserError::Database(detail) => Self::Database(detail),
        }
    }
}

/// Input for inserting a user. The password must already be hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    /// Display name.
    pub name: String,
    /// Unique email.
    pub email: String,
    /// Argon2id PHC string.
    pub password_hash: String,
    /// Initial role.
    pub role: UserRole,
}

/// Partial update for a user. `None` leaves the field untouched.
#[derive(Debug, Clone, Default)]
pub struct UserChanges {
    /// New display name.
    pub name: Option<String>,
    /// New email.
    pub email: Option<String>,
    /// New password hash.
    pub password_hash: Option<String>,
}

/// User repository for CRUD operations.
#[derive(Debug, Clone)]
pub struct UserRepository {
    db: DatabaseConnection,
}

impl UserRepository {
    /// Creates a new user repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Finds a user by email.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_email(&self, email: &str) -> Result<Option<users::Model>, DbErr> {
        users::Entity::find()
            .filter(users::Column::Email.eq(email))
            .one(&self.db)
            .await
    }

    /// Finds a user by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_id(&self, id: i32) -> Result<Option<users::Model>, DbErr> {
        users::Entity::find_by_id(id).one(&self.db).await
    }

    /// Checks if an email is already registered.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn email_exists(&self, email: &str) -> Result<bool, DbErr> {
        email_taken(&self.db, email, None).await
    }

    /// Self-service signup. Always creates an Employee.
    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<users::Model, UserError> {
        self.insert(NewUser {
            name: name.to_string(),
            email: email.to_string(),
            password_hash: password_hash.to_string(),
            role: UserRole::Employee,
        })
        .await
    }

    /// Creates a user with an explicit role. Admin only.
    pub async fn create(&self, actor: &Actor, input: NewUser) -> Result<users::Model, UserError> {
        authorize(actor, Capability::ManageUsers, Resource::Any)?;
        self.insert(input).await
    }

    async fn insert(&self, input: NewUser) -> Result<users::Model, UserError> {
        let txn = self.db.begin().await?;

        if email_taken(&txn, &input.email, None).await? {
            return Err(UserError::EmailTaken);
        }

        let now = Utc::now();
        let user = users::ActiveModel {
            name: Set(input.name),
            email: Set(input.email),
            password_hash: Set(input.password_hash),
            role: Set(input.role.into()),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        txn.commit().await?;

        info!(user_id = user.id, role = ?user.role, "user created");
        Ok(user)
    }

    /// Lists users ordered by id. Admin only.
    pub async fn list(
        &self,
        actor: &Actor,
        page: PageRequest,
    ) -> Result<PageResponse<users::Model>, UserError> {
        authorize(actor, Capability::ManageUsers, Resource::Any)?;

        let total = users::Entity::find().count(&self.db).await?;
        let data = users::Entity::find()
            .order_by_asc(users::Column::Id)
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await?;

        Ok(PageResponse::new(data, page, total))
    }

    /// Gets a user. Self or admin.
    pub async fn get(&self, actor: &Actor, id: i32) -> Result<users::Model, UserError> {
        authorize(actor, Capability::ViewUser, Resource::User { id })?;
        self.find_by_id(id).await?.ok_or(UserError::NotFound(id))
    }

    /// Applies a partial update. Self or admin.
    pub async fn update(
        &self,
        actor: &Actor,
        id: i32,
        changes: UserChanges,
    ) -> Result<users::Model, UserError> {
        authorize(actor, Capability::ModifyUser, Resource::User { id })?;

        let txn = self.db.begin().await?;
        let existing = users::Entity::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or(UserError::NotFound(id))?;

        let mut active: users::ActiveModel = existing.into();

        if let Some(name) = changes.name {
            active.name = Set(name);
        }
        if let Some(email) = changes.email {
            if email_taken(&txn, &email, Some(id)).await? {
                return Err(UserError::EmailTaken);
            }
            active.email = Set(email);
        }
        if let Some(hash) = changes.password_hash {
            active.password_hash = Set(hash);
        }
        active.updated_at = Set(Utc::now());

        let updated = active.update(&txn).await?;
        txn.commit().await?;

        info!(user_id = id, "user updated");
        Ok(updated)
    }

    /// Changes a user's role. Admin only.
    pub async fn change_role(
        &self,
        actor: &Actor,
        id: i32,
        role: UserRole,
    ) -> Result<users::Model, UserError> {
        authorize(actor, Capability::ManageUsers, Resource::Any)?;

        let txn = self.db.begin().await?;
        let existing = users::Entity::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or(UserError::NotFound(id))?;

        let mut active: users::ActiveModel = existing.into();
        active.role = Set(role.into());
        active.updated_at = Set(Utc::now());

        let updated = active.update(&txn).await?;
        txn.commit().await?;

        info!(user_id = id, role = %role, changed_by = actor.user_id, "user role changed");
        Ok(updated)
    }

    /// Deletes a user and, through the foreign key, their expenses. Admin only.
    pub async fn delete(&self, actor: &Actor, id: i32) -> Result<(), UserError> {
        authorize(actor, Capability::ManageUsers, Resource::Any)?;

        let txn = self.db.begin().await?;
        let result = users::Entity::delete_by_id(id).exec(&txn).await?;
        if result.rows_affected == 0 {
            return Err(UserError::NotFound(id));
        }
        txn.commit().await?;

        info!(user_id = id, deleted_by = actor.user_id, "user deleted");
        Ok(())
    }
}

/// Returns true if `email` belongs to a user other than `except`.
async fn email_taken<C: ConnectionTrait>(
    conn: &C,
    email: &str,
    except: Option<i32>,
) -> Result<bool, DbErr> {
    let mut query = users::Entity::find().filter(users::Column::Email.eq(email));
    if let Some(id) = except {
        query = query.filter(users::Column::Id.ne(id));
    }
    Ok(query.count(conn).await? > 0)
}
