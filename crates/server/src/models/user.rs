//! Admin user model and CRUD operations.

use anyhow::{Context, Result};
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Role with full access, including deletes.
pub const ROLE_ADMIN: &str = "admin";

/// Role limited to content management.
pub const ROLE_MANAGER: &str = "manager";

/// Admin panel user record.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: Uuid,
    pub username: String,

    /// Argon2 password hash, never serialized.
    #[serde(skip_serializing)]
    pub pass: String,

    pub email: String,
    pub role: String,
    pub is_active: bool,
    pub last_login: Option<i64>,
    pub created: i64,
    pub changed: i64,
}

/// Input for creating a user.
#[derive(Debug, Deserialize)]
pub struct CreateUser {
    pub username: String,
    pub email: String,
    pub password: String,
    pub role: Option<String>,
}

impl User {
    /// Check if this user holds the admin role.
    pub fn is_admin(&self) -> bool {
        self.role == ROLE_ADMIN
    }

    /// Check if this user may manage catalog content.
    pub fn is_manager(&self) -> bool {
        self.role == ROLE_ADMIN || self.role == ROLE_MANAGER
    }

    /// Find a user by ID.
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>> {
        let user = sqlx::query_as::<_, Self>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
            .context("failed to fetch user by id")?;

        Ok(user)
    }

    /// Find an active user by username or email (login lookup).
    pub async fn find_active_by_login(pool: &PgPool, login: &str) -> Result<Option<Self>> {
        let user = sqlx::query_as::<_, Self>(
            "SELECT * FROM users WHERE (username = $1 OR email = $1) AND is_active = TRUE",
        )
        .bind(login)
        .fetch_optional(pool)
        .await
        .context("failed to fetch user by login")?;

        Ok(user)
    }

    /// Find a user by username or email (duplicate check on registration).
    pub async fn find_by_username_or_email(
        pool: &PgPool,
        username: &str,
        email: &str,
    ) -> Result<Option<Self>> {
        let user =
            sqlx::query_as::<_, Self>("SELECT * FROM users WHERE username = $1 OR email = $2")
                .bind(username)
                .bind(email)
                .fetch_optional(pool)
                .await
                .context("failed to fetch user by username or email")?;

        Ok(user)
    }

    /// Create a new user with a hashed password.
    pub async fn create(pool: &PgPool, input: CreateUser) -> Result<Self> {
        let now = chrono::Utc::now().timestamp();
        let id = Uuid::now_v7();
        let pass = hash_password(&input.password)?;

        let user = sqlx::query_as::<_, Self>(
            r#"
            INSERT INTO users (id, username, email, pass, role, is_active, created, changed)
            VALUES ($1, $2, $3, $4, $5, TRUE, $6, $7)
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&input.username)
        .bind(&input.email)
        .bind(&pass)
        .bind(input.role.as_deref().unwrap_or(ROLE_MANAGER))
        .bind(now)
        .bind(now)
        .fetch_one(pool)
        .await
        .context("failed to create user")?;

        Ok(user)
    }

    /// Record a successful login.
    pub async fn touch_login(pool: &PgPool, id: Uuid) -> Result<()> {
        let now = chrono::Utc::now().timestamp();

        sqlx::query("UPDATE users SET last_login = $1 WHERE id = $2")
            .bind(now)
            .bind(id)
            .execute(pool)
            .await
            .context("failed to record login")?;

        Ok(())
    }

    /// Verify a password against this user's stored hash.
    pub fn verify_password(&self, password: &str) -> bool {
        let Ok(parsed) = PasswordHash::new(&self.pass) else {
            return false;
        };
        Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok()
    }
}

/// Hash a password with Argon2 and a fresh salt.
pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("failed to hash password: {e}"))?;

    Ok(hash.to_string())
}
