//! Credential store: Postgres persistence for organizations, users, and
//! refresh-token hashes.
//!
//! The trait seam lets integration tests run against [`MemoryStore`]
//! without a live database.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::postgres::PgPool;
use std::collections::HashMap;
use std::sync::Mutex;
use uuid::Uuid;

use crate::models::{Organization, RefreshToken, User};

/// Marker for a unique-email violation raised by
/// [`CredentialStore::create_user_with_organization`]. Two concurrent
/// registrations can both pass the pre-insert lookup; the loser's insert
/// surfaces as this error so the caller can report a duplicate instead of
/// a storage failure.
#[derive(Debug, thiserror::Error)]
#[error("Email already registered")]
pub struct DuplicateEmail;

#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, anyhow::Error>;
    async fn find_user_by_id(&self, user_id: Uuid) -> Result<Option<User>, anyhow::Error>;
    async fn find_organization_by_id(
        &self,
        org_id: Uuid,
    ) -> Result<Option<Organization>, anyhow::Error>;

    /// Insert a new organization and its first user in ONE transaction.
    /// Partial failure must leave neither row behind.
    async fn create_user_with_organization(
        &self,
        org: &Organization,
        user: &User,
    ) -> Result<(), anyhow::Error>;

    async fn update_last_login(&self, user_id: Uuid) -> Result<(), anyhow::Error>;
    async fn update_password_hash(&self, user_id: Uuid, hash: &str) -> Result<(), anyhow::Error>;

    async fn insert_refresh_token(&self, token: &RefreshToken) -> Result<(), anyhow::Error>;
    async fn find_refresh_token_by_hash(
        &self,
        token_hash: &str,
    ) -> Result<Option<RefreshToken>, anyhow::Error>;
    async fn delete_refresh_token(
        &self,
        user_id: Uuid,
        token_hash: &str,
    ) -> Result<u64, anyhow::Error>;
    async fn delete_all_refresh_tokens(&self, user_id: Uuid) -> Result<u64, anyhow::Error>;

    async fn health_check(&self) -> Result<(), anyhow::Error>;
}

/// Postgres-backed credential store.
#[derive(Clone)]
pub struct PgCredentialStore {
    pool: PgPool,
}

impl PgCredentialStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl CredentialStore for PgCredentialStore {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, anyhow::Error> {
        let user =
            sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = LOWER($1)")
                .bind(email)
                .fetch_optional(&self.pool)
                .await?;
        Ok(user)
    }

    async fn find_user_by_id(&self, user_id: Uuid) -> Result<Option<User>, anyhow::Error> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn find_organization_by_id(
        &self,
        org_id: Uuid,
    ) -> Result<Option<Organization>, anyhow::Error> {
        let org =
            sqlx::query_as::<_, Organization>("SELECT * FROM organizations WHERE id = $1")
                .bind(org_id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(org)
    }

    async fn create_user_with_organization(
        &self,
        org: &Organization,
        user: &User,
    ) -> Result<(), anyhow::Error> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO organizations (id, name, domain, plan_tier, settings, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(org.id)
        .bind(&org.name)
        .bind(&org.domain)
        .bind(&org.plan_tier)
        .bind(&org.settings)
        .bind(org.created_at)
        .bind(org.updated_at)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO users
                (id, email, password_hash, first_name, last_name, role,
                 organization_id, is_active, last_login_at, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(user.id)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.role)
        .bind(user.organization_id)
        .bind(user.is_active)
        .bind(user.last_login_at)
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            if e.as_database_error().is_some_and(|d| d.is_unique_violation()) {
                anyhow::Error::new(DuplicateEmail)
            } else {
                anyhow::Error::new(e)
            }
        })?;

        tx.commit().await?;
        Ok(())
    }

    async fn update_last_login(&self, user_id: Uuid) -> Result<(), anyhow::Error> {
        sqlx::query("UPDATE users SET last_login_at = NOW(), updated_at = NOW() WHERE id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn update_password_hash(&self, user_id: Uuid, hash: &str) -> Result<(), anyhow::Error> {
        sqlx::query("UPDATE users SET password_hash = $2, updated_at = NOW() WHERE id = $1")
            .bind(user_id)
            .bind(hash)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn insert_refresh_token(&self, token: &RefreshToken) -> Result<(), anyhow::Error> {
        sqlx::query(
            r#"
            INSERT INTO refresh_tokens (id, user_id, token_hash, expires_at, created_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(token.id)
        .bind(token.user_id)
        .bind(&token.token_hash)
        .bind(token.expires_at)
        .bind(token.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find_refresh_token_by_hash(
        &self,
        token_hash: &str,
    ) -> Result<Option<RefreshToken>, anyhow::Error> {
        let token = sqlx::query_as::<_, RefreshToken>(
            "SELECT * FROM refresh_tokens WHERE token_hash = $1",
        )
        .bind(token_hash)
        .fetch_optional(&self.pool)
        .await?;
        Ok(token)
    }

    async fn delete_refresh_token(
        &self,
        user_id: Uuid,
        token_hash: &str,
    ) -> Result<u64, anyhow::Error> {
        let result =
            sqlx::query("DELETE FROM refresh_tokens WHERE user_id = $1 AND token_hash = $2")
                .bind(user_id)
                .bind(token_hash)
                .execute(&self.pool)
                .await?;
        Ok(result.rows_affected())
    }

    async fn delete_all_refresh_tokens(&self, user_id: Uuid) -> Result<u64, anyhow::Error> {
        let result = sqlx::query("DELETE FROM refresh_tokens WHERE user_id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn health_check(&self) -> Result<(), anyhow::Error> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

/// In-memory credential store used by the test suite.
#[derive(Default)]
pub struct MemoryStore {
    users: Mutex<HashMap<Uuid, User>>,
    organizations: Mutex<HashMap<Uuid, Organization>>,
    refresh_tokens: Mutex<Vec<RefreshToken>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Test helper: insert a user directly, bypassing registration.
    pub fn insert_user(&self, user: User) {
        self.users.lock().unwrap().insert(user.id, user);
    }

    /// Test helper: flip a user's active flag.
    pub fn set_active(&self, user_id: Uuid, active: bool) {
        if let Some(user) = self.users.lock().unwrap().get_mut(&user_id) {
            user.is_active = active;
        }
    }

    /// Test helper: read a user back without going through the trait.
    pub fn get_user(&self, user_id: Uuid) -> Option<User> {
        self.users.lock().unwrap().get(&user_id).cloned()
    }

    /// Test helper: count live refresh-token rows for a user.
    pub fn refresh_token_count(&self, user_id: Uuid) -> usize {
        self.refresh_tokens
            .lock()
            .unwrap()
            .iter()
            .filter(|t| t.user_id == user_id)
            .count()
    }
}

#[async_trait]
impl CredentialStore for MemoryStore {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, anyhow::Error> {
        let email = email.trim().to_lowercase();
        Ok(self
            .users
            .lock()
            .unwrap()
            .values()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn find_user_by_id(&self, user_id: Uuid) -> Result<Option<User>, anyhow::Error> {
        Ok(self.users.lock().unwrap().get(&user_id).cloned())
    }

    async fn find_organization_by_id(
        &self,
        org_id: Uuid,
    ) -> Result<Option<Organization>, anyhow::Error> {
        Ok(self.organizations.lock().unwrap().get(&org_id).cloned())
    }

    async fn create_user_with_organization(
        &self,
        org: &Organization,
        user: &User,
    ) -> Result<(), anyhow::Error> {
        let mut users = self.users.lock().unwrap();
        // Mirrors the unique index on users.email.
        if users.values().any(|u| u.email == user.email) {
            return Err(anyhow::Error::new(DuplicateEmail));
        }
        self.organizations
            .lock()
            .unwrap()
            .insert(org.id, org.clone());
        users.insert(user.id, user.clone());
        Ok(())
    }

    async fn update_last_login(&self, user_id: Uuid) -> Result<(), anyhow::Error> {
        if let Some(user) = self.users.lock().unwrap().get_mut(&user_id) {
            user.last_login_at = Some(Utc::now());
            user.updated_at = Utc::now();
        }
        Ok(())
    }

    async fn update_password_hash(&self, user_id: Uuid, hash: &str) -> Result<(), anyhow::Error> {
        if let Some(user) = self.users.lock().unwrap().get_mut(&user_id) {
            user.password_hash = hash.to_string();
            user.updated_at = Utc::now();
        }
        Ok(())
    }

    async fn insert_refresh_token(&self, token: &RefreshToken) -> Result<(), anyhow::Error> {
        self.refresh_tokens.lock().unwrap().push(token.clone());
        Ok(())
    }

    async fn find_refresh_token_by_hash(
        &self,
        token_hash: &str,
    ) -> Result<Option<RefreshToken>, anyhow::Error> {
        Ok(self
            .refresh_tokens
            .lock()
            .unwrap()
            .iter()
            .find(|t| t.token_hash == token_hash)
            .cloned())
    }

    async fn delete_refresh_token(
        &self,
        user_id: Uuid,
        token_hash: &str,
    ) -> Result<u64, anyhow::Error> {
        let mut tokens = self.refresh_tokens.lock().unwrap();
        let before = tokens.len();
        tokens.retain(|t| !(t.user_id == user_id && t.token_hash == token_hash));
        Ok((before - tokens.len()) as u64)
    }

    async fn delete_all_refresh_tokens(&self, user_id: Uuid) -> Result<u64, anyhow::Error> {
        let mut tokens = self.refresh_tokens.lock().unwrap();
        let before = tokens.len();
        tokens.retain(|t| t.user_id != user_id);
        Ok((before - tokens.len()) as u64)
    }

    async fn health_check(&self) -> Result<(), anyhow::Error> {
        Ok(())
    }
}
