//! Token issuer: registration, login, refresh, logout, password lifecycle,
//! and the permission check used by the authorization middleware.

use std::sync::Arc;

use chrono::Utc;
use rand::RngCore;
use serde_json::json;
use tracing::{info, warn};
use uuid::Uuid;

use crate::models::{Organization, RefreshToken, Role, User};
use crate::services::cache::SessionCache;
use crate::services::error::AuthError;
use crate::services::jwt::{AccessTokenClaims, JwtService, TokenResponse};
use crate::services::rbac::{role_allows, Resource};
use crate::services::store::{CredentialStore, DuplicateEmail};
use crate::utils::{hash_password, verify_password, Password, PasswordHashString};

/// Session blobs live this long in the cache.
pub const SESSION_TTL_SECONDS: i64 = 7 * 86_400;

/// Password reset tokens are single-use and expire after an hour.
const PASSWORD_RESET_TTL_SECONDS: i64 = 3_600;

#[derive(Clone)]
pub struct AuthService {
    store: Arc<dyn CredentialStore>,
    cache: Arc<dyn SessionCache>,
    jwt: JwtService,
    bcrypt_cost: u32,
}

impl AuthService {
    pub fn new(
        store: Arc<dyn CredentialStore>,
        cache: Arc<dyn SessionCache>,
        jwt: JwtService,
        bcrypt_cost: u32,
    ) -> Self {
        Self {
            store,
            cache,
            jwt,
            bcrypt_cost,
        }
    }

    /// Register a new user, creating their organization in the same
    /// transaction. The first registrant for an organization becomes
    /// its admin.
    pub async fn register(
        &self,
        email: &str,
        password: &str,
        first_name: &str,
        last_name: &str,
        organization_name: &str,
    ) -> Result<(User, TokenResponse), AuthError> {
        let existing = self
            .store
            .find_user_by_email(email)
            .await
            .map_err(AuthError::Store)?;
        if existing.is_some() {
            return Err(AuthError::EmailAlreadyRegistered);
        }

        let password_hash = hash_password(&Password::new(password.to_string()), self.bcrypt_cost)
            .map_err(AuthError::Internal)?;

        let org = Organization::new(
            organization_name.trim().to_string(),
            Organization::domain_from_email(email),
        );
        let user = User::new(
            email,
            password_hash.into_string(),
            first_name.trim().to_string(),
            last_name.trim().to_string(),
            Role::Admin,
            org.id,
        );

        // The lookup above and this insert are not atomic; a concurrent
        // registration of the same email loses at the unique index and is
        // still reported as a duplicate, not a storage failure.
        self.store
            .create_user_with_organization(&org, &user)
            .await
            .map_err(|e| {
                if e.downcast_ref::<DuplicateEmail>().is_some() {
                    AuthError::EmailAlreadyRegistered
                } else {
                    AuthError::Store(e)
                }
            })?;

        let tokens = self.issue_tokens(&user).await?;

        info!(user_id = %user.id, organization_id = %org.id, "User registered");

        Ok((user, tokens))
    }

    /// Authenticate by email and password.
    ///
    /// Unknown email and wrong password produce the same error. A correct
    /// password against a deactivated account is reported as deactivated
    /// without updating `last_login_at`.
    pub async fn login(&self, email: &str, password: &str) -> Result<(User, TokenResponse), AuthError> {
        let user = self
            .store
            .find_user_by_email(email)
            .await
            .map_err(AuthError::Store)?
            .ok_or(AuthError::InvalidCredentials)?;

        if !user.is_active {
            return Err(AuthError::AccountDeactivated);
        }

        verify_password(
            &Password::new(password.to_string()),
            &PasswordHashString::new(user.password_hash.clone()),
        )
        .map_err(|_| AuthError::InvalidCredentials)?;

        self.store
            .update_last_login(user.id)
            .await
            .map_err(AuthError::Store)?;

        let tokens = self.issue_tokens(&user).await?;

        // Auxiliary session blob for introspection and bulk logout. Loss
        // of this entry does not invalidate the tokens themselves.
        let session_key = format!("session:{}:{}", user.id, Utc::now().timestamp());
        let session = json!({
            "userId": user.id,
            "email": user.email,
            "role": user.role,
            "organizationId": user.organization_id,
        });
        if let Err(e) = self
            .cache
            .set(&session_key, &session.to_string(), SESSION_TTL_SECONDS)
            .await
        {
            warn!(user_id = %user.id, error = %e, "Failed to write session blob");
        }

        info!(user_id = %user.id, "User logged in");

        Ok((user, tokens))
    }

    /// Exchange a valid refresh token for a new token pair.
    ///
    /// The new pair is issued additively; the presented token stays valid
    /// until its own expiry or an explicit logout, so concurrent devices
    /// do not revoke each other.
    pub async fn refresh_token(&self, raw_token: &str) -> Result<TokenResponse, AuthError> {
        let claims = self
            .jwt
            .validate_refresh_token(raw_token)
            .map_err(|_| AuthError::InvalidToken)?;

        let token_hash = RefreshToken::hash_token(raw_token);
        let record = self
            .store
            .find_refresh_token_by_hash(&token_hash)
            .await
            .map_err(AuthError::Store)?
            .ok_or(AuthError::InvalidToken)?;

        // Signed expiry and stored expiry both gate the exchange; a row
        // left behind past its expiry is as dead as a revoked one.
        if record.is_expired() || record.user_id != claims.sub {
            return Err(AuthError::InvalidToken);
        }

        let user = self
            .store
            .find_user_by_id(record.user_id)
            .await
            .map_err(AuthError::Store)?
            .ok_or(AuthError::InvalidToken)?;

        if !user.is_active {
            return Err(AuthError::InvalidToken);
        }

        self.issue_tokens(&user).await
    }

    /// Revoke a single refresh token, or all of the user's refresh tokens
    /// when none is presented. Session blobs are cleared either way.
    pub async fn logout(&self, user_id: Uuid, raw_token: Option<&str>) -> Result<(), AuthError> {
        match raw_token {
            Some(token) => {
                let token_hash = RefreshToken::hash_token(token);
                self.store
                    .delete_refresh_token(user_id, &token_hash)
                    .await
                    .map_err(AuthError::Store)?;
            }
            None => {
                self.store
                    .delete_all_refresh_tokens(user_id)
                    .await
                    .map_err(AuthError::Store)?;
            }
        }

        let prefix = format!("session:{}:", user_id);
        if let Err(e) = self.cache.delete_prefix(&prefix).await {
            warn!(user_id = %user_id, error = %e, "Failed to clear session blobs");
        }

        info!(user_id = %user_id, "User logged out");

        Ok(())
    }

    /// Validate an access token and load its user. Tokens for missing or
    /// deactivated users are rejected even when the signature is good.
    pub async fn verify_token(&self, token: &str) -> Result<(AccessTokenClaims, User), AuthError> {
        let claims = self
            .jwt
            .validate_access_token(token)
            .map_err(|_| AuthError::InvalidToken)?;

        let user = self
            .store
            .find_user_by_id(claims.sub)
            .await
            .map_err(AuthError::Store)?
            .ok_or(AuthError::InvalidToken)?;

        if !user.is_active {
            return Err(AuthError::InvalidToken);
        }

        Ok((claims, user))
    }

    /// Change the password of an authenticated user. All refresh tokens
    /// are revoked; the user must log in again on every device.
    pub async fn change_password(
        &self,
        user_id: Uuid,
        current_password: &str,
        new_password: &str,
    ) -> Result<(), AuthError> {
        let user = self
            .store
            .find_user_by_id(user_id)
            .await
            .map_err(AuthError::Store)?
            .ok_or(AuthError::UserNotFound)?;

        verify_password(
            &Password::new(current_password.to_string()),
            &PasswordHashString::new(user.password_hash.clone()),
        )
        .map_err(|_| AuthError::InvalidCredentials)?;

        let new_hash = hash_password(&Password::new(new_password.to_string()), self.bcrypt_cost)
            .map_err(AuthError::Internal)?;

        self.store
            .update_password_hash(user_id, new_hash.as_str())
            .await
            .map_err(AuthError::Store)?;

        self.store
            .delete_all_refresh_tokens(user_id)
            .await
            .map_err(AuthError::Store)?;

        info!(user_id = %user_id, "Password changed");

        Ok(())
    }

    /// Start a password reset. Always succeeds from the caller's view so
    /// the endpoint cannot confirm whether an email is registered. The
    /// raw reset token is returned for delivery out of band.
    pub async fn request_password_reset(&self, email: &str) -> Result<Option<String>, AuthError> {
        let user = match self
            .store
            .find_user_by_email(email)
            .await
            .map_err(AuthError::Store)?
        {
            Some(user) => user,
            None => return Ok(None),
        };

        let mut bytes = [0u8; 32];
        rand::thread_rng().fill_bytes(&mut bytes);
        let token = hex::encode(bytes);

        self.cache
            .set(
                &format!("password_reset:{}", token),
                &user.id.to_string(),
                PASSWORD_RESET_TTL_SECONDS,
            )
            .await
            .map_err(AuthError::Cache)?;

        info!(user_id = %user.id, "Password reset requested");

        Ok(Some(token))
    }

    /// Complete a password reset with a token from
    /// [`request_password_reset`]. The token entry is deleted before the
    /// hash update, so each token redeems at most once.
    pub async fn confirm_password_reset(
        &self,
        token: &str,
        new_password: &str,
    ) -> Result<(), AuthError> {
        let key = format!("password_reset:{}", token);
        let user_id = self
            .cache
            .get(&key)
            .await
            .map_err(AuthError::Cache)?
            .ok_or(AuthError::InvalidOrExpiredToken)?;

        self.cache.delete(&key).await.map_err(AuthError::Cache)?;

        let user_id = user_id
            .parse::<Uuid>()
            .map_err(|_| AuthError::InvalidOrExpiredToken)?;

        let user = self
            .store
            .find_user_by_id(user_id)
            .await
            .map_err(AuthError::Store)?
            .ok_or(AuthError::InvalidOrExpiredToken)?;

        let new_hash = hash_password(&Password::new(new_password.to_string()), self.bcrypt_cost)
            .map_err(AuthError::Internal)?;

        self.store
            .update_password_hash(user.id, new_hash.as_str())
            .await
            .map_err(AuthError::Store)?;

        self.store
            .delete_all_refresh_tokens(user.id)
            .await
            .map_err(AuthError::Store)?;

        info!(user_id = %user.id, "Password reset completed");

        Ok(())
    }

    /// Load a user by id for profile reads.
    pub async fn get_user(&self, user_id: Uuid) -> Result<User, AuthError> {
        self.store
            .find_user_by_id(user_id)
            .await
            .map_err(AuthError::Store)?
            .ok_or(AuthError::UserNotFound)
    }

    /// Authorization check: does the user's role allow `action` on
    /// `resource`? Any missing link (unknown user, deactivated account,
    /// unparseable role) denies rather than errors.
    pub async fn has_permission(
        &self,
        user_id: Uuid,
        resource: Resource,
        action: &str,
    ) -> Result<bool, AuthError> {
        let user = match self
            .store
            .find_user_by_id(user_id)
            .await
            .map_err(AuthError::Store)?
        {
            Some(user) if user.is_active => user,
            _ => return Ok(false),
        };

        let Some(role) = user.role() else {
            return Ok(false);
        };

        Ok(role_allows(role, resource, action))
    }

    pub fn jwt(&self) -> &JwtService {
        &self.jwt
    }

    async fn issue_tokens(&self, user: &User) -> Result<TokenResponse, AuthError> {
        let access_token = self
            .jwt
            .generate_access_token(user)
            .map_err(AuthError::Internal)?;
        let refresh_token = self
            .jwt
            .generate_refresh_token(user.id)
            .map_err(AuthError::Internal)?;

        let record = RefreshToken::new(
            user.id,
            &refresh_token,
            self.jwt.refresh_token_expiry_seconds(),
        );
        self.store
            .insert_refresh_token(&record)
            .await
            .map_err(AuthError::Store)?;

        Ok(TokenResponse {
            access_token,
            refresh_token,
            token_type: "Bearer".to_string(),
            expires_in: self.jwt.access_token_expiry_seconds(),
        })
    }
}
