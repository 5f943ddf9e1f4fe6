use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::JwtConfig;
use crate::models::User;
use crate::utils::parse_duration_seconds;

/// JWT service for token generation and validation.
///
/// Signs with HS256 from the shared `JWT_SECRET`. Expiry windows come from
/// the human-readable duration strings in config.
#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    access_expiry_seconds: i64,
    refresh_expiry_seconds: i64,
}

/// Claims for access tokens (short-lived). These are the authoritative
/// identity claims; the session blob in the cache is auxiliary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessTokenClaims {
    /// Subject (user ID)
    pub sub: Uuid,
    pub email: String,
    pub role: String,
    pub organization_id: Uuid,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issued at (Unix timestamp)
    pub iat: i64,
}

/// Claims for refresh tokens (long-lived). The `type` discriminator keeps
/// an access token from being replayed against the refresh endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshTokenClaims {
    /// Subject (user ID)
    pub sub: Uuid,
    /// Token ID. Makes every minted token unique, so two tokens issued to
    /// the same user within one second still hash to distinct rows.
    pub jti: Uuid,
    #[serde(rename = "type")]
    pub token_type: String,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issued at (Unix timestamp)
    pub iat: i64,
}

/// Token pair returned to the client.
#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

const REFRESH_TOKEN_TYPE: &str = "refresh";

impl JwtService {
    pub fn new(config: &JwtConfig) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.secret.as_bytes()),
            access_expiry_seconds: parse_duration_seconds(&config.expires_in),
            refresh_expiry_seconds: parse_duration_seconds(&config.refresh_expires_in),
        }
    }

    /// Generate an access token carrying the user's identity claims.
    pub fn generate_access_token(&self, user: &User) -> Result<String, anyhow::Error> {
        let now = Utc::now().timestamp();

        let claims = AccessTokenClaims {
            sub: user.id,
            email: user.email.clone(),
            role: user.role.clone(),
            organization_id: user.organization_id,
            exp: now + self.access_expiry_seconds,
            iat: now,
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| anyhow::anyhow!("Failed to encode access token: {}", e))?;

        Ok(token)
    }

    /// Generate a refresh token for a user.
    pub fn generate_refresh_token(&self, user_id: Uuid) -> Result<String, anyhow::Error> {
        let now = Utc::now().timestamp();

        let claims = RefreshTokenClaims {
            sub: user_id,
            jti: Uuid::new_v4(),
            token_type: REFRESH_TOKEN_TYPE.to_string(),
            exp: now + self.refresh_expiry_seconds,
            iat: now,
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| anyhow::anyhow!("Failed to encode refresh token: {}", e))?;

        Ok(token)
    }

    /// Validate and decode an access token.
    pub fn validate_access_token(&self, token: &str) -> Result<AccessTokenClaims, anyhow::Error> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = 0;

        let token_data = decode::<AccessTokenClaims>(token, &self.decoding_key, &validation)
            .map_err(|e| anyhow::anyhow!("Invalid access token: {}", e))?;

        Ok(token_data.claims)
    }

    /// Validate and decode a refresh token, rejecting any payload whose
    /// `type` is not `refresh`.
    pub fn validate_refresh_token(&self, token: &str) -> Result<RefreshTokenClaims, anyhow::Error> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = 0;

        let token_data = decode::<RefreshTokenClaims>(token, &self.decoding_key, &validation)
            .map_err(|e| anyhow::anyhow!("Invalid refresh token: {}", e))?;

        if token_data.claims.token_type != REFRESH_TOKEN_TYPE {
            return Err(anyhow::anyhow!("Not a refresh token"));
        }

        Ok(token_data.claims)
    }

    /// Access token expiry in seconds (for the `expires_in` response field).
    pub fn access_token_expiry_seconds(&self) -> i64 {
        self.access_expiry_seconds
    }

    /// Refresh token expiry in seconds (for the stored row's `expires_at`).
    pub fn refresh_token_expiry_seconds(&self) -> i64 {
        self.refresh_expiry_seconds
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Role;

    fn test_service() -> JwtService {
        JwtService::new(&JwtConfig {
            secret: "test-secret-that-is-long-enough-for-tests".to_string(),
            expires_in: "15m".to_string(),
            refresh_expires_in: "7d".to_string(),
        })
    }

    fn test_user() -> User {
        User::new(
            "test@example.com",
            "hash".to_string(),
            "Test".to_string(),
            "User".to_string(),
            Role::Admin,
            Uuid::new_v4(),
        )
    }

    #[test]
    fn test_expiry_windows_parse_from_duration_strings() {
        let service = test_service();
        assert_eq!(service.access_token_expiry_seconds(), 900);
        assert_eq!(service.refresh_token_expiry_seconds(), 604_800);
    }

    #[test]
    fn test_access_token_round_trip() {
        let service = test_service();
        let user = test_user();

        let token = service.generate_access_token(&user).unwrap();
        let claims = service.validate_access_token(&token).unwrap();

        assert_eq!(claims.sub, user.id);
        assert_eq!(claims.email, "test@example.com");
        assert_eq!(claims.role, "admin");
        assert_eq!(claims.organization_id, user.organization_id);
    }

    #[test]
    fn test_refresh_token_round_trip() {
        let service = test_service();
        let user_id = Uuid::new_v4();

        let token = service.generate_refresh_token(user_id).unwrap();
        let claims = service.validate_refresh_token(&token).unwrap();

        assert_eq!(claims.sub, user_id);
        assert_eq!(claims.token_type, "refresh");
    }

    #[test]
    fn test_access_token_rejected_by_refresh_validation() {
        // An access-style payload has no `type` claim and must not pass the
        // refresh path.
        let service = test_service();
        let token = service.generate_access_token(&test_user()).unwrap();

        assert!(service.validate_refresh_token(&token).is_err());
    }

    #[test]
    fn test_refresh_token_rejected_by_access_validation_on_wrong_secret() {
        let service = test_service();
        let other = JwtService::new(&JwtConfig {
            secret: "a-completely-different-secret-value".to_string(),
            expires_in: "15m".to_string(),
            refresh_expires_in: "7d".to_string(),
        });

        let token = service.generate_access_token(&test_user()).unwrap();
        assert!(other.validate_access_token(&token).is_err());
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let service = test_service();
        let user = test_user();
        let now = Utc::now().timestamp();

        let claims = AccessTokenClaims {
            sub: user.id,
            email: user.email.clone(),
            role: user.role.clone(),
            organization_id: user.organization_id,
            exp: now - 3600,
            iat: now - 7200,
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(b"test-secret-that-is-long-enough-for-tests"),
        )
        .unwrap();

        assert!(service.validate_access_token(&token).is_err());
    }
}
