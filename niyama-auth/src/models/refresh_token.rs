use chrono::{DateTime, Duration, Utc};
use sha2::{Digest, Sha256};
use sqlx::FromRow;
use uuid::Uuid;

/// Refresh token record. Only the SHA-256 hash of the raw token is ever
/// persisted, so a leaked table cannot be replayed. Revocation is achieved
/// by deleting the row, independent of the token's embedded expiry.
///
/// Multiple rows may coexist per user (multi-device sessions).
#[derive(Debug, Clone, FromRow)]
pub struct RefreshToken {
    pub id: Uuid,
    pub user_id: Uuid,
    pub token_hash: String,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl RefreshToken {
    /// Create a record for a freshly minted raw token.
    pub fn new(user_id: Uuid, token: &str, expires_in_seconds: i64) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id,
            token_hash: Self::hash_token(token),
            expires_at: now + Duration::seconds(expires_in_seconds),
            created_at: now,
        }
    }

    /// Hash a raw token using SHA-256.
    pub fn hash_token(token: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(token.as_bytes());
        hex::encode(hasher.finalize())
    }

    pub fn is_expired(&self) -> bool {
        Utc::now() > self.expires_at
    }
}
