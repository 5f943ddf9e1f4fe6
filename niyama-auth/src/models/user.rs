//! User model - organization-scoped identity records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// The fixed role set. Stored as text in the `users` table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    ComplianceOfficer,
    DevSecOpsEngineer,
    PlatformEngineer,
    Viewer,
}

impl Role {
    pub const ALL: [Role; 5] = [
        Role::Admin,
        Role::ComplianceOfficer,
        Role::DevSecOpsEngineer,
        Role::PlatformEngineer,
        Role::Viewer,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::ComplianceOfficer => "compliance_officer",
            Role::DevSecOpsEngineer => "devsecops_engineer",
            Role::PlatformEngineer => "platform_engineer",
            Role::Viewer => "viewer",
        }
    }

    pub fn parse(s: &str) -> Option<Role> {
        match s {
            "admin" => Some(Role::Admin),
            "compliance_officer" => Some(Role::ComplianceOfficer),
            "devsecops_engineer" => Some(Role::DevSecOpsEngineer),
            "platform_engineer" => Some(Role::PlatformEngineer),
            "viewer" => Some(Role::Viewer),
            _ => None,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// User entity. Rows are never physically deleted; deactivation flips
/// `is_active` instead.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub role: String,
    pub organization_id: Uuid,
    pub is_active: bool,
    pub last_login_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Create a new user. The email is case-normalized here so the unique
    /// constraint in the store holds regardless of input casing.
    pub fn new(
        email: &str,
        password_hash: String,
        first_name: String,
        last_name: String,
        role: Role,
        organization_id: Uuid,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            email: email.trim().to_lowercase(),
            password_hash,
            first_name,
            last_name,
            role: role.as_str().to_string(),
            organization_id,
            is_active: true,
            last_login_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn role(&self) -> Option<Role> {
        Role::parse(&self.role)
    }

    /// Convert to sanitized response (no password hash).
    pub fn sanitized(&self) -> UserResponse {
        UserResponse::from(self.clone())
    }
}

/// User response for API (without sensitive fields).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role: String,
    pub organization_id: Uuid,
    pub is_active: bool,
    pub last_login_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            email: u.email,
            first_name: u.first_name,
            last_name: u.last_name,
            role: u.role,
            organization_id: u.organization_id,
            is_active: u.is_active,
            last_login_at: u.last_login_at,
            created_at: u.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_user_normalizes_email() {
        let user = User::new(
            "  Alice@Acme.COM ",
            "hash".to_string(),
            "Alice".to_string(),
            "Smith".to_string(),
            Role::Admin,
            Uuid::new_v4(),
        );
        assert_eq!(user.email, "alice@acme.com");
        assert!(user.is_active);
        assert!(user.last_login_at.is_none());
    }

    #[test]
    fn role_round_trips_through_text() {
        for role in Role::ALL {
            assert_eq!(Role::parse(role.as_str()), Some(role));
        }
        assert_eq!(Role::parse("superuser"), None);
    }

    #[test]
    fn sanitized_response_drops_password_hash() {
        let user = User::new(
            "a@b.com",
            "secret-hash".to_string(),
            "A".to_string(),
            "B".to_string(),
            Role::Viewer,
            Uuid::new_v4(),
        );
        let json = serde_json::to_value(user.sanitized()).unwrap();
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["role"], "viewer");
    }
}
