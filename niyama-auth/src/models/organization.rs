//! Organization model - the tenant boundary.
//!
//! An organization is created exactly once, at first registration by a user
//! of that organization. No update or delete path exists.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{types::Json, FromRow};
use uuid::Uuid;

pub const DEFAULT_PLAN_TIER: &str = "starter";

/// Per-organization quotas and feature flags, stored as a JSON blob.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrgSettings {
    pub max_policies: u32,
    pub max_users: u32,
    pub enabled_frameworks: Vec<String>,
    pub ai_policy_generation: bool,
    pub drift_detection: bool,
}

impl Default for OrgSettings {
    fn default() -> Self {
        // Starter-plan quotas.
        Self {
            max_policies: 10,
            max_users: 5,
            enabled_frameworks: vec!["cis".to_string(), "nist".to_string()],
            ai_policy_generation: true,
            drift_detection: false,
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct Organization {
    pub id: Uuid,
    pub name: String,
    pub domain: String,
    pub plan_tier: String,
    pub settings: Json<OrgSettings>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Organization {
    /// Create a new organization with the starter plan and default quotas.
    pub fn new(name: String, domain: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name,
            domain,
            plan_tier: DEFAULT_PLAN_TIER.to_string(),
            settings: Json(OrgSettings::default()),
            created_at: now,
            updated_at: now,
        }
    }

    /// Derive the organization domain from a registering email address.
    pub fn domain_from_email(email: &str) -> String {
        email
            .rsplit('@')
            .next()
            .unwrap_or_default()
            .trim()
            .to_lowercase()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn domain_is_derived_from_email() {
        assert_eq!(
            Organization::domain_from_email("alice@acme.com"),
            "acme.com"
        );
        assert_eq!(
            Organization::domain_from_email("Bob@Sub.Example.ORG"),
            "sub.example.org"
        );
    }

    #[test]
    fn new_organization_gets_starter_defaults() {
        let org = Organization::new("Acme".to_string(), "acme.com".to_string());
        assert_eq!(org.plan_tier, "starter");
        assert_eq!(org.settings.max_policies, 10);
        assert_eq!(org.settings.max_users, 5);
    }
}
