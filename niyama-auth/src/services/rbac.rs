//! Static role-based access control table.
//!
//! A pure mapping from role to per-resource allowed actions. No
//! inheritance, wildcards, or dynamic composition; the table is hand
//! authored and safely shareable as read-only data.

use crate::models::Role;

/// The resources authorization decisions are made over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    Policies,
    Templates,
    Compliance,
    Users,
    Settings,
}

impl Resource {
    pub const ALL: [Resource; 5] = [
        Resource::Policies,
        Resource::Templates,
        Resource::Compliance,
        Resource::Users,
        Resource::Settings,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Resource::Policies => "policies",
            Resource::Templates => "templates",
            Resource::Compliance => "compliance",
            Resource::Users => "users",
            Resource::Settings => "settings",
        }
    }

    pub fn parse(s: &str) -> Option<Resource> {
        match s {
            "policies" => Some(Resource::Policies),
            "templates" => Some(Resource::Templates),
            "compliance" => Some(Resource::Compliance),
            "users" => Some(Resource::Users),
            "settings" => Some(Resource::Settings),
            _ => None,
        }
    }
}

/// The allowed action strings for a role on a resource.
pub fn allowed_actions(role: Role, resource: Resource) -> &'static [&'static str] {
    use Resource::*;
    use Role::*;

    match (role, resource) {
        (Admin, Policies) => &["create", "read", "update", "delete", "deploy"],
        (Admin, Templates) => &["create", "read", "update", "delete"],
        (Admin, Compliance) => &["read", "generate_report", "configure"],
        (Admin, Users) => &["create", "read", "update", "delete"],
        (Admin, Settings) => &["read", "update"],

        (ComplianceOfficer, Policies) => &["read", "update"],
        (ComplianceOfficer, Templates) => &["read"],
        (ComplianceOfficer, Compliance) => &["read", "generate_report", "configure"],
        (ComplianceOfficer, Users) => &["read"],
        (ComplianceOfficer, Settings) => &["read"],

        (DevSecOpsEngineer, Policies) => &["create", "read", "update", "deploy"],
        (DevSecOpsEngineer, Templates) => &["create", "read", "update"],
        (DevSecOpsEngineer, Compliance) => &["read"],
        (DevSecOpsEngineer, Users) => &["read"],
        (DevSecOpsEngineer, Settings) => &["read"],

        (PlatformEngineer, Policies) => &["create", "read", "deploy"],
        (PlatformEngineer, Templates) => &["read"],
        (PlatformEngineer, Compliance) => &["read"],
        (PlatformEngineer, Users) => &["read"],
        (PlatformEngineer, Settings) => &["read"],

        (Viewer, Policies) => &["read"],
        (Viewer, Templates) => &["read"],
        (Viewer, Compliance) => &["read"],
        (Viewer, Users) => &[],
        (Viewer, Settings) => &[],
    }
}

/// Membership test over the static table.
pub fn role_allows(role: Role, resource: Resource, action: &str) -> bool {
    allowed_actions(role, resource).contains(&action)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_admin_may_delete_users() {
        for role in Role::ALL {
            let expected = role == Role::Admin;
            assert_eq!(
                role_allows(role, Resource::Users, "delete"),
                expected,
                "users:delete for {}",
                role
            );
        }
    }

    #[test]
    fn every_role_reads_policies() {
        for role in Role::ALL {
            assert!(role_allows(role, Resource::Policies, "read"));
        }
    }

    #[test]
    fn viewer_has_no_write_anywhere() {
        for resource in Resource::ALL {
            for action in ["create", "update", "delete", "deploy", "configure"] {
                assert!(!role_allows(Role::Viewer, resource, action));
            }
        }
    }

    #[test]
    fn unknown_action_is_denied_not_an_error() {
        assert!(!role_allows(Role::Admin, Resource::Policies, "transmogrify"));
    }

    #[test]
    fn resource_names_round_trip() {
        for resource in Resource::ALL {
            assert_eq!(Resource::parse(resource.as_str()), Some(resource));
        }
        assert_eq!(Resource::parse("widgets"), None);
    }
}
