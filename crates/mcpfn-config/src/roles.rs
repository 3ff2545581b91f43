//! Role assignment intents for the managed identity and the debug principal.

use serde::Serialize;

use crate::constants::roles;
use crate::feature_flags::FeatureFlags;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PrincipalType {
    ServicePrincipal,
    User,
}

/// Resource a role is scoped to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RoleScope {
    StorageAccount,
    AppInsights,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleAssignment {
    pub role_name: &'static str,
    pub role_definition_id: &'static str,
    pub principal_id: String,
    pub principal_type: PrincipalType,
    pub scope: RoleScope,
}

/// Roles to declare, gated by the same flags as the settings blocks.
pub fn role_assignments(
    flags: &FeatureFlags,
    identity_principal_id: &str,
    user_principal_id: &str,
    app_insights: bool,
) -> Vec<RoleAssignment> {
    let mut grants: Vec<(&'static str, &'static str, RoleScope)> = Vec::new();
    if flags.enable_blob {
        grants.push(("Storage Blob Data Owner", roles::STORAGE_BLOB_DATA_OWNER, RoleScope::StorageAccount));
    }
    if flags.enable_queue {
        grants.push((
            "Storage Queue Data Contributor",
            roles::STORAGE_QUEUE_DATA_CONTRIBUTOR,
            RoleScope::StorageAccount,
        ));
    }
    if flags.enable_table {
        grants.push((
            "Storage Table Data Contributor",
            roles::STORAGE_TABLE_DATA_CONTRIBUTOR,
            RoleScope::StorageAccount,
        ));
    }
    if app_insights {
        grants.push((
            "Monitoring Metrics Publisher",
            roles::MONITORING_METRICS_PUBLISHER,
            RoleScope::AppInsights,
        ));
    }

    let mut principals = Vec::new();
    if !identity_principal_id.is_empty() {
        principals.push((identity_principal_id, PrincipalType::ServicePrincipal));
    }
    if flags.allow_user_identity_principal && !user_principal_id.is_empty() {
        principals.push((user_principal_id, PrincipalType::User));
    }

    principals
        .into_iter()
        .flat_map(|(principal_id, principal_type)| {
            grants.iter().map(move |(name, id, scope)| RoleAssignment {
                role_name: *name,
                role_definition_id: *id,
                principal_id: principal_id.to_string(),
                principal_type,
                scope: *scope,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_only() {
        let assignments = role_assignments(&FeatureFlags::default(), "mi", "user", true);
        assert_eq!(assignments.len(), 4);
        assert!(assignments.iter().all(|r| r.principal_type == PrincipalType::ServicePrincipal));
    }

    #[test]
    fn test_user_principal_doubles_grants() {
        let flags = FeatureFlags::storage(true, false, false).with_user_principal(true);
        let assignments = role_assignments(&flags, "mi", "user", false);
        assert_eq!(assignments.len(), 2);
        assert_eq!(assignments[1].principal_id, "user");
        assert_eq!(assignments[1].principal_type, PrincipalType::User);
        assert_eq!(assignments[1].role_definition_id, roles::STORAGE_BLOB_DATA_OWNER);
    }

    #[test]
    fn test_no_flags_no_roles() {
        let assignments = role_assignments(&FeatureFlags::none(), "mi", "", false);
        assert!(assignments.is_empty());
    }
}
