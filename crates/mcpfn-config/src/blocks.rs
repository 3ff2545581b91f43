//! Settings blocks, one pure function each.
//!
//! Optional blocks return `None` when their prerequisites are missing. A block
//! is emitted whole or not at all.

use crate::ConfigError;
use crate::constants::{APP_INSIGHTS_AUTHORIZATION, STORAGE_CREDENTIAL_MODE, USER_IMPERSONATION_SCOPE, keys};
use crate::feature_flags::FeatureFlags;
use crate::identity::{AppInsightsRef, AuthParams, Identity, StorageAccountRef, StorageEndpoints};
use crate::settings::{PartialSettings, partial};

/// Storage service URIs, each gated by its flag.
pub fn storage_endpoint_settings(flags: &FeatureFlags, endpoints: &StorageEndpoints) -> PartialSettings {
    let mut settings = PartialSettings::new();
    if flags.enable_blob {
        settings.insert(keys::STORAGE_BLOB_URI.to_string(), endpoints.blob.clone());
    }
    if flags.enable_queue {
        settings.insert(keys::STORAGE_QUEUE_URI.to_string(), endpoints.queue.clone());
    }
    if flags.enable_table {
        settings.insert(keys::STORAGE_TABLE_URI.to_string(), endpoints.table.clone());
    }
    settings
}

/// Always-present settings. The storage account name is required.
pub fn baseline_settings(
    identity: &Identity,
    storage: &StorageAccountRef,
    content_share: &str,
) -> Result<PartialSettings, ConfigError> {
    if storage.name.trim().is_empty() {
        return Err(ConfigError::invalid_input("storage account name must not be empty"));
    }
    if content_share.trim().is_empty() {
        return Err(ConfigError::invalid_input("content share name must not be empty"));
    }

    Ok(partial([
        (keys::STORAGE_CREDENTIAL, STORAGE_CREDENTIAL_MODE),
        (keys::STORAGE_CLIENT_ID, identity.client_id.as_str()),
        (keys::STORAGE_ACCOUNT_NAME, storage.name.as_str()),
        (keys::AZURE_CLIENT_ID, identity.client_id.as_str()),
        (keys::CONTENT_SHARE, content_share),
    ]))
}

/// Monitoring block, present whenever Application Insights is wired.
pub fn app_insights_settings(identity: &Identity, app_insights: Option<&AppInsightsRef>) -> Option<PartialSettings> {
    let app_insights = app_insights?;
    Some(partial([
        (
            keys::APP_INSIGHTS_AUTH_STRING.to_string(),
            format!("ClientId={};{APP_INSIGHTS_AUTHORIZATION}", identity.client_id),
        ),
        (
            keys::APP_INSIGHTS_CONNECTION_STRING.to_string(),
            app_insights.connection_string.clone(),
        ),
    ]))
}

/// Built-in auth hints for the hosting platform.
///
/// Requires the auth policy prerequisites (client id and tenant id) plus the
/// identifier URI and the managed identity's client id.
pub fn auth_settings(identity: &Identity, auth: Option<&AuthParams>) -> Option<PartialSettings> {
    let auth = auth.filter(|a| a.is_enabled())?;
    if auth.identifier_uri.is_empty() || identity.client_id.is_empty() {
        return None;
    }
    Some(partial([
        (
            keys::AUTH_DEFAULT_SCOPES.to_string(),
            format!("{}/{USER_IMPERSONATION_SCOPE}", auth.identifier_uri),
        ),
        (keys::AUTH_FIC_CLIENT_ID.to_string(), identity.client_id.clone()),
        (keys::AUTH_ALLOWED_TENANTS.to_string(), auth.tenant_id.clone()),
    ]))
}

/// Exactly one setting when an audience is configured.
pub fn token_exchange_settings(audience: &str) -> Option<PartialSettings> {
    if audience.is_empty() {
        return None;
    }
    Some(partial([(keys::TOKEN_EXCHANGE_AUDIENCE, audience)]))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity() -> Identity {
        Identity::new("/subscriptions/s/id", "mi-client", "mi-principal")
    }

    fn auth(client: &str, tenant: &str) -> AuthParams {
        AuthParams {
            client_id: client.into(),
            tenant_id: tenant.into(),
            identifier_uri: "api://app-mcp".into(),
            pre_authorized_client_ids: String::new(),
        }
    }

    #[test]
    fn test_endpoint_flags_gate_each_key() {
        let endpoints = StorageEndpoints::for_account("st1");
        for mask in 0u8..8 {
            let flags = FeatureFlags::storage(mask & 1 != 0, mask & 2 != 0, mask & 4 != 0);
            let settings = storage_endpoint_settings(&flags, &endpoints);
            assert_eq!(settings.contains_key(keys::STORAGE_BLOB_URI), flags.enable_blob);
            assert_eq!(settings.contains_key(keys::STORAGE_QUEUE_URI), flags.enable_queue);
            assert_eq!(settings.contains_key(keys::STORAGE_TABLE_URI), flags.enable_table);
        }
    }

    #[test]
    fn test_flag_gates_empty_endpoint_too() {
        let flags = FeatureFlags::storage(true, false, false);
        let settings = storage_endpoint_settings(&flags, &StorageEndpoints::default());
        assert_eq!(settings.get(keys::STORAGE_BLOB_URI).map(String::as_str), Some(""));
    }

    #[test]
    fn test_baseline_requires_storage_name() {
        let storage = StorageAccountRef::default();
        let err = baseline_settings(&identity(), &storage, "share").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidInput(_)));
    }

    #[test]
    fn test_baseline_contents() {
        let settings = baseline_settings(&identity(), &StorageAccountRef::new("st1"), "func-api").unwrap();
        assert_eq!(settings[keys::STORAGE_CREDENTIAL], "managedidentity");
        assert_eq!(settings[keys::STORAGE_CLIENT_ID], "mi-client");
        assert_eq!(settings[keys::AZURE_CLIENT_ID], "mi-client");
        assert_eq!(settings[keys::CONTENT_SHARE], "func-api");
    }

    #[test]
    fn test_app_insights_auth_string() {
        let insights = AppInsightsRef {
            connection_string: "InstrumentationKey=k".into(),
        };
        let settings = app_insights_settings(&identity(), Some(&insights)).unwrap();
        assert_eq!(
            settings[keys::APP_INSIGHTS_AUTH_STRING],
            "ClientId=mi-client;Authorization=AAD"
        );
        assert!(app_insights_settings(&identity(), None).is_none());
    }

    #[test]
    fn test_auth_settings_all_or_nothing() {
        let full = auth_settings(&identity(), Some(&auth("app", "tenant"))).unwrap();
        assert_eq!(full.len(), 3);
        assert_eq!(full[keys::AUTH_DEFAULT_SCOPES], "api://app-mcp/user_impersonation");
        assert_eq!(full[keys::AUTH_FIC_CLIENT_ID], "mi-client");
        assert_eq!(full[keys::AUTH_ALLOWED_TENANTS], "tenant");

        assert!(auth_settings(&identity(), Some(&auth("", "tenant"))).is_none());
        assert!(auth_settings(&identity(), Some(&auth("app", ""))).is_none());
        assert!(auth_settings(&identity(), None).is_none());

        let mut no_uri = auth("app", "tenant");
        no_uri.identifier_uri.clear();
        assert!(auth_settings(&identity(), Some(&no_uri)).is_none());

        let anonymous = Identity::default();
        assert!(auth_settings(&anonymous, Some(&auth("app", "tenant"))).is_none());
    }

    #[test]
    fn test_token_exchange() {
        assert!(token_exchange_settings("").is_none());
        let settings = token_exchange_settings("api://downstream").unwrap();
        assert_eq!(settings.len(), 1);
        assert_eq!(settings[keys::TOKEN_EXCHANGE_AUDIENCE], "api://downstream");
    }
}
