//! Identifiers of provisioned resources consumed by the composer.

use serde::{Deserialize, Serialize};

/// The user-assigned managed identity bound to the function app.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Identity {
    pub resource_id: String,
    pub client_id: String,
    pub principal_id: String,
}

impl Identity {
    pub fn new(
        resource_id: impl Into<String>,
        client_id: impl Into<String>,
        principal_id: impl Into<String>,
    ) -> Self {
        Self {
            resource_id: resource_id.into(),
            client_id: client_id.into(),
            principal_id: principal_id.into(),
        }
    }
}

/// Service URIs of the storage account.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageEndpoints {
    pub blob: String,
    pub queue: String,
    pub table: String,
}

impl StorageEndpoints {
    /// Public cloud endpoints for an account name.
    pub fn for_account(account_name: &str) -> Self {
        Self {
            blob: format!("https://{account_name}.blob.core.windows.net/"),
            queue: format!("https://{account_name}.queue.core.windows.net/"),
            table: format!("https://{account_name}.table.core.windows.net/"),
        }
    }
}

/// Storage account backing the function host.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageAccountRef {
    pub name: String,
    pub endpoints: StorageEndpoints,
}

impl StorageAccountRef {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let endpoints = StorageEndpoints::for_account(&name);
        Self { name, endpoints }
    }
}

/// Application Insights component wired to the function app.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppInsightsRef {
    pub connection_string: String,
}

/// Entra ID authentication inputs.
///
/// `client_id` is the app registration's application id, not the managed
/// identity's client id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthParams {
    pub client_id: String,
    pub tenant_id: String,
    pub identifier_uri: String,
    /// Raw comma-separated list as supplied by the caller
    pub pre_authorized_client_ids: String,
}

impl AuthParams {
    /// Whether both prerequisites of the auth policy are present.
    pub fn is_enabled(&self) -> bool {
        !self.client_id.is_empty() && !self.tenant_id.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoints_for_account() {
        let storage = StorageAccountRef::new("stabc123");
        assert_eq!(storage.endpoints.blob, "https://stabc123.blob.core.windows.net/");
        assert_eq!(storage.endpoints.queue, "https://stabc123.queue.core.windows.net/");
        assert_eq!(storage.endpoints.table, "https://stabc123.table.core.windows.net/");
    }

    #[test]
    fn test_auth_enabled_requires_both() {
        let mut auth = AuthParams::default();
        assert!(!auth.is_enabled());
        auth.client_id = "app".into();
        assert!(!auth.is_enabled());
        auth.tenant_id = "tenant".into();
        assert!(auth.is_enabled());
        auth.client_id.clear();
        assert!(!auth.is_enabled());
    }
}
