//! Values exposed to the caller and downstream tooling after a deployment.

use serde::Serialize;

/// Deployment outputs, keyed the way deployment tooling reads them
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct DeploymentOutputs {
    pub azure_location: String,
    pub azure_tenant_id: String,
    pub resource_group: String,
    pub service_api_name: String,
    pub service_api_hostname: String,
    pub service_api_uri: String,
    pub azure_storage_account_name: String,
    pub azure_storage_blob_endpoint: String,
    pub azure_storage_queue_endpoint: String,
    pub azure_storage_table_endpoint: String,
    pub azure_identity_client_id: String,
    pub azure_identity_resource_id: String,
    pub applicationinsights_connection_string: String,
    pub entra_application_id: String,
    pub entra_application_object_id: String,
    pub entra_service_principal_id: String,
    pub entra_identifier_uri: String,
    pub auth_enabled: bool,
    /// Delegated permission scopes, comma-joined
    pub configured_scopes: String,
    /// Pre-authorized client ids exactly as supplied
    pub pre_authorized_client_ids: String,
    pub redirect_uris: Vec<String>,
}

impl DeploymentOutputs {
    /// Flat string view; lists are comma-joined
    pub fn to_pairs(&self) -> Vec<(String, String)> {
        let value = match serde_json::to_value(self) {
            Ok(serde_json::Value::Object(map)) => map,
            _ => return Vec::new(),
        };
        value
            .into_iter()
            .map(|(k, v)| {
                let rendered = match v {
                    serde_json::Value::String(s) => s,
                    serde_json::Value::Array(items) => items
                        .iter()
                        .filter_map(|i| i.as_str())
                        .collect::<Vec<_>>()
                        .join(","),
                    other => other.to_string(),
                };
                (k, rendered)
            })
            .collect()
    }
}
