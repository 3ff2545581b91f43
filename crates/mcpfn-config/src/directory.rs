//! App registration requests and the identity directory seam.

use async_trait::async_trait;
use dashmap::DashMap;
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use crate::ConfigError;
use crate::auth_policy::open_id_issuer;
use crate::constants::{USER_IMPERSONATION_SCOPE, policy};

/// Scope exposed by the registered API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExposedScope {
    pub id: Uuid,
    pub value: String,
    pub admin_consent_display_name: String,
    pub admin_consent_description: String,
}

/// Trust between the registration and the function app's managed identity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FederatedCredential {
    pub name: String,
    pub issuer: String,
    pub subject: String,
    pub audiences: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppRegistrationRequest {
    pub display_name: String,
    /// Idempotency key; re-registering with the same name updates in place
    pub unique_name: String,
    pub identifier_uri: String,
    pub redirect_uris: Vec<String>,
    pub exposed_scope: ExposedScope,
    pub pre_authorized_client_ids: Vec<String>,
    pub delegated_permissions: Vec<String>,
    pub federated_credential: Option<FederatedCredential>,
}

/// Inputs for [`AppRegistrationRequest::build`]
#[derive(Debug, Clone, Default)]
pub struct RegistrationInput<'a> {
    pub unique_name: &'a str,
    pub display_name: &'a str,
    pub function_app_hostname: &'a str,
    pub extra_redirect_uris: &'a [String],
    pub pre_authorized_client_ids: Vec<String>,
    pub delegated_permissions: Vec<String>,
    pub tenant_id: &'a str,
    pub identity_principal_id: &'a str,
}

impl AppRegistrationRequest {
    pub fn build(input: RegistrationInput<'_>) -> Result<Self, ConfigError> {
        if input.unique_name.trim().is_empty() {
            return Err(ConfigError::invalid_input("app registration unique name must not be empty"));
        }

        let identifier_uri = format!("api://{}", input.unique_name);
        let display_name = if input.display_name.trim().is_empty() {
            input.unique_name.to_string()
        } else {
            input.display_name.to_string()
        };

        // The federated credential needs both ends of the trust.
        let federated_credential = (!input.tenant_id.is_empty()
            && !input.identity_principal_id.is_empty())
        .then(|| FederatedCredential {
            name: format!("{}-msi", input.unique_name),
            issuer: open_id_issuer(input.tenant_id),
            subject: input.identity_principal_id.to_string(),
            audiences: vec![policy::TOKEN_EXCHANGE_AUDIENCE.to_string()],
        });

        Ok(Self {
            display_name,
            unique_name: input.unique_name.to_string(),
            redirect_uris: redirect_uris(input.function_app_hostname, input.extra_redirect_uris),
            exposed_scope: ExposedScope {
                id: scope_id(&identifier_uri),
                value: USER_IMPERSONATION_SCOPE.to_string(),
                admin_consent_display_name: "Access MCP server".to_string(),
                admin_consent_description: "Allow the application to access the MCP server on behalf of the signed-in user."
                    .to_string(),
            },
            identifier_uri,
            pre_authorized_client_ids: input.pre_authorized_client_ids,
            delegated_permissions: input.delegated_permissions,
            federated_credential,
        })
    }
}

/// Callback URI for the hosted app followed by any extra URIs, deduplicated.
pub fn redirect_uris(hostname: &str, extra: &[String]) -> Vec<String> {
    let mut uris = IndexSet::new();
    if !hostname.is_empty() {
        uris.insert(format!("https://{hostname}{}", policy::CALLBACK_PATH));
    }
    uris.extend(extra.iter().map(|u| u.trim().to_string()).filter(|u| !u.is_empty()));
    uris.into_iter().collect()
}

/// Stable scope id so re-registration does not churn the scope
pub fn scope_id(identifier_uri: &str) -> Uuid {
    Uuid::new_v5(
        &Uuid::NAMESPACE_URL,
        format!("{identifier_uri}/{USER_IMPERSONATION_SCOPE}").as_bytes(),
    )
}

/// Identifiers returned by the directory
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppRegistration {
    pub app_id: String,
    pub object_id: String,
    pub service_principal_id: String,
    pub identifier_uri: String,
}

/// Identity directory that registers applications.
///
/// Implementations must be idempotent per `unique_name`: registering the same
/// name twice returns the same identifiers.
#[async_trait]
pub trait IdentityDirectory: Send + Sync {
    /// Name of this directory (for logging)
    fn name(&self) -> &str;

    async fn register(&self, request: &AppRegistrationRequest) -> Result<AppRegistration, ConfigError>;
}

/// Directory kept in memory, for tests and dry runs
#[derive(Debug, Default)]
pub struct InMemoryDirectory {
    registrations: DashMap<String, (AppRegistrationRequest, AppRegistration)>,
}

impl InMemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, unique_name: &str) -> Option<AppRegistrationRequest> {
        self.registrations.get(unique_name).map(|e| e.0.clone())
    }

    pub fn len(&self) -> usize {
        self.registrations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registrations.is_empty()
    }
}

#[async_trait]
impl IdentityDirectory for InMemoryDirectory {
    fn name(&self) -> &str {
        "memory"
    }

    async fn register(&self, request: &AppRegistrationRequest) -> Result<AppRegistration, ConfigError> {
        if request.unique_name.is_empty() {
            return Err(ConfigError::directory("unique name is required"));
        }

        let mut entry = self
            .registrations
            .entry(request.unique_name.clone())
            .or_insert_with(|| {
                info!(unique_name = %request.unique_name, "registering application");
                let registration = AppRegistration {
                    app_id: Uuid::new_v4().to_string(),
                    object_id: Uuid::new_v4().to_string(),
                    service_principal_id: Uuid::new_v4().to_string(),
                    identifier_uri: request.identifier_uri.clone(),
                };
                (request.clone(), registration)
            });

        if entry.0 != *request {
            debug!(unique_name = %request.unique_name, "updating existing registration");
            entry.0 = request.clone();
            entry.1.identifier_uri = request.identifier_uri.clone();
        }

        Ok(entry.1.clone())
    }
}
