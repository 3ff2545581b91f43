//! Built-in authentication policy document.
//!
//! The document mirrors the hosting platform's auth settings resource. It
//! exists only when both the app registration client id and the tenant id are
//! known, and it is never partially constructed.

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

use crate::ConfigError;
use crate::constants::{keys, policy};
use crate::identity::AuthParams;
use crate::preauth::parse_client_id_list;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthPolicy {
    pub platform: PlatformSettings,
    pub global_validation: GlobalValidation,
    pub http_settings: HttpSettings,
    pub identity_providers: IdentityProviders,
    pub login: LoginSettings,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformSettings {
    pub enabled: bool,
    pub runtime_version: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GlobalValidation {
    pub require_authentication: bool,
    pub unauthenticated_client_action: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HttpSettings {
    pub require_https: bool,
    pub routes: Routes,
    pub forward_proxy: ForwardProxy,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Routes {
    pub api_prefix: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForwardProxy {
    pub convention: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentityProviders {
    pub azure_active_directory: AzureActiveDirectory,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AzureActiveDirectory {
    pub enabled: bool,
    pub registration: Registration,
    pub validation: AadValidation,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Registration {
    pub open_id_issuer: String,
    pub client_id: String,
    pub client_secret_setting_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AadValidation {
    pub jwt_claim_checks: Empty,
    pub allowed_audiences: Vec<String>,
    pub default_authorization_policy: DefaultAuthorizationPolicy,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DefaultAuthorizationPolicy {
    pub allowed_applications: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginSettings {
    pub token_store: TokenStore,
    pub preserve_url_fragments_for_logins: bool,
    pub cookie_expiration: CookieExpiration,
    pub nonce: Nonce,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenStore {
    pub enabled: bool,
    pub token_refresh_extension_hours: u32,
    pub file_system: Empty,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CookieExpiration {
    pub convention: String,
    pub time_to_expiration: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Nonce {
    pub validate_nonce: bool,
    pub nonce_expiration_interval: String,
}

/// Serializes as `{}`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Empty {}

impl AuthPolicy {
    /// Build the policy, or `None` when client id or tenant id is empty.
    ///
    /// With both present, an empty identifier URI is an
    /// [`ConfigError::InvalidInput`]: the audience list would be empty.
    pub fn build(auth: &AuthParams) -> Result<Option<Self>, ConfigError> {
        if !auth.is_enabled() {
            return Ok(None);
        }
        if auth.identifier_uri.is_empty() {
            return Err(ConfigError::invalid_input(
                "auth identifier URI is required when client id and tenant id are set",
            ));
        }

        let mut allowed: IndexSet<String> = IndexSet::new();
        allowed.insert(auth.client_id.clone());
        allowed.extend(parse_client_id_list(&auth.pre_authorized_client_ids));

        Ok(Some(Self {
            platform: PlatformSettings {
                enabled: true,
                runtime_version: policy::PLATFORM_RUNTIME_VERSION.to_string(),
            },
            global_validation: GlobalValidation {
                require_authentication: true,
                unauthenticated_client_action: policy::UNAUTHENTICATED_ACTION.to_string(),
            },
            http_settings: HttpSettings {
                require_https: true,
                routes: Routes {
                    api_prefix: policy::AUTH_API_PREFIX.to_string(),
                },
                forward_proxy: ForwardProxy {
                    convention: policy::FORWARD_PROXY_CONVENTION.to_string(),
                },
            },
            identity_providers: IdentityProviders {
                azure_active_directory: AzureActiveDirectory {
                    enabled: true,
                    registration: Registration {
                        open_id_issuer: open_id_issuer(&auth.tenant_id),
                        client_id: auth.client_id.clone(),
                        client_secret_setting_name: keys::AUTH_FIC_CLIENT_ID.to_string(),
                    },
                    validation: AadValidation {
                        jwt_claim_checks: Empty {},
                        allowed_audiences: vec![auth.identifier_uri.clone()],
                        default_authorization_policy: DefaultAuthorizationPolicy {
                            allowed_applications: allowed.into_iter().collect(),
                        },
                    },
                },
            },
            login: LoginSettings {
                token_store: TokenStore {
                    enabled: true,
                    token_refresh_extension_hours: policy::TOKEN_REFRESH_EXTENSION_HOURS,
                    file_system: Empty {},
                },
                preserve_url_fragments_for_logins: false,
                cookie_expiration: CookieExpiration {
                    convention: policy::COOKIE_EXPIRATION_CONVENTION.to_string(),
                    time_to_expiration: policy::COOKIE_TIME_TO_EXPIRATION.to_string(),
                },
                nonce: Nonce {
                    validate_nonce: true,
                    nonce_expiration_interval: policy::NONCE_EXPIRATION_INTERVAL.to_string(),
                },
            },
        }))
    }

    pub fn allowed_applications(&self) -> &[String] {
        &self
            .identity_providers
            .azure_active_directory
            .validation
            .default_authorization_policy
            .allowed_applications
    }

    pub fn allowed_audiences(&self) -> &[String] {
        &self
            .identity_providers
            .azure_active_directory
            .validation
            .allowed_audiences
    }
}

/// v2.0 issuer URL for a tenant
pub fn open_id_issuer(tenant_id: &str) -> String {
    format!("{}{tenant_id}/v2.0", policy::LOGIN_ENDPOINT)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(client: &str, tenant: &str) -> AuthParams {
        AuthParams {
            client_id: client.into(),
            tenant_id: tenant.into(),
            identifier_uri: "api://app-mcp".into(),
            pre_authorized_client_ids: String::new(),
        }
    }

    #[test]
    fn test_presence_truth_table() {
        assert!(AuthPolicy::build(&params("", "")).unwrap().is_none());
        assert!(AuthPolicy::build(&params("app", "")).unwrap().is_none());
        assert!(AuthPolicy::build(&params("", "tenant")).unwrap().is_none());
        assert!(AuthPolicy::build(&params("app", "tenant")).unwrap().is_some());
    }

    #[test]
    fn test_allowed_applications_include_self() {
        let policy = AuthPolicy::build(&params("app", "tenant")).unwrap().unwrap();
        assert_eq!(policy.allowed_applications(), ["app"]);
        assert_eq!(policy.allowed_audiences(), ["api://app-mcp"]);
    }

    #[test]
    fn test_allowed_applications_union_is_stable() {
        let mut p = params("app", "tenant");
        p.pre_authorized_client_ids = "vscode, app,, cli ".into();
        let policy = AuthPolicy::build(&p).unwrap().unwrap();
        assert_eq!(policy.allowed_applications(), ["app", "vscode", "cli"]);
    }

    #[test]
    fn test_missing_identifier_uri_is_invalid() {
        let mut p = params("app", "tenant");
        p.identifier_uri.clear();
        let err = AuthPolicy::build(&p).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidInput(_)));
    }

    #[test]
    fn test_fixed_constants() {
        let policy = AuthPolicy::build(&params("app", "tenant")).unwrap().unwrap();
        assert!(policy.http_settings.require_https);
        assert_eq!(policy.global_validation.unauthenticated_client_action, "Return401");
        assert_eq!(policy.login.token_store.token_refresh_extension_hours, 72);
        assert_eq!(policy.login.cookie_expiration.time_to_expiration, "08:00:00");
        assert_eq!(policy.login.nonce.nonce_expiration_interval, "00:05:00");
        assert_eq!(
            policy
                .identity_providers
                .azure_active_directory
                .registration
                .open_id_issuer,
            "https://login.microsoftonline.com/tenant/v2.0"
        );
    }
}
