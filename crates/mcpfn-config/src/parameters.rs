//! Deployment parameters supplied by the caller.

use serde::{Deserialize, Serialize};
use url::Url;

use crate::ConfigError;
use crate::constants::{ALLOWED_LOCATIONS, DEFAULT_DELEGATED_PERMISSION};
use crate::feature_flags::FeatureFlags;
use crate::preauth::{join_scopes, normalize_scopes, parse_client_id_list};

const MAX_ENVIRONMENT_NAME_LEN: usize = 64;

/// Length bounds for explicit resource names
const FUNCTION_APP_NAME_LEN: (usize, usize) = (2, 60);
const STORAGE_ACCOUNT_NAME_LEN: (usize, usize) = (3, 24);
const GENERIC_NAME_LEN: (usize, usize) = (1, 90);

/// Input surface of a deployment.
///
/// # Example (TOML)
///
/// ```toml
/// [parameters]
/// environment_name = "dev"
/// location = "eastus2"
/// subscription_id = "00000000-0000-0000-0000-000000000000"
/// pre_authorized_client_ids = "aebc6443-996d-45c2-90f0-388ff96faa56"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DeploymentParameters {
    pub environment_name: String,
    pub location: String,
    pub subscription_id: String,

    /// Explicit resource names. Empty means derive from the resource token.
    pub resource_group_name: String,
    pub api_service_name: String,
    pub api_user_assigned_identity_name: String,
    pub application_insights_name: String,
    pub log_analytics_name: String,
    pub storage_account_name: String,
    pub app_service_plan_name: String,

    /// Comma-separated client ids granted implicit consent
    pub pre_authorized_client_ids: String,
    /// Delegated OAuth2 permission scopes requested by the registration
    pub delegated_permissions: Vec<String>,
    pub token_exchange_audience: String,
    pub vnet_enabled: bool,
    /// Principal granted data access for local debugging
    pub principal_id: String,
    pub extra_redirect_uris: Vec<String>,

    pub enable_blob: bool,
    pub enable_queue: bool,
    pub enable_table: bool,
}

impl Default for DeploymentParameters {
    fn default() -> Self {
        Self {
            environment_name: String::new(),
            location: String::new(),
            subscription_id: String::new(),
            resource_group_name: String::new(),
            api_service_name: String::new(),
            api_user_assigned_identity_name: String::new(),
            application_insights_name: String::new(),
            log_analytics_name: String::new(),
            storage_account_name: String::new(),
            app_service_plan_name: String::new(),
            pre_authorized_client_ids: String::new(),
            delegated_permissions: vec![DEFAULT_DELEGATED_PERMISSION.to_string()],
            token_exchange_audience: String::new(),
            vnet_enabled: false,
            principal_id: String::new(),
            extra_redirect_uris: Vec::new(),
            enable_blob: true,
            enable_queue: true,
            enable_table: true,
        }
    }
}

impl DeploymentParameters {
    pub fn new(environment_name: impl Into<String>, location: impl Into<String>) -> Self {
        Self {
            environment_name: environment_name.into(),
            location: location.into(),
            ..Default::default()
        }
    }

    /// Reject parameters before any composition happens.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let env = self.environment_name.trim();
        if env.is_empty() {
            return Err(ConfigError::validation("environment_name must not be empty"));
        }
        if env.len() > MAX_ENVIRONMENT_NAME_LEN {
            return Err(ConfigError::validation(format!(
                "environment_name must be at most {MAX_ENVIRONMENT_NAME_LEN} characters"
            )));
        }

        let location = self.normalized_location();
        if !ALLOWED_LOCATIONS.contains(&location.as_str()) {
            return Err(ConfigError::validation(format!(
                "location '{}' is not in the allowed set",
                self.location
            )));
        }

        if self.delegated_permissions.iter().any(|s| s.trim().is_empty()) {
            return Err(ConfigError::validation(
                "delegated_permissions entries must not be blank",
            ));
        }

        for uri in &self.extra_redirect_uris {
            validate_redirect_uri(uri)?;
        }

        self.validate_explicit_names()
    }

    fn validate_explicit_names(&self) -> Result<(), ConfigError> {
        validate_name(
            "api_service_name",
            &self.api_service_name,
            FUNCTION_APP_NAME_LEN,
            "ASCII letters, digits and '-'",
            |c| c.is_ascii_alphanumeric() || c == '-',
        )?;
        validate_name(
            "storage_account_name",
            &self.storage_account_name,
            STORAGE_ACCOUNT_NAME_LEN,
            "lowercase letters and digits",
            |c| c.is_ascii_lowercase() || c.is_ascii_digit(),
        )?;
        for (field, value) in [
            ("resource_group_name", &self.resource_group_name),
            ("api_user_assigned_identity_name", &self.api_user_assigned_identity_name),
            ("application_insights_name", &self.application_insights_name),
            ("log_analytics_name", &self.log_analytics_name),
            ("app_service_plan_name", &self.app_service_plan_name),
        ] {
            validate_name(
                field,
                value,
                GENERIC_NAME_LEN,
                "ASCII letters, digits and '-', '_', '.', '(', ')'",
                |c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | '(' | ')'),
            )?;
        }
        Ok(())
    }

    /// Location lowercased with whitespace removed
    pub fn normalized_location(&self) -> String {
        self.location
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect::<String>()
            .to_ascii_lowercase()
    }

    pub fn feature_flags(&self) -> FeatureFlags {
        FeatureFlags::storage(self.enable_blob, self.enable_queue, self.enable_table)
            .with_user_principal(!self.principal_id.trim().is_empty())
    }

    pub fn pre_authorized_client_id_list(&self) -> Vec<String> {
        parse_client_id_list(&self.pre_authorized_client_ids)
    }

    pub fn scopes(&self) -> Vec<String> {
        normalize_scopes(&self.delegated_permissions)
    }

    pub fn scopes_joined(&self) -> String {
        join_scopes(&self.delegated_permissions)
    }
}

/// Empty means derived, so only non-empty names are checked.
fn validate_name(
    field: &str,
    raw: &str,
    (min, max): (usize, usize),
    allowed: &str,
    is_allowed: impl Fn(char) -> bool,
) -> Result<(), ConfigError> {
    let name = raw.trim();
    if name.is_empty() {
        return Ok(());
    }
    if let Some(bad) = name.chars().find(|c| !is_allowed(*c)) {
        return Err(ConfigError::validation(format!(
            "{field} '{name}' contains '{bad}'; only {allowed} are allowed"
        )));
    }
    // All allowed characters are ASCII, so bytes == chars here
    if !(min..=max).contains(&name.len()) {
        return Err(ConfigError::validation(format!(
            "{field} '{name}' must be {min} to {max} characters"
        )));
    }
    Ok(())
}

fn validate_redirect_uri(raw: &str) -> Result<(), ConfigError> {
    let url = Url::parse(raw)
        .map_err(|e| ConfigError::validation(format!("redirect URI '{raw}' is invalid: {e}")))?;
    let local = url.host_str() == Some("localhost");
    match url.scheme() {
        "https" => Ok(()),
        "http" if local => Ok(()),
        _ => Err(ConfigError::validation(format!(
            "redirect URI '{raw}' must use https (http is allowed for localhost only)"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_parameters() {
        let params = DeploymentParameters::new("dev", "EastUS2");
        assert!(params.validate().is_ok());
        assert_eq!(params.normalized_location(), "eastus2");
    }

    #[test]
    fn test_location_allow_list() {
        let params = DeploymentParameters::new("dev", "mars-north");
        let err = params.validate().unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
        assert!(err.to_string().contains("mars-north"));
    }

    #[test]
    fn test_environment_name_required() {
        let params = DeploymentParameters::new("  ", "eastus");
        assert!(params.validate().is_err());

        let long = DeploymentParameters::new("x".repeat(65), "eastus");
        assert!(long.validate().is_err());
    }

    #[test]
    fn test_default_scope() {
        let params = DeploymentParameters::default();
        assert_eq!(params.scopes_joined(), "User.Read");
    }

    #[test]
    fn test_blank_scope_rejected() {
        let mut params = DeploymentParameters::new("dev", "eastus");
        params.delegated_permissions = vec!["User.Read".into(), " ".into()];
        assert!(params.validate().is_err());
    }

    #[test]
    fn test_redirect_uri_rules() {
        let mut params = DeploymentParameters::new("dev", "eastus");
        params.extra_redirect_uris = vec![
            "https://example.com/callback".into(),
            "http://localhost:7071/.auth/login/aad/callback".into(),
        ];
        assert!(params.validate().is_ok());

        params.extra_redirect_uris = vec!["http://example.com/callback".into()];
        assert!(params.validate().is_err());

        params.extra_redirect_uris = vec!["not a url".into()];
        assert!(params.validate().is_err());
    }

    #[test]
    fn test_explicit_api_service_name_rules() {
        let mut params = DeploymentParameters::new("dev", "eastus");
        params.api_service_name = "My-Mcp-Api".into();
        assert!(params.validate().is_ok());

        params.api_service_name = "\u{e9}".repeat(40);
        let err = params.validate().unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
        assert!(err.to_string().contains("api_service_name"));

        params.api_service_name = "my_api".into();
        assert!(params.validate().is_err());

        params.api_service_name = "a".repeat(61);
        assert!(params.validate().is_err());
    }

    #[test]
    fn test_explicit_storage_account_name_rules() {
        let mut params = DeploymentParameters::new("dev", "eastus");
        params.storage_account_name = "mystorage01".into();
        assert!(params.validate().is_ok());

        let long = "a".repeat(25);
        for bad in ["MyStorage", "my-storage", "ab", long.as_str()] {
            params.storage_account_name = bad.into();
            assert!(
                matches!(params.validate(), Err(ConfigError::Validation(_))),
                "{bad} should be rejected"
            );
        }
    }

    #[test]
    fn test_other_explicit_names_must_be_ascii() {
        let mut params = DeploymentParameters::new("dev", "eastus");
        params.resource_group_name = "rg-my_app.(dev)".into();
        assert!(params.validate().is_ok());

        params.log_analytics_name = "log-\u{fc}ber".into();
        let err = params.validate().unwrap_err();
        assert!(err.to_string().contains("log_analytics_name"));
    }

    #[test]
    fn test_user_principal_flag() {
        let mut params = DeploymentParameters::new("dev", "eastus");
        assert!(!params.feature_flags().allow_user_identity_principal);
        params.principal_id = "user-oid".into();
        assert!(params.feature_flags().allow_user_identity_principal);
    }
}
