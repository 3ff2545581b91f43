//! Deterministic resource naming.

use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::constants::{RESOURCE_TOKEN_LEN, abbrs};
use crate::parameters::DeploymentParameters;

const STORAGE_NAME_MAX: usize = 24;
const CONTENT_SHARE_MAX: usize = 63;

/// Stable token derived from subscription, environment and location.
///
/// Re-running with the same inputs always yields the same names, which keeps
/// re-applied deployments idempotent.
pub fn resource_token(subscription_id: &str, environment_name: &str, location: &str) -> String {
    let mut hasher = Sha256::new();
    for part in [subscription_id, environment_name, location] {
        hasher.update(part.as_bytes());
        hasher.update([0u8]);
    }
    let mut token = hex::encode(hasher.finalize());
    token.truncate(RESOURCE_TOKEN_LEN);
    token
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceNames {
    pub resource_token: String,
    pub resource_group: String,
    pub function_app: String,
    pub managed_identity: String,
    pub storage_account: String,
    pub app_service_plan: String,
    pub app_insights: String,
    pub log_analytics: String,
    pub content_share: String,
    /// Unique name the app registration is keyed by
    pub app_registration: String,
}

impl ResourceNames {
    /// Derive names, preferring explicit ones from the parameters.
    pub fn derive(params: &DeploymentParameters) -> Self {
        let env = params.environment_name.trim();
        let token = resource_token(
            &params.subscription_id,
            env,
            &params.normalized_location(),
        );

        let pick = |explicit: &str, fallback: String| -> String {
            if explicit.trim().is_empty() {
                fallback
            } else {
                explicit.trim().to_string()
            }
        };

        let function_app = pick(
            &params.api_service_name,
            format!("{}api-{token}", abbrs::FUNCTION_APP),
        );
        let storage_account = pick(
            &params.storage_account_name,
            storage_account_name(&token),
        );

        Self {
            resource_group: pick(
                &params.resource_group_name,
                format!("{}{env}", abbrs::RESOURCE_GROUP),
            ),
            managed_identity: pick(
                &params.api_user_assigned_identity_name,
                format!("{}api-{token}", abbrs::MANAGED_IDENTITY),
            ),
            app_service_plan: pick(
                &params.app_service_plan_name,
                format!("{}{token}", abbrs::APP_SERVICE_PLAN),
            ),
            app_insights: pick(
                &params.application_insights_name,
                format!("{}{token}", abbrs::APP_INSIGHTS),
            ),
            log_analytics: pick(
                &params.log_analytics_name,
                format!("{}{token}", abbrs::LOG_ANALYTICS),
            ),
            content_share: content_share_name(&function_app),
            app_registration: format!("{}mcp-{token}", abbrs::APP_REGISTRATION),
            function_app,
            storage_account,
            resource_token: token,
        }
    }

    /// Default public hostname of the function app
    pub fn function_app_hostname(&self) -> String {
        format!("{}.azurewebsites.net", self.function_app)
    }
}

fn storage_account_name(token: &str) -> String {
    let mut name: String = format!("{}{token}", abbrs::STORAGE_ACCOUNT)
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect::<String>()
        .to_ascii_lowercase();
    name.truncate(STORAGE_NAME_MAX);
    name
}

/// File share name: lowercase, at most 63 characters
pub fn content_share_name(function_app: &str) -> String {
    function_app
        .chars()
        .take(CONTENT_SHARE_MAX)
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_is_deterministic() {
        let a = resource_token("sub", "dev", "eastus");
        let b = resource_token("sub", "dev", "eastus");
        assert_eq!(a, b);
        assert_eq!(a.len(), RESOURCE_TOKEN_LEN);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn test_token_depends_on_every_input() {
        let base = resource_token("sub", "dev", "eastus");
        assert_ne!(base, resource_token("sub2", "dev", "eastus"));
        assert_ne!(base, resource_token("sub", "prod", "eastus"));
        assert_ne!(base, resource_token("sub", "dev", "westus"));
        // Field boundaries matter
        assert_ne!(resource_token("ab", "c", "x"), resource_token("a", "bc", "x"));
    }

    #[test]
    fn test_derived_names() {
        let mut params = DeploymentParameters::new("dev", "eastus");
        params.subscription_id = "sub".into();
        let names = ResourceNames::derive(&params);
        let token = &names.resource_token;

        assert_eq!(names.resource_group, "rg-dev");
        assert_eq!(names.function_app, format!("func-api-{token}"));
        assert_eq!(names.managed_identity, format!("id-api-{token}"));
        assert_eq!(names.storage_account, format!("st{token}"));
        assert!(names.storage_account.len() <= 24);
        assert_eq!(names.content_share, names.function_app);
        assert_eq!(
            names.function_app_hostname(),
            format!("func-api-{token}.azurewebsites.net")
        );
    }

    #[test]
    fn test_explicit_names_win() {
        let mut params = DeploymentParameters::new("dev", "eastus");
        params.api_service_name = "My-Mcp-Api".into();
        params.storage_account_name = "mystorage".into();
        let names = ResourceNames::derive(&params);
        assert_eq!(names.function_app, "My-Mcp-Api");
        assert_eq!(names.content_share, "my-mcp-api");
        assert_eq!(names.storage_account, "mystorage");
    }

    #[test]
    fn test_content_share_truncated() {
        let share = content_share_name(&"A".repeat(80));
        assert_eq!(share.len(), 63);
        assert!(share.chars().all(|c| c == 'a'));
    }

    #[test]
    fn test_content_share_counts_chars_not_bytes() {
        let share = content_share_name(&"\u{c9}".repeat(40));
        assert_eq!(share.chars().count(), 40);

        let share = content_share_name(&"\u{e9}".repeat(70));
        assert_eq!(share.chars().count(), 63);
    }
}
