//! Global defaults for composition and planning.
//!
//! Everything that is a fixed platform contract (setting names, auth policy
//! timings, region allow-list, role definitions) lives here so a change
//! touches one place.

/// App setting keys produced by the composer.
pub mod keys {
    pub const STORAGE_BLOB_URI: &str = "AzureWebJobsStorage__blobServiceUri";
    pub const STORAGE_QUEUE_URI: &str = "AzureWebJobsStorage__queueServiceUri";
    pub const STORAGE_TABLE_URI: &str = "AzureWebJobsStorage__tableServiceUri";

    pub const STORAGE_CREDENTIAL: &str = "AzureWebJobsStorage__credential";
    pub const STORAGE_CLIENT_ID: &str = "AzureWebJobsStorage__clientId";
    pub const STORAGE_ACCOUNT_NAME: &str = "AzureWebJobsStorage__accountName";
    pub const AZURE_CLIENT_ID: &str = "AZURE_CLIENT_ID";
    pub const CONTENT_SHARE: &str = "WEBSITE_CONTENTSHARE";

    pub const APP_INSIGHTS_AUTH_STRING: &str = "APPLICATIONINSIGHTS_AUTHENTICATION_STRING";
    pub const APP_INSIGHTS_CONNECTION_STRING: &str = "APPLICATIONINSIGHTS_CONNECTION_STRING";

    pub const AUTH_DEFAULT_SCOPES: &str = "WEBSITE_AUTH_PRM_DEFAULT_WITH_SCOPES";
    pub const AUTH_FIC_CLIENT_ID: &str = "OVERRIDE_USE_MI_FIC_ASSERTION_CLIENTID";
    pub const AUTH_ALLOWED_TENANTS: &str = "WEBSITE_AUTH_AAD_ALLOWED_TENANTS";

    pub const TOKEN_EXCHANGE_AUDIENCE: &str = "TokenExchangeAudience";
}

/// Value of the storage credential mode setting.
pub const STORAGE_CREDENTIAL_MODE: &str = "managedidentity";

/// Suffix appended to the App Insights authentication string.
pub const APP_INSIGHTS_AUTHORIZATION: &str = "Authorization=AAD";

/// Scope exposed by the app registration and advertised to MCP clients.
pub const USER_IMPERSONATION_SCOPE: &str = "user_impersonation";

/// Delegated permission requested when none are configured.
pub const DEFAULT_DELEGATED_PERMISSION: &str = "User.Read";

/// Authentication policy constants.
pub mod policy {
    pub const UNAUTHENTICATED_ACTION: &str = "Return401";
    pub const TOKEN_REFRESH_EXTENSION_HOURS: u32 = 72;
    pub const COOKIE_EXPIRATION_CONVENTION: &str = "FixedTime";
    pub const COOKIE_TIME_TO_EXPIRATION: &str = "08:00:00";
    pub const NONCE_EXPIRATION_INTERVAL: &str = "00:05:00";
    pub const AUTH_API_PREFIX: &str = "/.auth";
    pub const FORWARD_PROXY_CONVENTION: &str = "NoProxy";
    pub const PLATFORM_RUNTIME_VERSION: &str = "~1";
    pub const LOGIN_ENDPOINT: &str = "https://login.microsoftonline.com/";
    pub const CALLBACK_PATH: &str = "/.auth/login/aad/callback";
    pub const TOKEN_EXCHANGE_AUDIENCE: &str = "api://AzureADTokenExchange";
}

/// Regions where the Flex Consumption plan is offered.
pub const ALLOWED_LOCATIONS: &[&str] = &[
    "australiaeast",
    "australiasoutheast",
    "brazilsouth",
    "canadacentral",
    "centralindia",
    "centralus",
    "eastasia",
    "eastus",
    "eastus2",
    "eastus2euap",
    "francecentral",
    "germanywestcentral",
    "italynorth",
    "japaneast",
    "koreacentral",
    "northcentralus",
    "northeurope",
    "norwayeast",
    "southafricanorth",
    "southcentralus",
    "southeastasia",
    "southindia",
    "spaincentral",
    "swedencentral",
    "uaenorth",
    "uksouth",
    "ukwest",
    "westcentralus",
    "westeurope",
    "westus",
    "westus2",
    "westus3",
];

/// Resource name prefixes.
pub mod abbrs {
    pub const RESOURCE_GROUP: &str = "rg-";
    pub const FUNCTION_APP: &str = "func-";
    pub const MANAGED_IDENTITY: &str = "id-";
    pub const STORAGE_ACCOUNT: &str = "st";
    pub const APP_SERVICE_PLAN: &str = "plan-";
    pub const APP_INSIGHTS: &str = "appi-";
    pub const LOG_ANALYTICS: &str = "log-";
    pub const APP_REGISTRATION: &str = "app-";
}

/// Length of the deterministic resource token.
pub const RESOURCE_TOKEN_LEN: usize = 13;

/// Built-in role definition ids.
pub mod roles {
    pub const STORAGE_BLOB_DATA_OWNER: &str = "b7e6dc6d-f1e8-4753-8033-0f276bb0955b";
    pub const STORAGE_QUEUE_DATA_CONTRIBUTOR: &str = "974c5e8b-45b9-4653-ba55-5f855dd0fb88";
    pub const STORAGE_TABLE_DATA_CONTRIBUTOR: &str = "0a9a7e1f-b9d0-4cc4-a60d-0319b160aaa3";
    pub const MONITORING_METRICS_PUBLISHER: &str = "3913510d-42f4-4e42-8a64-420c390055eb";
}
