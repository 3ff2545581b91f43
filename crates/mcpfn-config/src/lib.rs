//! Deployment configuration composer for the MCP Functions service
//!
//! This crate turns a set of deployment parameters and provisioned identifiers
//! into the documents the provisioning engine consumes:
//! - A flat app settings map, merged from ordered blocks with precedence
//! - An optional authentication policy document
//! - An app registration request for the identity directory
//! - Role assignment intents and deployment outputs
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                        DeploymentPlan                        │
//! │  ┌────────────┐  ┌───────────────┐  ┌──────────────┐         │
//! │  │ Parameters │  │ ResourceNames │  │ Registration │         │
//! │  └─────┬──────┘  └───────┬───────┘  └──────┬───────┘         │
//! │        └─────────────────┴─────────────────┘                 │
//! │                          │                                   │
//! │                    ┌─────▼─────┐                             │
//! │                    │ Composer  │                             │
//! │                    └─────┬─────┘                             │
//! │                          │                                   │
//! │            SettingsMap + AuthPolicy + Outputs                │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! Settings precedence, lowest to highest: passthrough, storage endpoints,
//! baseline, Application Insights, auth, token exchange.
//!
//! Composition is pure: no I/O, no retries. Resource creation is owned by the
//! provisioning engine that receives these documents.

pub mod auth_policy;
pub mod blocks;
pub mod composer;
pub mod constants;
pub mod directory;
pub mod feature_flags;
pub mod identity;
pub mod loader;
pub mod naming;
pub mod outputs;
pub mod parameters;
pub mod plan;
pub mod preauth;
pub mod roles;
pub mod settings;

// Re-export main types
pub use auth_policy::AuthPolicy;
pub use composer::{Composition, CompositionInput, compose};
pub use directory::{AppRegistration, AppRegistrationRequest, IdentityDirectory, InMemoryDirectory};
pub use feature_flags::FeatureFlags;
pub use identity::{AppInsightsRef, AuthParams, Identity, StorageAccountRef, StorageEndpoints};
pub use loader::DeploymentFile;
pub use naming::ResourceNames;
pub use outputs::DeploymentOutputs;
pub use parameters::DeploymentParameters;
pub use plan::DeploymentPlan;
pub use settings::{SettingsLayer, SettingsMap};

/// Error types for composition and planning
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Setting '{key}' defined by both {first} and {second} with different values")]
    KeyCollision {
        key: String,
        first: SettingsLayer,
        second: SettingsLayer,
    },

    #[error("Directory error: {0}")]
    Directory(String),
}

impl ConfigError {
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }

    pub fn directory(msg: impl Into<String>) -> Self {
        Self::Directory(msg.into())
    }
}

/// Result type for composition operations
pub type Result<T> = std::result::Result<T, ConfigError>;
