//! Deployment file loading.
//!
//! Sources, lowest to highest precedence:
//! 1. TOML file (`mcpfn.toml` when no path is given)
//! 2. Environment variables - `MCPFN__*` pattern, e.g. `MCPFN__PARAMETERS__LOCATION=westus2`

use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::ConfigError;
use crate::directory::AppRegistration;
use crate::identity::{Identity, StorageEndpoints};
use crate::parameters::DeploymentParameters;

pub const DEFAULT_FILE: &str = "mcpfn.toml";
pub const ENV_PREFIX: &str = "MCPFN";

/// Identifiers reported back by the provisioning engine
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProvisionedResources {
    pub identity: Identity,
    pub tenant_id: String,
    /// Empty when monitoring is not wired
    pub app_insights_connection_string: String,
    /// Overrides the public-cloud endpoints derived from the account name
    pub storage_endpoints: Option<StorageEndpoints>,
}

/// Complete input of one planning pass
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DeploymentFile {
    pub parameters: DeploymentParameters,
    pub provisioned: ProvisionedResources,
    /// Result of a previous app registration, if any
    pub registration: Option<AppRegistration>,
    /// Passthrough app settings
    pub app_settings: BTreeMap<String, String>,
}

impl DeploymentFile {
    /// Load from a path (or the default file) with environment overrides.
    ///
    /// A missing default file is not an error; an explicit path must exist.
    ///
    /// `app_settings` keys are case-sensitive setting names, so that table is
    /// taken verbatim from the file and is not subject to env overrides.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let source = match path {
            Some(p) if !p.exists() => {
                return Err(ConfigError::parse(format!(
                    "deployment file not found: {}",
                    p.display()
                )));
            }
            Some(p) => Some(p.to_path_buf()),
            None => Some(PathBuf::from(DEFAULT_FILE)).filter(|p| p.exists()),
        };

        let mut builder = Config::builder();
        let mut app_settings = BTreeMap::new();
        if let Some(source) = source {
            let raw = std::fs::read_to_string(&source).map_err(|e| {
                ConfigError::parse(format!("failed to read {}: {e}", source.display()))
            })?;
            app_settings = Self::from_toml(&raw)?.app_settings;
            builder = builder.add_source(File::from(source).format(FileFormat::Toml));
        }
        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .try_parsing(true)
                .separator("__"),
        );

        let cfg = builder
            .build()
            .map_err(|e| ConfigError::parse(format!("config build error: {e}")))?;
        let mut file: DeploymentFile = cfg
            .try_deserialize()
            .map_err(|e| ConfigError::parse(format!("config deserialize error: {e}")))?;
        file.app_settings = app_settings;

        debug!(
            environment = %file.parameters.environment_name,
            location = %file.parameters.location,
            "deployment file loaded"
        );
        Ok(file)
    }

    /// Parse from a TOML string, without environment overrides
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        toml::from_str(toml_str).map_err(|e| ConfigError::parse(format!("TOML parse error: {e}")))
    }
}
