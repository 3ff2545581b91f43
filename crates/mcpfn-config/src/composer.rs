//! Configuration Composer
//!
//! Folds the settings blocks in [`MERGE_ORDER`] and builds the optional auth
//! policy. Pure: identical inputs give identical outputs.

use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{debug, info};

use crate::auth_policy::AuthPolicy;
use crate::blocks;
use crate::feature_flags::FeatureFlags;
use crate::identity::{AppInsightsRef, AuthParams, Identity, StorageAccountRef};
use crate::settings::{MERGE_ORDER, PartialSettings, SettingsLayer, SettingsMap};
use crate::Result;

/// Everything one composition pass reads
#[derive(Debug, Clone, Default)]
pub struct CompositionInput {
    pub flags: FeatureFlags,
    pub identity: Identity,
    pub storage: StorageAccountRef,
    pub content_share: String,
    pub app_insights: Option<AppInsightsRef>,
    pub auth: Option<AuthParams>,
    pub token_exchange_audience: String,
    /// Caller-supplied settings, lowest precedence
    pub passthrough: BTreeMap<String, String>,
}

/// Output documents of a composition pass
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Composition {
    pub app_settings: SettingsMap,
    pub auth_settings: Option<AuthPolicy>,
}

impl Composition {
    pub fn auth_enabled(&self) -> bool {
        self.auth_settings.is_some()
    }
}

/// Compose the app settings map and auth policy.
pub fn compose(input: &CompositionInput) -> Result<Composition> {
    // Validate everything up front so a failure never leaves a half-built map.
    let auth_settings = match input.auth.as_ref() {
        Some(auth) => AuthPolicy::build(auth)?,
        None => None,
    };

    let mut app_settings = SettingsMap::new();
    for layer in MERGE_ORDER {
        let Some(block) = block_for(layer, input)? else {
            debug!(layer = %layer, "block skipped");
            continue;
        };
        debug!(layer = %layer, keys = block.len(), "merging block");
        app_settings.merge(block, layer)?;
    }

    info!(
        settings = app_settings.len(),
        auth_enabled = auth_settings.is_some(),
        "composition complete"
    );

    Ok(Composition {
        app_settings,
        auth_settings,
    })
}

fn block_for(layer: SettingsLayer, input: &CompositionInput) -> Result<Option<PartialSettings>> {
    let block = match layer {
        SettingsLayer::Passthrough => Some(input.passthrough.clone()),
        SettingsLayer::StorageEndpoints => Some(blocks::storage_endpoint_settings(
            &input.flags,
            &input.storage.endpoints,
        )),
        SettingsLayer::Baseline => Some(blocks::baseline_settings(
            &input.identity,
            &input.storage,
            &input.content_share,
        )?),
        SettingsLayer::AppInsights => {
            blocks::app_insights_settings(&input.identity, input.app_insights.as_ref())
        }
        SettingsLayer::Auth => blocks::auth_settings(&input.identity, input.auth.as_ref()),
        SettingsLayer::TokenExchange => blocks::token_exchange_settings(&input.token_exchange_audience),
    };
    Ok(block)
}
