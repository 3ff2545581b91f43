//! Feature flags gating optional settings blocks
//!
//! Flags are computed once at the start of a composition pass and never
//! mutated afterwards. Each flag gates inclusion only; it says nothing about
//! whether the value it guards is non-empty.

use serde::{Deserialize, Serialize};

/// A single named flag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureFlag {
    /// Include the blob service endpoint and blob data role
    EnableBlob,
    /// Include the queue service endpoint and queue data role
    EnableQueue,
    /// Include the table service endpoint and table data role
    EnableTable,
    /// Grant data roles to the deploying user principal as well
    AllowUserIdentityPrincipal,
}

impl FeatureFlag {
    pub const ALL: [FeatureFlag; 4] = [
        FeatureFlag::EnableBlob,
        FeatureFlag::EnableQueue,
        FeatureFlag::EnableTable,
        FeatureFlag::AllowUserIdentityPrincipal,
    ];

    /// Flag name as it appears in deployment files
    pub fn name(&self) -> &'static str {
        match self {
            FeatureFlag::EnableBlob => "enable_blob",
            FeatureFlag::EnableQueue => "enable_queue",
            FeatureFlag::EnableTable => "enable_table",
            FeatureFlag::AllowUserIdentityPrincipal => "allow_user_identity_principal",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            FeatureFlag::EnableBlob => "Wire the blob service endpoint into app settings",
            FeatureFlag::EnableQueue => "Wire the queue service endpoint into app settings",
            FeatureFlag::EnableTable => "Wire the table service endpoint into app settings",
            FeatureFlag::AllowUserIdentityPrincipal => {
                "Grant storage and monitoring roles to the deploying user"
            }
        }
    }
}

/// Immutable set of composition flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureFlags {
    pub enable_blob: bool,
    pub enable_queue: bool,
    pub enable_table: bool,
    pub allow_user_identity_principal: bool,
}

impl Default for FeatureFlags {
    fn default() -> Self {
        Self {
            enable_blob: true,
            enable_queue: true,
            enable_table: true,
            allow_user_identity_principal: false,
        }
    }
}

impl FeatureFlags {
    /// All flags off
    pub fn none() -> Self {
        Self {
            enable_blob: false,
            enable_queue: false,
            enable_table: false,
            allow_user_identity_principal: false,
        }
    }

    /// Storage flags only, user principal grants off
    pub fn storage(blob: bool, queue: bool, table: bool) -> Self {
        Self {
            enable_blob: blob,
            enable_queue: queue,
            enable_table: table,
            allow_user_identity_principal: false,
        }
    }

    pub fn with_user_principal(mut self, allow: bool) -> Self {
        self.allow_user_identity_principal = allow;
        self
    }

    /// Check a single flag
    pub fn is_enabled(&self, flag: FeatureFlag) -> bool {
        match flag {
            FeatureFlag::EnableBlob => self.enable_blob,
            FeatureFlag::EnableQueue => self.enable_queue,
            FeatureFlag::EnableTable => self.enable_table,
            FeatureFlag::AllowUserIdentityPrincipal => self.allow_user_identity_principal,
        }
    }

    /// Iterate over the flags that are on
    pub fn enabled(&self) -> impl Iterator<Item = FeatureFlag> + '_ {
        FeatureFlag::ALL
            .into_iter()
            .filter(move |flag| self.is_enabled(*flag))
    }
}
