//! App settings merging with precedence ordering
//!
//! Precedence order (lowest to highest):
//! 1. Passthrough - Caller-supplied settings
//! 2. StorageEndpoints - Per-flag storage service URIs
//! 3. Baseline - Always-present identity and storage settings
//! 4. AppInsights - Monitoring authentication and connection string
//! 5. Auth - Built-in authentication hints
//! 6. TokenExchange - Token exchange audience
//!
//! Computed layers win over passthrough on key collision. Two computed layers
//! must never disagree on a key.

use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use tracing::debug;

use crate::ConfigError;

/// Source layer of a setting, ordered by precedence
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SettingsLayer {
    Passthrough = 0,
    StorageEndpoints = 10,
    Baseline = 20,
    AppInsights = 30,
    Auth = 40,
    TokenExchange = 50,
}

/// The order blocks are folded in. Later entries override earlier ones.
pub const MERGE_ORDER: [SettingsLayer; 6] = [
    SettingsLayer::Passthrough,
    SettingsLayer::StorageEndpoints,
    SettingsLayer::Baseline,
    SettingsLayer::AppInsights,
    SettingsLayer::Auth,
    SettingsLayer::TokenExchange,
];

impl SettingsLayer {
    pub fn as_str(&self) -> &'static str {
        match self {
            SettingsLayer::Passthrough => "passthrough",
            SettingsLayer::StorageEndpoints => "storage_endpoints",
            SettingsLayer::Baseline => "baseline",
            SettingsLayer::AppInsights => "app_insights",
            SettingsLayer::Auth => "auth",
            SettingsLayer::TokenExchange => "token_exchange",
        }
    }

    /// Whether the layer is produced by the composer rather than the caller
    pub fn is_computed(&self) -> bool {
        !matches!(self, SettingsLayer::Passthrough)
    }
}

impl fmt::Display for SettingsLayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Settings contributed by a single block
pub type PartialSettings = BTreeMap<String, String>;

/// Build a partial map from literal pairs
pub fn partial<K, V, I>(pairs: I) -> PartialSettings
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<String>,
{
    pairs
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect()
}

/// Tracked value with its source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackedValue {
    pub value: String,
    pub layer: SettingsLayer,
}

/// Flat settings map with tracking of which layer each key came from
///
/// Keys are kept sorted so serialized output is reproducible.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SettingsMap {
    entries: BTreeMap<String, TrackedValue>,
}

impl SettingsMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge a partial map from the given layer
    ///
    /// A key already set by a lower or equal layer is overridden. A key set by
    /// a higher layer is kept. Two computed layers setting one key to different
    /// values is a [`ConfigError::KeyCollision`].
    pub fn merge(&mut self, partial: PartialSettings, layer: SettingsLayer) -> Result<(), ConfigError> {
        for (key, value) in partial {
            match self.entries.get_mut(&key) {
                Some(existing) => {
                    if existing.layer.is_computed() && layer.is_computed() {
                        if existing.value != value {
                            return Err(ConfigError::KeyCollision {
                                key,
                                first: existing.layer,
                                second: layer,
                            });
                        }
                        continue;
                    }

                    if existing.layer <= layer {
                        debug!(
                            key = %key,
                            from = %existing.layer,
                            to = %layer,
                            "setting overridden by higher precedence layer"
                        );
                        *existing = TrackedValue { value, layer };
                    }
                }
                None => {
                    self.entries.insert(key, TrackedValue { value, layer });
                }
            }
        }
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(|t| t.value.as_str())
    }

    /// Get the layer a key came from
    pub fn source(&self, key: &str) -> Option<SettingsLayer> {
        self.entries.get(key).map(|t| t.layer)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(k, t)| (k.as_str(), t.value.as_str()))
    }
}

impl Serialize for SettingsMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_order_is_ascending() {
        let mut sorted = MERGE_ORDER;
        sorted.sort();
        assert_eq!(sorted, MERGE_ORDER);
        assert_eq!(MERGE_ORDER[0], SettingsLayer::Passthrough);
    }

    #[test]
    fn test_computed_overrides_passthrough() {
        let mut map = SettingsMap::new();
        map.merge(
            partial([("AzureWebJobsStorage__credential", "connectionstring"), ("CUSTOM", "1")]),
            SettingsLayer::Passthrough,
        )
        .unwrap();
        map.merge(
            partial([("AzureWebJobsStorage__credential", "managedidentity")]),
            SettingsLayer::Baseline,
        )
        .unwrap();

        assert_eq!(map.get("AzureWebJobsStorage__credential"), Some("managedidentity"));
        assert_eq!(
            map.source("AzureWebJobsStorage__credential"),
            Some(SettingsLayer::Baseline)
        );
        assert_eq!(map.get("CUSTOM"), Some("1"));
        assert_eq!(map.source("CUSTOM"), Some(SettingsLayer::Passthrough));
    }

    #[test]
    fn test_passthrough_does_not_override_computed() {
        let mut map = SettingsMap::new();
        map.merge(partial([("KEY", "computed")]), SettingsLayer::Baseline)
            .unwrap();
        map.merge(partial([("KEY", "caller")]), SettingsLayer::Passthrough)
            .unwrap();
        assert_eq!(map.get("KEY"), Some("computed"));
    }

    #[test]
    fn test_computed_collision_is_error() {
        let mut map = SettingsMap::new();
        map.merge(partial([("KEY", "a")]), SettingsLayer::Baseline)
            .unwrap();
        let err = map
            .merge(partial([("KEY", "b")]), SettingsLayer::Auth)
            .unwrap_err();
        match err {
            ConfigError::KeyCollision { key, first, second } => {
                assert_eq!(key, "KEY");
                assert_eq!(first, SettingsLayer::Baseline);
                assert_eq!(second, SettingsLayer::Auth);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_computed_agreement_is_allowed() {
        let mut map = SettingsMap::new();
        map.merge(partial([("KEY", "same")]), SettingsLayer::Baseline)
            .unwrap();
        map.merge(partial([("KEY", "same")]), SettingsLayer::Auth)
            .unwrap();
        assert_eq!(map.source("KEY"), Some(SettingsLayer::Baseline));
    }

    #[test]
    fn test_serializes_as_sorted_flat_map() {
        let mut map = SettingsMap::new();
        map.merge(partial([("b", "2"), ("a", "1")]), SettingsLayer::Passthrough)
            .unwrap();
        let json = serde_json::to_string(&map).unwrap();
        assert_eq!(json, r#"{"a":"1","b":"2"}"#);
    }
}
