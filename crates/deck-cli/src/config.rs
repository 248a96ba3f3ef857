//! `deck` configuration file

use anyhow::Context;
use deck_filter::RegistryConfig;
use deck_sync::SyncConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Properties list views filter by when no file says otherwise
pub const DEFAULT_ALLOWED_PROPERTIES: [&str; 3] = ["currentWorkflow", "cardTitle", "campaignId"];

/// Top-level TOML configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeckConfig {
    /// Item properties the list view filters by
    pub allowed_properties: Vec<String>,
    /// Filter registry settings
    pub registry: RegistryConfig,
    /// Sync manager settings
    pub sync: SyncConfig,
}

impl DeckConfig {
    /// Read `path`, or use defaults when no path is given
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        toml::from_str(&text).with_context(|| format!("parsing config {}", path.display()))
    }
}

impl Default for DeckConfig {
    fn default() -> Self {
        Self {
            allowed_properties: DEFAULT_ALLOWED_PROPERTIES
                .iter()
                .map(ToString::to_string)
                .collect(),
            registry: RegistryConfig::default(),
            sync: SyncConfig::default(),
        }
    }
}
