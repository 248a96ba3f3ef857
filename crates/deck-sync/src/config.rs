//! Sync manager configuration

use deck_filter::DEFAULT_ID_PROPERTY;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Collection sync manager configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Item property holding the record id
    pub id_property: String,
    /// Delay before an update settles, in milliseconds
    pub settle_delay_ms: u64,
    /// Buffered collection notifications before slow receivers lag
    pub channel_capacity: usize,
}

impl SyncConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With id property
    #[inline]
    #[must_use]
    pub fn with_id_property(mut self, property: impl Into<String>) -> Self {
        self.id_property = property.into();
        self
    }

    /// With settle delay
    #[inline]
    #[must_use]
    pub fn with_settle_delay(mut self, delay: Duration) -> Self {
        self.settle_delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// With channel capacity
    #[inline]
    #[must_use]
    pub fn with_channel_capacity(mut self, capacity: usize) -> Self {
        self.channel_capacity = capacity;
        self
    }

    /// Settle delay as a duration
    #[inline]
    #[must_use]
    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            id_property: DEFAULT_ID_PROPERTY.to_string(),
            settle_delay_ms: 0,
            channel_capacity: 64,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = SyncConfig::new();
        assert_eq!(config.id_property, "id");
        assert_eq!(config.settle_delay(), Duration::ZERO);
        assert_eq!(config.channel_capacity, 64);
    }

    #[test]
    fn partial_config_fills_defaults() {
        let config: SyncConfig = serde_json::from_str(r#"{"settle_delay_ms": 250}"#).unwrap();
        assert_eq!(config.settle_delay(), Duration::from_millis(250));
        assert_eq!(config.id_property, "id");
    }

    #[test]
    fn builder_overrides() {
        let config = SyncConfig::new()
            .with_id_property("cardId")
            .with_settle_delay(Duration::from_secs(2))
            .with_channel_capacity(8);
        assert_eq!(config.id_property, "cardId");
        assert_eq!(config.settle_delay_ms, 2000);
        assert_eq!(config.channel_capacity, 8);
    }
}
