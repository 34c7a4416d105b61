use serde::{Deserialize, Serialize};

use crate::error::{CollectionError, Result};

pub const DEFAULT_PRIMARY_KEY: &str = "id";

/// Static configuration of a collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CollectionConfig {
    /// Field holding each record's identifier. Fixed for the collection's
    /// lifetime.
    pub primary_key: String,
}

impl Default for CollectionConfig {
    fn default() -> Self {
        Self {
            primary_key: DEFAULT_PRIMARY_KEY.to_string(),
        }
    }
}

impl CollectionConfig {
    pub fn with_primary_key(primary_key: impl Into<String>) -> Self {
        Self {
            primary_key: primary_key.into(),
        }
    }

    /// Parse a JSON config document. Missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.primary_key.is_empty() {
            return Err(CollectionError::InvalidConfig(
                "primary key field name must not be empty".into(),
            ));
        }
        Ok(())
    }
}
