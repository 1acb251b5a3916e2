//! Registry configuration
//!
//! ```json
//! { "families": { "hybrid": false }, "newKeyAllowed": true }
//! ```
//!
//! Every field is optional; missing fields take the defaults below.

use serde::{Deserialize, Serialize};
use std::path::Path;
use tessera_keyset::Registry;
use tracing::{debug, info};

/// Errors raised while loading a configuration or building its registry
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The configuration file could not be read
    #[error("failed to read configuration file {path}: {source}")]
    Io {
        /// File that failed to load
        path: String,
        /// Underlying I/O failure
        #[source]
        source: std::io::Error,
    },

    /// The configuration is not valid JSON for [`TesseraConfig`]
    #[error("invalid configuration: {0}")]
    Parse(#[from] serde_json::Error),

    /// Registering a key manager failed
    #[error("failed to register key managers: {0}")]
    Registry(#[from] tessera_keyset::Error),
}

/// Key families to register
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct KeyFamilies {
    /// AES-GCM and ChaCha20-Poly1305
    pub aead: bool,
    /// Deterministic AEAD
    pub deterministic_aead: bool,
    /// HMAC
    pub mac: bool,
    /// ECDSA sign and verify
    pub signature: bool,
    /// ECIES encrypt and decrypt; also registers the AEAD family
    pub hybrid: bool,
}

impl Default for KeyFamilies {
    fn default() -> Self {
        Self {
            aead: true,
            deterministic_aead: true,
            mac: true,
            signature: true,
            hybrid: true,
        }
    }
}

fn default_new_key_allowed() -> bool {
    true
}

/// Which key managers a [`Registry`] gets and how they may be used
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TesseraConfig {
    /// Families to register
    #[serde(default)]
    pub families: KeyFamilies,
    /// Whether registered managers may generate new keys
    #[serde(default = "default_new_key_allowed")]
    pub new_key_allowed: bool,
}

impl Default for TesseraConfig {
    fn default() -> Self {
        Self {
            families: KeyFamilies::default(),
            new_key_allowed: default_new_key_allowed(),
        }
    }
}

impl TesseraConfig {
    /// Parse a JSON configuration
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a JSON configuration file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        debug!(path = %path.display(), "loaded configuration");
        Self::from_json(&json)
    }

    /// Install the configured managers into `registry`
    pub fn register(&self, registry: &Registry) -> Result<(), ConfigError> {
        let families = &self.families;
        let allowed = self.new_key_allowed;
        if families.aead {
            tessera_primitives::register_aead(registry, allowed)?;
        }
        if families.deterministic_aead {
            tessera_primitives::register_deterministic_aead(registry, allowed)?;
        }
        if families.mac {
            tessera_primitives::register_mac(registry, allowed)?;
        }
        if families.signature {
            tessera_primitives::register_signature(registry, allowed)?;
        }
        if families.hybrid {
            tessera_primitives::register_hybrid(registry, allowed)?;
        }
        info!(
            key_types = registry.type_urls().len(),
            new_key_allowed = allowed,
            "configured registry"
        );
        Ok(())
    }

    /// A fresh registry holding the configured managers
    pub fn build_registry(&self) -> Result<Registry, ConfigError> {
        let registry = Registry::new();
        self.register(&registry)?;
        Ok(registry)
    }
}
