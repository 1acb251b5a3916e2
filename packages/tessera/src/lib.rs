//! Keyset-based cryptography with key rotation
//!
//! `tessera` bundles the keyset core ([`tessera_keyset`]) with the concrete
//! key managers ([`tessera_primitives`]) and a small configuration layer.
//!
//! ```no_run
//! use tessera::prelude::*;
//!
//! # fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
//! let registry = tessera::registry()?;
//! let handle = KeysetHandle::generate_new(&registry, &templates::aes256_gcm()?)?;
//! let aead = handle.primitive::<dyn Aead>(&registry)?;
//! let ciphertext = aead.encrypt(b"message", b"context")?;
//! assert_eq!(aead.decrypt(&ciphertext, b"context")?, b"message");
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]

pub mod config;

pub use config::{ConfigError, KeyFamilies, TesseraConfig};
pub use tessera_keyset as keyset;
pub use tessera_keyset::{
    BinaryKeysetReader, BinaryKeysetWriter, Error, JsonKeysetReader, JsonKeysetWriter, KeyTemplate,
    Keyset, KeysetHandle, KeysetInfo, KeysetManager, KeysetReader, KeysetWriter, OutputPrefixType,
    Registry, Result,
};
pub use tessera_primitives as primitives;
pub use tessera_primitives::templates;

/// A registry holding every key manager, with key generation allowed
pub fn registry() -> Result<Registry> {
    let registry = Registry::new();
    tessera_primitives::register_all(&registry, true)?;
    Ok(registry)
}

/// Common imports
pub mod prelude {
    pub use crate::config::TesseraConfig;
    pub use crate::templates;
    pub use tessera_keyset::prelude::*;
}
