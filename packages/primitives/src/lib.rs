//! Key managers and key templates for the tessera keyset system
//!
//! Each module provides the serialized key records, the primitive and the
//! [`KeyManager`](tessera_keyset::KeyManager) for one family of keys.
//! [`register_all`] installs every manager in a registry.

#![forbid(unsafe_code)]

pub mod aead;
mod common;
pub mod daead;
pub mod hybrid;
pub mod mac;
pub mod signature;
pub mod templates;

pub use common::{EllipticCurveType, HashType};

use tessera_keyset::{Registry, Result};
use tracing::info;

/// Register the AEAD managers
pub fn register_aead(registry: &Registry, new_key_allowed: bool) -> Result<()> {
    registry.register_key_manager(aead::AesGcmKeyManager, new_key_allowed)?;
    registry.register_key_manager(aead::ChaCha20Poly1305KeyManager, new_key_allowed)
}

/// Register the deterministic AEAD manager
pub fn register_deterministic_aead(registry: &Registry, new_key_allowed: bool) -> Result<()> {
    registry.register_key_manager(daead::AesSivKeyManager, new_key_allowed)
}

/// Register the MAC manager
pub fn register_mac(registry: &Registry, new_key_allowed: bool) -> Result<()> {
    registry.register_key_manager(mac::HmacKeyManager, new_key_allowed)
}

/// Register the signing and verification managers
pub fn register_signature(registry: &Registry, new_key_allowed: bool) -> Result<()> {
    registry.register_asymmetric_key_managers(
        signature::EcdsaSignKeyManager,
        signature::EcdsaVerifyKeyManager,
        new_key_allowed,
    )
}

/// Register the hybrid encryption managers
pub fn register_hybrid(registry: &Registry, new_key_allowed: bool) -> Result<()> {
    // Hybrid keys wrap AES-GCM, so the AEAD family comes along.
    register_aead(registry, new_key_allowed)?;
    registry.register_asymmetric_key_managers(
        hybrid::EciesHkdfPrivateKeyManager,
        hybrid::EciesHkdfPublicKeyManager,
        new_key_allowed,
    )
}

/// Register every key manager of this crate
pub fn register_all(registry: &Registry, new_key_allowed: bool) -> Result<()> {
    register_aead(registry, new_key_allowed)?;
    register_deterministic_aead(registry, new_key_allowed)?;
    register_mac(registry, new_key_allowed)?;
    register_signature(registry, new_key_allowed)?;
    register_hybrid(registry, new_key_allowed)?;
    info!(
        key_types = registry.type_urls().len(),
        new_key_allowed, "registered all key managers"
    );
    Ok(())
}
