//! Key manager contracts.
//!
//! A key manager owns one key type: it parses that type's serialized keys,
//! generates new ones from a serialized key format and instantiates the
//! matching primitive. Managers for private asymmetric keys also implement
//! [`PrivateKeyManager`] and expose it through [`KeyManager::as_private`].

use crate::error::Result;
use crate::keyset::{KeyData, KeyMaterialType};
use crate::primitive::{Primitive, PrimitiveKind};

/// Handler for one key type
pub trait KeyManager: Send + Sync + 'static {
    /// Type URL of the keys this manager handles
    fn type_url(&self) -> &str;

    /// Kind of primitive this manager produces
    fn primitive_kind(&self) -> PrimitiveKind;

    /// Material type of generated keys
    fn key_material_type(&self) -> KeyMaterialType;

    /// Instantiate the primitive for `key_data`
    fn primitive(&self, key_data: &KeyData) -> Result<Primitive>;

    /// Generate a serialized key from a serialized key format
    fn new_key(&self, serialized_key_format: &[u8]) -> Result<Vec<u8>>;

    /// Generate key data from a serialized key format
    fn new_key_data(&self, serialized_key_format: &[u8]) -> Result<KeyData> {
        Ok(KeyData::new(
            self.type_url(),
            self.new_key(serialized_key_format)?,
            self.key_material_type(),
        ))
    }

    /// The private-key refinement, if this manager has one
    fn as_private(&self) -> Option<&dyn PrivateKeyManager> {
        None
    }
}

/// Handler for a private asymmetric key type
pub trait PrivateKeyManager: KeyManager {
    /// Type URL of the public keys derived by this manager
    fn public_key_type_url(&self) -> &str;

    /// Derive the public key data from a serialized private key
    fn public_key_data(&self, serialized_private_key: &[u8]) -> Result<KeyData>;
}
