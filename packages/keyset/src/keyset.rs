//! Keyset data model
//!
//! These records are what gets persisted. A [`Keyset`] owns its keys and their
//! key material; [`KeysetInfo`] is the redacted projection that is safe to log.

use serde::{Deserialize, Serialize};
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Lifecycle state of a key
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum KeyStatus {
    /// Unset or unrecognized status; never valid
    #[serde(rename = "UNKNOWN_STATUS")]
    Unknown,
    /// The key can be used
    Enabled,
    /// The key is kept for bookkeeping but cannot be used
    Disabled,
    /// The key material has been removed
    Destroyed,
}

/// Prefix prepended to ciphertexts, MACs and signatures produced by a key
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OutputPrefixType {
    /// Unset or unrecognized prefix type; never valid
    #[serde(rename = "UNKNOWN_PREFIX")]
    Unknown,
    /// `0x01` followed by the big-endian key id
    Tink,
    /// `0x00` followed by the big-endian key id
    Legacy,
    /// No prefix
    Raw,
    /// `0x00` followed by the big-endian key id
    Crunchy,
}

/// Kind of key material held in [`KeyData`]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum KeyMaterialType {
    /// Unset or unrecognized material type
    #[serde(rename = "UNKNOWN_KEYMATERIAL")]
    Unknown,
    /// Secret key shared by both parties
    Symmetric,
    /// Private half of a key pair
    AsymmetricPrivate,
    /// Public half of a key pair
    AsymmetricPublic,
    /// Key held outside this process
    Remote,
}

/// Serialized key material together with the type URL of its key manager
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
#[serde(rename_all = "camelCase")]
pub struct KeyData {
    /// Identifies the key manager able to use this key
    pub type_url: String,
    /// Key-manager specific serialized key
    #[serde(with = "crate::codec::bytes")]
    pub value: Vec<u8>,
    /// Kind of key material
    #[zeroize(skip)]
    pub key_material_type: KeyMaterialType,
}

impl KeyData {
    /// Create key data
    pub fn new(
        type_url: impl Into<String>,
        value: Vec<u8>,
        key_material_type: KeyMaterialType,
    ) -> Self {
        Self {
            type_url: type_url.into(),
            value,
            key_material_type,
        }
    }
}

impl fmt::Debug for KeyData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyData")
            .field("type_url", &self.type_url)
            .field("value", &format_args!("<redacted {} bytes>", self.value.len()))
            .field("key_material_type", &self.key_material_type)
            .finish()
    }
}

/// One versioned key of a keyset
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Key {
    /// Key material; absent keys fail validation
    #[serde(default)]
    pub key_data: Option<KeyData>,
    /// Lifecycle state
    pub status: KeyStatus,
    /// Identifier, unique within a keyset
    pub key_id: u32,
    /// Prefix applied to the key's outputs
    pub output_prefix_type: OutputPrefixType,
}

impl Key {
    /// Create a key
    pub fn new(
        key_data: KeyData,
        status: KeyStatus,
        key_id: u32,
        output_prefix_type: OutputPrefixType,
    ) -> Self {
        Self {
            key_data: Some(key_data),
            status,
            key_id,
            output_prefix_type,
        }
    }

    /// Type URL of the key data, empty when the key has none
    pub fn type_url(&self) -> &str {
        self.key_data.as_ref().map_or("", |data| data.type_url.as_str())
    }

    /// Redacted view of the key
    pub fn info(&self) -> KeyInfo {
        KeyInfo {
            type_url: self.type_url().to_string(),
            status: self.status,
            key_id: self.key_id,
            output_prefix_type: self.output_prefix_type,
        }
    }
}

/// An ordered collection of keys with a designated primary
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Keyset {
    /// Key id of the primary key
    #[serde(default)]
    pub primary_key_id: u32,
    /// Keys in rotation order
    #[serde(rename = "key", default)]
    pub keys: Vec<Key>,
}

impl Keyset {
    /// Create a keyset
    pub fn new(primary_key_id: u32, keys: Vec<Key>) -> Self {
        Self {
            primary_key_id,
            keys,
        }
    }

    /// Redacted view of the keyset
    pub fn info(&self) -> KeysetInfo {
        KeysetInfo {
            primary_key_id: self.primary_key_id,
            key_info: self.keys.iter().map(Key::info).collect(),
        }
    }
}

/// Redacted view of a [`Key`], without key material
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyInfo {
    /// Type URL of the key data
    pub type_url: String,
    /// Lifecycle state
    pub status: KeyStatus,
    /// Identifier
    pub key_id: u32,
    /// Prefix applied to the key's outputs
    pub output_prefix_type: OutputPrefixType,
}

/// Redacted view of a [`Keyset`], safe to log or display
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeysetInfo {
    /// Key id of the primary key
    #[serde(default)]
    pub primary_key_id: u32,
    /// One entry per key, in keyset order
    #[serde(default)]
    pub key_info: Vec<KeyInfo>,
}

/// A keyset encrypted under a master AEAD, with its redacted info in the clear
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EncryptedKeyset {
    /// Serialized keyset encrypted with empty associated data
    #[serde(with = "crate::codec::bytes")]
    pub encrypted_keyset: Vec<u8>,
    /// Redacted view of the encrypted keyset
    #[serde(default)]
    pub keyset_info: Option<KeysetInfo>,
}

/// Parameters for generating a key
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyTemplate {
    /// Type URL of the key manager that generates the key
    pub type_url: String,
    /// Key-manager specific serialized key format
    #[serde(with = "crate::codec::bytes")]
    pub value: Vec<u8>,
    /// Prefix applied to the generated key's outputs
    pub output_prefix_type: OutputPrefixType,
}

impl KeyTemplate {
    /// Create a key template
    pub fn new(
        type_url: impl Into<String>,
        value: Vec<u8>,
        output_prefix_type: OutputPrefixType,
    ) -> Self {
        Self {
            type_url: type_url.into(),
            value,
            output_prefix_type,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_keyset() -> Keyset {
        Keyset::new(
            2,
            vec![
                Key::new(
                    KeyData::new("t1", b"v1".to_vec(), KeyMaterialType::Symmetric),
                    KeyStatus::Enabled,
                    1,
                    OutputPrefixType::Tink,
                ),
                Key::new(
                    KeyData::new("t2", b"v2".to_vec(), KeyMaterialType::Symmetric),
                    KeyStatus::Destroyed,
                    2,
                    OutputPrefixType::Raw,
                ),
            ],
        )
    }

    #[test]
    fn info_drops_key_material() {
        let info = sample_keyset().info();
        assert_eq!(info.primary_key_id, 2);
        assert_eq!(
            info.key_info,
            vec![
                KeyInfo {
                    type_url: "t1".into(),
                    status: KeyStatus::Enabled,
                    key_id: 1,
                    output_prefix_type: OutputPrefixType::Tink,
                },
                KeyInfo {
                    type_url: "t2".into(),
                    status: KeyStatus::Destroyed,
                    key_id: 2,
                    output_prefix_type: OutputPrefixType::Raw,
                },
            ]
        );
    }

    #[test]
    fn debug_output_redacts_key_value() {
        let data = KeyData::new("t", b"secret".to_vec(), KeyMaterialType::Symmetric);
        let rendered = format!("{data:?}");
        assert!(!rendered.contains("secret"));
        assert!(rendered.contains("<redacted 6 bytes>"));
    }

    #[test]
    fn json_uses_wire_names() {
        let json = serde_json::to_value(sample_keyset()).unwrap();
        assert_eq!(json["primaryKeyId"], 2);
        assert_eq!(json["key"][0]["status"], "ENABLED");
        assert_eq!(json["key"][0]["outputPrefixType"], "TINK");
        assert_eq!(json["key"][0]["keyData"]["typeUrl"], "t1");
        assert_eq!(json["key"][0]["keyData"]["keyMaterialType"], "SYMMETRIC");
        assert_eq!(json["key"][1]["status"], "DESTROYED");
    }
}
