//! AES-SIV deterministic AEAD (RFC 5297).
//!
//! Keys are 64 bytes: a CMAC key followed by an AES-256-CTR key. The
//! associated data is the single header of the S2V chain. Ciphertext layout:
//! synthetic IV (16 bytes) ‖ CTR output.

use crate::common::{parse_key, parse_record, random_bytes, validate_version};
use aes_siv::KeyInit;
use aes_siv::siv::{Aes128Siv, Aes256Siv};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tessera_keyset::{
    DeterministicAead, Error, KeyData, KeyManager, KeyMaterialType, Primitive, PrimitiveKind,
    Result, codec,
};
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

/// Type URL of [`AesSivKey`]
pub const AES_SIV_TYPE_URL: &str = "type.tessera.dev/tessera.AesSivKey";

const KEY_SIZE: usize = 64;
const SIV_SIZE: usize = 16;

/// Parameters for generating a deterministic AEAD key
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AesSivKeyFormat {
    /// Key length in bytes; only 64 is supported
    pub key_size: u32,
}

/// Serialized deterministic AEAD key
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
pub struct AesSivKey {
    /// Key version
    pub version: u32,
    /// CMAC key followed by encryption key
    #[serde(with = "tessera_keyset::codec::bytes")]
    pub key_value: Vec<u8>,
}

fn validate_key_size(size: usize) -> Result<()> {
    if size != KEY_SIZE {
        return Err(Error::invalid_parameters(format!(
            "invalid AES-SIV key size {size}, expected {KEY_SIZE} bytes"
        )));
    }
    Ok(())
}

enum Cipher {
    Aes128(Aes128Siv),
    Aes256(Aes256Siv),
}

/// Deterministic AEAD primitive
pub struct AesSiv {
    key: Zeroizing<Vec<u8>>,
}

impl AesSiv {
    /// Create the primitive from a 32-byte (AES-128) or 64-byte (AES-256) key
    pub fn new(key: &[u8]) -> Result<Self> {
        if key.len() != 32 && key.len() != KEY_SIZE {
            return Err(Error::invalid_parameters(format!(
                "invalid AES-SIV key size {}, expected 32 or {KEY_SIZE} bytes",
                key.len()
            )));
        }
        Ok(Self {
            key: Zeroizing::new(key.to_vec()),
        })
    }

    // The SIV state is consumed per message, so each call gets a fresh one.
    fn cipher(&self) -> Result<Cipher> {
        if self.key.len() == 32 {
            Aes128Siv::new_from_slice(&self.key).map(Cipher::Aes128)
        } else {
            Aes256Siv::new_from_slice(&self.key).map(Cipher::Aes256)
        }
        .map_err(|e| Error::invalid_parameters(format!("invalid AES-SIV key: {e}")))
    }
}

impl DeterministicAead for AesSiv {
    fn encrypt_deterministically(
        &self,
        plaintext: &[u8],
        associated_data: &[u8],
    ) -> Result<Vec<u8>> {
        match self.cipher()? {
            Cipher::Aes128(mut cipher) => cipher.encrypt([associated_data], plaintext),
            Cipher::Aes256(mut cipher) => cipher.encrypt([associated_data], plaintext),
        }
        .map_err(|_| Error::encryption("AES-SIV encryption failed"))
    }

    fn decrypt_deterministically(
        &self,
        ciphertext: &[u8],
        associated_data: &[u8],
    ) -> Result<Vec<u8>> {
        if ciphertext.len() < SIV_SIZE {
            return Err(Error::decryption("ciphertext too short"));
        }
        match self.cipher()? {
            Cipher::Aes128(mut cipher) => cipher.decrypt([associated_data], ciphertext),
            Cipher::Aes256(mut cipher) => cipher.decrypt([associated_data], ciphertext),
        }
        .map_err(|_| Error::decryption("synthetic IV mismatch"))
    }
}

/// Key manager for [`AesSivKey`]
#[derive(Clone, Copy, Debug, Default)]
pub struct AesSivKeyManager;

impl KeyManager for AesSivKeyManager {
    fn type_url(&self) -> &str {
        AES_SIV_TYPE_URL
    }

    fn primitive_kind(&self) -> PrimitiveKind {
        PrimitiveKind::DeterministicAead
    }

    fn key_material_type(&self) -> KeyMaterialType {
        KeyMaterialType::Symmetric
    }

    fn primitive(&self, key_data: &KeyData) -> Result<Primitive> {
        let key: AesSivKey = parse_key(key_data, AES_SIV_TYPE_URL)?;
        validate_version(key.version)?;
        validate_key_size(key.key_value.len())?;
        Ok(Primitive::DeterministicAead(Arc::new(AesSiv::new(
            &key.key_value,
        )?)))
    }

    fn new_key(&self, serialized_key_format: &[u8]) -> Result<Vec<u8>> {
        let format: AesSivKeyFormat = parse_record(serialized_key_format, "AesSivKeyFormat")?;
        validate_key_size(format.key_size as usize)?;
        let key = AesSivKey {
            version: 0,
            key_value: random_bytes(KEY_SIZE).to_vec(),
        };
        codec::encode(&key)
    }
}
