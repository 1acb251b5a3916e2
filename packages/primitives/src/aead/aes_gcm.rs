//! AES-GCM with a random 96-bit nonce
//!
//! Ciphertext layout: nonce (12 bytes) ‖ encrypted plaintext ‖ tag (16 bytes).

use super::{NONCE_SIZE, TAG_SIZE};
use crate::common::{parse_key, parse_record, random_bytes, validate_version};
use aes_gcm::aead::{Aead as _, KeyInit, Payload, generic_array::GenericArray};
use aes_gcm::{Aes128Gcm, Aes256Gcm};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tessera_keyset::{
    Aead, Error, KeyData, KeyManager, KeyMaterialType, Primitive, PrimitiveKind, Result, codec,
};
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Type URL of [`AesGcmKey`]
pub const AES_GCM_TYPE_URL: &str = "type.tessera.dev/tessera.AesGcmKey";

/// Parameters for generating an AES-GCM key
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AesGcmKeyFormat {
    /// Key length in bytes, 16 or 32
    pub key_size: u32,
}

/// Serialized AES-GCM key
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
pub struct AesGcmKey {
    /// Key version
    pub version: u32,
    /// Raw AES key
    #[serde(with = "tessera_keyset::codec::bytes")]
    pub key_value: Vec<u8>,
}

fn validate_key_size(size: usize) -> Result<()> {
    match size {
        16 | 32 => Ok(()),
        _ => Err(Error::invalid_parameters(format!(
            "invalid AES-GCM key size {size}, valid sizes are 16 and 32 bytes"
        ))),
    }
}

enum Cipher {
    Aes128(Aes128Gcm),
    Aes256(Aes256Gcm),
}

/// AES-GCM AEAD primitive
pub struct AesGcm {
    cipher: Cipher,
}

impl AesGcm {
    /// Create the primitive from a 16 or 32 byte key
    pub fn new(key: &[u8]) -> Result<Self> {
        validate_key_size(key.len())?;
        let cipher = if key.len() == 16 {
            Aes128Gcm::new_from_slice(key).map(Cipher::Aes128)
        } else {
            Aes256Gcm::new_from_slice(key).map(Cipher::Aes256)
        }
        .map_err(|e| Error::invalid_parameters(format!("invalid AES-GCM key: {e}")))?;
        Ok(Self { cipher })
    }
}

impl Aead for AesGcm {
    fn encrypt(&self, plaintext: &[u8], associated_data: &[u8]) -> Result<Vec<u8>> {
        let nonce = random_bytes(NONCE_SIZE);
        let nonce_array = GenericArray::from_slice(&nonce);
        let payload = Payload {
            msg: plaintext,
            aad: associated_data,
        };
        let ciphertext = match &self.cipher {
            Cipher::Aes128(cipher) => cipher.encrypt(nonce_array, payload),
            Cipher::Aes256(cipher) => cipher.encrypt(nonce_array, payload),
        }
        .map_err(|_| Error::encryption("AES-GCM encryption failed"))?;

        let mut output = Vec::with_capacity(NONCE_SIZE + ciphertext.len());
        output.extend_from_slice(&nonce);
        output.extend_from_slice(&ciphertext);
        Ok(output)
    }

    fn decrypt(&self, ciphertext: &[u8], associated_data: &[u8]) -> Result<Vec<u8>> {
        if ciphertext.len() < NONCE_SIZE + TAG_SIZE {
            return Err(Error::decryption("ciphertext too short"));
        }
        let (nonce, body) = ciphertext.split_at(NONCE_SIZE);
        let nonce_array = GenericArray::from_slice(nonce);
        let payload = Payload {
            msg: body,
            aad: associated_data,
        };
        match &self.cipher {
            Cipher::Aes128(cipher) => cipher.decrypt(nonce_array, payload),
            Cipher::Aes256(cipher) => cipher.decrypt(nonce_array, payload),
        }
        .map_err(|_| Error::decryption("AES-GCM authentication failed"))
    }
}

/// Key manager for [`AesGcmKey`]
#[derive(Clone, Copy, Debug, Default)]
pub struct AesGcmKeyManager;

impl KeyManager for AesGcmKeyManager {
    fn type_url(&self) -> &str {
        AES_GCM_TYPE_URL
    }

    fn primitive_kind(&self) -> PrimitiveKind {
        PrimitiveKind::Aead
    }

    fn key_material_type(&self) -> KeyMaterialType {
        KeyMaterialType::Symmetric
    }

    fn primitive(&self, key_data: &KeyData) -> Result<Primitive> {
        let key: AesGcmKey = parse_key(key_data, AES_GCM_TYPE_URL)?;
        validate_version(key.version)?;
        Ok(Primitive::Aead(Arc::new(AesGcm::new(&key.key_value)?)))
    }

    fn new_key(&self, serialized_key_format: &[u8]) -> Result<Vec<u8>> {
        let format: AesGcmKeyFormat = parse_record(serialized_key_format, "AesGcmKeyFormat")?;
        validate_key_size(format.key_size as usize)?;
        let key = AesGcmKey {
            version: 0,
            key_value: random_bytes(format.key_size as usize).to_vec(),
        };
        codec::encode(&key)
    }
}
