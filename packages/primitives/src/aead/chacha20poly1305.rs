//! ChaCha20-Poly1305 with a random 96-bit nonce

use super::{NONCE_SIZE, TAG_SIZE};
use crate::common::{parse_key, parse_record, random_bytes, validate_version};
use chacha20poly1305::aead::{Aead as _, KeyInit, Payload, generic_array::GenericArray};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tessera_keyset::{
    Aead, Error, KeyData, KeyManager, KeyMaterialType, Primitive, PrimitiveKind, Result, codec,
};
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Type URL of [`ChaCha20Poly1305Key`]
pub const CHACHA20_POLY1305_TYPE_URL: &str = "type.tessera.dev/tessera.ChaCha20Poly1305Key";

const KEY_SIZE: usize = 32;

/// Parameters for generating a ChaCha20-Poly1305 key; there are none
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChaCha20Poly1305KeyFormat {}

/// Serialized ChaCha20-Poly1305 key
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
pub struct ChaCha20Poly1305Key {
    /// Key version
    pub version: u32,
    /// Raw 32-byte key
    #[serde(with = "tessera_keyset::codec::bytes")]
    pub key_value: Vec<u8>,
}

/// ChaCha20-Poly1305 AEAD primitive
pub struct ChaCha20Poly1305 {
    cipher: chacha20poly1305::ChaCha20Poly1305,
}

impl ChaCha20Poly1305 {
    /// Create the primitive from a 32-byte key
    pub fn new(key: &[u8]) -> Result<Self> {
        if key.len() != KEY_SIZE {
            return Err(Error::invalid_parameters(format!(
                "invalid ChaCha20-Poly1305 key size {}, expected {KEY_SIZE}",
                key.len()
            )));
        }
        let cipher = chacha20poly1305::ChaCha20Poly1305::new_from_slice(key)
            .map_err(|e| Error::invalid_parameters(format!("invalid ChaCha20-Poly1305 key: {e}")))?;
        Ok(Self { cipher })
    }
}

impl Aead for ChaCha20Poly1305 {
    fn encrypt(&self, plaintext: &[u8], associated_data: &[u8]) -> Result<Vec<u8>> {
        let nonce = random_bytes(NONCE_SIZE);
        let ciphertext = self
            .cipher
            .encrypt(
                GenericArray::from_slice(&nonce),
                Payload {
                    msg: plaintext,
                    aad: associated_data,
                },
            )
            .map_err(|_| Error::encryption("ChaCha20-Poly1305 encryption failed"))?;
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
        self.cipher
            .decrypt(
                GenericArray::from_slice(nonce),
                Payload {
                    msg: body,
                    aad: associated_data,
                },
            )
            .map_err(|_| Error::decryption("ChaCha20-Poly1305 authentication failed"))
    }
}

/// Key manager for [`ChaCha20Poly1305Key`]
#[derive(Clone, Copy, Debug, Default)]
pub struct ChaCha20Poly1305KeyManager;

impl KeyManager for ChaCha20Poly1305KeyManager {
    fn type_url(&self) -> &str {
        CHACHA20_POLY1305_TYPE_URL
    }

    fn primitive_kind(&self) -> PrimitiveKind {
        PrimitiveKind::Aead
    }

    fn key_material_type(&self) -> KeyMaterialType {
        KeyMaterialType::Symmetric
    }

    fn primitive(&self, key_data: &KeyData) -> Result<Primitive> {
        let key: ChaCha20Poly1305Key = parse_key(key_data, CHACHA20_POLY1305_TYPE_URL)?;
        validate_version(key.version)?;
        Ok(Primitive::Aead(Arc::new(ChaCha20Poly1305::new(
            &key.key_value,
        )?)))
    }

    fn new_key(&self, serialized_key_format: &[u8]) -> Result<Vec<u8>> {
        let _: ChaCha20Poly1305KeyFormat =
            parse_record(serialized_key_format, "ChaCha20Poly1305KeyFormat")?;
        let key = ChaCha20Poly1305Key {
            version: 0,
            key_value: random_bytes(KEY_SIZE).to_vec(),
        };
        codec::encode(&key)
    }
}
