//! Predefined key templates
//!
//! Each function returns a template ready for
//! [`tessera_keyset::KeysetHandle::generate_new`] or
//! [`tessera_keyset::KeysetManager::rotate`].

use crate::aead::{
    AES_GCM_TYPE_URL, AesGcmKeyFormat, CHACHA20_POLY1305_TYPE_URL, ChaCha20Poly1305KeyFormat,
};
use crate::common::{EllipticCurveType, HashType};
use crate::daead::{AES_SIV_TYPE_URL, AesSivKeyFormat};
use crate::hybrid::{ECIES_PRIVATE_KEY_TYPE_URL, EciesKeyFormat, EciesParams};
use crate::mac::{HMAC_TYPE_URL, HmacKeyFormat, HmacParams};
use crate::signature::{
    ECDSA_PRIVATE_KEY_TYPE_URL, EcdsaKeyFormat, EcdsaParams, EcdsaSignatureEncoding,
};
use serde::Serialize;
use tessera_keyset::{KeyTemplate, OutputPrefixType, Result, codec};

fn template<F: Serialize>(type_url: &str, format: &F, prefix: OutputPrefixType) -> Result<KeyTemplate> {
    Ok(KeyTemplate::new(type_url, codec::encode(format)?, prefix))
}

/// AES-GCM template with the given key size
pub fn create_aes_gcm_template(key_size: u32) -> Result<KeyTemplate> {
    template(
        AES_GCM_TYPE_URL,
        &AesGcmKeyFormat { key_size },
        OutputPrefixType::Tink,
    )
}

/// AES-128-GCM
pub fn aes128_gcm() -> Result<KeyTemplate> {
    create_aes_gcm_template(16)
}

/// AES-256-GCM
pub fn aes256_gcm() -> Result<KeyTemplate> {
    create_aes_gcm_template(32)
}

/// ChaCha20-Poly1305
pub fn chacha20_poly1305() -> Result<KeyTemplate> {
    template(
        CHACHA20_POLY1305_TYPE_URL,
        &ChaCha20Poly1305KeyFormat {},
        OutputPrefixType::Tink,
    )
}

/// Deterministic AEAD with a 64-byte SIV key
pub fn aes256_siv() -> Result<KeyTemplate> {
    template(
        AES_SIV_TYPE_URL,
        &AesSivKeyFormat { key_size: 64 },
        OutputPrefixType::Tink,
    )
}

/// HMAC template with the given key size, tag size and hash
pub fn create_hmac_template(key_size: u32, tag_size: u32, hash: HashType) -> Result<KeyTemplate> {
    template(
        HMAC_TYPE_URL,
        &HmacKeyFormat {
            params: HmacParams { hash, tag_size },
            key_size,
        },
        OutputPrefixType::Tink,
    )
}

/// HMAC-SHA256, 32-byte key, 16-byte tag
pub fn hmac_sha256_128bittag() -> Result<KeyTemplate> {
    create_hmac_template(32, 16, HashType::Sha256)
}

/// HMAC-SHA256, 32-byte key, 32-byte tag
pub fn hmac_sha256_256bittag() -> Result<KeyTemplate> {
    create_hmac_template(32, 32, HashType::Sha256)
}

/// HMAC-SHA512, 64-byte key, 32-byte tag
pub fn hmac_sha512_256bittag() -> Result<KeyTemplate> {
    create_hmac_template(64, 32, HashType::Sha512)
}

/// ECDSA template with the given encoding and prefix
pub fn create_ecdsa_template(
    encoding: EcdsaSignatureEncoding,
    prefix: OutputPrefixType,
) -> Result<KeyTemplate> {
    template(
        ECDSA_PRIVATE_KEY_TYPE_URL,
        &EcdsaKeyFormat {
            params: EcdsaParams {
                hash_type: HashType::Sha256,
                curve: EllipticCurveType::NistP256,
                encoding,
            },
        },
        prefix,
    )
}

/// ECDSA P-256 with DER signatures
pub fn ecdsa_p256() -> Result<KeyTemplate> {
    create_ecdsa_template(EcdsaSignatureEncoding::Der, OutputPrefixType::Tink)
}

/// ECDSA P-256 with IEEE P1363 signatures and no output prefix
pub fn ecdsa_p256_raw() -> Result<KeyTemplate> {
    create_ecdsa_template(EcdsaSignatureEncoding::IeeeP1363, OutputPrefixType::Raw)
}

/// ECIES template with the given HKDF hash, salt and AES-GCM key size
pub fn create_ecies_template(
    hkdf_hash: HashType,
    hkdf_salt: Vec<u8>,
    dem_key_size: u32,
) -> Result<KeyTemplate> {
    template(
        ECIES_PRIVATE_KEY_TYPE_URL,
        &EciesKeyFormat {
            params: EciesParams {
                curve: EllipticCurveType::NistP256,
                hkdf_hash,
                hkdf_salt,
                dem_key_size,
            },
        },
        OutputPrefixType::Tink,
    )
}

/// ECIES P-256, HKDF-SHA256, AES-128-GCM
pub fn ecies_p256_hkdf_aes128_gcm() -> Result<KeyTemplate> {
    create_ecies_template(HashType::Sha256, Vec::new(), 16)
}
