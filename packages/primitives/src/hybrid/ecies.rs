//! ECIES over P-256 with HKDF and AES-GCM
//!
//! Encryption draws an ephemeral key pair, derives the AES-GCM key with
//! HKDF over `ephemeral point ‖ shared secret` (info = context) and seals
//! the plaintext with it. Ciphertext layout: uncompressed ephemeral point
//! (65 bytes) ‖ AES-GCM ciphertext.

use crate::aead::AesGcm;
use crate::common::{
    EllipticCurveType, HashType, generate_p256_secret, p256_coordinates, p256_public_key,
    p256_secret_key, parse_key, parse_record, validate_curve, validate_version,
};
use hkdf::Hkdf;
use p256::elliptic_curve::sec1::ToEncodedPoint;
use p256::{PublicKey, SecretKey, ecdh};
use serde::{Deserialize, Serialize};
use sha2::{Sha256, Sha512};
use std::sync::Arc;
use tessera_keyset::{
    Aead, Error, HybridDecrypt, HybridEncrypt, KeyData, KeyManager, KeyMaterialType, Primitive,
    PrimitiveKind, PrivateKeyManager, Result, codec,
};
use tracing::debug;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

/// Type URL of [`EciesPrivateKey`]
pub const ECIES_PRIVATE_KEY_TYPE_URL: &str = "type.tessera.dev/tessera.EciesAeadHkdfPrivateKey";

/// Type URL of [`EciesPublicKey`]
pub const ECIES_PUBLIC_KEY_TYPE_URL: &str = "type.tessera.dev/tessera.EciesAeadHkdfPublicKey";

const POINT_SIZE: usize = 65;

/// KEM and DEM parameters of an ECIES key
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EciesParams {
    /// Curve of the key
    pub curve: EllipticCurveType,
    /// Hash used by HKDF
    pub hkdf_hash: HashType,
    /// HKDF salt; empty means no salt
    #[serde(with = "tessera_keyset::codec::bytes")]
    pub hkdf_salt: Vec<u8>,
    /// AES-GCM key length in bytes, 16 or 32
    pub dem_key_size: u32,
}

/// Parameters for generating an ECIES key pair
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EciesKeyFormat {
    /// Key parameters
    pub params: EciesParams,
}

/// Serialized ECIES public key
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EciesPublicKey {
    /// Key version
    pub version: u32,
    /// Key parameters
    pub params: EciesParams,
    /// Affine x coordinate, big-endian
    #[serde(with = "tessera_keyset::codec::bytes")]
    pub x: Vec<u8>,
    /// Affine y coordinate, big-endian
    #[serde(with = "tessera_keyset::codec::bytes")]
    pub y: Vec<u8>,
}

/// Serialized ECIES private key
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
pub struct EciesPrivateKey {
    /// Key version
    pub version: u32,
    /// Matching public key
    #[zeroize(skip)]
    pub public_key: EciesPublicKey,
    /// Private scalar, big-endian
    #[serde(with = "tessera_keyset::codec::bytes")]
    pub key_value: Vec<u8>,
}

fn validate_params(params: &EciesParams) -> Result<()> {
    validate_curve(params.curve)?;
    match params.hkdf_hash {
        HashType::Sha256 | HashType::Sha512 => {}
        other => {
            return Err(Error::invalid_parameters(format!(
                "unsupported HKDF hash {other:?}"
            )));
        }
    }
    match params.dem_key_size {
        16 | 32 => Ok(()),
        other => Err(Error::invalid_parameters(format!(
            "invalid DEM key size {other}, valid sizes are 16 and 32 bytes"
        ))),
    }
}

/// Derive the DEM key from the KEM output
fn derive_dem(
    params: &EciesParams,
    ephemeral_point: &[u8],
    shared_secret: &[u8],
    context_info: &[u8],
) -> Result<AesGcm> {
    let mut ikm = Zeroizing::new(Vec::with_capacity(ephemeral_point.len() + shared_secret.len()));
    ikm.extend_from_slice(ephemeral_point);
    ikm.extend_from_slice(shared_secret);
    let salt = (!params.hkdf_salt.is_empty()).then_some(params.hkdf_salt.as_slice());

    let mut okm = Zeroizing::new(vec![0u8; params.dem_key_size as usize]);
    match params.hkdf_hash {
        HashType::Sha256 => Hkdf::<Sha256>::new(salt, &ikm).expand(context_info, &mut okm),
        HashType::Sha512 => Hkdf::<Sha512>::new(salt, &ikm).expand(context_info, &mut okm),
        other => {
            return Err(Error::invalid_parameters(format!(
                "unsupported HKDF hash {other:?}"
            )));
        }
    }
    .map_err(|e| Error::invalid_parameters(format!("HKDF expansion failed: {e}")))?;
    AesGcm::new(&okm)
}

/// ECIES encrypter for a recipient public key
pub struct EciesHkdfHybridEncrypt {
    recipient: PublicKey,
    params: EciesParams,
}

impl EciesHkdfHybridEncrypt {
    /// Create an encrypter from the recipient's affine coordinates
    pub fn new(params: EciesParams, x: &[u8], y: &[u8]) -> Result<Self> {
        validate_params(&params)?;
        Ok(Self {
            recipient: p256_public_key(x, y)?,
            params,
        })
    }
}

impl HybridEncrypt for EciesHkdfHybridEncrypt {
    fn encrypt(&self, plaintext: &[u8], context_info: &[u8]) -> Result<Vec<u8>> {
        let ephemeral = generate_p256_secret();
        let ephemeral_point = ephemeral.public_key().to_encoded_point(false);
        let shared = ecdh::diffie_hellman(ephemeral.to_nonzero_scalar(), self.recipient.as_affine());
        let dem = derive_dem(
            &self.params,
            ephemeral_point.as_bytes(),
            shared.raw_secret_bytes(),
            context_info,
        )?;
        let sealed = dem.encrypt(plaintext, b"")?;

        let mut output = Vec::with_capacity(POINT_SIZE + sealed.len());
        output.extend_from_slice(ephemeral_point.as_bytes());
        output.extend_from_slice(&sealed);
        Ok(output)
    }
}

/// ECIES decrypter holding a private key
pub struct EciesHkdfHybridDecrypt {
    secret: SecretKey,
    params: EciesParams,
}

impl EciesHkdfHybridDecrypt {
    /// Create a decrypter from a private scalar
    pub fn new(params: EciesParams, key_value: &[u8]) -> Result<Self> {
        validate_params(&params)?;
        Ok(Self {
            secret: p256_secret_key(key_value)?,
            params,
        })
    }
}

impl HybridDecrypt for EciesHkdfHybridDecrypt {
    fn decrypt(&self, ciphertext: &[u8], context_info: &[u8]) -> Result<Vec<u8>> {
        if ciphertext.len() < POINT_SIZE {
            return Err(Error::decryption("ciphertext too short"));
        }
        let (point, sealed) = ciphertext.split_at(POINT_SIZE);
        let ephemeral = PublicKey::from_sec1_bytes(point)
            .map_err(|_| Error::decryption("invalid ephemeral public key"))?;
        let shared = ecdh::diffie_hellman(self.secret.to_nonzero_scalar(), ephemeral.as_affine());
        let dem = derive_dem(&self.params, point, shared.raw_secret_bytes(), context_info)?;
        dem.decrypt(sealed, b"")
    }
}

/// Key manager for [`EciesPrivateKey`]
#[derive(Clone, Copy, Debug, Default)]
pub struct EciesHkdfPrivateKeyManager;

impl KeyManager for EciesHkdfPrivateKeyManager {
    fn type_url(&self) -> &str {
        ECIES_PRIVATE_KEY_TYPE_URL
    }

    fn primitive_kind(&self) -> PrimitiveKind {
        PrimitiveKind::HybridDecrypt
    }

    fn key_material_type(&self) -> KeyMaterialType {
        KeyMaterialType::AsymmetricPrivate
    }

    fn primitive(&self, key_data: &KeyData) -> Result<Primitive> {
        let key: EciesPrivateKey = parse_key(key_data, ECIES_PRIVATE_KEY_TYPE_URL)?;
        validate_version(key.version)?;
        let decrypter = EciesHkdfHybridDecrypt::new(key.public_key.params.clone(), &key.key_value)?;
        Ok(Primitive::HybridDecrypt(Arc::new(decrypter)))
    }

    fn new_key(&self, serialized_key_format: &[u8]) -> Result<Vec<u8>> {
        let format: EciesKeyFormat = parse_record(serialized_key_format, "EciesKeyFormat")?;
        validate_params(&format.params)?;
        let secret = generate_p256_secret();
        let (x, y) = p256_coordinates(&secret.public_key())?;
        let dem_key_size = format.params.dem_key_size;
        let key = EciesPrivateKey {
            version: 0,
            public_key: EciesPublicKey {
                version: 0,
                params: format.params,
                x,
                y,
            },
            key_value: secret.to_bytes().to_vec(),
        };
        debug!(dem_key_size, "generated ECIES key pair");
        codec::encode(&key)
    }

    fn as_private(&self) -> Option<&dyn PrivateKeyManager> {
        Some(self)
    }
}

impl PrivateKeyManager for EciesHkdfPrivateKeyManager {
    fn public_key_type_url(&self) -> &str {
        ECIES_PUBLIC_KEY_TYPE_URL
    }

    fn public_key_data(&self, serialized_private_key: &[u8]) -> Result<KeyData> {
        let key: EciesPrivateKey = parse_record(serialized_private_key, "EciesPrivateKey")?;
        validate_version(key.version)?;
        validate_params(&key.public_key.params)?;
        Ok(KeyData::new(
            ECIES_PUBLIC_KEY_TYPE_URL,
            codec::encode(&key.public_key)?,
            KeyMaterialType::AsymmetricPublic,
        ))
    }
}

/// Key manager for [`EciesPublicKey`]
#[derive(Clone, Copy, Debug, Default)]
pub struct EciesHkdfPublicKeyManager;

impl KeyManager for EciesHkdfPublicKeyManager {
    fn type_url(&self) -> &str {
        ECIES_PUBLIC_KEY_TYPE_URL
    }

    fn primitive_kind(&self) -> PrimitiveKind {
        PrimitiveKind::HybridEncrypt
    }

    fn key_material_type(&self) -> KeyMaterialType {
        KeyMaterialType::AsymmetricPublic
    }

    fn primitive(&self, key_data: &KeyData) -> Result<Primitive> {
        let key: EciesPublicKey = parse_key(key_data, ECIES_PUBLIC_KEY_TYPE_URL)?;
        validate_version(key.version)?;
        let encrypter = EciesHkdfHybridEncrypt::new(key.params, &key.x, &key.y)?;
        Ok(Primitive::HybridEncrypt(Arc::new(encrypter)))
    }

    fn new_key(&self, _serialized_key_format: &[u8]) -> Result<Vec<u8>> {
        Err(Error::not_supported(
            "public keys are derived from private keys, not generated",
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(hkdf_hash: HashType, dem_key_size: u32) -> EciesParams {
        EciesParams {
            curve: EllipticCurveType::NistP256,
            hkdf_hash,
            hkdf_salt: Vec::new(),
            dem_key_size,
        }
    }

    fn key_pair(params: EciesParams) -> (EciesHkdfHybridEncrypt, EciesHkdfHybridDecrypt) {
        let format = codec::encode(&EciesKeyFormat { params }).unwrap();
        let key: EciesPrivateKey =
            codec::decode(&EciesHkdfPrivateKeyManager.new_key(&format).unwrap()).unwrap();
        let public = &key.public_key;
        (
            EciesHkdfHybridEncrypt::new(public.params.clone(), &public.x, &public.y).unwrap(),
            EciesHkdfHybridDecrypt::new(public.params.clone(), &key.key_value).unwrap(),
        )
    }

    #[test]
    fn round_trip_binds_context() {
        for (hash, size) in [(HashType::Sha256, 16), (HashType::Sha512, 32)] {
            let (encrypter, decrypter) = key_pair(params(hash, size));
            let ciphertext = encrypter.encrypt(b"secret", b"context").unwrap();
            assert_eq!(ciphertext[0], 0x04);
            assert_eq!(decrypter.decrypt(&ciphertext, b"context").unwrap(), b"secret");
            assert!(decrypter.decrypt(&ciphertext, b"other").is_err());
        }
    }

    #[test]
    fn salted_keys_round_trip() {
        let mut salted = params(HashType::Sha256, 16);
        salted.hkdf_salt = b"salt".to_vec();
        let (encrypter, decrypter) = key_pair(salted);
        let ciphertext = encrypter.encrypt(b"", b"").unwrap();
        assert_eq!(decrypter.decrypt(&ciphertext, b"").unwrap(), b"");
    }

    #[test]
    fn other_recipients_cannot_decrypt() {
        let (encrypter, _) = key_pair(params(HashType::Sha256, 16));
        let (_, stranger) = key_pair(params(HashType::Sha256, 16));
        let ciphertext = encrypter.encrypt(b"secret", b"").unwrap();
        assert!(stranger.decrypt(&ciphertext, b"").is_err());
    }

    #[test]
    fn short_ciphertext_is_rejected() {
        let (_, decrypter) = key_pair(params(HashType::Sha256, 16));
        let err = decrypter.decrypt(&[4u8; 64], b"").unwrap_err();
        assert!(err.to_string().contains("ciphertext too short"));
    }

    #[test]
    fn invalid_parameters_are_rejected() {
        assert!(validate_params(&params(HashType::Sha1, 16)).is_err());
        assert!(validate_params(&params(HashType::Sha256, 24)).is_err());
        let mut p521 = params(HashType::Sha256, 16);
        p521.curve = EllipticCurveType::NistP521;
        assert!(validate_params(&p521).is_err());
    }
}
