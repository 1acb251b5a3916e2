//! ECDSA over NIST P-256 with SHA-256
//!
//! Signatures are encoded either as ASN.1 DER or as the fixed-width
//! IEEE P1363 concatenation `r ‖ s`.

use crate::common::{
    EllipticCurveType, HashType, generate_p256_secret, p256_coordinates, p256_public_key,
    p256_secret_key, parse_key, parse_record, validate_curve, validate_version,
};
use p256::ecdsa::signature::{Signer, Verifier};
use p256::ecdsa::{Signature, SigningKey, VerifyingKey};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tessera_keyset::{
    Error, KeyData, KeyManager, KeyMaterialType, Primitive, PrimitiveKind, PrivateKeyManager,
    PublicKeySign, PublicKeyVerify, Result, codec,
};
use tracing::debug;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Type URL of [`EcdsaPrivateKey`]
pub const ECDSA_PRIVATE_KEY_TYPE_URL: &str = "type.tessera.dev/tessera.EcdsaPrivateKey";

/// Type URL of [`EcdsaPublicKey`]
pub const ECDSA_PUBLIC_KEY_TYPE_URL: &str = "type.tessera.dev/tessera.EcdsaPublicKey";

/// Wire encoding of signatures
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EcdsaSignatureEncoding {
    /// Unset
    #[default]
    UnknownEncoding,
    /// `r ‖ s`, each left-padded to the field size
    IeeeP1363,
    /// ASN.1 DER `SEQUENCE { r INTEGER, s INTEGER }`
    Der,
}

/// Curve, hash and encoding of an ECDSA key
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EcdsaParams {
    /// Hash applied to the message
    pub hash_type: HashType,
    /// Curve of the key
    pub curve: EllipticCurveType,
    /// Signature encoding
    pub encoding: EcdsaSignatureEncoding,
}

/// Parameters for generating an ECDSA key pair
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EcdsaKeyFormat {
    /// Key parameters
    pub params: EcdsaParams,
}

/// Serialized ECDSA public key
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EcdsaPublicKey {
    /// Key version
    pub version: u32,
    /// Key parameters
    pub params: EcdsaParams,
    /// Affine x coordinate, big-endian
    #[serde(with = "tessera_keyset::codec::bytes")]
    pub x: Vec<u8>,
    /// Affine y coordinate, big-endian
    #[serde(with = "tessera_keyset::codec::bytes")]
    pub y: Vec<u8>,
}

/// Serialized ECDSA private key
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
pub struct EcdsaPrivateKey {
    /// Key version
    pub version: u32,
    /// Matching public key
    #[zeroize(skip)]
    pub public_key: EcdsaPublicKey,
    /// Private scalar, big-endian
    #[serde(with = "tessera_keyset::codec::bytes")]
    pub key_value: Vec<u8>,
}

fn validate_params(params: &EcdsaParams) -> Result<()> {
    validate_curve(params.curve)?;
    if params.hash_type != HashType::Sha256 {
        return Err(Error::invalid_parameters(format!(
            "unsupported hash {:?} for ECDSA over P-256",
            params.hash_type
        )));
    }
    if params.encoding == EcdsaSignatureEncoding::UnknownEncoding {
        return Err(Error::invalid_parameters("unknown ECDSA signature encoding"));
    }
    Ok(())
}

/// ECDSA signer
pub struct EcdsaSign {
    signing_key: SigningKey,
    encoding: EcdsaSignatureEncoding,
}

impl EcdsaSign {
    /// Create a signer from a private scalar
    pub fn new(params: &EcdsaParams, key_value: &[u8]) -> Result<Self> {
        validate_params(params)?;
        let secret = p256_secret_key(key_value)?;
        Ok(Self {
            signing_key: SigningKey::from(&secret),
            encoding: params.encoding,
        })
    }
}

impl PublicKeySign for EcdsaSign {
    fn sign(&self, data: &[u8]) -> Result<Vec<u8>> {
        let signature: Signature = self
            .signing_key
            .try_sign(data)
            .map_err(|e| Error::encryption(format!("ECDSA signing failed: {e}")))?;
        Ok(match self.encoding {
            EcdsaSignatureEncoding::Der => signature.to_der().as_bytes().to_vec(),
            _ => signature.to_bytes().to_vec(),
        })
    }
}

/// ECDSA verifier
pub struct EcdsaVerify {
    verifying_key: VerifyingKey,
    encoding: EcdsaSignatureEncoding,
}

impl EcdsaVerify {
    /// Create a verifier from affine public key coordinates
    pub fn new(params: &EcdsaParams, x: &[u8], y: &[u8]) -> Result<Self> {
        validate_params(params)?;
        let public_key = p256_public_key(x, y)?;
        Ok(Self {
            verifying_key: VerifyingKey::from(&public_key),
            encoding: params.encoding,
        })
    }
}

impl PublicKeyVerify for EcdsaVerify {
    fn verify(&self, signature: &[u8], data: &[u8]) -> Result<()> {
        let parsed = match self.encoding {
            EcdsaSignatureEncoding::Der => Signature::from_der(signature),
            _ => Signature::from_slice(signature),
        }
        .map_err(|_| Error::verification("malformed ECDSA signature"))?;
        self.verifying_key
            .verify(data, &parsed)
            .map_err(|_| Error::verification("invalid ECDSA signature"))
    }
}

/// Key manager for [`EcdsaPrivateKey`]
#[derive(Clone, Copy, Debug, Default)]
pub struct EcdsaSignKeyManager;

impl KeyManager for EcdsaSignKeyManager {
    fn type_url(&self) -> &str {
        ECDSA_PRIVATE_KEY_TYPE_URL
    }

    fn primitive_kind(&self) -> PrimitiveKind {
        PrimitiveKind::PublicKeySign
    }

    fn key_material_type(&self) -> KeyMaterialType {
        KeyMaterialType::AsymmetricPrivate
    }

    fn primitive(&self, key_data: &KeyData) -> Result<Primitive> {
        let key: EcdsaPrivateKey = parse_key(key_data, ECDSA_PRIVATE_KEY_TYPE_URL)?;
        validate_version(key.version)?;
        let signer = EcdsaSign::new(&key.public_key.params, &key.key_value)?;
        Ok(Primitive::PublicKeySign(Arc::new(signer)))
    }

    fn new_key(&self, serialized_key_format: &[u8]) -> Result<Vec<u8>> {
        let format: EcdsaKeyFormat = parse_record(serialized_key_format, "EcdsaKeyFormat")?;
        validate_params(&format.params)?;
        let secret = generate_p256_secret();
        let (x, y) = p256_coordinates(&secret.public_key())?;
        let key = EcdsaPrivateKey {
            version: 0,
            public_key: EcdsaPublicKey {
                version: 0,
                params: format.params,
                x,
                y,
            },
            key_value: secret.to_bytes().to_vec(),
        };
        debug!(encoding = ?format.params.encoding, "generated ECDSA key pair");
        codec::encode(&key)
    }

    fn as_private(&self) -> Option<&dyn PrivateKeyManager> {
        Some(self)
    }
}

impl PrivateKeyManager for EcdsaSignKeyManager {
    fn public_key_type_url(&self) -> &str {
        ECDSA_PUBLIC_KEY_TYPE_URL
    }

    fn public_key_data(&self, serialized_private_key: &[u8]) -> Result<KeyData> {
        let key: EcdsaPrivateKey = parse_record(serialized_private_key, "EcdsaPrivateKey")?;
        validate_version(key.version)?;
        validate_params(&key.public_key.params)?;
        Ok(KeyData::new(
            ECDSA_PUBLIC_KEY_TYPE_URL,
            codec::encode(&key.public_key)?,
            KeyMaterialType::AsymmetricPublic,
        ))
    }
}

/// Key manager for [`EcdsaPublicKey`]
#[derive(Clone, Copy, Debug, Default)]
pub struct EcdsaVerifyKeyManager;

impl KeyManager for EcdsaVerifyKeyManager {
    fn type_url(&self) -> &str {
        ECDSA_PUBLIC_KEY_TYPE_URL
    }

    fn primitive_kind(&self) -> PrimitiveKind {
        PrimitiveKind::PublicKeyVerify
    }

    fn key_material_type(&self) -> KeyMaterialType {
        KeyMaterialType::AsymmetricPublic
    }

    fn primitive(&self, key_data: &KeyData) -> Result<Primitive> {
        let key: EcdsaPublicKey = parse_key(key_data, ECDSA_PUBLIC_KEY_TYPE_URL)?;
        validate_version(key.version)?;
        let verifier = EcdsaVerify::new(&key.params, &key.x, &key.y)?;
        Ok(Primitive::PublicKeyVerify(Arc::new(verifier)))
    }

    fn new_key(&self, _serialized_key_format: &[u8]) -> Result<Vec<u8>> {
        Err(Error::not_supported(
            "public keys are derived from private keys, not generated",
        ))
    }
}
