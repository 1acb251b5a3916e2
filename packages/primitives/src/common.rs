//! Helpers shared by the key managers

use p256::elliptic_curve::sec1::ToEncodedPoint;
use p256::{PublicKey, SecretKey};
use rand::RngCore;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tessera_keyset::{Error, KeyData, Result, codec};
use zeroize::Zeroizing;

/// Highest key version understood by the managers of this crate
pub(crate) const MAX_KEY_VERSION: u32 = 0;

/// Decode the key record held by `key_data`, checking its type URL
pub(crate) fn parse_key<T: DeserializeOwned>(key_data: &KeyData, type_url: &str) -> Result<T> {
    if key_data.type_url != type_url {
        return Err(Error::invalid_parameters(format!(
            "key type {} is not supported by the manager for {type_url}",
            key_data.type_url
        )));
    }
    parse_record(&key_data.value, "key")
}

/// Decode a serialized record, reporting parse failures as invalid parameters
pub(crate) fn parse_record<T: DeserializeOwned>(bytes: &[u8], what: &str) -> Result<T> {
    codec::decode(bytes).map_err(|e| Error::invalid_parameters(format!("Could not parse {what}: {e}")))
}

pub(crate) fn validate_version(version: u32) -> Result<()> {
    if version > MAX_KEY_VERSION {
        return Err(Error::invalid_parameters(format!(
            "key version {version} is newer than supported version {MAX_KEY_VERSION}"
        )));
    }
    Ok(())
}

/// `len` bytes from the thread-local CSPRNG
pub(crate) fn random_bytes(len: usize) -> Zeroizing<Vec<u8>> {
    let mut bytes = Zeroizing::new(vec![0u8; len]);
    rand::rng().fill_bytes(&mut bytes);
    bytes
}

/// Hash function selector shared by MAC, signature and KDF parameters
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HashType {
    /// Unset
    #[default]
    UnknownHash,
    /// SHA-1, accepted in records but never for new keys
    Sha1,
    /// SHA-256
    Sha256,
    /// SHA-384
    Sha384,
    /// SHA-512
    Sha512,
}

/// Elliptic curve selector for signature and hybrid keys
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EllipticCurveType {
    /// Unset
    #[default]
    UnknownCurve,
    /// NIST P-256
    NistP256,
    /// NIST P-384
    NistP384,
    /// NIST P-521
    NistP521,
}

/// Reject any curve other than P-256
pub(crate) fn validate_curve(curve: EllipticCurveType) -> Result<()> {
    match curve {
        EllipticCurveType::NistP256 => Ok(()),
        other => Err(Error::invalid_parameters(format!(
            "unsupported elliptic curve {other:?}"
        ))),
    }
}

/// Length of one P-256 field element
pub(crate) const P256_COORDINATE_SIZE: usize = 32;

/// Fresh P-256 secret key drawn from the thread-local CSPRNG
pub(crate) fn generate_p256_secret() -> SecretKey {
    loop {
        let candidate = random_bytes(P256_COORDINATE_SIZE);
        // Zero and values above the group order are rejected; retry.
        if let Ok(secret) = SecretKey::from_slice(&candidate) {
            return secret;
        }
    }
}

/// Affine coordinates of `public_key`
pub(crate) fn p256_coordinates(public_key: &PublicKey) -> Result<(Vec<u8>, Vec<u8>)> {
    let point = public_key.to_encoded_point(false);
    match (point.x(), point.y()) {
        (Some(x), Some(y)) => Ok((x.to_vec(), y.to_vec())),
        _ => Err(Error::invalid_parameters("public key is the identity point")),
    }
}

/// Public key from affine coordinates
pub(crate) fn p256_public_key(x: &[u8], y: &[u8]) -> Result<PublicKey> {
    if x.len() != P256_COORDINATE_SIZE || y.len() != P256_COORDINATE_SIZE {
        return Err(Error::invalid_parameters(format!(
            "invalid P-256 coordinate lengths {} and {}",
            x.len(),
            y.len()
        )));
    }
    let mut sec1 = Vec::with_capacity(1 + 2 * P256_COORDINATE_SIZE);
    sec1.push(0x04);
    sec1.extend_from_slice(x);
    sec1.extend_from_slice(y);
    PublicKey::from_sec1_bytes(&sec1)
        .map_err(|_| Error::invalid_parameters("public key is not on the P-256 curve"))
}

/// Secret key from its big-endian scalar
pub(crate) fn p256_secret_key(key_value: &[u8]) -> Result<SecretKey> {
    if key_value.len() != P256_COORDINATE_SIZE {
        return Err(Error::invalid_parameters(format!(
            "invalid P-256 private key length {}",
            key_value.len()
        )));
    }
    SecretKey::from_slice(key_value)
        .map_err(|_| Error::invalid_parameters("invalid P-256 private key"))
}
