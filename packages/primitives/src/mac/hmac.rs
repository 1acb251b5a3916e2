//! HMAC over SHA-256 or SHA-512 with a truncated tag

use crate::common::{HashType, parse_key, parse_record, random_bytes, validate_version};
use hmac::{Hmac, Mac as HmacTrait};
use serde::{Deserialize, Serialize};
use sha2::{Sha256, Sha512};
use std::sync::Arc;
use subtle::ConstantTimeEq;
use tessera_keyset::{
    Error, KeyData, KeyManager, KeyMaterialType, Mac, Primitive, PrimitiveKind, Result, codec,
};
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

/// Type URL of [`HmacKey`]
pub const HMAC_TYPE_URL: &str = "type.tessera.dev/tessera.HmacKey";

const MIN_KEY_SIZE: usize = 16;
const MAX_KEY_SIZE: usize = 64;
const MIN_TAG_SIZE: u32 = 10;

/// Hash and tag length of an HMAC key
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HmacParams {
    /// Underlying hash function
    pub hash: HashType,
    /// Tag length in bytes
    pub tag_size: u32,
}

/// Parameters for generating an HMAC key
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HmacKeyFormat {
    /// Hash and tag length
    pub params: HmacParams,
    /// Key length in bytes, 16 to 64
    pub key_size: u32,
}

/// Serialized HMAC key
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
pub struct HmacKey {
    /// Key version
    pub version: u32,
    /// Hash and tag length
    #[zeroize(skip)]
    pub params: HmacParams,
    /// Raw HMAC key
    #[serde(with = "tessera_keyset::codec::bytes")]
    pub key_value: Vec<u8>,
}

fn validate_params(params: &HmacParams) -> Result<()> {
    let max_tag_size = match params.hash {
        HashType::Sha256 => 32,
        HashType::Sha512 => 64,
        other => {
            return Err(Error::invalid_parameters(format!(
                "unsupported HMAC hash {other:?}"
            )));
        }
    };
    if params.tag_size < MIN_TAG_SIZE || params.tag_size > max_tag_size {
        return Err(Error::invalid_parameters(format!(
            "invalid HMAC tag size {} for {:?}, valid sizes are {MIN_TAG_SIZE} to {max_tag_size}",
            params.tag_size, params.hash
        )));
    }
    Ok(())
}

fn validate_key_size(size: usize) -> Result<()> {
    if !(MIN_KEY_SIZE..=MAX_KEY_SIZE).contains(&size) {
        return Err(Error::invalid_parameters(format!(
            "invalid HMAC key size {size}, valid sizes are {MIN_KEY_SIZE} to {MAX_KEY_SIZE} bytes"
        )));
    }
    Ok(())
}

/// HMAC primitive with a truncated tag
pub struct HmacMac {
    hash: HashType,
    tag_size: usize,
    key: Zeroizing<Vec<u8>>,
}

impl HmacMac {
    /// Create the primitive; the key must be 16 to 64 bytes
    pub fn new(params: HmacParams, key: &[u8]) -> Result<Self> {
        validate_params(&params)?;
        validate_key_size(key.len())?;
        Ok(Self {
            hash: params.hash,
            tag_size: params.tag_size as usize,
            key: Zeroizing::new(key.to_vec()),
        })
    }

    fn full_tag(&self, data: &[u8]) -> Result<Vec<u8>> {
        let tag = match self.hash {
            HashType::Sha256 => {
                let mut mac = <Hmac<Sha256> as HmacTrait>::new_from_slice(&self.key)
                    .map_err(|e| Error::invalid_parameters(format!("invalid HMAC key: {e}")))?;
                mac.update(data);
                mac.finalize().into_bytes().to_vec()
            }
            HashType::Sha512 => {
                let mut mac = <Hmac<Sha512> as HmacTrait>::new_from_slice(&self.key)
                    .map_err(|e| Error::invalid_parameters(format!("invalid HMAC key: {e}")))?;
                mac.update(data);
                mac.finalize().into_bytes().to_vec()
            }
            other => {
                return Err(Error::invalid_parameters(format!(
                    "unsupported HMAC hash {other:?}"
                )));
            }
        };
        Ok(tag)
    }
}

impl Mac for HmacMac {
    fn compute_mac(&self, data: &[u8]) -> Result<Vec<u8>> {
        let mut tag = self.full_tag(data)?;
        tag.truncate(self.tag_size);
        Ok(tag)
    }

    fn verify_mac(&self, mac: &[u8], data: &[u8]) -> Result<()> {
        let expected = self.compute_mac(data)?;
        if mac.len() != expected.len() || !bool::from(expected.as_slice().ct_eq(mac)) {
            return Err(Error::verification("invalid MAC"));
        }
        Ok(())
    }
}

/// Key manager for [`HmacKey`]
#[derive(Clone, Copy, Debug, Default)]
pub struct HmacKeyManager;

impl KeyManager for HmacKeyManager {
    fn type_url(&self) -> &str {
        HMAC_TYPE_URL
    }

    fn primitive_kind(&self) -> PrimitiveKind {
        PrimitiveKind::Mac
    }

    fn key_material_type(&self) -> KeyMaterialType {
        KeyMaterialType::Symmetric
    }

    fn primitive(&self, key_data: &KeyData) -> Result<Primitive> {
        let key: HmacKey = parse_key(key_data, HMAC_TYPE_URL)?;
        validate_version(key.version)?;
        Ok(Primitive::Mac(Arc::new(HmacMac::new(key.params, &key.key_value)?)))
    }

    fn new_key(&self, serialized_key_format: &[u8]) -> Result<Vec<u8>> {
        let format: HmacKeyFormat = parse_record(serialized_key_format, "HmacKeyFormat")?;
        validate_params(&format.params)?;
        validate_key_size(format.key_size as usize)?;
        let key = HmacKey {
            version: 0,
            params: format.params,
            key_value: random_bytes(format.key_size as usize).to_vec(),
        };
        codec::encode(&key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;

    fn sha256(tag_size: u32) -> HmacParams {
        HmacParams {
            hash: HashType::Sha256,
            tag_size,
        }
    }

    #[test]
    fn rfc4231_case_1() {
        let key = [0x0bu8; 20];
        let mac = HmacMac::new(sha256(32), &key).unwrap();
        assert_eq!(
            mac.compute_mac(b"Hi There").unwrap(),
            hex!("b0344c61d8db38535ca8afceaf0bf12b881dc200c9833da726e9376c2e32cff7")
        );
    }

    #[test]
    fn truncated_tags_verify() {
        let mac = HmacMac::new(sha256(16), &[0x0bu8; 20]).unwrap();
        let tag = mac.compute_mac(b"Hi There").unwrap();
        assert_eq!(tag, hex!("b0344c61d8db38535ca8afceaf0bf12b"));
        mac.verify_mac(&tag, b"Hi There").unwrap();
        assert!(mac.verify_mac(&tag[..15], b"Hi There").is_err());
        assert!(mac.verify_mac(&tag, b"Hi there").is_err());
    }

    #[test]
    fn sha512_tags_go_up_to_64_bytes() {
        let params = HmacParams {
            hash: HashType::Sha512,
            tag_size: 64,
        };
        let mac = HmacMac::new(params, &[1u8; 32]).unwrap();
        assert_eq!(mac.compute_mac(b"data").unwrap().len(), 64);
        assert!(HmacMac::new(sha256(33), &[1u8; 32]).is_err());
    }

    #[test]
    fn parameter_bounds_are_enforced() {
        assert!(HmacMac::new(sha256(9), &[1u8; 32]).is_err());
        assert!(HmacMac::new(sha256(10), &[1u8; 32]).is_ok());
        assert!(HmacMac::new(sha256(16), &[1u8; 15]).is_err());
        let sha1 = HmacParams {
            hash: HashType::Sha1,
            tag_size: 16,
        };
        assert!(HmacMac::new(sha1, &[1u8; 32]).is_err());
    }

    #[test]
    fn oversized_key_formats_are_rejected() {
        for key_size in [65u32, u32::MAX] {
            let format = codec::encode(&HmacKeyFormat {
                params: sha256(16),
                key_size,
            })
            .unwrap();
            assert!(matches!(
                HmacKeyManager.new_key(&format),
                Err(Error::InvalidParameters(_))
            ));
        }
        assert!(HmacMac::new(sha256(16), &[1u8; 65]).is_err());
        assert!(HmacMac::new(sha256(16), &[1u8; 64]).is_ok());
    }

    #[test]
    fn generated_keys_produce_working_primitives() {
        let format = codec::encode(&HmacKeyFormat {
            params: sha256(16),
            key_size: 32,
        })
        .unwrap();
        let key_data = HmacKeyManager.new_key_data(&format).unwrap();
        assert_eq!(key_data.type_url, HMAC_TYPE_URL);
        let Primitive::Mac(mac) = HmacKeyManager.primitive(&key_data).unwrap() else {
            panic!("expected a MAC primitive");
        };
        let tag = mac.compute_mac(b"data").unwrap();
        assert_eq!(tag.len(), 16);
        mac.verify_mac(&tag, b"data").unwrap();
    }
}
