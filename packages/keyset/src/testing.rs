//! Fake primitives and key managers for tests.
//!
//! Fakes do no cryptography. Outputs are readable byte strings such as
//! `plaintext|associated_data|name`, so a test can tell which key produced
//! them and a fake only accepts its own outputs.

use crate::error::{Error, Result};
use crate::key_manager::{KeyManager, PrivateKeyManager};
use crate::keyset::{Key, KeyData, KeyMaterialType, KeyStatus, KeyTemplate, OutputPrefixType};
use crate::primitive::{
    Aead, DeterministicAead, HybridDecrypt, HybridEncrypt, Mac, Primitive, PrimitiveKind,
    PublicKeySign, PublicKeyVerify,
};
use std::sync::Arc;
use subtle::ConstantTimeEq;

/// Type URL of [`FakeKeyManager::aead`]
pub const FAKE_AEAD_TYPE_URL: &str = "type.tessera.dev/test.FakeAeadKey";
/// Type URL of [`FakeKeyManager::deterministic_aead`]
pub const FAKE_DAEAD_TYPE_URL: &str = "type.tessera.dev/test.FakeDeterministicAeadKey";
/// Type URL of [`FakeKeyManager::mac`]
pub const FAKE_MAC_TYPE_URL: &str = "type.tessera.dev/test.FakeMacKey";
/// Type URL of [`FakePrivateKeyManager`]
pub const FAKE_PRIVATE_TYPE_URL: &str = "type.tessera.dev/test.FakePrivateKey";
/// Type URL of [`FakePublicKeyManager`]
pub const FAKE_PUBLIC_TYPE_URL: &str = "type.tessera.dev/test.FakePublicKey";

fn tagged(parts: &[&[u8]]) -> Vec<u8> {
    parts.join(&b'|')
}

fn strip_tag(input: &[u8], suffix: &[u8]) -> Option<Vec<u8>> {
    input
        .strip_suffix(suffix)
        .and_then(|rest| rest.strip_suffix(b"|"))
        .map(<[u8]>::to_vec)
}

macro_rules! named_fake {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Clone, Debug, PartialEq, Eq)]
        pub struct $name {
            name: Vec<u8>,
        }

        impl $name {
            /// Create a fake identified by `name`
            pub fn new(name: impl AsRef<[u8]>) -> Self {
                Self {
                    name: name.as_ref().to_vec(),
                }
            }
        }
    };
}

named_fake!(
    /// AEAD whose ciphertext is `plaintext|associated_data|name`
    FakeAead
);
named_fake!(
    /// Deterministic AEAD whose ciphertext is `plaintext|associated_data|name`
    FakeDeterministicAead
);
named_fake!(
    /// MAC whose tag is `data|name`
    FakeMac
);
named_fake!(
    /// Signer whose signature is `data|name`
    FakePublicKeySign
);
named_fake!(
    /// Verifier accepting `data|name`
    FakePublicKeyVerify
);
named_fake!(
    /// Hybrid encrypter whose ciphertext is `plaintext|context_info|name`
    FakeHybridEncrypt
);
named_fake!(
    /// Hybrid decrypter accepting `plaintext|context_info|name`
    FakeHybridDecrypt
);

impl Aead for FakeAead {
    fn encrypt(&self, plaintext: &[u8], associated_data: &[u8]) -> Result<Vec<u8>> {
        Ok(tagged(&[plaintext, associated_data, self.name.as_slice()]))
    }

    fn decrypt(&self, ciphertext: &[u8], associated_data: &[u8]) -> Result<Vec<u8>> {
        let suffix = tagged(&[associated_data, self.name.as_slice()]);
        strip_tag(ciphertext, &suffix).ok_or_else(|| Error::decryption("fake aead rejected input"))
    }
}

impl DeterministicAead for FakeDeterministicAead {
    fn encrypt_deterministically(
        &self,
        plaintext: &[u8],
        associated_data: &[u8],
    ) -> Result<Vec<u8>> {
        Ok(tagged(&[plaintext, associated_data, self.name.as_slice()]))
    }

    fn decrypt_deterministically(
        &self,
        ciphertext: &[u8],
        associated_data: &[u8],
    ) -> Result<Vec<u8>> {
        let suffix = tagged(&[associated_data, self.name.as_slice()]);
        strip_tag(ciphertext, &suffix)
            .ok_or_else(|| Error::decryption("fake deterministic aead rejected input"))
    }
}

impl Mac for FakeMac {
    fn compute_mac(&self, data: &[u8]) -> Result<Vec<u8>> {
        Ok(tagged(&[data, self.name.as_slice()]))
    }

    fn verify_mac(&self, mac: &[u8], data: &[u8]) -> Result<()> {
        let expected = tagged(&[data, self.name.as_slice()]);
        if bool::from(expected.ct_eq(mac)) {
            Ok(())
        } else {
            Err(Error::verification("fake mac rejected tag"))
        }
    }
}

impl PublicKeySign for FakePublicKeySign {
    fn sign(&self, data: &[u8]) -> Result<Vec<u8>> {
        Ok(tagged(&[data, self.name.as_slice()]))
    }
}

impl PublicKeyVerify for FakePublicKeyVerify {
    fn verify(&self, signature: &[u8], data: &[u8]) -> Result<()> {
        if signature == tagged(&[data, self.name.as_slice()]).as_slice() {
            Ok(())
        } else {
            Err(Error::verification("fake verifier rejected signature"))
        }
    }
}

impl HybridEncrypt for FakeHybridEncrypt {
    fn encrypt(&self, plaintext: &[u8], context_info: &[u8]) -> Result<Vec<u8>> {
        Ok(tagged(&[plaintext, context_info, self.name.as_slice()]))
    }
}

impl HybridDecrypt for FakeHybridDecrypt {
    fn decrypt(&self, ciphertext: &[u8], context_info: &[u8]) -> Result<Vec<u8>> {
        let suffix = tagged(&[context_info, self.name.as_slice()]);
        strip_tag(ciphertext, &suffix)
            .ok_or_else(|| Error::decryption("fake hybrid decrypter rejected input"))
    }
}

fn random_key_value(format: &[u8]) -> Vec<u8> {
    let mut value = format.to_vec();
    value.extend_from_slice(format!("{:016x}", rand::random::<u64>()).as_bytes());
    value
}

fn check_type_url(expected: &str, key_data: &KeyData) -> Result<()> {
    if key_data.type_url == expected {
        Ok(())
    } else {
        Err(Error::invalid_parameters(format!(
            "key data has type URL {}, expected {expected}",
            key_data.type_url
        )))
    }
}

/// Symmetric key manager producing fakes named after the key value
///
/// Generated keys are the key format followed by 16 random hex digits.
#[derive(Clone, Debug)]
pub struct FakeKeyManager {
    type_url: String,
    kind: PrimitiveKind,
}

impl FakeKeyManager {
    /// Manager for `type_url` producing primitives of `kind`
    pub fn new(type_url: impl Into<String>, kind: PrimitiveKind) -> Self {
        Self {
            type_url: type_url.into(),
            kind,
        }
    }

    /// AEAD manager under [`FAKE_AEAD_TYPE_URL`]
    pub fn aead() -> Self {
        Self::new(FAKE_AEAD_TYPE_URL, PrimitiveKind::Aead)
    }

    /// Deterministic AEAD manager under [`FAKE_DAEAD_TYPE_URL`]
    pub fn deterministic_aead() -> Self {
        Self::new(FAKE_DAEAD_TYPE_URL, PrimitiveKind::DeterministicAead)
    }

    /// MAC manager under [`FAKE_MAC_TYPE_URL`]
    pub fn mac() -> Self {
        Self::new(FAKE_MAC_TYPE_URL, PrimitiveKind::Mac)
    }
}

impl KeyManager for FakeKeyManager {
    fn type_url(&self) -> &str {
        &self.type_url
    }

    fn primitive_kind(&self) -> PrimitiveKind {
        self.kind
    }

    fn key_material_type(&self) -> KeyMaterialType {
        KeyMaterialType::Symmetric
    }

    fn primitive(&self, key_data: &KeyData) -> Result<Primitive> {
        check_type_url(&self.type_url, key_data)?;
        let name = key_data.value.as_slice();
        Ok(match self.kind {
            PrimitiveKind::Aead => Primitive::Aead(Arc::new(FakeAead::new(name))),
            PrimitiveKind::DeterministicAead => {
                Primitive::DeterministicAead(Arc::new(FakeDeterministicAead::new(name)))
            }
            PrimitiveKind::Mac => Primitive::Mac(Arc::new(FakeMac::new(name))),
            PrimitiveKind::PublicKeySign => {
                Primitive::PublicKeySign(Arc::new(FakePublicKeySign::new(name)))
            }
            PrimitiveKind::PublicKeyVerify => {
                Primitive::PublicKeyVerify(Arc::new(FakePublicKeyVerify::new(name)))
            }
            PrimitiveKind::HybridEncrypt => {
                Primitive::HybridEncrypt(Arc::new(FakeHybridEncrypt::new(name)))
            }
            PrimitiveKind::HybridDecrypt => {
                Primitive::HybridDecrypt(Arc::new(FakeHybridDecrypt::new(name)))
            }
        })
    }

    fn new_key(&self, serialized_key_format: &[u8]) -> Result<Vec<u8>> {
        Ok(random_key_value(serialized_key_format))
    }
}

/// Private hybrid key manager whose public keys share the private key value
#[derive(Clone, Debug, Default)]
pub struct FakePrivateKeyManager;

impl KeyManager for FakePrivateKeyManager {
    fn type_url(&self) -> &str {
        FAKE_PRIVATE_TYPE_URL
    }

    fn primitive_kind(&self) -> PrimitiveKind {
        PrimitiveKind::HybridDecrypt
    }

    fn key_material_type(&self) -> KeyMaterialType {
        KeyMaterialType::AsymmetricPrivate
    }

    fn primitive(&self, key_data: &KeyData) -> Result<Primitive> {
        check_type_url(FAKE_PRIVATE_TYPE_URL, key_data)?;
        Ok(Primitive::HybridDecrypt(Arc::new(FakeHybridDecrypt::new(
            &key_data.value,
        ))))
    }

    fn new_key(&self, serialized_key_format: &[u8]) -> Result<Vec<u8>> {
        Ok(random_key_value(serialized_key_format))
    }

    fn as_private(&self) -> Option<&dyn PrivateKeyManager> {
        Some(self)
    }
}

impl PrivateKeyManager for FakePrivateKeyManager {
    fn public_key_type_url(&self) -> &str {
        FAKE_PUBLIC_TYPE_URL
    }

    fn public_key_data(&self, serialized_private_key: &[u8]) -> Result<KeyData> {
        if serialized_private_key.is_empty() {
            return Err(Error::invalid_parameters("Could not parse empty private key"));
        }
        Ok(KeyData::new(
            FAKE_PUBLIC_TYPE_URL,
            serialized_private_key.to_vec(),
            KeyMaterialType::AsymmetricPublic,
        ))
    }
}

/// Public hybrid key manager paired with [`FakePrivateKeyManager`]
#[derive(Clone, Debug, Default)]
pub struct FakePublicKeyManager;

impl KeyManager for FakePublicKeyManager {
    fn type_url(&self) -> &str {
        FAKE_PUBLIC_TYPE_URL
    }

    fn primitive_kind(&self) -> PrimitiveKind {
        PrimitiveKind::HybridEncrypt
    }

    fn key_material_type(&self) -> KeyMaterialType {
        KeyMaterialType::AsymmetricPublic
    }

    fn primitive(&self, key_data: &KeyData) -> Result<Primitive> {
        check_type_url(FAKE_PUBLIC_TYPE_URL, key_data)?;
        Ok(Primitive::HybridEncrypt(Arc::new(FakeHybridEncrypt::new(
            &key_data.value,
        ))))
    }

    fn new_key(&self, _serialized_key_format: &[u8]) -> Result<Vec<u8>> {
        Err(Error::not_supported(
            "public keys are derived from their private key",
        ))
    }
}

/// Key of the fake AEAD type whose value is `key_id` in text
pub fn fake_key(key_id: u32, status: KeyStatus, output_prefix_type: OutputPrefixType) -> Key {
    fake_key_of_type(FAKE_AEAD_TYPE_URL, key_id, status, output_prefix_type)
}

/// Key of `type_url` whose value is `key_id` in text
pub fn fake_key_of_type(
    type_url: &str,
    key_id: u32,
    status: KeyStatus,
    output_prefix_type: OutputPrefixType,
) -> Key {
    let material_type = match type_url {
        FAKE_PRIVATE_TYPE_URL => KeyMaterialType::AsymmetricPrivate,
        FAKE_PUBLIC_TYPE_URL => KeyMaterialType::AsymmetricPublic,
        _ => KeyMaterialType::Symmetric,
    };
    Key::new(
        KeyData::new(type_url, format!("key-{key_id}").into_bytes(), material_type),
        status,
        key_id,
        output_prefix_type,
    )
}

/// Template for `type_url` with an empty key format
pub fn fake_template(type_url: &str, output_prefix_type: OutputPrefixType) -> KeyTemplate {
    KeyTemplate::new(type_url, Vec::new(), output_prefix_type)
}
