//! Primitive capabilities.
//!
//! The set of capabilities is closed: every key manager produces exactly one
//! [`PrimitiveKind`], and the registry hands primitives around as the tagged
//! [`Primitive`] union. Callers pick the capability they want at compile time
//! through [`PrimitiveType`], so a kind mismatch can only surface where the
//! type-erased registry is bridged.

use crate::error::{DispatchError, Result};
use crate::primitive_set::PrimitiveSet;
use crate::wrapper;
use std::fmt;
use std::sync::Arc;

/// Capability produced by a key manager
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    /// Authenticated encryption with associated data
    Aead,
    /// Deterministic authenticated encryption
    DeterministicAead,
    /// Message authentication code
    Mac,
    /// Digital signature creation
    PublicKeySign,
    /// Digital signature verification
    PublicKeyVerify,
    /// Hybrid (public key) encryption
    HybridEncrypt,
    /// Hybrid (public key) decryption
    HybridDecrypt,
}

impl fmt::Display for PrimitiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Aead => "Aead",
            Self::DeterministicAead => "DeterministicAead",
            Self::Mac => "Mac",
            Self::PublicKeySign => "PublicKeySign",
            Self::PublicKeyVerify => "PublicKeyVerify",
            Self::HybridEncrypt => "HybridEncrypt",
            Self::HybridDecrypt => "HybridDecrypt",
        };
        f.write_str(name)
    }
}

/// Authenticated encryption with associated data.
pub trait Aead: Send + Sync + 'static {
    /// Encrypt `plaintext`, binding it to `associated_data`.
    fn encrypt(&self, plaintext: &[u8], associated_data: &[u8]) -> Result<Vec<u8>>;

    /// Decrypt `ciphertext`; fails unless it was produced with the same `associated_data`.
    fn decrypt(&self, ciphertext: &[u8], associated_data: &[u8]) -> Result<Vec<u8>>;
}

/// Deterministic authenticated encryption: equal inputs give equal ciphertexts.
pub trait DeterministicAead: Send + Sync + 'static {
    /// Encrypt `plaintext` deterministically.
    fn encrypt_deterministically(
        &self,
        plaintext: &[u8],
        associated_data: &[u8],
    ) -> Result<Vec<u8>>;

    /// Decrypt a deterministic ciphertext.
    fn decrypt_deterministically(
        &self,
        ciphertext: &[u8],
        associated_data: &[u8],
    ) -> Result<Vec<u8>>;
}

/// Message authentication code.
pub trait Mac: Send + Sync + 'static {
    /// Compute the tag of `data`.
    fn compute_mac(&self, data: &[u8]) -> Result<Vec<u8>>;

    /// Check that `mac` is a valid tag of `data`.
    fn verify_mac(&self, mac: &[u8], data: &[u8]) -> Result<()>;
}

/// Signature creation.
pub trait PublicKeySign: Send + Sync + 'static {
    /// Sign `data`.
    fn sign(&self, data: &[u8]) -> Result<Vec<u8>>;
}

/// Signature verification.
pub trait PublicKeyVerify: Send + Sync + 'static {
    /// Check that `signature` is a valid signature of `data`.
    fn verify(&self, signature: &[u8], data: &[u8]) -> Result<()>;
}

/// Hybrid encryption to a public key.
pub trait HybridEncrypt: Send + Sync + 'static {
    /// Encrypt `plaintext`, binding it to `context_info`.
    fn encrypt(&self, plaintext: &[u8], context_info: &[u8]) -> Result<Vec<u8>>;
}

/// Hybrid decryption with a private key.
pub trait HybridDecrypt: Send + Sync + 'static {
    /// Decrypt `ciphertext` produced with the same `context_info`.
    fn decrypt(&self, ciphertext: &[u8], context_info: &[u8]) -> Result<Vec<u8>>;
}

/// A primitive instance of any kind
#[derive(Clone)]
pub enum Primitive {
    /// AEAD instance
    Aead(Arc<dyn Aead>),
    /// Deterministic AEAD instance
    DeterministicAead(Arc<dyn DeterministicAead>),
    /// MAC instance
    Mac(Arc<dyn Mac>),
    /// Signer instance
    PublicKeySign(Arc<dyn PublicKeySign>),
    /// Verifier instance
    PublicKeyVerify(Arc<dyn PublicKeyVerify>),
    /// Hybrid encrypter instance
    HybridEncrypt(Arc<dyn HybridEncrypt>),
    /// Hybrid decrypter instance
    HybridDecrypt(Arc<dyn HybridDecrypt>),
}

impl Primitive {
    /// Kind of this primitive
    pub fn kind(&self) -> PrimitiveKind {
        match self {
            Self::Aead(_) => PrimitiveKind::Aead,
            Self::DeterministicAead(_) => PrimitiveKind::DeterministicAead,
            Self::Mac(_) => PrimitiveKind::Mac,
            Self::PublicKeySign(_) => PrimitiveKind::PublicKeySign,
            Self::PublicKeyVerify(_) => PrimitiveKind::PublicKeyVerify,
            Self::HybridEncrypt(_) => PrimitiveKind::HybridEncrypt,
            Self::HybridDecrypt(_) => PrimitiveKind::HybridDecrypt,
        }
    }

    /// Narrow to the primitive type `P`
    ///
    /// `type_url` only feeds the error message.
    pub fn into_typed<P: PrimitiveType + ?Sized>(self, type_url: &str) -> Result<Arc<P>> {
        let actual = self.kind();
        P::extract(self).ok_or_else(|| {
            DispatchError::WrongPrimitiveClass {
                requested: P::KIND,
                actual,
                type_url: type_url.to_string(),
            }
            .into()
        })
    }
}

impl fmt::Debug for Primitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Primitive::{}", self.kind())
    }
}

/// Links a primitive trait object type to its kind and its rotation-aware wrapper
pub trait PrimitiveType: Send + Sync + 'static {
    /// Kind produced by key managers for this type
    const KIND: PrimitiveKind;

    /// Take the typed instance out of `primitive` if the kinds match
    fn extract(primitive: Primitive) -> Option<Arc<Self>>;

    /// Combine every entry of `set` into one primitive that dispatches by prefix
    fn wrap(set: PrimitiveSet<Self>) -> Result<Arc<Self>>;
}

macro_rules! primitive_type {
    ($trait:ident, $wrapper:path) => {
        impl PrimitiveType for dyn $trait {
            const KIND: PrimitiveKind = PrimitiveKind::$trait;

            fn extract(primitive: Primitive) -> Option<Arc<Self>> {
                match primitive {
                    Primitive::$trait(inner) => Some(inner),
                    _ => None,
                }
            }

            fn wrap(set: PrimitiveSet<Self>) -> Result<Arc<Self>> {
                let wrapped: Arc<Self> = Arc::new(<$wrapper>::new(set)?);
                Ok(wrapped)
            }
        }
    };
}

primitive_type!(Aead, wrapper::AeadWrapper);
primitive_type!(DeterministicAead, wrapper::DeterministicAeadWrapper);
primitive_type!(Mac, wrapper::MacWrapper);
primitive_type!(PublicKeySign, wrapper::PublicKeySignWrapper);
primitive_type!(PublicKeyVerify, wrapper::PublicKeyVerifyWrapper);
primitive_type!(HybridEncrypt, wrapper::HybridEncryptWrapper);
primitive_type!(HybridDecrypt, wrapper::HybridDecryptWrapper);
