//! Keysets, key-manager registry and rotation-aware primitive sets
//!
//! This crate provides:
//! - The keyset data model and its binary and JSON encodings
//! - A thread-safe [`Registry`] mapping type URLs to key managers
//! - Keyset validation and [`PrimitiveSet`] construction
//! - Wrappers that dispatch by output prefix for key rotation
//! - [`KeysetHandle`] for generation, persistence and primitive access
//! - [`KeysetManager`] for rotation bookkeeping
//!
//! Key managers for concrete algorithms live in `tessera_primitives`.

#![forbid(unsafe_code)]

pub mod codec;
pub mod crypto_format;
mod error;
mod handle;
pub mod io;
mod key_manager;
mod keyset;
mod keyset_manager;
pub mod primitive;
mod primitive_set;
mod registry;
#[cfg(any(test, feature = "testing"))]
pub mod testing;
mod validation;
pub mod wrapper;

pub use error::*;
pub use handle::KeysetHandle;
pub use io::{
    BinaryKeysetReader, BinaryKeysetWriter, JsonKeysetReader, JsonKeysetWriter, KeysetReader,
    KeysetWriter,
};
pub use key_manager::{KeyManager, PrivateKeyManager};
pub use keyset::*;
pub use keyset_manager::KeysetManager;
pub use primitive::{
    Aead, DeterministicAead, HybridDecrypt, HybridEncrypt, Mac, Primitive, PrimitiveKind,
    PrimitiveType, PublicKeySign, PublicKeyVerify,
};
pub use primitive_set::{Entry, PrimitiveSet};
pub use registry::Registry;
pub use validation::validate_keyset;

/// Common imports for working with keysets
pub mod prelude {
    pub use crate::{
        Aead, DeterministicAead, Error, HybridDecrypt, HybridEncrypt, KeyTemplate, KeysetHandle,
        KeysetManager, Mac, OutputPrefixType, PublicKeySign, PublicKeyVerify, Registry, Result,
    };
}
