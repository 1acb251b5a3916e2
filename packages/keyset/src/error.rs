//! Comprehensive error handling for keyset operations
//!
//! Errors are grouped by the layer that raises them. Every layer returns its
//! error unchanged to the caller or wraps it with extra context through
//! [`Error::KeyFailure`]; nothing is retried or swallowed.

use crate::primitive::PrimitiveKind;
use thiserror::Error;

/// Errors raised by the key-manager registry
#[derive(Debug, Error)]
pub enum RegistryError {
    /// No key manager is registered for the type URL
    #[error("no key manager for type URL {0} is registered")]
    UnknownKeyType(String),

    /// A conflicting key manager is already registered for the type URL
    #[error("key manager for type URL {type_url} is already registered: {reason}")]
    AlreadyRegistered {
        /// Type URL of the conflicting registration
        type_url: String,
        /// Why the registration was refused
        reason: &'static str,
    },

    /// The key manager was registered without permission to create new keys
    #[error("key manager for type URL {0} does not allow creating new keys")]
    NewKeyNotAllowed(String),

    /// A private key manager cannot be re-registered with another public key type
    #[error(
        "private key manager for {private_type_url} cannot be re-registered with public key type {public_type_url}"
    )]
    CannotReregister {
        /// Type URL of the private key manager
        private_type_url: String,
        /// Type URL of the rejected public key manager
        public_type_url: String,
    },

    /// A key manager reports a type URL other than the one it was registered under
    #[error("key manager type URL mismatch: expected {expected}, got {actual}")]
    TypeUrlMismatch {
        /// Type URL the registration asked for
        expected: String,
        /// Type URL reported by the manager
        actual: String,
    },
}

/// Structural problems found while validating a keyset
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// The keyset holds no usable key
    #[error("empty keyset")]
    EmptyKeyset,

    /// A key has no key data
    #[error("key {0} has no key data")]
    MissingKeyData(u32),

    /// A key carries the unknown output prefix type
    #[error("key {0} has unknown prefix")]
    UnknownPrefix(u32),

    /// A key carries the unknown status
    #[error("key {0} has unknown status")]
    UnknownStatus(u32),

    /// No enabled key carries the primary key id
    #[error("keyset does not contain a valid primary key")]
    NoValidPrimaryKey,

    /// More than one enabled key carries the primary key id
    #[error("keyset contains multiple primary keys")]
    MultiplePrimaryKeys,
}

/// Errors raised while resolving or dispatching to primitives
#[derive(Debug, Error)]
pub enum DispatchError {
    /// The requested primitive does not match what the key manager produces
    #[error("Wrong primitive class: requested {requested}, key type {type_url} provides {actual}")]
    WrongPrimitiveClass {
        /// Primitive kind the caller asked for
        requested: PrimitiveKind,
        /// Primitive kind the key manager produces
        actual: PrimitiveKind,
        /// Type URL of the key
        type_url: String,
    },

    /// No entry of a primitive set accepted the input
    #[error("{operation} failed: no matching key")]
    NoMatchingKey {
        /// Name of the failed operation, e.g. "decryption"
        operation: &'static str,
    },

    /// The primitive set has no primary entry
    #[error("primitive set has no primary")]
    NoPrimary,
}

/// Errors raised while reading or writing keysets
#[derive(Debug, Error)]
pub enum PersistenceError {
    /// The reader was given no bytes
    #[error("No keyset found")]
    NoKeysetFound,

    /// The keyset bytes are malformed or did not survive a round trip
    #[error("invalid keyset, {0}")]
    InvalidKeyset(String),

    /// The master AEAD decrypted the keyset to a different keyset
    #[error("cannot encrypt keyset: {0}")]
    CannotEncryptKeyset(String),

    /// The requested operation is not supported by the key type
    #[error("Operation not supported: {0}")]
    OperationNotSupported(String),
}

/// Errors returned by every public operation of this crate
#[derive(Debug, Error)]
pub enum Error {
    /// Registry lookup or registration failed
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// Keyset validation failed
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Primitive resolution or dispatch failed
    #[error(transparent)]
    Dispatch(#[from] DispatchError),

    /// Reading or writing a keyset failed
    #[error(transparent)]
    Persistence(#[from] PersistenceError),

    /// A key manager rejected key format parameters
    #[error("invalid parameters: {0}")]
    InvalidParameters(String),

    /// An encryption or signing primitive failed
    #[error("encryption failed: {0}")]
    Encryption(String),

    /// A decryption primitive failed
    #[error("decryption failed: {0}")]
    Decryption(String),

    /// A MAC or signature did not verify
    #[error("verification failed: {0}")]
    Verification(String),

    /// Encoding or decoding a record failed
    #[error("serialization error: {0}")]
    Serialization(String),

    /// A keyset manager operation named a key id not in the keyset
    #[error("key {0} not found in keyset")]
    KeyNotFound(u32),

    /// A keyset manager operation is not valid for the key's state
    #[error("key {key_id}: {reason}")]
    InvalidKeyState {
        /// Key the operation targeted
        key_id: u32,
        /// Why the transition was refused
        reason: &'static str,
    },

    /// An operation on one key of a keyset failed
    #[error("key {key_id}: {source}")]
    KeyFailure {
        /// Key whose operation failed
        key_id: u32,
        /// Underlying failure
        #[source]
        source: Box<Error>,
    },

    /// I/O on the underlying stream failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create an invalid parameters error
    pub fn invalid_parameters(msg: impl Into<String>) -> Self {
        Self::InvalidParameters(msg.into())
    }

    /// Create an encryption error
    pub fn encryption(msg: impl Into<String>) -> Self {
        Self::Encryption(msg.into())
    }

    /// Create a decryption error
    pub fn decryption(msg: impl Into<String>) -> Self {
        Self::Decryption(msg.into())
    }

    /// Create a verification error
    pub fn verification(msg: impl Into<String>) -> Self {
        Self::Verification(msg.into())
    }

    /// Create an operation-not-supported error
    pub fn not_supported(msg: impl Into<String>) -> Self {
        PersistenceError::OperationNotSupported(msg.into()).into()
    }

    /// Attach the id of the key whose operation failed
    pub fn for_key(self, key_id: u32) -> Self {
        Self::KeyFailure {
            key_id,
            source: Box::new(self),
        }
    }

    /// The innermost error, looking through key-id context
    pub fn root(&self) -> &Error {
        match self {
            Self::KeyFailure { source, .. } => source.root(),
            other => other,
        }
    }
}

/// Result type for keyset operations
pub type Result<T> = std::result::Result<T, Error>;
