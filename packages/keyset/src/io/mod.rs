//! Keyset readers and writers.
//!
//! Two encodings are provided: the canonical binary form (bincode) and a
//! human-inspectable JSON form. Both carry the same records and round-trip
//! them exactly.

mod binary;
mod json;

pub use binary::{BinaryKeysetReader, BinaryKeysetWriter};
pub use json::{JsonKeysetReader, JsonKeysetWriter};

use crate::error::Result;
use crate::keyset::{EncryptedKeyset, Keyset};

/// Source of persisted keysets
pub trait KeysetReader {
    /// Read a cleartext keyset
    fn read(&mut self) -> Result<Keyset>;

    /// Read an encrypted keyset
    fn read_encrypted(&mut self) -> Result<EncryptedKeyset>;
}

/// Sink for persisted keysets
pub trait KeysetWriter {
    /// Write a cleartext keyset
    fn write(&mut self, keyset: &Keyset) -> Result<()>;

    /// Write an encrypted keyset
    fn write_encrypted(&mut self, encrypted_keyset: &EncryptedKeyset) -> Result<()>;
}
