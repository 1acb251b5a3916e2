use super::{KeysetReader, KeysetWriter};
use crate::codec;
use crate::error::{PersistenceError, Result};
use crate::keyset::{EncryptedKeyset, Keyset};
use serde::de::DeserializeOwned;
use std::io::Write;

/// Reads keysets from their binary encoding
#[derive(Clone, Debug)]
pub struct BinaryKeysetReader {
    bytes: Vec<u8>,
}

impl BinaryKeysetReader {
    /// Reader over `bytes`
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            bytes: bytes.into(),
        }
    }

    fn decode<T: DeserializeOwned>(&self) -> Result<T> {
        if self.bytes.is_empty() {
            return Err(PersistenceError::NoKeysetFound.into());
        }
        codec::decode(&self.bytes).map_err(|e| PersistenceError::InvalidKeyset(e.to_string()).into())
    }
}

impl KeysetReader for BinaryKeysetReader {
    fn read(&mut self) -> Result<Keyset> {
        self.decode()
    }

    fn read_encrypted(&mut self) -> Result<EncryptedKeyset> {
        self.decode()
    }
}

/// Writes keysets in their binary encoding
#[derive(Debug)]
pub struct BinaryKeysetWriter<W> {
    inner: W,
}

impl<W: Write> BinaryKeysetWriter<W> {
    /// Writer into `inner`
    pub fn new(inner: W) -> Self {
        Self { inner }
    }

    /// The underlying stream
    pub fn into_inner(self) -> W {
        self.inner
    }

    fn write_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        self.inner.write_all(bytes)?;
        self.inner.flush()?;
        Ok(())
    }
}

impl<W: Write> KeysetWriter for BinaryKeysetWriter<W> {
    fn write(&mut self, keyset: &Keyset) -> Result<()> {
        let bytes = zeroize::Zeroizing::new(codec::encode(keyset)?);
        self.write_bytes(&bytes)
    }

    fn write_encrypted(&mut self, encrypted_keyset: &EncryptedKeyset) -> Result<()> {
        let bytes = codec::encode(encrypted_keyset)?;
        self.write_bytes(&bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    #[test]
    fn empty_input_has_no_keyset() {
        let mut reader = BinaryKeysetReader::new(Vec::new());
        let err = reader.read().unwrap_err();
        assert!(matches!(
            err,
            Error::Persistence(PersistenceError::NoKeysetFound)
        ));
        assert!(reader.read_encrypted().is_err());
    }

    #[test]
    fn garbage_is_an_invalid_keyset() {
        let mut reader = BinaryKeysetReader::new(vec![0xff; 3]);
        assert!(matches!(
            reader.read(),
            Err(Error::Persistence(PersistenceError::InvalidKeyset(_)))
        ));
    }
}
