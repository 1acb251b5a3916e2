use super::{KeysetReader, KeysetWriter};
use crate::error::{Error, PersistenceError, Result};
use crate::keyset::{EncryptedKeyset, Keyset};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::io::Write;

/// Reads keysets from their JSON encoding
#[derive(Clone, Debug)]
pub struct JsonKeysetReader {
    text: String,
}

impl JsonKeysetReader {
    /// Reader over `text`
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    fn parse<T: DeserializeOwned>(&self) -> Result<T> {
        if self.text.trim().is_empty() {
            return Err(PersistenceError::NoKeysetFound.into());
        }
        serde_json::from_str(&self.text)
            .map_err(|e| PersistenceError::InvalidKeyset(e.to_string()).into())
    }
}

impl KeysetReader for JsonKeysetReader {
    fn read(&mut self) -> Result<Keyset> {
        self.parse()
    }

    fn read_encrypted(&mut self) -> Result<EncryptedKeyset> {
        self.parse()
    }
}

/// Writes keysets as pretty-printed JSON
#[derive(Debug)]
pub struct JsonKeysetWriter<W> {
    inner: W,
}

impl<W: Write> JsonKeysetWriter<W> {
    /// Writer into `inner`
    pub fn new(inner: W) -> Self {
        Self { inner }
    }

    /// The underlying stream
    pub fn into_inner(self) -> W {
        self.inner
    }

    fn write_json<T: Serialize>(&mut self, value: &T) -> Result<()> {
        serde_json::to_writer_pretty(&mut self.inner, value)
            .map_err(|e| Error::Serialization(e.to_string()))?;
        self.inner.flush()?;
        Ok(())
    }
}

impl<W: Write> KeysetWriter for JsonKeysetWriter<W> {
    fn write(&mut self, keyset: &Keyset) -> Result<()> {
        self.write_json(keyset)
    }

    fn write_encrypted(&mut self, encrypted_keyset: &EncryptedKeyset) -> Result<()> {
        self.write_json(encrypted_keyset)
    }
}
