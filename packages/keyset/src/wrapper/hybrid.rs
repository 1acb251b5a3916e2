use super::{first_success, require_primary, with_primary};
use crate::error::Result;
use crate::primitive::{HybridDecrypt, HybridEncrypt};
use crate::primitive_set::PrimitiveSet;

/// Hybrid encrypter that encrypts to the primary public key of a keyset
pub struct HybridEncryptWrapper {
    set: PrimitiveSet<dyn HybridEncrypt>,
}

impl HybridEncryptWrapper {
    /// Wrap `set`; it must have a primary entry
    pub fn new(set: PrimitiveSet<dyn HybridEncrypt>) -> Result<Self> {
        require_primary(&set)?;
        Ok(Self { set })
    }
}

impl HybridEncrypt for HybridEncryptWrapper {
    fn encrypt(&self, plaintext: &[u8], context_info: &[u8]) -> Result<Vec<u8>> {
        with_primary(&self.set, |encrypter| encrypter.encrypt(plaintext, context_info))
    }
}

/// Hybrid decrypter that tries every enabled private key of a keyset
pub struct HybridDecryptWrapper {
    set: PrimitiveSet<dyn HybridDecrypt>,
}

impl HybridDecryptWrapper {
    /// Wrap `set`
    pub fn new(set: PrimitiveSet<dyn HybridDecrypt>) -> Result<Self> {
        Ok(Self { set })
    }
}

impl HybridDecrypt for HybridDecryptWrapper {
    fn decrypt(&self, ciphertext: &[u8], context_info: &[u8]) -> Result<Vec<u8>> {
        first_success(&self.set, ciphertext, "decryption", |decrypter, body| {
            decrypter.decrypt(body, context_info)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keyset::{KeyStatus, OutputPrefixType};
    use crate::testing::{FakeHybridDecrypt, FakeHybridEncrypt, fake_key};
    use std::sync::Arc;

    #[test]
    fn context_info_is_bound() {
        let key = fake_key(3, KeyStatus::Enabled, OutputPrefixType::Tink);
        let mut encrypters: PrimitiveSet<dyn HybridEncrypt> = PrimitiveSet::new();
        let index = encrypters
            .add_primitive(Arc::new(FakeHybridEncrypt::new("h")), &key)
            .unwrap();
        encrypters.set_primary(index).unwrap();
        let mut decrypters: PrimitiveSet<dyn HybridDecrypt> = PrimitiveSet::new();
        decrypters
            .add_primitive(Arc::new(FakeHybridDecrypt::new("h")), &key)
            .unwrap();

        let encrypter = HybridEncryptWrapper::new(encrypters).unwrap();
        let decrypter = HybridDecryptWrapper::new(decrypters).unwrap();
        let ciphertext = encrypter.encrypt(b"secret", b"ctx").unwrap();
        assert_eq!(decrypter.decrypt(&ciphertext, b"ctx").unwrap(), b"secret");
        assert!(decrypter.decrypt(&ciphertext, b"other").is_err());
    }
}
