use super::{first_success, require_primary, with_primary};
use crate::error::Result;
use crate::primitive::Aead;
use crate::primitive_set::PrimitiveSet;

/// AEAD over every enabled key of a keyset
pub struct AeadWrapper {
    set: PrimitiveSet<dyn Aead>,
}

impl AeadWrapper {
    /// Wrap `set`; it must have a primary entry
    pub fn new(set: PrimitiveSet<dyn Aead>) -> Result<Self> {
        require_primary(&set)?;
        Ok(Self { set })
    }
}

impl Aead for AeadWrapper {
    fn encrypt(&self, plaintext: &[u8], associated_data: &[u8]) -> Result<Vec<u8>> {
        with_primary(&self.set, |aead| aead.encrypt(plaintext, associated_data))
    }

    fn decrypt(&self, ciphertext: &[u8], associated_data: &[u8]) -> Result<Vec<u8>> {
        first_success(&self.set, ciphertext, "decryption", |aead, body| {
            aead.decrypt(body, associated_data)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keyset::{KeyStatus, OutputPrefixType};
    use crate::testing::{FakeAead, fake_key};
    use crate::{DispatchError, Error};
    use hex_literal::hex;
    use std::sync::Arc;

    fn rotation_set() -> (PrimitiveSet<dyn Aead>, Arc<dyn Aead>, Arc<dyn Aead>) {
        let a: Arc<dyn Aead> = Arc::new(FakeAead::new("a"));
        let b: Arc<dyn Aead> = Arc::new(FakeAead::new("b"));
        let mut set = PrimitiveSet::new();
        let primary = set
            .add_primitive(a.clone(), &fake_key(1, KeyStatus::Enabled, OutputPrefixType::Tink))
            .unwrap();
        set.add_primitive(b.clone(), &fake_key(2, KeyStatus::Enabled, OutputPrefixType::Raw))
            .unwrap();
        set.set_primary(primary).unwrap();
        (set, a, b)
    }

    #[test]
    fn single_key_round_trip() {
        let mut set: PrimitiveSet<dyn Aead> = PrimitiveSet::new();
        let primary = set
            .add_primitive(
                Arc::new(FakeAead::new("only")),
                &fake_key(5, KeyStatus::Enabled, OutputPrefixType::Tink),
            )
            .unwrap();
        set.set_primary(primary).unwrap();
        let aead = AeadWrapper::new(set).unwrap();

        let ciphertext = aead.encrypt(b"plaintext", b"ad").unwrap();
        assert_eq!(&ciphertext[..5], &hex!("0100000005"));
        assert_eq!(aead.decrypt(&ciphertext, b"ad").unwrap(), b"plaintext");
    }

    #[test]
    fn rotated_keys_still_decrypt() {
        let (set, a, b) = rotation_set();
        let aead = AeadWrapper::new(set).unwrap();

        let from_primary = aead.encrypt(b"msg", b"ad").unwrap();
        assert_eq!(&from_primary[..5], &hex!("0100000001"));
        assert_eq!(aead.decrypt(&from_primary, b"ad").unwrap(), b"msg");

        let legacy = b.encrypt(b"old", b"ad").unwrap();
        assert_eq!(aead.decrypt(&legacy, b"ad").unwrap(), b"old");

        let unprefixed = a.encrypt(b"raw", b"ad").unwrap();
        assert!(aead.decrypt(&unprefixed, b"ad").is_err());
        let prefixed = [hex!("0100000001").as_slice(), &unprefixed].concat();
        assert_eq!(aead.decrypt(&prefixed, b"ad").unwrap(), b"raw");
    }

    #[test]
    fn exhausted_candidates_report_no_matching_key() {
        let (set, _, _) = rotation_set();
        let aead = AeadWrapper::new(set).unwrap();
        let ciphertext = aead.encrypt(b"msg", b"ad").unwrap();

        let err = aead.decrypt(&ciphertext, b"other").unwrap_err();
        assert!(matches!(
            err,
            Error::Dispatch(DispatchError::NoMatchingKey {
                operation: "decryption"
            })
        ));
        assert!(err.to_string().contains("decryption failed"));
    }

    #[test]
    fn set_without_primary_is_rejected() {
        let set: PrimitiveSet<dyn Aead> = PrimitiveSet::new();
        assert!(matches!(
            AeadWrapper::new(set),
            Err(Error::Dispatch(DispatchError::NoPrimary))
        ));
    }
}
