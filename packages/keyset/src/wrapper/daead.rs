use super::{first_success, require_primary, with_primary};
use crate::error::Result;
use crate::primitive::DeterministicAead;
use crate::primitive_set::PrimitiveSet;

/// Deterministic AEAD over every enabled key of a keyset
pub struct DeterministicAeadWrapper {
    set: PrimitiveSet<dyn DeterministicAead>,
}

impl DeterministicAeadWrapper {
    /// Wrap `set`; it must have a primary entry
    pub fn new(set: PrimitiveSet<dyn DeterministicAead>) -> Result<Self> {
        require_primary(&set)?;
        Ok(Self { set })
    }
}

impl DeterministicAead for DeterministicAeadWrapper {
    fn encrypt_deterministically(
        &self,
        plaintext: &[u8],
        associated_data: &[u8],
    ) -> Result<Vec<u8>> {
        with_primary(&self.set, |daead| {
            daead.encrypt_deterministically(plaintext, associated_data)
        })
    }

    fn decrypt_deterministically(
        &self,
        ciphertext: &[u8],
        associated_data: &[u8],
    ) -> Result<Vec<u8>> {
        first_success(&self.set, ciphertext, "decryption", |daead, body| {
            daead.decrypt_deterministically(body, associated_data)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keyset::{KeyStatus, OutputPrefixType};
    use crate::testing::{FakeDeterministicAead, fake_key};
    use std::sync::Arc;

    #[test]
    fn equal_inputs_give_equal_ciphertexts() {
        let mut set: PrimitiveSet<dyn DeterministicAead> = PrimitiveSet::new();
        let primary = set
            .add_primitive(
                Arc::new(FakeDeterministicAead::new("d")),
                &fake_key(7, KeyStatus::Enabled, OutputPrefixType::Crunchy),
            )
            .unwrap();
        set.set_primary(primary).unwrap();
        let daead = DeterministicAeadWrapper::new(set).unwrap();

        let first = daead.encrypt_deterministically(b"pt", b"ad").unwrap();
        let second = daead.encrypt_deterministically(b"pt", b"ad").unwrap();
        assert_eq!(first, second);
        assert_eq!(first[0], 0x00);
        assert_eq!(daead.decrypt_deterministically(&first, b"ad").unwrap(), b"pt");
        assert!(daead.decrypt_deterministically(&first, b"other").is_err());
    }
}
