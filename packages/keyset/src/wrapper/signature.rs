use super::{first_success, require_primary, with_primary};
use crate::error::Result;
use crate::primitive::{PublicKeySign, PublicKeyVerify};
use crate::primitive_set::PrimitiveSet;

/// Signer that signs with the primary key of a keyset
pub struct PublicKeySignWrapper {
    set: PrimitiveSet<dyn PublicKeySign>,
}

impl PublicKeySignWrapper {
    /// Wrap `set`; it must have a primary entry
    pub fn new(set: PrimitiveSet<dyn PublicKeySign>) -> Result<Self> {
        require_primary(&set)?;
        Ok(Self { set })
    }
}

impl PublicKeySign for PublicKeySignWrapper {
    fn sign(&self, data: &[u8]) -> Result<Vec<u8>> {
        with_primary(&self.set, |signer| signer.sign(data))
    }
}

/// Verifier that accepts signatures from any enabled key of a keyset
pub struct PublicKeyVerifyWrapper {
    set: PrimitiveSet<dyn PublicKeyVerify>,
}

impl PublicKeyVerifyWrapper {
    /// Wrap `set`
    pub fn new(set: PrimitiveSet<dyn PublicKeyVerify>) -> Result<Self> {
        Ok(Self { set })
    }
}

impl PublicKeyVerify for PublicKeyVerifyWrapper {
    fn verify(&self, signature: &[u8], data: &[u8]) -> Result<()> {
        first_success(&self.set, signature, "verification", |verifier, body| {
            verifier.verify(body, data)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keyset::{KeyStatus, OutputPrefixType};
    use crate::testing::{FakePublicKeySign, FakePublicKeyVerify, fake_key};
    use std::sync::Arc;

    #[test]
    fn signatures_verify_through_matching_key() {
        let mut signers: PrimitiveSet<dyn PublicKeySign> = PrimitiveSet::new();
        let mut verifiers: PrimitiveSet<dyn PublicKeyVerify> = PrimitiveSet::new();
        for (key_id, name, prefix) in [
            (10, "first", OutputPrefixType::Raw),
            (11, "second", OutputPrefixType::Tink),
        ] {
            let key = fake_key(key_id, KeyStatus::Enabled, prefix);
            let index = signers
                .add_primitive(Arc::new(FakePublicKeySign::new(name)), &key)
                .unwrap();
            verifiers
                .add_primitive(Arc::new(FakePublicKeyVerify::new(name)), &key)
                .unwrap();
            signers.set_primary(index).unwrap();
            verifiers.set_primary(index).unwrap();
        }
        let signer = PublicKeySignWrapper::new(signers).unwrap();
        let verifier = PublicKeyVerifyWrapper::new(verifiers).unwrap();

        let signature = signer.sign(b"message").unwrap();
        assert_eq!(&signature[..5], &[1, 0, 0, 0, 11]);
        verifier.verify(&signature, b"message").unwrap();

        let raw_signature = FakePublicKeySign::new("first").sign(b"message").unwrap();
        verifier.verify(&raw_signature, b"message").unwrap();

        let err = verifier.verify(&signature, b"forged").unwrap_err();
        assert!(err.to_string().contains("verification failed"));
    }
}
