use super::{first_success, require_primary, with_primary};
use crate::error::Result;
use crate::primitive::Mac;
use crate::primitive_set::PrimitiveSet;

/// MAC over every enabled key of a keyset
///
/// LEGACY keys are tagged like CRUNCHY keys: the prefix is prepended and the
/// data is authenticated as given.
pub struct MacWrapper {
    set: PrimitiveSet<dyn Mac>,
}

impl MacWrapper {
    /// Wrap `set`; it must have a primary entry
    pub fn new(set: PrimitiveSet<dyn Mac>) -> Result<Self> {
        require_primary(&set)?;
        Ok(Self { set })
    }
}

impl Mac for MacWrapper {
    fn compute_mac(&self, data: &[u8]) -> Result<Vec<u8>> {
        with_primary(&self.set, |mac| mac.compute_mac(data))
    }

    fn verify_mac(&self, mac: &[u8], data: &[u8]) -> Result<()> {
        first_success(&self.set, mac, "verification", |primitive, tag| {
            primitive.verify_mac(tag, data)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keyset::{KeyStatus, OutputPrefixType};
    use crate::testing::{FakeMac, fake_key};
    use std::sync::Arc;

    fn wrapper() -> (MacWrapper, Arc<dyn Mac>) {
        let old: Arc<dyn Mac> = Arc::new(FakeMac::new("old"));
        let mut set: PrimitiveSet<dyn Mac> = PrimitiveSet::new();
        set.add_primitive(old.clone(), &fake_key(1, KeyStatus::Enabled, OutputPrefixType::Legacy))
            .unwrap();
        let primary = set
            .add_primitive(
                Arc::new(FakeMac::new("new")),
                &fake_key(2, KeyStatus::Enabled, OutputPrefixType::Tink),
            )
            .unwrap();
        set.set_primary(primary).unwrap();
        (MacWrapper::new(set).unwrap(), old)
    }

    #[test]
    fn tags_from_primary_and_rotated_keys_verify() {
        let (mac, old) = wrapper();
        let tag = mac.compute_mac(b"data").unwrap();
        assert_eq!(&tag[..5], &[1, 0, 0, 0, 2]);
        mac.verify_mac(&tag, b"data").unwrap();

        let mut legacy_tag = vec![0, 0, 0, 0, 1];
        legacy_tag.extend(old.compute_mac(b"data").unwrap());
        mac.verify_mac(&legacy_tag, b"data").unwrap();
    }

    #[test]
    fn wrong_data_fails_verification() {
        let (mac, _) = wrapper();
        let tag = mac.compute_mac(b"data").unwrap();
        let err = mac.verify_mac(&tag, b"tampered").unwrap_err();
        assert!(err.to_string().contains("verification failed"));
        assert!(mac.verify_mac(b"", b"data").is_err());
    }
}
