//! Keyset handles.
//!
//! A [`KeysetHandle`] owns a keyset and is the only way to turn it into
//! primitives or to persist it. Handles are immutable; rotation goes through
//! [`crate::KeysetManager`], which hands back a new handle.

use crate::codec;
use crate::error::{Error, PersistenceError, Result, ValidationError};
use crate::io::{KeysetReader, KeysetWriter};
use crate::keyset::{
    EncryptedKeyset, Key, KeyMaterialType, KeyStatus, KeyTemplate, Keyset, KeysetInfo,
};
use crate::primitive::{Aead, PrimitiveType};
use crate::primitive_set::PrimitiveSet;
use crate::registry::Registry;
use crate::validation::validate_keyset;
use std::sync::Arc;
use tracing::{debug, warn};
use zeroize::Zeroizing;

/// Immutable owner of a keyset
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeysetHandle {
    keyset: Keyset,
}

impl KeysetHandle {
    /// Generate a handle holding one fresh key made from `template`
    pub fn generate_new(registry: &Registry, template: &KeyTemplate) -> Result<Self> {
        let key_data = registry.new_key_data(template)?;
        let key_id = unused_key_id(&[]);
        let key = Key::new(key_data, KeyStatus::Enabled, key_id, template.output_prefix_type);
        debug!(type_url = %template.type_url, key_id, "generated keyset");
        Ok(Self {
            keyset: Keyset::new(key_id, vec![key]),
        })
    }

    /// Wrap a cleartext keyset
    ///
    /// The keyset is validated when primitives are requested, not here.
    pub fn from_keyset(keyset: Keyset) -> Self {
        Self { keyset }
    }

    /// Read an encrypted keyset and decrypt it with `master_key`
    pub fn read<R: KeysetReader + ?Sized>(reader: &mut R, master_key: &dyn Aead) -> Result<Self> {
        let encrypted = reader.read_encrypted()?;
        let keyset = decrypt_keyset(&encrypted, master_key)?;
        Ok(Self { keyset })
    }

    /// Read a cleartext keyset
    pub fn read_cleartext<R: KeysetReader + ?Sized>(reader: &mut R) -> Result<Self> {
        Ok(Self {
            keyset: reader.read()?,
        })
    }

    /// Encrypt the keyset with `master_key` and write it
    pub fn write<W: KeysetWriter + ?Sized>(&self, writer: &mut W, master_key: &dyn Aead) -> Result<()> {
        let encrypted = encrypt_keyset(&self.keyset, master_key)?;
        writer.write_encrypted(&encrypted)
    }

    /// Write the keyset in cleartext
    pub fn write_cleartext<W: KeysetWriter + ?Sized>(&self, writer: &mut W) -> Result<()> {
        writer.write(&self.keyset)
    }

    /// Redacted view of the keyset
    pub fn keyset_info(&self) -> KeysetInfo {
        self.keyset.info()
    }

    /// Validate the keyset and build one primitive of type `P` per enabled key
    pub fn primitive_set<P: PrimitiveType + ?Sized>(&self, registry: &Registry) -> Result<PrimitiveSet<P>> {
        let primary_index = validate_keyset(&self.keyset)?;
        let mut set = PrimitiveSet::new();
        for (index, key) in self.keyset.keys.iter().enumerate() {
            if key.status != KeyStatus::Enabled {
                continue;
            }
            let key_data = key
                .key_data
                .as_ref()
                .ok_or(ValidationError::MissingKeyData(key.key_id))?;
            let primitive = registry
                .primitive::<P>(key_data)
                .map_err(|e| e.for_key(key.key_id))?;
            let entry = set.add_primitive(primitive, key)?;
            if index == primary_index {
                set.set_primary(entry)?;
            }
        }
        let kind = P::KIND;
        debug!(
            %kind,
            primary_key_id = self.keyset.primary_key_id,
            entries = set.len(),
            "built primitive set"
        );
        Ok(set)
    }

    /// Build the rotation-aware primitive of type `P` for this keyset
    pub fn primitive<P: PrimitiveType + ?Sized>(&self, registry: &Registry) -> Result<Arc<P>> {
        P::wrap(self.primitive_set::<P>(registry)?)
    }

    /// Handle for the public keys of an asymmetric private keyset
    pub fn public_keyset_handle(&self, registry: &Registry) -> Result<Self> {
        let mut keys = Vec::with_capacity(self.keyset.keys.len());
        for key in &self.keyset.keys {
            let Some(key_data) = key.key_data.as_ref() else {
                if key.status == KeyStatus::Destroyed {
                    keys.push(key.clone());
                    continue;
                }
                return Err(ValidationError::MissingKeyData(key.key_id).into());
            };
            if key_data.key_material_type != KeyMaterialType::AsymmetricPrivate {
                return Err(Error::not_supported(format!(
                    "key {} is not an asymmetric private key",
                    key.key_id
                )));
            }
            let public_data = registry
                .public_key_data(&key_data.type_url, &key_data.value)
                .map_err(|e| e.for_key(key.key_id))?;
            keys.push(Key {
                key_data: Some(public_data),
                status: key.status,
                key_id: key.key_id,
                output_prefix_type: key.output_prefix_type,
            });
        }
        Ok(Self {
            keyset: Keyset::new(self.keyset.primary_key_id, keys),
        })
    }

    pub(crate) fn keyset(&self) -> &Keyset {
        &self.keyset
    }
}

/// Random non-zero key id not present in `keys`
pub(crate) fn unused_key_id(keys: &[Key]) -> u32 {
    loop {
        let candidate: u32 = rand::random();
        if candidate != 0 && keys.iter().all(|key| key.key_id != candidate) {
            return candidate;
        }
    }
}

fn decrypt_keyset(encrypted: &EncryptedKeyset, master_key: &dyn Aead) -> Result<Keyset> {
    let plaintext = Zeroizing::new(master_key.decrypt(&encrypted.encrypted_keyset, b"")?);
    codec::decode(&plaintext).map_err(|e| PersistenceError::InvalidKeyset(e.to_string()).into())
}

/// Encrypt `keyset` and check that the ciphertext decrypts back to it
fn encrypt_keyset(keyset: &Keyset, master_key: &dyn Aead) -> Result<EncryptedKeyset> {
    let plaintext = Zeroizing::new(codec::encode(keyset)?);
    let encrypted_keyset = master_key.encrypt(&plaintext, b"")?;

    let decrypted = Zeroizing::new(master_key.decrypt(&encrypted_keyset, b"")?);
    let round_trip: Keyset = match codec::decode(&decrypted) {
        Ok(round_trip) => round_trip,
        Err(e) => {
            warn!(error = %e, "encrypted keyset does not decrypt to a keyset");
            return Err(PersistenceError::InvalidKeyset("corrupted key material".into()).into());
        }
    };
    if round_trip != *keyset {
        warn!(
            expected = ?keyset.info(),
            actual = ?round_trip.info(),
            "encrypted keyset decrypts to a different keyset"
        );
        return Err(PersistenceError::CannotEncryptKeyset(
            "ciphertext decrypts to a different keyset".into(),
        )
        .into());
    }

    Ok(EncryptedKeyset {
        encrypted_keyset,
        keyset_info: Some(keyset.info()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::{BinaryKeysetReader, BinaryKeysetWriter};
    use crate::primitive::Mac;
    use crate::testing::{FAKE_AEAD_TYPE_URL, FakeAead, FakeKeyManager, fake_key, fake_template};
    use crate::keyset::OutputPrefixType;
    use crate::{DispatchError, Error};

    fn registry() -> Registry {
        let registry = Registry::new();
        registry.register_key_manager(FakeKeyManager::aead(), true).unwrap();
        registry
    }

    #[test]
    fn generated_handle_has_one_enabled_primary() {
        let registry = registry();
        let template = fake_template(FAKE_AEAD_TYPE_URL, OutputPrefixType::Tink);
        let handle = KeysetHandle::generate_new(&registry, &template).unwrap();
        let info = handle.keyset_info();
        assert_eq!(info.key_info.len(), 1);
        assert_ne!(info.primary_key_id, 0);
        assert_eq!(info.key_info[0].key_id, info.primary_key_id);
        assert_eq!(info.key_info[0].status, KeyStatus::Enabled);
        assert_eq!(info.key_info[0].output_prefix_type, OutputPrefixType::Tink);
    }

    #[test]
    fn primitive_skips_disabled_keys() {
        let registry = registry();
        let keyset = Keyset::new(
            1,
            vec![
                fake_key(1, KeyStatus::Enabled, OutputPrefixType::Tink),
                fake_key(2, KeyStatus::Disabled, OutputPrefixType::Tink),
            ],
        );
        let set = KeysetHandle::from_keyset(keyset)
            .primitive_set::<dyn Aead>(&registry)
            .unwrap();
        assert_eq!(set.len(), 1);
        assert_eq!(set.primary().map(|entry| entry.key_id()), Some(1));
    }

    #[test]
    fn wrong_primitive_class_names_the_key() {
        let registry = registry();
        let keyset = Keyset::new(4, vec![fake_key(4, KeyStatus::Enabled, OutputPrefixType::Tink)]);
        let err = KeysetHandle::from_keyset(keyset)
            .primitive::<dyn Mac>(&registry)
            .err().expect("expected an error");
        assert!(matches!(err, Error::KeyFailure { key_id: 4, .. }));
        assert!(matches!(
            err.root(),
            Error::Dispatch(DispatchError::WrongPrimitiveClass { .. })
        ));
    }

    #[test]
    fn encrypted_round_trip() {
        let registry = registry();
        let template = fake_template(FAKE_AEAD_TYPE_URL, OutputPrefixType::Tink);
        let handle = KeysetHandle::generate_new(&registry, &template).unwrap();
        let master = FakeAead::new("master");

        let mut writer = BinaryKeysetWriter::new(Vec::new());
        handle.write(&mut writer, &master).unwrap();
        let mut reader = BinaryKeysetReader::new(writer.into_inner());
        let restored = KeysetHandle::read(&mut reader, &master).unwrap();
        assert_eq!(restored, handle);

        let mut writer = BinaryKeysetWriter::new(Vec::new());
        handle.write(&mut writer, &master).unwrap();
        let mut reader = BinaryKeysetReader::new(writer.into_inner());
        assert!(KeysetHandle::read(&mut reader, &FakeAead::new("other")).is_err());
    }

    #[test]
    fn key_ids_avoid_zero_and_existing_ids() {
        let keys: Vec<Key> = (1..=8)
            .map(|key_id| fake_key(key_id, KeyStatus::Enabled, OutputPrefixType::Raw))
            .collect();
        for _ in 0..64 {
            let key_id = unused_key_id(&keys);
            assert!(key_id > 8);
        }
    }
}
