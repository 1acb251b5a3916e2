//! Key rotation bookkeeping
//!
//! [`KeysetManager`] edits a keyset in place: adding keys, promoting a new
//! primary and retiring old keys. Each operation checks that the resulting
//! keyset keeps a usable primary.

use crate::error::{Error, Result};
use crate::handle::{KeysetHandle, unused_key_id};
use crate::keyset::{Key, KeyStatus, KeyTemplate, Keyset};
use crate::registry::Registry;
use tracing::info;

/// Mutable view of a keyset for rotation
#[derive(Clone, Debug, Default)]
pub struct KeysetManager {
    keyset: Keyset,
}

impl KeysetManager {
    /// Start from an empty keyset
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from the keyset held by `handle`
    pub fn from_handle(handle: &KeysetHandle) -> Self {
        Self {
            keyset: handle.keyset().clone(),
        }
    }

    /// Add an enabled key generated from `template`, returning its id
    ///
    /// The first key added to an empty keyset becomes the primary.
    pub fn add(&mut self, registry: &Registry, template: &KeyTemplate) -> Result<u32> {
        let key_data = registry.new_key_data(template)?;
        let key_id = unused_key_id(&self.keyset.keys);
        self.keyset.keys.push(Key::new(
            key_data,
            KeyStatus::Enabled,
            key_id,
            template.output_prefix_type,
        ));
        if self.keyset.keys.len() == 1 {
            self.keyset.primary_key_id = key_id;
        }
        info!(key_id, type_url = %template.type_url, "added key");
        Ok(key_id)
    }

    /// Add a key generated from `template` and make it the primary
    pub fn rotate(&mut self, registry: &Registry, template: &KeyTemplate) -> Result<u32> {
        let key_id = self.add(registry, template)?;
        self.set_primary(key_id)?;
        Ok(key_id)
    }

    /// Make `key_id` the primary; the key must be enabled
    pub fn set_primary(&mut self, key_id: u32) -> Result<()> {
        let key = self.key_mut(key_id)?;
        if key.status != KeyStatus::Enabled {
            return Err(Error::InvalidKeyState {
                key_id,
                reason: "only an enabled key can become primary",
            });
        }
        self.keyset.primary_key_id = key_id;
        info!(key_id, "set primary key");
        Ok(())
    }

    /// Enable a disabled key
    pub fn enable(&mut self, key_id: u32) -> Result<()> {
        let key = self.key_mut(key_id)?;
        match key.status {
            KeyStatus::Enabled | KeyStatus::Disabled => {
                key.status = KeyStatus::Enabled;
                Ok(())
            }
            _ => Err(Error::InvalidKeyState {
                key_id,
                reason: "only a disabled key can be enabled",
            }),
        }
    }

    /// Disable a key other than the primary
    pub fn disable(&mut self, key_id: u32) -> Result<()> {
        self.ensure_not_primary(key_id, "the primary key cannot be disabled")?;
        let key = self.key_mut(key_id)?;
        match key.status {
            KeyStatus::Enabled | KeyStatus::Disabled => {
                key.status = KeyStatus::Disabled;
                Ok(())
            }
            _ => Err(Error::InvalidKeyState {
                key_id,
                reason: "only an enabled key can be disabled",
            }),
        }
    }

    /// Drop the key material of a key other than the primary
    pub fn destroy(&mut self, key_id: u32) -> Result<()> {
        self.ensure_not_primary(key_id, "the primary key cannot be destroyed")?;
        let key = self.key_mut(key_id)?;
        match key.status {
            KeyStatus::Enabled | KeyStatus::Disabled | KeyStatus::Destroyed => {
                key.status = KeyStatus::Destroyed;
                key.key_data = None;
                info!(key_id, "destroyed key material");
                Ok(())
            }
            KeyStatus::Unknown => Err(Error::InvalidKeyState {
                key_id,
                reason: "a key with unknown status cannot be destroyed",
            }),
        }
    }

    /// Remove a key other than the primary from the keyset
    pub fn delete(&mut self, key_id: u32) -> Result<()> {
        self.ensure_not_primary(key_id, "the primary key cannot be deleted")?;
        let position = self
            .keyset
            .keys
            .iter()
            .position(|key| key.key_id == key_id)
            .ok_or(Error::KeyNotFound(key_id))?;
        self.keyset.keys.remove(position);
        info!(key_id, "deleted key");
        Ok(())
    }

    /// Handle for the current keyset
    pub fn handle(&self) -> KeysetHandle {
        KeysetHandle::from_keyset(self.keyset.clone())
    }

    fn ensure_not_primary(&self, key_id: u32, reason: &'static str) -> Result<()> {
        if key_id == self.keyset.primary_key_id {
            return Err(Error::InvalidKeyState { key_id, reason });
        }
        Ok(())
    }

    fn key_mut(&mut self, key_id: u32) -> Result<&mut Key> {
        self.keyset
            .keys
            .iter_mut()
            .find(|key| key.key_id == key_id)
            .ok_or(Error::KeyNotFound(key_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keyset::OutputPrefixType;
    use crate::primitive::Aead;
    use crate::testing::{FAKE_AEAD_TYPE_URL, FakeKeyManager, fake_template};

    fn setup() -> (Registry, KeyTemplate) {
        let registry = Registry::new();
        registry.register_key_manager(FakeKeyManager::aead(), true).unwrap();
        (registry, fake_template(FAKE_AEAD_TYPE_URL, OutputPrefixType::Tink))
    }

    #[test]
    fn first_key_becomes_primary_and_rotate_promotes() {
        let (registry, template) = setup();
        let mut manager = KeysetManager::new();
        let first = manager.add(&registry, &template).unwrap();
        assert_eq!(manager.handle().keyset_info().primary_key_id, first);

        let second = manager.rotate(&registry, &template).unwrap();
        assert_ne!(first, second);
        assert_eq!(manager.handle().keyset_info().primary_key_id, second);
    }

    #[test]
    fn primary_key_is_protected() {
        let (registry, template) = setup();
        let mut manager = KeysetManager::new();
        let primary = manager.add(&registry, &template).unwrap();

        for result in [
            manager.disable(primary),
            manager.destroy(primary),
            manager.delete(primary),
        ] {
            assert!(matches!(result, Err(Error::InvalidKeyState { .. })));
        }
        assert!(matches!(manager.enable(42), Err(Error::KeyNotFound(42))));
    }

    #[test]
    fn destroyed_keys_lose_material_and_cannot_be_primary() {
        let (registry, template) = setup();
        let mut manager = KeysetManager::new();
        let old = manager.add(&registry, &template).unwrap();
        manager.rotate(&registry, &template).unwrap();
        manager.destroy(old).unwrap();

        let handle = manager.handle();
        let destroyed = handle
            .keyset()
            .keys
            .iter()
            .find(|key| key.key_id == old)
            .unwrap();
        assert!(destroyed.key_data.is_none());
        assert!(matches!(
            manager.set_primary(old),
            Err(Error::InvalidKeyState { .. })
        ));
        assert!(matches!(manager.enable(old), Err(Error::InvalidKeyState { .. })));
        assert_eq!(handle.primitive_set::<dyn Aead>(&registry).unwrap().len(), 1);
    }

    #[test]
    fn disabled_keys_can_be_reenabled_and_deleted() {
        let (registry, template) = setup();
        let mut manager = KeysetManager::new();
        manager.add(&registry, &template).unwrap();
        let spare = manager.add(&registry, &template).unwrap();

        manager.disable(spare).unwrap();
        assert_eq!(
            manager.handle().primitive_set::<dyn Aead>(&registry).unwrap().len(),
            1
        );
        manager.enable(spare).unwrap();
        assert_eq!(
            manager.handle().primitive_set::<dyn Aead>(&registry).unwrap().len(),
            2
        );
        manager.delete(spare).unwrap();
        assert_eq!(manager.handle().keyset_info().key_info.len(), 1);
    }
}
