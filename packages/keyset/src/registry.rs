//! Key-manager registry.
//!
//! The registry maps type URLs to key managers. Lookups read an immutable
//! snapshot through [`ArcSwap`] and never block; registrations are serialized
//! by a mutex and publish a fresh snapshot, so a concurrent reader sees either
//! the table before or after a registration, never a partial one.

use crate::error::{DispatchError, Error, RegistryError, Result};
use crate::key_manager::{KeyManager, PrivateKeyManager};
use crate::keyset::{KeyData, KeyTemplate};
use crate::primitive::{PrimitiveKind, PrimitiveType};
use arc_swap::ArcSwap;
use std::any::TypeId;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{debug, info, warn};

#[derive(Clone)]
struct Registration {
    manager: Arc<dyn KeyManager>,
    manager_type: TypeId,
    new_key_allowed: bool,
    public_type_url: Option<String>,
}

type ManagerTable = HashMap<String, Registration>;

/// Thread-safe table of key managers keyed by type URL
pub struct Registry {
    managers: ArcSwap<ManagerTable>,
    write_lock: Mutex<()>,
}

impl Registry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            managers: ArcSwap::from_pointee(HashMap::new()),
            write_lock: Mutex::new(()),
        }
    }

    /// Register `manager` under its type URL.
    ///
    /// Registering the same manager type again is idempotent and may tighten
    /// `new_key_allowed`, but may not loosen it. A different manager type for
    /// an already registered type URL is refused; use
    /// [`Registry::replace_key_manager`] to overwrite deliberately.
    pub fn register_key_manager<M: KeyManager>(&self, manager: M, new_key_allowed: bool) -> Result<()> {
        let type_url = manager.type_url().to_string();
        self.update(|table| {
            check_insertable(table, &type_url, TypeId::of::<M>(), new_key_allowed)?;
            let public_type_url = table
                .get(&type_url)
                .and_then(|existing| existing.public_type_url.clone());
            table.insert(
                type_url.clone(),
                Registration {
                    manager: Arc::new(manager),
                    manager_type: TypeId::of::<M>(),
                    new_key_allowed,
                    public_type_url,
                },
            );
            Ok(())
        })?;
        info!(type_url = %type_url, new_key_allowed, "registered key manager");
        Ok(())
    }

    /// Register `manager` under its type URL, replacing any existing registration
    pub fn replace_key_manager<M: KeyManager>(&self, manager: M, new_key_allowed: bool) -> Result<()> {
        let type_url = manager.type_url().to_string();
        let replaced = self.update(|table| {
            Ok(table
                .insert(
                    type_url.clone(),
                    Registration {
                        manager: Arc::new(manager),
                        manager_type: TypeId::of::<M>(),
                        new_key_allowed,
                        public_type_url: None,
                    },
                )
                .is_some())
        })?;
        if replaced {
            warn!(type_url = %type_url, "replaced registered key manager");
        } else {
            info!(type_url = %type_url, new_key_allowed, "registered key manager");
        }
        Ok(())
    }

    /// Register a private key manager together with its public counterpart.
    ///
    /// Both registrations succeed or neither does. A private manager that was
    /// linked to one public type URL cannot be linked to another.
    pub fn register_asymmetric_key_managers<Pr, Pu>(
        &self,
        private: Pr,
        public: Pu,
        new_key_allowed: bool,
    ) -> Result<()>
    where
        Pr: PrivateKeyManager,
        Pu: KeyManager,
    {
        let private_type_url = private.type_url().to_string();
        let public_type_url = public.type_url().to_string();
        if private.public_key_type_url() != public_type_url {
            return Err(RegistryError::TypeUrlMismatch {
                expected: private.public_key_type_url().to_string(),
                actual: public_type_url,
            }
            .into());
        }

        self.update(|table| {
            check_insertable(table, &private_type_url, TypeId::of::<Pr>(), new_key_allowed)?;
            check_insertable(table, &public_type_url, TypeId::of::<Pu>(), new_key_allowed)?;
            if let Some(linked) = table
                .get(&private_type_url)
                .and_then(|existing| existing.public_type_url.as_deref())
                && linked != public_type_url
            {
                return Err(RegistryError::CannotReregister {
                    private_type_url: private_type_url.clone(),
                    public_type_url: public_type_url.clone(),
                }
                .into());
            }
            table.insert(
                private_type_url.clone(),
                Registration {
                    manager: Arc::new(private),
                    manager_type: TypeId::of::<Pr>(),
                    new_key_allowed,
                    public_type_url: Some(public_type_url.clone()),
                },
            );
            table.insert(
                public_type_url.clone(),
                Registration {
                    manager: Arc::new(public),
                    manager_type: TypeId::of::<Pu>(),
                    new_key_allowed,
                    public_type_url: None,
                },
            );
            Ok(())
        })?;
        info!(
            private_type_url = %private_type_url,
            public_type_url = %public_type_url,
            new_key_allowed,
            "registered asymmetric key managers"
        );
        Ok(())
    }

    /// The manager registered for `type_url`
    pub fn key_manager(&self, type_url: &str) -> Result<Arc<dyn KeyManager>> {
        self.managers
            .load()
            .get(type_url)
            .map(|registration| Arc::clone(&registration.manager))
            .ok_or_else(|| RegistryError::UnknownKeyType(type_url.to_string()).into())
    }

    /// The manager registered for `type_url`, checked to produce `kind`
    pub fn key_manager_for(&self, type_url: &str, kind: PrimitiveKind) -> Result<Arc<dyn KeyManager>> {
        let manager = self.key_manager(type_url)?;
        let actual = manager.primitive_kind();
        if actual != kind {
            return Err(DispatchError::WrongPrimitiveClass {
                requested: kind,
                actual,
                type_url: type_url.to_string(),
            }
            .into());
        }
        Ok(manager)
    }

    /// Instantiate the primitive of type `P` for `key_data`
    pub fn primitive<P: PrimitiveType + ?Sized>(&self, key_data: &KeyData) -> Result<Arc<P>> {
        let manager = self.key_manager_for(&key_data.type_url, P::KIND)?;
        manager
            .primitive(key_data)?
            .into_typed::<P>(&key_data.type_url)
    }

    /// Generate key data for `template`
    pub fn new_key_data(&self, template: &KeyTemplate) -> Result<KeyData> {
        let (manager, new_key_allowed) = {
            let table = self.managers.load();
            let registration = table
                .get(&template.type_url)
                .ok_or_else(|| RegistryError::UnknownKeyType(template.type_url.clone()))?;
            (Arc::clone(&registration.manager), registration.new_key_allowed)
        };
        if !new_key_allowed {
            return Err(RegistryError::NewKeyNotAllowed(template.type_url.clone()).into());
        }
        let key_data = manager.new_key_data(&template.value)?;
        debug!(type_url = %template.type_url, "generated key data");
        Ok(key_data)
    }

    /// Derive public key data from a serialized private key of type `type_url`
    pub fn public_key_data(&self, type_url: &str, serialized_private_key: &[u8]) -> Result<KeyData> {
        let manager = self.key_manager(type_url)?;
        let private = manager.as_private().ok_or_else(|| {
            Error::not_supported(format!(
                "key manager for {type_url} is not a PrivateKeyFactory"
            ))
        })?;
        private.public_key_data(serialized_private_key)
    }

    /// Registered type URLs, sorted
    pub fn type_urls(&self) -> Vec<String> {
        let mut type_urls: Vec<String> = self.managers.load().keys().cloned().collect();
        type_urls.sort_unstable();
        type_urls
    }

    /// Whether a manager is registered for `type_url`
    pub fn contains(&self, type_url: &str) -> bool {
        self.managers.load().contains_key(type_url)
    }

    fn update<T>(&self, change: impl FnOnce(&mut ManagerTable) -> Result<T>) -> Result<T> {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut table = ManagerTable::clone(&self.managers.load());
        let outcome = change(&mut table)?;
        self.managers.store(Arc::new(table));
        Ok(outcome)
    }
}

fn check_insertable(
    table: &ManagerTable,
    type_url: &str,
    manager_type: TypeId,
    new_key_allowed: bool,
) -> Result<()> {
    let Some(existing) = table.get(type_url) else {
        return Ok(());
    };
    if existing.manager_type != manager_type {
        return Err(RegistryError::AlreadyRegistered {
            type_url: type_url.to_string(),
            reason: "already registered with a different key manager",
        }
        .into());
    }
    if !existing.new_key_allowed && new_key_allowed {
        return Err(RegistryError::AlreadyRegistered {
            type_url: type_url.to_string(),
            reason: "forbidden new key operation",
        }
        .into());
    }
    Ok(())
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for Registry {
    fn clone(&self) -> Self {
        Self {
            managers: ArcSwap::new(self.managers.load_full()),
            write_lock: Mutex::new(()),
        }
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("type_urls", &self.type_urls())
            .finish()
    }
}
