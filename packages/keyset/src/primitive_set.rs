//! Rotation-aware collection of primitives built from one keyset.
//!
//! Each entry pairs a primitive with the output prefix of the key it came
//! from. Producers (encrypt, sign, compute MAC) use the primary entry only;
//! consumers (decrypt, verify) walk [`PrimitiveSet::candidates`].

use crate::crypto_format::{self, RAW_PREFIX};
use crate::error::{Error, Result};
use crate::keyset::{Key, KeyStatus, OutputPrefixType};
use std::fmt;
use std::sync::Arc;

/// One primitive together with the key it was built from
pub struct Entry<P: ?Sized> {
    primitive: Arc<P>,
    prefix: Vec<u8>,
    key_id: u32,
    status: KeyStatus,
    output_prefix_type: OutputPrefixType,
}

impl<P: ?Sized> Entry<P> {
    /// The primitive instance
    pub fn primitive(&self) -> &Arc<P> {
        &self.primitive
    }

    /// Output prefix of the key, empty for RAW keys
    pub fn prefix(&self) -> &[u8] {
        &self.prefix
    }

    /// Id of the key
    pub fn key_id(&self) -> u32 {
        self.key_id
    }

    /// Status of the key when the entry was added
    pub fn status(&self) -> KeyStatus {
        self.status
    }

    /// Prefix type of the key
    pub fn output_prefix_type(&self) -> OutputPrefixType {
        self.output_prefix_type
    }
}

impl<P: ?Sized> Clone for Entry<P> {
    fn clone(&self) -> Self {
        Self {
            primitive: Arc::clone(&self.primitive),
            prefix: self.prefix.clone(),
            key_id: self.key_id,
            status: self.status,
            output_prefix_type: self.output_prefix_type,
        }
    }
}

impl<P: ?Sized> fmt::Debug for Entry<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entry")
            .field("prefix", &self.prefix)
            .field("key_id", &self.key_id)
            .field("status", &self.status)
            .field("output_prefix_type", &self.output_prefix_type)
            .finish_non_exhaustive()
    }
}

/// Primitives of one kind, in keyset order, with a designated primary
pub struct PrimitiveSet<P: ?Sized> {
    entries: Vec<Entry<P>>,
    primary: Option<usize>,
}

impl<P: ?Sized> PrimitiveSet<P> {
    /// Create an empty set
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            primary: None,
        }
    }

    /// Append `primitive` built from `key`, returning the entry index
    pub fn add_primitive(&mut self, primitive: Arc<P>, key: &Key) -> Result<usize> {
        if key.status != KeyStatus::Enabled {
            return Err(Error::InvalidKeyState {
                key_id: key.key_id,
                reason: "only enabled keys can be added to a primitive set",
            });
        }
        let prefix = crypto_format::output_prefix(key)?;
        self.entries.push(Entry {
            primitive,
            prefix,
            key_id: key.key_id,
            status: key.status,
            output_prefix_type: key.output_prefix_type,
        });
        Ok(self.entries.len() - 1)
    }

    /// Make the entry at `index` the primary
    pub fn set_primary(&mut self, index: usize) -> Result<()> {
        if index >= self.entries.len() {
            return Err(Error::invalid_parameters(format!(
                "primitive set has no entry at index {index}"
            )));
        }
        self.primary = Some(index);
        Ok(())
    }

    /// The primary entry, if one was set
    pub fn primary(&self) -> Option<&Entry<P>> {
        self.primary.map(|index| &self.entries[index])
    }

    /// All entries in keyset order
    pub fn entries(&self) -> &[Entry<P>] {
        &self.entries
    }

    /// Entries whose prefix equals `prefix`
    pub fn entries_for_prefix<'a>(&'a self, prefix: &'a [u8]) -> impl Iterator<Item = &'a Entry<P>> {
        self.entries.iter().filter(move |entry| entry.prefix == prefix)
    }

    /// Entries of RAW keys
    pub fn raw_entries(&self) -> impl Iterator<Item = &Entry<P>> {
        self.entries_for_prefix(RAW_PREFIX)
    }

    /// Entries that may have produced `input`, in the order they should be tried
    ///
    /// The primary comes first when its prefix matches, then prefixed entries
    /// in keyset order, then RAW entries.
    pub fn candidates(&self, input: &[u8]) -> Vec<&Entry<P>> {
        let mut candidates = Vec::new();
        if let Some(primary) = self.primary()
            && input.starts_with(&primary.prefix)
        {
            candidates.push(primary);
        }
        let is_primary = |index: usize| self.primary == Some(index);
        candidates.extend(self.entries.iter().enumerate().filter_map(|(index, entry)| {
            (!is_primary(index) && !entry.prefix.is_empty() && input.starts_with(&entry.prefix))
                .then_some(entry)
        }));
        candidates.extend(
            self.entries
                .iter()
                .enumerate()
                .filter_map(|(index, entry)| {
                    (!is_primary(index) && entry.prefix.is_empty()).then_some(entry)
                }),
        );
        candidates
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the set has no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<P: ?Sized> Default for PrimitiveSet<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: ?Sized> Clone for PrimitiveSet<P> {
    fn clone(&self) -> Self {
        Self {
            entries: self.entries.clone(),
            primary: self.primary,
        }
    }
}

impl<P: ?Sized> fmt::Debug for PrimitiveSet<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrimitiveSet")
            .field("entries", &self.entries)
            .field("primary", &self.primary)
            .finish()
    }
}
