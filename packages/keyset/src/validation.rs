//! Structural checks run before a keyset is turned into primitives

use crate::error::ValidationError;
use crate::keyset::{KeyStatus, Keyset, OutputPrefixType};

/// Check `keyset` and return the position of its primary key.
///
/// Destroyed keys are exempt from the per-key checks since their material may
/// already be gone. A keyset holding nothing but destroyed keys is empty.
pub fn validate_keyset(keyset: &Keyset) -> Result<usize, ValidationError> {
    let mut live_keys = 0usize;
    let mut primary = None;
    let mut primary_count = 0usize;

    for (index, key) in keyset.keys.iter().enumerate() {
        if key.status == KeyStatus::Destroyed {
            continue;
        }
        live_keys += 1;
        if key.key_data.is_none() {
            return Err(ValidationError::MissingKeyData(key.key_id));
        }
        if key.output_prefix_type == OutputPrefixType::Unknown {
            return Err(ValidationError::UnknownPrefix(key.key_id));
        }
        if key.status == KeyStatus::Unknown {
            return Err(ValidationError::UnknownStatus(key.key_id));
        }
        if key.key_id == keyset.primary_key_id && key.status == KeyStatus::Enabled {
            primary_count += 1;
            primary.get_or_insert(index);
        }
    }

    if live_keys == 0 {
        return Err(ValidationError::EmptyKeyset);
    }
    match (primary, primary_count) {
        (Some(index), 1) => Ok(index),
        (None, _) => Err(ValidationError::NoValidPrimaryKey),
        _ => Err(ValidationError::MultiplePrimaryKeys),
    }
}
