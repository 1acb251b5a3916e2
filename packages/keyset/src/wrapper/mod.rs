//! Rotation-aware primitives built from a [`PrimitiveSet`].
//!
//! Producing operations run on the primary entry and prepend its prefix.
//! Consuming operations strip each candidate's prefix and return the first
//! success; when every candidate fails the caller gets
//! [`DispatchError::NoMatchingKey`] rather than the last candidate's error.

mod aead;
mod daead;
mod hybrid;
mod mac;
mod signature;

pub use aead::AeadWrapper;
pub use daead::DeterministicAeadWrapper;
pub use hybrid::{HybridDecryptWrapper, HybridEncryptWrapper};
pub use mac::MacWrapper;
pub use signature::{PublicKeySignWrapper, PublicKeyVerifyWrapper};

use crate::error::{DispatchError, Result};
use crate::primitive_set::{Entry, PrimitiveSet};
use tracing::trace;

/// Fail early when a producing wrapper is built from a set without primary
fn require_primary<P: ?Sized>(set: &PrimitiveSet<P>) -> Result<()> {
    match set.primary() {
        Some(_) => Ok(()),
        None => Err(DispatchError::NoPrimary.into()),
    }
}

/// Run `produce` on the primary entry and prepend its prefix to the output
fn with_primary<P: ?Sized>(
    set: &PrimitiveSet<P>,
    produce: impl FnOnce(&P) -> Result<Vec<u8>>,
) -> Result<Vec<u8>> {
    let primary: &Entry<P> = set.primary().ok_or(DispatchError::NoPrimary)?;
    let output = produce(&**primary.primitive())?;
    let mut prefixed = Vec::with_capacity(primary.prefix().len() + output.len());
    prefixed.extend_from_slice(primary.prefix());
    prefixed.extend_from_slice(&output);
    Ok(prefixed)
}

/// Try every candidate for `input` in dispatch order
fn first_success<P: ?Sized, T>(
    set: &PrimitiveSet<P>,
    input: &[u8],
    operation: &'static str,
    mut attempt: impl FnMut(&P, &[u8]) -> Result<T>,
) -> Result<T> {
    for entry in set.candidates(input) {
        let body = &input[entry.prefix().len()..];
        match attempt(&**entry.primitive(), body) {
            Ok(value) => return Ok(value),
            Err(e) => trace!(
                key_id = entry.key_id(),
                operation,
                error = %e,
                "candidate key rejected input"
            ),
        }
    }
    Err(DispatchError::NoMatchingKey { operation }.into())
}
