//! Output prefixes that tag ciphertexts, MACs and signatures with their key

use crate::error::{Result, ValidationError};
use crate::keyset::{Key, OutputPrefixType};

/// First byte of a TINK prefix
pub const TINK_START_BYTE: u8 = 0x01;

/// First byte of a LEGACY or CRUNCHY prefix
pub const LEGACY_START_BYTE: u8 = 0x00;

/// Length of every non-RAW prefix: start byte plus big-endian key id
pub const NON_RAW_PREFIX_SIZE: usize = 5;

/// Length of the RAW prefix
pub const RAW_PREFIX_SIZE: usize = 0;

/// The empty RAW prefix
pub const RAW_PREFIX: &[u8] = &[];

/// Prefix for outputs of `key`
pub fn output_prefix(key: &Key) -> Result<Vec<u8>> {
    prefix_for(key.output_prefix_type, key.key_id)
}

/// Prefix for outputs of a key with the given prefix type and id
pub fn prefix_for(output_prefix_type: OutputPrefixType, key_id: u32) -> Result<Vec<u8>> {
    let start = match output_prefix_type {
        OutputPrefixType::Tink => TINK_START_BYTE,
        OutputPrefixType::Legacy | OutputPrefixType::Crunchy => LEGACY_START_BYTE,
        OutputPrefixType::Raw => return Ok(RAW_PREFIX.to_vec()),
        OutputPrefixType::Unknown => return Err(ValidationError::UnknownPrefix(key_id).into()),
    };
    let mut prefix = Vec::with_capacity(NON_RAW_PREFIX_SIZE);
    prefix.push(start);
    prefix.extend_from_slice(&key_id.to_be_bytes());
    Ok(prefix)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use hex_literal::hex;
    use proptest::prelude::*;

    #[test]
    fn tink_prefix_is_start_byte_and_big_endian_id() {
        assert_eq!(
            prefix_for(OutputPrefixType::Tink, 1).unwrap(),
            hex!("0100000001")
        );
        assert_eq!(
            prefix_for(OutputPrefixType::Tink, 0xdead_beef).unwrap(),
            hex!("01deadbeef")
        );
    }

    #[test]
    fn legacy_and_crunchy_share_a_prefix() {
        let legacy = prefix_for(OutputPrefixType::Legacy, 0x0102_0304).unwrap();
        let crunchy = prefix_for(OutputPrefixType::Crunchy, 0x0102_0304).unwrap();
        assert_eq!(legacy, hex!("0001020304"));
        assert_eq!(legacy, crunchy);
    }

    #[test]
    fn raw_prefix_is_empty() {
        assert!(prefix_for(OutputPrefixType::Raw, 42).unwrap().is_empty());
    }

    #[test]
    fn unknown_prefix_is_rejected() {
        let err = prefix_for(OutputPrefixType::Unknown, 9).unwrap_err();
        assert!(matches!(
            err,
            Error::Validation(ValidationError::UnknownPrefix(9))
        ));
    }

    proptest! {
        #[test]
        fn non_raw_prefix_encodes_key_id(key_id in any::<u32>()) {
            let prefix = prefix_for(OutputPrefixType::Tink, key_id).unwrap();
            prop_assert_eq!(prefix.len(), NON_RAW_PREFIX_SIZE);
            prop_assert_eq!(prefix[0], TINK_START_BYTE);
            prop_assert_eq!(u32::from_be_bytes([prefix[1], prefix[2], prefix[3], prefix[4]]), key_id);
        }
    }
}
