//! Binary codec shared by keysets and key-manager records
//!
//! Records are encoded with bincode's standard configuration: integers as
//! varints, sequences and byte strings length-prefixed. Decoding rejects
//! trailing bytes so a record has exactly one encoding, and refuses any
//! length prefix that would claim more than [`MAX_ENCODED_LEN`] bytes.

use crate::{Error, Result};
use bincode::config::{self, Configuration, Limit, LittleEndian, Varint};
use serde::{Serialize, de::DeserializeOwned};

/// Upper bound on the bytes one decoded record may claim
pub const MAX_ENCODED_LEN: usize = 1 << 24;

type Config = Configuration<LittleEndian, Varint, Limit<MAX_ENCODED_LEN>>;

fn config() -> Config {
    config::standard().with_limit::<MAX_ENCODED_LEN>()
}

/// Encode a record to its canonical binary form
pub fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    bincode::serde::encode_to_vec(value, config()).map_err(|e| Error::Serialization(e.to_string()))
}

/// Decode a record from its canonical binary form
pub fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    let (value, consumed) =
        bincode::serde::decode_from_slice::<T, _>(bytes, config())
            .map_err(|e| Error::Serialization(e.to_string()))?;
    if consumed != bytes.len() {
        return Err(Error::Serialization(format!(
            "{} trailing bytes after record",
            bytes.len() - consumed
        )));
    }
    Ok(value)
}

/// Serde adapter for byte fields: base64 text for human-readable formats,
/// raw bytes otherwise
pub mod bytes {
    use base64::{Engine, engine::general_purpose::STANDARD};
    use serde::{Deserialize, Deserializer, Serializer, de::Error as _};

    /// Serialize a byte field
    pub fn serialize<S: Serializer>(value: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        if serializer.is_human_readable() {
            serializer.serialize_str(&STANDARD.encode(value))
        } else {
            serializer.serialize_bytes(value)
        }
    }

    /// Deserialize a byte field
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        if deserializer.is_human_readable() {
            let text = String::deserialize(deserializer)?;
            STANDARD.decode(text.as_bytes()).map_err(D::Error::custom)
        } else {
            Vec::<u8>::deserialize(deserializer)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Record {
        id: u32,
        #[serde(with = "super::bytes")]
        value: Vec<u8>,
    }

    #[test]
    fn trailing_bytes_are_rejected() {
        let mut encoded = encode(&Record {
            id: 7,
            value: vec![1, 2, 3],
        })
        .unwrap();
        encoded.push(0);
        assert!(matches!(
            decode::<Record>(&encoded),
            Err(Error::Serialization(_))
        ));
    }

    #[test]
    fn oversized_length_prefixes_are_rejected() {
        // id = 7, then a byte string claiming 2^60 bytes
        let mut encoded = vec![7u8, 0xfd];
        encoded.extend_from_slice(&(1u64 << 60).to_le_bytes());
        assert!(matches!(
            decode::<Record>(&encoded),
            Err(Error::Serialization(_))
        ));
    }

    #[test]
    fn byte_fields_are_base64_in_json() {
        let record = Record {
            id: 1,
            value: b"key".to_vec(),
        };
        let json = serde_json::to_string(&record).unwrap();
        assert_eq!(json, r#"{"id":1,"value":"a2V5"}"#);
        assert_eq!(serde_json::from_str::<Record>(&json).unwrap(), record);
    }
}
