//! Reader and writer round trips for both encodings

use tessera_keyset::{
    BinaryKeysetReader, BinaryKeysetWriter, EncryptedKeyset, JsonKeysetReader, JsonKeysetWriter,
    Key, KeyData, KeyMaterialType, KeyStatus, KeysetReader, KeysetWriter, Keyset,
    OutputPrefixType, Error, PersistenceError,
};

fn sample_keyset() -> Keyset {
    Keyset::new(
        0x0102_0304,
        vec![
            Key::new(
                KeyData::new(
                    "type.tessera.dev/Schlüssel-\u{1F511}",
                    vec![0, 1, 2, 255],
                    KeyMaterialType::Symmetric,
                ),
                KeyStatus::Enabled,
                0x0102_0304,
                OutputPrefixType::Tink,
            ),
            Key::new(
                KeyData::new(
                    "type.tessera.dev/EcdsaPrivateKey",
                    vec![9; 40],
                    KeyMaterialType::AsymmetricPrivate,
                ),
                KeyStatus::Disabled,
                u32::MAX,
                OutputPrefixType::Raw,
            ),
            Key {
                key_data: None,
                status: KeyStatus::Destroyed,
                key_id: 7,
                output_prefix_type: OutputPrefixType::Legacy,
            },
        ],
    )
}

fn sample_encrypted() -> EncryptedKeyset {
    EncryptedKeyset {
        encrypted_keyset: b"opaque ciphertext \x00\x01".to_vec(),
        keyset_info: Some(sample_keyset().info()),
    }
}

#[test]
fn binary_round_trip() {
    let mut writer = BinaryKeysetWriter::new(Vec::new());
    writer.write(&sample_keyset()).unwrap();
    let mut reader = BinaryKeysetReader::new(writer.into_inner());
    assert_eq!(reader.read().unwrap(), sample_keyset());

    let mut writer = BinaryKeysetWriter::new(Vec::new());
    writer.write_encrypted(&sample_encrypted()).unwrap();
    let mut reader = BinaryKeysetReader::new(writer.into_inner());
    assert_eq!(reader.read_encrypted().unwrap(), sample_encrypted());
}

#[test]
fn json_round_trip() {
    let mut writer = JsonKeysetWriter::new(Vec::new());
    writer.write(&sample_keyset()).unwrap();
    let text = String::from_utf8(writer.into_inner()).unwrap();
    assert!(text.contains("\"primaryKeyId\": 16909060"));
    assert!(text.contains("\"outputPrefixType\": \"TINK\""));
    let mut reader = JsonKeysetReader::new(text);
    assert_eq!(reader.read().unwrap(), sample_keyset());

    let mut writer = JsonKeysetWriter::new(Vec::new());
    writer.write_encrypted(&sample_encrypted()).unwrap();
    let text = String::from_utf8(writer.into_inner()).unwrap();
    assert!(text.contains("\"encryptedKeyset\""));
    assert!(text.contains("\"keysetInfo\""));
    let mut reader = JsonKeysetReader::new(text);
    assert_eq!(reader.read_encrypted().unwrap(), sample_encrypted());
}

#[test]
fn readers_report_missing_keysets() {
    for result in [
        BinaryKeysetReader::new(Vec::new()).read_encrypted(),
        JsonKeysetReader::new("").read_encrypted(),
    ] {
        let err = result.unwrap_err();
        assert!(matches!(
            err,
            Error::Persistence(PersistenceError::NoKeysetFound)
        ));
        assert_eq!(err.to_string(), "No keyset found");
    }
}

#[test]
fn writers_surface_io_errors() {
    struct Broken;

    impl std::io::Write for Broken {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Err(std::io::Error::other("disk full"))
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    let err = BinaryKeysetWriter::new(Broken)
        .write(&sample_keyset())
        .unwrap_err();
    assert!(matches!(err, Error::Io(_)));
}

#[test]
fn oversized_length_prefix_is_an_invalid_keyset() {
    // primary id, one key, key data present, then a type URL claiming 2^60 bytes
    let mut bytes = vec![0x01, 0x01, 0x01, 0xfd];
    bytes.extend_from_slice(&(1u64 << 60).to_le_bytes());

    let err = BinaryKeysetReader::new(bytes.clone()).read().unwrap_err();
    assert!(matches!(
        err,
        Error::Persistence(PersistenceError::InvalidKeyset(_))
    ));
    let err = BinaryKeysetReader::new(bytes).read_encrypted().unwrap_err();
    assert!(matches!(
        err,
        Error::Persistence(PersistenceError::InvalidKeyset(_))
    ));
}
