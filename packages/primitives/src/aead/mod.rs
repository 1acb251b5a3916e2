//! AEAD key managers

mod aes_gcm;
mod chacha20poly1305;

pub use self::aes_gcm::{AES_GCM_TYPE_URL, AesGcm, AesGcmKey, AesGcmKeyFormat, AesGcmKeyManager};
pub use self::chacha20poly1305::{
    CHACHA20_POLY1305_TYPE_URL, ChaCha20Poly1305, ChaCha20Poly1305Key, ChaCha20Poly1305KeyFormat,
    ChaCha20Poly1305KeyManager,
};

/// Length of the random nonce prepended to every ciphertext
pub const NONCE_SIZE: usize = 12;

/// Length of the authentication tag appended to every ciphertext
pub const TAG_SIZE: usize = 16;
