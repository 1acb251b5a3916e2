//! Deterministic AEAD key managers

mod aes_siv;

pub use aes_siv::{AES_SIV_TYPE_URL, AesSiv, AesSivKey, AesSivKeyFormat, AesSivKeyManager};
