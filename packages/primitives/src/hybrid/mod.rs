//! Hybrid encryption key managers

mod ecies;

pub use self::ecies::{
    ECIES_PRIVATE_KEY_TYPE_URL, ECIES_PUBLIC_KEY_TYPE_URL, EciesHkdfHybridDecrypt,
    EciesHkdfHybridEncrypt, EciesHkdfPrivateKeyManager, EciesHkdfPublicKeyManager, EciesKeyFormat,
    EciesParams, EciesPrivateKey, EciesPublicKey,
};
