//! Digital signature key managers

mod ecdsa;

pub use self::ecdsa::{
    ECDSA_PRIVATE_KEY_TYPE_URL, ECDSA_PUBLIC_KEY_TYPE_URL, EcdsaKeyFormat, EcdsaParams,
    EcdsaPrivateKey, EcdsaPublicKey, EcdsaSign, EcdsaSignKeyManager, EcdsaSignatureEncoding,
    EcdsaVerify, EcdsaVerifyKeyManager,
};
