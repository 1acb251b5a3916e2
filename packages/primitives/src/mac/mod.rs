//! MAC key managers

mod hmac;

pub use self::hmac::{HMAC_TYPE_URL, HmacKey, HmacKeyFormat, HmacKeyManager, HmacMac, HmacParams};
