//! Every registered key family driven through keyset handles

use tessera_keyset::{
    Aead, DeterministicAead, HybridDecrypt, HybridEncrypt, KeyMaterialType, KeysetHandle,
    KeysetManager, Mac, PublicKeySign, PublicKeyVerify, Registry, crypto_format,
};
use tessera_primitives::{register_all, templates};

fn registry() -> Registry {
    let registry = Registry::new();
    register_all(&registry, true).unwrap();
    registry
}

#[test]
fn register_all_is_idempotent() {
    let registry = registry();
    let before = registry.type_urls();
    register_all(&registry, true).unwrap();
    assert_eq!(registry.type_urls(), before);
    assert_eq!(before.len(), 8);
}

#[test]
fn aead_templates_round_trip_through_handles() {
    let registry = registry();
    for template in [
        templates::aes128_gcm(),
        templates::aes256_gcm(),
        templates::chacha20_poly1305(),
    ] {
        let handle = KeysetHandle::generate_new(&registry, &template.unwrap()).unwrap();
        let aead = handle.primitive::<dyn Aead>(&registry).unwrap();
        let ciphertext = aead.encrypt(b"plaintext", b"ad").unwrap();
        assert_eq!(ciphertext[0], crypto_format::TINK_START_BYTE);
        assert_eq!(aead.decrypt(&ciphertext, b"ad").unwrap(), b"plaintext");
    }
}

#[test]
fn deterministic_aead_is_stable_across_calls() {
    let registry = registry();
    let handle =
        KeysetHandle::generate_new(&registry, &templates::aes256_siv().unwrap()).unwrap();
    let daead = handle.primitive::<dyn DeterministicAead>(&registry).unwrap();
    let first = daead.encrypt_deterministically(b"pt", b"ad").unwrap();
    assert_eq!(first, daead.encrypt_deterministically(b"pt", b"ad").unwrap());
    assert_eq!(daead.decrypt_deterministically(&first, b"ad").unwrap(), b"pt");
}

#[test]
fn mac_survives_rotation() {
    let registry = registry();
    let mut manager = KeysetManager::new();
    manager
        .add(&registry, &templates::hmac_sha256_128bittag().unwrap())
        .unwrap();
    let old_mac = manager.handle().primitive::<dyn Mac>(&registry).unwrap();
    let old_tag = old_mac.compute_mac(b"data").unwrap();
    assert_eq!(old_tag.len(), crypto_format::NON_RAW_PREFIX_SIZE + 16);

    manager
        .rotate(&registry, &templates::hmac_sha512_256bittag().unwrap())
        .unwrap();
    let mac = manager.handle().primitive::<dyn Mac>(&registry).unwrap();
    mac.verify_mac(&old_tag, b"data").unwrap();
    let new_tag = mac.compute_mac(b"data").unwrap();
    assert_ne!(new_tag[..5], old_tag[..5]);
    assert!(old_mac.verify_mac(&new_tag, b"data").is_err());
}

#[test]
fn signatures_verify_with_the_public_keyset() {
    let registry = registry();
    for template in [templates::ecdsa_p256(), templates::ecdsa_p256_raw()] {
        let private = KeysetHandle::generate_new(&registry, &template.unwrap()).unwrap();
        let public = private.public_keyset_handle(&registry).unwrap();
        let signer = private.primitive::<dyn PublicKeySign>(&registry).unwrap();
        let verifier = public.primitive::<dyn PublicKeyVerify>(&registry).unwrap();

        let signature = signer.sign(b"message").unwrap();
        verifier.verify(&signature, b"message").unwrap();
        assert!(verifier.verify(&signature, b"tampered").is_err());
        assert!(public.primitive::<dyn PublicKeySign>(&registry).is_err());
    }
}

#[test]
fn hybrid_encryption_uses_the_public_keyset() {
    let registry = registry();
    let private = KeysetHandle::generate_new(
        &registry,
        &templates::ecies_p256_hkdf_aes128_gcm().unwrap(),
    )
    .unwrap();
    let public = private.public_keyset_handle(&registry).unwrap();
    assert_eq!(
        public.keyset_info().primary_key_id,
        private.keyset_info().primary_key_id
    );

    let encrypter = public.primitive::<dyn HybridEncrypt>(&registry).unwrap();
    let decrypter = private.primitive::<dyn HybridDecrypt>(&registry).unwrap();
    let ciphertext = encrypter.encrypt(b"secret", b"context").unwrap();
    assert_eq!(decrypter.decrypt(&ciphertext, b"context").unwrap(), b"secret");
    assert!(decrypter.decrypt(&ciphertext, b"wrong").is_err());
}

#[test]
fn public_keys_cannot_be_generated_through_the_registry() {
    let registry = registry();
    let mut template = templates::ecdsa_p256().unwrap();
    template.type_url = "type.tessera.dev/tessera.EcdsaPublicKey".to_string();
    assert!(registry.new_key_data(&template).is_err());

    let private = templates::ecdsa_p256().unwrap();
    let key_data = registry.new_key_data(&private).unwrap();
    assert_eq!(key_data.key_material_type, KeyMaterialType::AsymmetricPrivate);
}
