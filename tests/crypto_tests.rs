//! Integration tests for the cryptkit key derivation and cipher pipeline.

use std::fs;

use cryptkit::crypto::{
    decrypt, decrypt_file, decrypt_stream, derive_key, encrypt, encrypt_file, encrypt_stream,
    KeySize, HEADER_LEN, IV_LEN, SALT_LEN,
};
use cryptkit::errors::{CryptkitError, ErrorKind};
use proptest::prelude::*;
use tempfile::TempDir;

const ALL_SIZES: [KeySize; 3] = [KeySize::Aes128, KeySize::Aes192, KeySize::Aes256];

// ---------------------------------------------------------------------------
// Key derivation (scrypt)
// ---------------------------------------------------------------------------

#[test]
fn derive_key_same_inputs_same_output() {
    let salt = [0x42u8; SALT_LEN];

    let key1 = derive_key(b"my-secure-passphrase", &salt, 32).expect("derive 1");
    let key2 = derive_key(b"my-secure-passphrase", &salt, 32).expect("derive 2");

    assert_eq!(key1.as_bytes(), key2.as_bytes());
}

#[test]
fn derive_key_matches_reference_scrypt() {
    // scrypt(N=16384, r=8, p=1) of "p@ss" with salt 00..0f.
    let salt: Vec<u8> = (0u8..16).collect();
    let key = derive_key(b"p@ss", &salt, 32).expect("derive");
    assert_eq!(
        hex::encode(key.as_bytes()),
        "5a080d4d2e357c318d829b2acd45157b24c99761a5818bdde0a653992d2792a9"
    );
}

#[test]
fn derive_key_different_salts_different_keys() {
    let key1 = derive_key(b"same-password", &[1u8; SALT_LEN], 16).expect("derive 1");
    let key2 = derive_key(b"same-password", &[2u8; SALT_LEN], 16).expect("derive 2");
    assert_ne!(key1.as_bytes(), key2.as_bytes());
}

#[test]
fn derive_key_different_passwords_different_keys() {
    let salt = [3u8; SALT_LEN];
    let key1 = derive_key(b"password-one", &salt, 24).expect("derive 1");
    let key2 = derive_key(b"password-two", &salt, 24).expect("derive 2");
    assert_ne!(key1.as_bytes(), key2.as_bytes());
}

#[test]
fn derive_key_rejects_non_aes_lengths() {
    for len in [0, 8, 20, 64] {
        let err = derive_key(b"pw", &[0u8; SALT_LEN], len).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidParameter, "len {len}");
    }
}

// ---------------------------------------------------------------------------
// Encryption round-trip
// ---------------------------------------------------------------------------

#[test]
fn encrypt_decrypt_roundtrip_every_key_size() {
    let plaintext = b"DATABASE_URL=postgres://localhost/mydb";

    for key_size in ALL_SIZES {
        let container = encrypt(plaintext, b"hunter2", key_size, None).expect("encrypt");
        let recovered = decrypt(&container, b"hunter2", key_size).expect("decrypt");
        assert_eq!(recovered, plaintext, "{key_size}");
    }
}

#[test]
fn hello_world_container_is_48_bytes() {
    let container = encrypt(b"hello world", b"p@ss", KeySize::Aes256, None).expect("encrypt");
    assert_eq!(container.len(), SALT_LEN + IV_LEN + 16);
    assert_eq!(container.len(), 48);

    let recovered = decrypt(&container, b"p@ss", KeySize::Aes256).expect("decrypt");
    assert_eq!(recovered, b"hello world");
}

#[test]
fn empty_plaintext_roundtrip() {
    let container = encrypt(b"", b"pw", KeySize::Aes128, None).expect("encrypt");
    assert_eq!(container.len(), HEADER_LEN + 16);
    assert!(decrypt(&container, b"pw", KeySize::Aes128).unwrap().is_empty());
}

#[test]
fn encrypt_produces_different_containers_each_time() {
    let ct1 = encrypt(b"SECRET=hello", b"pw", KeySize::Aes256, None).expect("encrypt 1");
    let ct2 = encrypt(b"SECRET=hello", b"pw", KeySize::Aes256, None).expect("encrypt 2");

    assert_ne!(&ct1[..SALT_LEN], &ct2[..SALT_LEN], "salts must differ");
    assert_ne!(&ct1[SALT_LEN..HEADER_LEN], &ct2[SALT_LEN..HEADER_LEN], "ivs must differ");
    assert_ne!(&ct1[HEADER_LEN..], &ct2[HEADER_LEN..], "ciphertexts must differ");
}

#[test]
fn explicit_salt_still_gets_fresh_iv() {
    let salt = [9u8; SALT_LEN];
    let ct1 = encrypt(b"same", b"pw", KeySize::Aes128, Some(&salt)).expect("encrypt 1");
    let ct2 = encrypt(b"same", b"pw", KeySize::Aes128, Some(&salt)).expect("encrypt 2");

    assert_eq!(&ct1[..SALT_LEN], &ct2[..SALT_LEN]);
    assert_ne!(&ct1[SALT_LEN..HEADER_LEN], &ct2[SALT_LEN..HEADER_LEN]);
}

#[test]
fn decrypt_with_wrong_password_never_returns_plaintext() {
    let plaintext = b"TOP_SECRET=42";
    let container = encrypt(plaintext, b"correct", KeySize::Aes256, None).expect("encrypt");

    // Without an authentication tag a wrong key yields valid padding by
    // chance about once in 256 tries; it must still never be our plaintext.
    match decrypt(&container, b"wrong", KeySize::Aes256) {
        Err(e) => assert_eq!(e.kind(), ErrorKind::IntegrityFailure),
        Ok(garbage) => assert_ne!(garbage, plaintext),
    }
}

#[test]
fn decrypt_reference_container_with_wrong_password_fails() {
    // "hello world" under "p@ss", salt 00..0f, iv 10..1f, aes-256-cbc.
    let container = hex::decode(
        "000102030405060708090a0b0c0d0e0f101112131415161718191a1b1c1d1e1f0fa7cbae1c2c674c4d4da11ecbffbac3",
    )
    .unwrap();
    assert_eq!(
        decrypt(&container, b"p@ss", KeySize::Aes256).unwrap(),
        b"hello world"
    );

    let err = decrypt(&container, b"wrong", KeySize::Aes256).unwrap_err();
    assert!(matches!(err, CryptkitError::IntegrityFailure));
    assert!(err.to_string().contains("wrong password or corrupted data"));
}

#[test]
fn decrypt_with_truncated_data_fails() {
    let err = decrypt(&[0u8; 5], b"pw", KeySize::Aes256).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::IntegrityFailure);
}

#[test]
fn missing_password_fails_before_anything_else() {
    let err = encrypt(b"data", b"", KeySize::Aes256, Some(&[0u8; 3])).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MissingParameter);
}

// ---------------------------------------------------------------------------
// Streams
// ---------------------------------------------------------------------------

#[test]
fn stream_roundtrip_larger_than_one_chunk() {
    let plaintext: Vec<u8> = (0..200_003u32).map(|i| (i * 7 % 256) as u8).collect();

    let mut container = Vec::new();
    let written = encrypt_stream(&plaintext[..], &mut container, b"pw", KeySize::Aes256, None)
        .expect("encrypt");
    assert_eq!(written as usize, container.len());
    assert_eq!(container.len() % 16, 0);

    let mut recovered = Vec::new();
    let n = decrypt_stream(&container[..], &mut recovered, b"pw", KeySize::Aes256).expect("decrypt");
    assert_eq!(n as usize, plaintext.len());
    assert_eq!(recovered, plaintext);
}

// ---------------------------------------------------------------------------
// Files
// ---------------------------------------------------------------------------

#[test]
fn file_roundtrip() {
    let dir = TempDir::new().unwrap();
    let plain = dir.path().join("plain.txt");
    let sealed = dir.path().join("plain.txt.enc");
    let opened = dir.path().join("plain.out");
    fs::write(&plain, b"file contents\nsecond line\n").unwrap();

    encrypt_file(&plain, &sealed, b"pw", KeySize::Aes192, None).expect("encrypt");
    decrypt_file(&sealed, &opened, b"pw", KeySize::Aes192).expect("decrypt");

    assert_eq!(fs::read(&opened).unwrap(), fs::read(&plain).unwrap());
}

#[test]
fn failed_decrypt_leaves_no_output() {
    let dir = TempDir::new().unwrap();
    let sealed = dir.path().join("bad.enc");
    let opened = dir.path().join("bad.out");
    // Header plus a ciphertext that is not a whole number of blocks.
    fs::write(&sealed, [0u8; HEADER_LEN + 17]).unwrap();

    let err = decrypt_file(&sealed, &opened, b"pw", KeySize::Aes256).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::IntegrityFailure);
    assert!(!opened.exists());

    let leftovers: Vec<_> = fs::read_dir(dir.path()).unwrap().collect();
    assert_eq!(leftovers.len(), 1, "only the input file should remain");
}

#[test]
fn failed_decrypt_keeps_existing_output() {
    let dir = TempDir::new().unwrap();
    let sealed = dir.path().join("bad.enc");
    let opened = dir.path().join("keep.txt");
    fs::write(&sealed, [0u8; HEADER_LEN]).unwrap();
    fs::write(&opened, b"precious").unwrap();

    assert!(decrypt_file(&sealed, &opened, b"pw", KeySize::Aes256).is_err());
    assert_eq!(fs::read(&opened).unwrap(), b"precious");
}

#[test]
fn missing_input_file_names_the_path() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("nope.txt");
    let out = dir.path().join("out.enc");

    let err = encrypt_file(&missing, &out, b"pw", KeySize::Aes256, None).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::IoFailure);
    assert!(err.to_string().contains("nope.txt"));
    assert!(!out.exists());
}

#[test]
fn validation_happens_before_file_access() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("nope.txt");
    let out = dir.path().join("out.enc");

    // The input does not exist, but the empty password is reported first.
    let err = encrypt_file(&missing, &out, b"", KeySize::Aes256, None).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MissingParameter);

    let err = encrypt_file(&missing, &out, b"pw", KeySize::Aes256, Some(&[1, 2, 3])).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidParameter);
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

proptest! {
    // Each case runs scrypt twice, so keep the case count small.
    #![proptest_config(ProptestConfig::with_cases(12))]

    #[test]
    fn roundtrip_any_plaintext(
        plaintext in proptest::collection::vec(any::<u8>(), 0..300),
        password in "[ -~]{1,24}",
        size_idx in 0usize..3,
    ) {
        let key_size = ALL_SIZES[size_idx];
        let container = encrypt(&plaintext, password.as_bytes(), key_size, None).unwrap();
        prop_assert_eq!(container.len(), HEADER_LEN + (plaintext.len() / 16 + 1) * 16);

        let recovered = decrypt(&container, password.as_bytes(), key_size).unwrap();
        prop_assert_eq!(recovered, plaintext);
    }
}
