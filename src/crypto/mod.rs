//! Cryptographic building blocks for cryptkit.
//!
//! This module provides:
//! - scrypt password-based key derivation (`kdf`)
//! - AES-CBC file encryption with an embedded salt and IV (`cipher`)
//! - the container layout and atomic output files (`container`)
//! - Diffie-Hellman key agreement over MODP groups (`dh`, `groups`)
//! - SHA-2 digests and HMAC (`digest`)
//! - secure random bytes, integers and UUIDs (`random`)

pub mod cipher;
pub mod container;
pub mod dh;
pub mod digest;
pub mod groups;
pub mod kdf;
pub mod random;

// Re-export the most commonly used items so callers can write:
//   use crate::crypto::{encrypt, decrypt, derive_key, ...};
pub use cipher::{decrypt, decrypt_file, decrypt_stream, encrypt, encrypt_file, encrypt_stream};
pub use container::{AtomicFile, ContainerHeader, HEADER_LEN, IV_LEN, SALT_LEN};
pub use dh::{
    compute_secret, exchange, generate, DhParameters, ExchangeOutcome, ExchangeRequest,
    RestoreParams, TrustPolicy,
};
pub use digest::{hash_file, hash_stream, hmac_file, hmac_stream, HashAlgorithm};
pub use groups::DhGroup;
pub use kdf::{derive_key, generate_salt, DerivedKey, KeySize, ScryptCost};
pub use random::{random_bytes, random_int, random_uuid, PrngKind};
