//! Password-based key derivation using scrypt.
//!
//! scrypt is memory-hard: every derivation touches `128 * N * r` bytes
//! (16 MiB with the parameters below), which makes large-scale password
//! guessing expensive on GPUs and ASICs.  The cost parameters are fixed
//! at compile time so that a container written today can always be
//! opened with the same key tomorrow.

use std::fmt;

use tracing::debug;
use zeroize::{Zeroize, ZeroizeOnDrop};

use super::container::SALT_LEN;
use super::random::fill_random;
use crate::errors::{CryptkitError, Result};

/// scrypt cost parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScryptCost {
    /// log2 of the CPU/memory cost `N`.
    pub log_n: u8,
    /// Block size `r`.
    pub r: u32,
    /// Parallelism `p`.
    pub p: u32,
}

impl ScryptCost {
    /// N = 16384, r = 8, p = 1: interactive-safe, and the same cost other
    /// scrypt tooling uses by default, so derived keys interoperate.
    pub const INTERACTIVE: Self = Self {
        log_n: 14,
        r: 8,
        p: 1,
    };
}

/// AES key sizes supported by the cipher engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeySize {
    Aes128,
    Aes192,
    Aes256,
}

impl KeySize {
    /// Key size in bits (128, 192 or 256).
    pub fn bits(self) -> u32 {
        match self {
            Self::Aes128 => 128,
            Self::Aes192 => 192,
            Self::Aes256 => 256,
        }
    }

    /// Key length in bytes (16, 24 or 32).
    pub fn key_len(self) -> usize {
        self.bits() as usize / 8
    }

    /// Map a byte length back to a key size.
    pub fn from_key_len(len: usize) -> Result<Self> {
        match len {
            16 => Ok(Self::Aes128),
            24 => Ok(Self::Aes192),
            32 => Ok(Self::Aes256),
            other => Err(CryptkitError::InvalidParameter(format!(
                "key length must be 16, 24 or 32 bytes (got {other})"
            ))),
        }
    }
}

impl TryFrom<u32> for KeySize {
    type Error = CryptkitError;

    fn try_from(bits: u32) -> Result<Self> {
        match bits {
            128 => Ok(Self::Aes128),
            192 => Ok(Self::Aes192),
            256 => Ok(Self::Aes256),
            other => Err(CryptkitError::InvalidParameter(format!(
                "key size must be 128, 192 or 256 bits (got {other})"
            ))),
        }
    }
}

impl fmt::Display for KeySize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "aes-{}-cbc", self.bits())
    }
}

/// A derived symmetric key that wipes its memory when dropped.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct DerivedKey {
    bytes: Vec<u8>,
}

impl DerivedKey {
    /// Access the raw key bytes (e.g. to build a cipher).
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl fmt::Debug for DerivedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DerivedKey([REDACTED; {}])", self.bytes.len())
    }
}

/// Derive a `key_len`-byte key from a password and salt.
///
/// The same password + salt + length always produce the same key.
/// `key_len` must be an AES key length (16, 24 or 32).
pub fn derive_key(password: &[u8], salt: &[u8], key_len: usize) -> Result<DerivedKey> {
    let key_size = KeySize::from_key_len(key_len)?;
    derive_key_with_cost(password, salt, key_size, ScryptCost::INTERACTIVE)
}

/// Derive a key with explicit scrypt cost parameters.
///
/// Only tests and benchmarks should need anything other than
/// `ScryptCost::INTERACTIVE`.
pub fn derive_key_with_cost(
    password: &[u8],
    salt: &[u8],
    key_size: KeySize,
    cost: ScryptCost,
) -> Result<DerivedKey> {
    let params = scrypt::Params::new(cost.log_n, cost.r, cost.p, key_size.key_len())
        .map_err(|e| CryptkitError::ComputationFailure(format!("invalid scrypt params: {e}")))?;

    debug!(
        log_n = cost.log_n,
        r = cost.r,
        p = cost.p,
        key_len = key_size.key_len(),
        "deriving key with scrypt"
    );

    let mut bytes = vec![0u8; key_size.key_len()];
    if let Err(e) = scrypt::scrypt(password, salt, &params, &mut bytes) {
        bytes.zeroize();
        return Err(CryptkitError::ComputationFailure(format!(
            "scrypt derivation failed: {e}"
        )));
    }

    Ok(DerivedKey { bytes })
}

/// Generate a cryptographically random 16-byte salt.
pub fn generate_salt() -> Result<[u8; SALT_LEN]> {
    let mut salt = [0u8; SALT_LEN];
    fill_random(&mut salt)?;
    Ok(salt)
}
