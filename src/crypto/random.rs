//! Secure randomness: raw bytes, bounded integers and v4 UUIDs.
//!
//! Salts, IVs and Diffie-Hellman private keys all come from `OsRng`.

use std::str::FromStr;

use rand::rngs::OsRng;
use rand::{Rng, TryRngCore};

use crate::errors::{CryptkitError, Result};

/// What the `prng` command should produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrngKind {
    Bytes,
    Int,
    Uuid,
}

impl FromStr for PrngKind {
    type Err = CryptkitError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "bytes" => Ok(Self::Bytes),
            "int" => Ok(Self::Int),
            "uuid" => Ok(Self::Uuid),
            other => Err(CryptkitError::InvalidParameter(format!(
                "unknown prng type '{other}' — use bytes, int or uuid"
            ))),
        }
    }
}

/// Fill `buf` from the operating system CSPRNG.
pub fn fill_random(buf: &mut [u8]) -> Result<()> {
    OsRng
        .try_fill_bytes(buf)
        .map_err(|e| CryptkitError::ComputationFailure(format!("OS randomness unavailable: {e}")))
}

/// Return `len` cryptographically random bytes.
pub fn random_bytes(len: usize) -> Result<Vec<u8>> {
    let mut buf = vec![0u8; len];
    fill_random(&mut buf)?;
    Ok(buf)
}

/// Uniform integer in `[min, max)`.
pub fn random_int(min: i64, max: i64) -> Result<i64> {
    if min >= max {
        return Err(CryptkitError::InvalidParameter(format!(
            "min ({min}) must be less than max ({max})"
        )));
    }
    Ok(rand::rng().random_range(min..max))
}

/// A random (version 4) UUID in hyphenated form.
pub fn random_uuid() -> String {
    uuid::Uuid::new_v4().hyphenated().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn random_bytes_has_requested_length() {
        assert_eq!(random_bytes(0).unwrap().len(), 0);
        assert_eq!(random_bytes(16).unwrap().len(), 16);
        assert_eq!(random_bytes(1000).unwrap().len(), 1000);
    }

    #[test]
    fn random_bytes_differ_between_calls() {
        assert_ne!(random_bytes(32).unwrap(), random_bytes(32).unwrap());
    }

    #[test]
    fn random_int_stays_in_range() {
        for _ in 0..200 {
            let n = random_int(-3, 4).unwrap();
            assert!((-3..4).contains(&n));
        }
        assert_eq!(random_int(7, 8).unwrap(), 7);
    }

    #[test]
    fn random_int_rejects_empty_range() {
        assert!(random_int(5, 5).is_err());
        assert!(random_int(6, 5).is_err());
    }

    #[test]
    fn random_uuid_is_version_four() {
        let id = random_uuid();
        assert_eq!(id.len(), 36);
        assert_eq!(id.as_bytes()[14], b'4');
    }

    #[test]
    fn prng_kind_parses() {
        assert_eq!("uuid".parse::<PrngKind>().unwrap(), PrngKind::Uuid);
        assert!("float".parse::<PrngKind>().is_err());
    }
}
