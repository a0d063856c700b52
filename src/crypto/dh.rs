//! Finite-field Diffie-Hellman key agreement.
//!
//! Two request shapes are supported:
//!
//! - `Generate`: pick a named MODP group, draw a private key and compute
//!   `public = g^private mod p`.
//! - `Restore`: rebuild our key pair from an explicit `(p, g, private)`
//!   and combine it with the peer's public key into the shared secret
//!   `peer^private mod p`.
//!
//! A caller-supplied prime is checked for structure only (odd, `> 2`,
//! generator in range) and is **not** tested for primality.  Callers who
//! cannot vouch for their parameters should use
//! `TrustPolicy::NamedGroupsOnly`, which only accepts the built-in groups.

use num_bigint::BigUint;
use tracing::debug;
use zeroize::{Zeroize, ZeroizeOnDrop};

use super::groups::DhGroup;
use super::random::random_bytes;
use crate::errors::{CryptkitError, Result};

/// How much to trust caller-supplied group parameters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TrustPolicy {
    /// Accept any structurally valid `(p, g)`.
    #[default]
    AnyPrime,
    /// Only accept the primes (and generator) of the built-in groups.
    NamedGroupsOnly,
}

/// A validated `(prime, generator)` pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DhParameters {
    prime: BigUint,
    generator: BigUint,
}

impl DhParameters {
    /// Parameters of a named group.
    pub fn from_group(group: DhGroup) -> Self {
        Self {
            prime: group.prime(),
            generator: group.generator(),
        }
    }

    /// Validate an explicit `(prime, generator)` pair.
    pub fn new(prime: BigUint, generator: BigUint) -> Result<Self> {
        let two = BigUint::from(2u32);
        if prime <= two {
            return Err(CryptkitError::InvalidParameter(
                "Diffie-Hellman prime must be greater than 2".into(),
            ));
        }
        if !prime.bit(0) {
            return Err(CryptkitError::InvalidParameter(
                "Diffie-Hellman prime must be odd".into(),
            ));
        }
        if generator < two || generator >= prime {
            return Err(CryptkitError::InvalidParameter(
                "Diffie-Hellman generator must be at least 2 and less than the prime".into(),
            ));
        }
        Ok(Self { prime, generator })
    }

    /// Validate big-endian encoded parameters.
    pub fn from_bytes_be(prime: &[u8], generator: &[u8]) -> Result<Self> {
        Self::new(
            BigUint::from_bytes_be(prime),
            BigUint::from_bytes_be(generator),
        )
    }

    pub fn prime(&self) -> &BigUint {
        &self.prime
    }

    pub fn generator(&self) -> &BigUint {
        &self.generator
    }

    /// Byte length of the prime; shared secrets are padded to this.
    pub fn modulus_len(&self) -> usize {
        ((self.prime.bits() + 7) / 8) as usize
    }

    fn check_policy(&self, policy: TrustPolicy) -> Result<()> {
        match policy {
            TrustPolicy::AnyPrime => Ok(()),
            TrustPolicy::NamedGroupsOnly => match DhGroup::from_prime(&self.prime) {
                Some(group) if group.generator() == self.generator => Ok(()),
                _ => Err(CryptkitError::InvalidParameter(
                    "prime and generator do not match any built-in group".into(),
                )),
            },
        }
    }

    /// `g^private mod p`.
    fn public_key_for(&self, private_key: &BigUint) -> BigUint {
        self.generator.modpow(private_key, &self.prime)
    }
}

/// Explicit parameters for recomputing a shared secret.
///
/// All four fields are big-endian unsigned integers.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct RestoreParams {
    pub prime: Vec<u8>,
    pub generator: Vec<u8>,
    pub private_key: Vec<u8>,
    pub peer_public_key: Vec<u8>,
}

impl std::fmt::Debug for RestoreParams {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RestoreParams")
            .field("prime_len", &self.prime.len())
            .field("generator", &self.generator)
            .field("private_key", &"[REDACTED]")
            .field("peer_public_key_len", &self.peer_public_key.len())
            .finish()
    }
}

/// What the caller wants from a key exchange.
#[derive(Debug, Clone)]
pub enum ExchangeRequest {
    /// Fresh key pair in a named group.
    Generate { group: DhGroup },
    /// Rebuild a key pair and compute the shared secret.
    Restore(RestoreParams),
}

impl ExchangeRequest {
    /// Build a request from optional inputs.
    ///
    /// No explicit field → `Generate { group }`.  All four explicit fields
    /// → `Restore`.  Anything in between is rejected with
    /// `MissingParameter` listing what is absent; nothing is computed.
    pub fn from_parts(
        group: DhGroup,
        prime: Option<Vec<u8>>,
        generator: Option<Vec<u8>>,
        private_key: Option<Vec<u8>>,
        peer_public_key: Option<Vec<u8>>,
    ) -> Result<Self> {
        let present = |v: &Option<Vec<u8>>| v.as_ref().is_some_and(|b| !b.is_empty());
        let fields = [
            ("prime", present(&prime)),
            ("generator", present(&generator)),
            ("private key", present(&private_key)),
            ("public key", present(&peer_public_key)),
        ];

        if fields.iter().all(|(_, p)| !p) {
            return Ok(Self::Generate { group });
        }

        let missing: Vec<&str> = fields
            .iter()
            .filter(|(_, p)| !p)
            .map(|(name, _)| *name)
            .collect();
        if !missing.is_empty() {
            return Err(CryptkitError::MissingParameter(format!(
                "restoring a Diffie-Hellman exchange needs prime, generator, private key and public key together (missing: {})",
                missing.join(", ")
            )));
        }

        Ok(Self::Restore(RestoreParams {
            prime: prime.unwrap_or_default(),
            generator: generator.unwrap_or_default(),
            private_key: private_key.unwrap_or_default(),
            peer_public_key: peer_public_key.unwrap_or_default(),
        }))
    }
}

/// Result of a key exchange step, all values big-endian.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct ExchangeOutcome {
    pub prime: Vec<u8>,
    pub generator: Vec<u8>,
    /// Our own public key.
    pub public_key: Vec<u8>,
    pub private_key: Vec<u8>,
    /// Only present for `Restore` requests. Padded to the prime's length.
    pub shared_secret: Option<Vec<u8>>,
}

impl std::fmt::Debug for ExchangeOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExchangeOutcome")
            .field("prime_len", &self.prime.len())
            .field("generator", &self.generator)
            .field("public_key_len", &self.public_key.len())
            .field("private_key", &"[REDACTED]")
            .field("has_shared_secret", &self.shared_secret.is_some())
            .finish()
    }
}

/// Run either kind of exchange request.
pub fn exchange(request: &ExchangeRequest, policy: TrustPolicy) -> Result<ExchangeOutcome> {
    match request {
        ExchangeRequest::Generate { group } => generate(*group),
        ExchangeRequest::Restore(params) => compute_secret(params, policy),
    }
}

/// Generate a fresh key pair in a named group.
pub fn generate(group: DhGroup) -> Result<ExchangeOutcome> {
    let params = DhParameters::from_group(group);
    let private_key = random_private_key(params.prime())?;
    let public_key = params.public_key_for(&private_key);

    debug!(group = %group, bits = params.prime().bits(), "generated Diffie-Hellman key pair");

    Ok(ExchangeOutcome {
        prime: params.prime().to_bytes_be(),
        generator: params.generator().to_bytes_be(),
        public_key: public_key.to_bytes_be(),
        private_key: private_key.to_bytes_be(),
        shared_secret: None,
    })
}

/// Rebuild our key pair from explicit parameters and derive the shared secret.
pub fn compute_secret(params: &RestoreParams, policy: TrustPolicy) -> Result<ExchangeOutcome> {
    let group = DhParameters::from_bytes_be(&params.prime, &params.generator)?;
    group.check_policy(policy)?;

    let private_key = BigUint::from_bytes_be(&params.private_key);
    if private_key == BigUint::ZERO {
        return Err(CryptkitError::InvalidParameter(
            "Diffie-Hellman private key must not be zero".into(),
        ));
    }

    let peer = BigUint::from_bytes_be(&params.peer_public_key);
    let upper = group.prime() - 2u32;
    if peer < BigUint::from(2u32) || peer > upper {
        return Err(CryptkitError::InvalidParameter(
            "peer public key must be between 2 and prime - 2".into(),
        ));
    }

    let public_key = group.public_key_for(&private_key);
    let secret = peer.modpow(&private_key, group.prime());

    debug!(bits = group.prime().bits(), "computed Diffie-Hellman shared secret");

    Ok(ExchangeOutcome {
        prime: group.prime().to_bytes_be(),
        generator: group.generator().to_bytes_be(),
        public_key: public_key.to_bytes_be(),
        private_key: private_key.to_bytes_be(),
        shared_secret: Some(left_pad(secret.to_bytes_be(), group.modulus_len())),
    })
}

/// Uniform private key in `[2, p - 2]` by rejection sampling.
fn random_private_key(prime: &BigUint) -> Result<BigUint> {
    let two = BigUint::from(2u32);
    if *prime < BigUint::from(5u32) {
        return Err(CryptkitError::InvalidParameter(
            "prime too small to draw a private key from".into(),
        ));
    }
    let upper = prime - 2u32;
    let bits = prime.bits() as usize;
    let len = (bits + 7) / 8;
    let top_mask = 0xffu8 >> (len * 8 - bits);

    loop {
        let mut bytes = random_bytes(len)?;
        bytes[0] &= top_mask;
        let candidate = BigUint::from_bytes_be(&bytes);
        bytes.zeroize();
        if candidate >= two && candidate <= upper {
            return Ok(candidate);
        }
    }
}

fn left_pad(bytes: Vec<u8>, len: usize) -> Vec<u8> {
    if bytes.len() >= len {
        return bytes;
    }
    let mut padded = vec![0u8; len - bytes.len()];
    padded.extend_from_slice(&bytes);
    padded
}
