//! Message digests and HMAC over streams.
//!
//! SHA-2 is the default family; SHA-1, MD5 and SHA-3 are there for
//! interoperability with existing checksums and signatures.

use std::fmt;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use std::str::FromStr;

use hmac::digest::KeyInit;
use hmac::{Hmac, Mac};
use md5::Md5;
use sha1::Sha1;
use sha2::{Digest, Sha224, Sha256, Sha384, Sha512, Sha512_224, Sha512_256};
use sha3::{Sha3_224, Sha3_256, Sha3_384, Sha3_512};

use super::container::read_full;
use crate::errors::{CryptkitError, Result};

const READ_BUF_LEN: usize = 64 * 1024;

/// Supported hash algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HashAlgorithm {
    Sha224,
    Sha256,
    Sha384,
    Sha512,
    Sha512_224,
    Sha512_256,
    Sha3_224,
    Sha3_256,
    Sha3_384,
    Sha3_512,
    Sha1,
    Md5,
}

impl HashAlgorithm {
    pub fn name(self) -> &'static str {
        match self {
            Self::Sha224 => "sha224",
            Self::Sha256 => "sha256",
            Self::Sha384 => "sha384",
            Self::Sha512 => "sha512",
            Self::Sha512_224 => "sha512-224",
            Self::Sha512_256 => "sha512-256",
            Self::Sha3_224 => "sha3-224",
            Self::Sha3_256 => "sha3-256",
            Self::Sha3_384 => "sha3-384",
            Self::Sha3_512 => "sha3-512",
            Self::Sha1 => "sha1",
            Self::Md5 => "md5",
        }
    }

    /// Digest length in bytes.
    pub fn output_len(self) -> usize {
        match self {
            Self::Md5 => 16,
            Self::Sha1 => 20,
            Self::Sha224 | Self::Sha512_224 | Self::Sha3_224 => 28,
            Self::Sha256 | Self::Sha512_256 | Self::Sha3_256 => 32,
            Self::Sha384 | Self::Sha3_384 => 48,
            Self::Sha512 | Self::Sha3_512 => 64,
        }
    }
}

impl FromStr for HashAlgorithm {
    type Err = CryptkitError;

    fn from_str(s: &str) -> Result<Self> {
        // Accept "sha256", "SHA-256", "sha512/256", "sha3-256" and friends.
        let normalized: String = s
            .to_ascii_lowercase()
            .chars()
            .filter(|c| *c != '-')
            .map(|c| if c == '/' { '_' } else { c })
            .collect();
        match normalized.as_str() {
            "sha224" => Ok(Self::Sha224),
            "sha256" => Ok(Self::Sha256),
            "sha384" => Ok(Self::Sha384),
            "sha512" => Ok(Self::Sha512),
            "sha512224" | "sha512_224" => Ok(Self::Sha512_224),
            "sha512256" | "sha512_256" => Ok(Self::Sha512_256),
            "sha3224" | "sha3_224" => Ok(Self::Sha3_224),
            "sha3256" | "sha3_256" => Ok(Self::Sha3_256),
            "sha3384" | "sha3_384" => Ok(Self::Sha3_384),
            "sha3512" | "sha3_512" => Ok(Self::Sha3_512),
            "sha1" => Ok(Self::Sha1),
            "md5" => Ok(Self::Md5),
            _ => Err(CryptkitError::InvalidParameter(format!(
                "unsupported hash algorithm '{s}' — supported: sha224, sha256, sha384, sha512, sha512-224, sha512-256, sha3-224, sha3-256, sha3-384, sha3-512, sha1, md5"
            ))),
        }
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Hash everything readable from `input`.
pub fn hash_stream<R: Read>(algorithm: HashAlgorithm, mut input: R) -> Result<Vec<u8>> {
    match algorithm {
        HashAlgorithm::Sha224 => digest_with::<Sha224, _>(&mut input),
        HashAlgorithm::Sha256 => digest_with::<Sha256, _>(&mut input),
        HashAlgorithm::Sha384 => digest_with::<Sha384, _>(&mut input),
        HashAlgorithm::Sha512 => digest_with::<Sha512, _>(&mut input),
        HashAlgorithm::Sha512_224 => digest_with::<Sha512_224, _>(&mut input),
        HashAlgorithm::Sha512_256 => digest_with::<Sha512_256, _>(&mut input),
        HashAlgorithm::Sha3_224 => digest_with::<Sha3_224, _>(&mut input),
        HashAlgorithm::Sha3_256 => digest_with::<Sha3_256, _>(&mut input),
        HashAlgorithm::Sha3_384 => digest_with::<Sha3_384, _>(&mut input),
        HashAlgorithm::Sha3_512 => digest_with::<Sha3_512, _>(&mut input),
        HashAlgorithm::Sha1 => digest_with::<Sha1, _>(&mut input),
        HashAlgorithm::Md5 => digest_with::<Md5, _>(&mut input),
    }
}

/// HMAC everything readable from `input` under `key`.
pub fn hmac_stream<R: Read>(algorithm: HashAlgorithm, key: &[u8], mut input: R) -> Result<Vec<u8>> {
    match algorithm {
        HashAlgorithm::Sha224 => mac_with::<Hmac<Sha224>, _>(key, &mut input),
        HashAlgorithm::Sha256 => mac_with::<Hmac<Sha256>, _>(key, &mut input),
        HashAlgorithm::Sha384 => mac_with::<Hmac<Sha384>, _>(key, &mut input),
        HashAlgorithm::Sha512 => mac_with::<Hmac<Sha512>, _>(key, &mut input),
        HashAlgorithm::Sha512_224 => mac_with::<Hmac<Sha512_224>, _>(key, &mut input),
        HashAlgorithm::Sha512_256 => mac_with::<Hmac<Sha512_256>, _>(key, &mut input),
        HashAlgorithm::Sha3_224 => mac_with::<Hmac<Sha3_224>, _>(key, &mut input),
        HashAlgorithm::Sha3_256 => mac_with::<Hmac<Sha3_256>, _>(key, &mut input),
        HashAlgorithm::Sha3_384 => mac_with::<Hmac<Sha3_384>, _>(key, &mut input),
        HashAlgorithm::Sha3_512 => mac_with::<Hmac<Sha3_512>, _>(key, &mut input),
        HashAlgorithm::Sha1 => mac_with::<Hmac<Sha1>, _>(key, &mut input),
        HashAlgorithm::Md5 => mac_with::<Hmac<Md5>, _>(key, &mut input),
    }
}

/// Hash a file; I/O errors name the file.
pub fn hash_file(algorithm: HashAlgorithm, path: &Path) -> Result<Vec<u8>> {
    let file = File::open(path).map_err(CryptkitError::at(path))?;
    hash_stream(algorithm, BufReader::new(file)).map_err(|e| attach_path(e, path))
}

/// HMAC a file; I/O errors name the file.
pub fn hmac_file(algorithm: HashAlgorithm, key: &[u8], path: &Path) -> Result<Vec<u8>> {
    let file = File::open(path).map_err(CryptkitError::at(path))?;
    hmac_stream(algorithm, key, BufReader::new(file)).map_err(|e| attach_path(e, path))
}

// Only reads happen here, so an unlabeled I/O error belongs to `path`.
fn attach_path(err: CryptkitError, path: &Path) -> CryptkitError {
    match err {
        CryptkitError::Io(source) => CryptkitError::IoFailure {
            path: path.to_path_buf(),
            source,
        },
        other => other,
    }
}

fn digest_with<D: Digest, R: Read>(input: &mut R) -> Result<Vec<u8>> {
    let mut hasher = D::new();
    let mut buf = vec![0u8; READ_BUF_LEN];
    loop {
        let n = read_full(input, &mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(hasher.finalize().to_vec())
}

fn mac_with<M: Mac + KeyInit, R: Read>(key: &[u8], input: &mut R) -> Result<Vec<u8>> {
    let mut mac = <M as Mac>::new_from_slice(key)
        .map_err(|e| CryptkitError::ComputationFailure(format!("HMAC init failed: {e}")))?;
    let mut buf = vec![0u8; READ_BUF_LEN];
    loop {
        let n = read_full(input, &mut buf)?;
        if n == 0 {
            break;
        }
        mac.update(&buf[..n]);
    }
    Ok(mac.finalize().into_bytes().to_vec())
}
