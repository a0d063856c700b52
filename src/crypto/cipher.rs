//! Password-based AES-CBC encryption of whole files.
//!
//! `encrypt_*` derives a key with scrypt from the password and a salt,
//! generates a fresh IV, and writes `salt ‖ iv ‖ ciphertext`.
//! `decrypt_*` reads the salt and IV back out of the container, derives
//! the same key and strips the PKCS#7 padding.
//!
//! Data is processed in block-aligned chunks, so memory use does not
//! depend on the input size.  There is no authentication tag: a wrong
//! password or corrupted data is only noticed when the final padding
//! block fails to validate, and that failure is reported without any
//! detail about where it happened.

use std::fs::File;
use std::io::{BufReader, Read, Write};
use std::path::Path;

use aes::{Aes128, Aes192, Aes256};
use cbc::cipher::block_padding::Pkcs7;
use cbc::cipher::generic_array::GenericArray;
use cbc::cipher::{BlockDecryptMut, BlockEncryptMut, BlockSizeUser, KeyIvInit};
use tracing::{debug, info};
use zeroize::Zeroize;

use super::container::{read_full, AtomicFile, ContainerHeader, HEADER_LEN, IV_LEN, SALT_LEN};
use super::kdf::{derive_key, generate_salt, KeySize};
use super::random::fill_random;
use crate::errors::{CryptkitError, Result};

type Aes128CbcEnc = cbc::Encryptor<Aes128>;
type Aes192CbcEnc = cbc::Encryptor<Aes192>;
type Aes256CbcEnc = cbc::Encryptor<Aes256>;
type Aes128CbcDec = cbc::Decryptor<Aes128>;
type Aes192CbcDec = cbc::Decryptor<Aes192>;
type Aes256CbcDec = cbc::Decryptor<Aes256>;

/// Bytes read per chunk. Must be a multiple of the AES block size.
const CHUNK_LEN: usize = 64 * 1024;

// ---------------------------------------------------------------------------
// Streams
// ---------------------------------------------------------------------------

/// Encrypt everything in `input` and write the container to `output`.
///
/// Pass `Some(salt)` to use a caller-chosen 16-byte salt instead of a
/// random one.  Returns the number of container bytes written.
pub fn encrypt_stream<R: Read, W: Write>(
    mut input: R,
    mut output: W,
    password: &[u8],
    key_size: KeySize,
    explicit_salt: Option<&[u8]>,
) -> Result<u64> {
    check_password(password)?;
    let salt = parse_salt(explicit_salt)?;
    encrypt_checked(&mut input, &mut output, password, key_size, salt)
}

/// Decrypt a container from `input` and write the plaintext to `output`.
///
/// On error, whatever was already written to `output` is garbage and
/// must be thrown away.  `decrypt` and `decrypt_file` do that for you.
pub fn decrypt_stream<R: Read, W: Write>(
    mut input: R,
    mut output: W,
    password: &[u8],
    key_size: KeySize,
) -> Result<u64> {
    check_password(password)?;
    decrypt_checked(&mut input, &mut output, password, key_size)
}

// ---------------------------------------------------------------------------
// In-memory helpers
// ---------------------------------------------------------------------------

/// Encrypt a byte slice into a new container.
pub fn encrypt(
    plaintext: &[u8],
    password: &[u8],
    key_size: KeySize,
    explicit_salt: Option<&[u8]>,
) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(HEADER_LEN + plaintext.len() + IV_LEN);
    encrypt_stream(plaintext, &mut out, password, key_size, explicit_salt)?;
    Ok(out)
}

/// Decrypt a container held in memory.
///
/// Never returns partial plaintext: on failure the buffer is wiped.
pub fn decrypt(container: &[u8], password: &[u8], key_size: KeySize) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(container.len());
    match decrypt_stream(container, &mut out, password, key_size) {
        Ok(_) => Ok(out),
        Err(e) => {
            out.zeroize();
            Err(e)
        }
    }
}

// ---------------------------------------------------------------------------
// Files
// ---------------------------------------------------------------------------

/// Encrypt the file at `input` into a container at `output`.
///
/// Parameters are validated before either file is touched.  The output
/// only appears once fully written (temp file + rename).
pub fn encrypt_file(
    input: &Path,
    output: &Path,
    password: &[u8],
    key_size: KeySize,
    explicit_salt: Option<&[u8]>,
) -> Result<u64> {
    check_password(password)?;
    let salt = parse_salt(explicit_salt)?;

    let mut reader = BufReader::new(File::open(input).map_err(CryptkitError::at(input))?);
    let mut out = AtomicFile::create(output)?;
    let written = encrypt_checked(&mut reader, &mut out, password, key_size, salt)?;
    out.commit()?;

    info!(
        input = %input.display(),
        output = %output.display(),
        cipher = %key_size,
        bytes = written,
        "encrypted file"
    );
    Ok(written)
}

/// Decrypt the container at `input` into `output`.
///
/// If decryption fails, no output file is created and an existing file
/// at `output` is left untouched.
pub fn decrypt_file(
    input: &Path,
    output: &Path,
    password: &[u8],
    key_size: KeySize,
) -> Result<u64> {
    check_password(password)?;

    let mut reader = BufReader::new(File::open(input).map_err(CryptkitError::at(input))?);
    let mut out = AtomicFile::create(output)?;
    let written = decrypt_checked(&mut reader, &mut out, password, key_size)?;
    out.commit()?;

    info!(
        input = %input.display(),
        output = %output.display(),
        cipher = %key_size,
        bytes = written,
        "decrypted file"
    );
    Ok(written)
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn check_password(password: &[u8]) -> Result<()> {
    if password.is_empty() {
        return Err(CryptkitError::MissingParameter("password".into()));
    }
    Ok(())
}

fn parse_salt(explicit_salt: Option<&[u8]>) -> Result<Option<[u8; SALT_LEN]>> {
    match explicit_salt {
        None => Ok(None),
        Some(bytes) => {
            let salt: [u8; SALT_LEN] = bytes.try_into().map_err(|_| {
                CryptkitError::InvalidParameter(format!(
                    "salt must be exactly {SALT_LEN} bytes (got {})",
                    bytes.len()
                ))
            })?;
            Ok(Some(salt))
        }
    }
}

// ---------------------------------------------------------------------------
// Internals
// ---------------------------------------------------------------------------

fn encrypt_checked<R: Read, W: Write>(
    input: &mut R,
    output: &mut W,
    password: &[u8],
    key_size: KeySize,
    salt: Option<[u8; SALT_LEN]>,
) -> Result<u64> {
    let salt = match salt {
        Some(s) => s,
        None => generate_salt()?,
    };
    let mut iv = [0u8; IV_LEN];
    fill_random(&mut iv)?;

    seal_with_header(input, output, password, key_size, &ContainerHeader { salt, iv })
}

/// Encrypt with a fully specified header. Randomness is the caller's job.
fn seal_with_header<R: Read, W: Write>(
    input: &mut R,
    output: &mut W,
    password: &[u8],
    key_size: KeySize,
    header: &ContainerHeader,
) -> Result<u64> {
    let key = derive_key(password, &header.salt, key_size.key_len())?;
    let key = key.as_bytes();

    header.write_to(output)?;
    let body = match key_size {
        KeySize::Aes128 => seal_blocks(new_cipher::<Aes128CbcEnc>(key, &header.iv)?, input, output)?,
        KeySize::Aes192 => seal_blocks(new_cipher::<Aes192CbcEnc>(key, &header.iv)?, input, output)?,
        KeySize::Aes256 => seal_blocks(new_cipher::<Aes256CbcEnc>(key, &header.iv)?, input, output)?,
    };
    output.flush()?;

    debug!(cipher = %key_size, ciphertext_len = body, "sealed container");
    Ok(HEADER_LEN as u64 + body)
}

fn decrypt_checked<R: Read, W: Write>(
    input: &mut R,
    output: &mut W,
    password: &[u8],
    key_size: KeySize,
) -> Result<u64> {
    let header = ContainerHeader::read_from(input)?;
    let key = derive_key(password, &header.salt, key_size.key_len())?;
    let key = key.as_bytes();

    let written = match key_size {
        KeySize::Aes128 => open_blocks(new_cipher::<Aes128CbcDec>(key, &header.iv)?, input, output)?,
        KeySize::Aes192 => open_blocks(new_cipher::<Aes192CbcDec>(key, &header.iv)?, input, output)?,
        KeySize::Aes256 => open_blocks(new_cipher::<Aes256CbcDec>(key, &header.iv)?, input, output)?,
    };
    output.flush()?;

    debug!(cipher = %key_size, plaintext_len = written, "opened container");
    Ok(written)
}

fn new_cipher<C: KeyIvInit>(key: &[u8], iv: &[u8]) -> Result<C> {
    C::new_from_slices(key, iv)
        .map_err(|_| CryptkitError::ComputationFailure("cipher rejected key or iv length".into()))
}

/// CBC-encrypt a stream, padding the final block with PKCS#7.
fn seal_blocks<C, R, W>(mut cipher: C, input: &mut R, output: &mut W) -> Result<u64>
where
    C: BlockEncryptMut,
    R: Read,
    W: Write,
{
    let block_len = <C as BlockSizeUser>::block_size();
    let mut buf = vec![0u8; CHUNK_LEN];
    let mut pending = 0;
    let mut written = 0u64;

    loop {
        let n = read_full(input, &mut buf[pending..])?;
        if n == 0 {
            break;
        }
        pending += n;

        // Encrypt every complete block; a partial tail waits for more data.
        let whole = pending - pending % block_len;
        for block in buf[..whole].chunks_exact_mut(block_len) {
            cipher.encrypt_block_mut(GenericArray::from_mut_slice(block));
        }
        output.write_all(&buf[..whole])?;
        written += whole as u64;

        buf.copy_within(whole..pending, 0);
        pending -= whole;
    }

    // The tail is always shorter than a block, so padding fits in one.
    // An empty tail still yields a full block of padding.
    let mut last = vec![0u8; block_len];
    last[..pending].copy_from_slice(&buf[..pending]);
    buf.zeroize();

    let tail = cipher
        .encrypt_padded_mut::<Pkcs7>(&mut last, pending)
        .map_err(|_| CryptkitError::ComputationFailure("PKCS#7 padding failed".into()))?;
    output.write_all(tail)?;
    written += tail.len() as u64;
    last.zeroize();

    Ok(written)
}

/// CBC-decrypt a stream, holding back the final block for the padding check.
fn open_blocks<C, R, W>(mut cipher: C, input: &mut R, output: &mut W) -> Result<u64>
where
    C: BlockDecryptMut,
    R: Read,
    W: Write,
{
    let block_len = <C as BlockSizeUser>::block_size();
    let mut buf = vec![0u8; CHUNK_LEN];
    let mut pending = 0;
    let mut written = 0u64;

    loop {
        let n = read_full(input, &mut buf[pending..])?;
        if n == 0 {
            break;
        }
        pending += n;

        let whole = pending - pending % block_len;
        // The last complete block may be the padded one; keep it back.
        let ready = if whole == pending {
            whole.saturating_sub(block_len)
        } else {
            whole
        };
        for block in buf[..ready].chunks_exact_mut(block_len) {
            cipher.decrypt_block_mut(GenericArray::from_mut_slice(block));
        }
        output.write_all(&buf[..ready])?;
        written += ready as u64;

        buf.copy_within(ready..pending, 0);
        pending -= ready;
    }

    // Anything but exactly one held-back block means the ciphertext
    // length is wrong; report it the same way as a bad padding byte.
    if pending != block_len {
        buf.zeroize();
        return Err(CryptkitError::IntegrityFailure);
    }

    let result = match cipher.decrypt_padded_mut::<Pkcs7>(&mut buf[..block_len]) {
        Ok(plain) => {
            output.write_all(plain)?;
            Ok(written + plain.len() as u64)
        }
        Err(_) => Err(CryptkitError::IntegrityFailure),
    };
    buf.zeroize();
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixed_header() -> ContainerHeader {
        let mut salt = [0u8; SALT_LEN];
        let mut iv = [0u8; IV_LEN];
        for i in 0..SALT_LEN {
            salt[i] = i as u8;
            iv[i] = (i + 16) as u8;
        }
        ContainerHeader { salt, iv }
    }

    fn seal_fixed(plaintext: &[u8], password: &[u8], key_size: KeySize) -> Vec<u8> {
        let mut out = Vec::new();
        seal_with_header(
            &mut &plaintext[..],
            &mut out,
            password,
            key_size,
            &fixed_header(),
        )
        .unwrap();
        out
    }

    // Reference containers produced by an independent scrypt + AES-CBC
    // implementation for salt 00..0f, iv 10..1f, password "p@ss".
    const HELLO_128: &str = "000102030405060708090a0b0c0d0e0f101112131415161718191a1b1c1d1e1f0e09abb6e669caceef756256eb9d8d22";
    const HELLO_192: &str = "000102030405060708090a0b0c0d0e0f101112131415161718191a1b1c1d1e1fccc00a9245b85c16cd200806abc9aa08";
    const HELLO_256: &str = "000102030405060708090a0b0c0d0e0f101112131415161718191a1b1c1d1e1f0fa7cbae1c2c674c4d4da11ecbffbac3";

    #[test]
    fn sealing_matches_reference_containers() {
        let cases = [
            (KeySize::Aes128, HELLO_128),
            (KeySize::Aes192, HELLO_192),
            (KeySize::Aes256, HELLO_256),
        ];
        for (key_size, expected) in cases {
            let container = seal_fixed(b"hello world", b"p@ss", key_size);
            assert_eq!(hex::encode(&container), expected, "{key_size}");
        }
    }

    #[test]
    fn reference_containers_open_with_right_password() {
        for (key_size, hex_container) in [
            (KeySize::Aes128, HELLO_128),
            (KeySize::Aes192, HELLO_192),
            (KeySize::Aes256, HELLO_256),
        ] {
            let container = hex::decode(hex_container).unwrap();
            let plain = decrypt(&container, b"p@ss", key_size).unwrap();
            assert_eq!(plain, b"hello world");
        }
    }

    #[test]
    fn reference_containers_reject_wrong_password() {
        for (key_size, hex_container) in [
            (KeySize::Aes128, HELLO_128),
            (KeySize::Aes192, HELLO_192),
            (KeySize::Aes256, HELLO_256),
        ] {
            let container = hex::decode(hex_container).unwrap();
            let err = decrypt(&container, b"wrong", key_size).unwrap_err();
            assert!(matches!(err, CryptkitError::IntegrityFailure));
        }
    }

    #[test]
    fn empty_plaintext_is_one_padding_block() {
        let container = seal_fixed(b"", b"p@ss", KeySize::Aes256);
        assert_eq!(container.len(), HEADER_LEN + 16);
        assert_eq!(
            hex::encode(&container[HEADER_LEN..]),
            "20219c33fcf55c56a1280cfa43641eb3"
        );
    }

    #[test]
    fn block_aligned_plaintext_gets_extra_block() {
        let container = seal_fixed(&[0x41; 32], b"p@ss", KeySize::Aes128);
        assert_eq!(container.len(), HEADER_LEN + 48);
    }

    #[test]
    fn multi_chunk_stream_roundtrip() {
        let plaintext: Vec<u8> = (0..(CHUNK_LEN * 2 + 7)).map(|i| (i % 251) as u8).collect();
        let container = seal_fixed(&plaintext, b"pw", KeySize::Aes192);
        assert_eq!(container.len(), HEADER_LEN + plaintext.len() + (16 - plaintext.len() % 16));

        let recovered = decrypt(&container, b"pw", KeySize::Aes192).unwrap();
        assert_eq!(recovered, plaintext);
    }

    #[test]
    fn ciphertext_not_block_aligned_is_integrity_failure() {
        let mut container = hex::decode(HELLO_256).unwrap();
        container.push(0);
        let err = decrypt(&container, b"p@ss", KeySize::Aes256).unwrap_err();
        assert!(matches!(err, CryptkitError::IntegrityFailure));
    }

    #[test]
    fn header_only_container_is_integrity_failure() {
        let container = hex::decode(HELLO_256).unwrap();
        let err = decrypt(&container[..HEADER_LEN], b"p@ss", KeySize::Aes256).unwrap_err();
        assert!(matches!(err, CryptkitError::IntegrityFailure));
    }

    #[test]
    fn empty_password_is_missing_parameter() {
        let err = encrypt(b"data", b"", KeySize::Aes256, None).unwrap_err();
        assert!(matches!(err, CryptkitError::MissingParameter(_)));
        let err = decrypt(&[0u8; 48], b"", KeySize::Aes256).unwrap_err();
        assert!(matches!(err, CryptkitError::MissingParameter(_)));
    }

    #[test]
    fn wrong_salt_length_is_invalid_parameter() {
        let err = encrypt(b"data", b"pw", KeySize::Aes256, Some(&[0u8; 8])).unwrap_err();
        assert!(matches!(err, CryptkitError::InvalidParameter(_)));
    }

    #[test]
    fn explicit_salt_lands_at_offset_zero() {
        let salt = [0x5au8; SALT_LEN];
        let container = encrypt(b"data", b"pw", KeySize::Aes128, Some(&salt)).unwrap();
        assert_eq!(&container[..SALT_LEN], &salt);
    }
}
