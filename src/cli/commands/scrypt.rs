//! `cryptkit scrypt` — derive a key from a password.
//!
//! Prints the salt alongside the key so a randomly salted key can be
//! reproduced later with `--salt`.

use tracing::debug;

use crate::cli::{output, resolve_encoding, resolve_key_size, resolve_password, Cli};
use crate::config::Settings;
use crate::crypto::kdf::{derive_key, generate_salt};
use crate::encoding::Encoding;
use crate::errors::{CryptkitError, Result};

/// Execute the `scrypt` command.
pub fn execute(
    cli: &Cli,
    settings: &Settings,
    password: Option<&str>,
    salt: Option<&str>,
    salt_encoding: &str,
    key_size: Option<u32>,
    encoding: Option<&str>,
) -> Result<()> {
    // Validate everything before touching the password or randomness.
    let key_size = resolve_key_size(key_size, settings)?;
    let encoding = resolve_encoding(encoding, settings)?;
    let salt_encoding: Encoding = salt_encoding.parse()?;
    let salt = match salt {
        Some(s) => {
            let decoded = salt_encoding.decode(s)?;
            if decoded.is_empty() {
                return Err(CryptkitError::InvalidParameter("salt must not be empty".into()));
            }
            Some(decoded)
        }
        None => None,
    };

    let password = resolve_password(password)?;
    let salt = match salt {
        Some(s) => s,
        None => generate_salt()?.to_vec(),
    };

    debug!(key_size = %key_size, salt_len = salt.len(), "running scrypt");
    let key = derive_key(password.as_bytes(), &salt, key_size.key_len())?;

    output::fields(
        &[
            ("salt", encoding.encode(&salt)),
            ("key", encoding.encode(key.as_bytes())),
        ],
        cli.json,
    );
    Ok(())
}
