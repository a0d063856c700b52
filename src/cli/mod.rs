//! CLI module — Clap argument parser, output helpers, and command implementations.

pub mod commands;
pub mod output;

use std::io::IsTerminal;
use std::path::{Path, PathBuf};

use clap::{Args, Parser};
use zeroize::Zeroizing;

use crate::config::Settings;
use crate::crypto::KeySize;
use crate::encoding::Encoding;
use crate::errors::{CryptkitError, Result};

/// Environment variable consulted when `--password` is not given.
pub const PASSWORD_ENV: &str = "CRYPTKIT_PASSWORD";

/// cryptkit CLI: local cryptographic utilities.
#[derive(Parser)]
#[command(
    name = "cryptkit",
    about = "Local cryptographic utilities: random data, scrypt, file encryption, digests and Diffie-Hellman",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Print results as a JSON object
    #[arg(long, global = true)]
    pub json: bool,

    /// Directory containing .cryptkit.toml (default: current directory)
    #[arg(long, global = true)]
    pub config_dir: Option<String>,
}

/// All available subcommands.
#[derive(clap::Subcommand)]
pub enum Commands {
    /// Generate random bytes, an integer or a UUID
    Prng {
        /// What to generate: bytes, int or uuid
        #[arg(long = "type", value_name = "TYPE")]
        kind: String,

        /// Number of bytes (type=bytes)
        #[arg(long, default_value_t = 16)]
        size: usize,

        /// Inclusive lower bound (type=int)
        #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
        min: i64,

        /// Exclusive upper bound (type=int)
        #[arg(long, default_value_t = 100, allow_negative_numbers = true)]
        max: i64,

        /// Output encoding for bytes: hex, base64, base64url, latin1, ascii, utf8, utf16le
        #[arg(long, visible_alias = "enc")]
        encoding: Option<String>,
    },

    /// Derive a key from a password with scrypt
    Scrypt {
        /// Password (falls back to $CRYPTKIT_PASSWORD, then a prompt)
        #[arg(short, long)]
        password: Option<String>,

        /// Salt (random 16 bytes when omitted)
        #[arg(short, long)]
        salt: Option<String>,

        /// Encoding of --salt
        #[arg(long, default_value = "hex")]
        salt_encoding: String,

        /// Key size in bits: 128, 192 or 256
        #[arg(short, long)]
        key_size: Option<u32>,

        /// Output encoding
        #[arg(long, visible_alias = "enc")]
        encoding: Option<String>,
    },

    /// Encrypt a file with a password (AES-CBC, scrypt-derived key)
    Cipher(CipherArgs),

    /// Decrypt a file produced by `cipher`
    Decipher(DecipherArgs),

    /// Hash a file
    Hash {
        /// Hash algorithm (default: sha256)
        #[arg(short, long)]
        algorithm: Option<String>,

        /// Input file ("-" for stdin)
        #[arg(short, long)]
        input: String,

        /// Output encoding
        #[arg(long, visible_alias = "enc")]
        encoding: Option<String>,
    },

    /// Compute an HMAC over a file
    Hmac {
        /// Hash algorithm (default: sha256)
        #[arg(short, long)]
        algorithm: Option<String>,

        /// HMAC key (UTF-8)
        #[arg(short, long)]
        key: String,

        /// Input file ("-" for stdin)
        #[arg(short, long)]
        input: String,

        /// Output encoding
        #[arg(long, visible_alias = "enc")]
        encoding: Option<String>,
    },

    /// Generate Diffie-Hellman keys or compute a shared secret
    DiffieHellman(DhArgs),
}

/// Arguments for `cipher`.
#[derive(Args)]
pub struct CipherArgs {
    /// Plaintext input file
    #[arg(short, long)]
    pub input: String,

    /// Where to write the encrypted container
    #[arg(short, long)]
    pub output: String,

    /// Password (falls back to $CRYPTKIT_PASSWORD, then a prompt)
    #[arg(short, long)]
    pub password: Option<String>,

    /// Key size in bits: 128, 192 or 256
    #[arg(short, long)]
    pub key_size: Option<u32>,

    /// Explicit 16-byte salt (random when omitted)
    #[arg(short, long)]
    pub salt: Option<String>,

    /// Encoding of --salt
    #[arg(long, default_value = "hex")]
    pub salt_encoding: String,
}

/// Arguments for `decipher`.
#[derive(Args)]
pub struct DecipherArgs {
    /// Encrypted container
    #[arg(short, long)]
    pub input: String,

    /// Where to write the plaintext
    #[arg(short, long)]
    pub output: String,

    /// Password (falls back to $CRYPTKIT_PASSWORD, then a prompt)
    #[arg(short, long)]
    pub password: Option<String>,

    /// Key size in bits used at encryption time
    #[arg(short, long)]
    pub key_size: Option<u32>,
}

/// Arguments for `diffie-hellman`.
///
/// With no key material this generates a fresh key pair in `--group`.
/// Supplying `--public-key` (the peer's) switches to computing the shared
/// secret and then `--prime`, `--generator` and `--private-key` are
/// required as well.
#[derive(Args)]
pub struct DhArgs {
    /// Output encoding
    #[arg(long, visible_alias = "enc")]
    pub encoding: Option<String>,

    /// Named group for key generation
    #[arg(short, long)]
    pub group: Option<String>,

    /// Group prime
    #[arg(long)]
    pub prime: Option<String>,

    /// Encoding of --prime (default: --encoding)
    #[arg(long)]
    pub prime_encoding: Option<String>,

    /// Group generator
    #[arg(long)]
    pub generator: Option<String>,

    /// Encoding of --generator (default: --encoding)
    #[arg(long)]
    pub generator_encoding: Option<String>,

    /// The peer's public key
    #[arg(long)]
    pub public_key: Option<String>,

    /// Encoding of --public-key (default: --encoding)
    #[arg(long)]
    pub public_key_encoding: Option<String>,

    /// Our own private key
    #[arg(long)]
    pub private_key: Option<String>,

    /// Encoding of --private-key (default: --encoding)
    #[arg(long)]
    pub private_key_encoding: Option<String>,

    /// Only accept the primes of the built-in groups
    #[arg(long)]
    pub named_groups_only: bool,
}

// ---------------------------------------------------------------------------
// Shared helpers used by multiple commands
// ---------------------------------------------------------------------------

/// Load settings from `--config-dir` or the current directory.
pub fn load_settings(cli: &Cli) -> Result<Settings> {
    let dir = match &cli.config_dir {
        Some(dir) => PathBuf::from(dir),
        None => std::env::current_dir()?,
    };
    Settings::load(&dir)
}

/// Get the password, trying in order:
/// 1. the `--password` flag
/// 2. `CRYPTKIT_PASSWORD` env var (scripts/CI)
/// 3. an interactive prompt, if stdin is a terminal
///
/// Returns `Zeroizing<String>` so the password is wiped from memory on drop.
pub fn resolve_password(flag: Option<&str>) -> Result<Zeroizing<String>> {
    if let Some(pw) = flag {
        if pw.is_empty() {
            return Err(CryptkitError::MissingParameter("password".into()));
        }
        return Ok(Zeroizing::new(pw.to_string()));
    }

    if let Ok(pw) = std::env::var(PASSWORD_ENV) {
        if !pw.is_empty() {
            return Ok(Zeroizing::new(pw));
        }
    }

    if !std::io::stdin().is_terminal() {
        return Err(CryptkitError::MissingParameter(format!(
            "password (use --password or set {PASSWORD_ENV})"
        )));
    }

    let pw = dialoguer::Password::new()
        .with_prompt("Password")
        .interact()
        .map_err(|e| CryptkitError::MissingParameter(format!("password prompt failed: {e}")))?;
    if pw.is_empty() {
        return Err(CryptkitError::MissingParameter("password".into()));
    }
    Ok(Zeroizing::new(pw))
}

/// `--key-size` if given, otherwise the configured default.
pub fn resolve_key_size(flag: Option<u32>, settings: &Settings) -> Result<KeySize> {
    match flag {
        Some(bits) => KeySize::try_from(bits),
        None => settings.key_size(),
    }
}

/// `--encoding` if given, otherwise the configured default.
pub fn resolve_encoding(flag: Option<&str>, settings: &Settings) -> Result<Encoding> {
    match flag {
        Some(name) => name.parse(),
        None => settings.encoding(),
    }
}

/// Decode an optional encoded command-line value.
pub fn decode_optional(value: Option<&str>, encoding: Encoding) -> Result<Option<Vec<u8>>> {
    value.map(|v| encoding.decode(v)).transpose()
}

/// Interpret an `--input` argument; `-` means stdin.
pub fn input_path(arg: &str) -> Option<&Path> {
    if arg == "-" {
        None
    } else {
        Some(Path::new(arg))
    }
}
