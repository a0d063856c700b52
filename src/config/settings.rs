use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::crypto::{DhGroup, HashAlgorithm, KeySize, TrustPolicy};
use crate::encoding::Encoding;
use crate::errors::{CryptkitError, Result};

/// Per-directory defaults, loaded from `.cryptkit.toml`.
///
/// Every field has a sensible default so cryptkit works out-of-the-box
/// without any config file at all.  Command-line flags always win over
/// these values.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// AES key size in bits when `--key-size` is not given (default: 256).
    #[serde(default = "default_key_size")]
    pub default_key_size: u32,

    /// Output encoding when `--encoding` is not given (default: hex).
    #[serde(default = "default_encoding")]
    pub default_encoding: String,

    /// Diffie-Hellman group when `--group` is not given (default: modp14).
    #[serde(default = "default_dh_group")]
    pub default_dh_group: String,

    /// Hash algorithm for `hash` / `hmac` (default: sha256).
    #[serde(default = "default_hash")]
    pub default_hash: String,

    /// Reject caller-supplied Diffie-Hellman primes that are not one of
    /// the built-in groups (default: false).
    #[serde(default)]
    pub dh_named_groups_only: bool,
}

// ── Serde default helpers ────────────────────────────────────────────

fn default_key_size() -> u32 {
    256
}

fn default_encoding() -> String {
    "hex".to_string()
}

fn default_dh_group() -> String {
    "modp14".to_string()
}

fn default_hash() -> String {
    "sha256".to_string()
}

// ── Implementation ───────────────────────────────────────────────────

impl Default for Settings {
    fn default() -> Self {
        Self {
            default_key_size: default_key_size(),
            default_encoding: default_encoding(),
            default_dh_group: default_dh_group(),
            default_hash: default_hash(),
            dh_named_groups_only: false,
        }
    }
}

impl Settings {
    /// Name of the config file we look for.
    pub const FILE_NAME: &'static str = ".cryptkit.toml";

    /// Load settings from `<dir>/.cryptkit.toml`.
    ///
    /// If the file does not exist, defaults are returned.  If it exists
    /// but cannot be parsed or holds unsupported values, an error is
    /// returned.
    pub fn load(dir: &Path) -> Result<Self> {
        let config_path = dir.join(Self::FILE_NAME);

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let contents =
            std::fs::read_to_string(&config_path).map_err(CryptkitError::at(&config_path))?;

        let settings: Settings = toml::from_str(&contents).map_err(|e| {
            CryptkitError::InvalidParameter(format!(
                "failed to parse {}: {e}",
                config_path.display()
            ))
        })?;

        settings.validate().map_err(|e| {
            CryptkitError::InvalidParameter(format!("{}: {e}", config_path.display()))
        })?;

        Ok(settings)
    }

    /// Check that every default names something we support.
    pub fn validate(&self) -> Result<()> {
        self.key_size()?;
        self.encoding()?;
        self.dh_group()?;
        self.hash_algorithm()?;
        Ok(())
    }

    pub fn key_size(&self) -> Result<KeySize> {
        KeySize::try_from(self.default_key_size)
    }

    pub fn encoding(&self) -> Result<Encoding> {
        self.default_encoding.parse()
    }

    pub fn dh_group(&self) -> Result<DhGroup> {
        self.default_dh_group.parse()
    }

    pub fn hash_algorithm(&self) -> Result<HashAlgorithm> {
        self.default_hash.parse()
    }

    pub fn trust_policy(&self) -> TrustPolicy {
        if self.dh_named_groups_only {
            TrustPolicy::NamedGroupsOnly
        } else {
            TrustPolicy::AnyPrime
        }
    }
}

// ── Tests ────────────────────────────────────────────────────────────
