//! `cryptkit cipher` — encrypt a file with a password.
//!
//! Output layout: `salt(16) ‖ iv(16) ‖ AES-CBC ciphertext`.

use std::path::Path;

use crate::cli::{
    decode_optional, output, resolve_key_size, resolve_password, CipherArgs, Cli,
};
use crate::config::Settings;
use crate::crypto::cipher::encrypt_file;
use crate::encoding::Encoding;
use crate::errors::{CryptkitError, Result};

/// Execute the `cipher` command.
pub fn execute(_cli: &Cli, settings: &Settings, args: &CipherArgs) -> Result<()> {
    // Validate everything before opening any file.
    let key_size = resolve_key_size(args.key_size, settings)?;
    let salt_encoding: Encoding = args.salt_encoding.parse()?;
    let salt = decode_optional(args.salt.as_deref(), salt_encoding)?;
    reject_same_path(&args.input, &args.output)?;

    let password = resolve_password(args.password.as_deref())?;

    let written = encrypt_file(
        Path::new(&args.input),
        Path::new(&args.output),
        password.as_bytes(),
        key_size,
        salt.as_deref(),
    )?;

    if salt.is_some() {
        output::warning("explicit salt used; reusing a salt with the same password yields the same key");
    }
    output::success(&format!(
        "Encrypted {} → {} ({written} bytes, {key_size})",
        args.input, args.output
    ));
    Ok(())
}

/// Refuse to read and replace the same file in one go.
///
/// Spellings like `./a.bin` and `a.bin`, or a symlink to the input, are
/// caught by canonicalizing once the output exists.
pub(crate) fn reject_same_path(input: &str, output: &str) -> Result<()> {
    let (input, output) = (Path::new(input), Path::new(output));
    let same = input == output
        || matches!(
            (std::fs::canonicalize(input), std::fs::canonicalize(output)),
            (Ok(a), Ok(b)) if a == b
        );
    if same {
        return Err(CryptkitError::InvalidParameter(
            "input and output must be different files".into(),
        ));
    }
    Ok(())
}
