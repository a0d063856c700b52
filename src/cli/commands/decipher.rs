//! `cryptkit decipher` — decrypt a file produced by `cipher`.

use std::path::Path;

use super::cipher::reject_same_path;
use crate::cli::{output, resolve_key_size, resolve_password, Cli, DecipherArgs};
use crate::config::Settings;
use crate::crypto::cipher::decrypt_file;
use crate::errors::Result;

/// Execute the `decipher` command.
pub fn execute(_cli: &Cli, settings: &Settings, args: &DecipherArgs) -> Result<()> {
    let key_size = resolve_key_size(args.key_size, settings)?;
    reject_same_path(&args.input, &args.output)?;

    let password = resolve_password(args.password.as_deref())?;

    let written = decrypt_file(
        Path::new(&args.input),
        Path::new(&args.output),
        password.as_bytes(),
        key_size,
    )?;

    output::success(&format!(
        "Decrypted {} → {} ({written} bytes)",
        args.input, args.output
    ));
    Ok(())
}
