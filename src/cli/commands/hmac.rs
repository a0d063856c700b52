//! `cryptkit hmac` — keyed digest of a file or stdin.

use std::io;

use super::hash::resolve_algorithm;
use crate::cli::{input_path, output, resolve_encoding, Cli};
use crate::config::Settings;
use crate::crypto::digest::{hmac_file, hmac_stream};
use crate::errors::Result;

/// Execute the `hmac` command.
pub fn execute(
    cli: &Cli,
    settings: &Settings,
    algorithm: Option<&str>,
    key: &str,
    input: &str,
    encoding: Option<&str>,
) -> Result<()> {
    let algorithm = resolve_algorithm(algorithm, settings)?;
    let encoding = resolve_encoding(encoding, settings)?;

    let tag = match input_path(input) {
        Some(path) => hmac_file(algorithm, key.as_bytes(), path)?,
        None => hmac_stream(algorithm, key.as_bytes(), io::stdin().lock())?,
    };

    output::value("hmac", &encoding.encode(&tag), cli.json);
    Ok(())
}
