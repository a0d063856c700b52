//! `cryptkit hash` — digest a file or stdin.

use std::io;

use crate::cli::{input_path, output, resolve_encoding, Cli};
use crate::config::Settings;
use crate::crypto::digest::{hash_file, hash_stream, HashAlgorithm};
use crate::errors::Result;

/// Execute the `hash` command.
pub fn execute(
    cli: &Cli,
    settings: &Settings,
    algorithm: Option<&str>,
    input: &str,
    encoding: Option<&str>,
) -> Result<()> {
    let algorithm = resolve_algorithm(algorithm, settings)?;
    let encoding = resolve_encoding(encoding, settings)?;

    let digest = match input_path(input) {
        Some(path) => hash_file(algorithm, path)?,
        None => hash_stream(algorithm, io::stdin().lock())?,
    };

    output::value("digest", &encoding.encode(&digest), cli.json);
    Ok(())
}

/// `--algorithm` if given, otherwise the configured default.
pub(crate) fn resolve_algorithm(flag: Option<&str>, settings: &Settings) -> Result<HashAlgorithm> {
    match flag {
        Some(name) => name.parse(),
        None => settings.hash_algorithm(),
    }
}
