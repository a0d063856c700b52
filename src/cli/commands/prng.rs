//! `cryptkit prng` — random bytes, integers and UUIDs.

use crate::cli::{output, resolve_encoding, Cli};
use crate::config::Settings;
use crate::crypto::random::{random_bytes, random_int, random_uuid, PrngKind};
use crate::errors::{CryptkitError, Result};

/// Upper bound on `--size`, to keep a typo from allocating gigabytes.
const MAX_BYTES: usize = 1 << 20;

/// Execute the `prng` command.
pub fn execute(
    cli: &Cli,
    settings: &Settings,
    kind: &str,
    size: usize,
    min: i64,
    max: i64,
    encoding: Option<&str>,
) -> Result<()> {
    let value = render(settings, kind.parse()?, size, min, max, encoding)?;
    output::value("value", &value, cli.json);
    Ok(())
}

fn render(
    settings: &Settings,
    kind: PrngKind,
    size: usize,
    min: i64,
    max: i64,
    encoding: Option<&str>,
) -> Result<String> {
    match kind {
        PrngKind::Bytes => {
            let encoding = resolve_encoding(encoding, settings)?;
            if size > MAX_BYTES {
                return Err(CryptkitError::InvalidParameter(format!(
                    "size must be at most {MAX_BYTES} bytes (got {size})"
                )));
            }
            Ok(encoding.encode(&random_bytes(size)?))
        }
        PrngKind::Int => Ok(random_int(min, max)?.to_string()),
        PrngKind::Uuid => Ok(random_uuid()),
    }
}
