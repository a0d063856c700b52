//! `cryptkit diffie-hellman` — key generation and shared secrets.
//!
//! Without key material a fresh key pair is generated in the chosen
//! group.  With `--public-key` (the peer's), `--prime`, `--generator`
//! and `--private-key` our key pair is rebuilt and the shared secret is
//! printed as well.

use num_bigint::BigUint;

use crate::cli::{decode_optional, output, resolve_encoding, Cli, DhArgs};
use crate::config::Settings;
use crate::crypto::dh::{exchange, ExchangeRequest, TrustPolicy};
use crate::crypto::DhGroup;
use crate::encoding::Encoding;
use crate::errors::Result;

/// Execute the `diffie-hellman` command.
pub fn execute(cli: &Cli, settings: &Settings, args: &DhArgs) -> Result<()> {
    let encoding = resolve_encoding(args.encoding.as_deref(), settings)?;
    let request = build_request(settings, args, encoding)?;
    let policy = if args.named_groups_only {
        TrustPolicy::NamedGroupsOnly
    } else {
        settings.trust_policy()
    };

    let outcome = exchange(&request, policy)?;

    if matches!(request, ExchangeRequest::Restore(_))
        && policy == TrustPolicy::AnyPrime
        && DhGroup::from_prime(&BigUint::from_bytes_be(&outcome.prime)).is_none()
    {
        output::warning("custom prime supplied; its primality was not verified");
    }

    let mut items = vec![
        ("prime", encoding.encode(&outcome.prime)),
        ("generator", encoding.encode(&outcome.generator)),
        ("public_key", encoding.encode(&outcome.public_key)),
        ("private_key", encoding.encode(&outcome.private_key)),
    ];
    if let Some(secret) = &outcome.shared_secret {
        items.push(("secret", encoding.encode(secret)));
    }
    output::fields(&items, cli.json);
    Ok(())
}

/// Decode the flags into a request; each value uses its own encoding
/// flag, falling back to `--encoding`.
fn build_request(settings: &Settings, args: &DhArgs, encoding: Encoding) -> Result<ExchangeRequest> {
    let group: DhGroup = match &args.group {
        Some(name) => name.parse()?,
        None => settings.dh_group()?,
    };
    let enc = |flag: &Option<String>| -> Result<Encoding> {
        match flag {
            Some(name) => name.parse(),
            None => Ok(encoding),
        }
    };

    ExchangeRequest::from_parts(
        group,
        decode_optional(args.prime.as_deref(), enc(&args.prime_encoding)?)?,
        decode_optional(args.generator.as_deref(), enc(&args.generator_encoding)?)?,
        decode_optional(args.private_key.as_deref(), enc(&args.private_key_encoding)?)?,
        decode_optional(args.public_key.as_deref(), enc(&args.public_key_encoding)?)?,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn empty_args() -> DhArgs {
        DhArgs {
            encoding: None,
            group: None,
            prime: None,
            prime_encoding: None,
            generator: None,
            generator_encoding: None,
            public_key: None,
            public_key_encoding: None,
            private_key: None,
            private_key_encoding: None,
            named_groups_only: false,
        }
    }

    #[test]
    fn no_key_material_means_generate_in_default_group() {
        let req = build_request(&Settings::default(), &empty_args(), Encoding::Hex).unwrap();
        assert!(matches!(req, ExchangeRequest::Generate { group: DhGroup::Modp14 }));
    }

    #[test]
    fn per_field_encodings_are_honoured() {
        let args = DhArgs {
            prime: Some("17".into()),
            prime_encoding: Some("hex".into()),
            generator: Some("BQ==".into()),
            generator_encoding: Some("base64".into()),
            private_key: Some("06".into()),
            public_key: Some("13".into()),
            ..empty_args()
        };
        let req = build_request(&Settings::default(), &args, Encoding::Hex).unwrap();
        match req {
            ExchangeRequest::Restore(p) => {
                assert_eq!(p.prime, vec![0x17]);
                assert_eq!(p.generator, vec![5]);
                assert_eq!(p.private_key, vec![6]);
                assert_eq!(p.peer_public_key, vec![0x13]);
            }
            other => panic!("expected restore, got {other:?}"),
        }
    }

    #[test]
    fn public_key_alone_is_missing_parameter() {
        let args = DhArgs {
            public_key: Some("13".into()),
            ..empty_args()
        };
        let err = build_request(&Settings::default(), &args, Encoding::Hex).unwrap_err();
        assert_eq!(err.kind(), crate::errors::ErrorKind::MissingParameter);
    }
}
