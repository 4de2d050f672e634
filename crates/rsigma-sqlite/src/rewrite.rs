//! Backend-specific rewrite hooks.
//!
//! Before a field/value pair reaches the generic [`encode_value`], the
//! compiler offers it to each registered [`Rewrite`] in order. The first hook
//! returning a [`Comparison`] wins. A backend for another query language can
//! drop these hooks or register its own without touching the compiler.
//!
//! [`encode_value`]: crate::encode::encode_value

use std::fmt;
use std::net::IpAddr;

use ipnet::IpNet;

use crate::ast::MatchKind;
use crate::config::BackendConfig;
use crate::encode::{Comparison, Operand, Operator};
use crate::error::{ConvertError, Result};
use crate::field::{resolve_column, reverse_index_suffix, reverse_text};
use crate::value::SigmaValue;

/// A strategy that may replace the default encoding of one field/value pair.
pub trait Rewrite: fmt::Debug + Send + Sync {
    /// Short name used in log output.
    fn name(&self) -> &'static str;

    /// Return `Ok(None)` to leave the pair to the next hook or the default
    /// encoder.
    fn rewrite(
        &self,
        field: &str,
        kind: MatchKind,
        value: &SigmaValue,
        config: &BackendConfig,
    ) -> Result<Option<Comparison>>;
}

/// The hooks registered by [`SqliteBackend::new`](crate::SqliteBackend::new).
pub fn sqlite_rewrites() -> Vec<Box<dyn Rewrite>> {
    vec![Box::new(ReverseSuffix), Box::new(CidrPrefix)]
}

// =============================================================================
// Reverse-indexed suffix search
// =============================================================================

/// Turns a suffix search on a reverse-indexed field into a prefix search on
/// the reversed column: `*valueA` → `REV(field) LIKE 'Aeulav%'`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReverseSuffix;

impl Rewrite for ReverseSuffix {
    fn name(&self) -> &'static str {
        "reverse_suffix"
    }

    fn rewrite(
        &self,
        field: &str,
        kind: MatchKind,
        value: &SigmaValue,
        config: &BackendConfig,
    ) -> Result<Option<Comparison>> {
        let Some(suffix) = reverse_index_suffix(field, kind, value, config) else {
            return Ok(None);
        };
        let column = resolve_column(field, config).wrapped(&config.reverse_function);
        let pattern = format!("{}%", reverse_text(&suffix));
        Ok(Some(Comparison::new(
            column,
            Operator::Like,
            Operand::Text(pattern),
        )))
    }
}

// =============================================================================
// CIDR → LIKE prefix
// =============================================================================

/// Converts an octet-aligned IPv4 network into a LIKE prefix:
/// `192.168.0.0/16` → `field LIKE '192.168.%'`.
///
/// Prefixes that are not a multiple of 8, and IPv6 networks, would need a
/// range predicate and are rejected with `UnsupportedCidr`.
#[derive(Debug, Clone, Copy, Default)]
pub struct CidrPrefix;

impl Rewrite for CidrPrefix {
    fn name(&self) -> &'static str {
        "cidr_prefix"
    }

    fn rewrite(
        &self,
        field: &str,
        kind: MatchKind,
        value: &SigmaValue,
        config: &BackendConfig,
    ) -> Result<Option<Comparison>> {
        if kind != MatchKind::Cidr {
            return Ok(None);
        }
        let text = value.as_text().ok_or_else(|| {
            ConvertError::IncompatibleValue("null value for cidr".into())
        })?;
        let pattern = cidr_like_pattern(text.trim())?;
        Ok(Some(Comparison::new(
            resolve_column(field, config),
            Operator::Like,
            Operand::Text(pattern),
        )))
    }
}

/// Build the LIKE pattern for an octet-aligned IPv4 network.
fn cidr_like_pattern(cidr: &str) -> Result<String> {
    let net: IpNet = cidr
        .parse()
        .map_err(|_| ConvertError::MalformedCidr(cidr.to_string()))?;

    let IpAddr::V4(network) = net.network() else {
        return Err(ConvertError::UnsupportedCidr(cidr.to_string()));
    };
    let prefix = net.prefix_len();
    if prefix % 8 != 0 {
        return Err(ConvertError::UnsupportedCidr(cidr.to_string()));
    }

    let octets = network.octets();
    let kept = usize::from(prefix / 8);
    if kept == octets.len() {
        return Ok(network.to_string());
    }

    let mut pattern: String = octets[..kept]
        .iter()
        .map(|o| format!("{o}."))
        .collect();
    pattern.push('%');
    Ok(pattern)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> BackendConfig {
        BackendConfig::new("logs").with_reverse_indexed_fields(["fieldA"])
    }

    fn apply(hook: &dyn Rewrite, field: &str, kind: MatchKind, value: SigmaValue) -> Option<String> {
        hook.rewrite(field, kind, &value, &config())
            .unwrap()
            .map(|c| c.to_string())
    }

    #[test]
    fn test_reverse_suffix_rewrites_indexed_field() {
        assert_eq!(
            apply(&ReverseSuffix, "fieldA", MatchKind::Equals, "*valueA".into()),
            Some("REV(fieldA) LIKE 'Aeulav%'".to_string())
        );
    }

    #[test]
    fn test_reverse_suffix_ignores_other_fields_and_shapes() {
        assert_eq!(apply(&ReverseSuffix, "fieldB", MatchKind::Equals, "*valueB".into()), None);
        assert_eq!(apply(&ReverseSuffix, "fieldA", MatchKind::Equals, "valueA*".into()), None);
        assert_eq!(apply(&ReverseSuffix, "fieldA", MatchKind::Equals, "*val*".into()), None);
        assert_eq!(apply(&ReverseSuffix, "fieldA", MatchKind::Regex, SigmaValue::raw("*a")), None);
    }

    #[test]
    fn test_reverse_suffix_uses_configured_function_and_quoting() {
        let cfg = BackendConfig::new("logs")
            .with_reverse_indexed_fields(["file name"])
            .with_reverse_function("reverse");
        let out = ReverseSuffix
            .rewrite("file name", MatchKind::EndsWith, &".exe".into(), &cfg)
            .unwrap()
            .unwrap();
        assert_eq!(out.to_string(), "reverse(`file name`) LIKE 'exe.%'");
    }

    #[test]
    fn test_reverse_suffix_quotes_reversed_literal() {
        assert_eq!(
            apply(&ReverseSuffix, "fieldA", MatchKind::Equals, "*'s".into()),
            Some("REV(fieldA) LIKE 's''%'".to_string())
        );
    }

    #[test]
    fn test_cidr_octet_aligned() {
        assert_eq!(cidr_like_pattern("192.168.0.0/16").unwrap(), "192.168.%");
        assert_eq!(cidr_like_pattern("10.0.0.0/8").unwrap(), "10.%");
        assert_eq!(cidr_like_pattern("172.16.5.0/24").unwrap(), "172.16.5.%");
        assert_eq!(cidr_like_pattern("1.2.3.4/32").unwrap(), "1.2.3.4");
        assert_eq!(cidr_like_pattern("0.0.0.0/0").unwrap(), "%");
    }

    #[test]
    fn test_cidr_host_bits_are_masked() {
        assert_eq!(cidr_like_pattern("192.168.77.1/16").unwrap(), "192.168.%");
    }

    #[test]
    fn test_cidr_malformed() {
        for bad in ["not-a-cidr", "192.168.0.0/33", "192.168.0.0/", "300.1.1.1/8"] {
            let err = cidr_like_pattern(bad).unwrap_err();
            assert!(matches!(err, ConvertError::MalformedCidr(_)), "{bad}: {err}");
        }
    }

    #[test]
    fn test_cidr_unaligned_and_ipv6_unsupported() {
        for unsupported in ["10.0.0.0/20", "10.0.0.0/9", "fe80::/64"] {
            let err = cidr_like_pattern(unsupported).unwrap_err();
            assert!(
                matches!(err, ConvertError::UnsupportedCidr(_)),
                "{unsupported}: {err}"
            );
        }
    }

    #[test]
    fn test_cidr_hook_only_handles_cidr() {
        assert_eq!(apply(&CidrPrefix, "ip", MatchKind::Equals, "10.0.0.0/8".into()), None);
        assert_eq!(
            apply(&CidrPrefix, "ip", MatchKind::Cidr, SigmaValue::raw("10.0.0.0/8")),
            Some("ip LIKE '10.%'".to_string())
        );
    }
}
