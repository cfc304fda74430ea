//! Helpers shared by the scheme parsers: scheme stripping, fragment/query splitting and
//! lenient base64.
//!
//! Share links in the wild mix standard and URL-safe base64, with and without padding,
//! sometimes with embedded line breaks. [`decode_base64`] accepts all of them.

use crate::constants::error_msg;
use crate::error::{ConvertError, Result};
use base64::Engine;
use base64::alphabet;
use base64::engine::general_purpose::{self, GeneralPurpose};
use base64::engine::DecodePaddingMode;
use std::collections::HashMap;
use url::Url;

const LENIENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    general_purpose::PAD
        .with_decode_padding_mode(DecodePaddingMode::Indifferent)
        .with_decode_allow_trailing_bits(true),
);

/// Decodes standard or URL-safe base64, padded or not, ignoring whitespace.
pub(crate) fn decode_base64(input: &str) -> Result<String> {
    let normalized: String = input
        .chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| match c {
            '-' => '+',
            '_' => '/',
            other => other,
        })
        .collect();
    let bytes = LENIENT.decode(normalized.trim_end_matches('='))?;
    Ok(String::from_utf8(bytes)?)
}

/// Encodes with the standard padded alphabet.
pub(crate) fn encode_base64(input: &str) -> String {
    general_purpose::STANDARD.encode(input.as_bytes())
}

/// True if `input` is a candidate base64 envelope: non-empty, length a multiple of four
/// and only base64 alphabet characters (standard or URL-safe, `=` padding at the end).
pub(crate) fn looks_like_base64(input: &str) -> bool {
    if input.is_empty() || input.len() % 4 != 0 {
        return false;
    }
    let body = input.trim_end_matches('=');
    input.len() - body.len() <= 2
        && body
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '/' | '-' | '_'))
}

/// Strips any of `schemes` (case-insensitive) and returns the remainder.
pub(crate) fn strip_scheme<'a>(link: &'a str, schemes: &[&str]) -> Result<&'a str> {
    schemes
        .iter()
        .find(|s| has_scheme(link, s))
        .map(|s| &link[s.len()..])
        .ok_or_else(|| {
            ConvertError::malformed(format!("{} {}", error_msg::MUST_START_WITH, schemes.join(" or ")))
        })
}

/// Case-insensitive scheme prefix check.
pub(crate) fn has_scheme(link: &str, scheme: &str) -> bool {
    link.len() >= scheme.len()
        && link.is_char_boundary(scheme.len())
        && link[..scheme.len()].eq_ignore_ascii_case(scheme)
}

/// Splits off the `#fragment` and percent-decodes it. Blank fragments count as absent.
pub(crate) fn split_fragment(body: &str) -> (&str, Option<String>) {
    match body.split_once('#') {
        Some((main, frag)) => {
            let name = percent_decode(frag);
            (main, (!name.trim().is_empty()).then_some(name))
        }
        None => (body, None),
    }
}

/// Percent-decodes `input`, returning it unchanged if it is not valid UTF-8 afterwards.
pub(crate) fn percent_decode(input: &str) -> String {
    urlencoding::decode(input)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| input.to_string())
}

/// Parses an `application/x-www-form-urlencoded` query string.
pub(crate) fn query_params(query: &str) -> HashMap<String, String> {
    url::form_urlencoded::parse(query.as_bytes())
        .into_owned()
        .collect()
}

/// Query parameters of a parsed URL.
pub(crate) fn url_params(url: &Url) -> HashMap<String, String> {
    url.query_pairs().into_owned().collect()
}

/// Looks up the first non-empty value among `keys`.
pub(crate) fn param<'a>(params: &'a HashMap<String, String>, keys: &[&str]) -> Option<&'a str> {
    keys.iter()
        .filter_map(|k| params.get(*k))
        .map(|v| v.trim())
        .find(|v| !v.is_empty())
}

/// `1`, `true` and `yes` (any case) are truthy.
pub(crate) fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes"
    )
}

/// Comma-separated list with blanks removed.
pub(crate) fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Host of a URL without IPv6 brackets.
pub(crate) fn url_host(url: &Url) -> Result<String> {
    let host = url
        .host_str()
        .filter(|h| !h.is_empty())
        .ok_or_else(|| ConvertError::malformed(error_msg::MISSING_HOST))?;
    Ok(host.trim_start_matches('[').trim_end_matches(']').to_string())
}

/// Parses a port string, rejecting 0.
pub(crate) fn parse_port(port: &str) -> Result<u16> {
    let port: u16 = port.trim().trim_end_matches('/').parse()?;
    if port == 0 {
        return Err(ConvertError::malformed(format!("{}: 0", error_msg::INVALID_PORT)));
    }
    Ok(port)
}

/// Splits `host:port` on the last colon, accepting bracketed IPv6 hosts.
pub(crate) fn split_host_port(host_port: &str) -> Result<(String, u16)> {
    let (host, port) = host_port
        .rsplit_once(':')
        .ok_or_else(|| ConvertError::malformed(error_msg::MISSING_COLON_HOST_PORT))?;
    let host = host.trim_start_matches('[').trim_end_matches(']');
    if host.is_empty() {
        return Err(ConvertError::malformed(error_msg::MISSING_HOST));
    }
    Ok((host.to_string(), parse_port(port)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_base64_variants() {
        // "hello world?" in standard, url-safe, unpadded and wrapped forms
        assert_eq!(decode_base64("aGVsbG8gd29ybGQ/").unwrap(), "hello world?");
        assert_eq!(decode_base64("aGVsbG8gd29ybGQ_").unwrap(), "hello world?");
        assert_eq!(decode_base64("YWJj").unwrap(), "abc");
        assert_eq!(decode_base64("YWI").unwrap(), "ab");
        assert_eq!(decode_base64("YWI=").unwrap(), "ab");
        assert_eq!(decode_base64("YW\nI=").unwrap(), "ab");
        assert!(decode_base64("!!!").is_err());
    }

    #[test]
    fn looks_like_base64_requires_length_multiple_of_four() {
        assert!(looks_like_base64("YWJj"));
        assert!(looks_like_base64("YWI="));
        assert!(!looks_like_base64("YWI"));
        assert!(!looks_like_base64("ss://abc"));
        assert!(!looks_like_base64("a==="));
        assert!(!looks_like_base64(""));
    }

    #[test]
    fn scheme_matching_is_case_insensitive() {
        assert_eq!(strip_scheme("VLESS://x", &["vless://"]).unwrap(), "x");
        assert_eq!(strip_scheme("hy2://x", &["hysteria2://", "hy2://"]).unwrap(), "x");
        assert!(strip_scheme("trojan://x", &["vless://"]).is_err());
        assert!(!has_scheme("ss", "ss://"));
    }

    #[test]
    fn fragment_is_percent_decoded() {
        let (main, name) = split_fragment("abc#%E8%8A%82%E7%82%B9%201");
        assert_eq!(main, "abc");
        assert_eq!(name.as_deref(), Some("节点 1"));
        let (_, empty) = split_fragment("abc#");
        assert!(empty.is_none());
    }

    #[test]
    fn host_port_splitting() {
        assert_eq!(
            split_host_port("example.com:443").unwrap(),
            ("example.com".to_string(), 443)
        );
        assert_eq!(split_host_port("[::1]:8388/").unwrap(), ("::1".to_string(), 8388));
        assert!(split_host_port("example.com").is_err());
        assert!(split_host_port("example.com:0").is_err());
        assert!(split_host_port("example.com:70000").is_err());
    }

    #[test]
    fn params_and_flags() {
        let params = query_params("sni=&peer=a.com&insecure=1");
        assert_eq!(param(&params, &["sni", "peer"]), Some("a.com"));
        assert!(parse_flag("1"));
        assert!(parse_flag("TRUE"));
        assert!(!parse_flag("0"));
        assert_eq!(split_list("h2, http/1.1,"), vec!["h2", "http/1.1"]);
    }
}
