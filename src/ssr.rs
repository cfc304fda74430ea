//! ShadowsocksR link parser
//!
//! Link format: `ssr://base64url(server:port:protocol:method:obfs:base64url(password)/?params)`
//!
//! **params** (each value is itself URL-safe base64): `obfsparam`, `protoparam`, `remarks`, `group`.
//!
//! ## Parsing rules
//!
//! 1. Prefix `ssr://` is case-insensitive; the payload may use either base64 alphabet, with or without padding.
//! 2. The decoded text is split on the first `/?` (a bare `?` is accepted too).
//! 3. Required fields are split from the right, so an IPv6 server keeps its colons.
//! 4. `remarks` supplies the name, defaulting to `server:port`.

use crate::ProtocolParser;
use crate::constants::scheme;
use crate::error::{ConvertError, Result};
use crate::link;
use crate::proxy::{ProxyDescriptor, ProxyProtocol, ShadowsocksRSettings};
use std::collections::HashMap;

/// ShadowsocksR link parser
#[derive(Debug, Clone, Copy, Default)]
pub struct ShadowsocksR;

impl ProtocolParser for ShadowsocksR {
    const SCHEMES: &'static [&'static str] = &[scheme::SHADOWSOCKSR];

    fn parse(link: &str) -> Result<ProxyDescriptor> {
        let payload = link::strip_scheme(link.trim(), Self::SCHEMES)?;
        let decoded = link::decode_base64(payload)?;
        let decoded = decoded.trim();

        let (required, query) = match decoded.split_once("/?") {
            Some((required, query)) => (required, Some(query)),
            None => match decoded.split_once('?') {
                Some((required, query)) => (required, Some(query)),
                None => (decoded.trim_end_matches('/'), None),
            },
        };

        let mut fields = required.rsplitn(6, ':');
        let mut next = |what: &str| {
            fields
                .next()
                .ok_or_else(|| ConvertError::malformed(format!("Missing {} in SSR link", what)))
        };
        let password_b64 = next("password")?;
        let obfs = next("obfs")?;
        let method = next("method")?;
        let protocol = next("protocol")?;
        let port = link::parse_port(next("port")?)?;
        let server = next("server")?.trim_start_matches('[').trim_end_matches(']');

        let password = link::decode_base64(password_b64)?;
        if method.is_empty() || password.is_empty() {
            return Err(ConvertError::malformed("Missing method or password"));
        }

        let params = query.map(link::query_params).unwrap_or_default();
        let decoded_param = |key: &str| decode_param(&params, key);

        ProxyDescriptor::new(
            decoded_param("remarks"),
            server,
            port,
            ProxyProtocol::ShadowsocksR(ShadowsocksRSettings {
                cipher: method.to_string(),
                password,
                protocol: non_empty_or(protocol, "origin"),
                protocol_param: decoded_param("protoparam"),
                obfs: non_empty_or(obfs, "plain"),
                obfs_param: decoded_param("obfsparam"),
            }),
        )
    }
}

/// Query values are base64 themselves; undecodable or blank values count as absent.
fn decode_param(params: &HashMap<String, String>, key: &str) -> Option<String> {
    link::param(params, &[key])
        .and_then(|v| link::decode_base64(v).ok())
        .filter(|v| !v.trim().is_empty())
}

fn non_empty_or(value: &str, fallback: &str) -> String {
    if value.is_empty() {
        fallback.to_string()
    } else {
        value.to_string()
    }
}
