//! Line normalization and scheme dispatch.

use crate::ProtocolParser;
use crate::error::{ConvertError, Result};
use crate::link;
use crate::proxy::ProxyDescriptor;
use crate::{Hysteria2, Shadowsocks, ShadowsocksR, Trojan, Tuic, VLess, VMess};
use log::debug;
use std::borrow::Cow;

/// Unwraps an optional whole-line base64 envelope.
///
/// Only lines without `://` whose length is a multiple of four and which consist of base64
/// alphabet characters are decoded. A failed decode keeps the original line.
pub fn unwrap_envelope(line: &str) -> Cow<'_, str> {
    let line = line.trim();
    if line.contains("://") || !link::looks_like_base64(line) {
        return Cow::Borrowed(line);
    }
    match link::decode_base64(line) {
        Ok(decoded) => {
            debug!("unwrapped base64 envelope ({} bytes)", decoded.len());
            Cow::Owned(decoded)
        }
        Err(err) => {
            debug!("line looked like base64 but did not decode: {}", err);
            Cow::Borrowed(line)
        }
    }
}

/// Whether `link` starts with a scheme one of the parsers accepts.
pub(crate) fn has_known_scheme(link: &str) -> bool {
    let link = link.trim();
    Shadowsocks::accepts(link)
        || ShadowsocksR::accepts(link)
        || VMess::accepts(link)
        || VLess::accepts(link)
        || Trojan::accepts(link)
        || Tuic::accepts(link)
        || Hysteria2::accepts(link)
}

/// Parses one share link, dispatching strictly on its scheme prefix.
///
/// # Errors
///
/// `UnsupportedScheme` if no parser matches, otherwise whatever the matching parser returns.
pub fn parse_link(link: &str) -> Result<ProxyDescriptor> {
    let link = link.trim();

    if Shadowsocks::accepts(link) {
        Shadowsocks::parse(link)
    } else if ShadowsocksR::accepts(link) {
        ShadowsocksR::parse(link)
    } else if VMess::accepts(link) {
        VMess::parse(link)
    } else if VLess::accepts(link) {
        VLess::parse(link)
    } else if Trojan::accepts(link) {
        Trojan::parse(link)
    } else if Tuic::accepts(link) {
        Tuic::parse(link)
    } else if Hysteria2::accepts(link) {
        Hysteria2::parse(link)
    } else {
        let scheme_name = match link.split_once("://") {
            Some((scheme, _)) => scheme,
            None => "not a share link",
        };
        Err(ConvertError::UnsupportedScheme(scheme_name.to_string()))
    }
}

/// Parses one input line into zero or more descriptors.
///
/// Blank lines and unknown schemes yield an empty vector. A base64 envelope wrapping several
/// links yields one descriptor per link.
///
/// # Errors
///
/// `MalformedLink` from the first link that fails to parse.
pub fn parse_share_link(line: &str) -> Result<Vec<ProxyDescriptor>> {
    let text = unwrap_envelope(line);
    let mut proxies = Vec::new();
    for link in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
        match parse_link(link) {
            Ok(proxy) => proxies.push(proxy),
            Err(ConvertError::UnsupportedScheme(scheme)) => {
                debug!("dropping link with unsupported scheme {}", scheme);
            }
            Err(err) => return Err(err),
        }
    }
    Ok(proxies)
}
