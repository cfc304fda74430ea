//! Shadowsocks link parser (SIP002 and legacy)
//!
//! Link formats:
//!
//! | Form | Shape |
//! |------|-------|
//! | **SIP002** | `ss://base64(method:password)@hostname:port[/][?plugin=...][#tag]` |
//! | **SIP002, plain userinfo** | `ss://method:password@hostname:port[#tag]` |
//! | **Legacy** | `ss://base64(method:password@hostname:port)[#tag]` |
//!
//! **plugin**: Optional SIP003 plugin, `name;opt=value;...`, URL-encoded.
//!
//! **tag**: Fragment used as the proxy name; falls back to `hostname:port`.
//!
//! ## Parsing rules
//!
//! 1. Prefix `ss://` is case-insensitive.
//! 2. The fragment is split off by `#`, the query by `?`.
//! 3. The remaining authority is resolved by two strategies tried in order: a standard
//!    URL parse, then manual splitting (on the first `@` for SIP002, or base64-decoding
//!    the whole authority for the legacy form).
//! 4. `method`, `password`, `hostname` and `port` must all be non-empty.

use crate::ProtocolParser;
use crate::constants::{error_msg, scheme};
use crate::error::{ConvertError, Result};
use crate::link;
use crate::proxy::{ProxyDescriptor, ProxyProtocol, ShadowsocksPlugin, ShadowsocksSettings};
use url::Url;

/// Shadowsocks link parser
#[derive(Debug, Clone, Copy, Default)]
pub struct Shadowsocks;

/// Credentials and endpoint resolved from the authority part of an `ss://` link
#[derive(Debug, Clone, PartialEq, Eq)]
struct SsCredentials {
    method: String,
    password: String,
    server: String,
    port: u16,
}

impl SsCredentials {
    fn validate(self) -> Result<Self> {
        if self.method.is_empty() || self.password.is_empty() {
            return Err(ConvertError::malformed("Missing method or password"));
        }
        if self.server.is_empty() {
            return Err(ConvertError::malformed(error_msg::MISSING_HOST));
        }
        Ok(self)
    }
}

impl ProtocolParser for Shadowsocks {
    const SCHEMES: &'static [&'static str] = &[scheme::SHADOWSOCKS];

    fn parse(link: &str) -> Result<ProxyDescriptor> {
        let link_body = link::strip_scheme(link.trim(), Self::SCHEMES)?;
        let (main_part, name) = link::split_fragment(link_body);

        let (authority, plugin) = match main_part.split_once('?') {
            Some((authority, query)) => {
                let params = link::query_params(query);
                let plugin = link::param(&params, &["plugin"]).and_then(ShadowsocksPlugin::parse);
                (authority, plugin)
            }
            None => (main_part, None),
        };
        let authority = authority.trim_end_matches('/');

        let creds = Shadowsocks::resolve(authority)?;

        ProxyDescriptor::new(
            name,
            creds.server,
            creds.port,
            ProxyProtocol::Shadowsocks(ShadowsocksSettings {
                cipher: creds.method,
                password: creds.password,
                plugin,
            }),
        )
    }
}

impl Shadowsocks {
    /// Tries the URL strategy first and falls back to manual splitting.
    fn resolve(authority: &str) -> Result<SsCredentials> {
        Shadowsocks::resolve_with_url(authority)
            .and_then(SsCredentials::validate)
            .or_else(|url_err| {
                Shadowsocks::resolve_manually(authority)
                    .and_then(SsCredentials::validate)
                    .map_err(|manual_err| {
                        ConvertError::malformed(format!(
                            "Shadowsocks link not understood ({}; {})",
                            url_err, manual_err
                        ))
                    })
            })
    }

    /// `userinfo@host:port` through the `url` crate.
    fn resolve_with_url(authority: &str) -> Result<SsCredentials> {
        let url = Url::parse(&format!("{}{}", scheme::SHADOWSOCKS, authority))?;
        if url.username().is_empty() {
            return Err(ConvertError::malformed(error_msg::MISSING_AT));
        }
        let server = link::url_host(&url)?;
        let port = url
            .port()
            .ok_or_else(|| ConvertError::malformed(error_msg::INVALID_PORT))?;
        let (method, password) = match url.password() {
            Some(password) => (
                link::percent_decode(url.username()),
                link::percent_decode(password),
            ),
            None => decode_userinfo(&link::percent_decode(url.username()))?,
        };
        Ok(SsCredentials {
            method,
            password,
            server,
            port,
        })
    }

    /// SIP002 split on the first `@`, or the legacy whole-authority base64 form.
    fn resolve_manually(authority: &str) -> Result<SsCredentials> {
        if let Some((user_info, host_port)) = authority.split_once('@') {
            let (method, password) = decode_userinfo(&link::percent_decode(user_info))?;
            let (server, port) = link::split_host_port(host_port)?;
            return Ok(SsCredentials {
                method,
                password,
                server,
                port,
            });
        }

        let decoded = link::decode_base64(authority)?;
        let (method_password, host_port) = decoded
            .trim()
            .rsplit_once('@')
            .ok_or_else(|| ConvertError::malformed(error_msg::MISSING_AT))?;
        let (method, password) = method_password
            .split_once(':')
            .ok_or_else(|| ConvertError::malformed(error_msg::MISSING_COLON_METHOD))?;
        let (server, port) = link::split_host_port(host_port)?;
        Ok(SsCredentials {
            method: method.to_string(),
            password: password.to_string(),
            server,
            port,
        })
    }
}

/// Userinfo is either `base64(method:password)` or plain `method:password`.
fn decode_userinfo(user_info: &str) -> Result<(String, String)> {
    let plain = match link::decode_base64(user_info) {
        Ok(decoded) if decoded.contains(':') => decoded,
        _ => user_info.to_string(),
    };
    plain
        .split_once(':')
        .map(|(m, p)| (m.to_string(), p.to_string()))
        .ok_or_else(|| ConvertError::malformed(error_msg::MISSING_COLON_METHOD))
}
