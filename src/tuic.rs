//! TUIC v5 link parser
//!
//! Link formats (both accepted):
//!
//! - `tuic://<uuid>:<password>@<host>:<port>[?query][#fragment]` (password in the URL password slot)
//! - `tuic://<uuid%3Apassword>@<host>:<port>...` (colon-joined, percent-encoded in the username)
//!
//! A non-empty URL password slot always wins; only when it is absent is the decoded
//! username split on its first `:`.
//!
//! **Query parameters** (optional): `congestion_control` (default `bbr`), `udp_relay_mode`
//! (default `native`), `sni`, `alpn` (default `h3`), `disable_sni`, `allow_insecure`/`insecure`.

use crate::ProtocolParser;
use crate::constants::{defaults, scheme};
use crate::error::{ConvertError, Result};
use crate::link;
use crate::proxy::{ProxyDescriptor, ProxyProtocol, TlsSettings, TuicSettings};
use url::Url;

/// TUIC link parser
#[derive(Debug, Clone, Copy, Default)]
pub struct Tuic;

impl ProtocolParser for Tuic {
    const SCHEMES: &'static [&'static str] = &[scheme::TUIC];

    fn parse(link: &str) -> Result<ProxyDescriptor> {
        let link_body = link::strip_scheme(link.trim(), Self::SCHEMES)?;
        let (main_part, name) = link::split_fragment(link_body);
        let url = Url::parse(&format!("{}{}", scheme::TUIC, main_part))?;

        let (uuid, password) = credentials(&url)?;
        let server = link::url_host(&url)?;
        let port = url
            .port()
            .ok_or_else(|| ConvertError::malformed("Missing port"))?;
        let params = link::url_params(&url);

        let alpn = link::param(&params, &["alpn"])
            .map(link::split_list)
            .filter(|list| !list.is_empty())
            .unwrap_or_else(|| defaults::TUIC_ALPN.iter().map(|s| s.to_string()).collect());

        ProxyDescriptor::new(
            name,
            server,
            port,
            ProxyProtocol::Tuic(TuicSettings {
                uuid,
                password,
                congestion_controller: link::param(&params, &["congestion_control", "congestion-control"])
                    .unwrap_or(defaults::TUIC_CONGESTION)
                    .to_string(),
                udp_relay_mode: link::param(&params, &["udp_relay_mode", "udp-relay-mode"])
                    .unwrap_or(defaults::TUIC_UDP_RELAY)
                    .to_string(),
                disable_sni: link::param(&params, &["disable_sni"]).is_some_and(link::parse_flag),
                tls: TlsSettings {
                    servername: link::param(&params, &["sni", "peer"]).map(str::to_string),
                    alpn,
                    client_fingerprint: None,
                    reality: None,
                    skip_cert_verify: link::param(&params, &["allow_insecure", "allowInsecure", "insecure"])
                        .is_some_and(link::parse_flag),
                },
            }),
        )
    }
}

/// Resolves `(uuid, password)`; the URL password slot takes precedence.
fn credentials(url: &Url) -> Result<(String, String)> {
    let username = link::percent_decode(url.username());
    let (uuid, password) = match url.password().filter(|p| !p.is_empty()) {
        Some(password) => (username, link::percent_decode(password)),
        None => match username.split_once(':') {
            Some((uuid, password)) => (uuid.to_string(), password.to_string()),
            None => (username, String::new()),
        },
    };
    if uuid.is_empty() {
        return Err(ConvertError::malformed("Missing uuid"));
    }
    if password.is_empty() {
        return Err(ConvertError::malformed("Missing password"));
    }
    Ok((uuid, password))
}
