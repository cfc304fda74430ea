//! Hysteria2 link parser
//!
//! Link format: `hysteria2://[auth@]hostname[:port]/?[key=value]&...[#fragment]`
//!
//! **Scheme**: both `hysteria2://` and the short alias `hy2://` are accepted.
//!
//! **auth**: The URL username is the password. If the link carries `user:pass`, both halves are kept joined.
//!
//! **port**: Defaults to 443 when omitted.
//!
//! **Query**: `obfs` (e.g. salamander), `obfs-password`, `sni`/`peer`, `insecure` or `skip_cert_verify` (1/true), `alpn`.

use crate::ProtocolParser;
use crate::constants::{defaults, scheme};
use crate::error::{ConvertError, Result};
use crate::link;
use crate::proxy::{Hysteria2Settings, ProxyDescriptor, ProxyProtocol, TlsSettings};
use url::Url;

/// Hysteria2 link parser
#[derive(Debug, Clone, Copy, Default)]
pub struct Hysteria2;

impl ProtocolParser for Hysteria2 {
    const SCHEMES: &'static [&'static str] = &[scheme::HYSTERIA2, scheme::HY2];

    fn parse(link: &str) -> Result<ProxyDescriptor> {
        let link_body = link::strip_scheme(link.trim(), Self::SCHEMES)?;
        let (main_part, name) = link::split_fragment(link_body);
        let url = Url::parse(&format!("{}{}", scheme::HYSTERIA2, main_part))?;

        let password = match url.password() {
            Some(rest) => format!(
                "{}:{}",
                link::percent_decode(url.username()),
                link::percent_decode(rest)
            ),
            None => link::percent_decode(url.username()),
        };
        if password.is_empty() {
            return Err(ConvertError::malformed("Missing password"));
        }
        let server = link::url_host(&url)?;
        let port = url.port().unwrap_or(defaults::HYSTERIA2_PORT);
        let params = link::url_params(&url);

        let obfs = link::param(&params, &["obfs"])
            .filter(|obfs| !obfs.eq_ignore_ascii_case("none"))
            .map(str::to_string);
        let obfs_password = obfs
            .as_ref()
            .and_then(|_| link::param(&params, &["obfs-password", "obfs_password"]))
            .map(str::to_string);

        ProxyDescriptor::new(
            name,
            server,
            port,
            ProxyProtocol::Hysteria2(Hysteria2Settings {
                password,
                obfs,
                obfs_password,
                tls: TlsSettings {
                    servername: link::param(&params, &["sni", "peer"]).map(str::to_string),
                    alpn: link::param(&params, &["alpn"])
                        .map(link::split_list)
                        .unwrap_or_default(),
                    client_fingerprint: None,
                    reality: None,
                    skip_cert_verify: link::param(&params, &["insecure", "skip_cert_verify"])
                        .is_some_and(link::parse_flag),
                },
            }),
        )
    }
}
