//! Trojan link parser
//!
//! Link format: `trojan://<password>@<host>:<port>[?query][#fragment]`
//!
//! **Required**: `password` (URL username, percent-decoded), `host`, `port` (1–65535).
//!
//! **Query parameters** (optional): `sni`/`peer`, `alpn`, `fp`, `allowInsecure`, `type` (tcp/ws/grpc),
//! `host`, `path`, `serviceName`.
//!
//! ## Parsing rules
//!
//! 1. Prefix `trojan://` is case-insensitive.
//! 2. Trojan always runs over TLS: `sni` defaults to the host and the fingerprint to `chrome`.
//! 3. `type=ws|grpc` selects the transport.

use crate::ProtocolParser;
use crate::constants::{defaults, scheme};
use crate::error::{ConvertError, Result};
use crate::link;
use crate::proxy::{ProxyDescriptor, ProxyProtocol, TlsSettings, Transport, TrojanSettings};
use url::Url;

/// Trojan link parser
#[derive(Debug, Clone, Copy, Default)]
pub struct Trojan;

impl ProtocolParser for Trojan {
    const SCHEMES: &'static [&'static str] = &[scheme::TROJAN];

    fn parse(link: &str) -> Result<ProxyDescriptor> {
        let link_body = link::strip_scheme(link.trim(), Self::SCHEMES)?;
        let (main_part, name) = link::split_fragment(link_body);
        let url = Url::parse(&format!("{}{}", scheme::TROJAN, main_part))?;

        // A password containing ':' lands partly in the URL password slot.
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
        let port = url
            .port()
            .ok_or_else(|| ConvertError::malformed("Missing port"))?;
        let params = link::url_params(&url);

        let tls = TlsSettings {
            servername: Some(
                link::param(&params, &["sni", "peer"])
                    .unwrap_or(&server)
                    .to_string(),
            ),
            alpn: link::param(&params, &["alpn"])
                .map(link::split_list)
                .unwrap_or_default(),
            client_fingerprint: Some(
                link::param(&params, &["fp"])
                    .unwrap_or(defaults::FINGERPRINT)
                    .to_string(),
            ),
            reality: None,
            skip_cert_verify: link::param(&params, &["allowInsecure", "insecure"])
                .is_some_and(link::parse_flag),
        };

        let transport = link::param(&params, &["type"]).and_then(|network| {
            Transport::from_parts(
                network,
                link::param(&params, &["path"]),
                link::param(&params, &["host"]),
                link::param(&params, &["serviceName", "service_name"]),
            )
        });

        ProxyDescriptor::new(
            name,
            server,
            port,
            ProxyProtocol::Trojan(TrojanSettings {
                password,
                tls,
                transport,
            }),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(p: &ProxyDescriptor) -> &TrojanSettings {
        match &p.protocol {
            ProxyProtocol::Trojan(s) => s,
            other => panic!("expected trojan, got {:?}", other),
        }
    }

    #[test]
    fn sni_defaults_to_host() {
        let p = Trojan::parse("trojan://pw@example.com:443#remark").unwrap();
        assert_eq!(p.name, "remark");
        let s = settings(&p);
        assert_eq!(s.password, "pw");
        assert_eq!(s.tls.servername.as_deref(), Some("example.com"));
        assert_eq!(s.tls.client_fingerprint.as_deref(), Some("chrome"));
        assert!(s.transport.is_none());
    }

    #[test]
    fn query_parameters() {
        let p = Trojan::parse(
            "trojan://p%40ss@1.2.3.4:8443?sni=sni.example.com&allowInsecure=1&type=ws&path=%2Ftr&host=cdn.com",
        )
        .unwrap();
        let s = settings(&p);
        assert_eq!(s.password, "p@ss");
        assert_eq!(s.tls.servername.as_deref(), Some("sni.example.com"));
        assert!(s.tls.skip_cert_verify);
        assert_eq!(
            s.transport,
            Some(Transport::Ws {
                path: "/tr".to_string(),
                host: Some("cdn.com".to_string())
            })
        );
    }

    #[test]
    fn password_with_colon() {
        let p = Trojan::parse("trojan://a:b@h.com:443").unwrap();
        assert_eq!(settings(&p).password, "a:b");
    }

    #[test]
    fn missing_password_fails() {
        assert!(Trojan::parse("trojan://example.com:443").is_err());
        assert!(Trojan::parse("trojan://pw@example.com").is_err());
    }
}
