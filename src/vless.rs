//! VLess link parser
//!
//! URI format (RFC 3986): `vless://<uuid>@<address>:<port>[?<query>][#<fragment>]`
//!
//! **Required**: `uuid` (URL username), `address`, `port` (1–65535).
//!
//! **Query parameters** (optional): `security` (none/tls/reality), `type` (tcp/ws/grpc/h2),
//! `flow`, `sni`, `alpn`, `fp`, `pbk`/`sid` (Reality), `host`, `path`, `serviceName`,
//! `allowInsecure`.
//!
//! ## Parsing rules
//!
//! 1. Prefix `vless://` is case-insensitive.
//! 2. TLS is enabled iff `security` is `tls` or `reality`. With TLS on, `servername` falls
//!    back to the host, `alpn` to `h2,http/1.1` and the fingerprint to `chrome`.
//! 3. `security=reality` adds Reality options from `pbk` and `sid`.
//! 4. `type` selects the transport; anything other than ws/grpc/h2 is plain TCP.

use crate::ProtocolParser;
use crate::constants::{defaults, scheme};
use crate::error::{ConvertError, Result};
use crate::link;
use crate::proxy::{
    ProxyDescriptor, ProxyProtocol, RealityOpts, TlsSettings, Transport, VLessSettings,
};
use std::collections::HashMap;
use url::Url;

/// VLess link parser
#[derive(Debug, Clone, Copy, Default)]
pub struct VLess;

impl ProtocolParser for VLess {
    const SCHEMES: &'static [&'static str] = &[scheme::VLESS];

    fn parse(link: &str) -> Result<ProxyDescriptor> {
        let link_body = link::strip_scheme(link.trim(), Self::SCHEMES)?;
        let (main_part, name) = link::split_fragment(link_body);
        let url = Url::parse(&format!("{}{}", scheme::VLESS, main_part))?;

        let uuid = link::percent_decode(url.username());
        if uuid.is_empty() {
            return Err(ConvertError::malformed("Missing uuid"));
        }
        let server = link::url_host(&url)?;
        let port = url
            .port()
            .ok_or_else(|| ConvertError::malformed("Missing port"))?;
        let params = link::url_params(&url);

        let security = link::param(&params, &["security"])
            .unwrap_or_default()
            .to_ascii_lowercase();
        let tls = match security.as_str() {
            "tls" | "reality" => Some(tls_settings(&params, &server, security == "reality")),
            _ => None,
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
            ProxyProtocol::VLess(VLessSettings {
                uuid,
                flow: link::param(&params, &["flow"]).map(str::to_string),
                tls,
                transport,
            }),
        )
    }
}

fn tls_settings(params: &HashMap<String, String>, server: &str, reality: bool) -> TlsSettings {
    let alpn = link::param(params, &["alpn"])
        .map(link::split_list)
        .filter(|list| !list.is_empty())
        .unwrap_or_else(|| defaults::VLESS_ALPN.iter().map(|s| s.to_string()).collect());

    TlsSettings {
        servername: Some(link::param(params, &["sni", "peer"]).unwrap_or(server).to_string()),
        alpn,
        client_fingerprint: Some(
            link::param(params, &["fp"])
                .unwrap_or(defaults::FINGERPRINT)
                .to_string(),
        ),
        reality: reality.then(|| RealityOpts {
            public_key: link::param(params, &["pbk"]).unwrap_or_default().to_string(),
            short_id: link::param(params, &["sid"]).unwrap_or_default().to_string(),
        }),
        skip_cert_verify: link::param(params, &["allowInsecure", "insecure"])
            .is_some_and(link::parse_flag),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proxy::Network;

    fn settings(p: &ProxyDescriptor) -> &VLessSettings {
        match &p.protocol {
            ProxyProtocol::VLess(s) => s,
            other => panic!("expected vless, got {:?}", other),
        }
    }

    #[test]
    fn plain_tcp_has_no_tls_fields() {
        let p = VLess::parse("vless://uuid-1@example.com:443#plain").unwrap();
        assert_eq!(p.name, "plain");
        assert_eq!(settings(&p).uuid, "uuid-1");
        assert!(p.tls().is_none());
        assert_eq!(p.network(), Network::Tcp);
    }

    #[test]
    fn tls_defaults() {
        let p = VLess::parse("vless://u@example.com:443?security=tls").unwrap();
        let tls = p.tls().unwrap();
        assert_eq!(tls.servername.as_deref(), Some("example.com"));
        assert_eq!(tls.alpn, vec!["h2", "http/1.1"]);
        assert_eq!(tls.client_fingerprint.as_deref(), Some("chrome"));
        assert!(tls.reality.is_none());
        assert_eq!(p.name, "example.com:443");
    }

    #[test]
    fn reality_vision() {
        let link = "vless://u@1.2.3.4:443?security=reality&sni=www.microsoft.com&fp=safari&pbk=PUBKEY&sid=ab12&flow=xtls-rprx-vision&type=tcp#R";
        let p = VLess::parse(link).unwrap();
        let s = settings(&p);
        assert_eq!(s.flow.as_deref(), Some("xtls-rprx-vision"));
        let tls = s.tls.as_ref().unwrap();
        assert_eq!(tls.servername.as_deref(), Some("www.microsoft.com"));
        assert_eq!(tls.client_fingerprint.as_deref(), Some("safari"));
        let reality = tls.reality.as_ref().unwrap();
        assert_eq!(reality.public_key, "PUBKEY");
        assert_eq!(reality.short_id, "ab12");
        assert!(s.transport.is_none());
    }

    #[test]
    fn ws_and_grpc_transports() {
        let ws = VLess::parse("vless://u@h.com:443?security=tls&type=ws&path=%2Fray&host=cdn.com").unwrap();
        assert_eq!(
            settings(&ws).transport,
            Some(Transport::Ws {
                path: "/ray".to_string(),
                host: Some("cdn.com".to_string())
            })
        );
        let grpc = VLess::parse("vless://u@h.com:443?security=tls&type=grpc&serviceName=svc").unwrap();
        assert_eq!(
            settings(&grpc).transport,
            Some(Transport::Grpc {
                service_name: "svc".to_string()
            })
        );
    }

    #[test]
    fn missing_uuid_or_port_fails() {
        assert!(VLess::parse("vless://example.com:443").is_err());
        assert!(VLess::parse("vless://u@example.com").is_err());
    }
}
