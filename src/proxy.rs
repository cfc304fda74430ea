//! Normalized proxy descriptor
//!
//! Every share link, whatever its scheme, is parsed into one [`ProxyDescriptor`]. The
//! descriptor carries the fields shared by all protocols (`name`, `server`, `port`,
//! `udp`) and a [`ProxyProtocol`] variant holding only the fields that protocol uses.
//!
//! TLS settings and transports are optional sub-objects, so a descriptor can never hold
//! a `servername` without TLS or `ws-opts` on a plain TCP proxy.

use crate::constants::defaults;
use crate::error::{ConvertError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Proxy protocol type, serialized the way Clash names it
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ProxyType {
    /// Shadowsocks
    Ss,
    /// ShadowsocksR
    Ssr,
    /// VLESS
    Vless,
    /// VMess
    Vmess,
    /// Trojan
    Trojan,
    /// TUIC v5
    Tuic,
    /// Hysteria2
    Hysteria2,
}

impl ProxyType {
    /// Clash `type` value
    pub fn as_str(&self) -> &'static str {
        match self {
            ProxyType::Ss => "ss",
            ProxyType::Ssr => "ssr",
            ProxyType::Vless => "vless",
            ProxyType::Vmess => "vmess",
            ProxyType::Trojan => "trojan",
            ProxyType::Tuic => "tuic",
            ProxyType::Hysteria2 => "hysteria2",
        }
    }

    /// sing-box outbound `type` value
    pub fn singbox_type(&self) -> &'static str {
        match self {
            ProxyType::Ss => "shadowsocks",
            ProxyType::Ssr => "shadowsocksr",
            other => other.as_str(),
        }
    }
}

impl fmt::Display for ProxyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Transport network
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    /// Plain TCP (no transport options)
    #[default]
    Tcp,
    /// WebSocket
    Ws,
    /// gRPC
    Grpc,
    /// HTTP/2
    H2,
}

impl Network {
    /// Clash `network` value
    pub fn as_str(&self) -> &'static str {
        match self {
            Network::Tcp => "tcp",
            Network::Ws => "ws",
            Network::Grpc => "grpc",
            Network::H2 => "h2",
        }
    }
}

/// Transport options; exactly one shape per non-TCP network
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transport {
    /// WebSocket with path and optional `Host` header
    Ws {
        /// Request path
        path: String,
        /// `Host` header
        host: Option<String>,
    },
    /// gRPC with service name
    Grpc {
        /// gRPC service name
        service_name: String,
    },
    /// HTTP/2 with path and host list
    H2 {
        /// Request path
        path: String,
        /// Host list
        host: Vec<String>,
    },
}

impl Transport {
    /// Builds a transport from a network name and the link's `path`/`host`/service fields.
    ///
    /// Returns `None` for `tcp` and for networks this crate does not map.
    pub(crate) fn from_parts(
        network: &str,
        path: Option<&str>,
        host: Option<&str>,
        service_name: Option<&str>,
    ) -> Option<Self> {
        let host = host.map(str::trim).filter(|h| !h.is_empty());
        match network.to_ascii_lowercase().as_str() {
            "ws" | "websocket" => Some(Transport::Ws {
                path: path
                    .filter(|p| !p.is_empty())
                    .unwrap_or(defaults::WS_PATH)
                    .to_string(),
                host: host.map(str::to_string),
            }),
            "grpc" => Some(Transport::Grpc {
                service_name: service_name.or(path).unwrap_or_default().to_string(),
            }),
            "h2" | "http" => Some(Transport::H2 {
                path: path
                    .filter(|p| !p.is_empty())
                    .unwrap_or(defaults::WS_PATH)
                    .to_string(),
                host: host
                    .map(|h| h.split(',').map(|s| s.trim().to_string()).collect())
                    .unwrap_or_default(),
            }),
            _ => None,
        }
    }

    /// Network this transport runs over
    pub fn network(&self) -> Network {
        match self {
            Transport::Ws { .. } => Network::Ws,
            Transport::Grpc { .. } => Network::Grpc,
            Transport::H2 { .. } => Network::H2,
        }
    }
}

/// Reality options (VLESS)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RealityOpts {
    /// Server public key (`pbk`)
    pub public_key: String,
    /// Short ID (`sid`)
    pub short_id: String,
}

/// TLS settings; present only when TLS is enabled
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TlsSettings {
    /// SNI server name
    pub servername: Option<String>,
    /// ALPN list (omitted when empty)
    pub alpn: Vec<String>,
    /// uTLS client fingerprint
    pub client_fingerprint: Option<String>,
    /// Reality options
    pub reality: Option<RealityOpts>,
    /// Skip certificate verification
    pub skip_cert_verify: bool,
}

/// SIP003 plugin attached to a Shadowsocks server
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShadowsocksPlugin {
    /// Plugin name (e.g. `obfs-local`, `v2ray-plugin`)
    pub name: String,
    /// Plugin options in their original order
    pub opts: Vec<(String, Option<String>)>,
}

impl ShadowsocksPlugin {
    /// Parses `name;key=value;flag`.
    pub fn parse(plugin: &str) -> Option<Self> {
        let mut parts = plugin.split(';');
        let name = parts.next()?.trim();
        if name.is_empty() {
            return None;
        }
        let opts = parts
            .filter(|p| !p.is_empty())
            .map(|p| match p.split_once('=') {
                Some((k, v)) => (k.to_string(), Some(v.to_string())),
                None => (p.to_string(), None),
            })
            .collect();
        Some(ShadowsocksPlugin {
            name: name.to_string(),
            opts,
        })
    }

    /// Looks up an option value
    pub fn opt(&self, key: &str) -> Option<&str> {
        self.opts
            .iter()
            .find(|(k, _)| k == key)
            .and_then(|(_, v)| v.as_deref())
    }

    /// Whether a bare flag (or `key=true`) is set
    pub fn flag(&self, key: &str) -> bool {
        self.opts
            .iter()
            .any(|(k, v)| k == key && v.as_deref().is_none_or(|v| v == "true" || v == "1"))
    }

    /// Options re-joined as `key=value;flag`
    pub fn opts_string(&self) -> String {
        self.opts
            .iter()
            .map(|(k, v)| match v {
                Some(v) => format!("{}={}", k, v),
                None => k.clone(),
            })
            .collect::<Vec<_>>()
            .join(";")
    }
}

/// Shadowsocks fields
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShadowsocksSettings {
    /// Encryption method
    pub cipher: String,
    /// Password
    pub password: String,
    /// Optional SIP003 plugin
    pub plugin: Option<ShadowsocksPlugin>,
}

/// ShadowsocksR fields
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShadowsocksRSettings {
    /// Encryption method
    pub cipher: String,
    /// Password
    pub password: String,
    /// Protocol plugin
    pub protocol: String,
    /// Protocol parameter
    pub protocol_param: Option<String>,
    /// Obfuscation plugin
    pub obfs: String,
    /// Obfuscation parameter
    pub obfs_param: Option<String>,
}

/// VLESS fields
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VLessSettings {
    /// User ID
    pub uuid: String,
    /// XTLS flow (e.g. `xtls-rprx-vision`)
    pub flow: Option<String>,
    /// TLS or Reality settings
    pub tls: Option<TlsSettings>,
    /// Transport options
    pub transport: Option<Transport>,
}

/// VMess fields
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VMessSettings {
    /// User ID
    pub uuid: String,
    /// Alter ID
    pub alter_id: u16,
    /// Security (cipher)
    pub cipher: String,
    /// TLS settings
    pub tls: Option<TlsSettings>,
    /// Transport options
    pub transport: Option<Transport>,
}

/// Trojan fields; Trojan always runs over TLS
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrojanSettings {
    /// Password
    pub password: String,
    /// TLS settings
    pub tls: TlsSettings,
    /// Transport options
    pub transport: Option<Transport>,
}

/// TUIC v5 fields
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TuicSettings {
    /// User ID
    pub uuid: String,
    /// Password
    pub password: String,
    /// Congestion controller (bbr, cubic, new_reno)
    pub congestion_controller: String,
    /// UDP relay mode (native, quic)
    pub udp_relay_mode: String,
    /// Do not send SNI
    pub disable_sni: bool,
    /// TLS settings
    pub tls: TlsSettings,
}

/// Hysteria2 fields
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hysteria2Settings {
    /// Auth password
    pub password: String,
    /// Obfuscation type (salamander)
    pub obfs: Option<String>,
    /// Obfuscation password
    pub obfs_password: Option<String>,
    /// TLS settings
    pub tls: TlsSettings,
}

/// Protocol-specific part of a descriptor
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProxyProtocol {
    /// Shadowsocks
    Shadowsocks(ShadowsocksSettings),
    /// ShadowsocksR
    ShadowsocksR(ShadowsocksRSettings),
    /// VLESS
    VLess(VLessSettings),
    /// VMess
    VMess(VMessSettings),
    /// Trojan
    Trojan(TrojanSettings),
    /// TUIC
    Tuic(TuicSettings),
    /// Hysteria2
    Hysteria2(Hysteria2Settings),
}

/// One normalized proxy entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyDescriptor {
    /// Display name, unique within a deduplicated batch
    pub name: String,
    /// Server host or IP
    pub server: String,
    /// Server port (1–65535)
    pub port: u16,
    /// Whether UDP relay is enabled
    pub udp: bool,
    /// Protocol-specific fields
    pub protocol: ProxyProtocol,
}

impl ProxyDescriptor {
    /// Creates a descriptor, validating the shared fields.
    ///
    /// A missing or blank name falls back to `server:port`.
    pub fn new(
        name: Option<String>,
        server: impl Into<String>,
        port: u16,
        protocol: ProxyProtocol,
    ) -> Result<Self> {
        let server = server.into();
        if server.is_empty() {
            return Err(ConvertError::malformed("Missing server"));
        }
        if port == 0 {
            return Err(ConvertError::malformed("Invalid port: 0"));
        }
        let name = name
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| format!("{}:{}", server, port));
        Ok(ProxyDescriptor {
            name,
            server,
            port,
            udp: true,
            protocol,
        })
    }

    /// Protocol type of this descriptor
    pub fn proxy_type(&self) -> ProxyType {
        match &self.protocol {
            ProxyProtocol::Shadowsocks(_) => ProxyType::Ss,
            ProxyProtocol::ShadowsocksR(_) => ProxyType::Ssr,
            ProxyProtocol::VLess(_) => ProxyType::Vless,
            ProxyProtocol::VMess(_) => ProxyType::Vmess,
            ProxyProtocol::Trojan(_) => ProxyType::Trojan,
            ProxyProtocol::Tuic(_) => ProxyType::Tuic,
            ProxyProtocol::Hysteria2(_) => ProxyType::Hysteria2,
        }
    }

    /// TLS settings, if this descriptor uses TLS
    pub fn tls(&self) -> Option<&TlsSettings> {
        match &self.protocol {
            ProxyProtocol::VLess(v) => v.tls.as_ref(),
            ProxyProtocol::VMess(v) => v.tls.as_ref(),
            ProxyProtocol::Trojan(t) => Some(&t.tls),
            ProxyProtocol::Tuic(t) => Some(&t.tls),
            ProxyProtocol::Hysteria2(h) => Some(&h.tls),
            ProxyProtocol::Shadowsocks(_) | ProxyProtocol::ShadowsocksR(_) => None,
        }
    }

    /// Transport options, if any
    pub fn transport(&self) -> Option<&Transport> {
        match &self.protocol {
            ProxyProtocol::VLess(v) => v.transport.as_ref(),
            ProxyProtocol::VMess(v) => v.transport.as_ref(),
            ProxyProtocol::Trojan(t) => t.transport.as_ref(),
            _ => None,
        }
    }

    /// Transport network (`tcp` when no transport is set)
    pub fn network(&self) -> Network {
        self.transport()
            .map(Transport::network)
            .unwrap_or_default()
    }
}
