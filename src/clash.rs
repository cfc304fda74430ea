//! Clash config emitter
//!
//! Output is YAML-shaped text written by hand: block sequences for `proxies`,
//! `proxy-groups` and `rules`, and flow style (`{k: v}` / `[a, b]`) for everything nested
//! inside a proxy entry. Every string value is written as a double-quoted scalar through
//! [`quote_string`], so names like `- HK #1` or `*edge` can never change the document
//! structure.

use crate::constants::{defaults, group};
use crate::error::{ConvertError, Result};
use crate::proxy::{
    Hysteria2Settings, ProxyDescriptor, ProxyProtocol, ShadowsocksPlugin, ShadowsocksRSettings,
    ShadowsocksSettings, TlsSettings, Transport, TrojanSettings, TuicSettings, VLessSettings,
    VMessSettings,
};
use crate::settings::ClashSettings;
use std::borrow::Cow;
use std::fmt::{self, Write};

const RULES: &[&str] = &[
    "DOMAIN-SUFFIX,google.com,PROXY",
    "DOMAIN-SUFFIX,youtube.com,PROXY",
    "DOMAIN-SUFFIX,github.com,PROXY",
    "DOMAIN-SUFFIX,twitter.com,PROXY",
    "DOMAIN-SUFFIX,telegram.org,PROXY",
    "GEOIP,CN,DIRECT",
    "MATCH,PROXY",
];

/// A value in a Clash proxy entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClashValue {
    /// String, always emitted quoted
    Str(String),
    /// Integer
    Int(i64),
    /// Boolean
    Bool(bool),
    /// Flow sequence `[a, b]`
    List(Vec<ClashValue>),
    /// Flow mapping `{k: v}` with keys in insertion order
    Map(Vec<(String, ClashValue)>),
}

impl fmt::Display for ClashValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClashValue::Str(s) => f.write_str(&quote_string(s)),
            ClashValue::Int(i) => write!(f, "{}", i),
            ClashValue::Bool(b) => write!(f, "{}", b),
            ClashValue::List(items) => {
                f.write_char('[')?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                f.write_char(']')
            }
            ClashValue::Map(entries) => {
                f.write_char('{')?;
                for (i, (key, value)) in entries.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}: {}", map_key(key), value)?;
                }
                f.write_char('}')
            }
        }
    }
}

impl From<&str> for ClashValue {
    fn from(s: &str) -> Self {
        ClashValue::Str(s.to_string())
    }
}

impl From<&String> for ClashValue {
    fn from(s: &String) -> Self {
        ClashValue::Str(s.clone())
    }
}

impl From<bool> for ClashValue {
    fn from(b: bool) -> Self {
        ClashValue::Bool(b)
    }
}

impl From<u16> for ClashValue {
    fn from(i: u16) -> Self {
        ClashValue::Int(i64::from(i))
    }
}

impl<T: Into<ClashValue>> From<Vec<T>> for ClashValue {
    fn from(items: Vec<T>) -> Self {
        ClashValue::List(items.into_iter().map(Into::into).collect())
    }
}

/// Flow-map keys made of `[A-Za-z0-9_-]` (not starting with `-`) stay bare, anything else
/// is quoted.
fn map_key(key: &str) -> Cow<'_, str> {
    let bare = !key.is_empty()
        && !key.starts_with('-')
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if bare {
        Cow::Borrowed(key)
    } else {
        Cow::Owned(quote_string(key))
    }
}

/// Quotes a string as a double-quoted scalar with JSON escaping.
///
/// `"` and `\` are backslash-escaped, `\n`, `\r` and `\t` use their short forms, and every
/// other control character plus U+2028, U+2029 and U+FEFF is written as `\uXXXX`.
pub fn quote_string(s: &str) -> String {
    let mut quoted = String::with_capacity(s.len() + 2);
    quoted.push('"');
    for c in s.chars() {
        match c {
            '"' => quoted.push_str("\\\""),
            '\\' => quoted.push_str("\\\\"),
            '\n' => quoted.push_str("\\n"),
            '\r' => quoted.push_str("\\r"),
            '\t' => quoted.push_str("\\t"),
            '\u{2028}' | '\u{2029}' | '\u{feff}' => {
                quoted.push_str(&format!("\\u{:04x}", c as u32));
            }
            c if c.is_control() => {
                quoted.push_str(&format!("\\u{:04x}", c as u32));
            }
            c => quoted.push(c),
        }
    }
    quoted.push('"');
    quoted
}

/// Ordered key-value list for one proxy entry
#[derive(Default)]
struct Entry(Vec<(String, ClashValue)>);

impl Entry {
    fn put(&mut self, key: &str, value: impl Into<ClashValue>) {
        self.0.push((key.to_string(), value.into()));
    }

    fn put_opt(&mut self, key: &str, value: Option<impl Into<ClashValue>>) {
        if let Some(value) = value {
            self.put(key, value);
        }
    }

    fn put_list(&mut self, key: &str, items: &[String]) {
        if !items.is_empty() {
            self.put(key, ClashValue::List(items.iter().map(Into::into).collect()));
        }
    }
}

/// Clash config builder
#[derive(Debug, Clone, Default)]
pub struct ClashConfigBuilder {
    settings: ClashSettings,
}

impl ClashConfigBuilder {
    /// Builder with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder with the given scalar settings
    pub fn with_settings(settings: ClashSettings) -> Self {
        ClashConfigBuilder { settings }
    }

    /// Renders the full config.
    ///
    /// # Errors
    ///
    /// `EmptyBatch` when `proxies` is empty.
    pub fn build(&self, proxies: &[ProxyDescriptor]) -> Result<String> {
        if proxies.is_empty() {
            return Err(ConvertError::EmptyBatch {
                diagnostics: Vec::new(),
            });
        }

        let s = &self.settings;
        let mut lines = vec![
            format!("port: {}", s.port),
            format!("socks-port: {}", s.socks_port),
            format!("allow-lan: {}", s.allow_lan),
            format!("mode: {}", quote_string(&s.mode)),
            format!("log-level: {}", quote_string(&s.log_level)),
            format!(
                "external-controller: {}",
                quote_string(&s.external_controller)
            ),
        ];

        lines.push("proxies:".to_string());
        for proxy in proxies {
            for (i, (key, value)) in Self::proxy_entry(proxy).iter().enumerate() {
                let lead = if i == 0 { "  - " } else { "    " };
                lines.push(format!("{}{}: {}", lead, key, value));
            }
        }

        let mut members: Vec<ClashValue> = vec![group::DIRECT.into(), group::REJECT.into()];
        members.extend(proxies.iter().map(|p| ClashValue::from(&p.name)));
        lines.push("proxy-groups:".to_string());
        lines.push(format!("  - name: {}", quote_string(group::PROXY)));
        lines.push(format!("    type: {}", quote_string("select")));
        lines.push(format!("    proxies: {}", ClashValue::List(members)));

        lines.push("rules:".to_string());
        lines.extend(RULES.iter().map(|rule| format!("  - {}", quote_string(rule))));

        let mut out = lines.join("\n");
        out.push('\n');
        Ok(out)
    }

    /// Key-value pairs of one `proxies:` entry, in emission order
    pub fn proxy_entry(proxy: &ProxyDescriptor) -> Vec<(String, ClashValue)> {
        let mut entry = Entry::default();
        entry.put("name", &proxy.name);
        entry.put("type", proxy.proxy_type().as_str());
        entry.put("server", &proxy.server);
        entry.put("port", proxy.port);

        match &proxy.protocol {
            ProxyProtocol::Shadowsocks(s) => shadowsocks(&mut entry, s, proxy.udp),
            ProxyProtocol::ShadowsocksR(s) => shadowsocks_r(&mut entry, s, proxy.udp),
            ProxyProtocol::VMess(s) => vmess(&mut entry, s, proxy.udp),
            ProxyProtocol::VLess(s) => vless(&mut entry, s, proxy.udp),
            ProxyProtocol::Trojan(s) => trojan(&mut entry, s, proxy.udp),
            ProxyProtocol::Tuic(s) => tuic(&mut entry, s, proxy.udp),
            ProxyProtocol::Hysteria2(s) => hysteria2(&mut entry, s, proxy.udp),
        }
        entry.0
    }
}

fn shadowsocks(entry: &mut Entry, s: &ShadowsocksSettings, udp: bool) {
    entry.put("cipher", &s.cipher);
    entry.put("password", &s.password);
    if let Some(plugin) = &s.plugin {
        let (name, opts) = plugin_opts(plugin);
        entry.put("plugin", name);
        if !opts.is_empty() {
            entry.put("plugin-opts", ClashValue::Map(opts));
        }
    }
    entry.put("udp", udp);
}

/// Maps a SIP003 plugin onto Clash's plugin name and `plugin-opts`
fn plugin_opts(plugin: &ShadowsocksPlugin) -> (&str, Vec<(String, ClashValue)>) {
    let mut opts = Entry::default();
    match plugin.name.as_str() {
        "obfs-local" | "simple-obfs" | "obfs" => {
            opts.put_opt("mode", plugin.opt("obfs").or_else(|| plugin.opt("mode")));
            opts.put_opt(
                "host",
                plugin.opt("obfs-host").or_else(|| plugin.opt("host")),
            );
            ("obfs", opts.0)
        }
        "v2ray-plugin" => {
            opts.put("mode", plugin.opt("mode").unwrap_or("websocket"));
            opts.put_opt("host", plugin.opt("host"));
            opts.put_opt("path", plugin.opt("path"));
            opts.put("tls", plugin.flag("tls"));
            ("v2ray-plugin", opts.0)
        }
        name => {
            for (key, value) in &plugin.opts {
                match value {
                    Some(value) => opts.put(key, value),
                    None => opts.put(key, true),
                }
            }
            (name, opts.0)
        }
    }
}

fn shadowsocks_r(entry: &mut Entry, s: &ShadowsocksRSettings, udp: bool) {
    entry.put("cipher", &s.cipher);
    entry.put("password", &s.password);
    entry.put("protocol", &s.protocol);
    entry.put_opt("protocol-param", s.protocol_param.as_ref());
    entry.put("obfs", &s.obfs);
    entry.put_opt("obfs-param", s.obfs_param.as_ref());
    entry.put("udp", udp);
}

fn vmess(entry: &mut Entry, s: &VMessSettings, udp: bool) {
    entry.put("uuid", &s.uuid);
    entry.put("alterId", s.alter_id);
    entry.put("cipher", &s.cipher);
    entry.put("udp", udp);
    tls_fields(entry, s.tls.as_ref());
    transport_fields(entry, s.transport.as_ref());
}

fn vless(entry: &mut Entry, s: &VLessSettings, udp: bool) {
    entry.put("uuid", &s.uuid);
    entry.put_opt("flow", s.flow.as_ref());
    entry.put("udp", udp);
    tls_fields(entry, s.tls.as_ref());
    transport_fields(entry, s.transport.as_ref());
}

fn trojan(entry: &mut Entry, s: &TrojanSettings, udp: bool) {
    entry.put("password", &s.password);
    entry.put("udp", udp);
    entry.put_opt("sni", s.tls.servername.as_ref());
    entry.put_list("alpn", &s.tls.alpn);
    entry.put(
        "client-fingerprint",
        s.tls
            .client_fingerprint
            .as_deref()
            .unwrap_or(defaults::FINGERPRINT),
    );
    if s.tls.skip_cert_verify {
        entry.put("skip-cert-verify", true);
    }
    transport_fields(entry, s.transport.as_ref());
}

fn tuic(entry: &mut Entry, s: &TuicSettings, udp: bool) {
    entry.put("uuid", &s.uuid);
    entry.put("password", &s.password);
    entry.put_opt("sni", s.tls.servername.as_ref());
    if s.tls.alpn.is_empty() {
        entry.put("alpn", defaults::TUIC_ALPN.to_vec());
    } else {
        entry.put_list("alpn", &s.tls.alpn);
    }
    entry.put("congestion-controller", &s.congestion_controller);
    entry.put("udp-relay-mode", &s.udp_relay_mode);
    entry.put("disable-sni", s.disable_sni);
    if s.tls.skip_cert_verify {
        entry.put("skip-cert-verify", true);
    }
    entry.put("udp", udp);
}

fn hysteria2(entry: &mut Entry, s: &Hysteria2Settings, udp: bool) {
    entry.put("password", &s.password);
    entry.put_opt("sni", s.tls.servername.as_ref());
    entry.put_list("alpn", &s.tls.alpn);
    if let Some(obfs) = &s.obfs {
        entry.put("obfs", obfs);
        entry.put_opt("obfs-password", s.obfs_password.as_ref());
    }
    entry.put("skip-cert-verify", s.tls.skip_cert_verify);
    entry.put("udp", udp);
}

/// `tls: false`, or `tls: true` followed by the TLS fields that are set
fn tls_fields(entry: &mut Entry, tls: Option<&TlsSettings>) {
    let Some(tls) = tls else {
        entry.put("tls", false);
        return;
    };
    entry.put("tls", true);
    entry.put_opt("servername", tls.servername.as_ref());
    entry.put_list("alpn", &tls.alpn);
    entry.put_opt("client-fingerprint", tls.client_fingerprint.as_ref());
    if let Some(reality) = &tls.reality {
        entry.put(
            "reality-opts",
            ClashValue::Map(vec![
                ("public-key".to_string(), (&reality.public_key).into()),
                ("short-id".to_string(), (&reality.short_id).into()),
            ]),
        );
    }
    if tls.skip_cert_verify {
        entry.put("skip-cert-verify", true);
    }
}

/// `network` plus the matching `*-opts` mapping
fn transport_fields(entry: &mut Entry, transport: Option<&Transport>) {
    let network = transport.map(Transport::network).unwrap_or_default();
    entry.put("network", network.as_str());
    match transport {
        Some(Transport::Ws { path, host }) => {
            let mut opts = Entry::default();
            opts.put("path", path);
            if let Some(host) = host {
                opts.put(
                    "headers",
                    ClashValue::Map(vec![("Host".to_string(), host.into())]),
                );
            }
            entry.put("ws-opts", ClashValue::Map(opts.0));
        }
        Some(Transport::Grpc { service_name }) => {
            entry.put(
                "grpc-opts",
                ClashValue::Map(vec![("grpc-service-name".to_string(), service_name.into())]),
            );
        }
        Some(Transport::H2 { path, host }) => {
            let mut opts = Entry::default();
            opts.put("path", path);
            opts.put_list("host", host);
            entry.put("h2-opts", ClashValue::Map(opts.0));
        }
        None => {}
    }
}

/// Renders a Clash config with default settings.
///
/// # Errors
///
/// `EmptyBatch` when `proxies` is empty.
pub fn generate_clash_config(proxies: &[ProxyDescriptor]) -> Result<String> {
    ClashConfigBuilder::new().build(proxies)
}
