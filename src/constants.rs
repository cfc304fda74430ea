//! Shared constants for link schemes, fixed outbound names and error messages.

/// Share-link URI scheme prefixes (lowercase, with `://`).
pub mod scheme {
    /// Shadowsocks: `ss://`
    pub const SHADOWSOCKS: &str = "ss://";
    /// ShadowsocksR: `ssr://`
    pub const SHADOWSOCKSR: &str = "ssr://";
    /// VMess: `vmess://`
    pub const VMESS: &str = "vmess://";
    /// VLESS: `vless://`
    pub const VLESS: &str = "vless://";
    /// Trojan: `trojan://`
    pub const TROJAN: &str = "trojan://";
    /// TUIC: `tuic://`
    pub const TUIC: &str = "tuic://";
    /// Hysteria2: `hysteria2://`
    pub const HYSTERIA2: &str = "hysteria2://";
    /// Hysteria2 short alias: `hy2://`
    pub const HY2: &str = "hy2://";
}

/// Names of the fixed groups and outbounds every generated config carries.
pub mod group {
    /// The selector group listing every proxy
    pub const PROXY: &str = "PROXY";
    /// Direct connection
    pub const DIRECT: &str = "DIRECT";
    /// Reject connection
    pub const REJECT: &str = "REJECT";
    /// sing-box DNS outbound tag
    pub const DNS_OUT: &str = "dns-out";
}

/// Defaults applied when a link omits an optional field.
pub mod defaults {
    /// VMess cipher when `scy` is missing
    pub const VMESS_CIPHER: &str = "auto";
    /// uTLS fingerprint when `fp` is missing
    pub const FINGERPRINT: &str = "chrome";
    /// ALPN for VLESS over TLS when `alpn` is missing
    pub const VLESS_ALPN: [&str; 2] = ["h2", "http/1.1"];
    /// ALPN for TUIC when `alpn` is missing
    pub const TUIC_ALPN: [&str; 1] = ["h3"];
    /// TUIC congestion controller
    pub const TUIC_CONGESTION: &str = "bbr";
    /// TUIC UDP relay mode
    pub const TUIC_UDP_RELAY: &str = "native";
    /// WebSocket path
    pub const WS_PATH: &str = "/";
    /// Hysteria2 port when the link omits it
    pub const HYSTERIA2_PORT: u16 = 443;
}

/// Common error message fragments for link parsing.
pub mod error_msg {
    /// Missing `@` in userinfo@host part.
    pub const MISSING_AT: &str = "Missing '@' in main part";
    /// Missing `:` in host:port part.
    pub const MISSING_COLON_HOST_PORT: &str = "Missing ':' in host:port";
    /// Missing `:` between method and password.
    pub const MISSING_COLON_METHOD: &str = "Missing ':' in method:password";
    /// Invalid port value.
    pub const INVALID_PORT: &str = "Invalid port";
    /// Missing host in URL.
    pub const MISSING_HOST: &str = "Missing host";
    /// Link must start with scheme (placeholder: use with format!).
    pub const MUST_START_WITH: &str = "Link must start with";
}
