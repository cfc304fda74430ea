//! Generator settings
//!
//! Every field has a default, so a settings file only needs the keys it overrides:
//!
//! ```json
//! { "clash": { "port": 7890, "allow-lan": true }, "singbox": { "listen_port": 7890 } }
//! ```

use serde::{Deserialize, Serialize};

/// Scalar settings at the top of a Clash config
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "kebab-case")]
pub struct ClashSettings {
    /// HTTP proxy port
    pub port: u16,
    /// SOCKS5 proxy port
    pub socks_port: u16,
    /// Accept connections from the LAN
    pub allow_lan: bool,
    /// Routing mode (rule, global, direct)
    pub mode: String,
    /// Log level
    pub log_level: String,
    /// RESTful controller address
    pub external_controller: String,
}

impl Default for ClashSettings {
    fn default() -> Self {
        ClashSettings {
            port: 7890,
            socks_port: 7891,
            allow_lan: false,
            mode: "rule".to_string(),
            log_level: "info".to_string(),
            external_controller: "127.0.0.1:9090".to_string(),
        }
    }
}

/// Fixed parts of a sing-box config
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SingboxSettings {
    /// Log level
    pub log_level: String,
    /// Listen address of the mixed inbound
    pub listen: String,
    /// Listen port of the mixed inbound
    pub listen_port: u16,
    /// Hysteria2 upload bandwidth in Mbps
    pub up_mbps: u32,
    /// Hysteria2 download bandwidth in Mbps
    pub down_mbps: u32,
    /// Enable the experimental cache file
    pub cache_file: bool,
}

impl Default for SingboxSettings {
    fn default() -> Self {
        SingboxSettings {
            log_level: "info".to_string(),
            listen: "127.0.0.1".to_string(),
            listen_port: 2080,
            up_mbps: 100,
            down_mbps: 50,
            cache_file: true,
        }
    }
}

/// Settings for both config generators
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct GeneratorSettings {
    /// Clash generator settings
    pub clash: ClashSettings,
    /// sing-box generator settings
    pub singbox: SingboxSettings,
}

impl GeneratorSettings {
    /// Loads settings from JSON; missing keys keep their defaults.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_json_gives_defaults() {
        assert_eq!(GeneratorSettings::from_json("{}").unwrap(), GeneratorSettings::default());
    }

    #[test]
    fn partial_override() {
        let s = GeneratorSettings::from_json(
            r#"{"clash":{"allow-lan":true,"socks-port":1080},"singbox":{"listen_port":7890}}"#,
        )
        .unwrap();
        assert!(s.clash.allow_lan);
        assert_eq!(s.clash.socks_port, 1080);
        assert_eq!(s.clash.port, 7890);
        assert_eq!(s.singbox.listen_port, 7890);
        assert_eq!(s.singbox.up_mbps, 100);
    }

    #[test]
    fn unknown_types_are_rejected() {
        assert!(GeneratorSettings::from_json(r#"{"clash":{"port":"x"}}"#).is_err());
    }
}
