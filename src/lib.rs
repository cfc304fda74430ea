//! # Sublink Convert
//!
//! Turns proxy share links into client configurations.
//!
//! ## Features
//!
//! - Parse share links into one normalized [`ProxyDescriptor`]
//! - Render descriptors as a Clash config (hand-written emitter, strict string quoting)
//! - Render descriptors as a sing-box JSON config
//! - Build a raw base64 "generic" subscription from the accepted links
//! - Batch conversion with per-line diagnostics and name deduplication
//! - Read the `proxies:` list of an existing Clash config back into descriptors
//!
//! ## Supported schemes
//!
//! - **[Shadowsocks]** (`ss://`): SIP002 (base64 or plain userinfo) and the legacy whole-base64 form, SIP003 plugins
//! - **[ShadowsocksR]** (`ssr://`): URL-safe base64 payload with base64 query values
//! - **[VMess]** (`vmess://`): V2 base64 JSON and the legacy V1 form
//! - **[VLess]** (`vless://`): TLS, Reality, ws/grpc/h2 transports
//! - **[Trojan]** (`trojan://`): always TLS, optional ws/grpc transport
//! - **[Tuic]** (`tuic://`): both `uuid:password` layouts
//! - **[Hysteria2]** (`hysteria2://`, `hy2://`): obfs, insecure flags
//!
//! ## Link parsing rules (unified)
//!
//! - **Scheme prefix**: Case-insensitive (e.g. `VMESS://` is valid).
//! - **Envelope**: A line without `://` whose length is a multiple of four and which is
//!   pure base64 is decoded first; if decoding fails the line is kept as is.
//! - **Port**: 1–65535; port 0 is rejected.
//! - **Fragment (`#`)**: Percent-decoded and used as the proxy name; falls back to `server:port`.
//! - **Errors**: A missing field or failed decode → `MalformedLink`; unknown scheme →
//!   `UnsupportedScheme`; nothing usable in a whole batch → `EmptyBatch`.
//!
//! ## Example
//!
//! ```rust
//! use sublink_convert::{convert_batch, generate_clash_config};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let input = "ss://aes-256-gcm:secret@example.com:8388#HK\ntrojan://pw@example.org:443#JP";
//! let conversion = convert_batch(input)?;
//! assert_eq!(conversion.proxies.len(), 2);
//!
//! let clash = generate_clash_config(&conversion.proxies)?;
//! assert!(clash.contains("proxy-groups:"));
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

mod batch;
mod clash;
mod clash_import;
mod constants;
mod decoder;
mod dedup;
mod error;
mod hysteria2;
mod link;
mod proxy;
mod settings;
mod shadowsocks;
mod singbox;
mod ssr;
mod subscription;
mod trojan;
mod tuic;
mod vless;
mod vmess;

#[cfg(test)]
mod conversion_comprehensive;

pub use batch::{Conversion, convert_batch, convert_subscription};
pub use clash::{ClashConfigBuilder, ClashValue, generate_clash_config, quote_string};
pub use clash_import::parse_clash_proxies;
pub use decoder::{parse_link, parse_share_link, unwrap_envelope};
pub use dedup::{dedup_by_name, dedup_proxies, merge_proxies};
pub use error::{ConvertError, LineDiagnostic, Result};
pub use hysteria2::Hysteria2;
pub use proxy::{
    Hysteria2Settings, Network, ProxyDescriptor, ProxyProtocol, ProxyType, RealityOpts,
    ShadowsocksPlugin, ShadowsocksRSettings, ShadowsocksSettings, TlsSettings, Transport,
    TrojanSettings, TuicSettings, VLessSettings, VMessSettings,
};
pub use settings::{ClashSettings, GeneratorSettings, SingboxSettings};
pub use shadowsocks::Shadowsocks;
pub use singbox::{SingboxConfigBuilder, generate_singbox_config};
pub use ssr::ShadowsocksR;
pub use subscription::{decode_subscription_body, generate_generic_subscription};
pub use trojan::Trojan;
pub use tuic::Tuic;
pub use vless::VLess;
pub use vmess::VMess;

/// Trait for scheme parsers that turn one share link into a [`ProxyDescriptor`]
pub trait ProtocolParser {
    /// Scheme prefixes (lowercase, with `://`) this parser accepts
    const SCHEMES: &'static [&'static str];

    /// Parse a share link into a normalized descriptor
    ///
    /// # Errors
    ///
    /// Returns [`ConvertError::MalformedLink`] if a mandatory field is missing or a decode
    /// step fails. Never returns a partially populated descriptor.
    ///
    /// # Example
    ///
    /// ```rust
    /// use sublink_convert::{ProtocolParser, VMess};
    ///
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let proxy = VMess::parse("vmess://eyJhZGQiOiJleGFtcGxlLmNvbSIsInBvcnQiOjQ0MywiaWQiOiJhYmMxMjMiLCJhaWQiOjAsIm5ldCI6InRjcCIsInBzIjoidGVzdCJ9")?;
    /// assert_eq!(proxy.name, "test");
    /// # Ok(())
    /// # }
    /// ```
    fn parse(link: &str) -> Result<ProxyDescriptor>;

    /// Whether `link` starts with one of this parser's schemes (case-insensitive)
    fn accepts(link: &str) -> bool {
        Self::SCHEMES.iter().any(|s| link::has_scheme(link, s))
    }
}
