//! Whole-input conversion with per-line diagnostics

use crate::clash::ClashConfigBuilder;
use crate::clash_import::clash_entries;
use crate::decoder::{has_known_scheme, parse_link, unwrap_envelope};
use crate::dedup::dedup_by_name;
use crate::error::{ConvertError, LineDiagnostic, Result};
use crate::proxy::ProxyDescriptor;
use crate::settings::GeneratorSettings;
use crate::singbox::SingboxConfigBuilder;
use crate::subscription::{decode_subscription_body, generate_generic_subscription};
use log::{info, warn};

/// Result of converting a batch of share links
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conversion {
    /// Deduplicated descriptors in input order
    pub proxies: Vec<ProxyDescriptor>,
    /// Input lines whose descriptors survived deduplication, without repeats
    pub accepted_links: Vec<String>,
    /// Lines that failed to parse
    pub diagnostics: Vec<LineDiagnostic>,
}

impl Conversion {
    /// Clash config for the accepted proxies
    pub fn clash_config(&self, settings: &GeneratorSettings) -> Result<String> {
        ClashConfigBuilder::with_settings(settings.clash.clone()).build(&self.proxies)
    }

    /// sing-box config for the accepted proxies
    pub fn singbox_config(&self, settings: &GeneratorSettings) -> Result<String> {
        SingboxConfigBuilder::with_settings(settings.singbox.clone()).build(&self.proxies)
    }

    /// Base64 subscription of the accepted links
    pub fn generic_subscription(&self) -> Result<String> {
        generate_generic_subscription(&self.accepted_links)
    }

    /// Accepted count followed by one line per diagnostic
    pub fn summary(&self) -> String {
        let mut summary = format!(
            "{} proxies accepted, {} line(s) failed",
            self.proxies.len(),
            self.diagnostics.len()
        );
        for diagnostic in &self.diagnostics {
            summary.push_str(&format!("\n  {}", diagnostic));
        }
        summary
    }
}

/// Converts newline-separated share links.
///
/// Blank lines and `#` comments are skipped. Each line may be a base64 envelope holding
/// several links. Lines that fail are recorded in [`Conversion::diagnostics`] and do not
/// stop the batch. Later duplicates of a name are dropped.
///
/// # Errors
///
/// `EmptyBatch` (carrying the diagnostics) when no descriptor survives.
pub fn convert_batch(input: &str) -> Result<Conversion> {
    let mut parsed: Vec<(ProxyDescriptor, usize)> = Vec::new();
    let mut diagnostics = Vec::new();
    let lines: Vec<&str> = input.lines().map(str::trim).collect();

    for (idx, line) in lines.iter().enumerate() {
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let text = unwrap_envelope(line);
        for link in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
            match parse_link(link) {
                Ok(proxy) => parsed.push((proxy, idx)),
                Err(err) => {
                    let diagnostic = LineDiagnostic {
                        line_number: idx + 1,
                        link: line.to_string(),
                        message: err.to_string(),
                    };
                    warn!("{}", diagnostic);
                    diagnostics.push(diagnostic);
                }
            }
        }
    }

    finish(parsed, diagnostics, |idx| Some(lines[idx].to_string()))
}

/// Converts a fetched subscription body.
///
/// The body is unwrapped with [`decode_subscription_body`] and converted with
/// [`convert_batch`]. A body without any share link that is a Clash config is read from its
/// `proxies:` list instead; diagnostics then number the list entries, and
/// [`Conversion::accepted_links`] stays empty since there are no links to pass through.
///
/// # Errors
///
/// `EmptyBatch` (carrying the diagnostics) when no descriptor survives.
pub fn convert_subscription(content: &str) -> Result<Conversion> {
    let lines = decode_subscription_body(content);
    if !lines.iter().any(|line| has_known_scheme(line))
        && let Some(entries) = clash_entries(content)
    {
        info!("reading {} proxies from Clash config", entries.len());
        let mut parsed = Vec::new();
        let mut diagnostics = Vec::new();
        for (idx, (label, entry)) in entries.into_iter().enumerate() {
            match entry {
                Ok(proxy) => parsed.push((proxy, idx)),
                Err(err) => {
                    let diagnostic = LineDiagnostic {
                        line_number: idx + 1,
                        link: label,
                        message: err.to_string(),
                    };
                    warn!("{}", diagnostic);
                    diagnostics.push(diagnostic);
                }
            }
        }
        return finish(parsed, diagnostics, |_| None);
    }
    convert_batch(&lines.join("\n"))
}

/// Dedups parsed descriptors and collects the source text of each surviving line once.
fn finish(
    parsed: Vec<(ProxyDescriptor, usize)>,
    diagnostics: Vec<LineDiagnostic>,
    source: impl Fn(usize) -> Option<String>,
) -> Result<Conversion> {
    let survivors = dedup_by_name(parsed, |entry: &(ProxyDescriptor, usize)| {
        entry.0.name.as_str()
    });
    if survivors.is_empty() {
        return Err(ConvertError::EmptyBatch { diagnostics });
    }

    let mut accepted_links: Vec<String> = Vec::new();
    let mut last_line = None;
    let mut proxies = Vec::with_capacity(survivors.len());
    for (proxy, idx) in survivors {
        // survivors are in line order, so repeats of a line are adjacent
        if last_line != Some(idx) {
            accepted_links.extend(source(idx));
            last_line = Some(idx);
        }
        proxies.push(proxy);
    }

    info!(
        "{} proxies accepted, {} line(s) failed",
        proxies.len(),
        diagnostics.len()
    );
    Ok(Conversion {
        proxies,
        accepted_links,
        diagnostics,
    })
}
