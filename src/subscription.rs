//! Raw base64 subscriptions

use crate::decoder::has_known_scheme;
use crate::error::{ConvertError, Result};
use crate::link;
use log::debug;

/// Joins share links with `\n` and base64-encodes the result (standard alphabet, padded).
///
/// # Errors
///
/// `EmptyBatch` when `links` is empty.
pub fn generate_generic_subscription<S: AsRef<str>>(links: &[S]) -> Result<String> {
    if links.is_empty() {
        return Err(ConvertError::EmptyBatch {
            diagnostics: Vec::new(),
        });
    }
    let body = links
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<&str>>()
        .join("\n");
    Ok(link::encode_base64(&body))
}

/// Splits a fetched subscription body into share-link lines.
///
/// Tried in order:
/// 1. every line is a share link or a base64 envelope of share links: the envelopes are
///    unwrapped line by line;
/// 2. the whole body (whitespace ignored) is base64 of share links, possibly wrapped
///    across several lines;
/// 3. otherwise the raw lines are returned.
///
/// Blank lines are dropped and every line is trimmed.
pub fn decode_subscription_body(content: &str) -> Vec<String> {
    let raw = non_empty_lines(content);
    if raw.is_empty() {
        return Vec::new();
    }

    let per_line: Option<Vec<Vec<String>>> = raw.iter().map(|line| line_links(line)).collect();
    if let Some(per_line) = per_line {
        return per_line.into_iter().flatten().collect();
    }

    let compact: String = content.chars().filter(|c| !c.is_whitespace()).collect();
    if !compact.contains("://")
        && let Ok(decoded) = link::decode_base64(&compact)
    {
        let links = non_empty_lines(&decoded);
        if !links.is_empty() && links.iter().all(|l| has_known_scheme(l)) {
            debug!("decoded base64 subscription body ({} bytes)", decoded.len());
            return links;
        }
    }
    raw
}

/// Share links carried by one body line, or `None` if the line is neither a link nor an
/// envelope of links.
fn line_links(line: &str) -> Option<Vec<String>> {
    if has_known_scheme(line) {
        return Some(vec![line.to_string()]);
    }
    if line.contains("://") {
        return None;
    }
    let decoded = link::decode_base64(line).ok()?;
    let links = non_empty_lines(&decoded);
    (!links.is_empty() && links.iter().all(|l| has_known_scheme(l))).then_some(links)
}

fn non_empty_lines(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}
