//! Name-based deduplication and merging of proxy lists.

use crate::proxy::ProxyDescriptor;
use std::collections::HashSet;

/// Keeps the first item for each distinct name, in first-seen order.
///
/// Items whose name is empty are dropped.
pub fn dedup_by_name<T, F>(items: impl IntoIterator<Item = T>, name_of: F) -> Vec<T>
where
    F: Fn(&T) -> &str,
{
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|item| {
            let name = name_of(item);
            !name.is_empty() && seen.insert(name.to_string())
        })
        .collect()
}

/// Drops skipped entries (`None`) and descriptors whose name repeats an earlier one.
///
/// Accepts both `ProxyDescriptor` and `Option<ProxyDescriptor>` items.
pub fn dedup_proxies<I>(items: I) -> Vec<ProxyDescriptor>
where
    I: IntoIterator,
    I::Item: Into<Option<ProxyDescriptor>>,
{
    let proxies = items
        .into_iter()
        .filter_map(|item| -> Option<ProxyDescriptor> { item.into() });
    dedup_by_name(proxies, |p: &ProxyDescriptor| p.name.as_str())
}

/// Appends `remote` to `local`, renaming colliding remote names to `"<name> (n)"`.
pub fn merge_proxies(
    local: Vec<ProxyDescriptor>,
    remote: Vec<ProxyDescriptor>,
) -> Vec<ProxyDescriptor> {
    let mut names: HashSet<String> = local.iter().map(|p| p.name.clone()).collect();
    let mut merged = local;
    for mut proxy in remote {
        let mut name = proxy.name.clone();
        let mut counter = 1;
        while names.contains(&name) {
            name = format!("{} ({})", proxy.name, counter);
            counter += 1;
        }
        names.insert(name.clone());
        proxy.name = name;
        merged.push(proxy);
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decoder::parse_link;

    fn proxy(link: &str) -> ProxyDescriptor {
        parse_link(link).unwrap()
    }

    #[test]
    fn first_seen_wins() {
        let items = vec![
            Some(proxy("trojan://first@a.com:443#node1")),
            None,
            Some(proxy("trojan://second@b.com:443#node1")),
            Some(proxy("trojan://third@c.com:443#node2")),
        ];
        let out = dedup_proxies(items);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].name, "node1");
        assert_eq!(out[0].server, "a.com");
        assert_eq!(out[1].name, "node2");
    }

    #[test]
    fn idempotent() {
        let items = vec![
            proxy("ss://aes-256-gcm:pw@a.com:1#x"),
            proxy("ss://aes-256-gcm:pw@b.com:1#x"),
            proxy("ss://aes-256-gcm:pw@c.com:1#y"),
        ];
        let once = dedup_proxies(items);
        let twice = dedup_proxies(once.clone());
        assert_eq!(once, twice);
    }

    #[test]
    fn empty_names_are_dropped() {
        let mut p = proxy("ss://aes-256-gcm:pw@a.com:1#x");
        p.name.clear();
        assert!(dedup_proxies(vec![p]).is_empty());
    }

    #[test]
    fn merge_renames_collisions() {
        let local = vec![proxy("ss://aes-256-gcm:pw@a.com:1#HK")];
        let remote = vec![
            proxy("ss://aes-256-gcm:pw@b.com:1#HK"),
            proxy("ss://aes-256-gcm:pw@c.com:1#HK"),
            proxy("ss://aes-256-gcm:pw@d.com:1#JP"),
        ];
        let names: Vec<_> = merge_proxies(local, remote)
            .into_iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(names, vec!["HK", "HK (1)", "HK (2)", "JP"]);
    }
}
