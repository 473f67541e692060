//! Domain key extraction from raw URLs.

/// Key for entries whose URL does not yield a usable domain.
pub const UNKNOWN_DOMAIN: &str = "unknown";

/// Normalize a raw URL into the domain key used for grouping.
///
/// Strips the scheme, a leading `www.`, any path, query or fragment,
/// surrounding whitespace and trailing dots, then lowercases. Anything that
/// ends up empty maps to [`UNKNOWN_DOMAIN`]. The result is a fixed point:
/// feeding a key back in returns it unchanged.
pub fn normalize_url(url: &str) -> String {
    let mut key = normalize_once(url);
    loop {
        let next = normalize_once(&key);
        if next == key {
            return key;
        }
        key = next;
    }
}

fn normalize_once(url: &str) -> String {
    let mut rest = url.trim_start();
    if rest.is_empty() {
        return UNKNOWN_DOMAIN.to_string();
    }

    rest = strip_prefix_ignore_case(rest, "https://")
        .or_else(|| strip_prefix_ignore_case(rest, "http://"))
        .unwrap_or(rest);
    rest = strip_prefix_ignore_case(rest, "www.").unwrap_or(rest);

    let end = rest.find(['/', '?', '#']).unwrap_or(rest.len());
    let host = rest[..end]
        .trim()
        .trim_end_matches(|c: char| c == '.' || c.is_whitespace());

    if host.is_empty() {
        UNKNOWN_DOMAIN.to_string()
    } else {
        host.to_lowercase()
    }
}

fn strip_prefix_ignore_case<'a>(value: &'a str, prefix: &str) -> Option<&'a str> {
    let head = value.get(..prefix.len())?;
    head.eq_ignore_ascii_case(prefix)
        .then(|| &value[prefix.len()..])
}

/// URL to show for visiting a domain group.
pub fn site_url(domain: &str) -> String {
    if domain.starts_with("http") {
        domain.to_string()
    } else {
        format!("https://{domain}")
    }
}
