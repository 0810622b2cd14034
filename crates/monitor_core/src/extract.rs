use std::sync::LazyLock;

use regex::Regex;

use crate::EndpointSet;

/// Suffixes dropped when common static assets are filtered out.
pub const COMMON_ASSET_SUFFIXES: &[&str] = &[
    ".png", ".jpg", ".jpeg", ".gif", ".svg", ".webp", ".ico", ".css", ".json",
];

// Capture group 1 is the whole quoted span, groups 2..=6 are the shapes in
// priority order. Alternation is leftmost-first, so the earliest shape that
// accepts a span wins.
const ENDPOINT_PATTERN: &str = concat!(
    r#"(?i)(?:"|')("#,
    // absolute or protocol-relative url
    r#"((?:[a-zA-Z]{1,10}://|//)[^"'/]+\.[a-zA-Z]{2,}[^"']*)"#,
    "|",
    // relative path starting with /, ./ or ../
    r#"((?:/|\.\./|\./)[^"'><,;| *()%$\^/\\\[\]][^"'><,;|()]+)"#,
    "|",
    // path ending in an extension
    r#"([a-zA-Z0-9_\-/]+/[a-zA-Z0-9_\-/.]+\.(?:[a-zA-Z]{1,4}|action)(?:[?|#][^"|']*)?)"#,
    "|",
    // rest path without extension
    r#"([a-zA-Z0-9_\-/]+/[a-zA-Z0-9_\-/]{3,}(?:[?|#][^"|']*)?)"#,
    "|",
    // bare filename with a known extension
    r#"([a-zA-Z0-9_\-]+\.(?:php|asp|aspx|jsp|json|action|html|js|txt|xml)(?:[?|#][^"|']*)?)"#,
    r#")(?:"|')"#,
);

static ENDPOINT_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(ENDPOINT_PATTERN).expect("endpoint pattern is valid"));

/// Which structural shape accepted a quoted span.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EndpointShape {
    /// `scheme://host.tld/...` or `//host.tld/...`
    Url,
    /// `/x`, `./x` or `../x`
    RelativePath,
    /// `dir/name.ext` with optional query or fragment
    PathWithExtension,
    /// `dir/resource` with at least three trailing characters
    RestPath,
    /// `name.ext` for a fixed list of extensions
    Filename,
}

impl EndpointShape {
    const BY_GROUP: [EndpointShape; 5] = [
        EndpointShape::Url,
        EndpointShape::RelativePath,
        EndpointShape::PathWithExtension,
        EndpointShape::RestPath,
        EndpointShape::Filename,
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EndpointMatch<'t> {
    pub endpoint: &'t str,
    pub shape: EndpointShape,
}

/// Every quoted span in `text` that looks like an endpoint, in text order.
///
/// Spans containing a line break are skipped: they straddle two literals and
/// cannot be stored in the line-delimited state record.
pub fn find_endpoints(text: &str) -> impl Iterator<Item = EndpointMatch<'_>> + '_ {
    ENDPOINT_REGEX.captures_iter(text).filter_map(|caps| {
        let (shape, span) = EndpointShape::BY_GROUP
            .iter()
            .enumerate()
            .find_map(|(idx, shape)| caps.get(idx + 2).map(|m| (*shape, m)))?;
        let endpoint = span.as_str();
        if endpoint.is_empty() || endpoint.contains(['\n', '\r']) {
            return None;
        }
        Some(EndpointMatch { endpoint, shape })
    })
}

/// Extracts the set of endpoint strings referenced by `text`.
///
/// With `filter_common_assets`, candidates ending in one of
/// [`COMMON_ASSET_SUFFIXES`] (ASCII case-insensitive) are dropped.
pub fn extract(text: &str, filter_common_assets: bool) -> EndpointSet {
    find_endpoints(text)
        .map(|m| m.endpoint)
        .filter(|endpoint| !filter_common_assets || !is_common_asset(endpoint))
        .collect()
}

pub fn is_common_asset(endpoint: &str) -> bool {
    let lower = endpoint.to_ascii_lowercase();
    COMMON_ASSET_SUFFIXES
        .iter()
        .any(|suffix| lower.ends_with(suffix))
}
