//! URL parser for extracting TeraBox share tokens (surl) from links.

use regex::Regex;
use std::sync::LazyLock;

/// `...?surl=<token>` anywhere in the query string.
static SURL_PARAM_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"surl=([^&\s]+)").expect("Invalid surl param regex"));

/// `/s/<token>` path segment.
static SHORT_PATH_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/s/([^/?&\s]+)").expect("Invalid short path regex"));

/// `sharing/link?surl=<token>`.
static SHARING_LINK_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"sharing/link\?surl=([^&\s]+)").expect("Invalid sharing link regex")
});

/// Extract the share token from a TeraBox link.
///
/// Patterns are tried in order and the first capture wins:
/// - `...?surl=<token>`
/// - `https://www.terabox.com/s/<token>`
/// - `https://www.terabox.com/sharing/link?surl=<token>`
///
/// Returns `None` when no pattern matches. Short links that only reveal
/// the token after a redirect are handled by [`crate::client::resolve_surl`].
///
/// # Examples
///
/// ```
/// use terabox_relay::url_parser::extract_surl;
///
/// let surl = extract_surl("https://www.terabox.com/s/1AbCdEf").unwrap();
/// assert_eq!(surl, "1AbCdEf");
///
/// assert!(extract_surl("https://example.com/").is_none());
/// ```
pub fn extract_surl(url: &str) -> Option<String> {
    [&*SURL_PARAM_REGEX, &*SHORT_PATH_REGEX, &*SHARING_LINK_REGEX]
        .iter()
        .find_map(|re| re.captures(url))
        .and_then(|captures| captures.get(1))
        .map(|m| m.as_str().to_string())
}
