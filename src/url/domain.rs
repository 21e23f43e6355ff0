use url::Url;

/// Extracts the host from a URL
///
/// The host is returned lowercase and without a port. If the URL has no host
/// (`mailto:` and friends) it returns None.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use linkloom::url::extract_domain;
///
/// let url = Url::parse("https://example.com/path").unwrap();
/// assert_eq!(extract_domain(&url), Some("example.com".to_string()));
///
/// let url = Url::parse("https://EXAMPLE.COM:8443/path").unwrap();
/// assert_eq!(extract_domain(&url), Some("example.com".to_string()));
/// ```
pub fn extract_domain(url: &Url) -> Option<String> {
    url.host_str().map(|h| h.to_lowercase())
}

/// Returns true when `url` lives on `host`
///
/// Only the host name is compared; scheme and port are ignored, so
/// `http://a.com` and `https://a.com:8443` are the same host.
pub fn same_host(url: &Url, host: &str) -> bool {
    url.host_str()
        .map_or(false, |h| h.eq_ignore_ascii_case(host))
}
