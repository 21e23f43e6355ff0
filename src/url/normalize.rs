use url::{ParseError, Url};

/// Normalizes a URL into the key used to deduplicate visits
///
/// # Normalization Rules
///
/// 1. Parse the URL; input without a scheme (`example.com/page`) is parsed
///    as if it had one
/// 2. Drop the scheme
/// 3. Keep the host, plus the port when it is not the scheme default
/// 4. Keep the path, except a bare `/`
/// 5. Keep the query string and fragment verbatim
///
/// Unparseable input produces an empty string rather than an error.
///
/// # Examples
///
/// ```
/// use linkloom::url::normalize_url;
///
/// assert_eq!(normalize_url("https://example.com/page"), "example.com/page");
/// assert_eq!(normalize_url("http://example.com/"), "example.com");
/// assert_eq!(normalize_url("example.com/page?q=1#top"), "example.com/page?q=1#top");
/// ```
pub fn normalize_url(url_str: &str) -> String {
    let url = match parse_lenient(url_str) {
        Some(url) => url,
        None => return String::new(),
    };

    let mut key = String::new();

    if let Some(host) = url.host_str() {
        key.push_str(host);
        if let Some(port) = url.port() {
            key.push(':');
            key.push_str(&port.to_string());
        }
    }

    let path = url.path();
    if path != "/" {
        key.push_str(path);
    }

    if let Some(query) = url.query().filter(|q| !q.is_empty()) {
        key.push('?');
        key.push_str(query);
    }

    if let Some(fragment) = url.fragment().filter(|f| !f.is_empty()) {
        key.push('#');
        key.push_str(fragment);
    }

    key
}

/// Parses a URL, retrying scheme-less input as `http://...`
///
/// `host:port/path` parses with the host as its scheme, so a hostless
/// result whose remainder starts with a port number is retried as well.
fn parse_lenient(url_str: &str) -> Option<Url> {
    let trimmed = url_str.trim();
    match Url::parse(trimmed) {
        Ok(url) if url.host_str().is_none() && looks_like_host_port(&url) => {
            Url::parse(&format!("http://{}", trimmed)).ok()
        }
        Ok(url) => Some(url),
        Err(ParseError::RelativeUrlWithoutBase) => Url::parse(&format!("http://{}", trimmed)).ok(),
        Err(_) => None,
    }
}

fn looks_like_host_port(url: &Url) -> bool {
    url.cannot_be_a_base()
        && url
            .path()
            .split('/')
            .next()
            .map_or(false, |port| !port.is_empty() && port.bytes().all(|b| b.is_ascii_digit()))
}
